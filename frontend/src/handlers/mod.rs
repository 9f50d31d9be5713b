//! Page handlers.
//!
//! Each screen is an actix handler that renders one tera template inside the
//! navigation shell (`base.html`).

mod add_product;
mod auth;
mod products;

use actix_web::http::header::LOCATION;
use actix_web::{HttpResponse, web};
use tera::{Context, Tera};
use tracing::error;

use crate::models::Notification;
use crate::session::Session;

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/", web::get().to(home))
        .service(auth::login_page)
        .service(auth::login)
        .service(auth::signup_page)
        .service(auth::signup)
        .service(auth::logout)
        .service(products::list_products)
        .service(products::edit_product)
        .service(products::delete_product)
        .service(add_product::add_product_page)
        .service(add_product::add_product);
}

async fn home() -> HttpResponse {
    redirect("/products")
}

pub(crate) fn redirect(location: &str) -> HttpResponse {
    HttpResponse::Found()
        .append_header((LOCATION, location))
        .finish()
}

/// Context shared by every page: login/role state for the header links, the
/// search box value and the one-shot notification.
pub(crate) fn shell_context(session: Option<&Session>) -> Context {
    let mut context = Context::new();
    context.insert("logged_in", &session.is_some());
    context.insert("is_admin", &session.is_some_and(Session::is_admin));
    context.insert("search", "");
    context.insert("notification", &Option::<Notification>::None);
    context
}

pub(crate) fn render(tmpl: &Tera, name: &str, context: &Context) -> HttpResponse {
    match tmpl.render(name, context) {
        Ok(html) => HttpResponse::Ok()
            .content_type("text/html; charset=utf-8")
            .body(html),
        Err(err) => {
            error!("tera render error in {}: {:?}", name, err);
            HttpResponse::InternalServerError().body("Template render error")
        }
    }
}
