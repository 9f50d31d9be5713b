use actix_web::{HttpResponse, get, post, web};
use tera::Tera;
use tracing::{info, warn};

use super::{redirect, render, shell_context};
use crate::api::ApiClient;
use crate::forms::ProductForm;
use crate::models::Notification;
use crate::session::{CurrentSession, Session};
use crate::store::ProductLists;

/// Renders the form; categories feed the typeahead list and a failed fetch
/// only leaves it empty.
async fn form_view(
    tmpl: &Tera,
    api: &ApiClient,
    session: &Session,
    form: &ProductForm,
    notification: Option<Notification>,
) -> HttpResponse {
    let categories = api.fetch_categories(&session.token).await.unwrap_or_else(|err| {
        warn!("failed to load categories: {}", err);
        Vec::new()
    });

    let mut context = shell_context(Some(session));
    context.insert("categories", &categories);
    context.insert("form", form);
    context.insert("notification", &notification);
    render(tmpl, "add_product.html", &context)
}

#[get("/add-product")]
pub async fn add_product_page(
    tmpl: web::Data<Tera>,
    api: web::Data<ApiClient>,
    session: CurrentSession,
) -> HttpResponse {
    let Some(session) = session.into_inner() else {
        return redirect("/login");
    };
    form_view(&tmpl, &api, &session, &ProductForm::default(), None).await
}

#[post("/add-product")]
pub async fn add_product(
    tmpl: web::Data<Tera>,
    api: web::Data<ApiClient>,
    lists: web::Data<ProductLists>,
    session: CurrentSession,
    form: web::Form<ProductForm>,
) -> HttpResponse {
    let Some(session) = session.into_inner() else {
        return redirect("/login");
    };

    let product = match form.new_product() {
        Ok(product) => product,
        Err(err) => {
            let notification = Notification::error(err.to_string());
            return form_view(&tmpl, &api, &session, &form, Some(notification)).await;
        }
    };

    match api.create_product(&session.token, &product).await {
        Ok(()) => {
            info!(name = %product.name, "product added");
            // The stored list predates the new product.
            lists.evict(&session.token);
            let notification = Notification::success(format!("Product {} added successfully", product.name));
            form_view(&tmpl, &api, &session, &ProductForm::default(), Some(notification)).await
        }
        Err(err) => {
            warn!("failed to add product: {}", err);
            let notification = Notification::error("Failed to add product");
            form_view(&tmpl, &api, &session, &form, Some(notification)).await
        }
    }
}
