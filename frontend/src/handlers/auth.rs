use actix_web::{HttpResponse, get, post, web};
use tera::Tera;
use tracing::{info, warn};

use super::{redirect, render, shell_context};
use crate::api::ApiClient;
use crate::forms::{LoginForm, SignupForm};
use crate::session::{CurrentSession, Session};
use crate::store::ProductLists;

fn login_view(tmpl: &Tera, session: Option<&Session>, username: &str, error: Option<String>) -> HttpResponse {
    let mut context = shell_context(session);
    context.insert("username", username);
    context.insert("error", &error);
    render(tmpl, "login.html", &context)
}

fn signup_view(tmpl: &Tera, session: Option<&Session>, form: &SignupForm, error: Option<String>) -> HttpResponse {
    let mut context = shell_context(session);
    context.insert("form", &form.without_passwords());
    context.insert("error", &error);
    render(tmpl, "signup.html", &context)
}

#[get("/login")]
pub async fn login_page(tmpl: web::Data<Tera>, session: CurrentSession) -> HttpResponse {
    login_view(&tmpl, session.get(), "", None)
}

#[post("/login")]
pub async fn login(
    tmpl: web::Data<Tera>,
    api: web::Data<ApiClient>,
    session: CurrentSession,
    form: web::Form<LoginForm>,
) -> HttpResponse {
    let credentials = match form.credentials() {
        Ok(credentials) => credentials,
        Err(err) => return login_view(&tmpl, session.get(), &form.username, Some(err.to_string())),
    };

    match api.sign_in(&credentials).await {
        Ok(new_session) => HttpResponse::Found()
            .cookie(new_session.to_cookie())
            .append_header((actix_web::http::header::LOCATION, "/products"))
            .finish(),
        Err(err) => {
            warn!("sign-in failed: {}", err);
            login_view(
                &tmpl,
                session.get(),
                &form.username,
                Some("Login failed. Check your credentials.".to_string()),
            )
        }
    }
}

#[get("/signup")]
pub async fn signup_page(tmpl: web::Data<Tera>, session: CurrentSession) -> HttpResponse {
    signup_view(&tmpl, session.get(), &SignupForm::default(), None)
}

#[post("/signup")]
pub async fn signup(
    tmpl: web::Data<Tera>,
    api: web::Data<ApiClient>,
    session: CurrentSession,
    form: web::Form<SignupForm>,
) -> HttpResponse {
    let request = match form.request() {
        Ok(request) => request,
        Err(err) => return signup_view(&tmpl, session.get(), &form, Some(err.to_string())),
    };

    let token = session.get().map(|s| s.token.as_str());
    match api.sign_up(token, &request).await {
        Ok(Some(new_session)) => HttpResponse::Found()
            .cookie(new_session.to_cookie())
            .append_header((actix_web::http::header::LOCATION, "/products"))
            .finish(),
        Ok(None) => redirect("/login"),
        Err(err) => {
            warn!("signup failed: {}", err);
            signup_view(&tmpl, session.get(), &form, Some("Signup failed".to_string()))
        }
    }
}

#[post("/logout")]
pub async fn logout(lists: web::Data<ProductLists>, session: CurrentSession) -> HttpResponse {
    if let Some(session) = session.get() {
        lists.evict(&session.token);
    }
    info!("user signed out");
    HttpResponse::Found()
        .cookie(Session::removal_cookie())
        .append_header((actix_web::http::header::LOCATION, "/login"))
        .finish()
}
