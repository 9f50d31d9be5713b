//! Storefront front end.
//!
//! Server-rendered screens for browsing and managing the product catalogue of
//! a remote REST API:
//! - `api`: the one client every screen calls the API through
//! - `controller`: filter/sort/search state of the product list
//! - `session`: the signed-in user record and its request extractor
//! - `store`: the per-session product lists kept between requests
//! - `handlers`: actix page handlers rendering the tera templates

pub mod api;
pub mod config;
pub mod controller;
pub mod error;
pub mod forms;
pub mod handlers;
pub mod models;
pub mod session;
pub mod store;

pub use api::ApiClient;
pub use config::Config;
pub use handlers::configure;
pub use store::ProductLists;

use tera::Tera;

/// Loads every template matching `glob`, e.g. `public/**/*.html`.
pub fn build_templates(glob: &str) -> Result<Tera, tera::Error> {
    Tera::new(glob)
}
