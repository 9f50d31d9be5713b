use std::time::Duration;

use actix_files::Files;
use actix_web::{App, HttpServer, web};
use anyhow::Context as _;
use dotenvy::dotenv;
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt};

use storefront::{ApiClient, Config, ProductLists, build_templates, configure};

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = Config::load()?;
    let tera = build_templates(&config.templates)
        .with_context(|| format!("failed to load templates from {}", config.templates))?;
    let api = ApiClient::new(&config.api_base_url);
    let lists = web::Data::new(ProductLists::with_idle_ttl(Duration::from_secs(
        config.list_ttl_secs,
    )));

    info!(api = %config.api_base_url, "storefront listening on {}:{}", config.host, config.port);

    let static_dir = config.static_dir.clone();
    HttpServer::new(move || {
        App::new()
            .app_data(web::Data::new(tera.clone()))
            .app_data(web::Data::new(api.clone()))
            .app_data(lists.clone())
            .configure(configure)
            .service(Files::new("/static", &static_dir))
    })
    .bind((config.host.as_str(), config.port))?
    .run()
    .await?;

    Ok(())
}
