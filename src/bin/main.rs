use actix_cors::Cors;
use actix_web::{middleware::Logger, App, HttpServer};
use anyhow::Context;
use d2_tracker_server::{configure_app, config::Settings, metrics, upstream::BungieClient};
use std::sync::Arc;

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    env_logger::init();

    // Configuration
    let settings = Settings::from_env()?;
    let upstream = Arc::new(BungieClient::new(&settings).context("building upstream client")?);
    let server_addr = settings.server_addr.clone();

    log::info!(
        "D2 tracker listening on {server_addr}, upstream {}, origin {}",
        settings.api_root,
        settings.allowed_origin
    );

    HttpServer::new(move || {
        let cors = Cors::default()
            .allowed_origin(&settings.allowed_origin)
            .allowed_methods(["GET", "POST"])
            .allow_any_header()
            .max_age(3600);

        App::new()
            .wrap(Logger::default())
            .wrap(cors)
            .wrap(metrics::METRICS.clone())
            .configure(configure_app(settings.clone(), upstream.clone()))
    })
    .bind(&server_addr)
    .with_context(|| format!("binding {server_addr}"))?
    .run()
    .await?;

    Ok(())
}
