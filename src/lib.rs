//! Stats proxy between a browser client and the Bungie.net Destiny 2 API.

pub mod collector;
pub mod config;
pub mod error;
pub mod http;
pub mod metrics;
pub mod orchestrator;
pub mod stats;
pub mod upstream;

use actix_web::web;
use std::sync::Arc;

use crate::{config::Settings, error::ApiError, upstream::Upstream};

/// Register shared state and every route. Used by the binary and by tests.
pub fn configure_app(
    settings: Settings,
    upstream: Arc<dyn Upstream>,
) -> impl FnOnce(&mut web::ServiceConfig) {
    move |cfg: &mut web::ServiceConfig| {
        // Malformed bodies and query strings answer with the JSON error body.
        let json = web::JsonConfig::default()
            .error_handler(|err, _| ApiError::bad_request(err.to_string()).into());
        let query = web::QueryConfig::default()
            .error_handler(|err, _| ApiError::bad_request(err.to_string()).into());

        cfg.app_data(web::Data::new(settings))
            .app_data(web::Data::from(upstream))
            .app_data(json)
            .app_data(query)
            .configure(http::routes::init_routes);
    }
}
