//! Account statistics: all-time PvP and the per-category deep search.

use actix_web::{get, web, HttpResponse};
use serde::Deserialize;

use crate::{
    config::Settings,
    error::ApiError,
    orchestrator::{category_stats, resolve_characters, select_categories, PageBudget},
    stats::summarize_all_time,
    upstream::{Membership, Upstream},
};

#[derive(Deserialize)]
pub struct StatsParams {
    /// Comma-separated category slugs; every category when absent.
    pub categories: Option<String>,
}

/// GET /api/all-time-stats/{membership_type}/{membership_id}
#[get("/all-time-stats/{membership_type}/{membership_id}")]
pub async fn all_time(
    path: web::Path<(String, String)>,
    upstream: web::Data<dyn Upstream>,
) -> Result<HttpResponse, ApiError> {
    let (m_type, m_id) = path.into_inner();
    let account = Membership::parse(&m_type, &m_id).map_err(ApiError::BadRequest)?;

    let Some(all_pvp) = upstream.account_stats(&account).await? else {
        return Err(ApiError::not_found(format!(
            "no all-time PvP stats for account {account}"
        )));
    };
    Ok(HttpResponse::Ok().json(summarize_all_time(&all_pvp)))
}

/// GET /api/stats/{membership_type}/{membership_id}?categories=trials,competitive
#[get("/stats/{membership_type}/{membership_id}")]
pub async fn deep_stats(
    path: web::Path<(String, String)>,
    web::Query(params): web::Query<StatsParams>,
    upstream: web::Data<dyn Upstream>,
    settings: web::Data<Settings>,
) -> Result<HttpResponse, ApiError> {
    let (m_type, m_id) = path.into_inner();
    let account = Membership::parse(&m_type, &m_id).map_err(ApiError::BadRequest)?;
    let categories = select_categories(params.categories.as_deref())?;

    // Account resolution is the only step that fails the whole request.
    let characters = resolve_characters(upstream.get_ref(), &account).await?;

    let budget = PageBudget {
        page_size: settings.page_size,
        max_pages: settings.max_pages,
    };
    let report = category_stats(
        upstream.get_ref(),
        &account,
        &characters,
        &categories,
        budget,
    )
    .await;

    Ok(HttpResponse::Ok().json(report))
}

pub fn init_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(all_time).service(deep_stats);
}
