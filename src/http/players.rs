//! Player lookup: Bungie name → membership → characters.

use actix_web::{get, post, web, HttpResponse};
use serde::Deserialize;
use serde_json::json;

use crate::{
    error::ApiError,
    orchestrator::{resolve_account, resolve_characters},
    upstream::{Membership, Upstream},
};

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchPlayerReq {
    pub display_name: String,
    pub display_name_code: u16,
}

/// POST /api/search-player
#[post("/search-player")]
pub async fn search_player(
    info: web::Json<SearchPlayerReq>,
    upstream: web::Data<dyn Upstream>,
) -> Result<HttpResponse, ApiError> {
    let name = info.display_name.trim();
    if name.is_empty() {
        return Err(ApiError::bad_request("displayName must not be empty"));
    }

    let account = resolve_account(upstream.get_ref(), name, info.display_name_code).await?;
    Ok(HttpResponse::Ok().json(account))
}

/// GET /api/characters/{membership_type}/{membership_id}
#[get("/characters/{membership_type}/{membership_id}")]
pub async fn characters(
    path: web::Path<(String, String)>,
    upstream: web::Data<dyn Upstream>,
) -> Result<HttpResponse, ApiError> {
    let (m_type, m_id) = path.into_inner();
    let account = Membership::parse(&m_type, &m_id).map_err(ApiError::BadRequest)?;

    let characters = resolve_characters(upstream.get_ref(), &account).await?;
    Ok(HttpResponse::Ok().json(json!({ "characters": characters })))
}

pub fn init_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(search_player).service(characters);
}
