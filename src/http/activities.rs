//! Most recent matches of one category, account wide.

use actix_web::{get, web, HttpResponse};

use crate::{
    config::Settings,
    error::ApiError,
    orchestrator::{account_history, PageBudget},
    stats::summarize_recent,
    upstream::{ActivityMode, Membership, Upstream},
};

/// Split the `a,b,c` character segment, rejecting blanks and non-numeric ids.
pub fn parse_character_ids(raw: &str) -> Result<Vec<String>, ApiError> {
    let ids: Vec<String> = raw
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect();

    if ids.is_empty() {
        return Err(ApiError::bad_request("at least one character id is required"));
    }
    if let Some(bad) = ids.iter().find(|id| !id.bytes().all(|b| b.is_ascii_digit())) {
        return Err(ApiError::bad_request(format!("invalid character id {bad:?}")));
    }
    Ok(ids)
}

/// GET /api/activities/{category}/{membership_type}/{membership_id}/{character_ids}
#[get("/activities/{category}/{membership_type}/{membership_id}/{character_ids}")]
pub async fn recent(
    path: web::Path<(String, String, String, String)>,
    upstream: web::Data<dyn Upstream>,
    settings: web::Data<Settings>,
) -> Result<HttpResponse, ApiError> {
    let (category, m_type, m_id, char_ids) = path.into_inner();
    let mode = category
        .parse::<ActivityMode>()
        .map_err(ApiError::BadRequest)?;
    let account = Membership::parse(&m_type, &m_id).map_err(ApiError::BadRequest)?;
    let characters = parse_character_ids(&char_ids)?;

    // A single page per character already holds the newest matches.
    let count = settings.recent_count;
    let budget = PageBudget {
        page_size: u32::try_from(count).unwrap_or(u32::MAX).clamp(1, 250),
        max_pages: 1,
    };
    let items = account_history(
        upstream.get_ref(),
        &account,
        &characters,
        mode,
        count,
        budget,
    )
    .await;

    Ok(HttpResponse::Ok().json(summarize_recent(&items)))
}

pub fn init_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(recent);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn character_ids_are_split_and_trimmed() {
        let ids = parse_character_ids("2305843009, 2305843010,").unwrap();
        assert_eq!(ids, ["2305843009", "2305843010"]);
    }

    #[test]
    fn blank_or_bad_character_ids_are_rejected() {
        assert!(parse_character_ids(",,").is_err());
        assert!(parse_character_ids("123,abc").is_err());
    }
}
