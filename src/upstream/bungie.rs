use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::json;

use super::types::{
    AccountStatsResponse, Activity, ActivityHistoryResponse, ActivityMode, Envelope, Membership,
    ProfileResponse, StatMap, UserInfoCard, SUCCESS_CODE,
};
use super::Upstream;
use crate::{config::Settings, error::UpstreamError};

/// reqwest-backed client for the platform API.
#[derive(Clone)]
pub struct BungieClient {
    http: Client,
    root: String,
    api_key: String,
}

impl BungieClient {
    pub fn new(settings: &Settings) -> anyhow::Result<Self> {
        let http = Client::builder()
            .user_agent(concat!("d2-tracker-server/", env!("CARGO_PKG_VERSION")))
            .timeout(settings.fetch_timeout)
            .build()?;

        Ok(BungieClient {
            http,
            root: settings.api_root.clone(),
            api_key: settings.api_key.clone(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.root, path)
    }

    /// Send a request and unwrap the platform envelope.
    async fn send<T: DeserializeOwned + Send>(
        &self,
        req: RequestBuilder,
    ) -> Result<Option<T>, UpstreamError> {
        let resp = req.header("X-API-KEY", &self.api_key).send().await?;
        let status = resp.status();
        let body = resp.bytes().await?;
        interpret(status, &body)
    }
}

/// Classify a platform response.
///
/// A not-found `ErrorStatus` is `Ok(None)` whatever the HTTP status; any other
/// non-2xx is `Status`, a 2xx with a failing `ErrorCode` is `Rejected`, and an
/// unreadable 2xx body is `Decode`.
pub(crate) fn interpret<T: DeserializeOwned>(
    status: StatusCode,
    body: &[u8],
) -> Result<Option<T>, UpstreamError> {
    let envelope = serde_json::from_slice::<Envelope<T>>(body);

    if !status.is_success() {
        // The platform reports unknown accounts with an error status and
        // a descriptive envelope.
        if matches!(&envelope, Ok(env) if env.is_not_found()) {
            return Ok(None);
        }
        return Err(UpstreamError::Status(status.as_u16()));
    }

    let envelope = envelope.map_err(|e| UpstreamError::Decode(e.to_string()))?;
    if envelope.error_code != SUCCESS_CODE {
        if envelope.is_not_found() {
            return Ok(None);
        }
        log::debug!("platform message: {}", envelope.message);
        return Err(UpstreamError::Rejected {
            code: envelope.error_code,
            status: envelope.error_status,
        });
    }
    Ok(envelope.response)
}

#[async_trait]
impl Upstream for BungieClient {
    async fn search_player(
        &self,
        display_name: &str,
        display_name_code: u16,
    ) -> Result<Vec<UserInfoCard>, UpstreamError> {
        let req = self
            .http
            .post(self.url("/Destiny2/SearchDestinyPlayerByBungieName/All/"))
            .json(&json!({
                "displayName": display_name,
                "displayNameCode": display_name_code,
            }));
        Ok(self.send::<Vec<UserInfoCard>>(req).await?.unwrap_or_default())
    }

    async fn character_ids(
        &self,
        account: &Membership,
    ) -> Result<Option<Vec<String>>, UpstreamError> {
        let req = self
            .http
            .get(self.url(&format!(
                "/Destiny2/{}/Profile/{}/",
                account.membership_type, account.membership_id
            )))
            .query(&[("components", "Profiles")]);

        let profile = self.send::<ProfileResponse>(req).await?;
        Ok(profile
            .and_then(|p| p.profile)
            .and_then(|c| c.data)
            .map(|d| d.character_ids))
    }

    async fn activity_page(
        &self,
        account: &Membership,
        character_id: &str,
        mode: ActivityMode,
        count: u32,
        page: u32,
    ) -> Result<Option<Vec<Activity>>, UpstreamError> {
        let req = self
            .http
            .get(self.url(&format!(
                "/Destiny2/{}/Account/{}/Character/{}/Stats/Activities/",
                account.membership_type, account.membership_id, character_id
            )))
            .query(&[
                ("count", count.to_string()),
                ("mode", mode.code().to_string()),
                ("page", page.to_string()),
            ]);

        let history = self.send::<ActivityHistoryResponse>(req).await?;
        Ok(history.and_then(|h| h.activities))
    }

    async fn account_stats(&self, account: &Membership) -> Result<Option<StatMap>, UpstreamError> {
        let req = self
            .http
            .get(self.url(&format!(
                "/Destiny2/{}/Account/{}/Stats/",
                account.membership_type, account.membership_id
            )))
            .query(&[("groups", "General")]);

        let stats = self.send::<AccountStatsResponse>(req).await?;
        Ok(stats.and_then(AccountStatsResponse::into_all_pvp))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn body(v: serde_json::Value) -> Vec<u8> {
        serde_json::to_vec(&v).unwrap()
    }

    #[test]
    fn success_envelope_yields_response() {
        let raw = body(json!({
            "Response": { "profile": { "data": { "characterIds": ["1", "2"] } } },
            "ErrorCode": 1,
            "ErrorStatus": "Success"
        }));
        let profile = interpret::<ProfileResponse>(StatusCode::OK, &raw)
            .unwrap()
            .unwrap();
        assert_eq!(profile.profile.unwrap().data.unwrap().character_ids, ["1", "2"]);
    }

    #[test]
    fn not_found_status_on_error_response_is_absent() {
        let raw = body(json!({
            "ErrorCode": 1601,
            "ErrorStatus": "DestinyAccountNotFound",
            "Message": "We were unable to find your Destiny account information."
        }));
        let res = interpret::<ProfileResponse>(StatusCode::INTERNAL_SERVER_ERROR, &raw);
        assert!(matches!(res, Ok(None)));
    }

    #[test]
    fn other_error_responses_keep_their_status() {
        let raw = body(json!({ "ErrorCode": 5, "ErrorStatus": "SystemDisabled" }));
        let res = interpret::<ProfileResponse>(StatusCode::SERVICE_UNAVAILABLE, &raw);
        assert!(matches!(res, Err(UpstreamError::Status(503))));

        let res = interpret::<ProfileResponse>(StatusCode::BAD_GATEWAY, b"<html>bad gateway</html>");
        assert!(matches!(res, Err(UpstreamError::Status(502))));
    }

    #[test]
    fn failing_error_code_on_200_is_rejected() {
        let raw = body(json!({ "ErrorCode": 31, "ErrorStatus": "PerEndpointRequestThrottleExceeded" }));
        let res = interpret::<ProfileResponse>(StatusCode::OK, &raw);
        assert!(matches!(
            res,
            Err(UpstreamError::Rejected { code: 31, ref status }) if status == "PerEndpointRequestThrottleExceeded"
        ));
    }

    #[test]
    fn not_found_status_on_200_is_absent() {
        let raw = body(json!({ "ErrorCode": 1620, "ErrorStatus": "DestinyCharacterNotFound" }));
        let res = interpret::<ProfileResponse>(StatusCode::OK, &raw);
        assert!(matches!(res, Ok(None)));
    }

    #[test]
    fn unreadable_200_body_is_decode_error() {
        let res = interpret::<ProfileResponse>(StatusCode::OK, b"not json");
        assert!(matches!(res, Err(UpstreamError::Decode(_))));
    }
}
