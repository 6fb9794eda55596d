//! Access to the Bungie.net platform API.

mod bungie;
pub mod types;

pub use bungie::BungieClient;
pub use types::{Activity, ActivityMode, Membership, StatMap, UserInfoCard};

use crate::error::UpstreamError;
use async_trait::async_trait;

/// Operations the tracker needs from the upstream.
///
/// `Ok(None)` means the upstream answered but had nothing for the request
/// (unknown account, exhausted history); `Err` means the call itself failed.
#[async_trait]
pub trait Upstream: Send + Sync {
    /// Look up every platform membership behind a Bungie name.
    async fn search_player(
        &self,
        display_name: &str,
        display_name_code: u16,
    ) -> Result<Vec<UserInfoCard>, UpstreamError>;

    async fn character_ids(
        &self,
        account: &Membership,
    ) -> Result<Option<Vec<String>>, UpstreamError>;

    /// One page of a character's activity history, newest first.
    async fn activity_page(
        &self,
        account: &Membership,
        character_id: &str,
        mode: ActivityMode,
        count: u32,
        page: u32,
    ) -> Result<Option<Vec<Activity>>, UpstreamError>;

    /// Merged all-characters, all-time PvP stats.
    async fn account_stats(&self, account: &Membership) -> Result<Option<StatMap>, UpstreamError>;
}
