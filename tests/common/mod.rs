//! In-memory stand-in for the Bungie platform shared by the integration tests.
#![allow(dead_code)]

use async_trait::async_trait;
use d2_tracker_server::{
    error::UpstreamError,
    upstream::{Activity, ActivityMode, Membership, StatMap, Upstream, UserInfoCard},
};
use serde_json::json;
use std::{
    collections::{HashMap, HashSet},
    sync::atomic::{AtomicU32, Ordering},
};

pub const ACCOUNT_ID: &str = "4611686018467284386";
pub const HUNTER: &str = "2305843009300000001";
pub const WARLOCK: &str = "2305843009300000002";

pub fn account() -> Membership {
    Membership {
        membership_type: 3,
        membership_id: ACCOUNT_ID.into(),
    }
}

/// Build an activity the way the platform serializes it.
pub fn activity(period: &str, kills: f64, deaths: f64, assists: f64, win: bool) -> Activity {
    let efficiency = (kills + assists) / deaths.max(1.0);
    serde_json::from_value(json!({
        "period": period,
        "activityDetails": { "instanceId": "12345", "mode": 84 },
        "values": {
            "kills": { "basic": { "value": kills, "displayValue": kills.to_string() } },
            "deaths": { "basic": { "value": deaths, "displayValue": deaths.to_string() } },
            "assists": { "basic": { "value": assists, "displayValue": assists.to_string() } },
            "efficiency": { "basic": { "value": efficiency, "displayValue": format!("{efficiency:.2}") } },
            "standing": { "basic": { "value": if win { 0.0 } else { 1.0 } } }
        }
    }))
    .expect("activity fixture")
}

/// `n` identical wins, newest first, one hour apart starting at `day`.
pub fn history(n: usize, day: u32) -> Vec<Activity> {
    (0..n)
        .map(|i| {
            let hour = 23 - (i % 24);
            let day = day - (i / 24) as u32;
            activity(&format!("2024-03-{day:02}T{hour:02}:00:00Z"), 3.0, 1.0, 1.0, true)
        })
        .collect()
}

pub fn card(membership_type: i32, membership_id: &str, cross_save_override: i32) -> UserInfoCard {
    UserInfoCard {
        membership_type,
        membership_id: membership_id.into(),
        display_name: "Yellowflash".into(),
        bungie_global_display_name: "Yellowflash".into(),
        bungie_global_display_name_code: Some(3454),
        cross_save_override,
    }
}

#[derive(Default)]
pub struct FakeUpstream {
    pub cards: Vec<UserInfoCard>,
    /// membership id → character ids
    pub profiles: HashMap<String, Vec<String>>,
    /// membership ids whose profile call errors
    pub broken_profiles: HashSet<String>,
    pub histories: HashMap<(String, ActivityMode), Vec<Activity>>,
    /// first failing page per (character, mode)
    pub fail_at: HashMap<(String, ActivityMode), u32>,
    pub all_pvp: Option<StatMap>,
    pub page_calls: AtomicU32,
}

impl FakeUpstream {
    /// One Steam account with two characters and no history.
    pub fn with_account() -> Self {
        let mut fake = FakeUpstream::default();
        fake.cards.push(card(3, ACCOUNT_ID, 0));
        fake.profiles
            .insert(ACCOUNT_ID.into(), vec![HUNTER.into(), WARLOCK.into()]);
        fake
    }

    pub fn history(mut self, character: &str, mode: ActivityMode, items: Vec<Activity>) -> Self {
        self.histories.insert((character.into(), mode), items);
        self
    }

    pub fn failing(mut self, character: &str, mode: ActivityMode, page: u32) -> Self {
        self.fail_at.insert((character.into(), mode), page);
        self
    }

    pub fn pages_fetched(&self) -> u32 {
        self.page_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Upstream for FakeUpstream {
    async fn search_player(
        &self,
        display_name: &str,
        display_name_code: u16,
    ) -> Result<Vec<UserInfoCard>, UpstreamError> {
        Ok(self
            .cards
            .iter()
            .filter(|c| {
                c.bungie_global_display_name.eq_ignore_ascii_case(display_name)
                    && c.bungie_global_display_name_code == Some(display_name_code)
            })
            .cloned()
            .collect())
    }

    async fn character_ids(
        &self,
        account: &Membership,
    ) -> Result<Option<Vec<String>>, UpstreamError> {
        if self.broken_profiles.contains(&account.membership_id) {
            return Err(UpstreamError::Status(500));
        }
        Ok(self.profiles.get(&account.membership_id).cloned())
    }

    async fn activity_page(
        &self,
        _account: &Membership,
        character_id: &str,
        mode: ActivityMode,
        count: u32,
        page: u32,
    ) -> Result<Option<Vec<Activity>>, UpstreamError> {
        self.page_calls.fetch_add(1, Ordering::SeqCst);
        let key = (character_id.to_string(), mode);

        if self.fail_at.get(&key).is_some_and(|p| page >= *p) {
            return Err(UpstreamError::Status(503));
        }
        let Some(all) = self.histories.get(&key) else {
            return Ok(None);
        };

        let start = (page * count) as usize;
        let end = (start + count as usize).min(all.len());
        Ok(Some(all.get(start..end).unwrap_or_default().to_vec()))
    }

    async fn account_stats(&self, _account: &Membership) -> Result<Option<StatMap>, UpstreamError> {
        Ok(self.all_pvp.clone())
    }
}
