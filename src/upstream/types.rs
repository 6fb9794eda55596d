//! Wire types of the Bungie.net platform API.
//!
//! Every nested field is optional on the wire; decoding never fails because a
//! value is missing, the accessor just reports zero / absent.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::{collections::HashMap, fmt, str::FromStr};

/// `ErrorCode` of a successful platform call.
pub const SUCCESS_CODE: i32 = 1;

/// Error statuses that mean "nothing there" rather than "upstream broke".
const NOT_FOUND_STATUSES: &[&str] = &[
    "DestinyAccountNotFound",
    "DestinyCharacterNotFound",
    "UserCannotFindRequestedUser",
    "UserCannotResolveCentralAccount",
];

fn success_code() -> i32 {
    SUCCESS_CODE
}

/// Envelope wrapped around every platform response.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Envelope<T> {
    pub response: Option<T>,
    #[serde(default = "success_code")]
    pub error_code: i32,
    #[serde(default)]
    pub error_status: String,
    #[serde(default)]
    pub message: String,
}

impl<T> Envelope<T> {
    pub fn is_not_found(&self) -> bool {
        NOT_FOUND_STATUSES.contains(&self.error_status.as_str())
    }
}

/// One platform account (membership type + id).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Membership {
    pub membership_type: i32,
    pub membership_id: String,
}

impl Membership {
    /// Validates raw path segments. Membership ids are int64 values that the
    /// platform transports as decimal strings.
    pub fn parse(membership_type: &str, membership_id: &str) -> Result<Self, String> {
        let membership_type = membership_type
            .parse::<i32>()
            .ok()
            .filter(|t| *t > 0)
            .ok_or_else(|| format!("invalid membership type {membership_type:?}"))?;

        if membership_id.is_empty() || !membership_id.bytes().all(|b| b.is_ascii_digit()) {
            return Err(format!("invalid membership id {membership_id:?}"));
        }

        Ok(Membership {
            membership_type,
            membership_id: membership_id.to_string(),
        })
    }
}

impl fmt::Display for Membership {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.membership_type, self.membership_id)
    }
}

/// Result row of the Bungie-name search.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserInfoCard {
    #[serde(default)]
    pub membership_type: i32,
    #[serde(default)]
    pub membership_id: String,
    #[serde(default)]
    pub display_name: String,
    #[serde(default)]
    pub bungie_global_display_name: String,
    pub bungie_global_display_name_code: Option<u16>,
    /// Membership type of the cross-save primary, 0 when cross-save is off.
    #[serde(default)]
    pub cross_save_override: i32,
}

impl UserInfoCard {
    pub fn membership(&self) -> Membership {
        Membership {
            membership_type: self.membership_type,
            membership_id: self.membership_id.clone(),
        }
    }

    /// `Name#1234` when a Bungie name is present, platform name otherwise.
    pub fn full_name(&self) -> String {
        match self.bungie_global_display_name_code {
            Some(code) if !self.bungie_global_display_name.is_empty() => {
                format!("{}#{code:04}", self.bungie_global_display_name)
            }
            _ => self.display_name.clone(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct ProfileResponse {
    pub profile: Option<Component<ProfileData>>,
}

#[derive(Debug, Default, Deserialize)]
pub struct Component<T> {
    pub data: Option<T>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileData {
    #[serde(default)]
    pub character_ids: Vec<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ActivityHistoryResponse {
    pub activities: Option<Vec<Activity>>,
}

/// `{ basic: { value, displayValue } }`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct HistoricalStat {
    #[serde(default)]
    pub basic: StatValue,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatValue {
    #[serde(default)]
    pub value: f64,
    #[serde(default)]
    pub display_value: String,
}

/// Named stat values as returned by the platform.
pub type StatMap = HashMap<String, HistoricalStat>;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityDetails {
    #[serde(default)]
    pub instance_id: String,
    #[serde(default)]
    pub mode: i32,
}

/// One entry of a character's activity history.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Activity {
    #[serde(default)]
    pub period: String,
    #[serde(default)]
    pub activity_details: ActivityDetails,
    #[serde(default)]
    pub values: StatMap,
}

impl Activity {
    /// Numeric value of a stat, 0 when absent.
    pub fn value(&self, name: &str) -> f64 {
        self.values.get(name).map(|s| s.basic.value).unwrap_or(0.0)
    }

    pub fn display_value(&self, name: &str) -> Option<&str> {
        self.values
            .get(name)
            .map(|s| s.basic.display_value.as_str())
            .filter(|v| !v.is_empty())
    }

    pub fn kills(&self) -> f64 {
        self.value("kills")
    }

    pub fn deaths(&self) -> f64 {
        self.value("deaths")
    }

    pub fn assists(&self) -> f64 {
        self.value("assists")
    }

    /// Per-match KDA as computed by the platform.
    pub fn efficiency(&self) -> f64 {
        self.value("efficiency")
    }

    /// Standing 0 is a victory; a missing standing never counts as one.
    pub fn is_win(&self) -> bool {
        self.values
            .get("standing")
            .map(|s| s.basic.value == 0.0)
            .unwrap_or(false)
    }

    pub fn period_utc(&self) -> Option<DateTime<Utc>> {
        DateTime::parse_from_rfc3339(&self.period)
            .ok()
            .map(|d| d.with_timezone(&Utc))
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountStatsResponse {
    pub merged_all_characters: Option<MergedStats>,
}

#[derive(Debug, Default, Deserialize)]
pub struct MergedStats {
    pub results: Option<MergedResults>,
}

#[derive(Debug, Default, Deserialize)]
pub struct MergedResults {
    #[serde(rename = "allPvP")]
    pub all_pvp: Option<AllTimeBlock>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AllTimeBlock {
    pub all_time: Option<StatMap>,
}

impl AccountStatsResponse {
    pub fn into_all_pvp(self) -> Option<StatMap> {
        self.merged_all_characters?.results?.all_pvp?.all_time
    }
}

/// Activity modes the tracker knows how to query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActivityMode {
    Trials,
    IronBanner,
    Competitive,
    Quickplay,
}

impl ActivityMode {
    pub const ALL: [ActivityMode; 4] = [
        ActivityMode::Trials,
        ActivityMode::IronBanner,
        ActivityMode::Competitive,
        ActivityMode::Quickplay,
    ];

    /// `DestinyActivityModeType` value sent as the `mode` query parameter.
    pub fn code(self) -> i32 {
        match self {
            ActivityMode::Trials => 84,
            ActivityMode::IronBanner => 19,
            ActivityMode::Competitive => 69,
            ActivityMode::Quickplay => 70,
        }
    }

    pub fn slug(self) -> &'static str {
        match self {
            ActivityMode::Trials => "trials",
            ActivityMode::IronBanner => "iron-banner",
            ActivityMode::Competitive => "competitive",
            ActivityMode::Quickplay => "quickplay",
        }
    }
}

impl fmt::Display for ActivityMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.slug())
    }
}

impl FromStr for ActivityMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        ActivityMode::ALL
            .into_iter()
            .find(|m| m.slug() == wanted)
            .ok_or_else(|| format!("unknown category {s:?}"))
    }
}
