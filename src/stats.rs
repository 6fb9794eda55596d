//! Pure reductions from platform records to display stats.

use serde::Serialize;

use crate::upstream::{Activity, StatMap};

/// Shown instead of a ratio when there is nothing to divide.
pub const NOT_APPLICABLE: &str = "N/A";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregateStats {
    pub kda: String,
    pub kd: String,
    pub win_rate: String,
}

impl AggregateStats {
    pub fn not_applicable() -> Self {
        AggregateStats {
            kda: NOT_APPLICABLE.into(),
            kd: NOT_APPLICABLE.into(),
            win_rate: NOT_APPLICABLE.into(),
        }
    }
}

/// Round half away from zero and render with exactly `decimals` places.
pub fn fixed(value: f64, decimals: usize) -> String {
    let factor = 10f64.powi(decimals as i32);
    format!("{:.*}", decimals, (value * factor).round() / factor)
}

/// Sum kills / deaths / assists / wins over `items` and derive the ratios.
/// A zero death count divides by one instead.
pub fn reduce(items: &[Activity]) -> AggregateStats {
    if items.is_empty() {
        return AggregateStats::not_applicable();
    }

    let (kills, deaths, assists, wins) =
        items
            .iter()
            .fold((0.0, 0.0, 0.0, 0usize), |(k, d, a, w), item| {
                (
                    k + item.kills(),
                    d + item.deaths(),
                    a + item.assists(),
                    w + usize::from(item.is_win()),
                )
            });

    let divisor = if deaths > 0.0 { deaths } else { 1.0 };
    let kd = kills / divisor;
    let kda = (kills + assists) / divisor;
    let win_rate = 100.0 * wins as f64 / items.len() as f64;

    AggregateStats {
        kda: fixed(kda, 2),
        kd: fixed(kd, 2),
        win_rate: fixed(win_rate, 0),
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct MatchSummary {
    pub date: String,
    #[serde(rename = "KDA")]
    pub kda: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecentMatches {
    #[serde(rename = "averageKDA")]
    pub average_kda: String,
    pub games_counted: usize,
    pub history: Vec<MatchSummary>,
}

/// Average the platform's per-match efficiency over `items`.
pub fn summarize_recent(items: &[Activity]) -> RecentMatches {
    let history: Vec<MatchSummary> = items
        .iter()
        .map(|a| MatchSummary {
            date: a.period.clone(),
            kda: a
                .display_value("efficiency")
                .map(str::to_string)
                .unwrap_or_else(|| fixed(a.efficiency(), 2)),
        })
        .collect();

    let average_kda = if items.is_empty() {
        fixed(0.0, 2)
    } else {
        let total: f64 = items.iter().map(Activity::efficiency).sum();
        fixed(total / items.len() as f64, 2)
    };

    RecentMatches {
        average_kda,
        games_counted: history.len(),
        history,
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AllTimeStats {
    #[serde(rename = "lifetimeKD")]
    pub lifetime_kd: String,
    #[serde(rename = "lifetimeKDA")]
    pub lifetime_kda: String,
    #[serde(rename = "winRate")]
    pub win_rate: String,
}

fn display(stats: &StatMap, name: &str) -> String {
    stats
        .get(name)
        .map(|s| s.basic.display_value.clone())
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| NOT_APPLICABLE.into())
}

/// Reshape the all-time PvP block. Win rate prefers won / entered and falls
/// back to the win-loss ratio when those counters are missing.
pub fn summarize_all_time(stats: &StatMap) -> AllTimeStats {
    let entered = stats.get("activitiesEntered").map(|s| s.basic.value);
    let won = stats.get("activitiesWon").map(|s| s.basic.value);

    let win_rate = match (won, entered) {
        (Some(won), Some(entered)) if entered > 0.0 => Some(100.0 * won / entered),
        _ => stats.get("winLossRatio").map(|s| s.basic.value * 100.0),
    };

    AllTimeStats {
        lifetime_kd: display(stats, "killsDeathsRatio"),
        lifetime_kda: display(stats, "efficiency"),
        win_rate: win_rate
            .map(|r| format!("{}%", fixed(r, 1)))
            .unwrap_or_else(|| NOT_APPLICABLE.into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_rounds_half_away_from_zero() {
        assert_eq!(fixed(2.5, 0), "3");
        assert_eq!(fixed(2.345, 1), "2.3");
        assert_eq!(fixed(66.666, 0), "67");
        assert_eq!(fixed(10.0, 2), "10.00");
    }
}
