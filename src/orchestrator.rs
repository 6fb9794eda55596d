//! Account resolution and the multi-category deep search.

use async_trait::async_trait;
use futures::future::join_all;
use serde::{ser::SerializeMap, Serialize, Serializer};

use crate::{
    collector::{collect, PageSource, SearchRequest},
    error::{ApiError, UpstreamError},
    stats::{self, AggregateStats},
    upstream::{Activity, ActivityMode, Membership, Upstream, UserInfoCard},
};

/// Platform preference when a Bungie name owns several memberships and none
/// is the cross-save primary: Steam, Epic, Xbox, PlayStation, Stadia.
const PLATFORM_PRIORITY: &[i32] = &[3, 6, 1, 2, 5];

/// One named statistics category of the deep search.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Category {
    pub mode: ActivityMode,
    pub target_count: usize,
}

impl Category {
    pub fn name(&self) -> &'static str {
        self.mode.slug()
    }
}

/// The fixed category set, in output order.
pub const CATEGORIES: &[Category] = &[
    Category {
        mode: ActivityMode::Trials,
        target_count: 25,
    },
    Category {
        mode: ActivityMode::IronBanner,
        target_count: 25,
    },
    Category {
        mode: ActivityMode::Competitive,
        target_count: 25,
    },
    Category {
        mode: ActivityMode::Quickplay,
        target_count: 25,
    },
];

/// Pick categories from a comma-separated filter. Unknown names are rejected;
/// the result keeps the order of [`CATEGORIES`].
pub fn select_categories(filter: Option<&str>) -> Result<Vec<Category>, ApiError> {
    let filter = filter.map(str::trim).filter(|f| !f.is_empty());
    let Some(filter) = filter else {
        return Ok(CATEGORIES.to_vec());
    };

    let wanted = filter
        .split(',')
        .filter(|s| !s.trim().is_empty())
        .map(|s| s.parse::<ActivityMode>())
        .collect::<Result<Vec<_>, _>>()
        .map_err(ApiError::BadRequest)?;

    Ok(CATEGORIES
        .iter()
        .filter(|c| wanted.contains(&c.mode))
        .copied()
        .collect())
}

/// Page size and budget shared by every collector of a request.
#[derive(Debug, Clone, Copy)]
pub struct PageBudget {
    pub page_size: u32,
    pub max_pages: u32,
}

/// Activity history of one character in one mode, as a [`PageSource`].
pub struct CharacterHistory<'a> {
    pub upstream: &'a dyn Upstream,
    pub account: &'a Membership,
    pub character_id: &'a str,
    pub mode: ActivityMode,
    pub page_size: u32,
}

#[async_trait]
impl<'a> PageSource for CharacterHistory<'a> {
    type Item = Activity;

    async fn fetch_page(&self, page: u32) -> Result<Option<Vec<Activity>>, UpstreamError> {
        self.upstream
            .activity_page(
                self.account,
                self.character_id,
                self.mode,
                self.page_size,
                page,
            )
            .await
    }

    fn describe(&self) -> String {
        format!("{} {} {}", self.account, self.character_id, self.mode)
    }
}

/// Collect up to `target_count` activities of `mode` across every character,
/// newest first. Characters are searched concurrently.
pub async fn account_history(
    upstream: &dyn Upstream,
    account: &Membership,
    characters: &[String],
    mode: ActivityMode,
    target_count: usize,
    budget: PageBudget,
) -> Vec<Activity> {
    let request = SearchRequest {
        target_count,
        max_pages: budget.max_pages,
    };

    let searches = characters.iter().map(|character_id| async move {
        let source = CharacterHistory {
            upstream,
            account,
            character_id,
            mode,
            page_size: budget.page_size,
        };
        collect(&source, request).await.items
    });

    let mut items: Vec<Activity> = join_all(searches).await.into_iter().flatten().collect();
    items.sort_by(|a, b| b.period_utc().cmp(&a.period_utc()));
    items.truncate(target_count);
    items
}

/// Ordered mapping category name → stats. Serializes as a JSON object in
/// category order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CategoryReport(pub Vec<(&'static str, AggregateStats)>);

impl CategoryReport {
    pub fn get(&self, name: &str) -> Option<&AggregateStats> {
        self.0.iter().find(|(n, _)| *n == name).map(|(_, s)| s)
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.0.iter().map(|(n, _)| *n).collect()
    }
}

impl Serialize for CategoryReport {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (name, stats) in &self.0 {
            map.serialize_entry(name, stats)?;
        }
        map.end()
    }
}

/// Run every category concurrently and reduce each one. A failing category
/// degrades on its own and never cancels its siblings.
pub async fn category_stats(
    upstream: &dyn Upstream,
    account: &Membership,
    characters: &[String],
    categories: &[Category],
    budget: PageBudget,
) -> CategoryReport {
    let searches = categories.iter().map(|category| async move {
        let items = account_history(
            upstream,
            account,
            characters,
            category.mode,
            category.target_count,
            budget,
        )
        .await;
        (category.name(), stats::reduce(&items))
    });

    CategoryReport(join_all(searches).await)
}

/// A membership that has at least one character.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedAccount {
    #[serde(flatten)]
    pub membership: Membership,
    pub display_name: String,
    pub characters: Vec<String>,
}

fn platform_rank(card: &UserInfoCard) -> usize {
    if card.cross_save_override != 0 && card.cross_save_override == card.membership_type {
        return 0;
    }
    PLATFORM_PRIORITY
        .iter()
        .position(|t| *t == card.membership_type)
        .map(|i| i + 1)
        .unwrap_or(PLATFORM_PRIORITY.len() + 1)
}

/// Characters of `account`. An unknown account or one without characters is
/// reported as not found.
pub async fn resolve_characters(
    upstream: &dyn Upstream,
    account: &Membership,
) -> Result<Vec<String>, ApiError> {
    match upstream.character_ids(account).await? {
        Some(ids) if !ids.is_empty() => Ok(ids),
        _ => Err(ApiError::not_found(format!(
            "no Destiny 2 characters for account {account}"
        ))),
    }
}

/// Resolve a Bungie name to the first linked membership (in platform
/// priority order) whose profile yields characters.
pub async fn resolve_account(
    upstream: &dyn Upstream,
    display_name: &str,
    display_name_code: u16,
) -> Result<ResolvedAccount, ApiError> {
    let mut cards = upstream
        .search_player(display_name, display_name_code)
        .await?;
    cards.sort_by_key(platform_rank);

    let mut last_error = None;
    let mut answered = false;
    for card in &cards {
        let membership = card.membership();
        match upstream.character_ids(&membership).await {
            Ok(Some(characters)) if !characters.is_empty() => {
                log::info!("resolved {} to {membership}", card.full_name());
                return Ok(ResolvedAccount {
                    membership,
                    display_name: card.full_name(),
                    characters,
                });
            }
            Ok(_) => {
                log::debug!("{membership} has no characters, trying next platform");
                answered = true;
            }
            Err(e) => {
                log::warn!("profile lookup for {membership} failed: {e}");
                last_error = Some(e);
            }
        }
    }

    // Only an upstream that failed for every membership is a server error.
    match last_error {
        Some(e) if !answered => Err(e.into()),
        _ => Err(ApiError::not_found(format!(
            "{display_name}#{display_name_code:04} was not found on Bungie servers"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_filter_selects_every_category() {
        assert_eq!(select_categories(None).unwrap(), CATEGORIES.to_vec());
        assert_eq!(select_categories(Some("  ")).unwrap(), CATEGORIES.to_vec());
    }

    #[test]
    fn filter_keeps_fixed_order() {
        let picked = select_categories(Some("competitive,trials")).unwrap();
        let names: Vec<_> = picked.iter().map(Category::name).collect();
        assert_eq!(names, ["trials", "competitive"]);
    }

    #[test]
    fn unknown_category_is_rejected() {
        assert!(matches!(
            select_categories(Some("trials,gambit")),
            Err(ApiError::BadRequest(_))
        ));
    }

    #[test]
    fn cross_save_primary_ranks_first() {
        let xbox_primary = UserInfoCard {
            membership_type: 1,
            cross_save_override: 1,
            ..Default::default()
        };
        let steam = UserInfoCard {
            membership_type: 3,
            cross_save_override: 1,
            ..Default::default()
        };
        assert!(platform_rank(&xbox_primary) < platform_rank(&steam));
    }
}
