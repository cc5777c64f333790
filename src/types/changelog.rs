use serde::Deserialize;

use super::User;

/// One history record: who changed which fields, and when.
#[derive(Deserialize, Debug, Clone, Default)]
pub struct ChangelogEntry {
    #[serde(default, deserialize_with = "super::de::lenient")]
    pub author: Option<User>,
    pub created: Option<String>,
    #[serde(default, deserialize_with = "super::de::lenient_vec")]
    pub items: Vec<ChangeItem>,
}

#[derive(Deserialize, Debug, Clone, Default)]
pub struct ChangeItem {
    #[serde(default, deserialize_with = "super::de::null_as_empty")]
    pub field: String,
    #[serde(rename = "fromString")]
    pub from: Option<String>,
    #[serde(rename = "toString")]
    pub to: Option<String>,
}

/// Changelog embedded in a search hit via `expand=changelog`.
///
/// The tracker truncates `histories` for busy tickets; `total` tells how many
/// entries exist in full.
#[derive(Deserialize, Debug, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct InlineChangelog {
    pub total: Option<usize>,
    #[serde(default, deserialize_with = "super::de::lenient_vec")]
    pub histories: Vec<ChangelogEntry>,
}

impl InlineChangelog {
    pub fn is_truncated(&self) -> bool {
        self.total.is_some_and(|total| total > self.histories.len())
    }
}

/// A comment as returned by the per-issue comment endpoint.
#[derive(Deserialize, Debug, Clone, Default)]
pub struct Comment {
    #[serde(default, deserialize_with = "super::de::lenient")]
    pub author: Option<User>,
    #[serde(default, deserialize_with = "super::de::null_as_empty")]
    pub body: String,
    pub created: Option<String>,
}
