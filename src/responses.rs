//! Response envelopes of the tracker's REST endpoints.

use serde::Deserialize;

use crate::pagination::Page;
use crate::types::de::{lenient_vec, CountedVec};
use crate::types::{ChangelogEntry, Comment, Issue};

/// `GET /rest/api/2/search`
#[derive(Deserialize, Debug, Default)]
pub struct SearchResponse {
    #[serde(default)]
    pub issues: CountedVec<Issue>,
    #[serde(default)]
    pub total: usize,
}

/// `GET /rest/api/2/issue/{key}/changelog`
#[derive(Deserialize, Debug, Default)]
pub struct ChangelogResponse {
    #[serde(default)]
    pub values: CountedVec<ChangelogEntry>,
    #[serde(default)]
    pub total: usize,
}

/// `GET /rest/api/2/issue/{key}/comment`
#[derive(Deserialize, Debug, Default)]
pub struct CommentsResponse {
    #[serde(default, deserialize_with = "lenient_vec")]
    pub comments: Vec<Comment>,
}

impl From<SearchResponse> for Page<Issue> {
    fn from(response: SearchResponse) -> Self {
        Page {
            items: response.issues.items,
            received: response.issues.received,
            total: response.total,
        }
    }
}

impl From<ChangelogResponse> for Page<ChangelogEntry> {
    fn from(response: ChangelogResponse) -> Self {
        Page {
            items: response.values.items,
            received: response.values.received,
            total: response.total,
        }
    }
}
