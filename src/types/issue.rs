use std::collections::HashMap;

use serde::Deserialize;
use serde_json::Value;

use super::de::{lenient, lenient_vec};
use super::{InlineChangelog, IssueLink, User};

/// A search hit as returned by `/rest/api/2/search`.
#[derive(Deserialize, Debug, Clone, Default)]
pub struct Issue {
    pub key: String,
    #[serde(default)]
    pub fields: IssueFields,
    #[serde(default, deserialize_with = "lenient")]
    pub changelog: Option<InlineChangelog>,
}

#[derive(Deserialize, Debug, Clone, Default)]
pub struct IssueFields {
    #[serde(default, deserialize_with = "lenient")]
    pub summary: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub status: Option<NamedRef>,
    #[serde(default, deserialize_with = "lenient")]
    pub resolution: Option<NamedRef>,
    #[serde(default, deserialize_with = "lenient")]
    pub priority: Option<NamedRef>,
    #[serde(default, deserialize_with = "lenient")]
    pub issuetype: Option<NamedRef>,
    #[serde(default, deserialize_with = "lenient")]
    pub project: Option<ProjectRef>,
    #[serde(default, deserialize_with = "lenient")]
    pub created: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub updated: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub resolutiondate: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub reporter: Option<User>,
    #[serde(default, deserialize_with = "lenient")]
    pub assignee: Option<User>,
    #[serde(default, deserialize_with = "lenient_vec")]
    pub issuelinks: Vec<IssueLink>,
    #[serde(default, deserialize_with = "lenient_vec")]
    pub labels: Vec<String>,
    #[serde(default, deserialize_with = "lenient_vec")]
    pub components: Vec<NamedRef>,
    /// Everything else, including `customfield_*` values whose ids are
    /// instance-specific.
    #[serde(flatten)]
    pub custom: HashMap<String, Value>,
}

impl IssueFields {
    pub fn custom(&self, id: &str) -> Option<&Value> {
        self.custom.get(id).filter(|v| !v.is_null())
    }
}

/// Any `{ "name": ... }` object: status, resolution, priority, type, component.
#[derive(Deserialize, Debug, Clone, Default)]
pub struct NamedRef {
    pub name: Option<String>,
}

#[derive(Deserialize, Debug, Clone, Default)]
pub struct ProjectRef {
    pub key: Option<String>,
}
