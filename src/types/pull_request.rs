use serde::{Deserialize, Serialize};

/// A merged pull request supplied by the caller, as emitted by
/// `gh pr list --json title,body,url,number,mergedAt,author`.
#[derive(Deserialize, Serialize, Debug, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct PullRequest {
    #[serde(default, deserialize_with = "super::de::null_as_empty")]
    pub title: String,
    #[serde(default, deserialize_with = "super::de::null_as_empty")]
    pub body: String,
    pub url: Option<String>,
    pub number: Option<u64>,
    pub merged_at: Option<String>,
    #[serde(default, deserialize_with = "super::de::lenient")]
    pub author: Option<PrAuthor>,
}

impl PullRequest {
    /// Title and body joined, the text scanned for ticket references.
    pub fn text(&self) -> String {
        format!("{} {}", self.title, self.body)
    }
}

/// PR author, either a bare login or the `{ "login": ... }` object `gh` emits.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(untagged)]
pub enum PrAuthor {
    Login(String),
    Account { login: String },
}

impl PrAuthor {
    pub fn login(&self) -> &str {
        match self {
            Self::Login(login) | Self::Account { login } => login,
        }
    }
}
