use serde::{Deserialize, Serialize};

/// Directional relationship kinds that matter for lineage detection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum LinkKind {
    /// This issue clones the target
    Clones,
    /// This issue is cloned by the target
    IsClonedBy,
    /// This issue depends on the target
    DependsOn,
    /// The target depends on this issue
    IsDependedOnBy,
}

/// A classified edge from the owning ticket to `target`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LinkEdge {
    pub kind: LinkKind,
    pub target: String,
}

/// Raw `issuelinks` element as returned by the search endpoint.
#[derive(Deserialize, Debug, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct IssueLink {
    #[serde(rename = "type", default, deserialize_with = "super::de::lenient")]
    pub link_type: Option<IssueLinkType>,
    #[serde(default, deserialize_with = "super::de::lenient")]
    pub outward_issue: Option<LinkedIssue>,
    #[serde(default, deserialize_with = "super::de::lenient")]
    pub inward_issue: Option<LinkedIssue>,
}

#[derive(Deserialize, Debug, Clone, Default)]
pub struct IssueLinkType {
    pub id: Option<String>,
}

/// Minimal issue reference on either end of a link.
#[derive(Deserialize, Debug, Clone)]
pub struct LinkedIssue {
    pub key: Option<String>,
}
