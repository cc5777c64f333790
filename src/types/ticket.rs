use serde::Serialize;
use serde_json::Value;

use super::{ChangelogEntry, LinkEdge};

/// Canonical, normalized view of one tracker issue.
#[derive(Serialize, Debug, Clone, Default)]
pub struct Ticket {
    pub key: String,
    pub summary: Option<String>,
    pub status: Option<String>,
    pub resolution: Option<String>,
    pub priority: Option<String>,
    pub issuetype: Option<String>,
    pub project: Option<String>,
    pub created: Option<String>,
    pub updated: Option<String>,
    pub resolutiondate: Option<String>,
    pub reporter: Option<String>,
    pub assignee: Option<String>,
    pub sfdc_cases_counter: u64,
    pub sfdc_cases_links: Option<Value>,
    pub sfdc_cases_open: u64,
    pub target_versions: Vec<String>,
    #[serde(flatten)]
    pub lineage: Lineage,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub links: Vec<LinkEdge>,
    pub labels: Vec<String>,
    pub components: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub verified_status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub verified_date: Option<String>,
    /// Raw history, completed from the changelog endpoint when truncated.
    #[serde(skip)]
    pub history: Vec<ChangelogEntry>,
}

impl Ticket {
    pub fn is_backport(&self) -> bool {
        self.lineage.is_backport()
    }

    pub fn cloned_from(&self) -> Option<&str> {
        self.lineage.cloned_from()
    }

    pub fn project_or_unknown(&self) -> &str {
        self.project.as_deref().unwrap_or("Unknown")
    }
}

/// Backport lineage of a ticket.
///
/// `cloned_from` is set if and only if `is_backport` is true; the only way to
/// obtain a backport value is [`Lineage::from_edges`].
#[derive(Serialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct Lineage {
    is_backport: bool,
    cloned_from: Option<String>,
}

impl Lineage {
    /// Derive lineage from the outward clone and depends-on targets.
    ///
    /// A ticket is a backport only when it both clones and depends on the
    /// same ticket.
    pub fn from_edges(clones: Option<&str>, depends_on: Option<&str>) -> Self {
        match (clones, depends_on) {
            (Some(source), Some(dependency)) if source == dependency => Self {
                is_backport: true,
                cloned_from: Some(source.to_string()),
            },
            _ => Self::default(),
        }
    }

    pub fn is_backport(&self) -> bool {
        self.is_backport
    }

    pub fn cloned_from(&self) -> Option<&str> {
        self.cloned_from.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_edges_is_not_backport() {
        let lineage = Lineage::from_edges(None, None);
        assert!(!lineage.is_backport());
        assert!(lineage.cloned_from().is_none());
    }

    #[test]
    fn single_edge_is_not_backport() {
        assert!(!Lineage::from_edges(Some("OCPBUGS-1"), None).is_backport());
        assert!(!Lineage::from_edges(None, Some("OCPBUGS-1")).is_backport());
    }

    #[test]
    fn mismatched_edges_are_not_backport() {
        let lineage = Lineage::from_edges(Some("OCPBUGS-1"), Some("OCPBUGS-2"));
        assert!(!lineage.is_backport());
        assert!(lineage.cloned_from().is_none());
    }

    #[test]
    fn matching_edges_are_backport() {
        let lineage = Lineage::from_edges(Some("OCPBUGS-1"), Some("OCPBUGS-1"));
        assert!(lineage.is_backport());
        assert_eq!(lineage.cloned_from(), Some("OCPBUGS-1"));
    }

    #[test]
    fn lineage_serializes_flat() {
        let ticket = Ticket {
            key: "OCPBUGS-5".to_string(),
            lineage: Lineage::from_edges(Some("OCPBUGS-1"), Some("OCPBUGS-1")),
            ..Default::default()
        };
        let json = serde_json::to_value(&ticket).unwrap();
        assert_eq!(json["is_backport"], true);
        assert_eq!(json["cloned_from"], "OCPBUGS-1");
        assert!(json.get("history").is_none());
        assert!(json.get("verified_date").is_none());
    }

    #[test]
    fn missing_project_falls_back_to_unknown() {
        let ticket = Ticket::default();
        assert_eq!(ticket.project_or_unknown(), "Unknown");
    }
}
