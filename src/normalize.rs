use serde_json::Value;

use crate::config::{FieldIds, LinkTypeIds};
use crate::types::de::coerce_count;
use crate::types::{Issue, IssueLink, Lineage, LinkEdge, LinkKind, NamedRef, Ticket, User};

/// Maps raw search results onto [`Ticket`]s using the instance's custom
/// field and link type ids.
#[derive(Debug, Clone)]
pub struct Normalizer {
    fields: FieldIds,
    links: LinkTypeIds,
}

impl Normalizer {
    pub fn new(fields: FieldIds, links: LinkTypeIds) -> Self {
        Self { fields, links }
    }

    pub fn normalize(&self, issue: Issue) -> Ticket {
        let links: Vec<LinkEdge> = issue
            .fields
            .issuelinks
            .iter()
            .filter_map(|link| self.classify(link))
            .collect();
        let lineage = Lineage::from_edges(
            last_target(&links, LinkKind::Clones),
            last_target(&links, LinkKind::DependsOn),
        );

        let fields = &issue.fields;
        let target_versions = fields
            .custom(&self.fields.target_version)
            .map(version_names)
            .unwrap_or_default();

        Ticket {
            summary: fields.summary.clone(),
            status: name_of(&fields.status),
            resolution: name_of(&fields.resolution),
            priority: name_of(&fields.priority),
            issuetype: name_of(&fields.issuetype),
            project: fields.project.as_ref().and_then(|p| p.key.clone()),
            created: fields.created.clone(),
            updated: fields.updated.clone(),
            resolutiondate: fields.resolutiondate.clone(),
            reporter: email_of(&fields.reporter),
            assignee: email_of(&fields.assignee),
            sfdc_cases_counter: coerce_count(fields.custom(&self.fields.sfdc_cases_counter)),
            sfdc_cases_links: fields.custom(&self.fields.sfdc_cases_links).cloned(),
            sfdc_cases_open: coerce_count(fields.custom(&self.fields.sfdc_cases_open)),
            target_versions,
            lineage,
            links,
            labels: fields.labels.clone(),
            components: fields.components.iter().filter_map(|c| c.name.clone()).collect(),
            verified_status: None,
            verified_date: None,
            history: issue.changelog.map(|c| c.histories).unwrap_or_default(),
            key: issue.key,
        }
    }

    /// Classify one link by type id and direction. Links of other types, or
    /// without a target key, are ignored.
    fn classify(&self, link: &IssueLink) -> Option<LinkEdge> {
        let type_id = link.link_type.as_ref()?.id.as_deref()?;

        let (outward, inward) = if type_id == self.links.clones {
            (LinkKind::Clones, LinkKind::IsClonedBy)
        } else if type_id == self.links.depends {
            (LinkKind::DependsOn, LinkKind::IsDependedOnBy)
        } else {
            return None;
        };

        if let Some(issue) = &link.outward_issue {
            return Some(LinkEdge {
                kind: outward,
                target: issue.key.clone()?,
            });
        }
        link.inward_issue.as_ref().and_then(|issue| {
            Some(LinkEdge {
                kind: inward,
                target: issue.key.clone()?,
            })
        })
    }
}

fn last_target(links: &[LinkEdge], kind: LinkKind) -> Option<&str> {
    links
        .iter()
        .rev()
        .find(|edge| edge.kind == kind)
        .map(|edge| edge.target.as_str())
}

fn name_of(named: &Option<NamedRef>) -> Option<String> {
    named.as_ref().and_then(|n| n.name.clone())
}

fn email_of(user: &Option<User>) -> Option<String> {
    user.as_ref().and_then(|u| u.email_address.clone())
}

fn version_names(value: &Value) -> Vec<String> {
    match value {
        Value::Array(versions) => versions
            .iter()
            .filter(|v| v.is_object())
            .map(|v| v.get("name").and_then(Value::as_str).unwrap_or_default().to_string())
            .collect(),
        _ => Vec::new(),
    }
}
