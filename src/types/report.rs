//! Derived report entities. All of these are pure functions of fetched
//! tickets, history and PR input.

use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::Value;

use super::Ticket;

/// A single classified field change.
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Change {
    StatusChange {
        from: Option<String>,
        to: Option<String>,
    },
    ResolutionChange {
        from: Option<String>,
        to: Option<String>,
    },
    FieldUpdate {
        field: String,
    },
}

/// All changes made by the target developer in one history entry.
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct ChangeRecord {
    pub date: String,
    pub changes: Vec<Change>,
}

impl ChangeRecord {
    pub fn has_status_change(&self) -> bool {
        self.changes
            .iter()
            .any(|change| matches!(change, Change::StatusChange { .. }))
    }
}

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct CommentRecord {
    pub date: String,
    pub body: String,
}

/// Mined activity of the target developer on one ticket.
#[derive(Serialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct TicketActivity {
    pub changelog_entries: Vec<ChangeRecord>,
    pub comments: Vec<CommentRecord>,
    pub total_status_updates: usize,
    pub total_comments: usize,
}

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct BackportTicket {
    pub key: String,
    pub summary: Option<String>,
    pub cloned_from: String,
    pub target_versions: Vec<String>,
    pub status: Option<String>,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct CaseLinkedTicket {
    pub key: String,
    pub summary: Option<String>,
    pub sfdc_cases_counter: u64,
    pub sfdc_cases_links: Option<Value>,
    pub sfdc_cases_open: u64,
}

impl From<&Ticket> for CaseLinkedTicket {
    fn from(ticket: &Ticket) -> Self {
        Self {
            key: ticket.key.clone(),
            summary: ticket.summary.clone(),
            sfdc_cases_counter: ticket.sfdc_cases_counter,
            sfdc_cases_links: ticket.sfdc_cases_links.clone(),
            sfdc_cases_open: ticket.sfdc_cases_open,
        }
    }
}

/// Latency between a PR merge and a later status transition on a ticket it
/// references.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct TimingRecord {
    pub ticket: String,
    pub pr_url: Option<String>,
    pub pr_number: Option<u64>,
    pub merged_at: String,
    pub transition_date: String,
    pub transition_from: Option<String>,
    pub transition_to: Option<String>,
    pub hours_between: f64,
}

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct Period {
    pub start: String,
    pub end: String,
}

#[derive(Serialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct Counters {
    pub tickets_reported: usize,
    pub tickets_closed_as_done: usize,
    pub tickets_verified: usize,
    pub backport_tickets: usize,
    pub sfdc_linked_tickets: usize,
    pub total_comments: usize,
    pub total_status_updates: usize,
}

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct Summary {
    pub developer_email: String,
    pub period: Period,
    #[serde(rename = "summary")]
    pub counts: Counters,
    pub project_breakdown: BTreeMap<String, usize>,
}

/// The complete output document of one run.
#[derive(Serialize, Debug, Clone)]
pub struct Report {
    pub summary: Summary,
    pub tickets_reported: Vec<Ticket>,
    pub tickets_closed: Vec<Ticket>,
    pub tickets_verified: Vec<Ticket>,
    pub backport_tickets: Vec<BackportTicket>,
    pub sfdc_linked_tickets: Vec<CaseLinkedTicket>,
    pub activity_by_ticket: BTreeMap<String, TicketActivity>,
    pub pr_to_transition_timing: Vec<TimingRecord>,
}
