use std::collections::BTreeMap;

use crate::types::{
    BackportTicket, CaseLinkedTicket, Counters, Period, Report, Summary, Ticket, TicketActivity,
    TimingRecord,
};
use crate::window::DateWindow;

/// Everything a report is folded from.
#[derive(Debug, Default)]
pub struct ReportInput {
    pub reported: Vec<Ticket>,
    pub closed: Vec<Ticket>,
    pub verified: Vec<Ticket>,
    pub backports: Vec<BackportTicket>,
    pub activity: BTreeMap<String, TicketActivity>,
    pub timings: Vec<TimingRecord>,
}

pub fn build(email: &str, window: &DateWindow, input: ReportInput) -> Report {
    let case_linked: Vec<CaseLinkedTicket> = input
        .reported
        .iter()
        .chain(&input.closed)
        .filter(|t| t.sfdc_cases_counter > 0)
        .map(CaseLinkedTicket::from)
        .collect();

    let (total_comments, total_status_updates) = input
        .reported
        .iter()
        .chain(&input.closed)
        .filter_map(|t| input.activity.get(&t.key))
        .fold((0, 0), |(comments, updates), a| {
            (comments + a.total_comments, updates + a.total_status_updates)
        });

    let summary = Summary {
        developer_email: email.to_string(),
        period: Period {
            start: window.start().to_string(),
            end: window.end().to_string(),
        },
        counts: Counters {
            tickets_reported: input.reported.len(),
            tickets_closed_as_done: input.closed.len(),
            tickets_verified: input.verified.len(),
            backport_tickets: input.backports.len(),
            sfdc_linked_tickets: case_linked.len(),
            total_comments,
            total_status_updates,
        },
        project_breakdown: project_breakdown(&input.reported),
    };

    Report {
        summary,
        tickets_reported: input.reported,
        tickets_closed: input.closed,
        tickets_verified: input.verified,
        backport_tickets: input.backports,
        sfdc_linked_tickets: case_linked,
        activity_by_ticket: input.activity,
        pr_to_transition_timing: input.timings,
    }
}

/// Reported tickets per project, with absent projects under `Unknown`.
pub fn project_breakdown(tickets: &[Ticket]) -> BTreeMap<String, usize> {
    let mut breakdown = BTreeMap::new();
    for ticket in tickets {
        *breakdown
            .entry(ticket.project_or_unknown().to_string())
            .or_insert(0) += 1;
    }
    breakdown
}
