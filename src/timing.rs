//! Correlation of PR merges with later status transitions of the tickets
//! those PRs reference.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, FixedOffset};
use regex::Regex;

use crate::error::Result;
use crate::types::{Change, PrAuthor, PullRequest, TicketActivity, TimingRecord};

/// Timestamp layout of the tracker, e.g. `2025-01-10T05:00:00.000+0000`.
const TRACKER_TIMESTAMP: &str = "%Y-%m-%dT%H:%M:%S%.f%z";

/// Finds ticket keys of the configured projects in free text.
#[derive(Debug, Clone)]
pub struct TicketMatcher {
    pattern: Option<Regex>,
}

impl TicketMatcher {
    pub fn new(prefixes: &[String]) -> Result<Self> {
        if prefixes.is_empty() {
            return Ok(Self { pattern: None });
        }

        let alternatives: Vec<String> = prefixes.iter().map(|p| regex::escape(p)).collect();
        let pattern = Regex::new(&format!(r"\b(?:{})-\d+\b", alternatives.join("|")))?;
        Ok(Self {
            pattern: Some(pattern),
        })
    }

    /// Distinct keys in order of first appearance.
    pub fn find_keys(&self, text: &str) -> Vec<String> {
        let Some(pattern) = &self.pattern else {
            return Vec::new();
        };

        let mut seen = BTreeSet::new();
        pattern
            .find_iter(text)
            .map(|m| m.as_str())
            .filter(|key| seen.insert(*key))
            .map(String::from)
            .collect()
    }
}

/// Ticket key to the PRs mentioning it, in PR input order.
pub fn references<'a>(prs: &'a [PullRequest], matcher: &TicketMatcher) -> BTreeMap<String, Vec<&'a PullRequest>> {
    let mut by_ticket: BTreeMap<String, Vec<&PullRequest>> = BTreeMap::new();
    for pr in prs {
        for key in matcher.find_keys(&pr.text()) {
            by_ticket.entry(key).or_default().push(pr);
        }
    }
    by_ticket
}

/// One record for every (status transition, referencing PR) pair where the
/// transition happened strictly after the merge.
///
/// Every qualifying pair is kept, so a ticket touched by several merged PRs
/// yields one record per PR for each later transition. PRs without a merge
/// timestamp are ignored. A pair with an unparsable timestamp is skipped.
pub fn correlate(
    prs: &[PullRequest],
    activity: &BTreeMap<String, TicketActivity>,
    matcher: &TicketMatcher,
) -> Vec<TimingRecord> {
    if prs.is_empty() {
        tracing::info!("no PR data provided, skipping timing analysis");
        return Vec::new();
    }

    let mut timings = Vec::new();

    for (ticket, referencing) in references(prs, matcher) {
        let Some(ticket_activity) = activity.get(&ticket) else {
            continue;
        };

        for record in &ticket_activity.changelog_entries {
            for change in &record.changes {
                let Change::StatusChange { from, to } = change else {
                    continue;
                };

                for pr in &referencing {
                    let Some(merged_at) = pr.merged_at.as_deref() else {
                        continue;
                    };

                    let hours = match hours_between(merged_at, &record.date) {
                        Ok(hours) => hours,
                        Err(e) => {
                            tracing::warn!(ticket = %ticket, error = %e, "could not parse timestamps");
                            continue;
                        }
                    };

                    if hours > 0.0 {
                        tracing::debug!(
                            ticket = %ticket,
                            pr = pr.number,
                            author = pr.author.as_ref().map(PrAuthor::login),
                            hours,
                            "merge precedes transition"
                        );
                        timings.push(TimingRecord {
                            ticket: ticket.clone(),
                            pr_url: pr.url.clone(),
                            pr_number: pr.number,
                            merged_at: merged_at.to_string(),
                            transition_date: record.date.clone(),
                            transition_from: from.clone(),
                            transition_to: to.clone(),
                            hours_between: round_tenths(hours),
                        });
                    }
                }
            }
        }
    }

    tracing::info!(count = timings.len(), "PR to transition timing records");
    timings
}

/// Signed hours from `start` to `end`, unrounded.
fn hours_between(start: &str, end: &str) -> std::result::Result<f64, chrono::ParseError> {
    let start = parse_timestamp(start)?;
    let end = parse_timestamp(end)?;
    Ok((end - start).num_milliseconds() as f64 / 3_600_000.0)
}

fn parse_timestamp(value: &str) -> std::result::Result<DateTime<FixedOffset>, chrono::ParseError> {
    DateTime::parse_from_rfc3339(value).or_else(|_| DateTime::parse_from_str(value, TRACKER_TIMESTAMP))
}

fn round_tenths(hours: f64) -> f64 {
    (hours * 10.0).round() / 10.0
}
