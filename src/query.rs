//! JQL for the three ticket searches of a run.

use crate::config::Verification;
use crate::window::DateWindow;

/// Tickets reported by `email` in the configured projects during the window.
/// `None` when no project is configured.
pub fn reported_jql(email: &str, projects: &[String], window: &DateWindow) -> Option<String> {
    Some(format!(
        "reporter = {} AND ({}) AND created >= {} AND created <= {} ORDER BY created DESC",
        quote(email),
        projects_clause(projects)?,
        quote(window.start()),
        quote(window.end()),
    ))
}

/// Tickets assigned to `email` and resolved as Done during the window.
pub fn closed_jql(email: &str, projects: &[String], window: &DateWindow) -> Option<String> {
    Some(format!(
        "assignee = {} AND ({}) AND resolved >= {} AND resolved <= {} AND resolution = Done ORDER BY resolved DESC",
        quote(email),
        projects_clause(projects)?,
        quote(window.start()),
        quote(window.end()),
    ))
}

/// Tickets moved to their project's verification status by `username`
/// during the window.
///
/// `CHANGED ... BY` only accepts the tracker username, never an email. The
/// `AFTER`/`BEFORE` bounds have to sit inside each `CHANGED` clause. `None`
/// when no verification status is configured.
pub fn verified_jql(username: &str, verification: &Verification, window: &DateWindow) -> Option<String> {
    let clauses: Vec<String> = verification
        .statuses
        .iter()
        .map(|(project, status)| {
            format!(
                "(project = {} AND status CHANGED TO {} BY {} AFTER {} BEFORE {})",
                quote(project),
                quote(status),
                quote(username),
                quote(window.start()),
                quote(window.end()),
            )
        })
        .collect();

    if clauses.is_empty() {
        return None;
    }
    Some(format!("{} ORDER BY updated DESC", clauses.join(" OR ")))
}

fn projects_clause(projects: &[String]) -> Option<String> {
    if projects.is_empty() {
        return None;
    }
    Some(
        projects
            .iter()
            .map(|p| format!("project = {}", quote(p)))
            .collect::<Vec<_>>()
            .join(" OR "),
    )
}

fn quote(value: &str) -> String {
    format!("\"{}\"", value.replace('\\', "\\\\").replace('"', "\\\""))
}
