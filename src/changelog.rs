//! Mining of a developer's own activity from ticket history.

use crate::types::{Change, ChangeItem, ChangeRecord, ChangelogEntry, Comment, CommentRecord, TicketActivity};
use crate::window::DateWindow;

/// Comment bodies in the report are cut to this many characters.
const COMMENT_PREVIEW_CHARS: usize = 200;

/// History entries authored by `email` inside `window`, each with its
/// classified changes. Entries without any change item are dropped.
pub fn mine_history(history: &[ChangelogEntry], email: &str, window: &DateWindow) -> Vec<ChangeRecord> {
    history
        .iter()
        .filter(|entry| entry.author.as_ref().is_some_and(|a| a.has_email(email)))
        .filter(|entry| window.contains(entry.created.as_deref()))
        .filter_map(|entry| {
            let changes: Vec<Change> = entry.items.iter().map(classify).collect();
            (!changes.is_empty()).then(|| ChangeRecord {
                date: entry.created.clone().unwrap_or_default(),
                changes,
            })
        })
        .collect()
}

/// Comments written by `email` inside `window`.
pub fn mine_comments(comments: &[Comment], email: &str, window: &DateWindow) -> Vec<CommentRecord> {
    comments
        .iter()
        .filter(|c| c.author.as_ref().is_some_and(|a| a.has_email(email)))
        .filter(|c| window.contains(c.created.as_deref()))
        .map(|c| CommentRecord {
            date: c.created.clone().unwrap_or_default(),
            body: c.body.chars().take(COMMENT_PREVIEW_CHARS).collect(),
        })
        .collect()
}

/// Per-ticket activity from mined history and optionally fetched comments.
pub fn activity(
    history: &[ChangelogEntry],
    comments: &[Comment],
    email: &str,
    window: &DateWindow,
) -> TicketActivity {
    let changelog_entries = mine_history(history, email, window);
    let comments = mine_comments(comments, email, window);

    TicketActivity {
        total_status_updates: changelog_entries.iter().filter(|r| r.has_status_change()).count(),
        total_comments: comments.len(),
        changelog_entries,
        comments,
    }
}

/// Timestamp of the first history entry in which `username` moved the
/// ticket to `status` inside `window`.
pub fn verification_date<'a>(
    history: &'a [ChangelogEntry],
    username: &str,
    status: &str,
    window: &DateWindow,
) -> Option<&'a str> {
    history
        .iter()
        .filter(|entry| entry.author.as_ref().is_some_and(|a| a.has_name(username)))
        .filter(|entry| window.contains(entry.created.as_deref()))
        .find(|entry| {
            entry
                .items
                .iter()
                .any(|item| item.field == "status" && item.to.as_deref() == Some(status))
        })
        .and_then(|entry| entry.created.as_deref())
}

fn classify(item: &ChangeItem) -> Change {
    match item.field.as_str() {
        "status" => Change::StatusChange {
            from: item.from.clone(),
            to: item.to.clone(),
        },
        "resolution" => Change::ResolutionChange {
            from: item.from.clone(),
            to: item.to.clone(),
        },
        field => Change::FieldUpdate {
            field: field.to_string(),
        },
    }
}
