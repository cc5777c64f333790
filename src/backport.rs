use crate::types::{BackportTicket, Ticket};

/// Backports among the given ticket sets, in input order.
///
/// Lineage is one hop only: a backport of a backport is reported as two
/// independent entries.
pub fn detect<'a>(tickets: impl IntoIterator<Item = &'a Ticket>) -> Vec<BackportTicket> {
    tickets
        .into_iter()
        .filter(|ticket| ticket.is_backport())
        .filter_map(|ticket| {
            let cloned_from = ticket.cloned_from()?;
            Some(BackportTicket {
                key: ticket.key.clone(),
                summary: ticket.summary.clone(),
                cloned_from: cloned_from.to_string(),
                target_versions: ticket.target_versions.clone(),
                status: ticket.status.clone(),
            })
        })
        .collect()
}
