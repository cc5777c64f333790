use std::sync::OnceLock;

use crate::types::Issue;

/// Learns the target developer's tracker username from person records
/// embedded in fetched issues.
///
/// The username is written at most once per run; every later scan is a no-op.
#[derive(Debug)]
pub struct IdentityDiscovery {
    email: String,
    username: OnceLock<String>,
}

impl IdentityDiscovery {
    pub fn new(email: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            username: OnceLock::new(),
        }
    }

    pub fn username(&self) -> Option<&str> {
        self.username.get().map(String::as_str)
    }

    /// Scan `issues` in order, checking each issue's reporter and then its
    /// assignee, and remember the username of the first record whose email
    /// matches.
    pub fn scan(&self, issues: &[Issue]) -> Option<&str> {
        if let Some(username) = self.username() {
            return Some(username);
        }

        let found = issues.iter().find_map(|issue| {
            [&issue.fields.reporter, &issue.fields.assignee]
                .into_iter()
                .flatten()
                .find(|person| person.has_email(&self.email))
                .and_then(|person| person.name.clone())
        })?;

        let username = self.username.get_or_init(|| found);
        tracing::info!(username = %username, "discovered tracker username");
        Some(username)
    }
}
