use serde::Deserialize;

/// A person record embedded in issues, changelog entries and comments.
///
/// `name` is the tracker-internal username used by JQL `BY` clauses.
#[derive(Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub name: Option<String>,
    pub email_address: Option<String>,
}

impl User {
    pub fn has_email(&self, email: &str) -> bool {
        self.email_address.as_deref() == Some(email)
    }

    pub fn has_name(&self, name: &str) -> bool {
        self.name.as_deref() == Some(name)
    }
}
