pub mod de;

mod changelog;
mod issue;
mod link;
mod pull_request;
mod report;
mod ticket;
mod user;

pub use changelog::{ChangeItem, ChangelogEntry, Comment, InlineChangelog};
pub use issue::{Issue, NamedRef};
pub use link::{IssueLink, LinkEdge, LinkKind};
pub use pull_request::{PrAuthor, PullRequest};
pub use report::{
    BackportTicket, CaseLinkedTicket, Change, ChangeRecord, CommentRecord, Counters, Period,
    Report, Summary, TicketActivity, TimingRecord,
};
pub use ticket::{Lineage, Ticket};
pub use user::User;
