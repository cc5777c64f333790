//! One analysis run: fetch, normalize, mine, correlate, aggregate.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Arc;

use tokio::task::JoinSet;

use crate::backport;
use crate::changelog;
use crate::client::JiraClient;
use crate::config::{Config, Limits, Verification};
use crate::error::Result;
use crate::identity::IdentityDiscovery;
use crate::normalize::Normalizer;
use crate::query;
use crate::report::{self, ReportInput};
use crate::timing::{self, TicketMatcher};
use crate::types::{Comment, InlineChangelog, Issue, PullRequest, Report, Ticket, TicketActivity};
use crate::window::DateWindow;

/// Inputs of a single run.
#[derive(Debug, Clone)]
pub struct AnalysisRequest {
    pub email: String,
    pub window: DateWindow,
    pub pull_requests: Vec<PullRequest>,
    pub with_comments: bool,
}

pub struct Analyzer {
    client: Arc<JiraClient>,
    normalizer: Normalizer,
    matcher: TicketMatcher,
    projects: Vec<String>,
    verification: Verification,
    limits: Limits,
}

impl Analyzer {
    pub fn new(client: JiraClient, config: &Config) -> Result<Self> {
        Ok(Self {
            client: Arc::new(client),
            normalizer: Normalizer::new(config.fields.clone(), config.links.clone()),
            matcher: TicketMatcher::new(&config.pr_ticket_prefixes)?,
            projects: config.projects.clone(),
            verification: config.verification.clone(),
            limits: config.limits.clone(),
        })
    }

    /// Run the whole pipeline.
    ///
    /// Only an authentication failure aborts; every other fault leaves a
    /// gap in the report and is logged.
    pub async fn run(&self, request: &AnalysisRequest) -> Result<Report> {
        let AnalysisRequest { email, window, .. } = request;
        let identity = IdentityDiscovery::new(email.as_str());

        tracing::info!(email = %email, start = window.start(), end = window.end(), "fetching tickets");
        let reported_jql = query::reported_jql(email, &self.projects, window);
        let closed_jql = query::closed_jql(email, &self.projects, window);
        let (mut reported, mut closed) = tokio::try_join!(
            self.search("reported", reported_jql, self.limits.reported),
            self.search("closed", closed_jql, self.limits.closed),
        )?;
        tracing::info!(count = reported.len(), "tickets reported");
        tracing::info!(count = closed.len(), "tickets closed as done");

        identity.scan(&reported);
        identity.scan(&closed);

        let mut verified = match identity.username() {
            Some(username) => {
                let jql = query::verified_jql(username, &self.verification, window);
                let issues = self.search("verified", jql, self.limits.verified).await?;
                tracing::info!(count = issues.len(), "tickets verified");
                issues
            }
            None => {
                tracing::warn!("could not discover tracker username, skipping verified tickets");
                Vec::new()
            }
        };

        for issues in [&mut reported, &mut closed, &mut verified] {
            self.complete_histories(issues).await?;
        }

        let reported = self.normalize_all(reported);
        let closed = self.normalize_all(closed);
        let mut verified = self.normalize_all(verified);
        if let Some(username) = identity.username() {
            self.annotate_verification(&mut verified, username, window);
        }

        let comments = if request.with_comments {
            self.fetch_comments(reported.iter().chain(&closed).chain(&verified))
                .await?
        } else {
            HashMap::new()
        };

        let activity = self.activity(&[&reported, &closed, &verified], &comments, request);
        let backports = backport::detect(reported.iter().chain(&closed));
        tracing::info!(count = backports.len(), "backport tickets");
        let timings = timing::correlate(&request.pull_requests, &activity, &self.matcher);

        tracing::debug!(requests = self.client.limiter().requests_sent().await, "analysis complete");

        Ok(report::build(
            email,
            window,
            ReportInput {
                reported,
                closed,
                verified,
                backports,
                activity,
                timings,
            },
        ))
    }

    /// Search with inline histories. A query with nothing to match is
    /// skipped instead of being sent as invalid JQL.
    async fn search(&self, kind: &str, jql: Option<String>, cap: usize) -> Result<Vec<Issue>> {
        match jql {
            Some(jql) => self.client.search(&jql, Some("changelog"), cap).await,
            None => {
                tracing::warn!(search = kind, "no projects or statuses configured, skipping search");
                Ok(Vec::new())
            }
        }
    }

    /// Replace truncated inline histories with the full history. A failed
    /// fetch keeps the inline subset.
    async fn complete_histories(&self, issues: &mut [Issue]) -> Result<()> {
        let mut tasks = JoinSet::new();

        for (index, issue) in issues.iter().enumerate() {
            if !issue.changelog.as_ref().is_some_and(InlineChangelog::is_truncated) {
                continue;
            }
            let client = Arc::clone(&self.client);
            let key = issue.key.clone();
            let cap = self.limits.changelog;
            tasks.spawn(async move { (index, client.changelog(&key, cap).await) });
        }

        if !tasks.is_empty() {
            tracing::info!(count = tasks.len(), "completing truncated histories");
        }

        while let Some(joined) = tasks.join_next().await {
            let (index, fetched) = match joined {
                Ok(done) => done,
                Err(e) => {
                    tracing::warn!(error = %e, "history task failed");
                    continue;
                }
            };
            let history = fetched?;

            if let Some(inline) = issues.get_mut(index).and_then(|i| i.changelog.as_mut()) {
                if history.len() > inline.histories.len() {
                    inline.histories = history;
                }
            }
        }

        Ok(())
    }

    fn normalize_all(&self, issues: Vec<Issue>) -> Vec<Ticket> {
        issues
            .into_iter()
            .map(|issue| self.normalizer.normalize(issue))
            .collect()
    }

    fn annotate_verification(&self, tickets: &mut [Ticket], username: &str, window: &DateWindow) {
        for ticket in tickets {
            let status = self.verification.status_for(ticket.project.as_deref());
            let date = changelog::verification_date(&ticket.history, username, status, window)
                .map(String::from);
            if date.is_none() {
                tracing::debug!(key = %ticket.key, status, "no verification entry in window");
            }
            ticket.verified_status = Some(status.to_string());
            ticket.verified_date = date;
        }
    }

    /// Comments of every distinct ticket, fetched concurrently.
    async fn fetch_comments<'a>(
        &self,
        tickets: impl Iterator<Item = &'a Ticket>,
    ) -> Result<HashMap<String, Vec<Comment>>> {
        let mut tasks = JoinSet::new();
        let mut seen = HashSet::new();

        for ticket in tickets {
            if !seen.insert(ticket.key.clone()) {
                continue;
            }
            let client = Arc::clone(&self.client);
            let key = ticket.key.clone();
            tasks.spawn(async move {
                let comments = client.comments(&key).await;
                (key, comments)
            });
        }
        tracing::info!(count = tasks.len(), "fetching comments");

        let mut by_ticket = HashMap::new();
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((key, comments)) => {
                    by_ticket.insert(key, comments?);
                }
                Err(e) => tracing::warn!(error = %e, "comment task failed"),
            }
        }
        Ok(by_ticket)
    }

    /// Mined activity keyed by ticket. Later sets overwrite earlier ones on
    /// duplicate keys.
    fn activity(
        &self,
        sets: &[&Vec<Ticket>],
        comments: &HashMap<String, Vec<Comment>>,
        request: &AnalysisRequest,
    ) -> BTreeMap<String, TicketActivity> {
        let mut by_ticket = BTreeMap::new();
        for ticket in sets.iter().flat_map(|set| set.iter()) {
            let ticket_comments = comments.get(&ticket.key).map(Vec::as_slice).unwrap_or_default();
            by_ticket.insert(
                ticket.key.clone(),
                changelog::activity(&ticket.history, ticket_comments, &request.email, &request.window),
            );
        }
        tracing::info!(count = by_ticket.len(), "processed ticket histories");
        by_ticket
    }
}
