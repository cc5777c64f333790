use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Duration;

use directories::ProjectDirs;
use serde::Deserialize;

use crate::error::{ContribError, Result};

const DEFAULT_JIRA_URL: &str = "https://issues.redhat.com";
const DEFAULT_PROJECTS: [&str; 5] = ["OCPBUGS", "CNTRLPLANE", "HOSTEDCP", "RFE", "OCPSTRAT"];

#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct Config {
    pub jira_url: String,
    pub token: Option<String>,
    /// Projects searched for reported and closed tickets.
    pub projects: Vec<String>,
    /// Key prefixes recognized in PR titles and bodies.
    pub pr_ticket_prefixes: Vec<String>,
    pub fields: FieldIds,
    pub links: LinkTypeIds,
    pub verification: Verification,
    pub rate_limit: RateLimit,
    pub limits: Limits,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            jira_url: DEFAULT_JIRA_URL.to_string(),
            token: None,
            projects: DEFAULT_PROJECTS.iter().map(|p| p.to_string()).collect(),
            pr_ticket_prefixes: ["OCPBUGS", "CNTRLPLANE", "OCPSTRAT", "RFE", "HOSTEDCP"]
                .iter()
                .map(|p| p.to_string())
                .collect(),
            fields: FieldIds::default(),
            links: LinkTypeIds::default(),
            verification: Verification::default(),
            rate_limit: RateLimit::default(),
            limits: Limits::default(),
        }
    }
}

/// Instance-specific custom field ids.
#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct FieldIds {
    pub sfdc_cases_counter: String,
    pub sfdc_cases_links: String,
    pub sfdc_cases_open: String,
    pub target_version: String,
}

impl Default for FieldIds {
    fn default() -> Self {
        Self {
            sfdc_cases_counter: "customfield_12313440".to_string(),
            sfdc_cases_links: "customfield_12313441".to_string(),
            sfdc_cases_open: "customfield_12324540".to_string(),
            target_version: "customfield_12319940".to_string(),
        }
    }
}

/// Issue link type ids for the "clones" and "depends on" relationships.
#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct LinkTypeIds {
    pub clones: String,
    pub depends: String,
}

impl Default for LinkTypeIds {
    fn default() -> Self {
        Self {
            clones: "12310120".to_string(),
            depends: "12311220".to_string(),
        }
    }
}

/// Terminal status that counts as verification, per project.
#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct Verification {
    pub statuses: BTreeMap<String, String>,
    pub fallback: String,
}

impl Default for Verification {
    fn default() -> Self {
        let statuses = [("OCPBUGS", "Verified"), ("CNTRLPLANE", "Closed")]
            .iter()
            .map(|(project, status)| (project.to_string(), status.to_string()))
            .collect();
        Self {
            statuses,
            fallback: "Closed".to_string(),
        }
    }
}

impl Verification {
    pub fn status_for(&self, project: Option<&str>) -> &str {
        project
            .and_then(|p| self.statuses.get(p))
            .unwrap_or(&self.fallback)
    }
}

#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct RateLimit {
    pub max_concurrent: usize,
    pub request_delay_ms: u64,
    pub batch_pause_every: u64,
    pub batch_pause_ms: u64,
    pub cooldown_ms: u64,
}

impl Default for RateLimit {
    fn default() -> Self {
        Self {
            max_concurrent: 3,
            request_delay_ms: 200,
            batch_pause_every: 10,
            batch_pause_ms: 1000,
            cooldown_ms: 30_000,
        }
    }
}

impl RateLimit {
    pub fn request_delay(&self) -> Duration {
        Duration::from_millis(self.request_delay_ms)
    }

    pub fn batch_pause(&self) -> Duration {
        Duration::from_millis(self.batch_pause_ms)
    }

    pub fn cooldown(&self) -> Duration {
        Duration::from_millis(self.cooldown_ms)
    }
}

/// Result caps per query.
#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct Limits {
    pub reported: usize,
    pub closed: usize,
    pub verified: usize,
    pub changelog: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            reported: 500,
            closed: 500,
            verified: 200,
            changelog: 1000,
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;

        if !config_path.exists() {
            return Ok(Config::default());
        }

        let contents =
            std::fs::read_to_string(&config_path).map_err(|e| ContribError::ConfigRead {
                path: config_path.clone(),
                source: e,
            })?;

        toml::from_str(&contents).map_err(|e| ContribError::ConfigParse {
            path: config_path,
            source: e,
        })
    }

    pub fn config_path() -> Result<PathBuf> {
        ProjectDirs::from("", "", "jira-contrib")
            .map(|dirs| dirs.config_dir().join("config.toml"))
            .ok_or(ContribError::NoConfigDir)
    }

    /// Get the tracker URL, preferring an explicit argument, then `JIRA_URL`.
    pub fn resolve_jira_url(&self, explicit: Option<&str>) -> String {
        explicit
            .map(String::from)
            .or_else(|| std::env::var("JIRA_URL").ok())
            .unwrap_or_else(|| self.jira_url.clone())
    }

    /// Get the bearer token with env vars taking precedence over the config file
    pub fn token(&self) -> Option<String> {
        std::env::var("JIRA_API_TOKEN")
            .or_else(|_| std::env::var("JIRA_TOKEN"))
            .ok()
            .filter(|t| !t.is_empty())
            .or_else(|| self.token.clone())
    }
}
