use std::path::Path;

use colored::Colorize;
use tabled::{Table, Tabled, settings::Style};

use crate::cli::OutputFormat;
use crate::error::Result;
use crate::types::{Counters, Report};

#[derive(Tabled)]
struct CountRow {
    #[tabled(rename = "Metric")]
    metric: &'static str,
    #[tabled(rename = "Count")]
    count: usize,
}

#[derive(Tabled)]
struct ProjectRow {
    #[tabled(rename = "Project")]
    project: String,
    #[tabled(rename = "Tickets")]
    tickets: usize,
}

#[derive(Tabled)]
struct BackportRow {
    #[tabled(rename = "Key")]
    key: String,
    #[tabled(rename = "Summary")]
    summary: String,
    #[tabled(rename = "Cloned From")]
    cloned_from: String,
    #[tabled(rename = "Target Versions")]
    target_versions: String,
    #[tabled(rename = "Status")]
    status: String,
}

#[derive(Tabled)]
struct TimingRow {
    #[tabled(rename = "Ticket")]
    ticket: String,
    #[tabled(rename = "PR")]
    pr: String,
    #[tabled(rename = "Merged")]
    merged_at: String,
    #[tabled(rename = "Transition")]
    transition: String,
    #[tabled(rename = "Hours")]
    hours: f64,
}

/// Write the report in `format` to `path`, or to stdout.
pub fn emit(report: &Report, format: OutputFormat, path: Option<&Path>) -> Result<()> {
    let rendered = match format {
        OutputFormat::Json => serde_json::to_string_pretty(report)?,
        OutputFormat::Table => render_table(report),
    };

    match path {
        Some(path) => {
            std::fs::write(path, rendered + "\n")?;
            tracing::info!(path = %path.display(), "report written");
        }
        None => println!("{rendered}"),
    }
    Ok(())
}

pub fn render_table(report: &Report) -> String {
    let summary = &report.summary;
    let mut sections = vec![format!(
        "{} {} ({} to {})",
        "Contributions of".bold(),
        summary.developer_email.as_str().bold().cyan(),
        summary.period.start,
        summary.period.end
    )];

    sections.push(heading("Summary"));
    sections.push(table(count_rows(&summary.counts)));

    if !summary.project_breakdown.is_empty() {
        sections.push(heading("Reported by project"));
        sections.push(table(summary.project_breakdown.iter().map(|(project, tickets)| ProjectRow {
            project: project.clone(),
            tickets: *tickets,
        })));
    }

    if !report.backport_tickets.is_empty() {
        sections.push(heading("Backports"));
        sections.push(table(report.backport_tickets.iter().map(|b| BackportRow {
            key: b.key.clone(),
            summary: truncate(b.summary.as_deref().unwrap_or("-"), 50),
            cloned_from: b.cloned_from.clone(),
            target_versions: b.target_versions.join(", "),
            status: b.status.clone().unwrap_or_else(|| "-".to_string()),
        })));
    }

    if !report.pr_to_transition_timing.is_empty() {
        sections.push(heading("PR merge to transition"));
        sections.push(table(report.pr_to_transition_timing.iter().map(|t| TimingRow {
            ticket: t.ticket.clone(),
            pr: t
                .pr_number
                .map(|n| format!("#{n}"))
                .or_else(|| t.pr_url.clone())
                .unwrap_or_else(|| "-".to_string()),
            merged_at: t.merged_at.clone(),
            transition: format!(
                "{} -> {}",
                t.transition_from.as_deref().unwrap_or("?"),
                t.transition_to.as_deref().unwrap_or("?")
            ),
            hours: t.hours_between,
        })));
    }

    sections.join("\n\n")
}

fn count_rows(counts: &Counters) -> Vec<CountRow> {
    [
        ("Tickets reported", counts.tickets_reported),
        ("Tickets closed as done", counts.tickets_closed_as_done),
        ("Tickets verified", counts.tickets_verified),
        ("Backport tickets", counts.backport_tickets),
        ("Case-linked tickets", counts.sfdc_linked_tickets),
        ("Comments", counts.total_comments),
        ("Status updates", counts.total_status_updates),
    ]
    .into_iter()
    .map(|(metric, count)| CountRow { metric, count })
    .collect()
}

fn heading(title: &str) -> String {
    title.bold().underline().to_string()
}

fn table<R: Tabled>(rows: impl IntoIterator<Item = R>) -> String {
    Table::new(rows).with(Style::rounded()).to_string()
}

/// Truncate a string with ellipsis
pub fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{kept}...")
    }
}
