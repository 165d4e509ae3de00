use std::sync::Arc;

use anyhow::{bail, Result};
use chrono::Utc;
use clap::{Parser, Subcommand};
use client_core::{
    CredentialStore, HttpPortalBackend, MissingCredentialStore, PortalBackend, StaticCredentials,
    SubmissionPortal, SubmitError,
};
use shared::{
    domain::{HackCode, PhaseStatus},
    protocol::{HackathonDefinition, Phase, SubmissionRecord, TeamContext},
};

const DEFAULT_SERVER_URL: &str =
    "https://hatchplatform-dcdphngyewcwcuc4.centralindia-01.azurewebsites.net";

#[derive(Parser, Debug)]
struct Args {
    #[arg(long, default_value = DEFAULT_SERVER_URL)]
    server_url: String,
    /// Account email; omit for a read-only unauthenticated view.
    #[arg(long)]
    email: Option<String>,
    #[arg(long)]
    auth_token: Option<String>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Event summary: schedule, fees, team, prizes, sponsors and organisers.
    Overview { hack_code: String },
    /// Per-phase status, deliverables and saved submission values.
    Phases { hack_code: String },
    /// Save deliverables for one phase, e.g. `submit HACK26 0 pdf=https://...`
    Submit {
        hack_code: String,
        phase: usize,
        #[arg(value_parser = parse_field, required = true)]
        fields: Vec<(String, String)>,
    },
    /// Run the plagiarism check against a public repository.
    Runcheck { repository_url: String },
}

fn parse_field(raw: &str) -> Result<(String, String)> {
    let Some((kind, value)) = raw.split_once('=') else {
        bail!("expected type=value, got {raw:?}");
    };
    Ok((kind.to_string(), value.to_string()))
}

fn credentials(args: &Args) -> Arc<dyn CredentialStore> {
    match (&args.email, &args.auth_token) {
        (Some(email), Some(auth_token)) => Arc::new(StaticCredentials {
            email: email.clone(),
            auth_token: auth_token.clone(),
        }),
        _ => Arc::new(MissingCredentialStore),
    }
}

async fn load_portal(args: &Args, hack_code: &str) -> Result<SubmissionPortal> {
    let backend = Arc::new(HttpPortalBackend::new(args.server_url.clone()));
    let mut portal = SubmissionPortal::new(backend, credentials(args), HackCode::from(hack_code));
    portal.load().await?;
    Ok(portal)
}

fn overview_lines(hackathon: &HackathonDefinition, team: Option<&TeamContext>) -> Vec<String> {
    let mut lines = vec![format!("{} [{}]", hackathon.event_name, hackathon.hack_code)];
    if !hackathon.event_tagline.is_empty() {
        lines.push(hackathon.event_tagline.clone());
    }
    if !hackathon.event_description.is_empty() {
        lines.push(hackathon.event_description.clone());
    }
    lines.push(format!(
        "Runs {} to {}",
        hackathon.event_start_date, hackathon.event_end_date
    ));
    if let (Some(opens), Some(closes)) = (
        hackathon.registration_start_date,
        hackathon.registration_end_date,
    ) {
        lines.push(format!("Registration {opens} to {closes}"));
    }
    if !hackathon.mode.is_empty() {
        lines.push(format!(
            "Mode: {}, team size {}",
            hackathon.mode, hackathon.team_size
        ));
    }
    if hackathon.has_fee {
        lines.push(format!("Entry fee: {}", hackathon.fee));
    } else {
        lines.push("Free to enter".to_string());
    }

    match team {
        Some(team) => {
            lines.push(format!("\nTeam: {} ({})", team.team_name, team.team_id));
            for member in &team.members {
                lines.push(format!("  {} <{}> {}", member.name, member.email, member.role));
            }
        }
        None => lines.push("\nNo team for this event.".to_string()),
    }

    if !hackathon.prizes.is_empty() {
        lines.push("\nPrizes:".to_string());
        for prize in &hackathon.prizes {
            lines.push(format!("  {} - {}", prize.title, prize.description));
        }
    }
    if !hackathon.sponsors.is_empty() {
        lines.push("\nSponsors:".to_string());
        for sponsor in &hackathon.sponsors {
            lines.push(format!("  {}", sponsor.name));
        }
    }
    if !hackathon.organisers.is_empty() {
        lines.push("\nOrganisers:".to_string());
        for organiser in &hackathon.organisers {
            lines.push(format!("  {} <{}>", organiser.name, organiser.email));
        }
    }
    lines
}

/// Stored values for one record, sorted by deliverable type so output is
/// stable regardless of map order.
fn submission_lines(record: &SubmissionRecord) -> Vec<String> {
    let mut entries: Vec<_> = record.submissions.iter().collect();
    entries.sort();
    entries
        .into_iter()
        .map(|(kind, value)| format!("  {kind}: {value}"))
        .collect()
}

fn phase_lines(
    index: usize,
    phase: &Phase,
    status: PhaseStatus,
    record: Option<&SubmissionRecord>,
) -> Vec<String> {
    let submitted = if record.is_some() { " (submitted)" } else { "" };
    let mut lines = vec![
        format!("[{index}] {} - {status}{submitted}", phase.name),
        format!("      {} to {}", phase.start_date, phase.end_date),
    ];
    for deliverable in &phase.deliverables {
        lines.push(format!(
            "      requires {}: {}",
            deliverable.kind, deliverable.description
        ));
    }
    if let Some(record) = record {
        lines.push("      Your submission:".to_string());
        for line in submission_lines(record) {
            lines.push(format!("      {line}"));
        }
    }
    lines
}

fn print_overview(portal: &SubmissionPortal) {
    let Some(hackathon) = portal.hackathon() else {
        return;
    };
    for line in overview_lines(hackathon, portal.team()) {
        println!("{line}");
    }
}

fn print_phases(portal: &SubmissionPortal) {
    let Some(hackathon) = portal.hackathon() else {
        return;
    };
    let now = Utc::now();
    for (index, phase) in hackathon.phases.iter().enumerate() {
        let status = client_core::phase_status(phase, now);
        for line in phase_lines(index, phase, status, portal.submission_for(index)) {
            println!("{line}");
        }
    }
}

async fn run_submit(
    args: &Args,
    hack_code: &str,
    phase: usize,
    fields: &[(String, String)],
) -> Result<()> {
    let mut portal = load_portal(args, hack_code).await?;
    portal.select_phase(phase);
    for (kind, value) in fields {
        portal.update_draft_field(kind.clone(), value.clone());
    }

    let now = Utc::now();
    match portal.submit_draft(now).await {
        Ok(()) => {
            println!("Submission Complete!");
            if let Some(record) = portal.submission_for(phase) {
                for line in submission_lines(record) {
                    println!("{line}");
                }
            }
            Ok(())
        }
        Err(SubmitError::MissingTeam) => {
            println!("Join a team first to submit deliverables!");
            Ok(())
        }
        Err(SubmitError::InactiveTeam) => {
            println!("Team inactive. Submissions not allowed.");
            Ok(())
        }
        Err(SubmitError::PhaseClosed(index)) => {
            let phase = portal
                .hackathon()
                .and_then(|hackathon| hackathon.phases.get(index));
            match phase.map(|phase| client_core::phase_status(phase, now)) {
                Some(PhaseStatus::Upcoming) => {
                    println!("Phase hasn't started yet. Come back when it begins!")
                }
                _ => println!("This phase has ended. No more submissions accepted."),
            }
            Ok(())
        }
        Err(err) => Err(err.into()),
    }
}

async fn run_check(args: &Args, repository_url: &str) -> Result<()> {
    let Some(auth_token) = &args.auth_token else {
        bail!("--auth-token is required for runcheck");
    };
    let backend = HttpPortalBackend::new(args.server_url.clone());
    let report = backend.check_plagiarism(repository_url, auth_token).await?;

    println!(
        "{}/{} ({})",
        report.repository.owner, report.repository.name, report.repository.language
    );
    let assessment = &report.analysis.final_assessment;
    println!(
        "Risk: {} ({}, score {:.1})",
        assessment.risk_level, assessment.confidence, assessment.final_score
    );
    println!(
        "  commit patterns {:.1} | inter-repo {:.1} | intra-repo {:.1}",
        assessment.component_scores.commit_patterns,
        assessment.component_scores.inter_repository_similarity,
        assessment.component_scores.intra_repository_similarity
    );
    for indicator in &report.analysis.commit_patterns.indicators {
        println!("  - {indicator}");
    }
    for pair in &report.analysis.intra_repository_similarity.similar_files {
        println!(
            "  similar: {} ~ {} ({:.0}%)",
            pair.file1,
            pair.file2,
            pair.similarity * 100.0
        );
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt().init();
    let args = Args::parse();

    match &args.command {
        Command::Overview { hack_code } => {
            let portal = load_portal(&args, hack_code).await?;
            print_overview(&portal);
        }
        Command::Phases { hack_code } => {
            let portal = load_portal(&args, hack_code).await?;
            print_phases(&portal);
        }
        Command::Submit {
            hack_code,
            phase,
            fields,
        } => run_submit(&args, hack_code, *phase, fields).await?,
        Command::Runcheck { repository_url } => run_check(&args, repository_url).await?,
    }
    Ok(())
}
