use std::fs;
use std::path::Path;

use anyhow::{bail, Context};
use chrono::Utc;
use colored::Colorize;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::json;
use tevo_deprecation::{adopter_notice, can_adopt, DeprecationRecord, DeprecationTrigger};
use tevo_merge::{
    has_update_available, merge_detailed, summarize, validate_with, ConfigSnapshot, TemplateUpdate,
};
use tevo_types::{classify, compare_versions, next, ReleaseHistory, TemplateId, Version};

use crate::cli::*;
use crate::config::TevoConfig;

/// Execute a parsed command line.
pub fn run_command(cli: Cli) -> anyhow::Result<()> {
    let config = TevoConfig::load(cli.config.as_deref())?;
    let format = cli.format;
    match cli.command {
        Command::Version(cmd) => cmd_version(cmd, format),
        Command::Update(cmd) => cmd_update(cmd, format, &config),
        Command::Deprecation(cmd) => cmd_deprecation(cmd, format, &config),
        Command::Release(cmd) => cmd_release(cmd, format),
    }
}

fn read_json<T: DeserializeOwned>(path: &Path) -> anyhow::Result<T> {
    let text = fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("parsing {}", path.display()))
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> anyhow::Result<()> {
    let text = serde_json::to_string_pretty(value)?;
    fs::write(path, text + "\n").with_context(|| format!("writing {}", path.display()))
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

// ---------------------------------------------------------------------------
// version
// ---------------------------------------------------------------------------

fn cmd_version(cmd: VersionCommand, format: OutputFormat) -> anyhow::Result<()> {
    match cmd {
        VersionCommand::Parse { version } => {
            let parsed = Version::parse(&version).with_context(|| format!("'{version}' is not a version"))?;
            match format {
                OutputFormat::Json => print_json(&json!({
                    "version": parsed,
                    "major": parsed.major,
                    "minor": parsed.minor,
                })),
                OutputFormat::Text => {
                    println!("{} {} (major {}, minor {})", "✓".green(), parsed.to_string().bold(), parsed.major, parsed.minor);
                    Ok(())
                }
            }
        }
        VersionCommand::Compare { a, b } => {
            let ordering = compare_versions(&a, &b)?;
            let result = ordering as i8;
            match format {
                OutputFormat::Json => print_json(&json!({ "a": a, "b": b, "result": result })),
                OutputFormat::Text => {
                    let symbol = match result {
                        -1 => "<",
                        0 => "=",
                        _ => ">",
                    };
                    println!("{} {} {}", a.bold(), symbol, b.bold());
                    Ok(())
                }
            }
        }
        VersionCommand::Classify { from, to } => {
            let version_type = classify(&from, &to);
            match format {
                OutputFormat::Json => print_json(&json!({ "from": from, "to": to, "type": version_type })),
                OutputFormat::Text => {
                    println!("{} → {}: {}", from, to, version_type.as_str().cyan());
                    Ok(())
                }
            }
        }
        VersionCommand::Next { current, version_type } => {
            let stepped = next(&current, version_type)?;
            match format {
                OutputFormat::Json => print_json(&json!({ "current": current, "type": version_type, "next": stepped })),
                OutputFormat::Text => {
                    println!("{}", stepped.to_string().bold());
                    Ok(())
                }
            }
        }
    }
}

// ---------------------------------------------------------------------------
// update
// ---------------------------------------------------------------------------

fn cmd_update(cmd: UpdateCommand, format: OutputFormat, config: &TevoConfig) -> anyhow::Result<()> {
    match cmd {
        UpdateCommand::Validate { update } => {
            let update: TemplateUpdate = read_json(&update)?;
            let report = validate_with(&update, &config.merge);
            match format {
                OutputFormat::Json => print_json(&report)?,
                OutputFormat::Text => {
                    if report.is_valid() {
                        println!("{} Update {} → {} is valid", "✓".green().bold(), update.from, update.to);
                    } else {
                        println!("{} Update {} → {} is invalid", "✗".red().bold(), update.from, update.to);
                    }
                    for issue in &report.errors {
                        println!("  {} {}", "error:".red(), issue);
                    }
                    for issue in &report.warnings {
                        println!("  {} {}", "warning:".yellow(), issue);
                    }
                }
            }
            if !report.is_valid() {
                bail!("update has {} error(s)", report.errors.len());
            }
            Ok(())
        }
        UpdateCommand::Merge {
            snapshot,
            update,
            acknowledge_warnings,
            output,
        } => {
            let snapshot: ConfigSnapshot = read_json(&snapshot)?;
            let update: TemplateUpdate = read_json(&update)?;
            validate_with(&update, &config.merge).ensure_applicable(acknowledge_warnings)?;
            let outcome = merge_detailed(&snapshot, &update)?;

            if let Some(path) = &output {
                write_json(path, &outcome.snapshot)?;
            }
            match format {
                OutputFormat::Json if output.is_some() => print_json(&json!({
                    "version": outcome.snapshot.version,
                    "applied": outcome.applied,
                    "unchanged": outcome.unchanged,
                    "deferred": outcome.deferred,
                    "skipped": outcome.skipped,
                    "informational": outcome.informational,
                })),
                OutputFormat::Json => print_json(&outcome),
                OutputFormat::Text => {
                    println!(
                        "{} Merged {} → {}",
                        "✓".green().bold(),
                        snapshot.version,
                        outcome.snapshot.version.to_string().bold()
                    );
                    println!("  applied: {}", outcome.applied.len().to_string().green());
                    println!("  unchanged: {}", outcome.unchanged.len());
                    println!("  deferred (optional): {}", outcome.deferred.len().to_string().cyan());
                    println!("  informational: {}", outcome.informational.len());
                    if !outcome.skipped.is_empty() {
                        println!("  skipped (missing target): {}", outcome.skipped.len().to_string().yellow());
                    }
                    match &output {
                        Some(path) => println!("  written to {}", path.display()),
                        None => print_json(&outcome.snapshot)?,
                    }
                    Ok(())
                }
            }
        }
        UpdateCommand::Summary { update } => {
            let update: TemplateUpdate = read_json(&update)?;
            let summary = summarize(&update);
            match format {
                OutputFormat::Json => print_json(&summary),
                OutputFormat::Text => {
                    println!("Update {} → {}", update.from, update.to.to_string().bold());
                    for (title, items) in [
                        ("What's new", &summary.whats_new),
                        ("Stays the same", &summary.stays_the_same),
                        ("Optional", &summary.whats_optional),
                    ] {
                        if items.is_empty() {
                            continue;
                        }
                        println!("\n{}", title.bold());
                        for item in items {
                            println!("  • {item}");
                        }
                    }
                    Ok(())
                }
            }
        }
        UpdateCommand::Check { current, latest } => {
            let available = has_update_available(&current, &latest);
            match format {
                OutputFormat::Json => print_json(&json!({
                    "current": current,
                    "latest": latest,
                    "update_available": available,
                })),
                OutputFormat::Text => {
                    if available {
                        println!("Update available: {} → {}", current, latest.to_string().green().bold());
                    } else {
                        println!("{} {} is up to date", "✓".green(), current);
                    }
                    Ok(())
                }
            }
        }
    }
}

// ---------------------------------------------------------------------------
// deprecation
// ---------------------------------------------------------------------------

fn cmd_deprecation(cmd: DeprecationCommand, format: OutputFormat, config: &TevoConfig) -> anyhow::Result<()> {
    match cmd {
        DeprecationCommand::Status { template, records, now } => {
            let records: Vec<DeprecationRecord> = read_json(&records)?;
            let template_id = TemplateId::from(template);
            let now = now.unwrap_or_else(Utc::now);
            let adoptable = can_adopt(&template_id, &records);
            let notice = adopter_notice(&template_id, &records, now);

            match format {
                OutputFormat::Json => print_json(&json!({
                    "template_id": template_id,
                    "can_adopt": adoptable,
                    "notice": notice,
                })),
                OutputFormat::Text => {
                    let Some(notice) = notice else {
                        println!("{} {} is active and open to new adopters", "✓".green().bold(), template_id);
                        return Ok(());
                    };
                    println!("{} {}", "⚠".yellow().bold(), notice.message.title.yellow().bold());
                    println!("  Template: {} ({})", notice.template_name.bold(), template_id);
                    println!("  {}", notice.message.message);
                    println!("  New adopters: {}", "closed".red());
                    if let Some(alternative) = &notice.alternative {
                        println!(
                            "  Suggested alternative: {} ({})",
                            alternative.template_name.green(),
                            alternative.template_id
                        );
                    }
                    if notice.message.has_migration {
                        println!("  Guided migration: {}", "available".green());
                    }
                    match (notice.end_of_life, notice.days_remaining) {
                        (Some(end_of_life), Some(days)) => println!(
                            "  End of life: {} ({} day(s) remaining)",
                            end_of_life.format("%Y-%m-%d"),
                            days.to_string().bold()
                        ),
                        _ => println!("  No end-of-life date; existing adopters continue"),
                    }
                    Ok(())
                }
            }
        }
        DeprecationCommand::Thresholds => {
            let policy = &config.deprecation;
            match format {
                OutputFormat::Json => print_json(&json!({
                    "policy": policy,
                    "triggers": policy.triggers(),
                })),
                OutputFormat::Text => {
                    println!("{}", "Deprecation triggers".bold());
                    for trigger in policy.triggers() {
                        let threshold = match trigger {
                            DeprecationTrigger::SuperiorReplacement { min_activation_improvement } => {
                                format!("replacement activates ≥ {:.0}% better", min_activation_improvement * 100.0)
                            }
                            DeprecationTrigger::LowActivation {
                                max_activation_rate,
                                min_sample_size,
                            } => format!(
                                "activation below {:.0}% over at least {min_sample_size} adoptions",
                                max_activation_rate * 100.0
                            ),
                            DeprecationTrigger::PatternsChanged { min_usage_decline } => {
                                format!("usage declined ≥ {:.0}%", min_usage_decline * 100.0)
                            }
                        };
                        println!("  {:<28} {}", trigger.reason().as_str().cyan(), threshold);
                    }
                    println!("  {:<28} {}", "security_concern".cyan(), "operator decision");
                    Ok(())
                }
            }
        }
    }
}

// ---------------------------------------------------------------------------
// release
// ---------------------------------------------------------------------------

/// Load a history file and re-check its ordering invariants.
fn load_history(path: &Path) -> anyhow::Result<ReleaseHistory> {
    let stored: ReleaseHistory = read_json(path)?;
    ReleaseHistory::from_releases(stored.template_id().clone(), stored.releases().to_vec())
        .with_context(|| format!("invalid release history in {}", path.display()))
}

fn cmd_release(cmd: ReleaseCommand, format: OutputFormat) -> anyhow::Result<()> {
    match cmd {
        ReleaseCommand::Latest { history } => {
            let history = load_history(&history)?;
            let Some(latest) = history.latest() else {
                bail!("{} has no releases", history.template_id());
            };
            match format {
                OutputFormat::Json => print_json(latest),
                OutputFormat::Text => {
                    println!(
                        "{} {} released {}",
                        history.template_id(),
                        latest.version.to_string().green().bold(),
                        latest.released_at.format("%Y-%m-%d")
                    );
                    println!("  {}", latest.summary);
                    Ok(())
                }
            }
        }
        ReleaseCommand::Changelog { history, from, to } => {
            let history = load_history(&history)?;
            let changes = history.changelog_between(&from, &to);
            match format {
                OutputFormat::Json => print_json(&changes),
                OutputFormat::Text => {
                    println!("{} {} → {}", history.template_id().to_string().bold(), from, to);
                    if changes.is_empty() {
                        println!("  No changes.");
                    }
                    for change in changes {
                        println!(
                            "  [{}] {}: {}",
                            change.kind.as_str().cyan(),
                            change.category.as_str(),
                            change.description
                        );
                    }
                    Ok(())
                }
            }
        }
    }
}
