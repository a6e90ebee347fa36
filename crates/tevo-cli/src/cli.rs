use std::path::PathBuf;

use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use tevo_types::{Version, VersionType};

#[derive(Parser, Debug)]
#[command(
    name = "tevo",
    about = "Template evolution: versions, additive updates and deprecations",
    version,
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,

    /// TOML file with merge and deprecation settings
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Parse, compare and step template versions
    #[command(subcommand)]
    Version(VersionCommand),
    /// Validate, merge and summarize template updates
    #[command(subcommand)]
    Update(UpdateCommand),
    /// Query deprecation records
    #[command(subcommand)]
    Deprecation(DeprecationCommand),
    /// Inspect a template's release history
    #[command(subcommand)]
    Release(ReleaseCommand),
}

#[derive(Subcommand, Debug)]
pub enum VersionCommand {
    /// Parse a "v<major>.<minor>" identifier
    Parse { version: String },
    /// Compare two version identifiers (-1, 0 or 1)
    Compare { a: String, b: String },
    /// Classify the transition between two versions
    Classify { from: Version, to: Version },
    /// Compute the next version for a change type
    Next {
        current: Version,
        #[arg(value_name = "TYPE")]
        version_type: VersionType,
    },
}

#[derive(Subcommand, Debug)]
pub enum UpdateCommand {
    /// Validate an update file
    Validate { update: PathBuf },
    /// Merge an update into a snapshot file
    Merge {
        snapshot: PathBuf,
        update: PathBuf,
        /// Accept the update's warnings (modifications, deprecations)
        #[arg(long)]
        acknowledge_warnings: bool,
        /// Write the merged snapshot here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Describe an update for an adopter
    Summary { update: PathBuf },
    /// Is `latest` newer than `current`?
    Check { current: Version, latest: Version },
}

#[derive(Subcommand, Debug)]
pub enum DeprecationCommand {
    /// Adoption status and adopter notice for one template
    Status {
        template: String,
        /// JSON array of deprecation records
        #[arg(long)]
        records: PathBuf,
        /// Evaluate deadlines at this instant (RFC 3339) instead of now
        #[arg(long)]
        now: Option<DateTime<Utc>>,
    },
    /// Show the deprecation trigger thresholds
    Thresholds,
}

#[derive(Subcommand, Debug)]
pub enum ReleaseCommand {
    /// Show the latest release
    Latest { history: PathBuf },
    /// Changelog between two versions, `from` exclusive
    Changelog {
        history: PathBuf,
        #[arg(long)]
        from: Version,
        #[arg(long)]
        to: Version,
    },
}
