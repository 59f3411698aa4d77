use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "pantry",
    about = "KitchenPantry design-token governance, coverage and export toolchain",
    version
)]
pub struct Cli {
    /// Project root; token files and source globs resolve against it
    #[arg(long, global = true, default_value = ".")]
    pub root: PathBuf,

    /// Toolchain config (defaults to <root>/pantry-tokens.toml when present)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Emit debug logs on stderr
    #[arg(long, global = true)]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Check token files against the authoring rules
    Governance {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Measure token usage and hardcoded-value coverage across sources
    Coverage {
        /// Output as JSON
        #[arg(long)]
        json: bool,

        /// Report directory (defaults to output.report_dir)
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// Prepend a dated section of token changes to the changelog
    Changelog {
        /// Revision to diff against (defaults to changelog.revision)
        #[arg(long)]
        revision: Option<String>,

        /// Section date as YYYY-MM-DD (defaults to today)
        #[arg(long)]
        date: Option<String>,
    },

    /// Report or remove token declarations nothing uses
    Optimize {
        #[arg(value_enum, default_value = "analyze")]
        mode: ModeArg,

        /// Output directory (defaults to optimizer.output_dir)
        #[arg(long)]
        output: Option<PathBuf>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Generate design-tokens.json, tokens.css and _tokens.scss
    Export {
        /// Output directory (defaults to output.export_dir)
        #[arg(long)]
        output: Option<PathBuf>,

        /// Run governance only; write nothing
        #[arg(long)]
        validate_only: bool,
    },

    /// Validate form schemas and table columns against entity expectations
    SchemaValidate {
        /// Markdown report path (defaults to schema.report_path)
        #[arg(long)]
        report: Option<PathBuf>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Aggregate governance, coverage and schema results into a gate verdict
    Gate {
        /// Report directory (defaults to output.report_dir)
        #[arg(long)]
        output: Option<PathBuf>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum ModeArg {
    Analyze,
    Optimize,
}
