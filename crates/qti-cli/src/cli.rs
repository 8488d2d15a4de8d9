//! CLI argument definitions.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;

use qti_model::ParseMode;

#[derive(Parser)]
#[command(
    name = "exam2qti",
    version,
    about = "Convert exam text documents to IMS QTI 2.1 packages",
    long_about = "Convert exam text documents (MCQ, EMQ, SAQ, or mixed) into\n\
                  IMS QTI 2.1 packages: item documents, shared stimulus documents,\n\
                  an assessment test, and a content-package manifest."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Adjust log verbosity (-v for debug, -vv for trace, -q for errors only).
    #[command(flatten)]
    pub verbosity: Verbosity<WarnLevel>,

    /// Control ANSI color output (auto, always, never).
    #[command(flatten)]
    pub color: Color,

    /// Explicit log level (overrides -v/-q flags).
    #[arg(long = "log-level", value_enum, global = true)]
    pub log_level: Option<LogLevelArg>,

    /// Log output format (pretty for human, json for machine parsing).
    #[arg(
        long = "log-format",
        value_enum,
        default_value = "pretty",
        global = true
    )]
    pub log_format: LogFormatArg,

    /// Write logs to a file instead of stderr.
    #[arg(long = "log-file", value_name = "PATH", global = true)]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Convert an exam document into a QTI 2.1 package.
    Convert(ConvertArgs),

    /// Parse an exam document and print the extracted questions as JSON.
    Parse(ParseArgs),
}

#[derive(Parser)]
pub struct ConvertArgs {
    /// Path to the exam text document.
    #[arg(value_name = "INPUT")]
    pub input: PathBuf,

    /// Optional HTML rendering of the same document, used for richer item
    /// bodies (tables) but never for parsing decisions.
    #[arg(long = "html", value_name = "PATH")]
    pub html: Option<PathBuf>,

    /// Question type to extract (default: classify from the document).
    #[arg(long = "type", value_enum, default_value = "auto")]
    pub question_type: QuestionTypeArg,

    /// Assessment title (default: the input file stem).
    #[arg(long = "title", value_name = "TITLE")]
    pub title: Option<String>,

    /// Output directory for the package files (default: <INPUT stem>_qti).
    ///
    /// The layout is flat: imsmanifest.xml, assessment.xml, and every item
    /// document side by side, as importers expect.
    #[arg(long = "output-dir", value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Parse and validate without writing output files.
    #[arg(long = "dry-run")]
    pub dry_run: bool,
}

#[derive(Parser)]
pub struct ParseArgs {
    /// Path to the exam text document.
    #[arg(value_name = "INPUT")]
    pub input: PathBuf,

    /// Optional HTML rendering of the same document.
    #[arg(long = "html", value_name = "PATH")]
    pub html: Option<PathBuf>,

    /// Question type to extract (default: classify from the document).
    #[arg(long = "type", value_enum, default_value = "auto")]
    pub question_type: QuestionTypeArg,

    /// Skip validation and print everything the extractors produced.
    #[arg(long = "no-validate")]
    pub no_validate: bool,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum QuestionTypeArg {
    Auto,
    Mcq,
    Emq,
    Saq,
    Mixed,
}

impl QuestionTypeArg {
    /// `None` requests heuristic classification.
    pub fn parse_mode(self) -> Option<ParseMode> {
        match self {
            QuestionTypeArg::Auto => None,
            QuestionTypeArg::Mcq => Some(ParseMode::Mcq),
            QuestionTypeArg::Emq => Some(ParseMode::Emq),
            QuestionTypeArg::Saq => Some(ParseMode::Saq),
            QuestionTypeArg::Mixed => Some(ParseMode::Mixed),
        }
    }
}

/// CLI log level choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogLevelArg {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// CLI log format choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}
