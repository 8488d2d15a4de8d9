use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::info_span;

use qti_cli::pipeline::{ConversionRequest, convert, write_package};
use qti_model::Question;
use qti_validate::validate_questions;

use crate::cli::{ConvertArgs, ParseArgs};
use crate::types::ConvertResult;

pub fn run_convert(args: &ConvertArgs) -> Result<ConvertResult> {
    let filename = file_name(&args.input);
    let span = info_span!("convert", file = %filename);
    let _guard = span.enter();

    let text = read_input(&args.input)?;
    let html = args.html.as_deref().map(read_input).transpose()?;
    let title = args
        .title
        .clone()
        .unwrap_or_else(|| file_stem(&args.input));
    let output_dir = args
        .output_dir
        .clone()
        .unwrap_or_else(|| default_output_dir(&args.input));

    let outcome = convert(&ConversionRequest {
        text: &text,
        html: html.as_deref(),
        requested: args.question_type.parse_mode(),
        filename: &filename,
        title: &title,
    })?;

    let mut counts = BTreeMap::new();
    for question in &outcome.questions {
        *counts.entry(question.kind()).or_insert(0) += 1;
    }
    let files_written = if args.dry_run {
        0
    } else {
        write_package(&output_dir, &outcome.package)?
    };

    Ok(ConvertResult {
        title,
        output_dir,
        counts,
        documents: outcome.package.items.len() + 2,
        report: outcome.report,
        files_written,
        dry_run: args.dry_run,
    })
}

/// Parse (and by default validate) a document, printing the question records
/// as JSON to stdout.
pub fn run_parse(args: &ParseArgs) -> Result<Vec<Question>> {
    let filename = file_name(&args.input);
    let span = info_span!("parse", file = %filename);
    let _guard = span.enter();

    let text = read_input(&args.input)?;
    let html = args.html.as_deref().map(read_input).transpose()?;

    let questions = qti_parse::parse_document(
        &text,
        args.question_type.parse_mode(),
        &filename,
        html.as_deref(),
    )
    .with_context(|| format!("parse {filename}"))?;

    let questions = if args.no_validate {
        questions
    } else {
        validate_questions(questions).0
    };
    println!("{}", serde_json::to_string_pretty(&questions)?);
    Ok(questions)
}

fn read_input(path: &Path) -> Result<String> {
    fs::read_to_string(path).with_context(|| format!("read {}", path.display()))
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default()
}

fn file_stem(path: &Path) -> String {
    path.file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| "Assessment".to_string())
}

fn default_output_dir(input: &Path) -> PathBuf {
    let stem = file_stem(input);
    match input.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.join(format!("{stem}_qti")),
        _ => PathBuf::from(format!("{stem}_qti")),
    }
}
