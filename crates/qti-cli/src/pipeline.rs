//! Conversion pipeline: parse, validate, generate, write.
//!
//! Document-level failures (no items, or nothing valid left after
//! validation) abort the conversion; everything item-level was already
//! recovered further down with a warning.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result, bail};
use tracing::info;

use qti_model::{ParseMode, Question};
use qti_package::{MANIFEST_FILENAME, QtiPackage, generate_package};
use qti_parse::parse_document;
use qti_validate::{ValidationReport, validate_questions};

/// One conversion request, all borrowed from the caller.
#[derive(Debug, Clone, Copy)]
pub struct ConversionRequest<'a> {
    pub text: &'a str,
    /// HTML rendering of the same document, for richer item bodies.
    pub html: Option<&'a str>,
    /// Pinned extractor family; `None` classifies from text and filename.
    pub requested: Option<ParseMode>,
    /// Source filename, consulted by the classifier only.
    pub filename: &'a str,
    pub title: &'a str,
}

#[derive(Debug)]
pub struct ConversionOutcome {
    pub questions: Vec<Question>,
    pub report: ValidationReport,
    pub package: QtiPackage,
}

/// Run the full in-memory conversion.
pub fn convert(request: &ConversionRequest<'_>) -> Result<ConversionOutcome> {
    let questions = parse_document(request.text, request.requested, request.filename, request.html)
        .with_context(|| format!("parse {}", request.filename))?;
    info!(questions = questions.len(), "extracted questions");

    let (kept, report) = validate_questions(questions);
    if kept.is_empty() {
        bail!(
            "no valid questions remained after validation ({} dropped)",
            report.dropped_count()
        );
    }
    info!(kept = report.kept, dropped = report.dropped_count(), "validated questions");

    let package = generate_package(&kept, request.title)?;
    info!(documents = package.items.len(), "generated package");

    Ok(ConversionOutcome {
        questions: kept,
        report,
        package,
    })
}

/// Write a package into a flat directory: manifest, assessment test, and
/// every item document side by side. Returns the number of files written.
pub fn write_package(output_dir: &Path, package: &QtiPackage) -> Result<usize> {
    fs::create_dir_all(output_dir)
        .with_context(|| format!("create {}", output_dir.display()))?;

    let manifest_path = output_dir.join(MANIFEST_FILENAME);
    fs::write(&manifest_path, &package.manifest)
        .with_context(|| format!("write {}", manifest_path.display()))?;
    let assessment_path = output_dir.join(qti_package::ASSESSMENT_FILENAME);
    fs::write(&assessment_path, &package.assessment)
        .with_context(|| format!("write {}", assessment_path.display()))?;

    for item in &package.items {
        let path = output_dir.join(&item.filename);
        fs::write(&path, &item.xml).with_context(|| format!("write {}", path.display()))?;
    }
    Ok(package.items.len() + 2)
}

#[cfg(test)]
mod tests {
    use super::*;

    const DOC: &str = "Item ID: 1 A type\nWhat is 2+2?\nA. 3\nB. 4\nAnswer: B";

    fn request(text: &'static str) -> ConversionRequest<'static> {
        ConversionRequest {
            text,
            html: None,
            requested: None,
            filename: "mcq_test.txt",
            title: "Test",
        }
    }

    #[test]
    fn convert_produces_a_package() {
        let outcome = convert(&request(DOC)).unwrap();
        assert_eq!(outcome.questions.len(), 1);
        assert_eq!(outcome.report.dropped_count(), 0);
        assert_eq!(outcome.package.items.len(), 1);
    }

    #[test]
    fn document_level_failure_is_fatal() {
        assert!(convert(&request("hello world")).is_err());
    }

    #[test]
    fn all_invalid_questions_is_fatal() {
        // Parses, but the missing answer fails validation.
        let outcome = convert(&request("Item ID: 1 A type\nStem\nA. x\nB. y"));
        assert!(outcome.is_err());
    }
}
