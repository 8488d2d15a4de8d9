use std::collections::BTreeMap;
use std::path::PathBuf;

use qti_model::QuestionKind;
use qti_validate::ValidationReport;

#[derive(Debug)]
pub struct ConvertResult {
    pub title: String,
    pub output_dir: PathBuf,
    pub counts: BTreeMap<QuestionKind, usize>,
    pub documents: usize,
    pub report: ValidationReport,
    pub files_written: usize,
    pub dry_run: bool,
}
