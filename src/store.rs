//! Question persistence — one JSON file per question plus a run summary,
//! and a library index rebuilt by scanning collection directories.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::question::Question;

/// Outcome of a save run. Per-question failures are counted, never raised;
/// `success` means the directory was writable and nothing failed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SaveReport {
    pub success: bool,
    pub message: String,
    pub saved: usize,
    pub failed: usize,
    pub target_dir: PathBuf,
    pub summary_file: PathBuf,
    pub question_files: Vec<PathBuf>,
}

#[derive(Serialize)]
struct QuestionRecord<'a> {
    #[serde(flatten)]
    question: &'a Question,
    _metadata: RecordMetadata<'a>,
}

#[derive(Serialize)]
struct RecordMetadata<'a> {
    source_file: &'a str,
    extracted_at: &'a str,
    sequence: usize,
}

#[derive(Serialize)]
struct RunSummary<'a> {
    source_file: &'a str,
    extracted_at: &'a str,
    total_questions: usize,
    saved: usize,
    failed: usize,
}

#[derive(Serialize, Deserialize, Default)]
struct LibraryIndex {
    updated_at: String,
    collections: Vec<LibraryEntry>,
}

#[derive(Serialize, Deserialize)]
struct LibraryEntry {
    directory: String,
    source_file: String,
    question_count: usize,
    extracted_at: String,
}

/// Write each question as `Q{NNN}_{type}_{category}.json` under `target_dir`,
/// plus a `questions_summary.json` for the run, then rebuild the library
/// index in the parent directory.
pub fn save_questions(questions: &[Question], target_dir: &Path, source_filename: &str) -> SaveReport {
    let summary_file = target_dir.join("questions_summary.json");
    let mut report = SaveReport {
        success: false,
        message: String::new(),
        saved: 0,
        failed: 0,
        target_dir: target_dir.to_path_buf(),
        summary_file,
        question_files: Vec::new(),
    };

    if let Err(e) = std::fs::create_dir_all(target_dir) {
        tracing::error!(dir = %target_dir.display(), error = %e, "Failed to create question directory");
        report.failed = questions.len();
        report.message = format!("Cannot create {}: {}", target_dir.display(), e);
        return report;
    }

    let extracted_at = chrono::Local::now().to_rfc3339();
    for (i, question) in questions.iter().enumerate() {
        let sequence = i + 1;
        let filename = format!(
            "Q{:03}_{}_{}.json",
            sequence,
            sanitize_component(&question.kind),
            sanitize_component(&question.category)
        );
        let record = QuestionRecord {
            question,
            _metadata: RecordMetadata {
                source_file: source_filename,
                extracted_at: &extracted_at,
                sequence,
            },
        };
        let path = target_dir.join(&filename);
        match write_json(&path, &record) {
            Ok(()) => {
                report.saved += 1;
                report.question_files.push(path);
            }
            Err(e) => {
                tracing::warn!(file = %filename, error = %e, "Failed to save question");
                report.failed += 1;
            }
        }
    }

    let summary = RunSummary {
        source_file: source_filename,
        extracted_at: &extracted_at,
        total_questions: questions.len(),
        saved: report.saved,
        failed: report.failed,
    };
    if let Err(e) = write_json(&report.summary_file, &summary) {
        tracing::warn!(error = %e, "Failed to write run summary");
    }

    rebuild_library_index(target_dir);

    report.success = report.failed == 0;
    report.message = if report.success {
        format!(
            "Saved {} question(s) to {}",
            report.saved,
            target_dir.display()
        )
    } else {
        format!(
            "Saved {} of {} question(s) to {} ({} failed)",
            report.saved,
            questions.len(),
            target_dir.display(),
            report.failed
        )
    };
    tracing::info!(
        dir = %target_dir.display(),
        saved = report.saved,
        failed = report.failed,
        "Questions saved"
    );
    report
}

/// Rebuild `library_index.json` one level above the target directory by
/// scanning every sibling collection's `questions_summary.json`. Index
/// failures are logged, never raised.
fn rebuild_library_index(target_dir: &Path) {
    let Some(parent) = target_dir.parent() else {
        return;
    };
    let entries = match std::fs::read_dir(parent) {
        Ok(entries) => entries,
        Err(e) => {
            tracing::warn!(dir = %parent.display(), error = %e, "Cannot scan library directory");
            return;
        }
    };

    let mut index = LibraryIndex {
        updated_at: chrono::Local::now().to_rfc3339(),
        collections: Vec::new(),
    };
    for entry in entries.flatten() {
        let summary_path = entry.path().join("questions_summary.json");
        let Ok(bytes) = std::fs::read(&summary_path) else {
            continue;
        };
        let Ok(summary) = serde_json::from_slice::<serde_json::Value>(&bytes) else {
            tracing::warn!(path = %summary_path.display(), "Skipping unreadable run summary");
            continue;
        };
        index.collections.push(LibraryEntry {
            directory: entry.file_name().to_string_lossy().into_owned(),
            source_file: summary["source_file"].as_str().unwrap_or_default().to_string(),
            question_count: summary["saved"].as_u64().unwrap_or(0) as usize,
            extracted_at: summary["extracted_at"].as_str().unwrap_or_default().to_string(),
        });
    }
    index.collections.sort_by(|a, b| a.directory.cmp(&b.directory));

    let index_path = parent.join("library_index.json");
    if let Err(e) = write_json(&index_path, &index) {
        tracing::warn!(path = %index_path.display(), error = %e, "Failed to write library index");
    }
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> std::io::Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    std::fs::write(path, json)
}

/// Filenames must stay flat: replace path separators and whitespace.
fn sanitize_component(s: &str) -> String {
    let cleaned: String = s
        .chars()
        .map(|c| {
            if c == '/' || c == '\\' || c.is_whitespace() {
                '_'
            } else {
                c
            }
        })
        .collect();
    if cleaned.is_empty() {
        "unknown".to_string()
    } else {
        cleaned
    }
}
