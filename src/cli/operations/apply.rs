use clap::Args;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::core::batch::{ApplyOutcome, BatchEntry, BatchReport, BatchUpdater, RawBatchEntry, RawId};
use crate::core::Database;
use crate::error::{AltFillError, BatchError, FileSystemError, Result};
use crate::services::SimpleServices;
use crate::utils::progress::{ProgressMessages, ProgressUtils};

#[derive(Args)]
pub struct ApplyArgs {
    /// Batch file path (JSON, TOML, or CSV)
    #[arg(value_name = "FILE")]
    file: PathBuf,

    /// Run every check but write nothing
    #[arg(long)]
    dry_run: bool,

    /// Write a JSON report of every entry to this file
    #[arg(short, long)]
    output: Option<PathBuf>,
}

/// Report written with `--output`
#[derive(Serialize)]
struct ApplyReportFile<'a> {
    source: String,
    applied_at: String,
    #[serde(flatten)]
    report: &'a BatchReport,
}

pub async fn execute(args: ApplyArgs, services: &SimpleServices) -> Result<()> {
    info!("📋 Processing batch file: {}", args.file.display());

    if !args.file.exists() {
        return Err(FileSystemError::PathNotFound { path: args.file.clone() }.into());
    }

    let batch = load_batch_file(&args.file)?;
    info!(
        "📥 Loaded {} entries ({} dropped)",
        batch.entries.len(),
        batch.rows - batch.entries.len()
    );
    let entries = batch.entries;

    let db = services.create_database().await?;
    let report = run_batch(&db, &entries, args.dry_run).await?;

    if let Some(output_path) = &args.output {
        let file = ApplyReportFile {
            source: args.file.display().to_string(),
            applied_at: chrono::Utc::now().to_rfc3339(),
            report: &report,
        };
        fs::write(output_path, serde_json::to_string_pretty(&file)?)?;
        info!("📋 Batch report saved to {}", output_path.display());
    }

    print_summary(&report);
    Ok(())
}

/// Applies entries with a progress bar; shared with `autofill`.
pub async fn run_batch(
    store: &Database,
    entries: &[BatchEntry],
    dry_run: bool,
) -> Result<BatchReport> {
    let pb = ProgressUtils::create_batch_progress(entries.len() as u64);
    let updater = BatchUpdater::dry_run(dry_run);

    let report = updater
        .apply_batch(store, entries, |result| {
            pb.set_message(ProgressMessages::applying(result.entry.asset_id.0));
            pb.inc(1);
        })
        .await;

    match &report {
        Ok(_) => pb.finish_with_message(ProgressMessages::COMPLETED),
        Err(_) => pb.abandon(),
    }

    report
}

pub fn print_summary(report: &BatchReport) {
    if report.dry_run {
        println!("\n🧪 DRY RUN - nothing was written");
    }
    println!("\n📊 Batch Summary:");
    println!("  ✅ Updated: {}", report.updated);
    println!("  ⏭️  Skipped: {}", report.skipped);

    for result in report.results.iter().filter(|r| r.outcome.skipped()) {
        if let ApplyOutcome::Skipped { reason } = &result.outcome {
            println!("     #{} {}", result.entry.asset_id, reason);
        }
    }
}

/// Validated entries plus the number of rows the file contained
struct LoadedBatch {
    rows: usize,
    entries: Vec<BatchEntry>,
}

impl LoadedBatch {
    fn from_raws(raws: Vec<RawBatchEntry>) -> Self {
        Self {
            rows: raws.len(),
            entries: BatchEntry::validate_all(&raws),
        }
    }
}

/// JSON batches are either a list of entries or a form-style submission:
/// `{"ids": [..], "modes": {"<id>": "save"}, "labels": {"<id>": ".."}}`.
#[derive(Deserialize)]
#[serde(untagged)]
enum JsonBatch {
    Entries(Vec<RawBatchEntry>),
    Submission {
        ids: Vec<RawId>,
        #[serde(default)]
        modes: HashMap<String, String>,
        #[serde(default)]
        labels: HashMap<String, String>,
    },
}

fn load_batch_file(file_path: &Path) -> Result<LoadedBatch> {
    let content = fs::read_to_string(file_path)?;
    let extension = file_path.extension().and_then(|s| s.to_str()).unwrap_or("");

    match extension.to_lowercase().as_str() {
        "json" => match serde_json::from_str::<JsonBatch>(&content).map_err(BatchError::Json)? {
            JsonBatch::Entries(raws) => Ok(LoadedBatch::from_raws(raws)),
            JsonBatch::Submission { ids, modes, labels } => {
                let ids: Vec<String> = ids.iter().map(RawId::key).collect();
                Ok(LoadedBatch {
                    rows: ids.len(),
                    entries: BatchEntry::from_submission(&ids, &modes, &labels),
                })
            }
        },
        "toml" => {
            #[derive(Deserialize)]
            struct BatchFile {
                #[serde(default)]
                entries: Vec<RawBatchEntry>,
            }
            let batch_file: BatchFile = toml::from_str(&content).map_err(BatchError::Toml)?;
            Ok(LoadedBatch::from_raws(batch_file.entries))
        }
        "csv" => Ok(LoadedBatch::from_raws(parse_csv(&content))),
        _ => Err(AltFillError::Batch(BatchError::UnsupportedFormat {
            path: file_path.to_path_buf(),
        })),
    }
}

/// `asset_id,mode,label`; the label is the remainder of the line and may
/// contain commas. A first row whose first field is not a number is a header.
fn parse_csv(content: &str) -> Vec<RawBatchEntry> {
    let mut lines = content.lines().peekable();

    if let Some(first) = lines.peek() {
        let first_field = unquote(first.split(',').next().unwrap_or(""));
        if !first_field.is_empty() && first_field.parse::<i64>().is_err() {
            lines.next();
        }
    }

    lines.filter_map(parse_csv_line).collect()
}

fn parse_csv_line(line: &str) -> Option<RawBatchEntry> {
    if line.trim().is_empty() {
        return None;
    }

    let mut fields = line.splitn(3, ',').map(unquote);
    let asset_id = fields.next().filter(|s| !s.is_empty());

    if asset_id.is_none() {
        warn!("Invalid CSV line (need at least asset_id): {}", line);
    }

    Some(RawBatchEntry {
        asset_id: asset_id.map(RawId::Text),
        mode: fields.next(),
        label: fields.next(),
    })
}

/// Trims a field and, when it is wrapped in quotes, removes them and
/// collapses `""` to `"`.
fn unquote(field: &str) -> String {
    let field = field.trim();
    match field.strip_prefix('"').and_then(|f| f.strip_suffix('"')) {
        Some(inner) => inner.replace("\"\"", "\""),
        None => field.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::batch::Mode;
    use crate::core::models::AssetId;

    fn temp_file(name: &str, content: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("altfill-test-{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join(name);
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_parse_csv_with_header_and_commas() {
        let raws = parse_csv("asset_id,mode,label\n7,save,Cats, dogs and birds\n8,skip\n\n,save,orphan\n");
        let entries = BatchEntry::validate_all(&raws);

        assert_eq!(raws.len(), 3);
        assert_eq!(
            entries,
            vec![
                BatchEntry::save(AssetId(7), "Cats, dogs and birds"),
                BatchEntry { asset_id: AssetId(8), mode: Mode::Skip, label: String::new() },
            ]
        );
    }

    #[test]
    fn test_parse_csv_without_header() {
        let raws = parse_csv("\"3\",\"save\",\"Quoted\"");
        let entries = BatchEntry::validate_all(&raws);
        assert_eq!(entries, vec![BatchEntry::save(AssetId(3), "Quoted")]);
    }

    #[test]
    fn test_parse_csv_unescapes_doubled_quotes() {
        let raws = parse_csv("4,save,\"He said \"\"hi\"\"\"\n5,save,plain \"\"as is\"\"");
        let entries = BatchEntry::validate_all(&raws);
        assert_eq!(
            entries,
            vec![
                BatchEntry::save(AssetId(4), "He said \"hi\""),
                BatchEntry::save(AssetId(5), "plain \"\"as is\"\""),
            ]
        );
    }

    #[test]
    fn test_load_json_batch() {
        let path = temp_file(
            "batch.json",
            r#"[
                {"asset_id": 1, "mode": "save", "label": "One"},
                {"asset_id": "2", "label": "Two"},
                {"mode": "save", "label": "No id"}
            ]"#,
        );
        let batch = load_batch_file(&path).unwrap();
        assert_eq!(batch.rows, 3);
        assert_eq!(batch.entries.len(), 2);
        assert_eq!(batch.entries[0], BatchEntry::save(AssetId(1), "One"));
        assert_eq!(batch.entries[1].mode, Mode::Skip);
    }

    #[test]
    fn test_load_json_submission() {
        let path = temp_file(
            "submission.json",
            r#"{
                "ids": [10, "11", "oops"],
                "modes": {"10": "save", "11": "bogus"},
                "labels": {"10": "Ten", "11": "Eleven"}
            }"#,
        );
        let batch = load_batch_file(&path).unwrap();
        assert_eq!(batch.rows, 3);
        assert_eq!(
            batch.entries,
            vec![
                BatchEntry::save(AssetId(10), "Ten"),
                BatchEntry { asset_id: AssetId(11), mode: Mode::Skip, label: "Eleven".to_string() },
            ]
        );
    }

    #[test]
    fn test_load_toml_batch() {
        let path = temp_file(
            "batch.toml",
            r#"
                [[entries]]
                asset_id = 5
                mode = "save"
                label = "Five"
            "#,
        );
        let batch = load_batch_file(&path).unwrap();
        assert_eq!(batch.entries, vec![BatchEntry::save(AssetId(5), "Five")]);
    }

    #[test]
    fn test_unsupported_extension() {
        let path = temp_file("batch.xml", "<entries/>");
        assert!(matches!(
            load_batch_file(&path),
            Err(AltFillError::Batch(BatchError::UnsupportedFormat { .. }))
        ));
    }
}
