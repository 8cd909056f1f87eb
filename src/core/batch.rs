//! Operator-approved label writes
//!
//! Each entry is applied on its own; there is no transaction spanning
//! several assets. The label is re-read at write time, so an asset that
//! gained a label after the listing was rendered is left alone. A label
//! that is non-empty after trimming is never overwritten.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use tracing::{debug, info, warn};

use crate::core::models::AssetId;
use crate::core::text::{normalize, strip_markup};
use crate::error::Result;
use crate::services::ContentStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    Save,
    Skip,
}

impl Mode {
    /// Anything other than "save" (missing, empty, unknown) is a skip.
    pub fn parse(raw: Option<&str>) -> Self {
        match raw.map(|r| r.trim().to_ascii_lowercase()).as_deref() {
            Some("save") => Mode::Save,
            _ => Mode::Skip,
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mode::Save => write!(f, "save"),
            Mode::Skip => write!(f, "skip"),
        }
    }
}

/// Asset id as it arrives from a batch file: a number or a string.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(untagged)]
pub enum RawId {
    Int(i64),
    Text(String),
}

impl RawId {
    /// The id as a submission map key
    pub fn key(&self) -> String {
        match self {
            RawId::Int(id) => id.to_string(),
            RawId::Text(text) => text.clone(),
        }
    }

    fn parse(&self) -> Option<AssetId> {
        let id = match self {
            RawId::Int(id) => *id,
            RawId::Text(text) => text.trim().parse().ok()?,
        };
        (id > 0).then_some(AssetId(id))
    }
}

/// One unvalidated row of a submission.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct RawBatchEntry {
    #[serde(default)]
    pub asset_id: Option<RawId>,
    #[serde(default)]
    pub mode: Option<String>,
    #[serde(default)]
    pub label: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BatchEntry {
    pub asset_id: AssetId,
    pub mode: Mode,
    pub label: String,
}

impl BatchEntry {
    pub fn save(asset_id: AssetId, label: impl Into<String>) -> Self {
        Self {
            asset_id,
            mode: Mode::Save,
            label: label.into(),
        }
    }

    /// `None` when the row has no usable asset id.
    pub fn from_raw(raw: &RawBatchEntry) -> Option<Self> {
        let asset_id = raw.asset_id.as_ref()?.parse()?;

        Some(Self {
            asset_id,
            mode: Mode::parse(raw.mode.as_deref()),
            label: raw.label.clone().unwrap_or_default(),
        })
    }

    pub fn validate_all(raws: &[RawBatchEntry]) -> Vec<Self> {
        raws.iter()
            .enumerate()
            .filter_map(|(index, raw)| {
                let entry = Self::from_raw(raw);
                if entry.is_none() {
                    warn!("Dropping batch row {}: missing or invalid asset id ({:?})", index + 1, raw.asset_id);
                }
                entry
            })
            .collect()
    }

    /// Typed entries from form-style input: a list of ids plus per-id mode
    /// and label maps, keyed by the id as submitted.
    pub fn from_submission(
        ids: &[String],
        modes: &HashMap<String, String>,
        labels: &HashMap<String, String>,
    ) -> Vec<Self> {
        let raws: Vec<RawBatchEntry> = ids
            .iter()
            .map(|id| RawBatchEntry {
                asset_id: Some(RawId::Text(id.clone())),
                mode: modes.get(id).cloned(),
                label: labels.get(id).cloned(),
            })
            .collect();

        Self::validate_all(&raws)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    /// The asset already has a non-empty label
    AlreadyLabelled,
    /// The operator chose not to save
    OperatorSkip,
    /// Nothing left after markup stripping and normalization
    EmptyLabel,
    UnknownAsset,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            SkipReason::AlreadyLabelled => "already labelled",
            SkipReason::OperatorSkip => "skipped by operator",
            SkipReason::EmptyLabel => "empty label",
            SkipReason::UnknownAsset => "unknown asset",
        };
        write!(f, "{}", text)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum ApplyOutcome {
    Updated { label: String },
    Skipped { reason: SkipReason },
}

impl ApplyOutcome {
    pub fn updated(&self) -> bool {
        matches!(self, ApplyOutcome::Updated { .. })
    }

    pub fn skipped(&self) -> bool {
        !self.updated()
    }

    fn skip(reason: SkipReason) -> Self {
        ApplyOutcome::Skipped { reason }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct EntryResult {
    pub entry: BatchEntry,
    pub outcome: ApplyOutcome,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct BatchReport {
    pub total: usize,
    pub updated: usize,
    pub skipped: usize,
    pub dry_run: bool,
    pub results: Vec<EntryResult>,
}

impl BatchReport {
    fn record(&mut self, result: EntryResult) {
        self.total += 1;
        if result.outcome.updated() {
            self.updated += 1;
        } else {
            self.skipped += 1;
        }
        self.results.push(result);
    }
}

/// Applies batch entries to a store. In dry-run mode every check runs but
/// nothing is written.
#[derive(Debug, Clone, Copy, Default)]
pub struct BatchUpdater {
    dry_run: bool,
}

impl BatchUpdater {
    pub fn dry_run(dry_run: bool) -> Self {
        Self { dry_run }
    }

    pub async fn apply(&self, store: &dyn ContentStore, entry: &BatchEntry) -> Result<ApplyOutcome> {
        let current = store.label(entry.asset_id).await?;
        if current.as_deref().is_some_and(|label| !label.trim().is_empty()) {
            debug!("Asset #{} already labelled, leaving it alone", entry.asset_id);
            return Ok(ApplyOutcome::skip(SkipReason::AlreadyLabelled));
        }

        if entry.mode != Mode::Save {
            return Ok(ApplyOutcome::skip(SkipReason::OperatorSkip));
        }

        let label = normalize(&strip_markup(&entry.label));
        if label.is_empty() {
            debug!("Asset #{} has nothing to write after cleanup", entry.asset_id);
            return Ok(ApplyOutcome::skip(SkipReason::EmptyLabel));
        }

        if store.asset(entry.asset_id).await?.is_none() {
            warn!("Asset #{} does not exist, not writing a label", entry.asset_id);
            return Ok(ApplyOutcome::skip(SkipReason::UnknownAsset));
        }

        if !self.dry_run {
            store.write_label(entry.asset_id, &label).await?;
            info!("Asset #{} labelled \"{}\"", entry.asset_id, label);
        }

        Ok(ApplyOutcome::Updated { label })
    }

    /// Applies every entry in order, calling `on_result` after each one.
    /// A store error aborts the remainder; earlier writes stay committed.
    pub async fn apply_batch<F>(
        &self,
        store: &dyn ContentStore,
        entries: &[BatchEntry],
        mut on_result: F,
    ) -> Result<BatchReport>
    where
        F: FnMut(&EntryResult),
    {
        let mut report = BatchReport {
            dry_run: self.dry_run,
            ..BatchReport::default()
        };

        for entry in entries {
            let outcome = self.apply(store, entry).await?;
            let result = EntryResult {
                entry: entry.clone(),
                outcome,
            };
            on_result(&result);
            report.record(result);
        }

        Ok(report)
    }
}
