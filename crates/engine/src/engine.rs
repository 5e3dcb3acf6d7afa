use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::config::{MatchConfig, SourceConfig};
use crate::database::RecordStore;
use crate::error::MatchError;
use crate::matcher::classify;
use crate::model::{
    ClassifiedPair, MatchMeta, MatchResult, MatchSummary, Record, Verdict,
};

/// Pre-loaded records, shaped like the configured mode.
pub enum MatchInput {
    Dedup(Vec<Record>),
    Linkage { group1: Vec<Record>, group2: Vec<Record> },
}

impl MatchInput {
    fn label(&self) -> &'static str {
        match self {
            Self::Dedup(_) => "dedup",
            Self::Linkage { .. } => "linkage",
        }
    }
}

/// Run deduplication or record linkage per config. Returns classified
/// pairs plus a summary; non-match pairs are counted but not materialized.
pub fn run(config: &Arc<MatchConfig>, input: MatchInput) -> Result<MatchResult, MatchError> {
    let cancel = AtomicBool::new(false);
    run_with_cancel(config, input, &cancel)
}

/// Like [`run`], but checks `cancel` once per record and stops cleanly
/// (partial results, no partial pairs) when it flips.
pub fn run_with_cancel(
    config: &Arc<MatchConfig>,
    input: MatchInput,
    cancel: &AtomicBool,
) -> Result<MatchResult, MatchError> {
    let mut store = config.create_store()?;
    let mut summary = MatchSummary::default();
    let mut pairs = Vec::new();
    let mode = input.label().to_string();

    match input {
        MatchInput::Dedup(records) => {
            for record in records {
                if cancel.load(Ordering::Relaxed) {
                    break;
                }
                if record.is_empty() {
                    summary.skipped_records += 1;
                    continue;
                }
                // query before indexing: each unordered pair is visited once
                classify_against_store(config, store.as_ref(), &record, &mut summary, &mut pairs)?;
                store.index(record)?;
            }
        }
        MatchInput::Linkage { group1, group2 } => {
            // phase barrier: group 2 is fully indexed before any group 1 query
            for record in group2 {
                if cancel.load(Ordering::Relaxed) {
                    break;
                }
                if record.is_empty() {
                    summary.skipped_records += 1;
                    continue;
                }
                store.index(record)?;
            }
            for record in group1 {
                if cancel.load(Ordering::Relaxed) {
                    break;
                }
                if record.is_empty() {
                    summary.skipped_records += 1;
                    continue;
                }
                classify_against_store(config, store.as_ref(), &record, &mut summary, &mut pairs)?;
            }
        }
    }

    Ok(MatchResult {
        meta: MatchMeta {
            config_name: config.name().to_string(),
            mode,
            engine_version: env!("CARGO_PKG_VERSION").to_string(),
            run_at: chrono::Utc::now().to_rfc3339(),
        },
        summary,
        pairs,
    })
}

fn classify_against_store(
    config: &Arc<MatchConfig>,
    store: &dyn RecordStore,
    record: &Record,
    summary: &mut MatchSummary,
    pairs: &mut Vec<ClassifiedPair>,
) -> Result<(), MatchError> {
    for candidate in store.find_candidates(record)? {
        summary.total_compared += 1;
        let classification = classify(config, &candidate.evidence)?;
        match classification.verdict {
            Verdict::Match => summary.matches += 1,
            Verdict::PossibleMatch => summary.possible_matches += 1,
            Verdict::NonMatch => {
                summary.non_matches += 1;
                continue;
            }
        }
        pairs.push(ClassifiedPair {
            left: record.clone(),
            right: (*candidate.record).clone(),
            probability: classification.probability,
            verdict: classification.verdict,
            evidence: candidate.evidence,
        });
    }
    Ok(())
}

/// Load CSV rows into [`Record`]s for one configured source.
///
/// Each configured property reads from the CSV column of the same name
/// unless the source remaps it; properties absent from the CSV stay empty
/// (missing values carry no evidence). A `value_separator` splits one cell
/// into multiple field values.
pub fn load_csv_records(
    source_name: &str,
    csv_data: &str,
    source: &SourceConfig,
    config: &MatchConfig,
) -> Result<Vec<Record>, MatchError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_reader(csv_data.as_bytes());

    let headers: Vec<String> = reader
        .headers()
        .map_err(|e| MatchError::Io(e.to_string()))?
        .iter()
        .map(|h| h.to_string())
        .collect();

    let mut columns: Vec<(&str, usize)> = Vec::new();
    for property in config.properties() {
        let column = source
            .columns
            .get(property.name())
            .map(String::as_str)
            .unwrap_or(property.name());
        if let Some(i) = headers.iter().position(|h| h == column) {
            columns.push((property.name(), i));
        }
    }
    if columns.is_empty() {
        return Err(MatchError::ConfigValidation(format!(
            "source '{source_name}': no configured property matches any CSV column"
        )));
    }

    let mut records = Vec::new();
    for row in reader.records() {
        let row = row.map_err(|e| MatchError::Io(format!("source '{source_name}': {e}")))?;
        let mut record = Record::new();
        for (property, i) in &columns {
            let raw = row.get(*i).unwrap_or("").trim();
            match source.value_separator {
                Some(sep) => {
                    for part in raw.split(sep) {
                        record.push_value(property, part.trim().to_string());
                    }
                }
                None => record.push_value(property, raw.to_string()),
            }
        }
        records.push(record);
    }
    Ok(records)
}
