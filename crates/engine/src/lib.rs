//! `likeness-engine`: probabilistic entity resolution.
//!
//! Pure engine crate: receives pre-loaded records, returns classified pairs.
//! Two jobs: decide which records in one collection denote the same
//! real-world entity (deduplication), or which records across two
//! collections correspond (record linkage).
//!
//! Per-field similarity scores are mapped to probabilities and combined
//! with naive-Bayes odds updating into one match probability, which is
//! banded into a verdict (match / possible match / non-match). A subset of
//! properties, the lookup set, is chosen at configuration time so that a
//! value-keyed index can retrieve every candidate pair that could reach the
//! possible-match band, avoiding all-pairs comparison.

pub mod compare;
pub mod config;
pub mod database;
pub mod engine;
pub mod error;
pub mod lookup;
pub mod matcher;
pub mod model;
pub mod property;

pub use compare::Comparator;
pub use config::{BackendConfig, MatchConfig, MatchConfigBuilder, Mode, SourceConfig};
pub use engine::{load_csv_records, run, run_with_cancel, MatchInput};
pub use error::MatchError;
pub use model::{ClassifiedPair, MatchResult, Record, Verdict};
pub use property::{Property, PropertyRole};
