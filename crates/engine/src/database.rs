use std::collections::{BTreeSet, HashSet};
use std::path::Path;
use std::sync::Arc;

use rusqlite::{params, Connection};

use crate::config::MatchConfig;
use crate::error::MatchError;
use crate::model::{Evidence, Record};

/// A retrieved candidate: another stored record plus the evidence vector
/// for the (query, candidate) pair.
#[derive(Debug)]
pub struct Candidate {
    pub record: Arc<Record>,
    pub evidence: Vec<Evidence>,
}

/// Record storage keyed by the configuration's lookup properties.
///
/// `index` is idempotent on identical records. `find_candidates` never
/// returns the query record itself and never returns the same candidate
/// twice in one query.
pub trait RecordStore {
    fn index(&mut self, record: Record) -> Result<(), MatchError>;
    fn find_candidates(&self, query: &Record) -> Result<Vec<Candidate>, MatchError>;
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Evidence vector for a record pair: one similarity per matched property
/// present on both records. Multi-valued fields score as the best pairwise
/// similarity.
pub fn score_pair(
    config: &MatchConfig,
    a: &Record,
    b: &Record,
) -> Result<Vec<Evidence>, MatchError> {
    let mut evidence = Vec::new();
    for property in config.matched_properties() {
        let left = a.values(property.name());
        let right = b.values(property.name());
        if left.is_empty() || right.is_empty() {
            continue;
        }
        let mut best = 0.0f64;
        for x in left {
            for y in right {
                let Some(similarity) = property.score(x, y) else { continue };
                if !(0.0..=1.0).contains(&similarity) {
                    return Err(MatchError::Invariant(format!(
                        "comparator for property '{}' returned similarity {similarity} outside [0, 1]",
                        property.name()
                    )));
                }
                if similarity > best {
                    best = similarity;
                }
            }
        }
        evidence.push(Evidence {
            property: property.name().to_string(),
            similarity: best,
        });
    }
    Ok(evidence)
}

// ---------------------------------------------------------------------------
// In-memory backend
// ---------------------------------------------------------------------------

/// Exhaustive backend: compares the query against every stored record.
/// Order-independent by construction; candidates are filtered to those with
/// non-zero similarity on at least one lookup property (all of them when
/// the lookup set is empty).
pub struct InMemoryStore {
    config: Arc<MatchConfig>,
    records: Vec<Arc<Record>>,
    seen: HashSet<Arc<Record>>,
}

impl InMemoryStore {
    pub fn new(config: Arc<MatchConfig>) -> Self {
        Self {
            config,
            records: Vec::new(),
            seen: HashSet::new(),
        }
    }
}

impl RecordStore for InMemoryStore {
    fn index(&mut self, record: Record) -> Result<(), MatchError> {
        let record = Arc::new(record);
        if self.seen.insert(Arc::clone(&record)) {
            self.records.push(record);
        }
        Ok(())
    }

    fn find_candidates(&self, query: &Record) -> Result<Vec<Candidate>, MatchError> {
        let lookup_names: Vec<&str> =
            self.config.lookup_properties().map(|p| p.name()).collect();
        let mut candidates = Vec::new();
        for record in &self.records {
            if record.as_ref() == query {
                continue;
            }
            let evidence = score_pair(&self.config, query, record)?;
            let retrievable = lookup_names.is_empty()
                || evidence
                    .iter()
                    .any(|e| e.similarity > 0.0 && lookup_names.contains(&e.property.as_str()));
            if retrievable {
                candidates.push(Candidate {
                    record: Arc::clone(record),
                    evidence,
                });
            }
        }
        Ok(candidates)
    }

    fn len(&self) -> usize {
        self.records.len()
    }
}

// ---------------------------------------------------------------------------
// SQLite-indexed backend
// ---------------------------------------------------------------------------

/// Indexed backend: lookup-property values key a SQLite table, and a query
/// only ever touches records sharing at least one lookup value with it.
/// This trades recall risk for sub-quadratic cost; the lookup-set selection
/// bounds that risk, assuming clean field values.
pub struct SqliteStore {
    config: Arc<MatchConfig>,
    conn: Connection,
    count: usize,
}

impl SqliteStore {
    /// Open the index at `path`, or an ephemeral in-memory database when no
    /// path is given. `overwrite` drops any pre-existing contents;
    /// irreversible, so it is never the default.
    pub fn open(
        config: Arc<MatchConfig>,
        path: Option<&Path>,
        overwrite: bool,
    ) -> Result<Self, MatchError> {
        let conn = match path {
            Some(p) => Connection::open(p)?,
            None => Connection::open_in_memory()?,
        };
        if overwrite {
            conn.execute_batch(
                "DROP TABLE IF EXISTS record_keys;
                 DROP TABLE IF EXISTS records;",
            )?;
        }
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS records (
                 id INTEGER PRIMARY KEY,
                 body TEXT NOT NULL UNIQUE
             );
             CREATE TABLE IF NOT EXISTS record_keys (
                 property TEXT NOT NULL,
                 value TEXT NOT NULL,
                 record_id INTEGER NOT NULL REFERENCES records (id)
             );
             CREATE INDEX IF NOT EXISTS idx_record_keys
                 ON record_keys (property, value);",
        )?;
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM records", [], |row| row.get(0))?;
        Ok(Self {
            config,
            conn,
            count: count as usize,
        })
    }
}

impl RecordStore for SqliteStore {
    fn index(&mut self, record: Record) -> Result<(), MatchError> {
        let body = serde_json::to_string(&record)
            .map_err(|e| MatchError::Backend(format!("cannot serialize record: {e}")))?;
        let inserted = self
            .conn
            .execute("INSERT OR IGNORE INTO records (body) VALUES (?1)", [&body])?;
        if inserted == 0 {
            // identical record already indexed
            return Ok(());
        }
        let id = self.conn.last_insert_rowid();
        for property in self.config.lookup_properties() {
            for value in record.values(property.name()) {
                self.conn.execute(
                    "INSERT INTO record_keys (property, value, record_id) VALUES (?1, ?2, ?3)",
                    params![property.name(), value, id],
                )?;
            }
        }
        self.count += 1;
        Ok(())
    }

    fn find_candidates(&self, query: &Record) -> Result<Vec<Candidate>, MatchError> {
        // union of ids over every (lookup property, value) of the query
        let mut ids: BTreeSet<i64> = BTreeSet::new();
        let mut stmt = self.conn.prepare(
            "SELECT DISTINCT record_id FROM record_keys WHERE property = ?1 AND value = ?2",
        )?;
        for property in self.config.lookup_properties() {
            for value in query.values(property.name()) {
                let rows = stmt.query_map(params![property.name(), value], |row| {
                    row.get::<_, i64>(0)
                })?;
                for id in rows {
                    ids.insert(id?);
                }
            }
        }

        let mut body_stmt = self.conn.prepare("SELECT body FROM records WHERE id = ?1")?;
        let mut candidates = Vec::new();
        for id in ids {
            let body: String = body_stmt.query_row([id], |row| row.get(0))?;
            let record: Record = serde_json::from_str(&body)
                .map_err(|e| MatchError::Backend(format!("corrupt record body: {e}")))?;
            if record == *query {
                continue;
            }
            let evidence = score_pair(&self.config, query, &record)?;
            candidates.push(Candidate {
                record: Arc::new(record),
                evidence,
            });
        }
        Ok(candidates)
    }

    fn len(&self) -> usize {
        self.count
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
