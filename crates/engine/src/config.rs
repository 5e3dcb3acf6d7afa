use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use serde::Deserialize;

use crate::compare;
use crate::database::{InMemoryStore, RecordStore, SqliteStore};
use crate::error::MatchError;
use crate::lookup::select_lookup_properties;
use crate::property::{Property, PropertyRole};

// ---------------------------------------------------------------------------
// Backend + Mode
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendConfig {
    /// Exhaustive in-memory scan.
    InMemory,
    /// Value-keyed SQLite index. No path means an ephemeral in-memory
    /// database; `overwrite` discards pre-existing index contents and must
    /// be asked for explicitly.
    Sqlite { path: Option<PathBuf>, overwrite: bool },
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self::InMemory
    }
}

/// One configured data source. `columns` remaps property names to CSV
/// headers (identity mapping when absent); `value_separator` splits a cell
/// into multiple field values.
#[derive(Debug, Clone, Default)]
pub struct SourceConfig {
    pub file: String,
    pub columns: HashMap<String, String>,
    pub value_separator: Option<char>,
}

/// Dedup and linkage are mutually exclusive by construction: a
/// configuration is one or the other, never a mix.
#[derive(Debug, Clone)]
pub enum Mode {
    Dedup(Vec<SourceConfig>),
    Linkage { group1: Vec<SourceConfig>, group2: Vec<SourceConfig> },
}

impl Mode {
    pub fn is_dedup(&self) -> bool {
        matches!(self, Self::Dedup(_))
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Dedup(_) => "dedup",
            Self::Linkage { .. } => "linkage",
        }
    }
}

// ---------------------------------------------------------------------------
// MatchConfig
// ---------------------------------------------------------------------------

/// Immutable engine configuration. Built once via [`MatchConfigBuilder`]
/// (or [`MatchConfig::from_toml`]); the lookup set is computed during the
/// build and never mutated afterward, so the configuration can be shared
/// read-only across workers.
#[derive(Debug)]
pub struct MatchConfig {
    name: String,
    properties: Vec<Property>,
    by_name: HashMap<String, usize>,
    threshold: f64,
    maybe_threshold: f64,
    backend: BackendConfig,
    mode: Mode,
    lookups: Vec<usize>,
}

impl MatchConfig {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    pub fn maybe_threshold(&self) -> f64 {
        self.maybe_threshold
    }

    pub fn backend(&self) -> &BackendConfig {
        &self.backend
    }

    pub fn mode(&self) -> &Mode {
        &self.mode
    }

    /// All properties, in configured order.
    pub fn properties(&self) -> &[Property] {
        &self.properties
    }

    pub fn property(&self, name: &str) -> Result<&Property, MatchError> {
        self.by_name
            .get(name)
            .map(|&i| &self.properties[i])
            .ok_or_else(|| MatchError::UnknownProperty(name.to_string()))
    }

    pub fn identity_properties(&self) -> impl Iterator<Item = &Property> {
        self.properties.iter().filter(|p| p.is_identity())
    }

    pub fn matched_properties(&self) -> impl Iterator<Item = &Property> {
        self.properties.iter().filter(|p| p.is_matched())
    }

    /// The blocking-key subset selected at build time, in rank order.
    pub fn lookup_properties(&self) -> impl Iterator<Item = &Property> {
        self.lookups.iter().map(|&i| &self.properties[i])
    }

    /// Instantiate the configured record store.
    pub fn create_store(self: &Arc<Self>) -> Result<Box<dyn RecordStore>, MatchError> {
        match &self.backend {
            BackendConfig::InMemory => Ok(Box::new(InMemoryStore::new(Arc::clone(self)))),
            BackendConfig::Sqlite { path, overwrite } => Ok(Box::new(SqliteStore::open(
                Arc::clone(self),
                path.as_deref(),
                *overwrite,
            )?)),
        }
    }

    pub fn from_toml(input: &str) -> Result<Arc<Self>, MatchError> {
        let raw: RawConfig =
            toml::from_str(input).map_err(|e| MatchError::ConfigParse(e.to_string()))?;
        raw.into_config().map(Arc::new)
    }
}

// ---------------------------------------------------------------------------
// Builder
// ---------------------------------------------------------------------------

pub struct MatchConfigBuilder {
    name: String,
    properties: Vec<Property>,
    threshold: f64,
    maybe_threshold: f64,
    backend: BackendConfig,
    mode: Mode,
}

impl MatchConfigBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            properties: Vec::new(),
            threshold: 0.0,
            maybe_threshold: 0.0,
            backend: BackendConfig::default(),
            mode: Mode::Dedup(Vec::new()),
        }
    }

    pub fn property(mut self, property: Property) -> Self {
        self.properties.push(property);
        self
    }

    pub fn properties(mut self, properties: impl IntoIterator<Item = Property>) -> Self {
        self.properties.extend(properties);
        self
    }

    pub fn threshold(mut self, threshold: f64) -> Self {
        self.threshold = threshold;
        self
    }

    pub fn maybe_threshold(mut self, maybe_threshold: f64) -> Self {
        self.maybe_threshold = maybe_threshold;
        self
    }

    pub fn backend(mut self, backend: BackendConfig) -> Self {
        self.backend = backend;
        self
    }

    pub fn mode(mut self, mode: Mode) -> Self {
        self.mode = mode;
        self
    }

    /// Validate and freeze. Fails atomically: an invalid builder produces
    /// no configuration at all, and the lookup set is computed exactly once
    /// here.
    pub fn build(self) -> Result<MatchConfig, MatchError> {
        if !(0.0..=1.0).contains(&self.threshold) {
            return Err(MatchError::ConfigValidation(format!(
                "threshold must lie in [0, 1], got {}",
                self.threshold
            )));
        }
        if !(0.0..=self.threshold).contains(&self.maybe_threshold) {
            return Err(MatchError::ConfigValidation(format!(
                "maybe_threshold must lie in [0, threshold], got {}",
                self.maybe_threshold
            )));
        }

        let mut by_name = HashMap::with_capacity(self.properties.len());
        for (i, property) in self.properties.iter().enumerate() {
            if by_name.insert(property.name().to_string(), i).is_some() {
                return Err(MatchError::DuplicateProperty(property.name().to_string()));
            }
        }

        if !self.properties.iter().any(|p| p.is_matched()) {
            return Err(MatchError::ConfigValidation(
                "at least one matched property is required".into(),
            ));
        }

        let lookups =
            select_lookup_properties(&self.properties, self.threshold, self.maybe_threshold)?;

        Ok(MatchConfig {
            name: self.name,
            properties: self.properties,
            by_name,
            threshold: self.threshold,
            maybe_threshold: self.maybe_threshold,
            backend: self.backend,
            mode: self.mode,
            lookups,
        })
    }
}

// ---------------------------------------------------------------------------
// TOML layer
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct RawConfig {
    name: Option<String>,
    threshold: f64,
    #[serde(default)]
    maybe_threshold: f64,
    #[serde(default)]
    database: RawDatabase,
    properties: Vec<RawProperty>,
    #[serde(default)]
    sources: Vec<RawSource>,
}

#[derive(Debug, Default, Deserialize)]
struct RawDatabase {
    #[serde(default)]
    backend: RawBackend,
    path: Option<PathBuf>,
    #[serde(default)]
    overwrite: bool,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
enum RawBackend {
    #[default]
    InMemory,
    Sqlite,
}

#[derive(Debug, Deserialize)]
struct RawProperty {
    name: String,
    #[serde(default)]
    role: PropertyRole,
    comparator: Option<String>,
    #[serde(default)]
    low: f64,
    #[serde(default)]
    high: f64,
}

#[derive(Debug, Deserialize)]
struct RawSource {
    group: u8,
    file: String,
    #[serde(default)]
    columns: HashMap<String, String>,
    value_separator: Option<char>,
}

impl RawConfig {
    fn into_config(self) -> Result<MatchConfig, MatchError> {
        let mut properties = Vec::with_capacity(self.properties.len());
        for raw in self.properties {
            let property = match raw.role {
                PropertyRole::Identity => Property::identity(raw.name),
                PropertyRole::Ignored => Property::ignored(raw.name),
                PropertyRole::Matched => {
                    let comparator_name = raw.comparator.as_deref().unwrap_or("exact");
                    let comparator = compare::by_name(comparator_name).ok_or_else(|| {
                        MatchError::ConfigValidation(format!(
                            "property '{}': unknown comparator '{comparator_name}'",
                            raw.name
                        ))
                    })?;
                    Property::matched(raw.name, comparator, raw.low, raw.high)?
                }
            };
            properties.push(property);
        }

        let backend = match self.database.backend {
            RawBackend::InMemory => BackendConfig::InMemory,
            RawBackend::Sqlite => BackendConfig::Sqlite {
                path: self.database.path,
                overwrite: self.database.overwrite,
            },
        };

        let mut pool = Vec::new();
        let mut group1 = Vec::new();
        let mut group2 = Vec::new();
        for raw in self.sources {
            let source = SourceConfig {
                file: raw.file,
                columns: raw.columns,
                value_separator: raw.value_separator,
            };
            match raw.group {
                0 => pool.push(source),
                1 => group1.push(source),
                2 => group2.push(source),
                group => return Err(MatchError::InvalidGroup(group)),
            }
        }
        let mode = match (pool.is_empty(), group1.is_empty() && group2.is_empty()) {
            (false, false) => {
                return Err(MatchError::ConfigValidation(
                    "cannot mix group 0 (dedup) with groups 1/2 (linkage) in one configuration"
                        .into(),
                ))
            }
            (false, true) => Mode::Dedup(pool),
            (true, false) => {
                if group1.is_empty() || group2.is_empty() {
                    return Err(MatchError::ConfigValidation(
                        "record linkage requires sources in both group 1 and group 2".into(),
                    ));
                }
                Mode::Linkage { group1, group2 }
            }
            // no sources at all: records will be handed to the engine directly
            (true, true) => Mode::Dedup(Vec::new()),
        };

        MatchConfigBuilder::new(self.name.unwrap_or_else(|| "unnamed".into()))
            .properties(properties)
            .threshold(self.threshold)
            .maybe_threshold(self.maybe_threshold)
            .backend(backend)
            .mode(mode)
            .build()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
