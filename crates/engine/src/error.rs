use std::fmt;

#[derive(Debug)]
pub enum MatchError {
    /// TOML parse / deserialization error.
    ConfigParse(String),
    /// Config validation error (bad thresholds, mixed groups, etc.).
    ConfigValidation(String),
    /// Two properties share a name.
    DuplicateProperty(String),
    /// Lookup by a property name that does not exist.
    UnknownProperty(String),
    /// Data-source group outside {0, 1, 2}.
    InvalidGroup(u8),
    /// Even the best-case evidence of every property combined cannot reach
    /// the match threshold, so no pair could ever classify as a match.
    UnreachableThreshold { best: f64, threshold: f64 },
    /// Indexed-store failure.
    Backend(String),
    /// Internal invariant violated (e.g. a comparator score outside [0, 1]).
    Invariant(String),
    /// IO error (file read, etc.).
    Io(String),
}

impl fmt::Display for MatchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ConfigParse(msg) => write!(f, "config parse error: {msg}"),
            Self::ConfigValidation(msg) => write!(f, "config validation error: {msg}"),
            Self::DuplicateProperty(name) => {
                write!(f, "duplicate property name: '{name}'")
            }
            Self::UnknownProperty(name) => write!(f, "unknown property: '{name}'"),
            Self::InvalidGroup(group) => {
                write!(f, "invalid source group {group} (expected 0 for dedup, 1 or 2 for linkage)")
            }
            Self::UnreachableThreshold { best, threshold } => write!(
                f,
                "match threshold {threshold} is unreachable: best achievable probability is {best}"
            ),
            Self::Backend(msg) => write!(f, "backend error: {msg}"),
            Self::Invariant(msg) => write!(f, "internal invariant violated: {msg}"),
            Self::Io(msg) => write!(f, "IO error: {msg}"),
        }
    }
}

impl std::error::Error for MatchError {}

impl From<rusqlite::Error> for MatchError {
    fn from(e: rusqlite::Error) -> Self {
        Self::Backend(e.to_string())
    }
}
