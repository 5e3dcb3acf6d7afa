use std::path::{Path, PathBuf};
use std::sync::Arc;

use likeness_engine::{
    load_csv_records, run, MatchConfig, MatchInput, Mode, Record, SourceConfig,
};

use crate::exit_codes::{EXIT_INVALID_CONFIG, EXIT_REVIEW, EXIT_RUNTIME};

#[derive(Debug)]
pub struct CliError {
    pub code: u8,
    pub message: String,
    pub hint: Option<String>,
}

impl CliError {
    fn invalid_config(msg: impl Into<String>) -> Self {
        Self { code: EXIT_INVALID_CONFIG, message: msg.into(), hint: None }
    }

    fn runtime(msg: impl Into<String>) -> Self {
        Self { code: EXIT_RUNTIME, message: msg.into(), hint: None }
    }
}

/// `lkns run`: load config + sources, run the engine, emit results.
pub fn cmd_run(
    config_path: PathBuf,
    json_output: bool,
    output_file: Option<PathBuf>,
) -> Result<(), CliError> {
    let config_str = std::fs::read_to_string(&config_path)
        .map_err(|e| CliError::runtime(format!("cannot read config: {e}")))?;
    let config = MatchConfig::from_toml(&config_str)
        .map_err(|e| CliError::invalid_config(e.to_string()))?;

    // source files are resolved relative to the config file's directory
    let base_dir = config_path.parent().unwrap_or_else(|| Path::new("."));
    let input = load_input(&config, base_dir)?;

    let result = run(&config, input).map_err(|e| CliError::runtime(e.to_string()))?;

    let json_str = serde_json::to_string_pretty(&result)
        .map_err(|e| CliError::runtime(format!("JSON serialization error: {e}")))?;

    if let Some(ref path) = output_file {
        std::fs::write(path, &json_str)
            .map_err(|e| CliError::runtime(format!("cannot write output: {e}")))?;
        eprintln!("wrote {}", path.display());
    }

    if json_output {
        println!("{json_str}");
    }

    // Human summary to stderr
    let s = &result.summary;
    eprintln!(
        "{} ({}): {} pairs compared: {} matches, {} possible, {} non-matches, {} records skipped",
        result.meta.config_name,
        result.meta.mode,
        s.total_compared,
        s.matches,
        s.possible_matches,
        s.non_matches,
        s.skipped_records,
    );

    if s.possible_matches > 0 {
        return Err(CliError {
            code: EXIT_REVIEW,
            message: format!("{} possible match(es) need review", s.possible_matches),
            hint: Some("inspect the possible_match pairs in the JSON output".into()),
        });
    }

    Ok(())
}

/// `lkns validate`: parse and validate a config without running anything.
pub fn cmd_validate(config_path: PathBuf) -> Result<(), CliError> {
    let config_str = std::fs::read_to_string(&config_path)
        .map_err(|e| CliError::runtime(format!("cannot read config: {e}")))?;
    let config = MatchConfig::from_toml(&config_str)
        .map_err(|e| CliError::invalid_config(e.to_string()))?;

    let lookups: Vec<&str> = config.lookup_properties().map(|p| p.name()).collect();
    eprintln!(
        "valid: '{}' ({}) with {} properties, lookup set [{}]",
        config.name(),
        config.mode().label(),
        config.properties().len(),
        lookups.join(", "),
    );
    Ok(())
}

fn load_input(config: &Arc<MatchConfig>, base_dir: &Path) -> Result<MatchInput, CliError> {
    match config.mode() {
        Mode::Dedup(sources) => {
            if sources.is_empty() {
                return Err(CliError::invalid_config(
                    "config declares no data sources; nothing to match",
                ));
            }
            Ok(MatchInput::Dedup(load_sources(config, base_dir, sources)?))
        }
        Mode::Linkage { group1, group2 } => Ok(MatchInput::Linkage {
            group1: load_sources(config, base_dir, group1)?,
            group2: load_sources(config, base_dir, group2)?,
        }),
    }
}

fn load_sources(
    config: &MatchConfig,
    base_dir: &Path,
    sources: &[SourceConfig],
) -> Result<Vec<Record>, CliError> {
    let mut records = Vec::new();
    for source in sources {
        let path = base_dir.join(&source.file);
        let csv_data = std::fs::read_to_string(&path)
            .map_err(|e| CliError::runtime(format!("cannot read {}: {e}", path.display())))?;
        let loaded = load_csv_records(&source.file, &csv_data, source, config)
            .map_err(|e| CliError::runtime(e.to_string()))?;
        records.extend(loaded);
    }
    Ok(records)
}
