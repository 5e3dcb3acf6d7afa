//! End-to-end scenarios driving the public API: configuration through
//! candidate retrieval through classification, on both store backends.

use std::sync::Arc;

use likeness_engine::compare::Exact;
use likeness_engine::config::{BackendConfig, MatchConfigBuilder};
use likeness_engine::engine::{run, MatchInput};
use likeness_engine::model::{Record, Verdict};
use likeness_engine::property::Property;
use likeness_engine::{Comparator, MatchConfig, MatchError};

/// Test comparator with a scripted off-diagonal similarity, so scenarios
/// can pin exact evidence values.
#[derive(Debug)]
struct Scripted {
    unequal: f64,
}

impl Comparator for Scripted {
    fn score(&self, a: &str, b: &str) -> f64 {
        if a == b {
            1.0
        } else {
            self.unequal
        }
    }

    fn name(&self) -> &'static str {
        "scripted"
    }
}

fn person(id: &str, name: &str, mbox: &str) -> Record {
    let mut r = Record::new();
    r.push_value("id", id.into());
    r.push_value("name", name.into());
    r.push_value("mbox", mbox.into());
    r
}

fn name_mbox_config(name_comparator: Arc<dyn Comparator>, backend: BackendConfig) -> Arc<MatchConfig> {
    Arc::new(
        MatchConfigBuilder::new("people")
            .property(Property::identity("id"))
            .property(Property::matched("name", name_comparator, 0.2, 0.88).unwrap())
            .property(Property::matched("mbox", Arc::new(Exact), 0.48, 0.6).unwrap())
            .threshold(0.89)
            .backend(backend)
            .build()
            .unwrap(),
    )
}

#[test]
fn similar_name_and_identical_mbox_is_a_match() {
    // NAME similarity 0.95 → 0.2 + 0.95·0.68 = 0.846; MBOX identical → 0.6;
    // combined ≈ 0.892 ≥ 0.89.
    let config = name_mbox_config(Arc::new(Scripted { unequal: 0.95 }), BackendConfig::InMemory);
    let records = vec![
        person("1", "Jon Smith", "5f4dcc3b"),
        person("2", "John Smith", "5f4dcc3b"),
    ];
    let result = run(&config, MatchInput::Dedup(records)).unwrap();
    assert_eq!(result.summary.matches, 1);
    assert_eq!(result.pairs.len(), 1);
    let pair = &result.pairs[0];
    assert!(pair.probability >= 0.89, "got {}", pair.probability);
    assert_eq!(pair.verdict, Verdict::Match);
}

#[test]
fn dissimilar_name_and_missing_mbox_is_not_a_match() {
    let config = name_mbox_config(Arc::new(Scripted { unequal: 0.0 }), BackendConfig::InMemory);
    let mut a = Record::new();
    a.push_value("id", "1".into());
    a.push_value("name", "Alice Cooper".into());
    let mut b = Record::new();
    b.push_value("id", "2".into());
    b.push_value("name", "Zebulon Pike".into());
    let result = run(&config, MatchInput::Dedup(vec![a, b])).unwrap();
    assert_eq!(result.summary.matches, 0);
    assert!(result.pairs.is_empty());
}

#[test]
fn probability_in_the_maybe_band_is_a_possible_match() {
    // Only the first property yields evidence (0.85); 0.8 ≤ 0.85 < 0.89.
    let config = Arc::new(
        MatchConfigBuilder::new("maybe")
            .property(Property::matched("name", Arc::new(Exact), 0.1, 0.85).unwrap())
            .property(Property::matched("mbox", Arc::new(Exact), 0.48, 0.6).unwrap())
            .threshold(0.89)
            .maybe_threshold(0.8)
            .build()
            .unwrap(),
    );
    let a = Record::from_fields([("id", "1"), ("name", "Alice Smith")]);
    let b = Record::from_fields([("id", "2"), ("name", "Alice Smith")]);
    let result = run(&config, MatchInput::Dedup(vec![a, b])).unwrap();
    assert_eq!(result.summary.possible_matches, 1);
    assert_eq!(result.pairs.len(), 1);
    let pair = &result.pairs[0];
    assert_eq!(pair.verdict, Verdict::PossibleMatch);
    assert!((pair.probability - 0.85).abs() < 1e-9);
}

#[test]
fn backends_agree_on_verdicts_for_retrievable_pairs() {
    let records = vec![
        person("1", "Jon Smith", "5f4dcc3b"),
        person("2", "John Smith", "5f4dcc3b"),
        person("3", "Mary Major", "9b74c989"),
        person("4", "Mary Major", "9b74c989"),
        person("5", "Unrelated Person", "e3d704f3"),
    ];

    let mut verdicts: Vec<Vec<(String, String, Verdict)>> = Vec::new();
    for backend in [
        BackendConfig::InMemory,
        BackendConfig::Sqlite { path: None, overwrite: false },
    ] {
        let config = name_mbox_config(Arc::new(Scripted { unequal: 0.95 }), backend);
        let result = run(&config, MatchInput::Dedup(records.clone())).unwrap();
        let mut pairs: Vec<(String, String, Verdict)> = result
            .pairs
            .iter()
            .map(|p| {
                let mut ids = [
                    p.left.first_value("id").unwrap().to_string(),
                    p.right.first_value("id").unwrap().to_string(),
                ];
                ids.sort();
                let [a, b] = ids;
                (a, b, p.verdict)
            })
            .collect();
        pairs.sort();
        verdicts.push(pairs);
    }
    assert_eq!(verdicts[0], verdicts[1]);
    assert!(!verdicts[0].is_empty());
}

#[test]
fn sqlite_backend_on_disk_with_overwrite() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("people.db");
    let backend = BackendConfig::Sqlite { path: Some(path.clone()), overwrite: true };
    let config = name_mbox_config(Arc::new(Scripted { unequal: 0.95 }), backend);

    let records = vec![
        person("1", "Jon Smith", "5f4dcc3b"),
        person("2", "John Smith", "5f4dcc3b"),
    ];
    let first = run(&config, MatchInput::Dedup(records.clone())).unwrap();
    assert_eq!(first.summary.matches, 1);

    // overwrite=true discards the previous run's index, so re-running does
    // not double-count candidates from stale rows
    let second = run(&config, MatchInput::Dedup(records)).unwrap();
    assert_eq!(second.summary.matches, 1);
    assert!(path.exists());
}

#[test]
fn linkage_uses_both_groups() {
    let config = name_mbox_config(Arc::new(Scripted { unequal: 0.95 }), BackendConfig::InMemory);
    let group1 = vec![person("l1", "Jon Smith", "5f4dcc3b")];
    let group2 = vec![
        person("r1", "John Smith", "5f4dcc3b"),
        person("r2", "Mary Major", "9b74c989"),
    ];
    let result = run(&config, MatchInput::Linkage { group1, group2 }).unwrap();
    assert_eq!(result.summary.matches, 1);
    assert_eq!(result.pairs[0].left.first_value("id"), Some("l1"));
    assert_eq!(result.pairs[0].right.first_value("id"), Some("r1"));
}

#[test]
fn unreachable_threshold_is_a_setup_error() {
    let err = MatchConfigBuilder::new("weak")
        .property(Property::matched("name", Arc::new(Exact), 0.2, 0.6).unwrap())
        .property(Property::matched("city", Arc::new(Exact), 0.3, 0.55).unwrap())
        .threshold(0.95)
        .build()
        .unwrap_err();
    assert!(matches!(err, MatchError::UnreachableThreshold { .. }));
}

#[test]
fn duplicate_property_names_fail_atomically() {
    let err = MatchConfigBuilder::new("dup")
        .property(Property::matched("name", Arc::new(Exact), 0.2, 0.9).unwrap())
        .property(Property::matched("name", Arc::new(Exact), 0.3, 0.8).unwrap())
        .threshold(0.85)
        .build()
        .unwrap_err();
    assert!(matches!(err, MatchError::DuplicateProperty(_)));
}
