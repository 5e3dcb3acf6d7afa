//! Drives the CLI command logic end to end against fixture files.

use std::fs;

use likeness_cli::exit_codes::{EXIT_INVALID_CONFIG, EXIT_REVIEW};
use likeness_cli::{cmd_run, cmd_validate};

const DEDUP_CONFIG: &str = r#"
name = "People"
threshold = 0.89

[[properties]]
name = "id"
role = "identity"

[[properties]]
name = "name"
comparator = "jaro_winkler"
low = 0.2
high = 0.88

[[properties]]
name = "mbox"
comparator = "exact"
low = 0.48
high = 0.6

[[sources]]
group = 0
file = "people.csv"
"#;

const PEOPLE_CSV: &str = "\
id,name,mbox
1,John Smith,5f4dcc3b
2,Jon Smith,5f4dcc3b
3,Mary Major,9b74c989
";

#[test]
fn run_dedup_writes_json_result() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("people.toml"), DEDUP_CONFIG).unwrap();
    fs::write(dir.path().join("people.csv"), PEOPLE_CSV).unwrap();
    let output = dir.path().join("result.json");

    cmd_run(dir.path().join("people.toml"), false, Some(output.clone())).unwrap();

    let result: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&output).unwrap()).unwrap();
    assert_eq!(result["meta"]["mode"], "dedup");
    assert_eq!(result["summary"]["matches"], 1);
    let pairs = result["pairs"].as_array().unwrap();
    assert_eq!(pairs.len(), 1);
    assert_eq!(pairs[0]["verdict"], "match");
}

#[test]
fn run_linkage_config() {
    let config = r#"
name = "Customers vs CRM"
threshold = 0.89

[[properties]]
name = "id"
role = "identity"

[[properties]]
name = "name"
comparator = "jaro_winkler"
low = 0.2
high = 0.88

[[properties]]
name = "mbox"
comparator = "exact"
low = 0.48
high = 0.6

[[sources]]
group = 1
file = "left.csv"

[[sources]]
group = 2
file = "right.csv"
"#;
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("link.toml"), config).unwrap();
    fs::write(
        dir.path().join("left.csv"),
        "id,name,mbox\nl1,John Smith,5f4dcc3b\n",
    )
    .unwrap();
    fs::write(
        dir.path().join("right.csv"),
        "id,name,mbox\nr1,Jon Smith,5f4dcc3b\nr2,Mary Major,9b74c989\n",
    )
    .unwrap();
    let output = dir.path().join("result.json");

    cmd_run(dir.path().join("link.toml"), false, Some(output.clone())).unwrap();

    let result: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&output).unwrap()).unwrap();
    assert_eq!(result["meta"]["mode"], "linkage");
    assert_eq!(result["summary"]["matches"], 1);
}

#[test]
fn possible_matches_exit_with_review_code() {
    let config = r#"
name = "Maybe"
threshold = 0.89
maybe_threshold = 0.8

[[properties]]
name = "id"
role = "identity"

[[properties]]
name = "name"
comparator = "exact"
low = 0.1
high = 0.85

[[properties]]
name = "mbox"
comparator = "exact"
low = 0.48
high = 0.6

[[sources]]
group = 0
file = "people.csv"
"#;
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("maybe.toml"), config).unwrap();
    fs::write(
        dir.path().join("people.csv"),
        "id,name,mbox\n1,Alice Smith,\n2,Alice Smith,\n",
    )
    .unwrap();

    let err = cmd_run(dir.path().join("maybe.toml"), false, None).unwrap_err();
    assert_eq!(err.code, EXIT_REVIEW);
}

#[test]
fn validate_accepts_good_and_rejects_bad_configs() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("good.toml"), DEDUP_CONFIG).unwrap();
    assert!(cmd_validate(dir.path().join("good.toml")).is_ok());

    // threshold no combination of evidence can reach
    let bad = r#"
name = "Weak"
threshold = 0.99

[[properties]]
name = "name"
comparator = "exact"
low = 0.2
high = 0.6
"#;
    fs::write(dir.path().join("bad.toml"), bad).unwrap();
    let err = cmd_validate(dir.path().join("bad.toml")).unwrap_err();
    assert_eq!(err.code, EXIT_INVALID_CONFIG);
    assert!(err.message.contains("unreachable"));
}
