//! Runs the bundled VM fixtures end to end

use sable_evm_tests::{fork_rules, TestRunner, VmTestFile, VmTestRunner};
use std::path::PathBuf;

fn fixtures() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures")
}

fn runner() -> VmTestRunner {
    VmTestRunner::new(fork_rules("Constantinople").unwrap(), false)
}

// ==================== Whole directory ====================

#[test]
fn test_all_fixtures_pass() {
    let stats = TestRunner::new(fork_rules("Constantinople").unwrap(), false)
        .run_paths(&[fixtures()])
        .unwrap();
    assert!(stats.all_passed(), "failures: {:?}", stats.failures);
    assert_eq!(stats.total, 13);
}

// ==================== Individual files ====================

#[test]
fn test_arithmetic_file() {
    let results = runner().run_file(&fixtures().join("arithmetic.json")).unwrap();
    assert_eq!(results.passed, vec!["add", "mul", "sha3"]);
    assert!(results.failed.is_empty());
}

#[test]
fn test_expected_failures_file() {
    let results = runner().run_file(&fixtures().join("failures.json")).unwrap();
    assert_eq!(results.passed.len(), 4);
    assert!(results.failed.is_empty());
}

#[test]
fn test_logs_hash_checked() {
    let path = fixtures().join("returnAndLogs.json");
    let content = std::fs::read_to_string(&path).unwrap();
    let mut tests: VmTestFile = serde_json::from_str(&content).unwrap();

    let empty_logs = tests["returnWord"].logs;
    let case = tests.get_mut("log1").unwrap();
    runner().run_test(case).unwrap();

    case.logs = empty_logs;
    let err = runner().run_test(case).unwrap_err();
    assert!(err.to_string().contains("logs hash"));
}

// ==================== Fork sensitivity ====================

#[test]
fn test_arithmetic_under_legacy_sstore() {
    // Fresh slots cost 20000 under both schemes
    let results = VmTestRunner::new(fork_rules("Byzantium").unwrap(), false)
        .run_file(&fixtures().join("arithmetic.json"))
        .unwrap();
    assert_eq!(results.passed.len(), 3);
}

#[test]
fn test_missing_file_is_error() {
    assert!(runner().run_file(&fixtures().join("missing.json")).is_err());
}
