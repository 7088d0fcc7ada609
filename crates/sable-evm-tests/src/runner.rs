//! Test runner and statistics

use crate::error::TestResult;
use crate::vm_test::{VmTestResults, VmTestRunner};
use sable_evm::Rules;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

/// Aggregated test statistics
#[derive(Debug, Default)]
pub struct TestStats {
    /// Cases executed
    pub total: usize,
    /// Cases passed
    pub passed: usize,
    /// Cases failed
    pub failed: usize,
    /// Files that could not be loaded
    pub unreadable: Vec<(PathBuf, String)>,
    /// Wall-clock time
    pub duration: Duration,
    /// Failed test names with reasons
    pub failures: Vec<(String, String)>,
}

impl TestStats {
    /// Empty stats
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold in the results of one file
    pub fn add_vm_results(&mut self, results: &VmTestResults) {
        self.total += results.total();
        self.passed += results.passed.len();
        self.failed += results.failed.len();
        for (name, reason) in &results.failed {
            self.failures
                .push((format!("{}::{}", results.file, name), reason.clone()));
        }
    }

    /// Pass rate as percentage
    pub fn pass_rate(&self) -> f64 {
        if self.total == 0 {
            return 100.0;
        }
        (self.passed as f64 / self.total as f64) * 100.0
    }

    /// Whether every case passed and every file loaded
    pub fn all_passed(&self) -> bool {
        self.failed == 0 && self.unreadable.is_empty()
    }

    /// Print summary
    pub fn print_summary(&self) {
        println!("\n========================================");
        println!("Test Summary");
        println!("========================================");
        println!("Total:   {}", self.total);
        println!("Passed:  {}", self.passed);
        println!("Failed:  {}", self.failed);
        println!("Pass Rate: {:.2}%", self.pass_rate());
        println!("Duration: {:.2}s", self.duration.as_secs_f64());

        if !self.failures.is_empty() {
            println!("\nFailed tests:");
            for (name, reason) in &self.failures {
                println!("  - {}: {}", name, reason);
            }
        }
        if !self.unreadable.is_empty() {
            println!("\nUnreadable files:");
            for (path, reason) in &self.unreadable {
                println!("  - {}: {}", path.display(), reason);
            }
        }
    }
}

/// Runs VM test files and directories of them
pub struct TestRunner {
    vm_runner: VmTestRunner,
    verbose: bool,
}

impl TestRunner {
    /// Runner executing every case under `rules`
    pub fn new(rules: Rules, verbose: bool) -> Self {
        Self {
            vm_runner: VmTestRunner::new(rules, verbose),
            verbose,
        }
    }

    /// Run the given files; directories are walked for `.json` files
    pub fn run_paths(&self, paths: &[PathBuf]) -> TestResult<TestStats> {
        let mut stats = TestStats::new();
        let start = Instant::now();
        for path in paths {
            self.run_path(path, &mut stats)?;
        }
        stats.duration = start.elapsed();
        Ok(stats)
    }

    fn run_path(&self, path: &Path, stats: &mut TestStats) -> TestResult<()> {
        if path.is_dir() {
            let mut entries = std::fs::read_dir(path)?
                .map(|entry| entry.map(|e| e.path()))
                .collect::<Result<Vec<_>, _>>()?;
            entries.sort();
            for entry in entries {
                if entry.is_dir() || entry.extension().is_some_and(|e| e == "json") {
                    self.run_path(&entry, stats)?;
                }
            }
            return Ok(());
        }

        match self.vm_runner.run_file(path) {
            Ok(results) => {
                if self.verbose && !results.failed.is_empty() {
                    println!(
                        "File: {} - {} passed, {} failed",
                        path.display(),
                        results.passed.len(),
                        results.failed.len()
                    );
                }
                stats.add_vm_results(&results);
            }
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "skipping unreadable test file");
                stats.unreadable.push((path.to_path_buf(), e.to_string()));
            }
        }
        Ok(())
    }
}
