//! Job expansion
//!
//! Turns the `--os` / `--test` selection into the concrete (suite, test) pairs
//! to run, scanning test directories the same way the registry resolves them.

use crate::error::AeagleError;
use crate::registry::SuiteRegistry;
use crate::utils;
use log::{debug, info};
use std::fmt;
use std::fs;
use std::path::Path;

/// One (suite, test) pair to flash and capture.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Job {
    pub suite: String,
    pub test: String,
}

impl Job {
    pub fn new(suite: &str, test: &str) -> Self {
        Self {
            suite: suite.to_string(),
            test: test.to_string(),
        }
    }
}

impl fmt::Display for Job {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.suite, self.test)
    }
}

/// Lists test names (file stems) in `dir`, sorted. A missing directory has no tests.
pub fn list_tests(dir: &Path, extension: &str) -> Result<Vec<String>, AeagleError> {
    if !dir.is_dir() {
        debug!("Test directory does not exist: {}", dir.display());
        return Ok(Vec::new());
    }

    let scan_err = |source| AeagleError::Scan {
        path: dir.to_path_buf(),
        source,
    };
    let mut tests = Vec::new();
    for entry in fs::read_dir(dir).map_err(scan_err)? {
        let path = entry.map_err(scan_err)?.path();
        if !path.is_file() {
            continue;
        }
        if let Some(name) = utils::get_test_name_from_path(&path, extension) {
            tests.push(name);
        }
    }
    tests.sort();
    Ok(tests)
}

/// Expands the suite/test filters into jobs.
///
/// The suite filter is checked against the registry; whether the test exists
/// for an explicit (suite, test) pair is left to flash-time resolution.
pub fn expand_jobs(
    registry: &SuiteRegistry,
    suite: Option<&str>,
    test: Option<&str>,
) -> Result<Vec<Job>, AeagleError> {
    match (suite, test) {
        (None, None) => Err(AeagleError::InvalidArguments),
        (Some(suite), Some(test)) => {
            registry.resolve(suite)?;
            Ok(vec![Job::new(suite, test)])
        }
        (Some(suite_name), None) => {
            let suite = registry.resolve(suite_name)?;
            let dir = registry.test_dir(suite);
            let tests = list_tests(&dir, registry.source_extension())?;
            if tests.is_empty() {
                return Err(AeagleError::NoTestsFound(dir));
            }
            info!("Found {} tests for {}", tests.len(), suite_name);
            Ok(tests.iter().map(|t| Job::new(suite_name, t)).collect())
        }
        (None, Some(test)) => {
            let jobs: Vec<Job> = registry
                .suites()
                .iter()
                .filter(|suite| registry.test_source_path(suite, test).is_file())
                .map(|suite| Job::new(&suite.name, test))
                .collect();
            if jobs.is_empty() {
                return Err(AeagleError::NoMatchingSuite(test.to_string()));
            }
            info!("Test {} found in {} suites", test, jobs.len());
            Ok(jobs)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Config, SuiteConfig};
    use std::fs;
    use tempfile::{tempdir, TempDir};

    fn bench(suites: &[(&str, &str)], files: &[&str]) -> (TempDir, SuiteRegistry) {
        let dir = tempdir().unwrap();
        for file in files {
            let path = dir.path().join("tests").join(file);
            fs::create_dir_all(path.parent().unwrap()).unwrap();
            fs::write(&path, "int main(void) { return 0; }\n").unwrap();
        }
        let config = Config {
            root: dir.path().to_path_buf(),
            suites: suites.iter().map(|(name, demo)| SuiteConfig::new(name, demo)).collect(),
            ..Config::default()
        };
        let registry = SuiteRegistry::from_config(&config);
        (dir, registry)
    }

    #[test]
    fn test_no_filters_is_invalid() {
        let (_dir, registry) = bench(&[("zephyr", "demo-zephyr")], &[]);
        assert!(matches!(expand_jobs(&registry, None, None), Err(AeagleError::InvalidArguments)));
    }

    #[test]
    fn test_both_filters_yield_one_job_without_existence_check() {
        let (_dir, registry) = bench(&[("zephyr", "demo-zephyr")], &[]);
        let jobs = expand_jobs(&registry, Some("zephyr"), Some("Missing")).unwrap();
        assert_eq!(jobs, vec![Job::new("zephyr", "Missing")]);
    }

    #[test]
    fn test_unknown_suite_is_rejected() {
        let (_dir, registry) = bench(&[("zephyr", "demo-zephyr")], &[]);
        assert!(matches!(
            expand_jobs(&registry, Some("nuttx"), None),
            Err(AeagleError::UnknownSuite { .. })
        ));
    }

    #[test]
    fn test_suite_filter_lists_sorted_stems() {
        let (_dir, registry) = bench(
            &[("zephyr", "demo-zephyr")],
            &["zephyr/UseAfterFree.c", "zephyr/DoubleFree.c", "zephyr/HeapOverflow.c", "zephyr/notes.txt"],
        );
        let jobs = expand_jobs(&registry, Some("zephyr"), None).unwrap();
        let tests: Vec<&str> = jobs.iter().map(|j| j.test.as_str()).collect();
        assert_eq!(tests, vec!["DoubleFree", "HeapOverflow", "UseAfterFree"]);
    }

    #[test]
    fn test_suite_filter_uses_family_directory() {
        let (_dir, registry) = bench(
            &[("freertosv2", "demo-freertos")],
            &["freertos/LeakExhaust.c", "freertosv2/Ignored.c"],
        );
        let jobs = expand_jobs(&registry, Some("freertosv2"), None).unwrap();
        assert_eq!(jobs, vec![Job::new("freertosv2", "LeakExhaust")]);
    }

    #[test]
    fn test_suite_filter_without_tests_fails() {
        let (_dir, registry) = bench(&[("zephyr", "demo-zephyr")], &[]);
        assert!(matches!(
            expand_jobs(&registry, Some("zephyr"), None),
            Err(AeagleError::NoTestsFound(_))
        ));
    }

    #[test]
    fn test_test_filter_only_picks_suites_that_have_it() {
        let (_dir, registry) = bench(
            &[("zephyr", "demo-zephyr"), ("newlib", "demo-newlib"), ("freertosv1", "demo-freertos"), ("freertosv4", "demo-freertos")],
            &["zephyr/FakeFree.c", "newlib/BurstMalloc.c", "freertos/FakeFree.c"],
        );
        let jobs = expand_jobs(&registry, None, Some("FakeFree")).unwrap();
        assert_eq!(
            jobs,
            vec![
                Job::new("zephyr", "FakeFree"),
                Job::new("freertosv1", "FakeFree"),
                Job::new("freertosv4", "FakeFree"),
            ]
        );
    }

    #[test]
    fn test_test_filter_without_match_fails() {
        let (_dir, registry) = bench(&[("zephyr", "demo-zephyr")], &["zephyr/FakeFree.c"]);
        assert!(matches!(
            expand_jobs(&registry, None, Some("DoubleFree")),
            Err(AeagleError::NoMatchingSuite(t)) if t == "DoubleFree"
        ));
    }
}
