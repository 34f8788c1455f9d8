//! Suite registry
//!
//! Maps suite names to demo projects and to the directory their test sources
//! live in. Built once from [`Config`] and passed to whoever needs it.

use crate::config::Config;
use crate::error::AeagleError;
use std::path::PathBuf;

/// Where a demo project expects its entry file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryPathKind {
    /// `<demo>/<entry>`
    Root,
    /// `<demo>/src/<entry>`
    Nested,
}

/// A resolved suite.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Suite {
    pub name: String,
    pub demo: String,
    pub entry_kind: EntryPathKind,
    /// Directory under the tests root; shared by all members of a family.
    pub test_dir: String,
    /// `(variable, value)` exported to the flash tool.
    pub build_param: Option<(String, String)>,
    pub retries: u32,
}

#[derive(Debug, Clone)]
pub struct SuiteRegistry {
    suites: Vec<Suite>,
    tests_root: PathBuf,
    apps_root: PathBuf,
    source_extension: String,
    entry_file: String,
    flash_script: String,
}

impl SuiteRegistry {
    pub fn from_config(config: &Config) -> Self {
        let suites = config
            .suites
            .iter()
            .map(|suite| {
                // Family membership is a prefix match, never equality.
                let family = config.families.iter().find(|f| suite.name.starts_with(&f.prefix));
                let test_dir = family
                    .map(|f| f.test_dir.clone())
                    .unwrap_or_else(|| suite.name.clone());
                let build_param = family
                    .and_then(|f| f.build_param.as_ref())
                    .and_then(|var| {
                        suite
                            .name
                            .chars()
                            .last()
                            .map(|c| (var.clone(), c.to_string()))
                    });
                let entry_kind = if config.root_entry_demos.contains(&suite.demo) {
                    EntryPathKind::Root
                } else {
                    EntryPathKind::Nested
                };

                Suite {
                    name: suite.name.clone(),
                    demo: suite.demo.clone(),
                    entry_kind,
                    test_dir,
                    build_param,
                    retries: suite.retries,
                }
            })
            .collect();

        Self {
            suites,
            tests_root: config.tests_path(),
            apps_root: config.apps_path(),
            source_extension: config.source_extension.clone(),
            entry_file: config.entry_file.clone(),
            flash_script: config.flash_script.clone(),
        }
    }

    /// Looks a suite up by name.
    pub fn resolve(&self, name: &str) -> Result<&Suite, AeagleError> {
        self.suites
            .iter()
            .find(|s| s.name == name)
            .ok_or_else(|| {
                let mut names: Vec<&str> = self.suites.iter().map(|s| s.name.as_str()).collect();
                names.sort_unstable();
                AeagleError::UnknownSuite {
                    name: name.to_string(),
                    supported: names.join(", "),
                }
            })
    }

    /// Suites in registry order.
    pub fn suites(&self) -> &[Suite] {
        &self.suites
    }

    pub fn source_extension(&self) -> &str {
        &self.source_extension
    }

    /// Directory holding the test sources of `suite`.
    pub fn test_dir(&self, suite: &Suite) -> PathBuf {
        self.tests_root.join(&suite.test_dir)
    }

    pub fn test_source_path(&self, suite: &Suite, test: &str) -> PathBuf {
        self.test_dir(suite)
            .join(format!("{test}.{}", self.source_extension))
    }

    pub fn demo_dir(&self, suite: &Suite) -> PathBuf {
        self.apps_root.join(&suite.demo)
    }

    pub fn entry_path(&self, suite: &Suite) -> PathBuf {
        let demo_dir = self.demo_dir(suite);
        match suite.entry_kind {
            EntryPathKind::Root => demo_dir.join(&self.entry_file),
            EntryPathKind::Nested => demo_dir.join("src").join(&self.entry_file),
        }
    }

    pub fn flash_tool_path(&self, suite: &Suite) -> PathBuf {
        self.demo_dir(suite).join(&self.flash_script)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SuiteConfig;

    fn registry() -> SuiteRegistry {
        let config = Config {
            root: PathBuf::from("/bench"),
            ..Config::default()
        };
        SuiteRegistry::from_config(&config)
    }

    #[test]
    fn test_resolve_known_and_unknown() {
        let registry = registry();
        let suite = registry.resolve("zephyr").unwrap();
        assert_eq!(suite.demo, "demo-zephyr");
        assert_eq!(suite.entry_kind, EntryPathKind::Nested);
        assert_eq!(suite.build_param, None);

        match registry.resolve("vxworks") {
            Err(AeagleError::UnknownSuite { name, supported }) => {
                assert_eq!(name, "vxworks");
                assert!(supported.starts_with("contiki-heapmem, contiki-memb"));
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn test_family_shares_test_dir_and_gets_build_param() {
        let registry = registry();
        for name in ["freertosv1", "freertosv2", "freertosv4"] {
            let suite = registry.resolve(name).unwrap();
            assert_eq!(suite.test_dir, "freertos");
            assert_eq!(suite.entry_kind, EntryPathKind::Root);
            assert_eq!(
                registry.test_source_path(suite, "DoubleFree"),
                PathBuf::from("/bench/tests/freertos/DoubleFree.c")
            );
        }
        let v4 = registry.resolve("freertosv4").unwrap();
        assert_eq!(v4.build_param, Some(("HEAP_IMPL".to_string(), "4".to_string())));
    }

    #[test]
    fn test_entry_and_tool_paths() {
        let registry = registry();
        let contiki = registry.resolve("contiki-memb").unwrap();
        assert_eq!(registry.entry_path(contiki), PathBuf::from("/bench/apps/demo-contiki/main.c"));
        let riot = registry.resolve("riot-mema").unwrap();
        assert_eq!(registry.entry_path(riot), PathBuf::from("/bench/apps/demo-riot/src/main.c"));
        assert_eq!(registry.flash_tool_path(riot), PathBuf::from("/bench/apps/demo-riot/flash.sh"));
        assert_eq!(registry.test_dir(riot), PathBuf::from("/bench/tests/riot-mema"));
    }

    #[test]
    fn test_retries_come_from_config() {
        let config = Config {
            suites: vec![SuiteConfig { name: "riot-tlsf".into(), demo: "demo-riot".into(), retries: 3 }],
            ..Config::default()
        };
        let registry = SuiteRegistry::from_config(&config);
        assert_eq!(registry.resolve("riot-tlsf").unwrap().retries, 3);
        assert_eq!(registry.suites().len(), 1);
    }
}
