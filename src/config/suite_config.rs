//! Suite and suite-family definitions.

use serde::Deserialize;

/// One test suite and the demo project it is flashed into.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct SuiteConfig {
    pub name: String,
    /// Directory name under the apps root.
    pub demo: String,
    /// Extra flash attempts after the first one.
    #[serde(default)]
    pub retries: u32,
}

impl SuiteConfig {
    pub fn new(name: &str, demo: &str) -> Self {
        Self {
            name: name.to_string(),
            demo: demo.to_string(),
            retries: 0,
        }
    }
}

/// Suites whose name starts with `prefix` share one test directory and may
/// need a build variable set for the flash tool.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct FamilyConfig {
    pub prefix: String,
    pub test_dir: String,
    /// Environment variable receiving the last character of the suite name.
    #[serde(default)]
    pub build_param: Option<String>,
}

pub fn default_suites() -> Vec<SuiteConfig> {
    vec![
        SuiteConfig::new("zephyr", "demo-zephyr"),
        SuiteConfig::new("newlib", "demo-newlib"),
        SuiteConfig::new("newlib-nano", "demo-newlib-nano"),
        SuiteConfig::new("freertosv1", "demo-freertos"),
        SuiteConfig::new("freertosv2", "demo-freertos"),
        SuiteConfig::new("freertosv4", "demo-freertos"),
        SuiteConfig::new("contiki-memb", "demo-contiki"),
        SuiteConfig::new("contiki-heapmem", "demo-contiki"),
        SuiteConfig::new("riot-tlsf", "demo-riot"),
        SuiteConfig::new("riot-mema", "demo-riot"),
    ]
}

pub fn default_families() -> Vec<FamilyConfig> {
    vec![FamilyConfig {
        prefix: String::from("freertosv"),
        test_dir: String::from("freertos"),
        build_param: Some(String::from("HEAP_IMPL")),
    }]
}
