//! Configuration loading from sweep.toml
//!
//! Sweep configuration can be specified in a `sweep.toml` file. The file is
//! discovered by walking up from the current directory; every key has a
//! default, so an empty file (or no file) is a valid configuration.
//!
//! The file form ([`SweepConfig`]) is permissive. [`SessionConfig::resolve`]
//! validates it into the immutable value the session runs with.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use sweepbound_core::{BoundSequence, ConfigError, ImcMode, ResourceBudget, SweepPlan};
use sweepbound_exec::{MemoryEnforcement, OracleCommand};

/// Name of the configuration file looked up during discovery
pub const CONFIG_FILE_NAME: &str = "sweep.toml";

/// Sweepbound configuration, as written in `sweep.toml`
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct SweepConfig {
    /// Oracle executable
    #[serde(default)]
    pub oracle: OracleConfig,
    /// Input corpus
    #[serde(default)]
    pub corpus: CorpusConfig,
    /// Per-invocation resource budget
    #[serde(default)]
    pub budget: BudgetConfig,
    /// BMC strategy
    #[serde(default)]
    pub bmc: BmcConfig,
    /// IMC strategy
    #[serde(default)]
    pub imc: ImcConfig,
    /// Output files
    #[serde(default)]
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OracleConfig {
    /// Path to the oracle executable
    #[serde(default = "default_program")]
    pub program: PathBuf,
    /// Extra arguments placed before the bound argument
    #[serde(default)]
    pub args: Vec<String>,
}

impl Default for OracleConfig {
    fn default() -> Self {
        Self {
            program: default_program(),
            args: Vec::new(),
        }
    }
}

fn default_program() -> PathBuf {
    PathBuf::from("./modelchecker")
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorpusConfig {
    /// Directory holding the instance files
    #[serde(default = "default_corpus_dir")]
    pub directory: PathBuf,
    /// Only process instances whose name matches this regex
    #[serde(default)]
    pub filter: Option<String>,
    /// Sort instances by name instead of directory order
    #[serde(default)]
    pub sort: bool,
}

impl Default for CorpusConfig {
    fn default() -> Self {
        Self {
            directory: default_corpus_dir(),
            filter: None,
            sort: false,
        }
    }
}

fn default_corpus_dir() -> PathBuf {
    PathBuf::from("../aag_files/")
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BudgetConfig {
    /// Wall-clock limit per invocation (e.g., "300s", "5m")
    #[serde(default = "default_timeout")]
    pub timeout: String,
    /// Memory ceiling in megabytes
    #[serde(default = "default_memory_max_mb")]
    pub memory_max_mb: u64,
    /// How the ceiling is enforced: "systemd-scope", "rlimit" or "none"
    #[serde(default)]
    pub enforcement: MemoryEnforcement,
}

impl Default for BudgetConfig {
    fn default() -> Self {
        Self {
            timeout: default_timeout(),
            memory_max_mb: default_memory_max_mb(),
            enforcement: MemoryEnforcement::default(),
        }
    }
}

fn default_timeout() -> String {
    "300s".to_string()
}
fn default_memory_max_mb() -> u64 {
    20_000
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BmcConfig {
    /// Depths to try, in order
    #[serde(default = "default_bmc_bounds")]
    pub bounds: Vec<i64>,
}

impl Default for BmcConfig {
    fn default() -> Self {
        Self {
            bounds: default_bmc_bounds(),
        }
    }
}

fn default_bmc_bounds() -> Vec<i64> {
    vec![5]
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImcConfig {
    /// Inner bounds to try, in order; -1 is unbounded
    #[serde(default = "default_inner_bounds")]
    pub inner_bounds: Vec<i64>,
    /// "single-shot" or "escalating"
    #[serde(default)]
    pub mode: ImcMode,
}

impl Default for ImcConfig {
    fn default() -> Self {
        Self {
            inner_bounds: default_inner_bounds(),
            mode: ImcMode::default(),
        }
    }
}

fn default_inner_bounds() -> Vec<i64> {
    vec![-1]
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Session report path (truncated at start)
    #[serde(default = "default_report")]
    pub report: PathBuf,
    /// Optional JSON summary path
    #[serde(default)]
    pub json: Option<PathBuf>,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            report: default_report(),
            json: None,
        }
    }
}

fn default_report() -> PathBuf {
    PathBuf::from("outputs")
}

impl SweepConfig {
    /// Load configuration from a TOML file
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let config: Self = toml::from_str(&content)?;
        Ok(config)
    }

    /// Try to discover and load configuration by walking up from current directory
    pub fn discover() -> Option<anyhow::Result<Self>> {
        let mut dir = std::env::current_dir().ok()?;
        loop {
            let config_path = dir.join(CONFIG_FILE_NAME);
            if config_path.exists() {
                tracing::debug!(path = %config_path.display(), "using configuration file");
                return Some(Self::load(&config_path));
            }
            if !dir.pop() {
                break;
            }
        }
        None
    }

    /// Generate a default configuration as TOML string
    pub fn default_toml() -> String {
        r#"# Sweepbound Configuration

[oracle]
# Verification oracle; called as `<program> [args] <k> <instance>` for BMC
# and `<program> [args] -a <bound> <instance>` for IMC
program = "./modelchecker"
args = []

[corpus]
# Directory of instance files
directory = "../aag_files/"
# Only run instances whose file name matches (uncomment to enable)
# filter = "\\.aag$"
# Sort instances by name instead of directory order
sort = false

[budget]
# Wall-clock limit per oracle invocation
timeout = "300s"
# Memory ceiling in megabytes
memory_max_mb = 20000
# Enforcement: "systemd-scope" (one cgroup ceiling for the oracle and its
# descendants), "rlimit" (per-process address space limit) or "none"
enforcement = "systemd-scope"

[bmc]
# Depths, tried in order until a refutation or an unresolved run
bounds = [5]

[imc]
# Inner bounds for the escalating mode; -1 is unbounded
inner_bounds = [-1]
# "single-shot" (one unbounded call) or "escalating"
mode = "single-shot"

[output]
# Session report, truncated at start
report = "outputs"
# JSON summary (uncomment to enable)
# json = "summary.json"
"#
        .to_string()
    }

    /// Parse duration string (e.g., "3s", "500ms", "2m")
    pub fn parse_duration(s: &str) -> Result<Duration, ConfigError> {
        let s = s.trim();
        if s.is_empty() {
            return Err(ConfigError::InvalidDuration(s.to_string()));
        }

        // Find where the number ends and unit begins
        let (num_part, unit_part) = s
            .char_indices()
            .find(|(_, c)| c.is_alphabetic())
            .map(|(i, _)| s.split_at(i))
            .unwrap_or((s, "s"));

        let value: f64 = num_part
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidDuration(s.to_string()))?;
        if !value.is_finite() || value < 0.0 {
            return Err(ConfigError::InvalidDuration(s.to_string()));
        }

        let secs_per_unit: f64 = match unit_part.to_lowercase().as_str() {
            "ns" => 1e-9,
            "us" | "µs" => 1e-6,
            "ms" => 1e-3,
            "s" | "" => 1.0,
            "m" | "min" => 60.0,
            _ => return Err(ConfigError::InvalidDuration(s.to_string())),
        };

        Duration::try_from_secs_f64(value * secs_per_unit)
            .map_err(|_| ConfigError::InvalidDuration(s.to_string()))
    }
}

/// Where the instances come from
#[derive(Debug, Clone)]
pub struct CorpusSpec {
    pub directory: PathBuf,
    pub filter: Option<Regex>,
    pub sort: bool,
}

/// Validated, immutable configuration of one session
#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub oracle: OracleCommand,
    pub enforcement: MemoryEnforcement,
    pub budget: ResourceBudget,
    pub plan: SweepPlan,
    pub corpus: CorpusSpec,
    pub report_path: PathBuf,
    pub json_path: Option<PathBuf>,
}

impl SessionConfig {
    /// Validate a file configuration. Any error here aborts the run
    /// before an instance is touched.
    pub fn resolve(config: &SweepConfig) -> Result<Self, ConfigError> {
        let timeout = SweepConfig::parse_duration(&config.budget.timeout)?;
        let budget = ResourceBudget::new(timeout, config.budget.memory_max_mb)?;

        let bmc_bounds = BoundSequence::from_values(&config.bmc.bounds)?;
        let imc_inner_bounds = BoundSequence::from_values(&config.imc.inner_bounds)?;
        let plan = SweepPlan::new(bmc_bounds, imc_inner_bounds, config.imc.mode)?;

        let filter = config
            .corpus
            .filter
            .as_deref()
            .map(Regex::new)
            .transpose()
            .map_err(|e| ConfigError::InvalidFilter(e.to_string()))?;

        Ok(Self {
            oracle: OracleCommand::new(&config.oracle.program)
                .with_args(config.oracle.args.iter().cloned()),
            enforcement: config.budget.enforcement,
            budget,
            plan,
            corpus: CorpusSpec {
                directory: config.corpus.directory.clone(),
                filter,
                sort: config.corpus.sort,
            },
            report_path: config.output.report.clone(),
            json_path: config.output.json.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sweepbound_core::Bound;

    #[test]
    fn test_default_config() {
        let config = SweepConfig::default();
        assert_eq!(config.budget.timeout, "300s");
        assert_eq!(config.budget.memory_max_mb, 20_000);
        assert_eq!(config.bmc.bounds, vec![5]);
        assert_eq!(config.imc.inner_bounds, vec![-1]);
        assert_eq!(config.output.report, PathBuf::from("outputs"));
        assert_eq!(config.budget.enforcement, MemoryEnforcement::SystemdScope);
    }

    #[test]
    fn test_parse_duration() {
        let parse = |s| SweepConfig::parse_duration(s).unwrap();
        assert_eq!(parse("300s"), Duration::from_secs(300));
        assert_eq!(parse("300"), Duration::from_secs(300));
        assert_eq!(parse("500ms"), Duration::from_millis(500));
        assert_eq!(parse("2m"), Duration::from_secs(120));
        assert_eq!(parse("1.5s"), Duration::from_millis(1500));
        assert!(SweepConfig::parse_duration("").is_err());
        assert!(SweepConfig::parse_duration("5h").is_err());
        assert!(SweepConfig::parse_duration("-1s").is_err());
    }

    #[test]
    fn test_oversized_timeout_is_config_error() {
        assert!(matches!(
            SweepConfig::parse_duration("100000000000000000000m"),
            Err(ConfigError::InvalidDuration(_))
        ));

        let mut config = SweepConfig::default();
        config.budget.timeout = "100000000000000000000m".to_string();
        assert!(matches!(
            SessionConfig::resolve(&config),
            Err(ConfigError::InvalidDuration(_))
        ));

        // Representable, but past the end of the monotonic clock
        config.budget.timeout = "10000000000000000000s".to_string();
        assert!(matches!(
            SessionConfig::resolve(&config),
            Err(ConfigError::TimeoutTooLarge(_))
        ));
    }

    #[test]
    fn test_parse_toml() {
        let toml_str = r#"
            [budget]
            timeout = "10s"
            enforcement = "systemd-scope"

            [bmc]
            bounds = [1, 2, 3]

            [imc]
            mode = "escalating"
        "#;

        let config: SweepConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.budget.timeout, "10s");
        assert_eq!(config.budget.enforcement, MemoryEnforcement::SystemdScope);
        assert_eq!(config.imc.mode, ImcMode::Escalating);
        // Defaults should still apply
        assert_eq!(config.budget.memory_max_mb, 20_000);
        assert_eq!(config.imc.inner_bounds, vec![-1]);

        let session = SessionConfig::resolve(&config).unwrap();
        assert_eq!(session.plan.bmc_bounds.last(), Bound::Depth(3));
        assert_eq!(session.budget.timeout, Duration::from_secs(10));
    }

    #[test]
    fn test_default_toml_parses() {
        let config: SweepConfig = toml::from_str(&SweepConfig::default_toml()).unwrap();
        assert_eq!(config.budget.timeout, "300s");
        assert!(SessionConfig::resolve(&config).is_ok());
    }

    #[test]
    fn test_resolve_rejects_invalid_settings() {
        let mut config = SweepConfig::default();
        config.bmc.bounds.clear();
        assert!(matches!(
            SessionConfig::resolve(&config),
            Err(ConfigError::EmptyBoundSequence)
        ));

        let mut config = SweepConfig::default();
        config.imc.inner_bounds.clear();
        assert!(SessionConfig::resolve(&config).is_err());

        let mut config = SweepConfig::default();
        config.bmc.bounds = vec![-1];
        assert!(matches!(
            SessionConfig::resolve(&config),
            Err(ConfigError::UnboundedBmcDepth)
        ));

        let mut config = SweepConfig::default();
        config.budget.memory_max_mb = 0;
        assert!(SessionConfig::resolve(&config).is_err());

        let mut config = SweepConfig::default();
        config.corpus.filter = Some("(".to_string());
        assert!(matches!(
            SessionConfig::resolve(&config),
            Err(ConfigError::InvalidFilter(_))
        ));
    }
}
