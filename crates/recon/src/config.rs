use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ReconError;

pub const DEFAULT_OUTPUT_DIR: &str = "SKU_Report";
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

/// On-disk layout: everything lives under a top-level `config` key.
#[derive(Debug, Deserialize)]
struct ConfigFile {
    config: SkuCheckConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SkuCheckConfig {
    /// Reference pages, processed in this order.
    pub urls: Vec<String>,
    /// Input dataset (xlsx, xls, ods, csv).
    pub filename: PathBuf,
    /// true = export found SKUs, false = export not-found SKUs.
    pub mode: bool,
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default)]
    pub duplicate_policy: DuplicatePolicy,
    #[serde(default)]
    pub sort: ReportSort,
}

fn default_output_dir() -> PathBuf {
    PathBuf::from(DEFAULT_OUTPUT_DIR)
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

// ---------------------------------------------------------------------------
// Duplicate policy
// ---------------------------------------------------------------------------

/// Which group keeps an identifier published under more than one group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DuplicatePolicy {
    /// The last URL in config order wins.
    #[default]
    LastWins,
    /// The first URL in config order keeps the identifier.
    FirstWins,
}

impl std::fmt::Display for DuplicatePolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::LastWins => write!(f, "last_wins"),
            Self::FirstWins => write!(f, "first_wins"),
        }
    }
}

// ---------------------------------------------------------------------------
// Export selection + sort
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ExportSelection {
    Found,
    NotFound,
}

impl ExportSelection {
    pub fn from_mode(mode: bool) -> Self {
        if mode {
            Self::Found
        } else {
            Self::NotFound
        }
    }

    pub fn report_filename(&self) -> &'static str {
        match self {
            Self::Found => "found_skus_report.xlsx",
            Self::NotFound => "not_found_skus_report.xlsx",
        }
    }
}

impl std::fmt::Display for ExportSelection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Found => write!(f, "found"),
            Self::NotFound => write!(f, "not_found"),
        }
    }
}

/// Row order of the exported report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportSort {
    /// By group when the report carries groups, otherwise by cost.
    #[default]
    Auto,
    /// By group ascending.
    Group,
    /// By cost descending.
    Cost,
}

// ---------------------------------------------------------------------------
// Parse + Validate
// ---------------------------------------------------------------------------

impl SkuCheckConfig {
    pub fn from_yaml(input: &str) -> Result<Self, ReconError> {
        let file: ConfigFile =
            serde_yaml::from_str(input).map_err(|e| ReconError::ConfigParse(e.to_string()))?;
        file.config.validate()?;
        Ok(file.config)
    }

    pub fn from_toml(input: &str) -> Result<Self, ReconError> {
        let file: ConfigFile =
            toml::from_str(input).map_err(|e| ReconError::ConfigParse(e.to_string()))?;
        file.config.validate()?;
        Ok(file.config)
    }

    /// Read and validate a config file. Relative `filename` / `output_dir`
    /// are resolved against the config file's directory.
    pub fn load(path: &Path) -> Result<Self, ReconError> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| ReconError::Io(format!("cannot read {}: {e}", path.display())))?;

        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .unwrap_or_default();

        let mut config = match ext.as_str() {
            "yaml" | "yml" => Self::from_yaml(&text)?,
            "toml" => Self::from_toml(&text)?,
            other => return Err(ReconError::UnsupportedConfigFormat(other.to_string())),
        };

        let base_dir = path.parent().unwrap_or_else(|| Path::new("."));
        config.resolve_paths(base_dir);
        Ok(config)
    }

    pub fn resolve_paths(&mut self, base_dir: &Path) {
        if self.filename.is_relative() {
            self.filename = base_dir.join(&self.filename);
        }
        if self.output_dir.is_relative() {
            self.output_dir = base_dir.join(&self.output_dir);
        }
    }

    pub fn validate(&self) -> Result<(), ReconError> {
        if self.urls.is_empty() {
            return Err(ReconError::ConfigValidation(
                "at least one url is required".into(),
            ));
        }

        for (i, raw) in self.urls.iter().enumerate() {
            let parsed = url::Url::parse(raw.trim()).map_err(|e| {
                ReconError::ConfigValidation(format!("urls[{i}]: invalid url '{raw}': {e}"))
            })?;
            if parsed.scheme() != "http" && parsed.scheme() != "https" {
                return Err(ReconError::ConfigValidation(format!(
                    "urls[{i}]: unsupported scheme '{}' (expected http or https)",
                    parsed.scheme()
                )));
            }
        }

        if self.filename.as_os_str().is_empty() {
            return Err(ReconError::ConfigValidation("filename must not be empty".into()));
        }

        if self.timeout_secs == 0 {
            return Err(ReconError::ConfigValidation(
                "timeout_secs must be greater than 0".into(),
            ));
        }

        Ok(())
    }

    pub fn selection(&self) -> ExportSelection {
        ExportSelection::from_mode(self.mode)
    }

    pub fn report_path(&self, selection: ExportSelection) -> PathBuf {
        self.output_dir.join(selection.report_filename())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    const VALID_YAML: &str = r#"
config:
  urls:
    - https://cloud.example.com/skus/compute-engine
    - https://cloud.example.com/skus/cloud-storage
  filename: billing.xlsx
  mode: true
"#;

    #[test]
    fn parse_valid_yaml() {
        let config = SkuCheckConfig::from_yaml(VALID_YAML).unwrap();
        assert_eq!(config.urls.len(), 2);
        assert_eq!(config.filename, PathBuf::from("billing.xlsx"));
        assert!(config.mode);
        assert_eq!(config.output_dir, PathBuf::from("SKU_Report"));
        assert_eq!(config.timeout_secs, 10);
        assert_eq!(config.duplicate_policy, DuplicatePolicy::LastWins);
        assert_eq!(config.sort, ReportSort::Auto);
        assert_eq!(config.selection(), ExportSelection::Found);
    }

    #[test]
    fn parse_optional_fields() {
        let yaml = r#"
config:
  urls: ["https://example.com/a"]
  filename: input.csv
  mode: false
  output_dir: out
  timeout_secs: 3
  duplicate_policy: first_wins
  sort: cost
"#;
        let config = SkuCheckConfig::from_yaml(yaml).unwrap();
        assert_eq!(config.output_dir, PathBuf::from("out"));
        assert_eq!(config.timeout_secs, 3);
        assert_eq!(config.duplicate_policy, DuplicatePolicy::FirstWins);
        assert_eq!(config.sort, ReportSort::Cost);
        assert_eq!(config.selection(), ExportSelection::NotFound);
        assert_eq!(
            config.report_path(config.selection()),
            PathBuf::from("out/not_found_skus_report.xlsx")
        );
    }

    #[test]
    fn parse_toml() {
        let toml = r#"
[config]
urls = ["https://example.com/skus/networking"]
filename = "billing.xlsx"
mode = true
"#;
        let config = SkuCheckConfig::from_toml(toml).unwrap();
        assert_eq!(config.urls, vec!["https://example.com/skus/networking"]);
    }

    #[test]
    fn missing_mode_is_parse_error() {
        let yaml = r#"
config:
  urls: ["https://example.com/a"]
  filename: input.xlsx
"#;
        let err = SkuCheckConfig::from_yaml(yaml).unwrap_err();
        assert!(matches!(err, ReconError::ConfigParse(_)), "{err}");
    }

    #[test]
    fn missing_config_root_is_parse_error() {
        let yaml = "urls: []\nfilename: a.xlsx\nmode: true\n";
        let err = SkuCheckConfig::from_yaml(yaml).unwrap_err();
        assert!(matches!(err, ReconError::ConfigParse(_)));
    }

    #[test]
    fn reject_empty_urls() {
        let yaml = "config:\n  urls: []\n  filename: a.xlsx\n  mode: true\n";
        let err = SkuCheckConfig::from_yaml(yaml).unwrap_err();
        assert!(err.to_string().contains("at least one url"));
    }

    #[test]
    fn reject_bad_url() {
        let yaml = "config:\n  urls: [\"not a url\"]\n  filename: a.xlsx\n  mode: true\n";
        let err = SkuCheckConfig::from_yaml(yaml).unwrap_err();
        assert!(matches!(err, ReconError::ConfigValidation(_)));
        assert!(err.to_string().contains("urls[0]"));
    }

    #[test]
    fn reject_non_http_scheme() {
        let yaml = "config:\n  urls: [\"ftp://example.com/a\"]\n  filename: a.xlsx\n  mode: true\n";
        let err = SkuCheckConfig::from_yaml(yaml).unwrap_err();
        assert!(err.to_string().contains("unsupported scheme 'ftp'"));
    }

    #[test]
    fn reject_zero_timeout() {
        let yaml = "config:\n  urls: [\"https://e.com/a\"]\n  filename: a.xlsx\n  mode: true\n  timeout_secs: 0\n";
        let err = SkuCheckConfig::from_yaml(yaml).unwrap_err();
        assert!(err.to_string().contains("timeout_secs"));
    }

    #[test]
    fn reject_unknown_policy() {
        let yaml = "config:\n  urls: [\"https://e.com/a\"]\n  filename: a.xlsx\n  mode: true\n  duplicate_policy: random\n";
        assert!(SkuCheckConfig::from_yaml(yaml).is_err());
    }

    #[test]
    fn load_resolves_relative_paths() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        std::fs::write(&path, VALID_YAML).unwrap();

        let config = SkuCheckConfig::load(&path).unwrap();
        assert_eq!(config.filename, dir.path().join("billing.xlsx"));
        assert_eq!(config.output_dir, dir.path().join("SKU_Report"));
    }

    #[test]
    fn load_rejects_unknown_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.ini");
        std::fs::write(&path, VALID_YAML).unwrap();

        let err = SkuCheckConfig::load(&path).unwrap_err();
        assert!(matches!(err, ReconError::UnsupportedConfigFormat(ref e) if e == "ini"));
    }

    #[test]
    fn load_missing_file_is_io_error() {
        let err = SkuCheckConfig::load(Path::new("/nonexistent/config.yaml")).unwrap_err();
        assert!(matches!(err, ReconError::Io(_)));
    }
}
