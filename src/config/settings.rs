use crate::utils::error::{Result, SetAnalysisError};
use crate::utils::validation::{
    validate_non_empty_string, validate_positive_number, validate_url, Validate,
};
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    pub search: SearchConfig,
    #[serde(default)]
    pub set_operation: SetOperationConfig,
    #[serde(default)]
    pub release: ReleaseConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    pub base_url: String,
    pub index: String,
    pub request_timeout_seconds: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SetOperationConfig {
    #[serde(default = "default_max_number_of_hits")]
    pub max_number_of_hits: usize,
    #[serde(default = "default_max_multiplier")]
    pub max_multiplier: usize,
    #[serde(default = "default_max_preview_number_of_hits")]
    pub max_preview_number_of_hits: usize,
    #[serde(default = "default_max_input_sets")]
    pub max_input_sets: usize,
    #[serde(default = "default_concurrent_requests")]
    pub concurrent_requests: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReleaseConfig {
    #[serde(default = "default_data_version")]
    pub data_version: i32,
}

fn default_max_number_of_hits() -> usize {
    20000
}

fn default_max_multiplier() -> usize {
    3
}

fn default_max_preview_number_of_hits() -> usize {
    1000
}

fn default_max_input_sets() -> usize {
    10
}

fn default_concurrent_requests() -> usize {
    5
}

fn default_data_version() -> i32 {
    1
}

impl Default for SetOperationConfig {
    fn default() -> Self {
        Self {
            max_number_of_hits: default_max_number_of_hits(),
            max_multiplier: default_max_multiplier(),
            max_preview_number_of_hits: default_max_preview_number_of_hits(),
            max_input_sets: default_max_input_sets(),
            concurrent_requests: default_concurrent_requests(),
        }
    }
}

impl Default for ReleaseConfig {
    fn default() -> Self {
        Self {
            data_version: default_data_version(),
        }
    }
}

impl Settings {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed = Self::substitute_env_vars(content);

        toml::from_str(&processed).map_err(|e| SetAnalysisError::InvalidConfigValue {
            field: "toml".to_string(),
            value: String::new(),
            reason: format!("TOML parsing error: {}", e),
        })
    }

    /// Replaces `${VAR_NAME}` placeholders with environment values.
    /// Unresolvable placeholders are left as-is so validation can report
    /// them in context.
    fn substitute_env_vars(content: &str) -> String {
        use regex::Regex;
        let re = Regex::new(r"\$\{([^}]+)\}").unwrap();

        re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        })
        .to_string()
    }

    /// Ceiling on the size of any union or intersection result.
    pub fn max_union_count(&self) -> usize {
        self.set_operation.max_number_of_hits * self.set_operation.max_multiplier
    }

    pub fn request_timeout(&self) -> Option<std::time::Duration> {
        self.search
            .request_timeout_seconds
            .map(std::time::Duration::from_secs)
    }
}

impl Validate for Settings {
    fn validate(&self) -> Result<()> {
        validate_url("search.base_url", &self.search.base_url)?;
        validate_non_empty_string("search.index", &self.search.index)?;

        validate_positive_number(
            "set_operation.max_number_of_hits",
            self.set_operation.max_number_of_hits,
            1,
        )?;
        validate_positive_number(
            "set_operation.max_multiplier",
            self.set_operation.max_multiplier,
            1,
        )?;
        validate_positive_number(
            "set_operation.max_preview_number_of_hits",
            self.set_operation.max_preview_number_of_hits,
            1,
        )?;
        validate_positive_number(
            "set_operation.max_input_sets",
            self.set_operation.max_input_sets,
            2,
        )?;
        validate_positive_number(
            "set_operation.concurrent_requests",
            self.set_operation.concurrent_requests,
            1,
        )?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_parse_basic_settings() {
        let toml_content = r#"
[search]
base_url = "http://localhost:9200"
index = "dcc-release"

[set_operation]
max_number_of_hits = 50
max_multiplier = 2
max_preview_number_of_hits = 1000

[release]
data_version = 2
"#;

        let settings = Settings::from_toml_str(toml_content).unwrap();
        assert_eq!(settings.search.index, "dcc-release");
        assert_eq!(settings.max_union_count(), 100);
        assert_eq!(settings.set_operation.max_input_sets, 10);
        assert_eq!(settings.set_operation.concurrent_requests, 5);
        assert_eq!(settings.release.data_version, 2);
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_defaults_for_omitted_sections() {
        let toml_content = r#"
[search]
base_url = "http://localhost:9200"
index = "dcc-release"
"#;

        let settings = Settings::from_toml_str(toml_content).unwrap();
        assert_eq!(settings.set_operation.max_number_of_hits, 20000);
        assert_eq!(settings.max_union_count(), 60000);
        assert_eq!(settings.release.data_version, 1);
    }

    #[test]
    fn test_env_var_substitution() {
        std::env::set_var("TEST_SEARCH_URL", "https://search.example.org");

        let toml_content = r#"
[search]
base_url = "${TEST_SEARCH_URL}"
index = "dcc-release"
"#;

        let settings = Settings::from_toml_str(toml_content).unwrap();
        assert_eq!(settings.search.base_url, "https://search.example.org");

        std::env::remove_var("TEST_SEARCH_URL");
    }

    #[test]
    fn test_validation_rejects_bad_url() {
        let toml_content = r#"
[search]
base_url = "not-a-url"
index = "dcc-release"
"#;

        let settings = Settings::from_toml_str(toml_content).unwrap();
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_settings_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        let toml_content = r#"
[search]
base_url = "http://localhost:9200"
index = "test-release"
request_timeout_seconds = 30
"#;
        temp_file.write_all(toml_content.as_bytes()).unwrap();

        let settings = Settings::from_file(temp_file.path()).unwrap();
        assert_eq!(settings.search.index, "test-release");
        assert_eq!(
            settings.request_timeout(),
            Some(std::time::Duration::from_secs(30))
        );
    }
}
