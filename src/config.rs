//! Configuration loading via `ortho-config`.
//!
//! Values merge defaults, `conbind.toml`, and `CONBIND_*` environment
//! variables. The test root is the only value without a default: it locates
//! the runtime launcher as `<test_root>/bin/<launcher_name>`.

use camino::Utf8PathBuf;
use ortho_config::OrthoConfig;
use serde::Deserialize;
use thiserror::Error;

use crate::capture_file::CaptureFile;
use crate::launch::LaunchCommand;
use crate::outcome::ExpectedOutcome;
use crate::scenario::{DEFAULT_OUTPUT, RedirectAll, RedirectOutOnly};

/// Default launcher binary name inside `<test_root>/bin`.
pub const DEFAULT_LAUNCHER: &str = "conbind-probe";

/// Default probe entry point.
pub const DEFAULT_ENTRY: &str = "hello";

/// Default stdout capture file for the pty scenario.
pub const DEFAULT_STDOUT_FILE: &str = "stdout.txt";

const CONFIG_FILE_NAME: &str = "conbind.toml";

/// Harness settings derived from configuration files and environment
/// variables.
#[derive(Clone, Debug, Deserialize, OrthoConfig, PartialEq, Eq)]
#[ortho_config(
    prefix = "CONBIND",
    discovery(
        app_name = "conbind",
        env_var = "CONBIND_CONFIG_PATH",
        config_file_name = "conbind.toml",
        dotfile_name = ".conbind.toml",
        project_file_name = "conbind.toml"
    )
)]
pub struct HarnessConfig {
    /// Root of the runtime under test. Required.
    pub test_root: Option<String>,
    /// Launcher binary name, resolved inside `<test_root>/bin`.
    #[ortho_config(default = DEFAULT_LAUNCHER.to_owned())]
    pub launcher_name: String,
    /// Directory passed to the launcher via `--search-path` in the
    /// redirect-all scenario. Defaults to `<test_root>/bin`.
    pub search_path: Option<String>,
    /// Entry point the launcher runs.
    #[ortho_config(default = DEFAULT_ENTRY.to_owned())]
    pub entry: String,
    /// Exact text the entry point is expected to write to its console.
    #[ortho_config(default = DEFAULT_OUTPUT.to_owned())]
    pub expected_output: String,
    /// File receiving the child's stdout in the redirect-out-only scenario,
    /// relative to the current directory unless absolute.
    #[ortho_config(default = DEFAULT_STDOUT_FILE.to_owned())]
    pub stdout_file: String,
}

/// Metadata for a configuration field, used to generate actionable error
/// messages.
struct FieldMetadata {
    description: &'static str,
    env_var: &'static str,
    toml_key: &'static str,
}

impl FieldMetadata {
    const fn new(description: &'static str, env_var: &'static str, toml_key: &'static str) -> Self {
        Self {
            description,
            env_var,
            toml_key,
        }
    }

    fn missing(&self) -> ConfigError {
        ConfigError::MissingField(format!(
            "missing {}: set {} or add {} to {CONFIG_FILE_NAME}",
            self.description, self.env_var, self.toml_key
        ))
    }
}

const TEST_ROOT: FieldMetadata =
    FieldMetadata::new("runtime test root", "CONBIND_TEST_ROOT", "test_root");

impl HarnessConfig {
    /// Builds a configuration with defaults for everything except the test
    /// root.
    #[must_use]
    pub fn with_test_root(test_root: impl Into<String>) -> Self {
        Self {
            test_root: Some(test_root.into()),
            launcher_name: DEFAULT_LAUNCHER.to_owned(),
            search_path: None,
            entry: DEFAULT_ENTRY.to_owned(),
            expected_output: DEFAULT_OUTPUT.to_owned(),
            stdout_file: DEFAULT_STDOUT_FILE.to_owned(),
        }
    }

    /// Loads configuration without attempting to parse CLI arguments.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] when the merge fails.
    pub fn load_without_cli_args() -> Result<Self, ConfigError> {
        Self::load_from_iter([std::ffi::OsString::from("conbind")])
            .map_err(|err| ConfigError::Parse(err.to_string()))
    }

    /// Performs semantic validation. Error messages explain how to supply
    /// missing values.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingField`] when a required field is blank.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.test_root()?;
        Self::require_field(
            &self.launcher_name,
            &FieldMetadata::new("launcher name", "CONBIND_LAUNCHER_NAME", "launcher_name"),
        )?;
        Self::require_field(
            &self.entry,
            &FieldMetadata::new("entry point", "CONBIND_ENTRY", "entry"),
        )?;
        Self::require_field(
            &self.stdout_file,
            &FieldMetadata::new("stdout capture file", "CONBIND_STDOUT_FILE", "stdout_file"),
        )?;
        if let Some(search_path) = &self.search_path {
            Self::require_field(
                search_path,
                &FieldMetadata::new("search path", "CONBIND_SEARCH_PATH", "search_path"),
            )?;
        }
        Ok(())
    }

    /// Trimmed test root.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingField`] when unset or blank.
    pub fn test_root(&self) -> Result<Utf8PathBuf, ConfigError> {
        match self.test_root.as_deref().map(str::trim) {
            Some(root) if !root.is_empty() => Ok(Utf8PathBuf::from(root)),
            _ => Err(TEST_ROOT.missing()),
        }
    }

    /// Path of the runtime launcher binary.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingField`] when the test root is unset.
    pub fn launcher_path(&self) -> Result<Utf8PathBuf, ConfigError> {
        Ok(self.test_root()?.join("bin").join(self.launcher_name.trim()))
    }

    /// Directory handed to the launcher in the redirect-all scenario.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingField`] when the test root is unset.
    pub fn search_path(&self) -> Result<Utf8PathBuf, ConfigError> {
        match self.search_path.as_deref().map(str::trim) {
            Some(path) if !path.is_empty() => Ok(Utf8PathBuf::from(path)),
            _ => Ok(self.test_root()?.join("bin")),
        }
    }

    /// Expected outcome shared by both scenarios.
    #[must_use]
    pub fn expected_outcome(&self) -> ExpectedOutcome {
        ExpectedOutcome::success_with_stdout(self.expected_output.as_str())
    }

    /// Builds the redirect-all scenario:
    /// `<launcher> --search-path <search_path> <entry>`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when validation fails.
    pub fn redirect_all(&self) -> Result<RedirectAll, ConfigError> {
        self.validate()?;
        let command = LaunchCommand::new(self.launcher_path()?)
            .arg("--search-path")
            .arg(self.search_path()?.as_str())
            .arg(self.entry.trim());
        Ok(RedirectAll::new(command, self.expected_outcome()))
    }

    /// Builds the redirect-out-only scenario: `<launcher> <entry>`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when validation fails.
    pub fn redirect_out_only(&self) -> Result<RedirectOutOnly, ConfigError> {
        self.validate()?;
        let command = LaunchCommand::new(self.launcher_path()?).arg(self.entry.trim());
        Ok(RedirectOutOnly::new(
            command,
            self.expected_outcome(),
            CaptureFile::new(self.stdout_file.trim()),
        ))
    }

    fn require_field(value: &str, metadata: &FieldMetadata) -> Result<(), ConfigError> {
        if value.trim().is_empty() {
            return Err(metadata.missing());
        }
        Ok(())
    }
}

/// Errors raised during configuration loading and validation.
#[derive(Debug, Error, Eq, PartialEq)]
pub enum ConfigError {
    /// Indicates a required configuration field is empty or missing.
    #[error("missing configuration field: {0}")]
    MissingField(String),
    /// Surfaces errors from the `ortho-config` loader.
    #[error("configuration parsing failed: {0}")]
    Parse(String),
}

impl From<ortho_config::OrthoError> for ConfigError {
    fn from(value: ortho_config::OrthoError) -> Self {
        Self::Parse(value.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::{fixture, rstest};

    #[fixture]
    fn valid_config() -> HarnessConfig {
        HarnessConfig::with_test_root("/opt/runtime")
    }

    #[rstest]
    fn defaults_validate(valid_config: HarnessConfig) {
        assert!(valid_config.validate().is_ok());
    }

    #[rstest]
    #[case::unset(None)]
    #[case::blank(Some(String::from("   ")))]
    fn missing_test_root_is_actionable(valid_config: HarnessConfig, #[case] root: Option<String>) {
        let cfg = HarnessConfig {
            test_root: root,
            ..valid_config
        };

        let error = cfg.validate().expect_err("test root is required");
        let ConfigError::MissingField(ref message) = error else {
            panic!("expected MissingField error");
        };
        assert!(message.contains("CONBIND_TEST_ROOT"), "{message}");
        assert!(message.contains("conbind.toml"), "{message}");
        assert!(message.contains("test_root"), "{message}");
    }

    #[rstest]
    fn blank_entry_is_rejected(valid_config: HarnessConfig) {
        let cfg = HarnessConfig {
            entry: String::from(" "),
            ..valid_config
        };

        let error = cfg.validate().expect_err("entry is required");
        assert!(error.to_string().contains("CONBIND_ENTRY"), "{error}");
    }

    #[rstest]
    fn launcher_resolves_under_test_root_bin(valid_config: HarnessConfig) {
        assert_eq!(
            valid_config.launcher_path().expect("launcher path"),
            Utf8PathBuf::from("/opt/runtime/bin/conbind-probe")
        );
    }

    #[rstest]
    fn redirect_all_passes_search_path_and_entry(valid_config: HarnessConfig) {
        let cfg = HarnessConfig {
            search_path: Some(String::from("/opt/classes")),
            ..valid_config
        };

        let scenario = cfg.redirect_all().expect("scenario builds");

        let rendered = format!("{scenario:?}");
        assert!(rendered.contains("/opt/classes"), "{rendered}");
        assert!(rendered.contains("--search-path"), "{rendered}");
    }

    #[rstest]
    fn search_path_defaults_to_launcher_directory(valid_config: HarnessConfig) {
        assert_eq!(
            valid_config.search_path().expect("search path"),
            Utf8PathBuf::from("/opt/runtime/bin")
        );
    }

    #[rstest]
    fn expected_outcome_uses_configured_text(valid_config: HarnessConfig) {
        let cfg = HarnessConfig {
            expected_output: String::from("Bonjour"),
            ..valid_config
        };

        assert_eq!(cfg.expected_outcome().stdout(), b"Bonjour");
        assert_eq!(cfg.expected_outcome().exit_code(), 0);
    }
}
