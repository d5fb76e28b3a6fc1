//! Configuration shared by the reconcilers.

use std::path::Path;
use std::time::Duration;

use kiln_core::{Error, Result};
use serde::{Deserialize, Serialize};

/// Environment variable overriding the source polling frequency (seconds).
pub const SOURCE_POLLING_FREQUENCY_ENV: &str = "KILN_SOURCE_POLLING_FREQUENCY";

/// Environment variable overriding the builder polling frequency (seconds).
pub const BUILDER_POLLING_FREQUENCY_ENV: &str = "KILN_BUILDER_POLLING_FREQUENCY";

/// Options handed to the reconciler constructors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct ReconcilerOptions {
    /// Delay before a pollable source resolver is resolved again.
    #[serde(with = "duration_secs", default = "default_polling_frequency")]
    pub source_polling_frequency: Duration,

    /// Delay before a polling builder image is inspected again.
    #[serde(with = "duration_secs", default = "default_polling_frequency")]
    pub builder_polling_frequency: Duration,
}

impl Default for ReconcilerOptions {
    fn default() -> Self {
        Self {
            source_polling_frequency: default_polling_frequency(),
            builder_polling_frequency: default_polling_frequency(),
        }
    }
}

impl ReconcilerOptions {
    /// Set the source polling frequency.
    #[must_use]
    pub const fn with_source_polling_frequency(mut self, frequency: Duration) -> Self {
        self.source_polling_frequency = frequency;
        self
    }

    /// Set the builder polling frequency.
    #[must_use]
    pub const fn with_builder_polling_frequency(mut self, frequency: Duration) -> Self {
        self.builder_polling_frequency = frequency;
        self
    }

    /// Load options from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load options from an arbitrary variable lookup.
    ///
    /// Values are whole seconds. Unparsable values are ignored, and so is
    /// zero, which [`ReconcilerOptions::validate`] would reject.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let secs = |name: &str| {
            lookup(name)
                .and_then(|value| value.trim().parse::<u64>().ok())
                .filter(|secs| *secs > 0)
                .map(Duration::from_secs)
        };

        let mut options = Self::default();
        if let Some(frequency) = secs(SOURCE_POLLING_FREQUENCY_ENV) {
            options.source_polling_frequency = frequency;
        }
        if let Some(frequency) = secs(BUILDER_POLLING_FREQUENCY_ENV) {
            options.builder_polling_frequency = frequency;
        }
        options
    }

    /// Load options from a file: JSON when the extension is `json`, TOML
    /// otherwise.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, parsed, or fails
    /// [`ReconcilerOptions::validate`].
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::file_read_failed(path, e.to_string()))?;

        let options: Self = if path.extension().is_some_and(|e| e == "json") {
            serde_json::from_str(&content).map_err(|e| Error::config_parse_failed(e.to_string()))?
        } else {
            toml::from_str(&content).map_err(|e| Error::config_parse_failed(e.to_string()))?
        };

        options.validate()?;
        Ok(options)
    }

    /// Reject options that would turn polling into a hot loop.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfig`] if either frequency is zero.
    pub fn validate(&self) -> Result<()> {
        if self.source_polling_frequency.is_zero() {
            return Err(Error::invalid_config("source_polling_frequency must be non-zero"));
        }
        if self.builder_polling_frequency.is_zero() {
            return Err(Error::invalid_config("builder_polling_frequency must be non-zero"));
        }
        Ok(())
    }
}

const fn default_polling_frequency() -> Duration {
    Duration::from_secs(60)
}

/// Serialization helper for Duration as seconds.
mod duration_secs {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        duration.as_secs().serialize(serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        let secs = u64::deserialize(deserializer)?;
        Ok(Duration::from_secs(secs))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use std::collections::HashMap;
    use std::io::Write;

    use super::*;

    #[test]
    fn test_default_options() {
        let options = ReconcilerOptions::default();
        assert_eq!(options.source_polling_frequency, Duration::from_secs(60));
        assert_eq!(options.builder_polling_frequency, Duration::from_secs(60));
        assert!(options.validate().is_ok());
    }

    #[test]
    fn test_options_builder() {
        let options = ReconcilerOptions::default()
            .with_source_polling_frequency(Duration::from_secs(30))
            .with_builder_polling_frequency(Duration::from_secs(300));
        assert_eq!(options.source_polling_frequency, Duration::from_secs(30));
        assert_eq!(options.builder_polling_frequency, Duration::from_secs(300));
    }

    #[test]
    fn test_from_lookup_overrides_and_ignores_garbage() {
        let vars = HashMap::from([
            (SOURCE_POLLING_FREQUENCY_ENV, " 15 "),
            (BUILDER_POLLING_FREQUENCY_ENV, "five minutes"),
        ]);
        let options =
            ReconcilerOptions::from_lookup(|name| vars.get(name).map(ToString::to_string));

        assert_eq!(options.source_polling_frequency, Duration::from_secs(15));
        assert_eq!(options.builder_polling_frequency, Duration::from_secs(60));
    }

    #[test]
    fn test_from_lookup_ignores_zero_frequency() {
        let vars = HashMap::from([
            (SOURCE_POLLING_FREQUENCY_ENV, "0"),
            (BUILDER_POLLING_FREQUENCY_ENV, " 0 "),
        ]);
        let options =
            ReconcilerOptions::from_lookup(|name| vars.get(name).map(ToString::to_string));

        assert_eq!(options.source_polling_frequency, Duration::from_secs(60));
        assert_eq!(options.builder_polling_frequency, Duration::from_secs(60));
        assert!(options.validate().is_ok());
    }

    #[test]
    fn test_from_toml_file() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "source_polling_frequency = 120").unwrap();

        let options = ReconcilerOptions::from_file(file.path()).unwrap();
        assert_eq!(options.source_polling_frequency, Duration::from_secs(120));
        assert_eq!(options.builder_polling_frequency, Duration::from_secs(60));
    }

    #[test]
    fn test_from_json_file() {
        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        write!(file, r#"{{"builder_polling_frequency": 10}}"#).unwrap();

        let options = ReconcilerOptions::from_file(file.path()).unwrap();
        assert_eq!(options.builder_polling_frequency, Duration::from_secs(10));
    }

    #[test]
    fn test_from_file_rejects_zero_frequency() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "builder_polling_frequency = 0").unwrap();

        let err = ReconcilerOptions::from_file(file.path()).unwrap_err();
        assert!(matches!(err, Error::InvalidConfig { .. }));
    }

    #[test]
    fn test_from_file_reports_parse_errors() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "source_polling_frequency = \"soon\"").unwrap();

        let err = ReconcilerOptions::from_file(file.path()).unwrap_err();
        assert!(matches!(err, Error::ConfigParseFailed { .. }));
    }

    #[test]
    fn test_from_missing_file() {
        let err = ReconcilerOptions::from_file(Path::new("/nonexistent/kiln.toml")).unwrap_err();
        assert!(matches!(err, Error::FileReadFailed { .. }));
    }
}
