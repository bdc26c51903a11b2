//! Write session configuration.

use crate::error::{CoreError, CoreResult};
use rawout_codec::FormatVersion;
use serde::{Deserialize, Serialize};

/// Configuration for a write session.
///
/// Field names serialize in camelCase (`eventsPerDestination`,
/// `formatVersion`, ...) so a configuration file reads like the option
/// names of the output module.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase", deny_unknown_fields)]
pub struct Config {
    /// Label of the fragment-collection input.
    pub source_label: String,

    /// Instance name of the fragment-collection input.
    pub source_instance: String,

    /// Events written to one destination before rotating to the next.
    pub events_per_destination: u32,

    /// Record format version, 1 through 6.
    pub format_version: u32,

    /// Whether version 6 records carry header flags.
    pub include_optional_flags: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            source_label: "source".to_string(),
            source_instance: String::new(),
            events_per_destination: 100,
            format_version: 5,
            include_optional_flags: true,
        }
    }
}

impl Config {
    /// Creates a new configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the input label.
    #[must_use]
    pub fn source_label(mut self, label: impl Into<String>) -> Self {
        self.source_label = label.into();
        self
    }

    /// Sets the input instance.
    #[must_use]
    pub fn source_instance(mut self, instance: impl Into<String>) -> Self {
        self.source_instance = instance.into();
        self
    }

    /// Sets the rotation threshold.
    #[must_use]
    pub const fn events_per_destination(mut self, events: u32) -> Self {
        self.events_per_destination = events;
        self
    }

    /// Sets the record format version.
    #[must_use]
    pub const fn format_version(mut self, version: u32) -> Self {
        self.format_version = version;
        self
    }

    /// Sets whether optional header flags are written.
    #[must_use]
    pub const fn include_optional_flags(mut self, value: bool) -> Self {
        self.include_optional_flags = value;
        self
    }

    /// Input tag in `label:instance` form.
    #[must_use]
    pub fn source_tag(&self) -> String {
        if self.source_instance.is_empty() {
            self.source_label.clone()
        } else {
            format!("{}:{}", self.source_label, self.source_instance)
        }
    }

    /// Checks the configuration and returns the validated format version.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::Config`] for an unsupported version or a zero
    /// rotation threshold.
    pub fn validate(&self) -> CoreResult<FormatVersion> {
        if self.events_per_destination == 0 {
            return Err(CoreError::config("eventsPerDestination must be at least 1"));
        }
        FormatVersion::new(self.format_version).map_err(|e| CoreError::config(e.to_string()))
    }
}
