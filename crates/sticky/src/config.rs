//! Per-instance configuration.
//!
//! Defaults are an immutable value handed to each instance; overrides are merged into a copy,
//! so one instance can never leak settings into another.

use anyhow::Error;
use serde::{Deserialize, Serialize};
use std::env;

/// Effective settings of one [`crate::StickyEvents`] instance.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StickyConfig {
    /// Tag sentinels with the debug class so they can be styled visibly.
    pub debug: bool,
}

impl StickyConfig {
    #[inline]
    #[must_use]
    pub const fn new(debug: bool) -> Self {
        Self { debug }
    }

    /// Load defaults from environment variables.
    ///
    /// Reads `STICKY_DEBUG`: set to "1" to enable debug sentinels (default: disabled).
    #[must_use]
    pub fn from_env() -> Self {
        let debug = env::var("STICKY_DEBUG").ok().as_deref() == Some("1");
        Self { debug }
    }

    /// A copy of `self` with every field set in `overrides` replaced.
    #[must_use]
    pub fn merged(&self, overrides: &ConfigOverrides) -> Self {
        Self {
            debug: overrides.debug.unwrap_or(self.debug),
        }
    }
}

/// Caller-supplied settings; unset fields fall back to the defaults.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfigOverrides {
    pub debug: Option<bool>,
}

impl ConfigOverrides {
    #[inline]
    #[must_use]
    pub const fn debug(debug: bool) -> Self {
        Self { debug: Some(debug) }
    }

    /// Parse overrides from a JSON object such as `{"debug": true}`. Unknown keys are ignored.
    pub fn from_json(source: &str) -> Result<Self, Error> {
        Ok(serde_json::from_str(source)?)
    }
}

#[cfg(test)]
mod tests {
    use super::{ConfigOverrides, StickyConfig};

    #[test]
    fn overrides_do_not_touch_defaults() {
        let defaults = StickyConfig::default();
        let debug = defaults.merged(&ConfigOverrides::debug(true));
        assert!(debug.debug);
        assert!(!defaults.debug);
        assert!(!defaults.merged(&ConfigOverrides::default()).debug);
        assert!(StickyConfig::new(true).merged(&ConfigOverrides::default()).debug);
    }

    #[test]
    fn json_overrides() {
        assert_eq!(
            ConfigOverrides::from_json(r#"{"debug": true, "offset": 4}"#).unwrap(),
            ConfigOverrides::debug(true)
        );
        assert_eq!(ConfigOverrides::from_json("{}").unwrap(), ConfigOverrides::default());
        assert!(ConfigOverrides::from_json(r#"{"debug": "yes"}"#).is_err());
    }
}
