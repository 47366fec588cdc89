#![forbid(unsafe_code)]

//! Carousel tuning as data.
//!
//! [`CarouselConfig`] collects the exit-transition timing and the host
//! behaviour switches in one struct. With the `config` feature it can be
//! loaded from TOML or JSON at startup:
//!
//! ```toml
//! # smartspace.toml
//! transition_duration_ms = 360
//! dismiss_margin = 16.0
//! easing = "ease_out_cubic"
//! preview_mode = false
//! ```
//!
//! ```rust,ignore
//! let config = CarouselConfig::from_toml_file("smartspace.toml")?;
//! ```
//!
//! Missing keys fall back to [`CarouselConfig::default`].

use std::fmt;
#[cfg(feature = "config")]
use std::path::Path;
use std::time::Duration;

#[cfg(feature = "config")]
use serde::{Deserialize, Serialize};

use smartspace_core::animation::{self, EasingFn};

/// Longest exit transition accepted by [`CarouselConfig::validate`].
const MAX_TRANSITION_MS: u64 = 5_000;

/// Named easing curves for configuration files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "config", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "config", serde(rename_all = "snake_case"))]
pub enum EasingKind {
    Linear,
    EaseIn,
    EaseOut,
    EaseInOut,
    #[default]
    EaseOutCubic,
}

impl EasingKind {
    #[must_use]
    pub fn curve(self) -> EasingFn {
        match self {
            Self::Linear => animation::linear,
            Self::EaseIn => animation::ease_in,
            Self::EaseOut => animation::ease_out,
            Self::EaseInOut => animation::ease_in_out,
            Self::EaseOutCubic => animation::ease_out_cubic,
        }
    }
}

/// Tunables for one carousel instance.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "config", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "config", serde(default))]
pub struct CarouselConfig {
    /// Length of the exit transition in milliseconds.
    pub transition_duration_ms: u64,
    /// Extra distance, beyond the card height, the outgoing card travels.
    pub dismiss_margin: f32,
    /// Curve applied to every channel of the exit transition.
    pub easing: EasingKind,
    /// Preview instances never open the options menu.
    pub preview_mode: bool,
}

impl Default for CarouselConfig {
    fn default() -> Self {
        Self {
            transition_duration_ms: 360,
            dismiss_margin: 16.0,
            easing: EasingKind::default(),
            preview_mode: false,
        }
    }
}

impl CarouselConfig {
    #[must_use]
    pub fn transition_duration(&self) -> Duration {
        Duration::from_millis(self.transition_duration_ms)
    }

    /// Set the transition length (builder pattern).
    #[must_use]
    pub fn with_transition_duration(mut self, duration: Duration) -> Self {
        self.transition_duration_ms = u64::try_from(duration.as_millis()).unwrap_or(u64::MAX);
        self
    }

    /// Mark this instance as a preview (builder pattern).
    #[must_use]
    pub fn with_preview_mode(mut self, preview: bool) -> Self {
        self.preview_mode = preview;
        self
    }

    /// Load from a TOML string.
    #[cfg(feature = "config")]
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(s).map_err(ConfigError::Toml)?;
        config.validated()
    }

    /// Load from a TOML file on disk.
    #[cfg(feature = "config")]
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(ConfigError::Io)?;
        Self::from_toml_str(&content)
    }

    /// Load from a JSON string.
    #[cfg(feature = "config")]
    pub fn from_json_str(s: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(s).map_err(ConfigError::Json)?;
        config.validated()
    }

    /// Load from a JSON file on disk.
    #[cfg(feature = "config")]
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(ConfigError::Io)?;
        Self::from_json_str(&content)
    }

    /// Validate all parameters. An empty list means the config is valid.
    #[must_use]
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();
        if self.transition_duration_ms == 0 {
            errors.push("transition_duration_ms must be > 0".into());
        }
        if self.transition_duration_ms > MAX_TRANSITION_MS {
            errors.push(format!(
                "transition_duration_ms must be <= {MAX_TRANSITION_MS}, got {}",
                self.transition_duration_ms
            ));
        }
        if !self.dismiss_margin.is_finite() || self.dismiss_margin < 0.0 {
            errors.push(format!(
                "dismiss_margin must be finite and >= 0, got {}",
                self.dismiss_margin
            ));
        }
        errors
    }

    #[cfg(feature = "config")]
    fn validated(self) -> Result<Self, ConfigError> {
        let errors = self.validate();
        if errors.is_empty() {
            Ok(self)
        } else {
            Err(ConfigError::Validation(errors))
        }
    }
}

/// Errors from loading a [`CarouselConfig`].
#[derive(Debug)]
pub enum ConfigError {
    /// I/O error reading a file.
    Io(std::io::Error),
    /// TOML parse error.
    #[cfg(feature = "config")]
    Toml(toml::de::Error),
    /// JSON parse error.
    #[cfg(feature = "config")]
    Json(serde_json::Error),
    /// Validation errors.
    Validation(Vec<String>),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(err) => write!(f, "config I/O: {err}"),
            #[cfg(feature = "config")]
            Self::Toml(err) => write!(f, "config TOML: {err}"),
            #[cfg(feature = "config")]
            Self::Json(err) => write!(f, "config JSON: {err}"),
            Self::Validation(errors) => write!(f, "invalid config: {}", errors.join("; ")),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            #[cfg(feature = "config")]
            Self::Toml(err) => Some(err),
            #[cfg(feature = "config")]
            Self::Json(err) => Some(err),
            Self::Validation(_) => None,
        }
    }
}
