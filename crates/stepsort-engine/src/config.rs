//! Control configuration and algorithm selections.
//!
//! [`ControlConfig`] is the builder-input for a [`Control`](crate::Control).
//! [`validate()`](ControlConfig::validate) checks the numeric settings;
//! the algorithm names are checked against the catalog when the control
//! is constructed.

use std::time::Duration;

use stepsort_core::ConfigError;
use stepsort_task::OptionValue;

// ── Selection ──────────────────────────────────────────────────────

/// An algorithm name plus the option overrides to build it with.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Selection {
    /// Catalog display name.
    pub name: String,
    /// Overrides applied on top of the declared defaults.
    pub options: Vec<(String, OptionValue)>,
}

impl Selection {
    /// Select `name` with default options.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            options: Vec::new(),
        }
    }

    /// Add an option override.
    pub fn with(mut self, option: impl Into<String>, value: impl Into<OptionValue>) -> Self {
        self.options.push((option.into(), value.into()));
        self
    }

    /// Overrides in the borrowed form the catalog accepts.
    pub fn overrides(&self) -> Vec<(&str, OptionValue)> {
        self.options
            .iter()
            .map(|(name, value)| (name.as_str(), value.clone()))
            .collect()
    }

    pub(crate) fn from_overrides(name: &str, options: &[(&str, OptionValue)]) -> Self {
        Self {
            name: name.to_string(),
            options: options
                .iter()
                .map(|(option, value)| (option.to_string(), value.clone()))
                .collect(),
        }
    }
}

// ── ControlConfig ──────────────────────────────────────────────────

/// Complete configuration for constructing a control.
#[derive(Clone, Debug)]
pub struct ControlConfig {
    /// Length of the main array. Default: 64.
    pub main_array_len: usize,
    /// Upper bound accepted by `set_main_array_len`. Default: 65536.
    pub max_array_len: usize,
    /// Minimum wall-clock time between ticks of a
    /// [`RealtimeControl`](crate::RealtimeControl). Ignored by the
    /// lockstep [`Control`](crate::Control). Default: zero.
    pub step_delay: Duration,
    /// Primitive operations performed per tick. Default: 1.
    pub steps_per_tick: usize,
    /// Seed of the generator shared by all stages. Default: 0.
    pub seed: u64,
    /// Initial input generator. Default: "Linear".
    pub input: Selection,
    /// Initial shuffle. Default: "Swap Shuffle".
    pub shuffle: Selection,
    /// Initial sort. Default: "Bubble Sort".
    pub sort: Selection,
}

impl Default for ControlConfig {
    fn default() -> Self {
        Self {
            main_array_len: 64,
            max_array_len: 1 << 16,
            step_delay: Duration::ZERO,
            steps_per_tick: 1,
            seed: 0,
            input: Selection::named("Linear"),
            shuffle: Selection::named("Swap Shuffle"),
            sort: Selection::named("Bubble Sort"),
        }
    }
}

impl ControlConfig {
    /// Check the numeric settings.
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_array_len(self.main_array_len, self.max_array_len)?;
        if self.steps_per_tick == 0 {
            return Err(ConfigError::InvalidStepsPerTick);
        }
        Ok(())
    }
}

pub(crate) fn check_array_len(requested: usize, max: usize) -> Result<(), ConfigError> {
    if requested == 0 || requested > max {
        return Err(ConfigError::InvalidArrayLength { requested, max });
    }
    Ok(())
}
