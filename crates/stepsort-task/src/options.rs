//! Algorithm options: declarations, domains and resolution.
//!
//! Algorithms declare their options as [`OptionSpec`]s. At selection time
//! the caller's overrides are validated against those declarations into
//! an [`OptionSet`], from which the algorithm builds its own typed
//! configuration once. Nothing re-reads options during a run.

use std::fmt;

use indexmap::IndexMap;
use stepsort_core::ConfigError;

/// A concrete option value.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum OptionValue {
    /// A bounded integer.
    Int(i64),
    /// One of a finite set of named choices.
    Choice(String),
}

impl From<i64> for OptionValue {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<&str> for OptionValue {
    fn from(v: &str) -> Self {
        Self::Choice(v.to_string())
    }
}

impl From<String> for OptionValue {
    fn from(v: String) -> Self {
        Self::Choice(v)
    }
}

impl fmt::Display for OptionValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(v) => write!(f, "{v}"),
            Self::Choice(c) => write!(f, "'{c}'"),
        }
    }
}

/// The allowed values of an option.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Domain {
    /// Integers in `min..=max`.
    Range {
        /// Smallest allowed value.
        min: i64,
        /// Largest allowed value.
        max: i64,
    },
    /// Exactly these choices.
    Choices(&'static [&'static str]),
}

impl Domain {
    /// Whether `value` is of the right kind and within the domain.
    pub fn admits(&self, value: &OptionValue) -> bool {
        match (self, value) {
            (Self::Range { min, max }, OptionValue::Int(v)) => (*min..=*max).contains(v),
            (Self::Choices(choices), OptionValue::Choice(c)) => choices.contains(&c.as_str()),
            _ => false,
        }
    }

    fn kind(&self) -> &'static str {
        match self {
            Self::Range { .. } => "an integer",
            Self::Choices(_) => "a choice",
        }
    }

    fn same_kind(&self, value: &OptionValue) -> bool {
        matches!(
            (self, value),
            (Self::Range { .. }, OptionValue::Int(_)) | (Self::Choices(_), OptionValue::Choice(_))
        )
    }
}

impl fmt::Display for Domain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Range { min, max } => write!(f, "{min}..={max}"),
            Self::Choices(choices) => write!(f, "{}", choices.join(" | ")),
        }
    }
}

/// Declaration of one option: name, default and domain.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OptionSpec {
    /// Option name, unique per algorithm.
    pub name: &'static str,
    /// Value used when the caller does not override it.
    pub default: OptionValue,
    /// Allowed values.
    pub domain: Domain,
}

impl OptionSpec {
    /// An integer option in `min..=max`.
    pub fn range(name: &'static str, default: i64, min: i64, max: i64) -> Self {
        Self {
            name,
            default: OptionValue::Int(default),
            domain: Domain::Range { min, max },
        }
    }

    /// A choice option.
    pub fn choice(
        name: &'static str,
        default: &'static str,
        choices: &'static [&'static str],
    ) -> Self {
        Self {
            name,
            default: OptionValue::Choice(default.to_string()),
            domain: Domain::Choices(choices),
        }
    }

    /// This option at `value`, for reporting.
    pub fn setting(&self, value: impl Into<OptionValue>) -> OptionSetting {
        OptionSetting {
            name: self.name,
            value: value.into(),
            domain: self.domain.clone(),
        }
    }
}

/// An option's current value together with its domain, for
/// introspection by drivers.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OptionSetting {
    /// Option name.
    pub name: &'static str,
    /// Current value.
    pub value: OptionValue,
    /// Allowed values.
    pub domain: Domain,
}

/// Validated option values for one algorithm.
#[derive(Clone, Debug, Default)]
pub struct OptionSet {
    algorithm: String,
    values: IndexMap<&'static str, OptionSetting>,
}

impl OptionSet {
    /// Apply `overrides` on top of the defaults declared by `specs`.
    ///
    /// # Errors
    ///
    /// [`ConfigError::UnknownOption`] if an override names no declared
    /// option, [`ConfigError::OptionTypeMismatch`] if it has the wrong
    /// kind, [`ConfigError::OptionOutOfDomain`] if it is outside the
    /// domain.
    pub fn resolve(
        algorithm: &str,
        specs: &[OptionSpec],
        overrides: &[(&str, OptionValue)],
    ) -> Result<Self, ConfigError> {
        let mut values: IndexMap<&'static str, OptionSetting> = specs
            .iter()
            .map(|s| {
                (
                    s.name,
                    OptionSetting {
                        name: s.name,
                        value: s.default.clone(),
                        domain: s.domain.clone(),
                    },
                )
            })
            .collect();

        for (name, value) in overrides {
            let setting = values
                .get_mut(*name)
                .ok_or_else(|| ConfigError::UnknownOption {
                    algorithm: algorithm.to_string(),
                    option: name.to_string(),
                })?;
            if !setting.domain.same_kind(value) {
                return Err(ConfigError::OptionTypeMismatch {
                    algorithm: algorithm.to_string(),
                    option: name.to_string(),
                    expected: setting.domain.kind(),
                });
            }
            if !setting.domain.admits(value) {
                return Err(ConfigError::OptionOutOfDomain {
                    algorithm: algorithm.to_string(),
                    option: name.to_string(),
                    value: value.to_string(),
                    domain: setting.domain.to_string(),
                });
            }
            setting.value = value.clone();
        }

        Ok(Self {
            algorithm: algorithm.to_string(),
            values,
        })
    }

    fn get(&self, name: &str) -> Result<&OptionSetting, ConfigError> {
        self.values
            .get(name)
            .ok_or_else(|| ConfigError::UnknownOption {
                algorithm: self.algorithm.clone(),
                option: name.to_string(),
            })
    }

    /// The integer value of option `name`.
    pub fn int(&self, name: &str) -> Result<i64, ConfigError> {
        match &self.get(name)?.value {
            OptionValue::Int(v) => Ok(*v),
            OptionValue::Choice(_) => Err(ConfigError::OptionTypeMismatch {
                algorithm: self.algorithm.clone(),
                option: name.to_string(),
                expected: "a choice",
            }),
        }
    }

    /// The choice value of option `name`.
    pub fn choice(&self, name: &str) -> Result<&str, ConfigError> {
        match &self.get(name)?.value {
            OptionValue::Choice(c) => Ok(c.as_str()),
            OptionValue::Int(_) => Err(ConfigError::OptionTypeMismatch {
                algorithm: self.algorithm.clone(),
                option: name.to_string(),
                expected: "an integer",
            }),
        }
    }

    /// All settings in declaration order.
    pub fn settings(&self) -> Vec<OptionSetting> {
        self.values.values().cloned().collect()
    }
}
