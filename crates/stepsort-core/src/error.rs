//! Error types for the stepsort engine.
//!
//! Organized by subsystem: storage access, step sequencing, and
//! configuration (algorithm selection, options, control settings).

use std::error::Error;
use std::fmt;

use crate::Stage;

/// Errors from the storage engine's primitive operations.
///
/// Fatal to the current run: the driver stops and surfaces the error
/// with the statistics accumulated so far.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StorageError {
    /// The referenced array does not exist.
    NoSuchArray {
        /// Requested array index.
        array: usize,
        /// Number of arrays present at the time of the access.
        array_count: usize,
    },
    /// The referenced position is past the end of its array.
    OutOfBounds {
        /// Array index of the access.
        array: usize,
        /// Requested position.
        index: usize,
        /// Length of the array.
        len: usize,
    },
    /// Array 0 holds the working permutation and cannot be deleted.
    ProtectedArray,
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoSuchArray { array, array_count } => {
                write!(f, "array {array} does not exist ({array_count} arrays present)")
            }
            Self::OutOfBounds { array, index, len } => {
                write!(f, "index {index} out of bounds for array {array} of length {len}")
            }
            Self::ProtectedArray => write!(f, "the main array cannot be deleted"),
        }
    }
}

impl Error for StorageError {}

/// Errors from advancing a step sequence.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SequenceError {
    /// The sequence has no more steps. Normal completion signal for the
    /// driver, which moves on to the next stage.
    Exhausted,
    /// A primitive operation failed. The sequence is discarded.
    Storage(StorageError),
}

impl fmt::Display for SequenceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Exhausted => write!(f, "step sequence exhausted"),
            Self::Storage(e) => write!(f, "storage access failed: {e}"),
        }
    }
}

impl Error for SequenceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Storage(e) => Some(e),
            Self::Exhausted => None,
        }
    }
}

impl From<StorageError> for SequenceError {
    fn from(e: StorageError) -> Self {
        Self::Storage(e)
    }
}

/// Errors from algorithm selection, option resolution, and control
/// configuration.
///
/// Surfaced synchronously to the caller; the previously active selection
/// stays in effect.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ConfigError {
    /// No algorithm with this name is registered for the stage.
    UnknownAlgorithm {
        /// Stage that was searched.
        stage: Stage,
        /// Requested name.
        name: String,
    },
    /// The algorithm declares no option with this name.
    UnknownOption {
        /// Algorithm name.
        algorithm: String,
        /// Requested option name.
        option: String,
    },
    /// The value lies outside the option's declared domain.
    OptionOutOfDomain {
        /// Algorithm name.
        algorithm: String,
        /// Option name.
        option: String,
        /// Rejected value, rendered.
        value: String,
        /// Allowed domain, rendered.
        domain: String,
    },
    /// The value has the wrong kind for the option (integer vs. choice).
    OptionTypeMismatch {
        /// Algorithm name.
        algorithm: String,
        /// Option name.
        option: String,
        /// Kind the option expects.
        expected: &'static str,
    },
    /// A mode string (e.g. heap orientation) is not recognized.
    InvalidMode {
        /// What the mode selects.
        what: &'static str,
        /// Rejected mode string.
        mode: String,
    },
    /// A relation symbol is not one of `<`, `<=`, `>`, `>=`, `==`, `!=`.
    UnknownRelation {
        /// Rejected symbol.
        symbol: String,
    },
    /// The requested main array length is zero or above the limit.
    InvalidArrayLength {
        /// Requested length.
        requested: usize,
        /// Configured upper limit.
        max: usize,
    },
    /// Steps per tick must be at least one.
    InvalidStepsPerTick,
    /// An algorithm with this name is already registered for the stage.
    DuplicateAlgorithm {
        /// Stage of the registration.
        stage: Stage,
        /// Duplicated name.
        name: String,
    },
    /// The control thread could not be spawned.
    ThreadSpawnFailed {
        /// OS-level reason.
        reason: String,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownAlgorithm { stage, name } => {
                write!(f, "no {stage} algorithm named '{name}'")
            }
            Self::UnknownOption { algorithm, option } => {
                write!(f, "'{algorithm}' has no option '{option}'")
            }
            Self::OptionOutOfDomain {
                algorithm,
                option,
                value,
                domain,
            } => write!(
                f,
                "option '{option}' of '{algorithm}' does not accept {value} (allowed: {domain})"
            ),
            Self::OptionTypeMismatch {
                algorithm,
                option,
                expected,
            } => write!(f, "option '{option}' of '{algorithm}' expects {expected}"),
            Self::InvalidMode { what, mode } => write!(f, "invalid {what} '{mode}'"),
            Self::UnknownRelation { symbol } => write!(f, "unknown relation '{symbol}'"),
            Self::InvalidArrayLength { requested, max } => {
                write!(f, "main array length {requested} not in 1..={max}")
            }
            Self::InvalidStepsPerTick => write!(f, "steps_per_tick must be at least 1"),
            Self::DuplicateAlgorithm { stage, name } => {
                write!(f, "{stage} algorithm '{name}' is already registered")
            }
            Self::ThreadSpawnFailed { reason } => {
                write!(f, "failed to spawn control thread: {reason}")
            }
        }
    }
}

impl Error for ConfigError {}
