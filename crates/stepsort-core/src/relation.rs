//! Comparison relations.
//!
//! A closed set of six relations evaluated through a fixed table, so
//! algorithms never construct comparisons from text at run time. Parsing
//! a symbol is only used at configuration boundaries.

use std::fmt;
use std::str::FromStr;

use crate::error::ConfigError;
use crate::Value;

/// A binary relation between two values.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Relation {
    /// `a < b`
    Lt,
    /// `a <= b`
    Le,
    /// `a > b`
    Gt,
    /// `a >= b`
    Ge,
    /// `a == b`
    Eq,
    /// `a != b`
    Ne,
}

impl Relation {
    /// Every relation, in declaration order.
    pub const ALL: [Relation; 6] = [
        Relation::Lt,
        Relation::Le,
        Relation::Gt,
        Relation::Ge,
        Relation::Eq,
        Relation::Ne,
    ];

    /// Evaluate `a <self> b`.
    #[inline]
    pub fn holds(self, a: Value, b: Value) -> bool {
        match self {
            Self::Lt => a < b,
            Self::Le => a <= b,
            Self::Gt => a > b,
            Self::Ge => a >= b,
            Self::Eq => a == b,
            Self::Ne => a != b,
        }
    }

    /// The relation that holds for `(b, a)` whenever `self` holds for `(a, b)`.
    pub fn mirrored(self) -> Self {
        match self {
            Self::Lt => Self::Gt,
            Self::Le => Self::Ge,
            Self::Gt => Self::Lt,
            Self::Ge => Self::Le,
            Self::Eq => Self::Eq,
            Self::Ne => Self::Ne,
        }
    }

    /// The source-code symbol of this relation.
    pub fn symbol(self) -> &'static str {
        match self {
            Self::Lt => "<",
            Self::Le => "<=",
            Self::Gt => ">",
            Self::Ge => ">=",
            Self::Eq => "==",
            Self::Ne => "!=",
        }
    }
}

impl fmt::Display for Relation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

impl FromStr for Relation {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|r| r.symbol() == s.trim())
            .ok_or_else(|| ConfigError::UnknownRelation {
                symbol: s.to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn symbols_parse_back() {
        for r in Relation::ALL {
            assert_eq!(r.symbol().parse::<Relation>(), Ok(r));
        }
    }

    #[test]
    fn unknown_symbol_is_config_error() {
        let err = "<>".parse::<Relation>().unwrap_err();
        assert_eq!(
            err,
            ConfigError::UnknownRelation {
                symbol: "<>".into()
            }
        );
    }

    proptest! {
        #[test]
        fn holds_matches_std_ordering(a in -50i64..50, b in -50i64..50) {
            prop_assert_eq!(Relation::Lt.holds(a, b), a < b);
            prop_assert_eq!(Relation::Le.holds(a, b), a <= b);
            prop_assert_eq!(Relation::Gt.holds(a, b), a > b);
            prop_assert_eq!(Relation::Ge.holds(a, b), a >= b);
            prop_assert_eq!(Relation::Eq.holds(a, b), a == b);
            prop_assert_eq!(Relation::Ne.holds(a, b), a != b);
        }

        #[test]
        fn mirrored_swaps_operands(a in -50i64..50, b in -50i64..50) {
            for r in Relation::ALL {
                prop_assert_eq!(r.holds(a, b), r.mirrored().holds(b, a));
            }
        }
    }
}
