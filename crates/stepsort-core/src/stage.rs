//! Pipeline stages.

use std::fmt;

/// One of the four phases of a run, in pipeline order.
///
/// Also the grouping key of the algorithm catalog: every algorithm
/// belongs to exactly one stage.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Stage {
    /// Fills the main array.
    Input,
    /// Permutes the main array.
    Shuffle,
    /// Sorts the main array ascending.
    Sort,
    /// Checks the main array is ascending.
    Verify,
}

impl Stage {
    /// All stages in pipeline order.
    pub const ALL: [Stage; 4] = [Stage::Input, Stage::Shuffle, Stage::Sort, Stage::Verify];

    /// The stage after this one, or `None` after [`Stage::Verify`].
    pub fn next(self) -> Option<Stage> {
        match self {
            Self::Input => Some(Self::Shuffle),
            Self::Shuffle => Some(Self::Sort),
            Self::Sort => Some(Self::Verify),
            Self::Verify => None,
        }
    }

    /// Position of this stage in [`Stage::ALL`].
    pub fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Input => "input",
            Self::Shuffle => "shuffle",
            Self::Sort => "sort",
            Self::Verify => "verify",
        };
        f.write_str(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn next_walks_pipeline_order() {
        let mut seen = vec![Stage::Input];
        while let Some(s) = seen.last().and_then(|s| s.next()) {
            seen.push(s);
        }
        assert_eq!(seen, Stage::ALL);
        for (i, s) in Stage::ALL.iter().enumerate() {
            assert_eq!(s.index(), i);
        }
    }
}
