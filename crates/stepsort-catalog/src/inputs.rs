//! Input generators: fill the main array with one write per position.

use std::f64::consts::PI;

use rand::Rng;
use rand_chacha::ChaCha8Rng;
use stepsort_core::{Addr, Stage, StorageError, Value};
use stepsort_task::{Algorithm, OptionSetting, OptionSpec, Step, Task, TaskContext};

/// Declared option of [`Shape::ManyDuplicates`].
pub fn divisor_option() -> OptionSpec {
    OptionSpec::range("divisor", 16, 1, 1024)
}

/// The value pattern an input writes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Shape {
    /// `i + 1`.
    Linear,
    /// Independent uniform draws from `1..=n`.
    UniformRandom,
    /// Position `i` drawn uniformly from `1..=n - i`.
    DecreasingRandom,
    /// The state of a base-2 radix sort of `[1..n]` before its last pass:
    /// the lower half on even positions, the upper half on odd ones.
    RadixFinalPass,
    /// The state of a merge sort of `[1..n]` before its last merge: odd
    /// values ascending, then even values ascending.
    MergeFinalPass,
    /// `i / divisor * divisor`: runs of equal values.
    ManyDuplicates {
        /// Run length.
        divisor: Value,
    },
    /// A parabola with its vertex in the middle.
    Quadratic,
    /// A cubic through the middle of the range.
    Cubic,
    /// `sqrt((i + 1) * n)`.
    SquareRoot,
    /// One period of a sine wave scaled to `0..n`.
    SineWave,
}

impl Shape {
    /// Display name of the input producing this shape.
    pub fn name(self) -> &'static str {
        match self {
            Self::Linear => "Linear",
            Self::UniformRandom => "Uniform Random",
            Self::DecreasingRandom => "Decreasing Random",
            Self::RadixFinalPass => "Radix Final Pass",
            Self::MergeFinalPass => "Merge Final Pass",
            Self::ManyDuplicates { .. } => "Many Duplicates",
            Self::Quadratic => "Quadratic",
            Self::Cubic => "Cubic",
            Self::SquareRoot => "Square Root",
            Self::SineWave => "Sine Wave",
        }
    }

    /// The value written at position `i` of an array of length `n`.
    pub fn value(self, i: usize, n: usize, rng: &mut ChaCha8Rng) -> Value {
        let half = n / 2;
        match self {
            Self::Linear => i as Value + 1,
            Self::UniformRandom => rng.random_range(1..=n as Value),
            Self::DecreasingRandom => rng.random_range(1..=(n - i) as Value),
            Self::RadixFinalPass => {
                if i % 2 == 0 {
                    (i / 2 + 1) as Value
                } else {
                    (n.div_ceil(2) + i / 2 + 1) as Value
                }
            }
            Self::MergeFinalPass => {
                let odds = n.div_ceil(2);
                if i < odds {
                    (2 * i + 1) as Value
                } else {
                    (2 * (i - odds) + 2) as Value
                }
            }
            Self::ManyDuplicates { divisor } => i as Value / divisor * divisor,
            Self::Quadratic if half == 0 => i as Value + 1,
            Self::Quadratic => {
                let shrink = (half * half) as f64 / n as f64;
                let x = i as f64 - half as f64 + 1.0;
                (x * x / shrink) as Value
            }
            Self::Cubic if half == 0 => i as Value + 1,
            Self::Cubic => {
                let x = (i as f64 - half as f64) / half as f64;
                ((x * x * x + 1.0) * half as f64).max(0.0) as Value
            }
            Self::SquareRoot => (((i + 1) * n) as f64).sqrt() as Value,
            Self::SineWave => {
                let phase = 2.0 * PI * i as f64 / n as f64;
                ((phase.sin() + 1.0) * half as f64) as Value
            }
        }
    }
}

/// An input algorithm: writes [`Shape::value`] to every position in
/// ascending order.
#[derive(Clone, Debug)]
pub struct Input {
    shape: Shape,
}

impl Input {
    /// The input producing `shape`.
    pub fn new(shape: Shape) -> Self {
        Self { shape }
    }

    /// The shape this input writes.
    pub fn shape(&self) -> Shape {
        self.shape
    }
}

impl Algorithm for Input {
    fn name(&self) -> &str {
        self.shape.name()
    }

    fn stage(&self) -> Stage {
        Stage::Input
    }

    fn task(&self) -> Box<dyn Task> {
        Box::new(Fill {
            shape: self.shape,
            n: None,
            i: 0,
        })
    }

    fn options(&self) -> Vec<OptionSetting> {
        match self.shape {
            Shape::ManyDuplicates { divisor } => vec![divisor_option().setting(divisor)],
            _ => Vec::new(),
        }
    }
}

struct Fill {
    shape: Shape,
    n: Option<usize>,
    i: usize,
}

impl Task for Fill {
    fn resume(&mut self, cx: &mut TaskContext<'_>) -> Result<Step, StorageError> {
        let n = *self.n.get_or_insert_with(|| cx.main_len());
        if self.i >= n {
            return Ok(Step::Done);
        }
        let value = self.shape.value(self.i, n, cx.rng());
        cx.write(value, Addr::main(self.i))?;
        self.i += 1;
        Ok(Step::Yield)
    }
}
