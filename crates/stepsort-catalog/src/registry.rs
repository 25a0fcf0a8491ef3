//! The algorithm registry.
//!
//! [`Catalog::standard`] lists every built-in algorithm once, per stage,
//! in display order. Drivers select by name; the entry's builder
//! resolves the caller's option overrides and returns a configured
//! algorithm.

use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;
use stepsort_core::{ConfigError, Stage};
use stepsort_task::{Algorithm, OptionSet, OptionSpec, OptionValue};
use tracing::debug;

use crate::inputs::{divisor_option, Input, Shape};
use crate::kernels::{HeapifyStrategy, Orientation};
use crate::shuffles::{self, Shuffle};
use crate::sorts::{
    distribution, heap, merge, BogoSort, Combine, CountingSort, ExchangeSort, GravitySort,
    HeapSort, InPlaceMergeSort, MergeSort, Network, NetworkSort, PigeonholeSort, QuickSort,
    RadixLsdSort, SelectionSort, SlowSort, SquareRootSort,
};
use crate::verify::Verify;

/// Builds a configured algorithm from resolved options.
pub type Builder =
    Box<dyn Fn(&OptionSet) -> Result<Arc<dyn Algorithm>, ConfigError> + Send + Sync>;

/// One registered algorithm.
pub struct Entry {
    name: &'static str,
    options: Vec<OptionSpec>,
    build: Builder,
}

impl Entry {
    /// An entry without options.
    pub fn new<F>(name: &'static str, build: F) -> Self
    where
        F: Fn(&OptionSet) -> Result<Arc<dyn Algorithm>, ConfigError> + Send + Sync + 'static,
    {
        Self {
            name,
            options: Vec::new(),
            build: Box::new(build),
        }
    }

    /// Declare the options this entry accepts.
    pub fn with_options(mut self, options: Vec<OptionSpec>) -> Self {
        self.options = options;
        self
    }

    /// Display name.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Declared options.
    pub fn options(&self) -> &[OptionSpec] {
        &self.options
    }
}

impl fmt::Debug for Entry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Entry")
            .field("name", &self.name)
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

fn shared(algorithm: impl Algorithm + 'static) -> Result<Arc<dyn Algorithm>, ConfigError> {
    Ok(Arc::new(algorithm))
}

/// Registered algorithms, per stage, in registration order.
#[derive(Debug, Default)]
pub struct Catalog {
    stages: [IndexMap<&'static str, Entry>; 4],
}

impl Catalog {
    /// An empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Every built-in input, shuffle and sort, plus the verifier.
    pub fn standard() -> Self {
        let mut catalog = Self::new();
        for (stage, entry) in standard_inputs()
            .into_iter()
            .map(|e| (Stage::Input, e))
            .chain(standard_shuffles().into_iter().map(|e| (Stage::Shuffle, e)))
            .chain(standard_sorts().into_iter().map(|e| (Stage::Sort, e)))
            .chain(std::iter::once((
                Stage::Verify,
                Entry::new("Verify", |_| shared(Verify)),
            )))
        {
            // Built-in names are distinct per stage.
            let _ = catalog.register(stage, entry);
        }
        catalog
    }

    /// Add `entry` under `stage`.
    ///
    /// # Errors
    ///
    /// [`ConfigError::DuplicateAlgorithm`] if the stage already has an
    /// entry with the same name.
    pub fn register(&mut self, stage: Stage, entry: Entry) -> Result<(), ConfigError> {
        let entries = &mut self.stages[stage.index()];
        if entries.contains_key(entry.name) {
            return Err(ConfigError::DuplicateAlgorithm {
                stage,
                name: entry.name.to_string(),
            });
        }
        debug!(%stage, name = entry.name, "registered algorithm");
        entries.insert(entry.name, entry);
        Ok(())
    }

    /// Names registered under `stage`, in order.
    pub fn names(&self, stage: Stage) -> Vec<&'static str> {
        self.stages[stage.index()].keys().copied().collect()
    }

    /// Whether `stage` has an entry called `name`.
    pub fn contains(&self, stage: Stage, name: &str) -> bool {
        self.stages[stage.index()].contains_key(name)
    }

    fn entry(&self, stage: Stage, name: &str) -> Result<&Entry, ConfigError> {
        self.stages[stage.index()]
            .get(name)
            .ok_or_else(|| ConfigError::UnknownAlgorithm {
                stage,
                name: name.to_string(),
            })
    }

    /// Options declared by `name`.
    ///
    /// # Errors
    ///
    /// [`ConfigError::UnknownAlgorithm`] if `stage` has no such entry.
    pub fn options(&self, stage: Stage, name: &str) -> Result<&[OptionSpec], ConfigError> {
        Ok(self.entry(stage, name)?.options())
    }

    /// Resolve `overrides` against `name`'s declared options and build it.
    ///
    /// # Errors
    ///
    /// [`ConfigError::UnknownAlgorithm`] for an unknown name, or any
    /// option error from [`OptionSet::resolve`] or the builder.
    pub fn build(
        &self,
        stage: Stage,
        name: &str,
        overrides: &[(&str, OptionValue)],
    ) -> Result<Arc<dyn Algorithm>, ConfigError> {
        let entry = self.entry(stage, name)?;
        let options = OptionSet::resolve(entry.name, &entry.options, overrides)?;
        let algorithm = (entry.build)(&options)?;
        debug!(%stage, name = entry.name, "built algorithm");
        Ok(algorithm)
    }

    /// The verifier every pipeline ends with.
    pub fn verifier(&self) -> Arc<dyn Algorithm> {
        Arc::new(Verify)
    }
}

fn standard_inputs() -> Vec<Entry> {
    let plain = [
        Shape::Linear,
        Shape::UniformRandom,
        Shape::DecreasingRandom,
        Shape::RadixFinalPass,
        Shape::MergeFinalPass,
    ];
    let curves = [Shape::Quadratic, Shape::Cubic, Shape::SquareRoot, Shape::SineWave];
    let mut entries: Vec<Entry> = plain
        .into_iter()
        .map(|shape| Entry::new(shape.name(), move |_| shared(Input::new(shape))))
        .collect();
    entries.push(
        Entry::new("Many Duplicates", |o| {
            shared(Input::new(Shape::ManyDuplicates {
                divisor: o.int("divisor")?,
            }))
        })
        .with_options(vec![divisor_option()]),
    );
    entries.extend(
        curves
            .into_iter()
            .map(|shape| Entry::new(shape.name(), move |_| shared(Input::new(shape)))),
    );
    entries
}

fn standard_shuffles() -> Vec<Entry> {
    let plain = [
        Shuffle::NoShuffle,
        Shuffle::SwapShuffle,
        Shuffle::Reversal,
        Shuffle::RecursiveReversal,
        Shuffle::HalfRotation,
    ];
    let mut entries: Vec<Entry> = plain
        .into_iter()
        .map(|shuffle| Entry::new(shuffle.name(), move |_| shared(shuffle)))
        .collect();
    entries.push(
        Entry::new("Heap Layout", |o| {
            shared(Shuffle::HeapLayout(o.choice("orientation")?.parse()?))
        })
        .with_options(vec![shuffles::orientation_option()]),
    );
    entries
}

fn heap_entry(name: &'static str, heapify: HeapifyStrategy) -> Entry {
    Entry::new(name, move |o| {
        let orientation: Orientation = o.choice("orientation")?.parse()?;
        shared(HeapSort {
            heapify,
            orientation,
        })
    })
    .with_options(vec![heap::orientation_option()])
}

fn standard_sorts() -> Vec<Entry> {
    let mut entries: Vec<Entry> = ExchangeSort::ALL
        .into_iter()
        .map(|sort| Entry::new(sort.name(), move |_| shared(sort)))
        .collect();
    entries.push(Entry::new("Selection Sort", |_| shared(SelectionSort)));
    entries.push(heap_entry("Heap Sort", HeapifyStrategy::BubbleUp));
    entries.push(heap_entry("Optimized Heap Sort", HeapifyStrategy::SiftDown));
    entries.push(Entry::new("Quick Sort", |_| shared(QuickSort)));
    entries.push(Entry::new("Merge Sort", |_| shared(MergeSort)));
    entries.push(
        Entry::new("In-Place Merge Sort", |o| {
            let combine: Combine = o.choice("combine")?.parse()?;
            shared(InPlaceMergeSort { combine })
        })
        .with_options(vec![merge::combine_option()]),
    );
    entries.push(Entry::new("Square Root Sort", |_| shared(SquareRootSort)));
    entries.push(
        Entry::new("Radix LSD Sort", |o| shared(RadixLsdSort::scratch(o.int("base")?)))
            .with_options(vec![distribution::base_option()]),
    );
    entries.push(
        Entry::new("In-Place Radix LSD Sort", |o| {
            shared(RadixLsdSort::in_place(o.int("base")?))
        })
        .with_options(vec![distribution::base_option()]),
    );
    entries.push(Entry::new("Pigeonhole Sort", |_| shared(PigeonholeSort)));
    entries.push(Entry::new("Counting Sort", |_| shared(CountingSort)));
    entries.push(Entry::new("Gravity Sort", |_| shared(GravitySort)));
    entries.extend(Network::ALL.into_iter().map(|network| {
        let sort = NetworkSort(network);
        Entry::new(sort.name(), move |_| shared(sort))
    }));
    entries.push(Entry::new("Slow Sort", |_| shared(SlowSort)));
    entries.push(Entry::new("Bogo Sort", |_| shared(BogoSort)));
    entries
}
