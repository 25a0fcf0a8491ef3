//! Reusable task and algorithm fixtures.
//!
//! - [`ScriptedSort`]: performs a fixed list of primitive operations.
//! - [`FailingSort`]: reads past the end of the main array after N reads.
//! - [`SpawningSort`]: spawns scratch arrays and never deletes them.

use stepsort_core::{Addr, Relation, Stage, StorageError, Value};
use stepsort_task::{Algorithm, Step, Task, TaskContext};

/// One primitive operation of a [`ScriptedSort`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Op {
    Read(usize),
    Write(Value, usize),
    Compare(usize, Relation, usize),
    Swap(usize, usize),
}

/// A sort that performs its script against the main array, one
/// operation per step.
#[derive(Clone, Debug)]
pub struct ScriptedSort {
    pub name: &'static str,
    pub script: Vec<Op>,
}

impl ScriptedSort {
    pub fn new(name: &'static str, script: Vec<Op>) -> Self {
        Self { name, script }
    }
}

impl Algorithm for ScriptedSort {
    fn name(&self) -> &str {
        self.name
    }

    fn stage(&self) -> Stage {
        Stage::Sort
    }

    fn task(&self) -> Box<dyn Task> {
        Box::new(Scripted {
            script: self.script.clone(),
            next: 0,
        })
    }
}

struct Scripted {
    script: Vec<Op>,
    next: usize,
}

impl Task for Scripted {
    fn resume(&mut self, cx: &mut TaskContext<'_>) -> Result<Step, StorageError> {
        let Some(op) = self.script.get(self.next).copied() else {
            return Ok(Step::Done);
        };
        self.next += 1;
        match op {
            Op::Read(i) => {
                cx.read(Addr::main(i))?;
            }
            Op::Write(v, i) => cx.write(v, Addr::main(i))?,
            Op::Compare(a, rel, b) => {
                cx.compare(Addr::main(a), rel, Addr::main(b))?;
            }
            Op::Swap(a, b) => cx.swap(Addr::main(a), Addr::main(b))?,
        }
        Ok(Step::Yield)
    }
}

/// A sort that reads the main array in order and fails with
/// [`StorageError::OutOfBounds`] on read number `after + 1`.
#[derive(Clone, Copy, Debug)]
pub struct FailingSort {
    pub after: usize,
}

impl FailingSort {
    pub fn new(after: usize) -> Self {
        Self { after }
    }
}

impl Algorithm for FailingSort {
    fn name(&self) -> &str {
        "Failing Sort"
    }

    fn stage(&self) -> Stage {
        Stage::Sort
    }

    fn task(&self) -> Box<dyn Task> {
        Box::new(Failing {
            after: self.after,
            reads: 0,
        })
    }
}

struct Failing {
    after: usize,
    reads: usize,
}

impl Task for Failing {
    fn resume(&mut self, cx: &mut TaskContext<'_>) -> Result<Step, StorageError> {
        let index = if self.reads < self.after {
            self.reads % cx.main_len().max(1)
        } else {
            cx.main_len()
        };
        cx.read(Addr::main(index))?;
        self.reads += 1;
        Ok(Step::Yield)
    }
}

/// A sort that spawns `count` scratch arrays, one per step, and leaves
/// them in place.
#[derive(Clone, Copy, Debug)]
pub struct SpawningSort {
    pub count: usize,
}

impl Algorithm for SpawningSort {
    fn name(&self) -> &str {
        "Spawning Sort"
    }

    fn stage(&self) -> Stage {
        Stage::Sort
    }

    fn task(&self) -> Box<dyn Task> {
        Box::new(Spawning {
            left: self.count,
        })
    }
}

struct Spawning {
    left: usize,
}

impl Task for Spawning {
    fn resume(&mut self, cx: &mut TaskContext<'_>) -> Result<Step, StorageError> {
        if self.left == 0 {
            return Ok(Step::Done);
        }
        self.left -= 1;
        cx.spawn_array(4);
        Ok(Step::Yield)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{drain, storage_with};

    #[test]
    fn failing_sort_fails_after_its_reads() {
        let mut s = storage_with(&[1, 2, 3]);
        let err = drain(&FailingSort::new(4), &mut s, 0).unwrap_err();
        assert!(matches!(err, StorageError::OutOfBounds { index: 3, .. }));
        assert_eq!(s.stats().reads, 4);
    }

    #[test]
    fn scripted_sort_counts_like_storage() {
        let mut s = storage_with(&[2, 1]);
        let script = vec![Op::Compare(0, Relation::Gt, 1), Op::Swap(0, 1)];
        let report = drain(&ScriptedSort::new("Scripted", script), &mut s, 0).unwrap();
        assert_eq!(report.steps, 2);
        assert_eq!(s.main_array(), &[1, 2]);
    }
}
