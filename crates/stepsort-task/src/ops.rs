//! Step-producing helpers shared by many algorithms.
//!
//! Copies are two suspension points per element (read, then write), so
//! they are tasks rather than storage methods. [`Chain`] runs tasks one
//! after another inside a single frame.

use std::collections::VecDeque;

use stepsort_core::{Addr, StorageError, Value};

use crate::context::TaskContext;
use crate::task::{Step, Task};

/// Copies `len` elements from `from` to `to`, element by element in
/// ascending order.
///
/// Source and destination may be the same array. Each element is read
/// before it is written, so a copy to a lower offset in the same array
/// (a left shift) is safe.
#[derive(Clone, Debug)]
pub struct CopySlice {
    from: Addr,
    to: Addr,
    len: Option<usize>,
    i: usize,
    held: Option<Value>,
}

impl CopySlice {
    /// Copy `len` elements starting at `from` to the positions starting
    /// at `to`.
    pub fn new(from: Addr, to: Addr, len: usize) -> Self {
        Self {
            from,
            to,
            len: Some(len),
            i: 0,
            held: None,
        }
    }
}

/// Copy all of array `from` into array `to`, starting at position 0.
///
/// The length is taken from `from` when the copy starts.
pub fn copy_array(from: usize, to: usize) -> CopySlice {
    CopySlice {
        from: Addr::new(from, 0),
        to: Addr::new(to, 0),
        len: None,
        i: 0,
        held: None,
    }
}

/// Copy `len` elements of array `from` starting at `from_start` into
/// array `to` starting at `to_start`.
pub fn copy_array_slice(
    from: usize,
    from_start: usize,
    to: usize,
    to_start: usize,
    len: usize,
) -> CopySlice {
    CopySlice::new(Addr::new(from, from_start), Addr::new(to, to_start), len)
}

impl Task for CopySlice {
    fn resume(&mut self, cx: &mut TaskContext<'_>) -> Result<Step, StorageError> {
        let len = match self.len {
            Some(len) => len,
            None => {
                let len = cx.len_of(self.from.array)?;
                self.len = Some(len);
                len
            }
        };
        if let Some(v) = self.held.take() {
            cx.write(v, self.to.offset(self.i))?;
            self.i += 1;
            return Ok(Step::Yield);
        }
        if self.i >= len {
            return Ok(Step::Done);
        }
        self.held = Some(cx.read(self.from.offset(self.i))?);
        Ok(Step::Yield)
    }
}

/// Runs its parts in order, each as a child frame.
pub struct Chain {
    parts: VecDeque<Box<dyn Task>>,
}

impl Chain {
    /// A chain of `parts`.
    pub fn new(parts: Vec<Box<dyn Task>>) -> Self {
        Self {
            parts: parts.into(),
        }
    }
}

impl Task for Chain {
    fn resume(&mut self, _cx: &mut TaskContext<'_>) -> Result<Step, StorageError> {
        Ok(match self.parts.pop_front() {
            Some(part) => Step::Call(part),
            None => Step::Done,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::StepSequence;
    use stepsort_core::Storage;

    #[test]
    fn copy_takes_two_steps_per_element() {
        let mut s = Storage::from_values(vec![4, 5, 6]);
        let aux = s.spawn_array(3);
        let mut seq = StepSequence::new(Box::new(copy_array(0, aux)));
        assert_eq!(seq.drain_seeded(&mut s, 0), Ok(6));
        assert_eq!(s.array(aux), Some(&[4, 5, 6][..]));
        assert_eq!((s.stats().reads, s.stats().writes), (3, 3));
    }

    #[test]
    fn left_shift_within_one_array() {
        let mut s = Storage::from_values(vec![1, 2, 3, 4, 5]);
        let mut seq = StepSequence::new(Box::new(copy_array_slice(0, 2, 0, 0, 3)));
        seq.drain_seeded(&mut s, 0).unwrap();
        assert_eq!(s.main_array(), &[3, 4, 5, 4, 5]);
    }

    #[test]
    fn chain_runs_parts_in_order() {
        let mut s = Storage::from_values(vec![1, 2]);
        let aux = s.spawn_array(2);
        let parts: Vec<Box<dyn Task>> = vec![
            Box::new(copy_array(0, aux)),
            Box::new(copy_array_slice(aux, 0, 0, 1, 1)),
        ];
        let mut seq = StepSequence::new(Box::new(Chain::new(parts)));
        assert_eq!(seq.drain_seeded(&mut s, 0), Ok(6));
        assert_eq!(s.main_array(), &[1, 1]);
        assert_eq!(seq.max_depth(), 2);
    }

    #[test]
    fn out_of_range_destination_fails() {
        let mut s = Storage::from_values(vec![1, 2, 3]);
        let aux = s.spawn_array(1);
        let mut seq = StepSequence::new(Box::new(copy_array(0, aux)));
        assert!(matches!(
            seq.drain_seeded(&mut s, 0),
            Err(StorageError::OutOfBounds { .. })
        ));
    }
}
