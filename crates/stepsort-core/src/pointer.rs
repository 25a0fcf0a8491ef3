//! Addresses and the access pointer set.

use std::fmt;

use smallvec::SmallVec;

/// A position within one array of the storage engine.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Addr {
    /// Index into the array set. Array 0 is the main array.
    pub array: usize,
    /// Position within that array.
    pub index: usize,
}

impl Addr {
    /// Address `index` of array `array`.
    #[inline]
    pub const fn new(array: usize, index: usize) -> Self {
        Self { array, index }
    }

    /// Address `index` of the main array.
    #[inline]
    pub const fn main(index: usize) -> Self {
        Self { array: 0, index }
    }

    /// The address `delta` positions further along the same array.
    #[inline]
    pub const fn offset(self, delta: usize) -> Self {
        Self {
            array: self.array,
            index: self.index + delta,
        }
    }
}

impl fmt::Display for Addr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}][{}]", self.array, self.index)
    }
}

/// Kind of access recorded for a pointer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Access {
    /// The value at the address was read (or compared).
    Read,
    /// The value at the address was written (or swapped).
    Write,
}

/// An address tagged with the kind of its most recent access.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Pointer {
    /// Accessed address.
    pub addr: Addr,
    /// Access kind.
    pub access: Access,
}

/// The addresses touched by the most recent primitive operation.
///
/// Replaced wholesale by every operation; never accumulates history. At
/// most two entries (compare and swap touch two addresses), so storage
/// is inline.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Pointers {
    inner: SmallVec<[Pointer; 2]>,
}

impl Pointers {
    /// An empty pointer set.
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn set_one(&mut self, addr: Addr, access: Access) {
        self.inner.clear();
        self.inner.push(Pointer { addr, access });
    }

    pub(crate) fn set_two(&mut self, a: Addr, b: Addr, access: Access) {
        self.inner.clear();
        self.inner.push(Pointer { addr: a, access });
        self.inner.push(Pointer { addr: b, access });
    }

    pub(crate) fn clear(&mut self) {
        self.inner.clear();
    }

    /// Iterate over the current pointers.
    pub fn iter(&self) -> impl Iterator<Item = &Pointer> {
        self.inner.iter()
    }

    /// Number of pointers (0, 1 or 2).
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    /// Whether no operation has been recorded since the last clear.
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// The access kind recorded for `addr`, if it is in the set.
    pub fn access_at(&self, addr: Addr) -> Option<Access> {
        self.inner.iter().find(|p| p.addr == addr).map(|p| p.access)
    }

    /// The pointers as a slice.
    pub fn as_slice(&self) -> &[Pointer] {
        &self.inner
    }
}
