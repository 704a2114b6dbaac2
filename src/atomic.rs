//! Lock-free relaxation primitives: compare-and-swap, fetch-and-add,
//! write-min and write-max over values up to 64 bits wide.
//!
//! Every value type maps onto a native atomic cell through [`Atomic`]. Integers
//! use the matching `std::sync::atomic` integer, floats are stored as their bit
//! pattern in `AtomicU32`/`AtomicU64`. A type without such a mapping simply does
//! not implement the trait, so an unsupported width is a compile error.
//!
//! `write_min` is the primitive every solver relaxes edges with: it only ever
//! lowers the stored value, so any interleaving of concurrent candidates ends at
//! the same minimum.

use std::ops::Add;
use std::sync::atomic::{
    AtomicI32, AtomicI64, AtomicI8, AtomicU32, AtomicU64, AtomicU8, AtomicUsize, Ordering,
};

use rayon::prelude::*;

/// A plain value that can live in a hardware atomic cell.
pub trait Atomic: Copy + Send + Sync + 'static {
    type Cell: Send + Sync;

    fn new_cell(value: Self) -> Self::Cell;
    fn load(cell: &Self::Cell) -> Self;
    fn store(cell: &Self::Cell, value: Self);
    /// Single hardware CAS. Returns whether `new` was written.
    fn cas(cell: &Self::Cell, expected: Self, new: Self) -> bool;
}

macro_rules! impl_atomic_int {
    ($($t:ty => $cell:ty),* $(,)?) => {$(
        impl Atomic for $t {
            type Cell = $cell;
            #[inline] fn new_cell(value: Self) -> Self::Cell { <$cell>::new(value) }
            #[inline] fn load(cell: &Self::Cell) -> Self { cell.load(Ordering::Acquire) }
            #[inline] fn store(cell: &Self::Cell, value: Self) { cell.store(value, Ordering::Release) }
            #[inline]
            fn cas(cell: &Self::Cell, expected: Self, new: Self) -> bool {
                cell.compare_exchange(expected, new, Ordering::AcqRel, Ordering::Acquire).is_ok()
            }
        }
    )*};
}

impl_atomic_int!(
    u8 => AtomicU8,
    i8 => AtomicI8,
    u32 => AtomicU32,
    i32 => AtomicI32,
    u64 => AtomicU64,
    i64 => AtomicI64,
    usize => AtomicUsize,
);

macro_rules! impl_atomic_float {
    ($($t:ty => $cell:ty),* $(,)?) => {$(
        impl Atomic for $t {
            type Cell = $cell;
            #[inline] fn new_cell(value: Self) -> Self::Cell { <$cell>::new(value.to_bits()) }
            #[inline] fn load(cell: &Self::Cell) -> Self { <$t>::from_bits(cell.load(Ordering::Acquire)) }
            #[inline] fn store(cell: &Self::Cell, value: Self) { cell.store(value.to_bits(), Ordering::Release) }
            // Bitwise comparison: 0.0 and -0.0 are different expected values.
            #[inline]
            fn cas(cell: &Self::Cell, expected: Self, new: Self) -> bool {
                cell.compare_exchange(expected.to_bits(), new.to_bits(), Ordering::AcqRel, Ordering::Acquire).is_ok()
            }
        }
    )*};
}

impl_atomic_float!(f32 => AtomicU32, f64 => AtomicU64);

/// Replaces `*loc` with `new` iff it currently holds `expected`.
#[inline]
pub fn compare_and_swap<T: Atomic + PartialEq>(loc: &T::Cell, expected: T, new: T) -> bool {
    T::load(loc) == expected && T::cas(loc, expected, new)
}

/// Adds `delta` through a CAS retry loop and returns the previous value.
#[inline]
pub fn fetch_and_add<T: Atomic + Add<Output = T>>(loc: &T::Cell, delta: T) -> T {
    loop {
        let old = T::load(loc);
        if T::cas(loc, old, old + delta) {
            return old;
        }
    }
}

#[inline]
pub fn write_add<T: Atomic + Add<Output = T>>(loc: &T::Cell, delta: T) {
    fetch_and_add(loc, delta);
}

/// Stores `candidate` iff it is smaller than the current value.
#[inline]
pub fn write_min<T: Atomic + PartialOrd>(loc: &T::Cell, candidate: T) -> bool {
    write_min_by(loc, candidate, |a, b| a < b)
}

#[inline]
pub fn write_min_by<T: Atomic, F: Fn(&T, &T) -> bool>(loc: &T::Cell, candidate: T, less: F) -> bool {
    loop {
        let current = T::load(loc);
        if !less(&candidate, &current) {
            return false;
        }
        if T::cas(loc, current, candidate) {
            return true;
        }
    }
}

/// Stores `candidate` iff it is larger than the current value.
#[inline]
pub fn write_max<T: Atomic + PartialOrd>(loc: &T::Cell, candidate: T) -> bool {
    write_max_by(loc, candidate, |a, b| a < b)
}

#[inline]
pub fn write_max_by<T: Atomic, F: Fn(&T, &T) -> bool>(loc: &T::Cell, candidate: T, less: F) -> bool {
    loop {
        let current = T::load(loc);
        if !less(&current, &candidate) {
            return false;
        }
        if T::cas(loc, current, candidate) {
            return true;
        }
    }
}

/// Fixed-length array of atomic cells, indexed like a slice.
pub struct AtomicArray<T: Atomic> {
    cells: Vec<T::Cell>,
}

impl<T: Atomic> AtomicArray<T> {
    pub fn filled(len: usize, value: T) -> Self {
        let cells = (0..len).into_par_iter().map(|_| T::new_cell(value)).collect();
        Self { cells }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    #[inline]
    pub fn cell(&self, i: usize) -> &T::Cell {
        &self.cells[i]
    }

    #[inline]
    pub fn get(&self, i: usize) -> T {
        T::load(&self.cells[i])
    }

    #[inline]
    pub fn set(&self, i: usize, value: T) {
        T::store(&self.cells[i], value)
    }

    #[inline]
    pub fn write_min(&self, i: usize, candidate: T) -> bool
    where
        T: PartialOrd,
    {
        write_min(&self.cells[i], candidate)
    }

    pub fn to_vec(&self) -> Vec<T> {
        self.cells.par_iter().map(|c| T::load(c)).collect()
    }
}
