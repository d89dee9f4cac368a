//! Shared memory cells the protocols are built from.
//!
//! A cell only supports a plain `load` and a plain `store`. There is no swap and no
//! compare-and-swap: every protocol step is a single read or a single write of one word.
//! `SeqCst` keeps stores and later loads of *other* cells from being reordered, which is
//! what the protocols assume of memory. It does not make a read-then-write pair atomic.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

const ORDER: Ordering = Ordering::SeqCst;

/// A boolean only its owning worker writes. Raised means `true`.
#[derive(Debug, Default)]
pub struct Door {
    raised: AtomicBool,
}

impl Door {
    pub const fn new() -> Self {
        Self {
            raised: AtomicBool::new(false),
        }
    }

    #[inline]
    pub fn is_raised(&self) -> bool {
        self.raised.load(ORDER)
    }

    #[inline]
    pub fn raise(&self) {
        self.raised.store(true, ORDER);
    }

    #[inline]
    pub fn lower(&self) {
        self.raised.store(false, ORDER);
    }
}

/// A worker index any worker may overwrite.
#[derive(Debug, Default)]
pub struct Slot {
    value: AtomicUsize,
}

impl Slot {
    pub const fn new(value: usize) -> Self {
        Self {
            value: AtomicUsize::new(value),
        }
    }

    #[inline]
    pub fn get(&self) -> usize {
        self.value.load(ORDER)
    }

    #[inline]
    pub fn set(&self, value: usize) {
        self.value.store(value, ORDER);
    }
}

pub(crate) fn doors(count: usize) -> Box<[Door]> {
    (0..count).map(|_| Door::new()).collect()
}
