//! General purpose data structures
//!
//! `Vector<T>` is a `std::vec::Vec` wrapper that is harder to misuse: it
//! exposes only the operations we need, and its bounds checking can be
//! switched off in `config.rs`.
//!
//! Everything that owns heap memory implements `HeapSpace`, so the front
//! ends can print a breakdown of where memory went.

#[macro_use]
mod vector;

pub use crate::memory::vector::{assert_in_bounds, Vector};

/// A trait for objects that can report their memory usage on the heap
pub trait HeapSpace {
    /// The number of bytes allocated on the heap that this owns.
    fn heap_space(&self) -> usize;
}

impl<T: Copy> HeapSpace for T {
    fn heap_space(&self) -> usize {
        0
    }
}

/// Convert bytes to kilobytes for readability.
///
/// Formulas are small, so megabytes would almost always print zero.
pub fn format_memory_usage(bytes: usize) -> String {
    format!("{:12}", bytes >> 10) // KB
}
