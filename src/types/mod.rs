//! This module defines the core, strongly-typed data representations shared by
//! the kernels, the `Container` and the in-place `Library`.
//!
//! It includes the `SizeClass` enum (with the classifier that picks the minimal
//! class for a value) and the `Entry` record describing one packed field triple.

pub mod entry;
pub mod size_class;

// Re-export the main type(s) for easier access.
pub use entry::{Entry, LocatedEntry, HEADER_BITS, ID_BITS, TERMINATOR_ID};
pub use size_class::{classify, width_of, SizeClass, SIZE_BITS};
