//! Memory management utilities for Rill
//!
//! Stream state is shared between interpreter values, so every stream variant that carries
//! mutable state does so through the reference-counted pointers defined here.
//! Values are released as soon as their last owner is dropped, which is what lets the file
//! registry close OS handles without a tracing collector.

#![warn(missing_docs)]

#[cfg(all(feature = "arc", feature = "rc"))]
compile_error!("A single memory management feature can be enabled at a time");

#[cfg(not(any(feature = "arc", feature = "rc")))]
compile_error!("Either the 'rc' or the 'arc' feature must be enabled");

mod backend;
mod ptr;
mod ptr_mut;

pub use crate::{
    ptr::{Ptr, WeakPtr},
    ptr_mut::{Borrow, BorrowMut, PtrMut, RCell},
};
