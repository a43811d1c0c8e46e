//! Definitions of Send and Sync used by stream collaborators
//!
//! When Rill is being used in a single-threaded context [RillSend] and [RillSync] are empty
//! traits implemented for all types.

#[cfg(feature = "rc")]
mod traits {
    /// An empty trait for single-threaded contexts, implemented for all types
    pub trait RillSend {}
    impl<T: ?Sized> RillSend for T {}

    /// An empty trait for single-threaded contexts, implemented for all types
    pub trait RillSync {}
    impl<T: ?Sized> RillSync for T {}
}

#[cfg(not(feature = "rc"))]
mod traits {
    pub use Send as RillSend;
    pub use Sync as RillSync;
}

pub use traits::*;
