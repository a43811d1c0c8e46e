use crate::backend::{Shared, SharedWeak};
use std::{fmt, ops::Deref};

/// Returns a shared value that is created on first use
///
/// Each call returns a clone of the same `$ty`, initialized with `$expr.into()`.
/// With the `rc` feature the value is per-thread, with `arc` it's process-wide.
///
/// ```
/// use rill_memory::{Ptr, lazy};
///
/// fn stdin_name() -> Ptr<str> {
///     lazy!(Ptr<str>; "<stdin>")
/// }
///
/// assert!(Ptr::ptr_eq(&stdin_name(), &stdin_name()));
/// ```
#[macro_export]
macro_rules! lazy {
    ($ty:ty; $expr:expr) => {
        $crate::__shared_lazy!($ty; $expr)
    };
}

/// Makes a [Ptr], allowing the value to be cast to a trait object
///
/// Unsized coercions of the pointer type itself aren't available on stable Rust, so the cast
/// is applied to the inner pointer at the call site.
#[macro_export]
macro_rules! make_ptr {
    ($value:expr) => {
        $crate::__shared_new!($value)
    };
}

/// A shared, immutable pointer
#[derive(Default)]
pub struct Ptr<T: ?Sized>(Shared<T>);

impl<T> From<T> for Ptr<T> {
    fn from(value: T) -> Self {
        Self(Shared::new(value))
    }
}

impl<T: ?Sized> From<Shared<T>> for Ptr<T> {
    fn from(inner: Shared<T>) -> Self {
        Self(inner)
    }
}

impl From<&str> for Ptr<str> {
    fn from(value: &str) -> Self {
        Self(value.into())
    }
}

impl From<String> for Ptr<str> {
    fn from(value: String) -> Self {
        Self(value.into())
    }
}

impl<T: ?Sized> Ptr<T> {
    /// Returns true if both pointers refer to the same allocation
    pub fn ptr_eq(a: &Self, b: &Self) -> bool {
        Shared::ptr_eq(&a.0, &b.0)
    }

    /// Makes a [WeakPtr] to the same allocation
    pub fn downgrade(this: &Self) -> WeakPtr<T> {
        WeakPtr(Shared::downgrade(&this.0))
    }
}

impl<T: ?Sized> Clone for Ptr<T> {
    fn clone(&self) -> Self {
        Self(self.0.clone())
    }
}

impl<T: ?Sized> Deref for Ptr<T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.0
    }
}

impl<T: ?Sized + PartialEq> PartialEq for Ptr<T> {
    fn eq(&self, other: &Self) -> bool {
        **self == **other
    }
}

impl<T: ?Sized + Eq> Eq for Ptr<T> {}

impl<T: ?Sized + fmt::Display> fmt::Display for Ptr<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        (**self).fmt(f)
    }
}

impl<T: ?Sized + fmt::Debug> fmt::Debug for Ptr<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        (**self).fmt(f)
    }
}

/// A non-owning reference to a value owned by one or more [Ptr]s
///
/// Once the last `Ptr` is dropped the value is released and [WeakPtr::upgrade] returns `None`.
pub struct WeakPtr<T: ?Sized>(SharedWeak<T>);

impl<T: ?Sized> WeakPtr<T> {
    /// Returns a `Ptr` to the value if it's still alive
    pub fn upgrade(&self) -> Option<Ptr<T>> {
        self.0.upgrade().map(Ptr)
    }

    /// Returns true if the value has been released
    pub fn is_dangling(&self) -> bool {
        self.0.strong_count() == 0
    }
}

impl<T: ?Sized> Clone for WeakPtr<T> {
    fn clone(&self) -> Self {
        Self(self.0.clone())
    }
}

impl<T: ?Sized> fmt::Debug for WeakPtr<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "WeakPtr(dangling: {})", self.is_dangling())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn weak_pointer_follows_the_last_owner() {
        let ptr: Ptr<i32> = Ptr::from(42);
        let weak = Ptr::downgrade(&ptr);
        assert_eq!(weak.upgrade().as_deref(), Some(&42));

        let other = ptr.clone();
        drop(ptr);
        assert!(!weak.is_dangling());

        drop(other);
        assert!(weak.is_dangling());
        assert!(weak.upgrade().is_none());
    }

    #[test]
    fn ptr_eq_compares_allocations() {
        let a: Ptr<str> = Ptr::from("abc");
        let b: Ptr<str> = Ptr::from("abc");
        assert!(!Ptr::ptr_eq(&a, &b));
        assert!(Ptr::ptr_eq(&a, &a.clone()));
        assert_eq!(a, b);
    }
}
