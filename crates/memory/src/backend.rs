//! The pointer and cell types behind [Ptr](crate::Ptr) and [PtrMut](crate::PtrMut)
//!
//! Each feature provides the same set of names, so the rest of the crate is written once.

#[cfg(feature = "rc")]
mod single_threaded {
    use std::cell::RefCell;

    pub(crate) use std::cell::{Ref as ReadGuard, RefMut as WriteGuard};
    pub(crate) use std::rc::{Rc as Shared, Weak as SharedWeak};

    pub(crate) type Cell<T> = RefCell<T>;

    pub(crate) fn read<T: ?Sized>(cell: &Cell<T>) -> ReadGuard<'_, T> {
        cell.borrow()
    }

    pub(crate) fn try_read<T: ?Sized>(cell: &Cell<T>) -> Option<ReadGuard<'_, T>> {
        cell.try_borrow().ok()
    }

    pub(crate) fn write<T: ?Sized>(cell: &Cell<T>) -> WriteGuard<'_, T> {
        cell.borrow_mut()
    }

    pub(crate) fn try_write<T: ?Sized>(cell: &Cell<T>) -> Option<WriteGuard<'_, T>> {
        cell.try_borrow_mut().ok()
    }

    #[doc(hidden)]
    #[macro_export]
    macro_rules! __shared_new {
        ($value:expr) => {
            $crate::Ptr::from(::std::rc::Rc::new($value) as ::std::rc::Rc<_>)
        };
    }

    #[doc(hidden)]
    #[macro_export]
    macro_rules! __shared_lazy {
        ($ty:ty; $expr:expr) => {{
            thread_local! {
                static SHARED: $ty = $expr.into();
            }
            SHARED.with(|value| value.clone())
        }};
    }
}

#[cfg(feature = "rc")]
pub(crate) use single_threaded::*;

#[cfg(feature = "arc")]
mod multi_threaded {
    use parking_lot::{MappedRwLockReadGuard, MappedRwLockWriteGuard, RwLock};

    pub(crate) use std::sync::{Arc as Shared, Weak as SharedWeak};

    pub(crate) type Cell<T> = RwLock<T>;
    pub(crate) type ReadGuard<'a, T> = MappedRwLockReadGuard<'a, T>;
    pub(crate) type WriteGuard<'a, T> = MappedRwLockWriteGuard<'a, T>;

    pub(crate) fn read<T: ?Sized>(cell: &Cell<T>) -> ReadGuard<'_, T> {
        parking_lot::RwLockReadGuard::map(cell.read(), |value| value)
    }

    pub(crate) fn try_read<T: ?Sized>(cell: &Cell<T>) -> Option<ReadGuard<'_, T>> {
        let guard = cell.try_read()?;
        Some(parking_lot::RwLockReadGuard::map(guard, |value| value))
    }

    pub(crate) fn write<T: ?Sized>(cell: &Cell<T>) -> WriteGuard<'_, T> {
        parking_lot::RwLockWriteGuard::map(cell.write(), |value| value)
    }

    pub(crate) fn try_write<T: ?Sized>(cell: &Cell<T>) -> Option<WriteGuard<'_, T>> {
        let guard = cell.try_write()?;
        Some(parking_lot::RwLockWriteGuard::map(guard, |value| value))
    }

    #[doc(hidden)]
    #[macro_export]
    macro_rules! __shared_new {
        ($value:expr) => {
            $crate::Ptr::from(::std::sync::Arc::new($value) as ::std::sync::Arc<_>)
        };
    }

    #[doc(hidden)]
    #[macro_export]
    macro_rules! __shared_lazy {
        ($ty:ty; $expr:expr) => {{
            static SHARED: ::std::sync::LazyLock<$ty> =
                ::std::sync::LazyLock::new(|| $expr.into());
            (*SHARED).clone()
        }};
    }
}

#[cfg(feature = "arc")]
pub(crate) use multi_threaded::*;
