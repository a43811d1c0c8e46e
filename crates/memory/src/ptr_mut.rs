use crate::{
    Ptr,
    backend::{self, Cell, ReadGuard, WriteGuard},
};
use std::{
    fmt,
    ops::{Deref, DerefMut},
};

/// Makes a [PtrMut], allowing the value to be cast to a trait object
///
/// See [make_ptr](crate::make_ptr).
#[macro_export]
macro_rules! make_ptr_mut {
    ($value:expr) => {
        $crate::make_ptr!($crate::RCell::from($value))
    };
}

/// A shared pointer to a value that can be borrowed mutably
pub type PtrMut<T> = Ptr<RCell<T>>;

impl<T> From<T> for PtrMut<T> {
    fn from(value: T) -> Self {
        Ptr::from(RCell::from(value))
    }
}

/// A cell with borrowing rules checked at runtime
///
/// With the `rc` feature a conflicting borrow panics, with `arc` it blocks until the other
/// borrow is released.
#[derive(Default)]
pub struct RCell<T: ?Sized>(Cell<T>);

impl<T> From<T> for RCell<T> {
    fn from(value: T) -> Self {
        Self(Cell::new(value))
    }
}

impl<T: ?Sized> RCell<T> {
    /// Borrows the value immutably
    pub fn borrow(&self) -> Borrow<'_, T> {
        Borrow(backend::read(&self.0))
    }

    /// Borrows the value immutably, or returns `None` if it's mutably borrowed
    pub fn try_borrow(&self) -> Option<Borrow<'_, T>> {
        backend::try_read(&self.0).map(Borrow)
    }

    /// Borrows the value mutably
    pub fn borrow_mut(&self) -> BorrowMut<'_, T> {
        BorrowMut(backend::write(&self.0))
    }

    /// Borrows the value mutably, or returns `None` if it's already borrowed
    pub fn try_borrow_mut(&self) -> Option<BorrowMut<'_, T>> {
        backend::try_write(&self.0).map(BorrowMut)
    }
}

impl<T: ?Sized + fmt::Debug> fmt::Debug for RCell<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.try_borrow() {
            Some(value) => fmt::Debug::fmt(&*value, f),
            None => f.write_str("<borrowed>"),
        }
    }
}

/// An immutable borrow of the value in an [RCell]
pub struct Borrow<'a, T: ?Sized>(ReadGuard<'a, T>);

impl<T: ?Sized> Deref for Borrow<'_, T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.0
    }
}

/// A mutable borrow of the value in an [RCell]
pub struct BorrowMut<'a, T: ?Sized>(WriteGuard<'a, T>);

impl<T: ?Sized> Deref for BorrowMut<'_, T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.0
    }
}

impl<T: ?Sized> DerefMut for BorrowMut<'_, T> {
    fn deref_mut(&mut self) -> &mut T {
        &mut self.0
    }
}
