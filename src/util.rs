//! Miscellaneous helpers shared across modules.

use std::cell::RefCell;
use std::rc::Rc;

/// A single-threaded shared handle with interior mutability.
///
/// Systems and phases are stored as `Shared` handles,
/// so their identity is the allocation rather than their name.
pub type Shared<T> = Rc<RefCell<T>>;

/// Wraps `value` into a new [`Shared`] handle.
pub fn shared<T>(value: T) -> Shared<T> { Rc::new(RefCell::new(value)) }

/// Returns whether two handles point to the same allocation.
///
/// Unlike [`Rc::ptr_eq`], this ignores trait object metadata,
/// which is not guaranteed to be unique per type.
pub fn same_rc<T: ?Sized>(a: &Rc<T>, b: &Rc<T>) -> bool {
    Rc::as_ptr(a).cast::<()>() == Rc::as_ptr(b).cast::<()>()
}
