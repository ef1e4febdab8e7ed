use std::cell::RefCell;
use std::rc::{Rc, Weak};

/// A single-threaded, reference-counted handle to a shared, mutably
/// borrowed value.
///
/// The engine is cooperative-single-threaded (spec §5): listeners and
/// points hold non-owning back references to the `Document` that owns
/// them, while the `Document` holds a side-set of weak handles to its
/// listeners. `Handle`/`WeakHandle` are the two ends of that relationship,
/// chosen instead of raw pointers so drop order is enforced by the
/// borrow checker instead of by convention.
pub type Handle<T> = Rc<RefCell<T>>;

/// The non-owning counterpart of [`Handle`]. Upgrading a stale handle
/// (the owner has been dropped) yields `None` rather than panicking.
pub type WeakHandle<T> = Weak<RefCell<T>>;

pub fn new_handle<T>(value: T) -> Handle<T> {
    Rc::new(RefCell::new(value))
}

pub fn downgrade<T: ?Sized>(handle: &Handle<T>) -> WeakHandle<T> {
    Rc::downgrade(handle)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn weak_handle_dies_with_owner() {
        let weak = {
            let strong = new_handle(42i32);
            downgrade(&strong)
        };
        assert!(weak.upgrade().is_none());
    }

    #[test]
    fn handle_shares_mutation() {
        let handle = new_handle(vec![1, 2, 3]);
        let other = handle.clone();
        handle.borrow_mut().push(4);
        assert_eq!(*other.borrow(), vec![1, 2, 3, 4]);
    }
}
