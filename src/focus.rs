//! Focus targets and the non-owning focus slot.
//!
//! Widgets live in the host's widget tree (`Rc<RefCell<..>>`). The shell
//! only keeps a `Weak` to the focused one, so a target dropped while
//! focused simply stops receiving input.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use crossterm::event::KeyEvent;

use crate::application::Application;

/// Shared handle to a focus target as owned by the widget tree.
pub type TargetRef = Rc<RefCell<dyn FocusTarget>>;

/// Non-owning handle to a focus target.
pub type WeakTarget = Weak<RefCell<dyn FocusTarget>>;

/// Anything the shell can route key presses to.
pub trait FocusTarget {
    /// Handle one key press.
    ///
    /// `app` is the live shell: theme accessors, drawing, and the focus
    /// slot for handing focus to another target.
    fn handle_input(&mut self, key: KeyEvent, app: &mut Application);

    fn can_focus(&self) -> bool {
        true
    }
}

/// Slot holding the current focus target, if any.
#[derive(Default)]
pub struct FocusSlot {
    current: Option<WeakTarget>,
}

impl FocusSlot {
    /// Live current target. `None` when unset or already dropped.
    pub fn current(&self) -> Option<TargetRef> {
        self.current.as_ref().and_then(Weak::upgrade)
    }

    /// True if a target is set and still alive.
    pub fn is_set(&self) -> bool {
        self.current().is_some()
    }

    /// Hand focus to another target without validation.
    pub fn replace(&mut self, target: WeakTarget) {
        self.current = Some(target);
    }

    /// Drop focus. Owners call this before destroying the focused target.
    pub fn clear(&mut self) {
        self.current = None;
    }

    /// True if `target` is the focused element.
    pub fn is_focused(&self, target: &TargetRef) -> bool {
        self.current().is_some_and(|current| Rc::ptr_eq(&current, target))
    }
}

impl std::fmt::Debug for FocusSlot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FocusSlot")
            .field("set", &self.is_set())
            .finish()
    }
}

/// Downgrade a concrete widget handle into a focus handle.
pub fn weak_target<T: FocusTarget + 'static>(target: &Rc<RefCell<T>>) -> WeakTarget {
    let target: TargetRef = target.clone();
    Rc::downgrade(&target)
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    struct Inert;

    impl FocusTarget for Inert {
        fn handle_input(&mut self, _key: KeyEvent, _app: &mut Application) {}
    }

    #[test]
    fn empty_slot_has_no_target() {
        let slot = FocusSlot::default();
        assert!(slot.current().is_none());
        assert!(!slot.is_set());
    }

    #[test]
    fn slot_does_not_keep_target_alive() {
        let mut slot = FocusSlot::default();
        let widget = Rc::new(RefCell::new(Inert));
        slot.replace(weak_target(&widget));
        assert!(slot.is_set());

        drop(widget);
        assert!(slot.current().is_none());
    }

    #[test]
    fn is_focused_compares_identity() {
        let mut slot = FocusSlot::default();
        let a: TargetRef = Rc::new(RefCell::new(Inert));
        let b: TargetRef = Rc::new(RefCell::new(Inert));
        slot.replace(Rc::downgrade(&a));

        assert!(slot.is_focused(&a));
        assert!(!slot.is_focused(&b));

        slot.clear();
        assert!(!slot.is_focused(&a));
    }
}
