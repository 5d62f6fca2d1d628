// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Shared environment for qualifiers and its change notifications.
//!
//! A [`QualifierContext`] holds the current window size and a list of
//! listeners keyed by the [`QualifierFlags`] they care about. It is shared by
//! `Rc` between every [`VariantMap`](crate::variant_map::VariantMap) that
//! evaluates against it.
//!
//! ## Threading
//!
//! The context is `!Send` and `!Sync`: all calls happen on the thread that owns
//! the UI object graph. Notifications are synchronous; by the time
//! [`on_window_changed`](QualifierContext::on_window_changed) returns every
//! interested listener has run to completion.
//!
//! ## Reentrancy
//!
//! Listeners are notified from a snapshot of the registration list taken
//! after the new size is stored. A listener may register, unregister, or
//! resize the window again from inside its callback; such changes apply to
//! the next notification pass, not the current one.

use alloc::rc::{Rc, Weak};
use alloc::vec::Vec;
use core::cell::{Cell, RefCell};
use core::fmt;

use crate::error::Result;
use crate::flags::QualifierFlags;

/// Receives context change notifications.
pub trait QualifierContextListener {
    /// Called after a dimension this listener registered for has been updated.
    fn on_qualifier_context_changed(&self) -> Result<()>;
}

struct Registration {
    listener: Weak<dyn QualifierContextListener>,
    flags: QualifierFlags,
}

impl Registration {
    fn addr(&self) -> *const () {
        self.listener.as_ptr() as *const ()
    }
}

/// Window dimensions plus listeners interested in them.
pub struct QualifierContext {
    window_width: Cell<u32>,
    window_height: Cell<u32>,
    listeners: RefCell<Vec<Registration>>,
}

impl fmt::Debug for QualifierContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QualifierContext")
            .field("window_width", &self.window_width.get())
            .field("window_height", &self.window_height.get())
            .field("listeners", &self.listeners.borrow().len())
            .finish()
    }
}

impl Default for QualifierContext {
    fn default() -> Self {
        Self::new()
    }
}

impl QualifierContext {
    /// Dimension value meaning "not specified". Every minimum threshold is satisfied by it.
    pub const UNSPECIFIED: u32 = u32::MAX;

    /// Create a context with both dimensions unspecified and no listeners.
    pub fn new() -> Self {
        Self::with_window_size(Self::UNSPECIFIED, Self::UNSPECIFIED)
    }

    /// Create a context with an initial window size. Nobody is notified.
    pub fn with_window_size(width: u32, height: u32) -> Self {
        Self {
            window_width: Cell::new(width),
            window_height: Cell::new(height),
            listeners: RefCell::new(Vec::new()),
        }
    }

    /// Current window width, or [`UNSPECIFIED`](Self::UNSPECIFIED).
    pub fn window_width(&self) -> u32 {
        self.window_width.get()
    }

    /// Current window height, or [`UNSPECIFIED`](Self::UNSPECIFIED).
    pub fn window_height(&self) -> u32 {
        self.window_height.get()
    }

    /// Number of registered listeners, including ones whose owner has been dropped
    /// but not yet pruned.
    pub fn listener_count(&self) -> usize {
        self.listeners.borrow().len()
    }

    /// Register `listener` for changes to `flags`.
    ///
    /// Upserts by listener identity: an existing registration has its flags
    /// overwritten (not merged). Registering with [`QualifierFlags::NONE`]
    /// removes the listener; doing so for an unknown listener is a no-op.
    ///
    /// The context keeps only a weak reference.
    pub fn register_changed_callback(
        &self,
        listener: &Rc<dyn QualifierContextListener>,
        flags: QualifierFlags,
    ) {
        let addr = Rc::as_ptr(listener) as *const ();
        let mut listeners = self.listeners.borrow_mut();
        let existing = listeners.iter().position(|r| r.addr() == addr);
        match (existing, flags.is_empty()) {
            (Some(i), true) => {
                listeners.remove(i);
                log::trace!("context listener removed, {} left", listeners.len());
            }
            (None, true) => {}
            (Some(i), false) => listeners[i].flags = flags,
            (None, false) => {
                listeners.push(Registration {
                    listener: Rc::downgrade(listener),
                    flags,
                });
                log::trace!("context listener added for {flags:?}");
            }
        }
    }

    /// Remove the registration whose listener lives at `addr`.
    ///
    /// Used from `Drop`, where no strong reference to the listener exists anymore.
    pub(crate) fn unregister_addr(&self, addr: *const ()) {
        self.listeners.borrow_mut().retain(|r| r.addr() != addr);
    }

    /// Store a new window size and notify width/height listeners.
    ///
    /// Both values are stored unconditionally; pass
    /// [`UNSPECIFIED`](Self::UNSPECIFIED) for a dimension with no constraint.
    /// Every listener registered for [`WIDTH`](QualifierFlags::WIDTH) or
    /// [`HEIGHT`](QualifierFlags::HEIGHT) is called in registration order.
    /// The first listener error aborts the remaining notifications.
    pub fn on_window_changed(&self, width: u32, height: u32) -> Result<()> {
        self.window_width.set(width);
        self.window_height.set(height);
        self.notify(QualifierFlags::WIDTH | QualifierFlags::HEIGHT)
    }

    fn notify(&self, changed: QualifierFlags) -> Result<()> {
        let snapshot: Vec<Rc<dyn QualifierContextListener>> = {
            let mut listeners = self.listeners.borrow_mut();
            listeners.retain(|r| r.listener.strong_count() > 0);
            listeners
                .iter()
                .filter(|r| r.flags.intersects(changed))
                .filter_map(|r| r.listener.upgrade())
                .collect()
        };
        log::trace!(
            "window changed to {}x{}, notifying {} listener(s)",
            self.window_width.get(),
            self.window_height.get(),
            snapshot.len()
        );
        for listener in snapshot {
            listener.on_qualifier_context_changed()?;
        }
        Ok(())
    }
}
