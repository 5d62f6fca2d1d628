// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Track the best-qualified target among competing candidates.
//!
//! ## Overview
//!
//! A [`VariantMap`] holds `(target, qualifier, data)` items. Whenever its
//! [`QualifierContext`] changes, or on demand, it re-evaluates every qualifier,
//! ranks the items by precedence, and selects the first qualified one.
//!
//! ## Precedence
//!
//! Items are ranked by the tuple
//! `(score(EXTENSIBLE), score(WIDTH), score(HEIGHT))`, descending and
//! lexicographic. Extensible conditions outrank width thresholds, which
//! outrank height thresholds; within a dimension the larger threshold is more
//! specific and wins. A score of `-1` (not participating) ranks below every
//! real score at that level. The order is fixed.
//!
//! Ranking uses a stable sort applied to the item list itself, so ties keep
//! their previous relative order. [`VariantMap::replace`] moves the item to the
//! end, which makes it lose ties it previously won.
//!
//! ## Notification order
//!
//! When the selection changes, registered [`VariantMapChangedCallback`]s run
//! first, in registration order, then the selection-changed handler receives
//! `(selection, previous, is_initial_evaluation)`. The first error aborts the
//! rest and is returned from [`evaluate`](VariantMap::evaluate). Unchanged
//! selections notify nobody.
//!
//! ## Threading
//!
//! Maps are `!Send` and `!Sync` and have no internal locking. Callbacks run
//! synchronously on the calling stack and may call back into the map.
//!
//! Items added or removed from inside a notification are not considered by
//! the evaluation that sent it, and the map is not left dirty for them.
//! [`selected_item`](VariantMap::selected_item) keeps returning the old
//! selection until the next context change or an explicit
//! [`evaluate`](VariantMap::evaluate).

use alloc::rc::{Rc, Weak};
use alloc::vec::Vec;
use core::cell::RefCell;
use core::fmt;

use crate::context::{QualifierContext, QualifierContextListener};
use crate::error::{Error, Result};
use crate::flags::QualifierFlags;
use crate::qualifier::{Qualifier, compare_qualifiers};

/// A candidate target guarded by a qualifier, with optional payload.
#[derive(Clone, Debug)]
pub struct VariantMapItem<T, D = ()> {
    /// Value reported by [`VariantMap::selected_item`] when this item wins.
    pub target: T,
    /// Condition guarding the target.
    pub qualifier: Rc<dyn Qualifier>,
    /// Caller payload, also usable as a lookup key by [`VariantMap::replace_by_data`].
    pub data: D,
}

/// Notified after a [`VariantMap`]'s selection changes.
pub trait VariantMapChangedCallback {
    /// Called once per selection change, before the selection-changed handler.
    fn on_variant_map_changed(&self) -> Result<()>;
}

type SelectionHandler<T> = Rc<dyn Fn(&T, &T, bool) -> Result<()>>;

struct State<T, D> {
    items: Vec<VariantMapItem<T, D>>,
    selected: T,
    dirty: bool,
    initial_evaluation: bool,
    evaluation_enabled: bool,
    flags: QualifierFlags,
}

/// Ordered candidates plus the currently selected target.
///
/// `T::default()` is the "nothing selected" sentinel. Create maps with
/// [`VariantMap::new`]; they live in an `Rc` so they can register themselves
/// with a shared [`QualifierContext`].
pub struct VariantMap<T, D = ()> {
    this: Weak<Self>,
    state: RefCell<State<T, D>>,
    context: RefCell<Option<Rc<QualifierContext>>>,
    listeners: RefCell<Vec<Weak<dyn VariantMapChangedCallback>>>,
    on_selection_changed: RefCell<Option<SelectionHandler<T>>>,
}

impl<T, D> fmt::Debug for VariantMap<T, D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.borrow();
        f.debug_struct("VariantMap")
            .field("items", &state.items.len())
            .field("flags", &state.flags)
            .field("dirty", &state.dirty)
            .field("evaluation_enabled", &state.evaluation_enabled)
            .field("attached", &self.context.borrow().is_some())
            .finish_non_exhaustive()
    }
}

impl<T, D> Drop for VariantMap<T, D> {
    fn drop(&mut self) {
        if let Some(context) = self.context.get_mut().take() {
            context.unregister_addr(self as *const Self as *const ());
        }
    }
}

fn precedence(q: &dyn Qualifier) -> (i32, i32, i32) {
    (
        q.score(QualifierFlags::EXTENSIBLE),
        q.score(QualifierFlags::WIDTH),
        q.score(QualifierFlags::HEIGHT),
    )
}

impl<T, D> VariantMap<T, D>
where
    T: Clone + PartialEq + Default + 'static,
    D: 'static,
{
    /// Create an empty map with no context and evaluations enabled.
    pub fn new() -> Rc<Self> {
        Rc::new_cyclic(|this| Self {
            this: this.clone(),
            state: RefCell::new(State {
                items: Vec::new(),
                selected: T::default(),
                dirty: false,
                initial_evaluation: true,
                evaluation_enabled: true,
                flags: QualifierFlags::NONE,
            }),
            context: RefCell::new(None),
            listeners: RefCell::new(Vec::new()),
            on_selection_changed: RefCell::new(None),
        })
    }

    /// Append `target` guarded by `qualifier`, with `data`.
    ///
    /// Marks the map dirty. If the qualifier depends on dimensions this map
    /// did not track yet, the map re-registers with its context using the
    /// grown cumulative flags. Duplicates are allowed.
    pub fn add_with_data(&self, target: T, qualifier: Rc<dyn Qualifier>, data: D) {
        let grown = {
            let mut state = self.state.borrow_mut();
            let before = state.flags;
            state.flags |= qualifier.flags();
            state.items.push(VariantMapItem {
                target,
                qualifier,
                data,
            });
            state.dirty = true;
            (state.flags != before).then_some(state.flags)
        };
        if let Some(flags) = grown {
            let context = self.context.borrow().clone();
            if let Some(context) = context {
                self.register_with(&context, flags);
            }
        }
    }

    /// Remove the first item for `target` whose qualifier matches `qualifier`
    /// under [`compare_qualifiers`].
    pub fn remove(&self, target: &T, qualifier: &dyn Qualifier) -> Result<()> {
        self.take_item(|item| item.target == *target, qualifier)
            .map(drop)
    }

    /// Swap the qualifier of an existing `(target, old)` item.
    ///
    /// Equivalent to [`remove`](Self::remove) followed by an add that keeps the
    /// item's data. The item moves to the end of the internal order.
    pub fn replace(
        &self,
        target: &T,
        old: &dyn Qualifier,
        new: Rc<dyn Qualifier>,
    ) -> Result<()> {
        let item = self.take_item(|item| item.target == *target, old)?;
        self.add_with_data(item.target, new, item.data);
        Ok(())
    }

    /// Remove every item for `target`, returning how many were removed.
    pub fn clear(&self, target: &T) -> usize {
        let mut state = self.state.borrow_mut();
        let before = state.items.len();
        state.items.retain(|item| item.target != *target);
        state.dirty = true;
        before - state.items.len()
    }

    /// The best qualified target, or `None` when nothing qualifies.
    ///
    /// Evaluates first if the map changed since the last evaluation. While
    /// evaluations are disabled the last cached selection is returned.
    pub fn selected_item(&self) -> Result<Option<T>> {
        if self.state.borrow().dirty {
            self.evaluate()?;
        }
        let state = self.state.borrow();
        Ok((state.selected != T::default()).then(|| state.selected.clone()))
    }

    /// Re-evaluate all qualifiers and update the selection.
    ///
    /// Does nothing while evaluations are disabled; the map stays dirty so
    /// that a later evaluation after [`enable_evaluations`](Self::enable_evaluations)
    /// does real work.
    pub fn evaluate(&self) -> Result<()> {
        if !self.state.borrow().evaluation_enabled {
            return Ok(());
        }

        // Qualifiers are evaluated outside the state borrow so custom
        // implementations may inspect the map.
        let context = self.context.borrow().clone();
        if let Some(context) = &context {
            let qualifiers: Vec<Rc<dyn Qualifier>> = self
                .state
                .borrow()
                .items
                .iter()
                .map(|item| item.qualifier.clone())
                .collect();
            for q in &qualifiers {
                q.evaluate(context);
            }
        }

        let (selection, previous, initial) = {
            let mut state = self.state.borrow_mut();
            state
                .items
                .sort_by(|a, b| precedence(&*b.qualifier).cmp(&precedence(&*a.qualifier)));
            let selection = state
                .items
                .iter()
                .find(|item| item.qualifier.is_qualified())
                .map_or_else(T::default, |item| item.target.clone());
            let previous = core::mem::replace(&mut state.selected, selection.clone());
            (selection, previous, state.initial_evaluation)
        };

        if selection != previous {
            log::debug!(
                "variant map selection changed (initial: {initial}, selected: {})",
                selection != T::default()
            );
            for listener in self.live_listeners() {
                listener.on_variant_map_changed()?;
            }
            let handler = self.on_selection_changed.borrow().clone();
            if let Some(handler) = handler {
                handler(&selection, &previous, initial)?;
            }
        }

        let mut state = self.state.borrow_mut();
        state.dirty = false;
        state.initial_evaluation = false;
        Ok(())
    }

    /// Register `callback` for selection changes. The map keeps a weak reference.
    pub fn register_for_change_callback(&self, callback: &Rc<dyn VariantMapChangedCallback>) {
        self.listeners.borrow_mut().push(Rc::downgrade(callback));
    }

    /// Unregister a callback added with [`register_for_change_callback`](Self::register_for_change_callback).
    pub fn unregister_for_change_callback(
        &self,
        callback: &Rc<dyn VariantMapChangedCallback>,
    ) -> Result<()> {
        let addr = Rc::as_ptr(callback) as *const ();
        let mut listeners = self.listeners.borrow_mut();
        let i = listeners
            .iter()
            .position(|l| l.as_ptr() as *const () == addr)
            .ok_or(Error::CallbackNotFound)?;
        listeners.remove(i);
        Ok(())
    }

    /// Set the selection-changed handler, replacing any previous one.
    ///
    /// The handler receives `(selection, previous, is_initial_evaluation)`,
    /// where an empty selection is `T::default()`.
    pub fn set_on_selection_changed(&self, handler: impl Fn(&T, &T, bool) -> Result<()> + 'static) {
        *self.on_selection_changed.borrow_mut() = Some(Rc::new(handler));
    }

    /// Attach to `context`, or detach with `None`.
    ///
    /// A no-op when `context` is the current one. Otherwise the map leaves the
    /// old context and registers with the new one using its cumulative flags.
    pub fn set_qualifier_context(&self, context: Option<Rc<QualifierContext>>) {
        let old = self.context.borrow().clone();
        let same = match (&old, &context) {
            (Some(a), Some(b)) => Rc::ptr_eq(a, b),
            (None, None) => true,
            _ => false,
        };
        if same {
            return;
        }
        if let Some(old) = old {
            self.register_with(&old, QualifierFlags::NONE);
        }
        self.context.borrow_mut().clone_from(&context);
        if let Some(new) = context {
            let flags = self.state.borrow().flags;
            self.register_with(&new, flags);
        }
    }

    /// Resume evaluations.
    pub fn enable_evaluations(&self) {
        self.state.borrow_mut().evaluation_enabled = true;
    }

    /// Suspend evaluations, e.g. while adding a batch of items.
    pub fn disable_evaluations(&self) {
        self.state.borrow_mut().evaluation_enabled = false;
    }

    /// Whether [`evaluate`](Self::evaluate) currently does work.
    pub fn is_evaluation_enabled(&self) -> bool {
        self.state.borrow().evaluation_enabled
    }

    /// The attached context, if any.
    pub fn qualifier_context(&self) -> Option<Rc<QualifierContext>> {
        self.context.borrow().clone()
    }

    /// Union of the flags of every qualifier ever added. Never shrinks.
    pub fn flags(&self) -> QualifierFlags {
        self.state.borrow().flags
    }

    /// Number of items.
    pub fn len(&self) -> usize {
        self.state.borrow().items.len()
    }

    /// Whether the map has no items.
    pub fn is_empty(&self) -> bool {
        self.state.borrow().items.is_empty()
    }

    fn take_item(
        &self,
        matches: impl Fn(&VariantMapItem<T, D>) -> bool,
        qualifier: &dyn Qualifier,
    ) -> Result<VariantMapItem<T, D>> {
        let mut state = self.state.borrow_mut();
        let i = state
            .items
            .iter()
            .position(|item| matches(item) && compare_qualifiers(&*item.qualifier, qualifier))
            .ok_or(Error::ItemNotFound)?;
        state.dirty = true;
        Ok(state.items.remove(i))
    }

    fn register_with(&self, context: &QualifierContext, flags: QualifierFlags) {
        if let Some(this) = self.this.upgrade() {
            let listener: Rc<dyn QualifierContextListener> = this;
            context.register_changed_callback(&listener, flags);
        }
    }

    fn live_listeners(&self) -> Vec<Rc<dyn VariantMapChangedCallback>> {
        let mut listeners = self.listeners.borrow_mut();
        listeners.retain(|l| l.strong_count() > 0);
        listeners.iter().filter_map(Weak::upgrade).collect()
    }
}

impl<T, D> VariantMap<T, D>
where
    T: Clone + PartialEq + Default + 'static,
    D: Default + 'static,
{
    /// Append `target` guarded by `qualifier` with default data.
    ///
    /// See [`add_with_data`](Self::add_with_data).
    pub fn add(&self, target: T, qualifier: Rc<dyn Qualifier>) {
        self.add_with_data(target, qualifier, D::default());
    }
}

impl<T, D> VariantMap<T, D>
where
    T: Clone + PartialEq + Default + 'static,
    D: PartialEq + 'static,
{
    /// Like [`replace`](Self::replace), but finds the item by `data` instead of target.
    ///
    /// Useful when several items share a target and only their payload tells them apart.
    pub fn replace_by_data(
        &self,
        data: &D,
        old: &dyn Qualifier,
        new: Rc<dyn Qualifier>,
    ) -> Result<()> {
        let item = self.take_item(|item| item.data == *data, old)?;
        self.add_with_data(item.target, new, item.data);
        Ok(())
    }
}

impl<T, D> VariantMap<T, D>
where
    T: Clone + PartialEq + Default + 'static,
    D: Clone + 'static,
{
    /// Snapshot of the items in their current internal order.
    ///
    /// After an evaluation this is precedence order.
    pub fn items(&self) -> Vec<VariantMapItem<T, D>> {
        self.state.borrow().items.clone()
    }
}

impl<T, D> QualifierContextListener for VariantMap<T, D>
where
    T: Clone + PartialEq + Default + 'static,
    D: 'static,
{
    fn on_qualifier_context_changed(&self) -> Result<()> {
        self.evaluate()
    }
}
