// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Host-side triggers that feed variant maps.
//!
//! - [`StateTrigger`]: an on/off condition owned by the host. Flipping it
//!   re-evaluates every map it was attached to.
//! - [`AdaptiveTrigger`]: minimum window width/height thresholds. Changing a
//!   threshold swaps its qualifier in every map it was attached to.
//!
//! Triggers hold their maps weakly; a dropped map is simply skipped.

use alloc::rc::{Rc, Weak};
use alloc::vec::Vec;
use core::cell::{Cell, RefCell};
use core::fmt;

use crate::context::QualifierContextListener;
use crate::error::Result;
use crate::factory;
use crate::qualifier::{ExtensibleFlag, Qualifier};
use crate::variant_map::VariantMap;

/// An extensible condition driven by host code.
#[derive(Debug)]
pub struct StateTrigger {
    flag: ExtensibleFlag,
    qualifier: Rc<dyn Qualifier>,
    owners: RefCell<Vec<Weak<dyn QualifierContextListener>>>,
}

impl StateTrigger {
    /// Create a trigger in the given state.
    pub fn new(active: bool) -> Self {
        let flag = ExtensibleFlag::new(active);
        let qualifier = factory::create_extensible(&flag);
        Self {
            flag,
            qualifier,
            owners: RefCell::new(Vec::new()),
        }
    }

    /// Whether the condition currently holds.
    pub fn is_active(&self) -> bool {
        self.flag.get()
    }

    /// The qualifier representing this trigger in variant maps.
    pub fn qualifier(&self) -> Rc<dyn Qualifier> {
        self.qualifier.clone()
    }

    /// Add `target` guarded by this trigger to `map` and remember the map.
    pub fn attach<T, D>(&self, map: &Rc<VariantMap<T, D>>, target: T, data: D)
    where
        T: Clone + PartialEq + Default + 'static,
        D: 'static,
    {
        map.add_with_data(target, self.qualifier(), data);
        let owner: Rc<dyn QualifierContextListener> = map.clone();
        self.owners.borrow_mut().push(Rc::downgrade(&owner));
    }

    /// Set the condition and re-evaluate every attached map if it changed.
    pub fn set_active(&self, active: bool) -> Result<()> {
        if self.flag.set(active) == active {
            return Ok(());
        }
        let owners: Vec<Rc<dyn QualifierContextListener>> = {
            let mut owners = self.owners.borrow_mut();
            owners.retain(|o| o.strong_count() > 0);
            owners.iter().filter_map(Weak::upgrade).collect()
        };
        log::trace!("state trigger set to {active}, re-evaluating {} map(s)", owners.len());
        for owner in owners {
            owner.on_qualifier_context_changed()?;
        }
        Ok(())
    }
}

impl Default for StateTrigger {
    fn default() -> Self {
        Self::new(false)
    }
}

/// Minimum window size thresholds for a single target.
///
/// A negative threshold is unset. With both unset the trigger never qualifies.
pub struct AdaptiveTrigger<T, D = ()> {
    min_window_width: Cell<i32>,
    min_window_height: Cell<i32>,
    qualifier: RefCell<Rc<dyn Qualifier>>,
    owners: RefCell<Vec<(Weak<VariantMap<T, D>>, T)>>,
}

impl<T, D> fmt::Debug for AdaptiveTrigger<T, D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AdaptiveTrigger")
            .field("min_window_width", &self.min_window_width.get())
            .field("min_window_height", &self.min_window_height.get())
            .field("owners", &self.owners.borrow().len())
            .finish()
    }
}

impl<T, D> Default for AdaptiveTrigger<T, D>
where
    T: Clone + PartialEq + Default + 'static,
    D: Default + 'static,
{
    fn default() -> Self {
        Self::new(-1, -1)
    }
}

impl<T, D> AdaptiveTrigger<T, D>
where
    T: Clone + PartialEq + Default + 'static,
    D: Default + 'static,
{
    /// Create a trigger with the given thresholds.
    pub fn new(min_window_width: i32, min_window_height: i32) -> Self {
        Self {
            min_window_width: Cell::new(min_window_width),
            min_window_height: Cell::new(min_window_height),
            qualifier: RefCell::new(factory::create_min_size(min_window_width, min_window_height)),
            owners: RefCell::new(Vec::new()),
        }
    }

    /// Minimum window width, negative if unset.
    pub fn min_window_width(&self) -> i32 {
        self.min_window_width.get()
    }

    /// Minimum window height, negative if unset.
    pub fn min_window_height(&self) -> i32 {
        self.min_window_height.get()
    }

    /// The qualifier currently registered for this trigger.
    pub fn qualifier(&self) -> Rc<dyn Qualifier> {
        self.qualifier.borrow().clone()
    }

    /// Add `target` guarded by this trigger to `map` and remember the pair.
    pub fn attach(&self, map: &Rc<VariantMap<T, D>>, target: T) {
        map.add(target.clone(), self.qualifier());
        self.owners.borrow_mut().push((Rc::downgrade(map), target));
    }

    /// Change the width threshold, updating every attached map.
    pub fn set_min_window_width(&self, width: i32) -> Result<()> {
        if self.min_window_width.replace(width) == width {
            return Ok(());
        }
        self.requalify()
    }

    /// Change the height threshold, updating every attached map.
    pub fn set_min_window_height(&self, height: i32) -> Result<()> {
        if self.min_window_height.replace(height) == height {
            return Ok(());
        }
        self.requalify()
    }

    /// Swap in a qualifier for the current thresholds.
    ///
    /// Every live owner is updated independently. Owners whose item is gone
    /// (for example after [`VariantMap::clear`]) are forgotten. Evaluation
    /// errors do not stop the remaining maps; the first one is returned.
    fn requalify(&self) -> Result<()> {
        let new = factory::create_min_size(self.min_window_width(), self.min_window_height());
        let old = self.qualifier();
        let live: Vec<(Rc<VariantMap<T, D>>, T)> = self
            .owners
            .borrow()
            .iter()
            .filter_map(|(map, target)| Some((map.upgrade()?, target.clone())))
            .collect();

        let mut updated = Vec::with_capacity(live.len());
        for (map, target) in live {
            if map.replace(&target, &*old, new.clone()).is_ok() {
                updated.push((map, target));
            } else {
                log::debug!("adaptive trigger item no longer in its map, detaching");
            }
        }
        *self.qualifier.borrow_mut() = new;
        *self.owners.borrow_mut() = updated
            .iter()
            .map(|(map, target)| (Rc::downgrade(map), target.clone()))
            .collect();

        let mut first_err = None;
        for (map, _) in &updated {
            if let Err(err) = map.evaluate() {
                first_err.get_or_insert(err);
            }
        }
        first_err.map_or(Ok(()), Err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::QualifierContext;
    use crate::flags::QualifierFlags;

    fn attached() -> (Rc<QualifierContext>, Rc<VariantMap<u32>>) {
        let ctx = Rc::new(QualifierContext::new());
        let map = VariantMap::new();
        map.set_qualifier_context(Some(ctx.clone()));
        (ctx, map)
    }

    #[test]
    fn state_trigger_pushes_evaluation() {
        let (ctx, map) = attached();
        let narrow = AdaptiveTrigger::new(0, -1);
        narrow.attach(&map, 1);
        let custom = StateTrigger::new(false);
        custom.attach(&map, 2, ());
        ctx.on_window_changed(300, 300).unwrap();
        assert_eq!(map.selected_item().unwrap(), Some(1));

        custom.set_active(true).unwrap();
        assert!(custom.is_active());
        assert_eq!(map.selected_item().unwrap(), Some(2));

        custom.set_active(false).unwrap();
        assert_eq!(map.selected_item().unwrap(), Some(1));
    }

    #[test]
    fn state_trigger_shared_across_maps() {
        let (_ctx, a) = attached();
        let (_ctx2, b) = attached();
        let t = StateTrigger::new(false);
        t.attach(&a, 5, ());
        t.attach(&b, 6, ());
        assert_eq!(a.selected_item().unwrap(), None);
        t.set_active(true).unwrap();
        assert_eq!(a.selected_item().unwrap(), Some(5));
        assert_eq!(b.selected_item().unwrap(), Some(6));
        drop(b);
        t.set_active(false).unwrap();
        assert_eq!(a.selected_item().unwrap(), None);
    }

    #[test]
    fn adaptive_trigger_replaces_qualifier() {
        let (ctx, map) = attached();
        let small = AdaptiveTrigger::new(0, -1);
        let large = AdaptiveTrigger::new(720, -1);
        small.attach(&map, 1);
        large.attach(&map, 2);
        ctx.on_window_changed(800, 600).unwrap();
        assert_eq!(map.selected_item().unwrap(), Some(2));

        large.set_min_window_width(1000).unwrap();
        assert_eq!(map.selected_item().unwrap(), Some(1));
        assert_eq!(map.len(), 2);
        assert_eq!(large.qualifier().score(QualifierFlags::WIDTH), 1000);

        large.set_min_window_height(500).unwrap();
        large.set_min_window_width(700).unwrap();
        assert_eq!(large.qualifier().flags(), QualifierFlags::WIDTH | QualifierFlags::HEIGHT);
        assert_eq!(map.selected_item().unwrap(), Some(2));
    }

    #[test]
    fn adaptive_trigger_survives_cleared_map() {
        let (_ctx_a, a) = attached();
        let (ctx_b, b) = attached();
        let t = AdaptiveTrigger::new(100, -1);
        t.attach(&a, 1);
        t.attach(&b, 1);
        assert_eq!(a.clear(&1), 1);

        // A lost its item; B still follows every threshold change.
        t.set_min_window_width(500).unwrap();
        assert_eq!(b.items()[0].qualifier.score(QualifierFlags::WIDTH), 500);
        assert!(a.is_empty());

        drop(a);
        t.set_min_window_width(900).unwrap();
        assert_eq!(b.items()[0].qualifier.score(QualifierFlags::WIDTH), 900);
        assert_eq!(t.qualifier().score(QualifierFlags::WIDTH), 900);
        ctx_b.on_window_changed(800, 600).unwrap();
        assert_eq!(b.selected_item().unwrap(), None);
    }

    #[test]
    fn unset_adaptive_trigger_never_qualifies() {
        let (ctx, map) = attached();
        let t: AdaptiveTrigger<u32> = AdaptiveTrigger::default();
        t.attach(&map, 3);
        ctx.on_window_changed(10, 10).unwrap();
        assert_eq!(map.selected_item().unwrap(), None);
        t.set_min_window_height(5).unwrap();
        assert_eq!(map.selected_item().unwrap(), Some(3));
    }
}
