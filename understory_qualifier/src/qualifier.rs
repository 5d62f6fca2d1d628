// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Qualifiers: scored predicates over a [`QualifierContext`].
//!
//! ## Scores
//!
//! [`Qualifier::score`] answers "how specific is this qualifier along one
//! dimension". A score of [`NOT_SCORED`] (`-1`) means the qualifier does not
//! participate in that dimension; any non-negative score participates and is
//! compared for precedence by [`VariantMap`](crate::variant_map::VariantMap).
//! Scores are queryable whether or not the qualifier is currently qualified.
//!
//! ## Kinds
//!
//! - [`MinWidthQualifier`] / [`MinHeightQualifier`]: window size thresholds.
//! - [`ExtensibleQualifier`]: reads a host-owned [`ExtensibleFlag`].
//! - [`MultiQualifier`]: AND of its children.

use alloc::rc::{Rc, Weak};
use alloc::vec::Vec;
use core::cell::Cell;
use core::fmt;
use core::sync::atomic::{AtomicI32, Ordering};

use crate::context::QualifierContext;
use crate::flags::QualifierFlags;

/// Score returned for a dimension the qualifier does not participate in.
pub const NOT_SCORED: i32 = -1;

/// A scored predicate over a shared [`QualifierContext`].
///
/// Qualifiers are shared as `Rc<dyn Qualifier>` between maps and across a
/// [`VariantMap::replace`](crate::variant_map::VariantMap::replace), so all
/// methods take `&self`; cached state lives in `Cell`s.
pub trait Qualifier: fmt::Debug {
    /// Whether the qualifier held at the last [`evaluate`](Self::evaluate).
    fn is_qualified(&self) -> bool;

    /// Score along the single dimension `flags`, or [`NOT_SCORED`].
    fn score(&self, flags: QualifierFlags) -> i32;

    /// Refresh cached state from `context`.
    fn evaluate(&self, context: &QualifierContext);

    /// Context dimensions this qualifier depends on.
    fn flags(&self) -> QualifierFlags;
}

/// Structural equality used to find items in a variant map.
///
/// Two qualifiers are equal when their identifier, height and width scores
/// all match. Qualifiers of different kinds compare equal if those scores
/// coincide.
pub fn compare_qualifiers(a: &dyn Qualifier, b: &dyn Qualifier) -> bool {
    a.score(QualifierFlags::IDENTIFIER) == b.score(QualifierFlags::IDENTIFIER)
        && a.score(QualifierFlags::HEIGHT) == b.score(QualifierFlags::HEIGHT)
        && a.score(QualifierFlags::WIDTH) == b.score(QualifierFlags::WIDTH)
}

/// Qualified while the window is at least `min_width` wide.
#[derive(Debug)]
pub struct MinWidthQualifier {
    min_width: i32,
    qualified: Cell<bool>,
}

impl MinWidthQualifier {
    /// Create a threshold qualifier. It is unqualified until first evaluated.
    pub fn new(min_width: i32) -> Self {
        Self {
            min_width,
            qualified: Cell::new(false),
        }
    }

    /// The configured threshold.
    pub fn min_width(&self) -> i32 {
        self.min_width
    }
}

impl Qualifier for MinWidthQualifier {
    fn is_qualified(&self) -> bool {
        self.qualified.get()
    }

    fn score(&self, flags: QualifierFlags) -> i32 {
        if flags == QualifierFlags::WIDTH {
            self.min_width
        } else {
            NOT_SCORED
        }
    }

    fn evaluate(&self, context: &QualifierContext) {
        self.qualified
            .set(i64::from(self.min_width) <= i64::from(context.window_width()));
    }

    fn flags(&self) -> QualifierFlags {
        QualifierFlags::WIDTH
    }
}

/// Qualified while the window is at least `min_height` tall.
#[derive(Debug)]
pub struct MinHeightQualifier {
    min_height: i32,
    qualified: Cell<bool>,
}

impl MinHeightQualifier {
    /// Create a threshold qualifier. It is unqualified until first evaluated.
    pub fn new(min_height: i32) -> Self {
        Self {
            min_height,
            qualified: Cell::new(false),
        }
    }

    /// The configured threshold.
    pub fn min_height(&self) -> i32 {
        self.min_height
    }
}

impl Qualifier for MinHeightQualifier {
    fn is_qualified(&self) -> bool {
        self.qualified.get()
    }

    fn score(&self, flags: QualifierFlags) -> i32 {
        if flags == QualifierFlags::HEIGHT {
            self.min_height
        } else {
            NOT_SCORED
        }
    }

    fn evaluate(&self, context: &QualifierContext) {
        self.qualified
            .set(i64::from(self.min_height) <= i64::from(context.window_height()));
    }

    fn flags(&self) -> QualifierFlags {
        QualifierFlags::HEIGHT
    }
}

static NEXT_FLAG_ID: AtomicI32 = AtomicI32::new(1);

/// A host-owned boolean that drives an [`ExtensibleQualifier`].
///
/// The host keeps this handle and flips it with [`set`](Self::set). Qualifiers
/// only hold a weak reference: once every clone of the flag is dropped,
/// qualifiers built from it read as not triggered.
///
/// Flipping the flag does not re-evaluate anything by itself. The host must
/// call [`VariantMap::evaluate`](crate::variant_map::VariantMap::evaluate)
/// afterwards (see [`StateTrigger`](crate::trigger::StateTrigger)).
#[derive(Clone, Debug)]
pub struct ExtensibleFlag {
    id: i32,
    state: Rc<Cell<bool>>,
}

impl ExtensibleFlag {
    /// Create a flag with an initial value and a fresh identity.
    pub fn new(initial: bool) -> Self {
        Self {
            id: NEXT_FLAG_ID.fetch_add(1, Ordering::Relaxed),
            state: Rc::new(Cell::new(initial)),
        }
    }

    /// Current value.
    pub fn get(&self) -> bool {
        self.state.get()
    }

    /// Store a new value, returning the previous one.
    pub fn set(&self, value: bool) -> bool {
        self.state.replace(value)
    }

    /// Stable identity shared by all clones of this flag.
    pub fn id(&self) -> i32 {
        self.id
    }
}

impl Default for ExtensibleFlag {
    fn default() -> Self {
        Self::new(false)
    }
}

/// Qualified while the referenced [`ExtensibleFlag`] is set.
#[derive(Debug)]
pub struct ExtensibleQualifier {
    id: i32,
    triggered: Weak<Cell<bool>>,
}

impl ExtensibleQualifier {
    /// Borrow `flag` without taking ownership of its storage.
    pub fn new(flag: &ExtensibleFlag) -> Self {
        Self {
            id: flag.id,
            triggered: Rc::downgrade(&flag.state),
        }
    }
}

impl Qualifier for ExtensibleQualifier {
    fn is_qualified(&self) -> bool {
        self.triggered.upgrade().is_some_and(|flag| flag.get())
    }

    fn score(&self, flags: QualifierFlags) -> i32 {
        if flags == QualifierFlags::EXTENSIBLE {
            1
        } else if flags == QualifierFlags::IDENTIFIER {
            self.id
        } else {
            NOT_SCORED
        }
    }

    // State lives in the host-owned flag.
    fn evaluate(&self, _context: &QualifierContext) {}

    fn flags(&self) -> QualifierFlags {
        QualifierFlags::EXTENSIBLE
    }
}

/// Conjunction of child qualifiers.
///
/// Qualified iff it has at least one child and every child is qualified.
/// [`score`](Qualifier::score) returns the first participating child score in
/// child order, not the maximum.
#[derive(Debug, Default)]
pub struct MultiQualifier {
    children: Vec<Rc<dyn Qualifier>>,
}

impl MultiQualifier {
    /// Create an empty conjunction (never qualified).
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a child.
    pub fn add(&mut self, child: Rc<dyn Qualifier>) {
        self.children.push(child);
    }

    /// Children in insertion order.
    pub fn children(&self) -> &[Rc<dyn Qualifier>] {
        &self.children
    }
}

impl Qualifier for MultiQualifier {
    fn is_qualified(&self) -> bool {
        !self.children.is_empty() && self.children.iter().all(|q| q.is_qualified())
    }

    fn score(&self, flags: QualifierFlags) -> i32 {
        self.children
            .iter()
            .map(|q| q.score(flags))
            .find(|&s| s != NOT_SCORED)
            .unwrap_or(NOT_SCORED)
    }

    fn evaluate(&self, context: &QualifierContext) {
        for q in &self.children {
            q.evaluate(context);
        }
    }

    fn flags(&self) -> QualifierFlags {
        self.children
            .iter()
            .fold(QualifierFlags::NONE, |acc, q| acc | q.flags())
    }
}
