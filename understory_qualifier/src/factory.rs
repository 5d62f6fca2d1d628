// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Build qualifier trees from primitive trigger parameters.
//!
//! Thresholds are signed: a negative width or height means "not specified".

use alloc::rc::Rc;

use crate::flags::QualifierFlags;
use crate::qualifier::{
    ExtensibleFlag, ExtensibleQualifier, MinHeightQualifier, MinWidthQualifier, MultiQualifier,
    Qualifier,
};

/// Build a single threshold qualifier for `flags`.
///
/// Returns `None` unless `flags` is exactly [`WIDTH`](QualifierFlags::WIDTH)
/// or exactly [`HEIGHT`](QualifierFlags::HEIGHT).
pub fn create(flags: QualifierFlags, value: i32) -> Option<Rc<dyn Qualifier>> {
    if flags == QualifierFlags::WIDTH {
        Some(Rc::new(MinWidthQualifier::new(value)))
    } else if flags == QualifierFlags::HEIGHT {
        Some(Rc::new(MinHeightQualifier::new(value)))
    } else {
        None
    }
}

/// Build a qualifier from an optional minimum width and height.
///
/// - Both set: a [`MultiQualifier`] of the height qualifier followed by the width qualifier.
/// - One set: that single qualifier.
/// - Neither: an empty [`MultiQualifier`], which never qualifies.
pub fn create_min_size(width: i32, height: i32) -> Rc<dyn Qualifier> {
    match (width >= 0, height >= 0) {
        (true, true) => {
            let mut multi = MultiQualifier::new();
            multi.add(Rc::new(MinHeightQualifier::new(height)));
            multi.add(Rc::new(MinWidthQualifier::new(width)));
            Rc::new(multi)
        }
        (true, false) => Rc::new(MinWidthQualifier::new(width)),
        (false, true) => Rc::new(MinHeightQualifier::new(height)),
        (false, false) => Rc::new(MultiQualifier::new()),
    }
}

/// Build a qualifier from a flattened `[flag, value, flag, value, ...]` array.
///
/// - Empty input: an empty [`MultiQualifier`].
/// - Exactly one pair: [`create`] for that pair, which is `None` for an unknown flag.
/// - More than one pair: a [`MultiQualifier`] with one child per recognized pair.
///   Pairs whose flag is neither width nor height are skipped.
///
/// A dangling trailing element is ignored.
pub fn create_from_pairs(values: &[i32]) -> Option<Rc<dyn Qualifier>> {
    if values.len() % 2 != 0 {
        log::warn!(
            "qualifier pairs have odd length {}; ignoring trailing value",
            values.len()
        );
    }
    match values {
        [flag, value] => create(QualifierFlags::from_raw(*flag), *value),
        _ => {
            let mut multi = MultiQualifier::new();
            for pair in values.chunks_exact(2) {
                if let Some(q) = create(QualifierFlags::from_raw(pair[0]), pair[1]) {
                    multi.add(q);
                }
            }
            Some(Rc::new(multi))
        }
    }
}

/// Wrap a host-owned flag.
///
/// The qualifier holds a weak reference; the host keeps `flag` alive for as
/// long as the qualifier should be able to qualify.
pub fn create_extensible(flag: &ExtensibleFlag) -> Rc<dyn Qualifier> {
    Rc::new(ExtensibleQualifier::new(flag))
}
