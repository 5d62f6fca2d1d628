// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Property tests for qualifier evaluation and variant selection.

use std::cell::Cell;
use std::rc::Rc;

use proptest::prelude::*;
use understory_qualifier::QualifierFlags;
use understory_qualifier::context::QualifierContext;
use understory_qualifier::factory;
use understory_qualifier::qualifier::{
    MinHeightQualifier, MinWidthQualifier, MultiQualifier, Qualifier,
};
use understory_qualifier::variant_map::VariantMap;

proptest! {
    #[test]
    fn min_width_tracks_last_window(
        min in 0i32..5_000,
        widths in proptest::collection::vec(0u32..5_000, 1..8),
    ) {
        let ctx = QualifierContext::new();
        let q = MinWidthQualifier::new(min);
        for &w in &widths {
            ctx.on_window_changed(w, 0).unwrap();
            q.evaluate(&ctx);
        }
        let last = *widths.last().unwrap();
        prop_assert_eq!(q.is_qualified(), last >= min as u32);
    }

    #[test]
    fn min_height_tracks_window(min in 0i32..5_000, height in 0u32..5_000, width in 0u32..5_000) {
        let q = MinHeightQualifier::new(min);
        q.evaluate(&QualifierContext::with_window_size(width, height));
        prop_assert_eq!(q.is_qualified(), height >= min as u32);
    }

    #[test]
    fn multi_is_and_of_children(
        children in proptest::collection::vec((any::<bool>(), 0i32..1_000), 0..6),
        width in 0u32..1_000,
        height in 0u32..1_000,
    ) {
        let ctx = QualifierContext::with_window_size(width, height);
        let mut multi = MultiQualifier::new();
        let mut expected_flags = QualifierFlags::NONE;
        for &(is_width, value) in &children {
            let child = if is_width {
                factory::create(QualifierFlags::WIDTH, value)
            } else {
                factory::create(QualifierFlags::HEIGHT, value)
            };
            let child = child.unwrap();
            expected_flags |= child.flags();
            multi.add(child);
        }
        multi.evaluate(&ctx);
        let all = multi.children().iter().all(|c| c.is_qualified());
        prop_assert_eq!(multi.is_qualified(), !children.is_empty() && all);
        prop_assert_eq!(multi.flags(), expected_flags);
    }

    #[test]
    fn pairs_round_trip(width in 0i32..10_000, height in 0i32..10_000) {
        let w = QualifierFlags::WIDTH.bits() as i32;
        let h = QualifierFlags::HEIGHT.bits() as i32;
        let q = factory::create_from_pairs(&[w, width, h, height]).unwrap();
        prop_assert_eq!(q.score(QualifierFlags::WIDTH), width);
        prop_assert_eq!(q.score(QualifierFlags::HEIGHT), height);
        prop_assert_eq!(q.flags(), QualifierFlags::WIDTH | QualifierFlags::HEIGHT);
    }

    #[test]
    fn selection_is_largest_qualified_width(
        thresholds in proptest::collection::vec(0i32..2_000, 1..10),
        window in 0u32..2_000,
    ) {
        let ctx = Rc::new(QualifierContext::new());
        let map: Rc<VariantMap<usize>> = VariantMap::new();
        map.set_qualifier_context(Some(ctx.clone()));
        for (i, &t) in thresholds.iter().enumerate() {
            map.add(i + 1, factory::create_min_size(t, -1));
        }
        ctx.on_window_changed(window, 0).unwrap();

        // Largest qualifying threshold; first inserted among equals.
        let mut best: Option<(i32, usize)> = None;
        for (i, &t) in thresholds.iter().enumerate() {
            if t as u32 <= window && best.is_none_or(|(bt, _)| t > bt) {
                best = Some((t, i + 1));
            }
        }
        prop_assert_eq!(map.selected_item().unwrap(), best.map(|(_, target)| target));
    }

    #[test]
    fn repeated_evaluation_is_idempotent(
        thresholds in proptest::collection::vec(0i32..500, 1..6),
        window in 0u32..500,
    ) {
        let ctx = Rc::new(QualifierContext::with_window_size(window, window));
        let map: Rc<VariantMap<usize>> = VariantMap::new();
        map.set_qualifier_context(Some(ctx));
        let changes = Rc::new(Cell::new(0));
        let seen = changes.clone();
        map.set_on_selection_changed(move |_, _, _| {
            seen.set(seen.get() + 1);
            Ok(())
        });
        for (i, &t) in thresholds.iter().enumerate() {
            map.add(i + 1, factory::create_min_size(-1, t));
        }
        map.evaluate().unwrap();
        let first = map.selected_item().unwrap();
        let after_first = changes.get();
        map.evaluate().unwrap();
        prop_assert_eq!(map.selected_item().unwrap(), first);
        prop_assert_eq!(changes.get(), after_first);
    }
}
