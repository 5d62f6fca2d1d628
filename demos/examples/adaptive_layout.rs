// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Adaptive layout.
//!
//! Three layouts compete on minimum window width, a fourth on width and
//! height together. The window is resized a few times and every selection
//! change is printed.
//!
//! Run:
//! - `cargo run -p understory_demos --example adaptive_layout`

use std::rc::Rc;

use understory_demos::report;
use understory_qualifier::context::QualifierContext;
use understory_qualifier::factory;
use understory_qualifier::variant_map::VariantMap;

#[derive(Clone, Copy, Debug, Default, PartialEq)]
enum Layout {
    #[default]
    Unset,
    Narrow,
    Medium,
    Wide,
    Poster,
}

fn main() {
    let context = Rc::new(QualifierContext::new());
    let map: Rc<VariantMap<Layout>> = VariantMap::new();
    map.set_qualifier_context(Some(context.clone()));
    map.set_on_selection_changed(|new, old, initial| {
        report("layout", new, old, initial);
        Ok(())
    });

    map.disable_evaluations();
    map.add(Layout::Narrow, factory::create_min_size(0, -1));
    map.add(Layout::Medium, factory::create_min_size(640, -1));
    map.add(Layout::Wide, factory::create_min_size(1008, -1));
    map.add(Layout::Poster, factory::create_min_size(1008, 1200));
    map.enable_evaluations();

    println!("== Resizing ==");
    for (w, h) in [(1920, 1080), (1200, 1600), (800, 600), (320, 480), (1024, 768)] {
        println!("window {w}x{h}");
        if let Err(err) = context.on_window_changed(w, h) {
            eprintln!("evaluation failed: {err}");
            return;
        }
    }

    println!("== Ranked candidates ==");
    for item in map.items() {
        println!("  {:?}  qualified={}", item.target, item.qualifier.is_qualified());
    }
}
