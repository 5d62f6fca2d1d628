// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Host-driven state trigger.
//!
//! A custom condition ("offline") outranks every size threshold while it is
//! active. The host flips it and the map re-evaluates immediately.
//!
//! Run:
//! - `cargo run -p understory_demos --example state_trigger`

use std::rc::Rc;

use understory_demos::report;
use understory_qualifier::Result;
use understory_qualifier::context::QualifierContext;
use understory_qualifier::trigger::{AdaptiveTrigger, StateTrigger};
use understory_qualifier::variant_map::VariantMap;

#[derive(Clone, Copy, Debug, Default, PartialEq)]
enum Banner {
    #[default]
    Hidden,
    Compact,
    Full,
    Offline,
}

fn main() -> Result<()> {
    let context = Rc::new(QualifierContext::with_window_size(800, 600));
    let map: Rc<VariantMap<Banner>> = VariantMap::new();
    map.set_qualifier_context(Some(context.clone()));
    map.set_on_selection_changed(|new, old, initial| {
        report("banner", new, old, initial);
        Ok(())
    });

    let compact = AdaptiveTrigger::new(0, -1);
    let full = AdaptiveTrigger::new(1000, -1);
    let offline = StateTrigger::new(false);
    compact.attach(&map, Banner::Compact);
    full.attach(&map, Banner::Full);
    offline.attach(&map, Banner::Offline, ());
    map.evaluate()?;

    println!("window 1280x720");
    context.on_window_changed(1280, 720)?;
    println!("connection lost");
    offline.set_active(true)?;
    println!("window 640x480");
    context.on_window_changed(640, 480)?;
    println!("connection restored");
    offline.set_active(false)?;
    println!("full banner threshold lowered to 600");
    full.set_min_window_width(600)?;
    Ok(())
}
