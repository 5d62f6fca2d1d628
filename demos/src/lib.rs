// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Shared helpers for the runnable demos in `examples/`.

use std::fmt::Debug;

/// Print one line describing a selection change.
pub fn report<T: Debug + Default + PartialEq>(label: &str, selection: &T, previous: &T, initial: bool) {
    let show = |t: &T| {
        if *t == T::default() {
            "<none>".to_string()
        } else {
            format!("{t:?}")
        }
    };
    println!(
        "  [{label}] {} -> {}{}",
        show(previous),
        show(selection),
        if initial { " (initial)" } else { "" }
    );
}
