// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Understory Qualifier: adaptive variant selection for UI.
//!
//! ## Overview
//!
//! This crate picks one target (a visual state, a style, a layout) out of a
//! set of competing candidates, each guarded by a condition, and keeps that
//! choice current as the environment changes.
//! It does not apply the choice; callers get notified and do that themselves.
//!
//! ## Pieces
//!
//! - [`QualifierFlags`]: the dimensions a condition can depend on.
//! - [`Qualifier`](qualifier::Qualifier): a predicate with per-dimension scores.
//!   Built-in kinds are minimum width, minimum height, host-driven
//!   ([`ExtensibleFlag`](qualifier::ExtensibleFlag)), and conjunctions.
//! - [`factory`]: builds qualifiers from thresholds or serialized `[flag, value, ...]` arrays.
//! - [`QualifierContext`](context::QualifierContext): the shared window size plus
//!   change notification filtered by flags.
//! - [`VariantMap`](variant_map::VariantMap): ranks candidates and tracks the winner.
//! - [`trigger`]: host-side state and adaptive triggers that keep maps up to date.
//!
//! ## Precedence
//!
//! Candidates are ranked by extensible score, then width, then height, all
//! descending, and the first qualified candidate wins. Ties keep their
//! previous relative order.
//!
//! ## Minimal usage
//!
//! ```
//! use std::rc::Rc;
//! use understory_qualifier::context::QualifierContext;
//! use understory_qualifier::factory;
//! use understory_qualifier::variant_map::VariantMap;
//!
//! #[derive(Clone, Copy, Debug, Default, PartialEq)]
//! enum Layout {
//!     #[default]
//!     None,
//!     Compact,
//!     Wide,
//! }
//!
//! let context = Rc::new(QualifierContext::new());
//! let map: Rc<VariantMap<Layout>> = VariantMap::new();
//! map.set_qualifier_context(Some(context.clone()));
//! map.add(Layout::Compact, factory::create_min_size(0, -1));
//! map.add(Layout::Wide, factory::create_min_size(720, -1));
//!
//! context.on_window_changed(1024, 768).unwrap();
//! assert_eq!(map.selected_item().unwrap(), Some(Layout::Wide));
//!
//! context.on_window_changed(500, 768).unwrap();
//! assert_eq!(map.selected_item().unwrap(), Some(Layout::Compact));
//! ```
//!
//! ## Threading
//!
//! Everything here is single-threaded (`Rc`, `Cell`, `RefCell`) and runs
//! synchronously on the caller's stack. Use it from the thread that owns the UI.
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

pub mod context;
pub mod error;
pub mod factory;
pub mod flags;
pub mod qualifier;
pub mod trigger;
pub mod variant_map;

pub use error::{Error, Result};
pub use flags::QualifierFlags;
