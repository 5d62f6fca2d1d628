// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Error type shared by the context and variant maps.

use alloc::boxed::Box;

use thiserror::Error;

/// Errors raised by [`VariantMap`](crate::variant_map::VariantMap) and
/// [`QualifierContext`](crate::context::QualifierContext) operations.
#[derive(Debug, Error)]
pub enum Error {
    /// No item matched the target (or data) and qualifier passed to a remove or replace.
    #[error("no variant map item matches the given key and qualifier")]
    ItemNotFound,

    /// The change callback being unregistered was never registered.
    #[error("change callback is not registered")]
    CallbackNotFound,

    /// A listener or selection handler failed; remaining notifications were skipped.
    #[error("change handler failed")]
    Handler(#[source] Box<dyn core::error::Error>),
}

impl Error {
    /// Wrap a handler failure.
    pub fn handler(err: impl core::error::Error + 'static) -> Self {
        Self::Handler(Box::new(err))
    }
}

/// Result alias for this crate.
pub type Result<T, E = Error> = core::result::Result<T, E>;
