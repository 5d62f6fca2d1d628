// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Context dimensions a qualifier can depend on or be scored along.

bitflags::bitflags! {
    /// Independent dimensions of a [`QualifierContext`](crate::context::QualifierContext).
    ///
    /// Used two ways:
    /// - as a declaration of which context changes a qualifier (or a
    ///   [`VariantMap`](crate::variant_map::VariantMap)) cares about, and
    /// - as a selector passed to [`Qualifier::score`](crate::qualifier::Qualifier::score).
    ///
    /// The bit values are part of the serialized trigger format consumed by
    /// [`create_from_pairs`](crate::factory::create_from_pairs).
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct QualifierFlags: u32 {
        /// Window width.
        const WIDTH      = 0b0000_0001;
        /// Window height.
        const HEIGHT     = 0b0000_0010;
        /// Externally driven condition.
        const EXTENSIBLE = 0b0000_0100;
        /// Instance identity, only meaningful as a score selector.
        const IDENTIFIER = 0b0000_1000;
    }
}

impl QualifierFlags {
    /// No dimension. Registering a listener with this removes it.
    pub const NONE: Self = Self::empty();

    /// Reinterpret a serialized integer as flags, keeping unknown bits.
    ///
    /// Negative values carry no known dimension and map to [`NONE`](Self::NONE).
    pub fn from_raw(raw: i32) -> Self {
        u32::try_from(raw).map_or(Self::NONE, Self::from_bits_retain)
    }
}

impl PartialEq<u32> for QualifierFlags {
    fn eq(&self, other: &u32) -> bool {
        self.bits() == *other
    }
}

impl PartialEq<i32> for QualifierFlags {
    fn eq(&self, other: &i32) -> bool {
        u32::try_from(*other).is_ok_and(|raw| self.bits() == raw)
    }
}
