// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Ownership enforcement for card operations.
//!
//! Ownership is exact username equality between the resource owner and the
//! acting principal. A missing resource and a resource owned by someone else
//! are indistinguishable to the caller: both come out of [`OwnershipCheck`]
//! as `None`, so non-owners learn nothing about which ids exist.

/// Trait for resources that have an owner.
pub trait OwnedResource {
    /// Username of the owner.
    fn owner_username(&self) -> &str;

    fn is_owned_by(&self, username: &str) -> bool {
        self.owner_username() == username
    }
}

/// Filter an optional lookup result down to resources owned by `username`.
pub trait OwnershipCheck<T> {
    fn owned_by(self, username: &str) -> Option<T>;
}

impl<T: OwnedResource> OwnershipCheck<T> for Option<T> {
    fn owned_by(self, username: &str) -> Option<T> {
        self.filter(|resource| resource.is_owned_by(username))
    }
}
