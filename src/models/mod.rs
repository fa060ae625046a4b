// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Data models for the application.

pub mod gif;
pub mod user;
pub mod weather;

pub use gif::Gif;
pub use user::{Provider, User};
pub use weather::WeatherCollection;

/// A stored record whose owner is fixed at creation.
///
/// The owner email is the authenticated caller's email at creation time and
/// is never rewritten by later updates.
pub trait OwnedResource {
    fn owner_email(&self) -> &str;
}
