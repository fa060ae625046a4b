// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Services module - business logic layer.

pub mod gcs;
pub mod google_oauth;
pub mod google_oidc;
pub mod identity;
pub mod linkedin;
pub mod oauth_state;
pub mod photos;
pub mod verifier;

pub use google_oauth::GoogleOAuthClient;
pub use google_oidc::GoogleIdTokenVerifier;
pub use identity::IdentityResolver;
pub use linkedin::LinkedInClient;
pub use photos::PhotoStorage;
pub use verifier::{CredentialVerifier, TokenVerifier, VerifiedIdentity, VerifyError};
