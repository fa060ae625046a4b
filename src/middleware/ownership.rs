// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Ownership checks for stored resources.
//!
//! There is no sharing: a caller may read or change a resource only when
//! its owner email equals the caller's verified email.

use crate::error::AppError;
use crate::middleware::auth::AuthUser;
use crate::models::OwnedResource;

/// Allow iff `resource` is owned by `caller`.
pub fn authorize<R: OwnedResource>(caller: &AuthUser, resource: &R) -> Result<(), AppError> {
    check(caller, resource.owner_email())
}

/// Allow iff the `{userId}` path segment of a listing route is the caller.
pub fn authorize_owner_path(caller: &AuthUser, user_id: &str) -> Result<(), AppError> {
    check(caller, user_id)
}

/// 404 with `not_found` when absent, 403 when owned by someone else.
pub fn require_owned<R: OwnedResource>(
    caller: &AuthUser,
    found: Option<R>,
    not_found: &str,
) -> Result<R, AppError> {
    let resource = found.ok_or_else(|| AppError::NotFound(not_found.to_string()))?;
    authorize(caller, &resource)?;
    Ok(resource)
}

fn check(caller: &AuthUser, owner_email: &str) -> Result<(), AppError> {
    if owner_email == caller.email {
        return Ok(());
    }

    tracing::warn!(
        caller = %caller.email,
        owner = %owner_email,
        "Blocked access to resource owned by another user"
    );
    Err(AppError::Forbidden)
}
