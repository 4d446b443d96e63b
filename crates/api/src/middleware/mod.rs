//! Authentication extractors.
//!
//! - [`auth::AuthUser`] -- a valid Bearer token is required (401 otherwise).
//! - [`auth::MaybeUser`] -- anonymous visitors are allowed.
//! - [`auth::LoginRequired`] -- anonymous visitors are redirected to log in.

pub mod auth;
