//! HTTP handlers, one module per page family.

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

pub mod accounts;
pub mod feeds;
pub mod follow;
pub mod posts;

/// Bytes escaped in a path segment: everything but unreserved characters.
const PATH_SEGMENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

/// Profile page of `username`, safe to use as a `Location` header.
pub(crate) fn profile_url(username: &str) -> String {
    format!("/profile/{}/", utf8_percent_encode(username, PATH_SEGMENT))
}
