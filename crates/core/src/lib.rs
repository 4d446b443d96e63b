//! Domain building blocks shared by the database and HTTP layers.
//!
//! Everything here is pure logic with no database or HTTP dependencies:
//! error types, text truncation, page arithmetic, form validation and the
//! authorship predicate.

pub mod error;
pub mod forms;
pub mod pagination;
pub mod permissions;
pub mod text;
pub mod types;
