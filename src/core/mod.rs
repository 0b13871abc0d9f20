/*
 * Responsibility
 * - Small control-flow helpers that turn "missing" / "rejected" / "failed" into a typed AppError
 */
mod assert;
mod safe;

pub use assert::{assert, assert_true, assert_with};
pub use safe::safe;
