/*
 * Responsibility
 * - Reusable value schemas (uuid / email) shared by DTO validation and extractors
 * - `is_*` answers yes/no, `parse_*` turns a rejection into a ValidationError
 */
mod email;
mod uuid;

pub use email::{is_email, parse_email};
pub use uuid::{is_uuid, parse_uuid};
