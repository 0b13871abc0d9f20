/*
 * Responsibility
 * - HTTP surface: versioned routes + shared response wrappers
 */
pub mod response;
pub mod v1;
