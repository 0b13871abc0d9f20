/*
 * Responsibility
 * - Database helpers that sit next to the pool (no repositories here)
 */
pub mod connection_tester;

pub use connection_tester::{
    ConnectionTestReport, ConnectionTesterError, DatabaseConnectionTester, VariantMessages,
    default_variant_messages,
};
