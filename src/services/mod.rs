pub mod static_lookup;

pub use static_lookup::StaticApiKeyLookup;
