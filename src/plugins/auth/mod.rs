//! Authentication plugin.
//!
//! Responsibility:
//! - Detect exactly one credential per request (api key > bearer > session cookie > email/password)
//! - Delegate identity lookup to the embedding application (`UserLookup`)
//! - Attach the identity to the request extensions, read back with `CurrentUser`
//! - Register itself as the first pre-handler of routes that opt in (`RouteOptions::authenticated`)

mod credential;
mod extractor;
mod lookup;
mod options;
mod plugin;
mod resolver;

pub use credential::{API_KEY_HEADER, AuthMethod, Credential, CredentialValue, detect_credential};
pub use extractor::CurrentUser;
pub use lookup::{FnLookup, RequestUser, UserLookup, lookup_fn};
pub use options::AuthOptions;
pub use plugin::{AuthConfig, AuthPlugin};
pub use resolver::AuthResolver;
