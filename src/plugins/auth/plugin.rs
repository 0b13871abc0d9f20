/*
 * Responsibility
 * - Plugin entry point: configuration in, route hook out
 * - Built once at startup; the resolver is shared (Arc) by every opted-in route
 */
use std::sync::Arc;

use serde_json::Value;

use super::{lookup::UserLookup, options::AuthOptions, resolver::AuthResolver};
use crate::plugins::route::{RouteHook, RouteOptions};

/// Everything the plugin needs at registration time.
pub struct AuthConfig<L> {
    pub lookup: L,
    pub options: AuthOptions,
    /// Forwarded verbatim as the third argument of every lookup call.
    pub lookup_options: Option<Value>,
}

impl<L> AuthConfig<L> {
    pub fn new(lookup: L) -> Self {
        Self {
            lookup,
            options: AuthOptions::default(),
            lookup_options: None,
        }
    }

    pub fn with_options(mut self, options: AuthOptions) -> Self {
        self.options = options;
        self
    }

    pub fn with_lookup_options(mut self, lookup_options: Value) -> Self {
        self.lookup_options = Some(lookup_options);
        self
    }
}

pub struct AuthPlugin<L: UserLookup> {
    resolver: Arc<AuthResolver<L>>,
}

impl<L: UserLookup> Clone for AuthPlugin<L> {
    fn clone(&self) -> Self {
        Self {
            resolver: Arc::clone(&self.resolver),
        }
    }
}

impl<L: UserLookup> AuthPlugin<L> {
    pub fn new(config: AuthConfig<L>) -> Self {
        let resolver = AuthResolver::new(config.lookup, config.options, config.lookup_options);
        Self {
            resolver: Arc::new(resolver),
        }
    }

    pub fn resolver(&self) -> &Arc<AuthResolver<L>> {
        &self.resolver
    }
}

impl<L: UserLookup> RouteHook for AuthPlugin<L> {
    // Routes without the flag are left alone; flagged routes run the resolver first.
    fn on_route(&self, mut options: RouteOptions) -> RouteOptions {
        if options.config.authenticate {
            options.pre_handlers.insert(0, self.resolver.clone());
        }
        options
    }
}
