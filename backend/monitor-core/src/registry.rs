//! Explicit registry of server factories, keyed by server name.
//!
//! Built once by the host and passed to [`run_goal`](crate::launcher::run_goal);
//! there is no global lookup.

use crate::error::registry::RegistryError;
use crate::resource::ControlledResource;

use common::ErrorLocation;

use std::collections::HashMap;
use std::panic::Location;
use std::sync::Arc;

use log::{debug, warn};

/// Creates servers of one named type.
pub trait ResourceFactory: Send + Sync {
    fn server_name(&self) -> &str;

    fn create(&self) -> Arc<dyn ControlledResource>;
}

#[derive(Default)]
pub struct ResourceRegistry {
    factories: HashMap<String, Box<dyn ResourceFactory>>,
}

impl ResourceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a factory under its server name, replacing any previous one.
    pub fn register(&mut self, factory: Box<dyn ResourceFactory>) {
        let name = factory.server_name().to_string();
        if self.factories.insert(name.clone(), factory).is_some() {
            warn!("Replacing server factory registered as '{name}'");
        } else {
            debug!("Registered server factory '{name}'");
        }
    }

    pub fn with_factory(mut self, factory: Box<dyn ResourceFactory>) -> Self {
        self.register(factory);
        self
    }

    pub fn get(&self, server_name: &str) -> Option<&dyn ResourceFactory> {
        self.factories.get(server_name).map(|factory| &**factory)
    }

    /// Registered server names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.factories.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Create a server of type `server_name`.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::UnknownServer`] if no factory has that name.
    pub fn create(&self, server_name: &str) -> Result<Arc<dyn ControlledResource>, RegistryError> {
        let factory = self
            .get(server_name)
            .ok_or_else(|| RegistryError::UnknownServer {
                message: format!(
                    "No server factory named '{server_name}' (registered: {})",
                    self.names().join(", ")
                ),
                location: ErrorLocation::from(Location::caller()),
            })?;

        Ok(factory.create())
    }
}
