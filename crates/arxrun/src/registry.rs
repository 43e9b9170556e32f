//! Application-type registry.
//!
//! Binds application-type names to blueprints at registration time. A name
//! the registry cannot resolve is a first-class error, not a crash.

use std::sync::Arc;

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;

use crate::app::AppBlueprint;

#[derive(Debug)]
pub enum RegistryError {
    AlreadyRegistered(String),
    TypeNotFound { name: String, known: Vec<String> },
}

impl std::fmt::Display for RegistryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::AlreadyRegistered(name) => {
                write!(f, "Application type already registered: {}", name)
            }
            Self::TypeNotFound { name, known } => {
                write!(f, "Application type not found: {}", name)?;
                if !known.is_empty() {
                    write!(f, " (known types: {})", known.join(", "))?;
                }
                Ok(())
            }
        }
    }
}

impl std::error::Error for RegistryError {}

pub type Result<T> = std::result::Result<T, RegistryError>;

/// Concurrent registry of the application types known to this host.
pub struct AppTypeRegistry {
    entries: DashMap<String, Arc<dyn AppBlueprint>>,
}

impl AppTypeRegistry {
    pub fn new() -> Self {
        Self {
            entries: DashMap::new(),
        }
    }

    pub fn register(&self, name: impl Into<String>, blueprint: impl AppBlueprint) -> Result<()> {
        match self.entries.entry(name.into()) {
            Entry::Occupied(entry) => Err(RegistryError::AlreadyRegistered(entry.key().clone())),
            Entry::Vacant(entry) => {
                entry.insert(Arc::new(blueprint));
                Ok(())
            }
        }
    }

    pub fn resolve(&self, name: &str) -> Result<Arc<dyn AppBlueprint>> {
        self.entries
            .get(name)
            .map(|entry| entry.value().clone())
            .ok_or_else(|| {
                let mut known = self.registered_types();
                known.sort();
                RegistryError::TypeNotFound {
                    name: name.to_string(),
                    known,
                }
            })
    }

    pub fn registered_types(&self) -> Vec<String> {
        self.entries.iter().map(|e| e.key().clone()).collect()
    }
}

impl Default for AppTypeRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::HostedApplication;
    use crate::container::Container;
    use crate::container::ContainerError;

    struct NullBlueprint;

    impl AppBlueprint for NullBlueprint {
        fn construct(
            &self,
            _container: &Container,
        ) -> std::result::Result<Box<dyn HostedApplication>, ContainerError> {
            Err(ContainerError::Wiring("null blueprint".to_string()))
        }
    }

    #[test]
    fn register_then_resolve() {
        let registry = AppTypeRegistry::new();
        registry.register("null", NullBlueprint).unwrap();
        assert!(registry.resolve("null").is_ok());
    }

    #[test]
    fn duplicate_registration_is_rejected() {
        let registry = AppTypeRegistry::new();
        registry.register("null", NullBlueprint).unwrap();
        let err = registry.register("null", NullBlueprint).unwrap_err();
        assert!(matches!(err, RegistryError::AlreadyRegistered(_)));
    }

    #[test]
    fn unknown_type_is_not_found() {
        let registry = AppTypeRegistry::new();
        let err = registry.resolve("ghost").unwrap_err();
        assert!(matches!(err, RegistryError::TypeNotFound { .. }));
    }

    #[test]
    fn unknown_type_error_names_the_known_types() {
        let registry = AppTypeRegistry::new();
        registry.register("null", NullBlueprint).unwrap();

        let err = registry.resolve("ghost").unwrap_err();
        let rendered = err.to_string();
        assert!(rendered.contains("ghost"));
        assert!(rendered.contains("known types: null"));
    }

    #[test]
    fn registered_types_lists_every_entry() {
        let registry = AppTypeRegistry::new();
        registry.register("null", NullBlueprint).unwrap();
        assert_eq!(registry.registered_types(), vec!["null".to_string()]);
    }
}
