//! Dependency-injection container scoped to one hosted application.
//!
//! Registration is an explicit ordered sequence: the runtime registers the
//! server context and configuration provider, the application's blueprint
//! installs its own bindings, then the entry point is constructed. No
//! scanning, no ambient state.
//!
//! ## Invariants
//!
//! - Exclusively owned by one runtime; never shared across instances
//! - Exists exactly while the hosted application is Starting or Started
//! - Disposal runs every registered disposer even when some fail

use std::sync::Arc;

type SingletonMap = anymap::Map<dyn anymap::any::Any + Send + Sync>;
type Disposer = Box<dyn FnOnce() -> std::result::Result<(), String> + Send>;

#[derive(Debug)]
pub enum ContainerError {
    /// No singleton of the requested type was registered.
    Missing(&'static str),
    /// An installer or constructor rejected the wiring.
    Wiring(String),
}

impl std::fmt::Display for ContainerError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Missing(ty) => write!(f, "No registration for type: {}", ty),
            Self::Wiring(msg) => write!(f, "Wiring error: {}", msg),
        }
    }
}

impl std::error::Error for ContainerError {}

pub type Result<T> = std::result::Result<T, ContainerError>;

/// Failures collected while disposing a container.
#[derive(Debug)]
pub struct DisposeError {
    pub failures: Vec<String>,
}

impl std::fmt::Display for DisposeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Container disposal failed: {}", self.failures.join("; "))
    }
}

impl std::error::Error for DisposeError {}

/// Singleton store with explicit, fallible disposal.
pub struct Container {
    singletons: SingletonMap,
    disposers: Vec<Disposer>,
}

impl Container {
    pub fn new() -> Self {
        Self {
            singletons: SingletonMap::new(),
            disposers: Vec::new(),
        }
    }

    /// Registers a singleton, replacing any previous registration of the
    /// same type.
    pub fn insert<T: Send + Sync + 'static>(&mut self, value: T) {
        self.singletons.insert(Arc::new(value));
    }

    /// Registers an already-shared singleton. This is the seam for trait
    /// objects such as `Arc<dyn ConfigurationProvider>`.
    pub fn insert_arc<T: ?Sized + Send + Sync + 'static>(&mut self, value: Arc<T>) {
        self.singletons.insert(value);
    }

    /// Resolves a registered singleton.
    pub fn resolve<T: ?Sized + Send + Sync + 'static>(&self) -> Result<Arc<T>> {
        self.singletons
            .get::<Arc<T>>()
            .cloned()
            .ok_or(ContainerError::Missing(std::any::type_name::<T>()))
    }

    /// Registers teardown work. Disposers run in reverse registration order
    /// during disposal.
    pub fn on_dispose(
        &mut self,
        disposer: impl FnOnce() -> std::result::Result<(), String> + Send + 'static,
    ) {
        self.disposers.push(Box::new(disposer));
    }

    /// Runs every disposer and drops all singletons.
    ///
    /// A failing disposer does not stop the rest; every failure is reported
    /// together so no cause is lost.
    pub fn dispose(mut self) -> std::result::Result<(), DisposeError> {
        let mut failures = Vec::new();
        while let Some(disposer) = self.disposers.pop() {
            if let Err(message) = disposer() {
                failures.push(message);
            }
        }
        if failures.is_empty() {
            Ok(())
        } else {
            Err(DisposeError { failures })
        }
    }
}

impl Default for Container {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;

    trait Greeter: Send + Sync {
        fn greet(&self) -> String;
    }

    struct English;

    impl Greeter for English {
        fn greet(&self) -> String {
            "hello".to_string()
        }
    }

    #[test]
    fn insert_then_resolve() {
        let mut container = Container::new();
        container.insert(42u32);
        assert_eq!(*container.resolve::<u32>().unwrap(), 42);
    }

    #[test]
    fn missing_type_is_an_error() {
        let container = Container::new();
        let err = container.resolve::<u32>().unwrap_err();
        assert!(matches!(err, ContainerError::Missing(_)));
    }

    #[test]
    fn trait_objects_resolve_through_insert_arc() {
        let mut container = Container::new();
        container.insert_arc::<dyn Greeter>(Arc::new(English));
        let greeter = container.resolve::<dyn Greeter>().unwrap();
        assert_eq!(greeter.greet(), "hello");
    }

    #[test]
    fn later_registration_replaces_earlier() {
        let mut container = Container::new();
        container.insert("first".to_string());
        container.insert("second".to_string());
        assert_eq!(*container.resolve::<String>().unwrap(), "second");
    }

    #[test]
    fn disposers_run_in_reverse_order() {
        let order = Arc::new(Mutex::new(Vec::new()));
        let mut container = Container::new();
        for label in ["a", "b", "c"] {
            let order = order.clone();
            container.on_dispose(move || {
                order.lock().unwrap().push(label);
                Ok(())
            });
        }
        container.dispose().unwrap();
        assert_eq!(*order.lock().unwrap(), vec!["c", "b", "a"]);
    }

    #[test]
    fn every_dispose_failure_is_collected() {
        let mut container = Container::new();
        container.on_dispose(|| Err("first failure".to_string()));
        container.on_dispose(|| Ok(()));
        container.on_dispose(|| Err("second failure".to_string()));

        let err = container.dispose().unwrap_err();
        assert_eq!(err.failures.len(), 2);
        let rendered = err.to_string();
        assert!(rendered.contains("first failure"));
        assert!(rendered.contains("second failure"));
    }
}
