use std::collections::HashMap;
use std::sync::Arc;

use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::error::ConfigurationError;
use crate::router::Mapper;

use super::controller::{BoundAction, ControllerNamespace, ControllerType};

const CONTROLLER_SUFFIX: &str = "Controller";

/// What to do when two controller types derive the same short name.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CollisionPolicy {
    /// Fail registry construction with `DuplicateHandler`
    #[default]
    Reject,
    /// Keep the later registration and log a warning
    Replace,
}

/// Derive the routable short name from a controller type name.
///
/// Only the last `::` segment counts. It must end in `Controller`, and the
/// part before the suffix must be a non-empty identifier; that part,
/// lowercased, is the short name.
///
/// ```rust
/// use brrtmvc::registry::short_name;
///
/// assert_eq!(short_name("BlogController").unwrap(), "blog");
/// assert_eq!(short_name("app::controllers::UserAdminController").unwrap(), "useradmin");
/// assert!(short_name("Helper").is_err());
/// ```
pub fn short_name(type_name: &str) -> Result<String, ConfigurationError> {
    let non_conforming = || ConfigurationError::NonConformingHandlerName {
        type_name: type_name.to_string(),
    };
    let last = type_name.rsplit("::").next().unwrap_or(type_name);
    let stem = last.strip_suffix(CONTROLLER_SUFFIX).ok_or_else(non_conforming)?;
    let mut chars = stem.chars();
    let valid = chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_');
    if !valid {
        return Err(non_conforming());
    }
    Ok(stem.to_ascii_lowercase())
}

/// A registered controller type under its short name.
#[derive(Clone)]
pub struct HandlerDescriptor {
    short_name: String,
    type_name: String,
    type_ref: Arc<dyn ControllerType>,
}

impl HandlerDescriptor {
    /// Lowercased routable name (`blog`)
    #[must_use]
    pub fn short_name(&self) -> &str {
        &self.short_name
    }

    /// Declared type name (`BlogController`)
    #[must_use]
    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    /// Actions the controller exposes, sorted
    #[must_use]
    pub fn action_names(&self) -> Vec<&'static str> {
        self.type_ref.action_names()
    }
}

impl std::fmt::Debug for HandlerDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HandlerDescriptor")
            .field("short_name", &self.short_name)
            .field("type_name", &self.type_name)
            .field("actions", &self.action_names())
            .finish()
    }
}

/// Why a `(controller, action)` pair could not be resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Unresolved {
    /// No controller registered under the short name
    UnknownController,
    /// The controller exists but exposes no such action
    UnknownAction,
}

/// Action bound to a freshly created controller instance.
pub struct ResolvedAction {
    type_name: String,
    bound: BoundAction,
}

impl ResolvedAction {
    /// Type name of the instantiated controller
    #[must_use]
    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    pub(crate) fn into_bound(self) -> BoundAction {
        self.bound
    }
}

impl std::fmt::Debug for ResolvedAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResolvedAction")
            .field("type_name", &self.type_name)
            .finish_non_exhaustive()
    }
}

/// Mapping from short name to controller type, built once at startup and
/// read-only afterwards.
#[derive(Debug, Clone, Default)]
pub struct HandlerRegistry {
    handlers: HashMap<String, HandlerDescriptor>,
}

impl HandlerRegistry {
    /// Build the registry from `namespace`, then compile `mapper` with the
    /// resulting short names. The mapper is compiled exactly once, after
    /// every type has been registered.
    pub fn build(
        namespace: &ControllerNamespace,
        policy: CollisionPolicy,
        mapper: &mut Mapper,
    ) -> Result<Self, ConfigurationError> {
        let mut handlers: HashMap<String, HandlerDescriptor> = HashMap::new();

        for entry in &namespace.entries {
            let short = short_name(&entry.type_name)?;
            if let Some(existing) = handlers.get(&short) {
                match policy {
                    CollisionPolicy::Reject => {
                        return Err(ConfigurationError::DuplicateHandler {
                            short_name: short,
                            existing: existing.type_name.clone(),
                            incoming: entry.type_name.clone(),
                        });
                    }
                    CollisionPolicy::Replace => {
                        warn!(
                            short_name = %short,
                            existing = %existing.type_name,
                            incoming = %entry.type_name,
                            "Controller short name collision, replacing earlier registration"
                        );
                    }
                }
            }
            debug!(short_name = %short, type_name = %entry.type_name, "Controller registered");
            handlers.insert(
                short.clone(),
                HandlerDescriptor {
                    short_name: short,
                    type_name: entry.type_name.clone(),
                    type_ref: Arc::clone(&entry.type_ref),
                },
            );
        }

        let registry = Self { handlers };
        let names = registry.short_names();
        mapper.create_regs(&names)?;

        info!(
            controllers_count = names.len(),
            controllers = ?names,
            routes_count = mapper.routes().len(),
            "Handler registry built"
        );
        Ok(registry)
    }

    /// Descriptor for `short_name`
    #[must_use]
    pub fn get(&self, short_name: &str) -> Option<&HandlerDescriptor> {
        self.handlers.get(short_name)
    }

    /// Registered short names, sorted
    #[must_use]
    pub fn short_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.handlers.keys().cloned().collect();
        names.sort();
        names
    }

    /// Descriptors sorted by short name
    pub fn descriptors(&self) -> impl Iterator<Item = &HandlerDescriptor> {
        let mut all: Vec<&HandlerDescriptor> = self.handlers.values().collect();
        all.sort_by(|a, b| a.short_name.cmp(&b.short_name));
        all.into_iter()
    }

    /// Instantiate the controller registered as `controller` and bind its
    /// `action`. A new instance is created on every call.
    pub fn resolve(&self, controller: &str, action: &str) -> Result<ResolvedAction, Unresolved> {
        let descriptor = self
            .handlers
            .get(controller)
            .ok_or(Unresolved::UnknownController)?;
        let bound = descriptor
            .type_ref
            .instantiate(action)
            .ok_or(Unresolved::UnknownAction)?;
        Ok(ResolvedAction {
            type_name: descriptor.type_name.clone(),
            bound,
        })
    }

    /// Number of registered controllers
    #[must_use]
    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    /// `true` if nothing is registered
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}
