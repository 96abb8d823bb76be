use std::collections::HashMap;
use std::sync::Arc;

use crate::dispatcher::RequestContext;
use crate::response::HandlerResponse;

/// What an action returns. Any error is passed to the host untouched unless
/// it is a missing-template lookup.
pub type ActionResult = anyhow::Result<HandlerResponse>;

/// An action entry point on controller `C`.
pub type Action<C> = fn(&mut C, &mut RequestContext<'_>) -> ActionResult;

/// The explicit, finite set of actions a controller exposes.
///
/// ```rust
/// use brrtmvc::dispatcher::RequestContext;
/// use brrtmvc::registry::{ActionResult, ActionTable, Controller};
/// use brrtmvc::response::HandlerResponse;
///
/// struct BlogController;
///
/// impl BlogController {
///     fn index(&mut self, _ctx: &mut RequestContext<'_>) -> ActionResult {
///         Ok(HandlerResponse::html("<h1>Blog</h1>"))
///     }
/// }
///
/// impl Controller for BlogController {
///     const TYPE_NAME: &'static str = "BlogController";
///
///     fn create() -> Self {
///         BlogController
///     }
///
///     fn actions() -> ActionTable<Self> {
///         ActionTable::new().action("index", Self::index)
///     }
/// }
/// ```
pub struct ActionTable<C> {
    actions: HashMap<&'static str, Action<C>>,
}

impl<C> ActionTable<C> {
    /// Empty table
    #[must_use]
    pub fn new() -> Self {
        Self {
            actions: HashMap::new(),
        }
    }

    /// Add (or replace) the action `name`
    #[must_use]
    pub fn action(mut self, name: &'static str, action: Action<C>) -> Self {
        self.actions.insert(name, action);
        self
    }

    /// Look up an action by name
    #[must_use]
    pub fn get(&self, name: &str) -> Option<Action<C>> {
        self.actions.get(name).copied()
    }

    /// Action names, sorted
    #[must_use]
    pub fn names(&self) -> Vec<&'static str> {
        let mut names: Vec<&'static str> = self.actions.keys().copied().collect();
        names.sort_unstable();
        names
    }

    /// Number of actions
    #[must_use]
    pub fn len(&self) -> usize {
        self.actions.len()
    }

    /// `true` if the controller exposes nothing
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }
}

impl<C> Default for ActionTable<C> {
    fn default() -> Self {
        Self::new()
    }
}

/// A handler type: something the dispatcher can instantiate per request and
/// whose actions it can invoke by name.
pub trait Controller: Send + Sized + 'static {
    /// Declared type name, `<Name>Controller`. The registry derives the
    /// routable short name from it.
    const TYPE_NAME: &'static str;

    /// Fresh instance. Called once per dispatched request.
    fn create() -> Self;

    /// The actions this controller exposes
    fn actions() -> ActionTable<Self>;
}

/// Action bound to a fresh controller instance, ready to run once.
pub(crate) type BoundAction = Box<dyn FnOnce(&mut RequestContext<'_>) -> ActionResult + Send>;

/// Object-safe view of a controller type, so types with different `C` can
/// live in one registry.
pub(crate) trait ControllerType: Send + Sync {
    /// Instantiate the controller, then select `action` on it
    fn instantiate(&self, action: &str) -> Option<BoundAction>;

    fn action_names(&self) -> Vec<&'static str>;
}

struct TypedControllerType<C: Controller> {
    actions: ActionTable<C>,
}

impl<C: Controller> ControllerType for TypedControllerType<C> {
    fn instantiate(&self, action: &str) -> Option<BoundAction> {
        let mut controller = C::create();
        let entry = self.actions.get(action)?;
        Some(Box::new(move |ctx: &mut RequestContext<'_>| {
            entry(&mut controller, ctx)
        }))
    }

    fn action_names(&self) -> Vec<&'static str> {
        self.actions.names()
    }
}

/// One `(type name, type)` pair of a [`ControllerNamespace`].
#[derive(Clone)]
pub(crate) struct NamespaceEntry {
    pub(crate) type_name: String,
    pub(crate) type_ref: Arc<dyn ControllerType>,
}

/// The fixed, enumerable set of controller types the registry is built from.
#[derive(Clone, Default)]
pub struct ControllerNamespace {
    pub(crate) entries: Vec<NamespaceEntry>,
}

impl ControllerNamespace {
    /// Empty namespace
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `C` under its declared [`Controller::TYPE_NAME`]
    #[must_use]
    pub fn register<C: Controller>(self) -> Self {
        self.register_as::<C>(C::TYPE_NAME)
    }

    /// Add `C` under an explicit type name
    #[must_use]
    pub fn register_as<C: Controller>(mut self, type_name: &str) -> Self {
        self.entries.push(NamespaceEntry {
            type_name: type_name.to_string(),
            type_ref: Arc::new(TypedControllerType::<C> {
                actions: C::actions(),
            }),
        });
        self
    }

    /// Type names in registration order
    pub fn type_names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.type_name.as_str())
    }

    /// Number of types
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// `true` if no types were registered
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl std::fmt::Debug for ControllerNamespace {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.type_names()).finish()
    }
}
