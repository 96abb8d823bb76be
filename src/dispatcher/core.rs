use std::time::Instant;

use http::Method;
use tracing::{debug, error, info, info_span, warn};

use crate::config::RoutesConfig;
use crate::error::{ConfigurationError, DispatchError, NotFound};
use crate::ids::{RequestId, REQUEST_ID_HEADER};
use crate::registry::{
    CollisionPolicy, Controller, ControllerNamespace, HandlerRegistry, Unresolved,
};
use crate::request::Request;
use crate::response::HandlerResponse;
use crate::router::{Mapper, RedirectBuilder, RouteVariables, RoutingContext};
use crate::templates::{is_template_not_found, Templates};

use super::context::RequestContext;

type RoutingFn = Box<dyn FnOnce(&mut Mapper)>;

/// Front controller: matches each request, resolves the controller and
/// action, runs it, and classifies the outcome.
///
/// Immutable once built. `dispatch` takes `&self` and keeps all per-request
/// state on its own stack, so one dispatcher can serve any number of
/// concurrent requests.
#[derive(Debug)]
pub struct Dispatcher {
    registry: HandlerRegistry,
    mapper: Mapper,
    templates: Templates,
    redirect: RedirectBuilder,
}

impl Dispatcher {
    /// Start building a dispatcher
    #[must_use]
    pub fn builder() -> DispatcherBuilder {
        DispatcherBuilder::default()
    }

    /// The compiled route mapper
    #[must_use]
    pub fn mapper(&self) -> &Mapper {
        &self.mapper
    }

    /// The handler registry
    #[must_use]
    pub fn registry(&self) -> &HandlerRegistry {
        &self.registry
    }

    /// Dispatch one request.
    ///
    /// Returns the action's response, one of the four [`NotFound`] outcomes,
    /// or the action's own error untouched.
    pub fn dispatch(&self, mut request: Request) -> Result<HandlerResponse, DispatchError> {
        let request_id = RequestId::from_header_or_new(request.get_header(REQUEST_ID_HEADER));
        let span = info_span!(
            "dispatch",
            request_id = %request_id,
            method = %request.method,
            path = %request.path
        );
        let _guard = span.enter();
        let start = Instant::now();

        let method = effective_method(&mut request);
        let routing = RoutingContext::new(&self.mapper, method, self.redirect);

        let urlvars = routing.match_path(&request.path);
        let (controller, action) = match route_target(urlvars.as_ref()) {
            Ok(target) => target,
            Err(reason) => {
                match reason {
                    NotFound::NoUrlMatch => {
                        warn!(reason = "no_url_match", "No route matched request path");
                    }
                    NotFound::InvalidAction => warn!(
                        reason = "invalid_action",
                        action = urlvars.as_ref().and_then(|v| v.action()),
                        "Private action requested"
                    ),
                    _ => warn!(
                        reason = "missing_controller_or_action",
                        detail = "route variables lack controller or action",
                        "Route matched without a target"
                    ),
                }
                return Err(reason.into());
            }
        };

        let resolved = match self.registry.resolve(controller, action) {
            Ok(resolved) => resolved,
            Err(unresolved) => {
                let detail = match unresolved {
                    Unresolved::UnknownController => "unknown controller",
                    Unresolved::UnknownAction => "unknown action",
                };
                warn!(
                    reason = "missing_controller_or_action",
                    detail,
                    controller = %controller,
                    action = %action,
                    "Controller or action not found"
                );
                return Err(NotFound::MissingControllerOrAction.into());
            }
        };

        debug!(
            controller = %controller,
            action = %action,
            type_name = %resolved.type_name(),
            "Invoking action"
        );

        let mut ctx = RequestContext::new(
            request,
            urlvars.clone().unwrap_or_default(),
            routing,
            &self.templates,
            request_id,
        );
        let outcome = (resolved.into_bound())(&mut ctx);

        match outcome {
            Ok(response) => {
                info!(
                    controller = %controller,
                    action = %action,
                    status = response.status,
                    latency_ms = start.elapsed().as_millis() as u64,
                    "Action completed"
                );
                Ok(response)
            }
            Err(err) if is_template_not_found(&err) => {
                warn!(
                    reason = "missing_template",
                    controller = %controller,
                    action = %action,
                    detail = %err,
                    "Template not found"
                );
                Err(NotFound::MissingTemplate.into())
            }
            Err(err) => {
                error!(
                    controller = %controller,
                    action = %action,
                    error = %err,
                    latency_ms = start.elapsed().as_millis() as u64,
                    "Action failed"
                );
                Err(DispatchError::Action(err))
            }
        }
    }

    /// Dispatch and turn [`NotFound`] outcomes into `404` responses; any
    /// other failure is returned as the error.
    pub fn respond(&self, request: Request) -> anyhow::Result<HandlerResponse> {
        match self.dispatch(request) {
            Ok(response) => Ok(response),
            Err(DispatchError::NotFound(reason)) => Ok(reason.into_response()),
            Err(DispatchError::Action(err)) => Err(err),
        }
    }
}

/// Controller and action named by a route match, or the `404` outcome when
/// there is nothing to dispatch to.
///
/// Covers the checks made before the registry is consulted: no match (or an
/// empty one), a missing `controller` or `action` variable, and an action
/// name starting with `_`.
pub fn route_target(urlvars: Option<&RouteVariables>) -> Result<(&str, &str), NotFound> {
    let urlvars = match urlvars {
        Some(vars) if !vars.is_empty() => vars,
        _ => return Err(NotFound::NoUrlMatch),
    };
    let (Some(controller), Some(action)) = (urlvars.controller(), urlvars.action()) else {
        return Err(NotFound::MissingControllerOrAction);
    };
    if action.starts_with('_') {
        return Err(NotFound::InvalidAction);
    }
    Ok((controller, action))
}

/// Remove the `_method` body parameter from `request` and return the method
/// to match routes with.
///
/// The value is trimmed and uppercased. A value that is not a method token
/// is dropped with a warning and the transport method is used.
/// `request.method` itself is never changed.
pub fn effective_method(request: &mut Request) -> Method {
    let Some(raw) = request.take_method_override() else {
        return request.method.clone();
    };
    let wanted = raw.trim().to_ascii_uppercase();
    match Method::from_bytes(wanted.as_bytes()) {
        Ok(method) if !wanted.is_empty() => {
            debug!(
                original = %request.method,
                override_method = %method,
                "Method override applied"
            );
            method
        }
        _ => {
            warn!(value = %raw, "Ignoring invalid method override");
            request.method.clone()
        }
    }
}

/// Collects routes, controllers and collaborators for a [`Dispatcher`].
#[derive(Default)]
pub struct DispatcherBuilder {
    routes: Vec<RoutingFn>,
    namespace: ControllerNamespace,
    templates: Option<Templates>,
    policy: Option<CollisionPolicy>,
    redirect: Option<RedirectBuilder>,
}

impl DispatcherBuilder {
    /// Routing function that connects routes on the mapper. Required unless
    /// [`routes_config`](Self::routes_config) is given.
    #[must_use]
    pub fn routes<F>(mut self, routes: F) -> Self
    where
        F: FnOnce(&mut Mapper) + 'static,
    {
        self.routes.push(Box::new(routes));
        self
    }

    /// Routes, collision policy and template directory from a YAML config.
    /// Explicit builder settings take precedence.
    #[must_use]
    pub fn routes_config(mut self, config: RoutesConfig) -> Self {
        if self.policy.is_none() {
            self.policy = config.collision_policy;
        }
        if self.templates.is_none() {
            self.templates = config.templates_dir.as_ref().map(Templates::from_dir);
        }
        self.routes.push(Box::new(move |map: &mut Mapper| config.apply(map)));
        self
    }

    /// Register controller `C` under its declared type name
    #[must_use]
    pub fn controller<C: Controller>(mut self) -> Self {
        self.namespace = self.namespace.register::<C>();
        self
    }

    /// Replace the controller namespace
    #[must_use]
    pub fn namespace(mut self, namespace: ControllerNamespace) -> Self {
        self.namespace = namespace;
        self
    }

    /// Template collaborator handed to actions
    #[must_use]
    pub fn templates(mut self, templates: Templates) -> Self {
        self.templates = Some(templates);
        self
    }

    /// What to do with duplicate short names (default: reject)
    #[must_use]
    pub fn collision_policy(mut self, policy: CollisionPolicy) -> Self {
        self.policy = Some(policy);
        self
    }

    /// Override how redirect responses are built
    #[must_use]
    pub fn redirect_builder(mut self, redirect: RedirectBuilder) -> Self {
        self.redirect = Some(redirect);
        self
    }

    /// Connect the routes, build the registry and compile the mapper.
    pub fn build(self) -> Result<Dispatcher, ConfigurationError> {
        if self.routes.is_empty() {
            error!("Dispatcher built without a routing function");
            return Err(ConfigurationError::MissingRoutes);
        }

        let mut mapper = Mapper::new();
        for connect in self.routes {
            connect(&mut mapper);
        }

        let registry = HandlerRegistry::build(
            &self.namespace,
            self.policy.unwrap_or_default(),
            &mut mapper,
        )?;

        Ok(Dispatcher {
            registry,
            mapper,
            templates: self.templates.unwrap_or_default(),
            redirect: self.redirect.unwrap_or(HandlerResponse::redirect),
        })
    }
}

impl std::fmt::Debug for DispatcherBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DispatcherBuilder")
            .field("routes", &self.routes.len())
            .field("namespace", &self.namespace)
            .field("policy", &self.policy)
            .finish_non_exhaustive()
    }
}
