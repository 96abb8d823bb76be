//! Route mapper - compiles route templates against the known controller short
//! names and matches request paths to [`RouteVariables`].

use http::Method;
use tracing::{debug, error, info, warn};

use crate::error::ConfigurationError;

use super::route::{CompiledRoute, Route};
use super::vars::RouteVariables;

/// Ordered set of routes.
///
/// Routes are connected first (by the routing function handed to the
/// dispatcher builder), then compiled exactly once with
/// [`Mapper::create_regs`]. After that the mapper is read-only and can be
/// shared across concurrent dispatches.
#[derive(Debug, Clone, Default)]
pub struct Mapper {
    routes: Vec<Route>,
    compiled: Option<Vec<CompiledRoute>>,
    controllers: Vec<String>,
}

impl Mapper {
    /// Empty, uncompiled mapper
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a route. Declaration order is match order.
    ///
    /// Routes connected after [`Mapper::create_regs`] are ignored.
    pub fn connect(&mut self, route: Route) -> &mut Self {
        if self.compiled.is_some() {
            warn!(
                path = %route.path(),
                "Route connected after mapper compilation - ignored"
            );
            return self;
        }
        self.routes.push(route);
        self
    }

    /// Declared routes in match order
    #[must_use]
    pub fn routes(&self) -> &[Route] {
        &self.routes
    }

    /// Controller short names the mapper was compiled with
    #[must_use]
    pub fn controllers(&self) -> &[String] {
        &self.controllers
    }

    /// Whether [`Mapper::create_regs`] has run
    #[must_use]
    pub fn is_compiled(&self) -> bool {
        self.compiled.is_some()
    }

    /// Compile every route into an anchored regex.
    ///
    /// `{controller}` variables only match one of `controllers`. Must be
    /// called once, before the first match.
    pub fn create_regs(&mut self, controllers: &[String]) -> Result<(), ConfigurationError> {
        if self.compiled.is_some() {
            return Err(ConfigurationError::MapperAlreadyCompiled);
        }
        let compiled = self
            .routes
            .iter()
            .map(|route| CompiledRoute::compile(route, controllers))
            .collect::<Result<Vec<_>, _>>()?;

        let routes_summary: Vec<String> = compiled
            .iter()
            .take(10)
            .map(|c| c.regex.as_str().to_string())
            .collect();
        info!(
            routes_count = compiled.len(),
            controllers = ?controllers,
            routes_summary = ?routes_summary,
            "Routing table compiled"
        );

        self.controllers = controllers.to_vec();
        self.compiled = Some(compiled);
        Ok(())
    }

    /// Match `path` for a request whose effective method is `method`.
    ///
    /// Returns the variables of the first route, in declaration order, whose
    /// template and method condition both admit the request.
    #[must_use]
    pub fn match_path(&self, method: &Method, path: &str) -> Option<RouteVariables> {
        let Some(compiled) = &self.compiled else {
            error!(path = %path, "Route match attempted before mapper compilation");
            return None;
        };
        let path = normalize(path);

        for route in compiled {
            if !route.allows(method) {
                continue;
            }
            if let Some(vars) = route.captures(path) {
                debug!(
                    method = %method,
                    path = %path,
                    route_pattern = %route.route.path(),
                    urlvars = ?vars,
                    "Route matched"
                );
                return Some(vars);
            }
        }

        debug!(method = %method, path = %path, "No route matched");
        None
    }

    /// Generate a URL from variables using the first route able to produce
    /// one. Variables the route does not consume become the query string.
    #[must_use]
    pub fn generate(&self, vars: &[(&str, &str)]) -> Option<String> {
        self.compiled
            .as_ref()?
            .iter()
            .find_map(|route| build_url(route, vars))
    }

    /// Generate a URL from the route named `name`
    #[must_use]
    pub fn url_for(&self, name: &str, vars: &[(&str, &str)]) -> Option<String> {
        let route = self
            .compiled
            .as_ref()?
            .iter()
            .find(|c| c.route.route_name() == Some(name))?;
        build_url(route, vars)
    }
}

/// Trailing slashes are not significant, except for the root path.
fn normalize(path: &str) -> &str {
    let trimmed = path.trim_end_matches('/');
    if trimmed.is_empty() {
        "/"
    } else {
        trimmed
    }
}

fn build_url(route: &CompiledRoute, vars: &[(&str, &str)]) -> Option<String> {
    let segments = route.generate(vars)?;
    let extras: Vec<(&str, &str)> = vars
        .iter()
        .copied()
        .filter(|(k, _)| !route.consumes(k))
        .collect();

    let mut url = url::Url::parse("http://localhost/").ok()?;
    {
        let mut path = url.path_segments_mut().ok()?;
        path.clear();
        let last = segments.len().saturating_sub(1);
        for (idx, segment) in segments.iter().enumerate() {
            if idx == last && route.ends_with_wildcard() {
                path.extend(segment.split('/'));
            } else {
                path.push(segment);
            }
        }
    }
    if !extras.is_empty() {
        url.query_pairs_mut().extend_pairs(extras);
    }

    let mut out = url.path().to_string();
    if let Some(query) = url.query() {
        out.push('?');
        out.push_str(query);
    }
    Some(out)
}
