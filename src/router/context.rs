use http::Method;

use crate::response::HandlerResponse;

use super::core::Mapper;
use super::vars::RouteVariables;

/// Builds the response for a redirect to `url`.
pub type RedirectBuilder = fn(&str) -> HandlerResponse;

/// Request-scoped routing state.
///
/// Created fresh for every dispatch and passed by argument: the mapper it
/// borrows is shared and read-only, while the effective method and redirect
/// builder belong to this one request. Actions reach it through
/// [`RequestContext::routing`](crate::dispatcher::RequestContext::routing) to
/// generate links and redirects.
#[derive(Debug, Clone)]
pub struct RoutingContext<'a> {
    mapper: &'a Mapper,
    method: Method,
    redirect: RedirectBuilder,
}

impl<'a> RoutingContext<'a> {
    /// Context for one request matched with `method`
    #[must_use]
    pub fn new(mapper: &'a Mapper, method: Method, redirect: RedirectBuilder) -> Self {
        Self {
            mapper,
            method,
            redirect,
        }
    }

    /// The shared mapper
    #[must_use]
    pub fn mapper(&self) -> &'a Mapper {
        self.mapper
    }

    /// Method used for route matching (after any override)
    #[must_use]
    pub fn method(&self) -> &Method {
        &self.method
    }

    /// Match `path` with this context's method
    #[must_use]
    pub fn match_path(&self, path: &str) -> Option<RouteVariables> {
        self.mapper.match_path(&self.method, path)
    }

    /// See [`Mapper::generate`]
    #[must_use]
    pub fn generate(&self, vars: &[(&str, &str)]) -> Option<String> {
        self.mapper.generate(vars)
    }

    /// See [`Mapper::url_for`]
    #[must_use]
    pub fn url_for(&self, name: &str, vars: &[(&str, &str)]) -> Option<String> {
        self.mapper.url_for(name, vars)
    }

    /// Redirect response built by this context's redirect builder
    #[must_use]
    pub fn redirect_to(&self, url: &str) -> HandlerResponse {
        (self.redirect)(url)
    }
}
