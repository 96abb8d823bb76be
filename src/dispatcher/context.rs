use http::Method;
use serde::Serialize;

use crate::ids::RequestId;
use crate::request::Request;
use crate::response::HandlerResponse;
use crate::router::{RouteVariables, RoutingContext};
use crate::templates::Templates;

/// Everything an action gets to see about the request it serves.
///
/// Built by the dispatcher after a successful match and dropped when the
/// action returns.
#[derive(Debug)]
pub struct RequestContext<'a> {
    request: Request,
    urlvars: RouteVariables,
    routing: RoutingContext<'a>,
    templates: &'a Templates,
    request_id: RequestId,
}

impl<'a> RequestContext<'a> {
    pub(crate) fn new(
        request: Request,
        urlvars: RouteVariables,
        routing: RoutingContext<'a>,
        templates: &'a Templates,
        request_id: RequestId,
    ) -> Self {
        Self {
            request,
            urlvars,
            routing,
            templates,
            request_id,
        }
    }

    /// The request, minus any method override parameter
    #[must_use]
    pub fn request(&self) -> &Request {
        &self.request
    }

    /// Transport method of the request. Not affected by a method override;
    /// see [`RoutingContext::method`] for the method the route was matched with.
    #[must_use]
    pub fn method(&self) -> &Method {
        &self.request.method
    }

    /// A request parameter, looked up in the body first, then the query string
    #[must_use]
    pub fn param(&self, name: &str) -> Option<&str> {
        self.request
            .body
            .get(name)
            .or_else(|| self.request.query.get(name))
    }

    /// A route variable (`id` in `/{controller}/{action}/{id}`)
    #[must_use]
    pub fn urlvar(&self, name: &str) -> Option<&str> {
        self.urlvars.get(name)
    }

    /// All route variables of the match
    #[must_use]
    pub fn urlvars(&self) -> &RouteVariables {
        &self.urlvars
    }

    /// Routing state for this request
    #[must_use]
    pub fn routing(&self) -> &RoutingContext<'a> {
        &self.routing
    }

    /// Correlation id of this dispatch
    #[must_use]
    pub fn request_id(&self) -> RequestId {
        self.request_id
    }

    /// Render `template` into an HTML response.
    ///
    /// A missing template surfaces as `404 Missing Template` when the error is
    /// returned from the action.
    pub fn render<S: Serialize>(&self, template: &str, ctx: S) -> anyhow::Result<HandlerResponse> {
        let body = self.templates.render(template, ctx)?;
        Ok(HandlerResponse::html(body))
    }

    /// `302` redirect to `url`
    #[must_use]
    pub fn redirect_to(&self, url: &str) -> HandlerResponse {
        self.routing.redirect_to(url)
    }

    /// URL of the named route
    #[must_use]
    pub fn url_for(&self, name: &str, vars: &[(&str, &str)]) -> Option<String> {
        self.routing.url_for(name, vars)
    }
}
