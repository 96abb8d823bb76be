//! # brrtmvc
//!
//! **brrtmvc** is the request dispatcher of a small MVC web framework: it
//! sits between an HTTP host and a set of application controllers, and for
//! every request decides which controller action runs.
//!
//! ## Overview
//!
//! At startup the application lists its controller types and its routes.
//! The dispatcher derives a short name for each controller
//! (`BlogController` becomes `blog`), compiles the routes against those
//! names, and is then immutable. Per request it:
//!
//! - honours a `_method` form parameter as the method used for matching,
//!   so HTML forms can reach `PUT`/`DELETE` routes;
//! - matches the path to route variables (`controller`, `action`, ...);
//! - creates a fresh controller instance and runs the action;
//! - turns routing-style failures into `404` responses, and passes every
//!   other action failure through untouched.
//!
//! ## Architecture
//!
//! - **[`router`]** - route templates, the compiled [`Mapper`](router::Mapper), URL generation
//! - **[`registry`]** - the [`Controller`](registry::Controller) trait and the short-name registry
//! - **[`dispatcher`]** - the per-request pipeline and the [`RequestContext`](dispatcher::RequestContext) actions receive
//! - **[`templates`]** - the `minijinja` template collaborator
//! - **[`config`]** - routes from YAML/JSON
//! - **[`request`]** / **[`response`]** - the host-facing request and response types
//! - **[`error`]** - configuration errors and the four `404` outcomes
//! - **[`logging`]** - `tracing` subscriber setup from `BRRTMVC_LOG_*`
//! - **[`cli`]** - the `brrtmvc` inspection binary
//!
//! ## Quick Start
//!
//! ```rust
//! use brrtmvc::dispatcher::{Dispatcher, RequestContext};
//! use brrtmvc::registry::{ActionResult, ActionTable, Controller};
//! use brrtmvc::request::Request;
//! use brrtmvc::response::HandlerResponse;
//! use brrtmvc::router::Route;
//! use http::Method;
//!
//! struct BlogController;
//!
//! impl BlogController {
//!     fn show(&mut self, ctx: &mut RequestContext<'_>) -> ActionResult {
//!         let id = ctx.urlvar("id").unwrap_or("?");
//!         Ok(HandlerResponse::html(format!("post {id}")))
//!     }
//!
//!     fn delete(&mut self, ctx: &mut RequestContext<'_>) -> ActionResult {
//!         Ok(ctx.redirect_to("/blog/list"))
//!     }
//! }
//!
//! impl Controller for BlogController {
//!     const TYPE_NAME: &'static str = "BlogController";
//!     fn create() -> Self {
//!         BlogController
//!     }
//!     fn actions() -> ActionTable<Self> {
//!         ActionTable::new()
//!             .action("show", Self::show)
//!             .action("delete", Self::delete)
//!     }
//! }
//!
//! let dispatcher = Dispatcher::builder()
//!     .routes(|map| {
//!         map.connect(
//!             Route::new("/blog/{id}")
//!                 .default("controller", "blog")
//!                 .default("action", "delete")
//!                 .methods([Method::DELETE]),
//!         );
//!         map.connect(Route::new("/{controller}/{action}/{id}"));
//!     })
//!     .controller::<BlogController>()
//!     .build()
//!     .unwrap();
//!
//! let shown = dispatcher.respond(Request::get("/blog/show/3")).unwrap();
//! assert_eq!(shown.body_str(), "post 3");
//!
//! // An HTML form tunnelling DELETE through POST
//! let deleted = dispatcher
//!     .respond(Request::post_form("/blog/3", "_method=DELETE"))
//!     .unwrap();
//! assert_eq!(deleted.status, 302);
//! ```
//!
//! ## Concurrency
//!
//! A built [`Dispatcher`](dispatcher::Dispatcher) holds no per-request
//! state. Share it behind an `Arc` and call `dispatch` from as many threads
//! as the host likes.

pub mod cli;
pub mod config;
pub mod dispatcher;
pub mod error;
pub mod ids;
pub mod logging;
pub mod registry;
pub mod request;
pub mod response;
pub mod router;
pub mod templates;

pub use dispatcher::{Dispatcher, DispatcherBuilder, RequestContext};
pub use error::{ConfigurationError, DispatchError, NotFound};
pub use registry::{ActionResult, ActionTable, CollisionPolicy, Controller, ControllerNamespace};
pub use request::Request;
pub use response::HandlerResponse;
