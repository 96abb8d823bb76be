//! # Dispatcher Module
//!
//! The front controller. For every request it:
//!
//! 1. applies a `_method` form override, if present, to the method used for
//!    route matching (the request's own method is left alone);
//! 2. matches the path against the route mapper;
//! 3. rejects action names starting with `_`;
//! 4. resolves the controller short name in the handler registry and creates
//!    a fresh controller instance;
//! 5. runs the action with a [`RequestContext`];
//! 6. classifies the outcome.
//!
//! ## Outcomes
//!
//! | Situation | Result |
//! |---|---|
//! | no route matched | `404 No URL match` |
//! | action starts with `_` | `404 Invalid Action` |
//! | unknown controller or action | `404 Missing Controller or Action` |
//! | action asked for a missing template | `404 Missing Template` |
//! | any other action error | passed through as [`DispatchError::Action`](crate::error::DispatchError::Action) |
//!
//! ## Example
//!
//! ```rust
//! use brrtmvc::dispatcher::{Dispatcher, RequestContext};
//! use brrtmvc::registry::{ActionResult, ActionTable, Controller};
//! use brrtmvc::request::Request;
//! use brrtmvc::response::HandlerResponse;
//! use brrtmvc::router::Route;
//!
//! struct HomeController;
//!
//! impl HomeController {
//!     fn index(&mut self, _ctx: &mut RequestContext<'_>) -> ActionResult {
//!         Ok(HandlerResponse::html("home"))
//!     }
//! }
//!
//! impl Controller for HomeController {
//!     const TYPE_NAME: &'static str = "HomeController";
//!     fn create() -> Self {
//!         HomeController
//!     }
//!     fn actions() -> ActionTable<Self> {
//!         ActionTable::new().action("index", Self::index)
//!     }
//! }
//!
//! let dispatcher = Dispatcher::builder()
//!     .routes(|map| {
//!         map.connect(Route::new("/{controller}/{action}"));
//!     })
//!     .controller::<HomeController>()
//!     .build()
//!     .unwrap();
//!
//! let resp = dispatcher.respond(Request::get("/home/index")).unwrap();
//! assert_eq!(resp.body_str(), "home");
//!
//! let missing = dispatcher.respond(Request::get("/nowhere")).unwrap();
//! assert_eq!(missing.status, 404);
//! ```

mod context;
mod core;

pub use context::RequestContext;
pub use core::{effective_method, route_target, Dispatcher, DispatcherBuilder};
