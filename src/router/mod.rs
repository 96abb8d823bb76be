//! # Router Module
//!
//! The URL-pattern matcher the dispatcher consults for every request.
//!
//! ## Overview
//!
//! Routes are declared as path templates with `{var}` placeholders:
//!
//! ```text
//! /                                 defaults: controller=home
//! /{controller}/{action}/{id}       requirements: id=\d+
//! /files/{*path}                    wildcard: rest of the path
//! ```
//!
//! The router works in two phases:
//!
//! 1. **Compilation**: once, at startup, [`Mapper::create_regs`] turns every
//!    template into an anchored regex. The `{controller}` placeholder
//!    compiles to an alternation of the controller short names known to the
//!    handler registry, so a path naming an unknown controller never matches.
//!
//! 2. **Matching**: for each request, the routes are tried in declaration
//!    order; the first one whose regex and method condition admit the
//!    request yields its [`RouteVariables`] (`urlvars`).
//!
//! ## Example
//!
//! ```rust
//! use brrtmvc::router::{Mapper, Route};
//! use http::Method;
//!
//! let mut map = Mapper::new();
//! map.connect(Route::new("/").default("controller", "home"));
//! map.connect(Route::new("/{controller}/{action}/{id}"));
//! map.create_regs(&["blog".to_string(), "home".to_string()]).unwrap();
//!
//! let vars = map.match_path(&Method::GET, "/blog/show/7").unwrap();
//! assert_eq!(vars.controller(), Some("blog"));
//! assert_eq!(vars.get("id"), Some("7"));
//! ```
//!
//! ## Request Scope
//!
//! Nothing in this module is global. The per-request state (effective
//! method, redirect builder) lives in a [`RoutingContext`] created by the
//! dispatcher for one request and passed down by argument.

mod context;
mod core;
mod route;
mod vars;

pub use context::{RedirectBuilder, RoutingContext};
pub use core::Mapper;
pub use route::{Route, ACTION_VAR, CONTROLLER_VAR, DEFAULT_ACTION};
pub use vars::{RouteVariables, MAX_INLINE_VARS};
