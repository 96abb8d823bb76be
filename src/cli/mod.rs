//! # CLI Module
//!
//! The `brrtmvc` binary: inspect a routes file and try requests against it
//! without running any controllers.
//!
//! ## Commands
//!
//! ### `routes`
//!
//! Compile a routes file against a set of controller short names and print
//! the routing table in match order:
//!
//! ```bash
//! brrtmvc routes --config routes.yaml --controller blog --controller home
//! ```
//!
//! ### `match`
//!
//! Match one request, applying a `_method` form override the way the
//! dispatcher does, and print the route variables or the `404` reason. The
//! classification is the dispatcher's own up to the controller lookup;
//! action names are not checked since no controllers are loaded:
//!
//! ```bash
//! brrtmvc match --config routes.yaml --controller blog \
//!     --method POST --path /blog/delete/3 --form _method=DELETE
//! ```
//!
//! Logging follows the `BRRTMVC_LOG_*` variables (see [`crate::logging`]);
//! the level defaults to `warn` here.

mod commands;

#[cfg(test)]
mod tests;

pub use commands::{execute, run_cli, Cli, Commands};
