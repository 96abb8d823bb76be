//! # Handler Registry
//!
//! Maps short controller names (`blog`) to controller types
//! (`BlogController`).
//!
//! Controllers are not discovered by scanning anything. The application lists
//! them in a [`ControllerNamespace`], each one implementing [`Controller`]
//! with an explicit [`ActionTable`]. [`HandlerRegistry::build`] derives the
//! short names, applies the [`CollisionPolicy`], and compiles the route
//! mapper once with the final set of names.
//!
//! At dispatch time [`HandlerRegistry::resolve`] creates a fresh controller
//! instance for every request; nothing is shared between invocations.

mod controller;
mod core;

pub use controller::{Action, ActionResult, ActionTable, Controller, ControllerNamespace};
pub use core::{
    short_name, CollisionPolicy, HandlerDescriptor, HandlerRegistry, ResolvedAction, Unresolved,
};
