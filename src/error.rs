//! # Error Types
//!
//! Three families of failure leave this crate:
//!
//! - [`ConfigurationError`]: raised while the dispatcher is being assembled.
//!   These are fatal; a [`Dispatcher`](crate::dispatcher::Dispatcher) never
//!   exists in a half-built state.
//! - [`NotFound`]: the four routing-style outcomes that the dispatcher turns
//!   into `404` responses.
//! - [`DispatchError`]: what a single dispatch returns on failure, either one
//!   of the classified [`NotFound`] outcomes or the action's own error, passed
//!   through untouched.

use std::fmt;

use http::StatusCode;

use crate::response::HandlerResponse;

/// Errors raised while building the handler registry, the route mapper or the
/// dispatcher itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigurationError {
    /// The dispatcher was built without a routing function.
    MissingRoutes,
    /// A controller type name does not end in `Controller`, or the part
    /// before the suffix is empty or not a plain identifier.
    NonConformingHandlerName {
        /// The offending type name
        type_name: String,
    },
    /// Two controller types derive the same short name and the collision
    /// policy is `Reject`.
    DuplicateHandler {
        /// The shared short name
        short_name: String,
        /// Type name registered first
        existing: String,
        /// Type name that collided with it
        incoming: String,
    },
    /// A route template or requirement could not be compiled.
    InvalidRoute {
        /// The route's path template
        path: String,
        /// Why compilation failed
        reason: String,
    },
    /// `create_regs` was called on a mapper that is already compiled.
    MapperAlreadyCompiled,
}

impl fmt::Display for ConfigurationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigurationError::MissingRoutes => write!(
                f,
                "Route mapping required, please pass in a routing function to the dispatcher builder."
            ),
            ConfigurationError::NonConformingHandlerName { type_name } => write!(
                f,
                "Controller type '{type_name}' does not follow the '<Name>Controller' naming convention"
            ),
            ConfigurationError::DuplicateHandler {
                short_name,
                existing,
                incoming,
            } => write!(
                f,
                "Controllers '{existing}' and '{incoming}' both map to short name '{short_name}'"
            ),
            ConfigurationError::InvalidRoute { path, reason } => {
                write!(f, "Invalid route '{path}': {reason}")
            }
            ConfigurationError::MapperAlreadyCompiled => {
                write!(f, "Route mapper has already been compiled")
            }
        }
    }
}

impl std::error::Error for ConfigurationError {}

/// Routing-style failures, all surfaced to the client as `404 Not Found`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NotFound {
    /// The mapper produced no route variables for the path.
    NoUrlMatch,
    /// The action name starts with an underscore.
    InvalidAction,
    /// The controller short name or the action name is unknown.
    MissingControllerOrAction,
    /// The action asked the template collaborator for a template that does
    /// not exist.
    MissingTemplate,
}

impl NotFound {
    /// Client-facing message for this outcome
    #[must_use]
    pub fn message(self) -> &'static str {
        match self {
            NotFound::NoUrlMatch => "No URL match",
            NotFound::InvalidAction => "Invalid Action",
            NotFound::MissingControllerOrAction => "Missing Controller or Action",
            NotFound::MissingTemplate => "Missing Template",
        }
    }

    /// HTTP status for every variant
    #[must_use]
    pub fn status(self) -> StatusCode {
        StatusCode::NOT_FOUND
    }

    /// Build the `404` response sent to the client
    #[must_use]
    pub fn into_response(self) -> HandlerResponse {
        HandlerResponse::error(self.status(), self.message())
    }
}

impl fmt::Display for NotFound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.status().as_u16(), self.message())
    }
}

impl std::error::Error for NotFound {}

/// Failure of a single dispatch.
#[derive(Debug)]
pub enum DispatchError {
    /// One of the classified routing outcomes.
    NotFound(NotFound),
    /// Any other failure raised by the invoked action. Never inspected or
    /// rewritten; the host decides how to report it.
    Action(anyhow::Error),
}

impl DispatchError {
    /// The classified outcome, if this is one
    #[must_use]
    pub fn not_found(&self) -> Option<NotFound> {
        match self {
            DispatchError::NotFound(reason) => Some(*reason),
            DispatchError::Action(_) => None,
        }
    }
}

impl fmt::Display for DispatchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DispatchError::NotFound(reason) => write!(f, "{reason}"),
            DispatchError::Action(err) => write!(f, "action failed: {err}"),
        }
    }
}

impl std::error::Error for DispatchError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            DispatchError::NotFound(reason) => Some(reason),
            DispatchError::Action(err) => Some(err.as_ref()),
        }
    }
}

impl From<NotFound> for DispatchError {
    fn from(reason: NotFound) -> Self {
        DispatchError::NotFound(reason)
    }
}
