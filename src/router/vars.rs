use std::collections::HashMap;
use std::sync::Arc;

use smallvec::SmallVec;

use super::route::{ACTION_VAR, CONTROLLER_VAR};

/// Maximum number of route variables before heap allocation.
/// `controller`, `action` and one or two ids cover nearly every route.
pub const MAX_INLINE_VARS: usize = 8;

/// Variables extracted from a request path (`urlvars`).
///
/// Names come from the compiled route table, so they are `Arc<str>` and
/// cloning them is a reference-count bump. Created per request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RouteVariables(SmallVec<[(Arc<str>, String); MAX_INLINE_VARS]>);

impl RouteVariables {
    /// Empty set of variables
    #[must_use]
    pub fn new() -> Self {
        Self(SmallVec::new())
    }

    /// Set `name` to `value`, replacing any earlier value
    pub fn insert(&mut self, name: Arc<str>, value: String) {
        match self.0.iter_mut().find(|(k, _)| *k == name) {
            Some(slot) => slot.1 = value,
            None => self.0.push((name, value)),
        }
    }

    /// Value of a variable
    #[inline]
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0
            .iter()
            .rfind(|(k, _)| k.as_ref() == name)
            .map(|(_, v)| v.as_str())
    }

    /// The `controller` variable
    #[must_use]
    pub fn controller(&self) -> Option<&str> {
        self.get(CONTROLLER_VAR)
    }

    /// The `action` variable
    #[must_use]
    pub fn action(&self) -> Option<&str> {
        self.get(ACTION_VAR)
    }

    /// Iterate variables in the order they were set
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_ref(), v.as_str()))
    }

    /// Number of variables
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// `true` if the matcher produced nothing
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Copy into a `HashMap`. Allocates; prefer [`RouteVariables::get`].
    #[must_use]
    pub fn to_map(&self) -> HashMap<String, String> {
        self.0
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }
}

impl<'a> FromIterator<(&'a str, &'a str)> for RouteVariables {
    fn from_iter<I: IntoIterator<Item = (&'a str, &'a str)>>(iter: I) -> Self {
        let mut vars = RouteVariables::new();
        for (k, v) in iter {
            vars.insert(Arc::from(k), v.to_string());
        }
        vars
    }
}
