//! Route declarations and their compiled form.

use std::sync::Arc;

use http::Method;
use regex::Regex;

use crate::error::ConfigurationError;

use super::vars::RouteVariables;

/// Route variable holding the controller short name.
pub const CONTROLLER_VAR: &str = "controller";
/// Route variable holding the action name.
pub const ACTION_VAR: &str = "action";
/// Action used when a route names a controller but no action.
pub const DEFAULT_ACTION: &str = "index";

/// A route declaration, as handed to [`Mapper::connect`](super::Mapper::connect).
///
/// ```rust
/// use brrtmvc::router::Route;
/// use http::Method;
///
/// let route = Route::new("/{controller}/{action}/{id}")
///     .requirement("id", r"\d+")
///     .methods([Method::GET, Method::DELETE]);
/// assert_eq!(route.path(), "/{controller}/{action}/{id}");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Route {
    pub(crate) name: Option<String>,
    pub(crate) path: String,
    pub(crate) defaults: Vec<(String, String)>,
    pub(crate) requirements: Vec<(String, String)>,
    pub(crate) methods: Option<Vec<Method>>,
}

impl Route {
    /// Route for a path template
    #[must_use]
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            name: None,
            path: path.into(),
            defaults: Vec::new(),
            requirements: Vec::new(),
            methods: None,
        }
    }

    /// Name the route so URLs can be generated from it
    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Default value for a variable the path may not supply
    #[must_use]
    pub fn default(mut self, var: impl Into<String>, value: impl Into<String>) -> Self {
        self.defaults.push((var.into(), value.into()));
        self
    }

    /// Regex (unanchored; the route anchors it) a path variable must match
    #[must_use]
    pub fn requirement(mut self, var: impl Into<String>, pattern: impl Into<String>) -> Self {
        self.requirements.push((var.into(), pattern.into()));
        self
    }

    /// Restrict the route to the given methods
    #[must_use]
    pub fn methods(mut self, methods: impl IntoIterator<Item = Method>) -> Self {
        self.methods = Some(methods.into_iter().collect());
        self
    }

    /// Path template
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Route name, if any
    #[must_use]
    pub fn route_name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Declared defaults
    pub fn defaults(&self) -> impl Iterator<Item = (&str, &str)> {
        self.defaults.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Declared requirements
    pub fn requirements(&self) -> impl Iterator<Item = (&str, &str)> {
        self.requirements.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Allowed methods; `None` admits any
    #[must_use]
    pub fn allowed_methods(&self) -> Option<&[Method]> {
        self.methods.as_deref()
    }
}

/// One piece of a path segment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Part {
    Literal(String),
    Var(Arc<str>),
    /// `{*name}`: the rest of the path, slashes included
    Wildcard(Arc<str>),
}

/// Split a template like `/{controller}/{action}.{format}` into segments of
/// parts.
pub(crate) fn parse_template(path: &str) -> Result<Vec<Vec<Part>>, String> {
    if !path.starts_with('/') {
        return Err("path template must start with '/'".to_string());
    }
    let raw_segments: Vec<&str> = path.split('/').skip(1).filter(|s| !s.is_empty()).collect();
    let mut segments = Vec::with_capacity(raw_segments.len());
    let mut seen: Vec<Arc<str>> = Vec::new();

    for (idx, raw) in raw_segments.iter().enumerate() {
        let mut parts = Vec::new();
        let mut rest = *raw;
        while !rest.is_empty() {
            match rest.find('{') {
                Some(0) => {
                    let close = rest
                        .find('}')
                        .ok_or_else(|| format!("unclosed '{{' in segment '{raw}'"))?;
                    let inner = &rest[1..close];
                    let (wildcard, name) = match inner.strip_prefix('*') {
                        Some(name) => (true, name),
                        None => (false, inner),
                    };
                    if !is_identifier(name) {
                        return Err(format!("invalid variable name '{name}'"));
                    }
                    if seen.iter().any(|s| s.as_ref() == name) {
                        return Err(format!("variable '{name}' appears twice"));
                    }
                    let name: Arc<str> = Arc::from(name);
                    seen.push(Arc::clone(&name));
                    if wildcard {
                        if idx + 1 != raw_segments.len() || close + 1 != rest.len() || !parts.is_empty() {
                            return Err(format!(
                                "wildcard '{{*{name}}}' must be the whole last segment"
                            ));
                        }
                        parts.push(Part::Wildcard(name));
                    } else {
                        if matches!(parts.last(), Some(Part::Var(_))) {
                            return Err(format!("adjacent variables in segment '{raw}'"));
                        }
                        parts.push(Part::Var(name));
                    }
                    rest = &rest[close + 1..];
                }
                Some(open) => {
                    parts.push(Part::Literal(rest[..open].to_string()));
                    rest = &rest[open..];
                }
                None => {
                    if rest.contains('}') {
                        return Err(format!("unmatched '}}' in segment '{raw}'"));
                    }
                    parts.push(Part::Literal(rest.to_string()));
                    rest = "";
                }
            }
        }
        segments.push(parts);
    }
    Ok(segments)
}

fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// A route compiled against the known controller short names.
#[derive(Debug, Clone)]
pub(crate) struct CompiledRoute {
    pub(crate) route: Route,
    pub(crate) segments: Vec<Vec<Part>>,
    pub(crate) regex: Regex,
    /// Path variables in template order, each with an anchored validator
    pub(crate) vars: Vec<(Arc<str>, Regex)>,
    /// Declared defaults plus the implicit `action=index`
    pub(crate) defaults: Vec<(Arc<str>, String)>,
}

impl CompiledRoute {
    pub(crate) fn compile(route: &Route, controllers: &[String]) -> Result<Self, ConfigurationError> {
        let invalid = |reason: String| ConfigurationError::InvalidRoute {
            path: route.path.clone(),
            reason,
        };
        let segments = parse_template(&route.path).map_err(invalid)?;

        // Longest first so `blogpost` is tried before `blog`.
        let mut names: Vec<&str> = controllers.iter().map(String::as_str).collect();
        names.sort_by(|a, b| b.len().cmp(&a.len()).then(a.cmp(b)));
        let controller_alt = if names.is_empty() {
            // No controllers: a `{controller}` route can never match.
            r"\b\B".to_string()
        } else {
            names
                .iter()
                .map(|n| regex::escape(n))
                .collect::<Vec<_>>()
                .join("|")
        };

        let mut pattern = String::with_capacity(route.path.len() * 2 + 4);
        pattern.push('^');
        let mut vars = Vec::new();
        for segment in &segments {
            pattern.push('/');
            for part in segment {
                match part {
                    Part::Literal(text) => pattern.push_str(&regex::escape(text)),
                    Part::Var(name) => {
                        let body = match route.requirement_for(name) {
                            Some(req) => req.to_string(),
                            None if name.as_ref() == CONTROLLER_VAR => controller_alt.clone(),
                            None => "[^/]+?".to_string(),
                        };
                        pattern.push_str(&format!("(?P<{name}>{body})"));
                        let validator = Regex::new(&format!("^(?:{body})$"))
                            .map_err(|e| invalid(e.to_string()))?;
                        vars.push((Arc::clone(name), validator));
                    }
                    Part::Wildcard(name) => {
                        let body = route.requirement_for(name).unwrap_or(".+");
                        pattern.push_str(&format!("(?P<{name}>{body})"));
                        let validator = Regex::new(&format!("^(?:{body})$"))
                            .map_err(|e| invalid(e.to_string()))?;
                        vars.push((Arc::clone(name), validator));
                    }
                }
            }
        }
        if segments.is_empty() {
            pattern.push('/');
        }
        pattern.push('$');
        let regex = Regex::new(&pattern).map_err(|e| invalid(e.to_string()))?;

        let mut defaults: Vec<(Arc<str>, String)> = route
            .defaults
            .iter()
            .map(|(k, v)| (Arc::from(k.as_str()), v.clone()))
            .collect();
        let has = |key: &str, vars: &[(Arc<str>, Regex)], defaults: &[(Arc<str>, String)]| {
            vars.iter().any(|(k, _)| k.as_ref() == key) || defaults.iter().any(|(k, _)| k.as_ref() == key)
        };
        if has(CONTROLLER_VAR, &vars, &defaults) && !has(ACTION_VAR, &vars, &defaults) {
            defaults.push((Arc::from(ACTION_VAR), DEFAULT_ACTION.to_string()));
        }

        Ok(Self {
            route: route.clone(),
            segments,
            regex,
            vars,
            defaults,
        })
    }

    pub(crate) fn allows(&self, method: &Method) -> bool {
        self.route
            .methods
            .as_ref()
            .map_or(true, |methods| methods.contains(method))
    }

    /// Route variables for `path`, or `None` if the route does not match.
    pub(crate) fn captures(&self, path: &str) -> Option<RouteVariables> {
        let caps = self.regex.captures(path)?;
        let mut vars = RouteVariables::new();
        for (name, _) in &self.vars {
            if let Some(m) = caps.name(name) {
                vars.insert(Arc::clone(name), m.as_str().to_string());
            }
        }
        for (name, value) in &self.defaults {
            if vars.get(name).is_none() {
                vars.insert(Arc::clone(name), value.clone());
            }
        }
        Some(vars)
    }

    /// Path segments built from `vars` and the route defaults, or `None` if
    /// this route cannot produce a URL for them.
    pub(crate) fn generate(&self, vars: &[(&str, &str)]) -> Option<Vec<String>> {
        let lookup = |name: &str| -> Option<&str> {
            vars.iter().rev().find(|(k, _)| *k == name).map(|(_, v)| *v)
        };

        // A supplied value for a defaulted, non-path key must agree with the default.
        for (name, value) in &self.defaults {
            if self.vars.iter().any(|(k, _)| k == name) {
                continue;
            }
            if let Some(given) = lookup(name.as_ref()) {
                if given != value {
                    return None;
                }
            }
        }

        let mut segments = Vec::with_capacity(self.segments.len());
        for segment in &self.segments {
            let mut text = String::new();
            for part in segment {
                match part {
                    Part::Literal(lit) => text.push_str(lit),
                    Part::Var(name) | Part::Wildcard(name) => {
                        let value = lookup(name.as_ref()).or_else(|| {
                            self.defaults
                                .iter()
                                .find(|(k, _)| k == name)
                                .map(|(_, v)| v.as_str())
                        })?;
                        let (_, validator) = self.vars.iter().find(|(k, _)| k == name)?;
                        if !validator.is_match(value) {
                            return None;
                        }
                        text.push_str(value);
                    }
                }
            }
            segments.push(text);
        }
        Some(segments)
    }

    /// Names this route consumes when generating (path variables and defaults)
    pub(crate) fn consumes(&self, name: &str) -> bool {
        self.vars.iter().any(|(k, _)| k.as_ref() == name)
            || self.defaults.iter().any(|(k, _)| k.as_ref() == name)
    }

    pub(crate) fn ends_with_wildcard(&self) -> bool {
        matches!(
            self.segments.last().and_then(|s| s.last()),
            Some(Part::Wildcard(_))
        )
    }
}

impl Route {
    fn requirement_for(&self, var: &str) -> Option<&str> {
        self.requirements
            .iter()
            .rev()
            .find(|(k, _)| k == var)
            .map(|(_, v)| v.as_str())
    }
}
