//! Template collaborator used by controller actions.
//!
//! A thin wrapper over a `minijinja` environment. The dispatcher only cares
//! about one thing here: when the template an action asks for does not
//! exist, [`Templates::render`] fails with [`RenderError::NotFound`], which
//! the dispatcher turns into a `404 Missing Template`. A missing template
//! pulled in by `{% include %}` or `{% extends %}` is a broken template and
//! surfaces as [`RenderError::Render`].

use std::fmt;
use std::path::Path;

use minijinja::{Environment, Error, ErrorKind};
use serde::Serialize;
use tracing::debug;

/// Named templates available to actions.
#[derive(Debug, Clone, Default)]
pub struct Templates {
    env: Environment<'static>,
}

impl Templates {
    /// Empty template set. Every render fails with `TemplateNotFound`.
    #[must_use]
    pub fn new() -> Self {
        Self {
            env: Environment::new(),
        }
    }

    /// Templates loaded lazily from files under `dir`, named by their path
    /// relative to it (`blog/show.html`).
    #[must_use]
    pub fn from_dir(dir: impl AsRef<Path>) -> Self {
        let mut env = Environment::new();
        env.set_loader(minijinja::path_loader(dir));
        Self { env }
    }

    /// Register a template from source
    pub fn add(&mut self, name: impl Into<String>, source: impl Into<String>) -> Result<(), Error> {
        self.env.add_template_owned(name.into(), source.into())
    }

    /// Render the template `name` with `ctx`
    pub fn render<S: Serialize>(&self, name: &str, ctx: S) -> Result<String, RenderError> {
        let template = self.env.get_template(name).map_err(|source| {
            if source.kind() == ErrorKind::TemplateNotFound {
                RenderError::NotFound {
                    name: name.to_string(),
                    source,
                }
            } else {
                RenderError::Render(source)
            }
        })?;
        let rendered = template.render(ctx).map_err(RenderError::Render)?;
        debug!(template = %name, bytes = rendered.len(), "Template rendered");
        Ok(rendered)
    }
}

/// Failure of [`Templates::render`]
#[derive(Debug)]
pub enum RenderError {
    /// The requested template itself does not exist.
    NotFound {
        /// Name the action asked for
        name: String,
        /// The underlying lookup error
        source: Error,
    },
    /// The template exists but failed to load or render.
    Render(Error),
}

impl RenderError {
    /// The underlying `minijinja` error
    #[must_use]
    pub fn inner(&self) -> &Error {
        match self {
            RenderError::NotFound { source, .. } => source,
            RenderError::Render(source) => source,
        }
    }
}

impl fmt::Display for RenderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RenderError::NotFound { name, .. } => write!(f, "Template '{name}' not found"),
            RenderError::Render(err) => write!(f, "Template error: {err}"),
        }
    }
}

impl std::error::Error for RenderError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(self.inner())
    }
}

/// Whether `err`'s cause chain holds a failed lookup of an action's own
/// template. Missing includes do not count.
#[must_use]
pub fn is_template_not_found(err: &anyhow::Error) -> bool {
    err.chain().any(|cause| {
        matches!(
            cause.downcast_ref::<RenderError>(),
            Some(RenderError::NotFound { .. })
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Context;
    use minijinja::context;

    #[test]
    fn test_render_registered_template() {
        let mut templates = Templates::new();
        templates.add("hello.html", "<h1>Hello {{ name }}!</h1>").unwrap();
        let out = templates.render("hello.html", context! { name => "World" }).unwrap();
        assert_eq!(out, "<h1>Hello World!</h1>");
    }

    #[test]
    fn test_missing_template_kind() {
        let templates = Templates::new();
        let err = templates.render("nope.html", ()).unwrap_err();
        assert!(matches!(err, RenderError::NotFound { ref name, .. } if name == "nope.html"));
        assert_eq!(err.inner().kind(), ErrorKind::TemplateNotFound);
        assert!(is_template_not_found(&anyhow::Error::new(err)));
    }

    #[test]
    fn test_detection_sees_through_context() {
        let templates = Templates::new();
        let err = templates
            .render("nope.html", ())
            .context("rendering blog index")
            .unwrap_err();
        assert!(is_template_not_found(&err));
    }

    #[test]
    fn test_other_template_errors_are_not_missing_template() {
        let mut templates = Templates::new();
        templates.add("broken.html", "{{ value + 1 }}").unwrap();
        let err = templates
            .render("broken.html", context! { value => "a" })
            .unwrap_err();
        assert!(!is_template_not_found(&anyhow::Error::new(err)));
        assert!(!is_template_not_found(&anyhow::anyhow!("database down")));
    }

    #[test]
    fn test_missing_include_is_a_render_error() {
        let mut templates = Templates::new();
        templates.add("outer.html", "{% include 'inner.html' %}").unwrap();
        let err = templates.render("outer.html", ()).unwrap_err();
        assert!(matches!(err, RenderError::Render(_)));
        assert_eq!(err.inner().kind(), ErrorKind::TemplateNotFound);
        assert!(!is_template_not_found(&anyhow::Error::new(err)));
    }

    #[test]
    fn test_from_dir_loads_files() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("blog")).unwrap();
        std::fs::write(dir.path().join("blog/show.html"), "post {{ id }}").unwrap();
        let templates = Templates::from_dir(dir.path());
        assert_eq!(templates.render("blog/show.html", context! { id => 3 }).unwrap(), "post 3");
        let missing = templates.render("blog/gone.html", ()).unwrap_err();
        assert!(matches!(missing, RenderError::NotFound { .. }));
    }
}
