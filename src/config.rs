//! # Routes Configuration
//!
//! Declarative alternative to a routing function: routes, the collision
//! policy and the template directory in one YAML (or JSON) document.
//!
//! ```yaml
//! routes:
//!   - name: home
//!     path: /
//!     defaults: { controller: home, action: index }
//!   - path: /{controller}/{action}/{id}
//!     methods: [GET, POST, DELETE]
//!     requirements: { id: '\d+' }
//!   - path: /{controller}/{action}
//! collision_policy: reject
//! templates_dir: templates
//! ```
//!
//! A relative `templates_dir` is resolved against the directory of the
//! config file when loaded with [`RoutesConfig::load`].

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use http::Method;
use serde::Deserialize;
use tracing::{debug, info};

use crate::registry::CollisionPolicy;
use crate::router::{Mapper, Route};

/// One route declaration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RouteDef {
    /// Name for `url_for`
    #[serde(default)]
    pub name: Option<String>,
    /// Path template
    pub path: String,
    #[serde(default)]
    pub defaults: BTreeMap<String, String>,
    #[serde(default)]
    pub requirements: BTreeMap<String, String>,
    /// Allowed methods; any method when absent
    #[serde(default)]
    pub methods: Option<Vec<String>>,
}

impl RouteDef {
    fn parsed_methods(&self) -> anyhow::Result<Option<Vec<Method>>> {
        let Some(methods) = &self.methods else {
            return Ok(None);
        };
        let parsed = methods
            .iter()
            .map(|m| {
                Method::from_bytes(m.trim().to_ascii_uppercase().as_bytes())
                    .with_context(|| format!("route '{}': invalid method '{m}'", self.path))
            })
            .collect::<anyhow::Result<Vec<_>>>()?;
        Ok(Some(parsed))
    }

    fn to_route(&self, methods: Option<Vec<Method>>) -> Route {
        let mut route = Route::new(self.path.as_str());
        if let Some(name) = &self.name {
            route = route.name(name.as_str());
        }
        for (var, value) in &self.defaults {
            route = route.default(var.as_str(), value.as_str());
        }
        for (var, pattern) in &self.requirements {
            route = route.requirement(var.as_str(), pattern.as_str());
        }
        if let Some(methods) = methods {
            route = route.methods(methods);
        }
        route
    }
}

/// Parsed routes file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RoutesConfig {
    /// Routes in match order
    pub routes: Vec<RouteDef>,
    /// Short-name collision policy; the builder default applies when absent
    #[serde(default)]
    pub collision_policy: Option<CollisionPolicy>,
    /// Directory templates are loaded from
    #[serde(default)]
    pub templates_dir: Option<PathBuf>,
}

impl RoutesConfig {
    /// Load from a `.yaml`/`.yml` or `.json` file
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading routes config {}", path.display()))?;
        let is_json = path.extension().is_some_and(|ext| ext == "json");
        let mut config = if is_json {
            let config: Self = serde_json::from_str(&content)
                .with_context(|| format!("parsing routes config {}", path.display()))?;
            config.validate()?;
            config
        } else {
            Self::from_yaml_str(&content)
                .with_context(|| format!("parsing routes config {}", path.display()))?
        };

        if let (Some(dir), Some(base)) = (&config.templates_dir, path.parent()) {
            if dir.is_relative() {
                config.templates_dir = Some(base.join(dir));
            }
        }

        info!(
            config_path = %path.display(),
            routes_count = config.routes.len(),
            "Routes config loaded"
        );
        Ok(config)
    }

    /// Parse a YAML document
    pub fn from_yaml_str(yaml: &str) -> anyhow::Result<Self> {
        let config: Self = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> anyhow::Result<()> {
        if self.routes.is_empty() {
            bail!("routes config declares no routes");
        }
        for def in &self.routes {
            def.parsed_methods()?;
        }
        Ok(())
    }

    /// Connect every route on `mapper`, in file order
    pub fn apply(&self, mapper: &mut Mapper) {
        for def in &self.routes {
            // Validated when the config was parsed.
            let methods = def.parsed_methods().unwrap_or_default();
            debug!(path = %def.path, name = ?def.name, "Connecting configured route");
            mapper.connect(def.to_route(methods));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const YAML: &str = r#"
routes:
  - name: home
    path: /
    defaults: { controller: home, action: index }
  - path: /{controller}/{action}/{id}
    methods: [get, POST]
    requirements: { id: '\d+' }
  - path: /{controller}/{action}
collision_policy: replace
templates_dir: views
"#;

    #[test]
    fn test_parse_yaml() {
        let cfg = RoutesConfig::from_yaml_str(YAML).unwrap();
        assert_eq!(cfg.routes.len(), 3);
        assert_eq!(cfg.routes[0].name.as_deref(), Some("home"));
        assert_eq!(cfg.routes[0].defaults.get("controller").map(String::as_str), Some("home"));
        assert_eq!(cfg.collision_policy, Some(CollisionPolicy::Replace));
        assert_eq!(cfg.templates_dir, Some(PathBuf::from("views")));
    }

    #[test]
    fn test_apply_connects_routes_in_order() {
        let cfg = RoutesConfig::from_yaml_str(YAML).unwrap();
        let mut map = Mapper::new();
        cfg.apply(&mut map);
        map.create_regs(&["blog".to_string(), "home".to_string()]).unwrap();

        assert_eq!(map.routes().len(), 3);
        assert_eq!(map.match_path(&Method::GET, "/").unwrap().controller(), Some("home"));
        let vars = map.match_path(&Method::POST, "/blog/show/4").unwrap();
        assert_eq!(vars.get("id"), Some("4"));
        // DELETE is not admitted by the id route and "4" is not an action route
        let fallback = map.match_path(&Method::DELETE, "/blog/show/4");
        assert!(fallback.is_none());
    }

    #[test]
    fn test_invalid_method_rejected() {
        let yaml = "routes:\n  - path: /x\n    methods: [\"GE T\"]\n";
        assert!(RoutesConfig::from_yaml_str(yaml).is_err());
    }

    #[test]
    fn test_empty_routes_rejected() {
        assert!(RoutesConfig::from_yaml_str("routes: []\n").is_err());
    }

    #[test]
    fn test_unknown_field_rejected() {
        let yaml = "routes:\n  - path: /x\n    controller: blog\n";
        assert!(RoutesConfig::from_yaml_str(yaml).is_err());
    }

    #[test]
    fn test_load_resolves_templates_dir() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("routes.yaml");
        std::fs::write(&path, YAML).unwrap();
        let cfg = RoutesConfig::load(&path).unwrap();
        assert_eq!(cfg.templates_dir, Some(dir.path().join("views")));
    }

    #[test]
    fn test_load_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("routes.json");
        std::fs::write(
            &path,
            r#"{"routes":[{"path":"/{controller}/{action}"}],"collision_policy":"reject"}"#,
        )
        .unwrap();
        let cfg = RoutesConfig::load(&path).unwrap();
        assert_eq!(cfg.routes[0].path, "/{controller}/{action}");
        assert_eq!(cfg.collision_policy, Some(CollisionPolicy::Reject));
    }

    #[test]
    fn test_load_missing_file() {
        let err = RoutesConfig::load("/definitely/not/here.yaml").unwrap_err();
        assert!(err.to_string().contains("reading routes config"));
    }
}
