//! Unit tests for CLI commands

use std::path::PathBuf;

use crate::cli::{execute, Cli, Commands};
use clap::Parser;

const ROUTES: &str = r#"
routes:
  - name: home
    path: /
    defaults: { controller: home, action: index }
  - name: blog_delete
    path: /blog/{id}
    defaults: { controller: blog, action: delete }
    requirements: { id: '\d+' }
    methods: [DELETE]
  - path: /{controller}/{action}/{id}
  - path: /{controller}/{action}
"#;

fn routes_file() -> (tempfile::TempDir, PathBuf) {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("routes.yaml");
    std::fs::write(&path, ROUTES).unwrap();
    (dir, path)
}

fn run(args: &[&str]) -> String {
    let cli = Cli::try_parse_from(args).unwrap();
    execute(&cli).unwrap()
}

#[test]
fn test_match_command_parses() {
    let cli = Cli::try_parse_from([
        "brrtmvc",
        "match",
        "--config",
        "routes.yaml",
        "--controller",
        "blog",
        "--controller",
        "home",
        "--method",
        "post",
        "--path",
        "/blog/9",
        "--form",
        "_method=DELETE",
    ])
    .unwrap();

    match cli.command {
        Commands::Match {
            config,
            controllers,
            method,
            path,
            form,
        } => {
            assert_eq!(config.to_string_lossy(), "routes.yaml");
            assert_eq!(controllers, vec!["blog", "home"]);
            assert_eq!(method, "post");
            assert_eq!(path, "/blog/9");
            assert_eq!(form, vec![("_method".to_string(), "DELETE".to_string())]);
        }
        _ => panic!("Expected Match command"),
    }
}

#[test]
fn test_form_requires_key_value() {
    let parsed = Cli::try_parse_from([
        "brrtmvc", "match", "--config", "r.yaml", "--path", "/", "--form", "oops",
    ]);
    assert!(parsed.is_err());
}

#[test]
fn test_routes_lists_table() {
    let (_dir, path) = routes_file();
    let out = run(&[
        "brrtmvc",
        "routes",
        "--config",
        path.to_str().unwrap(),
        "--controller",
        "home",
        "--controller",
        "Blog",
    ]);
    assert!(out.starts_with("controllers: blog, home\n"));
    assert!(out.contains("/blog/{id}"));
    assert!(out.contains("blog_delete"));
    assert!(out.contains("DELETE"));
    assert!(out.contains("requirements: id~\\d+"));
    assert_eq!(out.lines().count(), 5);
}

#[test]
fn test_match_applies_method_override() {
    let (_dir, path) = routes_file();
    let out = run(&[
        "brrtmvc",
        "match",
        "--config",
        path.to_str().unwrap(),
        "--controller",
        "blog",
        "--method",
        "POST",
        "--path",
        "/blog/9",
        "--form",
        "_method=delete",
    ]);
    assert!(out.starts_with("POST /blog/9 (matched as DELETE)"));
    assert!(out.contains("action = delete"));
    assert!(out.contains("id = 9"));
}

#[test]
fn test_match_reports_not_found_reasons() {
    let (_dir, path) = routes_file();
    let config = path.to_str().unwrap();

    let out = run(&["brrtmvc", "match", "--config", config, "--controller", "blog", "--path", "/nope/x/y/z"]);
    assert!(out.contains("404 No URL match"));

    let out = run(&["brrtmvc", "match", "--config", config, "--controller", "blog", "--path", "/blog/_secret"]);
    assert!(out.contains("404 Invalid Action"));

    // `home` is only a literal default, not a compiled controller.
    let out = run(&["brrtmvc", "match", "--config", config, "--controller", "blog", "--path", "/"]);
    assert!(out.contains("404 Missing Controller or Action"));
}

#[test]
fn test_match_does_not_check_action_names() {
    let (_dir, path) = routes_file();
    let config = path.to_str().unwrap();
    let out = run(&["brrtmvc", "match", "--config", config, "--controller", "blog", "--path", "/blog/archive"]);
    assert!(out.contains("controller = blog"));
    assert!(out.contains("action = archive"));
    assert!(!out.contains("404"));
}

#[test]
fn test_routes_table_lists_routes_in_order() {
    let (_dir, path) = routes_file();
    let config = path.to_str().unwrap();
    let out = run(&["brrtmvc", "routes", "--config", config, "--controller", "blog"]);
    let lines: Vec<&str> = out.lines().collect();
    assert_eq!(lines[0], "controllers: blog");
    assert!(lines[1].trim_start().starts_with("0 "));
    assert!(lines[1].contains("home"));
    assert!(lines[4].contains("/{controller}/{action}"));
}

#[test]
fn test_missing_config_is_an_error() {
    let cli = Cli::try_parse_from(["brrtmvc", "routes", "--config", "/no/such/routes.yaml"]).unwrap();
    assert!(execute(&cli).is_err());
}
