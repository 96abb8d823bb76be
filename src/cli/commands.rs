use std::fmt::{self, Write as _};
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand};
use http::Method;

use crate::config::RoutesConfig;
use crate::dispatcher::{effective_method, route_target};
use crate::error::NotFound;
use crate::logging::{init_logging, LogConfig};
use crate::request::Request;
use crate::router::Mapper;

/// Command-line interface for brrtmvc
#[derive(Debug, Parser)]
#[command(name = "brrtmvc")]
#[command(about = "Inspect and test brrtmvc routing tables", long_about = None)]
pub struct Cli {
    /// The subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Compile a routes file and print the routing table
    Routes {
        /// Routes file (YAML or JSON)
        #[arg(short, long)]
        config: PathBuf,

        /// Controller short names the table is compiled with (repeatable)
        #[arg(long = "controller", value_name = "NAME")]
        controllers: Vec<String>,
    },
    /// Match one request against a routes file.
    ///
    /// Reports the same `404` outcomes the dispatcher gives before running a
    /// controller. Action names are not checked, so an unknown action still
    /// prints its route variables.
    Match {
        /// Routes file (YAML or JSON)
        #[arg(short, long)]
        config: PathBuf,

        /// Controller short names the table is compiled with (repeatable)
        #[arg(long = "controller", value_name = "NAME")]
        controllers: Vec<String>,

        /// Request method
        #[arg(short, long, default_value = "GET")]
        method: String,

        /// Request path, optionally with a query string
        #[arg(short, long)]
        path: String,

        /// Form body parameter (`_method=DELETE`), repeatable
        #[arg(long = "form", value_name = "KEY=VALUE", value_parser = parse_key_value)]
        form: Vec<(String, String)>,
    },
}

fn parse_key_value(raw: &str) -> Result<(String, String), String> {
    raw.split_once('=')
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .ok_or_else(|| format!("expected KEY=VALUE, got '{raw}'"))
}

fn compile(config: &Path, controllers: &[String]) -> anyhow::Result<Mapper> {
    let routes = RoutesConfig::load(config)?;
    let mut mapper = Mapper::new();
    routes.apply(&mut mapper);
    let mut names: Vec<String> = controllers.iter().map(|c| c.to_lowercase()).collect();
    names.sort();
    names.dedup();
    mapper.create_regs(&names)?;
    Ok(mapper)
}

fn routes_table(mapper: &Mapper) -> Result<String, fmt::Error> {
    let mut out = String::new();
    writeln!(out, "controllers: {}", mapper.controllers().join(", "))?;
    for (idx, route) in mapper.routes().iter().enumerate() {
        let methods = route
            .allowed_methods()
            .map(|m| m.iter().map(Method::as_str).collect::<Vec<_>>().join(","))
            .unwrap_or_else(|| "ANY".to_string());
        write!(
            out,
            "{:>3}  {:<12} {:<24} {:<16}",
            idx,
            methods,
            route.path(),
            route.route_name().unwrap_or("-"),
        )?;
        let defaults: Vec<String> = route.defaults().map(|(k, v)| format!("{k}={v}")).collect();
        if !defaults.is_empty() {
            write!(out, " defaults: {}", defaults.join(" "))?;
        }
        let requirements: Vec<String> =
            route.requirements().map(|(k, v)| format!("{k}~{v}")).collect();
        if !requirements.is_empty() {
            write!(out, " requirements: {}", requirements.join(" "))?;
        }
        out.push('\n');
    }
    Ok(out)
}

/// Classify a request the way the dispatcher does before any controller
/// runs. Action names are not checked, since no controllers are loaded.
fn match_report(
    mapper: &Mapper,
    method: &str,
    path: &str,
    form: &[(String, String)],
) -> anyhow::Result<String> {
    let method = Method::from_bytes(method.trim().to_ascii_uppercase().as_bytes())
        .with_context(|| format!("invalid method '{method}'"))?;
    let mut request = Request::new(method, path);
    for (k, v) in form {
        request.body.push(k.as_str(), v.as_str());
    }
    let matched_with = effective_method(&mut request);
    let urlvars = mapper.match_path(&matched_with, &request.path);

    let known = |c: &str| mapper.controllers().iter().any(|k| k == c);
    let outcome = route_target(urlvars.as_ref()).and_then(|(controller, _)| {
        if known(controller) {
            Ok(())
        } else {
            Err(NotFound::MissingControllerOrAction)
        }
    });

    let mut out = String::new();
    writeln!(out, "{} {} (matched as {})", request.method, request.path, matched_with)?;
    match (outcome, urlvars) {
        (Ok(()), Some(vars)) => {
            for (k, v) in vars.iter() {
                writeln!(out, "  {k} = {v}")?;
            }
        }
        (Err(reason), _) => writeln!(out, "{reason}")?,
        (Ok(()), None) => writeln!(out, "{}", NotFound::NoUrlMatch)?,
    }
    Ok(out)
}

/// Run a parsed command and return what it prints
pub fn execute(cli: &Cli) -> anyhow::Result<String> {
    match &cli.command {
        Commands::Routes {
            config,
            controllers,
        } => {
            let mapper = compile(config, controllers)?;
            Ok(routes_table(&mapper)?)
        }
        Commands::Match {
            config,
            controllers,
            method,
            path,
            form,
        } => {
            let mapper = compile(config, controllers)?;
            match_report(&mapper, method, path, form)
        }
    }
}

/// Entry point of the `brrtmvc` binary
pub fn run_cli() -> anyhow::Result<()> {
    let cli = Cli::parse();
    // Keep routine logs off stdout unless asked for.
    let log_config = LogConfig::from_lookup(|key| {
        std::env::var(key)
            .ok()
            .or_else(|| (key == "BRRTMVC_LOG_LEVEL").then(|| "warn".to_string()))
    });
    let _guard = init_logging(&log_config)?;
    let output = execute(&cli)?;
    print!("{output}");
    Ok(())
}
