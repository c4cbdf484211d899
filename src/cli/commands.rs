use std::collections::HashMap;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use http::Method;

use crate::context::RuntimeContext;
use crate::dispatcher::{DispatchOutcome, DispatchRequest};
use crate::logging::{init_logging_with_config, LogConfig};
use crate::media_type::{compatible, MediaType};
use crate::registry::load_manifests;
use crate::runtime_config::RuntimeConfig;
use crate::template::UriTemplate;

/// Command-line interface for brrtdispatch
///
/// Inspects dispatch decisions, URI template expansion and media-type
/// negotiation without running a server.
#[derive(Parser)]
#[command(name = "brrtdispatch")]
#[command(about = "brrtdispatch CLI", long_about = None)]
pub struct Cli {
    /// Emit debug logs (pretty format) to stdout
    #[arg(short, long, global = true, default_value_t = false)]
    pub verbose: bool,

    /// The subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Subcommand)]
pub enum Commands {
    /// Dispatch one request against a manifest file and print the outcome
    Route {
        /// Manifest declaration file (YAML or JSON)
        #[arg(short, long)]
        manifests: PathBuf,

        /// HTTP method
        #[arg(long, default_value = "GET")]
        method: String,

        /// Request path, including any base path
        #[arg(short, long)]
        path: String,

        /// Raw `Accept` header
        #[arg(long)]
        accept: Option<String>,

        /// Media type of the request body; implies a body
        #[arg(long)]
        content_type: Option<String>,
    },
    /// Print every declared route
    Routes {
        /// Manifest declaration file (YAML or JSON)
        #[arg(short, long)]
        manifests: PathBuf,
    },
    /// Build a URI from a template
    ///
    /// Without parameters the template is normalized and printed back.
    Expand {
        /// URI template, e.g. `http://example.com/pets/{id}`
        #[arg(short, long)]
        template: String,

        /// Placeholder value as `name=value` (repeatable)
        #[arg(long = "param", value_name = "NAME=VALUE")]
        params: Vec<String>,

        /// Leave `/` in path values unescaped
        #[arg(long, default_value_t = false)]
        keep_slash: bool,
    },
    /// Merge two media types
    Negotiate {
        /// First media type, e.g. `application/*+json`
        a: String,
        /// Second media type
        b: String,
    },
}

/// Parse arguments, run the command and print to stdout
///
/// # Errors
///
/// Any failure of the selected command.
pub fn run_cli() -> Result<()> {
    let cli = Cli::parse();
    if cli.verbose {
        init_logging_with_config(&LogConfig::default_dev())?;
    }
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    run(&cli.command, &mut out)
}

/// Run one command, writing its result to `out`
///
/// # Errors
///
/// Unreadable manifests, malformed methods, templates or media types, and
/// write failures.
pub fn run(command: &Commands, out: &mut impl Write) -> Result<()> {
    match command {
        Commands::Route {
            manifests,
            method,
            path,
            accept,
            content_type,
        } => route_command(manifests, method, path, accept.as_deref(), content_type.as_deref(), out),
        Commands::Routes { manifests } => {
            let registry = load_manifests(manifests)?.into_registry();
            for line in registry.routes_summary() {
                writeln!(out, "{line}")?;
            }
            Ok(())
        }
        Commands::Expand {
            template,
            params,
            keep_slash,
        } => {
            let uri = expand_command(template, params, *keep_slash)?;
            writeln!(out, "{uri}")?;
            Ok(())
        }
        Commands::Negotiate { a, b } => {
            let a = MediaType::parse(a)?;
            let b = MediaType::parse(b)?;
            match compatible(Some(&a), Some(&b)) {
                Some(merged) => writeln!(out, "{merged}")?,
                None => writeln!(out, "incompatible")?,
            }
            Ok(())
        }
    }
}

fn route_command(
    manifests: &Path,
    method: &str,
    path: &str,
    accept: Option<&str>,
    content_type: Option<&str>,
    out: &mut impl Write,
) -> Result<()> {
    let loaded = load_manifests(manifests)?;
    let config = loaded.config.clone().unwrap_or_else(RuntimeConfig::from_env);
    let method = Method::from_bytes(method.trim().to_ascii_uppercase().as_bytes())
        .map_err(|_| anyhow!("invalid HTTP method '{method}'"))?;

    let mut request = DispatchRequest::new(method, path);
    if let Some(accept) = accept {
        request = request.with_accept_header(accept);
    }
    if let Some(content_type) = content_type {
        let content_type = MediaType::parse(content_type).context("parsing --content-type")?;
        request = request.with_content_type(content_type);
    }

    let mut builder = RuntimeContext::builder();
    builder.config(config).resources(loaded.into_registry());
    let context = builder.build();

    match context.dispatch(&request) {
        DispatchOutcome::Matched(matches) => {
            for (rank, matched) in matches.iter().enumerate() {
                let params: Vec<String> = matched
                    .path_params
                    .iter()
                    .map(|(name, value)| format!("{name}={value}"))
                    .collect();
                let line = format!(
                    "{} {} -> {} [{}] {}",
                    rank + 1,
                    matched.manifest.path_template(),
                    matched.handler_name(),
                    matched.negotiated,
                    params.join(" ")
                );
                writeln!(out, "{}", line.trim_end())?;
            }
        }
        DispatchOutcome::Options(options) => {
            writeln!(out, "Allow: {}", options.allow_header())?;
            if let Some(headers) = options.significant_headers() {
                writeln!(out, "Access-Control-Allow-Headers: {headers}")?;
            }
        }
        DispatchOutcome::Aborted(response) => writeln!(out, "aborted ({})", response.status)?,
        outcome @ (DispatchOutcome::NotFound
        | DispatchOutcome::NotAcceptable
        | DispatchOutcome::MethodNotFound) => {
            let status = outcome.condition().map_or(500, |c| c.suggested_status());
            writeln!(out, "{} ({status})", outcome.kind())?;
        }
    }
    Ok(())
}

fn expand_command(template: &str, params: &[String], keep_slash: bool) -> Result<String> {
    let template = UriTemplate::parse(template)?;
    if params.is_empty() {
        return Ok(template.to_template());
    }

    let mut values: HashMap<&str, &str> = HashMap::new();
    for param in params {
        let (name, value) = param
            .split_once('=')
            .ok_or_else(|| anyhow!("parameter '{param}' is not NAME=VALUE"))?;
        values.insert(name.trim(), value);
    }
    Ok(template.build_from_map_with(&values, !keep_slash)?)
}
