//! nav-router
//!
//! Inspect and exercise a route table from the command line.
//!
//! # Architecture Overview
//!
//! ```text
//!   routes.toml ──▶ config ──▶ RouterBuilder::from_config
//!                                   │
//!        ┌──────────────┬───────────┼──────────────┬───────────────┐
//!        ▼              ▼           ▼              ▼               ▼
//!     routes          match        href           go             open
//!   (registry)     (matcher)   (render+prefix)  (transition)  (url listener
//!                                                  │            dispatch)
//!                                                  ▼
//!                                            MemoryHistory
//! ```

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use serde_json::{json, Value};

use nav_router::config::{load_config, AppConfig};
use nav_router::listener::{Dispatched, Dispatcher};
use nav_router::observability::logging;
use nav_router::routing::Params;
use nav_router::transition::{MemoryHistory, RouterBuilder};

#[derive(Parser)]
#[command(name = "nav-router")]
#[command(about = "Route table inspector for the navigation engine", long_about = None)]
struct Cli {
    /// Route table (TOML). An empty table is used when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List registered routes with their full url templates
    Routes,
    /// Match a url against the table
    Match { url: String },
    /// Render the url of a named route
    Href {
        name: String,
        /// Params as key=value
        params: Vec<String>,
    },
    /// Run a transition to a named route and print the committed state
    Go {
        name: String,
        /// Params as key=value
        params: Vec<String>,
    },
    /// Dispatch a url the way the platform listener would
    Open { url: String },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => load_config(path)?,
        None => AppConfig::default(),
    };
    logging::init_tracing(&config.observability);

    let history = MemoryHistory::new();
    let router = RouterBuilder::from_config(&config)?
        .location_writer(history.clone())
        .build();

    match cli.command {
        Commands::Routes => {
            let routes: Vec<Value> = router
                .registry()
                .routes()
                .map(|route| {
                    json!({
                        "name": route.name(),
                        "url": route.full_template().to_string(),
                        "parent": route.parent().map(|p| p.name().to_string()),
                        "abstract": route.is_abstract(),
                        "title": route.title(),
                    })
                })
                .collect();
            print_json(&Value::Array(routes))?;
        }
        Commands::Match { url } => match router.match_url(&url) {
            Some(matched) => print_json(&json!({
                "name": matched.route.name(),
                "params": matched.params,
            }))?,
            None => {
                eprintln!("no route matches '{url}'");
                std::process::exit(1);
            }
        },
        Commands::Href { name, params } => {
            println!("{}", router.href(&name, &parse_params(&params)?)?);
        }
        Commands::Go { name, params } => {
            let state = router.go(&name, parse_params(&params)?)?.await?;
            print_json(&json!({
                "state": state,
                "history": history.entries(),
            }))?;
        }
        Commands::Open { url } => {
            let dispatcher = Dispatcher::new(router);
            match dispatcher.dispatch(&url).await {
                Dispatched::Committed(state) | Dispatched::Unchanged(state) => {
                    print_json(&json!({ "state": state }))?
                }
                Dispatched::Redirected(state) => print_json(&json!({
                    "redirected": true,
                    "state": state,
                    "history": history.entries(),
                }))?,
                Dispatched::Failed(error) => return Err(error.into()),
                Dispatched::Unmatched => {
                    eprintln!("no route matches '{url}' and no fallback applies");
                    std::process::exit(1);
                }
            }
        }
    }

    Ok(())
}

fn parse_params(pairs: &[String]) -> Result<Params, String> {
    pairs
        .iter()
        .map(|pair| {
            pair.split_once('=')
                .map(|(key, value)| (key.to_string(), value.to_string()))
                .ok_or_else(|| format!("expected key=value, got '{pair}'"))
        })
        .collect()
}

fn print_json(value: &Value) -> Result<(), serde_json::Error> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
