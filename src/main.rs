//! Anchorage CLI
//!
//! Usage:
//!   anchorage [OPTIONS] [SCENE]
//!
//! Options:
//!   -d, --debug       Mark anchor points and print connector summaries
//!   -l, --list-types  List the registered anchor and connector types
//!   -h, --help        Print help

use std::fs;
use std::io::{self, IsTerminal, Read};
use std::path::PathBuf;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use anchorage::{render_with_config, AnchorRegistry, ConnectorRegistry, RenderConfig};

#[derive(Parser)]
#[command(name = "anchorage")]
#[command(about = "Route connectors between boxes and render the result as SVG")]
struct Cli {
    /// Scene file in TOML (reads from stdin if not provided)
    input: Option<PathBuf>,

    /// Debug mode: mark anchor points and print connector summaries
    #[arg(short, long)]
    debug: bool,

    /// List the registered anchor and connector types
    #[arg(short, long)]
    list_types: bool,
}

fn main() {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    if cli.list_types {
        println!("anchors:    {}", AnchorRegistry::new().names().join(", "));
        println!("connectors: {}", ConnectorRegistry::new().names().join(", "));
        return;
    }

    if cli.input.is_none() && io::stdin().is_terminal() {
        eprintln!("Usage: anchorage [OPTIONS] [SCENE]  (or pipe a scene on stdin)");
        std::process::exit(1);
    }

    let source = match &cli.input {
        Some(path) => match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) => {
                eprintln!("Error reading file '{}': {}", path.display(), e);
                std::process::exit(1);
            }
        },
        None => {
            let mut buffer = String::new();
            match io::stdin().read_to_string(&mut buffer) {
                Ok(_) => buffer,
                Err(e) => {
                    eprintln!("Error reading from stdin: {}", e);
                    std::process::exit(1);
                }
            }
        }
    };

    let config = RenderConfig::new().with_debug(cli.debug);
    match render_with_config(&source, &config) {
        Ok(svg) => println!("{}", svg),
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }
}
