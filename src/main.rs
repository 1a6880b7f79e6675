use clap::Parser;
use color_eyre::eyre::WrapErr;
use color_eyre::Result;
use env_logger::Env;
use log::info;
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::PathBuf;

use popmatch::config::{self, CliOverrides};
use popmatch::query;
use popmatch::report::OutputFormat;
use popmatch::table;

/// Resolve IPv6 prefixes to the PoP serving them
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to an optional YAML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Path to the routing table (`<address>/<length> <pop>` per line)
    #[arg(short, long)]
    table: Option<PathBuf>,

    /// Read queries from this file instead of stdin
    #[arg(short, long)]
    queries: Option<PathBuf>,

    /// Output format for lookup results
    #[arg(short, long, value_enum)]
    format: Option<OutputFormat>,

    /// Worker threads for query resolution (0 = resolve on the main thread)
    #[arg(short = 'j', long)]
    jobs: Option<usize>,

    /// Log level (off, error, warn, info, debug, trace)
    #[arg(long)]
    log_level: Option<String>,
}

fn main() -> Result<()> {
    // Initialize error handling
    color_eyre::install()?;

    let args = Args::parse();

    let overrides = CliOverrides {
        table: args.table.clone(),
        format: args.format,
        jobs: args.jobs,
        log_level: args.log_level.clone(),
    };
    let config = config::resolve_config(args.config.as_deref(), overrides)
        .wrap_err("Failed to load configuration")?;

    env_logger::Builder::from_env(Env::default().default_filter_or(&config.log_level)).init();

    if let Some(path) = &args.config {
        info!("Configuration file: {:?}", path);
    }
    info!("Routing table: {:?}", config.table);
    let trie = table::load_table(&config.table)
        .wrap_err_with(|| format!("Failed to load routing table '{}'", config.table.display()))?;

    let reader: Box<dyn BufRead> = match &args.queries {
        Some(path) => {
            info!("Reading queries from: {:?}", path);
            let file = File::open(path)
                .wrap_err_with(|| format!("Failed to open query file '{}'", path.display()))?;
            Box::new(BufReader::new(file))
        }
        None => Box::new(io::stdin().lock()),
    };

    let stdout = io::stdout();
    let mut out = stdout.lock();
    let summary = if config.jobs > 0 {
        rayon::ThreadPoolBuilder::new()
            .num_threads(config.jobs)
            .build_global()
            .wrap_err("Failed to configure thread pool")?;
        query::stream_queries_parallel(
            &trie,
            reader,
            &mut out,
            config.format,
            query::DEFAULT_CHUNK_SIZE,
        )
    } else {
        query::stream_queries(&trie, reader, &mut out, config.format)
    }
    .wrap_err("Failed to answer queries")?;

    info!("Resolved {} queries, {} matched", summary.queries, summary.matched);
    Ok(())
}
