//! `folio`: find a Project Gutenberg book by title and print where to download it.

use clap::{Parser, Subcommand};
use folio_config::Config;
use folio_library::{IndexOrigin, Opened, open};
use std::fmt::Debug;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "folio", version, about = "Resolve book titles to Project Gutenberg mirror paths")]
struct Cli {
    /// Configuration file (TOML, YAML or JSON)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Increase log verbosity (-v, -vv, -vvv); RUST_LOG takes precedence
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Build the title index, or load it from the snapshot
    Index {
        /// Ignore the snapshot and rescan the corpus
        #[arg(long)]
        rebuild: bool,
    },
    /// List the downloadable variants of a title
    Find { title: String },
    /// Print the mirror path of one variant of a title
    Locate {
        title: String,
        /// Variant number, as listed by `find`
        variant: usize,
    },
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn fail(err: impl Debug) -> ExitCode {
    eprintln!("Error: {err:?}");
    ExitCode::FAILURE
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = match Config::load(cli.config.as_deref()) {
        Ok(config) => config,
        Err(err) => return fail(err),
    };
    let rebuild = matches!(cli.command, Command::Index { rebuild: true });
    let opened = match open(&config, rebuild).await {
        Ok(opened) => opened,
        Err(err) => return fail(err),
    };
    tracing::info!(titles = opened.titles(), "Resolver ready");

    match cli.command {
        Command::Index { .. } => index(&opened),
        Command::Find { title } => find(&opened, &title),
        Command::Locate { title, variant } => locate(&opened, &title, variant),
    }
}

fn index(opened: &Opened) -> ExitCode {
    match &opened.origin {
        IndexOrigin::Snapshot => println!("Loaded {} titles from snapshot", opened.titles()),
        IndexOrigin::Built(report) => {
            println!(
                "Indexed {} titles from {} descriptors in {:.2?}",
                opened.titles(),
                report.discovered,
                report.elapsed
            );
            if report.non_textual > 0 {
                println!("  {} non-textual works left out", report.non_textual);
            }
            if report.collisions > 0 {
                println!("  {} duplicate titles replaced by a later descriptor", report.collisions);
            }
            for skipped in &report.skipped {
                println!("  skipped {}: {}", skipped.path.display(), skipped.reason);
            }
        },
    }
    ExitCode::SUCCESS
}

fn find(opened: &Opened, title: &str) -> ExitCode {
    let Some(query) = opened.resolver.query(title) else {
        eprintln!("No title matching {title:?}");
        return ExitCode::FAILURE;
    };
    let entry = query.entry();
    let listed = match query.variants() {
        Ok(listed) => listed,
        Err(err) => return fail(err),
    };
    println!("{} (#{})", entry.title, entry.id);
    for (number, variant) in listed.list().iter().enumerate() {
        println!("  [{number}] {}", variant.format.label());
    }
    ExitCode::SUCCESS
}

fn locate(opened: &Opened, title: &str, variant: usize) -> ExitCode {
    let Some(entry) = opened.resolver.resolve(title) else {
        eprintln!("No title matching {title:?}");
        return ExitCode::FAILURE;
    };
    match opened.resolver.select_variant(entry, variant) {
        Ok(path) => {
            println!("{path}");
            ExitCode::SUCCESS
        },
        Err(err) => fail(err),
    }
}
