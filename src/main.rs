use clap::{Parser, Subcommand};
use docver::{config, output, pipeline};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "docver")]
#[command(about = "Versioned documentation metadata engine")]
#[command(long_about = "\
Versioned documentation metadata engine

Discovers documents across every declared version, resolves sidebars into
navigation with previous/next ordering, and emits a route tree, per-doc data
payloads and a compact global navigation index.

Site structure:

  site/
  ├── docver.toml                          # Options (optional)
  ├── sidebars.json                        # Sidebars of the current version
  ├── docs/                                # Current version → /docs/next/
  │   ├── intro.md
  │   └── guides/install.md
  ├── versioned_docs/
  │   └── version-1.0.0/                   # Latest release → /docs/
  │       └── intro.md
  └── versioned_sidebars/
      └── version-1.0.0-sidebars.json

Metadata resolution (first available wins):
  Title:       front matter → first # heading → id
  Description: front matter → first paragraph
  Slug:        home page → front matter → /<dir>/<id>

Run 'docver gen-config' to generate a documented docver.toml.")]
#[command(version)]
struct Cli {
    /// Site directory (holds docver.toml, docs/, versioned_docs/)
    #[arg(long, default_value = ".", global = true)]
    site_dir: PathBuf,

    /// Output directory for routes, global data and payloads
    #[arg(long, default_value = ".docver", global = true)]
    out_dir: PathBuf,

    /// Log pipeline progress (otherwise RUST_LOG decides)
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Load all versions and write routes, payloads and global data
    Build,
    /// Load and validate all versions without writing anything
    Check,
    /// Print the files and globs that should trigger a rebuild
    WatchPaths,
    /// Print a stock docver.toml with all options documented
    GenConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("info")
    } else {
        EnvFilter::from_default_env()
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Command::Build => {
            let options = config::load_config(&cli.site_dir)?;
            init_thread_pool(&options.processing);

            println!("==> Loading {}", cli.site_dir.display());
            let (content, emitted) =
                pipeline::build_with_options(&cli.site_dir, &cli.out_dir, options)?;
            output::print_load_output(&content, &cli.site_dir);

            println!();
            println!("==> Emitting → {}", cli.out_dir.display());
            output::print_emit_output(&emitted, &cli.out_dir);
        }
        Command::Check => {
            let options = config::load_config(&cli.site_dir)?;
            init_thread_pool(&options.processing);

            println!("==> Checking {}", cli.site_dir.display());
            let content = pipeline::load_content_with_extractor(
                &docver::metadata::MarkdownExtractor,
                &cli.site_dir,
                options,
            )?;
            pipeline::emit(&content)?;
            output::print_load_output(&content, &cli.site_dir);
            println!("==> Content is valid");
        }
        Command::WatchPaths => {
            let options = config::load_config(&cli.site_dir)?;
            let paths = pipeline::watch_paths(&cli.site_dir, &options)?;
            output::print_watch_paths(&paths);
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}

/// Initialize the rayon thread pool based on processing config.
///
/// Never more threads than available cores; `max_processes` only lowers it.
fn init_thread_pool(processing: &config::ProcessingConfig) {
    let threads = config::effective_threads(processing);
    rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build_global()
        .ok();
}
