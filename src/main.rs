use chrono::Local;
use clap::{Parser, Subcommand};
use simple_blog::{config, generate, init, output, scan, templates};
use std::fs;
use std::path::{Path, PathBuf};

const MANIFEST_FILE: &str = "manifest.json";

/// Shared flags for commands that scan posts.
#[derive(clap::Args, Clone)]
struct ScanArgs {
    /// Include posts marked `draft: true`
    #[arg(long)]
    drafts: bool,
}

impl ScanArgs {
    fn options(&self) -> scan::ScanOptions {
        scan::ScanOptions {
            include_drafts: self.drafts,
            ..Default::default()
        }
    }
}

#[derive(Parser)]
#[command(name = "simple-blog")]
#[command(about = "Static site generator for Markdown blogs")]
#[command(long_about = "\
Static site generator for Markdown blogs

Posts are Markdown files with optional front matter. Each post becomes a page;
an index, an archive grouped by year and month, and an about page are
generated alongside.

Project structure:

  blog/
  ├── config.toml                  # Site config (optional)
  ├── about.md                     # About page (optional)
  ├── posts/
  │   ├── 2024-03-01-spring.md     # Date prefix = post date
  │   └── hello-world.md           # Front matter: title, date, author, tags...
  ├── templates/                   # Tera overrides for the built-in templates
  └── assets/                      # Copied verbatim to dist/assets/

Metadata defaults (first available wins):
  Title:   front matter → file name (hello-world.md → \"Hello World\")
  Date:    front matter → YYYY-MM-DD- file-name prefix → today
  Author:  front matter → site.author

Run 'simple-blog gen-config' to print a documented config.toml.")]
#[command(version)]
struct Cli {
    /// Project directory
    #[arg(long, default_value = ".", global = true)]
    source: PathBuf,

    /// Output directory
    #[arg(long, default_value = "dist", global = true)]
    output: PathBuf,

    /// Directory for intermediate files (manifest)
    #[arg(long, default_value = ".simple-blog-temp", global = true)]
    temp_dir: PathBuf,

    /// Show debug diagnostics
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Scan posts into a manifest
    Scan(ScanArgs),
    /// Produce the HTML site from the manifest
    Generate,
    /// Run the full pipeline: scan → generate
    Build(ScanArgs),
    /// Validate the project without building
    Check(ScanArgs),
    /// Print a stock config.toml with all options documented
    GenConfig,
    /// Write the built-in templates into the templates directory
    GenTemplates {
        /// Overwrite existing template files
        #[arg(long)]
        force: bool,
    },
    /// Create a new blog project
    Init,
    /// Create a new post
    New {
        /// Post title
        title: String,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let level = if cli.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::WARN
    };
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::builder()
                .with_default_directive(level.into())
                .from_env_lossy(),
        )
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    match cli.command {
        Command::Scan(args) => {
            let manifest = scan::scan(&cli.source, &args.options())?;
            write_manifest(&manifest, &cli.temp_dir)?;
            output::print_scan_output(&manifest, &cli.source);
        }
        Command::Generate => {
            let manifest = generate::load_manifest(&cli.temp_dir.join(MANIFEST_FILE))?;
            init_thread_pool(&manifest.config.processing);
            let report = generate::generate(&manifest, &cli.source, &cli.output)?;
            output::print_generate_output(&report);
        }
        Command::Build(args) => {
            println!("==> Stage 1: Scanning {}", cli.source.display());
            let manifest = scan::scan(&cli.source, &args.options())?;
            write_manifest(&manifest, &cli.temp_dir)?;
            output::print_scan_output(&manifest, &cli.source);

            println!("==> Stage 2: Generating HTML → {}", cli.output.display());
            init_thread_pool(&manifest.config.processing);
            let report = generate::generate(&manifest, &cli.source, &cli.output)?;
            output::print_generate_output(&report);

            println!("==> Build complete: {}", cli.output.display());
        }
        Command::Check(args) => {
            println!("==> Checking {}", cli.source.display());
            let manifest = scan::scan(&cli.source, &args.options())?;
            let config = &manifest.config;
            templates::Templates::load(&cli.source.join(&config.paths.templates))?;
            output::print_scan_output(&manifest, &cli.source);
            println!("==> Project is valid");
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
        Command::GenTemplates { force } => {
            let config = config::load_config(&cli.source)?;
            let dir = cli.source.join(&config.paths.templates);
            let written = templates::write_default_templates(&dir, force)?;
            if written.is_empty() {
                println!("Templates already present in {} (use --force to overwrite)", dir.display());
            }
            output::print_created_files(&written, &cli.source);
        }
        Command::Init => {
            let created = init::init_site(&cli.source, Local::now().date_naive())?;
            output::print_created_files(&created, &cli.source);
        }
        Command::New { title } => {
            let config = config::load_config(&cli.source)?;
            let path = init::new_post(&cli.source, &config, &title, Local::now().date_naive())?;
            output::print_created_files(&[path], &cli.source);
        }
    }

    Ok(())
}

/// Write the scan manifest into the temp directory.
fn write_manifest(manifest: &scan::Manifest, temp_dir: &Path) -> Result<(), Box<dyn std::error::Error>> {
    fs::create_dir_all(temp_dir)?;
    let json = serde_json::to_string_pretty(manifest)?;
    fs::write(temp_dir.join(MANIFEST_FILE), json)?;
    Ok(())
}

/// Initialize the rayon thread pool based on processing config.
///
/// Caps at the number of available CPU cores: user can constrain down, not up.
fn init_thread_pool(processing: &config::ProcessingConfig) {
    let threads = config::effective_threads(processing);
    rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build_global()
        .ok();
}
