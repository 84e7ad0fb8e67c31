use clap::{Parser, Subcommand};
use std::path::PathBuf;
use strata::compile::{Api, ApiOptions};
use strata::{config, scan};

/// Crate version on a release tag, `dev@<hash>` otherwise.
fn version_string() -> &'static str {
    if env!("ON_RELEASE_TAG") == "true" {
        return env!("CARGO_PKG_VERSION");
    }
    match env!("GIT_HASH") {
        "" => "dev@unknown",
        // Leaked exactly once, at CLI construction.
        hash => Box::leak(format!("dev@{hash}").into_boxed_str()),
    }
}

#[derive(Parser)]
#[command(name = "strata")]
#[command(about = "Compile a directory of content files into a static JSON API")]
#[command(long_about = "\
Compile a directory of content files into a static JSON API

Your filesystem is the data source. A blueprint maps directory depth to
named levels; each level becomes a dimension of the generated API.

Content structure (blueprint = \"data/:language/:genre/:year\"):

  data/
  ├── english/                 # :language
  │   ├── ghosts/              # :genre
  │   │   ├── 2005.yml         # :year — one record per file
  │   │   └── 2016.yml
  │   └── science-fiction/
  │       └── 2016.yml
  └── french/
      └── ghosts/
          └── 2016.yml

Each [[endpoint]] table in strata.toml is one compilation request: pick a
root level, choose which levels stay visible, group, sort, and paginate.
The output directory is plain JSON, servable by any static file server.

Recognized content formats:
  .yml / .yaml       YAML record
  .md / .markdown    YAML front matter + body (stored under \"__body\")
  anything else      raw text

Run 'strata gen-config' to generate a documented strata.toml.")]
#[command(version = version_string())]
struct Cli {
    /// Configuration file
    #[arg(long, default_value = "strata.toml", global = true)]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the full pipeline: scan → compile → write
    Build,
    /// Walk the content directory and report what was found
    Scan,
    /// Validate config and content without writing any output
    Check,
    /// Print a stock strata.toml with all options documented
    GenConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match cli.command {
        Command::Build => {
            let site = config::load_config(&cli.config)?;
            init_thread_pool(&site.processing);
            let api = api_from(&site)?;

            println!("==> Stage 1: Scanning {}", api.base_directory().display());
            let snapshot = scan::walk(api.base_directory())?;
            print_scan_summary(&snapshot);

            println!(
                "==> Stage 2: Compiling {} endpoint request(s)",
                site.endpoint.len()
            );
            api.reset_output()?;
            let mut total = 0;
            for (index, request) in site.endpoint.iter().enumerate() {
                let documents = api.compile(&snapshot, request)?;
                println!("    endpoint {}: {} document(s)", index + 1, documents.len());
                total += documents.len();
                api.write(&documents)?;
            }

            println!(
                "==> Build complete: {} document(s) in {}",
                total,
                api.output_directory().display()
            );
        }
        Command::Scan => {
            let site = config::load_config(&cli.config)?;
            let api = api_from(&site)?;
            println!("==> Scanning {}", api.base_directory().display());
            let snapshot = scan::walk(api.base_directory())?;
            print_scan_summary(&snapshot);
        }
        Command::Check => {
            let site = config::load_config(&cli.config)?;
            init_thread_pool(&site.processing);
            let api = api_from(&site)?;

            println!("==> Checking {}", api.base_directory().display());
            let snapshot = scan::walk(api.base_directory())?;
            print_scan_summary(&snapshot);

            // Full compilation, nothing written: surfaces unknown level
            // names, unreadable files and malformed content.
            for request in &site.endpoint {
                api.compile(&snapshot, request)?;
            }
            println!("==> Config and content are valid");
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}

fn api_from(site: &config::SiteConfig) -> Result<Api, strata::compile::CompileError> {
    Api::new(ApiOptions {
        blueprint: site.blueprint.clone(),
        output: PathBuf::from(&site.output),
        pluralize: site.pluralize,
        inject_ids: site.inject_ids,
    })
}

fn print_scan_summary(snapshot: &scan::Snapshot) {
    let files = snapshot.paths.values().filter(|kind| kind.is_file()).count();
    let directories = snapshot.paths.len() - files;
    println!("    {files} file(s) in {directories} directories");
}

/// Initialize the rayon thread pool based on processing config.
///
/// Caps at the number of available CPU cores — user can constrain down, not up.
fn init_thread_pool(processing: &config::ProcessingConfig) {
    let threads = config::effective_threads(processing);
    rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build_global()
        .ok();
}
