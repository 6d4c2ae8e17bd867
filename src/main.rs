use anyhow::{Context, Result};
use arrow::util::pretty::pretty_format_batches;
use clap::{Parser, Subcommand};
use lpmd::{datasets, fetch::check_url, Catalogue, HttpFetcher, Scraper};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser)]
#[command(name = "lpmd", version, about = "Livestock product marketing data scraper")]
struct Cli {
    /// YAML catalogue of categories, columns and partition URLs.
    #[arg(long, global = true, default_value = "data_catalogue.yml")]
    catalogue: PathBuf,

    /// Root directory of packaged datasets.
    #[arg(long, global = true, default_value = "datasets")]
    datasets: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Write every partition of a category as CSV under DEST/<category>/.
    Scrape {
        category: String,
        #[arg(long, default_value = ".")]
        dest: PathBuf,
    },
    /// Aggregate categories into zstd Parquet datasets (all when none given).
    Package { categories: Vec<String> },
    /// List packaged datasets.
    List,
    /// Print the first rows of a packaged dataset.
    Show {
        category: String,
        #[arg(long, default_value_t = 10)]
        rows: usize,
    },
    /// Report whether a URL is effective.
    Check { url: String },
}

fn main() -> Result<()> {
    // ─── 1) init logging ─────────────────────────────────────────────
    let env = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt::Subscriber::builder()
        .with_env_filter(env)
        .with_span_events(fmt::format::FmtSpan::CLOSE)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Scrape { category, dest } => {
            let catalogue = Catalogue::from_path(&cli.catalogue)?;
            let scraper = Scraper::new(&category, &catalogue, HttpFetcher::new()?, &cli.datasets)?;
            let result = scraper.persist_all_partitions(&dest)?;
            println!("{}", serde_json::to_string_pretty(&result)?);
        }

        Command::Package { categories } => {
            let catalogue = Catalogue::from_path(&cli.catalogue)?;
            let categories: Vec<String> = if categories.is_empty() {
                catalogue.categories().map(str::to_string).collect()
            } else {
                categories
            };
            for category in &categories {
                let scraper =
                    Scraper::new(category, &catalogue, HttpFetcher::new()?, &cli.datasets)?;
                let path = scraper
                    .package()
                    .with_context(|| format!("packaging {}", category))?;
                info!(category = %category, path = %path.display(), "packaged");
                println!("{}", path.display());
            }
        }

        Command::List => {
            for category in datasets::available(&cli.datasets)? {
                println!("{}", category);
            }
        }

        Command::Show { category, rows } => {
            let batch = datasets::load(&cli.datasets, &category)?;
            for (k, v) in datasets::metadata(&cli.datasets, &category)? {
                println!("{}: {}", k, v);
            }
            let head = batch.slice(0, rows.min(batch.num_rows()));
            println!("{}", pretty_format_batches(&[head])?);
            println!("{} rows x {} columns", batch.num_rows(), batch.num_columns());
        }

        Command::Check { url } => {
            let fetcher = HttpFetcher::new()?;
            let effective = check_url(fetcher.client(), &url)?;
            println!("{}", effective);
        }
    }

    Ok(())
}
