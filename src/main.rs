use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use lead_filter::filter::{filter_batch, parse_magnitude, FilterSpec};
use lead_filter::generator::{LeadGenerator, SampleTables};
use lead_filter::places::{search_queries, Place, PlaceTracker, RunStats, SearchQuery};
use lead_filter::record::LeadRecord;
use lead_filter::settings::Settings;

#[derive(Parser)]
#[command(name = "lead_filter", about = "Synthetic lead generation, lead filtering and Maps result cleanup")]
struct Cli {
    /// Settings file (TOML or JSON); LEADS_* environment variables override it
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate synthetic leads as JSON lines
    Generate {
        /// Number of leads (default: generator.count)
        #[arg(short = 'n', long)]
        count: Option<usize>,
        /// RNG seed for reproducible output
        #[arg(long)]
        seed: Option<u64>,
        /// Only emit leads accepted by this filter spec (JSON)
        #[arg(long)]
        spec: Option<PathBuf>,
    },
    /// Filter a JSON array of leads against a spec
    Filter {
        /// Filter spec (JSON)
        #[arg(long)]
        spec: PathBuf,
        /// Leads file (default: stdin)
        #[arg(short, long)]
        input: Option<PathBuf>,
    },
    /// Parse unit-suffixed amounts like 10M or 1.5K
    Parse {
        #[arg(required = true)]
        values: Vec<String>,
    },
    /// Show the city/category search queries
    Queries,
    /// Deduplicate and normalize raw Maps scraper results
    Places {
        /// JSON array of { city, category, items } batches
        #[arg(short, long)]
        input: PathBuf,
    },
}

/// Raw results of one Maps search as handed over by the scraper.
#[derive(Debug, Deserialize)]
struct SearchResults {
    city: String,
    category: String,
    #[serde(default)]
    items: Vec<serde_json::Value>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let t0 = Instant::now();
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Generate { count, seed, spec } => {
            let settings = Settings::load(cli.config.as_deref())?;
            let spec = match spec {
                Some(path) => read_json::<FilterSpec>(Some(path.as_path()))?,
                None => FilterSpec::default(),
            };
            let count = count.unwrap_or(settings.generator.count);
            let rng = match seed.or(settings.generator.seed) {
                Some(seed) => StdRng::seed_from_u64(seed),
                None => StdRng::from_entropy(),
            };

            let tables = SampleTables::default();
            let mut generator = LeadGenerator::new(&tables, rng);
            let (leads, stats) =
                generator.generate_matching(&spec, count, settings.generator.max_attempts);
            if stats.accepted < count {
                warn!(
                    "Only {} of {} requested leads matched the spec",
                    stats.accepted, count
                );
            }
            write_json_lines(&leads)?;
            eprintln!(
                "Generated {} leads ({} candidates tried).",
                stats.accepted, stats.attempts
            );
            Ok(())
        }
        Commands::Filter { spec, input } => {
            let spec: FilterSpec = read_json(Some(spec.as_path()))?;
            let mut leads: Vec<LeadRecord> = read_json(input.as_deref())?;
            if spec.is_empty() {
                info!("Filter spec has no constraints; every lead passes");
            }
            let total = leads.len();
            let mut unresolved = 0;
            for lead in &mut leads {
                if lead.resolve_revenue().is_none() && !lead.company_annual_revenue.is_empty() {
                    unresolved += 1;
                }
            }
            if unresolved > 0 {
                warn!("{} leads have an unparseable revenue and skip revenue bounds", unresolved);
            }

            let accepted = filter_leads(leads, &spec);
            write_json_lines(&accepted)?;
            eprintln!(
                "Accepted {} of {} leads ({} rejected).",
                accepted.len(),
                total,
                total - accepted.len()
            );
            Ok(())
        }
        Commands::Parse { values } => {
            for value in &values {
                match parse_magnitude(value) {
                    Some(n) => println!("{:<12} {}", value, n),
                    None => println!("{:<12} invalid", value),
                }
            }
            Ok(())
        }
        Commands::Queries => {
            let settings = Settings::load(cli.config.as_deref())?;
            let p = &settings.places;
            let queries = search_queries(p.cities.as_slice(), p.categories.as_slice(), &p.country);

            println!("{:>3} | {:<40} | {:<16} | {:<16}", "#", "Query", "City", "Category");
            println!("{}", "-".repeat(85));
            for (i, q) in queries.iter().enumerate() {
                println!(
                    "{:>3} | {:<40} | {:<16} | {:<16}",
                    i + 1,
                    truncate(&q.query, 40),
                    truncate(&q.city, 16),
                    truncate(&q.category, 16)
                );
            }
            println!(
                "\n{} queries | max {} results each | language {} | region {}",
                queries.len(),
                p.max_results_per_search,
                p.language,
                p.country_code
            );
            Ok(())
        }
        Commands::Places { input } => {
            let settings = Settings::load(cli.config.as_deref())?;
            let batches: Vec<SearchResults> = read_json(Some(input.as_path()))?;
            let (places, stats) = collect_places(&batches, &settings.places.country, Utc::now());
            write_json_lines(&places)?;
            eprintln!("Searches performed:   {}", stats.searches);
            eprintln!("Businesses scraped:   {}", stats.total_scraped);
            eprintln!("Unique businesses:    {}", stats.unique);
            eprintln!("Duplicates removed:   {}", stats.duplicates());
            Ok(())
        }
    };

    let elapsed = t0.elapsed();
    if elapsed.as_secs() >= 1 {
        eprintln!("\nDone in {}", format_duration(elapsed));
    }

    result
}

fn filter_leads(leads: Vec<LeadRecord>, spec: &FilterSpec) -> Vec<LeadRecord> {
    use indicatif::{ProgressBar, ProgressStyle};

    let pb = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.green} [{elapsed_precise}] {msg}") {
        pb.set_style(style);
    }
    pb.set_message(format!("Filtering {} leads...", leads.len()));
    pb.enable_steady_tick(std::time::Duration::from_millis(100));

    let accepted = filter_batch(leads, spec);

    pb.finish_and_clear();
    accepted
}

fn collect_places(
    batches: &[SearchResults],
    country: &str,
    scraped_at: DateTime<Utc>,
) -> (Vec<Place>, RunStats) {
    let mut tracker = PlaceTracker::new();
    let mut places = Vec::new();
    for batch in batches {
        let query = SearchQuery::new(&batch.city, &batch.category, country);
        places.extend(tracker.record(&query, &batch.items, scraped_at));
    }
    (places, tracker.stats())
}

/// Read JSON from `path`, or stdin when `None`.
fn read_json<T: DeserializeOwned>(path: Option<&Path>) -> Result<T> {
    match path {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read {}", path.display()))?;
            serde_json::from_str(&text).with_context(|| format!("Invalid JSON in {}", path.display()))
        }
        None => {
            let text = std::io::read_to_string(std::io::stdin()).context("Failed to read stdin")?;
            serde_json::from_str(&text).context("Invalid JSON on stdin")
        }
    }
}

fn write_json_lines<T: Serialize>(rows: &[T]) -> Result<()> {
    let stdout = std::io::stdout();
    let mut out = BufWriter::new(stdout.lock());
    for row in rows {
        serde_json::to_writer(&mut out, row)?;
        out.write_all(b"\n")?;
    }
    out.flush()?;
    Ok(())
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let truncated: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", truncated)
    }
}

fn format_duration(d: std::time::Duration) -> String {
    let secs = d.as_secs();
    if secs < 60 {
        format!("{:.1}s", d.as_secs_f64())
    } else if secs < 3600 {
        format!("{}m {}s", secs / 60, secs % 60)
    } else {
        format!("{}h {}m {}s", secs / 3600, (secs % 3600) / 60, secs % 60)
    }
}

// ── Tests ──
