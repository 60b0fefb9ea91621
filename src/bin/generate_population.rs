//! Synthetic population generator
//!
//! Reads joined census tables and a zone table, generates the population and
//! writes `<name>.dat`, `<name>.json` and `<name>.geojson` to the output
//! directory.

use clap::Parser;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::PathBuf;
use std::time::Instant;

use synthpop::census::CensusDocument;
use synthpop::core::{GenerationConfig, Result};
use synthpop::generation::generate;
use synthpop::geography::ZoneTable;
use synthpop::population::{write_geojson, write_population, GenerationStats, PopulationSummary};

/// Generate a synthetic population from census aggregates
#[derive(Parser, Debug)]
#[command(name = "generate_population")]
#[command(about = "Sample families and persons that reproduce census tables per zone")]
struct Args {
    /// Census tables (JSON)
    #[arg(long)]
    census: PathBuf,

    /// Zone table (JSON)
    #[arg(long)]
    zones: PathBuf,

    /// Generation config (TOML); defaults apply when omitted
    #[arg(long)]
    config: Option<PathBuf>,

    /// Directory the output files are written to
    #[arg(long, default_value = ".")]
    output_dir: PathBuf,

    /// Base name of the output files
    #[arg(long, default_value = "synthetic_population")]
    name: String,

    /// Random seed for reproducible runs
    #[arg(long)]
    seed: Option<u64>,

    /// Only generate zones of this province
    #[arg(long)]
    province: Option<u32>,

    /// Fraction of zones to keep
    #[arg(long)]
    fraction: Option<f64>,
}

fn run(args: Args) -> Result<()> {
    let mut config = match &args.config {
        Some(path) => GenerationConfig::load_from_toml(path)?,
        None => GenerationConfig::default(),
    };
    if args.seed.is_some() {
        config.seed = args.seed;
    }
    if args.province.is_some() {
        config.province = args.province;
    }
    if let Some(fraction) = args.fraction {
        config.zone_fraction = fraction;
    }

    let census = CensusDocument::load_from_file(&args.census)?.into_table()?;
    let zones = ZoneTable::load_from_file(&args.zones)?;

    let start = Instant::now();
    let model = generate(&census, &zones, &config)?;
    let stats = GenerationStats::new(&model, start.elapsed());

    std::fs::create_dir_all(&args.output_dir)?;
    let dat = args.output_dir.join(format!("{}.dat", args.name));
    let json = args.output_dir.join(format!("{}.json", args.name));
    let geojson = args.output_dir.join(format!("{}.geojson", args.name));

    let mut out = BufWriter::new(File::create(&dat)?);
    write_population(&mut out, &model.family_records()?, &model.persons)?;
    out.flush()?;
    PopulationSummary::from_model(&model).write_to(&json)?;
    write_geojson(&model, &geojson)?;

    tracing::info!(dat = %dat.display(), json = %json.display(), geojson = %geojson.display(), "Output written");
    println!("{}", stats.summary());
    Ok(())
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("synthpop=info")),
        )
        .init();

    if let Err(e) = run(Args::parse()) {
        tracing::error!("{}", e);
        std::process::exit(1);
    }
}
