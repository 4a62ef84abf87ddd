//! Asset packing and fetching commands

use clap::{Args, Subcommand};
use mdtrack_engine::assets::{fetch_assets, FetchPlan};
use mdtrack_store::pack::write_pack;
use std::path::{Path, PathBuf};

#[derive(Debug, Args)]
pub struct AssetsArgs {
    #[command(subcommand)]
    pub command: AssetsCommand,
}

#[derive(Debug, Subcommand)]
pub enum AssetsCommand {
    /// Pack a directory tree into a single compressed blob
    Pack(PackArgs),
    /// Fetch remote assets with filename-variant fallback
    Fetch(FetchArgs),
}

#[derive(Debug, Args)]
pub struct PackArgs {
    /// Directory tree to pack
    #[arg(long)]
    pub src: String,

    /// Output pack file
    #[arg(long, default_value = ".mdtrack/assets.pack.zst")]
    pub output: String,
}

#[derive(Debug, Args)]
pub struct FetchArgs {
    /// URL prefix assets are published under
    #[arg(long)]
    pub base_url: String,

    /// File listing one asset key per line
    #[arg(long)]
    pub keys: String,

    /// Destination directory
    #[arg(long, default_value = ".mdtrack/assets")]
    pub dest: String,

    /// Comma-separated extension variants, tried in order
    #[arg(long, default_value = "webp,png")]
    pub variants: String,
}

pub fn execute(args: AssetsArgs) -> Result<(), Box<dyn std::error::Error>> {
    match args.command {
        AssetsCommand::Pack(pack_args) => execute_pack(pack_args),
        AssetsCommand::Fetch(fetch_args) => execute_fetch(fetch_args),
    }
}

fn execute_pack(args: PackArgs) -> Result<(), Box<dyn std::error::Error>> {
    let stats = write_pack(Path::new(&args.src), Path::new(&args.output))?;
    println!("Packed {} entries into {}", stats.entries, args.output);
    println!(
        "  {} bytes raw, {} bytes compressed",
        stats.raw_len, stats.compressed_len
    );
    Ok(())
}

fn execute_fetch(args: FetchArgs) -> Result<(), Box<dyn std::error::Error>> {
    let keys: Vec<String> = std::fs::read_to_string(&args.keys)?
        .lines()
        .map(|l| l.trim())
        .filter(|l| !l.is_empty())
        .map(|l| l.to_string())
        .collect();

    let plan = FetchPlan {
        base_url: args.base_url,
        variants: args
            .variants
            .split(',')
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .collect(),
        dest: PathBuf::from(&args.dest),
    };

    let report = fetch_assets(&plan, &keys)?;
    println!(
        "Assets: {} fetched, {} already present, {} unreachable",
        report.fetched, report.skipped, report.missed
    );
    Ok(())
}
