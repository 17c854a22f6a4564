//! Fog CLI - Command-line tool for inspecting Fog asset archives.
//!
//! This is the main entry point for the Fog command-line application.

use std::fs;
use std::io::{self, Write};
use std::path::{Component, Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use rayon::prelude::*;

use fog::asset::{AssetType, Header, ARCHIVE_ENV};
use fog::prelude::*;

/// Fog - asset archive inspection tool
#[derive(Parser)]
#[command(name = "fog")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the assets in an archive
    List {
        /// Path to the archive
        #[arg(short, long, env = ARCHIVE_ENV)]
        archive: PathBuf,

        /// Filter pattern on the asset path (glob-style)
        #[arg(short, long)]
        filter: Option<String>,

        /// Show detailed information
        #[arg(short, long)]
        detailed: bool,

        /// Print the headers as JSON
        #[arg(long, conflicts_with = "detailed")]
        json: bool,
    },

    /// Show section sizes and asset counts
    Info {
        /// Path to the archive
        #[arg(short, long, env = ARCHIVE_ENV)]
        archive: PathBuf,
    },

    /// Extract asset payloads to a directory
    Extract {
        /// Path to the archive
        #[arg(short, long, env = ARCHIVE_ENV)]
        archive: PathBuf,

        /// Output directory
        #[arg(short, long, env = "OUTPUT_FOLDER")]
        output: PathBuf,

        /// Filter pattern on the asset path (glob-style)
        #[arg(short, long)]
        filter: Option<String>,
    },

    /// Measure a string in a font
    Measure {
        /// Path to the archive
        #[arg(short, long, env = ARCHIVE_ENV)]
        archive: PathBuf,

        /// Font asset id (decimal or 0x-prefixed hex)
        #[arg(long, value_parser = parse_asset_id)]
        font: AssetId,

        /// Text size in pixels
        #[arg(long, default_value_t = 16.0)]
        size: f32,

        /// Text to measure
        text: String,
    },

    /// Dump a font's metrics and kerning pairs
    Font {
        /// Path to the archive
        #[arg(short, long, env = ARCHIVE_ENV)]
        archive: PathBuf,

        /// Font asset id (decimal or 0x-prefixed hex)
        #[arg(long, value_parser = parse_asset_id)]
        font: AssetId,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::List {
            archive,
            filter,
            detailed,
            json,
        } => {
            cmd_list(&archive, filter.as_deref(), detailed, json)?;
        }
        Commands::Info { archive } => {
            cmd_info(&archive)?;
        }
        Commands::Extract {
            archive,
            output,
            filter,
        } => {
            cmd_extract(&archive, &output, filter.as_deref())?;
        }
        Commands::Measure {
            archive,
            font,
            size,
            text,
        } => {
            cmd_measure(&archive, font, size, &text)?;
        }
        Commands::Font { archive, font } => {
            cmd_font(&archive, font)?;
        }
    }

    Ok(())
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => log::LevelFilter::Warn,
        1 => log::LevelFilter::Info,
        2 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };
    colog::basic_builder()
        .filter_level(level)
        .parse_default_env()
        .init();
}

fn open_archive(path: &Path) -> Result<AssetRegistry> {
    let start = Instant::now();
    let registry = AssetRegistry::load(&AssetsConfig::new(path))
        .with_context(|| format!("Failed to load archive {}", path.display()))?;
    log::info!("Loaded {} assets in {:?}", registry.len(), start.elapsed());
    Ok(registry)
}

fn filtered<'a>(registry: &'a AssetRegistry, filter: Option<&str>) -> Result<Vec<Header<'a>>> {
    let pattern = filter
        .map(glob::Pattern::new)
        .transpose()
        .context("Invalid filter pattern")?;

    Ok(registry
        .headers()
        .filter(|header| pattern.as_ref().map_or(true, |p| p.matches(header.file_path)))
        .collect())
}

fn cmd_list(archive_path: &Path, filter: Option<&str>, detailed: bool, json: bool) -> Result<()> {
    let registry = open_archive(archive_path)?;
    let headers = filtered(&registry, filter)?;

    if json {
        let stdout = io::stdout();
        let mut out = stdout.lock();
        serde_json::to_writer_pretty(&mut out, &headers).context("Failed to write JSON")?;
        writeln!(out)?;
        return Ok(());
    }

    for header in &headers {
        if detailed {
            println!(
                "{:#018x} {:<8} {:>12} {:>12} {}",
                header.asset_id, header.asset_type, header.offset, header.asset_size, header.file_path
            );
        } else {
            println!("{:#018x} {:<8} {}", header.asset_id, header.asset_type, header.file_path);
        }
    }

    println!("\nTotal: {} assets", headers.len());

    Ok(())
}

fn cmd_info(archive_path: &Path) -> Result<()> {
    let registry = open_archive(archive_path)?;
    let header = registry.file_header();

    println!("Archive: {}", archive_path.display());
    println!("  Assets:       {}", { header.number_of_assets });
    println!("  Header bytes: {}", { header.size_of_headers });
    println!("  String bytes: {}", { header.size_of_strings });
    println!("  Data bytes:   {}", { header.size_of_data });

    println!("\nBy type:");
    for asset_type in AssetType::ALL {
        let (count, bytes) = registry
            .headers()
            .filter(|h| h.asset_type == asset_type)
            .fold((0usize, 0u64), |(count, bytes), h| (count + 1, bytes + u64::from(h.asset_size)));
        if count > 0 {
            println!("  {:<8} {:>6} assets {:>12} bytes", asset_type, count, bytes);
        }
    }

    Ok(())
}

fn cmd_extract(archive_path: &Path, output: &Path, filter: Option<&str>) -> Result<()> {
    let registry = open_archive(archive_path)?;
    let headers = filtered(&registry, filter)?;

    println!("Extracting {} assets to {}...", headers.len(), output.display());

    let pb = ProgressBar::new(headers.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta})")?
            .progress_chars("#>-"),
    );

    fs::create_dir_all(output)?;

    let start = Instant::now();
    headers.par_iter().try_for_each(|header| -> Result<()> {
        let output_path = output.join(relative_path(header));

        if let Some(parent) = output_path.parent() {
            fs::create_dir_all(parent)?;
        }

        let data = registry.payload(header.asset_id).unwrap_or_default();
        fs::write(&output_path, data)
            .with_context(|| format!("Failed to write {}", output_path.display()))?;

        pb.inc(1);
        Ok(())
    })?;

    pb.finish_with_message("Done");
    println!("Extraction completed in {:?}", start.elapsed());

    Ok(())
}

/// Path to extract an asset to, kept inside the output directory.
///
/// Assets without a usable path are named after their id.
fn relative_path(header: &Header<'_>) -> PathBuf {
    let path: PathBuf = Path::new(&header.file_path.replace('\\', "/"))
        .components()
        .filter_map(|component| match component {
            Component::Normal(part) => Some(part),
            _ => None,
        })
        .collect();

    if path.as_os_str().is_empty() {
        PathBuf::from(format!("{:016x}.{}", header.asset_id, header.asset_type))
    } else {
        path
    }
}

fn cmd_measure(archive_path: &Path, font_id: AssetId, size: f32, text: &str) -> Result<()> {
    let registry = open_archive(archive_path)?;
    let extent = measure_text(&registry, text, size, font_id)
        .with_context(|| format!("Failed to measure text in font {font_id:#x}"))?;

    println!("{} x {}", extent.x, extent.y);

    Ok(())
}

fn cmd_font(archive_path: &Path, font_id: AssetId) -> Result<()> {
    let registry = open_archive(archive_path)?;
    let font = registry
        .font(font_id)
        .with_context(|| format!("Failed to look up font {font_id:#x}"))?;

    println!("Font {:#x}", font_id);
    println!("  Texture:   {:#x}", font.texture());
    println!("  Height:    {}", font.height());
    println!("  Monospace: {}", font.is_monospace());

    println!("\nGlyphs:");
    for glyph in font.glyphs().iter().filter(|g| g.advance != 0.0 || g.w != 0.0) {
        let ch = glyph.id as char;
        let shown = if ch.is_ascii_graphic() { ch } else { ' ' };
        println!(
            "  {:>3} {} rect ({}, {}, {}, {}) offset ({}, {}) advance {}",
            glyph.id,
            shown,
            { glyph.x },
            { glyph.y },
            { glyph.w },
            { glyph.h },
            { glyph.x_offset },
            { glyph.y_offset },
            { glyph.advance }
        );
    }

    println!("\nKerning pairs: {}", font.num_kernings());
    for kerning in font.kernings() {
        let [left, right] = { kerning.key }.to_be_bytes();
        println!(
            "  {:?} {:?} {:+}",
            left as char,
            right as char,
            { kerning.amount }
        );
    }

    Ok(())
}

/// Parse an asset id given in decimal or `0x` hex.
fn parse_asset_id(value: &str) -> std::result::Result<AssetId, String> {
    let parsed = match value.strip_prefix("0x").or_else(|| value.strip_prefix("0X")) {
        Some(hex) => AssetId::from_str_radix(hex, 16),
        None => value.parse(),
    };
    parsed.map_err(|e| format!("invalid asset id {value:?}: {e}"))
}
