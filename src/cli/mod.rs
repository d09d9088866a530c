//! # CLI Module
//!
//! Command-line interface for the near-duplicate image finder.
//!
//! ## Usage
//! ```bash
//! # Exact duplicates only
//! phash-dedup --images-dir ~/Pictures --save-to dups.json
//!
//! # Allow up to 4 differing bits and delete all but the largest copy
//! phash-dedup --images-dir ~/Pictures --radius 4 --save-to dups.json --remove-duplicates
//!
//! # JSON summary on stdout
//! phash-dedup --images-dir ~/Pictures --save-to dups.json --output json
//! ```

use clap::{Parser, ValueEnum};
use console::{style, Term};
use indicatif::{ProgressBar, ProgressStyle};
use phash_dedup::core::pipeline::{Pipeline, PipelineResult};
use phash_dedup::core::remover::{DuplicateRemover, RemovalReport};
use phash_dedup::core::reporter::{lossy_paths, save_groups};
use phash_dedup::error::Result;
use phash_dedup::events::{null_sender, Event, EventChannel, HashEvent, PipelineEvent, ScanEvent};
use std::path::PathBuf;
use std::thread;

/// Find near-duplicate images by perceptual hash
#[derive(Parser, Debug)]
#[command(name = "phash-dedup")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Directory containing the images
    #[arg(long)]
    images_dir: PathBuf,

    /// Maximum Hamming distance between grouped fingerprints (0 = identical only)
    // Inclusive: fingerprints exactly `radius` bits apart are grouped
    #[arg(long, default_value_t = 0, allow_negative_numbers = true)]
    radius: i64,

    /// Where to write the duplicate groups as JSON
    #[arg(long)]
    save_to: PathBuf,

    /// Delete every image in a group except the largest
    #[arg(long)]
    remove_duplicates: bool,

    /// With --remove-duplicates, report what would be deleted without deleting
    #[arg(long, requires = "remove_duplicates")]
    dry_run: bool,

    /// Also scan subdirectories
    #[arg(long)]
    recursive: bool,

    /// Side of the fingerprint bit grid (8 gives 64-bit fingerprints)
    #[arg(long, default_value_t = 8)]
    hash_size: u32,

    /// Output format
    #[arg(short, long, default_value = "pretty")]
    output: OutputFormat,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat {
    /// Human-readable output with colors
    Pretty,
    /// JSON output for scripting
    Json,
    /// Minimal output (duplicate paths only)
    Minimal,
}

/// Run the CLI
pub fn run() -> Result<()> {
    let cli = Cli::parse();

    phash_dedup::init_tracing(if cli.verbose { "debug" } else { "warn" });

    let pipeline = Pipeline::builder()
        .images_dir(&cli.images_dir)
        .radius(cli.radius)
        .recursive(cli.recursive)
        .hash_size(cli.hash_size)
        .build()?;

    let term = Term::stderr();
    let pretty = matches!(cli.output, OutputFormat::Pretty);

    if pretty {
        term.write_line(&format!(
            "{} {}",
            style("phash-dedup").bold().cyan(),
            style(concat!("v", env!("CARGO_PKG_VERSION"))).dim()
        ))
        .ok();
        term.write_line("").ok();
    }

    let result = run_with_progress(&pipeline, pretty, cli.verbose)?;

    match cli.output {
        OutputFormat::Pretty => print_pretty_results(&term, &result, cli.verbose),
        OutputFormat::Json => println!("{}", json_results(&result)),
        OutputFormat::Minimal => print_minimal_results(&result),
    }

    // The record is written before anything is deleted
    if cli.remove_duplicates {
        let report = DuplicateRemover::new()
            .dry_run(cli.dry_run)
            .remove_recorded(&cli.save_to, &result.groups, &null_sender())?;
        if pretty {
            print_removal(&term, &report, cli.dry_run);
        }
    } else {
        save_groups(&cli.save_to, &result.groups)?;
    }

    if pretty {
        term.write_line(&format!(
            "  {} {}",
            style("Saved groups to").dim(),
            cli.save_to.display()
        ))
        .ok();
    }

    Ok(())
}

fn run_with_progress(pipeline: &Pipeline, show: bool, verbose: bool) -> Result<PipelineResult> {
    let (sender, receiver) = EventChannel::new();

    // Progress bar for pretty output
    let progress = show.then(|| {
        let pb = ProgressBar::new(0);
        if let Ok(bar_style) =
            ProgressStyle::default_bar().template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
        {
            pb.set_style(bar_style.progress_chars("█▓░"));
        }
        pb
    });

    let progress_clone = progress.clone();

    // Handle events in a separate thread
    let event_thread = thread::spawn(move || {
        let Some(pb) = progress_clone else {
            receiver.iter().for_each(drop);
            return;
        };

        for event in receiver.iter() {
            match event {
                Event::Pipeline(PipelineEvent::PhaseChanged { phase }) => {
                    pb.set_message(phase.to_string());
                }
                Event::Scan(ScanEvent::Completed { total_images }) => {
                    pb.set_length(total_images as u64);
                }
                Event::Hash(HashEvent::Progress(p)) => {
                    pb.set_position(p.completed as u64);
                    if verbose {
                        pb.set_message(
                            p.current_path
                                .file_name()
                                .unwrap_or_default()
                                .to_string_lossy()
                                .into_owned(),
                        );
                    }
                }
                Event::Hash(HashEvent::Skipped { path, message }) if verbose => {
                    pb.println(format!(
                        "{} {}: {}",
                        style("skipped").yellow(),
                        path.display(),
                        message
                    ));
                }
                Event::Pipeline(PipelineEvent::Completed { .. }) => {
                    pb.finish_and_clear();
                }
                _ => {}
            }
        }
    });

    let result = pipeline.run_with_events(&sender);

    // Drop sender to signal event thread to finish
    drop(sender);
    event_thread.join().ok();
    if let Some(pb) = progress {
        pb.finish_and_clear();
    }

    result
}

fn print_pretty_results(term: &Term, result: &PipelineResult, verbose: bool) {
    let stats = result.stats();

    term.write_line(&format!("{} Scan Complete", style("✓").green().bold()))
        .ok();
    term.write_line("").ok();

    term.write_line(&format!(
        "  {} images scanned in {:.1}s",
        style(result.total_images).cyan(),
        result.duration_ms as f64 / 1000.0
    ))
    .ok();

    if result.skipped > 0 {
        term.write_line(&format!(
            "  {} images could not be decoded",
            style(result.skipped).yellow()
        ))
        .ok();
    }

    term.write_line(&format!("Found {} duplicates", style(stats.duplicates).cyan()))
        .ok();

    term.write_line(&format!(
        "  {} groups, {} reclaimable",
        style(stats.groups).cyan(),
        style(format_bytes(stats.reclaimable_bytes)).yellow()
    ))
    .ok();
    term.write_line("").ok();

    if !verbose {
        return;
    }

    for (i, group) in result.groups.iter().enumerate() {
        term.write_line(&format!(
            "  {} {} ({} images, {:.1}% similar, {})",
            style(format!("Group {}:", i + 1)).bold(),
            style(group.match_type).yellow(),
            group.images.len(),
            group.similarity_percent,
            format_bytes(group.duplicate_size_bytes)
        ))
        .ok();

        for image in &group.images {
            let marker = if *image == group.representative {
                style("★").green().to_string()
            } else {
                style("○").dim().to_string()
            };
            term.write_line(&format!("    {} {}", marker, image.display()))
                .ok();
        }

        term.write_line("").ok();
    }
}

fn print_removal(term: &Term, report: &RemovalReport, dry_run: bool) {
    let (removed, freed) = if dry_run {
        ("files would be removed", "would be freed")
    } else {
        ("files removed", "freed")
    };
    term.write_line(&format!(
        "  {} {}, {} {}",
        style(report.removed.len()).cyan(),
        removed,
        style(format_bytes(report.freed_bytes)).yellow(),
        freed
    ))
    .ok();

    if dry_run {
        for path in &report.removed {
            term.write_line(&format!("    {} {}", style("○").dim(), path.display()))
                .ok();
        }
    }

    for failure in &report.failures {
        term.write_line(&format!("  {} {}", style("✗").red(), failure))
            .ok();
    }
}

/// Summary and groups as JSON; paths are rendered lossily
fn json_results(result: &PipelineResult) -> serde_json::Value {
    let stats = result.stats();
    let groups: Vec<serde_json::Value> = result
        .groups
        .iter()
        .map(|g| {
            serde_json::json!({
                "match_type": g.match_type.to_string(),
                "max_distance": g.max_distance,
                "similarity_percent": g.similarity_percent,
                "images": lossy_paths(&g.images),
                "representative": g.representative.to_string_lossy().into_owned(),
                "duplicate_size_bytes": g.duplicate_size_bytes,
            })
        })
        .collect();

    serde_json::json!({
        "total_images": result.total_images,
        "skipped_images": result.skipped,
        "duplicate_groups": stats.groups,
        "duplicate_count": stats.duplicates,
        "potential_savings_bytes": stats.reclaimable_bytes,
        "duration_ms": result.duration_ms,
        "groups": groups,
    })
}

fn print_minimal_results(result: &PipelineResult) {
    for group in &result.groups {
        for image in group.duplicates() {
            println!("{}", image.display());
        }
    }
}

fn format_bytes(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if bytes >= GB {
        format!("{:.1} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.1} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.1} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} bytes", bytes)
    }
}
