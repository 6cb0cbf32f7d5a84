//! CLI command for sprite extraction

use std::path::Path;
use std::time::Instant;

use anyhow::Context;

use crate::cli::progress::{DISK, LOOKING_GLASS, PICTURE, print_done, print_step, simple_bar};
use crate::extract::{
    CharacterOutcome, CharacterReport, ExtractConfig, ExtractPhase, RasterizerKind,
    SpriteExtractor,
};

/// Run the full extraction over every configured character
pub fn execute(config_path: Option<&Path>, builtin_raster: bool) -> anyhow::Result<()> {
    let started = Instant::now();

    print_step(1, 3, LOOKING_GLASS, "Loading configuration...");
    let mut config = ExtractConfig::load_or_default(config_path).with_context(|| match config_path {
        Some(path) => format!("Failed to load config {}", path.display()),
        None => "Failed to load built-in config".to_string(),
    })?;
    if builtin_raster {
        config.rasterizer = RasterizerKind::Builtin;
    }

    let decompressor = config.build_decompressor()?;
    let rasterizer = config.build_rasterizer();
    let extractor = SpriteExtractor::new(&config, decompressor.as_ref(), rasterizer.as_ref());

    print_step(
        2,
        3,
        PICTURE,
        &format!(
            "Extracting {} characters into {}...",
            config.characters.len(),
            config.output_dir.display()
        ),
    );
    let pb = simple_bar(config.characters.len() as u64, "Extracting");
    let summary = extractor
        .run(&|progress| match progress.phase {
            ExtractPhase::Extracting { frame, size } => {
                pb.set_message(format!("{} frame {frame} @ {size}", progress.label));
            }
            ExtractPhase::Done => pb.inc(1),
            phase => pb.set_message(format!("{} {}", progress.label, phase.as_str())),
        })
        .with_context(|| format!("Failed to prepare {}", config.output_dir.display()))?;
    pb.finish_and_clear();

    print_step(3, 3, DISK, "Results:");
    for report in &summary.characters {
        print_character(report);
    }
    println!();
    println!(
        "{} frames extracted, {} failed, {} characters skipped",
        summary.extracted_count(),
        summary.failed_count(),
        summary.skipped_count()
    );

    print_done(started.elapsed());
    Ok(())
}

fn print_character(report: &CharacterReport) {
    match &report.outcome {
        CharacterOutcome::Skipped(reason) => {
            println!("  {:10} skipped ({reason})", report.label);
        }
        CharacterOutcome::Extracted {
            compression,
            frames_found,
            frames,
            representative,
            ..
        } => {
            println!(
                "  {:10} {}/{} frames ({} found, {})",
                report.label,
                report.extracted_count(),
                frames.len(),
                frames_found,
                compression.as_str()
            );
            for frame in frames {
                match &frame.extracted {
                    Some(image) => println!("    frame {} -> {}", frame.index, image.path.display()),
                    None => println!("    frame {} failed at every size", frame.index),
                }
            }
            if let Some(path) = representative {
                println!("    representative -> {}", path.display());
            }
        }
    }
}
