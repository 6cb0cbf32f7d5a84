//! CLI command for inspecting a sprite archive's frame table

use std::path::Path;

use crate::cli::progress::simple_spinner;
use crate::compression::{Compression, decompress_if_marked};
use crate::extract::{ExtractConfig, read_archive};
use crate::formats::{declared_frame_count, parse_frames};

/// Print the frame table of `source`
pub fn execute(source: &Path, no_decompress: bool, config_path: Option<&Path>) -> anyhow::Result<()> {
    let data = read_archive(source)?;
    let raw_len = data.len();

    let (compression, decoded) = if no_decompress || Compression::detect(&data) == Compression::Raw {
        (Compression::Raw, data)
    } else {
        let config = ExtractConfig::load_or_default(config_path)?;
        let decompressor = config.build_decompressor()?;
        let spinner = simple_spinner("Decompressing YJ_1 data...");
        let result = decompress_if_marked(data, decompressor.as_ref());
        spinner.finish_and_clear();
        result?
    };

    let frames = parse_frames(&decoded);

    println!("Archive: {}", source.display());
    println!("Size: {raw_len} bytes ({})", compression.as_str());
    if compression == Compression::Yj1 {
        println!("Decompressed: {} bytes", decoded.len());
    }
    match declared_frame_count(&decoded) {
        Some(count) => println!("Declared frames: {count}"),
        None => println!("Declared frames: none (buffer too short)"),
    }
    println!("Valid frames: {}", frames.len());
    println!();

    if frames.is_empty() {
        return Ok(());
    }

    println!("{:>6}  {:>8}  {:>8}", "index", "offset", "size");
    for frame in &frames {
        println!("{:>6}  {:>8}  {:>8}", frame.index, frame.offset, frame.size());
    }

    Ok(())
}
