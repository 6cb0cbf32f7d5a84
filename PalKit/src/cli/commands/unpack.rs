//! CLI command for splitting MKF archives

use std::path::Path;
use std::time::Instant;

use crate::cli::progress::{PACKAGE, print_done, print_step};
use crate::formats::unpack_mkf;

/// Write every non-empty sub-file of `source` into `destination`
pub fn execute(source: &Path, destination: &Path, prefix: &str, ext: &str) -> anyhow::Result<()> {
    let started = Instant::now();

    print_step(1, 1, PACKAGE, &format!("Unpacking {}...", source.display()));
    let written = unpack_mkf(source, destination, prefix, ext)?;

    println!("Wrote {} files to {}", written.len(), destination.display());
    print_done(started.elapsed());
    Ok(())
}
