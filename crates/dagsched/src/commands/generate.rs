use crate::errors::Result;
use crate::generator::generate_all;
use crate::report::{emit, render_datasets};
use std::path::Path;
use tracing::info;

/// Generate every dataset into `output_dir` from `seed`.
pub fn execute(output_dir: &Path, seed: u64) -> Result<()> {
    info!(dir = %output_dir.display(), seed, "Generating datasets");
    let summaries = generate_all(output_dir, seed)?;
    emit(&render_datasets(&summaries))
}
