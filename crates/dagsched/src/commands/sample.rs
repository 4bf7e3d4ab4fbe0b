use crate::errors::Result;
use crate::loader::{sample_tasks, save_tasks};
use crate::report::emit;
use std::path::Path;
use tracing::info;

/// Write the sample task file to `file`.
pub fn execute(file: &Path) -> Result<()> {
    let tasks = sample_tasks();
    save_tasks(file, &tasks)?;
    info!(path = %file.display(), tasks = tasks.len(), "Sample task file created");

    emit(&format!(
        "Sample task file with {} tasks written to {}",
        tasks.len(),
        file.display()
    ))
}
