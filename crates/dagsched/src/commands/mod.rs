pub mod analyze;
pub mod generate;
pub mod sample;

use crate::errors::Result;
use crate::report::OutputFormat;
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub enum Command {
    Analyze {
        file: PathBuf,
        source: Option<String>,
        target: Option<String>,
        output: OutputFormat,
    },
    Sample {
        file: PathBuf,
    },
    Generate {
        output_dir: PathBuf,
        seed: u64,
    },
}

impl Command {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Analyze { .. } => "analyze",
            Self::Sample { .. } => "sample",
            Self::Generate { .. } => "generate",
        }
    }
}

pub fn execute(command: Command) -> Result<()> {
    match command {
        Command::Analyze {
            file,
            source,
            target,
            output,
        } => analyze::execute(&file, source.as_deref(), target.as_deref(), output),
        Command::Sample { file } => sample::execute(&file),
        Command::Generate { output_dir, seed } => generate::execute(&output_dir, seed),
    }
}
