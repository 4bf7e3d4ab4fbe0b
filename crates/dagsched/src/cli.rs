use crate::commands::Command;
use crate::report::OutputFormat;
use crate::tracing::{LogLevel, TracingFormat};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "dagsched")]
#[command(
    about = "Analyze task dependency graphs: cycles, condensation, execution order and critical path"
)]
#[command(long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[arg(
        short = 'l',
        long,
        global = true,
        help = "Set logging level",
        default_value = "warn",
        env = "DAGSCHED_LOG_LEVEL",
        value_enum
    )]
    pub level: LogLevel,

    #[arg(long, global = true, help = "Output logs in JSON format")]
    pub json: bool,

    #[arg(
        long,
        global = true,
        help = "Log output format (overrides --json)",
        value_enum
    )]
    pub log_format: Option<TracingFormat>,
}

impl Cli {
    /// The log format selected by `--log-format` and `--json`.
    pub fn tracing_format(&self) -> TracingFormat {
        match self.log_format {
            Some(format) => format,
            None if self.json => TracingFormat::Json,
            None => TracingFormat::Compact,
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    #[command(about = "Analyze a task file")]
    Analyze {
        #[arg(help = "Path to the JSON task file")]
        file: PathBuf,
        #[arg(
            long,
            short = 's',
            help = "Task whose component is the shortest-path source (default: component 0)"
        )]
        source: Option<String>,
        #[arg(
            long,
            short = 't',
            help = "Task whose component is the point-to-point target"
        )]
        target: Option<String>,
        #[arg(
            long,
            short = 'o',
            help = "Report format",
            default_value = "text",
            value_enum
        )]
        output: OutputFormat,
    },
    #[command(about = "Write the twelve-task sample graph")]
    Sample {
        #[arg(help = "Where to write the task file", default_value = "tasks.json")]
        file: PathBuf,
    },
    #[command(about = "Generate the nine synthetic datasets")]
    Generate {
        #[arg(
            long,
            short = 'd',
            help = "Directory for the generated files",
            default_value = "data"
        )]
        output_dir: PathBuf,
        #[arg(long, help = "Random seed", default_value_t = crate::generator::DEFAULT_SEED)]
        seed: u64,
    },
}

impl From<Commands> for Command {
    fn from(cmd: Commands) -> Self {
        match cmd {
            Commands::Analyze {
                file,
                source,
                target,
                output,
            } => Self::Analyze {
                file,
                source,
                target,
                output,
            },
            Commands::Sample { file } => Self::Sample { file },
            Commands::Generate { output_dir, seed } => Self::Generate { output_dir, seed },
        }
    }
}

pub fn parse() -> Cli {
    Cli::parse()
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn test_cli_default_values() {
        let cli = Cli::try_parse_from(["dagsched", "analyze", "tasks.json"]).unwrap();

        assert_eq!(cli.level, LogLevel::Warn);
        assert!(!cli.json);
        assert_eq!(cli.tracing_format(), TracingFormat::Compact);
        match cli.command {
            Commands::Analyze {
                file,
                source,
                target,
                output,
            } => {
                assert_eq!(file, PathBuf::from("tasks.json"));
                assert!(source.is_none());
                assert!(target.is_none());
                assert_eq!(output, OutputFormat::Text);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_cli_log_level_parsing() {
        let cli = Cli::try_parse_from(["dagsched", "--level", "trace", "sample"]).unwrap();
        assert_eq!(cli.level, LogLevel::Trace);

        let cli = Cli::try_parse_from(["dagsched", "-l", "debug", "sample"]).unwrap();
        assert_eq!(cli.level, LogLevel::Debug);

        // Global flags are accepted after the subcommand too
        let cli = Cli::try_parse_from(["dagsched", "sample", "-l", "error"]).unwrap();
        assert_eq!(cli.level, LogLevel::Error);
    }

    #[test]
    fn test_log_format_selection() {
        let cli = Cli::try_parse_from(["dagsched", "--json", "sample"]).unwrap();
        assert_eq!(cli.tracing_format(), TracingFormat::Json);

        let cli =
            Cli::try_parse_from(["dagsched", "--json", "--log-format", "dev", "sample"]).unwrap();
        assert_eq!(cli.tracing_format(), TracingFormat::Dev);
    }

    #[test]
    fn test_analyze_options() {
        let cli = Cli::try_parse_from([
            "dagsched", "analyze", "g.json", "--source", "T1", "--target", "T9", "-o", "json",
        ])
        .unwrap();

        let command: Command = cli.command.into();
        match command {
            Command::Analyze {
                source,
                target,
                output,
                ..
            } => {
                assert_eq!(source.as_deref(), Some("T1"));
                assert_eq!(target.as_deref(), Some("T9"));
                assert_eq!(output, OutputFormat::Json);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_generate_defaults() {
        let cli = Cli::try_parse_from(["dagsched", "generate"]).unwrap();
        match cli.command {
            Commands::Generate { output_dir, seed } => {
                assert_eq!(output_dir, PathBuf::from("data"));
                assert_eq!(seed, 42);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_sample_default_path() {
        let cli = Cli::try_parse_from(["dagsched", "sample"]).unwrap();
        assert!(matches!(cli.command, Commands::Sample { file } if file == PathBuf::from("tasks.json")));
    }

    #[test]
    fn test_invalid_log_level() {
        let result = Cli::try_parse_from(["dagsched", "--level", "invalid", "sample"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_invalid_output_format() {
        let result = Cli::try_parse_from(["dagsched", "analyze", "g.json", "--output", "xml"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_missing_subcommand() {
        let result = Cli::try_parse_from(["dagsched"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_help_flag() {
        let err = Cli::try_parse_from(["dagsched", "--help"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::DisplayHelp);
    }
}
