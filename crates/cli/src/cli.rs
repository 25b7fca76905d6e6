use crate::commands::Command;
use crate::tracing::LogLevel;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "fnpack")]
#[command(about = "Package Node.js entrypoints into self-contained function artifacts")]
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
        default_value = "info",
        value_enum
    )]
    pub level: LogLevel,

    #[arg(
        long,
        global = true,
        help = "Log output format",
        default_value = "compact",
        value_enum
    )]
    pub format: crate::tracing::TracingFormat,

    #[arg(long, global = true, help = "Output logs in JSON format")]
    pub json: bool,

    #[arg(
        long,
        global = true,
        env = "FNPACK_NODE",
        help = "Node.js executable used to drive the bundler"
    )]
    pub node: Option<String>,

    #[arg(
        long,
        global = true,
        help = "JSON file with builder options (nccVersion, buildScript, ...)"
    )]
    pub options: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    #[command(about = "Build a function artifact for one entrypoint")]
    Build {
        #[arg(long, short = 's', help = "Directory holding the source files", default_value = ".")]
        source: PathBuf,
        #[arg(long, short = 'e', help = "Entrypoint path relative to the source directory")]
        entrypoint: String,
        #[arg(
            long,
            env = "FNPACK_WORK_PATH",
            help = "Scratch directory for staging (must be writable)"
        )]
        work_path: PathBuf,
        #[arg(long, short = 'o', help = "Directory the artifact is written to")]
        out: PathBuf,
    },
    #[command(about = "Install dependencies into a cache directory and list the cacheable files")]
    PrepareCache {
        #[arg(long, short = 's', help = "Directory holding the source files", default_value = ".")]
        source: PathBuf,
        #[arg(long, short = 'e', help = "Entrypoint path relative to the source directory")]
        entrypoint: String,
        #[arg(
            long,
            env = "FNPACK_CACHE_PATH",
            help = "Directory the dependency cache is prepared in"
        )]
        cache_path: PathBuf,
        #[arg(long, help = "Write the cache manifest as JSON to this file instead of stdout")]
        manifest: Option<PathBuf>,
    },
}

impl From<Commands> for Command {
    fn from(cmd: Commands) -> Self {
        match cmd {
            Commands::Build {
                source,
                entrypoint,
                work_path,
                out,
            } => Self::Build {
                source,
                entrypoint,
                work_path,
                out,
            },
            Commands::PrepareCache {
                source,
                entrypoint,
                cache_path,
                manifest,
            } => Self::PrepareCache {
                source,
                entrypoint,
                cache_path,
                manifest,
            },
        }
    }
}

impl Cli {
    /// Effective log format; `--json` wins over `--format`
    pub fn tracing_format(&self) -> crate::tracing::TracingFormat {
        if self.json {
            crate::tracing::TracingFormat::Json
        } else {
            self.format
        }
    }
}

pub fn parse() -> Cli {
    Cli::parse()
}
