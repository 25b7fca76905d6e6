//! `fnpack` command line entry point

mod cli;
mod commands;
mod tracing;

use crate::cli::parse;
use crate::commands::{Command, GlobalArgs};
use crate::tracing::TracingConfig;
use ::tracing::instrument;

#[tokio::main]
async fn main() -> miette::Result<()> {
    let cli = parse();

    crate::tracing::init_tracing(TracingConfig {
        format: cli.tracing_format(),
        level: cli.level.into(),
        ..Default::default()
    })?;

    let globals = GlobalArgs {
        node: cli.node,
        options: cli.options,
    };
    let command: Command = cli.command.into();

    execute_command(command, &globals).await
}

#[instrument(name = "fnpack", skip_all, fields(correlation_id = %crate::tracing::correlation_id()))]
async fn execute_command(command: Command, globals: &GlobalArgs) -> miette::Result<()> {
    commands::execute(command, globals).await
}
