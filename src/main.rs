use buffer_pipeline::config::{Cli, OutputFormat};
use buffer_pipeline::framework::{JsonLinesSink, ProgressSink, TracingSink};
use buffer_pipeline::lifecycle::tracing::setup_tracing;
use buffer_pipeline::lifecycle::{shutdown_signal, PipelineSystem};
use clap::{CommandFactory, Parser};
use std::process::ExitCode;
use std::sync::Arc;
use tracing::{error, info};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            if let Err(print_err) = e.print() {
                eprintln!("{e}\n(failed to write usage: {print_err})");
            }
            // --help and --version are not failures
            return if e.use_stderr() {
                ExitCode::from(1)
            } else {
                ExitCode::SUCCESS
            };
        }
    };

    let config = match cli.into_config() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("error: {e}\n\n{}", Cli::command().render_usage());
            return ExitCode::from(1);
        }
    };

    setup_tracing(config.format);
    info!(?config, "Starting buffer pipeline");

    let sink: Arc<dyn ProgressSink> = match config.format {
        OutputFormat::Text => Arc::new(TracingSink),
        OutputFormat::Json => Arc::new(JsonLinesSink::stdout()),
    };

    let system = match PipelineSystem::start(config, sink) {
        Ok(system) => system,
        Err(e) => {
            error!(error = %e, "Failed to start pipeline");
            return ExitCode::from(1);
        }
    };

    match system.run_until(shutdown_signal()).await {
        Ok(stats) => {
            info!(?stats, "Application completed successfully");
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!(error = %e, "Pipeline did not shut down cleanly");
            ExitCode::from(1)
        }
    }
}
