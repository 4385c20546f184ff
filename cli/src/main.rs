//! zcp: operations helper for Zerops projects

use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;
use zcp_cli::cli::Cli;
use zcp_cli::domain::error::ZcpError;
use zcp_cli::output::OutputContext;
use zcp_cli::output::json::format_error;

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let flags = cli.output_flags();
    match cli.run().await {
        Ok(code) => code,
        Err(e) => {
            if flags.json {
                match format_error(&e) {
                    Ok(obj) => println!("{obj}"),
                    Err(_) => eprintln!("Error: {e:#}"),
                }
            } else {
                let ctx = OutputContext::new(flags.no_color, flags.quiet);
                ctx.error(&format!("Error: {e:#}"));
                if let Some(hint) = e
                    .downcast_ref::<ZcpError>()
                    .map(|z| z.suggestion.as_str())
                    .filter(|s| !s.is_empty())
                {
                    eprintln!("    {hint}");
                }
            }
            ExitCode::FAILURE
        }
    }
}
