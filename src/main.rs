use std::process;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use resultview::alert::StderrAlerter;
use resultview::cli::Cli;
use resultview::error::ReportError;
use resultview::fetch::report_failure;
use resultview::router;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("resultview=warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    if let Err(e) = router::run(cli) {
        match e {
            ReportError::Aborted { .. } => {}
            ReportError::Transport { .. } => {
                report_failure(&e, &StderrAlerter);
                process::exit(1);
            }
            other => {
                eprintln!("Error: {}", other);
                process::exit(1);
            }
        }
    }
}
