#[cfg(feature = "completions")]
use clap::CommandFactory;

use crate::cli::{Cli, Commands};
#[cfg(feature = "serve")]
use crate::commands::{run_serve, ServeOptions};
use crate::commands::{
    run_duration, run_escape, run_fetch, run_inspect, run_query, run_summary, run_toggle,
    FetchOptions, QueryOptions, SummaryOptions, ToggleOptions,
};
use crate::config::{load_config, render_config, ResolvedConfig};
use crate::error::Result;

pub fn run(cli: Cli) -> Result<()> {
    let config = load_config()?;
    let resolved = ResolvedConfig::from_config(&config);

    match cli.command {
        Commands::Fetch {
            name,
            partition,
            base,
            timeout_secs,
            compact,
        } => {
            let defaults = &resolved.fetch;
            let options = FetchOptions {
                base: base.unwrap_or_else(|| defaults.base.clone()),
                partition: partition.or(defaults.partition),
                timeout_secs: timeout_secs.unwrap_or(defaults.timeout_secs),
                compact: compact || defaults.compact,
            };
            run_fetch(&name, &options)
        }

        Commands::Query { url, format } => {
            let options = QueryOptions {
                format: format.unwrap_or(resolved.query.format),
            };
            run_query(&url, &options)
        }

        Commands::Duration { millis } => run_duration(&millis),

        Commands::Escape { text } => run_escape(&text),

        Commands::Toggle {
            title,
            content,
            closed,
            raw_title,
        } => {
            let options = ToggleOptions {
                content,
                closed,
                raw_title,
            };
            run_toggle(&title, &options)
        }

        Commands::Inspect { input } => run_inspect(&input),

        Commands::Summary {
            name,
            partition,
            base,
            timeout_secs,
            output,
            title,
        } => {
            let fetch_defaults = &resolved.fetch;
            let defaults = &resolved.summary;
            let options = SummaryOptions {
                fetch: FetchOptions {
                    base: base.unwrap_or_else(|| fetch_defaults.base.clone()),
                    partition: partition.or(fetch_defaults.partition),
                    timeout_secs: timeout_secs.unwrap_or(fetch_defaults.timeout_secs),
                    compact: fetch_defaults.compact,
                },
                name: name.unwrap_or_else(|| defaults.name.clone()),
                output: output.or_else(|| defaults.output.clone()),
                title: title.unwrap_or_else(|| defaults.title.clone()),
            };
            run_summary(&options)
        }

        #[cfg(feature = "serve")]
        Commands::Serve { root, bind, port } => {
            let defaults = &resolved.serve;
            let options = ServeOptions {
                bind: bind.unwrap_or_else(|| defaults.bind.clone()),
                port: port.unwrap_or(defaults.port),
            };
            run_serve(root, &options)
        }

        Commands::Config => {
            let rendered = render_config(&resolved)?;
            println!("{rendered}");
            Ok(())
        }

        #[cfg(feature = "completions")]
        Commands::Completions { shell } => {
            let mut cmd = Cli::command();
            clap_complete::generate(shell, &mut cmd, "resultview", &mut std::io::stdout());
            Ok(())
        }
    }
}
