//! Flotilla CLI entry point.

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use flotilla::cli::{self, Cli, Commands};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match cli::load_config(cli.config.as_deref()) {
        Ok(config) => config,
        Err(err) => {
            cli::handle_error(err, cli.json);
            return;
        }
    };

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.logging.level.clone()));
    if config.logging.format == "json" {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr),
            )
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }

    let controller = cli::build_controller(&config);

    let result = match cli.command {
        Commands::Init { force } => cli::commands::init::execute(force, cli.json).await,
        Commands::Fleet {
            image,
            task,
            name,
            instances,
            targets_file,
            wait,
            region,
            rm_when_done,
        } => {
            cli::commands::fleet::execute(
                &controller,
                image,
                task,
                name,
                instances,
                targets_file,
                wait,
                region,
                rm_when_done,
                cli.json,
            )
            .await
        }
        Commands::Run {
            name,
            image,
            task,
            duration,
            cleanup,
            region,
        } => {
            cli::commands::run::execute(
                &controller,
                name,
                image,
                task,
                duration,
                cleanup,
                region,
                cli.json,
            )
            .await
        }
        Commands::Ls => cli::commands::ls::execute(&controller, cli.json).await,
        Commands::Exec {
            pattern,
            task,
            wait,
            targets_file,
        } => {
            cli::commands::exec::execute(&controller, pattern, task, wait, targets_file, cli.json)
                .await
        }
        Commands::Rm { pattern } => {
            cli::commands::rm::execute(&controller, pattern, cli.json).await
        }
    };

    if let Err(err) = result {
        cli::handle_error(err, cli.json);
    }
}
