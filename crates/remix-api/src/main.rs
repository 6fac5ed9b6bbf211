//! Post remix CLI and HTTP server entry point.
//!
//! Binary name: `remix`
//!
//! Parses CLI arguments, sets up tracing, loads config and the database,
//! then dispatches to a command handler or starts the HTTP server.

mod cli;
mod http;
mod state;

use clap::Parser;
use clap_complete::generate;
use remix_observe::{TracingOptions, init_tracing, shutdown_tracing};

use cli::generate::GenerateArgs;
use cli::{Cli, Commands, DeleteResource, EditResource, ListResource};
use state::{AppState, Overrides};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // ANTHROPIC_API_KEY may live in a local .env.
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let mut tracing_options = TracingOptions::for_verbosity(cli.verbose, cli.quiet);
    tracing_options.otel = cli.otel;
    if let Commands::Serve { log_json, .. } = &cli.command {
        tracing_options.json = *log_json;
    }
    init_tracing(&tracing_options).map_err(|e| anyhow::anyhow!(e))?;

    // Shell completions don't need app state
    if let Commands::Completions { shell } = &cli.command {
        let mut cmd = <Cli as clap::CommandFactory>::command();
        generate(*shell, &mut cmd, "remix", &mut std::io::stdout());
        return Ok(());
    }

    let overrides = Overrides {
        data_dir: cli.data_dir.clone(),
        model: cli.model.clone(),
        remote_url: cli.remote.clone(),
    };
    let state = AppState::init(&overrides).await?;

    let result = run(cli, state).await;
    shutdown_tracing();
    result
}

async fn run(cli: Cli, state: AppState) -> anyhow::Result<()> {
    match cli.command {
        Commands::Generate {
            text,
            file,
            platform,
            prompt,
            save,
            no_interactive,
        } => {
            let args = GenerateArgs {
                text,
                file,
                platform,
                prompt,
                save,
                no_interactive,
            };
            cli::generate::generate(&state, args, cli.json).await?;
        }

        Commands::List { resource } => match resource {
            ListResource::Posts { platform, limit } => {
                cli::post::list_posts(&state, platform, limit, cli.json).await?;
            }
        },

        Commands::Show { id } => {
            cli::post::show_post(&state, &id, cli.json).await?;
        }

        Commands::Edit { resource } => match resource {
            EditResource::Post { id, content } => {
                cli::post::edit_post(&state, &id, content, cli.json).await?;
            }
        },

        Commands::Delete { resource } => match resource {
            DeleteResource::Post { id, force } => {
                cli::post::delete_post(&state, &id, force, cli.json).await?;
            }
        },

        Commands::Share { id, page_url } => {
            cli::post::share_post(&state, &id, page_url.as_deref(), cli.json).await?;
        }

        Commands::Check => {
            cli::check::check(&state, cli.json).await?;
        }

        Commands::Serve { port, host, .. } => {
            let host = host.unwrap_or_else(|| state.config.server.host.clone());
            let port = port.unwrap_or(state.config.server.port);
            let addr = format!("{host}:{port}");
            let listener = tokio::net::TcpListener::bind(&addr).await?;

            match &state.provider {
                Ok(provider) => tracing::info!(
                    provider = provider.name(),
                    model = provider.model().unwrap_or("unknown"),
                    "Serving generation requests"
                ),
                Err(e) => tracing::warn!(error = %e, "No generation provider; /remix will fail"),
            }

            if !cli.quiet {
                println!(
                    "  {} Remix server listening on {}",
                    console::style("⚡").bold(),
                    console::style(format!("http://{addr}")).cyan()
                );
                println!("  {}", console::style("Press Ctrl+C to stop").dim());
            }

            let pool = state.db_pool.clone();
            let router = http::router::build_router(state);

            axum::serve(listener, router)
                .with_graceful_shutdown(shutdown_signal())
                .await?;

            pool.close().await;
            if !cli.quiet {
                println!("\n  Server stopped.");
            }
        }

        Commands::Completions { .. } => unreachable!("handled above"),
    }

    Ok(())
}

/// Wait for Ctrl+C or SIGTERM for graceful shutdown.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
