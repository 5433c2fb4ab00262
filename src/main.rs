use anyhow::{Context, Result};
use clap::Parser;
use dotenvy::dotenv;
use tracing::info;
use tracing_subscriber::EnvFilter;

use mediaforge::config::settings::AppConfig;
use mediaforge::modules::conversion::service::ConversionService;
use mediaforge::state::AppState;

mod cli;

use cli::{Cli, Commands};

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();

    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .init();

    let config = AppConfig::new();

    match cli.command {
        Commands::Serve { host, port } => serve(config, host, port).await,
        Commands::Outputs { job_id } => {
            let res = ConversionService::list_outputs(AppState::new(config), &job_id).await?;
            for name in res.outputs {
                println!("{name}");
            }
            Ok(())
        }
        Commands::CheckTools => check_tools(&config),
        command => {
            let (request, output_dir) = cli::conversion_request(command)
                .context("not a conversion command")??;

            let outputs = ConversionService::convert_to_dir(AppState::new(config), request, output_dir).await?;

            info!("Conversion complete: {} file(s)", outputs.len());
            for path in outputs {
                println!("{}", path.display());
            }
            Ok(())
        }
    }
}

async fn serve(config: AppConfig, host: Option<String>, port: Option<u16>) -> Result<()> {
    let host = host.unwrap_or_else(|| config.server_host.clone());
    let port = port.unwrap_or(config.server_port);

    info!("Starting server...");

    let app = mediaforge::app::create_app(AppState::new(config));

    let listener = tokio::net::TcpListener::bind((host.as_str(), port))
        .await
        .with_context(|| format!("failed to bind {host}:{port}"))?;
    info!("Server running on http://{}:{}", host, port);

    axum::serve(listener, app).await?;
    Ok(())
}

fn check_tools(config: &AppConfig) -> Result<()> {
    let mut missing = Vec::new();

    for tool in [&config.ffmpeg_bin, &config.ytdlp_bin] {
        match which::which(tool) {
            Ok(path) => println!("{tool}: {}", path.display()),
            Err(_) => {
                println!("{tool}: not found");
                missing.push(tool.as_str());
            }
        }
    }

    if missing.is_empty() {
        Ok(())
    } else {
        anyhow::bail!("missing tools: {}", missing.join(", "))
    }
}
