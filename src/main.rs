use anyhow::{Context, Result};
use std::env;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

mod config;
mod coordinator;
mod device;
mod formatter;
mod handlers;
mod integration;
mod routes;
mod sensor;

use config::{AppConfig, DeviceSettings};
use formatter::JsonFormatter;
use integration::Integration;

fn usage(program: &str) {
    eprintln!("Usage: {program} [SUBCOMMAND] [OPTIONS]");
    eprintln!("Subcommands:");
    eprintln!("    serve [config.yaml]   poll the device and serve its sensors over HTTP");
    eprintln!("    probe <host>          check that the device answers");
    eprintln!("    fetch <host> [--raw]  poll once and print the sensors (or the raw payload) as JSON");
    eprintln!("Environment: RENSON_HOST, RENSON_NAME, RENSON_SCAN_INTERVAL, RENSON_LISTEN, RUST_LOG");
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();
}

async fn serve(config_path: Option<PathBuf>) -> Result<()> {
    let config = AppConfig::load(config_path.as_deref())?;

    integration::validate_input(&config.device)
        .await
        .context("device check failed")?;
    let mut integration = Integration::setup(&config)
        .await
        .context("device setup failed")?;
    integration.start();

    let state = Arc::new(integration);
    let app = routes::create_router(Arc::clone(&state));

    let listener = tokio::net::TcpListener::bind(config.listen())
        .await
        .with_context(|| format!("could not listen on {}", config.listen()))?;
    tracing::info!("listening at http://{}/", config.listen());

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            tracing::info!("shutting down");
        })
        .await
        .context("HTTP server failed")?;

    // The router is gone; dropping the last reference stops polling
    drop(state);
    Ok(())
}

async fn probe(host: String) -> Result<()> {
    let device = DeviceSettings {
        host,
        ..Default::default()
    };
    match integration::validate_input(&device).await {
        Ok(device) => {
            println!("{}: ok", device.host);
            Ok(())
        }
        Err(err) => {
            println!("{}: {}", device.host.trim(), err.code());
            Err(err.into())
        }
    }
}

async fn fetch(host: String, raw: bool) -> Result<()> {
    let mut config = AppConfig::load(None)?;
    config.device.host = host;

    let integration = Integration::setup(&config).await?;
    if raw {
        let snapshot = integration
            .coordinator()
            .last_snapshot()
            .context("no snapshot after setup")?;
        println!("{}", serde_json::to_string_pretty(&*snapshot)?);
    } else {
        println!("{}", JsonFormatter::to_json_string(&integration)?);
    }
    Ok(())
}

async fn entry() -> Result<(), ()> {
    let mut args = env::args();
    let program = args.next().unwrap_or_else(|| "renson-sense".to_string());

    let subcommand = args.next().ok_or_else(|| {
        usage(&program);
        eprintln!("ERROR: no subcommand is provided");
    })?;

    let result = match subcommand.as_str() {
        "serve" => serve(args.next().map(PathBuf::from)).await,
        "probe" | "fetch" => {
            let host = args.next().ok_or_else(|| {
                usage(&program);
                eprintln!("ERROR: '{subcommand}' requires a host");
            })?;
            if subcommand == "probe" {
                probe(host).await
            } else {
                let raw = args.next().map(|a| a == "--raw").unwrap_or(false);
                fetch(host, raw).await
            }
        }
        _ => {
            usage(&program);
            eprintln!("ERROR: unknown subcommand {subcommand}");
            return Err(());
        }
    };

    result.map_err(|err| {
        tracing::error!("{err:#}");
    })
}

#[tokio::main]
async fn main() -> ExitCode {
    init_tracing();

    match entry().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(()) => ExitCode::FAILURE,
    }
}
