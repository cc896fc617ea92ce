//! Default binary entry point.
//!
//! Loads [`MinumConfig`] from the environment, wires up the static file
//! cache and the Brig, and launches the server until `SIGINT`/`SIGTERM`.
//! Applications that need custom routes should depend on the `minum`
//! library instead and build their own [`HandlerRegistry`].

use minum::{config::MinumConfig, registry::HandlerRegistry, static_files::StaticFilesCache, Server};
use tokio::net::TcpListener;
use tracing::{info, warn};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    let config = MinumConfig::from_env();

    let static_files = match StaticFilesCache::from_dir(&config.static_files.directory) {
        Ok(cache) => cache,
        Err(err) => {
            warn!(
                dir = %config.static_files.directory.display(),
                %err,
                "static files directory not loaded, serving without it"
            );
            StaticFilesCache::default()
        }
    };

    let brig = minum::IntrusionDetector::new(config.brig.clone());

    let plaintext_listener = match TcpListener::bind((config.host, config.port)).await {
        Ok(listener) => listener,
        Err(err) => {
            eprintln!("failed to bind {}:{}: {err}", config.host, config.port);
            std::process::exit(1);
        }
    };
    info!(host = %config.host, port = config.port, "listening");

    let plaintext_registry = HandlerRegistry::<()>::new()
        .static_files(static_files.clone())
        .brig(brig.clone());

    let plaintext = Server::builder()
        .listener(plaintext_listener)
        .handler(plaintext_registry)
        .server_limits(config.server_limits.clone())
        .connection_limits(config.connection_limits.clone())
        .request_limits(config.request_limits.clone())
        .response_limits(config.response_limits.clone())
        .build();

    let plaintext_done = plaintext.launch_until(async {
        let _ = tokio::signal::ctrl_c().await;
        info!("shutdown signal received");
    });

    match &config.tls {
        Some(tls) => {
            let tls_listener = match TcpListener::bind((config.host, tls.port)).await {
                Ok(listener) => listener,
                Err(err) => {
                    eprintln!("failed to bind {}:{}: {err}", config.host, tls.port);
                    std::process::exit(1);
                }
            };
            info!(host = %config.host, port = tls.port, "listening (tls)");

            let tls_registry = HandlerRegistry::<()>::new()
                .static_files(static_files)
                .brig(brig);

            let tls_builder = match Server::builder()
                .listener(tls_listener)
                .handler(tls_registry)
                .server_limits(config.server_limits.clone())
                .connection_limits(config.connection_limits.clone())
                .request_limits(config.request_limits.clone())
                .response_limits(config.response_limits.clone())
                .tls_from_pem(&tls.cert_path, &tls.key_path)
            {
                Ok(builder) => builder,
                Err(err) => {
                    eprintln!("failed to load TLS cert/key: {err}");
                    std::process::exit(1);
                }
            };

            let tls_done = tls_builder.build().launch_until(async {
                let _ = tokio::signal::ctrl_c().await;
                info!("shutdown signal received (tls)");
            });

            tokio::join!(plaintext_done, tls_done);
        }
        None => plaintext_done.await,
    }
}
