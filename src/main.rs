//! policy-controller-webhook - validating admission webhook for
//! PolicyController custom resources.
//!
//! This is the main entry point that:
//! - Initializes structured logging
//! - Resolves the gateway configuration from the environment
//! - Starts the health server and the TLS webhook server

use std::sync::Arc;

use tokio::signal;
use tracing::{error, info};

use policy_controller_webhook::GatewayConfig;
use policy_controller_webhook::health::{HealthState, run_health_server};
use policy_controller_webhook::webhooks::{WebhookState, run_webhook_server};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing subscriber
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("policy_controller_webhook=info".parse()?),
        )
        .json()
        .init();

    info!("Starting policy-controller admission webhook");

    let config = GatewayConfig::from_env();
    info!(
        governed = %config.governed_identity(),
        install_namespace = %config.install_namespace,
        addr = %config.listen_addr,
        "Resolved gateway configuration"
    );

    // Shared health state; probes work even before the webhook is up
    let health_state = Arc::new(HealthState::new());

    let health_handle = {
        let health_state = health_state.clone();
        tokio::spawn(async move {
            if let Err(e) = run_health_server(health_state).await {
                error!("Health server error: {}", e);
            }
        })
    };

    let webhook_state = Arc::new(WebhookState::new(config, health_state.clone()));
    let webhook_handle = tokio::spawn(async move {
        if let Err(e) = run_webhook_server(webhook_state).await {
            error!("Webhook server error: {}", e);
        }
    });

    health_state.set_ready(true).await;

    // Wait for any task to complete (or fail), or shutdown signal
    tokio::select! {
        result = webhook_handle => {
            if let Err(e) = result {
                error!("Webhook server task panicked: {}", e);
            }
        }
        result = health_handle => {
            if let Err(e) = result {
                error!("Health server task panicked: {}", e);
            }
        }
        _ = shutdown_signal() => {
            info!("Received shutdown signal, shutting down");
            health_state.set_ready(false).await;
        }
    }

    info!("Webhook stopped");
    Ok(())
}

/// Wait for shutdown signal (SIGTERM or SIGINT)
///
/// Note: Signal handler setup failures are fatal - the webhook cannot shut
/// down gracefully without them. Using expect() here is intentional.
#[allow(clippy::expect_used)]
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
