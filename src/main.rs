use contact_relay::{config, service::ContactService, transport::SmtpMailer};

use tracing_subscriber::EnvFilter;

use std::sync::Arc;

#[tokio::main]
async fn main() {
    // Log setup
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,tower_http=debug")),
        )
        .init();

    // Load config
    let cfg = config::load_config().expect("failed to locate or load config file");
    tracing::info!("Successfully loaded contact relay config: {:?}", cfg);

    // Setup transport
    let mailer = SmtpMailer::new(&cfg).unwrap_or_else(|e| {
        tracing::error!("Failed to set up SMTP transport: {e}");
        panic!("failed to set up SMTP transport: {e}");
    });

    match mailer.verify().await {
        Ok(()) => tracing::info!("SMTP relay {} is reachable", cfg.smtp_host),
        Err(e) => tracing::warn!("SMTP relay {} could not be verified: {e}", cfg.smtp_host),
    }

    // Setup service
    let service = ContactService::from_config(Box::new(mailer), &cfg).unwrap_or_else(|e| {
        tracing::error!("Invalid mail addresses in config: {e}");
        panic!("invalid mail addresses in config: {e}");
    });
    let service_ptr = Arc::new(service);

    // Setup router
    let router = contact_relay::router(service_ptr);

    // Start server
    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", cfg.port))
        .await
        .expect("Failed to bind to address");
    let addr = listener
        .local_addr()
        .expect("Failed to read listener address");

    tracing::info!("Contact relay starting, listening on {}", addr);

    axum::serve(listener, router)
        .await
        .expect("Failed to start server");
}
