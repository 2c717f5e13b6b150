use anyhow::Context;
use clap::Parser;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use signin_backend::auth::GoogleClient;
use signin_backend::config::AppConfig;
use signin_backend::notify::{Notifier, SmtpMailer};
use signin_backend::{routes, AppState};

#[derive(Parser)]
#[command(name = "signin-backend")]
#[command(about = "Google sign-in backend issuing short-lived session tokens")]
struct Cli {
    /// Address the HTTP server listens on.
    #[arg(short, long, default_value = "127.0.0.1:3000", env = "BIND_ADDR")]
    bind: SocketAddr,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env first so it can feed both clap and the app config
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "signin_backend=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();
    let config = AppConfig::from_env()?;

    tracing::info!("Starting sign-in backend");

    let google = GoogleClient::discover(config.google.clone())
        .await
        .context("failed to load the Google discovery document")?;

    let notifier = match &config.mail {
        Some(mail) => {
            let mailer = SmtpMailer::new(mail).context("failed to set up the SMTP transport")?;
            tracing::info!("One-time code emails enabled via {}:{}", mail.host, mail.port);
            Some(Notifier::spawn(Arc::new(mailer)))
        }
        None => {
            tracing::info!("MAIL_SERVER not set, one-time code emails disabled");
            None
        }
    };

    let state = AppState::new(config.auth.clone(), google, notifier);
    let app = routes::app_router(state, &config.cors_allowed_origins);

    tracing::info!("Server listening on {}", cli.bind);

    let listener = tokio::net::TcpListener::bind(cli.bind).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutting down");
}
