//! Command handlers for CLI subcommands.

use std::path::PathBuf;
use std::sync::Arc;

use mentor_api::auth::mailer_from_env;
use mentor_api::{ApiConfig, AppState};
use mentor_llm::{MentorPipeline, ProviderConfig};
use mentor_persistence::{CredentialStore, Credentials, UserStore};
use mentor_runtime::{AuthSession, HttpBackend};
use tracing::{info, warn};

use crate::cli::Commands;
use crate::watch::{self, WatchOptions};

/// Result type for command operations.
pub type Result<T> = std::result::Result<T, Box<dyn std::error::Error>>;

pub const NOT_LOGGED_IN: &str = "Not logged in. Run `mentor login <email>` first.";

/// Execute a CLI command.
pub async fn execute(command: Commands, server_url: &str) -> Result<()> {
    let credentials = CredentialStore::new(mentor_core::credentials_file());

    match command {
        Commands::Serve {
            host,
            port,
            cors_origins,
        } => cmd_serve(host, port, cors_origins).await,
        Commands::Signup { email, name } => cmd_signup(server_url, &email, name.as_deref()).await,
        Commands::Verify {
            email,
            otp,
            password,
            name,
        } => cmd_verify(&credentials, server_url, &email, &otp, &password, name.as_deref()).await,
        Commands::Login { email, password } => {
            cmd_login(&credentials, server_url, &email, &password).await
        }
        Commands::Whoami => cmd_whoami(&credentials).await,
        Commands::Logout => cmd_logout(&credentials),
        Commands::Watch {
            path,
            interval,
            voice,
        } => cmd_watch(&credentials, path, interval, voice).await,
    }
}

async fn cmd_serve(host: String, port: u16, cors_origins: Vec<String>) -> Result<()> {
    mentor_core::ensure_runtime_state_dir()?;

    let providers = ProviderConfig::from_env();
    let status = providers.status();
    if !status.groq {
        warn!("GROQ_API_KEY not set; code reviews are unavailable");
    }
    if !status.gemini_vision && !status.openai_vision {
        warn!("No vision provider configured; screenshots cannot be read");
    }

    let state = AppState::new(
        ApiConfig::new(host, port).with_cors_origins(cors_origins),
        MentorPipeline::from_config(&providers),
        UserStore::new(mentor_core::runtime_state_dir()),
        mailer_from_env(),
    )
    .with_provider_status(status);

    mentor_api::serve(state).await?;
    Ok(())
}

async fn cmd_signup(server_url: &str, email: &str, name: Option<&str>) -> Result<()> {
    let message = HttpBackend::new(server_url).signup(email, name).await?;
    println!("{}", message);
    println!("Then run: mentor verify {} <code> --password <password>", email);
    Ok(())
}

fn save_session(
    credentials: &CredentialStore,
    server_url: &str,
    session: &AuthSession,
) -> Result<()> {
    mentor_core::ensure_runtime_state_dir()?;
    credentials.save(&Credentials::new(
        server_url,
        session.token.clone(),
        session.user.clone(),
    ))?;
    info!(user_id = %session.user.id, "Session saved");
    Ok(())
}

async fn cmd_verify(
    credentials: &CredentialStore,
    server_url: &str,
    email: &str,
    otp: &str,
    password: &str,
    name: Option<&str>,
) -> Result<()> {
    let session = HttpBackend::new(server_url)
        .verify_otp(email, otp, password, name)
        .await?;
    save_session(credentials, server_url, &session)?;

    println!(
        "{}",
        session.message.as_deref().unwrap_or("Account created successfully!")
    );
    println!("Signed in as {} <{}>", session.user.name, session.user.email);
    Ok(())
}

async fn cmd_login(
    credentials: &CredentialStore,
    server_url: &str,
    email: &str,
    password: &str,
) -> Result<()> {
    let session = HttpBackend::new(server_url).login(email, password).await?;
    save_session(credentials, server_url, &session)?;
    println!("Signed in as {} <{}>", session.user.name, session.user.email);
    Ok(())
}

/// Saved credentials, or the "please log in" error.
pub fn require_credentials(credentials: &CredentialStore) -> Result<Credentials> {
    credentials
        .load()?
        .ok_or_else(|| NOT_LOGGED_IN.into())
}

async fn cmd_whoami(credentials: &CredentialStore) -> Result<()> {
    let saved = require_credentials(credentials)?;
    let claims = HttpBackend::new(&saved.server_url)
        .with_token(saved.token)
        .me()
        .await?;

    println!("{} <{}>", saved.user.name, claims.email);
    println!("  User ID: {}", claims.user_id);
    println!("  Server:  {}", saved.server_url);
    println!(
        "  Since:   {}",
        saved.saved_at.format("%Y-%m-%d %H:%M UTC")
    );
    Ok(())
}

fn cmd_logout(credentials: &CredentialStore) -> Result<()> {
    if credentials.clear()? {
        println!("Logged out.");
    } else {
        println!("Not logged in.");
    }
    Ok(())
}

async fn cmd_watch(
    credentials: &CredentialStore,
    path: PathBuf,
    interval: u64,
    voice: bool,
) -> Result<()> {
    let saved = require_credentials(credentials)?;
    let options = WatchOptions {
        path,
        interval_secs: interval,
        voice,
    };
    let backend = HttpBackend::new(&saved.server_url).with_token(saved.token.clone());
    watch::run(options, Arc::new(backend), &saved).await
}
