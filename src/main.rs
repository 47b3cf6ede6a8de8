//! Re:Wear Admin CLI
//! Mission: Drive the admin session core for the clothing-exchange platform from the terminal

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use rewear_admin::auth::api::{AuthApi, AuthFlowError, SignupDraft};
use rewear_admin::auth::gateway::{ApiGateway, GatewayError};
use rewear_admin::auth::models::AdminRole;
use rewear_admin::auth::session::{RoleSession, RoleState};
use rewear_admin::auth::signal::SessionSignal;
use rewear_admin::auth::store::{SqliteStorage, TokenStore};
use rewear_admin::auth::TokenCodec;
use rewear_admin::config::Config;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "rewear-admin", about = "Admin console client for the Re:Wear platform")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Log in and persist the session
    Login {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },
    /// Drop the local session
    Logout,
    /// Show whether a session is currently held
    Whoami,
    /// Resolve and show the admin role for the current session
    Role,
    /// Submit a signup request for a new admin account
    SignupRequest {
        #[arg(long)]
        email: String,
        #[arg(long)]
        name: String,
        #[arg(long)]
        password: String,
        #[arg(long)]
        password_confirm: String,
        #[arg(long, value_parser = parse_role)]
        requested_role: AdminRole,
        #[arg(long, default_value = "")]
        reason: String,
    },
    /// Approve a pending signup request
    Approve { id: u64 },
    /// Reject a pending signup request
    Reject { id: u64 },
}

fn parse_role(s: &str) -> Result<AdminRole, String> {
    AdminRole::from_str(s)
        .ok_or_else(|| format!("Unknown role '{}'; expected SUPER_ADMIN, ADMIN or MANAGER", s))
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "rewear_admin=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Wired session core, constructed once per invocation
struct App {
    store: Arc<TokenStore>,
    session: Arc<RoleSession>,
    api: AuthApi,
}

fn build_app(config: &Config) -> Result<App> {
    std::fs::create_dir_all(&config.profile_dir).with_context(|| {
        format!(
            "Failed to create profile directory {}",
            config.profile_dir.display()
        )
    })?;

    let codec = TokenCodec::new(&config.token_key)?;
    let storage = SqliteStorage::new(&config.profile_dir.join("tokens.db"))?;
    let store = Arc::new(TokenStore::new(Box::new(storage), codec));

    let signal = SessionSignal::new();
    let gateway = ApiGateway::new(&config.api_base_url, store.clone(), signal.clone())?;
    let session = RoleSession::new(store.clone(), gateway.clone());
    signal.subscribe(&session);

    let api = AuthApi::new(gateway, store.clone(), session.clone());
    Ok(App {
        store,
        session,
        api,
    })
}

fn report(err: AuthFlowError) -> anyhow::Error {
    match err {
        AuthFlowError::Gateway(GatewayError::Network(e)) => {
            anyhow::Error::new(e).context("Could not reach the server; check your connection")
        }
        other => anyhow::Error::new(other),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing();

    let config = Config::from_env()?;
    let app = build_app(&config)?;

    match cli.command {
        Command::Login { email, password } => {
            app.api.login(&email, &password).await.map_err(report)?;
            match app.session.role() {
                Some(role) => println!("Logged in as {} ({})", email, role.as_str()),
                None => println!("Logged in as {}", email),
            }
        }
        Command::Logout => {
            app.api.logout().map_err(report)?;
            println!("Logged out.");
        }
        Command::Whoami => {
            if app.store.is_authenticated() {
                println!("Session held (tokens present).");
            } else {
                println!("Not logged in.");
            }
        }
        Command::Role => {
            app.session.refresh().await;
            match app.session.state() {
                RoleState::Resolved(role) => println!("{}", role.as_str()),
                RoleState::Anonymous => println!("Not logged in."),
                RoleState::Unresolved => println!("Role could not be resolved."),
            }
        }
        Command::SignupRequest {
            email,
            name,
            password,
            password_confirm,
            requested_role,
            reason,
        } => {
            let draft = SignupDraft {
                email: email.clone(),
                password,
                password_confirm,
                name,
                requested_role,
                reason,
            };
            app.api.submit_signup_request(&draft).await.map_err(report)?;
            println!("Signup request submitted for {}.", email);
        }
        Command::Approve { id } => {
            app.api.approve_signup(id).await.map_err(report)?;
            println!("Approved request {}.", id);
        }
        Command::Reject { id } => {
            app.api.reject_signup(id).await.map_err(report)?;
            println!("Rejected request {}.", id);
        }
    }

    Ok(())
}
