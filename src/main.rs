use std::path::PathBuf;
use std::sync::Arc;

use admin_session::config::{DEFAULT_CONNECT_TIMEOUT_SECS, DEFAULT_REQUEST_TIMEOUT_SECS, DEFAULT_SESSION_DIR};
use admin_session::{
    AdminConsole, ApiClient, ApiError, ConfigError, ConsoleConfig, Decision, FileStorage, HeaderStage,
    HeaderStageError, HttpTimeouts, Resolution, TracingNotifier,
};
use clap::{Args, Parser, Subcommand};
use serde_json::{Value, json};
use tracing_subscriber::EnvFilter;

#[cfg(test)]
#[path = "main_test.rs"]
mod tests;

const PASSWORD_VAR: &str = "ADMIN_PASSWORD";

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Api(#[from] ApiError),
    #[error("bad --header: {0}")]
    Header(#[from] HeaderStageError),
    #[error("invalid JSON payload: {0}")]
    InvalidJson(#[from] serde_json::Error),
    #[error("missing password; set {PASSWORD_VAR}")]
    MissingPassword,
    #[error("login failed: {0}")]
    LoginFailed(String),
    #[error("no route matches {0}")]
    NoRoute(String),
}

#[derive(Parser, Debug)]
#[command(name = "admin-session", about = "Admin console session and API CLI")]
struct Cli {
    #[arg(long, env = "ADMIN_API_BASE_URL")]
    base_url: String,

    #[arg(long, env = "ADMIN_SESSION_DIR", default_value = DEFAULT_SESSION_DIR)]
    session_dir: PathBuf,

    #[arg(long, env = "ADMIN_REQUEST_TIMEOUT_SECS", default_value_t = DEFAULT_REQUEST_TIMEOUT_SECS)]
    request_timeout: u64,

    #[arg(long, env = "ADMIN_CONNECT_TIMEOUT_SECS", default_value_t = DEFAULT_CONNECT_TIMEOUT_SECS)]
    connect_timeout: u64,

    /// Extra `name: value` header sent on every request; repeatable.
    #[arg(short = 'H', long = "header", global = true)]
    headers: Vec<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Log in; the password is read from `ADMIN_PASSWORD` only, never from argv.
    Login {
        #[arg(long)]
        username: String,
    },
    Logout,
    /// Print the persisted session without contacting the backend.
    Status,
    /// Validate the persisted token against the backend.
    Check,
    /// Resolve a console path against the current session.
    Route {
        path: String,
        /// Skip token validation; the decision will be `loading` for protected routes.
        #[arg(long, default_value_t = false)]
        no_check: bool,
    },
    /// List every console route.
    Routes,
    Api(ApiCommand),
}

#[derive(Args, Debug)]
struct ApiCommand {
    #[command(subcommand)]
    command: ApiSubcommand,
}

#[derive(Subcommand, Debug)]
enum ApiSubcommand {
    Get {
        path: String,
    },
    Delete {
        path: String,
    },
    Post {
        path: String,
        #[arg(long)]
        data: String,
    },
    Patch {
        path: String,
        #[arg(long)]
        data: String,
    },
}

#[tokio::main]
async fn main() -> Result<(), CliError> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let mut config = ConsoleConfig::new(&cli.base_url)?;
    config.session_dir = cli.session_dir;
    config.timeouts = HttpTimeouts { request_secs: cli.request_timeout, connect_secs: cli.connect_timeout };

    let mut client = ApiClient::from_config(&config)?;
    for raw in &cli.headers {
        client = client.with_stage(HeaderStage::parse(raw)?);
    }
    let storage = Arc::new(FileStorage::in_dir(&config.session_dir));
    let console = AdminConsole::new(client, storage, Arc::new(TracingNotifier));

    match cli.command {
        Command::Login { username } => run_login(&console, &username).await,
        Command::Logout => {
            console.logout();
            Ok(())
        }
        Command::Status => print_json(&status_json(&console)),
        Command::Check => {
            console.start().await;
            print_json(&status_json(&console))
        }
        Command::Route { path, no_check } => run_route(&console, &path, no_check).await,
        Command::Routes => run_routes(&console),
        Command::Api(api) => run_api(&console, api).await,
    }
}

async fn run_login(console: &AdminConsole, username: &str) -> Result<(), CliError> {
    let password = std::env::var(PASSWORD_VAR).map_err(|_| CliError::MissingPassword)?;
    if console.login(username, &password).await {
        return print_json(&status_json(console));
    }
    let reason = console
        .store()
        .snapshot()
        .error
        .unwrap_or_else(|| "unknown error".to_owned());
    Err(CliError::LoginFailed(reason))
}

async fn run_route(console: &AdminConsole, path: &str, no_check: bool) -> Result<(), CliError> {
    if !no_check {
        console.start().await;
    }
    match console.navigate(path) {
        Resolution::NotFound => Err(CliError::NoRoute(path.to_owned())),
        Resolution::Matched { view, params, decision } => print_json(&json!({
            "path": path,
            "view": view,
            "params": params,
            "decision": decision_label(decision),
            "redirect": decision.redirect_path(),
        })),
    }
}

fn run_routes(console: &AdminConsole) -> Result<(), CliError> {
    let rows: Vec<Value> = console
        .routes()
        .entries()
        .into_iter()
        .map(|entry| {
            json!({
                "pattern": entry.pattern,
                "view": entry.view,
                "protected": entry.protected,
                "roles": entry.roles.iter().map(|r| r.as_str().to_owned()).collect::<Vec<_>>(),
            })
        })
        .collect();
    print_json(&Value::Array(rows))
}

async fn run_api(console: &AdminConsole, api: ApiCommand) -> Result<(), CliError> {
    let client = console.client();
    let json = match api.command {
        ApiSubcommand::Get { path } => client.get(&path).await?,
        ApiSubcommand::Delete { path } => client.delete(&path).await?,
        ApiSubcommand::Post { path, data } => {
            let body = serde_json::from_str::<Value>(&data)?;
            client.post_json(&path, &body).await?
        }
        ApiSubcommand::Patch { path, data } => {
            let body = serde_json::from_str::<Value>(&data)?;
            client.patch_json(&path, &body).await?
        }
    };
    print_json(&json)
}

fn status_json(console: &AdminConsole) -> Value {
    let session = console.store().snapshot();
    json!({
        "phase": format!("{:?}", session.phase()).to_lowercase(),
        "isLoggedIn": session.is_logged_in,
        "role": session.role.as_ref().map(|r| r.as_str().to_owned()),
        "username": session.identity,
        "hasToken": session.bearer_token().is_some(),
        "error": session.error,
    })
}

fn decision_label(decision: Decision) -> &'static str {
    match decision {
        Decision::Loading => "loading",
        Decision::RedirectLogin => "redirect_login",
        Decision::RedirectUnauthorized => "redirect_unauthorized",
        Decision::Render => "render",
    }
}

fn print_json(value: &Value) -> Result<(), CliError> {
    let rendered = serde_json::to_string_pretty(value)?;
    println!("{rendered}");
    Ok(())
}
