use clap::{Parser, Subcommand};
use color_eyre::eyre::eyre;
use tracing::info;

use oidc_helper::{
    config::OidcConfig,
    oauth::{
        AuthorizationRequest, ClaimHints, MemorySessionStore, Navigation, NavigationMode,
        OidcClient, OidcHelper, TracingNotifier,
    },
    routes,
    server::run_server,
    state::AppState,
    telemetry::{setup_sentry, setup_tracing, shutdown_tracing},
};

#[derive(Parser, Debug)]
#[command(name = "oidc-helper", about = "OpenID Connect authorization-code helper")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Serve the sign-in page (default)
    Serve,
    /// Print where the browser would be sent to start sign-in
    AuthorizeUrl {
        /// Identity method, appended to the acr prefix
        #[arg(long)]
        method: String,
        #[arg(long)]
        scope: Option<String>,
        /// Page the provider redirects back to
        #[arg(long, env = "OIDC_PAGE_URL", default_value = "http://localhost:3000/")]
        page_url: String,
        /// Userinfo claim hint, `name=value`; repeatable
        #[arg(long = "claim", value_parser = parse_key_value)]
        claims: Vec<(String, String)>,
        /// Always use a GET redirect, even with claim hints
        #[arg(long)]
        get: bool,
    },
    /// Exchange an authorization code and print the token response
    Exchange {
        #[arg(long)]
        code: String,
        #[arg(long, env = "OIDC_PAGE_URL", default_value = "http://localhost:3000/")]
        page_url: String,
        /// Extra token request parameter, `name=value`; repeatable
        #[arg(long = "param", value_parser = parse_key_value)]
        params: Vec<(String, String)>,
    },
    /// Fetch and print the userinfo document for an access token
    Userinfo {
        #[arg(long, env = "OIDC_ACCESS_TOKEN")]
        access_token: String,
    },
}

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;
    let _sentry_guard = setup_sentry();

    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?
        .block_on(async { run_application().await })
}

async fn run_application() -> oidc_helper::Result<()> {
    setup_tracing("oidc-helper")?;

    let cli = Cli::parse();
    info!(
        version = option_env!("VERGEN_GIT_SHA").unwrap_or("unknown"),
        "Starting oidc-helper"
    );

    let result = run_command(cli.command.unwrap_or(Command::Serve)).await;

    shutdown_tracing();
    result
}

async fn run_command(command: Command) -> oidc_helper::Result<()> {
    let session = MemorySessionStore::default();

    match command {
        Command::Serve => {
            let app_state = AppState::from_env()?;
            run_server(routes::routes(app_state)).await?;
        }
        Command::AuthorizeUrl {
            method,
            scope,
            page_url,
            claims,
            get,
        } => {
            let client = cli_client()?;
            let scope = scope.unwrap_or_else(|| client.config().default_scope.clone());
            let helper = OidcHelper::new(client, page_url, &session, TracingNotifier);

            let hints = claims
                .iter()
                .fold(ClaimHints::new(), |hints, (k, v)| hints.with(k, v));
            let mode = if get {
                NavigationMode::Redirect
            } else {
                NavigationMode::Auto
            };
            let request = AuthorizationRequest::new(&scope, &method)
                .with_claims(hints)
                .with_mode(mode);

            match helper.initiate_authorization(&request)? {
                Navigation::Redirect(url) => println!("{url}"),
                Navigation::FormPost { action, fields } => {
                    println!("POST {action}");
                    for (name, value) in fields {
                        println!("  {name}={value}");
                    }
                }
            }
            eprintln!("state: {}", helper.state());
        }
        Command::Exchange {
            code,
            page_url,
            params,
        } => {
            let helper = OidcHelper::new(cli_client()?, page_url, &session, TracingNotifier);
            let mut printed = false;

            helper
                .exchange_code_for_token(
                    &code,
                    |token| {
                        printed = true;
                        let pretty = serde_json::to_string_pretty(&token)
                            .unwrap_or_else(|_| token.to_string());
                        println!("{pretty}");
                    },
                    &params,
                )
                .await;

            if !printed {
                return Err(eyre!("Token exchange failed"));
            }
        }
        Command::Userinfo { access_token } => {
            let helper = OidcHelper::new(
                cli_client()?,
                "http://localhost/",
                &session,
                TracingNotifier,
            );
            let mut printed = false;

            helper
                .fetch_user_info(&access_token, |body| {
                    printed = true;
                    println!("{body}");
                })
                .await;

            if !printed {
                return Err(eyre!("Userinfo request failed"));
            }
        }
    }

    Ok(())
}

fn cli_client() -> oidc_helper::Result<OidcClient> {
    OidcClient::new(OidcConfig::from_env()?)
}

fn parse_key_value(raw: &str) -> Result<(String, String), String> {
    raw.split_once('=')
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .ok_or_else(|| format!("expected name=value, got {raw:?}"))
}
