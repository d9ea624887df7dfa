use clap::Parser;
use fixtures::{idp, run_server, FixtureArgs};

/// Mock OpenID Connect provider
#[derive(Parser, Debug)]
#[clap(name = "idp-fixture")]
struct Cli {
    #[clap(flatten)]
    common: FixtureArgs,

    #[arg(long, env = "OIDC_CLIENT_ID", default_value = idp::DEFAULT_CLIENT_ID)]
    client_id: String,

    #[arg(long, env = "OIDC_CLIENT_SECRET", default_value = idp::DEFAULT_CLIENT_SECRET)]
    client_secret: String,

    /// `sub` returned from the userinfo endpoint
    #[arg(long, default_value = idp::DEFAULT_SUBJECT)]
    subject: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Cli::parse();

    let config = idp::IdpConfig {
        client_id: args.client_id,
        client_secret: args.client_secret,
        subject: args.subject,
    };

    run_server(args.common, idp::router(config)).await
}
