use std::time::Duration;

use anyhow::Context as _;
use clap::Parser;
use snake_go::games::snakego::CautiousStrategy;
use snake_go::network::Gateway;
use snake_go::protocol::GameResult;
use snake_go::session::{Session, SessionError};

#[derive(Parser)]
#[command(name = "snake-go")]
#[command(about = "Snake territory client; speaks over stdin/stdout unless given HOST PORT")]
struct Args {
    /// Judge host to connect to over TCP
    #[arg(requires = "port")]
    host: Option<String>,

    /// Judge port
    port: Option<u16>,

    /// Give up when the judge is silent this long (milliseconds)
    #[arg(long)]
    timeout_ms: Option<u64>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("snake_go=info".parse()?),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let timeout = args.timeout_ms.map(Duration::from_millis);

    let result = match (args.host, args.port) {
        (Some(host), Some(port)) => {
            let gateway = Gateway::connect((host.as_str(), port))
                .await
                .with_context(|| format!("failed to connect to {}:{}", host, port))?
                .with_timeout(timeout);
            Session::new(gateway, CautiousStrategy).run().await
        }
        _ => {
            tracing::info!("No judge address given, using stdin/stdout");
            let gateway = Gateway::stdio().with_timeout(timeout);
            Session::new(gateway, CautiousStrategy).run().await
        }
    };

    report(result)
}

fn report(result: Result<GameResult, SessionError>) -> anyhow::Result<()> {
    let result = result.context("game aborted")?;
    tracing::info!(
        "Game over ({:?}): winner {}, scores {} - {}",
        result.kind,
        result.winner,
        result.scores[0],
        result.scores[1]
    );
    Ok(())
}
