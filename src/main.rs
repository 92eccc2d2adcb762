use anyhow::{anyhow, Context, Result};
use clap::Parser;
use proxy_verifier::{
    proxy::{checker, CheckerConfig, EchoFormat},
    Config, ProxyVerifier, DEFAULT_INPUT, DEFAULT_OUTPUT,
};
use std::path::PathBuf;
use std::time::Duration;
use tracing::error;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Check candidate proxies by comparing their egress address with ours
#[derive(Parser)]
#[command(name = "proxy-verifier")]
#[command(about = "Check candidate proxies by comparing their egress address with ours")]
struct Cli {
    /// Input file, one candidate URI (http:// or https://) per line
    #[arg(default_value = DEFAULT_INPUT)]
    input: PathBuf,

    /// Output file working proxies are appended to
    #[arg(short, long, default_value = DEFAULT_OUTPUT)]
    output: PathBuf,

    /// Maximum number of concurrent probes
    #[arg(short = 'n', long, default_value_t = checker::DEFAULT_CONCURRENCY)]
    workers: usize,

    /// Timeout in seconds for each request
    #[arg(long, default_value_t = checker::DEFAULT_TIMEOUT_SECS)]
    timeout: u64,

    /// Address-echo URL used for both the baseline and the probes
    #[arg(long, default_value = checker::DEFAULT_TEST_URL)]
    test_url: String,

    /// Echo response format (json, text)
    #[arg(long, default_value = "json")]
    format: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "proxy_verifier=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();
    let format: EchoFormat = cli.format.parse().map_err(|e: String| anyhow!(e))?;

    let checker = CheckerConfig::new()
        .with_concurrency(cli.workers)
        .with_timeout(Duration::from_secs(cli.timeout))
        .with_test_url(cli.test_url)
        .with_format(format);
    let config = Config::new(cli.input, cli.output).with_checker(checker);

    ProxyVerifier::new(config)
        .run()
        .await
        .inspect_err(|e| error!("Verification aborted: {}", e))
        .context("verification aborted")?;

    Ok(())
}
