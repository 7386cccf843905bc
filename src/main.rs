use clap::Parser;
use pagepost::{
    run_posting, Attachment, ChromeBrowser, Config, LocatorTable, LoginOutcome, PostOutcome,
};
use std::path::PathBuf;
use tracing::{error, info, warn};

#[derive(Parser)]
#[command(
    name = "pagepost",
    about = "Post to a social media page through browser automation"
)]
struct Cli {
    /// Message text to publish
    #[arg(short, long)]
    message: Option<String>,

    /// Media files to attach (images or video)
    #[arg(short = 'f', long = "media")]
    media: Vec<PathBuf>,

    /// Run the browser without a visible window
    #[arg(long)]
    headless: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    let mut config = Config::from_env()?;
    if cli.headless {
        config.browser.headless = true;
    }

    let mut attachments = Vec::new();
    for path in &cli.media {
        match Attachment::infer(path) {
            Ok(attachment) => attachments.push(attachment),
            Err(e) => warn!(path = %path.display(), error = %e, "attachment rejected"),
        }
    }

    let report = run_posting(
        ChromeBrowser::new(),
        config,
        LocatorTable::builtin(),
        cli.message.as_deref(),
        &attachments,
    )
    .await?;

    let code = match (report.login, report.post) {
        (LoginOutcome::Success, Some(PostOutcome::Success)) => {
            info!("post published");
            0
        }
        (LoginOutcome::CheckpointTimedOut, _) => {
            error!("verification checkpoint was not completed in time");
            3
        }
        (LoginOutcome::Failure, _) => {
            error!("login failed");
            2
        }
        (LoginOutcome::Success, outcome) => {
            error!(?outcome, "post was not published");
            4
        }
    };

    if code != 0 {
        std::process::exit(code);
    }
    Ok(())
}
