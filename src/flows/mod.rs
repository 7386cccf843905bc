pub mod compose;
pub mod login;

pub use login::LoginState;

use crate::browser::session::PostingSession;
use crate::core::{BrowserTrait, Config, LocatorTable};
use crate::errors::Result;
use crate::types::{Attachment, LoginOutcome, PostOutcome};
use tracing::info;

/// What one complete automation run produced. `post` is `None` when the
/// login did not succeed, so composition never started.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PostingReport {
    pub login: LoginOutcome,
    pub post: Option<PostOutcome>,
}

/// Run one full login-and-post attempt inside a fresh session.
///
/// The session is torn down exactly once on every path out of this
/// function: after a completed run, after a failed login, and after a
/// driver error mid-flow. Runs never share a session; to retry, call again
/// with a new driver value.
pub async fn run_posting<B: BrowserTrait>(
    browser: B,
    config: Config,
    locators: LocatorTable,
    message: Option<&str>,
    attachments: &[Attachment],
) -> Result<PostingReport> {
    let session = PostingSession::open(browser, config, locators).await?;

    let run: Result<PostingReport> = async {
        let login = session.login().await?;
        if !login.is_success() {
            return Ok(PostingReport { login, post: None });
        }
        let post = session.create_post(message, attachments).await?;
        Ok(PostingReport {
            login,
            post: Some(post),
        })
    }
    .await;

    let close = session.close().await;

    let report: PostingReport = run?;
    close?;

    info!(login = ?report.login, post = ?report.post, "automation run finished");
    Ok(report)
}
