use crate::browser::dismiss::GENERAL_INTERSTITIALS;
use crate::browser::session::PostingSession;
use crate::core::{BrowserTrait, LocatorKey, Requirement};
use crate::errors::Result;
use crate::types::LoginOutcome;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, info, warn};

/// States of one login attempt, in the order they are reached.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginState {
    Start,
    NavigatedToLogin,
    CredentialsEntered,
    Submitted,
    CheckpointPending,
    Resolved,
}

const CHECKPOINT_POLL: Duration = Duration::from_secs(1);

impl<B: BrowserTrait> PostingSession<B> {
    /// Run one login attempt to a terminal outcome.
    ///
    /// A required field that never resolves fails the attempt; nothing is
    /// retried internally. During the checkpoint wait a human may complete
    /// the verification out-of-band; the automaton only watches the
    /// location and moves on the moment the checkpoint indicator clears.
    pub async fn login(&self) -> Result<LoginOutcome> {
        let timeouts = self.config.timeouts.clone();
        let urls = self.config.urls.clone();
        let mut state = LoginState::Start;
        info!("starting login");
        debug!(?state, "login transition");

        self.navigate(&urls.login_url).await?;
        self.settle().await?;
        self.sweep_interstitials(GENERAL_INTERSTITIALS).await;
        state = LoginState::NavigatedToLogin;
        debug!(?state, "login transition");

        let email_field = match self
            .resolve(
                LocatorKey::EmailField,
                timeouts.default_wait(),
                Requirement::Visible,
            )
            .await?
        {
            Some(field) => field,
            None => {
                warn!("email field never resolved");
                return Ok(LoginOutcome::Failure);
            }
        };
        self.fill_element(&email_field, &self.config.credentials.email)
            .await?;
        info!("email entered");

        let password_field = match self
            .resolve(
                LocatorKey::PasswordField,
                timeouts.default_wait(),
                Requirement::Visible,
            )
            .await?
        {
            Some(field) => field,
            None => {
                warn!("password field never resolved");
                return Ok(LoginOutcome::Failure);
            }
        };
        self.fill_element(&password_field, &self.config.credentials.password)
            .await?;
        info!("password entered");
        state = LoginState::CredentialsEntered;
        debug!(?state, "login transition");

        if self
            .resolve_and_click(LocatorKey::LoginButton, timeouts.default_wait())
            .await?
            .is_none()
        {
            warn!("login button never resolved");
            return Ok(LoginOutcome::Failure);
        }
        info!("login submitted");
        state = LoginState::Submitted;
        debug!(?state, "login transition");

        self.settle().await?;
        tokio::time::sleep(timeouts.settle()).await;

        let mut current = self.current_url().await?;
        if urls.indicates_checkpoint(&current) {
            state = LoginState::CheckpointPending;
            debug!(?state, "login transition");
            info!(
                wait_secs = timeouts.checkpoint_wait().as_secs(),
                "verification checkpoint detected, waiting for manual completion"
            );

            let deadline = Instant::now() + timeouts.checkpoint_wait();
            loop {
                if !urls.indicates_checkpoint(&current) {
                    info!("checkpoint cleared");
                    break;
                }
                if Instant::now() >= deadline {
                    warn!("checkpoint was not completed in time");
                    state = LoginState::Resolved;
                    debug!(?state, "login transition");
                    return Ok(LoginOutcome::CheckpointTimedOut);
                }
                tokio::time::sleep(CHECKPOINT_POLL).await;
                current = self.current_url().await?;
            }
        }

        state = LoginState::Resolved;
        debug!(?state, "login transition");

        if urls.indicates_logged_in(&current) {
            info!("login succeeded");
            // The save-login prompt lands right on top of the feed; clear it
            // before handing the session back.
            self.sweep_save_login().await;
            self.sweep_interstitials(GENERAL_INTERSTITIALS).await;
            Ok(LoginOutcome::Success)
        } else {
            warn!(url = %current, "login failed");
            Ok(LoginOutcome::Failure)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Config, Credentials, ElementProbe, LocatorTable, Selector};
    use crate::testing::MockBrowser;

    const LOGIN_URL: &str = "https://www.facebook.com/login";
    const HOME_URL: &str = "https://www.facebook.com/home.php";
    const CHECKPOINT_URL: &str = "https://www.facebook.com/checkpoint/?next=home";

    fn visible() -> ElementProbe {
        ElementProbe {
            present: true,
            visible: true,
            clickable: true,
        }
    }

    fn login_form(browser: MockBrowser) -> MockBrowser {
        browser
            .with_element(&Selector::css("#email"), visible())
            .with_element(&Selector::css("#pass"), visible())
            .with_element(&Selector::css("button[name='login']"), visible())
    }

    async fn open_session(browser: MockBrowser) -> PostingSession<MockBrowser> {
        let config = Config::new(Credentials {
            email: "user@example.com".to_string(),
            password: "secret".to_string(),
        });
        PostingSession::open(browser, config, LocatorTable::builtin())
            .await
            .unwrap()
    }

    #[tokio::test(flavor = "current_thread", start_paused = true)]
    async fn straight_through_login_succeeds() {
        let browser = login_form(MockBrowser::new(LOGIN_URL))
            .on_click_set_url(&Selector::css("button[name='login']"), HOME_URL);
        let handle = browser.clone();
        let session = open_session(browser).await;

        let outcome = session.login().await.unwrap();

        assert_eq!(outcome, LoginOutcome::Success);
        let fills = handle.fills();
        assert_eq!(fills[0], ("#email".to_string(), "user@example.com".to_string()));
        assert_eq!(fills[1], ("#pass".to_string(), "secret".to_string()));
        assert_eq!(handle.clicks(), vec!["button[name='login']".to_string()]);
    }

    #[tokio::test(flavor = "current_thread", start_paused = true)]
    async fn missing_email_field_fails_without_touching_the_password() {
        let browser = MockBrowser::new(LOGIN_URL)
            .with_element(&Selector::css("#pass"), visible())
            .with_element(&Selector::css("button[name='login']"), visible());
        let handle = browser.clone();
        let session = open_session(browser).await;

        let outcome = session.login().await.unwrap();

        assert_eq!(outcome, LoginOutcome::Failure);
        assert!(handle.fills().is_empty());
        assert!(handle.clicks().is_empty());
    }

    #[tokio::test(flavor = "current_thread", start_paused = true)]
    async fn checkpoint_that_clears_resolves_to_success() {
        let browser = login_form(MockBrowser::new(LOGIN_URL))
            .on_click_set_url(&Selector::css("button[name='login']"), CHECKPOINT_URL)
            .set_url_after_url_polls(5, HOME_URL);
        let session = open_session(browser).await;

        let outcome = session.login().await.unwrap();

        assert_eq!(outcome, LoginOutcome::Success);
    }

    #[tokio::test(flavor = "current_thread", start_paused = true)]
    async fn checkpoint_that_never_clears_times_out_on_schedule() {
        let browser = login_form(MockBrowser::new(LOGIN_URL))
            .on_click_set_url(&Selector::css("button[name='login']"), CHECKPOINT_URL);
        let session = open_session(browser).await;
        let checkpoint_wait = session.config().timeouts.checkpoint_wait();

        let checkpoint_entered = Instant::now();
        let outcome = session.login().await.unwrap();
        let elapsed = checkpoint_entered.elapsed();

        assert_eq!(outcome, LoginOutcome::CheckpointTimedOut);
        // The whole attempt includes navigation settling before the
        // checkpoint poll starts, so only bound the overshoot.
        assert!(elapsed >= checkpoint_wait);
        assert!(elapsed <= checkpoint_wait + Duration::from_secs(30));
    }

    #[tokio::test(flavor = "current_thread", start_paused = true)]
    async fn wrong_destination_after_submit_is_a_failure() {
        let browser = login_form(MockBrowser::new(LOGIN_URL)).on_click_set_url(
            &Selector::css("button[name='login']"),
            "https://www.facebook.com/login/?next=retry",
        );
        let session = open_session(browser).await;

        let outcome = session.login().await.unwrap();

        assert_eq!(outcome, LoginOutcome::Failure);
    }

    #[tokio::test(flavor = "current_thread", start_paused = true)]
    async fn successful_login_sweeps_the_save_login_dialog() {
        let browser = login_form(MockBrowser::new(LOGIN_URL))
            .on_click_set_url(&Selector::css("button[name='login']"), HOME_URL)
            .with_labels(&["not now"]);
        let handle = browser.clone();
        let session = open_session(browser).await;

        let outcome = session.login().await.unwrap();

        assert_eq!(outcome, LoginOutcome::Success);
        assert_eq!(handle.label_clicks(), vec!["not now".to_string()]);
    }
}
