use crate::browser::session::PostingSession;
use crate::core::{BrowserTrait, LocatorKey};
use tracing::{debug, info};

/// Interstitials that can appear on any surface: cookie notices, generic
/// dialogs, "not now" nags.
pub const GENERAL_INTERSTITIALS: &[LocatorKey] =
    &[LocatorKey::CloseDialog, LocatorKey::NotNowButton];

/// Trimmed, lowercased labels of dismissal controls, used by the text-scan
/// fallback when the structured save-login candidates miss.
pub const DISMISS_LABELS: &[&str] = &[
    "cancel",
    "decline",
    "not now",
    "취소",
    "다음에",
    "나중에",
    "정보 저장 안 함",
];

impl<B: BrowserTrait> PostingSession<B> {
    /// Opportunistically clear known transient dialogs.
    ///
    /// Each pattern gets one short-timeout resolve-and-click; absence is the
    /// expected case and nothing here ever propagates an error, so the sweep
    /// is safe to run at any point. Multiple interstitials may stack, so the
    /// sweep continues past a successful dismissal. Returns how many dialogs
    /// were dismissed.
    pub async fn sweep_interstitials(&self, patterns: &[LocatorKey]) -> usize {
        let timeout = self.config.timeouts.interstitial_wait();
        let mut dismissed = 0;

        for &key in patterns {
            match self.resolve_and_click(key, timeout).await {
                Ok(Some(element)) => {
                    info!(?key, selector = %element.selector, "dismissed interstitial");
                    dismissed += 1;
                }
                Ok(None) => {}
                Err(e) => debug!(?key, error = %e, "interstitial sweep error ignored"),
            }
        }

        dismissed
    }

    /// Clear the "save your login info" dialog shown right after a
    /// successful login. Structured candidates first; if none match, fall
    /// back to scanning all clickable elements for a known dismissal label.
    pub async fn sweep_save_login(&self) {
        if self.sweep_interstitials(&[LocatorKey::SaveLoginDecline]).await > 0 {
            return;
        }

        let Ok(tab) = self.tab() else {
            return;
        };
        match self.browser.click_by_label(tab, DISMISS_LABELS).await {
            Ok(Some(label)) => info!(%label, "dismissed save-login dialog via label scan"),
            Ok(None) => debug!("no save-login dialog present"),
            Err(e) => debug!(error = %e, "save-login label scan failed"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Config, Credentials, ElementProbe, LocatorTable, Selector};
    use crate::testing::MockBrowser;

    async fn open_session(browser: MockBrowser) -> PostingSession<MockBrowser> {
        let config = Config::new(Credentials {
            email: "user@example.com".to_string(),
            password: "secret".to_string(),
        });
        PostingSession::open(browser, config, LocatorTable::builtin())
            .await
            .unwrap()
    }

    fn clickable() -> ElementProbe {
        ElementProbe {
            present: true,
            visible: true,
            clickable: true,
        }
    }

    #[tokio::test(flavor = "current_thread", start_paused = true)]
    async fn sweep_with_nothing_present_is_a_no_op() {
        let browser = MockBrowser::new("about:blank");
        let handle = browser.clone();
        let session = open_session(browser).await;

        let dismissed = session.sweep_interstitials(GENERAL_INTERSTITIALS).await;

        assert_eq!(dismissed, 0);
        assert!(handle.clicks().is_empty());

        // An empty pattern set is equally harmless.
        assert_eq!(session.sweep_interstitials(&[]).await, 0);
        assert!(handle.clicks().is_empty());
    }

    #[tokio::test(flavor = "current_thread", start_paused = true)]
    async fn stacked_interstitials_are_each_dismissed() {
        let browser = MockBrowser::new("about:blank")
            .with_element(&Selector::css("[aria-label='닫기']"), clickable())
            .with_element(&Selector::text("span", "나중에"), clickable());
        let handle = browser.clone();
        let session = open_session(browser).await;

        let dismissed = session.sweep_interstitials(GENERAL_INTERSTITIALS).await;

        assert_eq!(dismissed, 2);
        assert_eq!(handle.clicks().len(), 2);
    }

    #[tokio::test(flavor = "current_thread", start_paused = true)]
    async fn click_failures_are_swallowed() {
        let browser = MockBrowser::new("about:blank")
            .with_element(&Selector::css("[aria-label='닫기']"), clickable())
            .failing_clicks(&Selector::css("[aria-label='닫기']"));
        let session = open_session(browser).await;

        // Must not propagate the driver error.
        let dismissed = session.sweep_interstitials(GENERAL_INTERSTITIALS).await;
        assert_eq!(dismissed, 0);
    }

    #[tokio::test(flavor = "current_thread", start_paused = true)]
    async fn save_login_falls_back_to_label_scan() {
        let browser = MockBrowser::new("about:blank").with_labels(&["not now"]);
        let handle = browser.clone();
        let session = open_session(browser).await;

        session.sweep_save_login().await;

        assert_eq!(handle.label_clicks(), vec!["not now".to_string()]);
    }

    #[tokio::test(flavor = "current_thread", start_paused = true)]
    async fn save_login_prefers_structured_candidates() {
        let browser = MockBrowser::new("about:blank")
            .with_element(&Selector::css("[aria-label='취소']"), clickable())
            .with_labels(&["not now"]);
        let handle = browser.clone();
        let session = open_session(browser).await;

        session.sweep_save_login().await;

        assert_eq!(handle.clicks(), vec!["[aria-label='취소']".to_string()]);
        assert!(handle.label_clicks().is_empty());
    }
}
