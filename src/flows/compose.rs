use crate::browser::dismiss::GENERAL_INTERSTITIALS;
use crate::browser::session::PostingSession;
use crate::core::{BrowserTrait, LocatorKey, Requirement};
use crate::errors::{AutomationError, Result};
use crate::types::{Attachment, PostOutcome};
use tracing::{info, warn};

enum AttachmentUpload {
    Uploaded(usize),
    NothingUsable,
    ControlsMissing,
}

impl<B: BrowserTrait> PostingSession<B> {
    /// Compose and publish one post on the home surface.
    ///
    /// A successful click on the publish control is reported as `Success`;
    /// the post is not confirmed server-side. Attachment files that are
    /// missing on disk are skipped with a warning rather than failing the
    /// post, but if media was requested and the upload controls themselves
    /// cannot be found, the outcome is `AttachmentFailed`.
    pub async fn create_post(
        &self,
        message: Option<&str>,
        attachments: &[Attachment],
    ) -> Result<PostOutcome> {
        let message = message.map(str::trim).filter(|m| !m.is_empty());
        if message.is_none() && attachments.is_empty() {
            return Err(AutomationError::ConfigurationError(
                "nothing to post: no message and no attachments".to_string(),
            ));
        }

        let timeouts = self.config.timeouts.clone();
        info!("starting post composition");

        self.navigate(&self.config.urls.home_url).await?;
        self.settle().await?;
        self.sweep_interstitials(GENERAL_INTERSTITIALS).await;

        if self
            .resolve_and_click(LocatorKey::ComposerPrompt, timeouts.default_wait())
            .await?
            .is_none()
        {
            warn!("composer affordance never resolved");
            return Ok(PostOutcome::ComposerNotFound);
        }
        tokio::time::sleep(timeouts.settle()).await;

        if !attachments.is_empty() {
            match self.upload_attachments(attachments).await? {
                AttachmentUpload::Uploaded(count) => info!(count, "attachments queued"),
                AttachmentUpload::NothingUsable => {
                    warn!("no usable attachment remained; posting without media")
                }
                AttachmentUpload::ControlsMissing => return Ok(PostOutcome::AttachmentFailed),
            }
        }

        if let Some(text) = message {
            let textbox = match self
                .resolve(
                    LocatorKey::ComposerTextbox,
                    timeouts.default_wait(),
                    Requirement::Visible,
                )
                .await?
            {
                Some(textbox) => textbox,
                None => {
                    warn!("composer text surface never resolved");
                    return Ok(PostOutcome::ComposerNotFound);
                }
            };
            self.click_element(&textbox).await?;
            self.fill_element(&textbox, text).await?;
            info!(chars = text.chars().count(), "message entered");
            tokio::time::sleep(timeouts.settle()).await;
        }

        if self
            .resolve_and_click(LocatorKey::PostButton, timeouts.default_wait())
            .await?
            .is_none()
        {
            warn!("publish control never resolved");
            return Ok(PostOutcome::SubmitNotFound);
        }
        tokio::time::sleep(timeouts.settle()).await;

        info!("post submitted");
        Ok(PostOutcome::Success)
    }

    /// Open the media picker and feed each usable attachment into the file
    /// input, with a settle delay between items so the composer keeps up.
    async fn upload_attachments(&self, attachments: &[Attachment]) -> Result<AttachmentUpload> {
        let timeouts = self.config.timeouts.clone();

        let usable: Vec<&Attachment> = attachments
            .iter()
            .filter(|attachment| {
                if attachment.exists() {
                    true
                } else {
                    warn!(path = %attachment.path().display(), "attachment file missing, skipped");
                    false
                }
            })
            .collect();
        if usable.is_empty() {
            return Ok(AttachmentUpload::NothingUsable);
        }

        if self
            .resolve_and_click(LocatorKey::PhotoVideoButton, timeouts.default_wait())
            .await?
            .is_none()
        {
            warn!("media picker affordance never resolved");
            return Ok(AttachmentUpload::ControlsMissing);
        }
        tokio::time::sleep(timeouts.upload_settle()).await;

        let file_input = match self
            .resolve(
                LocatorKey::FileInput,
                timeouts.default_wait(),
                Requirement::Present,
            )
            .await?
        {
            Some(input) => input,
            None => {
                warn!("file input never resolved");
                return Ok(AttachmentUpload::ControlsMissing);
            }
        };

        let mut fed = 0;
        for attachment in usable {
            self.feed_files(&file_input, &[attachment.path()]).await?;
            info!(
                path = %attachment.path().display(),
                kind = ?attachment.kind(),
                "attachment queued"
            );
            fed += 1;
            tokio::time::sleep(timeouts.upload_settle()).await;
        }

        Ok(AttachmentUpload::Uploaded(fed))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Config, Credentials, ElementProbe, LocatorTable, Selector};
    use crate::testing::MockBrowser;
    use crate::types::MediaKind;

    const HOME_URL: &str = "https://www.facebook.com";

    fn visible() -> ElementProbe {
        ElementProbe {
            present: true,
            visible: true,
            clickable: true,
        }
    }

    fn composer_selector() -> Selector {
        Selector::text("span", "What's on your mind")
    }

    fn textbox_selector() -> Selector {
        Selector::css("div[contenteditable='true'][role='textbox']")
    }

    fn post_button_selector() -> Selector {
        Selector::css("div[aria-label='게시']")
    }

    fn picker_selector() -> Selector {
        Selector::css("[aria-label='사진/동영상']")
    }

    fn file_input_selector() -> Selector {
        Selector::css("input[type='file'][accept*='image']")
    }

    fn compose_surface(browser: MockBrowser) -> MockBrowser {
        browser
            .with_element(&composer_selector(), visible())
            .with_element(&textbox_selector(), visible())
            .with_element(&post_button_selector(), visible())
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

    fn temp_image() -> (tempfile::TempDir, Attachment) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("photo.jpg");
        std::fs::write(&path, b"jpeg bytes").unwrap();
        let attachment = Attachment::new(&path, MediaKind::Image).unwrap();
        (dir, attachment)
    }

    #[tokio::test(flavor = "current_thread", start_paused = true)]
    async fn message_only_post_succeeds() {
        let browser = compose_surface(MockBrowser::new(HOME_URL));
        let handle = browser.clone();
        let session = open_session(browser).await;

        let outcome = session.create_post(Some("hello"), &[]).await.unwrap();

        assert_eq!(outcome, PostOutcome::Success);
        let fills = handle.fills();
        assert_eq!(fills.len(), 1);
        assert_eq!(fills[0].1, "hello");
        assert!(handle
            .clicks()
            .contains(&post_button_selector().to_string()));
    }

    #[tokio::test(flavor = "current_thread", start_paused = true)]
    async fn missing_composer_affordance_is_fatal() {
        let browser = MockBrowser::new(HOME_URL)
            .with_element(&textbox_selector(), visible())
            .with_element(&post_button_selector(), visible());
        let session = open_session(browser).await;

        let outcome = session.create_post(Some("hello"), &[]).await.unwrap();

        assert_eq!(outcome, PostOutcome::ComposerNotFound);
    }

    #[tokio::test(flavor = "current_thread", start_paused = true)]
    async fn missing_publish_control_leaves_the_message_entered() {
        let browser = MockBrowser::new(HOME_URL)
            .with_element(&composer_selector(), visible())
            .with_element(&textbox_selector(), visible());
        let handle = browser.clone();
        let session = open_session(browser).await;

        let outcome = session.create_post(Some("hello"), &[]).await.unwrap();

        assert_eq!(outcome, PostOutcome::SubmitNotFound);
        // No rollback: the text stays in the composer.
        assert_eq!(handle.fills().len(), 1);
    }

    #[tokio::test(flavor = "current_thread", start_paused = true)]
    async fn missing_attachment_is_skipped_and_the_valid_one_uploads() {
        let (_dir, valid) = temp_image();
        let missing = Attachment::new("/nonexistent/gone.png", MediaKind::Image).unwrap();
        let browser = compose_surface(MockBrowser::new(HOME_URL))
            .with_element(&picker_selector(), visible())
            .with_element(&file_input_selector(), visible());
        let handle = browser.clone();
        let session = open_session(browser).await;

        let outcome = session
            .create_post(Some("with media"), &[missing, valid.clone()])
            .await
            .unwrap();

        assert_eq!(outcome, PostOutcome::Success);
        let fed = handle.files_fed();
        assert_eq!(fed.len(), 1);
        assert_eq!(fed[0].1, vec![valid.path().to_path_buf()]);
    }

    #[tokio::test(flavor = "current_thread", start_paused = true)]
    async fn unreachable_media_controls_fail_the_post() {
        let (_dir, valid) = temp_image();
        // Composer present, but no picker and no file input.
        let browser = compose_surface(MockBrowser::new(HOME_URL));
        let session = open_session(browser).await;

        let outcome = session
            .create_post(Some("with media"), &[valid])
            .await
            .unwrap();

        assert_eq!(outcome, PostOutcome::AttachmentFailed);
    }

    #[tokio::test(flavor = "current_thread", start_paused = true)]
    async fn all_attachments_missing_still_posts_the_message() {
        let missing = Attachment::new("/nonexistent/gone.png", MediaKind::Image).unwrap();
        let browser = compose_surface(MockBrowser::new(HOME_URL));
        let handle = browser.clone();
        let session = open_session(browser).await;

        let outcome = session
            .create_post(Some("text anyway"), &[missing])
            .await
            .unwrap();

        assert_eq!(outcome, PostOutcome::Success);
        assert!(handle.files_fed().is_empty());
    }

    #[tokio::test(flavor = "current_thread", start_paused = true)]
    async fn empty_message_and_no_attachments_is_a_configuration_error() {
        let browser = compose_surface(MockBrowser::new(HOME_URL));
        let session = open_session(browser).await;

        let result = session.create_post(Some("   "), &[]).await;

        assert!(matches!(
            result,
            Err(AutomationError::ConfigurationError(_))
        ));
    }
}
