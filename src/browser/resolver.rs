use crate::browser::session::PostingSession;
use crate::core::{BrowserTrait, LocatorKey, Requirement, Selector};
use crate::errors::Result;
use std::path::Path;
use std::time::Duration;
use tokio::time::Instant;
use tracing::debug;

/// A live element resolved through one winning candidate. Valid until the
/// next navigation; re-resolve instead of holding on to it.
#[derive(Debug, Clone)]
pub struct ResolvedElement {
    pub key: LocatorKey,
    pub selector: Selector,
}

impl<B: BrowserTrait> PostingSession<B> {
    /// Try each candidate for `key` in priority order until one satisfies
    /// `require`, polling the live page in between.
    ///
    /// The remaining budget is split fairly across the untried candidates,
    /// capped by a short per-candidate probe so a generous overall timeout
    /// does not strand the tail of the list. Total wall-clock never exceeds
    /// `timeout` by more than one poll interval, and the first match returns
    /// immediately. `None` means no candidate resolved; the caller decides
    /// whether that is fatal.
    pub async fn resolve(
        &self,
        key: LocatorKey,
        timeout: Duration,
        require: Requirement,
    ) -> Result<Option<ResolvedElement>> {
        let candidates = self.locators.candidates(key);
        if candidates.is_empty() {
            return Ok(None);
        }
        let poll = self.config.timeouts.poll_interval();
        let probe_cap = self.config.timeouts.candidate_probe_cap();
        let deadline = Instant::now() + timeout;
        let mut first_pass = true;

        loop {
            for (index, candidate) in candidates.iter().enumerate() {
                let now = Instant::now();
                // The very first candidate always gets one probe, so a tiny
                // timeout still means "check once, right now".
                if now >= deadline && !(first_pass && index == 0) {
                    debug!(?key, ?timeout, "no candidate resolved");
                    return Ok(None);
                }
                let remaining = deadline.saturating_duration_since(now);
                let slice = if first_pass {
                    // Fair share of the remaining budget across untried
                    // candidates, capped so a generous timeout does not
                    // strand the tail of the list on the first pass.
                    (remaining / (candidates.len() - index) as u32).min(probe_cap)
                } else {
                    remaining.min(probe_cap)
                };
                let sub_deadline = now + slice;

                loop {
                    match self.browser.probe(self.tab()?, &candidate.selector).await {
                        Ok(probe) if probe.satisfies(require) => {
                            debug!(?key, selector = %candidate.selector, "locator resolved");
                            return Ok(Some(ResolvedElement {
                                key,
                                selector: candidate.selector.clone(),
                            }));
                        }
                        Ok(_) => {}
                        // A failing probe must not abort the whole
                        // resolution: the next candidate may still match.
                        Err(e) => {
                            debug!(?key, selector = %candidate.selector, error = %e, "probe failed")
                        }
                    }

                    if Instant::now() + poll > sub_deadline {
                        break;
                    }
                    tokio::time::sleep(poll).await;
                }
            }

            // Less than one poll interval of budget cannot fit another
            // meaningful pass.
            if Instant::now() + poll >= deadline {
                debug!(?key, ?timeout, "no candidate resolved");
                return Ok(None);
            }
            first_pass = false;
        }
    }

    /// Resolve with the `Clickable` requirement and immediately click the
    /// winner through the driver's programmatic click, which lands even when
    /// an overlay visually covers the target.
    pub async fn resolve_and_click(
        &self,
        key: LocatorKey,
        timeout: Duration,
    ) -> Result<Option<ResolvedElement>> {
        match self.resolve(key, timeout, Requirement::Clickable).await? {
            Some(element) => {
                self.browser.click(self.tab()?, &element.selector).await?;
                Ok(Some(element))
            }
            None => Ok(None),
        }
    }

    pub async fn click_element(&self, element: &ResolvedElement) -> Result<()> {
        self.browser.click(self.tab()?, &element.selector).await
    }

    pub async fn fill_element(&self, element: &ResolvedElement, text: &str) -> Result<()> {
        self.browser
            .fill(self.tab()?, &element.selector, text)
            .await
    }

    pub async fn feed_files(&self, element: &ResolvedElement, files: &[&Path]) -> Result<()> {
        self.browser
            .set_files(self.tab()?, &element.selector, files)
            .await
    }
}
