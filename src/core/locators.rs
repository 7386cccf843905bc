use std::collections::HashMap;
use std::fmt;

/// Logical UI targets the automaton interacts with. Keys are stable; the
/// concrete selectors behind them are expected to churn with UI updates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LocatorKey {
    EmailField,
    PasswordField,
    LoginButton,
    ComposerPrompt,
    ComposerTextbox,
    PostButton,
    PhotoVideoButton,
    FileInput,
    CloseDialog,
    NotNowButton,
    SaveLoginDecline,
}

impl LocatorKey {
    /// Every key the login and composition flows resolve. The builtin table
    /// must carry at least one candidate for each of these.
    pub const ALL: &'static [LocatorKey] = &[
        LocatorKey::EmailField,
        LocatorKey::PasswordField,
        LocatorKey::LoginButton,
        LocatorKey::ComposerPrompt,
        LocatorKey::ComposerTextbox,
        LocatorKey::PostButton,
        LocatorKey::PhotoVideoButton,
        LocatorKey::FileInput,
        LocatorKey::CloseDialog,
        LocatorKey::NotNowButton,
        LocatorKey::SaveLoginDecline,
    ];
}

/// One concrete way to find an element on the live page.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Selector {
    Css(String),
    /// First element of `tag` whose text content contains `needle`. The
    /// localized affordances of the target UI are only reachable by text.
    Text { tag: String, needle: String },
}

impl Selector {
    pub fn css(selector: &str) -> Self {
        Selector::Css(selector.to_string())
    }

    pub fn text(tag: &str, needle: &str) -> Self {
        Selector::Text {
            tag: tag.to_string(),
            needle: needle.to_string(),
        }
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Selector::Css(selector) => write!(f, "{}", selector),
            Selector::Text { tag, needle } => write!(f, "{}:text({})", tag, needle),
        }
    }
}

#[derive(Debug, Clone)]
pub struct LocatorCandidate {
    pub selector: Selector,
    pub locale: Option<&'static str>,
}

impl LocatorCandidate {
    pub fn new(selector: Selector) -> Self {
        Self {
            selector,
            locale: None,
        }
    }

    pub fn localized(selector: Selector, locale: &'static str) -> Self {
        Self {
            selector,
            locale: Some(locale),
        }
    }
}

/// Immutable map from logical targets to ordered selector candidates.
/// Order is priority: the resolver tries candidates front to back and the
/// first one that satisfies the requirement wins.
#[derive(Debug, Clone, Default)]
pub struct LocatorTable {
    entries: HashMap<LocatorKey, Vec<LocatorCandidate>>,
}

impl LocatorTable {
    pub fn candidates(&self, key: LocatorKey) -> &[LocatorCandidate] {
        self.entries.get(&key).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Replace the candidate list for one key, keeping the rest of the table.
    pub fn with_candidates(mut self, key: LocatorKey, candidates: Vec<LocatorCandidate>) -> Self {
        self.entries.insert(key, candidates);
        self
    }

    /// The selector table observed to work against the production UI, with
    /// Korean and English variants for every localized affordance.
    pub fn builtin() -> Self {
        let mut entries = HashMap::new();

        entries.insert(
            LocatorKey::EmailField,
            vec![LocatorCandidate::new(Selector::css("#email"))],
        );
        entries.insert(
            LocatorKey::PasswordField,
            vec![LocatorCandidate::new(Selector::css("#pass"))],
        );
        entries.insert(
            LocatorKey::LoginButton,
            vec![LocatorCandidate::new(Selector::css("button[name='login']"))],
        );

        entries.insert(
            LocatorKey::ComposerPrompt,
            vec![
                LocatorCandidate::localized(Selector::text("span", "무슨 생각"), "ko"),
                LocatorCandidate::localized(Selector::text("span", "What's on your mind"), "en"),
                LocatorCandidate::localized(Selector::css("[aria-label*='생각']"), "ko"),
                LocatorCandidate::localized(Selector::css("[aria-label*='mind']"), "en"),
            ],
        );
        entries.insert(
            LocatorKey::ComposerTextbox,
            vec![LocatorCandidate::new(Selector::css(
                "div[contenteditable='true'][role='textbox']",
            ))],
        );
        entries.insert(
            LocatorKey::PostButton,
            vec![
                LocatorCandidate::localized(Selector::css("div[aria-label='게시']"), "ko"),
                LocatorCandidate::localized(Selector::css("div[aria-label='Post']"), "en"),
                LocatorCandidate::localized(Selector::text("span", "게시"), "ko"),
                LocatorCandidate::localized(Selector::text("span", "Post"), "en"),
            ],
        );
        entries.insert(
            LocatorKey::PhotoVideoButton,
            vec![
                LocatorCandidate::localized(Selector::css("[aria-label='사진/동영상']"), "ko"),
                LocatorCandidate::localized(Selector::css("[aria-label='Photo/video']"), "en"),
                LocatorCandidate::localized(Selector::css("[aria-label*='Photo']"), "en"),
                LocatorCandidate::localized(Selector::css("[aria-label*='사진']"), "ko"),
            ],
        );
        entries.insert(
            LocatorKey::FileInput,
            vec![
                LocatorCandidate::new(Selector::css("input[type='file'][accept*='image']")),
                LocatorCandidate::new(Selector::css("input[type='file'][accept]")),
            ],
        );

        entries.insert(
            LocatorKey::CloseDialog,
            vec![
                LocatorCandidate::localized(Selector::css("[aria-label='닫기']"), "ko"),
                LocatorCandidate::localized(Selector::css("[aria-label='Close']"), "en"),
            ],
        );
        entries.insert(
            LocatorKey::NotNowButton,
            vec![
                LocatorCandidate::localized(Selector::text("span", "나중에"), "ko"),
                LocatorCandidate::localized(Selector::text("span", "Not Now"), "en"),
                LocatorCandidate::localized(Selector::text("span", "Not now"), "en"),
            ],
        );
        entries.insert(
            LocatorKey::SaveLoginDecline,
            vec![
                LocatorCandidate::localized(Selector::css("[aria-label='취소']"), "ko"),
                LocatorCandidate::localized(Selector::css("[aria-label='Cancel']"), "en"),
                LocatorCandidate::localized(Selector::text("span", "취소"), "ko"),
                LocatorCandidate::localized(Selector::text("span", "Decline"), "en"),
                LocatorCandidate::localized(Selector::css("[aria-label*='다음에']"), "ko"),
            ],
        );

        Self { entries }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_covers_every_key() {
        let table = LocatorTable::builtin();
        for &key in LocatorKey::ALL {
            assert!(
                !table.candidates(key).is_empty(),
                "no candidates for {:?}",
                key
            );
        }
    }

    #[test]
    fn candidate_order_is_preserved() {
        let table = LocatorTable::builtin();
        let candidates = table.candidates(LocatorKey::ComposerPrompt);
        assert_eq!(candidates[0].locale, Some("ko"));
        assert_eq!(candidates[1].locale, Some("en"));
    }

    #[test]
    fn unknown_key_yields_empty_slice_after_override() {
        let table = LocatorTable::default().with_candidates(
            LocatorKey::EmailField,
            vec![LocatorCandidate::new(Selector::css("input[type='email']"))],
        );
        assert_eq!(table.candidates(LocatorKey::EmailField).len(), 1);
        assert!(table.candidates(LocatorKey::PostButton).is_empty());
    }

    #[test]
    fn selector_display_names_the_strategy() {
        assert_eq!(Selector::css("#email").to_string(), "#email");
        assert_eq!(
            Selector::text("span", "Post").to_string(),
            "span:text(Post)"
        );
    }
}
