/// Phase definitions for the pagination state machine
///
/// The driver starts in `LoadingPage`, and can only reach `Done` from
/// `CheckingNext` when a listing page has no "next" control.
use std::fmt;

/// Represents where the pagination driver is in its loop
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CrawlPhase {
    /// A listing page is being fetched
    LoadingPage,

    /// Cards of the current listing page are being turned into records
    ExtractingCards,

    /// The current listing page is being searched for a "next" control
    CheckingNext,

    /// The "next" chain is exhausted; the dataset is complete
    Done,
}

impl CrawlPhase {
    /// Returns true once no further pages will be visited
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Done)
    }

    /// Returns true if the driver may move from `self` to `next`
    pub fn can_transition_to(&self, next: CrawlPhase) -> bool {
        matches!(
            (self, next),
            (Self::LoadingPage, Self::ExtractingCards)
                | (Self::ExtractingCards, Self::CheckingNext)
                | (Self::CheckingNext, Self::LoadingPage)
                | (Self::CheckingNext, Self::Done)
        )
    }

    /// Short lowercase label used in logs
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::LoadingPage => "loading_page",
            Self::ExtractingCards => "extracting_cards",
            Self::CheckingNext => "checking_next",
            Self::Done => "done",
        }
    }
}

impl Default for CrawlPhase {
    fn default() -> Self {
        Self::LoadingPage
    }
}

impl fmt::Display for CrawlPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
