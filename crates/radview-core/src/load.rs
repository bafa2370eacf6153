//! Load lifecycle shared by the view models.

/// Where a view is in its fetch cycle.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum LoadState {
    /// Nothing requested yet, or no token to request with.
    #[default]
    Idle,
    /// A fetch is outstanding.
    Loading,
    /// Data from the latest fetch is in place.
    Ready,
    /// The latest fetch failed; the message is shown instead of the data.
    Failed(String),
}

impl LoadState {
    /// `true` while a fetch is outstanding.
    #[must_use]
    pub const fn is_loading(&self) -> bool {
        matches!(self, Self::Loading)
    }

    /// Failure message of the latest fetch.
    #[must_use]
    pub fn failure(&self) -> Option<&str> {
        match self {
            Self::Failed(message) => Some(message),
            _ => None,
        }
    }
}

/// Identifies one load request; only the newest ticket may apply its result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadTicket(u64);

/// Monotonic counter issuing [`LoadTicket`]s.
#[derive(Debug, Clone, Default)]
pub struct LoadGeneration {
    current: u64,
}

impl LoadGeneration {
    /// Start a new load, superseding every earlier ticket.
    pub const fn begin(&mut self) -> LoadTicket {
        self.current = self.current.wrapping_add(1);
        LoadTicket(self.current)
    }

    /// `true` when no newer load has started since `ticket` was issued.
    #[must_use]
    pub const fn is_current(&self, ticket: LoadTicket) -> bool {
        self.current == ticket.0
    }

    /// Supersede every outstanding ticket without starting a load.
    pub const fn invalidate(&mut self) {
        self.current = self.current.wrapping_add(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn newer_ticket_supersedes_older() {
        let mut generation = LoadGeneration::default();
        let first = generation.begin();
        assert!(generation.is_current(first));

        let second = generation.begin();
        assert!(!generation.is_current(first));
        assert!(generation.is_current(second));

        generation.invalidate();
        assert!(!generation.is_current(second));
    }

    #[test]
    fn failure_exposes_message() {
        assert_eq!(LoadState::Failed("boom".into()).failure(), Some("boom"));
        assert_eq!(LoadState::Ready.failure(), None);
        assert!(LoadState::Loading.is_loading());
    }
}
