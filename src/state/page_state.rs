/// Page attempt states
///
/// One render attempt walks `Pending → Rendering → Converting → Succeeded`, or stops at
/// `Failed` from any non-terminal state. A retry starts a fresh attempt at `Pending`.
use crate::ScribeError;
use std::fmt;

/// Represents the current state of one page attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PageState {
    // ===== Active States =====
    /// Attempt created, no renderer session yet
    Pending,

    /// A renderer session is open and navigating
    Rendering,

    /// HTML captured, Markdown conversion running
    Converting,

    // ===== Terminal States =====
    /// Markdown and metadata produced
    Succeeded,

    /// Render or conversion failed
    Failed,
}

impl PageState {
    /// Returns true if no further transition is possible within this attempt
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Succeeded | Self::Failed)
    }

    /// Returns true if `next` is a legal successor of this state
    ///
    /// States are never revisited within one attempt.
    pub fn can_transition_to(&self, next: PageState) -> bool {
        matches!(
            (self, next),
            (Self::Pending, Self::Rendering)
                | (Self::Rendering, Self::Converting)
                | (Self::Converting, Self::Succeeded)
                | (Self::Pending | Self::Rendering | Self::Converting, Self::Failed)
        )
    }

    /// Moves to `next`, rejecting illegal transitions
    pub fn transition(&mut self, next: PageState) -> Result<(), ScribeError> {
        if !self.can_transition_to(next) {
            return Err(ScribeError::InvalidTransition {
                from: *self,
                to: next,
            });
        }

        *self = next;
        Ok(())
    }

    /// Short lowercase label used in log fields
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Rendering => "rendering",
            Self::Converting => "converting",
            Self::Succeeded => "succeeded",
            Self::Failed => "failed",
        }
    }

    #[cfg(test)]
    fn all_states() -> Vec<Self> {
        vec![
            Self::Pending,
            Self::Rendering,
            Self::Converting,
            Self::Succeeded,
            Self::Failed,
        ]
    }
}

impl fmt::Display for PageState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
