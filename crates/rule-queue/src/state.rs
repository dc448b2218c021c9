//! Lifecycle state of a queued rule.

/// Where a rule is in its lifecycle.
///
/// # Tick Semantics
///
/// A rule begins `Pending`. Starting it either finishes the work on the spot
/// (`Complete`) or parks it (`Waiting`) until the condition it watches holds.
/// The queue never polls a rule that is not `Waiting`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum RuleState {
    /// Enqueued but not yet started.
    #[default]
    Pending,

    /// Started; waiting on an external signal.
    ///
    /// The queue calls [`Rule::update`](crate::Rule::update) every tick while
    /// a rule stays in this state.
    Waiting,

    /// Finished. The queue moves on to the next rule.
    Complete,
}

impl RuleState {
    /// Returns `true` if this state is `Complete`.
    #[inline]
    pub fn is_complete(self) -> bool {
        matches!(self, RuleState::Complete)
    }

    /// Returns `true` if this state is `Waiting`.
    #[inline]
    pub fn is_waiting(self) -> bool {
        matches!(self, RuleState::Waiting)
    }

    /// Folds `Pending` into `Waiting`.
    ///
    /// A rule that reports `Pending` after being started has not finished,
    /// so the queue treats it exactly like a waiting rule.
    #[inline]
    pub fn settled(self) -> Self {
        match self {
            RuleState::Pending => RuleState::Waiting,
            other => other,
        }
    }
}
