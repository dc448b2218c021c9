//! Phase state machine.
//!
//! The machine is a pure projection: a request names a target minor phase and
//! the machine derives everything else from it. It performs no legality
//! checks; callers own sequencing. [`PhaseMachine::is_expected_transition`]
//! is exposed for callers and diagnostics that want to flag surprises.

/// Coarse phase of the battle, derived from [`MinorPhase`].
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    PartialEq,
    Eq,
    Hash,
    strum::Display,
    strum::EnumString,
    strum::AsRefStr,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum MajorPhase {
    #[default]
    PreBattle,
    PlayerTurn,
    EnemyTurn,
}

/// Fine-grained step within a turn.
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    PartialEq,
    Eq,
    Hash,
    strum::Display,
    strum::EnumString,
    strum::AsRefStr,
    strum::EnumIter,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum MinorPhase {
    /// Battle setup. Resets the turn counter.
    #[default]
    StartBattle,
    PlayerStart,
    /// Player commits to a pledge before acting.
    Pledge,
    /// Player plays cards.
    Action,
    PlayerEnd,
    /// Increments the turn counter; enemies plan their attacks.
    EnemyStart,
    /// The next planned attack is revealed.
    PreBlock,
    /// Player assigns block cards against the revealed attack.
    Block,
    /// The revealed attack resolves.
    EnemyAttack,
    EnemyEnd,
}

impl MinorPhase {
    /// Fixed projection from minor to major phase.
    pub const fn major(self) -> MajorPhase {
        match self {
            MinorPhase::StartBattle => MajorPhase::PreBattle,
            MinorPhase::EnemyStart
            | MinorPhase::PreBlock
            | MinorPhase::Block
            | MinorPhase::EnemyAttack
            | MinorPhase::EnemyEnd => MajorPhase::EnemyTurn,
            MinorPhase::PlayerStart
            | MinorPhase::Pledge
            | MinorPhase::Action
            | MinorPhase::PlayerEnd => MajorPhase::PlayerTurn,
        }
    }
}

/// Authoritative `{major, minor, turn}` triple.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PhaseState {
    pub major: MajorPhase,
    pub minor: MinorPhase,
    pub turn: u32,
}

impl PhaseState {
    /// State before any request has been applied.
    pub const fn initial() -> Self {
        Self {
            major: MajorPhase::PreBattle,
            minor: MinorPhase::StartBattle,
            turn: 0,
        }
    }
}

/// Result of applying one phase request.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PhaseTransition {
    pub previous: PhaseState,
    pub current: PhaseState,
    /// Whether the move appears in the expected-successor table.
    pub expected: bool,
}

/// Holds the current phase and advances it on request.
#[derive(Clone, Debug, Default)]
pub struct PhaseMachine {
    state: PhaseState,
}

impl PhaseMachine {
    pub fn new() -> Self {
        Self {
            state: PhaseState::initial(),
        }
    }

    /// Current phase state.
    pub fn current(&self) -> PhaseState {
        self.state
    }

    /// Applies a phase-change request.
    ///
    /// - `EnemyStart` increments the turn number
    /// - `StartBattle` resets it to zero
    /// - `major` is always re-derived from `target`
    ///
    /// Both fields are written together before returning. Unexpected
    /// transitions are applied as-is; the `expected` flag reports them.
    pub fn request(&mut self, target: MinorPhase) -> PhaseTransition {
        let previous = self.state;

        let turn = match target {
            MinorPhase::StartBattle => 0,
            MinorPhase::EnemyStart => previous.turn.saturating_add(1),
            _ => previous.turn,
        };

        self.state = PhaseState {
            major: target.major(),
            minor: target,
            turn,
        };

        PhaseTransition {
            previous,
            current: self.state,
            expected: Self::is_expected_transition(previous.minor, target),
        }
    }

    /// Puts the machine back into its pre-battle state.
    pub fn reset(&mut self) {
        self.state = PhaseState::initial();
    }

    /// Returns true if `to` is a normal successor of `from`.
    ///
    /// Re-requesting the current phase and restarting the battle are always
    /// expected.
    pub fn is_expected_transition(from: MinorPhase, to: MinorPhase) -> bool {
        use MinorPhase::*;

        if from == to || to == StartBattle {
            return true;
        }

        matches!(
            (from, to),
            (StartBattle, PlayerStart)
                | (StartBattle, EnemyStart)
                | (PlayerStart, Pledge)
                | (PlayerStart, Action)
                | (Pledge, Action)
                | (Action, PlayerEnd)
                | (PlayerEnd, EnemyStart)
                | (EnemyStart, PreBlock)
                | (EnemyStart, EnemyEnd)
                | (PreBlock, Block)
                | (Block, EnemyAttack)
                | (EnemyAttack, PreBlock)
                | (EnemyAttack, EnemyEnd)
                | (EnemyEnd, PlayerStart)
        )
    }
}
