//! Interview phases and the phase controller.
//!
//! The interview runs through a fixed, strictly ordered sequence of phases.
//! Only the owner of the current phase may signal completion, and completion
//! always moves exactly one step forward.

use crate::error::{PanelError, Result};
use crate::event::AgentRole;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use strum::{Display, EnumIter, EnumString};

/// One stage of the interview's fixed linear sequence.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Phase {
    Introduction,
    Behavioral,
    Coding,
    Analysis,
    Feedback,
}

impl Phase {
    /// Every phase in interview order.
    pub const ALL: [Phase; 5] = [
        Phase::Introduction,
        Phase::Behavioral,
        Phase::Coding,
        Phase::Analysis,
        Phase::Feedback,
    ];

    /// Zero-based position in the sequence.
    pub fn index(self) -> usize {
        self as usize
    }

    /// The phase that follows this one, or `None` after feedback.
    pub fn next(self) -> Option<Phase> {
        Self::ALL.get(self.index() + 1).copied()
    }

    /// The agent that owns this phase and is allowed to complete it.
    pub fn owner(self) -> AgentRole {
        match self {
            Phase::Introduction => AgentRole::Coordinator,
            Phase::Behavioral => AgentRole::Behavioral,
            Phase::Coding => AgentRole::Coding,
            Phase::Analysis => AgentRole::Analysis,
            Phase::Feedback => AgentRole::Feedback,
        }
    }

    /// Human-readable title, e.g. "Behavioral".
    pub fn title(self) -> &'static str {
        match self {
            Phase::Introduction => "Introduction",
            Phase::Behavioral => "Behavioral",
            Phase::Coding => "Coding",
            Phase::Analysis => "Analysis",
            Phase::Feedback => "Feedback",
        }
    }

    /// Instructions the coordinator hands to the owner when entering this phase.
    ///
    /// `languages` are the session's allowed languages and only matter for
    /// the coding phase. The introduction phase has no instructions.
    pub fn instructions(self, languages: &[String]) -> Option<PhaseInstructions> {
        let (action, parameters) = match self {
            Phase::Introduction => return None,
            Phase::Behavioral => (
                "begin_assessment",
                json!({ "question_count": 3, "method": "STAR" }),
            ),
            Phase::Coding => (
                "present_challenge",
                json!({ "time_limit": 1200, "languages": languages }),
            ),
            Phase::Analysis => (
                "analyze_session",
                json!({ "include_sentiment": true, "include_technical": true }),
            ),
            Phase::Feedback => (
                "generate_feedback",
                json!({ "include_recommendations": true }),
            ),
        };

        Some(PhaseInstructions {
            agent: self.owner().agent_key().to_string(),
            action: action.to_string(),
            parameters,
        })
    }
}

/// What the coordinator tells a phase owner to do.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhaseInstructions {
    pub agent: String,
    pub action: String,
    pub parameters: Value,
}

/// Holds the current phase and enforces forward-only transitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhaseController {
    /// `None` once the feedback phase has completed.
    current: Option<Phase>,
}

impl Default for PhaseController {
    fn default() -> Self {
        Self::new()
    }
}

impl PhaseController {
    /// Creates a controller positioned at the introduction phase.
    pub fn new() -> Self {
        Self {
            current: Some(Phase::Introduction),
        }
    }

    /// The active phase, or `None` when terminal.
    pub fn current(&self) -> Option<Phase> {
        self.current
    }

    /// Whether the feedback phase has completed.
    pub fn is_terminal(&self) -> bool {
        self.current.is_none()
    }

    /// Signals that `from` has completed.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(next))`: moved to the next phase
    /// - `Ok(None)`: feedback completed, the controller is now terminal
    ///
    /// # Errors
    ///
    /// - `PanelError::SessionTerminal` if already terminal
    /// - `PanelError::InvalidTransition` if `from` is not the current phase
    pub fn advance(&mut self, from: Phase) -> Result<Option<Phase>> {
        let current = self.current.ok_or(PanelError::SessionTerminal)?;
        if current != from {
            return Err(PanelError::invalid_transition(current, from));
        }

        self.current = current.next();
        Ok(self.current)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;
    use strum::IntoEnumIterator;

    #[test]
    fn test_phase_order_matches_iteration() {
        let iterated: Vec<Phase> = Phase::iter().collect();
        assert_eq!(iterated, Phase::ALL.to_vec());
        for (i, phase) in Phase::ALL.iter().enumerate() {
            assert_eq!(phase.index(), i);
        }
    }

    #[test]
    fn test_advance_walks_every_phase_then_terminates() {
        let mut controller = PhaseController::new();
        let mut visited = vec![controller.current().unwrap()];

        while let Some(current) = controller.current() {
            if let Some(next) = controller.advance(current).unwrap() {
                assert_eq!(next.index(), current.index() + 1);
                visited.push(next);
            }
        }

        assert_eq!(visited, Phase::ALL.to_vec());
        assert!(controller.is_terminal());
    }

    #[test]
    fn test_advance_from_wrong_phase_is_rejected() {
        let mut controller = PhaseController::new();
        let err = controller.advance(Phase::Coding).unwrap_err();

        assert!(err.is_invalid_transition());
        assert_eq!(controller.current(), Some(Phase::Introduction));
    }

    #[test]
    fn test_advance_cannot_reverse() {
        let mut controller = PhaseController::new();
        controller.advance(Phase::Introduction).unwrap();
        controller.advance(Phase::Behavioral).unwrap();

        // A stale signal from an earlier owner must not move anything
        assert!(controller.advance(Phase::Behavioral).is_err());
        assert!(controller.advance(Phase::Introduction).is_err());
        assert_eq!(controller.current(), Some(Phase::Coding));
    }

    #[test]
    fn test_advance_after_terminal() {
        let mut controller = PhaseController::new();
        for phase in Phase::ALL {
            controller.advance(phase).unwrap();
        }

        assert_eq!(
            controller.advance(Phase::Feedback),
            Err(PanelError::SessionTerminal)
        );
    }

    #[test]
    fn test_phase_string_round_trip() {
        assert_eq!(Phase::Behavioral.to_string(), "behavioral");
        assert_eq!(Phase::from_str("analysis").unwrap(), Phase::Analysis);
        assert!(Phase::from_str("warmup").is_err());
    }

    #[test]
    fn test_coding_instructions_carry_languages() {
        let languages = vec!["python".to_string(), "cpp".to_string()];
        let instructions = Phase::Coding.instructions(&languages).unwrap();

        assert_eq!(instructions.agent, "coding");
        assert_eq!(instructions.action, "present_challenge");
        assert_eq!(instructions.parameters["time_limit"], 1200);
        assert_eq!(instructions.parameters["languages"][1], "cpp");
        assert!(Phase::Introduction.instructions(&languages).is_none());
    }
}
