use std::fmt;
use std::str::FromStr;

use crate::error::VitrineError;

/// What a toggle transition does to the bound timeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToggleAction {
    /// Play forward.
    Play,
    /// Hold.
    Pause,
    /// Continue in the current direction.
    Resume,
    /// Play backward.
    Reverse,
    /// Jump to the start and play.
    Restart,
    /// Jump to the start and hold.
    Reset,
    /// Jump to the end and hold.
    Complete,
    /// Nothing.
    None,
}

impl FromStr for ToggleAction {
    type Err = VitrineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "play" => Self::Play,
            "pause" => Self::Pause,
            "resume" => Self::Resume,
            "reverse" => Self::Reverse,
            "restart" => Self::Restart,
            "reset" => Self::Reset,
            "complete" => Self::Complete,
            "none" => Self::None,
            _ => {
                return Err(VitrineError::InvalidTimeline(format!(
                    "unknown toggle action '{s}'"
                )))
            }
        })
    }
}

/// Crossing of a trigger range boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// Scrolled forward past the start.
    Enter,
    /// Scrolled forward past the end.
    Leave,
    /// Scrolled backward past the end.
    EnterBack,
    /// Scrolled backward past the start.
    LeaveBack,
}

impl fmt::Display for Transition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Enter => "enter",
            Self::Leave => "leave",
            Self::EnterBack => "enter-back",
            Self::LeaveBack => "leave-back",
        })
    }
}

/// Actions for enter, leave, enter-back and leave-back, in that order
/// (`"play none none reverse"`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ToggleActions {
    /// On [`Transition::Enter`].
    pub on_enter: ToggleAction,
    /// On [`Transition::Leave`].
    pub on_leave: ToggleAction,
    /// On [`Transition::EnterBack`].
    pub on_enter_back: ToggleAction,
    /// On [`Transition::LeaveBack`].
    pub on_leave_back: ToggleAction,
}

impl ToggleActions {
    /// Action for a transition.
    #[must_use]
    pub fn action(&self, transition: Transition) -> ToggleAction {
        match transition {
            Transition::Enter => self.on_enter,
            Transition::Leave => self.on_leave,
            Transition::EnterBack => self.on_enter_back,
            Transition::LeaveBack => self.on_leave_back,
        }
    }
}

impl Default for ToggleActions {
    /// `"play none none none"`.
    fn default() -> Self {
        Self {
            on_enter: ToggleAction::Play,
            on_leave: ToggleAction::None,
            on_enter_back: ToggleAction::None,
            on_leave_back: ToggleAction::None,
        }
    }
}

impl FromStr for ToggleActions {
    type Err = VitrineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let actions = s
            .split_whitespace()
            .map(str::parse)
            .collect::<Result<Vec<ToggleAction>, _>>()?;
        match actions[..] {
            [on_enter, on_leave, on_enter_back, on_leave_back] => Ok(Self {
                on_enter,
                on_leave,
                on_enter_back,
                on_leave_back,
            }),
            _ => Err(VitrineError::InvalidTimeline(format!(
                "expected four toggle actions in '{s}'"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_four_actions() {
        let actions: ToggleActions = "play none none reverse".parse().unwrap();
        assert_eq!(actions.action(Transition::Enter), ToggleAction::Play);
        assert_eq!(actions.action(Transition::Leave), ToggleAction::None);
        assert_eq!(actions.action(Transition::LeaveBack), ToggleAction::Reverse);
    }

    #[test]
    fn rejects_bad_lists() {
        assert!("play none".parse::<ToggleActions>().is_err());
        assert!("play none none rewind".parse::<ToggleActions>().is_err());
    }
}
