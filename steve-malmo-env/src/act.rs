//! Action for [`SteveEnv`](crate::SteveEnv).
use std::{convert::TryFrom, fmt};
use steve_core::Act;

/// A discrete command, in the order of the action indices.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiscreteAction {
    /// Turn 90 degrees to the right.
    TurnRight,

    /// Turn 90 degrees to the left.
    TurnLeft,

    /// Pitch 45 degrees down.
    LookDown,

    /// Pitch 45 degrees up.
    LookUp,

    /// Place a block.
    Use,
}

impl DiscreteAction {
    /// The number of discrete actions.
    pub const N: usize = 5;

    /// The Malmo command of this action.
    pub fn command(&self) -> MalmoCommand {
        match self {
            Self::TurnRight => MalmoCommand::Turn(1.0),
            Self::TurnLeft => MalmoCommand::Turn(-1.0),
            Self::LookDown => MalmoCommand::Look(1),
            Self::LookUp => MalmoCommand::Look(-1),
            Self::Use => MalmoCommand::Use(None),
        }
    }
}

impl TryFrom<u8> for DiscreteAction {
    type Error = u8;

    fn try_from(ix: u8) -> Result<Self, u8> {
        match ix {
            0 => Ok(Self::TurnRight),
            1 => Ok(Self::TurnLeft),
            2 => Ok(Self::LookDown),
            3 => Ok(Self::LookUp),
            4 => Ok(Self::Use),
            _ => Err(ix),
        }
    }
}

/// Action for [`SteveEnv`](crate::SteveEnv).
#[derive(Debug, Clone, PartialEq)]
pub enum SteveAct {
    /// One of the discrete commands.
    Discrete(DiscreteAction),

    /// Continuous turn and pitch speeds in `[-1, 1]`, and a trigger placing a
    /// block when positive.
    Continuous {
        /// Turn speed.
        turn: f32,

        /// Pitch speed.
        pitch: f32,

        /// Block placement trigger.
        use_: f32,
    },
}

impl Act for SteveAct {}

impl From<DiscreteAction> for SteveAct {
    fn from(a: DiscreteAction) -> Self {
        Self::Discrete(a)
    }
}

impl From<[f32; 3]> for SteveAct {
    fn from([turn, pitch, use_]: [f32; 3]) -> Self {
        Self::Continuous { turn, pitch, use_ }
    }
}

/// A command string understood by the Malmo agent host.
#[derive(Debug, Clone, PartialEq)]
pub enum MalmoCommand {
    /// `turn`: a 90 degree step for discrete movement, a speed otherwise.
    Turn(f32),

    /// `look`: a 45 degree pitch step of discrete movement.
    Look(i8),

    /// `pitch`: a pitch speed of continuous movement.
    Pitch(f32),

    /// `use`: a single use for discrete movement, a held or released button otherwise.
    Use(Option<bool>),
}

impl fmt::Display for MalmoCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Turn(v) => write!(f, "turn {}", v),
            Self::Look(v) => write!(f, "look {}", v),
            Self::Pitch(v) => write!(f, "pitch {}", v),
            Self::Use(None) => write!(f, "use"),
            Self::Use(Some(pressed)) => write!(f, "use {}", *pressed as u8),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_discrete_commands() {
        let commands = (0..DiscreteAction::N as u8)
            .map(|ix| DiscreteAction::try_from(ix).unwrap().command().to_string())
            .collect::<Vec<_>>();
        assert_eq!(commands, ["turn 1", "turn -1", "look 1", "look -1", "use"]);
        assert_eq!(DiscreteAction::try_from(5), Err(5));
    }

    #[test]
    fn test_continuous_commands() {
        assert_eq!(MalmoCommand::Turn(-0.5).to_string(), "turn -0.5");
        assert_eq!(MalmoCommand::Pitch(0.25).to_string(), "pitch 0.25");
        assert_eq!(MalmoCommand::Use(Some(true)).to_string(), "use 1");
        assert_eq!(MalmoCommand::Use(Some(false)).to_string(), "use 0");
    }
}
