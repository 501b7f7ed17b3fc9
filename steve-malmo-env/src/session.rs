//! The game session the environment talks to.
//!
//! A [`Session`] stands for a Malmo agent host connected to a Minecraft client.
//! Transport, mission bootstrapping on the client and the Minecraft server
//! itself live behind this trait.
use crate::{MalmoCommand, MissionSpec};
use anyhow::{anyhow, Result};
use crossbeam_channel::{Receiver, Sender, TryRecvError};
use log::warn;

/// One slice of world state, as returned by a poll of the session.
///
/// Polling consumes what the session buffered since the previous poll: the
/// rewards, errors and observations here are new since then.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WorldState {
    /// The mission has started on the client.
    pub has_mission_begun: bool,

    /// The mission is still running.
    pub is_mission_running: bool,

    /// The number of observations received since the previous poll.
    pub number_of_observations_since_last_state: usize,

    /// Rewards signaled by the mission handlers since the previous poll.
    pub rewards: Vec<f64>,

    /// Errors reported since the previous poll.
    pub errors: Vec<String>,

    /// JSON observation payloads since the previous poll, oldest first.
    pub observations: Vec<String>,
}

impl WorldState {
    /// A world state of a mission that is running, carrying one observation.
    pub fn running(observation: impl Into<String>) -> Self {
        Self {
            has_mission_begun: true,
            is_mission_running: true,
            number_of_observations_since_last_state: 1,
            observations: vec![observation.into()],
            ..Self::default()
        }
    }

    /// Returns `true` if an observation arrived since the previous poll.
    pub fn has_new_observation(&self) -> bool {
        self.number_of_observations_since_last_state > 0 && !self.observations.is_empty()
    }

    /// The freshest observation payload.
    pub fn latest_observation(&self) -> Option<&str> {
        self.observations.last().map(String::as_str)
    }

    /// Merges a later poll into this one.
    ///
    /// Rewards, errors and observations accumulate; flags take the later value.
    pub fn absorb(&mut self, later: WorldState) {
        self.has_mission_begun = later.has_mission_begun;
        self.is_mission_running = later.is_mission_running;
        self.number_of_observations_since_last_state +=
            later.number_of_observations_since_last_state;
        self.rewards.extend(later.rewards);
        self.errors.extend(later.errors);
        self.observations.extend(later.observations);
    }
}

/// A connection to a Malmo agent host.
pub trait Session {
    /// Configuration used to connect.
    type Config: Clone;

    /// Connects to the agent host.
    fn connect(config: &Self::Config) -> Result<Self>
    where
        Self: Sized;

    /// Asks the client to start a mission.
    fn start_mission(&mut self, mission: &MissionSpec) -> Result<()>;

    /// Polls the world state.
    fn world_state(&mut self) -> WorldState;

    /// Sends a command to the agent.
    fn send_command(&mut self, command: &MalmoCommand) -> Result<()>;

    /// Returns `false` once the session can no longer deliver world states.
    fn is_connected(&self) -> bool {
        true
    }
}

/// A request sent by [`ChannelSession`] to the transport.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionRequest {
    /// Start the given mission.
    StartMission(MissionSpec),

    /// Send the given command to the agent.
    Command(MalmoCommand),
}

/// The session-side ends of the channels of a [`ChannelSession`].
#[derive(Clone)]
pub struct ChannelSessionConfig {
    requests: Sender<SessionRequest>,
    world_states: Receiver<WorldState>,
}

impl ChannelSessionConfig {
    /// The transport owns the other ends of the channels.
    pub fn new(requests: Sender<SessionRequest>, world_states: Receiver<WorldState>) -> Self {
        Self {
            requests,
            world_states,
        }
    }
}

/// A [`Session`] whose transport runs elsewhere, typically on another thread.
///
/// Requests are forwarded on one channel; world states are received on another.
/// A poll drains everything queued so far into a single [`WorldState`].
/// Once the transport hangs up, polls read as a stopped mission.
pub struct ChannelSession {
    requests: Sender<SessionRequest>,
    world_states: Receiver<WorldState>,
    connected: bool,

    // Flags of the latest world state, repeated by polls with nothing queued.
    has_mission_begun: bool,
    is_mission_running: bool,
}

impl Session for ChannelSession {
    type Config = ChannelSessionConfig;

    fn connect(config: &Self::Config) -> Result<Self> {
        Ok(Self {
            requests: config.requests.clone(),
            world_states: config.world_states.clone(),
            connected: true,
            has_mission_begun: false,
            is_mission_running: false,
        })
    }

    fn start_mission(&mut self, mission: &MissionSpec) -> Result<()> {
        self.has_mission_begun = false;
        self.is_mission_running = false;
        self.requests
            .send(SessionRequest::StartMission(mission.clone()))
            .map_err(|_| anyhow!("transport hung up"))
    }

    fn world_state(&mut self) -> WorldState {
        let mut state: Option<WorldState> = None;
        loop {
            match self.world_states.try_recv() {
                Ok(next) => match state.as_mut() {
                    Some(s) => s.absorb(next),
                    None => state = Some(next),
                },
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    if self.connected {
                        warn!("Transport of the session hung up");
                    }
                    self.connected = false;
                    break;
                }
            }
        }

        let mut state = state.unwrap_or_else(|| WorldState {
            has_mission_begun: self.has_mission_begun,
            is_mission_running: self.is_mission_running,
            ..WorldState::default()
        });
        if !self.connected {
            state.is_mission_running = false;
        }
        self.has_mission_begun = state.has_mission_begun;
        self.is_mission_running = state.is_mission_running;
        state
    }

    fn send_command(&mut self, command: &MalmoCommand) -> Result<()> {
        self.requests
            .send(SessionRequest::Command(command.clone()))
            .map_err(|_| anyhow!("transport hung up"))
    }

    fn is_connected(&self) -> bool {
        self.connected
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossbeam_channel::unbounded;

    #[test]
    fn test_absorb_accumulates_events() {
        let mut state = WorldState::running("{\"Yaw\": 0}");
        state.rewards.push(1.0);
        let mut later = WorldState::running("{\"Yaw\": 90}");
        later.rewards.push(1.0);
        later.errors.push("lost frame".to_string());
        later.is_mission_running = false;

        state.absorb(later);
        assert_eq!(state.rewards, vec![1.0, 1.0]);
        assert_eq!(state.errors.len(), 1);
        assert_eq!(state.number_of_observations_since_last_state, 2);
        assert_eq!(state.latest_observation(), Some("{\"Yaw\": 90}"));
        assert!(!state.is_mission_running);
    }

    #[test]
    fn test_channel_session_drains_queue() -> Result<()> {
        let (req_s, req_r) = unbounded();
        let (ws_s, ws_r) = unbounded();
        let mut session = ChannelSession::connect(&ChannelSessionConfig::new(req_s, ws_r))?;

        session.send_command(&MalmoCommand::Use(None))?;
        assert_eq!(
            req_r.try_recv(),
            Ok(SessionRequest::Command(MalmoCommand::Use(None)))
        );

        // Nothing reported yet.
        let state = session.world_state();
        assert!(!state.has_mission_begun);

        ws_s.send(WorldState::running("{}")).unwrap();
        ws_s.send(WorldState::running("{\"Life\": 20}")).unwrap();
        let state = session.world_state();
        assert_eq!(state.observations.len(), 2);
        assert_eq!(state.latest_observation(), Some("{\"Life\": 20}"));

        // An empty poll repeats the flags of the latest state.
        let state = session.world_state();
        assert!(state.is_mission_running);
        assert!(!state.has_new_observation());

        drop(ws_s);
        let state = session.world_state();
        assert!(!state.is_mission_running);
        assert!(!session.is_connected());
        Ok(())
    }
}
