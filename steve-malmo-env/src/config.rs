//! Configuration of [`SteveEnv`](crate::SteveEnv).
//!
//! A configuration is resolved and validated before any episode starts and never
//! changes afterwards. The layout of the observation vector is derived from it
//! once, see [`ObservationLayout`](crate::ObservationLayout).
use anyhow::Result;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::{
    fs::File,
    io::{BufReader, Write},
    path::Path,
    time::Duration,
};
use thiserror::Error;

/// The world the agent is dropped into.
#[derive(Debug, Deserialize, Serialize, PartialEq, Eq, Clone, Copy)]
#[serde(rename_all = "snake_case")]
pub enum ProblemType {
    /// Completely flat world, the agent defends itself from a Ghast using cobblestone.
    Flat,

    /// Similar to the flat world but with a pyramid-like hill next to the spawn.
    Hill,

    /// The agent keeps itself and sheep from falling into water ponds around the spawn.
    SheepWater,
}

/// The command set of the agent.
#[derive(Debug, Deserialize, Serialize, PartialEq, Eq, Clone, Copy)]
#[serde(rename_all = "snake_case")]
pub enum MovementMode {
    /// Turn and look in fixed increments.
    Discrete,

    /// Turn and pitch with continuous speeds.
    Continuous,
}

/// Inconsistent configurations, rejected before any episode starts.
#[derive(Error, Debug, PartialEq)]
pub enum ConfigError {
    /// Rotating the grid replaces the yaw channel and relies on the facing computation.
    #[error("yaw_obs_simplifier requires reward_facing")]
    SimplifierWithoutFacing,

    /// The agent must sit in the center column of the grid.
    #[error("obs_size must be odd and positive, got {0}")]
    ObsSize(usize),

    /// The grid needs at least the ground layer.
    #[error("obs_height must be positive")]
    ObsHeight,

    /// Zero would flush the history on every episode boundary forever.
    #[error("log_frequency must be positive")]
    LogFrequency,

    /// Starting a mission must be attempted at least once.
    #[error("poll.start_retries must be positive")]
    StartRetries,
}

/// Timing of the blocking waits on the game session.
#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
pub struct PollConfig {
    /// Interval between two polls of the world state.
    pub interval: Duration,

    /// Wait after dispatching the commands of an action.
    pub command_delay: Duration,

    /// The number of attempts to start a mission.
    pub start_retries: usize,

    /// Wait between two attempts to start a mission.
    pub retry_delay: Duration,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_millis(100),
            command_delay: Duration::from_millis(200),
            start_retries: 3,
            retry_delay: Duration::from_secs(2),
        }
    }
}

/// Configuration of [`SteveEnv`](crate::SteveEnv).
///
/// `S` is the configuration of the game session, see
/// [`Session::Config`](crate::Session::Config).
#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
pub struct SteveEnvConfig<S> {
    /// World variant.
    pub problem: ProblemType,

    /// Command set of the agent.
    pub movement: MovementMode,

    /// Spawn the target in a random corner around the agent.
    pub random_spawn: bool,

    /// Reward blocks placed since the last tick.
    pub reward_block: bool,

    /// Reward per block placed.
    pub block_multiplier: f32,

    /// Reward facing the target and penalize looking away from it.
    pub reward_facing: bool,

    /// Rotate the grid to the agent's facing instead of appending the yaw.
    pub yaw_obs_simplifier: bool,

    /// Append the target's coordinates relative to the agent.
    pub obs_target_coords: bool,

    /// Append the agent's pitch.
    pub obs_pitch: bool,

    /// Width of the observed grid on x and z.
    pub obs_size: usize,

    /// Height of the observed grid, starting one layer below the agent's feet.
    pub obs_height: usize,

    /// Initial stack size of the building block.
    pub block_quantity: u32,

    /// The building block, the only material marked in the observed grid.
    pub player_block: String,

    /// Name of the agent in the nearby-entity list.
    pub agent_name: String,

    /// Name of the target in the nearby-entity list.
    pub target_name: String,

    /// Offset of the target spawn on x and z.
    pub enemy_spawn_distance: i32,

    /// Half-width of the arena cleared around the spawn.
    pub arena_size: i32,

    /// Command quota of a mission. Defaults to 100 for discrete and 300 for
    /// continuous movement.
    pub max_episode_steps: Option<usize>,

    /// Damage readings at the start of the first episode whose delta is ignored.
    pub damage_warmup_ticks: usize,

    /// Completed episodes between two flushes of the return history.
    pub log_frequency: usize,

    /// Polling and retry policy.
    pub poll: PollConfig,

    /// Configuration of the game session.
    pub session: S,
}

impl<S: Default> Default for SteveEnvConfig<S> {
    fn default() -> Self {
        Self {
            problem: ProblemType::Flat,
            movement: MovementMode::Discrete,
            random_spawn: true,
            reward_block: false,
            block_multiplier: 5.0,
            reward_facing: false,
            yaw_obs_simplifier: false,
            obs_target_coords: false,
            obs_pitch: false,
            obs_size: 3,
            obs_height: 3,
            block_quantity: 63,
            player_block: "cobblestone".to_string(),
            agent_name: "SteveTheBuilder".to_string(),
            target_name: "Ghast".to_string(),
            enemy_spawn_distance: 4,
            arena_size: 50,
            max_episode_steps: None,
            damage_warmup_ticks: 3,
            log_frequency: 10,
            poll: PollConfig::default(),
            session: S::default(),
        }
    }
}

impl<S> SteveEnvConfig<S> {
    /// Sets the world variant.
    ///
    /// The sheep-water world targets sheep instead of a Ghast.
    pub fn problem(mut self, problem: ProblemType) -> Self {
        self.problem = problem;
        if problem == ProblemType::SheepWater {
            self.target_name = "Sheep".to_string();
        }
        self
    }

    /// Sets the command set.
    pub fn movement(mut self, movement: MovementMode) -> Self {
        self.movement = movement;
        self
    }

    /// Sets whether the target spawns in a random corner.
    pub fn random_spawn(mut self, v: bool) -> Self {
        self.random_spawn = v;
        self
    }

    /// Enables the block-placement bonus with the given reward per block.
    pub fn reward_block(mut self, multiplier: f32) -> Self {
        self.reward_block = true;
        self.block_multiplier = multiplier;
        self
    }

    /// Sets whether the agent is rewarded for facing the target.
    pub fn reward_facing(mut self, v: bool) -> Self {
        self.reward_facing = v;
        self
    }

    /// Sets whether the grid is rotated by the agent's yaw.
    pub fn yaw_obs_simplifier(mut self, v: bool) -> Self {
        self.yaw_obs_simplifier = v;
        self
    }

    /// Sets whether the target's relative coordinates are observed.
    pub fn obs_target_coords(mut self, v: bool) -> Self {
        self.obs_target_coords = v;
        self
    }

    /// Sets whether the agent's pitch is observed.
    pub fn obs_pitch(mut self, v: bool) -> Self {
        self.obs_pitch = v;
        self
    }

    /// Sets the size of the observed grid.
    pub fn grid(mut self, obs_height: usize, obs_size: usize) -> Self {
        self.obs_height = obs_height;
        self.obs_size = obs_size;
        self
    }

    /// Sets the command quota of a mission.
    pub fn max_episode_steps(mut self, v: usize) -> Self {
        self.max_episode_steps = Some(v);
        self
    }

    /// Sets the polling policy.
    pub fn poll(mut self, poll: PollConfig) -> Self {
        self.poll = poll;
        self
    }

    /// Sets the configuration of the game session.
    pub fn session<T>(self, session: T) -> SteveEnvConfig<T> {
        SteveEnvConfig {
            problem: self.problem,
            movement: self.movement,
            random_spawn: self.random_spawn,
            reward_block: self.reward_block,
            block_multiplier: self.block_multiplier,
            reward_facing: self.reward_facing,
            yaw_obs_simplifier: self.yaw_obs_simplifier,
            obs_target_coords: self.obs_target_coords,
            obs_pitch: self.obs_pitch,
            obs_size: self.obs_size,
            obs_height: self.obs_height,
            block_quantity: self.block_quantity,
            player_block: self.player_block,
            agent_name: self.agent_name,
            target_name: self.target_name,
            enemy_spawn_distance: self.enemy_spawn_distance,
            arena_size: self.arena_size,
            max_episode_steps: self.max_episode_steps,
            damage_warmup_ticks: self.damage_warmup_ticks,
            log_frequency: self.log_frequency,
            poll: self.poll,
            session,
        }
    }

    /// The command quota of a mission.
    pub fn episode_steps(&self) -> usize {
        self.max_episode_steps.unwrap_or(match self.movement {
            MovementMode::Discrete => 100,
            MovementMode::Continuous => 300,
        })
    }

    /// Checks the consistency of the flags.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.yaw_obs_simplifier && !self.reward_facing {
            return Err(ConfigError::SimplifierWithoutFacing);
        }
        if self.obs_size == 0 || self.obs_size % 2 == 0 {
            return Err(ConfigError::ObsSize(self.obs_size));
        }
        if self.obs_height == 0 {
            return Err(ConfigError::ObsHeight);
        }
        if self.log_frequency == 0 {
            return Err(ConfigError::LogFrequency);
        }
        if self.poll.start_retries == 0 {
            return Err(ConfigError::StartRetries);
        }
        Ok(())
    }
}

impl<S> SteveEnvConfig<S>
where
    S: Serialize + DeserializeOwned,
{
    /// Constructs [`SteveEnvConfig`] from YAML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path)?;
        let rdr = BufReader::new(file);
        let b = serde_yaml::from_reader(rdr)?;
        Ok(b)
    }

    /// Saves [`SteveEnvConfig`].
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let mut file = File::create(path)?;
        file.write_all(serde_yaml::to_string(&self)?.as_bytes())?;
        Ok(())
    }
}
