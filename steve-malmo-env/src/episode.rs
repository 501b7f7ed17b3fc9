//! Per-episode state of [`SteveEnv`](crate::SteveEnv).

/// Lifecycle of an episode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// No mission started yet.
    Idle,

    /// A mission is running.
    Running,

    /// The mission stopped; the next reset starts a new one.
    Terminated,
}

/// Counters carried from one tick to the next within an episode.
///
/// Owned by the environment and zeroed on every reset.
#[derive(Debug, Clone, PartialEq)]
pub struct EpisodeState {
    /// The number of dispatched actions.
    pub steps: usize,

    /// Sum of the rewards so far.
    pub episode_return: f32,

    /// Damage taken at the latest tick with data.
    pub last_damage: i64,

    /// Blocks used at the latest tick the count increased.
    pub last_blocks_used: i64,

    /// Sum of the facing rewards so far.
    pub facing_reward: f32,

    /// The agent looks down; it toggles between looking down and straight ahead.
    pub looking_down: bool,
}

impl Default for EpisodeState {
    fn default() -> Self {
        Self {
            steps: 0,
            episode_return: 0.0,
            last_damage: 0,
            last_blocks_used: 0,
            facing_reward: 0.0,
            // Missions spawn the agent with a pitch of 45 degrees.
            looking_down: true,
        }
    }
}
