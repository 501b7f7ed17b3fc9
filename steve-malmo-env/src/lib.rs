//! A Minecraft block-building environment on [Project Malmo](https://github.com/microsoft/malmo).
//!
//! The agent, SteveTheBuilder, stands on a stone floor with a stack of
//! cobblestone and a hostile mob nearby. It turns, looks up or down and places
//! blocks; the mission rewards every tick it survives. Optional shaping terms
//! reward placing blocks and facing the mob, see [`RewardSynthesizer`].
//!
//! The observation is the grid of blocks around the agent, marking the blocks
//! it placed, followed by optional scalar channels, see [`ObservationLayout`].
//!
//! The environment does not talk to Malmo by itself. It drives a [`Session`],
//! for instance a [`ChannelSession`] whose transport runs on another thread:
//!
//! ```no_run
//! use anyhow::Result;
//! use crossbeam_channel::unbounded;
//! use steve_core::{record::BufferedRecorder, util::eval_with_recorder, Env as _};
//! use steve_malmo_env::{
//!     util::test::RandomPolicy, ChannelSession, ChannelSessionConfig, MovementMode, SteveEnv,
//!     SteveEnvConfig,
//! };
//!
//! fn main() -> Result<()> {
//!     env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
//!
//!     // The other ends go to the thread talking to the Malmo agent host.
//!     let (requests, _requests_rx) = unbounded();
//!     let (_world_states_tx, world_states) = unbounded();
//!
//!     let config = SteveEnvConfig::<()>::default()
//!         .reward_block(5.0)
//!         .reward_facing(true)
//!         .yaw_obs_simplifier(true)
//!         .session(ChannelSessionConfig::new(requests, world_states));
//!     let mut env = SteveEnv::<ChannelSession>::build(&config, 42)?;
//!     let mut policy = RandomPolicy::new(MovementMode::Discrete, 42);
//!     let mut recorder = BufferedRecorder::new();
//!
//!     let returns = eval_with_recorder(&mut env, &mut policy, 5, &mut recorder)?;
//!     println!("{:?}", returns);
//!
//!     Ok(())
//! }
//! ```
mod act;
mod assembler;
mod config;
mod env;
mod episode;
mod error;
pub mod facing;
mod history;
mod mission;
mod obs;
pub mod poll;
mod reward;
mod session;
mod signals;
pub mod util;
pub use act::{DiscreteAction, MalmoCommand, SteveAct};
pub use assembler::{rotation_quarters, Channel, ObservationLayout};
pub use config::{ConfigError, MovementMode, PollConfig, ProblemType, SteveEnvConfig};
pub use env::{SteveEnv, SteveInfo};
pub use episode::{EpisodeState, Phase};
pub use error::SteveEnvError;
pub use history::{EpisodeHistory, SharedHistory};
pub use mission::MissionSpec;
pub use obs::SteveObs;
pub use poll::{Clock, SnapshotReader, SystemClock};
pub use reward::{RewardBreakdown, RewardSynthesizer};
pub use session::{ChannelSession, ChannelSessionConfig, Session, SessionRequest, WorldState};
pub use signals::{extract, Entity, ExtractedSignals};
