#![warn(missing_docs)]
//! Core vocabulary of the SteveTheBuilder environment.
//!
//! This crate knows nothing about Minecraft. It defines how an environment, its
//! observations and actions, and a policy talk to each other, and how
//! per-step information is recorded:
//!
//! * [`Env`] advances an episode one [`Step`] at a time.
//! * [`Obs`] and [`Act`] are the observation and action of an environment.
//! * [`Policy`] maps an observation to an action.
//! * [`record`] carries key-value records to a [`Recorder`](record::Recorder).
pub mod error;
pub mod record;
pub mod util;

mod base;
pub use base::{Act, Env, Info, Obs, Policy, Step};
