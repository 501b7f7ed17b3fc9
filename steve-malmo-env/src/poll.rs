//! Blocking waits on the game session.
//!
//! The game advances on its own clock; the environment catches up with it by
//! polling. Every wait goes through a [`Clock`] so that tests can run without
//! sleeping.
use crate::{MissionSpec, PollConfig, Session, SteveEnvError, WorldState};
use log::{info, warn};
use std::time::Duration;

/// Source of the sleeps between two polls.
pub trait Clock {
    /// Blocks the calling thread for the given duration.
    fn sleep(&mut self, d: Duration);
}

/// A [`Clock`] sleeping on the calling thread.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn sleep(&mut self, d: Duration) {
        std::thread::sleep(d);
    }
}

pub(crate) fn log_errors(state: &WorldState) {
    for error in state.errors.iter() {
        warn!("Error: {}", error);
    }
}

/// Blocking reader of the next snapshot of the world.
pub struct SnapshotReader<'a, S, C> {
    session: &'a mut S,
    clock: &'a mut C,
    interval: Duration,
}

impl<'a, S, C> SnapshotReader<'a, S, C>
where
    S: Session,
    C: Clock,
{
    /// Creates a reader polling the session every `interval`.
    pub fn new(session: &'a mut S, clock: &'a mut C, interval: Duration) -> Self {
        Self {
            session,
            clock,
            interval,
        }
    }

    /// Waits for the next snapshot.
    ///
    /// Polls until an observation arrives, the mission stops running or the
    /// session reports an error. The polls made while waiting are merged, so no
    /// reward event is lost. Errors are logged, not returned: the caller goes on
    /// with whatever the snapshot holds.
    pub fn next_snapshot(&mut self) -> WorldState {
        let mut snapshot = self.session.world_state();

        while snapshot.is_mission_running
            && !snapshot.has_new_observation()
            && snapshot.errors.is_empty()
        {
            self.clock.sleep(self.interval);
            snapshot.absorb(self.session.world_state());
        }

        log_errors(&snapshot);
        snapshot
    }
}

/// Starts a mission and waits until it begins.
///
/// `start_mission` is attempted up to `poll.start_retries` times, sleeping
/// `poll.retry_delay` between attempts. Returns the world state in which the
/// mission has begun.
pub fn start_mission<S, C>(
    session: &mut S,
    clock: &mut C,
    mission: &MissionSpec,
    poll: &PollConfig,
) -> Result<WorldState, SteveEnvError>
where
    S: Session,
    C: Clock,
{
    let mut attempt = 0;
    loop {
        attempt += 1;
        match session.start_mission(mission) {
            Ok(()) => break,
            Err(e) if attempt >= poll.start_retries => {
                return Err(SteveEnvError::SessionStart {
                    attempts: attempt,
                    message: e.to_string(),
                });
            }
            Err(e) => {
                warn!("Error starting mission (attempt {}): {}", attempt, e);
                clock.sleep(poll.retry_delay);
            }
        }
    }

    info!("Waiting for the mission to start");
    let mut state = session.world_state();
    while !state.has_mission_begun {
        log_errors(&state);
        if !session.is_connected() {
            return Err(SteveEnvError::SessionClosed);
        }
        clock.sleep(poll.interval);
        state = session.world_state();
    }
    log_errors(&state);
    info!("Mission running");

    Ok(state)
}
