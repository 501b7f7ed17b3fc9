//! The environment.
use crate::{
    poll::{self, SnapshotReader},
    signals::extract,
    Clock, DiscreteAction, EpisodeHistory, EpisodeState, MalmoCommand, MissionSpec,
    MovementMode, ObservationLayout, Phase, RewardSynthesizer, Session, SharedHistory,
    SteveAct, SteveEnvConfig, SteveEnvError, SteveObs, SystemClock, WorldState,
};
use anyhow::{anyhow, Result};
use log::{info, trace, warn};
use steve_core::{
    record::Record,
    Env, Info, Obs, Step,
};

/// Empty information of a step.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SteveInfo;

impl Info for SteveInfo {}

/// A block-building agent in a Malmo mission.
///
/// Each episode is one mission. [`Env::reset`] starts the mission and waits
/// until it runs; [`Env::step`] sends the commands of an action, waits for the
/// next observation and computes the reward. The episode ends when the mission
/// stops running on the client, because the agent reached its command quota or
/// touched bedrock.
///
/// `S` is the connection to the client, `C` the clock used for every wait.
pub struct SteveEnv<S: Session, C: Clock = SystemClock> {
    config: SteveEnvConfig<S::Config>,
    session: S,
    clock: C,
    rng: fastrand::Rng,
    layout: ObservationLayout,
    reward: RewardSynthesizer,
    history: SharedHistory,
    state: EpisodeState,
    phase: Phase,
    obs: SteveObs,
    episodes: usize,
}

impl<S: Session, C: Clock> SteveEnv<S, C> {
    /// Creates an environment on an open session.
    ///
    /// Completed episodes are appended to `history`, which can be shared with
    /// other environments.
    pub fn new(
        config: SteveEnvConfig<S::Config>,
        session: S,
        clock: C,
        history: SharedHistory,
        seed: u64,
    ) -> Result<Self> {
        config.validate().map_err(SteveEnvError::from)?;
        let layout = ObservationLayout::new(&config);
        let reward = RewardSynthesizer::new(&config);
        let obs = SteveObs::dummy(layout.len());

        Ok(Self {
            config,
            session,
            clock,
            rng: fastrand::Rng::with_seed(seed),
            layout,
            reward,
            history,
            state: EpisodeState::default(),
            phase: Phase::Idle,
            obs,
            episodes: 0,
        })
    }

    /// Layout of the observation vector.
    pub fn layout(&self) -> &ObservationLayout {
        &self.layout
    }

    /// State of the current episode.
    pub fn episode_state(&self) -> &EpisodeState {
        &self.state
    }

    /// Lifecycle phase of the current episode.
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// History of completed episodes.
    pub fn history(&self) -> SharedHistory {
        self.history.clone()
    }

    /// The session.
    pub fn session(&self) -> &S {
        &self.session
    }

    /// Translates an action into Malmo commands.
    ///
    /// An empty list means the action is rejected: a look that would leave the
    /// two allowed pitches, or an action of the other movement mode.
    fn commands(&mut self, act: &SteveAct) -> Vec<MalmoCommand> {
        match (self.config.movement, act) {
            (MovementMode::Discrete, SteveAct::Discrete(a)) => {
                match a {
                    DiscreteAction::LookDown if self.state.looking_down => {
                        trace!("Rejected look down");
                        return vec![];
                    }
                    DiscreteAction::LookUp if !self.state.looking_down => {
                        trace!("Rejected look up");
                        return vec![];
                    }
                    DiscreteAction::LookDown | DiscreteAction::LookUp => {
                        self.state.looking_down = !self.state.looking_down;
                    }
                    _ => {}
                }
                vec![a.command()]
            }
            (MovementMode::Continuous, SteveAct::Continuous { turn, pitch, use_ }) => vec![
                MalmoCommand::Turn(*turn),
                MalmoCommand::Pitch(*pitch),
                MalmoCommand::Use(Some(*use_ > 0.0)),
            ],
            (mode, act) => {
                warn!("Action {:?} does not match movement mode {:?}", act, mode);
                vec![]
            }
        }
    }

    fn next_snapshot(&mut self) -> WorldState {
        SnapshotReader::new(&mut self.session, &mut self.clock, self.config.poll.interval)
            .next_snapshot()
    }

    fn roll_history(&mut self) -> Result<()> {
        let mut history = self
            .history
            .lock()
            .map_err(|_| anyhow!("Episode history is poisoned"))?;
        history.push(self.state.steps, self.state.episode_return);
        Ok(())
    }
}

impl<S, C> Env for SteveEnv<S, C>
where
    S: Session,
    C: Clock + Default,
{
    type Config = SteveEnvConfig<S::Config>;
    type Obs = SteveObs;
    type Act = SteveAct;
    type Info = SteveInfo;

    fn build(config: &Self::Config, seed: i64) -> Result<Self> {
        config.validate()?;
        let session = S::connect(&config.session)?;
        let history = EpisodeHistory::new(config.log_frequency).shared();
        Self::new(config.clone(), session, C::default(), history, seed as u64)
    }

    fn reset(&mut self) -> Result<SteveObs> {
        if self.episodes > 0 {
            info!(
                "Episode {} done, {} steps, return = {}",
                self.episodes, self.state.steps, self.state.episode_return
            );
            self.roll_history()?;
            self.reward.end_warmup();
        }
        self.phase = Phase::Idle;
        self.state = EpisodeState::default();

        let mission = MissionSpec::from_config(&self.config, &mut self.rng);
        let started =
            poll::start_mission(&mut self.session, &mut self.clock, &mission, &self.config.poll)?;
        self.phase = Phase::Running;
        self.episodes += 1;
        info!("Episode {} started", self.episodes);

        let snapshot = if started.has_new_observation() {
            started
        } else {
            self.next_snapshot()
        };
        self.obs = match extract(&snapshot).and_then(|s| self.layout.assemble(&s)) {
            Some(obs) => SteveObs(obs),
            None => {
                warn!("No initial observation");
                SteveObs::dummy(self.layout.len())
            }
        };

        Ok(self.obs.clone())
    }

    fn step(&mut self, act: &SteveAct) -> (Step<Self>, Record) {
        let commands = self.commands(act);
        if !commands.is_empty() {
            for command in commands.iter() {
                trace!("Command: {}", command);
                if let Err(e) = self.session.send_command(command) {
                    warn!("Failed to send '{}': {}", command, e);
                }
            }
            self.clock.sleep(self.config.poll.command_delay);
            self.state.steps += 1;
        }

        let snapshot = self.next_snapshot();
        let signals = extract(&snapshot);
        if let Some(obs) = signals.as_ref().and_then(|s| self.layout.assemble(s)) {
            self.obs = SteveObs(obs);
        }

        let reward = self
            .reward
            .compute(&snapshot, signals.as_ref(), &mut self.state);
        let total = reward.total();
        self.state.episode_return += total;
        trace!("Step {}: {:?}", self.state.steps, reward);

        let is_terminated = !snapshot.is_mission_running;
        if is_terminated {
            self.phase = Phase::Terminated;
        }

        let record = Record::from(&reward)
            .merge(Record::from_scalar("episode_step", self.state.steps as f32));
        let step = Step::new(
            self.obs.clone(),
            act.clone(),
            total,
            is_terminated,
            false,
            SteveInfo,
        );

        (step, record)
    }

    fn reset_with_index(&mut self, ix: usize) -> Result<SteveObs> {
        self.rng = fastrand::Rng::with_seed(ix as u64);
        self.reset()
    }
}
