//! Reward of a tick, composed of the mission's own rewards and shaping terms.
use crate::{facing::is_facing, EpisodeState, ExtractedSignals, SteveEnvConfig, WorldState};
use log::trace;
use steve_core::record::{Record, RecordValue};

/// Reward for a tick spent facing the target.
pub const FACING_BONUS: f32 = 2.0;

/// Reward for a tick spent looking away from the target.
pub const FACING_PENALTY: f32 = -0.5;

/// Reward for placing blocks while facing the target.
pub const COMBO_BONUS: f32 = 2.0;

/// Terms of the reward of one tick.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RewardBreakdown {
    /// Rewards signaled by the mission handlers.
    pub external: f32,

    /// Penalty for the damage taken.
    pub damage: f32,

    /// Bonus for the blocks placed.
    pub block: f32,

    /// Bonus or penalty for the orientation towards the target.
    pub facing: f32,

    /// Bonus for placing blocks while facing the target.
    pub combo: f32,
}

impl RewardBreakdown {
    /// Sum of the terms.
    pub fn total(&self) -> f32 {
        self.external + self.damage + self.block + self.facing + self.combo
    }
}

impl From<&RewardBreakdown> for Record {
    fn from(r: &RewardBreakdown) -> Self {
        Record::from_slice(&[
            ("reward_external", RecordValue::Scalar(r.external)),
            ("reward_damage", RecordValue::Scalar(r.damage)),
            ("reward_block", RecordValue::Scalar(r.block)),
            ("reward_facing", RecordValue::Scalar(r.facing)),
            ("reward_combo", RecordValue::Scalar(r.combo)),
        ])
    }
}

/// Computes the reward of every tick.
#[derive(Debug, Clone)]
pub struct RewardSynthesizer {
    reward_block: bool,
    block_multiplier: f32,
    block_quantity: i64,
    reward_facing: bool,
    agent_name: String,
    target_name: String,

    // Damage readings left whose delta is ignored.
    damage_warmup: usize,
}

impl RewardSynthesizer {
    /// Creates a synthesizer for the given configuration.
    pub fn new<S>(config: &SteveEnvConfig<S>) -> Self {
        Self {
            reward_block: config.reward_block,
            block_multiplier: config.block_multiplier,
            block_quantity: config.block_quantity as i64,
            reward_facing: config.reward_facing,
            agent_name: config.agent_name.clone(),
            target_name: config.target_name.clone(),
            damage_warmup: config.damage_warmup_ticks,
        }
    }

    /// Stops ignoring damage.
    ///
    /// The first ticks of the first episode can report damage taken before the
    /// session started; later episodes never do.
    pub fn end_warmup(&mut self) {
        self.damage_warmup = 0;
    }

    /// Computes the reward of a tick and updates the counters in `state`.
    ///
    /// Without `signals`, only the mission's own rewards count and `state` is
    /// left as is.
    pub fn compute(
        &mut self,
        snapshot: &WorldState,
        signals: Option<&ExtractedSignals>,
        state: &mut EpisodeState,
    ) -> RewardBreakdown {
        let mut r = RewardBreakdown {
            external: snapshot.rewards.iter().sum::<f64>() as f32,
            ..RewardBreakdown::default()
        };

        let signals = match signals {
            Some(signals) => signals,
            None => return r,
        };

        if let Some(damage) = signals.damage_taken {
            let delta = damage - state.last_damage;
            state.last_damage = damage;
            if self.damage_warmup > 0 {
                trace!("Ignored damage delta {} during warmup", delta);
                self.damage_warmup -= 1;
            } else {
                r.damage = -(delta.div_euclid(4) as f32);
            }
        }

        if self.reward_block {
            if let Some(size) = signals.inventory_slot_0_size {
                let used = self.block_quantity - size;
                if used > state.last_blocks_used {
                    r.block = (used - state.last_blocks_used) as f32 * self.block_multiplier;
                    state.last_blocks_used = used;
                }
            }
        }

        if self.reward_facing {
            r.facing = match is_facing(signals, &self.agent_name, &self.target_name) {
                Some(true) => FACING_BONUS,
                Some(false) => FACING_PENALTY,
                None => 0.0,
            };
            state.facing_reward += r.facing;
        }

        if r.block > 0.0 && r.facing > 0.0 {
            r.combo = COMBO_BONUS;
        }

        r
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::util::test::PayloadBuilder;

    type Config = SteveEnvConfig<()>;

    fn signals(payload: PayloadBuilder) -> ExtractedSignals {
        ExtractedSignals::from_json(&payload.build()).unwrap()
    }

    fn no_warmup(config: &Config) -> RewardSynthesizer {
        let mut synth = RewardSynthesizer::new(config);
        synth.end_warmup();
        synth
    }

    #[test]
    fn test_damage_penalty() {
        let mut synth = no_warmup(&Config::default());
        let mut state = EpisodeState::default();
        let snapshot = WorldState::default();

        let s = signals(PayloadBuilder::new().damage(10));
        let r = synth.compute(&snapshot, Some(&s), &mut state);
        assert_eq!(r.damage, -2.0);
        assert_eq!(state.last_damage, 10);

        let mut state = EpisodeState::default();
        let s = signals(PayloadBuilder::new().damage(3));
        let r = synth.compute(&snapshot, Some(&s), &mut state);
        assert_eq!(r.damage, 0.0);
        assert_eq!(state.last_damage, 3);
    }

    #[test]
    fn test_damage_penalty_is_monotonic() {
        let mut synth = no_warmup(&Config::default());
        let snapshot = WorldState::default();
        let penalties = (0..40)
            .map(|d| {
                let mut state = EpisodeState::default();
                let s = signals(PayloadBuilder::new().damage(d));
                synth.compute(&snapshot, Some(&s), &mut state).damage
            })
            .collect::<Vec<_>>();
        assert!(penalties.windows(2).all(|w| w[1] <= w[0]));
    }

    #[test]
    fn test_damage_warmup() {
        let config = Config::default();
        let mut synth = RewardSynthesizer::new(&config);
        let mut state = EpisodeState::default();
        let snapshot = WorldState::default();

        // A missing tick does not consume the warmup.
        synth.compute(&snapshot, None, &mut state);
        for d in 1..=config.damage_warmup_ticks as i64 {
            let s = signals(PayloadBuilder::new().damage(4 * d));
            assert_eq!(synth.compute(&snapshot, Some(&s), &mut state).damage, 0.0);
        }
        let s = signals(PayloadBuilder::new().damage(4 * config.damage_warmup_ticks as i64 + 8));
        assert_eq!(synth.compute(&snapshot, Some(&s), &mut state).damage, -2.0);
    }

    #[test]
    fn test_damage_warmup_waits_for_damage_readings() {
        let config = Config::default();
        let mut synth = RewardSynthesizer::new(&config);
        let mut state = EpisodeState::default();
        let snapshot = WorldState::default();

        // Ticks without a damage reading do not consume the warmup.
        let s = signals(PayloadBuilder::new().yaw(0.0));
        for _ in 0..config.damage_warmup_ticks {
            assert_eq!(synth.compute(&snapshot, Some(&s), &mut state).damage, 0.0);
        }

        // Damage carried over from before the session is not charged.
        let s = signals(PayloadBuilder::new().damage(40));
        assert_eq!(synth.compute(&snapshot, Some(&s), &mut state).damage, 0.0);
        assert_eq!(state.last_damage, 40);
    }

    #[test]
    fn test_block_bonus() {
        let mut synth = no_warmup(&Config::default().reward_block(5.0));
        let mut state = EpisodeState::default();
        let snapshot = WorldState::default();
        let s = signals(PayloadBuilder::new().slot_0_size(60));

        assert_eq!(synth.compute(&snapshot, Some(&s), &mut state).block, 15.0);
        assert_eq!(state.last_blocks_used, 3);
        assert_eq!(synth.compute(&snapshot, Some(&s), &mut state).block, 0.0);

        // Picking a block up does not move the mark.
        let s = signals(PayloadBuilder::new().slot_0_size(61));
        assert_eq!(synth.compute(&snapshot, Some(&s), &mut state).block, 0.0);
        assert_eq!(state.last_blocks_used, 3);
    }

    #[test]
    fn test_block_bonus_disabled() {
        let mut synth = no_warmup(&Config::default());
        let mut state = EpisodeState::default();
        let s = signals(PayloadBuilder::new().slot_0_size(60));
        assert_eq!(synth.compute(&WorldState::default(), Some(&s), &mut state).block, 0.0);
        assert_eq!(state.last_blocks_used, 0);
    }

    #[test]
    fn test_facing_and_combo() {
        let config = Config::default().reward_block(5.0).reward_facing(true);
        let mut synth = no_warmup(&config);
        let mut state = EpisodeState::default();
        let snapshot = WorldState::default();

        // The target at (4.5, 4.5) lies at a bearing of 315 degrees.
        let facing = || PayloadBuilder::new().agent(0.5, 0.5, 315.0).target("Ghast", 4.5, 4.5);

        // Facing only.
        let s = signals(facing().slot_0_size(63));
        let r = synth.compute(&snapshot, Some(&s), &mut state);
        assert_eq!((r.facing, r.block, r.combo), (FACING_BONUS, 0.0, 0.0));

        // Facing and placing.
        let s = signals(facing().slot_0_size(62));
        let r = synth.compute(&snapshot, Some(&s), &mut state);
        assert_eq!((r.facing, r.block, r.combo), (FACING_BONUS, 5.0, COMBO_BONUS));

        // Placing while looking away.
        let s = signals(
            PayloadBuilder::new()
                .agent(0.5, 0.5, 135.0)
                .target("Ghast", 4.5, 4.5)
                .slot_0_size(61),
        );
        let r = synth.compute(&snapshot, Some(&s), &mut state);
        assert_eq!((r.facing, r.block, r.combo), (FACING_PENALTY, 5.0, 0.0));

        // Target out of sight.
        let s = signals(PayloadBuilder::new().agent(0.5, 0.5, 315.0));
        assert_eq!(synth.compute(&snapshot, Some(&s), &mut state).facing, 0.0);

        assert_eq!(state.facing_reward, 2.0 * FACING_BONUS + FACING_PENALTY);
    }

    #[test]
    fn test_no_data() {
        let mut synth = no_warmup(&Config::default().reward_block(5.0).reward_facing(true));
        let mut state = EpisodeState::default();
        state.last_damage = 7;
        let mut snapshot = WorldState::default();
        snapshot.rewards = vec![1.0, 1.0];

        let r = synth.compute(&snapshot, None, &mut state);
        assert_eq!(r, RewardBreakdown { external: 2.0, ..RewardBreakdown::default() });
        assert_eq!(r.total(), 2.0);
        assert_eq!(state, EpisodeState { last_damage: 7, ..EpisodeState::default() });
    }
}
