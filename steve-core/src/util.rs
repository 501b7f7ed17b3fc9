//! Utilities for interaction of policies and environments.
use crate::{
    record::{RecordValue, Recorder},
    Env, Policy,
};
use anyhow::Result;
use log::info;

/// Run episodes with a policy and recorder.
///
/// Every step writes a record with the reward, the episode index and the step
/// index, merged with the record emitted by the environment. Returns the sum of
/// rewards of each episode.
pub fn eval_with_recorder<E, P, R>(
    env: &mut E,
    policy: &mut P,
    n_episodes: usize,
    recorder: &mut R,
) -> Result<Vec<f32>>
where
    E: Env,
    P: Policy<E>,
    R: Recorder,
{
    let mut rs = Vec::with_capacity(n_episodes);

    for episode in 0..n_episodes {
        let mut prev_obs = env.reset()?;
        let mut count_step = 0;
        let mut r_total = 0.0;

        loop {
            let act = policy.sample(&prev_obs);
            let (step, mut record) = env.step(&act);
            r_total += step.reward;

            record.insert("reward", RecordValue::Scalar(step.reward));
            record.insert("episode", RecordValue::Scalar(episode as _));
            record.insert("step", RecordValue::Scalar(count_step as _));
            recorder.write(record);

            if step.is_done() {
                break;
            }
            prev_obs = step.obs;
            count_step += 1;
        }

        info!("Episode {}, {} steps, return = {}", episode, count_step + 1, r_total);
        rs.push(r_total);
    }

    Ok(rs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{record::BufferedRecorder, record::Record, Act, Obs, Step};

    #[derive(Clone, Debug)]
    struct CountObs(usize);

    impl Obs for CountObs {
        fn dummy(_len: usize) -> Self {
            Self(0)
        }

        fn len(&self) -> usize {
            1
        }
    }

    #[derive(Clone, Debug)]
    struct Nop;

    impl Act for Nop {}

    /// Episodes last `len` steps with a reward of 1 per step.
    struct Countdown {
        len: usize,
        t: usize,
    }

    impl Env for Countdown {
        type Config = usize;
        type Obs = CountObs;
        type Act = Nop;
        type Info = ();

        fn build(config: &usize, _seed: i64) -> Result<Self> {
            Ok(Self { len: *config, t: 0 })
        }

        fn step(&mut self, a: &Nop) -> (Step<Self>, Record) {
            self.t += 1;
            let done = self.t >= self.len;
            let step = Step::new(CountObs(self.t), a.clone(), 1.0, done, false, ());
            (step, Record::empty())
        }

        fn reset(&mut self) -> Result<CountObs> {
            self.t = 0;
            Ok(CountObs(0))
        }

        fn reset_with_index(&mut self, _ix: usize) -> Result<CountObs> {
            self.reset()
        }
    }

    struct NopPolicy;

    impl Policy<Countdown> for NopPolicy {
        fn sample(&mut self, _obs: &CountObs) -> Nop {
            Nop
        }
    }

    #[test]
    fn test_eval_with_recorder_records_every_step() -> Result<()> {
        let _ = env_logger::builder().is_test(true).try_init();

        let mut env = Countdown::build(&4, 0)?;
        let mut recorder = BufferedRecorder::new();
        let returns = eval_with_recorder(&mut env, &mut NopPolicy, 3, &mut recorder)?;

        assert_eq!(returns, vec![4.0, 4.0, 4.0]);
        assert_eq!(recorder.len(), 12);
        let last = recorder.iter().last().unwrap();
        assert_eq!(last.get_scalar("episode")?, 2.0);
        assert_eq!(last.get_scalar("step")?, 3.0);
        Ok(())
    }

    #[test]
    fn test_step_with_reset_sets_initial_observation() -> Result<()> {
        let mut env = Countdown::build(&2, 0)?;
        env.reset()?;

        let (step, _) = env.step_with_reset(&Nop)?;
        assert!(step.init_obs.is_none());
        let (step, _) = env.step_with_reset(&Nop)?;
        assert!(step.is_done());
        assert_eq!(step.init_obs.map(|o| o.0), Some(0));
        Ok(())
    }
}
