//! Observation for [`SteveEnv`](crate::SteveEnv).
use steve_core::Obs;

/// The flat observation vector, see [`ObservationLayout`](crate::ObservationLayout).
#[derive(Debug, Clone, PartialEq)]
pub struct SteveObs(pub Vec<f32>);

impl From<Vec<f32>> for SteveObs {
    fn from(v: Vec<f32>) -> Self {
        Self(v)
    }
}

impl From<SteveObs> for Vec<f32> {
    fn from(obs: SteveObs) -> Self {
        obs.0
    }
}

impl Obs for SteveObs {
    fn dummy(len: usize) -> Self {
        Self(vec![0.0; len])
    }

    fn len(&self) -> usize {
        self.0.len()
    }
}
