//! Assembles the observation vector.
//!
//! The vector starts with the grid around the agent, one cell per block, 1.0
//! where the block is the building block. Scalar channels enabled in the
//! configuration fill the vector from its end: the first channel takes the last
//! slot, the second one the slot before it, and so on.
use crate::{
    facing::{is_facing, normalize_angle},
    ExtractedSignals, SteveEnvConfig,
};
use log::warn;
use ndarray::{s, Array3};

/// A scalar channel appended to the grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Channel {
    /// Yaw of the agent divided by 360.
    Yaw,

    /// 1.0 when the agent faces the target.
    Facing,

    /// Position of the target relative to the agent on x, halved.
    TargetX,

    /// Position of the target relative to the agent on y, halved.
    TargetY,

    /// Position of the target relative to the agent on z, halved.
    TargetZ,

    /// Pitch of the agent divided by 90.
    Pitch,
}

/// Layout of the observation vector, fixed by the configuration.
#[derive(Debug, Clone)]
pub struct ObservationLayout {
    height: usize,
    width: usize,
    rotate: bool,
    channels: Vec<Channel>,
    player_block: String,
    agent_name: String,
    target_name: String,
}

impl ObservationLayout {
    /// Derives the layout from a configuration.
    pub fn new<S>(config: &SteveEnvConfig<S>) -> Self {
        let mut channels = vec![];
        if !config.yaw_obs_simplifier {
            channels.push(Channel::Yaw);
        }
        if config.reward_facing {
            channels.push(Channel::Facing);
        }
        if config.obs_target_coords {
            channels.extend([Channel::TargetX, Channel::TargetY, Channel::TargetZ].iter());
        }
        if config.obs_pitch {
            channels.push(Channel::Pitch);
        }

        let expected = !config.yaw_obs_simplifier as usize
            + config.reward_facing as usize
            + 3 * config.obs_target_coords as usize
            + config.obs_pitch as usize;
        assert_eq!(channels.len(), expected, "channels do not fill the observation");

        Self {
            height: config.obs_height,
            width: config.obs_size,
            rotate: config.yaw_obs_simplifier,
            channels,
            player_block: config.player_block.clone(),
            agent_name: config.agent_name.clone(),
            target_name: config.target_name.clone(),
        }
    }

    /// The number of cells of the grid.
    pub fn grid_len(&self) -> usize {
        self.height * self.width * self.width
    }

    /// Length of the observation vector.
    pub fn len(&self) -> usize {
        self.grid_len() + self.channels.len()
    }

    /// Always `false`, the grid has at least one cell.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Appended channels, in fill order.
    pub fn channels(&self) -> &[Channel] {
        &self.channels
    }

    /// Index of a channel in the observation vector.
    pub fn index_of(&self, channel: Channel) -> Option<usize> {
        let i = self.channels.iter().position(|&c| c == channel)?;
        Some(self.len() - 1 - i)
    }

    /// Builds the observation vector of a tick.
    ///
    /// Returns `None` when the grid is missing or has an unexpected size, or
    /// when the yaw is needed but missing. The caller then keeps the previous
    /// observation.
    pub fn assemble(&self, signals: &ExtractedSignals) -> Option<Vec<f32>> {
        let grid = match signals.grid.as_ref() {
            Some(grid) if grid.len() == self.grid_len() => grid,
            Some(grid) => {
                warn!(
                    "Grid of {} cells, expected {}",
                    grid.len(),
                    self.grid_len()
                );
                return None;
            }
            None => return None,
        };
        let yaw = if self.rotate || self.channels.contains(&Channel::Yaw) {
            Some(normalize_angle(signals.yaw?))
        } else {
            None
        };

        let mut obs = grid
            .iter()
            .map(|block| if *block == self.player_block { 1.0 } else { 0.0 })
            .collect::<Vec<f32>>();

        if let (true, Some(yaw)) = (self.rotate, yaw) {
            obs = rotate_grid(obs, self.height, self.width, rotation_quarters(yaw))?;
        }

        let offset = self.target_offset(signals);
        let len = self.len();
        obs.resize(len, 0.0);
        for (i, channel) in self.channels.iter().enumerate() {
            obs[len - 1 - i] = match channel {
                Channel::Yaw => yaw.unwrap_or(0.0) as f32 / 360.0,
                Channel::Facing => {
                    match is_facing(signals, &self.agent_name, &self.target_name) {
                        Some(true) => 1.0,
                        _ => 0.0,
                    }
                }
                Channel::TargetX => offset.map_or(0.0, |o| o.0 as f32 / 2.0),
                Channel::TargetY => offset.map_or(0.0, |o| o.1 as f32 / 2.0),
                Channel::TargetZ => offset.map_or(0.0, |o| o.2 as f32 / 2.0),
                Channel::Pitch => signals.pitch.map_or(0.0, |p| p as f32 / 90.0),
            };
        }

        Some(obs)
    }

    fn target_offset(&self, signals: &ExtractedSignals) -> Option<(f64, f64, f64)> {
        let (ax, ay, az) = signals.entity(&self.agent_name)?.position()?;
        let (tx, ty, tz) = signals.entity(&self.target_name)?.position()?;
        Some((tx - ax, ty - ay, tz - az))
    }
}

/// The number of quarter turns applied to the grid for a yaw in `[0, 360)`.
pub fn rotation_quarters(yaw: f64) -> usize {
    let yaw = normalize_angle(yaw);
    if (225.0..315.0).contains(&yaw) {
        1
    } else if (45.0..135.0).contains(&yaw) {
        3
    } else if (135.0..225.0).contains(&yaw) {
        0
    } else {
        2
    }
}

/// Rotates a flat `(height, width, width)` grid by `k` quarter turns in the
/// horizontal plane.
///
/// One quarter turn maps cell `[y, i, j]` to `[y, width - 1 - j, i]`.
fn rotate_grid(grid: Vec<f32>, height: usize, width: usize, k: usize) -> Option<Vec<f32>> {
    let grid = Array3::from_shape_vec((height, width, width), grid).ok()?;
    let mut view = grid.view();
    for _ in 0..k % 4 {
        view = view.slice_move(s![.., .., ..;-1]).permuted_axes([0, 2, 1]);
    }
    Some(view.iter().copied().collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::util::test::PayloadBuilder;

    type Config = SteveEnvConfig<()>;

    fn signals(payload: PayloadBuilder) -> ExtractedSignals {
        ExtractedSignals::from_json(&payload.build()).unwrap()
    }

    fn one_block_at(ix: usize) -> Vec<String> {
        (0..9)
            .map(|i| (if i == ix { "cobblestone" } else { "air" }).to_string())
            .collect()
    }

    #[test]
    fn test_layout_length() {
        let config = Config::default()
            .reward_facing(true)
            .obs_target_coords(true)
            .obs_pitch(true);
        assert_eq!(ObservationLayout::new(&config).len(), 33);

        let config = config.yaw_obs_simplifier(true);
        let layout = ObservationLayout::new(&config);
        assert_eq!(layout.len(), 32);
        assert_eq!(layout.index_of(Channel::Facing), Some(31));
        assert_eq!(layout.index_of(Channel::Pitch), Some(27));
        assert_eq!(layout.index_of(Channel::Yaw), None);

        assert_eq!(ObservationLayout::new(&Config::default()).len(), 28);
    }

    #[test]
    fn test_grid_marks_building_block() {
        let layout = ObservationLayout::new(&Config::default());

        let obs = layout
            .assemble(&signals(PayloadBuilder::new().grid_of("cobblestone", 27)))
            .unwrap();
        assert!(obs[..27].iter().all(|&v| v == 1.0));

        let obs = layout
            .assemble(&signals(PayloadBuilder::new().grid_of("stone", 27)))
            .unwrap();
        assert!(obs[..27].iter().all(|&v| v == 0.0));
    }

    #[test]
    fn test_channels_fill_from_the_end() {
        let config = Config::default()
            .reward_facing(true)
            .obs_target_coords(true)
            .obs_pitch(true);
        let layout = ObservationLayout::new(&config);
        let s = signals(
            PayloadBuilder::new()
                .grid_of("air", 27)
                .agent(0.5, 0.5, 315.0)
                .target("Ghast", 4.5, 4.5)
                .pitch(45.0),
        );

        assert_eq!(
            layout.channels(),
            &[
                Channel::Yaw,
                Channel::Facing,
                Channel::TargetX,
                Channel::TargetY,
                Channel::TargetZ,
                Channel::Pitch,
            ]
        );

        let obs = layout.assemble(&s).unwrap();
        assert_eq!(obs.len(), 33);
        assert_eq!(obs[32], 315.0 / 360.0);
        assert_eq!(obs[31], 1.0);
        // The target stands one block below the agent.
        assert_eq!(&obs[28..31], &[2.0, -0.5, 2.0]);
        assert_eq!(obs[27], 0.5);
    }

    #[test]
    fn test_missing_target_zeroes_channels() {
        let config = Config::default().reward_facing(true).obs_target_coords(true);
        let layout = ObservationLayout::new(&config);
        let s = signals(PayloadBuilder::new().grid_of("air", 27).agent(0.5, 0.5, 90.0));

        let obs = layout.assemble(&s).unwrap();
        assert_eq!(&obs[27..], &[0.0, 0.0, 0.0, 0.0, 0.25]);
    }

    #[test]
    fn test_missing_signals() {
        let layout = ObservationLayout::new(&Config::default());
        assert_eq!(layout.assemble(&signals(PayloadBuilder::new().yaw(0.0))), None);
        assert_eq!(
            layout.assemble(&signals(PayloadBuilder::new().grid_of("air", 8).yaw(0.0))),
            None
        );
        assert_eq!(
            layout.assemble(&signals(PayloadBuilder::new().grid_of("air", 27))),
            None
        );
    }

    #[test]
    fn test_rotation_quarters() {
        assert_eq!(rotation_quarters(225.0), 1);
        assert_eq!(rotation_quarters(314.9), 1);
        assert_eq!(rotation_quarters(315.0), 2);
        assert_eq!(rotation_quarters(0.0), 2);
        assert_eq!(rotation_quarters(44.9), 2);
        assert_eq!(rotation_quarters(45.0), 3);
        assert_eq!(rotation_quarters(135.0), 0);
        assert_eq!(rotation_quarters(-90.0), 1);
        for yaw in (0..360).step_by(5) {
            let yaw = yaw as f64;
            assert_eq!(rotation_quarters(yaw), rotation_quarters(yaw + 360.0));
        }
    }

    #[test]
    fn test_rotated_grid() {
        let config = Config::default()
            .grid(1, 3)
            .reward_facing(true)
            .yaw_obs_simplifier(true);
        let layout = ObservationLayout::new(&config);
        let marked = |yaw: f64| {
            let s = signals(PayloadBuilder::new().grid(one_block_at(2)).yaw(yaw));
            let obs = layout.assemble(&s).unwrap();
            obs[..9].iter().position(|&v| v == 1.0)
        };

        assert_eq!(marked(180.0), Some(2));
        assert_eq!(marked(270.0), Some(0));
        assert_eq!(marked(0.0), Some(6));
        assert_eq!(marked(90.0), Some(8));
        assert_eq!(marked(630.0), marked(270.0));
    }

    #[test]
    fn test_quarter_turn_mapping() {
        let w = 4;
        let grid = (0..w * w).map(|v| v as f32).collect::<Vec<_>>();
        let rotated = rotate_grid(grid.clone(), 1, w, 1).unwrap();
        for i in 0..w {
            for j in 0..w {
                assert_eq!(rotated[(w - 1 - j) * w + i], grid[i * w + j]);
            }
        }
    }

    #[test]
    fn test_rotation_keeps_layers() {
        let grid = (0..18).map(|v| v as f32).collect::<Vec<_>>();
        let rotated = rotate_grid(grid.clone(), 2, 3, 1).unwrap();
        assert_eq!(&rotated[..9], &[2.0, 5.0, 8.0, 1.0, 4.0, 7.0, 0.0, 3.0, 6.0]);
        assert_eq!(&rotated[9..], &[11.0, 14.0, 17.0, 10.0, 13.0, 16.0, 9.0, 12.0, 15.0]);
        assert_eq!(rotate_grid(grid.clone(), 2, 3, 4), Some(grid));
    }
}
