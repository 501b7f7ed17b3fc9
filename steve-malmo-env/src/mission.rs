//! Mission description sent to the Malmo client.
use crate::{MovementMode, ProblemType, SteveEnvConfig};

/// Range of the nearby-entity observation, on each axis.
const ENTITY_RANGE: i32 = 20;

/// A mission in the XML schema of Project Malmo.
#[derive(Debug, Clone, PartialEq)]
pub struct MissionSpec {
    xml: String,
}

impl MissionSpec {
    /// Wraps a mission document.
    pub fn new(xml: impl Into<String>) -> Self {
        Self { xml: xml.into() }
    }

    /// The mission document.
    pub fn xml(&self) -> &str {
        &self.xml
    }

    /// Renders the mission of a configuration.
    ///
    /// `rng` places the target in one of the four diagonal corners when
    /// `random_spawn` is set.
    pub fn from_config<S>(config: &SteveEnvConfig<S>, rng: &mut fastrand::Rng) -> Self {
        let d = config.enemy_spawn_distance;
        let (x, z) = if config.random_spawn {
            (
                if rng.bool() { d } else { -d },
                if rng.bool() { d } else { -d },
            )
        } else {
            (d, d)
        };

        let a = config.arena_size;
        let mut drawing = format!(
            "<DrawCuboid x1='{}' x2='{}' y1='2' y2='5' z1='{}' z2='{}' type='air'/>\
             <DrawCuboid x1='{}' x2='{}' y1='1' y2='1' z1='{}' z2='{}' type='stone'/>",
            -a, a, -a, a, -a, a, -a, a
        );
        drawing.push_str(&problem_decorations(config.problem, &config.target_name));
        drawing.push_str(&format!(
            "<DrawEntity x='{}' y='1' z='{}' type='{}'/>",
            x, z, config.target_name
        ));
        drawing.push_str("<DrawBlock x='0' y='2' z='0' type='air'/>");
        drawing.push_str("<DrawBlock x='0' y='1' z='0' type='stone'/>");

        let movement = match config.movement {
            MovementMode::Discrete => "<DiscreteMovementCommands/>",
            MovementMode::Continuous => "<ContinuousMovementCommands/>",
        };
        let r = config.obs_size / 2;
        let high_y = config.obs_height as i64 - 2;

        let xml = format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="no" ?>
<Mission xmlns="http://ProjectMalmo.microsoft.com" xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance">
  <About>
    <Summary>SteveTheBuilder</Summary>
  </About>
  <ServerSection>
    <ServerInitialConditions>
      <Time>
        <StartTime>12000</StartTime>
        <AllowPassageOfTime>false</AllowPassageOfTime>
      </Time>
      <Weather>clear</Weather>
    </ServerInitialConditions>
    <ServerHandlers>
      <FlatWorldGenerator generatorString="3;7,2;1;"/>
      <DrawingDecorator>{drawing}</DrawingDecorator>
      <ServerQuitWhenAnyAgentFinishes/>
    </ServerHandlers>
  </ServerSection>
  <AgentSection mode="Survival">
    <Name>{agent}</Name>
    <AgentStart>
      <Placement x="0.5" y="2" z="0.5" pitch="45" yaw="0"/>
      <Inventory>
        <InventoryItem slot="0" type="{block}" quantity="{quantity}"/>
      </Inventory>
    </AgentStart>
    <AgentHandlers>
      {movement}
      <ObservationFromFullStats/>
      <ObservationFromRay/>
      <ObservationFromGrid>
        <Grid name="nearbyVolume">
          <min x="-{r}" y="-1" z="-{r}"/>
          <max x="{r}" y="{high_y}" z="{r}"/>
        </Grid>
      </ObservationFromGrid>
      <ObservationFromNearbyEntities>
        <Range name="entities" xrange="{range}" yrange="{range}" zrange="{range}"/>
      </ObservationFromNearbyEntities>
      <AgentQuitFromReachingCommandQuota total="{quota}"/>
      <AgentQuitFromTouchingBlockType>
        <Block type="bedrock"/>
      </AgentQuitFromTouchingBlockType>
      <RewardForTimeTaken initialReward="1" delta="1" density="PER_TICK"/>
    </AgentHandlers>
  </AgentSection>
</Mission>"#,
            drawing = drawing,
            agent = config.agent_name,
            block = config.player_block,
            quantity = config.block_quantity,
            movement = movement,
            r = r,
            high_y = high_y,
            range = ENTITY_RANGE,
            quota = config.episode_steps(),
        );

        Self { xml }
    }
}

fn problem_decorations(problem: ProblemType, target_name: &str) -> String {
    match problem {
        ProblemType::Flat => String::new(),
        // Stepped pyramid west of the spawn, one layer narrower per block up.
        ProblemType::Hill => (2..5)
            .zip((1..4).rev())
            .map(|(level, half)| {
                format!(
                    "<DrawCuboid x1='{}' x2='{}' y1='{}' y2='{}' z1='{}' z2='{}' type='stone'/>",
                    -6 - half,
                    -6 + half,
                    level,
                    level,
                    -half,
                    half
                )
            })
            .collect(),
        ProblemType::SheepWater => {
            let pools = [(-7, -7), (-7, 5), (5, -7), (5, 5)].iter().map(|(px, pz)| {
                format!(
                    "<DrawCuboid x1='{}' x2='{}' y1='0' y2='1' z1='{}' z2='{}' type='water'/>",
                    px,
                    px + 2,
                    pz,
                    pz + 2
                )
            });
            let sheep = [(2, 0), (-2, 0), (0, 2)].iter().map(|(sx, sz)| {
                format!(
                    "<DrawEntity x='{}' y='2' z='{}' type='{}'/>",
                    sx, sz, target_name
                )
            });
            pools.chain(sheep).collect()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    type Config = SteveEnvConfig<()>;

    #[test]
    fn test_flat_mission() {
        let config = Config::default().random_spawn(false);
        let mission = MissionSpec::from_config(&config, &mut fastrand::Rng::with_seed(42));
        let xml = mission.xml();

        assert!(xml.contains("<DrawEntity x='4' y='1' z='4' type='Ghast'/>"));
        assert!(xml.contains(r#"<InventoryItem slot="0" type="cobblestone" quantity="63"/>"#));
        assert!(xml.contains("<DiscreteMovementCommands/>"));
        assert!(xml.contains(r#"<min x="-1" y="-1" z="-1"/>"#));
        assert!(xml.contains(r#"<max x="1" y="1" z="1"/>"#));
        assert!(xml.contains(r#"<AgentQuitFromReachingCommandQuota total="100"/>"#));
        assert!(xml.contains(r#"<Range name="entities""#));
        assert!(!xml.contains("water"));
    }

    #[test]
    fn test_grid_bounds_follow_size() {
        let config = Config::default()
            .grid(5, 5)
            .movement(MovementMode::Continuous);
        let mission = MissionSpec::from_config(&config, &mut fastrand::Rng::with_seed(0));
        let xml = mission.xml();

        assert!(xml.contains(r#"<min x="-2" y="-1" z="-2"/>"#));
        assert!(xml.contains(r#"<max x="2" y="3" z="2"/>"#));
        assert!(xml.contains("<ContinuousMovementCommands/>"));
        assert!(xml.contains(r#"total="300""#));
    }

    #[test]
    fn test_random_spawn_corners() {
        let config = Config::default();
        let mut rng = fastrand::Rng::with_seed(7);
        for _ in 0..20 {
            let mission = MissionSpec::from_config(&config, &mut rng);
            let corners = [(4, 4), (4, -4), (-4, 4), (-4, -4)];
            let n = corners
                .iter()
                .filter(|(x, z)| {
                    mission
                        .xml()
                        .contains(&format!("<DrawEntity x='{}' y='1' z='{}' type='Ghast'/>", x, z))
                })
                .count();
            assert_eq!(n, 1);
        }
    }

    #[test]
    fn test_problem_variants() {
        let mut rng = fastrand::Rng::with_seed(1);
        let hill = Config::default().problem(ProblemType::Hill);
        let hill = MissionSpec::from_config(&hill, &mut rng);
        assert!(hill.xml().contains("y1='4' y2='4' z1='-1' z2='1' type='stone'"));

        let sheep = MissionSpec::from_config(
            &Config::default().problem(ProblemType::SheepWater),
            &mut rng,
        );
        assert!(sheep.xml().contains("type='water'"));
        assert!(sheep.xml().contains("type='Sheep'"));
        assert!(!sheep.xml().contains("Ghast"));
    }
}
