//! Signals carried by the JSON observation payload of a Malmo world state.
use crate::WorldState;
use log::{trace, warn};
use serde::Deserialize;

/// An entity in the `entities` list of nearby entities.
///
/// Fields the client did not report are `None`.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct Entity {
    /// Entity type or player name.
    #[serde(default)]
    pub name: String,

    /// Unique id of the entity.
    #[serde(default)]
    pub id: Option<String>,

    /// Position on x.
    #[serde(default)]
    pub x: Option<f64>,

    /// Position on y.
    #[serde(default)]
    pub y: Option<f64>,

    /// Position on z.
    #[serde(default)]
    pub z: Option<f64>,

    /// Horizontal orientation in degrees, 0 facing south (+z), increasing clockwise.
    #[serde(default)]
    pub yaw: Option<f64>,
}

impl Entity {
    /// Position on the horizontal plane, `(x, z)`.
    pub fn planar_position(&self) -> Option<(f64, f64)> {
        Some((self.x?, self.z?))
    }

    /// Position in space, `(x, y, z)`.
    pub fn position(&self) -> Option<(f64, f64, f64)> {
        Some((self.x?, self.y?, self.z?))
    }
}

/// Typed fields of one observation payload.
///
/// Any field may be missing when the client skipped it for a tick.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct ExtractedSignals {
    /// Health of the agent.
    #[serde(rename = "Life", default)]
    pub life: Option<f64>,

    /// Damage taken since the session started.
    #[serde(rename = "DamageTaken", default)]
    pub damage_taken: Option<i64>,

    /// Stack size of the first hotbar slot, holding the building block.
    #[serde(rename = "InventorySlot_0_size", default)]
    pub inventory_slot_0_size: Option<i64>,

    /// Horizontal orientation of the agent in degrees.
    #[serde(rename = "Yaw", default)]
    pub yaw: Option<f64>,

    /// Vertical orientation of the agent in degrees, positive looking down.
    #[serde(rename = "Pitch", default)]
    pub pitch: Option<f64>,

    /// Block types around the agent, y-major then z then x.
    #[serde(rename = "nearbyVolume", default)]
    pub grid: Option<Vec<String>>,

    /// Entities around the agent, including the agent itself.
    #[serde(rename = "entities", default)]
    pub entities: Vec<Entity>,
}

impl ExtractedSignals {
    /// Parses a JSON observation payload.
    pub fn from_json(payload: &str) -> serde_json::Result<Self> {
        serde_json::from_str(payload)
    }

    /// Finds the first entity with the given name.
    pub fn entity(&self, name: &str) -> Option<&Entity> {
        self.entities.iter().find(|e| e.name == name)
    }
}

/// Extracts the signals of the freshest observation in a world state.
///
/// Returns `None` when the mission is not running, no observation arrived since
/// the previous poll, or the payload cannot be parsed. None of these end the
/// episode; the caller keeps its previous observation for this tick.
pub fn extract(state: &WorldState) -> Option<ExtractedSignals> {
    if !state.is_mission_running || !state.has_new_observation() {
        trace!("No new observation");
        return None;
    }

    let payload = state.latest_observation()?;
    match ExtractedSignals::from_json(payload) {
        Ok(signals) => Some(signals),
        Err(e) => {
            warn!("Malformed observation payload: {}", e);
            None
        }
    }
}
