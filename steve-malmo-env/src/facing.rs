//! Whether the agent looks towards the target.
//!
//! Angles follow the Minecraft yaw convention: 0 degrees faces south (+z), and
//! the angle increases clockwise seen from above, so 90 faces west (-x), 180
//! north (-z) and 270 east (+x).
use crate::{Entity, ExtractedSignals};

/// Half-width of the facing cone in degrees.
pub const FACING_TOLERANCE: f64 = 70.0;

/// Normalizes an angle in degrees to `[0, 360)`.
pub fn normalize_angle(deg: f64) -> f64 {
    let a = deg.rem_euclid(360.0);
    // rem_euclid can round up to the modulus for tiny negative inputs.
    if a >= 360.0 {
        0.0
    } else {
        a
    }
}

/// Bearing from `from` to `to` on the horizontal plane, in `[0, 360)`.
///
/// Returns `None` when both points coincide.
pub fn bearing(from: (f64, f64), to: (f64, f64)) -> Option<f64> {
    let dx = to.0 - from.0;
    let dz = to.1 - from.1;
    let dist = (dx * dx + dz * dz).sqrt();
    if dist == 0.0 {
        return None;
    }

    // Angle off the z axis, in [0, 90].
    let theta = (dz.abs() / dist).min(1.0).acos().to_degrees();
    let b = match (dx <= 0.0, dz >= 0.0) {
        // south-west
        (true, true) => theta,
        // north-west
        (true, false) => 180.0 - theta,
        // north-east
        (false, false) => 180.0 + theta,
        // south-east
        (false, true) => 360.0 - theta,
    };

    Some(normalize_angle(b))
}

/// Returns `true` iff `yaw` lies within [`FACING_TOLERANCE`] of `bearing` on the circle.
pub fn within_cone(yaw: f64, bearing: f64) -> bool {
    let diff = normalize_angle(yaw - bearing);
    diff <= FACING_TOLERANCE || diff >= 360.0 - FACING_TOLERANCE
}

/// Whether `agent` faces `target`, `None` if a position or the yaw is unknown.
pub fn entity_faces(agent: &Entity, target: &Entity) -> Option<bool> {
    let b = bearing(agent.planar_position()?, target.planar_position()?)?;
    Some(within_cone(agent.yaw?, b))
}

/// Whether the named agent faces the named target in this tick's entity list.
///
/// `None` when either entity, or its position or orientation, is missing.
pub fn is_facing(signals: &ExtractedSignals, agent_name: &str, target_name: &str) -> Option<bool> {
    entity_faces(signals.entity(agent_name)?, signals.entity(target_name)?)
}
