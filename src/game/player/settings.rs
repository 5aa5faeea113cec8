// Player tuning data
//
// Speed settings are data-driven and may be absent while a character sheet is
// still loading; states treat a missing sheet as "do nothing" rather than a
// hard error. `validate` exists so the loading code can complain early.

use thiserror::Error;

use crate::engine::physics::LayerMask;

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("`{name}` must be finite and positive (got {value})")]
    NonPositive { name: &'static str, value: f32 },
}

/// Movement speeds and forces. Everything is in units per second.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpeedSettings {
    /// Top running speed on the ground.
    pub top_speed: f32,
    pub acceleration: f32,
    pub deceleration: f32,

    /// Top stick-driven speed in the air.
    pub top_air_speed: f32,
    pub air_acceleration: f32,
    pub air_deceleration: f32,

    pub gravity: f32,
    /// Fastest allowed fall speed.
    pub terminal_velocity: f32,
    /// Upward speed granted the moment a jump starts.
    pub base_jump_speed: f32,
}

impl SpeedSettings {
    /// How fast `speed` is relative to the ground top speed.
    pub fn top_speed_ratio(&self, speed: f32) -> f32 {
        if self.top_speed <= 0.0 {
            0.0
        } else {
            speed / self.top_speed
        }
    }

    pub fn validate(&self) -> Result<(), SettingsError> {
        let fields = [
            ("top_speed", self.top_speed),
            ("acceleration", self.acceleration),
            ("deceleration", self.deceleration),
            ("top_air_speed", self.top_air_speed),
            ("air_acceleration", self.air_acceleration),
            ("air_deceleration", self.air_deceleration),
            ("gravity", self.gravity),
            ("terminal_velocity", self.terminal_velocity),
            ("base_jump_speed", self.base_jump_speed),
        ];
        for (name, value) in fields {
            if !value.is_finite() || value <= 0.0 {
                return Err(SettingsError::NonPositive { name, value });
            }
        }
        Ok(())
    }
}

impl Default for SpeedSettings {
    fn default() -> Self {
        Self {
            top_speed: 9.0,
            acceleration: 45.0,
            deceleration: 30.0,
            top_air_speed: 10.0,
            air_acceleration: 30.0,
            air_deceleration: 15.0,
            gravity: 38.0,
            terminal_velocity: 50.0,
            base_jump_speed: 13.5,
        }
    }
}

/// Tunables for the wall jump and ledge grab mechanics.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MechanicSettings {
    /// Minimum angle in degrees between a wall's normal and up before the
    /// wall counts as steep enough to jump off.
    pub wall_jump_steepness_limit: f32,
    /// Walls within this many degrees of the previously attached wall count
    /// as the same wall for chaining purposes.
    pub wall_jump_horizontal_arc: f32,
    /// Maximum yaw deflection in degrees the stick can add when bouncing off
    /// a wall.
    pub wall_jump_bounce_off_arc: f32,
    /// Seconds after letting go of a ledge before it can be grabbed again.
    pub ledge_grab_wind_down_time: f32,
    /// Seconds after grabbing a ledge before climb input is honored.
    pub ledge_grab_inactionable_time: f32,
    /// Layers the detection rays and overlap tests may hit.
    pub collision_mask: LayerMask,
}

impl Default for MechanicSettings {
    fn default() -> Self {
        Self {
            wall_jump_steepness_limit: 80.0,
            wall_jump_horizontal_arc: 45.0,
            wall_jump_bounce_off_arc: 45.0,
            ledge_grab_wind_down_time: 0.2,
            ledge_grab_inactionable_time: 0.3,
            collision_mask: LayerMask::ALL,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings_validate() {
        assert!(SpeedSettings::default().validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut settings = SpeedSettings::default();
        settings.gravity = 0.0;
        assert!(settings.validate().is_err());
        settings.gravity = f32::NAN;
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_top_speed_ratio() {
        let settings = SpeedSettings {
            top_speed: 10.0,
            ..Default::default()
        };
        assert_eq!(settings.top_speed_ratio(5.0), 0.5);
        assert_eq!(settings.top_speed_ratio(20.0), 2.0);
    }
}
