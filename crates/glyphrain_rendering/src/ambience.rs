//! Scene ambience: a slow Lissajous camera sway and two wireframe grids whose
//! opacity breathes out of phase. Both are pure functions of simulated time.

use std::f64::consts::TAU;

use glyphrain_core::{AmbienceConfig, Vec3};

/// Camera sway and grid opacities for one frame.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct SceneAmbience {
    /// Camera position offset from its rest position (z is always 0).
    pub camera_offset: Vec3,
    /// Point the camera keeps looking at.
    pub look_at: Vec3,
    /// Opacity of the front and back grid.
    pub grid_opacity: [f32; 2],
}

impl SceneAmbience {
    /// Ambience at `time`, with grid opacity scaled by `brightness`.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn at(time: f64, config: &AmbienceConfig, brightness: f32) -> Self {
        let sway_x = (time * f64::from(config.sway_x_rate)).sin() as f32 * config.sway_x;
        let sway_y = (time * f64::from(config.sway_y_rate)).sin() as f32 * config.sway_y;

        let period = f64::from(config.grid_period);
        let lead = period * f64::from(config.grid_phase_offset);
        let phases = [pulse_phase(time, period), pulse_phase(time + lead, period)];

        Self {
            camera_offset: Vec3::new(sway_x, sway_y, 0.0),
            look_at: Vec3::new(0.0, 0.0, config.look_at_z),
            grid_opacity: [0, 1].map(|i| {
                ((config.grid_floor + phases[i] * config.grid_pulse[i]) * brightness).clamp(0.0, 1.0)
            }),
        }
    }
}

/// `(sin(2π t / period) + 1) / 2`, in `[0, 1]`.
#[allow(clippy::cast_possible_truncation)]
fn pulse_phase(time: f64, period: f64) -> f32 {
    if period <= 0.0 {
        return 0.5;
    }
    (((time / period * TAU).sin() + 1.0) * 0.5) as f32
}
