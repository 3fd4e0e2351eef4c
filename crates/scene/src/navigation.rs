//! Orbit navigation: arcball rotation with inertia, damping and smooth zoom.
//!
//! The controller orbits a camera around the origin. Dragging rotates the
//! camera frame so the globe follows the pointer; on release the last drag
//! velocity keeps spinning the view and decays by `damping` per 60 Hz frame.

use std::collections::VecDeque;

use foundation::math::{Quat, Vec3};

use crate::camera::PerspectiveCamera;

/// Inertia stops below this per-frame angle (radians).
const ANGULAR_VELOCITY_THRESHOLD: f64 = 1e-5;

/// Zoom smoothing rate (per second).
const ZOOM_SMOOTHING: f64 = 8.0;

/// Maximum samples kept for release velocity estimation.
const VELOCITY_HISTORY_SIZE: usize = 5;

/// Per-frame spin is capped so a flick can't whirl the globe.
const MAX_FRAME_ANGLE: f64 = 0.2;

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct OrbitSettings {
    pub min_distance: f64,
    pub max_distance: f64,
    /// Fraction of angular velocity lost per 60 Hz frame.
    pub damping: f64,
    pub zoom_speed: f64,
    pub fov_y_rad: f64,
    pub near: f64,
    pub far: f64,
}

impl Default for OrbitSettings {
    fn default() -> Self {
        Self {
            min_distance: 110.0,
            max_distance: 600.0,
            damping: 0.05,
            zoom_speed: 1.0,
            fov_y_rad: 60f64.to_radians(),
            near: 0.1,
            far: 1000.0,
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct VelocitySample {
    delta: Quat,
    dt: f64,
}

#[derive(Debug, Clone)]
pub struct OrbitController {
    settings: OrbitSettings,
    orientation: Quat,
    distance: f64,
    target_distance: f64,
    angular_velocity: Quat,
    inertia_active: bool,
    viewport: [f64; 2],
    dragging: bool,
    arcball_last: Option<Vec3>,
    last_sample_s: f64,
    history: VecDeque<VelocitySample>,
}

impl OrbitController {
    pub fn new(settings: OrbitSettings, distance: f64) -> Self {
        let distance = distance.clamp(settings.min_distance, settings.max_distance);
        Self {
            settings,
            orientation: Quat::IDENTITY,
            distance,
            target_distance: distance,
            angular_velocity: Quat::IDENTITY,
            inertia_active: false,
            viewport: [1280.0, 720.0],
            dragging: false,
            arcball_last: None,
            last_sample_s: 0.0,
            history: VecDeque::with_capacity(VELOCITY_HISTORY_SIZE),
        }
    }

    pub fn set_viewport(&mut self, width: f64, height: f64) {
        self.viewport = [width.max(1.0), height.max(1.0)];
    }

    pub fn is_dragging(&self) -> bool {
        self.dragging
    }

    pub fn is_inertia_active(&self) -> bool {
        self.inertia_active
    }

    pub fn distance(&self) -> f64 {
        self.distance
    }

    pub fn orientation(&self) -> Quat {
        self.orientation
    }

    pub fn on_pointer_down(&mut self, pos_px: [f64; 2], now_s: f64) {
        self.stop_inertia();
        self.dragging = true;
        self.last_sample_s = now_s;
        self.arcball_last = Some(self.screen_to_arcball(pos_px));
    }

    pub fn on_pointer_move(&mut self, pos_px: [f64; 2], now_s: f64) {
        if !self.dragging {
            return;
        }
        let dt = (now_s - self.last_sample_s).max(1e-6);
        self.last_sample_s = now_s;

        let next = self.screen_to_arcball(pos_px);
        if let Some(prev) = self.arcball_last {
            let delta = Quat::from_unit_vectors(prev, next);
            self.apply_local_rotation(delta);
            self.history.push_back(VelocitySample { delta, dt });
            if self.history.len() > VELOCITY_HISTORY_SIZE {
                self.history.pop_front();
            }
        }
        self.arcball_last = Some(next);
    }

    pub fn on_pointer_up(&mut self) {
        if !self.dragging {
            return;
        }
        self.angular_velocity = self.estimate_angular_velocity();
        self.inertia_active = self.angular_velocity.angle() > ANGULAR_VELOCITY_THRESHOLD;
        self.dragging = false;
        self.arcball_last = None;
        self.history.clear();
    }

    /// Positive deltas zoom out.
    pub fn on_wheel(&mut self, delta: f64) {
        self.inertia_active = false;
        let factor = (delta * 0.002 * self.settings.zoom_speed).exp();
        self.target_distance = (self.target_distance * factor)
            .clamp(self.settings.min_distance, self.settings.max_distance);
    }

    /// Steps inertia and zoom smoothing.
    pub fn update(&mut self, dt: f64) {
        let dt = dt.clamp(0.0, 0.1);

        if self.inertia_active && !self.dragging {
            let frames = dt * 60.0;
            let step = Quat::IDENTITY.slerp(self.angular_velocity, frames);
            self.apply_local_rotation(step);

            let decay = (1.0 - self.settings.damping.clamp(0.0, 1.0)).powf(frames);
            self.angular_velocity = Quat::IDENTITY.slerp(self.angular_velocity, decay);
            if self.angular_velocity.angle() < ANGULAR_VELOCITY_THRESHOLD {
                self.stop_inertia();
            }
        }

        let alpha = 1.0 - (-ZOOM_SMOOTHING * dt).exp();
        self.distance += (self.target_distance - self.distance) * alpha;
        self.distance = self
            .distance
            .clamp(self.settings.min_distance, self.settings.max_distance);
    }

    pub fn stop_inertia(&mut self) {
        self.inertia_active = false;
        self.angular_velocity = Quat::IDENTITY;
        self.history.clear();
    }

    pub fn eye_position(&self) -> Vec3 {
        self.orientation.rotate(Vec3::new(0.0, 0.0, self.distance))
    }

    pub fn camera(&self) -> PerspectiveCamera {
        PerspectiveCamera::look_at(
            self.eye_position(),
            Vec3::ZERO,
            self.orientation.rotate(Vec3::Y),
            self.settings.fov_y_rad,
            self.settings.near,
            self.settings.far,
        )
    }

    /// Rotates the camera frame by the inverse of a camera-space rotation.
    fn apply_local_rotation(&mut self, delta: Quat) {
        self.orientation = self.orientation.mul(delta.conjugate()).normalize();
    }

    fn screen_to_arcball(&self, pos_px: [f64; 2]) -> Vec3 {
        let [w, h] = self.viewport;
        let min_dim = w.min(h).max(1.0);
        let nx = (2.0 * pos_px[0] - w) / min_dim;
        let ny = (h - 2.0 * pos_px[1]) / min_dim;

        let r2 = nx * nx + ny * ny;
        if r2 <= 1.0 {
            Vec3::new(nx, ny, (1.0 - r2).sqrt()).normalize_or_self()
        } else {
            let inv_r = 1.0 / r2.sqrt();
            Vec3::new(nx * inv_r, ny * inv_r, 0.0).normalize_or_self()
        }
    }

    /// Average drag rotation expressed per 60 Hz frame.
    fn estimate_angular_velocity(&self) -> Quat {
        let total_dt: f64 = self.history.iter().map(|s| s.dt).sum();
        if self.history.is_empty() || total_dt <= 0.0 {
            return Quat::IDENTITY;
        }
        let composed = self
            .history
            .iter()
            .fold(Quat::IDENTITY, |acc, s| s.delta.mul(acc).normalize());
        let per_frame = Quat::IDENTITY.slerp(composed, (1.0 / 60.0) / total_dt);
        let angle = per_frame.angle();
        if angle > MAX_FRAME_ANGLE {
            Quat::IDENTITY.slerp(per_frame, MAX_FRAME_ANGLE / angle)
        } else {
            per_frame
        }
    }
}
