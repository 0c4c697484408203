use glam::{Mat4, Quat, Vec3};

/// World up axis. The camera never rolls.
const UP: Vec3 = Vec3::Y;

const DEFAULT_POSITION: Vec3 = Vec3::new(0.0, 10.0, 30.0);
const FOV: f32 = std::f32::consts::FRAC_PI_4;
const NEAR: f32 = 0.01;
const FAR: f32 = 1000.0;

/// Free-fly camera driven by a normalized direction vector.
///
/// Mouse deltas yaw the direction around the up axis and pitch it around
/// the lateral axis `cross(up, direction)`. A pitch step that would push
/// the accumulated pitch past the limit is rejected whole, so the camera
/// can never flip over the poles and the lateral axis stays well-defined.
pub struct Camera {
    pub position: Vec3,
    direction: Vec3,
    pitch: f32,
    pitch_limit: f32,
    pub speed: f32,
    /// Degrees of yaw per pixel of horizontal mouse motion.
    pub yaw_sensitivity: f32,
    /// Degrees of pitch per pixel of vertical mouse motion.
    pub pitch_sensitivity: f32,
    aspect: f32,
    projection: Mat4,
}

impl Camera {
    /// Camera at the default pose, looking at the origin.
    pub fn new(aspect: f32) -> Self {
        Self::looking_at(DEFAULT_POSITION, Vec3::ZERO, aspect)
    }

    /// Camera at `position` looking toward `target`.
    pub fn looking_at(position: Vec3, target: Vec3, aspect: f32) -> Self {
        let direction = (target - position).normalize();
        Self {
            position,
            direction,
            pitch: direction.y.clamp(-1.0, 1.0).asin(),
            pitch_limit: 80.0_f32.to_radians(),
            speed: 10.0,
            yaw_sensitivity: 0.25,
            pitch_sensitivity: 0.15,
            aspect,
            projection: Mat4::perspective_rh(FOV, aspect, NEAR, FAR),
        }
    }

    /// Current look direction (unit length).
    pub fn direction(&self) -> Vec3 {
        self.direction
    }

    /// Yaw angle derived from the direction vector, zero when looking
    /// down -Z.
    pub fn yaw(&self) -> f32 {
        self.direction.x.atan2(-self.direction.z)
    }

    /// Pitch angle derived from the direction vector.
    pub fn pitch(&self) -> f32 {
        self.direction.y.clamp(-1.0, 1.0).asin()
    }

    /// Lateral axis pointing to the camera's left.
    fn lateral(&self) -> Vec3 {
        UP.cross(self.direction)
    }

    pub fn move_forward(&mut self, dt: f32) {
        self.position += self.direction * self.speed * dt;
    }

    pub fn move_backward(&mut self, dt: f32) {
        self.position -= self.direction * self.speed * dt;
    }

    pub fn move_left(&mut self, dt: f32) {
        self.position += self.lateral() * self.speed * dt;
    }

    pub fn move_right(&mut self, dt: f32) {
        self.position -= self.lateral() * self.speed * dt;
    }

    pub fn move_up(&mut self, dt: f32) {
        self.position += UP * self.speed * dt;
    }

    pub fn move_down(&mut self, dt: f32) {
        self.position -= UP * self.speed * dt;
    }

    /// Apply a mouse delta: yaw around the up axis, then pitch around the
    /// lateral axis unless the step would exceed the pitch limit.
    pub fn rotate(&mut self, dx: f32, dy: f32) {
        let yaw_step = (-self.yaw_sensitivity * dx).to_radians();
        self.direction = (Quat::from_axis_angle(UP, yaw_step) * self.direction).normalize();

        // Up-positive pitch: dragging the mouse down pitches the view down.
        let pitch_step = (-self.pitch_sensitivity * dy).to_radians();
        if (self.pitch + pitch_step).abs() < self.pitch_limit {
            let lateral = self.lateral().normalize();
            self.direction =
                (Quat::from_axis_angle(lateral, -pitch_step) * self.direction).normalize();
            self.pitch += pitch_step;
        }
    }

    /// Recompute the projection for a new surface aspect ratio.
    pub fn set_aspect(&mut self, aspect: f32) {
        self.aspect = aspect;
        self.projection = Mat4::perspective_rh(FOV, aspect, NEAR, FAR);
    }

    pub fn aspect(&self) -> f32 {
        self.aspect
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.position + self.direction, UP)
    }

    pub fn projection_matrix(&self) -> Mat4 {
        self.projection
    }

    pub fn view_projection(&self) -> Mat4 {
        self.projection * self.view_matrix()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f32 = 1e-4;

    #[test]
    fn default_camera_looks_at_origin() {
        let cam = Camera::new(16.0 / 9.0);
        let expected = (Vec3::ZERO - DEFAULT_POSITION).normalize();
        assert!((cam.direction() - expected).length() < EPS);
        let vp = cam.view_projection();
        assert!(!vp.col(0).x.is_nan());
    }

    #[test]
    fn direction_stays_unit_length() {
        let mut cam = Camera::new(1.0);
        // Irregular sweep of mouse deltas, including large ones.
        for i in 0..500 {
            let dx = ((i * 37) % 101) as f32 - 50.0;
            let dy = ((i * 53) % 89) as f32 - 44.0;
            cam.rotate(dx, dy);
            assert!((cam.direction().length() - 1.0).abs() < EPS);
        }
    }

    #[test]
    fn pitch_never_exceeds_limit() {
        let mut cam = Camera::new(1.0);
        let limit = 80.0_f32.to_radians();
        // Drag straight down hard, then straight up hard.
        for _ in 0..200 {
            cam.rotate(0.0, 40.0);
            assert!(cam.pitch().abs() < limit + EPS);
        }
        for _ in 0..400 {
            cam.rotate(0.0, -40.0);
            assert!(cam.pitch().abs() < limit + EPS);
        }
    }

    #[test]
    fn overlarge_pitch_step_is_rejected_whole() {
        let mut cam = Camera::looking_at(Vec3::ZERO, Vec3::new(0.0, 0.0, -1.0), 1.0);
        let before = cam.direction();
        // 0.15 deg/px * 1000 px = 150 deg, past the 80 deg limit.
        cam.rotate(0.0, 1000.0);
        assert!((cam.direction() - before).length() < EPS);
    }

    #[test]
    fn zero_delta_is_a_noop() {
        let mut cam = Camera::new(1.0);
        let before = cam.direction();
        cam.rotate(0.0, 0.0);
        assert!((cam.direction() - before).length() < EPS);
    }

    #[test]
    fn strafe_left_when_facing_minus_z() {
        let mut cam = Camera::looking_at(Vec3::ZERO, Vec3::new(0.0, 0.0, -1.0), 1.0);
        cam.move_left(1.0);
        assert!(cam.position.x < 0.0);
        assert!(cam.position.z.abs() < EPS);
    }

    #[test]
    fn forward_moves_along_direction() {
        let mut cam = Camera::looking_at(Vec3::ZERO, Vec3::new(0.0, 0.0, -1.0), 1.0);
        cam.move_forward(1.0);
        assert!(cam.position.z < 0.0);
        cam.move_backward(2.0);
        assert!(cam.position.z > 0.0);
    }

    #[test]
    fn view_matrix_is_identity_at_canonical_pose() {
        let cam = Camera::looking_at(Vec3::ZERO, Vec3::new(0.0, 0.0, -1.0), 1.0);
        let p = cam.view_matrix().transform_point3(Vec3::new(1.0, 2.0, -5.0));
        assert!((p - Vec3::new(1.0, 2.0, -5.0)).length() < EPS);
    }

    #[test]
    fn set_aspect_changes_projection() {
        let mut cam = Camera::new(1.0);
        let before = cam.projection_matrix();
        cam.set_aspect(2.0);
        assert_ne!(before, cam.projection_matrix());
        assert_eq!(cam.aspect(), 2.0);
    }
}
