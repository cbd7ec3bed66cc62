//! Built-in gizmo catalog
//!
//! Each gizmo keeps its own clock and re-poses its primitives from that clock
//! on every update, so animation is a pure function of accumulated time.
//! All gizmos fit inside the unit ball around the origin.

use std::f32::consts::{PI, TAU};

use prism_math::{mat3, Vec3};

use crate::{Gizmo, GizmoConfig, Primitive};

/// Spheres on tilted circular orbits around a central core
pub struct Orbiters {
    time: f32,
    primitives: Vec<Primitive>,
}

impl Orbiters {
    const COUNT: usize = 5;

    pub fn new() -> Self {
        let mut g = Self {
            time: 0.0,
            primitives: Vec::with_capacity(Self::COUNT + 1),
        };
        g.pose();
        g
    }

    fn pose(&mut self) {
        self.primitives.clear();
        self.primitives.push(Primitive::sphere(Vec3::ZERO, 0.22));
        for i in 0..Self::COUNT {
            let phase = i as f32 * TAU / Self::COUNT as f32;
            let tilt = mat3::from_euler(0.4 * i as f32, phase, 0.0);
            let angle = self.time * (0.8 + 0.15 * i as f32) + phase;
            let local = Vec3::new(angle.cos() * 0.6, 0.0, angle.sin() * 0.6);
            self.primitives
                .push(Primitive::sphere(mat3::transform(&tilt, local), 0.14));
        }
    }
}

impl Gizmo for Orbiters {
    fn name(&self) -> &'static str {
        "orbiters"
    }

    fn update(&mut self, dt: f32, config: &GizmoConfig) {
        self.time += dt * config.speed;
        self.pose();
    }

    fn primitives(&self) -> &[Primitive] {
        &self.primitives
    }
}

/// Three nested rings tumbling on different axes
pub struct Gyroscope {
    time: f32,
    primitives: Vec<Primitive>,
}

impl Gyroscope {
    pub fn new() -> Self {
        let mut g = Self {
            time: 0.0,
            primitives: Vec::with_capacity(4),
        };
        g.pose();
        g
    }

    fn pose(&mut self) {
        let t = self.time;
        self.primitives.clear();
        self.primitives.push(Primitive::torus(
            Vec3::ZERO,
            mat3::from_euler(t * 0.5, 0.0, 0.0),
            0.7,
            0.06,
        ));
        self.primitives.push(Primitive::torus(
            Vec3::ZERO,
            mat3::from_euler(PI * 0.5, t * 0.7, 0.0),
            0.5,
            0.06,
        ));
        self.primitives.push(Primitive::torus(
            Vec3::ZERO,
            mat3::from_euler(0.0, 0.0, PI * 0.5 + t * 0.9),
            0.3,
            0.06,
        ));
        self.primitives.push(Primitive::sphere(Vec3::ZERO, 0.1));
    }
}

impl Gizmo for Gyroscope {
    fn name(&self) -> &'static str {
        "gyroscope"
    }

    fn update(&mut self, dt: f32, config: &GizmoConfig) {
        self.time += dt * config.speed;
        self.pose();
    }

    fn primitives(&self) -> &[Primitive] {
        &self.primitives
    }
}

/// Three capsules crossed like jacks, spinning as one body
pub struct Jacks {
    time: f32,
    primitives: Vec<Primitive>,
}

impl Jacks {
    pub fn new() -> Self {
        let mut g = Self {
            time: 0.0,
            primitives: Vec::with_capacity(7),
        };
        g.pose();
        g
    }

    fn pose(&mut self) {
        let t = self.time;
        let spin = mat3::from_euler(t * 0.3, t * 0.5, t * 0.2);
        self.primitives.clear();
        for axis in [Vec3::X, Vec3::Y, Vec3::Z] {
            let tip = mat3::transform(&spin, axis * 0.6);
            self.primitives.push(Primitive::capsule(-tip, tip, 0.08));
        }
        for axis in [Vec3::X, Vec3::Y, Vec3::Z] {
            let tip = mat3::transform(&spin, axis * 0.7);
            self.primitives.push(Primitive::sphere(tip, 0.12));
        }
        self.primitives.push(Primitive::sphere(Vec3::ZERO, 0.16));
    }
}

impl Gizmo for Jacks {
    fn name(&self) -> &'static str {
        "jacks"
    }

    fn update(&mut self, dt: f32, config: &GizmoConfig) {
        self.time += dt * config.speed;
        self.pose();
    }

    fn primitives(&self) -> &[Primitive] {
        &self.primitives
    }
}

/// Ellipsoid petals breathing in and out around the centre
pub struct Bloom {
    time: f32,
    primitives: Vec<Primitive>,
}

impl Bloom {
    const PETALS: usize = 6;

    pub fn new() -> Self {
        let mut g = Self {
            time: 0.0,
            primitives: Vec::with_capacity(Self::PETALS),
        };
        g.pose();
        g
    }

    fn pose(&mut self) {
        let t = self.time;
        self.primitives.clear();
        for i in 0..Self::PETALS {
            let angle = i as f32 * TAU / Self::PETALS as f32 + t * 0.25;
            let breath = 0.5 + 0.5 * (t * 1.3 + i as f32).sin();
            let dir = Vec3::new(angle.cos(), 0.35 * (t + i as f32).sin(), angle.sin());
            let orientation = mat3::from_euler(0.0, -angle, 0.0);
            self.primitives.push(Primitive::ellipsoid(
                dir * (0.25 + 0.2 * breath),
                orientation,
                Vec3::new(0.35 + 0.1 * breath, 0.1, 0.16),
            ));
        }
    }
}

impl Gizmo for Bloom {
    fn name(&self) -> &'static str {
        "bloom"
    }

    fn update(&mut self, dt: f32, config: &GizmoConfig) {
        self.time += dt * config.speed;
        self.pose();
    }

    fn primitives(&self) -> &[Primitive] {
        &self.primitives
    }
}

/// Two interlocked rings sliding through each other
pub struct Links {
    time: f32,
    primitives: Vec<Primitive>,
}

impl Links {
    pub fn new() -> Self {
        let mut g = Self {
            time: 0.0,
            primitives: Vec::with_capacity(4),
        };
        g.pose();
        g
    }

    fn pose(&mut self) {
        let t = self.time;
        let slide = 0.2 * (t * 0.8).sin();
        let turn = mat3::axis_rotation(1, t * 0.4);
        self.primitives.clear();
        self.primitives.push(Primitive::torus(
            mat3::transform(&turn, Vec3::new(-0.2 + slide, 0.0, 0.0)),
            turn,
            0.4,
            0.08,
        ));
        self.primitives.push(Primitive::torus(
            mat3::transform(&turn, Vec3::new(0.2 - slide, 0.0, 0.0)),
            mat3::mul(turn, mat3::axis_rotation(0, PI * 0.5)),
            0.4,
            0.08,
        ));
        for sign in [-1.0f32, 1.0] {
            let bead = mat3::transform(&turn, Vec3::new(0.0, sign * 0.6 * (t * 0.5).cos(), 0.0));
            self.primitives.push(Primitive::sphere(bead, 0.1));
        }
    }
}

impl Gizmo for Links {
    fn name(&self) -> &'static str {
        "links"
    }

    fn update(&mut self, dt: f32, config: &GizmoConfig) {
        self.time += dt * config.speed;
        self.pose();
    }

    fn primitives(&self) -> &[Primitive] {
        &self.primitives
    }
}

/// A weighted arm swinging under a fixed pivot
pub struct Pendulum {
    time: f32,
    primitives: Vec<Primitive>,
}

impl Pendulum {
    pub fn new() -> Self {
        let mut g = Self {
            time: 0.0,
            primitives: Vec::with_capacity(3),
        };
        g.pose();
        g
    }

    fn pose(&mut self) {
        let t = self.time;
        let pivot = Vec3::new(0.0, 0.6, 0.0);
        let swing = 0.9 * (t * 1.4).sin();
        let twist = 0.5 * (t * 0.6).cos();
        let dir = Vec3::new(swing.sin() * twist.cos(), -swing.cos(), swing.sin() * twist.sin());
        let bob = pivot + dir * 0.9;
        self.primitives.clear();
        self.primitives.push(Primitive::sphere(pivot, 0.12));
        self.primitives.push(Primitive::capsule(pivot, bob, 0.05));
        self.primitives.push(Primitive::sphere(bob, 0.22));
    }
}

impl Gizmo for Pendulum {
    fn name(&self) -> &'static str {
        "pendulum"
    }

    fn update(&mut self, dt: f32, config: &GizmoConfig) {
        self.time += dt * config.speed;
        self.pose();
    }

    fn primitives(&self) -> &[Primitive] {
        &self.primitives
    }
}

/// Beads threaded on a rotating double helix
pub struct Helix {
    time: f32,
    primitives: Vec<Primitive>,
}

impl Helix {
    const BEADS: usize = 10;

    pub fn new() -> Self {
        let mut g = Self {
            time: 0.0,
            primitives: Vec::with_capacity(Self::BEADS),
        };
        g.pose();
        g
    }

    fn pose(&mut self) {
        let t = self.time;
        self.primitives.clear();
        for i in 0..Self::BEADS {
            let strand = if i % 2 == 0 { 0.0 } else { PI };
            let h = (i / 2) as f32 / (Self::BEADS / 2 - 1) as f32;
            let angle = h * TAU + strand + t;
            let center = Vec3::new(0.4 * angle.cos(), 1.4 * h - 0.7, 0.4 * angle.sin());
            self.primitives.push(Primitive::sphere(center, 0.13));
        }
    }
}

impl Gizmo for Helix {
    fn name(&self) -> &'static str {
        "helix"
    }

    fn update(&mut self, dt: f32, config: &GizmoConfig) {
        self.time += dt * config.speed;
        self.pose();
    }

    fn primitives(&self) -> &[Primitive] {
        &self.primitives
    }
}

/// The reserved surprise: a ring face that winks
pub struct Smiley {
    time: f32,
    primitives: Vec<Primitive>,
}

impl Smiley {
    pub fn new() -> Self {
        let mut g = Self {
            time: 0.0,
            primitives: Vec::with_capacity(5),
        };
        g.pose();
        g
    }

    fn pose(&mut self) {
        let t = self.time;
        let face = mat3::mul(mat3::axis_rotation(1, 0.5 * t.sin()), mat3::axis_rotation(0, PI * 0.5));
        let blink = if (t % 4.0) < 0.2 { 0.02 } else { 0.12 };
        let place = |v: Vec3| mat3::transform(&face, v);
        self.primitives.clear();
        self.primitives.push(Primitive::torus(Vec3::ZERO, face, 0.65, 0.07));
        self.primitives.push(Primitive::ellipsoid(
            place(Vec3::new(-0.22, 0.0, -0.2)),
            face,
            Vec3::new(0.08, 0.08, blink),
        ));
        self.primitives.push(Primitive::sphere(place(Vec3::new(0.22, 0.0, -0.2)), 0.1));
        self.primitives.push(Primitive::capsule(
            place(Vec3::new(-0.25, 0.0, 0.2)),
            place(Vec3::new(0.0, 0.0, 0.32)),
            0.05,
        ));
        self.primitives.push(Primitive::capsule(
            place(Vec3::new(0.0, 0.0, 0.32)),
            place(Vec3::new(0.25, 0.0, 0.2)),
            0.05,
        ));
    }
}

impl Gizmo for Smiley {
    fn name(&self) -> &'static str {
        "smiley"
    }

    fn update(&mut self, dt: f32, config: &GizmoConfig) {
        self.time += dt * config.speed;
        self.pose();
    }

    fn primitives(&self) -> &[Primitive] {
        &self.primitives
    }
}
