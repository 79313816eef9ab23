//! Ambient rising-smoke particle field.
//!
//! Purely decorative: the field does not depend on the timeline and is
//! regenerated on every render. Randomness comes from a [`RandomSource`] so
//! tests can substitute a fixed sequence.

use std::time::Duration;

use rand::Rng;

use crate::params::{Color, Config};

/// Number of particles in every rendered field.
pub const PARTICLE_COUNT: usize = 1000;
/// Number of discrete particle sizes.
pub const SIZE_CLASSES: u8 = 5;
/// Radius of each size class template, in pixels.
pub const SIZE_RADII: [u32; SIZE_CLASSES as usize] = [5, 8, 11, 14, 17];
/// Vertical band below the bottom edge in which particles spawn.
pub const SPAWN_BAND: f64 = 20.0;
/// Distance particles travel past the top edge before the cycle ends.
pub const RISE_OVERSHOOT: f64 = 50.0;

const MAX_DELAY_SECS: f64 = 5.0;
const MIN_DURATION_SECS: f64 = 3.0;
const DURATION_SPREAD_SECS: f64 = 3.0;

/// Uniform random numbers in `[0, 1)`.
pub trait RandomSource {
    /// Next sample.
    fn next_unit(&mut self) -> f64;
}

/// Adapts any [`rand::Rng`] into a [`RandomSource`].
#[derive(Debug)]
pub struct RngSource<R>(pub R);

impl<R: Rng> RandomSource for RngSource<R> {
    fn next_unit(&mut self) -> f64 {
        self.0.gen::<f64>()
    }
}

/// One of the fixed rise trajectories.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RiseVariant {
    /// Right, left, right.
    Sway,
    /// Left, right, left.
    Drift,
    /// Short right, left, right.
    Curl,
}

impl RiseVariant {
    /// Every variant, in keyframe-name order.
    pub const ALL: [Self; 3] = [Self::Sway, Self::Drift, Self::Curl];

    /// Index used in the keyframe name (`rise-N`).
    #[must_use]
    pub fn index(self) -> usize {
        match self {
            Self::Sway => 0,
            Self::Drift => 1,
            Self::Curl => 2,
        }
    }

    /// Intermediate waypoints between the spawn point and the top.
    #[must_use]
    pub fn waypoints(self) -> [Waypoint; 2] {
        match self {
            Self::Sway => [Waypoint::new(15, 8, 1.5, 0.8), Waypoint::new(50, -12, 2.5, 0.4)],
            Self::Drift => [Waypoint::new(20, -10, 1.5, 0.8), Waypoint::new(60, 10, 2.5, 0.4)],
            Self::Curl => [Waypoint::new(25, 5, 1.5, 0.8), Waypoint::new(55, -8, 2.5, 0.4)],
        }
    }

    /// Lateral offset at the end of the rise.
    #[must_use]
    pub fn final_dx(self) -> i32 {
        match self {
            Self::Sway => 6,
            Self::Drift => -5,
            Self::Curl => 4,
        }
    }

    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    fn from_unit(r: f64) -> Self {
        let idx = ((r * 3.0).floor() as usize).min(2);
        Self::ALL[idx]
    }
}

/// A point on a rise trajectory.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Waypoint {
    /// Position along the particle's cycle.
    pub percent: u8,
    /// Lateral offset in pixels.
    pub dx: i32,
    /// Scale factor relative to the template.
    pub scale: f64,
    /// Opacity at this point.
    pub opacity: f64,
}

impl Waypoint {
    const fn new(percent: u8, dx: i32, scale: f64, opacity: f64) -> Self {
        Self {
            percent,
            dx,
            scale,
            opacity,
        }
    }

    /// Height risen at this point for a total rise of `rise`.
    #[must_use]
    pub fn lift(&self, rise: f64) -> f64 {
        rise * f64::from(self.percent) / 100.0
    }
}

/// One smoke particle.
#[derive(Debug, Clone, PartialEq)]
pub struct Particle {
    /// Spawn x in pixels.
    pub x: u32,
    /// Spawn y in pixels, at or below the bottom edge.
    pub y: u64,
    /// Index into [`SIZE_RADII`].
    pub size_class: u8,
    /// Trajectory.
    pub variant: RiseVariant,
    /// Length of one rise.
    pub duration: Duration,
    /// How far into its cycle the particle already is at first paint.
    pub delay: Duration,
}

/// The complete particle layer of one render.
#[derive(Debug, Clone, PartialEq)]
pub struct ParticleField {
    particles: Vec<Particle>,
    fill: Color,
    rise: f64,
}

impl ParticleField {
    /// Generate `count` particles for the canvas described by `config`.
    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        clippy::cast_precision_loss
    )]
    pub fn generate(config: &Config, rng: &mut impl RandomSource, count: usize) -> Self {
        let width = f64::from(config.width);
        let height = f64::from(config.height);

        let particles = (0..count)
            .map(|_| {
                let x = (rng.next_unit() * width).round() as u32;
                let y = (height + rng.next_unit() * SPAWN_BAND).round() as u64;
                let size_class =
                    ((rng.next_unit() * f64::from(SIZE_CLASSES)).floor() as u8).min(SIZE_CLASSES - 1);
                let delay = tenths(rng.next_unit() * MAX_DELAY_SECS);
                let duration = tenths(MIN_DURATION_SECS + rng.next_unit() * DURATION_SPREAD_SECS);
                let variant = RiseVariant::from_unit(rng.next_unit());
                Particle {
                    x,
                    y,
                    size_class,
                    variant,
                    duration,
                    delay,
                }
            })
            .collect();

        Self {
            particles,
            fill: config.particle_color.clone(),
            rise: height + RISE_OVERSHOOT,
        }
    }

    /// Particles in emission order.
    #[must_use]
    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    /// Fill shared by every particle.
    #[must_use]
    pub fn fill(&self) -> &Color {
        &self.fill
    }

    /// Total upward travel of a particle.
    #[must_use]
    pub fn rise(&self) -> f64 {
        self.rise
    }

    /// Number of particles.
    #[must_use]
    pub fn len(&self) -> usize {
        self.particles.len()
    }

    /// Whether the field has no particles.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }
}

/// Seconds rounded to one decimal place.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn tenths(secs: f64) -> Duration {
    Duration::from_millis(((secs * 10.0).round() as u64) * 100)
}
