//! Ambient particle field: background stars for the constellation, floating
//! dust over the railway.
//!
//! The layout is scattered once from a seed. Per-frame positions are a pure
//! function of elapsed time, so nothing accumulates between frames.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::geom::{Point3, Vec3};
use crate::quality::{QualityTier, TierTable};

/// Share of the authored base count spawned per tier.
pub const PARTICLE_SCALE: TierTable<f64> = TierTable::new(0.3, 0.6, 1.0);

/// Hard ceiling on the scattered count, applied after tier scaling.
pub const MAX_PARTICLES: usize = 20_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ParticleMotion {
    /// Small bounded wobble around the spawn point.
    #[default]
    Drift,
    /// Steady climb that wraps back to the floor of the volume.
    Rise,
}

/// Axis-aligned spawn volume.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParticleVolume {
    pub centre: Point3,
    pub half_extents: Vec3,
}

impl ParticleVolume {
    #[must_use]
    pub const fn new(centre: Point3, half_extents: Vec3) -> Self {
        Self {
            centre,
            half_extents,
        }
    }

    /// Bounding box of `points` grown by `padding` on every side. An empty
    /// input gives a padding-sized cube at the origin.
    #[must_use]
    pub fn enclosing(points: impl IntoIterator<Item = Point3>, padding: f64) -> Self {
        let padding = if padding.is_finite() { padding.abs() } else { 0.0 };
        let bounds = points.into_iter().fold(None, |acc: Option<(Point3, Point3)>, p| {
            Some(match acc {
                None => (p, p),
                Some((lo, hi)) => (
                    Point3::new(lo.x.min(p.x), lo.y.min(p.y), lo.z.min(p.z)),
                    Point3::new(hi.x.max(p.x), hi.y.max(p.y), hi.z.max(p.z)),
                ),
            })
        });
        let (lo, hi) = bounds.unwrap_or((Point3::ORIGIN, Point3::ORIGIN));
        let half = hi.sub_point(lo).mul_scalar(0.5);
        Self::new(
            lo.midpoint(hi),
            Vec3::new(half.x + padding, half.y + padding, half.z + padding),
        )
    }

    fn floor(&self) -> f64 {
        self.centre.y - self.half_extents.y.abs()
    }

    fn height(&self) -> f64 {
        self.half_extents.y.abs() * 2.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Particle {
    origin: Point3,
    phase: f64,
    speed: f64,
    size: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ParticleSample {
    pub position: [f64; 3],
    pub size: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ParticleField {
    particles: Vec<Particle>,
    volume: ParticleVolume,
    motion: ParticleMotion,
    amplitude: f64,
}

impl ParticleField {
    /// Scatters `PARTICLE_SCALE[tier] * base_count` particles (at most
    /// `MAX_PARTICLES`) uniformly in `volume`. The same seed always yields
    /// the same layout.
    #[must_use]
    pub fn scatter(
        base_count: usize,
        tier: QualityTier,
        volume: ParticleVolume,
        motion: ParticleMotion,
        seed: u64,
    ) -> Self {
        let count = PARTICLE_SCALE.scale_count(tier, base_count).min(MAX_PARTICLES);
        let mut rng = StdRng::seed_from_u64(seed);
        let half = Vec3::new(
            volume.half_extents.x.abs(),
            volume.half_extents.y.abs(),
            volume.half_extents.z.abs(),
        );

        let particles = (0..count)
            .map(|_| Particle {
                origin: volume.centre.add_vec(Vec3::new(
                    signed_unit(&mut rng) * half.x,
                    signed_unit(&mut rng) * half.y,
                    signed_unit(&mut rng) * half.z,
                )),
                phase: rng.random_range(0.0..std::f64::consts::TAU),
                speed: rng.random_range(0.2..1.0),
                size: rng.random_range(0.5..1.5),
            })
            .collect::<Vec<_>>();

        log::debug!(
            "particles: {} of base {base_count} at tier {}",
            particles.len(),
            tier.as_str()
        );

        Self {
            particles,
            volume,
            motion,
            amplitude: 0.3,
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.particles.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    #[must_use]
    pub fn motion(&self) -> ParticleMotion {
        self.motion
    }

    /// Positions at `elapsed` seconds since the scene started.
    #[must_use]
    pub fn sample(&self, elapsed: f64) -> Vec<ParticleSample> {
        let elapsed = if elapsed.is_finite() { elapsed } else { 0.0 };
        self.particles
            .iter()
            .map(|particle| ParticleSample {
                position: self.position_of(particle, elapsed).to_array(),
                size: particle.size,
            })
            .collect()
    }

    fn position_of(&self, particle: &Particle, elapsed: f64) -> Point3 {
        let angle = elapsed * particle.speed + particle.phase;
        match self.motion {
            ParticleMotion::Drift => particle.origin.add_vec(Vec3::new(
                angle.sin() * self.amplitude,
                (angle * 0.7).cos() * self.amplitude * 0.5,
                angle.cos() * self.amplitude,
            )),
            ParticleMotion::Rise => {
                let height = self.volume.height();
                let floor = self.volume.floor();
                let y = if height > 0.0 {
                    floor + (particle.origin.y - floor + elapsed * particle.speed).rem_euclid(height)
                } else {
                    particle.origin.y
                };
                Point3::new(particle.origin.x + angle.sin() * self.amplitude, y, particle.origin.z)
            }
        }
    }
}

fn signed_unit(rng: &mut StdRng) -> f64 {
    rng.random_range(-1.0..=1.0)
}
