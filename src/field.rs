use std::f32::consts::PI;

use iced::{Point, Vector};
use rand::Rng;

use crate::error::{Error, Result};

/// Rotation applied to every particle on each tick, in radians.
pub const ROTATION_STEP: f32 = 0.02;

#[derive(Clone, Debug, PartialEq)]
pub struct Particle {
    position: Point,
    velocity: Vector,
    angle: f32,
    length: f32,
}

impl Particle {
    pub fn new(position: Point, velocity: Vector, angle: f32, length: f32) -> Self {
        Particle {
            position,
            velocity,
            angle,
            length,
        }
    }

    pub fn position(&self) -> Point {
        self.position
    }

    pub fn velocity(&self) -> Vector {
        self.velocity
    }

    pub fn angle(&self) -> f32 {
        self.angle
    }

    pub fn length(&self) -> f32 {
        self.length
    }
}

/// Largest magnitude a spawn range may reach without overflowing the sampler.
const SAMPLE_LIMIT: f32 = f32::MAX / 4.0;

/// Ranges the random initial state is drawn from.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Spawn {
    /// Each velocity component is drawn from `[-max_speed, max_speed]`.
    pub max_speed: f32,
    pub min_length: f32,
    pub max_length: f32,
}

impl Default for Spawn {
    fn default() -> Self {
        Spawn {
            max_speed: 0.5,
            min_length: 10.0,
            max_length: 30.0,
        }
    }
}

impl Spawn {
    pub fn validate(&self) -> Result<()> {
        // sampling spans 2 * max_speed and rand scales that span up slightly
        if !(self.max_speed >= 0.0 && self.max_speed <= SAMPLE_LIMIT) {
            return Err(Error::InvalidSpeed(self.max_speed));
        }
        if !(self.min_length >= 0.0
            && self.min_length <= self.max_length
            && self.max_length <= SAMPLE_LIMIT)
        {
            return Err(Error::InvalidLengthRange {
                min: self.min_length,
                max: self.max_length,
            });
        }
        Ok(())
    }

    fn sample<R: Rng + ?Sized>(&self, rng: &mut R, width: f32, height: f32) -> Particle {
        let x = rng.gen_range(0.0..width);
        let y = rng.gen_range(0.0..height);
        let dx = rng.gen_range(-self.max_speed..=self.max_speed);
        let dy = rng.gen_range(-self.max_speed..=self.max_speed);
        let angle = rng.gen_range(0.0..2.0 * PI);
        let length = rng.gen_range(self.min_length..=self.max_length);
        Particle::new(Point::new(x, y), Vector::new(dx, dy), angle, length)
    }
}

/// Owns the particles and the toroidal field they move in.
#[derive(Clone, Debug)]
pub struct ParticleField {
    particles: Vec<Particle>,
    width: f32,
    height: f32,
    rotation_step: f32,
}

impl ParticleField {
    pub fn initialize<R: Rng + ?Sized>(
        count: usize,
        width: f32,
        height: f32,
        rng: &mut R,
    ) -> Result<Self> {
        Self::initialize_with(count, width, height, Spawn::default(), ROTATION_STEP, rng)
    }

    pub fn initialize_with<R: Rng + ?Sized>(
        count: usize,
        width: f32,
        height: f32,
        spawn: Spawn,
        rotation_step: f32,
        rng: &mut R,
    ) -> Result<Self> {
        check_bounds(width, height)?;
        spawn.validate()?;
        if !rotation_step.is_finite() {
            return Err(Error::InvalidRotationStep(rotation_step));
        }

        let particles = (0..count)
            .map(|_| spawn.sample(rng, width, height))
            .collect();

        Ok(ParticleField {
            particles,
            width,
            height,
            rotation_step,
        })
    }

    /// Builds a field from explicit particles. Positions outside the bounds are wrapped in.
    pub fn from_particles(particles: Vec<Particle>, width: f32, height: f32) -> Result<Self> {
        check_bounds(width, height)?;
        let particles = particles
            .into_iter()
            .map(|mut particle| {
                particle.position.x = wrap(particle.position.x, width);
                particle.position.y = wrap(particle.position.y, height);
                particle
            })
            .collect();

        Ok(ParticleField {
            particles,
            width,
            height,
            rotation_step: ROTATION_STEP,
        })
    }

    pub fn advance(&mut self) {
        let (width, height, step) = (self.width, self.height, self.rotation_step);
        for particle in self.particles.iter_mut() {
            particle.position.x = wrap(particle.position.x + particle.velocity.x, width);
            particle.position.y = wrap(particle.position.y + particle.velocity.y, height);
            particle.angle += step;
        }
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    pub fn len(&self) -> usize {
        self.particles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    pub fn width(&self) -> f32 {
        self.width
    }

    pub fn height(&self) -> f32 {
        self.height
    }

    pub fn rotation_step(&self) -> f32 {
        self.rotation_step
    }
}

fn check_bounds(width: f32, height: f32) -> Result<()> {
    let positive = |v: f32| v > 0.0 && v <= SAMPLE_LIMIT;
    if !(positive(width) && positive(height)) {
        return Err(Error::InvalidBounds { width, height });
    }
    Ok(())
}

/// Brings `v` back into `[0, max)`. One correction covers any step shorter than the field;
/// longer steps fall back to a full modulo.
fn wrap(v: f32, max: f32) -> f32 {
    let v = if v < 0.0 {
        v + max
    } else if v >= max {
        v - max
    } else {
        v
    };
    if v >= 0.0 && v < max {
        return v;
    }
    // rem_euclid can round up to exactly `max`
    let v = v.rem_euclid(max);
    if v >= max {
        0.0
    } else {
        v
    }
}
