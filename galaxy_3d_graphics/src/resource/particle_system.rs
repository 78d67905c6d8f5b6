/// Shared particle system definition.
///
/// Simulation is out of scope here; a `ParticleSystemNode` only places a
/// definition in the scene and derives its bounds from it.

use crate::error::Result;
use crate::engine_bail;
use crate::math::Shape;

/// Particle system creation descriptor
pub struct ParticleSystemDesc {
    pub name: String,
    pub max_particles: u32,
    /// Particles emitted per second
    pub emission_rate: f32,
    /// Particle lifetime in seconds
    pub lifetime: f32,
    /// Local-space volume particles stay within
    pub bounds: Shape,
}

#[derive(Debug)]
pub struct ParticleSystem {
    name: String,
    max_particles: u32,
    emission_rate: f32,
    lifetime: f32,
    bounds: Shape,
}

impl ParticleSystem {
    /// Build a particle system definition
    ///
    /// # Errors
    ///
    /// `Error::Configuration` on zero capacity or a non-positive rate or
    /// lifetime.
    pub fn from_desc(desc: ParticleSystemDesc) -> Result<Self> {
        if desc.max_particles == 0 {
            engine_bail!(Configuration, "galaxy3d::ParticleSystem",
                "Particle system '{}': max_particles must be at least 1", desc.name);
        }
        if !(desc.emission_rate > 0.0 && desc.lifetime > 0.0) {
            engine_bail!(Configuration, "galaxy3d::ParticleSystem",
                "Particle system '{}': emission rate ({}) and lifetime ({}) must be positive",
                desc.name, desc.emission_rate, desc.lifetime);
        }
        Ok(Self {
            name: desc.name,
            max_particles: desc.max_particles,
            emission_rate: desc.emission_rate,
            lifetime: desc.lifetime,
            bounds: desc.bounds,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn max_particles(&self) -> u32 {
        self.max_particles
    }

    pub fn emission_rate(&self) -> f32 {
        self.emission_rate
    }

    pub fn lifetime(&self) -> f32 {
        self.lifetime
    }

    pub fn bounds(&self) -> Shape {
        self.bounds
    }

    /// Number of particles alive once emission has stabilized
    pub fn steady_state_count(&self) -> u32 {
        ((self.emission_rate * self.lifetime).ceil() as u32).min(self.max_particles)
    }
}
