use rand::Rng;
use tracing::{debug, info};

use crate::error::Result;
use crate::field::{ParticleField, Spawn};
use crate::parameters::Parameters;
use crate::proximity::{DrawList, ProximityRenderer};

/// Ties one field and one renderer to a parameter set. The field is created lazily once
/// the drawing surface reports its bounds.
#[derive(Clone, Debug)]
pub struct Scene {
    field: Option<ParticleField>,
    renderer: ProximityRenderer,
    particle_count: usize,
    spawn: Spawn,
    rotation_step: f32,
    timestep: u64,
}

impl Scene {
    pub fn new(parameters: &Parameters) -> Result<Self> {
        parameters.validate()?;
        Ok(Scene {
            field: None,
            renderer: ProximityRenderer::new(parameters.threshold)?,
            particle_count: parameters.particle_count,
            spawn: parameters.spawn(),
            rotation_step: parameters.rotation_step,
            timestep: 0,
        })
    }

    pub fn ensure_field<R: Rng + ?Sized>(
        &mut self,
        width: f32,
        height: f32,
        rng: &mut R,
    ) -> Result<&ParticleField> {
        let field = match self.field.take() {
            Some(field) => field,
            None => {
                let field = ParticleField::initialize_with(
                    self.particle_count,
                    width,
                    height,
                    self.spawn,
                    self.rotation_step,
                    rng,
                )?;
                info!(count = field.len(), width, height, "created particle field");
                self.timestep = 0;
                field
            }
        };
        let field: &ParticleField = self.field.insert(field);
        Ok(field)
    }

    pub fn advance(&mut self) {
        if let Some(field) = self.field.as_mut() {
            field.advance();
            self.timestep += 1;
        }
    }

    pub fn render(&self) -> Option<DrawList> {
        self.field
            .as_ref()
            .map(|field| self.renderer.render(field.particles()))
    }

    pub fn tick(&mut self) -> Option<DrawList> {
        self.advance();
        self.render()
    }

    /// Drops the current field so the next `ensure_field` draws fresh particles.
    pub fn reseed(&mut self) {
        debug!("reseeding particle field");
        self.field = None;
        self.timestep = 0;
    }

    pub fn set_threshold(&mut self, threshold: f32) -> Result<()> {
        self.renderer = ProximityRenderer::new(threshold)?;
        Ok(())
    }

    pub fn field(&self) -> Option<&ParticleField> {
        self.field.as_ref()
    }

    pub fn threshold(&self) -> f32 {
        self.renderer.threshold()
    }

    pub fn timestep(&self) -> u64 {
        self.timestep
    }
}
