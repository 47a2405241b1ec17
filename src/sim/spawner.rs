//! Target spawner
//!
//! Produces one target per spawn tick: weighted kind, random column,
//! random fall duration.

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use super::sampler::WeightedTable;
use super::state::{Target, TargetKind};
use crate::consts::DEFAULT_VIEWPORT_WIDTH;
use crate::tuning::{Tuning, TuningError};

pub struct Spawner {
    rng: Pcg32,
    table: WeightedTable<TargetKind>,
    next_id: u32,
    viewport_width: f32,
    sprite_size: f32,
    fall_secs_min: f32,
    fall_secs_max: f32,
}

impl Spawner {
    pub fn new(seed: u64, tuning: &Tuning) -> Result<Self, TuningError> {
        tuning.validate()?;
        Ok(Self {
            rng: Pcg32::seed_from_u64(seed),
            table: tuning.spawn_table()?,
            next_id: 1,
            viewport_width: DEFAULT_VIEWPORT_WIDTH,
            sprite_size: tuning.sprite_size,
            fall_secs_min: tuning.fall_secs_min,
            fall_secs_max: tuning.fall_secs_max,
        })
    }

    /// Width the targets are spread across (CSS pixels)
    pub fn set_viewport_width(&mut self, width: f32) {
        self.viewport_width = if width.is_finite() { width.max(0.0) } else { 0.0 };
    }

    pub fn viewport_width(&self) -> f32 {
        self.viewport_width
    }

    /// Allocate a new target ID
    fn next_target_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id = self.next_id.wrapping_add(1).max(1);
        id
    }

    /// Create the next target
    pub fn tick(&mut self) -> Target {
        let id = self.next_target_id();
        let kind = *self.table.sample(&mut self.rng);

        let span = self.viewport_width - self.sprite_size;
        let x = if span > 0.0 {
            self.rng.random_range(0.0..span)
        } else {
            0.0
        };
        let fall_secs = self.rng.random_range(self.fall_secs_min..self.fall_secs_max);
        let rotation = self.rng.random_range(0.0..360.0);

        Target {
            id,
            kind,
            x,
            fall_secs,
            rotation,
        }
    }
}
