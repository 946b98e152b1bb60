//! Projection of a world into the fixed-length feature vector the brain reads.
//!
//! Layout: `tracked_prey` slots of `(dx, dy, direction)` for the nearest living
//! prey, followed by `tracked_obstacles` slots of `(dx, dy, width, height)` for
//! the nearest blocking rects. Offsets are measured from the hunter's center to
//! the target's center. Unfilled slots stay zero.

use crate::config::SensorConfig;
use crate::world::rect::Rect;
use crate::world::World;
use std::cmp::Ordering;

pub const PREY_FEATURES: usize = 3;
pub const OBSTACLE_FEATURES: usize = 4;

pub fn input_size(config: &SensorConfig) -> usize {
    config.tracked_prey * PREY_FEATURES + config.tracked_obstacles * OBSTACLE_FEATURES
}

pub fn encode(world: &World, config: &SensorConfig) -> Vec<f64> {
    let mut inputs = vec![0.0; input_size(config)];
    encode_into(world, config, &mut inputs);
    inputs
}

/// Writes the features into `inputs`, which must be exactly `input_size` long.
pub fn encode_into(world: &World, config: &SensorConfig, inputs: &mut [f64]) {
    assert_eq!(inputs.len(), input_size(config), "Input size mismatch");
    inputs.fill(0.0);

    let hunter = &world.hunter.rect;
    let (hx, hy) = hunter.center();

    let living: Vec<_> = world.living_prey().collect();
    let nearest_prey = nearest(hunter, living.iter().map(|p| &p.rect), config.tracked_prey);
    for (slot, &index) in nearest_prey.iter().enumerate() {
        let prey = living[index];
        let (cx, cy) = prey.rect.center();
        let base = slot * PREY_FEATURES;
        inputs[base] = cx - hx;
        inputs[base + 1] = cy - hy;
        inputs[base + 2] = f64::from(prey.direction.code());
    }

    let blockers: Vec<&Rect> = world
        .obstacles
        .iter()
        .chain(world.walls.iter())
        .chain(world.prey.iter().filter(|p| !p.alive).map(|p| &p.rect))
        .collect();
    let nearest_blockers = nearest(hunter, blockers.iter().copied(), config.tracked_obstacles);
    let offset = config.tracked_prey * PREY_FEATURES;
    for (slot, &index) in nearest_blockers.iter().enumerate() {
        let rect = blockers[index];
        let (cx, cy) = rect.center();
        let base = offset + slot * OBSTACLE_FEATURES;
        inputs[base] = cx - hx;
        inputs[base + 1] = cy - hy;
        inputs[base + 2] = rect.width;
        inputs[base + 3] = rect.height;
    }
}

/// Indices of the `k` rects closest to `origin`, nearest first.
///
/// Relies on `sort_by` being stable: equidistant rects keep their input order.
pub fn nearest<'a, I>(origin: &Rect, rects: I, k: usize) -> Vec<usize>
where
    I: IntoIterator<Item = &'a Rect>,
{
    let mut ranked: Vec<(usize, f64)> = rects
        .into_iter()
        .enumerate()
        .map(|(i, r)| (i, origin.distance_between_centers(r)))
        .collect();
    ranked.sort_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(Ordering::Equal));
    ranked.into_iter().take(k).map(|(i, _)| i).collect()
}
