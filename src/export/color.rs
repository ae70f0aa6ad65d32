//! Shading rules for the RGB terrain texture.

use glam::Vec3;

pub const VEGETATION_COLOR: Vec3 = Vec3::new(0.4, 0.8, 0.2);
pub const ROCK_COLOR: Vec3 = Vec3::new(0.9, 0.7, 0.3);
pub const WATER_COLOR: Vec3 = Vec3::new(0.5, 0.6, 1.0);

/// Water depth at which the water tint fully covers the ground color.
const WATER_OPAQUE_DEPTH: f32 = 1.0 / 50.0;

#[inline]
fn saturate(c: Vec3) -> Vec3 {
    c.clamp(Vec3::ZERO, Vec3::ONE)
}

/// Linear blend from `a` to `b`, with `t` clamped to `[0, 1]`.
pub fn mix(a: Vec3, b: Vec3, t: f32) -> Vec3 {
    let t = t.clamp(0.0, 1.0);
    saturate(a * (1.0 - t) + b * t)
}

/// Texture color of one cell, each channel in `[0, 1]`.
///
/// Steep cells shade toward rock and gentle ones toward vegetation. Cells
/// collecting much drainage relative to their slope are darkened. Standing
/// water blends in a blue tint. Every intermediate color is clamped.
pub fn texture_color(slope: f32, area: f32, water: f32) -> Vec3 {
    let rock = saturate(ROCK_COLOR * slope);
    let vegetation = saturate(VEGETATION_COLOR * (1.0 - slope));
    let drainage = (area / (slope + 0.00001)).ln() / 10.0;
    let ground = saturate(saturate(vegetation + rock) - Vec3::splat(drainage));
    mix(ground, WATER_COLOR, water / WATER_OPAQUE_DEPTH)
}
