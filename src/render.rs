//! Committed render buffer
//!
//! The physics core publishes particle positions and colors here once per
//! tick. The buffer is only rewritten through `&mut` on the owning state, so
//! a renderer holding `&RenderBuffer` can never see a half-written frame.

use bytemuck::{Pod, Zeroable};
use glam::Vec3;

use crate::sim::Particle;

/// Interleaved point-cloud vertex
#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, Pod, Zeroable)]
pub struct ParticleVertex {
    pub position: [f32; 3],
    pub color: [f32; 3],
}

/// Particle colors
pub mod colors {
    /// Still water
    pub const DEEP: [f32; 3] = [0.05, 0.25, 0.8];
    /// Fast-moving spray
    pub const FOAM: [f32; 3] = [0.9, 0.95, 1.0];
    /// Speed mapped to full `FOAM`
    pub const FOAM_SPEED: f32 = 4.0;
}

/// Speed → color gradient
#[inline]
pub fn speed_color(speed: f32) -> [f32; 3] {
    let t = if speed.is_finite() {
        (speed / colors::FOAM_SPEED).clamp(0.0, 1.0)
    } else {
        1.0
    };
    Vec3::from(colors::DEEP)
        .lerp(Vec3::from(colors::FOAM), t)
        .to_array()
}

/// Positions and colors of the last committed tick
#[derive(Debug, Clone, Default)]
pub struct RenderBuffer {
    positions: Vec<[f32; 3]>,
    colors: Vec<[f32; 3]>,
}

impl RenderBuffer {
    /// Overwrite with the given particle snapshot
    pub fn commit(&mut self, particles: &[Particle]) {
        self.positions.clear();
        self.colors.clear();
        self.positions
            .extend(particles.iter().map(|p| p.position.as_vec3().to_array()));
        self.colors
            .extend(particles.iter().map(|p| speed_color(p.velocity.length() as f32)));
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Flat `[x, y, z, ...]`
    pub fn positions(&self) -> &[f32] {
        bytemuck::cast_slice(&self.positions)
    }

    /// Flat `[r, g, b, ...]`
    pub fn colors(&self) -> &[f32] {
        bytemuck::cast_slice(&self.colors)
    }

    /// Raw position bytes, ready for a vertex buffer upload
    pub fn position_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.positions)
    }

    /// Interleaved vertices for renderers that want a single buffer
    pub fn vertices(&self) -> Vec<ParticleVertex> {
        self.positions
            .iter()
            .zip(&self.colors)
            .map(|(&position, &color)| ParticleVertex { position, color })
            .collect()
    }
}
