//! Per-instance data shared with the renderer
//!
//! The simulation owns these buffers and rewrites them every frame; an
//! external renderer reads them as-is (they are `Pod`, ready for a GPU
//! upload). Entity count is fixed, so the buffers never reallocate:
//! destroyed entities are sentinel-relocated instead of removed.

use bytemuck::{Pod, Zeroable};
use serde::{Deserialize, Serialize};

/// Named entity classes sharing one atlas tile each
pub const ENTITY_CLASS_COUNT: usize = 5;

/// World-space translation and half-extents of one instance
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Default, Pod, Zeroable, Serialize, Deserialize)]
pub struct InstanceTransform {
    pub pos: [f32; 2],
    pub half_extents: [f32; 2],
}

impl InstanceTransform {
    pub fn new(x: f32, y: f32, half_w: f32, half_h: f32) -> Self {
        Self { pos: [x, y], half_extents: [half_w, half_h] }
    }
}

/// Color scale plus the index of the UV transform to sample with
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Default, Pod, Zeroable, Serialize, Deserialize)]
pub struct InstanceTint {
    pub color: [f32; 3],
    pub uv_index: f32,
}

impl InstanceTint {
    pub fn new(color: [f32; 3], uv_index: usize) -> Self {
        Self { color, uv_index: uv_index as f32 }
    }
}

/// UV-space translation and scale of one atlas tile
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Default, Pod, Zeroable, Serialize, Deserialize)]
pub struct UvTransform {
    pub offset: [f32; 2],
    pub scale: [f32; 2],
}
