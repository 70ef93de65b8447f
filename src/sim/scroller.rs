//! Environment scrolling
//!
//! Road and grass strips slide toward the camera and are recycled to the far
//! end once they pass the wrap depth. The segment set is fixed at creation.

use serde::{Deserialize, Serialize};

/// The recycled ground strips
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SegmentKind {
    Road,
    LeftGrass,
    RightGrass,
}

impl SegmentKind {
    pub const ALL: [SegmentKind; 3] = [
        SegmentKind::Road,
        SegmentKind::LeftGrass,
        SegmentKind::RightGrass,
    ];
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    pub kind: SegmentKind,
    pub z: f32,
}

impl Segment {
    /// Move toward the camera; wrap to `far_z` once past `wrap_z`.
    /// Returns true if the segment wrapped.
    pub fn advance(&mut self, speed: f32, wrap_z: f32, far_z: f32) -> bool {
        self.z += speed;
        if self.z > wrap_z {
            self.z = far_z;
            true
        } else {
            false
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnvironmentScroller {
    segments: [Segment; 3],
    wrap_z: f32,
    far_z: f32,
}

impl EnvironmentScroller {
    pub fn new(start_z: f32, wrap_z: f32, far_z: f32) -> Self {
        Self {
            segments: SegmentKind::ALL.map(|kind| Segment { kind, z: start_z }),
            wrap_z,
            far_z,
        }
    }

    /// Advance every segment by `speed`
    pub fn advance(&mut self, speed: f32) {
        for segment in &mut self.segments {
            if segment.advance(speed, self.wrap_z, self.far_z) {
                log::trace!("{:?} wrapped to {}", segment.kind, self.far_z);
            }
        }
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn z_of(&self, kind: SegmentKind) -> f32 {
        self.segments
            .iter()
            .find(|s| s.kind == kind)
            .map(|s| s.z)
            .unwrap_or(self.far_z)
    }
}
