//! Creature morphology
//!
//! A base body carries named anchor points; assembling a creature attaches
//! one part visual per region to the matching anchor.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::types::{Region, Transform2D};

/// Swing amplitude of the fin layer in degrees
pub const FIN_SWING_DEGREES: f32 = 27.0;

/// Named attachment point on the base body, in body-local space
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnchorPoint {
    pub name: String,
    pub region: Region,
    pub offset: Vec2,
    pub rotation: f32,
}

impl AnchorPoint {
    pub fn transform(&self) -> Transform2D {
        Transform2D::new(self.offset, self.rotation)
    }
}

/// Base body model the part visuals attach to
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BaseBody {
    /// Body-local transform used when a region has no anchor
    pub root: Transform2D,
    pub anchors: Vec<AnchorPoint>,
}

impl BaseBody {
    /// Layout shared by every creature: eyes at the front, fins at the back.
    /// The body part itself sits on the root.
    pub fn standard() -> Self {
        Self {
            root: Transform2D::default(),
            anchors: vec![
                AnchorPoint {
                    name: "EyesAnchor".to_string(),
                    region: Region::Eyes,
                    offset: Vec2::new(0.0, 0.35),
                    rotation: 0.0,
                },
                AnchorPoint {
                    name: "FinAnchor".to_string(),
                    region: Region::Fins,
                    offset: Vec2::new(0.0, -0.45),
                    rotation: 0.0,
                },
            ],
        }
    }

    /// First anchor declared for `region`
    pub fn anchor_for(&self, region: Region) -> Option<&AnchorPoint> {
        self.anchors.iter().find(|a| a.region == region)
    }
}

impl Default for BaseBody {
    fn default() -> Self {
        Self::standard()
    }
}

/// A part visual attached to the base body
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttachedPart {
    pub region: Region,
    pub part_id: String,
    pub visual: String,
    /// Body-local offset of the visual
    pub offset: Vec2,
    /// Body-local rotation in radians (animated for fins)
    pub rotation: f32,
    /// False when the part fell back to the body root
    pub anchored: bool,
}

/// Renderable creature: the base body plus its attached part layers
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AssembledModel {
    parts: Vec<AttachedPart>,
}

impl AssembledModel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach a part, replacing any part already attached for the region
    pub fn attach(&mut self, part: AttachedPart) {
        self.parts.retain(|p| p.region != part.region);
        self.parts.push(part);
    }

    pub fn part(&self, region: Region) -> Option<&AttachedPart> {
        self.parts.iter().find(|p| p.region == region)
    }

    pub fn parts(&self) -> &[AttachedPart] {
        &self.parts
    }

    /// Set the fin layer's local rotation in degrees. No-op without fins.
    pub fn set_fin_angle(&mut self, degrees: f32) {
        if let Some(fin) = self.parts.iter_mut().find(|p| p.region == Region::Fins) {
            fin.rotation = degrees.to_radians();
        }
    }

    /// Current fin rotation in degrees
    pub fn fin_angle(&self) -> Option<f32> {
        self.part(Region::Fins).map(|p| p.rotation.to_degrees())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn attached(region: Region, id: &str) -> AttachedPart {
        AttachedPart {
            region,
            part_id: id.to_string(),
            visual: format!("Sprites/{id}"),
            offset: Vec2::ZERO,
            rotation: 0.0,
            anchored: true,
        }
    }

    #[test]
    fn test_standard_body_has_no_body_anchor() {
        let base = BaseBody::standard();
        assert!(base.anchor_for(Region::Body).is_none());
        assert_eq!(base.anchor_for(Region::Eyes).unwrap().name, "EyesAnchor");
        assert_eq!(base.anchor_for(Region::Fins).unwrap().name, "FinAnchor");
    }

    #[test]
    fn test_attach_replaces_region() {
        let mut model = AssembledModel::new();
        model.attach(attached(Region::Fins, "Blue_Fins"));
        model.attach(attached(Region::Fins, "Red_Fins"));
        assert_eq!(model.parts().len(), 1);
        assert_eq!(model.part(Region::Fins).unwrap().part_id, "Red_Fins");
    }

    #[test]
    fn test_fin_angle() {
        let mut model = AssembledModel::new();
        model.set_fin_angle(FIN_SWING_DEGREES);
        assert_eq!(model.fin_angle(), None);

        model.attach(attached(Region::Fins, "Blue_Fins"));
        model.set_fin_angle(-FIN_SWING_DEGREES);
        let angle = model.fin_angle().unwrap();
        assert!((angle + FIN_SWING_DEGREES).abs() < 1e-4);
    }
}
