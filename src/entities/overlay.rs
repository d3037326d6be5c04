use serde::{Deserialize, Serialize};

use crate::entities::Coordinates;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OverlayId(pub u64);

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CameraUpdate {
    Center { target: Coordinates },
    CenterZoom { target: Coordinates, zoom: f32 },
}

impl CameraUpdate {
    pub fn target(&self) -> Coordinates {
        match self {
            Self::Center { target } => *target,
            Self::CenterZoom { target, zoom: _ } => *target,
        }
    }
}
