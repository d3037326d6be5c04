use crate::{api::CurrentLocationSource, entities::Coordinates};

/// Location source reporting a configured position, for hosts without a
/// positioning device.
#[derive(Clone, Copy, Debug)]
pub struct FixedLocation(Coordinates);

impl FixedLocation {
    pub fn new(coordinates: Coordinates) -> Self {
        Self(coordinates)
    }
}

impl CurrentLocationSource for FixedLocation {
    fn current_location(&self) -> Option<Coordinates> {
        Some(self.0)
    }
}

/// Location source that never has a fix; the screen falls back to its
/// configured origin.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoLocation;

impl CurrentLocationSource for NoLocation {
    fn current_location(&self) -> Option<Coordinates> {
        None
    }
}
