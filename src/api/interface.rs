use async_trait::async_trait;
use geo_types::LineString;
use std::sync::Arc;

use crate::entities::{CameraUpdate, Coordinates, OverlayId, Place, Route, SessionToken, Suggestion};
use crate::error::Error;

#[async_trait]
pub trait PlacesAPI {
    async fn autocomplete(
        &self,
        input: String,
        session_token: SessionToken,
    ) -> Result<Vec<Suggestion>, Error>;
    async fn find_place(&self, place_id: String, session_token: SessionToken)
        -> Result<Place, Error>;
}

#[async_trait]
pub trait DirectionsAPI {
    async fn directions(
        &self,
        origin: Coordinates,
        destination: Coordinates,
    ) -> Result<Vec<Route>, Error>;
}

/// The rendered map. Overlay ids are allocated by the caller so operations can
/// be queued before the map exists.
pub trait MapSurface {
    fn add_marker(&mut self, id: OverlayId, position: Coordinates, title: &str);
    fn add_polyline(&mut self, id: OverlayId, line: &LineString<f64>);
    fn remove_overlay(&mut self, id: OverlayId);
    fn move_camera(&mut self, update: CameraUpdate);
}

pub trait ScreenView {
    fn set_suggestions(&mut self, suggestions: &[Suggestion]);
    fn show_message(&mut self, message: &str);
}

pub trait CurrentLocationSource {
    fn current_location(&self) -> Option<Coordinates>;
}

pub type DynPlacesAPI = Arc<dyn PlacesAPI + Send + Sync>;
pub type DynDirectionsAPI = Arc<dyn DirectionsAPI + Send + Sync>;
pub type DynLocationSource = Arc<dyn CurrentLocationSource + Send + Sync>;
pub type DynMapSurface = Box<dyn MapSurface + Send>;
pub type DynScreenView = Box<dyn ScreenView + Send>;
