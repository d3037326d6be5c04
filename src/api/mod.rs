mod interface;
pub mod server;

pub use interface::{
    CurrentLocationSource, DirectionsAPI, DynDirectionsAPI, DynLocationSource, DynMapSurface,
    DynPlacesAPI, DynScreenView, MapSurface, PlacesAPI, ScreenView,
};
pub use server::serve;
