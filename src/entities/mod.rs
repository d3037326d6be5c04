mod location;
mod overlay;
mod place;
mod route;

pub use location::Coordinates;
pub use overlay::{CameraUpdate, OverlayId};
pub use place::{Place, SessionToken, Suggestion};
pub use route::Route;
