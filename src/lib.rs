pub mod api;
pub mod config;
pub mod entities;
pub mod error;
pub mod external;
pub mod location;
pub mod polyline;
pub mod scene;
pub mod screen;
