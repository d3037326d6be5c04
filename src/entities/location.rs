use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::error::{invalid_input_error, Error};

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lng: f64,
}

impl Coordinates {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }
}

impl From<Coordinates> for String {
    fn from(coordinates: Coordinates) -> Self {
        format!("{},{}", coordinates.lat, coordinates.lng)
    }
}

impl From<Coordinates> for geo_types::Coord<f64> {
    fn from(coordinates: Coordinates) -> Self {
        geo_types::Coord {
            x: coordinates.lng,
            y: coordinates.lat,
        }
    }
}

impl From<geo_types::Coord<f64>> for Coordinates {
    fn from(coord: geo_types::Coord<f64>) -> Self {
        Self {
            lat: coord.y,
            lng: coord.x,
        }
    }
}

impl FromStr for Coordinates {
    type Err = Error;

    // "lat,lng", the same shape the query strings use
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (lat, lng) = s.split_once(',').ok_or_else(invalid_input_error)?;
        let lat: f64 = lat.trim().parse()?;
        let lng: f64 = lng.trim().parse()?;

        if !(-90.0..=90.0).contains(&lat) || !(-180.0..=180.0).contains(&lng) {
            return Err(invalid_input_error());
        }

        Ok(Self { lat, lng })
    }
}

#[test]
fn coordinates_from_str() {
    let coordinates: Coordinates = "-34.0, 151.0".parse().unwrap();
    assert_eq!(coordinates, Coordinates::new(-34.0, 151.0));

    assert!("151.0".parse::<Coordinates>().is_err());
    assert!("-134.0,151.0".parse::<Coordinates>().is_err());
    assert!("south,east".parse::<Coordinates>().is_err());
}

#[test]
fn coordinates_into_query_value() {
    let value: String = Coordinates::new(-33.85, 151.21).into();
    assert_eq!(value, "-33.85,151.21");
}
