use geo_types::LineString;
use serde::{Deserialize, Serialize};

use crate::{error::Error, polyline};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Route {
    pub summary: String,
    pub overview_polyline: String,
}

impl Route {
    pub fn new(summary: impl Into<String>, overview_polyline: impl Into<String>) -> Self {
        Route {
            summary: summary.into(),
            overview_polyline: overview_polyline.into(),
        }
    }

    pub fn line_string(&self) -> Result<LineString<f64>, Error> {
        polyline::decode(&self.overview_polyline)
    }
}

#[test]
fn route_line_string_is_lng_lat() {
    let route = Route::new("", "_p~iF~ps|U_ulLnnqC_mqNvxq`@");
    let line = route.line_string().unwrap();

    let first = line.0[0];
    assert_eq!(first.x, -120.2);
    assert_eq!(first.y, 38.5);
    assert_eq!(line.0.len(), 3);
}
