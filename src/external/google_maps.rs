use async_trait::async_trait;
use serde::{de::DeserializeOwned, Deserialize};

use crate::{
    api::{DirectionsAPI, PlacesAPI},
    config::Config,
    entities::{Coordinates, Place, Route, SessionToken, Suggestion},
    error::{invalid_input_error, upstream_error, Error},
};

const PLACE_FIELDS: &str = "place_id,name,geometry/location";

#[derive(Clone, Debug, Deserialize)]
struct Response<T> {
    status: String,
    error_message: Option<String>,
    result: Option<T>,
    predictions: Option<T>,
    routes: Option<T>,
}

#[derive(Clone, Debug, Deserialize)]
struct Prediction {
    place_id: String,
    description: String,
}

#[derive(Clone, Debug, Deserialize)]
struct PlaceDetails {
    place_id: String,
    name: Option<String>,
    geometry: Option<Geometry>,
}

#[derive(Clone, Debug, Deserialize)]
struct Geometry {
    location: Coordinates,
}

#[derive(Clone, Debug, Deserialize)]
struct DirectionsRoute {
    #[serde(default)]
    summary: String,
    overview_polyline: EncodedPath,
}

#[derive(Clone, Debug, Deserialize)]
struct EncodedPath {
    points: String,
}

/// Client for the Google Maps places and directions web services.
#[derive(Clone, Debug)]
pub struct GoogleMaps {
    client: reqwest::Client,
    api_base: String,
    places_api_key: String,
    directions_api_key: String,
}

impl GoogleMaps {
    pub fn new(config: &Config) -> Result<Self, Error> {
        let client = reqwest::Client::builder()
            .timeout(config.http_timeout)
            .build()?;

        Ok(Self {
            client,
            api_base: config.api_base.clone(),
            places_api_key: config.places_api_key.clone(),
            directions_api_key: config.directions_api_key.clone(),
        })
    }

    fn url(&self, path: &str) -> String {
        // a base with an explicit scheme points at a local stand-in
        if self.api_base.starts_with("http://") || self.api_base.starts_with("https://") {
            format!("{}/maps/api/{}", self.api_base.trim_end_matches('/'), path)
        } else {
            format!("https://{}/maps/api/{}", self.api_base, path)
        }
    }
}

#[async_trait]
impl PlacesAPI for GoogleMaps {
    #[tracing::instrument(skip(self))]
    async fn autocomplete(
        &self,
        input: String,
        session_token: SessionToken,
    ) -> Result<Vec<Suggestion>, Error> {
        let res = self
            .client
            .get(self.url("place/autocomplete/json"))
            .query(&[("key", self.places_api_key.as_str())])
            .query(&[("input", input.as_str())])
            .query(&[("sessiontoken", session_token.as_str())])
            .send()
            .await?;

        let data: Response<Vec<Prediction>> = read_response(res).await?;

        suggestions_from(data)
    }

    #[tracing::instrument(skip(self))]
    async fn find_place(
        &self,
        place_id: String,
        session_token: SessionToken,
    ) -> Result<Place, Error> {
        let res = self
            .client
            .get(self.url("place/details/json"))
            .query(&[("key", self.places_api_key.as_str())])
            .query(&[("sessiontoken", session_token.as_str())])
            .query(&[("place_id", place_id.as_str())])
            .query(&[("fields", PLACE_FIELDS)])
            .send()
            .await?;

        let data: Response<PlaceDetails> = read_response(res).await?;

        place_from(data)
    }
}

#[async_trait]
impl DirectionsAPI for GoogleMaps {
    #[tracing::instrument(skip(self))]
    async fn directions(
        &self,
        origin: Coordinates,
        destination: Coordinates,
    ) -> Result<Vec<Route>, Error> {
        let origin: String = origin.into();
        let destination: String = destination.into();

        let res = self
            .client
            .get(self.url("directions/json"))
            .query(&[("key", self.directions_api_key.as_str())])
            .query(&[("origin", origin)])
            .query(&[("destination", destination)])
            .send()
            .await?;

        let data: Response<Vec<DirectionsRoute>> = read_response(res).await?;

        routes_from(data)
    }
}

async fn read_response<T: DeserializeOwned>(res: reqwest::Response) -> Result<Response<T>, Error> {
    let status_code = res.status().as_u16();

    if (400..500).contains(&status_code) {
        tracing::warn!(status_code, "google maps rejected the request");
        return Err(invalid_input_error());
    } else if status_code != 200 {
        tracing::warn!(status_code, "google maps request failed");
        return Err(upstream_error());
    }

    Ok(res.json().await?)
}

fn check_status<T>(data: &Response<T>, accepted: &[&str]) -> Result<(), Error> {
    if accepted.contains(&data.status.as_str()) {
        return Ok(());
    }

    tracing::warn!(
        status = %data.status,
        message = data.error_message.as_deref().unwrap_or(""),
        "google maps returned an error status"
    );

    match data.status.as_str() {
        "INVALID_REQUEST" | "NOT_FOUND" => Err(invalid_input_error()),
        _ => Err(upstream_error()),
    }
}

fn suggestions_from(data: Response<Vec<Prediction>>) -> Result<Vec<Suggestion>, Error> {
    check_status(&data, &["OK", "ZERO_RESULTS"])?;

    if data.status == "ZERO_RESULTS" {
        return Ok(Vec::new());
    }

    let predictions = data.predictions.ok_or_else(upstream_error)?;

    Ok(predictions
        .into_iter()
        .map(|p| Suggestion::new(p.place_id, p.description))
        .collect())
}

fn place_from(data: Response<PlaceDetails>) -> Result<Place, Error> {
    check_status(&data, &["OK"])?;

    let details = data.result.ok_or_else(upstream_error)?;

    Ok(Place {
        place_id: details.place_id,
        name: details.name.unwrap_or_default(),
        location: details.geometry.map(|g| g.location),
    })
}

fn routes_from(data: Response<Vec<DirectionsRoute>>) -> Result<Vec<Route>, Error> {
    check_status(&data, &["OK", "ZERO_RESULTS"])?;

    Ok(data
        .routes
        .unwrap_or_default()
        .into_iter()
        .map(|r| Route::new(r.summary, r.overview_polyline.points))
        .collect())
}

#[cfg(test)]
fn parse<T: DeserializeOwned>(body: &str) -> Response<T> {
    serde_json::from_str(body).unwrap()
}

#[test]
fn parse_autocomplete_predictions() {
    let data = parse(
        r#"{
            "status": "OK",
            "predictions": [
                {"place_id": "ChIJ3S-JXmauEmsRUcIaWtf4MzE", "description": "Sydney Opera House, Bennelong Point, Sydney NSW, Australia", "types": ["tourist_attraction"]},
                {"place_id": "ChIJP3Sa8ziYEmsRUKgyFmh9AQM", "description": "Sydney NSW, Australia"}
            ]
        }"#,
    );

    let suggestions = suggestions_from(data).unwrap();

    assert_eq!(suggestions.len(), 2);
    assert_eq!(suggestions[0].place_id, "ChIJ3S-JXmauEmsRUcIaWtf4MzE");
    assert_eq!(suggestions[1].description, "Sydney NSW, Australia");
}

#[test]
fn parse_zero_results() {
    let data = parse(r#"{"status": "ZERO_RESULTS", "predictions": []}"#);
    assert!(suggestions_from(data).unwrap().is_empty());

    let data = parse(r#"{"status": "ZERO_RESULTS", "routes": []}"#);
    assert!(routes_from(data).unwrap().is_empty());
}

#[test]
fn parse_error_status() {
    let data: Response<Vec<Prediction>> = parse(
        r#"{"status": "REQUEST_DENIED", "error_message": "The provided API key is invalid.", "predictions": []}"#,
    );
    assert!(suggestions_from(data).unwrap_err().is_upstream_error());

    let data: Response<PlaceDetails> = parse(r#"{"status": "NOT_FOUND"}"#);
    assert!(place_from(data).unwrap_err().is_invalid_input_error());
}

#[test]
fn parse_place_details() {
    let data = parse(
        r#"{
            "status": "OK",
            "result": {
                "place_id": "ChIJ3S-JXmauEmsRUcIaWtf4MzE",
                "name": "Sydney Opera House",
                "geometry": {"location": {"lat": -33.85, "lng": 151.21}}
            }
        }"#,
    );

    let place = place_from(data).unwrap();

    assert_eq!(place.name, "Sydney Opera House");
    assert_eq!(place.location, Some(Coordinates::new(-33.85, 151.21)));
}

#[test]
fn parse_place_details_without_geometry() {
    let data = parse(r#"{"status": "OK", "result": {"place_id": "abc"}}"#);

    let place = place_from(data).unwrap();

    assert_eq!(place.name, "");
    assert!(place.location.is_none());
}

#[test]
fn parse_directions_routes() {
    let data = parse(
        r#"{
            "status": "OK",
            "routes": [
                {"summary": "A1", "overview_polyline": {"points": "_p~iF~ps|U_ulLnnqC_mqNvxq`@"}},
                {"overview_polyline": {"points": ""}}
            ]
        }"#,
    );

    let routes = routes_from(data).unwrap();

    assert_eq!(routes.len(), 2);
    assert_eq!(routes[0].summary, "A1");
    let points: Vec<Coordinates> = routes[0]
        .line_string()
        .unwrap()
        .0
        .into_iter()
        .map(Coordinates::from)
        .collect();
    assert_eq!(points, crate::polyline::fixture_points());
    assert!(routes[1].line_string().unwrap().0.is_empty());
}

#[test]
fn url_honours_explicit_scheme() {
    let mut maps = GoogleMaps {
        client: reqwest::Client::new(),
        api_base: "maps.googleapis.com".into(),
        places_api_key: "key".into(),
        directions_api_key: "key".into(),
    };
    assert_eq!(
        maps.url("directions/json"),
        "https://maps.googleapis.com/maps/api/directions/json"
    );

    maps.api_base = "http://127.0.0.1:8080/".into();
    assert_eq!(
        maps.url("directions/json"),
        "http://127.0.0.1:8080/maps/api/directions/json"
    );
}
