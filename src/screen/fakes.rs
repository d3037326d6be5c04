use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;

use crate::{
    api::{DirectionsAPI, PlacesAPI},
    entities::{Coordinates, Place, Route, SessionToken, Suggestion},
    error::{invalid_input_error, upstream_error, Error},
};

#[derive(Default)]
pub struct FakePlaces {
    predictions: HashMap<String, Vec<Suggestion>>,
    places: HashMap<String, Place>,
    failing: bool,
    pub autocomplete_calls: Mutex<Vec<(String, SessionToken)>>,
    pub place_calls: Mutex<Vec<(String, SessionToken)>>,
}

impl FakePlaces {
    pub fn with_predictions(mut self, input: &str, predictions: Vec<Suggestion>) -> Self {
        self.predictions.insert(input.into(), predictions);
        self
    }

    pub fn with_place(mut self, place: Place) -> Self {
        self.places.insert(place.place_id.clone(), place);
        self
    }

    pub fn failing(mut self) -> Self {
        self.failing = true;
        self
    }

    pub fn autocomplete_count(&self) -> usize {
        self.autocomplete_calls.lock().unwrap().len()
    }

    pub fn place_count(&self) -> usize {
        self.place_calls.lock().unwrap().len()
    }
}

#[async_trait]
impl PlacesAPI for FakePlaces {
    async fn autocomplete(
        &self,
        input: String,
        session_token: SessionToken,
    ) -> Result<Vec<Suggestion>, Error> {
        self.autocomplete_calls
            .lock()
            .unwrap()
            .push((input.clone(), session_token));

        if self.failing {
            return Err(upstream_error());
        }

        Ok(self.predictions.get(&input).cloned().unwrap_or_default())
    }

    async fn find_place(
        &self,
        place_id: String,
        session_token: SessionToken,
    ) -> Result<Place, Error> {
        self.place_calls
            .lock()
            .unwrap()
            .push((place_id.clone(), session_token));

        self.places
            .get(&place_id)
            .cloned()
            .ok_or_else(invalid_input_error)
    }
}

#[derive(Default)]
pub struct FakeDirections {
    routes: Vec<Route>,
    failing: bool,
    pub calls: Mutex<Vec<(Coordinates, Coordinates)>>,
}

impl FakeDirections {
    pub fn with_routes(routes: Vec<Route>) -> Self {
        Self {
            routes,
            ..Default::default()
        }
    }

    pub fn failing() -> Self {
        Self {
            failing: true,
            ..Default::default()
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl DirectionsAPI for FakeDirections {
    async fn directions(
        &self,
        origin: Coordinates,
        destination: Coordinates,
    ) -> Result<Vec<Route>, Error> {
        self.calls.lock().unwrap().push((origin, destination));

        if self.failing {
            return Err(upstream_error());
        }

        Ok(self.routes.clone())
    }
}
