use std::sync::Arc;
use tokio_test::{assert_err, assert_ok};

use super::fakes::{FakeDirections, FakePlaces};
use super::*;
use crate::{
    location::FixedLocation,
    polyline::{self, fixture_points, FIXTURE},
    scene::SharedScene,
};

const SYDNEY: Coordinates = Coordinates {
    lat: -34.0,
    lng: 151.0,
};

const OPERA_HOUSE: Coordinates = Coordinates {
    lat: -33.85,
    lng: 151.21,
};

const TOWER: Coordinates = Coordinates {
    lat: -33.8705,
    lng: 151.2089,
};

struct Harness {
    screen: Screen,
    scene: SharedScene,
    places: Arc<FakePlaces>,
    directions: Arc<FakeDirections>,
}

impl Harness {
    fn new(places: FakePlaces, directions: FakeDirections) -> Self {
        Self::with_config(ScreenConfig::default(), places, directions, true)
    }

    fn with_config(
        config: ScreenConfig,
        places: FakePlaces,
        directions: FakeDirections,
        map_ready: bool,
    ) -> Self {
        let scene = SharedScene::default();
        let places = Arc::new(places);
        let directions = Arc::new(directions);

        let services = Services {
            places: places.clone(),
            directions: directions.clone(),
            location: Arc::new(FixedLocation::new(SYDNEY)),
        };

        let mut screen = Screen::new(config, services, Box::new(scene.clone()));

        if map_ready {
            screen.dispatch(Event::MapReady(Box::new(scene.clone())));
        }

        Self {
            screen,
            scene,
            places,
            directions,
        }
    }

    async fn settle(&mut self, completions: usize) {
        for _ in 0..completions {
            assert!(self.screen.step().await);
        }
    }

    // query, pick the first suggestion and wait for its route
    async fn choose(&mut self, query: &str) {
        self.screen.dispatch(Event::QueryChanged(query.into()));
        self.settle(1).await;
        self.screen.dispatch(Event::SuggestionSelected(0));
        self.settle(2).await;
    }
}

fn opera_house() -> Suggestion {
    Suggestion::new(
        "opera-house",
        "Sydney Opera House, Bennelong Point, Sydney NSW, Australia",
    )
}

fn opera_house_place(location: Option<Coordinates>) -> Place {
    Place {
        place_id: "opera-house".into(),
        name: "Sydney Opera House".into(),
        location,
    }
}

fn tower() -> Suggestion {
    Suggestion::new("tower", "Sydney Tower Eye, Market Street, Sydney NSW, Australia")
}

fn tower_place() -> Place {
    Place {
        place_id: "tower".into(),
        name: "Sydney Tower Eye".into(),
        location: Some(TOWER),
    }
}

fn places() -> FakePlaces {
    FakePlaces::default()
        .with_predictions("Sydney Opera House", vec![opera_house()])
        .with_predictions("Sydney Tower", vec![tower()])
        .with_place(opera_house_place(Some(OPERA_HOUSE)))
        .with_place(tower_place())
}

fn fixture_route() -> Route {
    Route::new("A1", FIXTURE)
}

#[tokio::test]
async fn query_lists_suggestions_in_response_order() {
    let predictions = vec![
        Suggestion::new("a", "Sydney Opera House"),
        Suggestion::new("b", "Sydney Tower Eye"),
        Suggestion::new("c", "Sydney Harbour Bridge"),
    ];
    let mut h = Harness::new(
        FakePlaces::default().with_predictions("Syd", predictions.clone()),
        FakeDirections::default(),
    );

    h.screen.dispatch(Event::QueryChanged("Syd".into()));
    h.settle(1).await;

    assert_eq!(h.places.autocomplete_count(), 1);
    assert_eq!(h.screen.suggestions(), predictions.as_slice());

    let shown: Vec<String> = h
        .scene
        .snapshot()
        .suggestions
        .into_iter()
        .map(|s| s.description)
        .collect();
    assert_eq!(
        shown,
        vec!["Sydney Opera House", "Sydney Tower Eye", "Sydney Harbour Bridge"]
    );
}

#[tokio::test]
async fn every_keystroke_issues_one_request_in_one_session() {
    let mut h = Harness::new(
        FakePlaces::default()
            .with_predictions("S", vec![tower()])
            .with_predictions("Sy", vec![tower(), opera_house()])
            .with_predictions("Syd", vec![opera_house()]),
        FakeDirections::default(),
    );

    for text in ["S", "Sy", "Syd"] {
        h.screen.dispatch(Event::QueryChanged(text.into()));
    }
    h.settle(3).await;

    let calls = h.places.autocomplete_calls.lock().unwrap().clone();
    let inputs: Vec<&str> = calls.iter().map(|(input, _)| input.as_str()).collect();
    assert_eq!(inputs, vec!["S", "Sy", "Syd"]);
    assert!(calls.iter().all(|(_, token)| token == &calls[0].1));

    assert_eq!(h.screen.suggestions(), &[opera_house()]);
}

#[tokio::test]
async fn superseded_suggestions_are_discarded() {
    let mut h = Harness::new(FakePlaces::default(), FakeDirections::default());

    h.screen.dispatch(Event::QueryChanged("S".into()));
    h.screen.dispatch(Event::QueryChanged("Sy".into()));

    // the newer request answers first, the older one arrives late
    h.screen.complete(Completion::Suggestions {
        seq: 2,
        suggestions: Some(vec![opera_house()]),
    });
    h.screen.complete(Completion::Suggestions {
        seq: 1,
        suggestions: Some(vec![tower()]),
    });

    assert_eq!(h.screen.suggestions(), &[opera_house()]);
    assert_eq!(h.scene.snapshot().suggestions, vec![opera_house()]);
}

#[tokio::test]
async fn short_query_clears_suggestions_without_request() {
    let config = ScreenConfig {
        query_threshold: 3,
        ..Default::default()
    };
    let mut h = Harness::with_config(config, places(), FakeDirections::default(), true);

    h.screen.dispatch(Event::QueryChanged("Sydney Tower".into()));
    h.settle(1).await;
    assert_eq!(h.screen.suggestions(), &[tower()]);

    h.screen.dispatch(Event::QueryChanged("Sy".into()));

    assert_eq!(h.places.autocomplete_count(), 1);
    assert!(h.screen.suggestions().is_empty());
    assert!(h.scene.snapshot().suggestions.is_empty());
}

#[tokio::test]
async fn empty_query_issues_no_request() {
    let mut h = Harness::new(places(), FakeDirections::default());

    h.screen.dispatch(Event::QueryChanged(String::new()));

    assert_eq!(h.places.autocomplete_count(), 0);
}

#[tokio::test]
async fn failed_autocomplete_is_silent() {
    let mut h = Harness::new(FakePlaces::default().failing(), FakeDirections::default());

    h.screen.dispatch(Event::QueryChanged("Sydney".into()));
    h.settle(1).await;

    assert_eq!(h.places.autocomplete_count(), 1);
    assert!(h.screen.suggestions().is_empty());

    let scene = h.scene.snapshot();
    assert!(scene.suggestions.is_empty());
    assert!(scene.messages.is_empty());
}

#[tokio::test]
async fn selection_uses_the_carried_place_id() {
    let mut h = Harness::new(places(), FakeDirections::with_routes(vec![fixture_route()]));

    h.choose("Sydney Opera House").await;

    assert_eq!(h.places.autocomplete_count(), 1);

    let autocomplete_token = h.places.autocomplete_calls.lock().unwrap()[0].1.clone();
    let (place_id, place_token) = h.places.place_calls.lock().unwrap()[0].clone();
    assert_eq!(place_id, "opera-house");
    assert_eq!(place_token, autocomplete_token);

    // the place fetch closes the session
    h.screen.dispatch(Event::QueryChanged("Sydney Tower".into()));
    h.settle(1).await;
    let next_token = h.places.autocomplete_calls.lock().unwrap()[1].1.clone();
    assert_ne!(next_token, autocomplete_token);
}

#[tokio::test]
async fn selection_without_location_adds_nothing() {
    let mut h = Harness::new(
        FakePlaces::default()
            .with_predictions("Sydney Opera House", vec![opera_house()])
            .with_place(opera_house_place(None)),
        FakeDirections::with_routes(vec![fixture_route()]),
    );

    h.screen.dispatch(Event::QueryChanged("Sydney Opera House".into()));
    h.settle(1).await;
    h.screen.dispatch(Event::SuggestionSelected(0));
    h.settle(1).await;

    assert_eq!(h.places.place_count(), 1);
    assert_eq!(h.directions.call_count(), 0);

    let scene = h.scene.snapshot();
    assert_eq!(scene.markers.len(), 1);
    assert_eq!(scene.markers[0].position, SYDNEY);
    assert!(scene.polylines.is_empty());
    assert!(scene.messages.is_empty());
}

#[tokio::test]
async fn selection_out_of_range_is_ignored() {
    let mut h = Harness::new(places(), FakeDirections::default());

    h.screen.dispatch(Event::SuggestionSelected(3));

    assert_eq!(h.places.place_count(), 0);
}

#[tokio::test]
async fn submitted_text_takes_the_first_prediction() {
    let mut h = Harness::new(
        places().with_predictions("Sydney", vec![tower(), opera_house()]),
        FakeDirections::with_routes(vec![fixture_route()]),
    );

    h.screen.dispatch(Event::PlaceSubmitted("Sydney".into()));
    h.settle(2).await;

    assert_eq!(h.places.autocomplete_count(), 1);
    assert_eq!(h.places.place_calls.lock().unwrap()[0].0, "tower");
    assert_eq!(h.directions.calls.lock().unwrap()[0], (SYDNEY, TOWER));
}

#[tokio::test]
async fn submitted_text_without_predictions_aborts() {
    let mut h = Harness::new(places(), FakeDirections::with_routes(vec![fixture_route()]));

    h.screen.dispatch(Event::PlaceSubmitted("Atlantis".into()));
    h.settle(1).await;

    assert_eq!(h.places.place_count(), 0);
    assert_eq!(h.directions.call_count(), 0);
    assert_eq!(h.scene.snapshot().markers.len(), 1);
}

#[tokio::test]
async fn each_route_becomes_one_polyline() {
    let alternative = vec![OPERA_HOUSE, TOWER, SYDNEY];
    let routes = vec![
        fixture_route(),
        Route::new("A2", polyline::encode(&alternative)),
        Route::new("A3", ""),
    ];
    let mut h = Harness::new(places(), FakeDirections::with_routes(routes));

    h.choose("Sydney Opera House").await;

    let scene = h.scene.snapshot();
    assert_eq!(scene.polylines.len(), 3);
    assert_eq!(scene.polylines[0].points, fixture_points());
    assert_eq!(scene.polylines[1].points, alternative);
    assert!(scene.polylines[2].points.is_empty());
    assert_eq!(scene.messages.last().map(String::as_str), Some(ROUTE_PROMPT));
}

#[tokio::test]
async fn undecodable_route_is_skipped() {
    let routes = vec![Route::new("broken", "_p~iF"), fixture_route()];
    let mut h = Harness::new(places(), FakeDirections::with_routes(routes));

    h.choose("Sydney Opera House").await;

    let scene = h.scene.snapshot();
    assert_eq!(scene.polylines.len(), 1);
    assert_eq!(scene.polylines[0].points, fixture_points());
}

#[tokio::test]
async fn directions_failure_draws_nothing() {
    let mut h = Harness::new(places(), FakeDirections::failing());

    h.choose("Sydney Opera House").await;

    assert_eq!(h.directions.call_count(), 1);

    let scene = h.scene.snapshot();
    assert_eq!(scene.markers.len(), 2);
    assert!(scene.polylines.is_empty());
    assert_eq!(scene.messages, vec![DESTINATION_PROMPT.to_string()]);
}

#[test]
fn fetch_route_swallows_errors() {
    use tokio_test::block_on;

    let directions = FakeDirections::failing();
    assert!(block_on(fetch_route(&directions, SYDNEY, OPERA_HOUSE)).is_none());

    let directions = FakeDirections::with_routes(vec![fixture_route()]);
    let routes = block_on(fetch_route(&directions, SYDNEY, OPERA_HOUSE)).unwrap();
    assert_eq!(routes, vec![fixture_route()]);
}

#[tokio::test]
async fn map_ready_is_accepted_once() {
    let mut h = Harness::new(places(), FakeDirections::default());
    assert!(h.screen.is_map_ready());

    let other = SharedScene::default();
    h.screen.dispatch(Event::MapReady(Box::new(other.clone())));

    assert!(other.snapshot().markers.is_empty());

    let scene = h.scene.snapshot();
    assert_eq!(scene.markers.len(), 1);
    assert_eq!(scene.markers[0].title, "Current location");
    assert_eq!(scene.camera.unwrap().target, SYDNEY);
}

#[tokio::test]
async fn map_operations_wait_for_the_map() {
    let mut h = Harness::with_config(
        ScreenConfig::default(),
        places(),
        FakeDirections::with_routes(vec![fixture_route()]),
        false,
    );
    assert!(!h.screen.is_map_ready());

    h.choose("Sydney Opera House").await;

    let scene = h.scene.snapshot();
    assert!(scene.markers.is_empty());
    assert!(scene.polylines.is_empty());
    assert!(scene.camera.is_none());
    assert_eq!(scene.messages, vec![DESTINATION_PROMPT, ROUTE_PROMPT]);

    h.screen
        .dispatch(Event::MapReady(Box::new(h.scene.clone())));

    let scene = h.scene.snapshot();
    let positions: Vec<Coordinates> = scene.markers.iter().map(|m| m.position).collect();
    assert_eq!(positions, vec![SYDNEY, OPERA_HOUSE]);
    assert_eq!(scene.polylines.len(), 1);

    let camera = scene.camera.unwrap();
    assert_eq!(camera.target, OPERA_HOUSE);
    assert_eq!(camera.zoom, Some(15.0));
}

#[tokio::test]
async fn new_route_supersedes_the_previous_one() {
    let mut h = Harness::new(places(), FakeDirections::with_routes(vec![fixture_route()]));

    h.screen.start_route(OPERA_HOUSE);
    let first = h.screen.route_seq;
    h.screen.start_route(TOWER);

    // a result of the first fetch that was already queued is ignored
    h.screen.complete(Completion::Routes {
        seq: first,
        routes: Some(vec![Route::new("stale", polyline::encode(&[SYDNEY, OPERA_HOUSE]))]),
    });
    assert!(h.scene.snapshot().polylines.is_empty());

    h.settle(1).await;

    // the first task was aborted before it ever asked for directions
    assert_eq!(h.directions.calls.lock().unwrap().clone(), vec![(SYDNEY, TOWER)]);

    let scene = h.scene.snapshot();
    assert_eq!(scene.polylines.len(), 1);
    assert_eq!(scene.polylines[0].points, fixture_points());
}

#[tokio::test]
async fn new_destination_replaces_previous_overlays() {
    let mut h = Harness::new(places(), FakeDirections::with_routes(vec![fixture_route()]));

    h.choose("Sydney Opera House").await;
    h.choose("Sydney Tower").await;

    let scene = h.scene.snapshot();
    let titles: Vec<&str> = scene.markers.iter().map(|m| m.title.as_str()).collect();
    assert_eq!(titles, vec!["Current location", "Sydney Tower Eye"]);
    assert_eq!(scene.polylines.len(), 1);
}

#[tokio::test]
async fn failed_route_leaves_no_stale_overlay() {
    let mut h = Harness::new(places(), FakeDirections::with_routes(vec![fixture_route()]));

    h.choose("Sydney Opera House").await;
    assert_eq!(h.scene.snapshot().polylines.len(), 1);

    h.screen.dispatch(Event::QueryChanged("Sydney Tower".into()));
    h.settle(1).await;
    h.screen.dispatch(Event::SuggestionSelected(0));
    h.settle(1).await;

    // the directions call for the new destination fails
    h.screen.cancel_route();
    h.screen.complete(Completion::Routes {
        seq: h.screen.route_seq,
        routes: None,
    });

    let scene = h.scene.snapshot();
    let titles: Vec<&str> = scene.markers.iter().map(|m| m.title.as_str()).collect();
    assert_eq!(titles, vec!["Current location", "Sydney Tower Eye"]);
    assert!(scene.polylines.is_empty());
    assert!(h.screen.route_overlays.is_empty());
}

#[tokio::test]
async fn kept_routes_accumulate() {
    let config = ScreenConfig {
        keep_previous_routes: true,
        ..Default::default()
    };
    let mut h = Harness::with_config(
        config,
        places(),
        FakeDirections::with_routes(vec![fixture_route()]),
        true,
    );

    h.choose("Sydney Opera House").await;
    h.choose("Sydney Tower").await;

    let scene = h.scene.snapshot();
    assert_eq!(scene.markers.len(), 3);
    assert_eq!(scene.polylines.len(), 2);
}

#[tokio::test]
async fn sydney_opera_house_end_to_end() {
    let mut h = Harness::new(places(), FakeDirections::with_routes(vec![fixture_route()]));

    h.screen
        .dispatch(Event::QueryChanged("Sydney Opera House".into()));
    h.settle(1).await;
    assert_eq!(h.scene.snapshot().suggestions, vec![opera_house()]);

    h.screen.dispatch(Event::SuggestionSelected(0));
    h.settle(1).await;

    let scene = h.scene.snapshot();
    assert_eq!(scene.markers.len(), 2);
    assert_eq!(scene.markers[1].title, "Sydney Opera House");
    assert_eq!(scene.markers[1].position, OPERA_HOUSE);

    let camera = scene.camera.unwrap();
    assert_eq!(camera.target, OPERA_HOUSE);
    assert_eq!(camera.zoom, Some(15.0));
    assert_eq!(scene.messages, vec![DESTINATION_PROMPT]);

    h.settle(1).await;

    assert_eq!(
        h.directions.calls.lock().unwrap().clone(),
        vec![(SYDNEY, OPERA_HOUSE)]
    );

    let scene = h.scene.snapshot();
    assert_eq!(scene.polylines.len(), 1);
    assert_eq!(scene.polylines[0].points, fixture_points());
    assert_eq!(scene.messages, vec![DESTINATION_PROMPT, ROUTE_PROMPT]);
}

#[tokio::test]
async fn origin_falls_back_to_configured_location() {
    let scene = SharedScene::default();
    let directions = Arc::new(FakeDirections::with_routes(vec![fixture_route()]));
    let origin = Coordinates::new(-33.87, 151.2);

    let services = Services {
        places: Arc::new(places()),
        directions: directions.clone(),
        location: Arc::new(crate::location::NoLocation),
    };
    let config = ScreenConfig {
        origin,
        ..Default::default()
    };

    let mut screen = Screen::new(config, services, Box::new(scene.clone()));
    screen.dispatch(Event::MapReady(Box::new(scene.clone())));
    screen.dispatch(Event::PlaceSubmitted("Sydney Opera House".into()));
    assert!(screen.step().await);
    assert!(screen.step().await);

    assert_eq!(scene.snapshot().markers[0].position, origin);
    assert_eq!(directions.calls.lock().unwrap()[0], (origin, OPERA_HOUSE));
}

#[tokio::test]
async fn shutdown_stops_the_loop() {
    let scene = SharedScene::default();
    let services = Services {
        places: Arc::new(places()),
        directions: Arc::new(FakeDirections::default()),
        location: Arc::new(FixedLocation::new(SYDNEY)),
    };

    let screen = Screen::new(ScreenConfig::default(), services, Box::new(scene.clone()));
    let handle = screen.handle();
    let task = screen.spawn();

    assert_ok!(handle.send(Event::MapReady(Box::new(scene.clone()))).await);
    assert_ok!(handle.send(Event::Shutdown).await);
    assert_ok!(task.await);

    assert_eq!(scene.snapshot().markers.len(), 1);
    assert_err!(handle.send(Event::QueryChanged("Sydney".into())).await);
}

#[tokio::test]
async fn dispatching_shutdown_stops_and_cancels_the_route() {
    let mut h = Harness::new(places(), FakeDirections::with_routes(vec![fixture_route()]));

    assert!(h.screen.dispatch(Event::QueryChanged("Sydney".into())));

    h.screen.start_route(OPERA_HOUSE);
    assert!(h.screen.route_task.is_some());

    assert!(!h.screen.dispatch(Event::Shutdown));
    assert!(h.screen.route_task.is_none());
}
