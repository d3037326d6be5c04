use axum::extract::{Extension, Json};
use axum::http::StatusCode;
use serde::{Deserialize, Serialize};

use crate::{
    error::Error,
    scene::{Scene, SharedScene},
    screen::{Event, ScreenHandle},
};

#[derive(Debug, Serialize, Deserialize)]
pub struct TextParams {
    pub text: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SelectParams {
    pub index: usize,
}

pub async fn query(
    Extension(handle): Extension<ScreenHandle>,
    Json(params): Json<TextParams>,
) -> Result<StatusCode, Error> {
    handle.send(Event::QueryChanged(params.text)).await?;

    Ok(StatusCode::ACCEPTED)
}

pub async fn select(
    Extension(handle): Extension<ScreenHandle>,
    Json(params): Json<SelectParams>,
) -> Result<StatusCode, Error> {
    handle.send(Event::SuggestionSelected(params.index)).await?;

    Ok(StatusCode::ACCEPTED)
}

pub async fn search(
    Extension(handle): Extension<ScreenHandle>,
    Json(params): Json<TextParams>,
) -> Result<StatusCode, Error> {
    handle.send(Event::PlaceSubmitted(params.text)).await?;

    Ok(StatusCode::ACCEPTED)
}

pub async fn scene(Extension(scene): Extension<SharedScene>) -> Json<Scene> {
    Json(scene.snapshot())
}

#[cfg(test)]
fn screen_with(scene: &SharedScene) -> crate::screen::Screen {
    use crate::{
        config::ScreenConfig,
        entities::Suggestion,
        location::FixedLocation,
        screen::{
            fakes::{FakeDirections, FakePlaces},
            Screen, Services,
        },
    };
    use std::sync::Arc;

    let places = FakePlaces::default()
        .with_predictions("Sydney", vec![Suggestion::new("opera-house", "Sydney Opera House")]);

    let services = Services {
        places: Arc::new(places),
        directions: Arc::new(FakeDirections::default()),
        location: Arc::new(FixedLocation::new(ScreenConfig::default().origin)),
    };

    Screen::new(ScreenConfig::default(), services, Box::new(scene.clone()))
}

#[tokio::test]
async fn query_reaches_the_screen() {
    let shared = SharedScene::default();
    let mut screen = screen_with(&shared);

    let status = query(
        Extension(screen.handle()),
        Json(TextParams {
            text: "Sydney".into(),
        }),
    )
    .await
    .unwrap();
    assert_eq!(status, StatusCode::ACCEPTED);

    // the event, then the autocomplete completion
    assert!(screen.step().await);
    assert!(screen.step().await);

    let Json(snapshot) = scene(Extension(shared)).await;
    assert_eq!(snapshot.suggestions[0].description, "Sydney Opera House");
}

#[tokio::test]
async fn closed_screen_is_invalid_state() {
    let shared = SharedScene::default();
    let screen = screen_with(&shared);
    let handle = screen.handle();
    drop(screen);

    let err = select(Extension(handle), Json(SelectParams { index: 0 }))
        .await
        .unwrap_err();
    assert_eq!(err.code, 100);
}
