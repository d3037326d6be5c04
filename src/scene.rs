use geo_types::LineString;
use serde::Serialize;
use std::sync::{Arc, Mutex, MutexGuard};

use crate::{
    api::{MapSurface, ScreenView},
    entities::{CameraUpdate, Coordinates, OverlayId, Suggestion},
};

const MESSAGE_HISTORY: usize = 16;

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Marker {
    pub id: OverlayId,
    pub position: Coordinates,
    pub title: String,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Polyline {
    pub id: OverlayId,
    pub points: Vec<Coordinates>,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct Camera {
    pub target: Coordinates,
    pub zoom: Option<f32>,
}

/// Everything the screen currently shows: the suggestion list, the map
/// overlays and camera, and recent transient messages.
#[derive(Clone, Debug, Default, Serialize)]
pub struct Scene {
    pub suggestions: Vec<Suggestion>,
    pub markers: Vec<Marker>,
    pub polylines: Vec<Polyline>,
    pub camera: Option<Camera>,
    pub messages: Vec<String>,
}

#[derive(Clone, Debug, Default)]
pub struct SharedScene(Arc<Mutex<Scene>>);

impl SharedScene {
    pub fn snapshot(&self) -> Scene {
        self.scene().clone()
    }

    fn scene(&self) -> MutexGuard<'_, Scene> {
        // a panic while holding the lock leaves the scene consistent enough to render
        self.0.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl MapSurface for SharedScene {
    fn add_marker(&mut self, id: OverlayId, position: Coordinates, title: &str) {
        self.scene().markers.push(Marker {
            id,
            position,
            title: title.into(),
        });
    }

    fn add_polyline(&mut self, id: OverlayId, line: &LineString<f64>) {
        let points = line.coords().map(|c| Coordinates::from(*c)).collect();

        self.scene().polylines.push(Polyline { id, points });
    }

    fn remove_overlay(&mut self, id: OverlayId) {
        let mut scene = self.scene();
        scene.markers.retain(|m| m.id != id);
        scene.polylines.retain(|p| p.id != id);
    }

    fn move_camera(&mut self, update: CameraUpdate) {
        let mut scene = self.scene();

        let camera = match update {
            CameraUpdate::Center { target } => Camera {
                target,
                zoom: scene.camera.and_then(|c| c.zoom),
            },
            CameraUpdate::CenterZoom { target, zoom } => Camera {
                target,
                zoom: Some(zoom),
            },
        };

        scene.camera = Some(camera);
    }
}

impl ScreenView for SharedScene {
    fn set_suggestions(&mut self, suggestions: &[Suggestion]) {
        self.scene().suggestions = suggestions.to_vec();
    }

    fn show_message(&mut self, message: &str) {
        tracing::info!(text = message, "screen message");

        let mut scene = self.scene();
        scene.messages.push(message.into());

        if scene.messages.len() > MESSAGE_HISTORY {
            let excess = scene.messages.len() - MESSAGE_HISTORY;
            scene.messages.drain(..excess);
        }
    }
}

#[test]
fn remove_overlay_removes_markers_and_polylines() {
    let mut scene = SharedScene::default();
    let here = Coordinates::new(-34.0, 151.0);

    scene.add_marker(OverlayId(1), here, "here");
    let line = LineString::from(vec![
        geo_types::Coord::from(here),
        geo_types::Coord::from(Coordinates::new(-33.85, 151.21)),
    ]);
    scene.add_polyline(OverlayId(2), &line);
    scene.add_marker(OverlayId(3), here, "there");

    scene.remove_overlay(OverlayId(1));
    scene.remove_overlay(OverlayId(2));

    let snapshot = scene.snapshot();
    assert_eq!(snapshot.markers.len(), 1);
    assert_eq!(snapshot.markers[0].title, "there");
    assert!(snapshot.polylines.is_empty());
}

#[test]
fn centering_keeps_zoom() {
    let mut scene = SharedScene::default();

    scene.move_camera(CameraUpdate::Center {
        target: Coordinates::new(-34.0, 151.0),
    });
    assert_eq!(scene.snapshot().camera.unwrap().zoom, None);

    scene.move_camera(CameraUpdate::CenterZoom {
        target: Coordinates::new(-33.85, 151.21),
        zoom: 15.0,
    });
    scene.move_camera(CameraUpdate::Center {
        target: Coordinates::new(-34.0, 151.0),
    });

    let camera = scene.snapshot().camera.unwrap();
    assert_eq!(camera.target, Coordinates::new(-34.0, 151.0));
    assert_eq!(camera.zoom, Some(15.0));
}

#[test]
fn clones_share_one_scene() {
    let scene = SharedScene::default();
    let mut view = scene.clone();

    view.set_suggestions(&[Suggestion::new("a", "Sydney")]);
    for i in 0..20 {
        view.show_message(&format!("message {}", i));
    }

    let snapshot = scene.snapshot();
    assert_eq!(snapshot.suggestions[0].description, "Sydney");
    assert_eq!(snapshot.messages.len(), 16);
    assert_eq!(snapshot.messages[0], "message 4");
}
