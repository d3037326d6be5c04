//! The single screen: a place search box with suggestions above a map.
//!
//! All screen state is owned by one event loop. User input arrives as
//! [`Event`]s through a [`ScreenHandle`]; remote calls run on spawned tasks and
//! post their completions back onto the same queue, so every state change
//! happens on the loop.

mod map;
mod query;
mod route;
mod selection;

#[cfg(test)]
pub(crate) mod fakes;
#[cfg(test)]
mod tests;

use async_channel::{Receiver, Sender};
use futures::future::BoxFuture;
use std::fmt;
use tokio::task::JoinHandle;

use crate::{
    api::{DynDirectionsAPI, DynLocationSource, DynMapSurface, DynPlacesAPI, DynScreenView},
    config::ScreenConfig,
    entities::{Coordinates, OverlayId, Place, Route, SessionToken, Suggestion},
    error::{invalid_state_error, Error},
};

use map::MapSlot;

pub use route::fetch_route;

pub const DESTINATION_PROMPT: &str = "Set this place as your destination?";
pub const ROUTE_PROMPT: &str = "Route ready. Start navigation?";

pub enum Event {
    MapReady(DynMapSurface),
    QueryChanged(String),
    SuggestionSelected(usize),
    PlaceSubmitted(String),
    Shutdown,
}

impl fmt::Debug for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MapReady(_) => write!(f, "MapReady"),
            Self::QueryChanged(text) => f.debug_tuple("QueryChanged").field(text).finish(),
            Self::SuggestionSelected(index) => {
                f.debug_tuple("SuggestionSelected").field(index).finish()
            }
            Self::PlaceSubmitted(text) => f.debug_tuple("PlaceSubmitted").field(text).finish(),
            Self::Shutdown => write!(f, "Shutdown"),
        }
    }
}

#[derive(Debug)]
enum Completion {
    Suggestions {
        seq: u64,
        suggestions: Option<Vec<Suggestion>>,
    },
    Place {
        seq: u64,
        place: Option<Place>,
    },
    Routes {
        seq: u64,
        routes: Option<Vec<Route>>,
    },
}

enum Message {
    Event(Event),
    Completion(Completion),
}

#[derive(Clone)]
pub struct ScreenHandle {
    tx: Sender<Message>,
}

impl ScreenHandle {
    pub async fn send(&self, event: Event) -> Result<(), Error> {
        self.tx
            .send(Message::Event(event))
            .await
            .map_err(|_| invalid_state_error())
    }
}

pub struct Services {
    pub places: DynPlacesAPI,
    pub directions: DynDirectionsAPI,
    pub location: DynLocationSource,
}

pub struct Screen {
    config: ScreenConfig,
    places: DynPlacesAPI,
    directions: DynDirectionsAPI,
    location: DynLocationSource,
    view: DynScreenView,
    map: MapSlot,

    suggestions: Vec<Suggestion>,
    session: Option<SessionToken>,

    // latest request issued per pipeline; completions tagged otherwise are stale
    query_seq: u64,
    selection_seq: u64,
    route_seq: u64,
    route_task: Option<JoinHandle<()>>,

    next_overlay: u64,
    destination_marker: Option<OverlayId>,
    route_overlays: Vec<OverlayId>,

    tx: Sender<Message>,
    rx: Receiver<Message>,
}

impl Screen {
    pub fn new(config: ScreenConfig, services: Services, view: DynScreenView) -> Self {
        let (tx, rx) = async_channel::unbounded();

        Self {
            config,
            places: services.places,
            directions: services.directions,
            location: services.location,
            view,
            map: MapSlot::default(),
            suggestions: Vec::new(),
            session: None,
            query_seq: 0,
            selection_seq: 0,
            route_seq: 0,
            route_task: None,
            next_overlay: 0,
            destination_marker: None,
            route_overlays: Vec::new(),
            tx,
            rx,
        }
    }

    pub fn handle(&self) -> ScreenHandle {
        ScreenHandle {
            tx: self.tx.clone(),
        }
    }

    pub fn suggestions(&self) -> &[Suggestion] {
        &self.suggestions
    }

    pub fn is_map_ready(&self) -> bool {
        self.map.is_ready()
    }

    pub fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(self.run())
    }

    pub async fn run(mut self) {
        tracing::info!("screen started");

        while self.step().await {}

        self.cancel_route();

        tracing::info!("screen closed");
    }

    /// Waits for the next event or completion and applies it. Returns false
    /// once the screen has shut down.
    pub async fn step(&mut self) -> bool {
        match self.rx.recv().await {
            Ok(Message::Event(event)) => self.dispatch(event),
            Ok(Message::Completion(completion)) => {
                self.complete(completion);
                true
            }
            Err(_) => false,
        }
    }

    /// Applies one user event. Returns false for [`Event::Shutdown`], after
    /// aborting the route task; the caller must stop feeding the screen.
    pub fn dispatch(&mut self, event: Event) -> bool {
        tracing::debug!(?event, "screen event");

        match event {
            Event::MapReady(map) => self.on_map_ready(map),
            Event::QueryChanged(text) => self.on_query_changed(text),
            Event::SuggestionSelected(index) => self.on_suggestion_selected(index),
            Event::PlaceSubmitted(text) => self.on_place_submitted(text),
            Event::Shutdown => {
                self.cancel_route();
                return false;
            }
        }

        true
    }

    fn complete(&mut self, completion: Completion) {
        match completion {
            Completion::Suggestions { seq, suggestions } => self.on_suggestions(seq, suggestions),
            Completion::Place { seq, place } => self.on_place_resolved(seq, place),
            Completion::Routes { seq, routes } => self.on_routes(seq, routes),
        }
    }

    fn spawn_completion(&self, work: BoxFuture<'static, Completion>) -> JoinHandle<()> {
        let tx = self.tx.clone();

        tokio::spawn(async move {
            let completion = work.await;

            if tx.send(Message::Completion(completion)).await.is_err() {
                tracing::debug!("screen closed before completion was delivered");
            }
        })
    }

    fn overlay_id(&mut self) -> OverlayId {
        self.next_overlay += 1;
        OverlayId(self.next_overlay)
    }

    fn origin(&self) -> Coordinates {
        self.location
            .current_location()
            .unwrap_or(self.config.origin)
    }
}
