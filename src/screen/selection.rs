use super::map::MapCommand;
use super::{Completion, Screen, DESTINATION_PROMPT};

use futures::FutureExt;

use crate::{
    api::PlacesAPI,
    entities::{CameraUpdate, Place, SessionToken},
};

impl Screen {
    #[tracing::instrument(skip(self))]
    pub(super) fn on_suggestion_selected(&mut self, index: usize) {
        let suggestion = match self.suggestions.get(index) {
            Some(suggestion) => suggestion.clone(),
            None => {
                tracing::warn!(index, count = self.suggestions.len(), "no such suggestion");
                return;
            }
        };

        self.selection_seq += 1;
        let seq = self.selection_seq;
        let places = self.places.clone();
        let session_token = self.end_session();

        self.spawn_completion(
            async move {
                let place = resolve_place(places.as_ref(), suggestion.place_id, session_token).await;

                Completion::Place { seq, place }
            }
            .boxed(),
        );
    }

    /// Free text that never came from the suggestion list: search for it and
    /// take the first prediction.
    #[tracing::instrument(skip(self))]
    pub(super) fn on_place_submitted(&mut self, text: String) {
        self.selection_seq += 1;
        let seq = self.selection_seq;
        let places = self.places.clone();
        let session_token = self.end_session();

        self.spawn_completion(
            async move {
                let place = match places.autocomplete(text, session_token.clone()).await {
                    Ok(suggestions) => match suggestions.into_iter().next() {
                        Some(first) => {
                            resolve_place(places.as_ref(), first.place_id, session_token).await
                        }
                        None => {
                            tracing::debug!("no prediction for submitted text");
                            None
                        }
                    },
                    Err(err) => {
                        tracing::error!(%err, "autocomplete request failed");
                        None
                    }
                };

                Completion::Place { seq, place }
            }
            .boxed(),
        );
    }

    pub(super) fn on_place_resolved(&mut self, seq: u64, place: Option<Place>) {
        if seq != self.selection_seq {
            tracing::debug!(seq, latest = self.selection_seq, "discarding superseded place");
            return;
        }

        let place = match place {
            Some(place) => place,
            None => return,
        };

        let location = match place.location {
            Some(location) => location,
            None => {
                tracing::warn!(place_id = %place.place_id, "place has no location");
                return;
            }
        };

        if !self.config.keep_previous_routes {
            self.clear_destination();
        }

        let marker = self.overlay_id();
        self.destination_marker = Some(marker);

        self.map_command(MapCommand::AddMarker {
            id: marker,
            position: location,
            title: place.name,
        });
        self.map_command(MapCommand::MoveCamera(CameraUpdate::CenterZoom {
            target: location,
            zoom: self.config.zoom,
        }));

        self.view.show_message(DESTINATION_PROMPT);

        self.start_route(location);
    }
}

impl Screen {
    // the old marker and the route leading to it go together
    fn clear_destination(&mut self) {
        let previous = self.destination_marker.take();
        let routes = std::mem::take(&mut self.route_overlays);

        for id in previous.into_iter().chain(routes) {
            self.map_command(MapCommand::RemoveOverlay(id));
        }
    }
}

async fn resolve_place(
    places: &(dyn PlacesAPI + Send + Sync),
    place_id: String,
    session_token: SessionToken,
) -> Option<Place> {
    match places.find_place(place_id, session_token).await {
        Ok(place) => Some(place),
        Err(err) => {
            tracing::error!(%err, "place details request failed");
            None
        }
    }
}
