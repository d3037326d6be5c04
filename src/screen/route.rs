use super::map::MapCommand;
use super::{Completion, Screen, ROUTE_PROMPT};

use futures::FutureExt;

use crate::{
    api::DirectionsAPI,
    entities::{Coordinates, Route},
};

impl Screen {
    /// Only one route fetch is live at a time; a new one aborts the previous.
    pub(super) fn start_route(&mut self, destination: Coordinates) {
        self.cancel_route();

        self.route_seq += 1;
        let seq = self.route_seq;
        let origin = self.origin();
        let directions = self.directions.clone();

        let task = self.spawn_completion(
            async move {
                let routes = fetch_route(directions.as_ref(), origin, destination).await;

                Completion::Routes { seq, routes }
            }
            .boxed(),
        );

        self.route_task = Some(task);
    }

    pub(super) fn cancel_route(&mut self) {
        if let Some(task) = self.route_task.take() {
            task.abort();
        }
    }

    pub(super) fn on_routes(&mut self, seq: u64, routes: Option<Vec<Route>>) {
        if seq != self.route_seq {
            tracing::debug!(seq, latest = self.route_seq, "discarding superseded routes");
            return;
        }

        self.route_task = None;

        let routes = match routes {
            Some(routes) => routes,
            None => return,
        };

        for route in routes {
            let line = match route.line_string() {
                Ok(line) => line,
                Err(err) => {
                    tracing::error!(%err, summary = %route.summary, "undecodable route path");
                    continue;
                }
            };

            let id = self.overlay_id();
            self.map_command(MapCommand::AddPolyline { id, line });
            self.route_overlays.push(id);
        }

        self.view.show_message(ROUTE_PROMPT);
    }
}

/// Asks the directions service once. Failures are logged and reported as no
/// route.
#[tracing::instrument(skip(directions))]
pub async fn fetch_route(
    directions: &(dyn DirectionsAPI + Send + Sync),
    origin: Coordinates,
    destination: Coordinates,
) -> Option<Vec<Route>> {
    match directions.directions(origin, destination).await {
        Ok(routes) => {
            tracing::info!(count = routes.len(), "routes fetched");
            Some(routes)
        }
        Err(err) => {
            tracing::error!(%err, "directions request failed");
            None
        }
    }
}
