use super::Screen;

use geo_types::LineString;

use crate::{
    api::{DynMapSurface, MapSurface},
    entities::{CameraUpdate, Coordinates, OverlayId},
};

#[derive(Debug)]
pub(super) enum MapCommand {
    AddMarker {
        id: OverlayId,
        position: Coordinates,
        title: String,
    },
    AddPolyline {
        id: OverlayId,
        line: LineString<f64>,
    },
    RemoveOverlay(OverlayId),
    MoveCamera(CameraUpdate),
}

impl MapCommand {
    fn apply(self, map: &mut dyn MapSurface) {
        match self {
            Self::AddMarker {
                id,
                position,
                title,
            } => map.add_marker(id, position, &title),
            Self::AddPolyline { id, line } => map.add_polyline(id, &line),
            Self::RemoveOverlay(id) => map.remove_overlay(id),
            Self::MoveCamera(update) => map.move_camera(update),
        }
    }
}

/// Commands issued before the map is ready wait here in order.
pub(super) enum MapSlot {
    Pending(Vec<MapCommand>),
    Ready(DynMapSurface),
}

impl Default for MapSlot {
    fn default() -> Self {
        Self::Pending(Vec::new())
    }
}

impl MapSlot {
    pub(super) fn is_ready(&self) -> bool {
        matches!(self, Self::Ready(_))
    }
}

impl Screen {
    #[tracing::instrument(skip_all)]
    pub(super) fn on_map_ready(&mut self, mut map: DynMapSurface) {
        let pending = match &mut self.map {
            MapSlot::Ready(_) => {
                tracing::warn!("map already ready, ignoring");
                return;
            }
            MapSlot::Pending(pending) => std::mem::take(pending),
        };

        let origin = self.origin();
        let marker = self.overlay_id();

        MapCommand::AddMarker {
            id: marker,
            position: origin,
            title: self.config.origin_title.clone(),
        }
        .apply(map.as_mut());
        MapCommand::MoveCamera(CameraUpdate::Center { target: origin }).apply(map.as_mut());

        tracing::info!(deferred = pending.len(), "map ready");

        for command in pending {
            command.apply(map.as_mut());
        }

        self.map = MapSlot::Ready(map);
    }

    pub(super) fn map_command(&mut self, command: MapCommand) {
        match &mut self.map {
            MapSlot::Ready(map) => command.apply(map.as_mut()),
            MapSlot::Pending(pending) => {
                tracing::debug!(?command, "map not ready, deferring");
                pending.push(command);
            }
        }
    }
}
