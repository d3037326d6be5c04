mod handlers;

use std::net::SocketAddr;

use axum::{
    extract::Extension,
    routing::{get, post},
    Router,
};

use crate::{
    error::{unexpected_error, Error},
    scene::SharedScene,
    screen::ScreenHandle,
};

use handlers::screen;

pub fn router(handle: ScreenHandle, scene: SharedScene) -> Router {
    Router::new()
        .route("/query", post(screen::query))
        .route("/select", post(screen::select))
        .route("/search", post(screen::search))
        .route("/scene", get(screen::scene))
        .layer(Extension(handle))
        .layer(Extension(scene))
}

pub async fn serve(addr: SocketAddr, handle: ScreenHandle, scene: SharedScene) -> Result<(), Error> {
    let app = router(handle, scene);

    tracing::info!("listening on {}", addr);

    axum::Server::bind(&addr)
        .serve(app.into_make_service())
        .await
        .map_err(|err| {
            tracing::error!(%err, "server stopped");
            unexpected_error()
        })
}
