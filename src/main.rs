use std::sync::Arc;

use autoroute::api::serve;
use autoroute::config::Config;
use autoroute::error::Error;
use autoroute::external::GoogleMaps;
use autoroute::location::FixedLocation;
use autoroute::scene::SharedScene;
use autoroute::screen::{Event, Screen, Services};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    if let Err(err) = run().await {
        tracing::error!(%err, "autoroute stopped");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), Error> {
    let config = Config::from_env()?;
    let maps = Arc::new(GoogleMaps::new(&config)?);

    let services = Services {
        places: maps.clone(),
        directions: maps,
        location: Arc::new(FixedLocation::new(config.screen.origin)),
    };

    let scene = SharedScene::default();
    let screen = Screen::new(config.screen.clone(), services, Box::new(scene.clone()));
    let handle = screen.handle();
    let task = screen.spawn();

    // the scene renders as soon as the server is up
    handle.send(Event::MapReady(Box::new(scene.clone()))).await?;

    let served = serve(config.listen, handle.clone(), scene).await;

    handle.send(Event::Shutdown).await?;
    if let Err(err) = task.await {
        tracing::error!(%err, "screen task failed");
    }

    served
}
