use std::env;
use std::net::SocketAddr;
use std::time::Duration;

use crate::{
    entities::Coordinates,
    error::{invalid_input_error, Error},
};

const DEFAULT_API_BASE: &str = "maps.googleapis.com";
const DEFAULT_LISTEN: &str = "127.0.0.1:3000";
const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 10;

#[derive(Clone, Debug)]
pub struct Config {
    pub api_base: String,
    pub places_api_key: String,
    pub directions_api_key: String,
    pub http_timeout: Duration,
    pub listen: SocketAddr,
    pub screen: ScreenConfig,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ScreenConfig {
    pub query_threshold: usize,
    pub zoom: f32,
    pub keep_previous_routes: bool,
    // used when no location source reports a position
    pub origin: Coordinates,
    pub origin_title: String,
}

impl Default for ScreenConfig {
    fn default() -> Self {
        Self {
            query_threshold: 1,
            zoom: 15.0,
            keep_previous_routes: false,
            origin: Coordinates::new(-34.0, 151.0),
            origin_title: "Current location".into(),
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, Error> {
        if let Err(err) = dotenv::dotenv() {
            tracing::debug!(%err, "no .env file loaded");
        }

        Self::from_lookup(|key| env::var(key))
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, Error>
    where
        F: Fn(&str) -> Result<String, env::VarError>,
    {
        let optional = |key: &str| match lookup(key) {
            Ok(value) => Ok(Some(value)),
            Err(env::VarError::NotPresent) => Ok(None),
            Err(err) => Err(Error::from(err)),
        };

        let places_api_key = lookup("GOOGLE_MAPS_API_KEY")?;
        if places_api_key.trim().is_empty() {
            return Err(invalid_input_error());
        }

        let directions_api_key =
            optional("GOOGLE_DIRECTIONS_API_KEY")?.unwrap_or_else(|| places_api_key.clone());

        let api_base = optional("GOOGLE_MAPS_API_BASE")?.unwrap_or_else(|| DEFAULT_API_BASE.into());

        let http_timeout = match optional("AUTOROUTE_HTTP_TIMEOUT_SECS")? {
            Some(value) => Duration::from_secs(value.parse::<u64>()?),
            None => Duration::from_secs(DEFAULT_HTTP_TIMEOUT_SECS),
        };

        let listen: SocketAddr = optional("AUTOROUTE_LISTEN")?
            .unwrap_or_else(|| DEFAULT_LISTEN.into())
            .parse()?;

        let mut screen = ScreenConfig::default();

        if let Some(value) = optional("AUTOROUTE_ORIGIN")? {
            screen.origin = value.parse::<Coordinates>()?;
        }

        if let Some(value) = optional("AUTOROUTE_QUERY_THRESHOLD")? {
            screen.query_threshold = value.parse::<usize>()?;
        }

        if let Some(value) = optional("AUTOROUTE_ZOOM")? {
            let zoom: f32 = value.parse()?;
            if !(0.0..=21.0).contains(&zoom) {
                return Err(invalid_input_error());
            }
            screen.zoom = zoom;
        }

        if let Some(value) = optional("AUTOROUTE_KEEP_PREVIOUS_ROUTES")? {
            screen.keep_previous_routes = value.parse::<bool>()?;
        }

        Ok(Self {
            api_base,
            places_api_key,
            directions_api_key,
            http_timeout,
            listen,
            screen,
        })
    }
}

#[cfg(test)]
fn lookup_from(vars: &[(&str, &str)]) -> impl Fn(&str) -> Result<String, env::VarError> {
    let vars: std::collections::HashMap<String, String> = vars
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();

    move |key| vars.get(key).cloned().ok_or(env::VarError::NotPresent)
}

#[test]
fn config_defaults() {
    let config = Config::from_lookup(lookup_from(&[("GOOGLE_MAPS_API_KEY", "places-key")])).unwrap();

    assert_eq!(config.api_base, "maps.googleapis.com");
    assert_eq!(config.places_api_key, "places-key");
    assert_eq!(config.directions_api_key, "places-key");
    assert_eq!(config.http_timeout, Duration::from_secs(10));
    assert_eq!(config.listen, "127.0.0.1:3000".parse::<SocketAddr>().unwrap());
    assert_eq!(config.screen, ScreenConfig::default());
}

#[test]
fn config_overrides() {
    let config = Config::from_lookup(lookup_from(&[
        ("GOOGLE_MAPS_API_KEY", "places-key"),
        ("GOOGLE_DIRECTIONS_API_KEY", "directions-key"),
        ("GOOGLE_MAPS_API_BASE", "http://localhost:8080"),
        ("AUTOROUTE_ORIGIN", "-33.87,151.2"),
        ("AUTOROUTE_QUERY_THRESHOLD", "3"),
        ("AUTOROUTE_ZOOM", "12.5"),
        ("AUTOROUTE_KEEP_PREVIOUS_ROUTES", "true"),
        ("AUTOROUTE_HTTP_TIMEOUT_SECS", "2"),
        ("AUTOROUTE_LISTEN", "0.0.0.0:8000"),
    ]))
    .unwrap();

    assert_eq!(config.directions_api_key, "directions-key");
    assert_eq!(config.api_base, "http://localhost:8080");
    assert_eq!(config.screen.origin, Coordinates::new(-33.87, 151.2));
    assert_eq!(config.screen.query_threshold, 3);
    assert_eq!(config.screen.zoom, 12.5);
    assert!(config.screen.keep_previous_routes);
    assert_eq!(config.http_timeout, Duration::from_secs(2));
    assert_eq!(config.listen.port(), 8000);
}

#[test]
fn config_requires_places_key() {
    let err = Config::from_lookup(lookup_from(&[])).unwrap_err();
    assert_eq!(err.code, 1);

    let err = Config::from_lookup(lookup_from(&[("GOOGLE_MAPS_API_KEY", " ")])).unwrap_err();
    assert!(err.is_invalid_input_error());
}

#[test]
fn config_rejects_bad_values() {
    let err = Config::from_lookup(lookup_from(&[
        ("GOOGLE_MAPS_API_KEY", "places-key"),
        ("AUTOROUTE_ZOOM", "40"),
    ]))
    .unwrap_err();
    assert!(err.is_invalid_input_error());

    let err = Config::from_lookup(lookup_from(&[
        ("GOOGLE_MAPS_API_KEY", "places-key"),
        ("AUTOROUTE_ORIGIN", "nowhere"),
    ]))
    .unwrap_err();
    assert!(err.is_invalid_input_error());
}
