//! User position acquisition for the resource lookup.
//!
//! [`LocationProvider::acquire`] is a single-shot operation: one call yields
//! one fresh fix or one classified [`LocationError`]. The actual position
//! comes from a [`PositionSource`], either IP geolocation ([`IpGeolocationSource`])
//! or coordinates fixed in `config.toml` ([`FixedPositionSource`]).

use crate::config::{LocationConfig, SourceKind};
use crate::models::Coordinates;
use async_trait::async_trait;
use ipgeolocate::{Locator, Service};
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info, warn};

/// How a position request should be served.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PositionOptions {
    pub high_accuracy: bool,
    /// Upper bound on the whole acquisition. Enforced by [`LocationProvider`].
    pub timeout: Duration,
    /// Maximum age of a reused reading. Zero means always take a fresh fix.
    pub maximum_age: Duration,
}

impl Default for PositionOptions {
    fn default() -> Self {
        Self {
            high_accuracy: true,
            timeout: Duration::from_secs(10),
            maximum_age: Duration::ZERO,
        }
    }
}

/// Failure classes reported by a position source.
#[derive(Debug, Clone, PartialEq)]
pub enum PlatformError {
    PermissionDenied,
    PositionUnavailable(String),
    Timeout,
    Other(String),
}

/// A platform capability that can report the current position.
#[async_trait]
pub trait PositionSource: Send + Sync {
    async fn current_position(&self, options: &PositionOptions)
        -> Result<Coordinates, PlatformError>;
}

#[derive(Debug, Clone, Error, PartialEq)]
pub enum LocationError {
    #[error("Geolocation not supported")]
    CapabilityUnavailable,
    #[error("Location permission denied")]
    PermissionDenied,
    #[error("Location unavailable")]
    PositionUnavailable,
    #[error("Location request timeout")]
    TimeoutExceeded,
    #[error("Location error")]
    UnknownLocationError,
}

impl LocationError {
    /// One-line reason shown to the user.
    pub fn reason(&self) -> String {
        self.to_string()
    }
}

impl From<PlatformError> for LocationError {
    fn from(err: PlatformError) -> Self {
        match err {
            PlatformError::PermissionDenied => LocationError::PermissionDenied,
            PlatformError::PositionUnavailable(_) => LocationError::PositionUnavailable,
            PlatformError::Timeout => LocationError::TimeoutExceeded,
            PlatformError::Other(_) => LocationError::UnknownLocationError,
        }
    }
}

pub struct LocationProvider {
    source: Option<Box<dyn PositionSource>>,
    options: PositionOptions,
}

impl LocationProvider {
    pub fn new(source: Option<Box<dyn PositionSource>>, options: PositionOptions) -> Self {
        Self { source, options }
    }

    /// Builds the provider described by the `[location]` config section.
    pub fn from_config(config: &LocationConfig) -> Self {
        let source: Option<Box<dyn PositionSource>> = match config.provider {
            SourceKind::Ip => Some(Box::new(IpGeolocationSource::new(
                config.lookup_ip.clone(),
                config.share_location,
            ))),
            SourceKind::Manual => Some(Box::new(FixedPositionSource::new(
                Coordinates::new(config.manual_lat, config.manual_lon),
                config.share_location,
            ))),
            SourceKind::None => None,
        };
        Self::new(source, config.position_options())
    }

    /// Requests one fresh position fix.
    ///
    /// # Errors
    ///
    /// [`LocationError::CapabilityUnavailable`] when no source is configured,
    /// [`LocationError::TimeoutExceeded`] when the source does not answer within
    /// [`PositionOptions::timeout`], otherwise the mapped source failure.
    pub async fn acquire(&self) -> Result<Coordinates, LocationError> {
        let Some(source) = self.source.as_ref() else {
            warn!("No position source configured");
            return Err(LocationError::CapabilityUnavailable);
        };

        match tokio::time::timeout(self.options.timeout, source.current_position(&self.options))
            .await
        {
            Ok(Ok(coords)) => {
                info!(
                    "Position acquired - ({}, {})",
                    coords.latitude, coords.longitude
                );
                Ok(coords)
            }
            Ok(Err(e)) => {
                warn!("Position source failed: {:?}", e);
                Err(e.into())
            }
            Err(_) => {
                warn!(
                    "Position request exceeded {} ms",
                    self.options.timeout.as_millis()
                );
                Err(LocationError::TimeoutExceeded)
            }
        }
    }
}

/// Approximate position from the IpApi geolocation service.
pub struct IpGeolocationSource {
    /// Address to locate; empty means the caller's own public address.
    ip: String,
    share_location: bool,
}

impl IpGeolocationSource {
    pub fn new(ip: String, share_location: bool) -> Self {
        Self { ip, share_location }
    }
}

#[async_trait]
impl PositionSource for IpGeolocationSource {
    async fn current_position(
        &self,
        options: &PositionOptions,
    ) -> Result<Coordinates, PlatformError> {
        if !self.share_location {
            return Err(PlatformError::PermissionDenied);
        }
        if options.high_accuracy {
            debug!("High accuracy requested; IP geolocation is city-level at best");
        }

        let loc = Locator::get(&self.ip, Service::IpApi)
            .await
            .map_err(|e| PlatformError::PositionUnavailable(e.to_string()))?;

        let lat = loc.latitude.parse::<f64>();
        let lon = loc.longitude.parse::<f64>();
        match (lat, lon) {
            (Ok(lat), Ok(lon)) => Ok(Coordinates::new(lat, lon)),
            _ => Err(PlatformError::PositionUnavailable(format!(
                "unparseable coordinates ({}, {})",
                loc.latitude, loc.longitude
            ))),
        }
    }
}

/// Coordinates pinned in `config.toml`.
pub struct FixedPositionSource {
    coords: Coordinates,
    share_location: bool,
}

impl FixedPositionSource {
    pub fn new(coords: Coordinates, share_location: bool) -> Self {
        Self {
            coords,
            share_location,
        }
    }
}

#[async_trait]
impl PositionSource for FixedPositionSource {
    async fn current_position(
        &self,
        _options: &PositionOptions,
    ) -> Result<Coordinates, PlatformError> {
        if !self.share_location {
            return Err(PlatformError::PermissionDenied);
        }
        Ok(self.coords)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Failing(PlatformError);

    #[async_trait]
    impl PositionSource for Failing {
        async fn current_position(
            &self,
            _options: &PositionOptions,
        ) -> Result<Coordinates, PlatformError> {
            Err(self.0.clone())
        }
    }

    struct Hanging;

    #[async_trait]
    impl PositionSource for Hanging {
        async fn current_position(
            &self,
            _options: &PositionOptions,
        ) -> Result<Coordinates, PlatformError> {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok(Coordinates::new(0.0, 0.0))
        }
    }

    fn provider(source: impl PositionSource + 'static) -> LocationProvider {
        LocationProvider::new(Some(Box::new(source)), PositionOptions::default())
    }

    #[test]
    fn default_options_request_a_fresh_high_accuracy_fix() {
        let opts = PositionOptions::default();
        assert!(opts.high_accuracy);
        assert_eq!(opts.timeout, Duration::from_secs(10));
        assert_eq!(opts.maximum_age, Duration::ZERO);
    }

    #[tokio::test]
    async fn missing_source_is_capability_unavailable() {
        let provider = LocationProvider::new(None, PositionOptions::default());
        assert_eq!(
            provider.acquire().await,
            Err(LocationError::CapabilityUnavailable)
        );
    }

    #[tokio::test]
    async fn platform_errors_are_classified() {
        let cases = [
            (PlatformError::PermissionDenied, LocationError::PermissionDenied),
            (
                PlatformError::PositionUnavailable("no fix".into()),
                LocationError::PositionUnavailable,
            ),
            (PlatformError::Timeout, LocationError::TimeoutExceeded),
            (
                PlatformError::Other("code 42".into()),
                LocationError::UnknownLocationError,
            ),
        ];
        for (platform, expected) in cases {
            assert_eq!(provider(Failing(platform)).acquire().await, Err(expected));
        }
    }

    #[test]
    fn reasons_match_user_facing_text() {
        assert_eq!(
            LocationError::PermissionDenied.reason(),
            "Location permission denied"
        );
        assert_eq!(
            LocationError::TimeoutExceeded.reason(),
            "Location request timeout"
        );
        assert_eq!(
            LocationError::PositionUnavailable.reason(),
            "Location unavailable"
        );
        assert_eq!(
            LocationError::CapabilityUnavailable.reason(),
            "Geolocation not supported"
        );
        assert_eq!(LocationError::UnknownLocationError.reason(), "Location error");
    }

    #[tokio::test]
    async fn hung_source_times_out() {
        let options = PositionOptions {
            timeout: Duration::from_millis(20),
            ..PositionOptions::default()
        };
        let provider = LocationProvider::new(Some(Box::new(Hanging)), options);
        assert_eq!(provider.acquire().await, Err(LocationError::TimeoutExceeded));
    }

    #[tokio::test]
    async fn fixed_source_honours_share_location() {
        let coords = Coordinates::new(40.0, -74.0);
        assert_eq!(
            provider(FixedPositionSource::new(coords, true)).acquire().await,
            Ok(coords)
        );
        assert_eq!(
            provider(FixedPositionSource::new(coords, false)).acquire().await,
            Err(LocationError::PermissionDenied)
        );
    }

    #[tokio::test]
    async fn ip_source_without_consent_never_performs_a_lookup() {
        let source = IpGeolocationSource::new(String::new(), false);
        assert_eq!(
            source.current_position(&PositionOptions::default()).await,
            Err(PlatformError::PermissionDenied)
        );
    }
}
