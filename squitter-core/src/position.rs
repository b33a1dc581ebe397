//! WGS84 aircraft position and distance computations.
//!
//! Two distances are provided:
//! - `haversine`: great-circle surface distance on a sphere of radius 6371 km.
//! - `wgs84_distance_3d`: straight-line distance between the ECEF coordinates
//!   of both positions, altitude included.
//!
//! Both return `None` when a required coordinate is absent or not finite on
//! either side. Neither ever returns NaN.

use std::fmt;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

use crate::types::{Coordinate, Result, SquitterError};

/// Mean Earth radius used by the haversine formula (meters).
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// WGS84 semi-major axis (meters).
const WGS84_A: f64 = 6_378_137.0;
/// WGS84 semi-minor axis (meters).
const WGS84_B: f64 = 6_356_752.314245;
/// WGS84 flattening.
const WGS84_F: f64 = (WGS84_A - WGS84_B) / WGS84_A;
/// WGS84 first eccentricity squared.
const WGS84_E2: f64 = WGS84_F * (2.0 - WGS84_F);

const METERS_PER_FOOT: f64 = 0.3048;

/// Convert feet to meters.
pub fn feet_to_meters(feet: f64) -> f64 {
    feet * METERS_PER_FOOT
}

// ---------------------------------------------------------------------------
// ECEF
// ---------------------------------------------------------------------------

/// Earth-Centered, Earth-Fixed coordinates in meters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Ecef {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Ecef {
    pub fn distance_to(&self, other: &Ecef) -> f64 {
        let dx = other.x - self.x;
        let dy = other.y - self.y;
        let dz = other.z - self.z;
        (dx * dx + dy * dy + dz * dz).sqrt()
    }
}

// ---------------------------------------------------------------------------
// Position
// ---------------------------------------------------------------------------

/// A decoded aircraft position.
///
/// Longitude and latitude are decimal degrees, altitude is feet. Each field
/// may be absent independently; CPR decoding fills them in as messages
/// arrive. `reasonable` is an advisory flag cleared by plausibility checks
/// (e.g. an implied speed between two fixes that no aircraft can fly).
///
/// Equality and hashing compare the exact bit patterns of the coordinates,
/// with absent equal to absent.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Position {
    longitude: Option<f64>,
    latitude: Option<f64>,
    altitude: Option<f64>,
    #[serde(default = "default_reasonable")]
    reasonable: bool,
}

fn default_reasonable() -> bool {
    true
}

impl Position {
    /// A fully specified position.
    pub fn new(longitude: f64, latitude: f64, altitude_ft: f64) -> Self {
        Self::from_parts(Some(longitude), Some(latitude), Some(altitude_ft))
    }

    /// An empty position: no coordinates, flagged reasonable.
    pub fn empty() -> Self {
        Self::from_parts(None, None, None)
    }

    /// A position from optional parts, flagged reasonable.
    pub fn from_parts(
        longitude: Option<f64>,
        latitude: Option<f64>,
        altitude_ft: Option<f64>,
    ) -> Self {
        Position {
            longitude,
            latitude,
            altitude: altitude_ft,
            reasonable: true,
        }
    }

    /// Longitude in decimal degrees.
    pub fn longitude(&self) -> Option<f64> {
        self.longitude
    }

    pub fn set_longitude(&mut self, longitude: Option<f64>) {
        self.longitude = longitude;
    }

    /// Latitude in decimal degrees.
    pub fn latitude(&self) -> Option<f64> {
        self.latitude
    }

    pub fn set_latitude(&mut self, latitude: Option<f64>) {
        self.latitude = latitude;
    }

    /// Altitude in feet.
    pub fn altitude(&self) -> Option<f64> {
        self.altitude
    }

    pub fn set_altitude(&mut self, altitude_ft: Option<f64>) {
        self.altitude = altitude_ft;
    }

    /// False if a plausibility check has rejected this position.
    pub fn is_reasonable(&self) -> bool {
        self.reasonable
    }

    pub fn set_reasonable(&mut self, reasonable: bool) {
        self.reasonable = reasonable;
    }

    /// True when longitude and latitude are both present and finite.
    pub fn has_horizontal(&self) -> bool {
        self.lon_lat_radians().is_ok()
    }

    /// Great-circle surface distance in meters.
    pub fn haversine(&self, other: &Position) -> Option<f64> {
        let (lon0, lat0) = self.lon_lat_radians().ok()?;
        let (lon1, lat1) = other.lon_lat_radians().ok()?;

        let a = ((lat1 - lat0) / 2.0).sin().powi(2)
            + lat0.cos() * lat1.cos() * ((lon1 - lon0) / 2.0).sin().powi(2);

        // Rounding can push `a` a hair outside [0, 1], where asin is NaN.
        Some(2.0 * EARTH_RADIUS_M * a.clamp(0.0, 1.0).sqrt().asin())
    }

    /// Straight-line 3D distance in meters on the WGS84 ellipsoid.
    ///
    /// `None` if either position lacks longitude, latitude or altitude.
    pub fn wgs84_distance_3d(&self, other: &Position) -> Option<f64> {
        let a = self.to_ecef().ok()?;
        let b = other.to_ecef().ok()?;
        Some(a.distance_to(&b))
    }

    pub(crate) fn to_ecef(&self) -> Result<Ecef> {
        let (lon, lat) = self.lon_lat_radians()?;
        let height = feet_to_meters(required(self.altitude, Coordinate::Altitude)?);

        let sin_lat = lat.sin();
        let v = WGS84_A / (1.0 - WGS84_E2 * sin_lat * sin_lat).sqrt();

        Ok(Ecef {
            x: (v + height) * lat.cos() * lon.cos(),
            y: (v + height) * lat.cos() * lon.sin(),
            z: (v * (1.0 - WGS84_E2) + height) * sin_lat,
        })
    }

    fn lon_lat_radians(&self) -> Result<(f64, f64)> {
        let lon = required(self.longitude, Coordinate::Longitude)?;
        let lat = required(self.latitude, Coordinate::Latitude)?;
        Ok((lon.to_radians(), lat.to_radians()))
    }
}

/// A coordinate usable in arithmetic: present and finite.
fn required(value: Option<f64>, field: Coordinate) -> Result<f64> {
    value
        .filter(|v| v.is_finite())
        .ok_or(SquitterError::MissingCoordinate(field))
}

fn bits(value: Option<f64>) -> Option<u64> {
    value.map(f64::to_bits)
}

impl Default for Position {
    fn default() -> Self {
        Position::empty()
    }
}

impl PartialEq for Position {
    fn eq(&self, other: &Self) -> bool {
        bits(self.longitude) == bits(other.longitude)
            && bits(self.latitude) == bits(other.latitude)
            && bits(self.altitude) == bits(other.altitude)
            && self.reasonable == other.reasonable
    }
}

impl Eq for Position {}

impl Hash for Position {
    fn hash<H: Hasher>(&self, state: &mut H) {
        bits(self.longitude).hash(state);
        bits(self.latitude).hash(state);
        bits(self.altitude).hash(state);
        self.reasonable.hash(state);
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn field(v: Option<f64>) -> String {
            v.map(|v| v.to_string()).unwrap_or_else(|| "none".into())
        }
        write!(
            f,
            "Position{{longitude={}, latitude={}, altitude={}, reasonable={}}}",
            field(self.longitude),
            field(self.latitude),
            field(self.altitude),
            self.reasonable
        )
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::hash_map::DefaultHasher;
    use std::collections::HashSet;

    fn berlin() -> Position {
        Position::new(13.404954, 52.520008, 0.0)
    }

    fn paris() -> Position {
        Position::new(2.349014, 48.864716, 0.0)
    }

    fn hash_of(p: &Position) -> u64 {
        let mut h = DefaultHasher::new();
        p.hash(&mut h);
        h.finish()
    }

    #[test]
    fn test_empty_position() {
        let p = Position::empty();
        assert!(p.longitude().is_none());
        assert!(p.latitude().is_none());
        assert!(p.altitude().is_none());
        assert!(p.is_reasonable());
        assert_eq!(p, Position::default());
    }

    #[test]
    fn test_setters() {
        let mut p = Position::empty();
        p.set_longitude(Some(3.9194));
        p.set_latitude(Some(52.2572));
        p.set_altitude(Some(38000.0));
        assert_eq!(p, Position::new(3.9194, 52.2572, 38000.0));

        p.set_reasonable(false);
        assert!(!p.is_reasonable());
        p.set_reasonable(true);
        p.set_reasonable(true);
        assert!(p.is_reasonable());

        p.set_altitude(None);
        assert!(p.altitude().is_none());
    }

    #[test]
    fn test_haversine_berlin_paris() {
        let d = berlin().haversine(&paris()).unwrap();
        assert!(
            (d - 878_000.0).abs() < 8_780.0,
            "Berlin-Paris should be ~878 km, got {d}"
        );
    }

    #[test]
    fn test_haversine_same_point() {
        for p in [berlin(), paris(), Position::new(-180.0, -90.0, 0.0)] {
            assert_eq!(p.haversine(&p), Some(0.0));
        }
    }

    #[test]
    fn test_haversine_symmetric() {
        let a = Position::new(-82.5418, 35.4362, 1000.0);
        let b = Position::new(151.2093, -33.8688, 0.0);
        let ab = a.haversine(&b).unwrap();
        let ba = b.haversine(&a).unwrap();
        assert!((ab - ba).abs() < 1e-6);
    }

    #[test]
    fn test_haversine_antipodal_not_nan() {
        let a = Position::new(0.0, 0.0, 0.0);
        let b = Position::new(180.0, 0.0, 0.0);
        let d = a.haversine(&b).unwrap();
        assert!(!d.is_nan());
        assert!((d - std::f64::consts::PI * EARTH_RADIUS_M).abs() < 1.0);
    }

    #[test]
    fn test_haversine_ignores_altitude() {
        let mut high = berlin();
        high.set_altitude(None);
        assert_eq!(high.haversine(&paris()), berlin().haversine(&paris()));
    }

    #[test]
    fn test_haversine_missing_coordinate() {
        let mut p = berlin();
        p.set_latitude(None);
        assert_eq!(p.haversine(&paris()), None);
        assert_eq!(paris().haversine(&p), None);

        let mut q = berlin();
        q.set_longitude(Some(f64::NAN));
        assert_eq!(q.haversine(&paris()), None);
        assert_eq!(Position::empty().haversine(&Position::empty()), None);
    }

    #[test]
    fn test_ecef_equator_and_pole() {
        let equator = Position::new(0.0, 0.0, 0.0).to_ecef().unwrap();
        assert!((equator.x - WGS84_A).abs() < 1e-6);
        assert!(equator.y.abs() < 1e-6);
        assert!(equator.z.abs() < 1e-6);

        let pole = Position::new(0.0, 90.0, 0.0).to_ecef().unwrap();
        assert!((pole.z - WGS84_B).abs() < 1e-3);
        assert!(pole.x.abs() < 1e-6);
    }

    #[test]
    fn test_ecef_missing_field_named() {
        let p = Position::from_parts(Some(1.0), Some(2.0), None);
        assert_eq!(
            p.to_ecef().unwrap_err(),
            SquitterError::MissingCoordinate(Coordinate::Altitude)
        );
        let p = Position::from_parts(None, Some(2.0), Some(0.0));
        assert_eq!(
            p.to_ecef().unwrap_err(),
            SquitterError::MissingCoordinate(Coordinate::Longitude)
        );
    }

    #[test]
    fn test_wgs84_distance_vertical() {
        let ground = Position::new(8.0, 47.0, 0.0);
        let above = Position::new(8.0, 47.0, 1000.0);
        let d = ground.wgs84_distance_3d(&above).unwrap();
        assert!((d - 304.8).abs() < 1e-6, "1000 ft should be 304.8 m, got {d}");
    }

    #[test]
    fn test_wgs84_distance_close_to_haversine() {
        // Chord vs arc over ~878 km differs by well under 1%
        let d3 = berlin().wgs84_distance_3d(&paris()).unwrap();
        let d2 = berlin().haversine(&paris()).unwrap();
        assert!((d3 - d2).abs() / d2 < 0.01, "3D {d3} vs great-circle {d2}");
        assert_eq!(berlin().wgs84_distance_3d(&berlin()), Some(0.0));
    }

    #[test]
    fn test_wgs84_distance_missing_altitude() {
        let mut p = berlin();
        p.set_altitude(None);
        assert_eq!(p.wgs84_distance_3d(&paris()), None);
        assert_eq!(paris().wgs84_distance_3d(&p), None);

        let mut q = berlin();
        q.set_altitude(Some(f64::INFINITY));
        assert_eq!(q.wgs84_distance_3d(&paris()), None);
    }

    #[test]
    fn test_equality_and_hash() {
        let a = Position::from_parts(Some(1.5), None, Some(100.0));
        let b = Position::from_parts(Some(1.5), None, Some(100.0));
        assert_eq!(a, b);
        assert_eq!(hash_of(&a), hash_of(&b));

        let mut c = b;
        c.set_reasonable(false);
        assert_ne!(a, c);

        let d = Position::from_parts(Some(1.5), Some(0.0), Some(100.0));
        assert_ne!(a, d);

        let set: HashSet<Position> = [a, b, c, d].into_iter().collect();
        assert_eq!(set.len(), 3);
    }

    #[test]
    fn test_display() {
        let p = Position::from_parts(Some(13.5), Some(52.25), None);
        assert_eq!(
            p.to_string(),
            "Position{longitude=13.5, latitude=52.25, altitude=none, reasonable=true}"
        );
    }

    #[test]
    fn test_serde_roundtrip_keeps_flag() {
        let mut p = berlin();
        p.set_reasonable(false);
        let json = serde_json::to_string(&p).unwrap();
        let back: Position = serde_json::from_str(&json).unwrap();
        assert_eq!(back, p);

        let partial: Position =
            serde_json::from_str(r#"{"longitude":1.0,"latitude":null,"altitude":null}"#).unwrap();
        assert!(partial.is_reasonable());
        assert!(partial.latitude().is_none());
    }

    #[test]
    fn test_feet_to_meters() {
        assert!((feet_to_meters(1.0) - 0.3048).abs() < 1e-12);
        assert_eq!(feet_to_meters(0.0), 0.0);
    }
}
