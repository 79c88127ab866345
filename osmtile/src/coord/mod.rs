//! Coordinate projection module
//!
//! Derives a locally flat planar grid for a geographic point and converts
//! between WGS84 latitude/longitude and that grid in both directions.
//!
//! The grid is the Universal Transverse Mercator zone containing the point,
//! evaluated with Krüger's series to third order in the third flattening,
//! which keeps round-trip error well below a millimetre inside a zone.

mod types;

pub use types::{
    GeoPoint, Hemisphere, PlanarPoint, ProjectionError, ZoneId, MAX_LAT, MAX_LON, MIN_LAT,
    MIN_LON, ZONE_COUNT,
};

/// WGS84 semi-major axis in metres.
const WGS84_A: f64 = 6_378_137.0;

/// WGS84 flattening.
const WGS84_F: f64 = 1.0 / 298.257_223_563;

/// UTM scale factor on the central meridian.
const UTM_K0: f64 = 0.9996;

/// UTM false easting in metres.
const FALSE_EASTING: f64 = 500_000.0;

/// UTM false northing applied in the southern hemisphere, in metres.
const FALSE_NORTHING_SOUTH: f64 = 10_000_000.0;

/// Returns the UTM zone number for a longitude.
///
/// `floor((lon + 180) / 6) + 1`, so `-180` maps to zone 1 and `179.9` to
/// zone 60. Values outside `[-180, 180)` produce numbers outside `1..=60`,
/// which [`ProjectionContext::for_zone`] rejects.
#[inline]
pub fn zone_of(lon: f64) -> i32 {
    ((lon + 180.0) / 6.0).floor() as i32 + 1
}

/// Series coefficients of the Krüger transverse Mercator expansion.
#[derive(Debug, Clone, Copy)]
struct KruegerSeries {
    /// Rectifying radius scaled by `k0`.
    radius: f64,
    /// First eccentricity.
    e: f64,
    alpha: [f64; 3],
    beta: [f64; 3],
    delta: [f64; 3],
}

impl KruegerSeries {
    fn wgs84() -> Self {
        let n = WGS84_F / (2.0 - WGS84_F);
        let n2 = n * n;
        let n3 = n2 * n;

        Self {
            radius: UTM_K0 * WGS84_A / (1.0 + n) * (1.0 + n2 / 4.0 + n2 * n2 / 64.0),
            e: 2.0 * n.sqrt() / (1.0 + n),
            alpha: [
                n / 2.0 - 2.0 * n2 / 3.0 + 5.0 * n3 / 16.0,
                13.0 * n2 / 48.0 - 3.0 * n3 / 5.0,
                61.0 * n3 / 240.0,
            ],
            beta: [
                n / 2.0 - 2.0 * n2 / 3.0 + 37.0 * n3 / 96.0,
                n2 / 48.0 + n3 / 15.0,
                17.0 * n3 / 480.0,
            ],
            delta: [
                2.0 * n - 2.0 * n2 / 3.0 - 2.0 * n3,
                7.0 * n2 / 3.0 - 8.0 * n3 / 5.0,
                56.0 * n3 / 15.0,
            ],
        }
    }
}

/// A bidirectional geographic ↔ planar converter bound to one zone.
///
/// All tile computations of a query share one context; points far outside
/// the zone still convert, with growing distortion.
#[derive(Debug, Clone, Copy)]
pub struct ProjectionContext {
    zone: ZoneId,
    /// Central meridian in radians.
    central_meridian: f64,
    false_northing: f64,
    series: KruegerSeries,
}

impl ProjectionContext {
    /// Builds the projection for the zone containing a point.
    ///
    /// # Arguments
    ///
    /// * `lat` - Latitude in degrees, strictly between -90 and 90
    /// * `lon` - Longitude in degrees, in `[-180, 180)`
    ///
    /// The hemisphere follows the sign of `lat` (the equator is north).
    pub fn build(lat: f64, lon: f64) -> Result<Self, ProjectionError> {
        if !lat.is_finite() || lat <= MIN_LAT || lat >= MAX_LAT {
            return Err(ProjectionError::InvalidLatitude(lat));
        }
        if !lon.is_finite() || !(MIN_LON..MAX_LON).contains(&lon) {
            return Err(ProjectionError::InvalidLongitude(lon));
        }

        Self::for_zone(zone_of(lon), Hemisphere::of_latitude(lat))
    }

    /// Builds the projection for an explicit zone number and hemisphere.
    pub fn for_zone(number: i32, hemisphere: Hemisphere) -> Result<Self, ProjectionError> {
        if !(1..=ZONE_COUNT as i32).contains(&number) {
            return Err(ProjectionError::InvalidZone(number));
        }

        let central_meridian = ((number - 1) as f64 * 6.0 - 180.0 + 3.0).to_radians();
        let false_northing = match hemisphere {
            Hemisphere::North => 0.0,
            Hemisphere::South => FALSE_NORTHING_SOUTH,
        };

        Ok(Self {
            zone: ZoneId {
                number: number as u8,
                hemisphere,
            },
            central_meridian,
            false_northing,
            series: KruegerSeries::wgs84(),
        })
    }

    /// The zone this context projects into.
    pub fn zone(&self) -> ZoneId {
        self.zone
    }

    /// Planar position of the zone origin: the central meridian's easting
    /// and the equator's northing.
    ///
    /// Grid lines through the origin are where the geographic extremes of a
    /// planar rectangle can fall between its corners.
    pub fn origin(&self) -> PlanarPoint {
        PlanarPoint {
            x: FALSE_EASTING,
            y: self.false_northing,
        }
    }

    /// Converts a geographic point to planar easting/northing in metres.
    pub fn forward(&self, point: GeoPoint) -> PlanarPoint {
        let s = &self.series;
        let phi = point.lat.to_radians();
        let lambda = point.lon.to_radians() - self.central_meridian;

        let sin_phi = phi.sin();
        let t = (sin_phi.atanh() - s.e * (s.e * sin_phi).atanh()).sinh();
        let xi_p = t.atan2(lambda.cos());
        let eta_p = (lambda.sin() / (1.0 + t * t).sqrt()).atanh();

        let mut xi = xi_p;
        let mut eta = eta_p;
        for (j, alpha) in s.alpha.iter().enumerate() {
            let k = 2.0 * (j + 1) as f64;
            xi += alpha * (k * xi_p).sin() * (k * eta_p).cosh();
            eta += alpha * (k * xi_p).cos() * (k * eta_p).sinh();
        }

        PlanarPoint {
            x: FALSE_EASTING + s.radius * eta,
            y: self.false_northing + s.radius * xi,
        }
    }

    /// Converts planar easting/northing in metres back to a geographic point.
    pub fn inverse(&self, point: PlanarPoint) -> GeoPoint {
        let s = &self.series;
        let xi = (point.y - self.false_northing) / s.radius;
        let eta = (point.x - FALSE_EASTING) / s.radius;

        let mut xi_p = xi;
        let mut eta_p = eta;
        for (j, beta) in s.beta.iter().enumerate() {
            let k = 2.0 * (j + 1) as f64;
            xi_p -= beta * (k * xi).sin() * (k * eta).cosh();
            eta_p -= beta * (k * xi).cos() * (k * eta).sinh();
        }

        let chi = (xi_p.sin() / eta_p.cosh()).asin();
        let mut phi = chi;
        for (j, delta) in s.delta.iter().enumerate() {
            phi += delta * (2.0 * (j + 1) as f64 * chi).sin();
        }
        let lambda = self.central_meridian + eta_p.sinh().atan2(xi_p.cos());

        GeoPoint {
            lat: phi.to_degrees(),
            lon: lambda.to_degrees(),
        }
    }
}
