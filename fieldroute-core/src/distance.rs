//! Great-circle distance between coordinates.

use geo::Coord;

/// Mean Earth radius used by [`haversine_km`].
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Distance reported when the haversine formula cannot produce a number.
///
/// The value is larger than any real great-circle distance, so a point whose
/// distance degrades to the sentinel is always ranked last.
pub const DISTANCE_SENTINEL_KM: f64 = 999_999.9;

/// Haversine distance between two WGS84 coordinates, in kilometres.
///
/// The result is symmetric and zero only for identical coordinates. Inputs
/// that make the formula non-finite (NaN or infinite components) yield
/// [`DISTANCE_SENTINEL_KM`] rather than an error.
///
/// # Examples
/// ```
/// use geo::Coord;
/// use fieldroute_core::{DISTANCE_SENTINEL_KM, haversine_km};
///
/// let origin = Coord { x: 0.0, y: 0.0 };
/// let east = Coord { x: 1.0, y: 0.0 };
/// assert!((haversine_km(origin, east) - 111.19).abs() < 0.01);
/// assert_eq!(haversine_km(origin, Coord { x: f64::NAN, y: 0.0 }), DISTANCE_SENTINEL_KM);
/// ```
#[must_use]
#[expect(
    clippy::float_arithmetic,
    reason = "the haversine formula is floating-point trigonometry"
)]
pub fn haversine_km(a: Coord<f64>, b: Coord<f64>) -> f64 {
    let (lat1, lat2) = (a.y.to_radians(), b.y.to_radians());
    let half_dlat = ((b.y - a.y).to_radians() / 2.0).sin();
    let half_dlon = ((b.x - a.x).to_radians() / 2.0).sin();
    let h = half_dlat * half_dlat + lat1.cos() * lat2.cos() * half_dlon * half_dlon;
    if !h.is_finite() {
        log::debug!(
            "haversine between ({}, {}) and ({}, {}) is not finite; using sentinel",
            a.y,
            a.x,
            b.y,
            b.x
        );
        return DISTANCE_SENTINEL_KM;
    }
    // Rounding can push `h` just past one for near-antipodal points.
    2.0 * EARTH_RADIUS_KM * h.min(1.0).sqrt().asin()
}

/// Sum of consecutive leg distances along `locations`, in kilometres.
///
/// Returns zero for fewer than two locations.
#[must_use]
#[expect(
    clippy::float_arithmetic,
    reason = "summing leg lengths is floating-point accumulation"
)]
pub fn tour_length_km<I>(locations: I) -> f64
where
    I: IntoIterator<Item = Coord<f64>>,
{
    let mut locations = locations.into_iter();
    let Some(mut previous) = locations.next() else {
        return 0.0;
    };
    let mut total = 0.0;
    for location in locations {
        total += haversine_km(previous, location);
        previous = location;
    }
    total
}
