//! Field points and the keys that group them.

use geo::Coord;
use thiserror::Error;

/// Hierarchical grouping keys shared by points that are sequenced together.
///
/// The keys are opaque to the engine; they only scope which points a
/// repository returns for a request.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct GroupKeys {
    /// Top-level grouping, e.g. an estate or department code.
    pub department: String,
    /// Second-level grouping inside the department.
    pub division: String,
    /// Innermost grouping, usually a field block.
    pub block: String,
}

impl GroupKeys {
    /// Construct grouping keys from their three components.
    ///
    /// # Examples
    /// ```
    /// use fieldroute_core::GroupKeys;
    ///
    /// let keys = GroupKeys::new("EST", "DIV1", "BLK001");
    /// assert_eq!(keys.block, "BLK001");
    /// ```
    pub fn new(
        department: impl Into<String>,
        division: impl Into<String>,
        block: impl Into<String>,
    ) -> Self {
        Self {
            department: department.into(),
            division: division.into(),
            block: block.into(),
        }
    }
}

/// A geolocated collection point with an authoritative sequence number.
///
/// Coordinates are WGS84 with `x = longitude` and `y = latitude`.
///
/// # Examples
/// ```
/// use geo::Coord;
/// use fieldroute_core::{GroupKeys, Point};
///
/// # fn main() -> Result<(), fieldroute_core::PointError> {
/// let point = Point::new(7, 3, GroupKeys::default(), Coord { x: 110.65, y: -2.12 })?
///     .with_label("TPH007");
/// assert_eq!(point.lat(), -2.12);
/// assert_eq!(point.label.as_deref(), Some("TPH007"));
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Point {
    /// Stable identity; never reused within a working set.
    pub id: u64,
    /// Authoritative sequence number within the point's group.
    pub number: u32,
    /// Keys locating the point in its department, division and block.
    pub group: GroupKeys,
    /// Geospatial position.
    pub location: Coord<f64>,
    /// Optional human-readable code printed on the marker.
    pub label: Option<String>,
}

/// Errors returned by [`Point::new`].
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PointError {
    /// Latitude or longitude was not finite or fell outside WGS84 bounds.
    #[error("point {id} has invalid coordinates (lat {lat}, lon {lon})")]
    InvalidCoordinate {
        /// Identity of the rejected point.
        id: u64,
        /// Rejected latitude.
        lat: f64,
        /// Rejected longitude.
        lon: f64,
    },
    /// Sequence numbers start at one.
    #[error("point {id} must have a positive sequence number")]
    NonPositiveNumber {
        /// Identity of the rejected point.
        id: u64,
    },
}

impl Point {
    /// Validate and construct a [`Point`] without a label.
    ///
    /// # Errors
    ///
    /// Returns [`PointError::InvalidCoordinate`] when the location is not a
    /// finite WGS84 position and [`PointError::NonPositiveNumber`] when
    /// `number` is zero.
    pub fn new(
        id: u64,
        number: u32,
        group: GroupKeys,
        location: Coord<f64>,
    ) -> Result<Self, PointError> {
        if !is_valid_location(location) {
            return Err(PointError::InvalidCoordinate {
                id,
                lat: location.y,
                lon: location.x,
            });
        }
        if number == 0 {
            return Err(PointError::NonPositiveNumber { id });
        }
        Ok(Self {
            id,
            number,
            group,
            location,
            label: None,
        })
    }

    /// Attach a human-readable label.
    #[must_use]
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Return a copy of this point carrying a different sequence number.
    #[must_use]
    pub fn renumbered(&self, number: u32) -> Self {
        Self {
            number,
            ..self.clone()
        }
    }

    /// Latitude in degrees.
    #[must_use]
    pub const fn lat(&self) -> f64 {
        self.location.y
    }

    /// Longitude in degrees.
    #[must_use]
    pub const fn lon(&self) -> f64 {
        self.location.x
    }
}

/// Return whether `location` is a finite WGS84 position.
#[must_use]
pub fn is_valid_location(location: Coord<f64>) -> bool {
    location.x.is_finite()
        && location.y.is_finite()
        && (-90.0..=90.0).contains(&location.y)
        && (-180.0..=180.0).contains(&location.x)
}
