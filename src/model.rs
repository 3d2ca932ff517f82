use std::collections::BTreeMap;

use serde::Serialize;

use crate::error::{ProfileError, Result};

/// A position in real-world map units (EPSG:28992 metres) or in drawing units,
/// depending on where it is used.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Coord {
    pub x: f64,
    pub y: f64,
}

impl Coord {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance(&self, other: Coord) -> f64 {
        (other.x - self.x).hypot(other.y - self.y)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ProfileKind {
    Point,
    Line,
}

/// The geometry drawn by the user, in real-world coordinates.
#[derive(Debug, Clone, PartialEq)]
pub enum ProfileGeometry {
    Point(Coord),
    Line(Vec<Coord>),
}

impl ProfileGeometry {
    pub fn kind(&self) -> ProfileKind {
        match self {
            ProfileGeometry::Point(_) => ProfileKind::Point,
            ProfileGeometry::Line(_) => ProfileKind::Line,
        }
    }
}

/// Result of compiling a profile. Finding no survey data is an expected
/// outcome, reported to the user instead of raised as an error.
#[derive(Debug, Clone, PartialEq)]
pub enum ProfileOutcome<T> {
    Drawn(T),
    NoData,
}

pub const NO_DATA_MESSAGE: &str = "Geen data gevonden binnen de zoekafstand.";

impl<T> ProfileOutcome<T> {
    pub fn is_no_data(&self) -> bool {
        matches!(self, ProfileOutcome::NoData)
    }

    pub fn into_drawn(self) -> Option<T> {
        match self {
            ProfileOutcome::Drawn(value) => Some(value),
            ProfileOutcome::NoData => None,
        }
    }
}

/// Closed depth interval, `lower <= upper`, in depth units (metres relative to NAP).
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DepthRange {
    pub lower: f64,
    pub upper: f64,
}

impl DepthRange {
    pub fn new(lower: f64, upper: f64) -> Self {
        Self { lower, upper }
    }

    pub fn height(&self) -> f64 {
        (self.upper - self.lower).abs()
    }

    pub fn union(&self, other: &DepthRange) -> DepthRange {
        DepthRange {
            lower: self.lower.min(other.lower),
            upper: self.upper.max(other.upper),
        }
    }

    pub fn extended(&self, margin: f64) -> DepthRange {
        DepthRange {
            lower: self.lower - margin,
            upper: self.upper + margin,
        }
    }
}

/// One measurement location with its vertical profile.
///
/// Depths are voxel midpoints, strictly ascending (deepest first). Every value
/// field holds exactly one value per depth. The along-line position is only
/// assigned for line profiles.
#[derive(Debug, Clone, PartialEq)]
pub struct SurveyPoint {
    id: String,
    location: Coord,
    depths: Vec<f64>,
    fields: BTreeMap<String, Vec<f64>>,
    profile_position: Option<f64>,
}

impl SurveyPoint {
    pub fn new(id: impl Into<String>, location: Coord, depths: Vec<f64>) -> Result<Self> {
        let id = id.into();
        if depths.is_empty() {
            return Err(ProfileError::EmptySample { id });
        }
        if let Some(depth) = depths.iter().find(|d| !d.is_finite()) {
            return Err(ProfileError::malformed(
                &id,
                format!("depth {depth} is not a finite number"),
            ));
        }
        if let Some(pair) = depths.windows(2).find(|pair| pair[0] >= pair[1]) {
            return Err(ProfileError::malformed(
                &id,
                format!("depths are not strictly ascending ({} then {})", pair[0], pair[1]),
            ));
        }

        Ok(Self {
            id,
            location,
            depths,
            fields: BTreeMap::new(),
            profile_position: None,
        })
    }

    pub fn with_field(mut self, name: impl Into<String>, values: Vec<f64>) -> Result<Self> {
        let name = name.into();
        if values.len() != self.depths.len() {
            return Err(ProfileError::malformed(
                &self.id,
                format!(
                    "field `{}` has {} values for {} depths",
                    name,
                    values.len(),
                    self.depths.len()
                ),
            ));
        }
        self.fields.insert(name, values);
        Ok(self)
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn location(&self) -> Coord {
        self.location
    }

    pub fn depths(&self) -> &[f64] {
        &self.depths
    }

    pub fn field(&self, name: &str) -> Result<&[f64]> {
        self.fields
            .get(name)
            .map(Vec::as_slice)
            .ok_or_else(|| ProfileError::MissingField {
                id: self.id.clone(),
                field: name.to_string(),
            })
    }

    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    pub fn profile_position(&self) -> Option<f64> {
        self.profile_position
    }

    pub(crate) fn set_profile_position(&mut self, position: f64) {
        self.profile_position = Some(position);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_survey_point_rejects_length_mismatch() {
        let point = SurveyPoint::new("p1", Coord::new(0.0, 0.0), vec![-1.0, -0.5]).unwrap();
        let err = point.with_field("chloride_midden", vec![150.0]).unwrap_err();
        assert!(matches!(err, ProfileError::MalformedSample { .. }));
    }

    #[test]
    fn test_survey_point_rejects_unsorted_depths() {
        let err = SurveyPoint::new("p1", Coord::new(0.0, 0.0), vec![-1.0, -1.5]).unwrap_err();
        assert!(matches!(err, ProfileError::MalformedSample { .. }));

        let err = SurveyPoint::new("p1", Coord::new(0.0, 0.0), vec![-1.0, -1.0]).unwrap_err();
        assert!(matches!(err, ProfileError::MalformedSample { .. }));
    }

    #[test]
    fn test_survey_point_rejects_empty_depths() {
        let err = SurveyPoint::new("p1", Coord::new(0.0, 0.0), vec![]).unwrap_err();
        assert!(matches!(err, ProfileError::EmptySample { .. }));
    }

    #[test]
    fn test_missing_field() {
        let point = SurveyPoint::new("p1", Coord::new(0.0, 0.0), vec![-0.25]).unwrap();
        let err = point.field("suit_extraction").unwrap_err();
        assert!(matches!(err, ProfileError::MissingField { .. }));
    }

    #[test]
    fn test_depth_range_union_and_extension() {
        let a = DepthRange::new(-10.0, -2.0);
        let b = DepthRange::new(-12.0, -4.0);
        let range = a.union(&b).extended(1.0);
        assert_eq!(range, DepthRange::new(-13.0, -1.0));
        assert_eq!(range.height(), 12.0);
    }
}
