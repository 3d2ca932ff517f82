use crate::model::ProfileKind;

/// Survey data and search settings of the profile tools.
#[derive(Debug, Clone, PartialEq)]
pub struct ProfileOptions {
    pub depth_field: String,
    pub voxel_height: f64,
    pub value_fields: Vec<String>,
    pub value_units: Vec<String>,
    pub default_plots: Vec<String>,
    pub suitability_field: String,
    pub point_search_distance: f64,
    pub line_search_distance: f64,
    pub max_line_length: f64,
}

impl Default for ProfileOptions {
    fn default() -> Self {
        Self {
            depth_field: "z".to_string(),
            voxel_height: 0.5,
            value_fields: vec![
                "chloride_laag".to_string(),
                "chloride_midden".to_string(),
                "chloride_hoog".to_string(),
            ],
            value_units: vec!["mg/l".to_string(); 3],
            default_plots: vec!["chloride_midden".to_string()],
            suitability_field: "suit_extraction".to_string(),
            point_search_distance: 35.36,
            line_search_distance: 25.0,
            max_line_length: 10000.0,
        }
    }
}

impl ProfileOptions {
    pub fn search_distance(&self, kind: ProfileKind) -> f64 {
        match kind {
            ProfileKind::Point => self.point_search_distance,
            ProfileKind::Line => self.line_search_distance,
        }
    }

    /// Units of a value field, `mg/l` for fields that are not listed.
    pub fn units_of(&self, field: &str) -> &str {
        self.value_fields
            .iter()
            .position(|f| f == field)
            .and_then(|i| self.value_units.get(i))
            .map(String::as_str)
            .unwrap_or("mg/l")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let options = ProfileOptions::default();
        assert_eq!(options.search_distance(ProfileKind::Point), 35.36);
        assert_eq!(options.search_distance(ProfileKind::Line), 25.0);
        assert_eq!(options.units_of("chloride_hoog"), "mg/l");
        assert_eq!(options.default_plots, vec!["chloride_midden".to_string()]);
    }
}
