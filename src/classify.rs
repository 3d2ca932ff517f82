//! Value classification tables: value → fill style and label.

use crate::error::{ProfileError, Result};
use crate::shapes::{PatternKind, Style};

/// How a query value is matched against the ascending keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lookup {
    /// Greatest key `<=` value. Used for concentrations.
    Floor,
    /// Smallest key `>=` value. Used for normalized 0..1 scores.
    Ceiling,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClassEntry {
    pub key: f64,
    pub style: Style,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClassificationTable {
    lookup: Lookup,
    entries: Vec<ClassEntry>,
    no_data_style: Style,
    no_data_text: String,
    show_outlines: bool,
}

const NO_DATA_TEXT: &str = "Onbekend";

const CHLORIDE_CLASSES: [(f64, &str); 14] = [
    (0.0, "rgb(0,0,127)"),
    (150.0, "rgb(0,0,250)"),
    (300.0, "rgb(0,88,255)"),
    (500.0, "rgb(0,196,255)"),
    (750.0, "rgb(30,226,221)"),
    (1000.0, "rgb(60,255,186)"),
    (1250.0, "rgb(104,255,143)"),
    (1500.0, "rgb(147,255,99)"),
    (2000.0, "rgb(190,255,56)"),
    (3000.0, "rgb(233,254,12)"),
    (5000.0, "rgb(255,159,0)"),
    (7500.0, "rgb(255,134,0)"),
    (10000.0, "rgb(255,109,0)"),
    (15000.0, "rgb(182,0,0)"),
];

// Hatching runs from dense (unsuitable) to absent (very suitable).
const SUITABILITY_CLASSES: [(f64, Option<f64>, &str); 4] = [
    (0.25, Some(3.0), "Ongeschikt"),
    (0.5, Some(5.0), "Matig geschikt"),
    (0.75, Some(7.0), "Geschikt"),
    (1.0, None, "Zeer geschikt"),
];

const TRANSPARENT: &str = "rgba(255,255,255,0.0)";

impl ClassificationTable {
    pub fn new(
        lookup: Lookup,
        entries: Vec<ClassEntry>,
        no_data_style: Style,
        no_data_text: impl Into<String>,
    ) -> Result<Self> {
        if entries.is_empty() {
            return Err(ProfileError::InvalidParameter(
                "classification table needs at least one entry".to_string(),
            ));
        }
        if entries.windows(2).any(|pair| pair[0].key >= pair[1].key) {
            return Err(ProfileError::InvalidParameter(
                "classification keys must be strictly ascending".to_string(),
            ));
        }
        Ok(Self {
            lookup,
            entries,
            no_data_style,
            no_data_text: no_data_text.into(),
            show_outlines: false,
        })
    }

    pub fn with_outlines(mut self, show_outlines: bool) -> Self {
        self.show_outlines = show_outlines;
        self
    }

    /// Chloride concentration in mg/l.
    pub fn chloride() -> Self {
        let entries = CHLORIDE_CLASSES
            .iter()
            .map(|&(key, color)| ClassEntry {
                key,
                style: Style::filled(Some(color), None, 1.0),
                label: format!("{key}"),
            })
            .collect();

        Self {
            lookup: Lookup::Floor,
            entries,
            no_data_style: Style::filled(Some("white"), Some("black"), 1.0),
            no_data_text: NO_DATA_TEXT.to_string(),
            show_outlines: false,
        }
    }

    /// Suitability for groundwater extraction, a score in `0..=1`.
    pub fn suitability() -> Self {
        let entries = SUITABILITY_CLASSES
            .iter()
            .map(|&(key, spacing, label)| ClassEntry {
                key,
                style: match spacing {
                    Some(spacing) => Style::pattern(PatternKind::Hatch, "black", 1.0, spacing, 0.0),
                    None => Style::filled(Some(TRANSPARENT), Some("transparent"), 1.0),
                },
                label: label.to_string(),
            })
            .collect();

        Self {
            lookup: Lookup::Ceiling,
            entries,
            no_data_style: Style::filled(Some(TRANSPARENT), Some("transparent"), 1.0),
            no_data_text: NO_DATA_TEXT.to_string(),
            show_outlines: true,
        }
    }

    pub fn show_outlines(&self) -> bool {
        self.show_outlines
    }

    /// The matching entry, or `None` when the value falls outside the table.
    pub fn entry(&self, value: f64) -> Option<&ClassEntry> {
        if value.is_nan() {
            return None;
        }
        match self.lookup {
            Lookup::Floor => {
                let idx = self.entries.partition_point(|e| e.key <= value);
                idx.checked_sub(1).map(|i| &self.entries[i])
            }
            Lookup::Ceiling => {
                let idx = self.entries.partition_point(|e| e.key < value);
                self.entries.get(idx)
            }
        }
    }

    pub fn style(&self, value: f64) -> &Style {
        self.entry(value)
            .map(|e| &e.style)
            .unwrap_or(&self.no_data_style)
    }

    pub fn text(&self, value: f64) -> &str {
        self.entry(value)
            .map(|e| e.label.as_str())
            .unwrap_or(self.no_data_text.as_str())
    }

    pub fn keys_ascending(&self) -> impl Iterator<Item = f64> + '_ {
        self.entries.iter().map(|e| e.key)
    }

    pub fn keys_descending(&self) -> impl Iterator<Item = f64> + '_ {
        self.entries.iter().rev().map(|e| e.key)
    }
}
