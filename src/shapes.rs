//! Drawing primitives in the local profile coordinate space (origin lower-left).

use std::fmt;

use serde::Serialize;

use crate::model::Coord;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Stroke {
    pub color: String,
    pub width: f64,
}

impl Stroke {
    pub fn new(color: &str, width: f64) -> Self {
        Self {
            color: color.to_string(),
            width,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PatternKind {
    Hatch,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Fill {
    Solid {
        color: String,
    },
    Pattern {
        pattern: PatternKind,
        color: String,
        size: f64,
        spacing: f64,
        angle: f64,
    },
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Style {
    pub fill: Option<Fill>,
    pub stroke: Option<Stroke>,
}

impl Style {
    /// Solid fill. Without an outline colour the edge is stroked in the fill colour.
    pub fn filled(fill_color: Option<&str>, line_color: Option<&str>, line_width: f64) -> Self {
        let stroke = match (line_color, fill_color) {
            (Some(color), _) => Some(Stroke::new(color, line_width)),
            (None, Some(color)) => Some(Stroke::new(color, 1.0)),
            (None, None) => None,
        };
        Self {
            fill: fill_color.map(|color| Fill::Solid {
                color: color.to_string(),
            }),
            stroke,
        }
    }

    pub fn pattern(pattern: PatternKind, color: &str, size: f64, spacing: f64, angle: f64) -> Self {
        Self {
            fill: Some(Fill::Pattern {
                pattern,
                color: color.to_string(),
                size,
                spacing,
                angle,
            }),
            stroke: None,
        }
    }

    pub fn outline(color: &str, width: f64) -> Self {
        Self {
            fill: None,
            stroke: Some(Stroke::new(color, width)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Font {
    pub family: String,
    pub size: f64,
}

impl Font {
    pub fn new(family: &str, size: f64) -> Self {
        Self {
            family: family.to_string(),
            size,
        }
    }
}

impl fmt::Display for Font {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}px {}", self.size, self.family)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum HAlign {
    Left,
    Center,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum VAlign {
    Top,
    Middle,
    Bottom,
}

/// Axis-aligned rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Bounds {
    pub min: Coord,
    pub max: Coord,
}

impl Bounds {
    /// `x` is the anchor, the rectangle spans `x - left ..= x + right` and
    /// `y ..= y + height`.
    pub fn around(x: f64, y: f64, left: f64, right: f64, height: f64) -> Self {
        Self {
            min: Coord::new(x - left, y),
            max: Coord::new(x + right, y + height),
        }
    }

    pub fn contains(&self, p: Coord) -> bool {
        p.x >= self.min.x && p.x <= self.max.x && p.y >= self.min.y && p.y <= self.max.y
    }

    pub fn ring(&self) -> Vec<Coord> {
        vec![
            self.min,
            Coord::new(self.min.x, self.max.y),
            self.max,
            Coord::new(self.max.x, self.min.y),
            self.min,
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Primitive {
    Polygon {
        ring: Vec<Coord>,
        style: Style,
    },
    Line {
        from: Coord,
        to: Coord,
        stroke: Stroke,
    },
    Text {
        text: String,
        at: Coord,
        font: Font,
        align: HAlign,
        baseline: VAlign,
        rotation: f64,
    },
}

impl Primitive {
    pub fn rect(bounds: Bounds, style: Style) -> Self {
        Primitive::Polygon {
            ring: bounds.ring(),
            style,
        }
    }

    /// Box centred horizontally on `x` with its bottom edge at `y`.
    pub fn centered_box(x: f64, y: f64, width: f64, height: f64, style: Style) -> Self {
        let half = width / 2.0;
        Self::rect(Bounds::around(x, y, half, half, height), style)
    }

    pub fn line(from: Coord, to: Coord, color: &str, width: f64) -> Self {
        Primitive::Line {
            from,
            to,
            stroke: Stroke::new(color, if width <= 0.0 { 1.0 } else { width }),
        }
    }

    pub fn text(text: impl Into<String>, at: Coord, font: &Font, align: HAlign, baseline: VAlign) -> Self {
        Primitive::Text {
            text: text.into(),
            at,
            font: font.clone(),
            align,
            baseline,
            rotation: 0.0,
        }
    }

    /// Rotation in radians, clockwise on screen.
    pub fn rotated(mut self, angle: f64) -> Self {
        if let Primitive::Text { rotation, .. } = &mut self {
            *rotation = angle;
        }
        self
    }
}
