use crate::model::{Coord, ProfileKind};
use crate::shapes::Font;

const FONT_FAMILY: &str = "sans-serif";

/// Drawing units per font pixel, including line spacing.
const PIXEL_SIZE: f64 = 0.25 + 0.1;

/// The drawing canvas, origin at the lower-left corner.
pub const CANVAS_WIDTH: f64 = 150.0;
pub const CANVAS_HEIGHT: f64 = 100.0;

/// Placement constants of a profile drawing. One variant per profile kind.
#[derive(Debug, Clone, PartialEq)]
pub struct ProfileLayout {
    pub kind: ProfileKind,
    pub pixel_size: f64,
    pub column_width: f64,
    pub column_height: f64,
    pub column_line_width: f64,
    /// Anchors of consecutive profiles: bottom centre of each column area.
    pub positions: Vec<Coord>,
    pub tick_length: f64,
    pub tick_text_margin: f64,
    pub depth_tick_interval: f64,
    pub depth_margin: f64,
    pub title_margin: f64,
    pub axis_x_position_y: f64,
    pub axis_y_position_x: f64,
    pub title_font: Font,
    pub tick_font: Font,
    pub axis_font: Font,
}

impl ProfileLayout {
    pub fn for_kind(kind: ProfileKind) -> Self {
        let (column_width, positions) = match kind {
            ProfileKind::Point => (
                10.0,
                vec![Coord::new(20.0, 10.0), Coord::new(50.0, 10.0), Coord::new(80.0, 10.0)],
            ),
            ProfileKind::Line => (95.0, vec![Coord::new(64.0, 10.0)]),
        };

        Self {
            kind,
            pixel_size: PIXEL_SIZE,
            column_width,
            column_height: 80.0,
            column_line_width: 0.5,
            positions,
            tick_length: 2.0,
            tick_text_margin: 1.0,
            depth_tick_interval: 5.0,
            depth_margin: 1.0,
            title_margin: 2.0,
            axis_x_position_y: 1.0,
            axis_y_position_x: 4.0,
            title_font: Font::new(FONT_FAMILY, 13.0),
            tick_font: Font::new(FONT_FAMILY, 12.0),
            axis_font: Font::new(FONT_FAMILY, 12.0),
        }
    }

    pub fn extent(&self) -> [f64; 4] {
        canvas_extent()
    }
}

pub fn canvas_extent() -> [f64; 4] {
    [0.0, 0.0, CANVAS_WIDTH, CANVAS_HEIGHT]
}

#[derive(Debug, Clone, PartialEq)]
pub struct LegendLayout {
    pub pixel_size: f64,
    pub position: Coord,
    pub box_width: f64,
    pub box_height: f64,
    pub box_margin_top: f64,
    pub box_margin_right: f64,
    pub title_margin: f64,
    pub title_font: Font,
    pub box_font: Font,
}

impl LegendLayout {
    pub fn title_height(&self) -> f64 {
        self.title_font.size * self.pixel_size
    }

    pub fn legend_margin(&self) -> f64 {
        self.box_font.size * self.pixel_size
    }
}

impl Default for LegendLayout {
    fn default() -> Self {
        Self {
            pixel_size: PIXEL_SIZE,
            position: Coord::new(120.0, 10.0),
            box_width: 9.0,
            box_height: 3.0,
            box_margin_top: 1.0,
            box_margin_right: 1.0,
            title_margin: 0.0,
            title_font: Font::new(FONT_FAMILY, 12.0),
            box_font: Font::new(FONT_FAMILY, 12.0),
        }
    }
}
