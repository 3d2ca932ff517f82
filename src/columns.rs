//! Places densified stacks as boxes in the profile drawing.
//!
//! Horizontally, a line profile maps along-line distance linearly onto the
//! column width. Each stack extends halfway to its neighbours, but never
//! more than twice the search distance to either side, so one sparse sample
//! cannot fill a long empty stretch of the line. A point profile has a single
//! stack spanning the full column width.
//!
//! Vertically, every stack in a profile shares one depth scale so equal
//! depths line up across columns.

use serde::Serialize;
use tracing::{debug, warn};

use crate::classify::ClassificationTable;
use crate::densify::DensifiedStack;
use crate::model::{Coord, DepthRange, ProfileKind, ProfileOutcome};
use crate::shapes::{Bounds, Primitive, Style};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BlockTag {
    Concentration,
    Suitability,
}

/// What a stack's values mean, for tooltips.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockField<'a> {
    Concentration { units: &'a str },
    Suitability,
}

impl BlockField<'_> {
    pub fn tag(&self) -> BlockTag {
        match self {
            BlockField::Concentration { .. } => BlockTag::Concentration,
            BlockField::Suitability => BlockTag::Suitability,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct PlacedStack<'a> {
    pub stack: &'a DensifiedStack<f64>,
    pub position: f64,
    pub link_id: &'a str,
}

/// One classified box of a profile column.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProfileBlock {
    pub bounds: Bounds,
    pub style: Style,
    pub text: String,
    pub link_id: String,
    pub tag: BlockTag,
}

impl ProfileBlock {
    pub fn primitive(&self) -> Primitive {
        Primitive::rect(self.bounds, self.style.clone())
    }
}

/// Horizontal extent of a column around its position, in along-line units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColumnSpan {
    pub position: f64,
    pub left: f64,
    pub right: f64,
}

/// `positions` must be sorted ascending.
pub fn column_spans(positions: &[f64], total_length: f64, search_distance: f64) -> Vec<ColumnSpan> {
    let max_half = 2.0 * search_distance;
    let last = positions.len().saturating_sub(1);

    positions
        .iter()
        .enumerate()
        .map(|(i, &position)| {
            let left = if i == 0 {
                position
            } else {
                (position - positions[i - 1]) / 2.0
            };
            let right = if i == last {
                total_length - position
            } else {
                (positions[i + 1] - position) / 2.0
            };
            ColumnSpan {
                position,
                left: left.min(max_half),
                right: right.min(max_half),
            }
        })
        .collect()
}

pub struct ColumnLayoutInput<'a> {
    /// Sorted by along-line position.
    pub stacks: &'a [PlacedStack<'a>],
    pub total_length: f64,
    pub search_distance: f64,
    pub column_width: f64,
    pub column_height: f64,
    pub kind: ProfileKind,
    /// Bottom centre of the column area.
    pub origin: Coord,
    /// Depth range shared by every stack of the profile.
    pub depth_range: DepthRange,
    pub table: &'a ClassificationTable,
    pub field: BlockField<'a>,
}

pub fn layout_columns(input: &ColumnLayoutInput<'_>) -> ProfileOutcome<Vec<ProfileBlock>> {
    if input.stacks.is_empty() {
        warn!("No survey data within the search distance, nothing to lay out");
        return ProfileOutcome::NoData;
    }

    let factor_y = input.column_height / input.depth_range.height();

    let columns: Vec<(f64, f64, f64)> = match input.kind {
        ProfileKind::Point => {
            if input.stacks.len() > 1 {
                warn!(
                    "Point profile got {} stacks, only the first is drawn",
                    input.stacks.len()
                );
            }
            let half = input.column_width / 2.0;
            vec![(input.origin.x, half, half)]
        }
        ProfileKind::Line => {
            let factor_x = input.column_width / input.total_length;
            let offset_x = input.origin.x - input.column_width / 2.0;
            let positions: Vec<f64> = input.stacks.iter().map(|s| s.position).collect();
            column_spans(&positions, input.total_length, input.search_distance)
                .into_iter()
                .map(|span| {
                    (
                        offset_x + span.position * factor_x,
                        span.left * factor_x,
                        span.right * factor_x,
                    )
                })
                .collect()
        }
    };

    debug!(
        "Laying out {} columns, total length {}, search distance {}",
        columns.len(),
        input.total_length,
        input.search_distance
    );

    let mut blocks = Vec::new();
    for (placed, &(x, left, right)) in input.stacks.iter().zip(&columns) {
        let base_y = input.origin.y
            + (input.depth_range.lower - placed.stack.range.lower).abs() * factor_y;
        blocks.extend(column_blocks(input, placed, x, base_y, left, right, factor_y));
    }

    ProfileOutcome::Drawn(blocks)
}

/// The blocks of one column, bottom to top.
fn column_blocks(
    input: &ColumnLayoutInput<'_>,
    placed: &PlacedStack<'_>,
    x: f64,
    base_y: f64,
    left: f64,
    right: f64,
    factor_y: f64,
) -> Vec<ProfileBlock> {
    let mut y = base_y;
    let mut block_start = placed.stack.range.lower;

    placed
        .stack
        .blocks
        .iter()
        .map(|block| {
            let height = block.height * factor_y;
            let top = block_start + block.height;
            let text = block_text(input.table, input.field, top, block_start, block.value);
            let out = ProfileBlock {
                bounds: Bounds::around(x, y, left, right, height),
                style: input.table.style(block.value).clone(),
                text,
                link_id: placed.link_id.to_string(),
                tag: input.field.tag(),
            };
            y += height;
            block_start = top;
            out
        })
        .collect()
}

/// Tooltip of one block. Missing values show the table's no-data text.
fn block_text(table: &ClassificationTable, field: BlockField<'_>, top: f64, bottom: f64, value: f64) -> String {
    let range = format!("{top:.1} tot {bottom:.1}");
    if value.is_nan() {
        return format!("{range} : {}", table.text(value));
    }
    match field {
        BlockField::Concentration { units } => format!("{range} : {value} {units}"),
        BlockField::Suitability => format!("{range} : {} ({value})", table.text(value)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::densify::{densify, DensifyInput};

    const EPS: f64 = 1e-9;

    fn stack(depths: &[f64], values: &[f64]) -> DensifiedStack<f64> {
        densify(DensifyInput {
            depths,
            values,
            voxel_height: 1.0,
        })
        .unwrap()
    }

    #[test]
    fn test_column_spans_are_clamped() {
        let spans = column_spans(&[0.0, 5.0, 100.0], 100.0, 2.0);

        assert!((spans[1].left - 2.5).abs() < EPS);
        assert!((spans[1].right - 4.0).abs() < EPS);

        assert_eq!(spans[0].left, 0.0);
        assert!((spans[0].right - 2.5).abs() < EPS);
        assert!((spans[2].left - 4.0).abs() < EPS);
        assert_eq!(spans[2].right, 0.0);
    }

    #[test]
    fn test_single_column_span() {
        let spans = column_spans(&[30.0], 200.0, 25.0);
        assert_eq!(spans.len(), 1);
        assert_eq!(spans[0].left, 30.0);
        assert_eq!(spans[0].right, 50.0);
    }

    #[test]
    fn test_no_stacks_is_no_data() {
        let table = ClassificationTable::chloride();
        let input = ColumnLayoutInput {
            stacks: &[],
            total_length: 100.0,
            search_distance: 25.0,
            column_width: 95.0,
            column_height: 80.0,
            kind: ProfileKind::Line,
            origin: Coord::new(64.0, 10.0),
            depth_range: DepthRange::new(-10.0, 0.0),
            table: &table,
            field: BlockField::Concentration { units: "mg/l" },
        };
        let first = layout_columns(&input);
        assert!(first.is_no_data());
        assert_eq!(layout_columns(&input), first);
    }

    #[test]
    fn test_point_column_geometry() {
        let table = ClassificationTable::chloride();
        let s = stack(&[-3.0, -2.0, -1.0, 0.0], &[10.0, 10.0, 200.0, 200.0]);
        let stacks = [PlacedStack {
            stack: &s,
            position: 35.36,
            link_id: "profielen_v2.1",
        }];
        let input = ColumnLayoutInput {
            stacks: &stacks,
            total_length: 35.36,
            search_distance: 35.36,
            column_width: 10.0,
            column_height: 60.0,
            kind: ProfileKind::Point,
            origin: Coord::new(20.0, 10.0),
            depth_range: s.range.extended(1.0),
            table: &table,
            field: BlockField::Concentration { units: "mg/l" },
        };

        let blocks = layout_columns(&input).into_drawn().unwrap();
        assert_eq!(blocks.len(), 2);

        // Range -4.5..1.5 over 60 units: 10 units per metre, 1 m margin below.
        let first = &blocks[0];
        assert!((first.bounds.min.x - 15.0).abs() < EPS);
        assert!((first.bounds.max.x - 25.0).abs() < EPS);
        assert!((first.bounds.min.y - 20.0).abs() < EPS);
        assert!((first.bounds.max.y - 40.0).abs() < EPS);
        assert_eq!(first.text, "-1.5 tot -3.5 : 10 mg/l");
        assert_eq!(first.link_id, "profielen_v2.1");
        assert_eq!(first.tag, BlockTag::Concentration);

        let second = &blocks[1];
        assert!((second.bounds.min.y - 40.0).abs() < EPS);
        assert!((second.bounds.max.y - 60.0).abs() < EPS);
        assert_eq!(second.style, *table.style(200.0));
    }

    #[test]
    fn test_line_columns_share_depth_scale() {
        let table = ClassificationTable::suitability();
        let deep = stack(&[-4.0, -3.0], &[0.3, 0.3]);
        let shallow = stack(&[-2.0, -1.0], &[0.9, 0.9]);
        let stacks = [
            PlacedStack {
                stack: &deep,
                position: 10.0,
                link_id: "a",
            },
            PlacedStack {
                stack: &shallow,
                position: 60.0,
                link_id: "b",
            },
        ];
        let range = deep.range.union(&shallow.range);
        let input = ColumnLayoutInput {
            stacks: &stacks,
            total_length: 100.0,
            search_distance: 5.0,
            column_width: 100.0,
            column_height: 80.0,
            kind: ProfileKind::Line,
            origin: Coord::new(50.0, 0.0),
            depth_range: range,
            table: &table,
            field: BlockField::Suitability,
        };

        let blocks = layout_columns(&input).into_drawn().unwrap();
        assert_eq!(blocks.len(), 2);

        // 1 drawing unit per metre along the line, offset at x = 0.
        assert!((blocks[0].bounds.min.x - 0.0).abs() < EPS);
        assert!((blocks[0].bounds.max.x - 20.0).abs() < EPS);
        assert!((blocks[1].bounds.min.x - 50.0).abs() < EPS);
        assert!((blocks[1].bounds.max.x - 70.0).abs() < EPS);

        // Range -4.5..-0.5 is 4 m over 80 units.
        assert!(blocks[0].bounds.min.y.abs() < EPS);
        assert!((blocks[0].bounds.max.y - 40.0).abs() < EPS);
        assert!((blocks[1].bounds.min.y - 40.0).abs() < EPS);
        assert_eq!(blocks[1].text, "-0.5 tot -2.5 : Zeer geschikt (0.9)");
        assert_eq!(blocks[0].tag, BlockTag::Suitability);
    }

    #[test]
    fn test_missing_values_form_one_block() {
        let table = ClassificationTable::chloride();
        let s = stack(&[-3.0, -2.0, -1.0], &[f64::NAN, f64::NAN, 200.0]);
        let stacks = [PlacedStack {
            stack: &s,
            position: 35.36,
            link_id: "profielen_v2.4",
        }];
        let input = ColumnLayoutInput {
            stacks: &stacks,
            total_length: 35.36,
            search_distance: 35.36,
            column_width: 10.0,
            column_height: 60.0,
            kind: ProfileKind::Point,
            origin: Coord::new(20.0, 10.0),
            depth_range: s.range.extended(1.0),
            table: &table,
            field: BlockField::Concentration { units: "mg/l" },
        };

        let blocks = layout_columns(&input).into_drawn().unwrap();
        assert_eq!(blocks.len(), 2);
        assert_eq!(blocks[0].text, "-1.5 tot -3.5 : Onbekend");
        assert_eq!(blocks[0].style, *table.style(f64::NAN));
        assert_eq!(blocks[1].text, "-0.5 tot -1.5 : 200 mg/l");

        let suitability = ClassificationTable::suitability();
        let input = ColumnLayoutInput {
            table: &suitability,
            field: BlockField::Suitability,
            ..input
        };
        let blocks = layout_columns(&input).into_drawn().unwrap();
        assert_eq!(blocks[0].text, "-1.5 tot -3.5 : Onbekend");
    }
}
