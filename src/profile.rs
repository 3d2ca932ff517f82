//! Profile compilation: survey points and a drawn geometry in, drawing
//! primitives out.

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::classify::ClassificationTable;
use crate::columns::{layout_columns, BlockField, ColumnLayoutInput, PlacedStack, ProfileBlock};
use crate::config::ProfileOptions;
use crate::densify::{densify, DensifiedStack, DensifyInput};
use crate::error::{ProfileError, Result};
use crate::hover::{hover_at, HoverEvent};
use crate::layout::{LegendLayout, ProfileLayout};
use crate::legend::draw_legend;
use crate::model::{Coord, DepthRange, ProfileGeometry, ProfileKind, ProfileOutcome, SurveyPoint};
use crate::segment::{place_points, segment, SegmentedLine};
use crate::shapes::{HAlign, Primitive, Style, VAlign};
use crate::ticks::{depth_ticks, distance_ticks};

const TITLE_PREFIX: &str = "Profiel grondwater";
const SUITABILITY_TITLE: &str = "Geschiktheid onttrekking";
const CONCENTRATION_LEGEND_TITLE: &str = "Chloridegehalte (mg/l)";
const AXIS_X_TITLE: &str = "Afstand (m)";
const AXIS_Y_TITLE: &str = "Diepte tov. NAP (m)";

/// What to draw for a user's geometry.
#[derive(Debug, Clone, PartialEq)]
pub struct ProfileRequest {
    pub geometry: ProfileGeometry,
    /// Concentration fields, one profile each.
    pub concentration_fields: Vec<String>,
    pub show_suitability: bool,
    /// Overrides the search distance configured for the geometry kind.
    pub search_distance: Option<f64>,
}

impl ProfileRequest {
    pub fn new(geometry: ProfileGeometry) -> Self {
        Self {
            geometry,
            concentration_fields: Vec::new(),
            show_suitability: false,
            search_distance: None,
        }
    }

    pub fn with_fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.concentration_fields = fields.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_suitability(mut self, show: bool) -> Self {
        self.show_suitability = show;
        self
    }

    pub fn with_search_distance(mut self, distance: f64) -> Self {
        self.search_distance = Some(distance);
        self
    }
}

/// One compiled profile column area.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProfileDrawing {
    pub kind: ProfileKind,
    pub origin: Coord,
    pub depth_range: DepthRange,
    pub total_length: f64,
    pub blocks: Vec<ProfileBlock>,
    /// Ticks, frame and title, drawn over the blocks.
    pub decorations: Vec<Primitive>,
}

impl ProfileDrawing {
    /// All primitives in drawing order.
    pub fn primitives(&self) -> Vec<Primitive> {
        self.blocks
            .iter()
            .map(ProfileBlock::primitive)
            .chain(self.decorations.iter().cloned())
            .collect()
    }
}

/// A complete drawing: profiles, axis titles and legends.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Sheet {
    pub extent: [f64; 4],
    pub pixel_size: f64,
    pub primitives: Vec<Primitive>,
    pub blocks: Vec<ProfileBlock>,
}

impl Sheet {
    pub fn hover_at(&self, at: Coord) -> Option<HoverEvent> {
        hover_at(&self.blocks, at)
    }
}

/// Survey points selected and positioned for one request.
#[derive(Debug, Clone)]
struct PreparedPoints {
    kind: ProfileKind,
    points: Vec<SurveyPoint>,
    total_length: f64,
    search_distance: f64,
}

/// Compiles profile drawings. Tables and layouts are fixed at construction.
#[derive(Debug, Clone)]
pub struct ProfileCompiler {
    options: ProfileOptions,
    point_layout: ProfileLayout,
    line_layout: ProfileLayout,
    legend_layout: LegendLayout,
    concentration_table: ClassificationTable,
    suitability_table: ClassificationTable,
}

impl Default for ProfileCompiler {
    fn default() -> Self {
        Self::new(ProfileOptions::default())
    }
}

impl ProfileCompiler {
    pub fn new(options: ProfileOptions) -> Self {
        Self {
            options,
            point_layout: ProfileLayout::for_kind(ProfileKind::Point),
            line_layout: ProfileLayout::for_kind(ProfileKind::Line),
            legend_layout: LegendLayout::default(),
            concentration_table: ClassificationTable::chloride(),
            suitability_table: ClassificationTable::suitability(),
        }
    }

    pub fn with_tables(mut self, concentration: ClassificationTable, suitability: ClassificationTable) -> Self {
        self.concentration_table = concentration;
        self.suitability_table = suitability;
        self
    }

    pub fn options(&self) -> &ProfileOptions {
        &self.options
    }

    pub fn layout(&self, kind: ProfileKind) -> &ProfileLayout {
        match kind {
            ProfileKind::Point => &self.point_layout,
            ProfileKind::Line => &self.line_layout,
        }
    }

    /// Compiles a single profile at `origin`: the concentration `field` when
    /// given, with the suitability overlay when requested.
    pub fn compile(
        &self,
        points: Vec<SurveyPoint>,
        request: &ProfileRequest,
        field: Option<&str>,
        origin: Coord,
    ) -> Result<ProfileOutcome<ProfileDrawing>> {
        match self.prepare(points, request)? {
            ProfileOutcome::Drawn(prepared) => {
                self.draw_profile(&prepared, field, request.show_suitability, origin)
            }
            ProfileOutcome::NoData => Ok(ProfileOutcome::NoData),
        }
    }

    /// Compiles every requested profile into one sheet with axis titles and
    /// legends.
    pub fn compile_sheet(&self, points: Vec<SurveyPoint>, request: &ProfileRequest) -> Result<ProfileOutcome<Sheet>> {
        let prepared = match self.prepare(points, request)? {
            ProfileOutcome::Drawn(prepared) => prepared,
            ProfileOutcome::NoData => return Ok(ProfileOutcome::NoData),
        };
        let layout = self.layout(prepared.kind);

        let fields: Vec<Option<&str>> = if request.concentration_fields.is_empty() {
            if !request.show_suitability {
                return Err(ProfileError::InvalidParameter(
                    "nothing to draw: no concentration field selected and suitability disabled".to_string(),
                ));
            }
            vec![None]
        } else {
            request.concentration_fields.iter().map(|f| Some(f.as_str())).collect()
        };

        if fields.len() > layout.positions.len() {
            warn!(
                "{} profiles requested, only {} fit the drawing",
                fields.len(),
                layout.positions.len()
            );
        }

        let mut primitives = Vec::new();
        let mut blocks = Vec::new();
        for (field, &origin) in fields.iter().zip(&layout.positions) {
            match self.draw_profile(&prepared, *field, request.show_suitability, origin)? {
                ProfileOutcome::Drawn(drawing) => {
                    primitives.extend(drawing.primitives());
                    blocks.extend(drawing.blocks);
                }
                ProfileOutcome::NoData => return Ok(ProfileOutcome::NoData),
            }
        }

        primitives.extend(self.axis_titles(layout));
        primitives.extend(self.legends());

        info!(
            "Compiled {} profile(s) with {} blocks and {} primitives",
            fields.len().min(layout.positions.len()),
            blocks.len(),
            primitives.len()
        );

        Ok(ProfileOutcome::Drawn(Sheet {
            extent: layout.extent(),
            pixel_size: layout.pixel_size,
            primitives,
            blocks,
        }))
    }

    fn prepare(&self, points: Vec<SurveyPoint>, request: &ProfileRequest) -> Result<ProfileOutcome<PreparedPoints>> {
        let kind = request.geometry.kind();
        let search_distance = request
            .search_distance
            .unwrap_or_else(|| self.options.search_distance(kind));
        if !(search_distance.is_finite() && search_distance > 0.0) {
            return Err(ProfileError::InvalidParameter(format!(
                "search distance must be positive, got {search_distance}"
            )));
        }

        info!("Geometry type: {:?}, search distance: {}", kind, search_distance);

        let prepared = match &request.geometry {
            ProfileGeometry::Point(at) => {
                let nearest = survey_points_within(points, &request.geometry, search_distance)
                    .into_iter()
                    .min_by(|a, b| a.location().distance(*at).total_cmp(&b.location().distance(*at)));
                let Some(nearest) = nearest else {
                    warn!("No survey points within {} m of {:?}", search_distance, at);
                    return Ok(ProfileOutcome::NoData);
                };
                debug!("Nearest survey point: {}", nearest.id());
                let placed = place_points(vec![nearest], &SegmentedLine::default(), search_distance);
                PreparedPoints {
                    kind,
                    points: placed.points,
                    total_length: placed.total_length,
                    search_distance,
                }
            }
            ProfileGeometry::Line(vertices) => {
                let line = segment(vertices);
                if line.total_length > self.options.max_line_length {
                    return Err(ProfileError::LineTooLong {
                        length: line.total_length,
                        max_length: self.options.max_line_length,
                    });
                }
                info!("Nr. segments: {}, total length: {:.1} m", line.segments.len(), line.total_length);

                let nearby = survey_points_within(points, &request.geometry, search_distance);
                if nearby.is_empty() {
                    warn!("No survey points within {} m of the profile line", search_distance);
                    return Ok(ProfileOutcome::NoData);
                }
                let placed = place_points(nearby, &line, search_distance);
                if placed.points.is_empty() {
                    return Ok(ProfileOutcome::NoData);
                }
                PreparedPoints {
                    kind,
                    points: placed.points,
                    total_length: placed.total_length,
                    search_distance,
                }
            }
        };

        Ok(ProfileOutcome::Drawn(prepared))
    }

    fn draw_profile(
        &self,
        prepared: &PreparedPoints,
        field: Option<&str>,
        show_suitability: bool,
        origin: Coord,
    ) -> Result<ProfileOutcome<ProfileDrawing>> {
        let layout = self.layout(prepared.kind);
        let voxel_height = self.options.voxel_height;

        let concentration = field
            .map(|name| self.densify_field(&prepared.points, name, voxel_height))
            .transpose()?;
        let suitability = if show_suitability {
            Some(self.densify_field(&prepared.points, &self.options.suitability_field, voxel_height)?)
        } else {
            None
        };

        let Some(depth_range) = concentration
            .iter()
            .chain(suitability.iter())
            .flatten()
            .map(|stack| stack.range)
            .reduce(|a, b| a.union(&b))
        else {
            return Ok(ProfileOutcome::NoData);
        };
        let depth_range = depth_range.extended(layout.depth_margin);

        let units = field.map(|name| self.options.units_of(name)).unwrap_or("mg/l");
        let layers = [
            (
                concentration.as_ref(),
                BlockField::Concentration { units },
                &self.concentration_table,
            ),
            (suitability.as_ref(), BlockField::Suitability, &self.suitability_table),
        ];

        let mut blocks = Vec::new();
        for (stacks, block_field, table) in layers {
            let Some(stacks) = stacks else { continue };
            let placed: Vec<PlacedStack<'_>> = prepared
                .points
                .iter()
                .zip(stacks)
                .map(|(point, stack)| PlacedStack {
                    stack,
                    position: point.profile_position().unwrap_or(prepared.search_distance),
                    link_id: point.id(),
                })
                .collect();
            let input = ColumnLayoutInput {
                stacks: &placed,
                total_length: prepared.total_length,
                search_distance: prepared.search_distance,
                column_width: layout.column_width,
                column_height: layout.column_height,
                kind: prepared.kind,
                origin,
                depth_range,
                table,
                field: block_field,
            };
            match layout_columns(&input) {
                ProfileOutcome::Drawn(column_blocks) => blocks.extend(column_blocks),
                ProfileOutcome::NoData => return Ok(ProfileOutcome::NoData),
            }
        }

        let mut decorations = depth_tick_primitives(layout, origin, depth_range);
        if prepared.kind == ProfileKind::Line {
            decorations.extend(distance_tick_primitives(layout, origin, prepared.total_length));
        }
        decorations.push(Primitive::centered_box(
            origin.x,
            origin.y,
            layout.column_width,
            layout.column_height,
            Style::outline("black", layout.column_line_width),
        ));
        decorations.push(Primitive::text(
            profile_title(field),
            Coord::new(origin.x, origin.y + layout.column_height + layout.title_margin),
            &layout.title_font,
            HAlign::Center,
            VAlign::Bottom,
        ));

        debug!(
            "Profile at ({}, {}): depth {:.2}..{:.2}, {} blocks",
            origin.x,
            origin.y,
            depth_range.lower,
            depth_range.upper,
            blocks.len()
        );

        Ok(ProfileOutcome::Drawn(ProfileDrawing {
            kind: prepared.kind,
            origin,
            depth_range,
            total_length: prepared.total_length,
            blocks,
            decorations,
        }))
    }

    /// One stack per survey point, bottom to top.
    fn densify_field(&self, points: &[SurveyPoint], field: &str, voxel_height: f64) -> Result<Vec<DensifiedStack<f64>>> {
        points
            .iter()
            .map(|point| {
                densify(DensifyInput {
                    depths: point.depths(),
                    values: point.field(field)?,
                    voxel_height,
                })
                .map_err(|err| match err {
                    ProfileError::EmptySample { .. } => ProfileError::EmptySample {
                        id: point.id().to_string(),
                    },
                    ProfileError::MalformedSample { reason, .. } => ProfileError::malformed(point.id(), reason),
                    other => other,
                })
            })
            .collect()
    }

    fn axis_titles(&self, layout: &ProfileLayout) -> Vec<Primitive> {
        let Some(first) = layout.positions.first() else {
            return Vec::new();
        };
        let mut primitives = Vec::new();
        if layout.kind == ProfileKind::Line {
            primitives.push(Primitive::text(
                AXIS_X_TITLE,
                Coord::new(first.x, layout.axis_x_position_y),
                &layout.axis_font,
                HAlign::Center,
                VAlign::Middle,
            ));
        }
        primitives.push(
            Primitive::text(
                AXIS_Y_TITLE,
                Coord::new(layout.axis_y_position_x, first.y + layout.column_height / 2.0),
                &layout.axis_font,
                HAlign::Center,
                VAlign::Middle,
            )
            .rotated(-std::f64::consts::FRAC_PI_2),
        );
        primitives
    }

    /// Suitability legend at the legend anchor, concentration legend above it.
    fn legends(&self) -> Vec<Primitive> {
        let (mut primitives, next) = draw_legend(
            &self.suitability_table,
            SUITABILITY_TITLE,
            self.legend_layout.position,
            &self.legend_layout,
            self.suitability_table.show_outlines(),
        );
        let (concentration, _) = draw_legend(
            &self.concentration_table,
            CONCENTRATION_LEGEND_TITLE,
            next,
            &self.legend_layout,
            self.concentration_table.show_outlines(),
        );
        primitives.extend(concentration);
        primitives
    }
}

/// Survey points within `search_distance` of the drawn geometry, like a
/// WFS `DWithin` filter. Around a line the bound is exclusive, the same
/// bound the projector places points with.
pub fn survey_points_within(
    points: Vec<SurveyPoint>,
    geometry: &ProfileGeometry,
    search_distance: f64,
) -> Vec<SurveyPoint> {
    let total = points.len();
    let nearby: Vec<SurveyPoint> = match geometry {
        ProfileGeometry::Point(at) => points
            .into_iter()
            .filter(|p| p.location().distance(*at) <= search_distance)
            .collect(),
        ProfileGeometry::Line(vertices) => {
            let line = segment(vertices);
            points
                .into_iter()
                .filter(|p| {
                    let location = p.location();
                    if line.segments.is_empty() {
                        vertices
                            .iter()
                            .any(|v| v.distance(location) < search_distance)
                    } else {
                        line.segments
                            .iter()
                            .any(|s| s.closest_point(location).distance(location) < search_distance)
                    }
                })
                .collect()
        }
    };
    debug!("{} of {} survey points within {} m", nearby.len(), total, search_distance);
    nearby
}

fn profile_title(field: Option<&str>) -> String {
    match field {
        Some(field) => format!("{TITLE_PREFIX}\n{}", field.replace('_', " ")),
        None => format!("{TITLE_PREFIX}\n{SUITABILITY_TITLE}"),
    }
}

fn depth_tick_primitives(layout: &ProfileLayout, origin: Coord, range: DepthRange) -> Vec<Primitive> {
    let factor_y = layout.column_height / range.height();
    let x2 = origin.x - layout.column_width / 2.0;
    let x1 = x2 - layout.tick_length;
    let text_x = x1 - layout.tick_text_margin;

    depth_ticks(range, layout.depth_tick_interval)
        .into_iter()
        .flat_map(|tick| {
            let y = origin.y + (tick.value - range.lower) * factor_y;
            [
                Primitive::line(Coord::new(x1, y), Coord::new(x2, y), "black", 1.0),
                Primitive::text(tick.label, Coord::new(text_x, y), &layout.tick_font, HAlign::Right, VAlign::Middle),
            ]
        })
        .collect()
}

fn distance_tick_primitives(layout: &ProfileLayout, origin: Coord, total_length: f64) -> Vec<Primitive> {
    if total_length <= 0.0 {
        return Vec::new();
    }
    let factor_x = layout.column_width / total_length;
    let offset_x = origin.x - layout.column_width / 2.0;
    let y2 = origin.y;
    let y1 = y2 - layout.tick_length;
    let text_y = y1 - layout.tick_text_margin;

    distance_ticks(total_length)
        .into_iter()
        .flat_map(|tick| {
            let x = offset_x + tick.value * factor_x;
            [
                Primitive::line(Coord::new(x, y1), Coord::new(x, y2), "black", 1.0),
                Primitive::text(tick.label, Coord::new(x, text_y), &layout.tick_font, HAlign::Center, VAlign::Top),
            ]
        })
        .collect()
}
