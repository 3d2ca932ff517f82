use anyhow::{Context, Result};
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use std::fs;
use std::path::Path;

use crate::model::Coord;
use crate::profile::Sheet;
use crate::shapes::{Fill, HAlign, PatternKind, Primitive, Stroke, Style, VAlign};

const SVG_NS: &str = "http://www.w3.org/2000/svg";

/// Line height of multi-line text, relative to the font size.
const LINE_HEIGHT: f64 = 1.2;

/// Renders a compiled [`Sheet`] as SVG.
///
/// Drawing units map to SVG user units with the y axis flipped. Font sizes,
/// stroke widths and hatch spacings are given in pixels and scaled by the
/// sheet's pixel size.
pub struct SvgWriter {
    /// Output pixels per drawing unit, for the `width`/`height` attributes.
    scale: f64,
}

impl Default for SvgWriter {
    fn default() -> Self {
        Self { scale: 4.0 }
    }
}

struct Frame {
    min_x: f64,
    max_y: f64,
    pixel_size: f64,
}

impl Frame {
    fn point(&self, c: Coord) -> (String, String) {
        (num(c.x - self.min_x), num(self.max_y - c.y))
    }

    fn px(&self, pixels: f64) -> String {
        num(pixels * self.pixel_size)
    }
}

impl SvgWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_scale(mut self, scale: f64) -> Self {
        self.scale = scale;
        self
    }

    pub fn write(&self, sheet: &Sheet, output_path: &Path) -> Result<()> {
        let svg = self.to_svg_string(sheet)?;
        fs::write(output_path, svg)
            .with_context(|| format!("Failed to write SVG: {}", output_path.display()))?;
        tracing::info!(
            "Written SVG with {} primitives: {:?}",
            sheet.primitives.len(),
            output_path
        );
        Ok(())
    }

    pub fn to_svg_string(&self, sheet: &Sheet) -> Result<String> {
        let [min_x, min_y, max_x, max_y] = sheet.extent;
        let width = max_x - min_x;
        let height = max_y - min_y;
        let frame = Frame {
            min_x,
            max_y,
            pixel_size: sheet.pixel_size,
        };

        let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);
        writer
            .write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))
            .context("Failed to write XML declaration")?;

        let mut svg = BytesStart::new("svg");
        svg.push_attribute(("xmlns", SVG_NS));
        svg.push_attribute(("viewBox", format!("0 0 {} {}", num(width), num(height)).as_str()));
        svg.push_attribute(("width", num(width * self.scale).as_str()));
        svg.push_attribute(("height", num(height * self.scale).as_str()));
        writer.write_event(Event::Start(svg))?;

        let patterns = collect_patterns(&sheet.primitives);
        if !patterns.is_empty() {
            writer.write_event(Event::Start(BytesStart::new("defs")))?;
            for (id, fill) in patterns.iter().enumerate() {
                write_pattern(&mut writer, &frame, id, fill)?;
            }
            writer.write_event(Event::End(BytesEnd::new("defs")))?;
        }

        for primitive in &sheet.primitives {
            match primitive {
                Primitive::Polygon { ring, style } => {
                    let points = ring
                        .iter()
                        .map(|&c| {
                            let (x, y) = frame.point(c);
                            format!("{x},{y}")
                        })
                        .collect::<Vec<_>>()
                        .join(" ");
                    let mut polygon = BytesStart::new("polygon");
                    polygon.push_attribute(("points", points.as_str()));
                    push_style(&mut polygon, &frame, style, &patterns);
                    writer.write_event(Event::Empty(polygon))?;
                }
                Primitive::Line { from, to, stroke } => {
                    let (x1, y1) = frame.point(*from);
                    let (x2, y2) = frame.point(*to);
                    let mut line = BytesStart::new("line");
                    line.push_attribute(("x1", x1.as_str()));
                    line.push_attribute(("y1", y1.as_str()));
                    line.push_attribute(("x2", x2.as_str()));
                    line.push_attribute(("y2", y2.as_str()));
                    push_stroke(&mut line, &frame, Some(stroke));
                    writer.write_event(Event::Empty(line))?;
                }
                Primitive::Text {
                    text,
                    at,
                    font,
                    align,
                    baseline,
                    rotation,
                } => {
                    let (x, y) = frame.point(*at);
                    let font_size = font.size * frame.pixel_size;
                    let mut element = BytesStart::new("text");
                    element.push_attribute(("x", x.as_str()));
                    element.push_attribute(("y", y.as_str()));
                    element.push_attribute(("font-family", font.family.as_str()));
                    element.push_attribute(("font-size", num(font_size).as_str()));
                    element.push_attribute(("text-anchor", text_anchor(*align)));
                    element.push_attribute(("dominant-baseline", dominant_baseline(*baseline)));
                    if *rotation != 0.0 {
                        let transform = format!("rotate({} {} {})", num(rotation.to_degrees()), x, y);
                        element.push_attribute(("transform", transform.as_str()));
                    }
                    writer.write_event(Event::Start(element))?;

                    let lines: Vec<&str> = text.split('\n').collect();
                    if lines.len() == 1 {
                        writer.write_event(Event::Text(BytesText::new(text)))?;
                    } else {
                        let line_height = font_size * LINE_HEIGHT;
                        let shift = match baseline {
                            VAlign::Top => 0.0,
                            VAlign::Middle => (lines.len() - 1) as f64 / 2.0,
                            VAlign::Bottom => (lines.len() - 1) as f64,
                        };
                        for (i, line) in lines.iter().enumerate() {
                            let dy = if i == 0 { -shift * line_height } else { line_height };
                            let mut tspan = BytesStart::new("tspan");
                            tspan.push_attribute(("x", x.as_str()));
                            tspan.push_attribute(("dy", num(dy).as_str()));
                            writer.write_event(Event::Start(tspan))?;
                            writer.write_event(Event::Text(BytesText::new(line)))?;
                            writer.write_event(Event::End(BytesEnd::new("tspan")))?;
                        }
                    }
                    writer.write_event(Event::End(BytesEnd::new("text")))?;
                }
            }
        }

        writer.write_event(Event::End(BytesEnd::new("svg")))?;

        String::from_utf8(writer.into_inner()).context("SVG output is not valid UTF-8")
    }
}

/// Distinct pattern fills in order of first use.
fn collect_patterns(primitives: &[Primitive]) -> Vec<Fill> {
    let mut patterns: Vec<Fill> = Vec::new();
    for primitive in primitives {
        if let Primitive::Polygon {
            style:
                Style {
                    fill: Some(fill @ Fill::Pattern { .. }),
                    ..
                },
            ..
        } = primitive
        {
            if !patterns.contains(fill) {
                patterns.push(fill.clone());
            }
        }
    }
    patterns
}

fn pattern_id(index: usize) -> String {
    format!("hatch-{index}")
}

fn write_pattern(writer: &mut Writer<Vec<u8>>, frame: &Frame, index: usize, fill: &Fill) -> Result<()> {
    let Fill::Pattern {
        pattern: PatternKind::Hatch,
        color,
        size,
        spacing,
        angle,
    } = fill
    else {
        return Ok(());
    };

    let tile = frame.px(*spacing);
    let mut element = BytesStart::new("pattern");
    element.push_attribute(("id", pattern_id(index).as_str()));
    element.push_attribute(("patternUnits", "userSpaceOnUse"));
    element.push_attribute(("width", tile.as_str()));
    element.push_attribute(("height", tile.as_str()));
    if *angle != 0.0 {
        element.push_attribute(("patternTransform", format!("rotate({})", num(-angle.to_degrees())).as_str()));
    }
    writer.write_event(Event::Start(element))?;

    let middle = frame.px(spacing / 2.0);
    let mut line = BytesStart::new("line");
    line.push_attribute(("x1", "0"));
    line.push_attribute(("y1", middle.as_str()));
    line.push_attribute(("x2", tile.as_str()));
    line.push_attribute(("y2", middle.as_str()));
    line.push_attribute(("stroke", color.as_str()));
    line.push_attribute(("stroke-width", frame.px(*size).as_str()));
    writer.write_event(Event::Empty(line))?;

    writer.write_event(Event::End(BytesEnd::new("pattern")))?;
    Ok(())
}

fn push_style(element: &mut BytesStart<'_>, frame: &Frame, style: &Style, patterns: &[Fill]) {
    let fill = match &style.fill {
        Some(Fill::Solid { color }) => color.clone(),
        Some(pattern @ Fill::Pattern { .. }) => patterns
            .iter()
            .position(|p| p == pattern)
            .map(|i| format!("url(#{})", pattern_id(i)))
            .unwrap_or_else(|| "none".to_string()),
        None => "none".to_string(),
    };
    element.push_attribute(("fill", fill.as_str()));
    push_stroke(element, frame, style.stroke.as_ref());
}

fn push_stroke(element: &mut BytesStart<'_>, frame: &Frame, stroke: Option<&Stroke>) {
    match stroke {
        Some(stroke) => {
            element.push_attribute(("stroke", stroke.color.as_str()));
            element.push_attribute(("stroke-width", frame.px(stroke.width).as_str()));
        }
        None => element.push_attribute(("stroke", "none")),
    }
}

fn text_anchor(align: HAlign) -> &'static str {
    match align {
        HAlign::Left => "start",
        HAlign::Center => "middle",
        HAlign::Right => "end",
    }
}

fn dominant_baseline(baseline: VAlign) -> &'static str {
    match baseline {
        VAlign::Top => "text-before-edge",
        VAlign::Middle => "central",
        VAlign::Bottom => "text-after-edge",
    }
}

/// Coordinates with at most three decimals, trailing zeros dropped.
fn num(value: f64) -> String {
    let text = format!("{value:.3}");
    let text = text.trim_end_matches('0').trim_end_matches('.');
    if text == "-0" {
        "0".to_string()
    } else {
        text.to_string()
    }
}
