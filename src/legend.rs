use crate::classify::ClassificationTable;
use crate::layout::LegendLayout;
use crate::model::Coord;
use crate::shapes::{HAlign, Primitive, Style, VAlign};

/// Draws a legend for `table` with its first box at `position`, stacking
/// upward. Returns the primitives and the position where the next legend
/// starts.
pub fn draw_legend(
    table: &ClassificationTable,
    title: &str,
    position: Coord,
    layout: &LegendLayout,
    show_outline: bool,
) -> (Vec<Primitive>, Coord) {
    let mut primitives = Vec::new();
    let x = position.x;
    let mut y = position.y;
    let half_width = layout.box_width / 2.0;

    for key in table.keys_ascending() {
        primitives.push(Primitive::centered_box(
            x,
            y,
            layout.box_width,
            layout.box_height,
            table.style(key).clone(),
        ));
        if show_outline {
            primitives.push(Primitive::centered_box(
                x,
                y,
                layout.box_width,
                layout.box_height,
                Style::outline("black", 1.0),
            ));
        }
        primitives.push(Primitive::text(
            table.text(key),
            Coord::new(
                x + half_width + layout.box_margin_right,
                y + layout.box_height / 2.0,
            ),
            &layout.box_font,
            HAlign::Left,
            VAlign::Middle,
        ));
        y += layout.box_height + layout.box_margin_top;
    }

    primitives.push(Primitive::text(
        title,
        Coord::new(x - half_width, y + layout.title_margin),
        &layout.title_font,
        HAlign::Left,
        VAlign::Bottom,
    ));
    y += layout.title_height() + layout.legend_margin();

    (primitives, Coord::new(x, y))
}
