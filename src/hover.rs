//! Resolves a pointer position on a profile drawing to block tooltips.

use serde::Serialize;

use crate::columns::{BlockTag, ProfileBlock};
use crate::model::Coord;

/// Emitted when the pointer rests on one or more profile blocks. `link_id` is
/// the survey point the topmost taken block belongs to, so a map can
/// highlight it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HoverEvent {
    pub text: String,
    pub link_id: String,
}

/// Blocks are searched from the last emitted (drawn on top) to the first.
/// At most one block per tag is taken, so a suitability overlay and the
/// concentration beneath it are reported together.
pub fn hover_at(blocks: &[ProfileBlock], at: Coord) -> Option<HoverEvent> {
    let mut seen: Vec<BlockTag> = Vec::with_capacity(2);
    let mut event: Option<HoverEvent> = None;

    for block in blocks.iter().rev().filter(|b| b.bounds.contains(at)) {
        if seen.contains(&block.tag) {
            continue;
        }
        seen.push(block.tag);

        event = Some(match event {
            None => HoverEvent {
                text: block.text.clone(),
                link_id: block.link_id.clone(),
            },
            Some(previous) => HoverEvent {
                text: format!("{}\n{}", block.text, previous.text),
                link_id: block.link_id.clone(),
            },
        });

        if seen.len() == 2 {
            break;
        }
    }

    event
}
