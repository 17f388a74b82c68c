//! Vertical-gap grouping of layout blocks.

use crate::model::{BoundingBox, LayoutBlock, PixelBox};

/// Group blocks into paragraphs, top to bottom.
///
/// Blocks are sorted by top edge. A block joins the current group when the gap
/// between its top edge and the bottom edge of the group's last block is below
/// `threshold`; otherwise it starts a new group.
pub fn group_blocks(blocks: &[LayoutBlock], threshold: f32) -> Vec<Vec<LayoutBlock>> {
    let mut sorted = blocks.to_vec();
    sorted.sort_by(|a, b| a.bbox.y1.total_cmp(&b.bbox.y1));

    let mut groups: Vec<Vec<LayoutBlock>> = Vec::new();
    for block in sorted {
        match groups.last_mut() {
            Some(group) => {
                let prev = &group[group.len() - 1];
                if block.bbox.y1 - prev.bbox.y2 < threshold {
                    group.push(block);
                } else {
                    groups.push(vec![block]);
                }
            }
            None => groups.push(vec![block]),
        }
    }
    groups
}

/// Union of a group's boxes, grown by `margin` and clipped to a `width` x `height` image.
///
/// Coordinates are truncated to whole pixels before the margin is applied.
pub fn merge_bbox(group: &[LayoutBlock], margin: u32, width: u32, height: u32) -> PixelBox {
    let Some(first) = group.first() else {
        return PixelBox::default();
    };
    let merged = group
        .iter()
        .skip(1)
        .fold(first.bbox, |acc: BoundingBox, b| acc.union(&b.bbox));

    let margin = i64::from(margin);
    let clip = |v: i64, max: u32| v.clamp(0, i64::from(max)) as u32;

    PixelBox {
        x1: clip(merged.x1 as i64 - margin, width),
        y1: clip(merged.y1 as i64 - margin, height),
        x2: clip(merged.x2 as i64 + margin, width),
        y2: clip(merged.y2 as i64 + margin, height),
    }
}
