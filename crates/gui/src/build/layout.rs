//! Flat grid layout of unrotated panels.

use glam::Vec3;

use super::{PanelSize, PanelTransform};

/// Place panels row-major in a grid of `columns` columns.
///
/// Column width is the widest panel in the column, row height the tallest
/// panel in the row; cells are separated by `gap` and rows stack downward.
/// Each panel is centered in its cell. `columns == 0` is treated as 1.
pub fn flat_layout(sizes: &[PanelSize], columns: usize, gap: f32) -> Vec<PanelTransform> {
    if sizes.is_empty() {
        return Vec::new();
    }
    let columns = columns.max(1);
    let rows = sizes.len().div_ceil(columns);
    let gap = if gap.is_finite() { gap } else { 0.0 };

    let mut col_widths = vec![0.0_f32; columns];
    let mut row_heights = vec![0.0_f32; rows];
    for (i, size) in sizes.iter().enumerate() {
        let (row, col) = (i / columns, i % columns);
        col_widths[col] = col_widths[col].max(size.width);
        row_heights[row] = row_heights[row].max(size.height);
    }

    let col_offsets = offsets(&col_widths, gap);
    let row_offsets = offsets(&row_heights, gap);

    (0..sizes.len())
        .map(|i| {
            let (row, col) = (i / columns, i % columns);
            PanelTransform::from_position(Vec3::new(
                col_offsets[col] + col_widths[col] * 0.5,
                -(row_offsets[row] + row_heights[row] * 0.5),
                0.0,
            ))
        })
        .collect()
}

/// Start offset of each cell: sum of previous extents plus one gap per cell
fn offsets(extents: &[f32], gap: f32) -> Vec<f32> {
    let mut acc = 0.0;
    extents
        .iter()
        .enumerate()
        .map(|(i, extent)| {
            let offset = acc + gap * i as f32;
            acc += extent;
            offset
        })
        .collect()
}
