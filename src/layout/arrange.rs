use ratatui::prelude::Rect;
use serde::{Deserialize, Serialize};

use super::FloatRect;

/// How [`arrange`] tiles the work area.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArrangeMode {
    /// Roughly square grid, `ceil(sqrt(n))` columns.
    Grid,
    /// One column per window, side by side.
    Horizontal,
    /// One row per window, stacked.
    Vertical,
}

impl ArrangeMode {
    pub const ALL: [ArrangeMode; 3] = [Self::Grid, Self::Horizontal, Self::Vertical];

    pub fn label(self) -> &'static str {
        match self {
            Self::Grid => "Grid",
            Self::Horizontal => "Columns",
            Self::Vertical => "Rows",
        }
    }

    fn dimensions(self, count: usize) -> (usize, usize) {
        match self {
            Self::Grid => {
                let mut columns = 1;
                while columns * columns < count {
                    columns += 1;
                }
                (columns, count.div_ceil(columns))
            }
            Self::Horizontal => (count, 1),
            Self::Vertical => (1, count),
        }
    }
}

/// Split `area` evenly into `count` cells, filled row by row.
///
/// Cell sizes are floored so the cells never extend past `area`; they only
/// touch along shared edges and are therefore pairwise disjoint.
pub fn arrange(mode: ArrangeMode, count: usize, area: Rect) -> Vec<FloatRect> {
    if count == 0 {
        return Vec::new();
    }
    let (columns, rows) = mode.dimensions(count);
    let cell_width = (area.width as usize / columns) as u16;
    let cell_height = (area.height as usize / rows) as u16;
    (0..count)
        .map(|index| {
            let column = (index % columns) as i32;
            let row = (index / columns) as i32;
            FloatRect {
                x: area.x as i32 + column * cell_width as i32,
                y: area.y as i32 + row * cell_height as i32,
                width: cell_width,
                height: cell_height,
            }
        })
        .collect()
}
