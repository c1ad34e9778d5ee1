use log::debug;
use opencv::core::Point;

use crate::error::Result;
use crate::preprocess::EdgeMap;

/// Topmost and bottommost edge coordinates of one image.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExtentPair {
    pub top: Point,
    pub bottom: Point,
}

impl ExtentPair {
    pub fn new(top: Point, bottom: Point) -> Self {
        Self { top, bottom }
    }

    /// Vertical distance between the two extremes, in pixels.
    pub fn pixel_height(&self) -> i32 {
        self.bottom.y - self.top.y
    }
}

/// How to choose the column reported for an extreme row when several edge
/// pixels share it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TieBreak {
    /// First edge pixel met in row-major order, i.e. the leftmost one.
    #[default]
    FirstInScan,
    /// Rounded mean column of every edge pixel on the extreme row.
    MeanColumn,
}

/// Returns `None` when the map holds no edge at all.
pub fn find_extents(edges: &EdgeMap) -> Result<Option<ExtentPair>> {
    find_extents_with(edges, TieBreak::FirstInScan)
}

pub fn find_extents_with(edges: &EdgeMap, tie_break: TieBreak) -> Result<Option<ExtentPair>> {
    let height = edges.height();

    let mut top = None;
    for y in 0..height {
        if let Some(x) = pick_column(edges.row(y)?, tie_break) {
            top = Some(Point::new(x, y));
            break;
        }
    }
    let Some(top) = top else {
        debug!("edge map has no edge pixels");
        return Ok(None);
    };

    // The top row holds an edge, so this scan always stops at or below it.
    let mut bottom = top;
    for y in (top.y..height).rev() {
        if let Some(x) = pick_column(edges.row(y)?, tie_break) {
            bottom = Point::new(x, y);
            break;
        }
    }

    debug!("extents: top {:?}, bottom {:?}", top, bottom);
    Ok(Some(ExtentPair::new(top, bottom)))
}

fn pick_column(row: &[u8], tie_break: TieBreak) -> Option<i32> {
    match tie_break {
        TieBreak::FirstInScan => row.iter().position(|&v| v != 0).map(|x| x as i32),
        TieBreak::MeanColumn => {
            let (sum, count) = row
                .iter()
                .enumerate()
                .filter(|&(_, &v)| v != 0)
                .fold((0u64, 0u64), |(sum, count), (x, _)| (sum + x as u64, count + 1));
            if count == 0 {
                None
            } else {
                Some((sum as f64 / count as f64).round() as i32)
            }
        }
    }
}
