//! Cell grid and per-cell frame differencing.

use image::GrayImage;
use synopsis_models::SampledIndex;

use crate::error::{MediaError, MediaResult};
use crate::human::HumanRegion;
use crate::source::FrameCursor;

/// Half-open pixel rectangle `[x0, x1) x [y0, y1)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cell {
    pub x0: u32,
    pub y0: u32,
    pub x1: u32,
    pub y1: u32,
}

impl Cell {
    pub fn width(&self) -> u32 {
        self.x1 - self.x0
    }

    pub fn height(&self) -> u32 {
        self.y1 - self.y0
    }

    pub fn area(&self) -> u64 {
        self.width() as u64 * self.height() as u64
    }
}

/// Fixed grid of cells covering a frame, stored row-major.
///
/// When the frame does not divide evenly, one extra column (or row) is added
/// that extends to the frame edge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CellGrid {
    width: u32,
    height: u32,
    cols: usize,
    rows: usize,
    cells: Vec<Cell>,
}

impl CellGrid {
    /// Build a grid of `cols` x `rows` nominal cells over a `width` x `height` frame.
    pub fn new(width: u32, height: u32, cols: usize, rows: usize) -> MediaResult<Self> {
        if cols == 0 || rows == 0 {
            return Err(MediaError::config("Grid must have at least one cell"));
        }
        if (width as usize) < cols || (height as usize) < rows {
            return Err(MediaError::config(format!(
                "Analysis frame {}x{} is smaller than the {}x{} grid",
                width, height, cols, rows
            )));
        }

        let cell_w = width / cols as u32;
        let cell_h = height / rows as u32;
        let x_edges = edges(width, cell_w, cols);
        let y_edges = edges(height, cell_h, rows);

        let mut cells = Vec::with_capacity((x_edges.len() - 1) * (y_edges.len() - 1));
        for ys in y_edges.windows(2) {
            for xs in x_edges.windows(2) {
                cells.push(Cell {
                    x0: xs[0],
                    y0: ys[0],
                    x1: xs[1],
                    y1: ys[1],
                });
            }
        }

        Ok(Self {
            width,
            height,
            cols: x_edges.len() - 1,
            rows: y_edges.len() - 1,
            cells,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Columns after remainder adjustment.
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Rows after remainder adjustment.
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Total number of cells.
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    pub fn cell(&self, row: usize, col: usize) -> Option<&Cell> {
        if col >= self.cols {
            return None;
        }
        self.cells.get(row * self.cols + col)
    }

    /// Per-cell mean absolute luma difference.
    ///
    /// Cells overlapping `mask` score zero. Both images must match the grid size.
    pub fn diff(&self, lhs: &GrayImage, rhs: &GrayImage, mask: Option<&HumanRegion>) -> CellDiffMatrix {
        let stride = self.width as usize;
        let lhs = lhs.as_raw();
        let rhs = rhs.as_raw();

        let values = self
            .cells
            .iter()
            .map(|cell| {
                if mask.is_some_and(|m| m.intersects(cell.x0, cell.y0, cell.x1, cell.y1)) {
                    return 0.0;
                }
                let mut sum: u64 = 0;
                for y in cell.y0..cell.y1 {
                    let start = y as usize * stride + cell.x0 as usize;
                    let end = y as usize * stride + cell.x1 as usize;
                    sum += lhs[start..end]
                        .iter()
                        .zip(&rhs[start..end])
                        .map(|(a, b)| a.abs_diff(*b) as u64)
                        .sum::<u64>();
                }
                sum as f64 / cell.area() as f64
            })
            .collect();

        CellDiffMatrix {
            cols: self.cols,
            rows: self.rows,
            values,
        }
    }
}

/// Cell boundaries along one axis.
fn edges(extent: u32, step: u32, count: usize) -> Vec<u32> {
    let mut edges: Vec<u32> = (0..=count as u32).map(|i| i * step).collect();
    if extent % count as u32 != 0 {
        edges.push(extent);
    }
    edges
}

/// Difference scores for one frame pair, one per cell, row-major.
#[derive(Debug, Clone, PartialEq)]
pub struct CellDiffMatrix {
    cols: usize,
    rows: usize,
    values: Vec<f64>,
}

impl CellDiffMatrix {
    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn get(&self, row: usize, col: usize) -> f64 {
        self.values[row * self.cols + col]
    }

    pub fn is_zero(&self) -> bool {
        self.values.iter().all(|v| *v == 0.0)
    }
}

/// Loads analysis frames from a cursor and diffs them on a grid.
///
/// Analysis frames are luma planes downscaled by `scale`; human regions in
/// source coordinates are scaled by the same factor before masking.
#[derive(Debug, Clone)]
pub struct CellAnalyzer {
    grid: CellGrid,
    scale: f64,
}

impl CellAnalyzer {
    /// Build for a `width` x `height` source downscaled by `scale`.
    pub fn new(width: u32, height: u32, scale: f64, cols: usize, rows: usize) -> MediaResult<Self> {
        let analysis_width = (width as f64 * scale).floor() as u32;
        let analysis_height = (height as f64 * scale).floor() as u32;
        let grid = CellGrid::new(analysis_width, analysis_height, cols, rows)?;
        Ok(Self { grid, scale })
    }

    pub fn grid(&self) -> &CellGrid {
        &self.grid
    }

    /// Analysis frame for a sampled index.
    pub fn load(&self, cursor: &mut FrameCursor, index: SampledIndex) -> MediaResult<GrayImage> {
        let frame = cursor.frame_at(index)?;
        Ok(frame.luma_resized(self.grid.width(), self.grid.height()))
    }

    /// Diff two analysis frames, masking cells that overlap `mask`.
    pub fn diff(&self, lhs: &GrayImage, rhs: &GrayImage, mask: Option<&HumanRegion>) -> CellDiffMatrix {
        let scaled = mask.map(|m| m.scale(self.scale));
        self.grid.diff(lhs, rhs, scaled.as_ref())
    }
}
