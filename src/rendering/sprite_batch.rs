use crate::glm;
use crate::rendering::data::SpriteSheet;
use crate::utils::constants::{COMPONENTS_PER_VERTEX, VERTICES_PER_QUAD};

/// one sprite draw as submitted by the caller
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpriteRequest {
    pub index: u32,
    pub x: f32,
    pub y: f32,
    pub width_cells: u32,
    pub height_cells: u32,
    pub flip_h: bool,
    pub flip_v: bool,
}

impl SpriteRequest {
    /// a single unflipped cell at `(x, y)`
    pub fn new(index: u32, x: f32, y: f32) -> Self {
        Self {
            index,
            x,
            y,
            width_cells: 1,
            height_cells: 1,
            flip_h: false,
            flip_v: false,
        }
    }

    /// spans `width x height` cells starting at the indexed cell
    pub fn with_size(mut self, width_cells: u32, height_cells: u32) -> Self {
        self.width_cells = width_cells;
        self.height_cells = height_cells;
        self
    }

    /// mirrors the sampled region horizontally and/or vertically
    pub fn with_flip(mut self, flip_h: bool, flip_v: bool) -> Self {
        self.flip_h = flip_h;
        self.flip_v = flip_v;
        self
    }
}

/// texture space rectangle, `(u0, v0)` maps to the top left screen corner
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UvRect {
    pub u0: f32,
    pub v0: f32,
    pub u1: f32,
    pub v1: f32,
}

impl UvRect {
    /// swaps the extremes of the flipped axes
    pub fn flipped(mut self, flip_h: bool, flip_v: bool) -> Self {
        if flip_h {
            std::mem::swap(&mut self.u0, &mut self.u1);
        }
        if flip_v {
            std::mem::swap(&mut self.v0, &mut self.v1);
        }
        self
    }
}

/// cell addressing of a sprite sheet
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SheetGrid {
    pub cell_size: u32,
    pub sheet_width: u32,
    pub sheet_height: u32,
    pub cols: u32,
    pub rows: u32,
}

impl SheetGrid {
    pub fn new(sheet: &SpriteSheet) -> Self {
        Self {
            cell_size: sheet.cell_size(),
            sheet_width: sheet.width(),
            sheet_height: sheet.height(),
            cols: sheet.grid_cols(),
            rows: sheet.grid_rows(),
        }
    }

    /// `(col, row)` of a sprite index, wrapping indices past the last cell
    pub fn cell(&self, index: u32) -> (u32, u32) {
        let index = index % (self.cols * self.rows);
        (index % self.cols, index / self.cols)
    }

    /// unflipped texture rectangle covering `width x height` cells from `index`
    pub fn uv_rect(&self, index: u32, width_cells: u32, height_cells: u32) -> UvRect {
        let (col, row) = self.cell(index);
        let cell = self.cell_size as f32;
        let sheet_w = self.sheet_width as f32;
        let sheet_h = self.sheet_height as f32;
        UvRect {
            u0: col as f32 * cell / sheet_w,
            v0: row as f32 * cell / sheet_h,
            u1: (col as f32 + width_cells as f32) * cell / sheet_w,
            v1: (row as f32 + height_cells as f32) * cell / sheet_h,
        }
    }
}

/// geometry of one sprite: two triangles sharing the diagonal
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Quad {
    pub positions: [glm::Vec2; VERTICES_PER_QUAD],
    pub uvs: [glm::Vec2; VERTICES_PER_QUAD],
    pub flip: glm::Vec2,
}

impl Quad {
    /// builds the quad for the pixel rectangle `(x, y, width, height)`
    pub fn new(x: f32, y: f32, width: f32, height: f32, uv: UvRect, flip: glm::Vec2) -> Self {
        let (x1, y1) = (x + width, y + height);
        Self {
            positions: [
                glm::vec2(x, y),
                glm::vec2(x1, y),
                glm::vec2(x, y1),
                glm::vec2(x, y1),
                glm::vec2(x1, y),
                glm::vec2(x1, y1),
            ],
            uvs: [
                glm::vec2(uv.u0, uv.v0),
                glm::vec2(uv.u1, uv.v0),
                glm::vec2(uv.u0, uv.v1),
                glm::vec2(uv.u0, uv.v1),
                glm::vec2(uv.u1, uv.v0),
                glm::vec2(uv.u1, uv.v1),
            ],
            flip,
        }
    }
}

/// accumulates sprite geometry for one frame as parallel float arrays
#[derive(Debug, Clone)]
pub struct SpriteBatcher {
    grid: SheetGrid,
    positions: Vec<f32>,
    uvs: Vec<f32>,
    flips: Vec<f32>,
    track_flips: bool,
}

impl SpriteBatcher {
    /// creates an empty batch for the given sheet, optionally recording flip markers
    pub fn new(sheet: &SpriteSheet, track_flips: bool) -> Self {
        Self {
            grid: SheetGrid::new(sheet),
            positions: Vec::new(),
            uvs: Vec::new(),
            flips: Vec::new(),
            track_flips,
        }
    }

    /// computes the quad a request produces without touching the batch
    pub fn quad(&self, request: &SpriteRequest) -> Quad {
        // whole pixels keep the sprite edges crisp
        let x = request.x.floor();
        let y = request.y.floor();
        let uv = self
            .grid
            .uv_rect(request.index, request.width_cells, request.height_cells)
            .flipped(request.flip_h, request.flip_v);
        let cell = self.grid.cell_size as f32;
        let flip = glm::vec2(request.flip_h as u8 as f32, request.flip_v as u8 as f32);
        Quad::new(
            x,
            y,
            request.width_cells as f32 * cell,
            request.height_cells as f32 * cell,
            uv,
            flip,
        )
    }

    /// appends one sprite to the batch
    pub fn push(&mut self, request: &SpriteRequest) {
        let quad = self.quad(request);
        for (position, uv) in quad.positions.iter().zip(quad.uvs.iter()) {
            self.positions.extend_from_slice(&[position.x, position.y]);
            self.uvs.extend_from_slice(&[uv.x, uv.y]);
            if self.track_flips {
                self.flips.extend_from_slice(&[quad.flip.x, quad.flip.y]);
            }
        }
    }

    /// empties all arrays while keeping their allocations
    pub fn clear(&mut self) {
        self.positions.clear();
        self.uvs.clear();
        self.flips.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    pub fn vertex_count(&self) -> usize {
        self.positions.len() / COMPONENTS_PER_VERTEX
    }

    pub fn sprite_count(&self) -> usize {
        self.vertex_count() / VERTICES_PER_QUAD
    }

    pub fn positions(&self) -> &[f32] {
        &self.positions
    }

    pub fn uvs(&self) -> &[f32] {
        &self.uvs
    }

    /// per-vertex `(flip_h, flip_v)` markers, empty unless flips are tracked
    pub fn flips(&self) -> &[f32] {
        &self.flips
    }

    pub fn tracks_flips(&self) -> bool {
        self.track_flips
    }

    pub fn grid(&self) -> &SheetGrid {
        &self.grid
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn batcher(track_flips: bool) -> SpriteBatcher {
        let sheet = SpriteSheet::new(vec![0; 128 * 128], 128, 128, 8).unwrap();
        SpriteBatcher::new(&sheet, track_flips)
    }

    fn uv_bounds(quad: &Quad) -> UvRect {
        UvRect {
            u0: quad.uvs[0].x,
            v0: quad.uvs[0].y,
            u1: quad.uvs[5].x,
            v1: quad.uvs[5].y,
        }
    }

    #[test]
    fn uv_top_left_matches_grid_cell() {
        let batcher = batcher(false);
        for n in 0..256u32 {
            let quad = batcher.quad(&SpriteRequest::new(n, 0.0, 0.0));
            let (col, row) = (n % 16, n / 16);
            assert_eq!(quad.uvs[0].x, (col * 8) as f32 / 128.0);
            assert_eq!(quad.uvs[0].y, (row * 8) as f32 / 128.0);
        }
    }

    #[test]
    fn first_cell_uvs() {
        let batcher = batcher(false);
        let uv = uv_bounds(&batcher.quad(&SpriteRequest::new(0, 0.0, 0.0)));
        assert_eq!(
            uv,
            UvRect {
                u0: 0.0,
                v0: 0.0,
                u1: 0.0625,
                v1: 0.0625
            }
        );

        let flipped = batcher.quad(&SpriteRequest::new(0, 0.0, 0.0).with_flip(true, false));
        assert_eq!(
            uv_bounds(&flipped),
            UvRect {
                u0: 0.0625,
                v0: 0.0,
                u1: 0.0,
                v1: 0.0625
            }
        );
    }

    #[test]
    fn flips_are_independent_and_commute() {
        let grid = batcher(false).grid;
        let uv = grid.uv_rect(37, 2, 1);

        let h = uv.flipped(true, false);
        assert_eq!((h.u0, h.u1), (uv.u1, uv.u0));
        assert_eq!((h.v0, h.v1), (uv.v0, uv.v1));

        let v = uv.flipped(false, true);
        assert_eq!((v.u0, v.u1), (uv.u0, uv.u1));
        assert_eq!((v.v0, v.v1), (uv.v1, uv.v0));

        let both = uv.flipped(true, true);
        assert_eq!(both, h.flipped(false, true));
        assert_eq!(both, v.flipped(true, false));
    }

    #[test]
    fn indices_wrap_around_the_cell_count() {
        let batcher = batcher(false);
        assert_eq!(batcher.grid().cell(400), batcher.grid().cell(144));
        assert_eq!(
            batcher.quad(&SpriteRequest::new(400, 3.0, 4.0)),
            batcher.quad(&SpriteRequest::new(144, 3.0, 4.0))
        );
    }

    #[test]
    fn positions_are_floored_and_sized_in_cells() {
        let batcher = batcher(false);
        let quad = batcher.quad(&SpriteRequest::new(5, 10.9, 3.2).with_size(2, 3));
        assert_eq!(quad.positions[0], glm::vec2(10.0, 3.0));
        assert_eq!(quad.positions[5], glm::vec2(26.0, 27.0));

        let quad = batcher.quad(&SpriteRequest::new(5, -0.5, 0.99));
        assert_eq!(quad.positions[0], glm::vec2(-1.0, 0.0));
    }

    #[test]
    fn huge_cell_spans_do_not_overflow() {
        let batcher = batcher(false);
        let uv = batcher.grid().uv_rect(255, u32::MAX, u32::MAX);
        assert_eq!((uv.u0, uv.v0), (0.9375, 0.9375));
        assert!(uv.u1 > 1.0 && uv.v1 > 1.0);
        let quad = batcher.quad(&SpriteRequest::new(255, 0.0, 0.0).with_size(u32::MAX, 1));
        assert!(quad.positions[5].x > 0.0);
    }

    #[test]
    fn triangles_share_the_diagonal() {
        let batcher = batcher(false);
        let quad = batcher.quad(&SpriteRequest::new(0, 0.0, 0.0));
        // second and third vertices of the first triangle open the second one
        assert_eq!(quad.positions[2], quad.positions[3]);
        assert_eq!(quad.positions[1], quad.positions[4]);
        assert_eq!(quad.uvs[2], quad.uvs[3]);
        assert_eq!(quad.uvs[1], quad.uvs[4]);
    }

    #[test]
    fn push_appends_parallel_arrays() {
        let mut batcher = batcher(true);
        batcher.push(&SpriteRequest::new(1, 0.0, 0.0));
        batcher.push(&SpriteRequest::new(2, 8.0, 0.0).with_flip(false, true));
        assert_eq!(batcher.sprite_count(), 2);
        assert_eq!(batcher.vertex_count(), 12);
        assert_eq!(batcher.positions().len(), 24);
        assert_eq!(batcher.uvs().len(), 24);
        assert_eq!(batcher.flips().len(), 24);
        assert_eq!(&batcher.flips()[12..14], &[0.0, 1.0]);

        batcher.clear();
        assert!(batcher.is_empty());
        assert!(batcher.uvs().is_empty());
        assert!(batcher.flips().is_empty());
    }

    #[test]
    fn flips_are_skipped_when_untracked() {
        let mut batcher = batcher(false);
        batcher.push(&SpriteRequest::new(1, 0.0, 0.0).with_flip(true, true));
        assert_eq!(batcher.vertex_count(), 6);
        assert!(batcher.flips().is_empty());
    }
}
