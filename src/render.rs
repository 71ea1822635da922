use crossterm::{
    cursor, execute, queue,
    style::{Color, Colors, Print, ResetColor, SetColors},
    terminal::{
        self, BeginSynchronizedUpdate, Clear, ClearType, DisableLineWrap, EnableLineWrap,
        EndSynchronizedUpdate, EnterAlternateScreen, LeaveAlternateScreen,
    },
};
use std::io::{self, Write};

// Braille cell is 2x4 subpixels
pub(crate) const SUB_W: usize = 2;
pub(crate) const SUB_H: usize = 4;

// a subpixel brighter than this counts as ink
const INK: u8 = 36;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct Cell {
    pub(crate) ch: char,
    pub(crate) fg: Color,
    pub(crate) bg: Color,
}

impl Cell {
    fn blank(bg: Color) -> Self {
        Self {
            ch: ' ',
            fg: Color::White,
            bg,
        }
    }
}

/// Row-major grid of terminal cells.
pub(crate) struct CellGrid {
    cols: u16,
    rows: u16,
    cells: Vec<Cell>,
}

impl CellGrid {
    pub(crate) fn new(cols: u16, rows: u16) -> Self {
        Self {
            cols,
            rows,
            cells: vec![Cell::blank(Color::Black); cols as usize * rows as usize],
        }
    }

    pub(crate) fn cols(&self) -> u16 {
        self.cols
    }

    pub(crate) fn rows(&self) -> u16 {
        self.rows
    }

    pub(crate) fn cell(&self, x: u16, y: u16) -> Option<&Cell> {
        if x < self.cols && y < self.rows {
            self.cells.get(y as usize * self.cols as usize + x as usize)
        } else {
            None
        }
    }

    pub(crate) fn put(&mut self, x: u16, y: u16, c: Cell) {
        if x < self.cols && y < self.rows {
            self.cells[y as usize * self.cols as usize + x as usize] = c;
        }
    }

    pub(crate) fn wipe(&mut self, bg: Color) {
        self.cells.fill(Cell::blank(bg));
    }

    /// Write `s` left to right from `(x, y)`, clipped at the right edge.
    pub(crate) fn put_str(&mut self, x: u16, y: u16, s: &str, fg: Color, bg: Color) {
        let room = self.cols.saturating_sub(x) as usize;
        for (dx, ch) in s.chars().take(room).enumerate() {
            self.put(x + dx as u16, y, Cell { ch, fg, bg });
        }
    }
}

/// Alternate-screen session. `back` is drawn into each frame, `front` mirrors
/// what the terminal currently shows.
pub(crate) struct Terminal {
    out: io::Stdout,
    back: CellGrid,
    front: CellGrid,
}

impl Terminal {
    pub(crate) fn begin() -> anyhow::Result<Self> {
        let mut out = io::stdout();
        execute!(
            out,
            EnterAlternateScreen,
            cursor::Hide,
            DisableLineWrap,
            Clear(ClearType::All)
        )?;
        terminal::enable_raw_mode()?;

        let (cols, rows) = terminal::size()?;
        Ok(Self {
            out,
            back: CellGrid::new(cols, rows),
            front: CellGrid::new(cols, rows),
        })
    }

    pub(crate) fn end(&mut self) -> anyhow::Result<()> {
        queue!(
            self.out,
            BeginSynchronizedUpdate,
            ResetColor,
            Clear(ClearType::All),
            cursor::Show,
            EnableLineWrap,
            EndSynchronizedUpdate,
            LeaveAlternateScreen
        )?;
        self.out.flush()?;
        terminal::disable_raw_mode()?;
        Ok(())
    }

    pub(crate) fn cols(&self) -> u16 {
        self.back.cols
    }

    pub(crate) fn rows(&self) -> u16 {
        self.back.rows
    }

    pub(crate) fn canvas(&mut self) -> &mut CellGrid {
        &mut self.back
    }

    /// Rebuild both grids when the window changed size. Returns true if it did.
    pub(crate) fn resize_if_needed(&mut self) -> anyhow::Result<bool> {
        let (cols, rows) = terminal::size()?;
        if (cols, rows) == (self.back.cols, self.back.rows) {
            return Ok(false);
        }
        self.back = CellGrid::new(cols, rows);
        self.front = CellGrid::new(cols, rows);
        execute!(self.out, Clear(ClearType::All))?;
        Ok(true)
    }

    /// Subpixel size of the sky: every row but the HUD line.
    pub(crate) fn sky_size(&self) -> (usize, usize) {
        let cols = self.back.cols.max(1) as usize;
        let rows = self.back.rows.saturating_sub(1).max(1) as usize;
        (cols * SUB_W, rows * SUB_H)
    }

    /// Send the cells that differ from what is on screen.
    pub(crate) fn present(&mut self) -> anyhow::Result<()> {
        queue!(self.out, BeginSynchronizedUpdate)?;

        let cols = self.back.cols as usize;
        let mut pen: Option<(Color, Color)> = None;
        // cursor index after the last print, if it is still on the same row
        let mut caret: Option<usize> = None;

        for (i, (new, old)) in self.back.cells.iter().zip(&self.front.cells).enumerate() {
            if new == old {
                continue;
            }
            if caret != Some(i) {
                queue!(self.out, cursor::MoveTo((i % cols) as u16, (i / cols) as u16))?;
            }
            if pen != Some((new.fg, new.bg)) {
                queue!(self.out, SetColors(Colors::new(new.fg, new.bg)))?;
                pen = Some((new.fg, new.bg));
            }
            queue!(self.out, Print(new.ch))?;
            caret = ((i + 1) % cols != 0).then_some(i + 1);
        }

        queue!(self.out, ResetColor, EndSynchronizedUpdate)?;
        self.out.flush()?;
        self.front.cells.copy_from_slice(&self.back.cells);
        Ok(())
    }
}

/* -----------------------------
   Braille encoding: 2×4 pixels -> U+2800..U+28FF
------------------------------ */

fn braille_bit(dx: usize, dy: usize) -> u8 {
    // Dot mapping:
    // (0,0)=1 (0,1)=2 (0,2)=4 (0,3)=64
    // (1,0)=8 (1,1)=16 (1,2)=32 (1,3)=128
    match (dx, dy) {
        (0, 0) => 0x01,
        (0, 1) => 0x02,
        (0, 2) => 0x04,
        (0, 3) => 0x40,
        (1, 0) => 0x08,
        (1, 1) => 0x10,
        (1, 2) => 0x20,
        (1, 3) => 0x80,
        _ => 0x00,
    }
}

/// Cool violet for faint trails, through ice blue, to white-hot cores.
pub(crate) fn bolt_tint(level: u8) -> Color {
    const DIM: (f32, f32, f32) = (70.0, 60.0, 150.0);
    const MID: (f32, f32, f32) = (140.0, 180.0, 255.0);
    const HOT: (f32, f32, f32) = (255.0, 255.0, 255.0);

    let t = level as f32 / 255.0;
    let (a, b, k) = if t < 0.5 {
        (DIM, MID, t / 0.5)
    } else {
        (MID, HOT, (t - 0.5) / 0.5)
    };
    let mix = |p: f32, q: f32| (p + (q - p) * k).round().clamp(0.0, 255.0) as u8;
    Color::Rgb {
        r: mix(a.0, b.0),
        g: mix(a.1, b.1),
        b: mix(a.2, b.2),
    }
}

/// Grey wash for the flash overlay.
pub(crate) fn flash_background(opacity: f32) -> Color {
    if opacity <= 0.0 {
        return Color::Black;
    }
    let v = (opacity.clamp(0.0, 1.0) * 160.0).round() as u8;
    Color::Rgb { r: v, g: v, b: v }
}

/// Pack a grayscale RGBA image into braille cells starting at the top-left.
pub(crate) fn image_to_cells(
    rgba: &[u8],
    img_w: usize,
    img_h: usize,
    out: &mut CellGrid,
    enable_color: bool,
    bg: Color,
) {
    let cols = (img_w / SUB_W).min(out.cols() as usize);
    let rows = (img_h / SUB_H).min(out.rows() as usize);

    for cy in 0..rows {
        for cx in 0..cols {
            let px0 = cx * SUB_W;
            let py0 = cy * SUB_H;

            let mut mask: u8 = 0;
            let mut peak: u8 = 0;

            for dy in 0..SUB_H {
                for dx in 0..SUB_W {
                    let i = ((py0 + dy) * img_w + (px0 + dx)) * 4;
                    let Some(&v) = rgba.get(i) else {
                        continue;
                    };
                    if v >= INK {
                        mask |= braille_bit(dx, dy);
                        peak = peak.max(v);
                    }
                }
            }

            let ch = if mask == 0 {
                ' '
            } else {
                char::from_u32(0x2800 + (mask as u32)).unwrap_or(' ')
            };

            let fg = if !enable_color || mask == 0 {
                Color::White
            } else {
                bolt_tint(peak)
            };

            out.put(cx as u16, cy as u16, Cell { ch, fg, bg });
        }
    }
}

/// Plain-text shading of an RGBA frame, one character per pixel.
pub(crate) fn ascii_shade(rgba: &[u8], w: usize, h: usize) -> String {
    const RAMP: &[u8] = b" .:-=+*#%@";
    let mut s = String::with_capacity((w + 1) * h);
    for y in 0..h {
        for x in 0..w {
            let v = rgba.get((y * w + x) * 4).copied().unwrap_or(0) as usize;
            let k = v * (RAMP.len() - 1) / 255;
            s.push(RAMP[k] as char);
        }
        s.push('\n');
    }
    s
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gray(values: &[u8]) -> Vec<u8> {
        values.iter().flat_map(|&v| [v, v, v, 255]).collect()
    }

    #[test]
    fn full_cell_is_all_dots() {
        let img = gray(&[255; SUB_W * SUB_H]);
        let mut cells = CellGrid::new(1, 1);
        image_to_cells(&img, SUB_W, SUB_H, &mut cells, false, Color::Black);
        assert_eq!(cells.cell(0, 0).map(|c| c.ch), Some('\u{28FF}'));
    }

    #[test]
    fn dim_pixels_stay_blank() {
        let img = gray(&[INK - 1; SUB_W * SUB_H]);
        let mut cells = CellGrid::new(1, 1);
        image_to_cells(&img, SUB_W, SUB_H, &mut cells, true, Color::Black);
        assert_eq!(cells.cell(0, 0).map(|c| c.ch), Some(' '));
    }

    #[test]
    fn top_left_dot() {
        let mut values = [0u8; SUB_W * SUB_H];
        values[0] = 200;
        let img = gray(&values);
        let mut cells = CellGrid::new(1, 1);
        image_to_cells(&img, SUB_W, SUB_H, &mut cells, false, Color::Black);
        assert_eq!(cells.cell(0, 0).map(|c| c.ch), Some('\u{2801}'));
    }

    #[test]
    fn text_is_clipped_at_the_right_edge() {
        let mut grid = CellGrid::new(4, 2);
        grid.put_str(2, 1, "bolt", Color::White, Color::Black);
        assert_eq!(grid.cell(2, 1).map(|c| c.ch), Some('b'));
        assert_eq!(grid.cell(3, 1).map(|c| c.ch), Some('o'));
        assert_eq!(grid.cell(1, 1).map(|c| c.ch), Some(' '));
        assert!(grid.cell(4, 1).is_none());

        grid.put_str(9, 0, "off", Color::White, Color::Black);
        assert!((0..4).all(|x| grid.cell(x, 0).map(|c| c.ch) == Some(' ')));
    }

    #[test]
    fn wipe_paints_the_background() {
        let mut grid = CellGrid::new(3, 1);
        grid.put_str(0, 0, "abc", Color::White, Color::Black);
        let grey = Color::Rgb { r: 48, g: 48, b: 48 };
        grid.wipe(grey);
        assert!((0..3).all(|x| grid.cell(x, 0) == Some(&Cell::blank(grey))));
    }

    #[test]
    fn tint_ends() {
        assert_eq!(bolt_tint(255), Color::Rgb { r: 255, g: 255, b: 255 });
        assert_eq!(bolt_tint(0), Color::Rgb { r: 70, g: 60, b: 150 });
    }

    #[test]
    fn ascii_ramp_ends() {
        let img = gray(&[0, 255]);
        assert_eq!(ascii_shade(&img, 2, 1), " @\n");
    }
}
