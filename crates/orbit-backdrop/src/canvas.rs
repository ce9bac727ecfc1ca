//! Cell grid the backdrop layers paint into before it becomes a widget.

use orbit_core::{CELL_HEIGHT_PX, CELL_WIDTH_PX, Rgb};
use ratatui::{
    style::{Color, Style},
    text::{Line, Span},
};

#[derive(Debug, Clone)]
pub(crate) struct Canvas {
    width: u16,
    height: u16,
    cells: Vec<Option<(char, Rgb)>>,
}

impl Canvas {
    pub(crate) fn new(width: u16, height: u16) -> Self {
        Self {
            width,
            height,
            cells: vec![None; width as usize * height as usize],
        }
    }

    pub(crate) fn width(&self) -> u16 {
        self.width
    }

    pub(crate) fn height(&self) -> u16 {
        self.height
    }

    /// Paint a cell, replacing whatever was there. Out-of-range cells are ignored.
    pub(crate) fn put(&mut self, x: i32, y: i32, ch: char, color: Rgb) {
        if x < 0 || y < 0 || x >= self.width as i32 || y >= self.height as i32 {
            return;
        }
        let idx = y as usize * self.width as usize + x as usize;
        self.cells[idx] = Some((ch, color));
    }

    /// Paint the cell containing a pixel position.
    pub(crate) fn put_px(&mut self, x: f32, y: f32, ch: char, color: Rgb) {
        let cx = (x / CELL_WIDTH_PX).floor() as i32;
        let cy = (y / CELL_HEIGHT_PX).floor() as i32;
        self.put(cx, cy, ch, color);
    }

    #[cfg(test)]
    pub(crate) fn get(&self, x: u16, y: u16) -> Option<(char, Rgb)> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.cells[y as usize * self.width as usize + x as usize]
    }

    /// Number of painted cells.
    #[cfg(test)]
    pub(crate) fn painted(&self) -> usize {
        self.cells.iter().filter(|c| c.is_some()).count()
    }

    pub(crate) fn into_lines(self) -> Vec<Line<'static>> {
        let width = self.width.max(1) as usize;
        self.cells
            .chunks(width)
            .map(|row| {
                let spans: Vec<Span> = row
                    .iter()
                    .map(|cell| match cell {
                        Some((ch, color)) => {
                            Span::styled(ch.to_string(), Style::new().fg(Color::from(*color)))
                        }
                        None => Span::raw(" "),
                    })
                    .collect();
                Line::from(spans)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_put_ignores_out_of_range() {
        let mut canvas = Canvas::new(4, 2);
        canvas.put(-1, 0, '*', Rgb::new(1, 2, 3));
        canvas.put(4, 0, '*', Rgb::new(1, 2, 3));
        canvas.put(0, 2, '*', Rgb::new(1, 2, 3));
        assert_eq!(canvas.painted(), 0);

        canvas.put_px(9.0, 17.0, '*', Rgb::new(1, 2, 3));
        assert_eq!(canvas.get(1, 1), Some(('*', Rgb::new(1, 2, 3))));
        assert_eq!(canvas.into_lines().len(), 2);
    }
}
