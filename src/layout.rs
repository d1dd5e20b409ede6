use crate::textbox::{Surface, SurfaceError};
use ratatui::layout::Rect;
use ratatui::symbols::line;

pub const DAYS_PER_WEEK: u16 = 7;
pub const WEEKS: u16 = 6;

/// Rows above the first week: header, rule, weekday names.
const HEADER_ROWS: u16 = 3;

/// Positions of every box on screen for one terminal size.
///
/// The day grid takes seven columns of `cell_width` plus a one-column rule
/// before each, with the week-number column at x = 0. Whatever remains to
/// the right of the last divider belongs to the notes panel, and whatever
/// remains below the sixth week belongs to the status bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Geometry {
    pub cols: u16,
    pub rows: u16,
    pub cell_width: u16,
    pub cell_height: u16,
    pub notes_width: u16,
    pub notes_border: u16,
    pub status_height: Option<u16>,
}

impl Geometry {
    /// Returns `None` when the terminal cannot fit a single character per
    /// day cell.
    pub fn compute(cols: u16, rows: u16) -> Option<Geometry> {
        let (c, r) = (i32::from(cols), i32::from(rows));
        let cell_width = (c - 8).div_euclid(9);
        let cell_height = (r - 9).div_euclid(6);
        if cell_width < 1 || cell_height < 1 {
            return None;
        }
        let notes_width = c - (cell_width + 1) * 7 - 2;
        let notes_border = c - notes_width - 1;
        let status_height = r - 6 * (cell_height + 1) - 4;
        Some(Geometry {
            cols,
            rows,
            cell_width: cell_width as u16,
            cell_height: cell_height as u16,
            notes_width: notes_width as u16,
            notes_border: notes_border as u16,
            status_height: u16::try_from(status_height).ok(),
        })
    }

    pub fn header(&self) -> Rect {
        Rect::new(0, 0, self.notes_border, 1)
    }

    pub fn notes(&self) -> Rect {
        Rect::new(self.notes_border + 1, 0, self.notes_width, self.rows)
    }

    pub fn status(&self) -> Option<Rect> {
        self.status_height
            .map(|height| Rect::new(0, self.rows - height, self.notes_border, height))
    }

    pub fn weekday(&self, index: usize) -> Rect {
        Rect::new(self.column_x(index as u16) + 1, 2, self.cell_width, 1)
    }

    pub fn week_number(&self, week: usize) -> Rect {
        Rect::new(0, self.week_y(week as u16) + 1, 1, self.cell_height)
    }

    pub fn day(&self, index: usize) -> Rect {
        let index = index as u16;
        Rect::new(
            self.column_x(index % DAYS_PER_WEEK) + 1,
            self.week_y(index / DAYS_PER_WEEK) + 1,
            self.cell_width,
            self.cell_height,
        )
    }

    /// x of the rule to the left of weekday column `column`.
    fn column_x(&self, column: u16) -> u16 {
        column * (self.cell_width + 1) + 1
    }

    /// y of the rule above week `week`.
    fn week_y(&self, week: u16) -> u16 {
        week * (self.cell_height + 1) + HEADER_ROWS
    }

    /// Wipes the surface and draws every separator line.
    pub fn draw_grid<S: Surface>(&self, surface: &mut S) -> Result<(), SurfaceError> {
        surface.clear_all();
        vline(surface, self.notes_border, 0, self.rows, line::VERTICAL)?;
        hline(surface, 0, 1, self.notes_border)?;
        surface.put_str(self.notes_border, 1, line::VERTICAL_LEFT, false)?;
        for column in 0..DAYS_PER_WEEK {
            let x = self.column_x(column);
            surface.put_str(x, 1, line::HORIZONTAL_DOWN, false)?;
            surface.put_str(x, 2, line::VERTICAL, false)?;
        }
        for week in 0..WEEKS {
            let y = self.week_y(week);
            hline(surface, 0, y, self.notes_border)?;
            surface.put_str(self.notes_border, y, line::VERTICAL_LEFT, false)?;
            for column in 0..DAYS_PER_WEEK {
                let x = self.column_x(column);
                vline(surface, x, y + 1, self.cell_height, line::VERTICAL)?;
                surface.put_str(x, y, line::CROSS, false)?;
            }
        }
        if let Some(height) = self.status_height {
            let y = self.rows - 1 - height;
            hline(surface, 0, y, self.notes_border)?;
            for column in 0..DAYS_PER_WEEK {
                surface.put_str(self.column_x(column), y, line::HORIZONTAL_UP, false)?;
            }
            surface.put_str(self.notes_border, y, line::VERTICAL_LEFT, false)?;
        }
        Ok(())
    }
}

fn hline<S: Surface>(surface: &mut S, x: u16, y: u16, len: u16) -> Result<(), SurfaceError> {
    if len == 0 {
        return Ok(());
    }
    surface.put_str(x, y, &line::HORIZONTAL.repeat(len as usize), false)
}

fn vline<S: Surface>(
    surface: &mut S,
    x: u16,
    y: u16,
    len: u16,
    symbol: &str,
) -> Result<(), SurfaceError> {
    for row in y..y + len {
        surface.put_str(x, row, symbol, false)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::buffer::Buffer;

    fn all_rects(g: &Geometry) -> Vec<(String, Rect)> {
        let mut rects = vec![("header".to_string(), g.header()), ("notes".to_string(), g.notes())];
        if let Some(status) = g.status() {
            rects.push(("status".into(), status));
        }
        for i in 0..7 {
            rects.push((format!("weekday {i}"), g.weekday(i)));
        }
        for i in 0..6 {
            rects.push((format!("week {i}"), g.week_number(i)));
        }
        for i in 0..42 {
            rects.push((format!("day {i}"), g.day(i)));
        }
        rects
    }

    #[test]
    fn computes_partition_for_common_size() {
        let g = Geometry::compute(80, 24).unwrap();
        assert_eq!(g.cell_width, 8);
        assert_eq!(g.cell_height, 2);
        assert_eq!(g.notes_width, 80 - 9 * 7 - 2);
        assert_eq!(g.notes_border, 64);
        assert_eq!(g.status_height, Some(24 - 18 - 4));
        assert_eq!(g.day(0), Rect::new(2, 4, 8, 2));
        assert_eq!(g.day(41), Rect::new(56, 19, 8, 2));
        assert_eq!(g.notes(), Rect::new(65, 0, 15, 24));
        assert_eq!(g.status(), Some(Rect::new(0, 22, 64, 2)));
    }

    #[test]
    fn negative_status_height_drops_the_status_bar() {
        // (15 - 9) / 6 = 1 leaves 15 - 12 - 4 = -1 rows for the status bar.
        let g = Geometry::compute(40, 15).unwrap();
        assert_eq!(g.status_height, None);
        assert_eq!(g.status(), None);
    }

    #[test]
    fn too_small_terminal_has_no_geometry() {
        assert_eq!(Geometry::compute(16, 40), None);
        assert_eq!(Geometry::compute(80, 14), None);
        assert_eq!(Geometry::compute(0, 0), None);
        assert!(Geometry::compute(17, 15).is_some());
    }

    #[test]
    fn boxes_never_overlap_and_stay_on_screen() {
        for cols in (17..160).step_by(7) {
            for rows in (15..70).step_by(5) {
                let g = Geometry::compute(cols, rows).unwrap();
                let screen = Rect::new(0, 0, cols, rows);
                let rects = all_rects(&g);
                for (name, rect) in &rects {
                    assert_eq!(screen.union(*rect), screen, "{name} off screen at {cols}x{rows}");
                }
                for (i, (a_name, a)) in rects.iter().enumerate() {
                    for (b_name, b) in rects.iter().skip(i + 1) {
                        if a.area() == 0 || b.area() == 0 {
                            continue;
                        }
                        assert!(
                            !a.intersects(*b),
                            "{a_name} overlaps {b_name} at {cols}x{rows}"
                        );
                    }
                }
            }
        }
    }

    #[test]
    fn grid_fits_every_supported_size() {
        for cols in [17, 40, 80, 123] {
            for rows in [15, 16, 24, 51] {
                let g = Geometry::compute(cols, rows).unwrap();
                let mut buf = Buffer::empty(Rect::new(0, 0, cols, rows));
                g.draw_grid(&mut buf).unwrap();
            }
        }
    }

    #[test]
    fn grid_draws_dividers() {
        let g = Geometry::compute(80, 24).unwrap();
        let mut buf = Buffer::empty(Rect::new(0, 0, 80, 24));
        g.draw_grid(&mut buf).unwrap();
        assert_eq!(buf.get(64, 0).symbol(), line::VERTICAL);
        assert_eq!(buf.get(64, 1).symbol(), line::VERTICAL_LEFT);
        assert_eq!(buf.get(1, 1).symbol(), line::HORIZONTAL_DOWN);
        assert_eq!(buf.get(1, 3).symbol(), line::CROSS);
        assert_eq!(buf.get(0, 3).symbol(), line::HORIZONTAL);
        assert_eq!(buf.get(10, 4).symbol(), line::VERTICAL);
        assert_eq!(buf.get(10, 21).symbol(), line::HORIZONTAL_UP);
    }
}
