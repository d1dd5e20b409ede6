use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

/// Anything text boxes can draw on. The terminal frame is backed by a
/// [`Buffer`]; tests draw on a bare one.
pub trait Surface {
    fn clear_all(&mut self);
    fn put_str(&mut self, x: u16, y: u16, text: &str, highlight: bool)
        -> Result<(), SurfaceError>;
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum SurfaceError {
    #[error("line of width {width} at ({x}, {y}) runs past the right edge")]
    Overflow { x: u16, y: u16, width: usize },
    #[error("position ({x}, {y}) is outside the terminal")]
    OutOfBounds { x: u16, y: u16 },
}

impl Surface for Buffer {
    fn clear_all(&mut self) {
        self.reset();
    }

    fn put_str(
        &mut self,
        x: u16,
        y: u16,
        text: &str,
        highlight: bool,
    ) -> Result<(), SurfaceError> {
        let area = self.area;
        if x < area.left() || x >= area.right() || y < area.top() || y >= area.bottom() {
            return Err(SurfaceError::OutOfBounds { x, y });
        }
        let width = text.width();
        if x as usize + width > area.right() as usize {
            return Err(SurfaceError::Overflow { x, y, width });
        }
        let style = if highlight {
            Style::default().add_modifier(Modifier::REVERSED)
        } else {
            Style::default().remove_modifier(Modifier::REVERSED)
        };
        self.set_string(x, y, text, style);
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Align {
    #[default]
    Left,
    Right,
    Center,
}

/// A rectangular, scrollable block of wrapped text.
///
/// The wrapped lines are recomputed whenever the width or the text changes,
/// and `offset` always stays within `0..=content_height - height`.
#[derive(Debug, Clone, Default)]
pub struct TextBox {
    area: Rect,
    text: String,
    align: Align,
    lines: Vec<String>,
    offset: usize,
    highlighted: bool,
}

impl TextBox {
    pub fn new(text: impl Into<String>, align: Align) -> Self {
        TextBox {
            text: text.into(),
            align,
            ..TextBox::default()
        }
    }

    #[cfg(test)]
    pub fn area(&self) -> Rect {
        self.area
    }

    #[cfg(test)]
    pub fn text(&self) -> &str {
        &self.text
    }

    #[cfg(test)]
    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    #[cfg(test)]
    pub fn content_height(&self) -> usize {
        self.lines.len()
    }

    #[cfg(test)]
    pub fn offset(&self) -> usize {
        self.offset
    }

    #[cfg(test)]
    pub fn is_highlighted(&self) -> bool {
        self.highlighted
    }

    /// Lines currently inside the box, already padded to its width.
    pub fn visible_lines(&self) -> Vec<String> {
        let width = self.area.width as usize;
        self.lines
            .iter()
            .skip(self.offset)
            .take(self.area.height as usize)
            .map(|line| align_line(line, width, self.align))
            .collect()
    }

    pub fn relocate<S: Surface>(&mut self, surface: &mut S, area: Rect) -> Result<(), SurfaceError> {
        self.area = area;
        self.rewrap();
        self.clamp_offset();
        self.render(surface, false)
    }

    pub fn set_text<S: Surface>(
        &mut self,
        surface: &mut S,
        text: impl Into<String>,
        align: Option<Align>,
    ) -> Result<(), SurfaceError> {
        self.text = text.into();
        if let Some(align) = align {
            self.align = align;
        }
        self.offset = 0;
        self.rewrap();
        self.render(surface, false)
    }

    pub fn scroll<S: Surface>(&mut self, surface: &mut S, delta: isize) -> Result<(), SurfaceError> {
        let target = if delta < 0 {
            self.offset.saturating_sub(delta.unsigned_abs())
        } else {
            self.offset.saturating_add(delta as usize)
        };
        self.offset = target.min(self.max_offset());
        self.render(surface, self.highlighted)
    }

    pub fn render<S: Surface>(&mut self, surface: &mut S, highlight: bool) -> Result<(), SurfaceError> {
        self.highlighted = highlight;
        if self.area.width < 1 || self.area.height < 1 {
            return Ok(());
        }
        let blank = " ".repeat(self.area.width as usize);
        for row in 0..self.area.height {
            put_line(surface, self.area.x, self.area.y + row, &blank, highlight)?;
        }
        for (row, line) in self.visible_lines().iter().enumerate() {
            put_line(surface, self.area.x, self.area.y + row as u16, line, highlight)?;
        }
        Ok(())
    }

    fn max_offset(&self) -> usize {
        self.lines.len().saturating_sub(self.area.height as usize)
    }

    fn clamp_offset(&mut self) {
        self.offset = self.offset.min(self.max_offset());
    }

    fn rewrap(&mut self) {
        self.lines = wrap(&self.text, self.area.width as usize);
    }
}

/// The last column of the terminal can refuse a full-width write; drop one
/// character and try again before giving up.
fn put_line<S: Surface>(
    surface: &mut S,
    x: u16,
    y: u16,
    text: &str,
    highlight: bool,
) -> Result<(), SurfaceError> {
    match surface.put_str(x, y, text, highlight) {
        Err(SurfaceError::Overflow { .. }) => {
            let mut shortened = text.to_string();
            shortened.pop();
            surface.put_str(x, y, &shortened, highlight)
        }
        other => other,
    }
}

/// Greedy word wrap, one paragraph per explicit line break.
///
/// Runs of whitespace collapse to a single space, an empty paragraph yields
/// one empty line, and a word only gets split when it is wider than `width`.
pub fn wrap(text: &str, width: usize) -> Vec<String> {
    let mut lines = Vec::new();
    for paragraph in text.split('\n') {
        wrap_paragraph(paragraph, width, &mut lines);
    }
    lines
}

fn wrap_paragraph(paragraph: &str, width: usize, lines: &mut Vec<String>) {
    let width = width.max(1);
    let mut current = String::new();
    let mut current_width = 0;
    let mut emitted = false;
    for word in paragraph.split_whitespace() {
        let word_width = word.width();
        if !current.is_empty() && current_width + 1 + word_width <= width {
            current.push(' ');
            current.push_str(word);
            current_width += 1 + word_width;
            continue;
        }
        if !current.is_empty() {
            lines.push(std::mem::take(&mut current));
            current_width = 0;
            emitted = true;
        }
        if word_width <= width {
            current.push_str(word);
            current_width = word_width;
            continue;
        }
        for ch in word.chars() {
            let ch_width = ch.width().unwrap_or(0);
            if !current.is_empty() && current_width + ch_width > width {
                lines.push(std::mem::take(&mut current));
                current_width = 0;
                emitted = true;
            }
            current.push(ch);
            current_width += ch_width;
        }
    }
    if !current.is_empty() || !emitted {
        lines.push(current);
    }
}

/// Pads `line` to exactly `width` columns.
pub fn align_line(line: &str, width: usize, align: Align) -> String {
    let pad = width.saturating_sub(line.width());
    let (left, right) = match align {
        Align::Left => (0, pad),
        Align::Right => (pad, 0),
        Align::Center => (pad / 2, pad - pad / 2),
    };
    format!("{}{}{}", " ".repeat(left), line, " ".repeat(right))
}
