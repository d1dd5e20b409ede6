use crate::textbox::{Align, Surface, SurfaceError, TextBox};
use chrono::{Datelike, NaiveDate};
use ratatui::layout::Rect;

pub const BULLET: char = '•';

/// One day of the calendar grid: the day number, a reminder count and a
/// bullet per reminder. The displayed text is always derived from `date`
/// and `reminders`.
#[derive(Debug, Clone)]
pub struct DateCell {
    date: NaiveDate,
    reminders: Vec<String>,
    text_box: TextBox,
}

impl DateCell {
    pub fn new(date: NaiveDate) -> Self {
        let mut cell = DateCell {
            date,
            reminders: Vec::new(),
            text_box: TextBox::default(),
        };
        cell.text_box = TextBox::new(cell.text(), Align::Left);
        cell
    }

    #[cfg(test)]
    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub fn reminders(&self) -> &[String] {
        &self.reminders
    }

    #[cfg(test)]
    pub fn text_box(&self) -> &TextBox {
        &self.text_box
    }

    #[cfg(test)]
    pub fn is_highlighted(&self) -> bool {
        self.text_box.is_highlighted()
    }

    pub fn text(&self) -> String {
        let mut lines = vec![self.date.day().to_string()];
        if !self.reminders.is_empty() {
            lines[0].push_str(&format!(" ({})", self.reminders.len()));
        }
        lines.extend(self.reminders.iter().map(|r| format!("{BULLET}{r}")));
        lines.join("\n")
    }

    pub fn set_reminders<S: Surface>(
        &mut self,
        surface: &mut S,
        date: NaiveDate,
        reminders: Vec<String>,
    ) -> Result<(), SurfaceError> {
        self.date = date;
        self.reminders = reminders;
        let text = self.text();
        self.text_box.set_text(surface, text, None)
    }

    pub fn relocate<S: Surface>(&mut self, surface: &mut S, area: Rect) -> Result<(), SurfaceError> {
        self.text_box.relocate(surface, area)
    }

    pub fn render<S: Surface>(&mut self, surface: &mut S, highlight: bool) -> Result<(), SurfaceError> {
        self.text_box.render(surface, highlight)
    }
}
