use crate::datecell::{DateCell, BULLET};
use crate::layout::Geometry;
use crate::remind::{date_key, ReminderSource, SourceError};
use crate::textbox::{Align, Surface, SurfaceError, TextBox};
use chrono::{Datelike, Duration as ChronoDuration, NaiveDate};
use ratatui::layout::Rect;
use std::collections::HashMap;
use tracing::{debug, info, warn};

pub const CELLS: usize = 42;
pub const WEEK_ROWS: usize = 6;

pub const WEEKDAYS: [&str; 7] = [
    "Sunday",
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
];

pub const STATUS_TEXT: &str = "l/h:±1d, j/k:±1w, f/b:±1m, n/p:±1y, t:today, r:reload, \
    x:redraw, q:quit, scroll info area with , (down) and . (up)";

#[derive(thiserror::Error, Debug)]
pub enum CalendarError {
    #[error(transparent)]
    Source(#[from] SourceError),
    #[error("drawing failed: {0}")]
    Surface(#[from] SurfaceError),
}

/// The month view: 42 day cells starting on the Sunday on or before the
/// 1st, the selected date, and the reminders loaded for the displayed month.
///
/// Exactly one cell is highlighted once a date has been set, and it is the
/// cell whose date is `selected`.
pub struct CalendarModel<R> {
    source: R,
    selected: NaiveDate,
    loaded: Option<(i32, u32)>,
    reminders: HashMap<String, Vec<String>>,
    header: TextBox,
    notes: TextBox,
    status: TextBox,
    weekdays: Vec<TextBox>,
    week_numbers: Vec<TextBox>,
    days: Vec<DateCell>,
}

impl<R: ReminderSource> CalendarModel<R> {
    pub fn new(source: R, today: NaiveDate) -> Self {
        CalendarModel {
            source,
            selected: today,
            loaded: None,
            reminders: HashMap::new(),
            header: TextBox::new("", Align::Center),
            notes: TextBox::new("", Align::Left),
            status: TextBox::new(STATUS_TEXT, Align::Left),
            weekdays: WEEKDAYS
                .iter()
                .map(|day| TextBox::new(*day, Align::Center))
                .collect(),
            week_numbers: (0..WEEK_ROWS)
                .map(|_| TextBox::new("", Align::Right))
                .collect(),
            days: (0..CELLS).map(|_| DateCell::new(today)).collect(),
        }
    }

    #[cfg(test)]
    pub fn selected(&self) -> NaiveDate {
        self.selected
    }

    #[cfg(test)]
    pub fn displayed_month(&self) -> Option<(i32, u32)> {
        self.loaded
    }

    #[cfg(test)]
    pub fn days(&self) -> &[DateCell] {
        &self.days
    }

    #[cfg(test)]
    pub fn header(&self) -> &TextBox {
        &self.header
    }

    #[cfg(test)]
    pub fn notes(&self) -> &TextBox {
        &self.notes
    }

    #[cfg(test)]
    pub fn week_numbers(&self) -> &[TextBox] {
        &self.week_numbers
    }

    #[cfg(test)]
    pub fn source(&self) -> &R {
        &self.source
    }

    /// Moves every box to its place in `geometry`, or collapses them all
    /// when the terminal is too small to hold the grid.
    pub fn relocate<S: Surface>(
        &mut self,
        surface: &mut S,
        geometry: Option<&Geometry>,
    ) -> Result<(), SurfaceError> {
        let rect = |pick: &dyn Fn(&Geometry) -> Rect| geometry.map(pick).unwrap_or_default();
        self.header.relocate(surface, rect(&|g| g.header()))?;
        self.notes.relocate(surface, rect(&|g| g.notes()))?;
        let status = geometry.and_then(Geometry::status).unwrap_or_default();
        self.status.relocate(surface, status)?;
        for (i, weekday) in self.weekdays.iter_mut().enumerate() {
            weekday.relocate(surface, rect(&|g| g.weekday(i)))?;
        }
        for (i, week) in self.week_numbers.iter_mut().enumerate() {
            week.relocate(surface, rect(&|g| g.week_number(i)))?;
        }
        for (i, day) in self.days.iter_mut().enumerate() {
            day.relocate(surface, rect(&|g| g.day(i)))?;
        }
        Ok(())
    }

    /// Selects `date`, loading reminders first if its month is not the one
    /// on display. Nothing changes when loading fails, or when the six weeks
    /// around `date` fall outside the representable calendar.
    pub fn set_date<S: Surface>(
        &mut self,
        surface: &mut S,
        date: NaiveDate,
    ) -> Result<(), CalendarError> {
        let Some(first_sunday) = first_sunday(date) else {
            debug!(%date, "date window out of range");
            return Ok(());
        };
        let month = (date.year(), date.month());
        if self.loaded != Some(month) {
            self.load_month(surface, date, first_sunday)?;
        } else {
            let previous = cell_index(first_sunday, self.selected);
            self.days[previous].render(surface, false)?;
        }
        let index = cell_index(first_sunday, date);
        let mut notes = vec![date.format("%a, %b %d, %y").to_string()];
        notes.extend(
            self.days[index]
                .reminders()
                .iter()
                .map(|r| format!("{BULLET}{r}")),
        );
        self.notes.set_text(surface, notes.join("\n\n"), None)?;
        self.selected = date;
        self.days[index].render(surface, true)?;
        Ok(())
    }

    fn load_month<S: Surface>(
        &mut self,
        surface: &mut S,
        date: NaiveDate,
        first_sunday: NaiveDate,
    ) -> Result<(), CalendarError> {
        let records = match self.source.fetch_month(date.month(), date.year()) {
            Ok(records) => records,
            Err(err) => {
                warn!(
                    month = date.month(),
                    year = date.year(),
                    error = %err,
                    "loading reminders failed"
                );
                return Err(err.into());
            }
        };
        info!(
            month = date.month(),
            year = date.year(),
            records = records.len(),
            "loaded reminders"
        );
        self.reminders.clear();
        for record in records {
            self.reminders
                .entry(record.date_key)
                .or_default()
                .push(record.description);
        }
        self.loaded = Some((date.year(), date.month()));
        for (week, label) in self.week_numbers.iter_mut().enumerate() {
            let sunday = first_sunday + ChronoDuration::weeks(week as i64);
            label.set_text(surface, sunday.iso_week().week().to_string(), None)?;
        }
        self.header
            .set_text(surface, date.format("%B %Y").to_string(), None)?;
        for (i, cell) in self.days.iter_mut().enumerate() {
            let day = first_sunday + ChronoDuration::days(i as i64);
            let reminders = self.reminders.get(&date_key(day)).cloned().unwrap_or_default();
            cell.set_reminders(surface, day, reminders)?;
        }
        Ok(())
    }

    pub fn jump_days<S: Surface>(&mut self, surface: &mut S, days: i64) -> Result<(), CalendarError> {
        match self.selected.checked_add_signed(ChronoDuration::days(days)) {
            Some(date) => self.set_date(surface, date),
            None => Ok(()),
        }
    }

    pub fn jump_months<S: Surface>(
        &mut self,
        surface: &mut S,
        months: i32,
    ) -> Result<(), CalendarError> {
        match shift_months(self.selected, months) {
            Some(date) => self.set_date(surface, date),
            None => Ok(()),
        }
    }

    pub fn jump_years<S: Surface>(
        &mut self,
        surface: &mut S,
        years: i32,
    ) -> Result<(), CalendarError> {
        match shift_years(self.selected, years) {
            Some(date) => self.set_date(surface, date),
            None => Ok(()),
        }
    }

    pub fn today<S: Surface>(&mut self, surface: &mut S, today: NaiveDate) -> Result<(), CalendarError> {
        self.set_date(surface, today)
    }

    /// Fetches the displayed month again even though it has not changed.
    pub fn reload<S: Surface>(&mut self, surface: &mut S) -> Result<(), CalendarError> {
        debug!(selected = %self.selected, "reloading reminders");
        let loaded = self.loaded.take();
        let result = self.set_date(surface, self.selected);
        if result.is_err() {
            self.loaded = loaded;
        }
        result
    }

    /// Re-renders the current month from the cache after a relocate.
    pub fn refresh<S: Surface>(&mut self, surface: &mut S) -> Result<(), CalendarError> {
        self.set_date(surface, self.selected)
    }

    pub fn scroll_notes<S: Surface>(&mut self, surface: &mut S, lines: isize) -> Result<(), SurfaceError> {
        self.notes.scroll(surface, lines)
    }
}

/// The Sunday on or before the 1st of `date`'s month, provided all 42 days
/// starting there exist.
pub fn first_sunday(date: NaiveDate) -> Option<NaiveDate> {
    let first = date.with_day(1)?;
    let sunday = first.checked_sub_signed(ChronoDuration::days(i64::from(
        first.weekday().num_days_from_sunday(),
    )))?;
    sunday.checked_add_signed(ChronoDuration::days(CELLS as i64 - 1))?;
    Some(sunday)
}

fn cell_index(first_sunday: NaiveDate, date: NaiveDate) -> usize {
    (date - first_sunday).num_days() as usize
}

/// Same day `months` months away, falling back to the last day of the
/// target month when it is too short.
pub fn shift_months(date: NaiveDate, months: i32) -> Option<NaiveDate> {
    let index = date.month0() as i32 + months;
    let month = index.rem_euclid(12) as u32 + 1;
    let year = date.year() + index.div_euclid(12);
    NaiveDate::from_ymd_opt(year, month, date.day())
        .or_else(|| last_day_of_month(year, month))
}

/// Same day `years` years away; Feb 29 becomes Feb 28 outside leap years.
pub fn shift_years(date: NaiveDate, years: i32) -> Option<NaiveDate> {
    let year = date.year() + years;
    NaiveDate::from_ymd_opt(year, date.month(), date.day())
        .or_else(|| NaiveDate::from_ymd_opt(year, date.month(), 28))
}

fn last_day_of_month(year: i32, month: u32) -> Option<NaiveDate> {
    let next = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)
    };
    next?.pred_opt()
}
