use std::collections::BTreeMap;

use chrono::{Datelike, Duration, Months, NaiveDate};

use super::task::Task;

/// The month view always renders 6 fixed weeks, even when the month fits in
/// 4 or 5, so the layout never jumps between months.
pub const GRID_CELLS: usize = 42;

/// One of the 42 day-slots in the rendered month view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridCell {
    pub date: NaiveDate,
    /// Day outside the displayed month (leading/trailing overflow).
    pub muted: bool,
    /// The day's bucket is non-empty (done tasks count — history stays
    /// visible after completion).
    pub has_tasks: bool,
    pub is_today: bool,
    pub is_selected: bool,
}

impl GridCell {
    pub fn day(&self) -> u32 {
        self.date.day()
    }
}

/// Bucket tasks by calendar day. Undated tasks never land in a bucket and
/// therefore never decorate a cell.
pub fn bucket_by_date(tasks: &[Task]) -> BTreeMap<NaiveDate, Vec<&Task>> {
    let mut buckets: BTreeMap<NaiveDate, Vec<&Task>> = BTreeMap::new();
    for task in tasks {
        if let Some(date) = task.date {
            buckets.entry(date).or_default().push(task);
        }
    }
    buckets
}

/// Build the fixed 42-cell grid for the month starting at `first_of_month`.
///
/// The first row starts on the Monday on or before the first of the month
/// (Monday-origin offset of the first's weekday); remaining cells run
/// through the trailing days of the previous month and the leading days of
/// the next. The caller is responsible for always passing a first-of-month
/// date — the engine does not validate it.
pub fn month_grid(
    first_of_month: NaiveDate,
    buckets: &BTreeMap<NaiveDate, Vec<&Task>>,
    today: NaiveDate,
    selected: NaiveDate,
) -> Vec<GridCell> {
    let offset = first_of_month.weekday().num_days_from_monday() as i64;
    let start = first_of_month - Duration::days(offset);

    (0..GRID_CELLS as i64)
        .map(|i| {
            let date = start + Duration::days(i);
            GridCell {
                date,
                muted: date.month() != first_of_month.month()
                    || date.year() != first_of_month.year(),
                has_tasks: buckets.get(&date).is_some_and(|b| !b.is_empty()),
                is_today: date == today,
                is_selected: date == selected,
            }
        })
        .collect()
}

/// The displayed month, navigated one month at a time. Always holds a valid
/// first-of-month date, which is the grid engine's caller contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonthCursor {
    first: NaiveDate,
}

impl Default for MonthCursor {
    fn default() -> Self {
        Self::containing(chrono::Local::now().date_naive())
    }
}

impl MonthCursor {
    pub fn containing(date: NaiveDate) -> Self {
        let first = NaiveDate::from_ymd_opt(date.year(), date.month(), 1).unwrap_or(date);
        Self { first }
    }

    pub fn first(&self) -> NaiveDate {
        self.first
    }

    pub fn prev(&mut self) {
        self.first = self
            .first
            .checked_sub_months(Months::new(1))
            .unwrap_or(self.first);
    }

    pub fn next(&mut self) {
        self.first = self
            .first
            .checked_add_months(Months::new(1))
            .unwrap_or(self.first);
    }

    /// Header label, e.g. "March 2024".
    pub fn label(&self) -> String {
        self.first.format("%B %Y").to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn task_on(day: Option<NaiveDate>, done: bool) -> Task {
        Task {
            id: Uuid::new_v4(),
            subject: None,
            name: "t".to_string(),
            memo: None,
            date: day,
            done,
            created_at: 0,
        }
    }

    #[test]
    fn grid_is_always_42_cells() {
        let empty = BTreeMap::new();
        for (y, m) in [(2024, 2), (2024, 3), (2025, 2), (2024, 12), (2026, 6)] {
            let first = date(y, m, 1);
            let grid = month_grid(first, &empty, date(2024, 1, 1), date(2024, 1, 1));
            assert_eq!(grid.len(), GRID_CELLS, "{y}-{m}");
        }
    }

    #[test]
    fn march_2024_has_4_leading_and_7_trailing_muted_cells() {
        // March 1 2024 is a Friday: Monday-origin offset 4.
        let empty = BTreeMap::new();
        let grid = month_grid(date(2024, 3, 1), &empty, date(2024, 3, 15), date(2024, 3, 15));
        let leading = grid.iter().take_while(|c| c.muted).count();
        let trailing = grid.iter().rev().take_while(|c| c.muted).count();
        assert_eq!(leading, 4);
        assert_eq!(trailing, 7);
        assert_eq!(grid.iter().filter(|c| !c.muted).count(), 31);
        assert_eq!(grid[4].date, date(2024, 3, 1));
        assert_eq!(grid[0].date, date(2024, 2, 26));
    }

    #[test]
    fn short_month_still_renders_6_weeks() {
        // February 2027 starts on a Monday and has 28 days: exactly 4 weeks
        // of real content, padded with two full trailing weeks.
        let empty = BTreeMap::new();
        let grid = month_grid(date(2027, 2, 1), &empty, date(2027, 2, 1), date(2027, 2, 1));
        assert_eq!(grid.len(), GRID_CELLS);
        assert_eq!(grid.iter().take_while(|c| c.muted).count(), 0);
        assert_eq!(grid.iter().rev().take_while(|c| c.muted).count(), 14);
    }

    #[test]
    fn exactly_one_today_cell_when_in_span() {
        let empty = BTreeMap::new();
        let grid = month_grid(date(2024, 3, 1), &empty, date(2024, 3, 5), date(2024, 3, 1));
        assert_eq!(grid.iter().filter(|c| c.is_today).count(), 1);
        // A leading cell from the previous month can still be today.
        let grid = month_grid(date(2024, 3, 1), &empty, date(2024, 2, 27), date(2024, 3, 1));
        assert_eq!(grid.iter().filter(|c| c.is_today).count(), 1);
    }

    #[test]
    fn zero_today_cells_when_out_of_span() {
        let empty = BTreeMap::new();
        let grid = month_grid(date(2024, 3, 1), &empty, date(2024, 7, 1), date(2024, 3, 1));
        assert_eq!(grid.iter().filter(|c| c.is_today).count(), 0);
    }

    #[test]
    fn buckets_include_done_and_skip_undated() {
        let d = date(2024, 3, 5);
        let tasks = vec![
            task_on(Some(d), false),
            task_on(Some(d), true),
            task_on(None, false),
        ];
        let buckets = bucket_by_date(&tasks);
        assert_eq!(buckets.len(), 1);
        assert_eq!(buckets[&d].len(), 2);
    }

    #[test]
    fn has_tasks_marks_only_bucketed_cells() {
        let d = date(2024, 3, 5);
        let tasks = vec![task_on(Some(d), true)];
        let buckets = bucket_by_date(&tasks);
        let grid = month_grid(date(2024, 3, 1), &buckets, date(2024, 3, 1), date(2024, 3, 1));
        let marked: Vec<_> = grid.iter().filter(|c| c.has_tasks).collect();
        assert_eq!(marked.len(), 1);
        assert_eq!(marked[0].date, d);
    }

    #[test]
    fn cursor_wraps_across_year_boundaries() {
        let mut cursor = MonthCursor::containing(date(2024, 1, 15));
        assert_eq!(cursor.first(), date(2024, 1, 1));
        cursor.prev();
        assert_eq!(cursor.first(), date(2023, 12, 1));
        cursor.next();
        cursor.next();
        assert_eq!(cursor.first(), date(2024, 2, 1));
        assert_eq!(cursor.label(), "February 2024");
    }
}
