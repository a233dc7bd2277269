//! Various utilities.

use druid::{widget::Controller, Cursor, Widget};

/// Returns all the `(row, column)` pairs of a `rows` x `columns` grid, row by row.
pub fn range2d(rows: usize, columns: usize) -> Vec<(usize, usize)> {
    xrange2d(rows, columns).collect()
}

/// Lazily iterates over the `(row, column)` pairs of a `rows` x `columns` grid, row by row.
pub fn xrange2d(rows: usize, columns: usize) -> Range2d {
    Range2d {
        rows,
        columns,
        next: 0,
    }
}

/// An iterator over the cells of a grid. See [`xrange2d`].
#[derive(Clone, Debug)]
pub struct Range2d {
    /// The number of rows.
    rows: usize,
    /// The number of columns.
    columns: usize,
    /// The flat index of the next cell.
    next: usize,
}

impl Iterator for Range2d {
    type Item = (usize, usize);

    fn next(&mut self) -> Option<Self::Item> {
        if self.columns == 0 || self.next >= self.rows * self.columns {
            return None;
        }

        let cell = (self.next / self.columns, self.next % self.columns);
        self.next += 1;
        Some(cell)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = (self.rows * self.columns).saturating_sub(self.next);
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for Range2d {}

/// A controller making any widget look like a button.
pub struct ButtonController;

impl<T, W: Widget<T>> Controller<T, W> for ButtonController {
    fn event(
        &mut self,
        child: &mut W,
        ctx: &mut druid::EventCtx,
        event: &druid::Event,
        data: &mut T,
        env: &druid::Env,
    ) {
        ctx.set_cursor(&Cursor::Pointer);
        child.event(ctx, event, data, env);
    }
}
