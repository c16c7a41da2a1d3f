pub mod format;
pub mod history;

pub use history::{HistoryBuffer, DEFAULT_HISTORY_CAPACITY};

use crate::types::{AggregateStats, TransferFile};
use log::debug;

/// Chart/table drawing supplied by the hosting view.
///
/// Implementations typically hold native drawing contexts; the presenter
/// releases them through [`RenderSurface::teardown`], never by relying on
/// drop order.
pub trait RenderSurface: Send {
    fn render_speed_series(&mut self, samples: &[f64]);
    fn render_progress_series(&mut self, samples: &[f64]);
    fn render_transfers(&mut self, rows: &[TransferFile]);
    fn teardown(&mut self);
}

/// Sort column for the transfer table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortKey {
    Name,
    Bytes,
    Size,
    Speed,
    Eta,
}

/// Sortable, name-filterable view over the current in-flight files
#[derive(Debug, Clone)]
pub struct TransferTable {
    rows: Vec<TransferFile>,
    sort_key: SortKey,
    ascending: bool,
    filter: Option<String>,
}

impl TransferTable {
    pub fn new() -> Self {
        Self {
            rows: Vec::new(),
            sort_key: SortKey::Name,
            ascending: true,
            filter: None,
        }
    }

    /// Replace all rows; source data is a full snapshot each tick
    pub fn set_rows(&mut self, rows: Vec<TransferFile>) {
        self.rows = rows;
    }

    pub fn set_sort(&mut self, key: SortKey, ascending: bool) {
        self.sort_key = key;
        self.ascending = ascending;
    }

    /// Case-insensitive substring filter on the file name
    pub fn set_filter(&mut self, filter: Option<String>) {
        self.filter = filter.map(|f| f.to_lowercase());
    }

    pub fn clear(&mut self) {
        self.rows.clear();
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Rows after filtering and sorting
    pub fn view(&self) -> Vec<TransferFile> {
        let mut rows: Vec<TransferFile> = match &self.filter {
            Some(needle) => self
                .rows
                .iter()
                .filter(|r| r.name.to_lowercase().contains(needle))
                .cloned()
                .collect(),
            None => self.rows.clone(),
        };

        rows.sort_by(|a, b| {
            let ord = match self.sort_key {
                SortKey::Name => a.name.cmp(&b.name),
                SortKey::Bytes => a.bytes.cmp(&b.bytes),
                SortKey::Size => a.size.cmp(&b.size),
                SortKey::Speed => a.speed.total_cmp(&b.speed),
                // Unknown ETA sorts after every known one
                SortKey::Eta => a
                    .eta
                    .unwrap_or(f64::INFINITY)
                    .total_cmp(&b.eta.unwrap_or(f64::INFINITY)),
            };
            if self.ascending {
                ord
            } else {
                ord.reverse()
            }
        });

        rows
    }
}

impl Default for TransferTable {
    fn default() -> Self {
        Self::new()
    }
}

/// Pushes aggregated values into the rendering layer.
///
/// Tolerates having no surface attached (updates are buffered in the
/// histories and table, rendering is a no-op) and releases the surface
/// deterministically on [`Presenter::teardown`].
pub struct Presenter {
    surface: Option<Box<dyn RenderSurface>>,
    speed_history: HistoryBuffer,
    progress_history: HistoryBuffer,
    table: TransferTable,
    latest: Option<AggregateStats>,
}

impl Presenter {
    pub fn new(history_capacity: usize) -> Self {
        Self {
            surface: None,
            speed_history: HistoryBuffer::new(history_capacity),
            progress_history: HistoryBuffer::new(history_capacity),
            table: TransferTable::new(),
            latest: None,
        }
    }

    /// Attach the host's rendering surface, tearing down any previous one
    pub fn attach(&mut self, surface: Box<dyn RenderSurface>) {
        self.teardown();
        self.surface = Some(surface);
        self.redraw();
    }

    /// Record one tick's aggregate and file rows, then redraw
    pub fn publish(&mut self, stats: &AggregateStats, files: Vec<TransferFile>) {
        self.speed_history.append(stats.speed);
        self.progress_history.append(f64::from(stats.percentage));
        self.table.set_rows(files);
        self.latest = Some(stats.clone());
        self.redraw();
    }

    fn redraw(&mut self) {
        let Some(surface) = self.surface.as_mut() else {
            return;
        };
        surface.render_speed_series(&self.speed_history.to_vec());
        surface.render_progress_series(&self.progress_history.to_vec());
        surface.render_transfers(&self.table.view());
    }

    /// Discard history, rows and the latest aggregate; called when the
    /// monitored remote changes so a new selection never shows stale data
    pub fn reset(&mut self) {
        self.speed_history.reset();
        self.progress_history.reset();
        self.table.clear();
        self.latest = None;
        self.redraw();
    }

    /// Release the rendering surface. Idempotent.
    pub fn teardown(&mut self) {
        if let Some(mut surface) = self.surface.take() {
            debug!("Tearing down rendering surface");
            surface.teardown();
        }
    }

    pub fn latest(&self) -> Option<&AggregateStats> {
        self.latest.as_ref()
    }

    pub fn speed_history(&self) -> &HistoryBuffer {
        &self.speed_history
    }

    pub fn progress_history(&self) -> &HistoryBuffer {
        &self.progress_history
    }

    pub fn table(&self) -> &TransferTable {
        &self.table
    }

    pub fn table_mut(&mut self) -> &mut TransferTable {
        &mut self.table
    }
}

impl Drop for Presenter {
    fn drop(&mut self) {
        self.teardown();
    }
}
