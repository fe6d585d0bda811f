use crate::ingest::Summary;

/// Progress notifications emitted during an import.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImportEvent {
    Started,
    /// A batch was stored; `processed` counts every record read so far,
    /// including skipped and duplicate ones.
    Flushed { processed: u64 },
    /// Something went wrong that does not fail the import.
    Warning(String),
    Failed,
    Complete(Summary),
}

/// Receives [`ImportEvent`]s as the import progresses.
///
/// Implemented for any `FnMut(ImportEvent)`, so a closure is usually enough.
pub trait Reporter {
    fn report(&mut self, event: ImportEvent);
}

impl<F> Reporter for F
where
    F: FnMut(ImportEvent),
{
    fn report(&mut self, event: ImportEvent) {
        self(event)
    }
}

/// Reporter that ignores everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct Silent;

impl Reporter for Silent {
    fn report(&mut self, _event: ImportEvent) {}
}
