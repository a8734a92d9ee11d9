use paperboard_core::Paper;

/// Commands sent from the TUI to the backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendCommand {
    /// Fetch `index.json`.
    LoadIndex,
    /// Fetch these month shards, one task per month.
    FetchMonths(Vec<String>),
}

/// Events flowing from the backend fetch tasks to the TUI.
#[derive(Debug, Clone)]
pub enum BackendEvent {
    IndexLoaded(Result<Vec<String>, String>),
    MonthLoaded {
        month: String,
        result: Result<Vec<Paper>, String>,
    },
}
