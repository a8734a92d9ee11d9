use super::App;
use crate::tui_event::BackendEvent;

impl App {
    /// Fold a backend event into the session.
    pub fn handle_backend_event(&mut self, event: BackendEvent) {
        match event {
            BackendEvent::IndexLoaded(Ok(months)) => {
                self.index_loaded = true;
                let missing = self.session.apply_index(months);
                self.request_months(missing);
                self.clamp_cursor();
            }
            BackendEvent::IndexLoaded(Err(e)) => {
                self.index_loaded = true;
                self.set_alert("Catalog unavailable", format!("Could not load the month index: {e}"));
            }
            BackendEvent::MonthLoaded { month, result } => {
                self.pending_months.remove(&month);
                match result {
                    Ok(papers) => {
                        self.session.apply_loaded_month(&month, papers);
                        self.clamp_cursor();
                    }
                    Err(e) => {
                        self.status_message = Some(format!("Failed to load {month}: {e}"));
                        self.failed_months.push((month, e));
                    }
                }
            }
        }
    }
}
