use std::sync::Arc;

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use paperboard_core::ShardSource;
use paperboard_core::store::{fetch_index, fetch_shard};

use crate::tui_event::{BackendCommand, BackendEvent};

/// Serve fetch commands until the command channel closes or `cancel` fires.
///
/// Every month is fetched on its own task so several shards download at once
/// while the UI keeps drawing. Results come back as [`BackendEvent`]s in
/// completion order.
pub async fn run(
    source: Arc<dyn ShardSource>,
    mut cmd_rx: mpsc::UnboundedReceiver<BackendCommand>,
    tx: mpsc::UnboundedSender<BackendEvent>,
    cancel: CancellationToken,
) {
    loop {
        let cmd = tokio::select! {
            _ = cancel.cancelled() => break,
            cmd = cmd_rx.recv() => match cmd {
                Some(cmd) => cmd,
                None => break,
            },
        };

        match cmd {
            BackendCommand::LoadIndex => {
                let source = Arc::clone(&source);
                let tx = tx.clone();
                let cancel = cancel.clone();
                tokio::spawn(async move {
                    let result = tokio::select! {
                        _ = cancel.cancelled() => return,
                        r = fetch_index(source.as_ref()) => r,
                    };
                    if let Err(e) = &result {
                        tracing::warn!(source = %source.describe(), error = %e, "failed to load month index");
                    }
                    let _ = tx.send(BackendEvent::IndexLoaded(result.map_err(|e| e.to_string())));
                });
            }
            BackendCommand::FetchMonths(months) => {
                tracing::debug!(count = months.len(), "fetching months");
                for month in months {
                    spawn_month(Arc::clone(&source), month, tx.clone(), cancel.clone());
                }
            }
        }
    }
    tracing::debug!("backend stopped");
}

fn spawn_month(
    source: Arc<dyn ShardSource>,
    month: String,
    tx: mpsc::UnboundedSender<BackendEvent>,
    cancel: CancellationToken,
) {
    tokio::spawn(async move {
        let result = tokio::select! {
            _ = cancel.cancelled() => return,
            r = fetch_shard(source.as_ref(), &month) => r,
        };
        if let Err(e) = &result {
            tracing::warn!(month = %month, error = %e, "failed to load month");
        }
        let _ = tx.send(BackendEvent::MonthLoaded {
            month,
            result: result.map_err(|e| e.to_string()),
        });
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use paperboard_core::Paper;
    use paperboard_core::source::MockSource;

    fn source() -> Arc<dyn ShardSource> {
        let paper = Paper {
            id: "2401.00001".into(),
            published: "2024-01-02".into(),
            ..Default::default()
        };
        Arc::new(
            MockSource::new()
                .with_index(&["2024-01"])
                .with_month("2024-01", vec![paper])
                .failing("2024-02.json"),
        )
    }

    #[tokio::test]
    async fn answers_index_and_month_commands() {
        let (cmd_tx, cmd_rx) = mpsc::unbounded_channel();
        let (tx, mut rx) = mpsc::unbounded_channel();
        let cancel = CancellationToken::new();
        let handle = tokio::spawn(run(source(), cmd_rx, tx, cancel.clone()));

        cmd_tx.send(BackendCommand::LoadIndex).unwrap();
        match rx.recv().await.unwrap() {
            BackendEvent::IndexLoaded(Ok(months)) => assert_eq!(months, vec!["2024-01"]),
            other => panic!("unexpected event: {other:?}"),
        }

        cmd_tx
            .send(BackendCommand::FetchMonths(vec!["2024-01".into(), "2024-02".into()]))
            .unwrap();
        let mut loaded = 0;
        let mut failed = 0;
        for _ in 0..2 {
            match rx.recv().await.unwrap() {
                BackendEvent::MonthLoaded { result: Ok(p), .. } => loaded += p.len(),
                BackendEvent::MonthLoaded { result: Err(_), month } => {
                    assert_eq!(month, "2024-02");
                    failed += 1;
                }
                other => panic!("unexpected event: {other:?}"),
            }
        }
        assert_eq!((loaded, failed), (1, 1));

        cancel.cancel();
        handle.await.unwrap();
    }
}
