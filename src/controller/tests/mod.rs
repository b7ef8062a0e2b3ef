use super::*;
use std::time::Duration;


/// Wait until the current session has reached a terminal state
async fn settle(controller: &SessionController) -> SessionState {
    tokio::time::timeout(Duration::from_secs(5), async {
        loop {
            if let Some(state) = controller.current_state().await {
                if state.is_terminal() {
                    return state;
                }
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .expect("session did not settle")
}

/// Every event received so far
fn drain(events: &mut broadcast::Receiver<Event>) -> Vec<Event> {
    let mut seen = Vec::new();
    while let Ok(event) = events.try_recv() {
        seen.push(event);
    }
    seen
}

fn ids(items: &[FeedItem]) -> Vec<u64> {
    items.iter().map(|i| i.id).collect()
}

fn sequences(items: &[FeedItem]) -> Vec<u64> {
    items.iter().map(|i| i.sequence_index).collect()
}
