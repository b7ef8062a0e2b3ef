//! Teardown coordination.

use crate::types::Event;
use std::sync::atomic::Ordering;

use super::SessionController;

impl SessionController {
    /// Release everything the controller holds
    ///
    /// Teardown sequence:
    /// 1. Cancel the root signal (every session token is a child of it)
    /// 2. Wait for the current session to reach a terminal state
    /// 3. Clear the accumulator and drop the cover handle
    /// 4. Mark the controller disposed and emit [`Event::Disposed`]
    ///
    /// After step 2 no session can append, so the accumulator stays empty.
    /// Calling teardown again is a no-op. Operations issued afterwards fail
    /// with [`Error::Disposed`](crate::Error::Disposed).
    pub async fn teardown(&self) {
        if self.disposed.load(Ordering::SeqCst) {
            tracing::debug!("Teardown requested on disposed controller");
            return;
        }
        tracing::info!("Tearing down session controller");

        self.shutdown.cancel();

        let mut state = self.state.lock().await;
        if self.disposed.load(Ordering::SeqCst) {
            return;
        }

        self.settle_current(&mut state, false).await;

        self.context.accumulator.clear();
        self.context.more_available.store(false, Ordering::SeqCst);
        state.cover = None;
        state.page = None;

        self.disposed.store(true, Ordering::SeqCst);
        let _ = self.context.event_tx.send(Event::Disposed);

        tracing::info!("Session controller disposed");
    }
}
