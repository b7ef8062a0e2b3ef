//! Feed control: attach a source, advance pages, toggle the sort direction.

use crate::error::Result;
use crate::types::{Notification, SourceDetail, SourceTarget};

use super::SessionController;

impl SessionController {
    /// Attach a source without loading any page
    ///
    /// A [`SourceTarget::Id`] is resolved through the source directory. If the
    /// lookup fails the failure is reported and a placeholder detail carrying
    /// only the id is attached, so paging still works.
    ///
    /// Attaching supersedes any running session and empties the accumulator.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Disposed`](crate::Error::Disposed) after teardown.
    pub async fn attach(&self, target: SourceTarget) -> Result<SourceDetail> {
        self.ensure_live()?;

        let detail = match target {
            SourceTarget::Detail(detail) => detail,
            SourceTarget::Id(id) => match self.directory.fetch_detail(&id).await {
                Ok(detail) => detail,
                Err(e) => {
                    tracing::warn!(source_id = %id, error = %e, "Source lookup failed, using placeholder");
                    self.context.notifier.notify(Notification::from_error(&e));
                    SourceDetail::placeholder(id)
                }
            },
        };

        let mut state = self.state.lock().await;
        self.ensure_live()?;
        self.settle_current(&mut state, true).await;
        self.ensure_live()?;

        self.context.accumulator.clear();
        state.page = None;
        state.cover = self.cover_for(&detail);
        state.source = Some(detail.clone());

        tracing::info!(source_id = %detail.id, name = %detail.name, "Feed source attached");
        Ok(detail)
    }

    /// Attach a source and start loading its first page
    ///
    /// # Errors
    ///
    /// Returns [`Error::Disposed`](crate::Error::Disposed) after teardown.
    pub async fn open(&self, target: SourceTarget) -> Result<SourceDetail> {
        let detail = self.attach(target).await?;
        self.load_next().await?;
        Ok(detail)
    }

    /// Start a session for the next page
    ///
    /// The page counter advances before the session runs. If a previous
    /// session is still running it is awaited (not cancelled) first, so only
    /// one session ever appends at a time.
    ///
    /// Returns once the new session has been started; its progress is visible
    /// through [`current_state`](Self::current_state) and the event channel.
    ///
    /// # Errors
    ///
    /// - [`Error::Disposed`](crate::Error::Disposed) after teardown
    /// - [`Error::NoSource`](crate::Error::NoSource) if no source is attached
    pub async fn load_next(&self) -> Result<()> {
        self.ensure_live()?;

        let mut state = self.state.lock().await;
        let source_id = Self::source_id(&state)?;

        self.settle_current(&mut state, false).await;
        self.ensure_live()?;

        self.start_session(&mut state, source_id);
        Ok(())
    }

    /// Flip the sort direction and reload from the first page
    ///
    /// The outgoing session is cancelled and awaited to a terminal state
    /// before the accumulator is cleared, so no stale item can land after
    /// the clear. Page and sequence counters restart at zero.
    ///
    /// # Errors
    ///
    /// - [`Error::Disposed`](crate::Error::Disposed) after teardown
    /// - [`Error::NoSource`](crate::Error::NoSource) if no source is attached
    pub async fn toggle_sort_and_reload(&self) -> Result<()> {
        self.ensure_live()?;

        let mut state = self.state.lock().await;
        let source_id = Self::source_id(&state)?;

        self.settle_current(&mut state, true).await;
        self.ensure_live()?;

        self.context.accumulator.clear();
        state.page = None;
        state.ascending = !state.ascending;
        tracing::info!(source_id = %source_id, ascending = state.ascending, "Sort direction toggled");

        self.start_session(&mut state, source_id);
        Ok(())
    }
}
