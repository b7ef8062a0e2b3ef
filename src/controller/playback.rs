//! Hand-off of the attached source to playback and export collaborators.

use crate::error::Result;
use crate::types::{FeedItem, Notification};

use super::SessionController;

impl SessionController {
    /// Replace the playback queue with the attached source and start from the top
    ///
    /// Collaborator failures are reported through the notifier, not returned.
    ///
    /// # Errors
    ///
    /// - [`Error::Disposed`](crate::Error::Disposed) after teardown
    /// - [`Error::NoSource`](crate::Error::NoSource) if no source is attached
    pub async fn play_all(&self) -> Result<()> {
        self.ensure_live()?;
        let (source_id, ascending) = self.source_and_direction().await?;
        let list_source = format!("rd{}", source_id);

        let result = async {
            self.playlist.append_source(&list_source, ascending).await?;
            self.playlist.move_to(0).await
        }
        .await;

        if let Err(e) = result {
            tracing::warn!(list_source = %list_source, error = %e, "Play all failed");
            self.context.notifier.notify(Notification::from_error(&e));
        }
        Ok(())
    }

    /// Append every item of the attached source to the playback queue
    ///
    /// # Errors
    ///
    /// - [`Error::Disposed`](crate::Error::Disposed) after teardown
    /// - [`Error::NoSource`](crate::Error::NoSource) if no source is attached
    pub async fn add_all(&self) -> Result<()> {
        self.ensure_live()?;
        let (source_id, ascending) = self.source_and_direction().await?;

        if let Err(e) = self
            .playlist
            .append_source_list(&source_id, ascending)
            .await
        {
            tracing::warn!(source_id = %source_id, error = %e, "Add all failed");
            self.context.notifier.notify(Notification::from_error(&e));
        }
        Ok(())
    }

    /// Export every page of the attached source to the export sink
    ///
    /// Runs outside the session model: it is not cancelled by teardown or
    /// toggling and never touches the display accumulator.
    ///
    /// # Errors
    ///
    /// - [`Error::Disposed`](crate::Error::Disposed) after teardown
    /// - [`Error::NoSource`](crate::Error::NoSource) if no source is attached
    pub async fn export_all(&self) -> Result<Vec<FeedItem>> {
        self.ensure_live()?;
        let (source_id, ascending) = self.source_and_direction().await?;
        Ok(self.exporter.export_all(&source_id, ascending).await)
    }

    async fn source_and_direction(&self) -> Result<(String, bool)> {
        let state = self.state.lock().await;
        Ok((Self::source_id(&state)?, state.ascending))
    }
}
