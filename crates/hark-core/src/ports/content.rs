//! Content source port: where cards come from.

use async_trait::async_trait;

use crate::domain::ContentCard;
use crate::error::ContentError;

/// Supplies content cards to the reader. Fetching is opaque to the core.
#[async_trait]
pub trait ContentSource: Send + Sync {
    /// All cards in display order.
    async fn list_cards(&self) -> Result<Vec<ContentCard>, ContentError>;

    /// A single card by id.
    ///
    /// An empty id is [`ContentError::MissingId`]; an unknown one is
    /// [`ContentError::NotFound`].
    async fn card(&self, id: &str) -> Result<ContentCard, ContentError> {
        if id.trim().is_empty() {
            return Err(ContentError::MissingId);
        }
        self.list_cards()
            .await?
            .into_iter()
            .find(|card| card.id == id)
            .ok_or_else(|| ContentError::NotFound(id.to_string()))
    }
}
