//! Command handling infrastructure.

use common::SaleId;
use sale_store::{SaleRecord, SaleStore, SaveOptions, Version};

use crate::error::DomainError;
use crate::notification::NotificationDispatcher;
use crate::sale::{Sale, SaleError, SaleEvent, SaleResult};

/// Result of command execution.
#[derive(Debug, Clone)]
pub struct CommandResult {
    /// The sale after the command was applied and saved.
    pub sale: Sale,

    /// The events that were published.
    pub events: Vec<SaleEvent>,

    /// The version of the sale after the command.
    pub new_version: Version,
}

impl CommandResult {
    /// Projects the sale into its result view.
    pub fn view(&self) -> SaleResult {
        SaleResult::from(&self.sale)
    }
}

/// Trait for commands that target a single sale.
pub trait Command: Send + Sync {
    /// Command name used in logs and metrics.
    const NAME: &'static str;

    /// Returns the ID of the sale this command targets.
    fn sale_id(&self) -> SaleId;
}

/// Handler for executing commands against sales.
///
/// The handler:
/// 1. Loads the sale from the store
/// 2. Runs the command against it to produce events
/// 3. Saves the sale, expecting the version it was loaded at
/// 4. Publishes the events to the notification dispatcher
pub struct CommandHandler<S: SaleStore> {
    store: S,
    dispatcher: NotificationDispatcher,
}

impl<S: SaleStore> CommandHandler<S> {
    pub fn new(store: S, dispatcher: NotificationDispatcher) -> Self {
        Self { store, dispatcher }
    }

    /// Returns a reference to the underlying store.
    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn dispatcher(&self) -> &NotificationDispatcher {
        &self.dispatcher
    }

    /// Loads a sale, returning None if it doesn't exist.
    pub async fn load(&self, sale_id: SaleId) -> Result<Option<Sale>, DomainError> {
        match self.store.get(sale_id.as_uuid()).await? {
            Some(record) => Ok(Some(Sale::try_from(record)?)),
            None => Ok(None),
        }
    }

    /// Loads a sale, failing with [`DomainError::SaleNotFound`] if it doesn't exist.
    pub async fn load_existing(&self, sale_id: SaleId) -> Result<Sale, DomainError> {
        self.load(sale_id)
            .await?
            .ok_or(DomainError::SaleNotFound(sale_id))
    }

    /// Persists a newly created sale. Nothing is published.
    pub async fn insert(&self, mut sale: Sale) -> Result<CommandResult, DomainError> {
        let new_version = self
            .store
            .save(SaleRecord::from(&sale), SaveOptions::expect_new())
            .await?;
        sale.set_version(new_version);

        Ok(CommandResult {
            sale,
            events: vec![],
            new_version,
        })
    }

    /// Executes a command against an existing sale.
    ///
    /// The command function mutates a loaded copy of the sale and returns the
    /// events it produced. If it fails, nothing is saved. If it produces no
    /// events, nothing is saved either.
    pub async fn execute<F>(&self, sale_id: SaleId, command_fn: F) -> Result<CommandResult, DomainError>
    where
        F: FnOnce(&mut Sale) -> Result<Vec<SaleEvent>, SaleError>,
    {
        let mut sale = self.load_existing(sale_id).await?;
        let current_version = sale.version();

        let mut events = command_fn(&mut sale)?;

        if events.is_empty() {
            return Ok(CommandResult {
                sale,
                events,
                new_version: current_version,
            });
        }

        let new_version = self
            .store
            .save(
                SaleRecord::from(&sale),
                SaveOptions::expect_version(current_version),
            )
            .await?;
        sale.set_version(new_version);

        for event in &mut events {
            event.set_sale_version(new_version.as_i64());
        }
        self.dispatcher.publish_all(&events);

        Ok(CommandResult {
            sale,
            events,
            new_version,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sale::{Money, SaleItem, SaleStatus};
    use common::{BranchId, CustomerId, ProductId};
    use sale_store::InMemorySaleStore;

    fn new_sale() -> Sale {
        Sale::create(
            SaleId::new(),
            "S-1",
            CustomerId::new(),
            BranchId::new(),
            vec![SaleItem::new(ProductId::new(), 1, Money::from_cents(100))],
        )
        .unwrap()
    }

    fn handler() -> CommandHandler<InMemorySaleStore> {
        CommandHandler::new(InMemorySaleStore::new(), NotificationDispatcher::empty())
    }

    #[tokio::test]
    async fn test_insert_assigns_first_version() {
        let handler = handler();
        let result = handler.insert(new_sale()).await.unwrap();

        assert_eq!(result.new_version, Version::first());
        assert_eq!(result.sale.version(), Version::first());
        assert!(result.events.is_empty());
    }

    #[tokio::test]
    async fn test_execute_saves_and_bumps_version() {
        let handler = handler();
        let sale_id = handler.insert(new_sale()).await.unwrap().sale.id();

        let result = handler
            .execute(sale_id, |sale| Ok(vec![sale.complete()?]))
            .await
            .unwrap();

        assert_eq!(result.new_version, Version::new(2));
        assert_eq!(result.events.len(), 1);
        assert_eq!(result.events[0].sale().version, 2);

        let loaded = handler.load_existing(sale_id).await.unwrap();
        assert_eq!(loaded.status(), SaleStatus::Completed);
        assert_eq!(loaded.version(), Version::new(2));
    }

    #[tokio::test]
    async fn test_failed_command_saves_nothing() {
        let handler = handler();
        let sale_id = handler.insert(new_sale()).await.unwrap().sale.id();

        let result = handler
            .execute(sale_id, |sale| {
                sale.complete()?;
                Err(SaleError::CancellationReasonRequired)
            })
            .await;
        assert!(matches!(result, Err(DomainError::Sale(_))));

        let loaded = handler.load_existing(sale_id).await.unwrap();
        assert_eq!(loaded.status(), SaleStatus::Pending);
        assert_eq!(loaded.version(), Version::first());
    }

    #[tokio::test]
    async fn test_execute_on_missing_sale() {
        let handler = handler();
        let result = handler
            .execute(SaleId::new(), |sale| Ok(vec![sale.complete()?]))
            .await;
        assert!(matches!(result, Err(DomainError::SaleNotFound(_))));
    }

    #[tokio::test]
    async fn test_load_returns_none_for_unknown() {
        let handler = handler();
        assert!(handler.load(SaleId::new()).await.unwrap().is_none());
    }
}
