//! Cart service providing the API for sale operations.

use chrono::Utc;
use common::SaleId;
use sale_store::SaleStore;

use crate::command::{Command, CommandHandler, CommandResult};
use crate::error::DomainError;
use crate::notification::NotificationDispatcher;

use super::{
    AUTO_CANCEL_REASON, AddCartItem, CancelCart, CompleteCart, CreateCart, EmptyCartPolicy,
    RemoveCartItem, Sale, SaleResult, UpdateCartItemQuantity,
};

/// Service for managing carts.
///
/// Wraps the command handler, applies the empty cart policy and records a
/// `sales_commands_total` metric for every command.
pub struct CartService<S: SaleStore> {
    handler: CommandHandler<S>,
    empty_cart_policy: EmptyCartPolicy,
}

impl<S: SaleStore> CartService<S> {
    /// Creates a service with the default empty cart policy.
    pub fn new(store: S, dispatcher: NotificationDispatcher) -> Self {
        Self {
            handler: CommandHandler::new(store, dispatcher),
            empty_cart_policy: EmptyCartPolicy::default(),
        }
    }

    pub fn with_empty_cart_policy(mut self, policy: EmptyCartPolicy) -> Self {
        self.empty_cart_policy = policy;
        self
    }

    pub fn empty_cart_policy(&self) -> EmptyCartPolicy {
        self.empty_cart_policy
    }

    /// Returns a reference to the underlying command handler.
    pub fn handler(&self) -> &CommandHandler<S> {
        &self.handler
    }

    /// Opens a new pending cart.
    #[tracing::instrument(skip(self, cmd), fields(sale_id = %cmd.sale_id))]
    pub async fn create_cart(&self, cmd: CreateCart) -> Result<CommandResult, DomainError> {
        let result = self.insert_new(&cmd).await;

        record_outcome(&cmd, result)
    }

    /// Adds an item to a cart.
    #[tracing::instrument(skip(self, cmd), fields(sale_id = %cmd.sale_id, product_id = %cmd.item.product_id))]
    pub async fn add_item(&self, cmd: AddCartItem) -> Result<CommandResult, DomainError> {
        let item = cmd.item.clone();
        let result = self
            .handler
            .execute(cmd.sale_id, |sale| Ok(vec![sale.add_item(item)?]))
            .await;

        record_outcome(&cmd, result)
    }

    /// Sets the quantity of a cart line.
    #[tracing::instrument(skip(self, cmd), fields(sale_id = %cmd.sale_id, product_id = %cmd.product_id))]
    pub async fn update_item_quantity(
        &self,
        cmd: UpdateCartItemQuantity,
    ) -> Result<CommandResult, DomainError> {
        let result = self
            .handler
            .execute(cmd.sale_id, |sale| {
                Ok(vec![sale.update_item_quantity(&cmd.product_id, cmd.quantity)?])
            })
            .await;

        record_outcome(&cmd, result)
    }

    /// Removes a line from a cart.
    ///
    /// With [`EmptyCartPolicy::AutoCancel`], removing the last line also
    /// cancels the cart with [`AUTO_CANCEL_REASON`].
    #[tracing::instrument(skip(self, cmd), fields(sale_id = %cmd.sale_id, product_id = %cmd.product_id))]
    pub async fn remove_item(&self, cmd: RemoveCartItem) -> Result<CommandResult, DomainError> {
        let policy = self.empty_cart_policy;
        let result = self
            .handler
            .execute(cmd.sale_id, |sale| {
                let mut events = vec![sale.remove_item(&cmd.product_id)?];
                if sale.is_empty() && policy == EmptyCartPolicy::AutoCancel {
                    tracing::info!("last item removed, cancelling cart");
                    events.push(sale.cancel(AUTO_CANCEL_REASON)?);
                }
                Ok(events)
            })
            .await;

        record_outcome(&cmd, result)
    }

    /// Completes a cart.
    #[tracing::instrument(skip(self, cmd), fields(sale_id = %cmd.sale_id))]
    pub async fn complete_cart(&self, cmd: CompleteCart) -> Result<CommandResult, DomainError> {
        let result = self
            .handler
            .execute(cmd.sale_id, |sale| Ok(vec![sale.complete()?]))
            .await;

        record_outcome(&cmd, result)
    }

    /// Cancels a cart.
    #[tracing::instrument(skip(self, cmd), fields(sale_id = %cmd.sale_id))]
    pub async fn cancel_cart(&self, cmd: CancelCart) -> Result<CommandResult, DomainError> {
        let result = self
            .handler
            .execute(cmd.sale_id, |sale| Ok(vec![sale.cancel(&cmd.reason)?]))
            .await;

        record_outcome(&cmd, result)
    }

    async fn insert_new(&self, cmd: &CreateCart) -> Result<CommandResult, DomainError> {
        let sale_number = cmd
            .sale_number
            .clone()
            .unwrap_or_else(|| Sale::generate_number(cmd.sale_id, Utc::now()));
        let sale = Sale::create(
            cmd.sale_id,
            sale_number,
            cmd.customer_id,
            cmd.branch_id,
            cmd.items.clone(),
        )?;
        self.handler.insert(sale).await
    }

    /// Loads a cart through the write side.
    #[tracing::instrument(skip(self))]
    pub async fn get_cart(&self, sale_id: SaleId) -> Result<SaleResult, DomainError> {
        let sale = self.handler.load_existing(sale_id).await?;
        Ok(SaleResult::from(&sale))
    }
}

fn record_outcome<C: Command>(
    cmd: &C,
    result: Result<CommandResult, DomainError>,
) -> Result<CommandResult, DomainError> {
    let sale_id = cmd.sale_id();
    let outcome = match &result {
        Ok(_) => "ok",
        Err(err) => err.kind().as_str(),
    };
    metrics::counter!("sales_commands_total", "command" => C::NAME, "outcome" => outcome)
        .increment(1);

    match &result {
        Ok(done) => tracing::debug!(
            command = C::NAME,
            %sale_id,
            version = %done.new_version,
            events = done.events.len(),
            "command succeeded"
        ),
        Err(err) => tracing::info!(command = C::NAME, %sale_id, error = %err, "command rejected"),
    }
    result
}
