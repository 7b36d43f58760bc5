//! In-process notification dispatch for sale events.
//!
//! Handlers are registered per event kind on a [`NotificationDispatcherBuilder`]
//! once at startup. Publishing runs every handler for the event's kind in
//! registration order. A failing or panicking handler is logged and counted
//! but never affects the command that produced the event.

use std::collections::HashMap;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;

use thiserror::Error;

use crate::sale::{SaleEvent, SaleEventKind};

/// Error reported by a notification handler.
#[derive(Debug, Error)]
#[error("{0}")]
pub struct NotificationError(pub String);

impl NotificationError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

/// Something that reacts to sale events.
pub trait NotificationHandler: Send + Sync {
    /// Returns the handler name, used in logs and metrics.
    fn name(&self) -> &str;

    /// Handles one event.
    fn handle(&self, event: &SaleEvent) -> Result<(), NotificationError>;
}

struct FnHandler<F> {
    name: String,
    f: F,
}

impl<F> NotificationHandler for FnHandler<F>
where
    F: Fn(&SaleEvent) -> Result<(), NotificationError> + Send + Sync,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn handle(&self, event: &SaleEvent) -> Result<(), NotificationError> {
        (self.f)(event)
    }
}

/// Builds a [`NotificationDispatcher`].
#[derive(Default)]
pub struct NotificationDispatcherBuilder {
    handlers: HashMap<SaleEventKind, Vec<Arc<dyn NotificationHandler>>>,
}

impl NotificationDispatcherBuilder {
    /// Registers a handler for one event kind.
    pub fn on(mut self, kind: SaleEventKind, handler: Arc<dyn NotificationHandler>) -> Self {
        self.handlers.entry(kind).or_default().push(handler);
        self
    }

    /// Registers a closure for one event kind.
    pub fn on_fn<F>(self, kind: SaleEventKind, name: impl Into<String>, f: F) -> Self
    where
        F: Fn(&SaleEvent) -> Result<(), NotificationError> + Send + Sync + 'static,
    {
        let handler = Arc::new(FnHandler {
            name: name.into(),
            f,
        });
        self.on(kind, handler)
    }

    /// Registers a handler for every event kind.
    pub fn on_all(self, handler: Arc<dyn NotificationHandler>) -> Self {
        SaleEventKind::ALL
            .into_iter()
            .fold(self, |builder, kind| builder.on(kind, Arc::clone(&handler)))
    }

    pub fn build(self) -> NotificationDispatcher {
        NotificationDispatcher {
            handlers: Arc::new(self.handlers),
        }
    }
}

/// Fans sale events out to the handlers registered for their kind.
#[derive(Clone, Default)]
pub struct NotificationDispatcher {
    handlers: Arc<HashMap<SaleEventKind, Vec<Arc<dyn NotificationHandler>>>>,
}

impl NotificationDispatcher {
    pub fn builder() -> NotificationDispatcherBuilder {
        NotificationDispatcherBuilder::default()
    }

    /// A dispatcher with no handlers.
    pub fn empty() -> Self {
        Self::default()
    }

    /// A dispatcher with the customer email notifier registered for every kind.
    pub fn with_default_handlers() -> Self {
        Self::builder()
            .on_all(Arc::new(CustomerEmailNotifier))
            .build()
    }

    /// Returns the number of handlers registered for a kind.
    pub fn handler_count(&self, kind: SaleEventKind) -> usize {
        self.handlers.get(&kind).map_or(0, Vec::len)
    }

    /// Delivers an event to its handlers. Returns how many handlers succeeded.
    #[tracing::instrument(skip(self, event), fields(event_type = event.event_type(), sale_id = %event.sale().id))]
    pub fn publish(&self, event: &SaleEvent) -> usize {
        metrics::counter!("sales_notifications_total", "event_type" => event.event_type())
            .increment(1);

        let Some(handlers) = self.handlers.get(&event.kind()) else {
            tracing::debug!("no handlers registered");
            return 0;
        };

        let mut delivered = 0;
        for handler in handlers {
            match catch_unwind(AssertUnwindSafe(|| handler.handle(event))) {
                Ok(Ok(())) => delivered += 1,
                Ok(Err(err)) => {
                    tracing::warn!(handler = handler.name(), error = %err, "notification handler failed");
                    record_failure(handler.name());
                }
                Err(_) => {
                    tracing::error!(handler = handler.name(), "notification handler panicked");
                    record_failure(handler.name());
                }
            }
        }
        delivered
    }

    /// Publishes events in order.
    pub fn publish_all(&self, events: &[SaleEvent]) {
        for event in events {
            self.publish(event);
        }
    }
}

impl std::fmt::Debug for NotificationDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let counts: HashMap<_, _> = self
            .handlers
            .iter()
            .map(|(kind, handlers)| (kind.as_str(), handlers.len()))
            .collect();
        f.debug_struct("NotificationDispatcher")
            .field("handlers", &counts)
            .finish()
    }
}

fn record_failure(handler: &str) {
    metrics::counter!("sales_notification_failures_total", "handler" => handler.to_string())
        .increment(1);
}

/// Logs a "notify the customer by email" entry for every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct CustomerEmailNotifier;

impl NotificationHandler for CustomerEmailNotifier {
    fn name(&self) -> &str {
        "customer_email"
    }

    fn handle(&self, event: &SaleEvent) -> Result<(), NotificationError> {
        let sale = event.sale();
        match event {
            SaleEvent::ItemCancelled(data) => tracing::info!(
                sale_id = %sale.id,
                sale_number = %sale.sale_number,
                customer_id = %sale.customer_id,
                product_id = %data.item.product_id,
                "notifying customer by email: item cancelled"
            ),
            SaleEvent::SaleCancelled(data) => tracing::info!(
                sale_id = %sale.id,
                sale_number = %sale.sale_number,
                customer_id = %sale.customer_id,
                reason = %data.reason,
                "notifying customer by email: sale cancelled"
            ),
            SaleEvent::SaleCreated(_) => tracing::info!(
                sale_id = %sale.id,
                sale_number = %sale.sale_number,
                customer_id = %sale.customer_id,
                total_amount_cents = sale.total_amount_cents,
                "notifying customer by email: sale created"
            ),
            SaleEvent::SaleModified(_) => tracing::info!(
                sale_id = %sale.id,
                sale_number = %sale.sale_number,
                customer_id = %sale.customer_id,
                total_amount_cents = sale.total_amount_cents,
                "notifying customer by email: sale modified"
            ),
        }
        Ok(())
    }
}
