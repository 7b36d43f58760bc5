//! Domain layer for the sales service.
//!
//! This crate provides:
//! - The Sale (cart) aggregate and its Pending → Completed / Canceled state machine
//! - Commands and the command handler that loads, mutates, saves and notifies
//! - The notification dispatcher that fans sale events out to registered handlers
//! - Mapping between the aggregate, persistence records and result views

pub mod command;
pub mod error;
pub mod notification;
pub mod sale;

pub use command::{Command, CommandHandler, CommandResult};
pub use error::{DomainError, ErrorKind};
pub use notification::{
    CustomerEmailNotifier, NotificationDispatcher, NotificationDispatcherBuilder,
    NotificationError, NotificationHandler,
};
pub use sale::{
    AUTO_CANCEL_REASON, AddCartItem, CancelCart, CartService, CompleteCart, CreateCart,
    EmptyCartPolicy, ItemCancelledData, Money, RemoveCartItem, Sale, SaleCancelledData,
    SaleCreatedData, SaleError, SaleEvent, SaleEventKind, SaleItem, SaleItemResult,
    SaleModifiedData, SaleResult, SaleStatus, UpdateCartItemQuantity,
};

pub use common::{BranchId, CustomerId, ProductId, SaleId};
