//! Cart commands.

use common::{BranchId, CustomerId, ProductId, SaleId};

use crate::command::Command;

use super::SaleItem;

/// Command to open a new cart.
#[derive(Debug, Clone)]
pub struct CreateCart {
    /// The sale ID to create.
    pub sale_id: SaleId,

    /// Sale number. Generated from the ID and date when absent.
    pub sale_number: Option<String>,

    pub customer_id: CustomerId,
    pub branch_id: BranchId,

    /// Initial items. Must not be empty.
    pub items: Vec<SaleItem>,
}

impl CreateCart {
    /// Creates a CreateCart command with a generated sale ID.
    pub fn new(customer_id: CustomerId, branch_id: BranchId, items: Vec<SaleItem>) -> Self {
        Self {
            sale_id: SaleId::new(),
            sale_number: None,
            customer_id,
            branch_id,
            items,
        }
    }

    /// Uses the given sale ID.
    pub fn with_id(mut self, sale_id: SaleId) -> Self {
        self.sale_id = sale_id;
        self
    }

    /// Uses the given sale number instead of a generated one.
    pub fn with_sale_number(mut self, sale_number: impl Into<String>) -> Self {
        self.sale_number = Some(sale_number.into());
        self
    }
}

impl Command for CreateCart {
    const NAME: &'static str = "create_cart";

    fn sale_id(&self) -> SaleId {
        self.sale_id
    }
}

/// Command to add an item to a cart.
#[derive(Debug, Clone)]
pub struct AddCartItem {
    pub sale_id: SaleId,
    pub item: SaleItem,
}

impl AddCartItem {
    pub fn new(sale_id: SaleId, item: SaleItem) -> Self {
        Self { sale_id, item }
    }
}

impl Command for AddCartItem {
    const NAME: &'static str = "add_item";

    fn sale_id(&self) -> SaleId {
        self.sale_id
    }
}

/// Command to change the quantity of a cart line.
#[derive(Debug, Clone)]
pub struct UpdateCartItemQuantity {
    pub sale_id: SaleId,
    pub product_id: ProductId,
    pub quantity: u32,
}

impl UpdateCartItemQuantity {
    pub fn new(sale_id: SaleId, product_id: ProductId, quantity: u32) -> Self {
        Self {
            sale_id,
            product_id,
            quantity,
        }
    }
}

impl Command for UpdateCartItemQuantity {
    const NAME: &'static str = "update_item_quantity";

    fn sale_id(&self) -> SaleId {
        self.sale_id
    }
}

/// Command to remove a line from a cart.
#[derive(Debug, Clone)]
pub struct RemoveCartItem {
    pub sale_id: SaleId,
    pub product_id: ProductId,
}

impl RemoveCartItem {
    pub fn new(sale_id: SaleId, product_id: ProductId) -> Self {
        Self {
            sale_id,
            product_id,
        }
    }
}

impl Command for RemoveCartItem {
    const NAME: &'static str = "remove_item";

    fn sale_id(&self) -> SaleId {
        self.sale_id
    }
}

/// Command to complete a cart.
#[derive(Debug, Clone)]
pub struct CompleteCart {
    pub sale_id: SaleId,
}

impl CompleteCart {
    pub fn new(sale_id: SaleId) -> Self {
        Self { sale_id }
    }
}

impl Command for CompleteCart {
    const NAME: &'static str = "complete_cart";

    fn sale_id(&self) -> SaleId {
        self.sale_id
    }
}

/// Command to cancel a cart.
#[derive(Debug, Clone)]
pub struct CancelCart {
    pub sale_id: SaleId,

    /// Why the cart is canceled. Must not be blank.
    pub reason: String,
}

impl CancelCart {
    pub fn new(sale_id: SaleId, reason: impl Into<String>) -> Self {
        Self {
            sale_id,
            reason: reason.into(),
        }
    }
}

impl Command for CancelCart {
    const NAME: &'static str = "cancel_cart";

    fn sale_id(&self) -> SaleId {
        self.sale_id
    }
}
