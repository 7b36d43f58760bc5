//! Cart command and query endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use chrono::{DateTime, Utc};
use domain::{
    AddCartItem, BranchId, CancelCart, CartService, CompleteCart, CreateCart, CustomerId, Money,
    ProductId, RemoveCartItem, SaleId, SaleItem, SaleResult, SaleStatus, UpdateCartItemQuantity,
};
use queries::{CartQueries, CartSummary, CartView, Page, SearchCarts};
use sale_store::SaleStore;
use serde::Deserialize;

use crate::error::ApiError;

/// Shared application state accessible from all handlers.
pub struct AppState<S: SaleStore> {
    pub carts: CartService<S>,
    pub queries: CartQueries<S>,
}

// -- Request types --

#[derive(Debug, Deserialize)]
pub struct CreateCartRequest {
    pub sale_number: Option<String>,
    pub customer_id: String,
    pub branch_id: String,
    pub items: Vec<CartItemRequest>,
}

#[derive(Debug, Deserialize)]
pub struct CartItemRequest {
    pub product_id: String,
    pub quantity: i64,
    pub unit_price_cents: i64,
}

#[derive(Debug, Deserialize)]
pub struct UpdateQuantityRequest {
    pub quantity: i64,
}

#[derive(Debug, Deserialize)]
pub struct CancelCartRequest {
    #[serde(default)]
    pub reason: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct SearchParams {
    pub customer_id: Option<String>,
    pub branch_id: Option<String>,
    pub status: Option<String>,
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
    pub page: Option<u32>,
    pub page_size: Option<u32>,
}

// -- Handlers --

/// POST /carts: open a new cart.
#[tracing::instrument(skip(state, payload))]
pub async fn create<S: SaleStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    payload: Result<Json<CreateCartRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<SaleResult>), ApiError> {
    let Json(req) = payload?;

    let items = req
        .items
        .iter()
        .map(CartItemRequest::to_item)
        .collect::<Result<Vec<_>, _>>()?;

    let mut cmd = CreateCart::new(
        CustomerId::from_uuid(parse_uuid("customer_id", &req.customer_id)?),
        BranchId::from_uuid(parse_uuid("branch_id", &req.branch_id)?),
        items,
    );
    if let Some(number) = req.sale_number.filter(|n| !n.trim().is_empty()) {
        cmd = cmd.with_sale_number(number.trim());
    }

    let result = state.carts.create_cart(cmd).await?;
    Ok((StatusCode::CREATED, Json(result.view())))
}

/// GET /carts/{id}: load one cart from the read side.
#[tracing::instrument(skip(state))]
pub async fn get<S: SaleStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<String>,
) -> Result<Json<CartView>, ApiError> {
    let sale_id = parse_sale_id(&id)?;
    Ok(Json(state.queries.get_cart(sale_id).await?))
}

/// GET /carts: search carts.
#[tracing::instrument(skip(state, params))]
pub async fn search<S: SaleStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    params: Result<Query<SearchParams>, QueryRejection>,
) -> Result<Json<Page<CartSummary>>, ApiError> {
    let Query(params) = params?;
    let search = params.to_search()?;
    Ok(Json(state.queries.search_carts(search).await?))
}

/// POST /carts/{id}/items: add an item, merging with an existing line.
#[tracing::instrument(skip(state, payload))]
pub async fn add_item<S: SaleStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<String>,
    payload: Result<Json<CartItemRequest>, JsonRejection>,
) -> Result<Json<SaleResult>, ApiError> {
    let sale_id = parse_sale_id(&id)?;
    let Json(req) = payload?;
    let item = req.to_item()?;

    let result = state
        .carts
        .add_item(AddCartItem::new(sale_id, item))
        .await?;
    Ok(Json(result.view()))
}

/// PUT /carts/{id}/items/{product_id}: set a line's quantity.
#[tracing::instrument(skip(state, payload))]
pub async fn update_item<S: SaleStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path((id, product_id)): Path<(String, String)>,
    payload: Result<Json<UpdateQuantityRequest>, JsonRejection>,
) -> Result<Json<SaleResult>, ApiError> {
    let sale_id = parse_sale_id(&id)?;
    let product_id = ProductId::from_uuid(parse_uuid("product_id", &product_id)?);
    let Json(req) = payload?;
    let quantity = parse_quantity(req.quantity)?;

    let result = state
        .carts
        .update_item_quantity(UpdateCartItemQuantity::new(sale_id, product_id, quantity))
        .await?;
    Ok(Json(result.view()))
}

/// DELETE /carts/{id}/items/{product_id}: remove a line.
#[tracing::instrument(skip(state))]
pub async fn remove_item<S: SaleStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path((id, product_id)): Path<(String, String)>,
) -> Result<Json<SaleResult>, ApiError> {
    let sale_id = parse_sale_id(&id)?;
    let product_id = ProductId::from_uuid(parse_uuid("product_id", &product_id)?);

    let result = state
        .carts
        .remove_item(RemoveCartItem::new(sale_id, product_id))
        .await?;
    Ok(Json(result.view()))
}

/// POST /carts/{id}/complete: complete a pending cart.
#[tracing::instrument(skip(state))]
pub async fn complete<S: SaleStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<String>,
) -> Result<Json<SaleResult>, ApiError> {
    let sale_id = parse_sale_id(&id)?;
    let result = state.carts.complete_cart(CompleteCart::new(sale_id)).await?;
    Ok(Json(result.view()))
}

/// POST /carts/{id}/cancel: cancel a pending cart with a reason.
#[tracing::instrument(skip(state, payload))]
pub async fn cancel<S: SaleStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<String>,
    payload: Result<Json<CancelCartRequest>, JsonRejection>,
) -> Result<Json<SaleResult>, ApiError> {
    let sale_id = parse_sale_id(&id)?;
    let Json(req) = payload?;

    let result = state
        .carts
        .cancel_cart(CancelCart::new(sale_id, req.reason))
        .await?;
    Ok(Json(result.view()))
}

// -- Helpers --

impl CartItemRequest {
    fn to_item(&self) -> Result<SaleItem, ApiError> {
        Ok(SaleItem::new(
            ProductId::from_uuid(parse_uuid("product_id", &self.product_id)?),
            parse_quantity(self.quantity)?,
            Money::from_cents(self.unit_price_cents),
        ))
    }
}

impl SearchParams {
    fn to_search(&self) -> Result<SearchCarts, ApiError> {
        let mut search = SearchCarts::new();

        if let Some(ref id) = self.customer_id {
            search = search.customer(CustomerId::from_uuid(parse_uuid("customer_id", id)?));
        }
        if let Some(ref id) = self.branch_id {
            search = search.branch(BranchId::from_uuid(parse_uuid("branch_id", id)?));
        }
        if let Some(ref status) = self.status {
            let status: SaleStatus = status
                .parse()
                .map_err(|e: domain::sale::ParseSaleStatusError| {
                    ApiError::BadRequest(e.to_string())
                })?;
            search = search.status(status);
        }
        search.from = self.from;
        search.to = self.to;
        search.page = self.page.unwrap_or(search.page);
        search.page_size = self.page_size.unwrap_or(search.page_size);

        Ok(search)
    }
}

fn parse_uuid(field: &str, value: &str) -> Result<uuid::Uuid, ApiError> {
    uuid::Uuid::parse_str(value).map_err(|e| ApiError::BadRequest(format!("Invalid {field}: {e}")))
}

fn parse_sale_id(id: &str) -> Result<SaleId, ApiError> {
    parse_uuid("sale id", id).map(SaleId::from_uuid)
}

/// Quantities arrive signed so that zero and negatives are rejected here
/// with a readable message.
fn parse_quantity(quantity: i64) -> Result<u32, ApiError> {
    if quantity <= 0 {
        return Err(ApiError::BadRequest(format!(
            "Invalid quantity {quantity} (must be greater than 0)"
        )));
    }
    u32::try_from(quantity)
        .map_err(|_| ApiError::BadRequest(format!("Quantity {quantity} is too large")))
}
