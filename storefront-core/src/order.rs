//! Order logic module

use crate::{
    auth::Claims,
    db::Store,
    error::StorefrontError,
    models::*,
    product::{
        self,
        Stock,
    },
    reqres,
    utils,
};
use futures::TryStreamExt;
use log::{
    debug,
    error,
    info,
    warn,
};
use mongodb::{
    bson::{
        doc,
        Document,
    },
    options::{
        FindOneAndUpdateOptions,
        FindOptions,
        ReturnDocument,
    },
};
use std::collections::HashSet;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StatusType {
    Pending,
    Paid,
    Shipped,
    Delivered,
    Cancelled,
}

impl StatusType {
    pub fn value(&self) -> String {
        match *self {
            StatusType::Pending => String::from("Pending"),
            StatusType::Paid => String::from("Paid"),
            StatusType::Shipped => String::from("Shipped"),
            StatusType::Delivered => String::from("Delivered"),
            StatusType::Cancelled => String::from("Cancelled"),
        }
    }

    pub fn from_value(v: &str) -> Option<StatusType> {
        match v {
            "Pending" => Some(StatusType::Pending),
            "Paid" => Some(StatusType::Paid),
            "Shipped" => Some(StatusType::Shipped),
            "Delivered" => Some(StatusType::Delivered),
            "Cancelled" => Some(StatusType::Cancelled),
            _ => None,
        }
    }

    /// Pending -> Paid -> Shipped -> Delivered, cancel before shipping
    pub fn can_transition(&self, to: StatusType) -> bool {
        matches!(
            (self, to),
            (StatusType::Pending, StatusType::Paid)
                | (StatusType::Paid, StatusType::Shipped)
                | (StatusType::Shipped, StatusType::Delivered)
                | (StatusType::Pending, StatusType::Cancelled)
                | (StatusType::Paid, StatusType::Cancelled)
        )
    }
}

fn orders(store: &Store) -> Result<mongodb::Collection<Order>, StorefrontError> {
    store.collection::<Order>(crate::ORDER_COLLECTION)
}

/// check the request shape before any stock is touched
pub fn validate_order(r: &reqres::OrderRequest) -> Result<(), StorefrontError> {
    if r.items.is_empty() {
        return Err(StorefrontError::Validation(String::from("Order has no items")));
    }
    let address = r.ship_address.trim();
    if address.is_empty() || address.len() >= utils::string_limit() {
        return Err(StorefrontError::Validation(String::from("Shipping address is required")));
    }
    let mut seen: HashSet<&str> = HashSet::new();
    for item in &r.items {
        if item.quantity < 1 {
            return Err(StorefrontError::Validation(String::from(
                "Quantity must be at least 1",
            )));
        }
        if !seen.insert(item.pid.as_str()) {
            return Err(StorefrontError::Validation(format!(
                "Product {} is listed twice",
                item.pid
            )));
        }
    }
    Ok(())
}

/// Sum of price times quantity, rejecting overflow
pub fn order_total(items: &[OrderItem]) -> Result<i64, StorefrontError> {
    items.iter().try_fold(0_i64, |acc, i| {
        i.price
            .checked_mul(i.quantity)
            .and_then(|line| acc.checked_add(line))
            .ok_or_else(|| StorefrontError::Validation(String::from("Order total is too large")))
    })
}

/// Create an order for the customer.
///
/// Prices come from the store and stock is reserved item by item,
/// undoing earlier reservations when a later one fails.
pub async fn create(
    store: &Store,
    uid: &str,
    r: &reqres::OrderRequest,
) -> Result<Order, StorefrontError> {
    info!("creating order");
    validate_order(r)?;
    let mut items: Vec<OrderItem> = Vec::with_capacity(r.items.len());
    for req_item in &r.items {
        let p = product::find(store, &req_item.pid).await?;
        if p.qty < req_item.quantity {
            return Err(StorefrontError::Conflict(format!("Insufficient stock for {}", p.name)));
        }
        items.push(OrderItem {
            pid: p.pid,
            name: p.name,
            price: p.price,
            quantity: req_item.quantity,
        });
    }
    let total = order_total(&items)?;
    reserve_all(store, &items).await?;
    let new_order = Order {
        orid: utils::generate_id(crate::ORDER_DB_KEY),
        uid: String::from(uid),
        total,
        ship_address: String::from(r.ship_address.trim()),
        status: StatusType::Pending.value(),
        date: utils::now(),
        items,
        ..Default::default()
    };
    debug!("insert order: {:?}", &new_order);
    if let Err(e) = orders(store)?.insert_one(&new_order, None).await {
        let all: Vec<&OrderItem> = new_order.items.iter().collect();
        restock(store, &all).await;
        return Err(e.into());
    }
    Ok(new_order)
}

/// Take every item out of stock. When one runs short the items already
/// taken are put back and nothing stays reserved.
pub async fn reserve_all<S: Stock>(stock: &S, items: &[OrderItem]) -> Result<(), StorefrontError> {
    let mut reserved: Vec<&OrderItem> = Vec::new();
    for item in items {
        let taken = match stock.reserve(&item.pid, item.quantity).await {
            Ok(t) => t,
            Err(e) => {
                restock(stock, &reserved).await;
                return Err(e);
            }
        };
        if !taken {
            warn!("stock for {} changed while ordering", &item.pid);
            restock(stock, &reserved).await;
            return Err(StorefrontError::Conflict(format!(
                "Insufficient stock for {}",
                item.name
            )));
        }
        reserved.push(item);
    }
    Ok(())
}

/// Best effort, failures are logged
async fn restock<S: Stock>(stock: &S, items: &[&OrderItem]) {
    for item in items {
        if let Err(e) = stock.release(&item.pid, item.quantity).await {
            error!("failed to restock {}: {}", &item.pid, e);
        }
    }
}

/// Lookup order
pub async fn find(store: &Store, orid: &str) -> Result<Order, StorefrontError> {
    let order = orders(store)?.find_one(doc! { "_id": orid }, None).await?;
    order.ok_or_else(|| {
        error!("order not found");
        StorefrontError::NotFound("order")
    })
}

/// Customers only see their own orders
pub fn is_visible_to(order: &Order, claims: &Claims) -> bool {
    claims.is_admin() || order.uid == claims.uid
}

/// Lookup order on behalf of the caller. Someone else's order is
/// reported as missing.
pub async fn find_for(store: &Store, orid: &str, claims: &Claims) -> Result<Order, StorefrontError> {
    let order = find(store, orid).await?;
    if !is_visible_to(&order, claims) {
        debug!("{} asked for order {} of another customer", &claims.uid, orid);
        return Err(StorefrontError::NotFound("order"));
    }
    Ok(order)
}

/// Every order for admins, otherwise the caller's own, newest first
pub async fn find_all_for(store: &Store, claims: &Claims) -> Result<Vec<Order>, StorefrontError> {
    let filter: Option<Document> = if claims.is_admin() {
        None
    } else {
        Some(doc! { "uid": claims.uid.as_str() })
    };
    let options = FindOptions::builder().sort(doc! { "date": -1 }).build();
    let cursor = orders(store)?.find(filter, options).await?;
    let all: Vec<Order> = cursor.try_collect().await?;
    Ok(all)
}

/// Move the order along the state machine. The write only lands if the
/// stored status is still the one that was checked.
async fn transition(
    store: &Store,
    order: Order,
    to: StatusType,
) -> Result<Order, StorefrontError> {
    let from = StatusType::from_value(&order.status).ok_or_else(|| {
        error!("order {} has unknown status {}", &order.orid, &order.status);
        StorefrontError::Transition {
            from: String::from(&order.status),
            to: to.value(),
        }
    })?;
    if !from.can_transition(to) {
        return Err(StorefrontError::Transition {
            from: from.value(),
            to: to.value(),
        });
    }
    let mut changes = doc! { "status": to.value() };
    match to {
        StatusType::Shipped => {
            changes.insert("ship_date", utils::now());
        }
        StatusType::Delivered => {
            changes.insert("deliver_date", utils::now());
        }
        _ => {}
    }
    info!("order {} {} -> {}", &order.orid, from.value(), to.value());
    let options = FindOneAndUpdateOptions::builder()
        .return_document(ReturnDocument::After)
        .build();
    let updated = orders(store)?
        .find_one_and_update(
            doc! { "_id": order.orid.as_str(), "status": from.value() },
            doc! { "$set": changes },
            options,
        )
        .await?;
    let updated = updated.ok_or_else(|| {
        StorefrontError::Conflict(String::from("Order was modified concurrently"))
    })?;
    if to == StatusType::Cancelled {
        let all: Vec<&OrderItem> = updated.items.iter().collect();
        restock(store, &all).await;
    }
    Ok(updated)
}

/// Only the customer who placed the order may cancel it
pub fn check_owner(order: &Order, claims: &Claims) -> Result<(), StorefrontError> {
    if order.uid != claims.uid {
        return Err(StorefrontError::Forbidden("Only the customer can cancel this order"));
    }
    Ok(())
}

/// Customer cancellation, stock is put back
pub async fn cancel(store: &Store, orid: &str, claims: &Claims) -> Result<Order, StorefrontError> {
    let order = find_for(store, orid, claims).await?;
    check_owner(&order, claims)?;
    transition(store, order, StatusType::Cancelled).await
}

/// Admin status change
pub async fn update_status(
    store: &Store,
    orid: &str,
    r: &reqres::OrderStatusRequest,
) -> Result<Order, StorefrontError> {
    let to = StatusType::from_value(&r.status).ok_or_else(|| {
        StorefrontError::Validation(format!("Unknown order status {}", &r.status))
    })?;
    let order = find(store, orid).await?;
    transition(store, order, to).await
}

// Tests
//-------------------------------------------------------------------------------
