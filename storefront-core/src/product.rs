// Product repo/service layer
use crate::{
    db::Store,
    error::StorefrontError,
    models::*,
    reqres,
    utils,
};
use futures::TryStreamExt;
use log::{
    debug,
    error,
    info,
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

fn products(store: &Store) -> Result<mongodb::Collection<Product>, StorefrontError> {
    store.collection::<Product>(crate::PRODUCT_COLLECTION)
}

/// check product field lengths and amounts to prevent db spam
pub fn validate_product(p: &reqres::ProductRequest) -> Result<(), StorefrontError> {
    let name = p.name.trim();
    if name.is_empty() {
        return Err(StorefrontError::Validation(String::from("Product name is required")));
    }
    if name.len() >= utils::string_limit()
        || p.description.len() >= utils::string_limit()
        || p.image.len() >= utils::string_limit()
    {
        return Err(StorefrontError::Validation(String::from("Product field too long")));
    }
    if p.price < 0 || p.qty < 0 {
        return Err(StorefrontError::Validation(String::from(
            "Price and quantity must not be negative",
        )));
    }
    Ok(())
}

/// Create a new product
pub async fn create(store: &Store, p: &reqres::ProductRequest) -> Result<Product, StorefrontError> {
    validate_product(p)?;
    let new_product = Product {
        pid: utils::generate_id(crate::PRODUCT_DB_KEY),
        name: String::from(p.name.trim()),
        description: String::from(&p.description),
        image: String::from(&p.image),
        price: p.price,
        qty: p.qty,
        in_stock: p.qty > 0,
        created: utils::now(),
    };
    debug!("insert product: {:?}", &new_product);
    products(store)?.insert_one(&new_product, None).await?;
    Ok(new_product)
}

/// Single Product lookup
pub async fn find(store: &Store, pid: &str) -> Result<Product, StorefrontError> {
    let product = products(store)?.find_one(doc! { "_id": pid }, None).await?;
    product.ok_or_else(|| {
        error!("product not found");
        StorefrontError::NotFound("product")
    })
}

/// Product lookup for all, newest first. Out of stock items are only
/// listed when `include_out_of_stock` is set.
pub async fn find_all(
    store: &Store,
    include_out_of_stock: bool,
) -> Result<Vec<Product>, StorefrontError> {
    let filter = if include_out_of_stock {
        None
    } else {
        Some(doc! { "in_stock": true })
    };
    let options = FindOptions::builder().sort(doc! { "created": -1 }).build();
    let cursor = products(store)?.find(filter, options).await?;
    let all: Vec<Product> = cursor.try_collect().await?;
    Ok(all)
}

/// Modify product
pub async fn modify(
    store: &Store,
    pid: &str,
    p: &reqres::ProductRequest,
) -> Result<Product, StorefrontError> {
    info!("modify product: {}", pid);
    validate_product(p)?;
    let in_stock = p.qty > 0;
    let changes = doc! {
        "name": p.name.trim(),
        "description": p.description.as_str(),
        "image": p.image.as_str(),
        "price": p.price,
        "qty": p.qty,
        "in_stock": in_stock,
    };
    let options = FindOneAndUpdateOptions::builder()
        .return_document(ReturnDocument::After)
        .build();
    let updated = products(store)?
        .find_one_and_update(doc! { "_id": pid }, doc! { "$set": changes }, options)
        .await?;
    updated.ok_or(StorefrontError::NotFound("product"))
}

pub async fn delete(store: &Store, pid: &str) -> Result<(), StorefrontError> {
    info!("delete product: {}", pid);
    let result = products(store)?.delete_one(doc! { "_id": pid }, None).await?;
    if result.deleted_count == 0 {
        return Err(StorefrontError::NotFound("product"));
    }
    Ok(())
}

/// Pipeline that adds `delta` to the stock and recomputes `in_stock`
fn stock_update(delta: i64) -> Vec<Document> {
    vec![
        doc! { "$set": { "qty": { "$add": ["$qty", delta] } } },
        doc! { "$set": { "in_stock": { "$gt": ["$qty", 0] } } },
    ]
}

/// Take `quantity` units out of stock.
///
/// Returns false when there are not enough units left, in which case
/// nothing changes.
pub async fn reserve(store: &Store, pid: &str, quantity: i64) -> Result<bool, StorefrontError> {
    let result = products(store)?
        .update_one(
            doc! { "_id": pid, "qty": { "$gte": quantity } },
            stock_update(-quantity),
            None,
        )
        .await?;
    debug!("reserved {} of {}: {}", quantity, pid, result.modified_count == 1);
    Ok(result.modified_count == 1)
}

/// Put `quantity` units back into stock
pub async fn release(store: &Store, pid: &str, quantity: i64) -> Result<(), StorefrontError> {
    let result = products(store)?
        .update_one(doc! { "_id": pid }, stock_update(quantity), None)
        .await?;
    if result.matched_count == 0 {
        // product was deleted after the order was placed
        error!("cannot restock missing product {}", pid);
    }
    Ok(())
}

/// Stock bookkeeping used while placing and cancelling orders
#[rocket::async_trait]
pub trait Stock: Send + Sync {
    async fn reserve(&self, pid: &str, quantity: i64) -> Result<bool, StorefrontError>;
    async fn release(&self, pid: &str, quantity: i64) -> Result<(), StorefrontError>;
}

#[rocket::async_trait]
impl Stock for Store {
    async fn reserve(&self, pid: &str, quantity: i64) -> Result<bool, StorefrontError> {
        crate::product::reserve(self, pid, quantity).await
    }

    async fn release(&self, pid: &str, quantity: i64) -> Result<(), StorefrontError> {
        crate::product::release(self, pid, quantity).await
    }
}

// Tests
//-------------------------------------------------------------------------------
