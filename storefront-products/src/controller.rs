use rocket::{
    delete,
    get,
    http::Status,
    patch,
    post,
    response::status::Custom,
    serde::json::Json,
    State,
};

use storefront_core::{
    auth::{
        Admin,
        Identity,
    },
    db::Store,
    error::StorefrontError,
    models,
    product,
    reqres,
};

// JSON APIs

/// Return all products. Admins also see items that are out of stock.
///
/// Protected: false
#[get("/")]
pub async fn get_products(
    identity: Option<Identity>,
    store: &State<Store>,
) -> Result<Custom<Json<Vec<models::Product>>>, StorefrontError> {
    let is_admin = identity.map(|i| i.0.is_admin()).unwrap_or(false);
    let m_products = product::find_all(store, is_admin).await?;
    Ok(Custom(Status::Ok, Json(m_products)))
}

/// Get a product by passing id
///
/// Protected: false
#[get("/<pid>")]
pub async fn get_product(
    pid: &str,
    store: &State<Store>,
) -> Result<Custom<Json<models::Product>>, StorefrontError> {
    let m_product = product::find(store, pid).await?;
    Ok(Custom(Status::Ok, Json(m_product)))
}

/// Create a product by passing json product
///
/// Protected: admin
#[post("/", data = "<req_product>")]
pub async fn create_product(
    req_product: Json<reqres::ProductRequest>,
    _admin: Admin,
    store: &State<Store>,
) -> Result<Custom<Json<models::Product>>, StorefrontError> {
    let m_product = product::create(store, &req_product).await?;
    log::info!("created product {}", &m_product.pid);
    Ok(Custom(Status::Created, Json(m_product)))
}

/// Update product information
///
/// Protected: admin
#[patch("/<pid>", data = "<req_product>")]
pub async fn update_product(
    pid: &str,
    req_product: Json<reqres::ProductRequest>,
    _admin: Admin,
    store: &State<Store>,
) -> Result<Custom<Json<models::Product>>, StorefrontError> {
    let m_product = product::modify(store, pid, &req_product).await?;
    Ok(Custom(Status::Ok, Json(m_product)))
}

/// Protected: admin
#[delete("/<pid>")]
pub async fn delete_product(
    pid: &str,
    _admin: Admin,
    store: &State<Store>,
) -> Result<Custom<Json<reqres::MessageResponse>>, StorefrontError> {
    product::delete(store, pid).await?;
    Ok(Custom(
        Status::Ok,
        Json(reqres::MessageResponse {
            message: String::from("Product removed"),
        }),
    ))
}
// END JSON APIs
