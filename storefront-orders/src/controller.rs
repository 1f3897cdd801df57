use rocket::{
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
    order,
    reqres,
};

// JSON APIs

/// Create order
///
/// Protected: true
#[post("/", data = "<r_order>")]
pub async fn create_order(
    r_order: Json<reqres::OrderRequest>,
    identity: Identity,
    store: &State<Store>,
) -> Result<Custom<Json<models::Order>>, StorefrontError> {
    let m_order = order::create(store, &identity.0.uid, &r_order).await?;
    log::info!("order {} placed by {}", &m_order.orid, &m_order.uid);
    Ok(Custom(Status::Created, Json(m_order)))
}

/// Get all orders of the caller, or every order for admins
///
/// Protected: true
#[get("/")]
pub async fn get_orders(
    identity: Identity,
    store: &State<Store>,
) -> Result<Custom<Json<Vec<models::Order>>>, StorefrontError> {
    let m_orders = order::find_all_for(store, &identity.0).await?;
    Ok(Custom(Status::Ok, Json(m_orders)))
}

/// Get a order by passing id
///
/// Protected: true
#[get("/<orid>")]
pub async fn get_order(
    orid: &str,
    identity: Identity,
    store: &State<Store>,
) -> Result<Custom<Json<models::Order>>, StorefrontError> {
    let m_order = order::find_for(store, orid, &identity.0).await?;
    Ok(Custom(Status::Ok, Json(m_order)))
}

/// Customer cancellation before shipping
///
/// Protected: true
#[patch("/<orid>/cancel")]
pub async fn cancel_order(
    orid: &str,
    identity: Identity,
    store: &State<Store>,
) -> Result<Custom<Json<models::Order>>, StorefrontError> {
    let m_order = order::cancel(store, orid, &identity.0).await?;
    Ok(Custom(Status::Ok, Json(m_order)))
}

/// Move an order to its next status
///
/// Protected: admin
#[patch("/<orid>/status", data = "<r_status>")]
pub async fn update_order_status(
    orid: &str,
    r_status: Json<reqres::OrderStatusRequest>,
    _admin: Admin,
    store: &State<Store>,
) -> Result<Custom<Json<models::Order>>, StorefrontError> {
    let m_order = order::update_status(store, orid, &r_status).await?;
    Ok(Custom(Status::Ok, Json(m_order)))
}
// END JSON APIs
