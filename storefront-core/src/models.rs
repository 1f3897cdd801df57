//! Documents as they are stored in the document store

use rocket::serde::{
    Deserialize,
    Serialize,
};

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(crate = "rocket::serde", rename_all = "lowercase")]
pub enum Role {
    #[default]
    Customer,
    Admin,
}

#[derive(Debug, Default, Clone, Deserialize, Serialize)]
#[serde(crate = "rocket::serde")]
pub struct User {
    #[serde(rename = "_id")]
    pub uid: String,
    pub name: String,
    pub email: String,
    /// hex HMAC-SHA256 of the password keyed by `salt`
    pub password_hash: String,
    pub salt: String,
    #[serde(default)]
    pub role: Role,
    pub created: i64,
}

#[derive(Debug, Default, Clone, PartialEq, Deserialize, Serialize)]
#[serde(crate = "rocket::serde")]
pub struct Product {
    #[serde(rename = "_id")]
    pub pid: String,
    pub name: String,
    pub description: String,
    /// url of the product image
    pub image: String,
    /// smallest currency unit
    pub price: i64,
    pub qty: i64,
    pub in_stock: bool,
    pub created: i64,
}

#[derive(Debug, Default, Clone, PartialEq, Deserialize, Serialize)]
#[serde(crate = "rocket::serde")]
pub struct OrderItem {
    pub pid: String,
    pub name: String,
    /// unit price captured when the order was placed
    pub price: i64,
    pub quantity: i64,
}

#[derive(Debug, Default, Clone, PartialEq, Deserialize, Serialize)]
#[serde(crate = "rocket::serde")]
pub struct Order {
    #[serde(rename = "_id")]
    pub orid: String,
    /// customer uid
    pub uid: String,
    pub items: Vec<OrderItem>,
    pub total: i64,
    pub ship_address: String,
    pub status: String,
    pub date: i64,
    pub ship_date: i64,
    pub deliver_date: i64,
}
