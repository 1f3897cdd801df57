//! Structs for all http requests and responses

use serde::{
    Deserialize,
    Serialize,
};

use crate::{
    auth::Claims,
    models::{
        Role,
        User,
    },
};

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct ErrorResponse {
    pub message: String,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Profile changes, absent fields are left alone
#[derive(Debug, Default, Deserialize, Serialize)]
pub struct ProfileUpdateRequest {
    pub name: Option<String>,
    pub password: Option<String>,
}

/// User without credential material
#[derive(Debug, Default, Deserialize, Serialize, PartialEq)]
pub struct UserResponse {
    #[serde(rename = "_id")]
    pub uid: String,
    pub name: String,
    pub email: String,
    pub role: Role,
    pub created: i64,
}

impl From<User> for UserResponse {
    fn from(u: User) -> Self {
        UserResponse {
            uid: u.uid,
            name: u.name,
            email: u.email,
            role: u.role,
            created: u.created,
        }
    }
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct AuthResponse {
    pub token: String,
    pub user: UserResponse,
}

/// Identity attached to the current request
#[derive(Debug, Default, Deserialize, Serialize)]
pub struct SessionResponse {
    pub claims: Claims,
}

/// Editable product fields for create and update
#[derive(Debug, Default, Deserialize, Serialize)]
pub struct ProductRequest {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub image: String,
    pub price: i64,
    pub qty: i64,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct OrderItemRequest {
    pub pid: String,
    pub quantity: i64,
}

/// Handle intial order information for request
#[derive(Debug, Default, Deserialize, Serialize)]
pub struct OrderRequest {
    pub items: Vec<OrderItemRequest>,
    pub ship_address: String,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct OrderStatusRequest {
    pub status: String,
}
