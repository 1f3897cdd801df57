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
        self,
        Admin,
        Identity,
    },
    context::ServerContext,
    db::Store,
    error::StorefrontError,
    reqres,
    user,
};

// JSON APIs

/// Register a customer and sign them in
///
/// Protected: false
#[post("/register", data = "<r_user>")]
pub async fn register(
    r_user: Json<reqres::RegisterRequest>,
    store: &State<Store>,
    ctx: &State<ServerContext>,
) -> Result<Custom<Json<reqres::AuthResponse>>, StorefrontError> {
    let m_user = user::create(store, &r_user).await?;
    log::info!("registered user {}", &m_user.uid);
    let token = auth::create_token(&m_user, ctx)?;
    Ok(Custom(
        Status::Created,
        Json(reqres::AuthResponse {
            token,
            user: m_user.into(),
        }),
    ))
}

/// Exchange credentials for a bearer token
///
/// Protected: false
#[post("/login", data = "<r_login>")]
pub async fn login(
    r_login: Json<reqres::LoginRequest>,
    store: &State<Store>,
    ctx: &State<ServerContext>,
) -> Result<Custom<Json<reqres::AuthResponse>>, StorefrontError> {
    let m_user = user::login(store, &r_login).await?;
    let token = auth::create_token(&m_user, ctx)?;
    Ok(Custom(
        Status::Ok,
        Json(reqres::AuthResponse {
            token,
            user: m_user.into(),
        }),
    ))
}

/// The decoded token of the caller, does not touch the database
///
/// Protected: true
#[get("/me")]
pub async fn get_session(identity: Identity) -> Custom<Json<reqres::SessionResponse>> {
    Custom(Status::Ok, Json(reqres::SessionResponse { claims: identity.0 }))
}

/// Protected: true
#[get("/profile")]
pub async fn get_profile(
    identity: Identity,
    store: &State<Store>,
) -> Result<Custom<Json<reqres::UserResponse>>, StorefrontError> {
    let m_user = user::find(store, &identity.0.uid).await?;
    Ok(Custom(Status::Ok, Json(m_user.into())))
}

/// Change name and/or password
///
/// Protected: true
#[patch("/profile", data = "<r_update>")]
pub async fn update_profile(
    r_update: Json<reqres::ProfileUpdateRequest>,
    identity: Identity,
    store: &State<Store>,
) -> Result<Custom<Json<reqres::UserResponse>>, StorefrontError> {
    let m_user = user::modify(store, &identity.0.uid, &r_update).await?;
    Ok(Custom(Status::Ok, Json(m_user.into())))
}

/// Return all users
///
/// Protected: admin
#[get("/")]
pub async fn get_users(
    _admin: Admin,
    store: &State<Store>,
) -> Result<Custom<Json<Vec<reqres::UserResponse>>>, StorefrontError> {
    let m_users = user::find_all(store).await?;
    Ok(Custom(
        Status::Ok,
        Json(m_users.into_iter().map(reqres::UserResponse::from).collect()),
    ))
}
// END JSON APIs
