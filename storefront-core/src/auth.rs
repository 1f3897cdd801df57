//! Bearer token authorization module that uses JWTs
//!
//! Every request passes through [`AuthGate`]. A request carrying an
//! `Authorization` header that fails verification is answered with a
//! fixed 401 before routing. A request without the header continues
//! anonymously. Routes state what they require with the [`Identity`]
//! and [`Admin`] request guards; public routes use neither, or take
//! `Option<Identity>`.

use crate::{
    context::ServerContext,
    cors::CorsVerdict,
    error::StorefrontError,
    models::{
        Role,
        User,
    },
    reqres::ErrorResponse,
    utils,
};
use hmac::{
    Hmac,
    Mac,
};
use jwt::{
    SignWithKey,
    VerifyWithKey,
};
use log::{
    debug,
    error,
    info,
};
use rocket::{
    fairing::{
        Fairing,
        Info,
        Kind,
    },
    get,
    http::{
        Method,
        Status,
    },
    outcome::Outcome,
    request::{
        self,
        FromRequest,
    },
    response::status::Custom,
    serde::{
        json::Json,
        Deserialize,
        Serialize,
    },
    uri,
    Data,
    Request,
};
use sha2::Sha256;

const BEARER_PREFIX: &str = "Bearer ";

/// Decoded token payload, attached to the request when verification passes
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
#[serde(crate = "rocket::serde", default)]
pub struct Claims {
    pub uid: String,
    pub email: String,
    pub role: Role,
    pub iat: i64,
    pub exp: Option<i64>,
}

impl Claims {
    pub fn for_user(user: &User, issued: i64, ttl: i64) -> Result<Self, StorefrontError> {
        let exp = issued.checked_add(ttl).ok_or(StorefrontError::TokenLifetime)?;
        Ok(Claims {
            uid: String::from(&user.uid),
            email: String::from(&user.email),
            role: user.role,
            iat: issued,
            exp: Some(exp),
        })
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AuthError {
    Missing,
    Invalid,
    Expired,
    Forbidden,
}

fn signing_key(secret: &str) -> Result<Hmac<Sha256>, StorefrontError> {
    Hmac::new_from_slice(secret.as_bytes()).map_err(|_| StorefrontError::SigningKey)
}

/// Sign an HS256 token for the user that expires after `token_ttl`
pub fn create_token(user: &User, ctx: &ServerContext) -> Result<String, StorefrontError> {
    let secret = match &ctx.jwt_secret {
        Some(s) => s,
        None => {
            error!("JWT_SECRET is not set, cannot issue tokens");
            return Err(StorefrontError::SigningKey);
        }
    };
    let key = signing_key(secret)?;
    let claims = Claims::for_user(user, utils::now(), ctx.token_ttl)?;
    let token = claims.sign_with_key(&key)?;
    Ok(token)
}

/// Check signature and expiration. A missing secret fails every token.
pub fn verify_token(token: &str, secret: Option<&str>) -> Result<Claims, AuthError> {
    let secret = secret.ok_or(AuthError::Invalid)?;
    let key = signing_key(secret).map_err(|_| AuthError::Invalid)?;
    let claims: Claims = token.verify_with_key(&key).map_err(|e| {
        debug!("token verification failed: {:?}", e);
        AuthError::Invalid
    })?;
    if let Some(exp) = claims.exp {
        if utils::now() >= exp {
            debug!("token expired for {}", claims.uid);
            return Err(AuthError::Expired);
        }
    }
    Ok(claims)
}

/// The raw token with a leading `"Bearer "` removed
pub fn strip_bearer(header: &str) -> &str {
    header.strip_prefix(BEARER_PREFIX).unwrap_or(header)
}

/// hex HMAC-SHA256 of the password keyed by the salt
pub fn hash_password(password: &str, salt: &str) -> Result<String, StorefrontError> {
    let mut mac = signing_key(salt)?;
    mac.update(password.as_bytes());
    Ok(hex::encode(mac.finalize().into_bytes()))
}

/// Constant time comparison against a stored hash
pub fn verify_password(password: &str, salt: &str, hash: &str) -> bool {
    let expected = match hex::decode(hash) {
        Ok(h) => h,
        Err(_) => return false,
    };
    match signing_key(salt) {
        Ok(mut mac) => {
            mac.update(password.as_bytes());
            mac.verify_slice(&expected).is_ok()
        }
        Err(_) => false,
    }
}

/// Identity state of a request, resolved once and kept in the local cache
#[derive(Debug, Clone, PartialEq)]
pub enum Session {
    Anonymous,
    Authenticated(Claims),
    Rejected(AuthError),
}

impl Session {
    pub fn resolve<'a>(request: &'a Request<'_>) -> &'a Session {
        request.local_cache(|| {
            let header = request
                .headers()
                .get_one("Authorization")
                .filter(|h| !h.is_empty());
            match header {
                None => Session::Anonymous,
                Some(h) => {
                    let secret = request
                        .rocket()
                        .state::<ServerContext>()
                        .and_then(|ctx| ctx.jwt_secret.as_deref());
                    match verify_token(strip_bearer(h), secret) {
                        Ok(claims) => Session::Authenticated(claims),
                        Err(e) => Session::Rejected(e),
                    }
                }
            }
        })
    }
}

/// Global interceptor that stops requests with a bad token before routing
pub struct AuthGate;

#[rocket::async_trait]
impl Fairing for AuthGate {
    fn info(&self) -> Info {
        Info {
            name: "Auth gate",
            kind: Kind::Request,
        }
    }

    async fn on_request(&self, req: &mut Request<'_>, _: &mut Data<'_>) {
        if CorsVerdict::of(req) == CorsVerdict::Rejected {
            return;
        }
        let rejected = matches!(Session::resolve(req), Session::Rejected(_));
        if rejected {
            info!("rejecting bearer token for {} {}", req.method(), req.uri());
            req.set_method(Method::Get);
            req.set_uri(uri!("/gate/unauthorized"));
        }
    }
}

/// Only matches requests the gate rewrote, anything else is a 404
pub struct TokenRejected;

#[rocket::async_trait]
impl<'r> FromRequest<'r> for TokenRejected {
    type Error = ();

    async fn from_request(request: &'r Request<'_>) -> request::Outcome<Self, Self::Error> {
        match Session::resolve(request) {
            Session::Rejected(_) => Outcome::Success(TokenRejected),
            _ => Outcome::Forward(Status::NotFound),
        }
    }
}

/// Target of requests the gate rewrote
#[get("/unauthorized")]
pub fn rejected(_rejected: TokenRejected) -> Custom<Json<ErrorResponse>> {
    Custom(
        Status::Unauthorized,
        Json(ErrorResponse {
            message: String::from(crate::INVALID_TOKEN_MESSAGE),
        }),
    )
}

/// Requires-auth capability
#[derive(Debug)]
pub struct Identity(pub Claims);

#[rocket::async_trait]
impl<'r> FromRequest<'r> for Identity {
    type Error = AuthError;

    async fn from_request(request: &'r Request<'_>) -> request::Outcome<Self, Self::Error> {
        match Session::resolve(request) {
            Session::Authenticated(claims) => Outcome::Success(Identity(claims.clone())),
            Session::Anonymous => Outcome::Error((Status::Unauthorized, AuthError::Missing)),
            Session::Rejected(e) => Outcome::Error((Status::Unauthorized, *e)),
        }
    }
}

/// Requires-admin capability
#[derive(Debug)]
pub struct Admin(pub Claims);

#[rocket::async_trait]
impl<'r> FromRequest<'r> for Admin {
    type Error = AuthError;

    async fn from_request(request: &'r Request<'_>) -> request::Outcome<Self, Self::Error> {
        match Session::resolve(request) {
            Session::Authenticated(claims) if claims.is_admin() => {
                Outcome::Success(Admin(claims.clone()))
            }
            Session::Authenticated(claims) => {
                debug!("admin route denied for {}", claims.uid);
                Outcome::Error((Status::Forbidden, AuthError::Forbidden))
            }
            Session::Anonymous => Outcome::Error((Status::Unauthorized, AuthError::Missing)),
            Session::Rejected(e) => Outcome::Error((Status::Unauthorized, *e)),
        }
    }
}

// Tests
//-------------------------------------------------------------------------------
