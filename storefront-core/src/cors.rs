//! Cross-origin gate backed by a static allow-list

use log::{
    debug,
    warn,
};
use rocket::{
    fairing::{
        Fairing,
        Info,
        Kind,
    },
    get,
    http::{
        Header,
        Method,
        Status,
    },
    outcome::Outcome,
    request::{
        self,
        FromRequest,
    },
    response::status::Custom,
    serde::json::Json,
    uri,
    Data,
    Request,
    Response,
};
use std::io::Cursor;

use crate::reqres::ErrorResponse;

const ALLOWED_METHODS: &str = "GET,HEAD,PUT,PATCH,POST,DELETE";
const DEFAULT_ALLOWED_HEADERS: &str = "Content-Type, Authorization";

/// Split a comma separated origin list. Blank entries are dropped.
pub fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|o| !o.is_empty())
        .map(String::from)
        .collect()
}

/// Requests without an origin are same-origin or non-browser and always pass
pub fn is_allowed(origin: Option<&str>, allowed: &[String]) -> bool {
    match origin {
        None => true,
        Some(o) => allowed.iter().any(|a| a == o),
    }
}

/// Outcome of the gate, kept in the request local cache
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CorsVerdict {
    Allowed,
    Rejected,
}

impl CorsVerdict {
    /// Verdict recorded for this request, `Allowed` if the gate never ran
    pub fn of(request: &Request<'_>) -> CorsVerdict {
        *request.local_cache(|| CorsVerdict::Allowed)
    }
}

/// Rejects disallowed origins before routing and decorates allowed responses
pub struct CorsGate {
    allowed_origins: Vec<String>,
}

impl CorsGate {
    pub fn new(allowed_origins: Vec<String>) -> Self {
        CorsGate { allowed_origins }
    }
}

#[rocket::async_trait]
impl Fairing for CorsGate {
    fn info(&self) -> Info {
        Info {
            name: "CORS gate",
            kind: Kind::Request | Kind::Response,
        }
    }

    async fn on_request(&self, req: &mut Request<'_>, _: &mut Data<'_>) {
        let origin: Option<String> = req.headers().get_one("Origin").map(String::from);
        let allowed = is_allowed(origin.as_deref(), &self.allowed_origins);
        let verdict = *req.local_cache(|| {
            if allowed {
                CorsVerdict::Allowed
            } else {
                CorsVerdict::Rejected
            }
        });
        if verdict == CorsVerdict::Rejected {
            warn!("Blocked CORS request from: {}", origin.unwrap_or_default());
            req.set_method(Method::Get);
            req.set_uri(uri!("/gate/cors"));
        }
    }

    async fn on_response<'r>(&self, req: &'r Request<'_>, res: &mut Response<'r>) {
        let origin = match req.headers().get_one("Origin") {
            Some(o) => o,
            None => return,
        };
        if CorsVerdict::of(req) == CorsVerdict::Rejected {
            return;
        }
        res.set_header(Header::new("Access-Control-Allow-Origin", String::from(origin)));
        res.set_header(Header::new("Access-Control-Allow-Credentials", "true"));
        res.adjoin_header(Header::new("Vary", "Origin"));
        if req.method() == Method::Options {
            debug!("answering preflight from {}", origin);
            let headers = req
                .headers()
                .get_one("Access-Control-Request-Headers")
                .unwrap_or(DEFAULT_ALLOWED_HEADERS);
            res.set_header(Header::new("Access-Control-Allow-Methods", ALLOWED_METHODS));
            res.set_header(Header::new("Access-Control-Allow-Headers", String::from(headers)));
            res.remove_header("Content-Type");
            res.set_status(Status::NoContent);
            res.set_sized_body(0usize, Cursor::new(""));
        }
    }
}

/// Only matches requests the gate rewrote, anything else is a 404
pub struct CorsRejected;

#[rocket::async_trait]
impl<'r> FromRequest<'r> for CorsRejected {
    type Error = ();

    async fn from_request(request: &'r Request<'_>) -> request::Outcome<Self, Self::Error> {
        match CorsVerdict::of(request) {
            CorsVerdict::Rejected => Outcome::Success(CorsRejected),
            CorsVerdict::Allowed => Outcome::Forward(Status::NotFound),
        }
    }
}

/// Target of requests the gate rewrote
#[get("/cors")]
pub fn rejected(_rejected: CorsRejected) -> Custom<Json<ErrorResponse>> {
    Custom(
        Status::Forbidden,
        Json(ErrorResponse {
            message: String::from(crate::CORS_REJECTED_MESSAGE),
        }),
    )
}

// Tests
//-------------------------------------------------------------------------------
