use rocket::{
    catch,
    http::Status,
    response::status::Custom,
    serde::json::Json,
    Request,
};

use storefront_core::*;

fn error_response(status: Status, message: &str) -> Custom<Json<reqres::ErrorResponse>> {
    Custom(
        status,
        Json(reqres::ErrorResponse {
            message: String::from(message),
        }),
    )
}

// Catchers
//----------------------------------------------------------------

#[catch(400)]
pub fn bad_request() -> Custom<Json<reqres::ErrorResponse>> {
    error_response(Status::BadRequest, "Malformed request")
}

/// Reached when a requires-auth route has no identity
#[catch(401)]
pub fn unauthorized() -> Custom<Json<reqres::ErrorResponse>> {
    error_response(Status::Unauthorized, LOGIN_REQUIRED_MESSAGE)
}

#[catch(403)]
pub fn forbidden() -> Custom<Json<reqres::ErrorResponse>> {
    error_response(Status::Forbidden, ADMIN_REQUIRED_MESSAGE)
}

#[catch(404)]
pub fn not_found() -> Custom<Json<reqres::ErrorResponse>> {
    error_response(Status::NotFound, "Resource does not exist")
}

#[catch(422)]
pub fn unprocessable_entity() -> Custom<Json<reqres::ErrorResponse>> {
    error_response(Status::UnprocessableEntity, "Invalid request body")
}

#[catch(500)]
pub fn internal_error() -> Custom<Json<reqres::ErrorResponse>> {
    error_response(Status::InternalServerError, "Internal server error")
}

#[catch(default)]
pub fn default_catcher(status: Status, _req: &Request) -> Custom<Json<reqres::ErrorResponse>> {
    error_response(status, status.reason().unwrap_or("Unknown error"))
}
