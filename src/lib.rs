#[macro_use]
extern crate rocket;

pub mod controller;

use rocket::{
    config::Ident,
    fairing::AdHoc,
    Build,
    Rocket,
};
use storefront_core::{
    auth,
    context::ServerContext,
    cors,
    db,
    utils::ReleaseEnvironment,
    GATE_BASE,
};
use storefront_orders::controller as orders;
use storefront_products::controller as products;
use storefront_users::controller as users;

/// Assemble the server. Request flow is CORS gate, auth gate, then the
/// users, products and orders routers.
pub fn build(ctx: ServerContext, store: db::Store) -> Rocket<Build> {
    let profile = match ctx.release_env {
        ReleaseEnvironment::Production => rocket::Config::release_default(),
        ReleaseEnvironment::Development => rocket::Config::debug_default(),
    };
    let config = rocket::Config {
        ident: Ident::none(),
        ip_header: None,
        address: ctx.host,
        port: ctx.port,
        ..profile
    };
    let cors_gate = cors::CorsGate::new(ctx.allowed_origins.clone());
    rocket::custom(&config)
        .attach(cors_gate)
        .attach(auth::AuthGate)
        .attach(db::check_on_liftoff())
        .attach(AdHoc::on_liftoff("Listener", |rocket| {
            Box::pin(async move {
                log::info!("Server running on port {}", rocket.config().port);
            })
        }))
        .manage(ctx)
        .manage(store)
        .mount(GATE_BASE, routes![cors::rejected, auth::rejected])
        .mount(
            "/api/users",
            routes![
                users::register,
                users::login,
                users::get_session,
                users::get_profile,
                users::update_profile,
                users::get_users,
            ],
        )
        .mount(
            "/api/products",
            routes![
                products::get_products,
                products::get_product,
                products::create_product,
                products::update_product,
                products::delete_product,
            ],
        )
        .mount(
            "/api/orders",
            routes![
                orders::create_order,
                orders::get_orders,
                orders::get_order,
                orders::cancel_order,
                orders::update_order_status,
            ],
        )
        .register(
            "/",
            catchers![
                controller::bad_request,
                controller::unauthorized,
                controller::forbidden,
                controller::not_found,
                controller::unprocessable_entity,
                controller::internal_error,
                controller::default_catcher,
            ],
        )
}

// Tests
//-------------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use rocket::{
        http::{
            ContentType,
            Header,
            Status,
        },
        local::blocking::{
            Client,
            LocalResponse,
        },
    };
    use storefront_core::{
        models::{
            Role,
            User,
        },
        reqres::{
            ErrorResponse,
            SessionResponse,
        },
        utils,
        CORS_REJECTED_MESSAGE,
        INVALID_TOKEN_MESSAGE,
        LOGIN_REQUIRED_MESSAGE,
    };

    const SECRET: &str = "test-secret";
    const ALLOWED: &str = "http://localhost:5173";
    const EVIL: &str = "http://evil.com";

    fn test_ctx() -> ServerContext {
        ServerContext {
            jwt_secret: Some(String::from(SECRET)),
            ..Default::default()
        }
    }

    fn client() -> Client {
        Client::tracked(build(test_ctx(), db::Store::unavailable())).expect("valid rocket instance")
    }

    fn token_for(role: Role, ctx: &ServerContext) -> (User, String) {
        let user = User {
            uid: utils::generate_id(storefront_core::USER_DB_KEY),
            email: String::from("ada@shop.test"),
            role,
            ..Default::default()
        };
        let token = auth::create_token(&user, ctx).expect("token");
        (user, token)
    }

    fn bearer(token: &str) -> Header<'static> {
        Header::new("Authorization", format!("Bearer {}", token))
    }

    fn message(response: LocalResponse<'_>) -> String {
        response.into_json::<ErrorResponse>().expect("json error body").message
    }

    #[test]
    fn allowed_origin_reaches_router_test() {
        let client = client();
        let response = client.get("/api/users/me").header(Header::new("Origin", ALLOWED)).dispatch();
        assert_eq!(response.status(), Status::Unauthorized);
        assert_eq!(
            response.headers().get_one("Access-Control-Allow-Origin"),
            Some(ALLOWED)
        );
        assert_eq!(
            response.headers().get_one("Access-Control-Allow-Credentials"),
            Some("true")
        );
        assert_eq!(message(response), LOGIN_REQUIRED_MESSAGE);
    }

    #[test]
    fn rejected_origin_test() {
        let client = client();
        let response = client.get("/api/products").header(Header::new("Origin", EVIL)).dispatch();
        assert_eq!(response.status(), Status::Forbidden);
        assert_eq!(response.headers().get_one("Access-Control-Allow-Origin"), None);
        assert_eq!(message(response), CORS_REJECTED_MESSAGE);
    }

    #[test]
    fn rejected_origin_before_token_test() {
        let client = client();
        let response = client
            .post("/api/orders")
            .header(Header::new("Origin", EVIL))
            .header(bearer("garbage"))
            .dispatch();
        assert_eq!(response.status(), Status::Forbidden);
        assert_eq!(message(response), CORS_REJECTED_MESSAGE);
    }

    #[test]
    fn absent_origin_reaches_router_test() {
        let client = client();
        let response = client.get("/api/products").dispatch();
        assert_eq!(response.status(), Status::ServiceUnavailable);
        assert_eq!(response.headers().get_one("Access-Control-Allow-Origin"), None);
        assert_eq!(message(response), "Database unavailable");
    }

    #[test]
    fn preflight_test() {
        let client = client();
        let response = client
            .options("/api/orders")
            .header(Header::new("Origin", ALLOWED))
            .header(Header::new("Access-Control-Request-Method", "POST"))
            .header(Header::new("Access-Control-Request-Headers", "authorization,content-type"))
            .dispatch();
        assert_eq!(response.status(), Status::NoContent);
        let headers = response.headers();
        assert_eq!(headers.get_one("Access-Control-Allow-Origin"), Some(ALLOWED));
        assert_eq!(
            headers.get_one("Access-Control-Allow-Headers"),
            Some("authorization,content-type")
        );
        assert!(headers
            .get_one("Access-Control-Allow-Methods")
            .map(|m| m.contains("POST"))
            .unwrap_or(false));
    }

    #[test]
    fn bare_options_test() {
        let client = client();
        let response = client
            .options("/api/products")
            .header(Header::new("Origin", ALLOWED))
            .dispatch();
        assert_eq!(response.status(), Status::NoContent);
        assert_eq!(
            response.headers().get_one("Access-Control-Allow-Headers"),
            Some("Content-Type, Authorization")
        );
    }

    #[test]
    fn preflight_rejected_test() {
        let client = client();
        let response = client
            .options("/api/orders")
            .header(Header::new("Origin", EVIL))
            .header(Header::new("Access-Control-Request-Method", "POST"))
            .dispatch();
        assert_eq!(response.status(), Status::Forbidden);
    }

    #[test]
    fn garbage_token_test() {
        let client = client();
        let response = client.get("/api/products").header(bearer("not.a.token")).dispatch();
        assert_eq!(response.status(), Status::Unauthorized);
        assert_eq!(message(response), INVALID_TOKEN_MESSAGE);
    }

    #[test]
    fn wrong_signature_token_test() {
        let client = client();
        let other = ServerContext {
            jwt_secret: Some(String::from("someone-else")),
            ..Default::default()
        };
        let (_, token) = token_for(Role::Customer, &other);
        // a public route that would otherwise answer 503 proves routing never ran
        let response = client.get("/api/products").header(bearer(&token)).dispatch();
        assert_eq!(response.status(), Status::Unauthorized);
        assert_eq!(message(response), INVALID_TOKEN_MESSAGE);
    }

    #[test]
    fn expired_token_test() {
        let client = client();
        let expired = ServerContext {
            token_ttl: -1,
            ..test_ctx()
        };
        let (_, token) = token_for(Role::Customer, &expired);
        let response = client.get("/api/users/me").header(bearer(&token)).dispatch();
        assert_eq!(response.status(), Status::Unauthorized);
        assert_eq!(message(response), INVALID_TOKEN_MESSAGE);
    }

    #[test]
    fn missing_secret_rejects_tokens_test() {
        let client = Client::tracked(build(ServerContext::default(), db::Store::unavailable()))
            .expect("valid rocket instance");
        let (_, token) = token_for(Role::Customer, &test_ctx());
        let response = client.get("/api/users/me").header(bearer(&token)).dispatch();
        assert_eq!(response.status(), Status::Unauthorized);
        assert_eq!(message(response), INVALID_TOKEN_MESSAGE);
    }

    #[test]
    fn empty_authorization_header_test() {
        let client = client();
        let response = client
            .get("/api/users/me")
            .header(Header::new("Authorization", ""))
            .dispatch();
        assert_eq!(response.status(), Status::Unauthorized);
        assert_eq!(message(response), LOGIN_REQUIRED_MESSAGE);
    }

    #[test]
    fn valid_token_attaches_identity_test() {
        let client = client();
        let (user, token) = token_for(Role::Customer, &test_ctx());
        let response = client.get("/api/users/me").header(bearer(&token)).dispatch();
        assert_eq!(response.status(), Status::Ok);
        let session = response.into_json::<SessionResponse>().expect("session");
        assert_eq!(session.claims.uid, user.uid);
        assert_eq!(session.claims.role, Role::Customer);
        // the prefix is optional
        let response = client
            .get("/api/users/me")
            .header(Header::new("Authorization", token))
            .dispatch();
        assert_eq!(response.status(), Status::Ok);
    }

    #[test]
    fn admin_capability_test() {
        let client = client();
        let body = r#"{"name":"Mug","price":1299,"qty":4}"#;
        let response = client
            .post("/api/products")
            .header(ContentType::JSON)
            .body(body)
            .dispatch();
        assert_eq!(response.status(), Status::Unauthorized);
        let (_, customer) = token_for(Role::Customer, &test_ctx());
        let response = client
            .post("/api/products")
            .header(ContentType::JSON)
            .header(bearer(&customer))
            .body(body)
            .dispatch();
        assert_eq!(response.status(), Status::Forbidden);
        let (_, admin) = token_for(Role::Admin, &test_ctx());
        let response = client
            .post("/api/products")
            .header(ContentType::JSON)
            .header(bearer(&admin))
            .body(body)
            .dispatch();
        assert_eq!(response.status(), Status::ServiceUnavailable);
    }

    #[test]
    fn protected_order_routes_test() {
        let client = client();
        let response = client.get("/api/orders").dispatch();
        assert_eq!(response.status(), Status::Unauthorized);
        assert_eq!(message(response), LOGIN_REQUIRED_MESSAGE);
        let (_, token) = token_for(Role::Customer, &test_ctx());
        let response = client.get("/api/orders").header(bearer(&token)).dispatch();
        assert_eq!(response.status(), Status::ServiceUnavailable);
    }

    #[test]
    fn unknown_route_test() {
        let client = client();
        let response = client.get("/api/carts").dispatch();
        assert_eq!(response.status(), Status::NotFound);
        assert_eq!(message(response), "Resource does not exist");
    }

    #[test]
    fn gate_routes_hidden_test() {
        let client = client();
        let response = client.get("/gate/unauthorized").dispatch();
        assert_eq!(response.status(), Status::NotFound);
        let response = client
            .get("/gate/cors")
            .header(Header::new("Origin", ALLOWED))
            .dispatch();
        assert_eq!(response.status(), Status::NotFound);
        assert_eq!(message(response), "Resource does not exist");
    }

    #[test]
    fn invalid_body_test() {
        let client = client();
        let response = client
            .post("/api/users/login")
            .header(ContentType::JSON)
            .body("{\"email\":")
            .dispatch();
        assert_eq!(response.status(), Status::BadRequest);
    }

    #[rocket::async_test]
    async fn startup_without_database_test() {
        let ctx = ServerContext {
            mongo_uri: Some(String::from("definitely not a uri")),
            ..test_ctx()
        };
        let store = db::connect(&ctx).await;
        assert!(!store.is_available());
        let client = rocket::local::asynchronous::Client::tracked(build(ctx, store))
            .await
            .expect("server starts without a database");
        let response = client.get("/api/products").dispatch().await;
        assert_eq!(response.status(), Status::ServiceUnavailable);
    }
}
