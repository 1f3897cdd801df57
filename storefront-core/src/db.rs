//! Logic for interfacing with the document store.
//!
//! The client is created once at startup. A missing or malformed
//! connection string leaves the store unavailable instead of stopping
//! the server; routes that need it answer 503.

use crate::{
    context::ServerContext,
    error::StorefrontError,
};
use log::{
    error,
    info,
};
use mongodb::{
    bson::doc,
    options::ClientOptions,
    Client,
    Collection,
    Database,
};
use rocket::fairing::AdHoc;

/// Handle to the database, cheap to clone
#[derive(Debug, Clone)]
pub struct Store {
    database: Option<Database>,
}

impl Store {
    pub fn unavailable() -> Self {
        Store { database: None }
    }

    pub fn is_available(&self) -> bool {
        self.database.is_some()
    }

    pub fn name(&self) -> Option<&str> {
        self.database.as_ref().map(|d| d.name())
    }

    pub fn collection<T: Send + Sync>(&self, name: &str) -> Result<Collection<T>, StorefrontError> {
        match &self.database {
            Some(d) => Ok(d.collection::<T>(name)),
            None => Err(StorefrontError::DatabaseUnavailable),
        }
    }

    pub async fn ping(&self) -> Result<(), StorefrontError> {
        let database = self.database.as_ref().ok_or(StorefrontError::DatabaseUnavailable)?;
        database.run_command(doc! { "ping": 1 }, None).await?;
        Ok(())
    }
}

/// Build the client from `MONGO_URI`.
///
/// This is the single connection attempt made by the process, failures
/// are logged and never retried.
pub async fn connect(ctx: &ServerContext) -> Store {
    let uri = match &ctx.mongo_uri {
        Some(u) => u,
        None => {
            error!("Database connection failed: MONGO_URI is not set");
            return Store::unavailable();
        }
    };
    let mut options = match ClientOptions::parse(uri).await {
        Ok(o) => o,
        Err(e) => {
            error!("Database connection failed: {}", e);
            return Store::unavailable();
        }
    };
    options.app_name = Some(String::from(crate::APP_NAME));
    let client = match Client::with_options(options) {
        Ok(c) => c,
        Err(e) => {
            error!("Database connection failed: {}", e);
            return Store::unavailable();
        }
    };
    let database = client
        .default_database()
        .unwrap_or_else(|| client.database(&ctx.mongo_db_name));
    info!("using database {}", database.name());
    Store {
        database: Some(database),
    }
}

/// One reachability check, the result is only logged
pub async fn check_connection(store: &Store) {
    if !store.is_available() {
        return;
    }
    match store.ping().await {
        Ok(_) => info!("Database connected successfully"),
        Err(e) => error!("Database connection failed: {}", e),
    }
}

/// Runs [`check_connection`] in the background once the server is up
pub fn check_on_liftoff() -> AdHoc {
    AdHoc::on_liftoff("Database check", |rocket| {
        Box::pin(async move {
            if let Some(store) = rocket.state::<Store>() {
                let store = store.clone();
                rocket::tokio::spawn(async move {
                    check_connection(&store).await;
                });
            }
        })
    })
}

/// Fresh database on the server named by `MONGO_URI`, `None` when the
/// variable is unset so store-backed tests can be skipped.
#[cfg(test)]
pub(crate) async fn test_store() -> Option<Store> {
    let uri = std::env::var("MONGO_URI").ok().filter(|u| !u.is_empty())?;
    let options = ClientOptions::parse(&uri).await.expect("valid MONGO_URI");
    let client = Client::with_options(options).expect("client");
    let rnd = crate::utils::generate_rnd();
    let name = format!("{}_test_{}", crate::APP_NAME, &rnd[..12]);
    Some(Store {
        database: Some(client.database(&name)),
    })
}

#[cfg(test)]
pub(crate) async fn drop_test_store(store: Store) {
    if let Some(database) = store.database {
        if let Err(e) = database.drop(None).await {
            error!("failed to drop {}: {}", database.name(), e);
        }
    }
}

// Tests
//-------------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx_with_uri(uri: Option<&str>) -> ServerContext {
        ServerContext {
            mongo_uri: uri.map(String::from),
            ..Default::default()
        }
    }

    #[rocket::async_test]
    async fn missing_uri_test() {
        let store = connect(&ctx_with_uri(None)).await;
        assert!(!store.is_available());
        assert!(matches!(
            store.collection::<mongodb::bson::Document>(crate::USER_COLLECTION),
            Err(StorefrontError::DatabaseUnavailable)
        ));
        assert!(matches!(store.ping().await, Err(StorefrontError::DatabaseUnavailable)));
    }

    #[rocket::async_test]
    async fn malformed_uri_test() {
        let store = connect(&ctx_with_uri(Some("not-a-connection-string"))).await;
        assert!(!store.is_available());
    }

    #[rocket::async_test]
    async fn ping_test() {
        let store = match test_store().await {
            Some(s) => s,
            None => return,
        };
        assert!(store.ping().await.is_ok());
        drop_test_store(store).await;
    }

    #[rocket::async_test]
    async fn database_name_test() {
        let store = connect(&ctx_with_uri(Some("mongodb://127.0.0.1:27017/shop"))).await;
        assert_eq!(store.name(), Some("shop"));
        let store = connect(&ctx_with_uri(Some("mongodb://127.0.0.1:27017"))).await;
        assert_eq!(store.name(), Some(crate::DEFAULT_DB_NAME));
    }
}
