// User repo/service layer
use crate::{
    auth,
    db::Store,
    error::StorefrontError,
    models::*,
    reqres,
    utils,
};
use futures::TryStreamExt;
use log::{
    debug,
    error,
    info,
};
use mongodb::{
    bson::{
        doc,
        Document,
    },
    options::{
        FindOneAndUpdateOptions,
        FindOptions,
        ReturnDocument,
    },
};

fn users(store: &Store) -> Result<mongodb::Collection<User>, StorefrontError> {
    store.collection::<User>(crate::USER_COLLECTION)
}

pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// check registration fields before touching the database
pub fn validate_registration(r: &reqres::RegisterRequest) -> Result<(), StorefrontError> {
    let name = r.name.trim();
    if name.is_empty() || name.len() >= utils::string_limit() {
        return Err(StorefrontError::Validation(String::from("Name is required")));
    }
    validate_email(&r.email)?;
    validate_password(&r.password)
}

fn validate_email(email: &str) -> Result<(), StorefrontError> {
    let email = email.trim();
    let valid = email.len() < utils::string_limit()
        && match email.split_once('@') {
            Some((local, domain)) => !local.is_empty() && domain.contains('.'),
            None => false,
        };
    if !valid {
        return Err(StorefrontError::Validation(String::from("A valid email is required")));
    }
    Ok(())
}

fn validate_password(password: &str) -> Result<(), StorefrontError> {
    if password.len() < utils::password_min() || password.len() >= utils::string_limit() {
        return Err(StorefrontError::Validation(format!(
            "Password must be at least {} characters",
            utils::password_min()
        )));
    }
    Ok(())
}

/// Create a new customer
pub async fn create(store: &Store, r: &reqres::RegisterRequest) -> Result<User, StorefrontError> {
    validate_registration(r)?;
    let email = normalize_email(&r.email);
    if find_by_email(store, &email).await?.is_some() {
        info!("registration with existing email rejected");
        return Err(StorefrontError::Conflict(String::from("Email already registered")));
    }
    let salt = utils::generate_rnd();
    let new_user = User {
        uid: utils::generate_id(crate::USER_DB_KEY),
        name: String::from(r.name.trim()),
        email,
        password_hash: auth::hash_password(&r.password, &salt)?,
        salt,
        role: Role::Customer,
        created: utils::now(),
    };
    debug!("insert user: {}", &new_user.uid);
    users(store)?.insert_one(&new_user, None).await?;
    Ok(new_user)
}

/// User lookup
pub async fn find(store: &Store, uid: &str) -> Result<User, StorefrontError> {
    let user = users(store)?.find_one(doc! { "_id": uid }, None).await?;
    user.ok_or_else(|| {
        error!("user not found");
        StorefrontError::NotFound("user")
    })
}

pub async fn find_by_email(store: &Store, email: &str) -> Result<Option<User>, StorefrontError> {
    let user = users(store)?
        .find_one(doc! { "email": normalize_email(email) }, None)
        .await?;
    Ok(user)
}

/// Check credentials. Unknown email and wrong password look the same.
pub async fn login(store: &Store, r: &reqres::LoginRequest) -> Result<User, StorefrontError> {
    let user = match find_by_email(store, &r.email).await? {
        Some(u) => u,
        None => return Err(StorefrontError::Credentials),
    };
    if !auth::verify_password(&r.password, &user.salt, &user.password_hash) {
        debug!("password mismatch for {}", &user.uid);
        return Err(StorefrontError::Credentials);
    }
    info!("user {} logged in", &user.uid);
    Ok(user)
}

/// Modify name and/or password
pub async fn modify(
    store: &Store,
    uid: &str,
    r: &reqres::ProfileUpdateRequest,
) -> Result<User, StorefrontError> {
    let mut changes = Document::new();
    if let Some(name) = &r.name {
        let name = name.trim();
        if name.is_empty() || name.len() >= utils::string_limit() {
            return Err(StorefrontError::Validation(String::from("Name is required")));
        }
        changes.insert("name", name);
    }
    if let Some(password) = &r.password {
        validate_password(password)?;
        let salt = utils::generate_rnd();
        changes.insert("password_hash", auth::hash_password(password, &salt)?);
        changes.insert("salt", salt);
    }
    if changes.is_empty() {
        return Err(StorefrontError::Validation(String::from("Nothing to update")));
    }
    info!("modify user: {}", uid);
    let options = FindOneAndUpdateOptions::builder()
        .return_document(ReturnDocument::After)
        .build();
    let updated = users(store)?
        .find_one_and_update(doc! { "_id": uid }, doc! { "$set": changes }, options)
        .await?;
    updated.ok_or(StorefrontError::NotFound("user"))
}

/// User lookup for all, newest first
pub async fn find_all(store: &Store) -> Result<Vec<User>, StorefrontError> {
    let options = FindOptions::builder().sort(doc! { "created": -1 }).build();
    let cursor = users(store)?.find(None, options).await?;
    let all: Vec<User> = cursor.try_collect().await?;
    Ok(all)
}

// Tests
//-------------------------------------------------------------------------------
