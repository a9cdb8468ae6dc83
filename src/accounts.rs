use argon2::{
    Argon2, PasswordHash, PasswordHasher, PasswordVerifier,
    password_hash::{SaltString, rand_core::OsRng},
};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set, SqlErr,
};
use tracing::{info, warn};

use crate::{
    entities::user,
    error::{AppError, AppResult, SaveError, SaveResult},
    forms::{FieldErrors, accounts::Credentials},
};

#[derive(Clone)]
pub struct Accounts {
    db: DatabaseConnection,
}

impl Accounts {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    pub async fn find(&self, id: i32) -> AppResult<Option<user::Model>> {
        Ok(user::Entity::find_by_id(id).one(&self.db).await?)
    }

    pub async fn find_by_username(&self, username: &str) -> AppResult<Option<user::Model>> {
        Ok(user::Entity::find()
            .filter(user::Column::Username.eq(username))
            .one(&self.db)
            .await?)
    }

    /// The user owning `credentials`, if the password matches.
    pub async fn authenticate(&self, credentials: &Credentials) -> AppResult<Option<user::Model>> {
        let Some(user) = self.find_by_username(&credentials.username).await? else {
            return Ok(None);
        };
        if verify_password(&credentials.password, &user.password_hash) {
            Ok(Some(user))
        } else {
            Ok(None)
        }
    }

    pub async fn register(&self, credentials: &Credentials) -> SaveResult<user::Model> {
        if self.find_by_username(&credentials.username).await?.is_some() {
            return Err(taken());
        }

        let model = user::ActiveModel {
            username: Set(credentials.username.clone()),
            password_hash: Set(hash_password(&credentials.password)?),
            is_admin: Set(false),
            ..Default::default()
        };

        let user = model.insert(&self.db).await.map_err(|e| match e.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(_)) => taken(),
            _ => SaveError::from(e),
        })?;

        info!(user_id = user.id, username = %user.username, "user registered");
        Ok(user)
    }

    /// Creates the configured administrator, or resets an existing account of
    /// that name to administrator with the configured password.
    pub async fn ensure_admin(&self, username: &str, password: &str) -> AppResult<user::Model> {
        let password_hash = hash_password(password)?;
        let user = match self.find_by_username(username).await? {
            Some(existing) => {
                let mut model: user::ActiveModel = existing.into();
                model.password_hash = Set(password_hash);
                model.is_admin = Set(true);
                model.update(&self.db).await?
            },
            None => {
                user::ActiveModel {
                    username: Set(username.to_string()),
                    password_hash: Set(password_hash),
                    is_admin: Set(true),
                    ..Default::default()
                }
                .insert(&self.db)
                .await?
            },
        };

        info!(user_id = user.id, username = %user.username, "administrator account ready");
        Ok(user)
    }
}

fn taken() -> SaveError {
    SaveError::Invalid(FieldErrors::field_error("username", "A user with that username already exists."))
}

pub fn hash_password(password: &str) -> AppResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AppError::Other(anyhow::anyhow!("password hash error: {e}")))
}

pub fn verify_password(password: &str, hash: &str) -> bool {
    match PasswordHash::new(hash) {
        Ok(parsed) => Argon2::default().verify_password(password.as_bytes(), &parsed).is_ok(),
        Err(err) => {
            warn!(error = %err, "stored password hash is malformed");
            false
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support;

    fn creds(username: &str, password: &str) -> Credentials {
        Credentials { username: username.to_string(), password: password.to_string() }
    }

    #[tokio::test]
    async fn register_then_authenticate() {
        let accounts = Accounts::new(test_support::db().await);
        let user = accounts.register(&creds("reader", "correct horse")).await.unwrap();
        assert!(!user.is_admin);

        let found = accounts.authenticate(&creds("reader", "correct horse")).await.unwrap();
        assert_eq!(found.map(|u| u.id), Some(user.id));
        assert!(accounts.authenticate(&creds("reader", "wrong horse")).await.unwrap().is_none());
        assert!(accounts.authenticate(&creds("nobody", "correct horse")).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn usernames_are_unique() {
        let accounts = Accounts::new(test_support::db().await);
        accounts.register(&creds("reader", "correct horse")).await.unwrap();
        let err = accounts.register(&creds("reader", "another one")).await.unwrap_err();
        assert!(matches!(err, SaveError::Invalid(errors) if errors.field("username").len() == 1));
    }

    #[tokio::test]
    async fn ensure_admin_promotes_existing_user() {
        let accounts = Accounts::new(test_support::db().await);
        let user = accounts.register(&creds("boss", "correct horse")).await.unwrap();
        let admin = accounts.ensure_admin("boss", "new password").await.unwrap();
        assert_eq!(admin.id, user.id);
        assert!(admin.is_admin);
        assert!(accounts.authenticate(&creds("boss", "new password")).await.unwrap().is_some());
    }

    #[test]
    fn malformed_hash_never_verifies() {
        assert!(!verify_password("x", "not-a-hash"));
    }
}
