//! Registration, login and admin user management.

use crate::error::{ApiError, ApiResult};
use crate::password::{hash_password_blocking, verify_password_blocking};
use crate::sessions::SessionStore;
use crate::store::{Store, UserRecord};
use tracing::{info, warn};
use voiceease_shared::{Credentials, Principal, Role, RoleUpdate, VoiceEaseError};

/// Create a `user` account. Duplicate usernames are a validation error.
pub async fn register(
    store: &Store,
    credentials: Credentials,
    iterations: u32,
) -> ApiResult<UserRecord> {
    let creds = credentials.validate()?;
    if store.get_user_by_username(&creds.username)?.is_some() {
        return Err(VoiceEaseError::validation("username", "Username already exists").into());
    }

    let hash = hash_password_blocking(creds.password, iterations).await?;
    // A concurrent registration can still win the UNIQUE constraint
    let user = match store.create_user(&creds.username, &hash, Role::User) {
        Ok(user) => user,
        Err(_) if store.get_user_by_username(&creds.username)?.is_some() => {
            return Err(VoiceEaseError::validation("username", "Username already exists").into());
        }
        Err(e) => return Err(e.into()),
    };
    info!(user_id = user.id, "Registered user {}", user.username);
    Ok(user)
}

/// Check credentials. Unknown users and wrong passwords are both 401.
pub async fn authenticate(store: &Store, credentials: Credentials) -> ApiResult<UserRecord> {
    let creds = credentials.validate().map_err(|_| ApiError::unauthorized())?;
    let Some(user) = store.get_user_by_username(&creds.username)? else {
        warn!("Login failed for unknown user");
        return Err(ApiError::unauthorized());
    };
    if !verify_password_blocking(creds.password, user.password_hash.clone()).await? {
        warn!(user_id = user.id, "Login failed: bad password");
        return Err(ApiError::unauthorized());
    }
    Ok(user)
}

/// Admin delete. Admins cannot delete themselves. The user's agent requests
/// go with them and their sessions are ended.
pub async fn delete_user(
    store: &Store,
    sessions: &SessionStore,
    admin: &Principal,
    user_id: i64,
) -> ApiResult<()> {
    if store.get_user(user_id)?.is_none() {
        return Err(ApiError::not_found("User"));
    }
    if admin.id == user_id {
        return Err(VoiceEaseError::invalid("Cannot delete your own account").into());
    }

    store.delete_user(user_id)?;
    let ended = sessions.remove_user(user_id).await;
    info!(
        user_id,
        admin_id = admin.id,
        sessions_ended = ended,
        "Deleted user and their agent requests"
    );
    Ok(())
}

/// Admin role change
pub fn set_role(store: &Store, user_id: i64, update: RoleUpdate) -> ApiResult<UserRecord> {
    let role = update.validate()?;
    let user = store
        .update_user_role(user_id, role)?
        .ok_or_else(|| ApiError::not_found("User"))?;
    info!(user_id, role = %role, "Updated user role");
    Ok(user)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    const FAST: u32 = 1_000;

    fn creds(user: &str, pass: &str) -> Credentials {
        Credentials {
            username: Some(user.into()),
            password: Some(pass.into()),
        }
    }

    #[tokio::test]
    async fn test_register_then_login() {
        let store = Store::open_in_memory().unwrap();
        let user = register(&store, creds("jo@shop.com", "secret1"), FAST)
            .await
            .unwrap();
        assert_eq!(user.role, Role::User);
        assert!(user.password_hash.starts_with("pbkdf2-sha256$1000$"));

        let again = authenticate(&store, creds("jo@shop.com", "secret1"))
            .await
            .unwrap();
        assert_eq!(again.id, user.id);
        assert!(authenticate(&store, creds("jo@shop.com", "wrong12")).await.is_err());
        assert!(authenticate(&store, creds("nobody@shop.com", "secret1"))
            .await
            .is_err());
    }

    #[tokio::test]
    async fn test_duplicate_username_rejected() {
        let store = Store::open_in_memory().unwrap();
        register(&store, creds("jo@shop.com", "secret1"), FAST)
            .await
            .unwrap();
        let err = register(&store, creds("JO@shop.com", "secret2"), FAST)
            .await
            .unwrap_err();
        assert_eq!(err.0.to_string(), "Username already exists");
    }

    #[tokio::test]
    async fn test_admin_cannot_delete_self() {
        let store = Store::open_in_memory().unwrap();
        let sessions = SessionStore::new(10, Duration::from_secs(60));
        let admin = store.create_user("root@shop.com", "x", Role::Admin).unwrap();

        let err = delete_user(&store, &sessions, &admin.principal(), admin.id)
            .await
            .unwrap_err();
        assert_eq!(err.0.status_code(), 400);

        let err = delete_user(&store, &sessions, &admin.principal(), 999)
            .await
            .unwrap_err();
        assert_eq!(err.0.status_code(), 404);
    }

    #[tokio::test]
    async fn test_delete_user_ends_sessions() {
        let store = Store::open_in_memory().unwrap();
        let sessions = SessionStore::new(10, Duration::from_secs(60));
        let admin = store.create_user("root@shop.com", "x", Role::Admin).unwrap();
        let user = store.create_user("jo@shop.com", "x", Role::User).unwrap();
        let token = sessions.create(user.id).await;

        delete_user(&store, &sessions, &admin.principal(), user.id)
            .await
            .unwrap();
        assert_eq!(sessions.user_id(&token).await, None);
        assert!(store.get_user(user.id).unwrap().is_none());
    }

    #[test]
    fn test_set_role() {
        let store = Store::open_in_memory().unwrap();
        let user = store.create_user("jo@shop.com", "x", Role::User).unwrap();
        let updated = set_role(
            &store,
            user.id,
            RoleUpdate {
                role: Some("admin".into()),
            },
        )
        .unwrap();
        assert_eq!(updated.role, Role::Admin);

        let err = set_role(
            &store,
            user.id,
            RoleUpdate {
                role: Some("root".into()),
            },
        )
        .unwrap_err();
        assert_eq!(err.0.to_string(), "Invalid role");
    }
}
