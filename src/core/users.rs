//! Staff account business logic.
//!
//! Only admins manage accounts. Usernames are unique ignoring case, passwords are
//! stored as salted Argon2 hashes, and the last remaining admin can be neither deleted
//! nor demoted.

use crate::{
    config::users::AdminSeed,
    core::{
        audit,
        notify::{Notice, Notifier},
        permissions::{self, CAN_ADMINISTER},
    },
    errors::{Error, Result},
    models::{LogAction, LogEntry, Role, User},
    store::{Collection, Store},
};
use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use tracing::info;
use uuid::Uuid;

const MIN_PASSWORD_LEN: usize = 6;

/// Input for [`add_user`].
#[derive(Debug, Clone)]
pub struct NewUser {
    /// Display name
    pub name: String,
    /// Login name
    pub username: String,
    /// Contact address
    pub email: String,
    /// Access role
    pub role: Role,
    /// Plaintext password, hashed before storage
    pub password: String,
    /// Chat account to bind
    pub chat_id: Option<String>,
}

/// Hashes a password with Argon2 and a random salt.
pub fn hash_password(password: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| Error::Persistence {
            message: format!("Failed to hash password: {e}"),
        })
}

/// Checks a password against a stored hash. Unparseable hashes never verify.
#[must_use]
pub fn verify_password(password: &str, hash: &str) -> bool {
    PasswordHash::new(hash).is_ok_and(|parsed| {
        Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok()
    })
}

fn validate_password(password: &str) -> Result<()> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(Error::validation(format!(
            "Password must be at least {MIN_PASSWORD_LEN} characters"
        )));
    }
    Ok(())
}

fn not_found(id: &str) -> Error {
    Error::NotFound {
        kind: "User",
        id: id.to_string(),
    }
}

fn admin_count(users: &[User]) -> usize {
    users.iter().filter(|u| u.role == Role::Admin).count()
}

/// All users, ordered by username.
pub async fn list_users<S: Store>(store: &S) -> Result<Vec<User>> {
    let mut users: Vec<User> = store.get(Collection::Users).await?;
    users.sort_by_key(|u| u.username.to_lowercase());
    Ok(users)
}

/// Finds a user by username, ignoring case.
pub async fn find_by_username<S: Store>(store: &S, username: &str) -> Result<Option<User>> {
    let wanted = username.trim();
    let users: Vec<User> = store.get(Collection::Users).await?;
    Ok(users
        .into_iter()
        .find(|u| u.username.eq_ignore_ascii_case(wanted)))
}

/// Finds the user bound to a chat account.
pub async fn find_by_chat_id<S: Store>(store: &S, chat_id: &str) -> Result<Option<User>> {
    let users: Vec<User> = store.get(Collection::Users).await?;
    Ok(users
        .into_iter()
        .find(|u| u.chat_id.as_deref() == Some(chat_id)))
}

/// Verifies credentials. Unknown usernames and wrong passwords fail the same way.
pub async fn authenticate<S: Store>(store: &S, username: &str, password: &str) -> Result<User> {
    let user = find_by_username(store, username).await?;

    match user {
        Some(user) if verify_password(password, &user.password_hash) => Ok(user),
        _ => Err(Error::Permission {
            role: "anonymous".to_string(),
            action: "sign in with these credentials",
        }),
    }
}

/// Runs `f` over the users and appends the log line it describes, committing both
/// together. `f` returns its result and the log details.
async fn modify_logged<S, R, F>(
    store: &S,
    actor: &User,
    action: LogAction,
    f: F,
) -> Result<(R, LogEntry)>
where
    S: Store,
    R: Send,
    F: FnOnce(&mut Vec<User>) -> Result<(R, String)> + Send,
{
    let actor = actor.clone();
    let (result, line) = store
        .modify_pair(
            Collection::Users,
            Collection::ActivityLog,
            move |users: &mut Vec<User>, log: &mut Vec<LogEntry>| {
                let (result, details) = f(users)?;
                let line = audit::record(&actor, action, details);
                log.push(line.clone());
                Ok((result, line))
            },
        )
        .await?;

    audit::trace(&line);
    Ok((result, line))
}

/// Creates a staff account.
pub async fn add_user<S: Store>(
    store: &S,
    notifier: &dyn Notifier,
    actor: &User,
    new_user: NewUser,
) -> Result<User> {
    permissions::ensure_allowed(actor.role, CAN_ADMINISTER, "manage users")?;

    let user = prepare_user(new_user)?;
    let record = user.clone();
    let ((), line) = modify_logged(store, actor, LogAction::AddUser, move |users| {
        let details = format!("Added user {} ({})", record.username, record.role);
        push_unique(users, record)?;
        Ok(((), details))
    })
    .await?;
    notifier.notify(Notice::success(line.details));

    info!(user_id = %user.id, role = %user.role, "User added");
    Ok(user)
}

/// Validates a new account and hashes its password.
fn prepare_user(new_user: NewUser) -> Result<User> {
    let username = new_user.username.trim().to_string();
    if username.is_empty() {
        return Err(Error::validation("Username cannot be empty"));
    }
    let name = new_user.name.trim().to_string();
    if name.is_empty() {
        return Err(Error::validation("Name cannot be empty"));
    }
    validate_password(&new_user.password)?;

    Ok(User {
        id: Uuid::new_v4().to_string(),
        name,
        username,
        email: new_user.email.trim().to_string(),
        role: new_user.role,
        password_hash: hash_password(&new_user.password)?,
        chat_id: new_user.chat_id,
    })
}

fn push_unique(users: &mut Vec<User>, user: User) -> Result<()> {
    if users
        .iter()
        .any(|u| u.username.eq_ignore_ascii_case(&user.username))
    {
        return Err(Error::validation(format!(
            "Username '{}' is already taken",
            user.username
        )));
    }
    users.push(user);
    Ok(())
}

/// Deletes a staff account. The last admin cannot be deleted.
pub async fn delete_user<S: Store>(
    store: &S,
    notifier: &dyn Notifier,
    actor: &User,
    user_id: &str,
) -> Result<User> {
    permissions::ensure_allowed(actor.role, CAN_ADMINISTER, "manage users")?;

    let target = user_id.to_string();
    let (removed, line) = modify_logged(store, actor, LogAction::DeleteUser, move |users| {
        let index = users
            .iter()
            .position(|u| u.id == target)
            .ok_or_else(|| not_found(&target))?;

        if users[index].role == Role::Admin && admin_count(users) <= 1 {
            return Err(Error::validation("Cannot delete the last admin"));
        }
        let removed = users.remove(index);
        let details = format!("Deleted user {}", removed.username);
        Ok((removed, details))
    })
    .await?;
    notifier.notify(Notice::success(line.details));

    info!(user_id = %removed.id, "User deleted");
    Ok(removed)
}

/// Changes a user's role. The last admin cannot be demoted.
pub async fn change_role<S: Store>(
    store: &S,
    notifier: &dyn Notifier,
    actor: &User,
    user_id: &str,
    role: Role,
) -> Result<User> {
    permissions::ensure_allowed(actor.role, CAN_ADMINISTER, "manage users")?;

    let target = user_id.to_string();
    let (updated, line) = modify_logged(store, actor, LogAction::ChangeRole, move |users| {
        let admins = admin_count(users);
        let user = users
            .iter_mut()
            .find(|u| u.id == target)
            .ok_or_else(|| not_found(&target))?;

        let old_role = user.role;
        if old_role == Role::Admin && role != Role::Admin && admins <= 1 {
            return Err(Error::validation("Cannot demote the last admin"));
        }
        user.role = role;
        let details = format!("Changed role of {} ({old_role} → {role})", user.username);
        Ok((user.clone(), details))
    })
    .await?;
    notifier.notify(Notice::success(line.details));

    info!(user_id = %updated.id, role = %updated.role, "Role changed");
    Ok(updated)
}

/// Replaces a user's password.
pub async fn reset_password<S: Store>(
    store: &S,
    notifier: &dyn Notifier,
    actor: &User,
    user_id: &str,
    password: &str,
) -> Result<User> {
    permissions::ensure_allowed(actor.role, CAN_ADMINISTER, "manage users")?;
    validate_password(password)?;

    let hash = hash_password(password)?;
    let target = user_id.to_string();
    let (updated, line) = modify_logged(store, actor, LogAction::ResetPassword, move |users| {
        let user = users
            .iter_mut()
            .find(|u| u.id == target)
            .ok_or_else(|| not_found(&target))?;
        user.password_hash = hash;
        let details = format!("Reset password of {}", user.username);
        Ok((user.clone(), details))
    })
    .await?;
    notifier.notify(Notice::success(line.details));
    Ok(updated)
}

/// Binds a chat account to a user, unbinding it from anyone else.
pub async fn link_chat<S: Store>(
    store: &S,
    notifier: &dyn Notifier,
    actor: &User,
    user_id: &str,
    chat_id: &str,
) -> Result<User> {
    permissions::ensure_allowed(actor.role, CAN_ADMINISTER, "manage users")?;

    let target = user_id.to_string();
    let chat = chat_id.trim().to_string();
    if chat.is_empty() {
        return Err(Error::validation("Chat id cannot be empty"));
    }

    let (updated, line) = modify_logged(store, actor, LogAction::LinkChat, move |users| {
        if !users.iter().any(|u| u.id == target) {
            return Err(not_found(&target));
        }
        for user in users.iter_mut() {
            if user.chat_id.as_deref() == Some(chat.as_str()) {
                user.chat_id = None;
            }
        }
        let user = users
            .iter_mut()
            .find(|u| u.id == target)
            .ok_or_else(|| not_found(&target))?;
        user.chat_id = Some(chat);
        let details = format!("Linked chat account to {}", user.username);
        Ok((user.clone(), details))
    })
    .await?;
    notifier.notify(Notice::success(line.details));
    Ok(updated)
}

/// Creates the first admin when the user list is empty. Returns the created account,
/// or `None` if users already exist.
pub async fn seed_admin<S: Store>(store: &S, seed: AdminSeed) -> Result<Option<User>> {
    let users: Vec<User> = store.get(Collection::Users).await?;
    if !users.is_empty() {
        return Ok(None);
    }

    let admin = prepare_user(NewUser {
        name: seed.name,
        username: seed.username,
        email: seed.email,
        role: Role::Admin,
        password: seed.password,
        chat_id: seed.chat_id,
    })?;
    let record = admin.clone();
    store
        .modify(Collection::Users, move |users: &mut Vec<User>| {
            push_unique(users, record)
        })
        .await?;

    info!("Seeded initial admin '{}'", admin.username);
    Ok(Some(admin))
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::{
        core::notify::CollectingNotifier,
        test_utils::{admin_user, operator_user, setup_memory_store},
    };

    fn new_user(username: &str, role: Role) -> NewUser {
        NewUser {
            name: username.to_string(),
            username: username.to_string(),
            email: format!("{username}@example.com"),
            role,
            password: "secret-pass".to_string(),
            chat_id: None,
        }
    }

    #[test]
    fn test_password_hash_roundtrip() -> Result<()> {
        let hash = hash_password("hunter22")?;
        assert_ne!(hash, "hunter22");
        assert!(verify_password("hunter22", &hash));
        assert!(!verify_password("hunter23", &hash));
        assert!(!verify_password("hunter22", "not-a-hash"));
        Ok(())
    }

    #[tokio::test]
    async fn test_add_user_and_authenticate() -> Result<()> {
        let store = setup_memory_store().await?;
        let notifier = CollectingNotifier::new();
        let admin = admin_user();

        let user = add_user(&store, &notifier, &admin, new_user("Rahim", Role::Operator)).await?;
        assert_eq!(user.role, Role::Operator);
        assert_ne!(user.password_hash, "secret-pass");

        let signed_in = authenticate(&store, "rahim", "secret-pass").await?;
        assert_eq!(signed_in.id, user.id);

        let err = authenticate(&store, "rahim", "wrong-pass").await.unwrap_err();
        assert!(matches!(err, Error::Permission { .. }));
        let err = authenticate(&store, "nobody", "secret-pass").await.unwrap_err();
        assert!(matches!(err, Error::Permission { .. }));

        let log = audit::recent(&store, 10).await?;
        assert_eq!(log.len(), 1);
        assert_eq!(log[0].action, LogAction::AddUser);
        assert_eq!(notifier.take().len(), 1);
        Ok(())
    }

    #[tokio::test]
    async fn test_add_user_rules() -> Result<()> {
        let store = setup_memory_store().await?;
        let notifier = CollectingNotifier::new();
        let admin = admin_user();

        add_user(&store, &notifier, &admin, new_user("karim", Role::Planner)).await?;

        let err = add_user(&store, &notifier, &admin, new_user("KARIM", Role::Planner))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Validation { .. }));

        let mut short = new_user("salma", Role::Planner);
        short.password = "12345".to_string();
        let err = add_user(&store, &notifier, &admin, short).await.unwrap_err();
        assert!(matches!(err, Error::Validation { .. }));

        let err = add_user(&store, &notifier, &operator_user(), new_user("x", Role::Admin))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Permission { .. }));

        assert_eq!(list_users(&store).await?.len(), 1);
        Ok(())
    }

    #[tokio::test]
    async fn test_last_admin_is_protected() -> Result<()> {
        let store = setup_memory_store().await?;
        let notifier = CollectingNotifier::new();
        let admin = admin_user();

        let first = add_user(&store, &notifier, &admin, new_user("boss", Role::Admin)).await?;
        let second = add_user(&store, &notifier, &admin, new_user("deputy", Role::Admin)).await?;

        // Two admins: one may go.
        delete_user(&store, &notifier, &admin, &second.id).await?;

        let err = delete_user(&store, &notifier, &admin, &first.id).await.unwrap_err();
        assert!(matches!(err, Error::Validation { .. }));

        let err = change_role(&store, &notifier, &admin, &first.id, Role::Manager)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Validation { .. }));

        let users = list_users(&store).await?;
        assert_eq!(users.len(), 1);
        assert_eq!(users[0].role, Role::Admin);
        Ok(())
    }

    #[tokio::test]
    async fn test_change_role_and_reset_password() -> Result<()> {
        let store = setup_memory_store().await?;
        let notifier = CollectingNotifier::new();
        let admin = admin_user();

        let user = add_user(&store, &notifier, &admin, new_user("nadia", Role::Operator)).await?;
        let updated = change_role(&store, &notifier, &admin, &user.id, Role::Manager).await?;
        assert_eq!(updated.role, Role::Manager);

        reset_password(&store, &notifier, &admin, &user.id, "another-pass").await?;
        assert!(authenticate(&store, "nadia", "secret-pass").await.is_err());
        assert_eq!(authenticate(&store, "nadia", "another-pass").await?.id, user.id);

        let err = reset_password(&store, &notifier, &admin, "missing", "another-pass")
            .await
            .unwrap_err();
        assert!(matches!(err, Error::NotFound { .. }));

        let log = audit::recent(&store, 10).await?;
        assert_eq!(log[0].action, LogAction::ResetPassword);
        assert_eq!(log[1].action, LogAction::ChangeRole);
        assert!(log[1].details.contains("operator → manager"));
        Ok(())
    }

    #[tokio::test]
    async fn test_link_chat_moves_binding() -> Result<()> {
        let store = setup_memory_store().await?;
        let notifier = CollectingNotifier::new();
        let admin = admin_user();

        let a = add_user(&store, &notifier, &admin, new_user("alpha", Role::Operator)).await?;
        let b = add_user(&store, &notifier, &admin, new_user("beta", Role::Operator)).await?;

        link_chat(&store, &notifier, &admin, &a.id, "12345").await?;
        assert_eq!(find_by_chat_id(&store, "12345").await?.map(|u| u.id), Some(a.id.clone()));

        link_chat(&store, &notifier, &admin, &b.id, "12345").await?;
        assert_eq!(find_by_chat_id(&store, "12345").await?.map(|u| u.id), Some(b.id));
        let alpha = find_by_username(&store, "alpha").await?;
        assert_eq!(alpha.and_then(|u| u.chat_id), None);
        Ok(())
    }

    #[tokio::test]
    async fn test_unwritable_log_leaves_users_untouched() -> Result<()> {
        let store = setup_memory_store().await?;
        let notifier = CollectingNotifier::new();
        let admin = admin_user();
        let user = add_user(&store, &notifier, &admin, new_user("farid", Role::Operator)).await?;
        store.put(Collection::ActivityLog, &[1_u32]).await?;
        let users_before = store.raw(Collection::Users)?;

        let err = change_role(&store, &notifier, &admin, &user.id, Role::Manager)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Persistence { .. }));
        let err = add_user(&store, &notifier, &admin, new_user("lina", Role::Planner))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Persistence { .. }));

        assert_eq!(store.raw(Collection::Users)?, users_before);
        Ok(())
    }

    #[tokio::test]
    async fn test_seed_admin_only_when_empty() -> Result<()> {
        let store = setup_memory_store().await?;
        let seed = AdminSeed {
            name: "Owner".to_string(),
            username: "owner".to_string(),
            email: String::new(),
            password: "owner-pass".to_string(),
            chat_id: Some("42".to_string()),
        };

        let created = seed_admin(&store, seed.clone()).await?;
        assert!(created.is_some_and(|u| u.role == Role::Admin));
        assert!(seed_admin(&store, seed).await?.is_none());
        assert_eq!(list_users(&store).await?.len(), 1);
        assert!(find_by_chat_id(&store, "42").await?.is_some());
        Ok(())
    }
}
