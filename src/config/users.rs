//! Initial admin account configuration from environment variables.
//!
//! On first start the user list is empty and nobody could administer staff, so one
//! admin is created from `PRODTRACK_ADMIN_*` variables loaded from `.env`.

/// Credentials for the first admin account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdminSeed {
    /// Display name
    pub name: String,
    /// Login name
    pub username: String,
    /// Contact address
    pub email: String,
    /// Plaintext password, hashed before storage
    pub password: String,
    /// Chat account to bind, so the admin can use the bot immediately
    pub chat_id: Option<String>,
}

/// Reads the admin seed from the environment.
///
/// Requires `PRODTRACK_ADMIN_USERNAME` and `PRODTRACK_ADMIN_PASSWORD`;
/// `PRODTRACK_ADMIN_NAME`, `PRODTRACK_ADMIN_EMAIL` and `PRODTRACK_ADMIN_CHAT_ID` are
/// optional.
///
/// # Returns
///
/// `None` when the required variables are not set.
#[must_use]
pub fn admin_seed_from_env() -> Option<AdminSeed> {
    let username = std::env::var("PRODTRACK_ADMIN_USERNAME").ok()?;
    let password = std::env::var("PRODTRACK_ADMIN_PASSWORD").ok()?;

    Some(AdminSeed {
        name: std::env::var("PRODTRACK_ADMIN_NAME").unwrap_or_else(|_| username.clone()),
        email: std::env::var("PRODTRACK_ADMIN_EMAIL").unwrap_or_default(),
        chat_id: std::env::var("PRODTRACK_ADMIN_CHAT_ID").ok(),
        username,
        password,
    })
}
