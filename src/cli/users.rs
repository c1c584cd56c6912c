// Account commands for operators

use std::sync::Arc;

use crate::app_data::AppData;
use crate::coordinators::AuthCoordinator;
use crate::providers::crypto_provider::generate_secure_password;
use crate::types::db::user;
use crate::types::internal::auth::Role;
use crate::types::internal::context::RequestContext;

/// An account created from the command line
pub struct CreatedUser {
    pub user: user::Model,
    /// Generated password, shown once
    pub password: String,
}

/// Create an account with a generated password and print the credentials
///
/// # Arguments
/// * `app_data` - Application data containing all stores and providers
/// * `email` - Email of the new account
/// * `role` - Role name as typed (`admin`, `editor`, ...)
pub async fn create_user(
    app_data: &AppData,
    email: &str,
    role: &str,
) -> Result<CreatedUser, Box<dyn std::error::Error>> {
    let role = Role::parse(role).ok_or_else(|| format!("Unknown role '{}'", role))?;

    let password = generate_secure_password();
    let password_hash = app_data.crypto_provider.hash_password(&password)?;

    let user = app_data
        .user_store
        .create(&app_data.db, email, password_hash, role, app_data.clock.now_timestamp())
        .await?;

    tracing::info!(user_id = %user.id, role = %user.role, "User created from CLI");

    println!("✅ User created");
    println!("   ID:       {}", user.id);
    println!("   Email:    {}", user.email);
    println!("   Role:     {}", user.role);
    println!("   Password: {}", password);
    println!();
    println!("⚠️  Store this password now. It will not be shown again.");

    Ok(CreatedUser { user, password })
}

/// Issue a password reset token and print it for the operator
///
/// Prints nothing secret when the email has no active account.
pub async fn issue_reset_token(
    app_data: Arc<AppData>,
    email: &str,
) -> Result<Option<String>, Box<dyn std::error::Error>> {
    let coordinator = AuthCoordinator::new(app_data);
    let ctx = RequestContext::for_cli();

    let token = coordinator.begin_password_reset(&ctx, email).await?;

    match &token {
        Some(token) => {
            println!("✅ Reset token issued for {} (valid for 1 hour)", email);
            println!("   Token: {}", token);
        }
        None => {
            println!("❌ No active account for {}", email);
        }
    }

    Ok(token)
}
