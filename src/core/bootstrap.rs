use crate::core::security;
use crate::core::state::AppState;
use crate::core::time::primitive_now_utc;
use crate::db::types::UserRole;
use crate::repositories;

/// Makes sure the configured administrator exists, is active and holds the admin role.
pub(crate) async fn ensure_superuser(state: &AppState) -> anyhow::Result<()> {
    let admin = state.settings().admin();
    if admin.first_superuser_password.is_empty() {
        tracing::warn!("FIRST_SUPERUSER_PASSWORD not configured; skipping superuser creation");
        return Ok(());
    }

    let username = admin.first_superuser_username.as_str();
    let email = admin.first_superuser_email.as_str();
    let now = primitive_now_utc();

    let existing = match repositories::users::find_by_username(state.db(), username).await? {
        Some(user) => Some(user),
        None => repositories::users::find_by_email(state.db(), email).await?,
    };

    let Some(user) = existing else {
        let hashed_password = security::hash_password(&admin.first_superuser_password)?;
        let user = repositories::users::create(
            state.db(),
            repositories::users::CreateUser {
                username,
                email: Some(email),
                full_name: "Administrator",
                hashed_password,
                role: Some(UserRole::Admin),
                created_at: now,
            },
        )
        .await?;

        tracing::info!(user_id = user.id, username, "Created default superuser");
        return Ok(());
    };

    let password_matches =
        security::verify_password(&admin.first_superuser_password, &user.hashed_password)
            .unwrap_or(false);
    let needs_update =
        !password_matches || user.role != Some(UserRole::Admin) || !user.is_active;

    if !needs_update {
        tracing::info!(user_id = user.id, "Default superuser already up to date");
        return Ok(());
    }

    let hashed_password = if password_matches {
        None
    } else {
        Some(security::hash_password(&admin.first_superuser_password)?)
    };

    repositories::users::update(
        state.db(),
        user.id,
        repositories::users::UpdateUser {
            full_name: None,
            role: Some(UserRole::Admin),
            is_active: Some(true),
            hashed_password,
            updated_at: now,
        },
    )
    .await?;

    tracing::info!(user_id = user.id, username = %user.username, "Updated default superuser");
    Ok(())
}
