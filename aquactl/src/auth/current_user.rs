use crate::{
    AppState,
    api::models::users::CurrentUser,
    config::ProxyHeaderAuthConfig,
    db::{
        errors::DbError,
        handlers::{Repository, Users},
        models::users::UserCreateDBRequest,
    },
    errors::{Error, Result},
};
use axum::{extract::FromRequestParts, http::request::Parts};
use sqlx::PgPool;
use tracing::{debug, instrument, trace};

/// Email carried by the proxy header, if the request has a usable one.
fn header_email<'a>(parts: &'a Parts, proxy: &ProxyHeaderAuthConfig) -> Option<&'a str> {
    parts
        .headers
        .get(&proxy.header_name)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|email| !email.is_empty())
}

/// Look the email up, creating the user when `auto_create_users` allows it.
///
/// `Ok(None)` means the email is unknown and may not be provisioned.
#[instrument(skip(proxy, db), err)]
async fn resolve_user(email: &str, proxy: &ProxyHeaderAuthConfig, db: &PgPool) -> Result<Option<CurrentUser>> {
    let mut tx = db.begin().await.map_err(DbError::from)?;
    let mut users = Users::new(&mut tx);

    let user = match users.get_user_by_email(email).await? {
        Some(user) => Some(user),
        None if proxy.auto_create_users => {
            let created = users
                .create(&UserCreateDBRequest {
                    email: email.to_string(),
                    display_name: None,
                    role: proxy.default_role,
                    auth_source: "proxy-header".to_string(),
                })
                .await?;
            debug!(user_id = %created.id, role = ?created.role, "provisioned user from proxy header");
            Some(created)
        }
        None => None,
    };

    tx.commit().await.map_err(DbError::from)?;
    Ok(user.map(CurrentUser::from))
}

impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = Error;

    #[instrument(skip_all)]
    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self> {
        let proxy = &state.config.auth.proxy_header;
        if !proxy.enabled {
            return Err(Error::Unauthenticated { message: None });
        }

        let Some(email) = header_email(parts, proxy) else {
            trace!(header = %proxy.header_name, "request carries no user header");
            return Err(Error::Unauthenticated { message: None });
        };

        match resolve_user(email, proxy, &state.db).await? {
            Some(user) => {
                trace!(user_id = %user.id, "authenticated");
                Ok(user)
            }
            None => Err(Error::Unauthenticated {
                message: Some(format!("Unknown user {email}")),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::{
        api::models::users::{CurrentUser, Role},
        db::handlers::Users,
        errors::Error,
        test_utils::{create_test_config, create_test_state, create_test_user},
    };
    use axum::{extract::FromRequestParts as _, http::request::Parts};
    use sqlx::PgPool;

    fn create_test_parts_with_header(header_name: &str, header_value: &str) -> Parts {
        let request = axum::http::Request::builder()
            .uri("http://localhost/test")
            .header(header_name, header_value)
            .body(())
            .unwrap();

        let (parts, _body) = request.into_parts();
        parts
    }

    #[sqlx::test]
    async fn test_existing_user_extraction(pool: PgPool) {
        let state = create_test_state(pool.clone(), create_test_config());
        let test_user = create_test_user(&pool, Role::Manager).await;

        let mut parts = create_test_parts_with_header("x-aquactl-user", &test_user.email);
        let current_user = CurrentUser::from_request_parts(&mut parts, &state).await.unwrap();

        assert_eq!(current_user.id, test_user.id);
        assert_eq!(current_user.email, test_user.email);
        assert_eq!(current_user.role, Role::Manager);
    }

    #[sqlx::test]
    async fn test_auto_create_nonexistent_user(pool: PgPool) {
        let state = create_test_state(pool.clone(), create_test_config());

        let mut parts = create_test_parts_with_header("x-aquactl-user", "new.operator@example.com");
        let current_user = CurrentUser::from_request_parts(&mut parts, &state).await.unwrap();
        assert_eq!(current_user.email, "new.operator@example.com");
        assert_eq!(current_user.role, Role::Operator);

        let mut conn = pool.acquire().await.unwrap();
        let stored = Users::new(&mut conn)
            .get_user_by_email("new.operator@example.com")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.id, current_user.id);
        assert_eq!(stored.auth_source, "proxy-header");

        // A second request finds the same user instead of creating another
        let mut parts = create_test_parts_with_header("x-aquactl-user", "new.operator@example.com");
        let again = CurrentUser::from_request_parts(&mut parts, &state).await.unwrap();
        assert_eq!(again.id, current_user.id);
    }

    #[sqlx::test]
    async fn test_unknown_user_rejected_without_auto_create(pool: PgPool) {
        let mut config = create_test_config();
        config.auth.proxy_header.auto_create_users = false;
        let state = create_test_state(pool, config);

        let mut parts = create_test_parts_with_header("x-aquactl-user", "stranger@example.com");
        let result = CurrentUser::from_request_parts(&mut parts, &state).await;
        assert!(matches!(result, Err(Error::Unauthenticated { .. })));
    }

    #[sqlx::test]
    async fn test_missing_or_blank_header(pool: PgPool) {
        let state = create_test_state(pool, create_test_config());

        let request = axum::http::Request::builder().uri("http://localhost/test").body(()).unwrap();
        let (mut parts, _) = request.into_parts();
        let result = CurrentUser::from_request_parts(&mut parts, &state).await;
        assert!(matches!(result, Err(Error::Unauthenticated { .. })));

        let mut parts = create_test_parts_with_header("x-aquactl-user", "   ");
        let result = CurrentUser::from_request_parts(&mut parts, &state).await;
        assert!(matches!(result, Err(Error::Unauthenticated { .. })));
    }

    #[sqlx::test]
    async fn test_custom_header_name(pool: PgPool) {
        let mut config = create_test_config();
        config.auth.proxy_header.header_name = "x-forwarded-email".to_string();
        let state = create_test_state(pool.clone(), config);
        let test_user = create_test_user(&pool, Role::Viewer).await;

        let mut parts = create_test_parts_with_header("x-aquactl-user", &test_user.email);
        assert!(CurrentUser::from_request_parts(&mut parts, &state).await.is_err());

        let mut parts = create_test_parts_with_header("x-forwarded-email", &test_user.email);
        let current_user = CurrentUser::from_request_parts(&mut parts, &state).await.unwrap();
        assert_eq!(current_user.id, test_user.id);
    }
}
