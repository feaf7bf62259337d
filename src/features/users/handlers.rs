use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use tracing::info;

use crate::{
    features::users::schemas::{AuthResponse, LoginSchema, RegisterSchema, UserOut},
    utilities::{
        app_state::Users,
        config::Config,
        errors::AppError,
        jwt::{Claims, create_token},
    },
};

pub async fn register_handler(
    State(users): State<Users>,
    State(config): State<Config>,
    Json(schema): Json<RegisterSchema>,
) -> Result<impl IntoResponse, AppError> {
    let new_user = schema.into_new_user(config.bcrypt_cost)?;
    let user = users.create(new_user).await?;
    info!(user_id = %user.id, "user registered");

    let access_token = create_token(&config, user.id)?;

    Ok((
        StatusCode::CREATED,
        Json(AuthResponse {
            user: UserOut::from(&user),
            access_token,
        }),
    ))
}

pub async fn login_handler(
    State(users): State<Users>,
    State(config): State<Config>,
    Json(schema): Json<LoginSchema>,
) -> Result<impl IntoResponse, AppError> {
    let user = schema.verify(users.as_ref()).await?;
    let access_token = create_token(&config, user.id)?;

    Ok(Json(AuthResponse {
        user: UserOut::from(&user),
        access_token,
    }))
}

pub async fn get_profile_handler(
    claims: Claims,
    State(users): State<Users>,
) -> Result<impl IntoResponse, AppError> {
    let user = users
        .find_by_id(claims.sub)
        .await?
        .ok_or_else(|| AppError::NotFoundError("User not found".to_string()))?;

    Ok(Json(UserOut::from(&user)))
}
