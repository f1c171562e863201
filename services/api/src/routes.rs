//! API service routes
//!
//! The router is assembled from an explicit route list at startup;
//! handlers stay thin and delegate to the repositories.

use axum::{
    Json, Router,
    extract::{Extension, Multipart, Path, Query, State},
    http::StatusCode,
    middleware,
    response::IntoResponse,
    routing::{get, patch, post},
};
use serde_json::json;
use tower_http::{services::ServeDir, trace::TraceLayer};
use tracing::error;

use crate::{
    error::{ApiError, is_unique_violation},
    extract::AppJson,
    middleware::{AuthUser, auth_middleware},
    models::{
        CreateUserRequest, TokenRequest, TokenResponse, UpdateUserRequest, UserResponse,
        label::{Label, LabelListQuery, UpdateLabelRequest},
        recipe::{
            CreateRecipeRequest, RecipeImageResponse, RecipeListQuery, UpdateRecipeRequest,
        },
    },
    repositories::label::LabelRepository,
    state::AppState,
    validation::{
        normalize_email, parse_id_csv, validate_email, validate_labels, validate_max_chars,
        validate_name, validate_password, validate_price,
    },
};

/// Create the router for the API service
pub fn create_router(state: AppState) -> Router {
    let protected_routes = Router::new()
        .route("/api/users/me", get(get_me).patch(update_me))
        .route("/api/recipes", get(list_recipes).post(create_recipe))
        .route(
            "/api/recipes/:id",
            get(get_recipe).patch(update_recipe).delete(delete_recipe),
        )
        .route("/api/recipes/:id/upload_image", post(upload_recipe_image))
        .route("/api/tags", get(list_tags))
        .route("/api/tags/:id", patch(update_tag).delete(delete_tag))
        .route("/api/ingredients", get(list_ingredients))
        .route(
            "/api/ingredients/:id",
            patch(update_ingredient).delete(delete_ingredient),
        )
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    Router::new()
        .route("/health", get(health_check))
        .route("/api/users", post(register_user))
        .route("/api/token", post(create_token))
        .merge(protected_routes)
        .nest_service("/media", ServeDir::new(state.image_store.root()))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Health check endpoint
pub async fn health_check() -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "service": "recipe-api"
    }))
}

/// Register a new user
pub async fn register_user(
    State(state): State<AppState>,
    AppJson(payload): AppJson<CreateUserRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let payload = CreateUserRequest {
        email: normalize_email(&payload.email),
        ..payload
    };

    validate_email(&payload.email).map_err(|msg| ApiError::validation("email", msg))?;
    validate_password(&payload.password).map_err(|msg| ApiError::validation("password", msg))?;
    validate_name(&payload.name).map_err(|msg| ApiError::validation("name", msg))?;

    let user = state.user_repository.create(&payload).await.map_err(|e| {
        if is_unique_violation(&e) {
            ApiError::validation("email", "A user with this email already exists.")
        } else {
            error!("Failed to create user: {}", e);
            ApiError::InternalServerError
        }
    })?;

    Ok((StatusCode::CREATED, Json(UserResponse::from(user))))
}

/// Issue an access token for valid credentials
pub async fn create_token(
    State(state): State<AppState>,
    AppJson(payload): AppJson<TokenRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let email = normalize_email(&payload.email);

    let user = state
        .user_repository
        .find_by_email(&email)
        .await
        .map_err(|e| {
            error!("Failed to look up user: {}", e);
            ApiError::InternalServerError
        })?
        .ok_or(ApiError::InvalidCredentials)?;

    let password_valid = state
        .user_repository
        .verify_password(&user, &payload.password)
        .await
        .map_err(|e| {
            error!("Failed to verify password: {}", e);
            ApiError::InternalServerError
        })?;

    if !password_valid || !user.is_active {
        return Err(ApiError::InvalidCredentials);
    }

    let access_token = state
        .jwt_service
        .generate_access_token(user.id)
        .map_err(|e| {
            error!("Failed to generate access token: {}", e);
            ApiError::InternalServerError
        })?;

    Ok(Json(TokenResponse {
        access_token,
        token_type: "Bearer".to_string(),
        expires_in: state.jwt_service.access_token_expiry(),
    }))
}

/// Retrieve the authenticated user's profile
pub async fn get_me(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
) -> Result<impl IntoResponse, ApiError> {
    let user = state
        .user_repository
        .find_by_id(auth.id)
        .await
        .map_err(|e| {
            error!("Failed to get user: {}", e);
            ApiError::InternalServerError
        })?
        .ok_or(ApiError::NotFound)?;

    Ok(Json(UserResponse::from(user)))
}

/// Update the authenticated user's profile
pub async fn update_me(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    AppJson(payload): AppJson<UpdateUserRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let payload = UpdateUserRequest {
        email: payload.email.as_deref().map(normalize_email),
        ..payload
    };

    if let Some(email) = &payload.email {
        validate_email(email).map_err(|msg| ApiError::validation("email", msg))?;
    }
    if let Some(password) = &payload.password {
        validate_password(password).map_err(|msg| ApiError::validation("password", msg))?;
    }
    if let Some(name) = &payload.name {
        validate_name(name).map_err(|msg| ApiError::validation("name", msg))?;
    }

    let user = state
        .user_repository
        .update(auth.id, &payload)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                ApiError::validation("email", "A user with this email already exists.")
            } else {
                error!("Failed to update user: {}", e);
                ApiError::InternalServerError
            }
        })?
        .ok_or(ApiError::NotFound)?;

    Ok(Json(UserResponse::from(user)))
}

/// List the caller's recipes, optionally filtered by tag/ingredient IDs
pub async fn list_recipes(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Query(query): Query<RecipeListQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let tag_ids = match query.tags.as_deref().filter(|s| !s.is_empty()) {
        Some(raw) => Some(parse_id_csv(raw).map_err(|msg| ApiError::validation("tags", msg))?),
        None => None,
    };

    let ingredient_ids = match query.ingredients.as_deref().filter(|s| !s.is_empty()) {
        Some(raw) => {
            Some(parse_id_csv(raw).map_err(|msg| ApiError::validation("ingredients", msg))?)
        }
        None => None,
    };

    let recipes = state
        .recipe_repository
        .list(auth.id, tag_ids, ingredient_ids)
        .await
        .map_err(|e| {
            error!("Failed to list recipes: {}", e);
            ApiError::InternalServerError
        })?;

    Ok(Json(recipes))
}

/// Create a new recipe with nested tags and ingredients
pub async fn create_recipe(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    AppJson(payload): AppJson<CreateRecipeRequest>,
) -> Result<impl IntoResponse, ApiError> {
    if payload.title.trim().is_empty() {
        return Err(ApiError::validation("title", "This field may not be blank."));
    }
    validate_max_chars(&payload.title, 255).map_err(|msg| ApiError::validation("title", msg))?;
    validate_price(payload.price).map_err(|msg| ApiError::validation("price", msg))?;
    if let Some(link) = &payload.link {
        validate_max_chars(link, 255).map_err(|msg| ApiError::validation("link", msg))?;
    }
    if let Some(tags) = &payload.tags {
        validate_labels(tags).map_err(|msg| ApiError::validation("tags", msg))?;
    }
    if let Some(ingredients) = &payload.ingredients {
        validate_labels(ingredients).map_err(|msg| ApiError::validation("ingredients", msg))?;
    }

    let recipe = state
        .recipe_repository
        .create(auth.id, &payload)
        .await
        .map_err(|e| {
            error!("Failed to create recipe: {}", e);
            ApiError::InternalServerError
        })?;

    Ok((StatusCode::CREATED, Json(recipe)))
}

/// Fetch one of the caller's recipes
pub async fn get_recipe(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    let recipe = state
        .recipe_repository
        .get(auth.id, id)
        .await
        .map_err(|e| {
            error!("Failed to get recipe: {}", e);
            ApiError::InternalServerError
        })?
        .ok_or(ApiError::NotFound)?;

    Ok(Json(recipe))
}

/// Partially update one of the caller's recipes
pub async fn update_recipe(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<i64>,
    AppJson(payload): AppJson<UpdateRecipeRequest>,
) -> Result<impl IntoResponse, ApiError> {
    if let Some(title) = &payload.title {
        if title.trim().is_empty() {
            return Err(ApiError::validation("title", "This field may not be blank."));
        }
        validate_max_chars(title, 255).map_err(|msg| ApiError::validation("title", msg))?;
    }
    if let Some(price) = payload.price {
        validate_price(price).map_err(|msg| ApiError::validation("price", msg))?;
    }
    if let Some(link) = &payload.link {
        validate_max_chars(link, 255).map_err(|msg| ApiError::validation("link", msg))?;
    }
    if let Some(tags) = &payload.tags {
        validate_labels(tags).map_err(|msg| ApiError::validation("tags", msg))?;
    }
    if let Some(ingredients) = &payload.ingredients {
        validate_labels(ingredients).map_err(|msg| ApiError::validation("ingredients", msg))?;
    }

    let recipe = state
        .recipe_repository
        .update(auth.id, id, &payload)
        .await
        .map_err(|e| {
            error!("Failed to update recipe: {}", e);
            ApiError::InternalServerError
        })?
        .ok_or(ApiError::NotFound)?;

    Ok(Json(recipe))
}

/// Delete one of the caller's recipes
pub async fn delete_recipe(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    let deleted = state
        .recipe_repository
        .delete(auth.id, id)
        .await
        .map_err(|e| {
            error!("Failed to delete recipe: {}", e);
            ApiError::InternalServerError
        })?;

    if deleted {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::NotFound)
    }
}

/// Upload an image for one of the caller's recipes
pub async fn upload_recipe_image(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<i64>,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, ApiError> {
    let exists = state
        .recipe_repository
        .exists(auth.id, id)
        .await
        .map_err(|e| {
            error!("Failed to look up recipe: {}", e);
            ApiError::InternalServerError
        })?;

    if !exists {
        return Err(ApiError::NotFound);
    }

    let mut image = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|_| ApiError::BadRequest("Invalid multipart payload".to_string()))?
    {
        if field.name() == Some("image") {
            let filename = field.file_name().map(|name| name.to_string());
            let data = field
                .bytes()
                .await
                .map_err(|_| ApiError::BadRequest("Failed to read image".to_string()))?;
            image = Some((filename, data));
            break;
        }
    }

    let Some((filename, data)) = image else {
        return Err(ApiError::BadRequest("No image provided".to_string()));
    };

    let stored = state
        .image_store
        .save(filename.as_deref(), &data)
        .await
        .map_err(|e| {
            error!("Failed to store image: {}", e);
            ApiError::InternalServerError
        })?;

    state
        .recipe_repository
        .set_image(auth.id, id, &stored)
        .await
        .map_err(|e| {
            error!("Failed to attach image: {}", e);
            ApiError::InternalServerError
        })?
        .ok_or(ApiError::NotFound)?;

    Ok(Json(RecipeImageResponse {
        id,
        image: format!("/media/{}", stored),
    }))
}

/// List the caller's tags
pub async fn list_tags(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Query(query): Query<LabelListQuery>,
) -> Result<Json<Vec<Label>>, ApiError> {
    list_labels(&state.tag_repository, auth.id, &query).await
}

/// Rename one of the caller's tags
pub async fn update_tag(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<i64>,
    AppJson(payload): AppJson<UpdateLabelRequest>,
) -> Result<Json<Label>, ApiError> {
    update_label(&state.tag_repository, auth.id, id, &payload).await
}

/// Delete one of the caller's tags
pub async fn delete_tag(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    delete_label(&state.tag_repository, auth.id, id).await
}

/// List the caller's ingredients
pub async fn list_ingredients(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Query(query): Query<LabelListQuery>,
) -> Result<Json<Vec<Label>>, ApiError> {
    list_labels(&state.ingredient_repository, auth.id, &query).await
}

/// Rename one of the caller's ingredients
pub async fn update_ingredient(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<i64>,
    AppJson(payload): AppJson<UpdateLabelRequest>,
) -> Result<Json<Label>, ApiError> {
    update_label(&state.ingredient_repository, auth.id, id, &payload).await
}

/// Delete one of the caller's ingredients
pub async fn delete_ingredient(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    delete_label(&state.ingredient_repository, auth.id, id).await
}

/// Shared list handler for both label collections
async fn list_labels(
    repo: &LabelRepository,
    owner_id: i64,
    query: &LabelListQuery,
) -> Result<Json<Vec<Label>>, ApiError> {
    let assigned_only = query.assigned_only.unwrap_or(0) != 0;

    let labels = repo.list(owner_id, assigned_only).await.map_err(|e| {
        error!("Failed to list {}: {}", repo.kind().field(), e);
        ApiError::InternalServerError
    })?;

    Ok(Json(labels))
}

/// Shared rename handler for both label collections
async fn update_label(
    repo: &LabelRepository,
    owner_id: i64,
    id: i64,
    payload: &UpdateLabelRequest,
) -> Result<Json<Label>, ApiError> {
    if payload.name.trim().is_empty() {
        return Err(ApiError::validation("name", "This field may not be blank."));
    }

    let label = repo
        .update(owner_id, id, &payload.name)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                ApiError::validation("name", "A record with this name already exists.")
            } else {
                error!("Failed to update {}: {}", repo.kind().field(), e);
                ApiError::InternalServerError
            }
        })?
        .ok_or(ApiError::NotFound)?;

    Ok(Json(label))
}

/// Shared delete handler for both label collections
async fn delete_label(repo: &LabelRepository, owner_id: i64, id: i64) -> Result<StatusCode, ApiError> {
    let deleted = repo.delete(owner_id, id).await.map_err(|e| {
        error!("Failed to delete {}: {}", repo.kind().field(), e);
        ApiError::InternalServerError
    })?;

    if deleted {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::NotFound)
    }
}
