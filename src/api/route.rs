use crate::{
    api::{
        auth::{generate_token, require_admin_key, require_guest_token, GuestName},
        error::ApiError,
        response::{with_total_count, ApiResponse},
    },
    models::{CommentRequest, CommentWithGuest, Guest, LoginRequest, RsvpRequest},
    service::NewComment,
    state::AppState,
    validation::{
        parse_cursor, parse_guest_csv, parse_page_limit, validate_comment_content, validate_guest_name,
        ValidationError,
    },
};
use axum::{
    extract::{Multipart, Path, Query, State},
    http::{header, HeaderValue, Method},
    middleware,
    response::{IntoResponse, Response},
    routing::{get, post},
    Extension, Json, Router,
};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::TraceLayer,
};
use tracing::{info, warn};

// GET /guests query parameters
#[derive(Deserialize)]
pub struct GuestQuery {
    name: Option<String>,
}

// GET /comments query parameters; both optional, parsed leniently
#[derive(Deserialize)]
pub struct CommentsQuery {
    limit: Option<String>,
    cursor: Option<String>,
}

// Create router with all routes
pub fn create_router(app_state: Arc<AppState>) -> Router {
    let guest_routes = Router::new()
        .route("/protected", get(protected))
        .route("/guests", get(get_guest))
        .route("/comments", post(create_comment).get(get_comments_page))
        .route("/comments/me", get(get_my_comments))
        .route("/mark-opened", post(mark_opened))
        .route_layer(middleware::from_fn_with_state(app_state.clone(), require_guest_token));

    let admin_routes = Router::new()
        .route("/admin/guests", post(create_guest))
        .route("/admin/bulk", post(bulk_upload_guests).put(bulk_update_guests))
        .route("/admin/rsvps", get(get_all_rsvps))
        .route("/admin/comments", get(get_all_comments))
        .route_layer(middleware::from_fn_with_state(app_state.clone(), require_admin_key));

    let cors = cors_layer(&app_state.config.cors_allowed_origins);

    Router::new()
        .route("/health", get(health))
        .route("/login", post(login))
        .route("/login/{name}", get(login_by_path))
        .route("/rsvp", post(rsvp))
        .merge(guest_routes)
        .merge(admin_routes)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(app_state)
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let origins = origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!("Ignoring invalid CORS origin: {}", origin);
                None
            }
        })
        .collect::<Vec<_>>();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::ORIGIN, header::CONTENT_TYPE, header::AUTHORIZATION])
        .allow_credentials(true)
}

// GET /health handler
async fn health(State(state): State<Arc<AppState>>) -> Result<Response, ApiError> {
    sqlx::query("SELECT 1").execute(&state.db_pool).await?;
    Ok(ApiResponse::ok(json!({ "status": "ok" })).into_response())
}

// POST /login handler
async fn login(
    State(state): State<Arc<AppState>>,
    Json(request): Json<LoginRequest>,
) -> Result<Response, ApiError> {
    issue_token(&state, &request.name).await
}

// GET /login/{name} handler
async fn login_by_path(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
) -> Result<Response, ApiError> {
    issue_token(&state, &name).await
}

async fn issue_token(state: &AppState, name: &str) -> Result<Response, ApiError> {
    let name = validate_guest_name(name)?;

    if state.guests.validate_guest_access(name).await?.is_none() {
        info!("Login refused for unknown guest: {}", name);
        return Err(ApiError::Forbidden("You are not on the guest list".to_string()));
    }

    let token = generate_token(name, &state.config.jwt_secret, state.config.jwt_expiry)
        .map_err(|e| ApiError::Internal(format!("failed to generate token: {}", e)))?;

    info!("Issued token for guest: {}", name);
    Ok(ApiResponse::ok(json!({ "token": token })).into_response())
}

// POST /rsvp handler
async fn rsvp(
    State(state): State<Arc<AppState>>,
    Json(request): Json<RsvpRequest>,
) -> Result<Response, ApiError> {
    let name = validate_guest_name(&request.name)?;

    let guest = state
        .guests
        .record_rsvp(name, request.attending)
        .await?
        .ok_or_else(|| ApiError::NotFound("Guest not found".to_string()))?;

    Ok(ApiResponse::ok(json!({
        "message": "RSVP updated successfully",
        "guest": guest,
    }))
    .into_response())
}

// GET /protected handler
async fn protected(Extension(GuestName(name)): Extension<GuestName>) -> Response {
    ApiResponse::ok(json!({
        "message": name,
        "status": "protected",
    }))
    .into_response()
}

// GET /guests handler
async fn get_guest(
    State(state): State<Arc<AppState>>,
    Query(params): Query<GuestQuery>,
) -> Result<Response, ApiError> {
    let name = params
        .name
        .ok_or_else(|| ValidationError::MissingParameter("name".to_string()))?;
    let name = validate_guest_name(&name)?;

    let guest = state
        .guests
        .get_guest_by_name(name)
        .await?
        .ok_or_else(|| ApiError::NotFound("Guest not found".to_string()))?;

    Ok(ApiResponse::ok(guest).into_response())
}

// POST /comments handler
async fn create_comment(
    State(state): State<Arc<AppState>>,
    Extension(GuestName(name)): Extension<GuestName>,
    Json(request): Json<CommentRequest>,
) -> Result<Response, ApiError> {
    let content = validate_comment_content(&request.content)?;

    let max = state.config.max_comments_per_guest;
    let comment = match state.comments.create_comment_within_limit(&name, content, max).await? {
        NewComment::Created(comment) => comment,
        NewComment::UnknownGuest => {
            return Err(ApiError::Forbidden("You are not on the guest list".to_string()));
        }
        NewComment::LimitReached => {
            return Err(ApiError::Forbidden(format!("Maximum of {} comments allowed per guest", max)));
        }
    };

    Ok(ApiResponse::created(json!({
        "message": "Comment created successfully",
        "comment": CommentWithGuest { comment, guest_name: name },
    }))
    .into_response())
}

// GET /comments/me handler
async fn get_my_comments(
    State(state): State<Arc<AppState>>,
    Extension(GuestName(name)): Extension<GuestName>,
) -> Result<Response, ApiError> {
    let comments = state
        .comments
        .get_comments_by_guest(&name)
        .await?
        .ok_or_else(|| ApiError::NotFound("Guest not found".to_string()))?;

    let count = comments.len();
    Ok(with_total_count(json!({ "count": count, "comments": comments }), count))
}

// GET /comments handler
async fn get_comments_page(
    State(state): State<Arc<AppState>>,
    Query(params): Query<CommentsQuery>,
) -> Result<Response, ApiError> {
    let limit = parse_page_limit(params.limit.as_deref());
    let cursor = parse_cursor(params.cursor.as_deref())?;

    let page = state.comments.get_comments_page(limit, cursor).await?;
    Ok(ApiResponse::ok(page).into_response())
}

// POST /mark-opened handler
async fn mark_opened(
    State(state): State<Arc<AppState>>,
    Extension(GuestName(name)): Extension<GuestName>,
) -> Result<Response, ApiError> {
    state.guests.mark_invitation_opened(&name).await?;
    info!("Recorded invitation opening for: {}", name);

    Ok(ApiResponse::ok(json!({ "status": "Invitation opening recorded" })).into_response())
}

// POST /admin/guests handler
async fn create_guest(
    State(state): State<Arc<AppState>>,
    Json(mut guest): Json<Guest>,
) -> Result<Response, ApiError> {
    guest.name = validate_guest_name(&guest.name)?.to_string();

    state.guests.create_guest(&mut guest).await?;
    info!("Created guest {} ({})", guest.id, guest.name);

    Ok(ApiResponse::created(guest).into_response())
}

// POST /admin/bulk handler: multipart CSV upload in field `file`
async fn bulk_upload_guests(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Result<Response, ApiError> {
    let mut csv = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(e.to_string()))?
    {
        if field.name() == Some("file") {
            csv = Some(field.text().await.map_err(|e| ApiError::BadRequest(e.to_string()))?);
            break;
        }
    }

    let csv = csv.ok_or_else(|| ApiError::BadRequest("No file uploaded".to_string()))?;
    let mut guests = parse_guest_csv(&csv)?;

    state.guests.bulk_create_guests(&mut guests).await?;
    info!("Bulk created {} guests", guests.len());

    Ok(ApiResponse::ok(json!({
        "message": "Guests created successfully",
        "count": guests.len(),
    }))
    .into_response())
}

// PUT /admin/bulk handler
async fn bulk_update_guests(
    State(state): State<Arc<AppState>>,
    Json(mut guests): Json<Vec<Guest>>,
) -> Result<Response, ApiError> {
    if let Some(guest) = guests.iter().find(|guest| guest.id <= 0) {
        return Err(ApiError::BadRequest(format!("guest '{}' has no id", guest.name)));
    }

    state.guests.bulk_update_guests(&mut guests).await?;
    info!("Bulk updated {} guests", guests.len());

    Ok(ApiResponse::ok(json!({
        "message": "Guests updated successfully",
        "count": guests.len(),
    }))
    .into_response())
}

// GET /admin/rsvps handler
async fn get_all_rsvps(State(state): State<Arc<AppState>>) -> Result<Response, ApiError> {
    let guests = state.guests.get_all_guests().await?;

    let count = guests.len();
    Ok(with_total_count(json!({ "count": count, "rsvps": guests }), count))
}

// GET /admin/comments handler
async fn get_all_comments(State(state): State<Arc<AppState>>) -> Result<Response, ApiError> {
    let comments = state.comments.get_all_comments().await?;

    let count = comments.len();
    Ok(with_total_count(json!({ "count": count, "comments": comments }), count))
}
