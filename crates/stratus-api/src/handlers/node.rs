//! Node handlers — upload, listing, folder creation, rename, move,
//! delete, preview, download.

use axum::Json;
use axum::body::Body;
use axum::extract::{Multipart, Path, Query, State};
use axum::http::{StatusCode, header};
use axum::response::Response;
use bytes::Bytes;
use uuid::Uuid;
use validator::Validate;

use stratus_core::error::AppError;
use stratus_core::types::NodeId;
use stratus_entity::node::Node;
use stratus_service::tree::UploadParams;

use crate::dto::request::{CreateFolderRequest, MoveRequest, RenameRequest};
use crate::dto::response::{ApiResponse, PreviewResponse};
use crate::error::ApiError;
use crate::extractors::AuthUser;
use crate::state::AppState;

/// GET /api/nodes?parent_id=...
///
/// Lists the children of a folder, or the root level when no parent is
/// given.
pub async fn list_nodes(
    State(state): State<AppState>,
    AuthUser(ctx): AuthUser,
    Query(params): Query<std::collections::HashMap<String, String>>,
) -> Result<Json<ApiResponse<Vec<Node>>>, ApiError> {
    let parent_id = match params.get("parent_id") {
        Some(raw) => Some(
            raw.parse::<NodeId>()
                .map_err(|_| AppError::validation("Invalid parent_id"))?
                .into_uuid(),
        ),
        None => None,
    };

    let nodes = state.tree_service.list_children(&ctx, parent_id).await?;
    Ok(Json(ApiResponse::new(nodes)))
}

/// GET /api/nodes/recent
pub async fn recent_nodes(
    State(state): State<AppState>,
    AuthUser(ctx): AuthUser,
) -> Result<Json<ApiResponse<Vec<Node>>>, ApiError> {
    let nodes = state.tree_service.list_recent(&ctx).await?;
    Ok(Json(ApiResponse::new(nodes)))
}

/// GET /api/nodes/{id}
pub async fn get_node(
    State(state): State<AppState>,
    AuthUser(ctx): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<Node>>, ApiError> {
    let node = state.tree_service.get_node(&ctx, id).await?;
    Ok(Json(ApiResponse::new(node)))
}

/// POST /api/nodes/upload — multipart upload.
///
/// Fields: `parent_id` (optional), `file` (the content; its client-side
/// filename may carry an implied sub-path for dragged directories).
pub async fn upload_node(
    State(state): State<AppState>,
    AuthUser(ctx): AuthUser,
    mut multipart: Multipart,
) -> Result<Json<ApiResponse<Node>>, ApiError> {
    let mut parent_id: Option<Uuid> = None;
    let mut file_name: Option<String> = None;
    let mut mime_type: Option<String> = None;
    let mut data: Option<Bytes> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::validation(format!("Multipart error: {e}")))?
    {
        let name = field.name().unwrap_or("").to_string();
        match name.as_str() {
            "parent_id" => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| AppError::validation(format!("Read error: {e}")))?;
                parent_id = Some(
                    Uuid::parse_str(&text)
                        .map_err(|_| AppError::validation("Invalid parent_id"))?,
                );
            }
            "file" => {
                file_name = field.file_name().map(String::from);
                mime_type = field.content_type().map(String::from);
                data = Some(
                    field
                        .bytes()
                        .await
                        .map_err(|e| AppError::validation(format!("Read error: {e}")))?,
                );
            }
            _ => {}
        }
    }

    let file_name =
        file_name.ok_or_else(|| AppError::validation("Missing file field or file name"))?;
    let data = data.ok_or_else(|| AppError::validation("Missing file content"))?;

    let node = state
        .tree_service
        .upload(
            &ctx,
            UploadParams {
                parent_id,
                file_name,
                mime_type,
                data,
            },
        )
        .await?;

    Ok(Json(ApiResponse::new(node)))
}

/// POST /api/folders
pub async fn create_folder(
    State(state): State<AppState>,
    AuthUser(ctx): AuthUser,
    Json(req): Json<CreateFolderRequest>,
) -> Result<Json<ApiResponse<Node>>, ApiError> {
    req.validate()
        .map_err(|e| AppError::validation(format!("Invalid request: {e}")))?;

    let node = state
        .tree_service
        .create_folder(&ctx, &req.name, req.parent_id)
        .await?;
    Ok(Json(ApiResponse::new(node)))
}

/// PUT /api/nodes/{id}/rename
pub async fn rename_node(
    State(state): State<AppState>,
    AuthUser(ctx): AuthUser,
    Path(id): Path<Uuid>,
    Json(req): Json<RenameRequest>,
) -> Result<Json<ApiResponse<Node>>, ApiError> {
    req.validate()
        .map_err(|e| AppError::validation(format!("Invalid request: {e}")))?;

    let node = state.tree_service.rename(&ctx, id, &req.name).await?;
    Ok(Json(ApiResponse::new(node)))
}

/// PUT /api/nodes/{id}/move
pub async fn move_node(
    State(state): State<AppState>,
    AuthUser(ctx): AuthUser,
    Path(id): Path<Uuid>,
    Json(req): Json<MoveRequest>,
) -> Result<Json<ApiResponse<Node>>, ApiError> {
    let node = state
        .tree_service
        .move_node(&ctx, id, req.target_folder_id)
        .await?;
    Ok(Json(ApiResponse::new(node)))
}

/// DELETE /api/nodes/{id}
pub async fn delete_node(
    State(state): State<AppState>,
    AuthUser(ctx): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<()>>, ApiError> {
    state.tree_service.delete(&ctx, id).await?;
    Ok(Json(ApiResponse::new(())))
}

/// GET /api/nodes/{id}/preview
pub async fn preview_node(
    State(state): State<AppState>,
    AuthUser(ctx): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<PreviewResponse>>, ApiError> {
    let preview = state.preview_service.get_preview(&ctx, id).await?;
    Ok(Json(ApiResponse::new(PreviewResponse {
        content: preview.content,
        content_type: preview.content_type,
    })))
}

/// GET /api/nodes/{id}/download
pub async fn download_node(
    State(state): State<AppState>,
    AuthUser(ctx): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Response, ApiError> {
    let result = state.download_service.download(&ctx, id).await?;

    let response = Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, result.content_type)
        .header(
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{}\"", result.filename),
        )
        .header(header::CONTENT_LENGTH, result.size_bytes)
        .body(Body::from_stream(result.stream))
        .map_err(|e| AppError::internal(format!("Response build failed: {e}")))?;

    Ok(response)
}
