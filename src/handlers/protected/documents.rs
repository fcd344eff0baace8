use axum::extract::{Extension, Multipart, Path};
use serde_json::json;
use uuid::Uuid;

use crate::database::manager::DatabaseManager;
use crate::database::models::claim::Claim;
use crate::database::models::document::Document;
use crate::database::repository::Repository;
use crate::error::ApiError;
use crate::filter::FilterData;
use crate::middleware::auth::Principal;
use crate::middleware::authorize::check_ownership;
use crate::middleware::response::{ApiResponse, ApiResult};
use crate::services::upload_service::UploadService;

/// GET /api/claims/:id/documents
pub async fn list(
    Extension(principal): Extension<Principal>,
    Path(claim_id): Path<Uuid>,
) -> ApiResult {
    let pool = DatabaseManager::pool().await?;

    let claim = Repository::<Claim>::new("claims", pool.clone())
        .select_by_id(claim_id)
        .await?;
    check_ownership(&principal, &claim.user_id)?;

    let documents = Repository::<Document>::new("documents", pool)
        .select_any(FilterData {
            where_clause: Some(json!({ "claim_id": claim.id })),
            order: Some(json!("created_at desc")),
            ..Default::default()
        })
        .await?;

    Ok(ApiResponse::success(json!({ "documents": documents })))
}

/// POST /api/claims/:id/documents - Multipart upload of supporting files.
///
/// Every part must be a file part named `files`; size and count limits are
/// enforced before any bytes reach the storage provider.
pub async fn upload(
    Extension(principal): Extension<Principal>,
    Path(claim_id): Path<Uuid>,
    mut multipart: Multipart,
) -> ApiResult {
    let pool = DatabaseManager::pool().await?;

    let claim = Repository::<Claim>::new("claims", pool.clone())
        .select_by_id(claim_id)
        .await?;
    check_ownership(&principal, &claim.user_id)?;

    let uploader = UploadService::new();
    let mut documents = Vec::new();
    let mut file_index = 0usize;

    while let Some(field) = multipart.next_field().await? {
        let field_name = field.name().unwrap_or("").to_string();
        if field_name != "files" {
            return Err(ApiError::bad_request(format!(
                "Unexpected field: {}",
                field_name
            )));
        }

        let file_name = field
            .file_name()
            .map(str::to_string)
            .ok_or_else(|| ApiError::bad_request("Field 'files' must contain a file"))?;
        let content_type = field
            .content_type()
            .map(str::to_string)
            .unwrap_or_else(|| "application/octet-stream".to_string());

        let bytes = field.bytes().await?;
        UploadService::validate(file_index, bytes.len())?;

        let stored = uploader
            .store(&file_name, &content_type, bytes.to_vec())
            .await?;

        let document = sqlx::query_as::<_, Document>(
            r#"
            INSERT INTO documents
                (id, claim_id, user_id, file_name, content_type, size_bytes, url, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, now())
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(claim.id)
        .bind(claim.user_id)
        .bind(&file_name)
        .bind(&content_type)
        .bind(bytes.len() as i64)
        .bind(&stored.url)
        .fetch_one(&pool)
        .await?;

        documents.push(document);
        file_index += 1;
    }

    if documents.is_empty() {
        return Err(ApiError::bad_request("No files in upload"));
    }

    Ok(ApiResponse::created(json!({ "documents": documents })))
}
