use crate::error::{AppError, AppResult};
use crate::repository::Storage;
use crate::services::PhotoService;
use axum::{extract::Path, http::header, response::IntoResponse, Extension};

#[utoipa::path(
    get,
    path = "/api/v1/photos/{filename}",
    params(("filename" = String, Path, description = "Stored photo name")),
    responses(
        (status = 200, description = "Photo bytes", content_type = "image/*"),
        (status = 404, description = "No such photo", body = AppError),
    ),
    tag = "photos"
)]
pub async fn get_photo(
    Extension(storage): Extension<Storage>,
    Path(filename): Path<String>,
) -> AppResult<impl IntoResponse> {
    let (content_type, data) = PhotoService::new(storage).fetch(&filename).await?;
    Ok((
        [
            (header::CONTENT_TYPE, content_type),
            (header::CACHE_CONTROL, "private, max-age=3600"),
        ],
        data,
    ))
}
