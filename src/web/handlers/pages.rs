//! Page access handlers.

use axum::{extract::Path, Json};

use crate::auth::{require_page, Page};
use crate::web::dto::{ApiResponse, PageAccessResponse};
use crate::web::error::ApiError;
use crate::web::middleware::SessionUser;

/// GET /api/pages/{page} - Check that the current user may open a page.
pub async fn get_page(
    session: SessionUser,
    Path(page): Path<String>,
) -> Result<Json<ApiResponse<PageAccessResponse>>, ApiError> {
    let page: Page = page.parse()?;
    require_page(&session.user.available_products, page)?;

    Ok(Json(ApiResponse::new(PageAccessResponse {
        page,
        allowed: true,
    })))
}
