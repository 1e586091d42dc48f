use axum::{
    async_trait,
    body::Bytes,
    extract::{FromRequest, FromRequestParts, Multipart, Path, Request, State},
    http::{header::CONTENT_TYPE, request::Parts, StatusCode},
    Json,
};
use service::catalog::{
    product::{FeatureInput, PriceInput},
    ImageRef, Product, ProductFields,
};
use service::errors::ServiceError;
use tracing::debug;

use crate::openapi::ProductDoc;
use crate::errors::JsonApiError;
use crate::routes::ServerState;

/// An image file part from a multipart body.
#[derive(Debug)]
pub struct UploadedImage {
    pub file_name: String,
    pub bytes: Bytes,
}

/// Create/update body: `multipart/form-data` (with an optional `imagen` file
/// part) or `application/json` (fields only).
#[derive(Debug)]
pub struct ProductForm {
    pub fields: ProductFields,
    pub image: Option<UploadedImage>,
}

/// `:id` path segment. An id that is not a number names no product, so it is a
/// JSON 404 like any other unknown id.
#[derive(Debug, Clone, Copy)]
pub struct ProductId(pub u64);

#[async_trait]
impl<S> FromRequestParts<S> for ProductId
where
    S: Send + Sync,
{
    type Rejection = JsonApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(raw) = Path::<String>::from_request_parts(parts, state)
            .await
            .map_err(|e| JsonApiError::from_status(e.status(), e.body_text()))?;
        raw.trim()
            .parse::<u64>()
            .map(ProductId)
            .map_err(|_| ServiceError::not_found("product").into())
    }
}

#[async_trait]
impl<S> FromRequest<S> for ProductForm
where
    S: Send + Sync,
{
    type Rejection = JsonApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let content_type = req
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_ascii_lowercase();

        if content_type.starts_with("multipart/form-data") {
            let multipart = Multipart::from_request(req, state)
                .await
                .map_err(|e| JsonApiError::from_status(e.status(), e.body_text()))?;
            read_multipart(multipart).await
        } else if content_type.starts_with("application/json") {
            let Json(fields) = Json::<ProductFields>::from_request(req, state)
                .await
                .map_err(|e| JsonApiError::from_status(e.status(), e.body_text()))?;
            Ok(Self { fields, image: None })
        } else {
            Err(JsonApiError::new(
                StatusCode::UNSUPPORTED_MEDIA_TYPE,
                "Unsupported Media Type",
                Some("expected multipart/form-data or application/json".into()),
            ))
        }
    }
}

async fn read_multipart(mut multipart: Multipart) -> Result<ProductForm, JsonApiError> {
    let mut fields = ProductFields::default();
    let mut image = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| JsonApiError::from_status(e.status(), e.body_text()))?
    {
        let name = field.name().unwrap_or_default().to_string();
        if name == "imagen" {
            let file_name = field.file_name().unwrap_or_default().to_string();
            let bytes = field
                .bytes()
                .await
                .map_err(|e| JsonApiError::from_status(e.status(), e.body_text()))?;
            // browsers send an empty part when no file was picked
            if !file_name.is_empty() || !bytes.is_empty() {
                image = Some(UploadedImage { file_name, bytes });
            }
            continue;
        }

        let text = field
            .text()
            .await
            .map_err(|e| JsonApiError::from_status(e.status(), e.body_text()))?;
        match name.as_str() {
            "nombre" => fields.nombre = Some(text),
            "precio" => fields.precio = Some(PriceInput::Text(text)),
            "caracteristicas" => fields.caracteristicas = Some(FeatureInput::Text(text)),
            "alt" => fields.alt = Some(text),
            other => debug!(field = %other, "ignoring unknown form field"),
        }
    }

    Ok(ProductForm { fields, image })
}

async fn store_upload(state: &ServerState, image: Option<UploadedImage>) -> Result<Option<ImageRef>, JsonApiError> {
    match image {
        Some(upload) => {
            let stored = state.assets.save(&upload.file_name, &upload.bytes).await?;
            Ok(Some(stored))
        }
        None => Ok(None),
    }
}

#[utoipa::path(
    get, path = "/api/products", tag = "products",
    responses(
        (status = 200, description = "All products", body = [ProductDoc]),
        (status = 500, description = "Document unreadable")
    )
)]
pub async fn list(State(state): State<ServerState>) -> Result<Json<Vec<Product>>, JsonApiError> {
    let products = state.catalog.list().await?;
    Ok(Json(products))
}

#[utoipa::path(
    get, path = "/api/products/{id}", tag = "products",
    params(("id" = u64, Path, description = "Product id")),
    responses(
        (status = 200, description = "The product", body = ProductDoc),
        (status = 404, description = "Not found")
    )
)]
pub async fn get(State(state): State<ServerState>, ProductId(id): ProductId) -> Result<Json<Product>, JsonApiError> {
    let product = state.catalog.get(id).await?;
    Ok(Json(product))
}

#[utoipa::path(
    post, path = "/api/products", tag = "products",
    request_body(content = crate::openapi::ProductFormDoc, content_type = "multipart/form-data"),
    responses(
        (status = 201, description = "Created", body = ProductDoc),
        (status = 400, description = "Image missing or invalid field"),
        (status = 500, description = "Storage failure")
    )
)]
pub async fn create(
    State(state): State<ServerState>,
    form: ProductForm,
) -> Result<(StatusCode, Json<Product>), JsonApiError> {
    let image = store_upload(&state, form.image).await?;
    let product = state.catalog.create(form.fields, image).await?;
    Ok((StatusCode::CREATED, Json(product)))
}

#[utoipa::path(
    put, path = "/api/products/{id}", tag = "products",
    params(("id" = u64, Path, description = "Product id")),
    request_body(content = crate::openapi::ProductFormDoc, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Updated", body = ProductDoc),
        (status = 400, description = "Invalid field"),
        (status = 404, description = "Not found"),
        (status = 500, description = "Storage failure")
    )
)]
pub async fn update(
    State(state): State<ServerState>,
    ProductId(id): ProductId,
    form: ProductForm,
) -> Result<Json<Product>, JsonApiError> {
    let image = store_upload(&state, form.image).await?;
    let product = state.catalog.update(id, form.fields, image).await?;
    Ok(Json(product))
}

#[utoipa::path(
    delete, path = "/api/products/{id}", tag = "products",
    params(("id" = u64, Path, description = "Product id")),
    responses(
        (status = 204, description = "Deleted"),
        (status = 404, description = "Not found"),
        (status = 500, description = "Storage failure")
    )
)]
pub async fn delete(State(state): State<ServerState>, ProductId(id): ProductId) -> Result<StatusCode, JsonApiError> {
    state.catalog.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
