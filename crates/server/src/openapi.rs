use utoipa::OpenApi;
use utoipa::ToSchema;

#[derive(ToSchema)]
pub struct HealthResponse { pub status: String }

#[derive(ToSchema)]
pub struct ProductDoc {
    pub id: u64,
    pub nombre: String,
    pub precio: u64,
    /// Relative path of the image, e.g. `assets/imagen-<uuid>.png`
    pub imagen: String,
    pub alt: String,
    pub caracteristicas: Vec<String>,
    /// `upload` (owned by the catalog) or `external`
    pub imagen_origen: String,
}

#[derive(ToSchema)]
pub struct ProductFormDoc {
    pub nombre: Option<String>,
    /// Integer price; text is read like `parseInt`
    pub precio: Option<String>,
    /// Comma-separated feature list
    pub caracteristicas: Option<String>,
    pub alt: Option<String>,
    /// Image file; required on create
    #[schema(value_type = Option<String>, format = Binary)]
    pub imagen: Option<Vec<u8>>,
}

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::routes::health,
        crate::routes::products::list,
        crate::routes::products::get,
        crate::routes::products::create,
        crate::routes::products::update,
        crate::routes::products::delete,
    ),
    components(schemas(HealthResponse, ProductDoc, ProductFormDoc)),
    tags(
        (name = "health"),
        (name = "products", description = "Product catalog administration"),
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn openapi_lists_product_paths() {
        let doc = ApiDoc::openapi();
        let paths: Vec<&String> = doc.paths.paths.keys().collect();
        assert!(paths.iter().any(|p| p.as_str() == "/api/products"));
        assert!(paths.iter().any(|p| p.as_str() == "/api/products/{id}"));
        assert!(paths.iter().any(|p| p.as_str() == "/health"));

        let json = serde_json::to_value(&doc).unwrap();
        assert_eq!(
            json["paths"]["/health"]["get"]["responses"]["200"]["content"]["application/json"]["schema"]["$ref"],
            "#/components/schemas/HealthResponse"
        );
    }
}
