//! OpenAPI document for the product API.

use crate::models::{Category, Product, ProductPayload};
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Simple Product Listing API",
        version = "1.0.0",
        description = "Product catalog: list, create, read, update and delete products grouped by category"
    ),
    paths(
        crate::handlers::product::list,
        crate::handlers::product::create,
        crate::handlers::product::show,
        crate::handlers::product::update,
        crate::handlers::product::destroy,
    ),
    components(schemas(Product, Category, ProductPayload)),
    tags((name = "Products", description = "Product catalog operations"))
)]
pub struct ApiDoc;
