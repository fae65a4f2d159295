use crate::routes::health;
use crate::routes::proxy;
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(info(
    title = "easel-server",
    description = "easel image-variation proxy API",
    version = "0.1.0",
    contact(name = "easel", url = "https://github.com/easel-proxy/easel")
))]
pub struct ApiDoc;

pub fn get_docs() -> utoipa::openapi::OpenApi {
    let mut root = ApiDoc::openapi();
    root.merge(health::HealthApi::openapi());
    root.merge(proxy::ProxyApi::openapi());
    root
}
