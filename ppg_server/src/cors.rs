//! Cross-origin access for the storefront, which calls the token and order routes from the customer's browser.
use actix_cors::Cors;
use actix_web::http::header;

const MAX_AGE_SECS: usize = 3600;

/// Builds the CORS middleware. With no origins configured, any origin is allowed and a wildcard
/// `Access-Control-Allow-Origin` is returned.
pub fn cors(origins: &[String]) -> Cors {
    let mut cors = Cors::default()
        .allowed_methods(["GET", "POST", "OPTIONS"])
        .allowed_headers([header::CONTENT_TYPE, header::ACCEPT, header::AUTHORIZATION])
        .max_age(MAX_AGE_SECS);
    if origins.is_empty() {
        cors = cors.allow_any_origin().send_wildcard();
    } else {
        for origin in origins {
            cors = cors.allowed_origin(origin);
        }
    }
    cors
}
