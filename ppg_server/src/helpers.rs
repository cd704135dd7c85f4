use actix_web::HttpRequest;

pub const IPN_PATH: &str = "/api/pesapal-ipn";

/// Builds the url that PesaPal should call with payment notifications. The configured public url takes precedence;
/// otherwise the scheme and host of the request being served are used.
pub fn ipn_callback_url(req: &HttpRequest, public_url: Option<&str>) -> String {
    match public_url {
        Some(base) => format!("{}{IPN_PATH}", base.trim_end_matches('/')),
        None => {
            let info = req.connection_info();
            format!("{}://{}{IPN_PATH}", info.scheme(), info.host())
        },
    }
}
