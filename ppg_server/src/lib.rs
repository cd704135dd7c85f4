//! # PPG server
//! This crate hosts the server code for the PesaPal payment gateway. It is responsible for:
//! * Issuing PesaPal access tokens to the storefront.
//! * Submitting orders to PesaPal and recording them as pending.
//! * Registering this server's IPN url with PesaPal.
//! * Receiving payment notifications (IPNs) and handing them to the reconciliation engine, which updates the order,
//!   emails the customer and records a notification.
//!
//! ## Configuration
//! The server is configured via environment variables. See [config](config/index.html) for more information.
//!
//! ## Routes
//! The server exposes the following routes:
//! * `/health`: A health check route that returns a 200 OK response.
//! * `GET /api/get-access-token`: Requests a bearer token from PesaPal.
//! * `POST /api/register-ipn`: Registers the IPN callback url with PesaPal.
//! * `POST /api/submit-order`: Submits an order to PesaPal and returns the payment redirect url.
//! * `POST /api/pesapal-ipn`: The IPN callback route.
//!
//! Browsers may call every route cross-origin. The allowed origins are set with `PPG_CORS_ORIGINS`.
pub mod cli;
pub mod config;
pub mod cors;
pub mod data_objects;
pub mod errors;
pub mod helpers;
pub mod mailer;
pub mod pesapal_routes;
pub mod routes;
pub mod server;
