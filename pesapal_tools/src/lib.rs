//! # PesaPal tools
//!
//! A small client for the three PesaPal v3 endpoints the payment gateway needs:
//! * `Auth/RequestToken` ([`PesapalApi::request_token`]) exchanges the consumer key and secret for a bearer token.
//! * `Transactions/SubmitOrderRequest` ([`PesapalApi::submit_order`]) submits an order and returns the redirect url.
//! * `URLSetup/RegisterIPN` ([`PesapalApi::register_ipn`]) registers the IPN callback url.
//!
//! None of the calls retry. Every failure is returned as a [`PesapalApiError`] and the caller decides what to do.
mod api;
mod config;
mod error;

pub mod data_objects;

pub use api::PesapalApi;
pub use config::{PesapalConfig, PesapalEnvironment};
pub use data_objects::{AccessToken, IpnRegistration, SubmittedOrder};
pub use error::PesapalApiError;
