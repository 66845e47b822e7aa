//! AWS Lambda entry point for aggregated museum searches.
//!
//! The handler gates the request method, parses the search body, runs the
//! aggregated search and maps the outcome onto an API Gateway HTTP API
//! response. Runtime wiring lives in `src/bin/curio_lambda.rs`.

pub mod handlers;

pub use handlers::gateway::{handle_gateway_event, invocation_deadline, ApiGatewayResponse};
