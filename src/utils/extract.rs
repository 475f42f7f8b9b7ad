use axum::extract::FromRequest;

use crate::error::Error;

/// JSON body extractor whose rejections (missing fields, malformed bodies)
/// surface as the structured JSON error response instead of axum's
/// plain-text default.
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(Error))]
pub struct JsonPayload<T>(pub T);

/// Form-body counterpart of [`JsonPayload`] for the public registration form.
#[derive(FromRequest)]
#[from_request(via(axum::Form), rejection(Error))]
pub struct FormPayload<T>(pub T);
