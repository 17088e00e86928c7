//! Request extractors whose rejections use the crate's error body

use crate::core::error::Error;
use axum::extract::FromRequest;

/// `axum::Json`, except that a body which fails to parse is reported as
/// `422` with the same `{"error": ...}` envelope as any other invalid input.
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(Error))]
pub struct AppJson<T>(pub T);
