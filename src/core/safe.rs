use std::future::Future;

use crate::error::{AppError, BoxError, ErrorKind};

/// Awaits `fut` and converts any error into `kind`, keeping the original as cause.
pub async fn safe<T, E, F>(fut: F, message: &str, kind: ErrorKind) -> Result<T, AppError>
where
    F: Future<Output = Result<T, E>>,
    E: Into<BoxError>,
{
    fut.await
        .map_err(|e| kind.constructor()(Some(message.to_string()), Some(e.into())))
}
