/*
 * Responsibility
 * - tokio runtime
 * - app::run() only (no logic here)
 */
use server_kit::{app, error::AppError};

#[tokio::main]
async fn main() -> Result<(), AppError> {
    app::run().await
}
