mod config;
mod environment;
mod error;
mod extractors;

pub use config::{parse_origins, AppConfig, DEFAULT_LIST_PREFIX, DEFAULT_MAX_UPLOAD_BYTES};
pub use environment::{Environment, DEFAULT_PRESIGNED_URL_EXPIRY_SECS};
pub use error::{ApiErrorResponse, AppError};
pub use extractors::{ValidatedJson, ValidatedQuery};
