//! Repository abstraction: the trait the service and HTTP layers depend
//! on, plus the error types every implementation returns.

pub mod error;
pub mod series;

pub use error::{ErrorContext, RepositoryError, RepositoryResult};
pub use series::SeriesRepository;
