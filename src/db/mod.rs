//! Data-access module: repository trait, implementations, and the
//! process-wide repository singleton.
//!
//! The service layer only ever sees `Arc<dyn SeriesRepository>`; which
//! backend sits behind it is decided once at startup by feature flag:
//! `postgres-repo` takes precedence over `local-repo` when both are
//! enabled.

#[cfg(not(any(feature = "postgres-repo", feature = "local-repo")))]
compile_error!("Enable at least one repository backend feature.");

pub mod repositories;
pub mod repository;

pub use repositories::LocalRepository;
#[cfg(feature = "postgres-repo")]
pub use repositories::{PostgresConfig, PostgresRepository, TableConfig};
pub use repository::{
    ErrorContext, RepositoryError, RepositoryResult, SeriesRepository,
};

use anyhow::{Context, Result};
use std::sync::{Arc, OnceLock};

/// Global repository instance initialized once per process.
static REPOSITORY: OnceLock<Arc<dyn SeriesRepository>> = OnceLock::new();

#[cfg(feature = "postgres-repo")]
fn create_selected_repository() -> RepositoryResult<Arc<dyn SeriesRepository>> {
    let config = PostgresConfig::from_env().map_err(RepositoryError::configuration)?;
    let tables = TableConfig::from_env();
    let repo = PostgresRepository::connect(&config, tables)?;
    Ok(Arc::new(repo))
}

#[cfg(all(feature = "local-repo", not(feature = "postgres-repo")))]
fn create_selected_repository() -> RepositoryResult<Arc<dyn SeriesRepository>> {
    Ok(Arc::new(LocalRepository::new()))
}

/// Initialize the global repository singleton for the selected backend.
pub fn init_repository() -> Result<()> {
    if REPOSITORY.get().is_some() {
        return Ok(());
    }

    let repo =
        create_selected_repository().map_err(|e| anyhow::Error::msg(e.to_string()))?;
    let _ = REPOSITORY.set(repo);
    Ok(())
}

/// Get a reference to the global repository instance.
pub fn get_repository() -> Result<&'static Arc<dyn SeriesRepository>> {
    if REPOSITORY.get().is_none() {
        let _ = init_repository();
    }

    REPOSITORY
        .get()
        .context("Repository not initialized. Call init_repository() first.")
}
