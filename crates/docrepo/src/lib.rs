//! ## Crate layout
//! - `core`: criteria trees, descriptor parsing, rendering, pagination.
//! - `config`: TOML repository configuration.
//! - `error`: public error taxonomy.
//!
//! `open_repository` builds a `Repository` from a loaded config; the
//! `prelude` carries the vocabulary needed to declare and run queries.

pub use docrepo_config as config;
pub use docrepo_core as core;

pub mod error;

pub use error::Error;

use docrepo_config::{DialectName, RepositoryConfig};
use docrepo_core::{
    model::EntitySchema,
    query::render::DialectKind,
    repository::{QueryExecutor, Repository, RepositoryOptions},
};

//
// Consts
//

/// Workspace version re-export for downstream tooling/tests.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Convert a loaded config into core repository options.
#[must_use]
pub const fn repository_options(config: &RepositoryConfig) -> RepositoryOptions {
    RepositoryOptions {
        dialect: match config.dialect {
            DialectName::Generic => DialectKind::Generic,
            DialectName::Cosmos => DialectKind::Cosmos,
        },
        default_page_size: config.default_page_size,
        max_page_size: config.max_page_size,
        cache_enabled: config.descriptor_cache.enabled,
        max_cursor_bytes: config.cursor.max_token_bytes,
        debug: config.debug,
    }
}

/// Build a repository for `schema` from a validated config.
///
/// A configured container overrides the one declared by the schema.
pub fn open_repository<X: QueryExecutor>(
    executor: X,
    schema: EntitySchema,
    config: &RepositoryConfig,
) -> Result<Repository<X>, Error> {
    config.validate()?;

    let schema = match &config.container {
        Some(container) => schema.with_container(container.as_str()),
        None => schema,
    };
    let options = repository_options(config);
    tracing::debug!(
        dialect = %options.dialect,
        cache = options.cache_enabled,
        "opened repository"
    );

    Ok(Repository::new(executor, schema, options))
}

///
/// Prelude
///

pub mod prelude {
    pub use crate::{Error, open_repository};
    pub use docrepo_core::{
        prelude::*,
        repository::{FetchResult, QueryExecutor, Repository, RepositoryOptions},
    };
}
