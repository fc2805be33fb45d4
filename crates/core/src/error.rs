use thiserror::Error;

use crate::catalog::CatalogError;
use crate::model::LevelError;
use crate::rules::RulesError;

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    #[error(transparent)]
    Level(#[from] LevelError),
    #[error(transparent)]
    Rules(#[from] RulesError),
    #[error(transparent)]
    Catalog(#[from] CatalogError),
}
