use paperrag_vector_store::VectorStoreError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, RetrievalError>;

#[derive(Error, Debug)]
pub enum RetrievalError {
    #[error(transparent)]
    Store(#[from] VectorStoreError),
}
