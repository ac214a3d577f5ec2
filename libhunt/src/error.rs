use thiserror::Error;

#[derive(Debug, Error)]
pub enum HuntError {
    #[error("hunt not found: {0}")]
    HuntNotFound(String),

    #[error("treasure {id} not found in hunt {hunt}")]
    RecordNotFound { hunt: String, id: u32 },

    #[error("corrupt record block of {0} bytes")]
    CorruptRecord(usize),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
