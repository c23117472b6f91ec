use thiserror::Error;

#[derive(Debug, Error)]
pub enum BloomError {
    #[error("IO: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON: {0}")]
    SerdeJson(#[from] serde_json::Error),

    #[error("Thread pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),

    #[error("Config: {0}")]
    Config(String),

    /// Degenerate launch (no words, no hash functions, or more hash rows than a group holds).
    #[error("Launch: {0}")]
    Launch(String),

    #[error("Capacity: {what} needs {needed} bytes, device local memory is {available}")]
    Capacity {
        what: &'static str,
        needed: usize,
        available: usize,
    },

    #[error("Word {index} is {len} bytes long, scratch holds at most {max}")]
    WordTooLong { index: usize, len: usize, max: usize },

    #[error("Word {index} is not comma terminated")]
    Unterminated { index: usize },
}

pub type Result<T> = std::result::Result<T, BloomError>;
