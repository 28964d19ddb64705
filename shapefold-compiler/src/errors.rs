/// The pass error type.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("invariant violated: {0}")]
    Invariant(String),
    #[error("cannot unify an empty set of types")]
    EmptyClique,
    #[error("type graph error")]
    Graph(#[from] shapefold_model::errors::Error),
    #[error("invalid configuration")]
    Config(#[from] toml::de::Error),
    #[error("input/output error")]
    IO(#[from] std::io::Error),
}

impl Error {
    pub fn invariant<S: Into<String>>(msg: S) -> Self {
        Error::Invariant(msg.into())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
