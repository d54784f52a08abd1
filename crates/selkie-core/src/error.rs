use crate::detect::DetectKindError;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    DetectKind(#[from] DetectKindError),
}
