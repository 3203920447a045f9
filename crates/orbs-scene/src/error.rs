use orbs_surface::SurfaceError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, SceneError>;

#[derive(Error, Debug)]
pub enum SceneError {
    /// A live controller already exists; it is left untouched.
    #[error("scene controller has already been initialized")]
    AlreadyInitialized,

    /// The drawable surface could not be acquired.
    #[error("rendering surface unavailable: {0}")]
    Surface(#[from] SurfaceError),
}
