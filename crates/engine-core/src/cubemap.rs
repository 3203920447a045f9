//! Cube-map textures decoded off the main thread.
//!
//! [`CubeTextureLoader::load`] returns a [`CubeTexture`] handle immediately and
//! decodes the six faces on a worker thread. The handle is shared (scene
//! background, material env maps) and moves from `Loading` to either `Ready`
//! or `Failed` exactly once. Renderers poll it each frame.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use parking_lot::{Condvar, Mutex};
use thiserror::Error;

/// Face order: +X, -X, +Y, -Y, +Z, -Z. Matches wgpu cube array layers.
pub const CUBE_FACE_COUNT: usize = 6;

static NEXT_CUBE_ID: AtomicU64 = AtomicU64::new(1);

#[derive(Error, Debug)]
pub enum CubeMapError {
    #[error("failed to load cube face {path}: {source}")]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("cube face {path} is {width}x{height}, faces must be square")]
    NotSquare { path: PathBuf, width: u32, height: u32 },

    #[error("cube face {path} is {size}px but the first face is {expected}px")]
    SizeMismatch { path: PathBuf, size: u32, expected: u32 },

    #[error("failed to spawn decoder thread: {0}")]
    Spawn(#[from] std::io::Error),
}

/// Decoded faces, RGBA8 sRGB, `size * size * 4` bytes each.
#[derive(Clone, PartialEq, Eq)]
pub struct CubeFaces {
    pub size: u32,
    pub faces: [Vec<u8>; CUBE_FACE_COUNT],
}

impl fmt::Debug for CubeFaces {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CubeFaces").field("size", &self.size).finish_non_exhaustive()
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub struct CubeTextureId(u64);

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum CubeStatus {
    Loading,
    Ready,
    Failed,
}

enum CubeState {
    Loading,
    Ready(Arc<CubeFaces>),
    Failed,
}

struct CubeTextureInner {
    id: CubeTextureId,
    state: Mutex<CubeState>,
    settled: Condvar,
}

/// Shared handle to a cube map that may still be decoding.
#[derive(Clone)]
pub struct CubeTexture {
    inner: Arc<CubeTextureInner>,
}

impl CubeTexture {
    fn with_state(state: CubeState) -> Self {
        Self {
            inner: Arc::new(CubeTextureInner {
                id: CubeTextureId(NEXT_CUBE_ID.fetch_add(1, Ordering::Relaxed)),
                state: Mutex::new(state),
                settled: Condvar::new(),
            }),
        }
    }

    /// A cube map that is ready immediately.
    pub fn from_faces(faces: CubeFaces) -> Self {
        Self::with_state(CubeState::Ready(Arc::new(faces)))
    }

    fn pending() -> Self {
        Self::with_state(CubeState::Loading)
    }

    fn settle(&self, result: Result<CubeFaces, CubeMapError>) {
        let mut state = self.inner.state.lock();
        *state = match result {
            Ok(faces) => {
                log::debug!("cube texture {:?} ready ({}px faces)", self.inner.id, faces.size);
                CubeState::Ready(Arc::new(faces))
            }
            Err(e) => {
                log::warn!(
                    "cube texture {:?} failed, background stays unset: {}",
                    self.inner.id,
                    e
                );
                CubeState::Failed
            }
        };
        self.inner.settled.notify_all();
    }

    pub fn id(&self) -> CubeTextureId {
        self.inner.id
    }

    pub fn status(&self) -> CubeStatus {
        match &*self.inner.state.lock() {
            CubeState::Loading => CubeStatus::Loading,
            CubeState::Ready(_) => CubeStatus::Ready,
            CubeState::Failed => CubeStatus::Failed,
        }
    }

    /// Decoded faces, once ready.
    pub fn faces(&self) -> Option<Arc<CubeFaces>> {
        match &*self.inner.state.lock() {
            CubeState::Ready(faces) => Some(faces.clone()),
            _ => None,
        }
    }

    /// Block until the texture leaves `Loading` or the timeout elapses.
    pub fn wait(&self, timeout: Duration) -> CubeStatus {
        let mut state = self.inner.state.lock();
        if matches!(*state, CubeState::Loading) {
            let _ = self.inner.settled.wait_while_for(
                &mut state,
                |s| matches!(s, CubeState::Loading),
                timeout,
            );
        }
        match &*state {
            CubeState::Loading => CubeStatus::Loading,
            CubeState::Ready(_) => CubeStatus::Ready,
            CubeState::Failed => CubeStatus::Failed,
        }
    }
}

impl fmt::Debug for CubeTexture {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CubeTexture")
            .field("id", &self.inner.id)
            .field("status", &self.status())
            .finish()
    }
}

/// Loads six face images from a directory into a [`CubeTexture`].
#[derive(Clone, Debug, Default)]
pub struct CubeTextureLoader {
    path: PathBuf,
}

impl CubeTextureLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Directory the face names are resolved against.
    pub fn with_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.path = path.into();
        self
    }

    /// Start decoding in the background; never blocks and never fails.
    /// Errors surface as [`CubeStatus::Failed`] on the returned handle.
    pub fn load(&self, names: [&str; CUBE_FACE_COUNT]) -> CubeTexture {
        let texture = CubeTexture::pending();
        let paths: Vec<PathBuf> = names.iter().map(|n| self.path.join(n)).collect();
        log::info!("loading cube map from {}", self.path.display());

        let worker = texture.clone();
        let spawned = std::thread::Builder::new()
            .name("cubemap-decode".into())
            .spawn(move || worker.settle(decode_faces(&paths)));
        if let Err(e) = spawned {
            texture.settle(Err(CubeMapError::Spawn(e)));
        }
        texture
    }

    /// Decode on the calling thread.
    pub fn load_blocking(&self, names: [&str; CUBE_FACE_COUNT]) -> Result<CubeFaces, CubeMapError> {
        let paths: Vec<PathBuf> = names.iter().map(|n| self.path.join(n)).collect();
        decode_faces(&paths)
    }
}

fn decode_faces(paths: &[PathBuf]) -> Result<CubeFaces, CubeMapError> {
    let mut size = 0;
    let mut faces: [Vec<u8>; CUBE_FACE_COUNT] = Default::default();
    for (i, path) in paths.iter().enumerate().take(CUBE_FACE_COUNT) {
        let (w, h, rgba) = decode_face(path)?;
        if w != h {
            return Err(CubeMapError::NotSquare { path: path.clone(), width: w, height: h });
        }
        if i == 0 {
            size = w;
        } else if w != size {
            return Err(CubeMapError::SizeMismatch { path: path.clone(), size: w, expected: size });
        }
        faces[i] = rgba;
    }
    Ok(CubeFaces { size, faces })
}

fn decode_face(path: &Path) -> Result<(u32, u32, Vec<u8>), CubeMapError> {
    let img = image::open(path)
        .map_err(|source| CubeMapError::Decode { path: path.to_path_buf(), source })?;
    let rgba = img.to_rgba8();
    let (w, h) = rgba.dimensions();
    Ok((w, h, rgba.into_raw()))
}
