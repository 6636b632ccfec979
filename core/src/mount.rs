//! Resource mount table
//!
//! Maps a 3-byte mount token (`S:/`, `A:/`, ...) to the path → data mapping of
//! one resource pack. Virtual paths are the token followed by a path that is
//! looked up verbatim in that pack:
//!
//! ```text
//! "S:/ui/AppEmpty.png"
//!  ^^^ token
//!     ^^^^^^^^^^^^^^^ pack path (no normalisation, no "..", no directories)
//! ```
//!
//! The table is process-scoped: titles loaded into the process resolve their
//! assets through [`MountTable::global`] (see [`crate::ffi`]). Tests and
//! embedders may also create private tables with [`MountTable::new`].

use std::fmt;
use std::str::FromStr;
use std::sync::{Arc, LazyLock, PoisonError, RwLock};

use glt_common::{Container, FormatError, ResourcePack};
use hashbrown::HashMap;
use thiserror::Error;

/// Errors raised while mounting
#[derive(Debug, Error)]
pub enum MountError {
    #[error("Invalid mount token {0:?}: must be exactly 3 bytes (e.g. \"S:/\")")]
    InvalidToken(String),

    #[error("Failed to parse resource pack for {token}: {source}")]
    Pack {
        token: MountToken,
        #[source]
        source: FormatError,
    },
}

/// Fixed-length mount point prefix
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MountToken([u8; MountToken::LEN]);

impl MountToken {
    pub const LEN: usize = 3;

    pub fn new(token: &str) -> Result<Self, MountError> {
        let bytes: [u8; Self::LEN] = token
            .as_bytes()
            .try_into()
            .map_err(|_| MountError::InvalidToken(token.to_string()))?;
        Ok(Self(bytes))
    }

    /// Split a virtual path into its token and the remaining pack path
    pub fn split_path(virtual_path: &str) -> Option<(Self, &str)> {
        let token = virtual_path.get(..Self::LEN)?;
        let rest = &virtual_path[Self::LEN..];
        Some((Self::new(token).ok()?, rest))
    }

    pub fn as_str(&self) -> &str {
        // Only ever built from the first 3 bytes of a &str on a char boundary
        std::str::from_utf8(&self.0).unwrap_or("???")
    }
}

impl FromStr for MountToken {
    type Err = MountError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl fmt::Display for MountToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

type PackMap = HashMap<String, Arc<[u8]>>;

/// Token → resource pack registry
#[derive(Default)]
pub struct MountTable {
    mounts: RwLock<HashMap<MountToken, PackMap>>,
}

static GLOBAL: LazyLock<MountTable> = LazyLock::new(MountTable::new);

impl MountTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// The process-wide table shared with loaded titles
    pub fn global() -> &'static MountTable {
        &GLOBAL
    }

    /// Parse a container's resource blob and mount it under `token`.
    ///
    /// Replaces any pack already mounted there. On a parse failure the table
    /// is left untouched. Returns the number of mounted paths.
    pub fn mount(&self, container: &Container, token: &str) -> Result<usize, MountError> {
        let token = MountToken::new(token)?;
        let pack = ResourcePack::parse(container.resource())
            .map_err(|source| MountError::Pack { token, source })?;
        Ok(self.mount_pack(token, pack))
    }

    /// Mount an already parsed pack under `token`
    pub fn mount_pack(&self, token: MountToken, pack: ResourcePack) -> usize {
        let map = pack.into_map();
        let count = map.len();
        let previous = self
            .mounts
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(token, map);

        if previous.is_some() {
            tracing::info!("Remounted {} ({} resources)", token, count);
        } else {
            tracing::info!("Mounted {} ({} resources)", token, count);
        }
        count
    }

    /// Remove the pack mounted under `token`
    pub fn unmount(&self, token: MountToken) -> bool {
        self.mounts
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&token)
            .is_some()
    }

    /// Drop every mount (process teardown)
    pub fn clear(&self) {
        self.mounts
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }

    /// Resolve a virtual path to its data.
    ///
    /// Returns `None` when the path is shorter than a token, the token is not
    /// mounted, or the pack has no such path.
    pub fn resolve(&self, virtual_path: &str) -> Option<Arc<[u8]>> {
        let Some((token, path)) = MountToken::split_path(virtual_path) else {
            tracing::warn!("Invalid virtual path: {:?}", virtual_path);
            return None;
        };

        let mounts = self.mounts.read().unwrap_or_else(PoisonError::into_inner);
        let Some(pack) = mounts.get(&token) else {
            tracing::warn!("Resource not found: {} ({} is not mounted)", virtual_path, token);
            return None;
        };
        let data = pack.get(path).cloned();
        if data.is_none() {
            tracing::warn!("Resource not found: {}", virtual_path);
        }
        data
    }

    pub fn is_mounted(&self, token: MountToken) -> bool {
        self.mounts
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(&token)
    }

    /// Mounted tokens, sorted
    pub fn tokens(&self) -> Vec<MountToken> {
        let mut tokens: Vec<_> = self
            .mounts
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .keys()
            .copied()
            .collect();
        tokens.sort();
        tokens
    }

    /// Number of paths mounted under `token`
    pub fn entry_count(&self, token: MountToken) -> Option<usize> {
        self.mounts
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&token)
            .map(HashMap::len)
    }

    /// Paths mounted under `token`, sorted
    pub fn paths(&self, token: MountToken) -> Vec<String> {
        let mounts = self.mounts.read().unwrap_or_else(PoisonError::into_inner);
        let mut paths: Vec<_> = mounts
            .get(&token)
            .map(|pack| pack.keys().cloned().collect())
            .unwrap_or_default();
        paths.sort();
        paths
    }
}

/// Mount a container's resources into the global table
pub fn mount(container: &Container, token: &str) -> Result<usize, MountError> {
    MountTable::global().mount(container, token)
}

/// Resolve a virtual path through the global table
pub fn resolve(virtual_path: &str) -> Option<Arc<[u8]>> {
    MountTable::global().resolve(virtual_path)
}
