//! # Resolver
//!
//! Runtime half of the system: turn a captured call-site into a source line.
//!
//! ## Caching
//!
//! Each module's map is loaded at most once per resolver and then shared as an
//! `Arc<LineMap>`. A module whose map failed to load is remembered as "no map"
//! so a missing or corrupt blob is not retried on every frame.
//!
//! Hits only take the read lock. On a miss the map is loaded with no lock held
//! and inserted under the write lock; if two threads race on the same module
//! both load it and the later insert wins. The maps are equal, so callers
//! cannot tell.
//!
//! ## Failure handling
//!
//! Nothing here returns an error. Resolution usually runs while the host is
//! already reporting a failure, so every problem is logged at `debug` and the
//! call-site is reported as unresolved (`None`).

use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, PoisonError, RwLock};

use tracing::debug;

use crate::codec;
use crate::error::{LineMapError, Result};
use crate::map::{LineMap, ResolvedLine};
use crate::store;
use crate::types::{ModuleIdentity, SymbolId};

/// Fetches and decodes the line map of a module.
pub trait MapLoader: Send + Sync
{
    /// Load the map for `module`
    ///
    /// `Ok(None)` means the module simply has no map.
    ///
    /// ## Errors
    ///
    /// Returns an error if a blob was found but could not be read or decoded.
    fn load(&self, module: &ModuleIdentity) -> Result<Option<LineMap>>;
}

/// Loads maps through the [blob store](crate::store): embedded resource first, side-car second.
#[derive(Debug, Clone, Copy, Default)]
pub struct FsMapLoader;

impl MapLoader for FsMapLoader
{
    fn load(&self, module: &ModuleIdentity) -> Result<Option<LineMap>>
    {
        load_from_path(module.path())
    }
}

/// Read and decode the map stored for the module at `path`.
///
/// ## Errors
///
/// Returns [`LineMapError::Io`] or [`LineMapError::Codec`] when a blob exists
/// but is unreadable.
pub fn load_from_path(path: &Path) -> Result<Option<LineMap>>
{
    let Some(blob) = store::read_blob(path)? else {
        return Ok(None);
    };
    codec::decode(&blob).map(Some).map_err(LineMapError::from)
}

type Cache = HashMap<ModuleIdentity, Option<Arc<LineMap>>>;

/// Resolves call-sites against per-module line maps, caching each map.
pub struct Resolver<L: MapLoader = FsMapLoader>
{
    loader: L,
    cache: RwLock<Cache>,
}

impl Resolver<FsMapLoader>
{
    /// Resolver that reads maps from the filesystem.
    #[must_use]
    pub fn new() -> Self
    {
        Self::with_loader(FsMapLoader)
    }
}

impl Default for Resolver<FsMapLoader>
{
    fn default() -> Self
    {
        Self::new()
    }
}

impl<L: MapLoader> Resolver<L>
{
    pub fn with_loader(loader: L) -> Self
    {
        Self {
            loader,
            cache: RwLock::new(HashMap::new()),
        }
    }

    pub fn loader(&self) -> &L
    {
        &self.loader
    }

    /// Resolve `offset` bytes into `symbol_id` of `module`
    ///
    /// `None` when the module has no usable map, the symbol is unknown, the
    /// offset is unknown or out of range, or nothing precedes the target.
    pub fn resolve(&self, module: &ModuleIdentity, symbol_id: SymbolId, offset: i64) -> Option<ResolvedLine>
    {
        let map = self.line_map(module)?;
        let resolved = map.resolve(symbol_id, offset);
        if resolved.is_none() {
            debug!(module = %module, symbol = %symbol_id, offset, "call-site unresolved");
        }
        resolved
    }

    /// The cached map for `module`, loading it on first use.
    pub fn line_map(&self, module: &ModuleIdentity) -> Option<Arc<LineMap>>
    {
        if let Some(entry) = self.cached(module) {
            return entry;
        }

        let loaded = match self.loader.load(module) {
            Ok(Some(map)) => Some(Arc::new(map)),
            Ok(None) => {
                debug!(module = %module, "no line map for module");
                None
            }
            Err(err) => {
                debug!(module = %module, "failed to load line map: {err}");
                None
            }
        };

        self.cache
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(module.clone(), loaded.clone());
        loaded
    }

    /// Seed the cache with an already built map, replacing any cached entry.
    pub fn insert(&self, module: ModuleIdentity, map: LineMap)
    {
        self.cache
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(module, Some(Arc::new(map)));
    }

    /// Number of modules with a cache entry, including "no map" entries.
    pub fn cached_len(&self) -> usize
    {
        self.cache.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    /// Outer `None` on a cache miss, inner `None` for a remembered "no map".
    fn cached(&self, module: &ModuleIdentity) -> Option<Option<Arc<LineMap>>>
    {
        self.cache
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(module)
            .cloned()
    }
}
