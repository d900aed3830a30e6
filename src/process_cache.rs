use crate::error::BridgeError;
use crate::load::{load, Library};
use crate::locate::{locate, Location};
use log::{debug, trace};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, LazyLock, Mutex, PoisonError};

#[derive(Default)]
struct Cache {
    libraries: HashMap<Location, Arc<Library>>,
    #[cfg(test)]
    loads: HashMap<Location, usize>,
}

/// Process-wide map from load location to the library opened there.
///
/// The lock is held across the actual load, so concurrent first requests
/// for the same library cause exactly one `dlopen`.
static CACHE: LazyLock<Mutex<Cache>> = LazyLock::new(|| Mutex::new(Cache::default()));

/// Locates `name` and returns the process-wide instance of it, loading it
/// on first request. A failed load is not cached; it is reported to the
/// caller and nothing is inserted.
pub fn cached_load(name: &str, search_paths: &[PathBuf]) -> Result<Arc<Library>, BridgeError> {
    let location = locate(name, search_paths)?;

    let mut cache = CACHE.lock().unwrap_or_else(PoisonError::into_inner);
    if let Some(lib) = cache.libraries.get(&location) {
        trace!("loading cache: {}", location.display());

        return Ok(Arc::clone(lib));
    }

    let lib = Arc::new(load(name, &location)?);
    #[cfg(test)]
    {
        *cache.loads.entry(location.clone()).or_insert(0) += 1;
    }
    cache.libraries.insert(location, Arc::clone(&lib));
    drop(cache);

    debug!("loaded: {}", name);

    Ok(lib)
}

/// How many times the library at `location` was actually opened.
#[cfg(test)]
pub(crate) fn load_count(location: &Location) -> usize {
    let cache = CACHE.lock().unwrap_or_else(PoisonError::into_inner);
    cache.loads.get(location).copied().unwrap_or(0)
}
