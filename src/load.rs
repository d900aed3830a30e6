use crate::error::BridgeError;
use crate::locate::Location;
use crate::signature::{Invoke, Signature};
#[cfg(unix)]
use libloading::os::unix::{
    Library as LLNativeLibrary, // LL means libloading
    Symbol,
    RTLD_LOCAL,
    RTLD_NOW,
};
#[cfg(windows)]
use libloading::os::windows::{
    Library as LLNativeLibrary, // LL means libloading
    Symbol,
};
use log::{debug, trace};
use std::fmt;
use std::ops::Deref;
use std::sync::Arc;

/// A loaded shared library.
///
/// It is only ever constructed after the platform loader accepted the
/// file, and it is shared through `Arc` so every resolved [`Export`] keeps
/// the code it points into mapped.
pub struct Library {
    name: String,
    location: Location,
    raw_library: LLNativeLibrary,
}

impl fmt::Debug for Library {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Library")
            .field("name", &self.name)
            .field("location", &self.location)
            .finish()
    }
}

impl Library {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn location(&self) -> &Location {
        &self.location
    }

    /// Resolves `symbol` as an export with the C signature `(Args) -> Res`.
    ///
    /// # Safety
    /// The caller asserts that the native export really has that signature.
    /// A mismatch is undefined behaviour once the export is called.
    pub unsafe fn get_export<Args, Res>(
        self: &Arc<Self>,
        symbol: &str,
    ) -> Result<Export<Args, Res>, BridgeError>
    where
        (Args, Res): Signature,
    {
        trace!("{}: resolving {}", self.name, symbol);

        let raw_symbol: Symbol<<(Args, Res) as Signature>::Output> = unsafe {
            self.raw_library
                .get(symbol.as_bytes())
                .map_err(|e| BridgeError::symbol_resolution(&self.name, symbol, e))?
        };

        Ok(Export {
            name: symbol.to_string(),
            raw_symbol,
            _library: Arc::clone(self),
        })
    }
}

/// A resolved export bound to the library that owns its code.
pub struct Export<Args, Res>
where
    (Args, Res): Signature,
{
    name: String,
    raw_symbol: Symbol<<(Args, Res) as Signature>::Output>,
    _library: Arc<Library>,
}

impl<Args, Res> Export<Args, Res>
where
    (Args, Res): Signature,
    Args: Invoke<Args, Res>,
{
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Calls the native function.
    ///
    /// # Safety
    /// Whatever contract the native function imposes on its arguments and
    /// its result is the caller's to uphold.
    pub unsafe fn call(&self, args: Args) -> Res {
        let func = self.raw_symbol.deref();
        unsafe { <Args as Invoke<Args, Res>>::invoke(args, func) }
    }
}

impl<Args, Res> fmt::Debug for Export<Args, Res>
where
    (Args, Res): Signature,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Export").field("name", &self.name).finish()
    }
}

#[cfg(unix)]
unsafe fn libloading_load(location: &Location) -> Result<LLNativeLibrary, libloading::Error> {
    match location {
        Location::Path(path) => unsafe {
            LLNativeLibrary::open(Some(path), RTLD_NOW | RTLD_LOCAL)
        },
        Location::System(file_name) => unsafe {
            LLNativeLibrary::open(Some(file_name), RTLD_NOW | RTLD_LOCAL)
        },
    }
}

#[cfg(windows)]
unsafe fn libloading_load(location: &Location) -> Result<LLNativeLibrary, libloading::Error> {
    match location {
        Location::Path(path) => unsafe { LLNativeLibrary::new(path) },
        Location::System(file_name) => unsafe { LLNativeLibrary::new(file_name) },
    }
}

/// Opens the library at `location` without any caching.
///
/// On unix every relocation is bound at load time (`RTLD_NOW`), so a
/// library with unresolvable dependencies fails here rather than at the
/// first call.
pub fn load(name: &str, location: &Location) -> Result<Library, BridgeError> {
    debug!("loading {}: {}", name, location.display());

    let raw_library = unsafe { libloading_load(location) }
        .map_err(|e| BridgeError::library_load(name, e))?;

    Ok(Library {
        name: name.to_string(),
        location: location.clone(),
        raw_library,
    })
}
