use crate::error::BridgeError;
use crate::load::Export;
use std::ffi::{c_char, CStr};
use std::ptr::NonNull;

/// Something that can hand a native string buffer back to the allocator it
/// came from.
pub trait Release {
    /// # Safety
    /// `ptr` must have been produced by the matching native allocator and
    /// must not be used afterwards.
    unsafe fn release(&self, ptr: *mut c_char);
}

impl Release for Export<(*mut c_char,), ()> {
    unsafe fn release(&self, ptr: *mut c_char) {
        unsafe { self.call((ptr,)) }
    }
}

/// A string buffer owned by the native side.
///
/// The guard owns the buffer from the moment the native function returns
/// it and releases it exactly once when dropped, whether or not its
/// contents could be copied out.
pub struct NativeString<'r, R: Release> {
    ptr: NonNull<c_char>,
    releaser: &'r R,
}

impl<'r, R: Release> NativeString<'r, R> {
    /// Takes ownership of `ptr`. A NULL pointer is the native side's way
    /// of reporting a fault and becomes a [`BridgeError::NativeCall`].
    ///
    /// # Safety
    /// A non-null `ptr` must point to a NUL-terminated buffer that
    /// `releaser` is able to free, and nobody else may free it.
    pub unsafe fn from_raw(
        ptr: *mut c_char,
        releaser: &'r R,
        symbol: &str,
    ) -> Result<Self, BridgeError> {
        let ptr = NonNull::new(ptr)
            .ok_or_else(|| BridgeError::native_call(symbol, "returned a null string"))?;

        Ok(Self { ptr, releaser })
    }

    pub fn as_c_str(&self) -> &CStr {
        unsafe { CStr::from_ptr(self.ptr.as_ptr()) }
    }

    /// Copies the buffer into a caller-owned `String`. The native buffer
    /// itself is released when `self` goes out of scope.
    pub fn to_owned_string(&self, symbol: &str) -> Result<String, BridgeError> {
        self.as_c_str()
            .to_str()
            .map(str::to_owned)
            .map_err(|e| {
                BridgeError::native_call(symbol, format!("returned invalid UTF-8: {}", e))
            })
    }
}

impl<R: Release> Drop for NativeString<'_, R> {
    fn drop(&mut self) {
        unsafe { self.releaser.release(self.ptr.as_ptr()) }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::ffi::CString;

    /// Frees `CString`s and remembers every pointer it was asked to free.
    #[derive(Default)]
    struct Recorder {
        released: RefCell<Vec<usize>>,
    }

    impl Release for Recorder {
        unsafe fn release(&self, ptr: *mut c_char) {
            self.released.borrow_mut().push(ptr as usize);
            drop(unsafe { CString::from_raw(ptr) });
        }
    }

    #[test]
    fn copies_and_releases_once() {
        let recorder = Recorder::default();
        let raw = CString::new("native-hello").unwrap().into_raw();

        let text = {
            let s = unsafe { NativeString::from_raw(raw, &recorder, "hello") }.unwrap();
            s.to_owned_string("hello").unwrap()
        };

        assert_eq!(text, "native-hello");
        assert_eq!(*recorder.released.borrow(), vec![raw as usize]);
    }

    #[test]
    fn empty_string_is_valid() {
        let recorder = Recorder::default();
        let raw = CString::new("").unwrap().into_raw();

        let s = unsafe { NativeString::from_raw(raw, &recorder, "hello") }.unwrap();
        assert_eq!(s.to_owned_string("hello").unwrap(), "");
        drop(s);

        assert_eq!(recorder.released.borrow().len(), 1);
    }

    #[test]
    fn null_is_a_native_call_error() {
        let recorder = Recorder::default();

        let err = unsafe { NativeString::from_raw(std::ptr::null_mut(), &recorder, "hello") }
            .err()
            .unwrap();

        assert!(err.is_native_call());
        assert!(recorder.released.borrow().is_empty());
    }

    #[test]
    fn invalid_utf8_is_released_anyway() {
        let recorder = Recorder::default();
        let raw = CString::new(vec![0xff, 0xfe, b'x']).unwrap().into_raw();

        let err = {
            let s = unsafe { NativeString::from_raw(raw, &recorder, "hello") }.unwrap();
            s.to_owned_string("hello").unwrap_err()
        };

        assert!(err.is_native_call());
        assert_eq!(*recorder.released.borrow(), vec![raw as usize]);
    }
}
