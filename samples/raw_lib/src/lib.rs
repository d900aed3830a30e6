//! Native side of the bridge: every string it returns is allocated here and
//! must come back through `raw_free_string`.

use std::ffi::{c_char, CString};
use std::ptr;

fn into_raw(s: &str) -> *mut c_char {
    match CString::new(s) {
        Ok(s) => s.into_raw(),
        Err(_) => ptr::null_mut(),
    }
}

#[no_mangle]
pub extern "C" fn hello() -> *mut c_char {
    into_raw("native-hello")
}

#[no_mangle]
pub extern "C" fn hello_empty() -> *mut c_char {
    into_raw("")
}

/// Reports a fault the only way this ABI can: with a null string.
#[no_mangle]
pub extern "C" fn hello_null() -> *mut c_char {
    ptr::null_mut()
}

#[no_mangle]
pub unsafe extern "C" fn raw_free_string(s: *mut c_char) {
    if !s.is_null() {
        drop(CString::from_raw(s));
    }
}

#[no_mangle]
pub extern "C" fn raw_add(a: i32, b: i32) -> i32 {
    a + b
}
