//! Purpose: C ABI bridge so WebAssembly and native hosts can call the ledger bridge.
//! Exports: `wazbean_buf`, pointer helpers, `export_ledger_parser!`, `export_ledger_executor!`.
//! Role: Converts pointers to `&str` and back around `bridge`; holds no logic of its own.
//! Invariants: Text in, JSON text out; every returned pointer is owned by the caller.
//! Invariants: Output is released only through `wazbean_string_free` / `wazbean_buf_free`.
//! Invariants: Buffer exports return 0, a positive `to_status_code`, or -1 for a null `out`.
//! Invariants: Free functions accept null and zero-length inputs.
//! Notes: The host crate binds its collaborators with the export macros; symbols live there.
#![allow(non_camel_case_types)]

use crate::bridge::{
    BridgeOptions, execute_to_json, parse_to_json, try_execute_to_json, try_parse_to_json,
};
use crate::core::error::{Error, ErrorKind, to_status_code};
use crate::ledger::{LedgerExecutor, LedgerParser};
use std::ffi::{CStr, CString, c_char};
use std::ptr;

pub const STATUS_OK: i32 = 0;
pub const STATUS_USAGE: i32 = -1;

#[repr(C)]
pub struct wazbean_buf {
    pub data: *mut u8,
    pub len: usize,
}

impl wazbean_buf {
    pub fn empty() -> Self {
        Self {
            data: ptr::null_mut(),
            len: 0,
        }
    }
}

/// Parse a NUL-terminated query and return an owned NUL-terminated JSON string.
///
/// # Safety
///
/// `query` must be null or point to a NUL-terminated string that stays valid
/// for the duration of the call. The returned pointer must be released with
/// [`string_free`].
pub unsafe fn parse_cstr_to_json<P>(
    parser: &P,
    query: *const c_char,
    options: &BridgeOptions,
) -> *mut c_char
where
    P: LedgerParser + ?Sized,
{
    let json = match unsafe { read_cstr(query, "query") } {
        Ok(input) => parse_to_json(parser, input, options),
        Err(err) => rejected(err),
    };
    to_c_string(json)
}

/// Parse a length-delimited query and write the JSON bytes into `out`.
///
/// Returns [`STATUS_OK`] when `out` holds ledger JSON, the error kind's
/// [`to_status_code`] when it holds an error payload, and [`STATUS_USAGE`]
/// when `out` is null.
///
/// # Safety
///
/// `bytes` must be null or valid for reads of `len` bytes. `out` must be null
/// or point to a writable `wazbean_buf`; its previous contents are not freed.
pub unsafe fn parse_bytes_to_json<P>(
    parser: &P,
    bytes: *const u8,
    len: usize,
    out: *mut wazbean_buf,
    options: &BridgeOptions,
) -> i32
where
    P: LedgerParser + ?Sized,
{
    if out.is_null() {
        tracing::warn!("parse_bytes_to_json called with null out buffer");
        return STATUS_USAGE;
    }
    let result = unsafe { read_bytes(bytes, len, "query") }
        .and_then(|input| try_parse_to_json(parser, input, options));
    unsafe { finish_buf(out, result) }
}

/// Run a NUL-terminated query against NUL-terminated ledger text.
///
/// # Safety
///
/// `query` and `ledger_text` must each be null or point to a NUL-terminated
/// string valid for the duration of the call. The returned pointer must be
/// released with [`string_free`].
pub unsafe fn execute_cstr_to_json<E>(
    executor: &E,
    query: *const c_char,
    ledger_text: *const c_char,
    options: &BridgeOptions,
) -> *mut c_char
where
    E: LedgerExecutor + ?Sized,
{
    let inputs = unsafe { read_cstr(query, "query") }
        .and_then(|query| Ok((query, unsafe { read_cstr(ledger_text, "ledger")? })));
    let json = match inputs {
        Ok((query, ledger_text)) => execute_to_json(executor, query, ledger_text, options),
        Err(err) => rejected(err),
    };
    to_c_string(json)
}

/// Length-delimited form of [`execute_cstr_to_json`]; status as in [`parse_bytes_to_json`].
///
/// # Safety
///
/// Each byte pointer must be null or valid for reads of its length. `out`
/// must be null or point to a writable `wazbean_buf`.
pub unsafe fn execute_bytes_to_json<E>(
    executor: &E,
    query: *const u8,
    query_len: usize,
    ledger_text: *const u8,
    ledger_len: usize,
    out: *mut wazbean_buf,
    options: &BridgeOptions,
) -> i32
where
    E: LedgerExecutor + ?Sized,
{
    if out.is_null() {
        tracing::warn!("execute_bytes_to_json called with null out buffer");
        return STATUS_USAGE;
    }
    let result = unsafe { read_bytes(query, query_len, "query") }.and_then(|query| {
        let ledger_text = unsafe { read_bytes(ledger_text, ledger_len, "ledger")? };
        try_execute_to_json(executor, query, ledger_text, options)
    });
    unsafe { finish_buf(out, result) }
}

/// # Safety
///
/// `ptr` must be null or a pointer returned by one of the `*_cstr_to_json`
/// helpers that has not been freed yet.
pub unsafe fn string_free(ptr: *mut c_char) {
    if ptr.is_null() {
        return;
    }
    unsafe {
        drop(CString::from_raw(ptr));
    }
}

/// # Safety
///
/// `buf` must be null or point to a `wazbean_buf` filled by one of the
/// `*_bytes_to_json` helpers (or empty). The buffer is reset to empty.
pub unsafe fn buf_free(buf: *mut wazbean_buf) {
    if buf.is_null() {
        return;
    }
    unsafe {
        let buf = &mut *buf;
        if !buf.data.is_null() && buf.len != 0 {
            drop(Box::from_raw(ptr::slice_from_raw_parts_mut(buf.data, buf.len)));
        }
        buf.data = ptr::null_mut();
        buf.len = 0;
    }
}

/// Reserve `len` zeroed bytes the host can fill with query text.
pub fn alloc(len: usize) -> *mut u8 {
    let mut bytes = vec![0u8; len].into_boxed_slice();
    let ptr = bytes.as_mut_ptr();
    std::mem::forget(bytes);
    ptr
}

/// # Safety
///
/// `ptr` must be null or come from [`alloc`] with the same `len`.
pub unsafe fn dealloc(ptr: *mut u8, len: usize) {
    if ptr.is_null() {
        return;
    }
    unsafe {
        drop(Box::from_raw(ptr::slice_from_raw_parts_mut(ptr, len)));
    }
}

fn rejected(err: Error) -> String {
    tracing::warn!(kind = ?err.kind(), error = %err, "rejecting input");
    err.payload().into_owned()
}

unsafe fn finish_buf(out: *mut wazbean_buf, result: Result<String, Error>) -> i32 {
    let (json, status) = match result {
        Ok(json) => (json, STATUS_OK),
        Err(err) => {
            tracing::warn!(kind = ?err.kind(), error = %err, "returning error payload");
            (err.payload().into_owned(), to_status_code(err.kind()))
        }
    };
    unsafe { write_buf(out, json.into_bytes()) };
    status
}

unsafe fn read_cstr<'a>(text: *const c_char, what: &str) -> Result<Option<&'a str>, Error> {
    if text.is_null() {
        return Ok(None);
    }
    unsafe { CStr::from_ptr(text) }
        .to_str()
        .map(Some)
        .map_err(|err| invalid_utf8(what, err))
}

unsafe fn read_bytes<'a>(
    bytes: *const u8,
    len: usize,
    what: &str,
) -> Result<Option<&'a str>, Error> {
    if bytes.is_null() {
        return Ok(None);
    }
    let slice = unsafe { std::slice::from_raw_parts(bytes, len) };
    std::str::from_utf8(slice)
        .map(Some)
        .map_err(|err| invalid_utf8(what, err))
}

fn invalid_utf8(what: &str, err: std::str::Utf8Error) -> Error {
    Error::new(ErrorKind::InvalidUtf8)
        .with_message(format!("{what} is not valid UTF-8"))
        .with_source(err)
}

unsafe fn write_buf(out: *mut wazbean_buf, bytes: Vec<u8>) {
    let mut data = bytes.into_boxed_slice();
    unsafe {
        let buf = &mut *out;
        buf.len = data.len();
        buf.data = data.as_mut_ptr();
    }
    std::mem::forget(data);
}

fn to_c_string(json: String) -> *mut c_char {
    CString::new(json)
        .or_else(|_| CString::new(ErrorKind::Serialize.payload()))
        .map(CString::into_raw)
        .unwrap_or(ptr::null_mut())
}

/// Generate the exported C symbols for one ledger parser.
///
/// Invoke once in the `cdylib` that links the external parser:
///
/// ```ignore
/// wazbean::export_ledger_parser!(external_ledger::parse_string);
/// ```
///
/// A second argument overrides the default `BridgeOptions`. This macro also
/// emits the free, alloc and logging symbols shared with
/// [`export_ledger_executor!`].
#[macro_export]
macro_rules! export_ledger_parser {
    ($parser:expr) => {
        $crate::export_ledger_parser!($parser, $crate::bridge::BridgeOptions::default());
    };
    ($parser:expr, $options:expr) => {
        #[unsafe(no_mangle)]
        pub extern "C" fn parse_bql_to_json(
            query: *const ::std::ffi::c_char,
        ) -> *mut ::std::ffi::c_char {
            unsafe { $crate::abi::parse_cstr_to_json(&$parser, query, &$options) }
        }

        #[unsafe(no_mangle)]
        pub extern "C" fn wazbean_parse_to_json_buf(
            bytes: *const u8,
            len: usize,
            out: *mut $crate::abi::wazbean_buf,
        ) -> i32 {
            unsafe { $crate::abi::parse_bytes_to_json(&$parser, bytes, len, out, &$options) }
        }

        #[unsafe(no_mangle)]
        pub extern "C" fn wazbean_string_free(ptr: *mut ::std::ffi::c_char) {
            unsafe { $crate::abi::string_free(ptr) }
        }

        #[unsafe(no_mangle)]
        pub extern "C" fn wazbean_buf_free(buf: *mut $crate::abi::wazbean_buf) {
            unsafe { $crate::abi::buf_free(buf) }
        }

        #[unsafe(no_mangle)]
        pub extern "C" fn wazbean_alloc(len: usize) -> *mut u8 {
            $crate::abi::alloc(len)
        }

        #[unsafe(no_mangle)]
        pub extern "C" fn wazbean_dealloc(ptr: *mut u8, len: usize) {
            unsafe { $crate::abi::dealloc(ptr, len) }
        }

        #[unsafe(no_mangle)]
        pub extern "C" fn wazbean_init_logging() {
            $crate::logging::init_tracing();
        }
    };
}

/// Generate the query-execution symbols for one ledger executor.
///
/// Invoke next to [`export_ledger_parser!`], which provides the free and
/// alloc symbols these results are released with.
#[macro_export]
macro_rules! export_ledger_executor {
    ($executor:expr) => {
        $crate::export_ledger_executor!($executor, $crate::bridge::BridgeOptions::default());
    };
    ($executor:expr, $options:expr) => {
        #[unsafe(no_mangle)]
        pub extern "C" fn execute_bql_to_json(
            query: *const ::std::ffi::c_char,
            ledger_text: *const ::std::ffi::c_char,
        ) -> *mut ::std::ffi::c_char {
            unsafe { $crate::abi::execute_cstr_to_json(&$executor, query, ledger_text, &$options) }
        }

        #[unsafe(no_mangle)]
        pub extern "C" fn wazbean_execute_to_json_buf(
            query: *const u8,
            query_len: usize,
            ledger_text: *const u8,
            ledger_len: usize,
            out: *mut $crate::abi::wazbean_buf,
        ) -> i32 {
            unsafe {
                $crate::abi::execute_bytes_to_json(
                    &$executor,
                    query,
                    query_len,
                    ledger_text,
                    ledger_len,
                    out,
                    &$options,
                )
            }
        }
    };
}
