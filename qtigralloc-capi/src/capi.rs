// Copyright 2024 Google LLC
// SPDX-License-Identifier: MIT

//! The C API.

use qtigralloc::{
    BufferHandle, Error, Key, Locator, Mapper, Metadata, MetadataBridge, MetadataType,
};
use log::warn;
use std::sync::Arc;
use std::{ffi, ptr, slice};

/// Success.
pub const QTIGRALLOC_ERROR_NONE: i32 = 0;
/// The mapper rejected a buffer descriptor.
pub const QTIGRALLOC_ERROR_BAD_DESCRIPTOR: i32 = 1;
/// The mapper rejected a buffer handle.
pub const QTIGRALLOC_ERROR_BAD_BUFFER: i32 = 2;
/// A NULL parameter or a malformed byte stream.
pub const QTIGRALLOC_ERROR_BAD_VALUE: i32 = 3;
/// The mapper ran out of resources, or the mapper could not be loaded.
pub const QTIGRALLOC_ERROR_NO_RESOURCES: i32 = 5;
/// An unsupported metadata type.
pub const QTIGRALLOC_ERROR_UNSUPPORTED: i32 = 7;

/// Log levels.
#[allow(non_camel_case_types)]
#[repr(C)]
pub enum qtigralloc_log_level {
    /// No logging.
    Off,
    /// Errors.
    Error,
    /// Warnings.
    Warn,
    /// Informational messages.
    Info,
    /// Debug messages.
    Debug,
}

/// A log callback.
#[allow(non_camel_case_types)]
pub type qtigralloc_log_callback = Option<
    unsafe extern "C" fn(
        lv: qtigralloc_log_level,
        msg: *const ffi::c_char,
        cb_data: *mut ffi::c_void,
    ),
>;

/// Gets a metadata byte stream.
///
/// Returns the size of the byte stream, or a negated error code.  The byte stream is copied to
/// `dest` only when `dest_size` is large enough.
#[allow(non_camel_case_types)]
pub type qtigralloc_get_metadata_fn = Option<
    unsafe extern "C" fn(
        data: *mut ffi::c_void,
        buffer: *const ffi::c_void,
        name: *const ffi::c_char,
        value: i64,
        dest: *mut ffi::c_void,
        dest_size: usize,
    ) -> i32,
>;

/// Sets a metadata byte stream.
///
/// Returns an error code.
#[allow(non_camel_case_types)]
pub type qtigralloc_set_metadata_fn = Option<
    unsafe extern "C" fn(
        data: *mut ffi::c_void,
        buffer: *const ffi::c_void,
        name: *const ffi::c_char,
        value: i64,
        src: *const ffi::c_void,
        src_size: usize,
    ) -> i32,
>;

/// A mapper service, as loaded by `qtigralloc_load_mapper`.
///
/// The functions may be called from any thread.
#[allow(non_camel_case_types)]
#[repr(C)]
pub struct qtigralloc_mapper {
    /// Gets a metadata byte stream.
    pub get_metadata: qtigralloc_get_metadata_fn,
    /// Sets a metadata byte stream.
    pub set_metadata: qtigralloc_set_metadata_fn,
    /// User data passed to the functions.
    pub data: *mut ffi::c_void,
}

extern "C" {
    fn qtigralloc_load_mapper(out_mapper: *mut qtigralloc_mapper) -> bool;
}

struct CMapper {
    get_metadata: unsafe extern "C" fn(
        *mut ffi::c_void,
        *const ffi::c_void,
        *const ffi::c_char,
        i64,
        *mut ffi::c_void,
        usize,
    ) -> i32,
    set_metadata: unsafe extern "C" fn(
        *mut ffi::c_void,
        *const ffi::c_void,
        *const ffi::c_char,
        i64,
        *const ffi::c_void,
        usize,
    ) -> i32,
    data: *mut ffi::c_void,
}

// SAFETY: qtigralloc_mapper requires the functions to be thread-safe
unsafe impl Send for CMapper {}
// SAFETY: qtigralloc_mapper requires the functions to be thread-safe
unsafe impl Sync for CMapper {}

impl CMapper {
    fn load() -> Option<Arc<dyn Mapper>> {
        let mut mapper = qtigralloc_mapper {
            get_metadata: None,
            set_metadata: None,
            data: ptr::null_mut(),
        };

        // SAFETY: mapper is a valid qtigralloc_mapper
        if !unsafe { qtigralloc_load_mapper(&mut mapper) } {
            return None;
        }

        let mapper = CMapper {
            get_metadata: mapper.get_metadata?,
            set_metadata: mapper.set_metadata?,
            data: mapper.data,
        };

        Some(Arc::new(mapper))
    }

    fn error(code: i32) -> Error {
        Error::from_code(code).unwrap_or(Error::Code(code))
    }

    fn get_into(
        &self,
        buffer: BufferHandle,
        name: &ffi::CStr,
        value: i64,
        bytes: &mut [u8],
    ) -> qtigralloc::Result<usize> {
        let ret =
            // SAFETY: bytes is valid for bytes.len() bytes and we trust the client
            unsafe {
                (self.get_metadata)(
                    self.data,
                    buffer.as_ptr(),
                    name.as_ptr(),
                    value,
                    bytes.as_mut_ptr() as *mut ffi::c_void,
                    bytes.len(),
                )
            };

        usize::try_from(ret).map_err(|_| Self::error(ret.checked_neg().unwrap_or(ret)))
    }
}

impl Mapper for CMapper {
    fn get(&self, buffer: BufferHandle, ty: &MetadataType) -> qtigralloc::Result<Vec<u8>> {
        let name = ffi::CString::new(ty.name).map_err(|_| Error::BadValue)?;

        // the first call returns the size and the second call fetches the byte stream
        let mut bytes = Vec::new();
        let mut size = self.get_into(buffer, &name, ty.value, &mut bytes)?;
        if size > bytes.len() {
            bytes.resize(size, 0);
            size = self.get_into(buffer, &name, ty.value, &mut bytes)?;
            if size > bytes.len() {
                warn!("{} grew to {} bytes while being fetched", ty, size);
                return Err(Error::BadValue);
            }
        }

        bytes.truncate(size);
        Ok(bytes)
    }

    fn set(
        &self,
        buffer: BufferHandle,
        ty: &MetadataType,
        bytes: &[u8],
    ) -> qtigralloc::Result<()> {
        let name = ffi::CString::new(ty.name).map_err(|_| Error::BadValue)?;

        let ret =
            // SAFETY: bytes is valid for bytes.len() bytes and we trust the client
            unsafe {
                (self.set_metadata)(
                    self.data,
                    buffer.as_ptr(),
                    name.as_ptr(),
                    ty.value,
                    bytes.as_ptr() as *const ffi::c_void,
                    bytes.len(),
                )
            };

        match ret {
            QTIGRALLOC_ERROR_NONE => Ok(()),
            code => Err(Self::error(code)),
        }
    }
}

static BRIDGE: MetadataBridge = MetadataBridge::new(Locator::new(CMapper::load));

struct CLogger {
    logger: unsafe extern "C" fn(qtigralloc_log_level, *const ffi::c_char, *mut ffi::c_void),
    data: *mut ffi::c_void,
}

impl CLogger {
    fn log(&self, rec: &log::Record) {
        let lv = match rec.level() {
            log::Level::Error => qtigralloc_log_level::Error,
            log::Level::Warn => qtigralloc_log_level::Warn,
            log::Level::Info => qtigralloc_log_level::Info,
            log::Level::Debug => qtigralloc_log_level::Debug,
            log::Level::Trace => qtigralloc_log_level::Debug,
        };

        let msg = format!("{}", rec.args());

        if let Ok(c_msg) = ffi::CString::new(msg) {
            // SAFETY: logger is a valid function pointer
            unsafe {
                (self.logger)(lv, c_msg.as_ptr(), self.data);
            }
        }
    }
}

// SAFETY: qtigralloc_log_init requires the callback to be callable with its data from any thread
unsafe impl Send for CLogger {}

/// Forwards log records up to `max_lv` to `log_cb`.
///
/// # Safety
///
/// `log_cb` must be callable with `cb_data` from any thread.
#[no_mangle]
pub unsafe extern "C" fn qtigralloc_log_init(
    max_lv: qtigralloc_log_level,
    log_cb: qtigralloc_log_callback,
    cb_data: *mut ffi::c_void,
) {
    let filter = match max_lv {
        qtigralloc_log_level::Off => log::LevelFilter::Off,
        qtigralloc_log_level::Error => log::LevelFilter::Error,
        qtigralloc_log_level::Warn => log::LevelFilter::Warn,
        qtigralloc_log_level::Info => log::LevelFilter::Info,
        qtigralloc_log_level::Debug => log::LevelFilter::Debug,
    };

    let log_cb = match log_cb {
        Some(log_cb) if filter != log::LevelFilter::Off => log_cb,
        _ => {
            super::log::init(log::LevelFilter::Off, Box::new(|_: &log::Record| {}));
            return;
        }
    };

    let c_logger = CLogger {
        logger: log_cb,
        data: cb_data,
    };
    let cb = move |rec: &log::Record| {
        c_logger.log(rec);
    };

    super::log::init(filter, Box::new(cb));
}

/// Gets the metadata of `buffer` for the vendor key `key` into `param`.
///
/// # Safety
///
/// `param` must be NULL or point to writable memory for a value of the key.
#[no_mangle]
pub unsafe extern "C" fn qtigralloc_get(
    buffer: *mut ffi::c_void,
    key: u32,
    param: *mut ffi::c_void,
) -> i32 {
    let md = match BRIDGE.get(BufferHandle(buffer), key) {
        Ok(md) => md,
        Err(err) => return err.code(),
    };

    if param.is_null() {
        return QTIGRALLOC_ERROR_BAD_VALUE;
    }

    let bytes = md.as_native_bytes();
    // SAFETY: param is writable for bytes.len() bytes by contract
    unsafe { ptr::copy_nonoverlapping(bytes.as_ptr(), param as *mut u8, bytes.len()) };

    QTIGRALLOC_ERROR_NONE
}

/// Sets the metadata of `buffer` for the vendor key `key` from `param`.
///
/// # Safety
///
/// `param` must be NULL or point to a value of the key.
#[no_mangle]
pub unsafe extern "C" fn qtigralloc_set(
    buffer: *mut ffi::c_void,
    key: u32,
    param: *mut ffi::c_void,
) -> i32 {
    let k = match Key::classify(key) {
        Some(k) if k.is_writable() => k,
        _ => return QTIGRALLOC_ERROR_UNSUPPORTED,
    };

    if param.is_null() {
        return QTIGRALLOC_ERROR_BAD_VALUE;
    }

    // SAFETY: param is readable for k.native_size() bytes by contract
    let bytes = unsafe { slice::from_raw_parts(param as *const u8, k.native_size()) };
    let md = match Metadata::from_native(k, bytes) {
        Ok(md) => md,
        Err(err) => return err.code(),
    };

    match BRIDGE.set(BufferHandle(buffer), key, &md) {
        Ok(()) => QTIGRALLOC_ERROR_NONE,
        Err(err) => err.code(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use qtigralloc::{
        ColorMetaData, ColorRange, UbwcStatsArray, UbwcVersion, QTI_COLOR_METADATA, QTI_FD,
        QTI_PRIVATE_FLAGS, QTI_REFRESH_RATE, QTI_UBWC_CR_STATS_INFO, QTI_VT_TIMESTAMP,
    };
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Mutex, OnceLock};

    const FAILING_BUFFER: usize = 0xbad0;
    const FAILING_CODE: i32 = 42;
    const GROWING_BUFFER: usize = 0xb160;

    #[derive(Default)]
    struct Store {
        streams: HashMap<(usize, i64), Vec<u8>>,
        gets: HashMap<usize, usize>,
        sets: HashMap<usize, usize>,
    }

    fn store() -> &'static Mutex<Store> {
        static STORE: OnceLock<Mutex<Store>> = OnceLock::new();
        STORE.get_or_init(Default::default)
    }

    fn gets(buffer: usize) -> usize {
        let store = store().lock().unwrap();
        store.gets.get(&buffer).copied().unwrap_or(0)
    }

    fn sets(buffer: usize) -> usize {
        let store = store().lock().unwrap();
        store.sets.get(&buffer).copied().unwrap_or(0)
    }

    fn insert(buffer: usize, key: Key, bytes: Vec<u8>) {
        let value = key.metadata_type().value;
        store().lock().unwrap().streams.insert((buffer, value), bytes);
    }

    unsafe extern "C" fn get_metadata(
        _data: *mut ffi::c_void,
        buffer: *const ffi::c_void,
        name: *const ffi::c_char,
        value: i64,
        dest: *mut ffi::c_void,
        dest_size: usize,
    ) -> i32 {
        // SAFETY: name is a valid C string
        let name = unsafe { ffi::CStr::from_ptr(name) };
        assert_eq!(name.to_bytes(), b"QTI");

        let buffer = buffer as usize;
        let mut store = store().lock().unwrap();
        *store.gets.entry(buffer).or_default() += 1;
        match buffer {
            FAILING_BUFFER => return -FAILING_CODE,
            GROWING_BUFFER => return dest_size as i32 + 1,
            _ => (),
        }

        let bytes = match store.streams.get(&(buffer, value)) {
            Some(bytes) => bytes,
            None => return -QTIGRALLOC_ERROR_BAD_VALUE,
        };
        if bytes.len() <= dest_size {
            // SAFETY: dest is valid for dest_size bytes
            unsafe { ptr::copy_nonoverlapping(bytes.as_ptr(), dest as *mut u8, bytes.len()) };
        }

        bytes.len() as i32
    }

    unsafe extern "C" fn set_metadata(
        _data: *mut ffi::c_void,
        buffer: *const ffi::c_void,
        _name: *const ffi::c_char,
        value: i64,
        src: *const ffi::c_void,
        src_size: usize,
    ) -> i32 {
        let buffer = buffer as usize;
        let mut store = store().lock().unwrap();
        *store.sets.entry(buffer).or_default() += 1;
        if buffer == FAILING_BUFFER {
            return FAILING_CODE;
        }

        // SAFETY: src is valid for src_size bytes
        let bytes = unsafe { slice::from_raw_parts(src as *const u8, src_size) };
        store.streams.insert((buffer, value), bytes.to_vec());

        QTIGRALLOC_ERROR_NONE
    }

    #[no_mangle]
    unsafe extern "C" fn qtigralloc_load_mapper(out_mapper: *mut qtigralloc_mapper) -> bool {
        let mapper = qtigralloc_mapper {
            get_metadata: Some(get_metadata),
            set_metadata: Some(set_metadata),
            data: ptr::null_mut(),
        };

        // SAFETY: out_mapper is valid
        unsafe { out_mapper.write(mapper) };

        true
    }

    fn buffer(id: usize) -> *mut ffi::c_void {
        id as *mut ffi::c_void
    }

    fn param<T>(val: &mut T) -> *mut ffi::c_void {
        val as *mut T as *mut ffi::c_void
    }

    #[test]
    fn unknown_key() {
        let mut val = 0u64;

        // SAFETY: val is a valid u64
        let ret = unsafe { qtigralloc_get(buffer(0x100), 0xdeadbeef, param(&mut val)) };
        assert_eq!(ret, QTIGRALLOC_ERROR_UNSUPPORTED);
        // SAFETY: val is a valid u64
        let ret = unsafe { qtigralloc_set(buffer(0x100), 0xdeadbeef, param(&mut val)) };
        assert_eq!(ret, QTIGRALLOC_ERROR_UNSUPPORTED);

        assert_eq!(gets(0x100), 0);
        assert_eq!(sets(0x100), 0);
    }

    #[test]
    fn timestamp() {
        let mut ts = 0x1122_3344_5566_7788u64;
        let mut out = 0u64;

        // SAFETY: ts is a valid u64
        let ret = unsafe { qtigralloc_set(buffer(0x200), QTI_VT_TIMESTAMP, param(&mut ts)) };
        assert_eq!(ret, QTIGRALLOC_ERROR_NONE);
        // SAFETY: out is a valid u64
        let ret = unsafe { qtigralloc_get(buffer(0x200), QTI_VT_TIMESTAMP, param(&mut out)) };
        assert_eq!(ret, QTIGRALLOC_ERROR_NONE);

        assert_eq!(out, ts);
        assert_eq!(sets(0x200), 1);
        // one call for the size and one for the byte stream
        assert_eq!(gets(0x200), 2);
    }

    #[test]
    fn refresh_rate() {
        let mut rate = f32::from_bits(0x7fc0_0abc);
        let mut out = 0.0f32;

        // SAFETY: rate is a valid f32
        let ret = unsafe { qtigralloc_set(buffer(0x300), QTI_REFRESH_RATE, param(&mut rate)) };
        assert_eq!(ret, QTIGRALLOC_ERROR_NONE);
        // SAFETY: out is a valid f32
        let ret = unsafe { qtigralloc_get(buffer(0x300), QTI_REFRESH_RATE, param(&mut out)) };
        assert_eq!(ret, QTIGRALLOC_ERROR_NONE);

        assert_eq!(out.to_bits(), rate.to_bits());
    }

    #[test]
    fn records() {
        let mut color = ColorMetaData::default();
        color.range = ColorRange::FULL;
        color.dynamic_meta_data_payload[1023] = 0x5a;
        let mut out = ColorMetaData::default();

        // SAFETY: color is a valid ColorMetaData
        let ret = unsafe { qtigralloc_set(buffer(0x400), QTI_COLOR_METADATA, param(&mut color)) };
        assert_eq!(ret, QTIGRALLOC_ERROR_NONE);
        // SAFETY: out is a valid ColorMetaData
        let ret = unsafe { qtigralloc_get(buffer(0x400), QTI_COLOR_METADATA, param(&mut out)) };
        assert_eq!(ret, QTIGRALLOC_ERROR_NONE);
        assert_eq!(out, color);

        let mut ubwc = UbwcStatsArray::default();
        ubwc[1].version = UbwcVersion::V4_0;
        ubwc[1].stats[31] = 99;
        let mut out = UbwcStatsArray::default();

        let key = QTI_UBWC_CR_STATS_INFO;
        // SAFETY: ubwc is a valid UbwcStatsArray
        let ret = unsafe { qtigralloc_set(buffer(0x400), key, param(&mut ubwc)) };
        assert_eq!(ret, QTIGRALLOC_ERROR_NONE);
        // SAFETY: out is a valid UbwcStatsArray
        let ret = unsafe { qtigralloc_get(buffer(0x400), key, param(&mut out)) };
        assert_eq!(ret, QTIGRALLOC_ERROR_NONE);
        assert_eq!(out, ubwc);
    }

    #[test]
    fn null_param() {
        // SAFETY: NULL is allowed
        let ret = unsafe { qtigralloc_set(buffer(0x500), QTI_FD, ptr::null_mut()) };
        assert_eq!(ret, QTIGRALLOC_ERROR_BAD_VALUE);
        assert_eq!(sets(0x500), 0);

        let mut fd = 3i32;
        // SAFETY: fd is a valid i32
        let ret = unsafe { qtigralloc_set(buffer(0x500), QTI_FD, param(&mut fd)) };
        assert_eq!(ret, QTIGRALLOC_ERROR_NONE);

        // SAFETY: NULL is allowed
        let ret = unsafe { qtigralloc_get(buffer(0x500), QTI_FD, ptr::null_mut()) };
        assert_eq!(ret, QTIGRALLOC_ERROR_BAD_VALUE);
        assert_eq!(sets(0x500), 1);
        assert_eq!(gets(0x500), 2);
    }

    #[test]
    fn private_flags() {
        let mut flags = 0x10i32;

        // SAFETY: NULL is allowed
        let ret = unsafe { qtigralloc_set(buffer(0x600), QTI_PRIVATE_FLAGS, ptr::null_mut()) };
        assert_eq!(ret, QTIGRALLOC_ERROR_UNSUPPORTED);
        // SAFETY: flags is a valid i32
        let ret = unsafe { qtigralloc_set(buffer(0x600), QTI_PRIVATE_FLAGS, param(&mut flags)) };
        assert_eq!(ret, QTIGRALLOC_ERROR_UNSUPPORTED);
        assert_eq!(sets(0x600), 0);

        let ty = Key::PrivateFlags.metadata_type();
        let mut bytes = Vec::new();
        qtigralloc::encode_scalar(&ty, &0x20i32, &mut bytes);
        insert(0x600, Key::PrivateFlags, bytes);

        // SAFETY: flags is a valid i32
        let ret = unsafe { qtigralloc_get(buffer(0x600), QTI_PRIVATE_FLAGS, param(&mut flags)) };
        assert_eq!(ret, QTIGRALLOC_ERROR_NONE);
        assert_eq!(flags, 0x20);
    }

    #[test]
    fn mapper_errors() {
        let mut fd = 3i32;

        // SAFETY: fd is a valid i32
        let ret = unsafe { qtigralloc_get(buffer(FAILING_BUFFER), QTI_FD, param(&mut fd)) };
        assert_eq!(ret, FAILING_CODE);
        // SAFETY: fd is a valid i32
        let ret = unsafe { qtigralloc_set(buffer(FAILING_BUFFER), QTI_FD, param(&mut fd)) };
        assert_eq!(ret, FAILING_CODE);

        // SAFETY: fd is a valid i32
        let ret = unsafe { qtigralloc_get(buffer(0x700), QTI_FD, param(&mut fd)) };
        assert_eq!(ret, QTIGRALLOC_ERROR_BAD_VALUE);
        assert_eq!(fd, 3);
    }

    fn test_mapper() -> CMapper {
        CMapper {
            get_metadata,
            set_metadata,
            data: ptr::null_mut(),
        }
    }

    #[test]
    fn resize_and_retry() {
        let mapper = test_mapper();
        let ty = Key::VtTimestamp.metadata_type();

        let mut bytes = Vec::new();
        qtigralloc::encode_scalar(&ty, &7u64, &mut bytes);
        insert(0x900, Key::VtTimestamp, bytes.clone());

        let out = mapper.get(BufferHandle(buffer(0x900)), &ty).unwrap();
        assert_eq!(out, bytes);
        assert_eq!(gets(0x900), 2);

        insert(0x901, Key::VtTimestamp, Vec::new());
        let out = mapper.get(BufferHandle(buffer(0x901)), &ty).unwrap();
        assert!(out.is_empty());
        assert_eq!(gets(0x901), 1);
    }

    #[test]
    fn growing_stream() {
        let mapper = test_mapper();
        let ty = Key::VtTimestamp.metadata_type();

        let res = mapper.get(BufferHandle(buffer(GROWING_BUFFER)), &ty);
        assert_eq!(res, Err(Error::BadValue));
        assert_eq!(gets(GROWING_BUFFER), 2);

        let buf = buffer(GROWING_BUFFER);
        let mut ts = 0u64;
        // SAFETY: ts is a valid u64
        let ret = unsafe { qtigralloc_get(buf, QTI_VT_TIMESTAMP, param(&mut ts)) };
        assert_eq!(ret, QTIGRALLOC_ERROR_BAD_VALUE);
        assert_eq!(gets(GROWING_BUFFER), 4);
        assert_eq!(ts, 0);
    }

    static LOGGED: AtomicUsize = AtomicUsize::new(0);

    unsafe extern "C" fn log_cb(
        _lv: qtigralloc_log_level,
        _msg: *const ffi::c_char,
        cb_data: *mut ffi::c_void,
    ) {
        // SAFETY: cb_data is LOGGED
        let logged = unsafe { &*(cb_data as *const AtomicUsize) };
        logged.fetch_add(1, Ordering::SeqCst);
    }

    #[test]
    fn log_init() {
        let data = &LOGGED as *const AtomicUsize as *mut ffi::c_void;
        // SAFETY: log_cb is valid and LOGGED is static
        unsafe { qtigralloc_log_init(qtigralloc_log_level::Debug, Some(log_cb), data) };

        let mut val = 0u32;
        // SAFETY: val is a valid u32
        let ret = unsafe { qtigralloc_get(buffer(0x800), 1, param(&mut val)) };
        assert_eq!(ret, QTIGRALLOC_ERROR_UNSUPPORTED);

        assert!(LOGGED.load(Ordering::SeqCst) > 0);
    }
}
