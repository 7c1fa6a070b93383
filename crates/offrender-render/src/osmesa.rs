//! Mesa's off-screen rendering interface, loaded from the system library at
//! run time.

use std::ffi::{c_char, c_int, c_uchar, c_uint, c_void, CStr};
use std::ptr::{self, NonNull};

use libloading::Library;
use offrender_core::{ContextAttributes, OffrenderError, OffrenderResult, Profile};

use crate::backend::{GlBackend, ProcAddress, RawContext};

// osmesa.h
const OSMESA_RGBA: c_int = 0x1908;
const OSMESA_FORMAT: c_int = 0x22;
const OSMESA_DEPTH_BITS: c_int = 0x30;
const OSMESA_STENCIL_BITS: c_int = 0x31;
const OSMESA_ACCUM_BITS: c_int = 0x32;
const OSMESA_PROFILE: c_int = 0x33;
const OSMESA_CORE_PROFILE: c_int = 0x34;
const OSMESA_COMPAT_PROFILE: c_int = 0x35;
const OSMESA_CONTEXT_MAJOR_VERSION: c_int = 0x36;
const OSMESA_CONTEXT_MINOR_VERSION: c_int = 0x37;

const GL_UNSIGNED_BYTE: c_uint = 0x1401;

type CreateContextAttribsFn =
    unsafe extern "C" fn(attrib_list: *const c_int, sharelist: *mut c_void) -> *mut c_void;
type MakeCurrentFn = unsafe extern "C" fn(
    ctx: *mut c_void,
    buffer: *mut c_void,
    kind: c_uint,
    width: c_int,
    height: c_int,
) -> c_uchar;
type GetProcAddressFn = unsafe extern "C" fn(name: *const c_char) -> Option<unsafe extern "C" fn()>;
type DestroyContextFn = unsafe extern "C" fn(ctx: *mut c_void);

#[cfg(target_os = "macos")]
const LIBRARY_NAMES: &[&str] = &["libOSMesa.8.dylib", "libOSMesa.dylib"];
#[cfg(windows)]
const LIBRARY_NAMES: &[&str] = &["osmesa.dll"];
#[cfg(not(any(target_os = "macos", windows)))]
const LIBRARY_NAMES: &[&str] = &["libOSMesa.so.8", "libOSMesa.so.6", "libOSMesa.so"];

/// The OSMesa software rasterizer.
pub struct OsMesa {
    create_context_attribs: CreateContextAttribsFn,
    make_current: MakeCurrentFn,
    get_proc_address: GetProcAddressFn,
    destroy_context: DestroyContextFn,
    library_name: String,
    // Keeps the function pointers above valid.
    _library: Library,
}

impl OsMesa {
    /// Load the first OSMesa library found under its usual names.
    pub fn load() -> OffrenderResult<Self> {
        let mut failures = Vec::new();
        for name in LIBRARY_NAMES {
            match Self::load_from(name) {
                Ok(osmesa) => return Ok(osmesa),
                Err(e) => failures.push(e.to_string()),
            }
        }
        Err(OffrenderError::ContextCreation(format!(
            "OSMesa is not available: {}",
            failures.join("; ")
        )))
    }

    /// Load OSMesa from an explicit library name or path.
    pub fn load_from(name: &str) -> OffrenderResult<Self> {
        let library = unsafe { Library::new(name) }
            .map_err(|e| OffrenderError::ContextCreation(format!("cannot load {}: {}", name, e)))?;

        let osmesa = unsafe {
            Self {
                create_context_attribs: symbol(&library, b"OSMesaCreateContextAttribs\0")?,
                make_current: symbol(&library, b"OSMesaMakeCurrent\0")?,
                get_proc_address: symbol(&library, b"OSMesaGetProcAddress\0")?,
                destroy_context: symbol(&library, b"OSMesaDestroyContext\0")?,
                library_name: name.to_string(),
                _library: library,
            }
        };
        tracing::debug!("Loaded OSMesa from {}", osmesa.library_name);
        Ok(osmesa)
    }
}

unsafe fn symbol<T: Copy>(library: &Library, name: &[u8]) -> OffrenderResult<T> {
    library.get::<T>(name).map(|s| *s).map_err(|e| {
        OffrenderError::ContextCreation(format!(
            "OSMesa library lacks {}: {}",
            String::from_utf8_lossy(&name[..name.len() - 1]),
            e
        ))
    })
}

/// Zero-terminated `OSMesaCreateContextAttribs` list for `attributes`.
fn attribute_list(attributes: &ContextAttributes) -> Vec<c_int> {
    let profile = match attributes.profile {
        Profile::Core => OSMESA_CORE_PROFILE,
        Profile::Compat => OSMESA_COMPAT_PROFILE,
    };
    let mut list = vec![
        OSMESA_FORMAT,
        OSMESA_RGBA,
        OSMESA_PROFILE,
        profile,
    ];
    let planes = [
        (OSMESA_DEPTH_BITS, attributes.depth_bits),
        (OSMESA_STENCIL_BITS, attributes.stencil_bits),
        (OSMESA_ACCUM_BITS, attributes.accum_bits),
    ];
    for (key, bits) in planes {
        if let Some(bits) = bits {
            list.extend([key, c_int::from(bits)]);
        }
    }
    list.extend([
        OSMESA_CONTEXT_MAJOR_VERSION,
        c_int::from(attributes.major_version),
        OSMESA_CONTEXT_MINOR_VERSION,
        c_int::from(attributes.minor_version),
        0,
    ]);
    list
}

impl GlBackend for OsMesa {
    fn name(&self) -> &str {
        "OSMesa"
    }

    fn create_context(&self, attributes: &ContextAttributes) -> Option<RawContext> {
        let list = attribute_list(attributes);
        let ctx = unsafe { (self.create_context_attribs)(list.as_ptr(), ptr::null_mut()) };
        RawContext::from_ptr(ctx)
    }

    unsafe fn make_current(&self, ctx: RawContext, buffer: *mut u8, width: u32, height: u32) -> bool {
        let (Ok(width), Ok(height)) = (c_int::try_from(width), c_int::try_from(height)) else {
            return false;
        };
        (self.make_current)(ctx.as_ptr(), buffer.cast(), GL_UNSIGNED_BYTE, width, height) != 0
    }

    fn release_current(&self, _ctx: RawContext) {
        // A null context with a null buffer unbinds whatever is current.
        unsafe {
            (self.make_current)(ptr::null_mut(), ptr::null_mut(), 0, 0, 0);
        }
    }

    fn get_proc_address(&self, name: &CStr) -> Option<ProcAddress> {
        let function = unsafe { (self.get_proc_address)(name.as_ptr()) }?;
        NonNull::new(function as *mut c_void)
    }

    fn destroy_context(&self, ctx: RawContext) {
        unsafe { (self.destroy_context)(ctx.as_ptr()) }
    }
}
