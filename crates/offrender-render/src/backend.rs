//! The seam between the pipeline and the graphics driver.

use std::ffi::{c_void, CStr};
use std::ptr::NonNull;

use offrender_core::ContextAttributes;

/// Non-null address of a resolved GL entry point.
pub type ProcAddress = NonNull<c_void>;

/// Opaque handle to a context owned by a [`GlBackend`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawContext(NonNull<c_void>);

impl RawContext {
    /// Wrap a backend handle. Returns None for a null handle.
    pub fn from_ptr(ptr: *mut c_void) -> Option<Self> {
        NonNull::new(ptr).map(Self)
    }

    pub fn as_ptr(self) -> *mut c_void {
        self.0.as_ptr()
    }
}

/// An offscreen GL implementation that renders into caller-owned memory.
pub trait GlBackend {
    /// Human-readable backend name for diagnostics.
    fn name(&self) -> &str;

    /// Create a context with the requested attributes, or None if the
    /// implementation cannot satisfy them.
    fn create_context(&self, attributes: &ContextAttributes) -> Option<RawContext>;

    /// Bind `buffer` as the RGBA8 color target of `ctx` and make `ctx` current
    /// on the calling thread.
    ///
    /// # Safety
    /// `buffer` must point to `4 * width * height` writable bytes that remain
    /// valid and unmoved until the context is released or destroyed.
    unsafe fn make_current(&self, ctx: RawContext, buffer: *mut u8, width: u32, height: u32) -> bool;

    /// Detach `ctx` from the calling thread.
    fn release_current(&self, ctx: RawContext);

    /// Look up an entry point of the current context by exact name.
    fn get_proc_address(&self, name: &CStr) -> Option<ProcAddress>;

    fn destroy_context(&self, ctx: RawContext);
}
