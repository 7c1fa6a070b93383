use std::ffi::CString;

use offrender_core::{ContextAttributes, OffrenderError, OffrenderResult, PixelBuffer};

use crate::backend::{GlBackend, ProcAddress, RawContext};
use crate::resolver::{EntryPointResolver, FunctionTable, REQUIRED_ENTRY_POINTS};

/// An offscreen GL context bound to a CPU-side RGBA8 pixel buffer.
///
/// The context owns the buffer, the resolved entry points and the GL bindings
/// built from them. The GL side is released exactly once, by [`destroy`] or on
/// drop, whichever comes first. The pixel buffer is detached by [`destroy`]
/// but stays readable through [`pixels`] until the context is dropped.
///
/// [`pixels`]: RenderContext::pixels
///
/// [`destroy`]: RenderContext::destroy
pub struct RenderContext {
    gl: Option<glow::Context>,
    functions: Option<FunctionTable>,
    debug_callback_installed: bool,
    raw: Option<RawContext>,
    current: bool,
    pixels: PixelBuffer,
    attributes: ContextAttributes,
    backend: Box<dyn GlBackend>,
}

impl RenderContext {
    /// Create a context, allocate a zeroed `width`×`height` buffer and make the
    /// pair current on the calling thread.
    pub fn create(
        backend: Box<dyn GlBackend>,
        width: u32,
        height: u32,
        attributes: &ContextAttributes,
    ) -> OffrenderResult<Self> {
        let pixels = PixelBuffer::new(width, height)?;

        let raw = backend.create_context(attributes).ok_or_else(|| {
            OffrenderError::ContextCreation(format!(
                "{} cannot provide a {:?} {}.{} context",
                backend.name(),
                attributes.profile,
                attributes.major_version,
                attributes.minor_version
            ))
        })?;

        // From here on Drop owns the cleanup, even if binding fails.
        let mut ctx = Self {
            gl: None,
            functions: None,
            debug_callback_installed: false,
            raw: Some(raw),
            current: false,
            pixels,
            attributes: attributes.clone(),
            backend,
        };
        ctx.make_current()?;

        tracing::info!(
            "Created {} context ({}x{}, {:?} {}.{})",
            ctx.backend.name(),
            width,
            height,
            attributes.profile,
            attributes.major_version,
            attributes.minor_version
        );
        Ok(ctx)
    }

    /// Bind the pixel buffer and make this context current.
    pub fn make_current(&mut self) -> OffrenderResult<()> {
        let raw = self
            .raw
            .ok_or_else(|| OffrenderError::Bind("context has been destroyed".into()))?;
        let (width, height) = (self.pixels.width(), self.pixels.height());
        let bound = unsafe {
            self.backend
                .make_current(raw, self.pixels.as_mut_ptr(), width, height)
        };
        if !bound {
            return Err(OffrenderError::Bind(format!(
                "{} rejected the {}x{} RGBA buffer",
                self.backend.name(),
                width,
                height
            )));
        }
        self.current = true;
        Ok(())
    }

    pub fn is_current(&self) -> bool {
        self.current && self.raw.is_some()
    }

    /// Resolve one entry point by exact name.
    pub fn get_proc_address(&self, name: &str) -> OffrenderResult<ProcAddress> {
        if !self.is_current() {
            return Err(OffrenderError::NotCurrent);
        }
        let c_name =
            CString::new(name).map_err(|_| OffrenderError::UnresolvedSymbol(name.to_string()))?;
        self.backend
            .get_proc_address(&c_name)
            .ok_or_else(|| OffrenderError::UnresolvedSymbol(name.to_string()))
    }

    /// Resolve [`REQUIRED_ENTRY_POINTS`] with `resolver` and load the GL
    /// bindings from the result. Later calls keep the first table.
    pub fn load_entry_points(&mut self, resolver: &dyn EntryPointResolver) -> OffrenderResult<()> {
        if self.gl.is_some() {
            tracing::debug!("Entry points already loaded; keeping the existing table");
            return Ok(());
        }
        let table = resolver.resolve_all(self, REQUIRED_ENTRY_POINTS)?;
        let gl = unsafe { table.load_bindings() };
        tracing::info!("Resolved {} GL entry points", table.len());
        self.functions = Some(table);
        self.gl = Some(gl);
        Ok(())
    }

    /// The GL bindings. Fails until entry points are loaded on a current context.
    pub fn gl(&self) -> OffrenderResult<&glow::Context> {
        match &self.gl {
            Some(gl) if self.is_current() => Ok(gl),
            _ => Err(OffrenderError::NotCurrent),
        }
    }

    pub(crate) fn gl_mut(&mut self) -> OffrenderResult<&mut glow::Context> {
        let current = self.is_current();
        match &mut self.gl {
            Some(gl) if current => Ok(gl),
            _ => Err(OffrenderError::NotCurrent),
        }
    }

    /// Record that the debug callback is installed. Returns false if it already was.
    pub(crate) fn claim_debug_callback(&mut self) -> bool {
        !std::mem::replace(&mut self.debug_callback_installed, true)
    }

    pub fn functions(&self) -> Option<&FunctionTable> {
        self.functions.as_ref()
    }

    pub fn pixels(&self) -> &PixelBuffer {
        &self.pixels
    }

    pub fn attributes(&self) -> &ContextAttributes {
        &self.attributes
    }

    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    pub fn backend_name(&self) -> &str {
        self.backend.name()
    }

    pub fn is_destroyed(&self) -> bool {
        self.raw.is_none()
    }

    /// Unbind and release the GL context. Safe to call more than once. The
    /// pixel buffer is no longer a render target afterwards; its memory goes
    /// with the value on drop.
    pub fn destroy(&mut self) {
        // Bindings point into the context; drop them first.
        self.gl = None;
        self.functions = None;
        if let Some(raw) = self.raw.take() {
            if self.current {
                self.backend.release_current(raw);
            }
            self.backend.destroy_context(raw);
            tracing::debug!("Destroyed {} context", self.backend.name());
        }
        self.current = false;
    }
}

impl Drop for RenderContext {
    fn drop(&mut self) {
        self.destroy();
    }
}

impl std::fmt::Debug for RenderContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RenderContext")
            .field("backend", &self.backend.name())
            .field("width", &self.pixels.width())
            .field("height", &self.pixels.height())
            .field("current", &self.current)
            .field("destroyed", &self.raw.is_none())
            .field("entry_points", &self.functions.as_ref().map(FunctionTable::len))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::FakeBackend;

    #[test]
    fn test_create_binds_zeroed_buffer() {
        let backend = FakeBackend::new();
        let calls = backend.calls();
        let ctx = RenderContext::create(Box::new(backend), 16, 8, &ContextAttributes::canonical())
            .unwrap();

        assert!(ctx.is_current());
        assert_eq!(ctx.pixels().byte_size(), 4 * 16 * 8);
        assert_eq!(ctx.pixels().stride(), 4 * 16);
        assert!(ctx.pixels().as_bytes().iter().all(|&b| b == 0));
        assert_eq!(calls.borrow().bound, vec![(16, 8)]);
    }

    #[test]
    fn test_drop_releases_and_destroys_once() {
        let backend = FakeBackend::new();
        let calls = backend.calls();
        let mut ctx =
            RenderContext::create(Box::new(backend), 4, 4, &ContextAttributes::minimal()).unwrap();
        ctx.destroy();
        ctx.destroy();
        assert!(ctx.is_destroyed());
        drop(ctx);

        let calls = calls.borrow();
        assert_eq!(calls.released, 1);
        assert_eq!(calls.destroyed, 1);
    }

    #[test]
    fn test_pixels_readable_after_destroy() {
        let backend = FakeBackend::new();
        let calls = backend.calls();
        let mut ctx =
            RenderContext::create(Box::new(backend), 2, 2, &ContextAttributes::minimal()).unwrap();
        ctx.destroy();

        assert!(!ctx.is_current());
        assert_eq!(ctx.pixels().byte_size(), 16);
        assert_eq!(calls.borrow().bound.len(), 1);
    }

    #[test]
    fn test_oversized_buffer_rejected_before_backend() {
        let backend = FakeBackend::new();
        let calls = backend.calls();
        let err = RenderContext::create(
            Box::new(backend),
            u32::MAX,
            u32::MAX,
            &ContextAttributes::canonical(),
        )
        .unwrap_err();

        assert!(matches!(err, OffrenderError::InvalidArgument(_)));
        assert_eq!(calls.borrow().created, 0);
    }

    #[test]
    fn test_create_failure_is_context_creation_error() {
        let backend = FakeBackend::new().failing_create();
        let calls = backend.calls();
        let err = RenderContext::create(Box::new(backend), 4, 4, &ContextAttributes::canonical())
            .unwrap_err();

        assert!(matches!(err, OffrenderError::ContextCreation(_)));
        assert_eq!(calls.borrow().destroyed, 0);
    }

    #[test]
    fn test_bind_failure_tears_down_half_built_context() {
        let backend = FakeBackend::new().failing_bind();
        let calls = backend.calls();
        let err = RenderContext::create(Box::new(backend), 4, 4, &ContextAttributes::canonical())
            .unwrap_err();

        assert!(matches!(err, OffrenderError::Bind(_)));
        let calls = calls.borrow();
        assert_eq!(calls.created, 1);
        assert_eq!(calls.released, 0);
        assert_eq!(calls.destroyed, 1);
    }

    #[test]
    fn test_zero_size_rejected_before_backend() {
        let backend = FakeBackend::new();
        let calls = backend.calls();
        let err = RenderContext::create(Box::new(backend), 0, 4, &ContextAttributes::canonical())
            .unwrap_err();

        assert!(matches!(err, OffrenderError::InvalidArgument(_)));
        assert_eq!(calls.borrow().created, 0);
    }

    #[test]
    fn test_lookup_after_destroy_is_not_current() {
        let mut ctx = RenderContext::create(
            Box::new(FakeBackend::new()),
            4,
            4,
            &ContextAttributes::canonical(),
        )
        .unwrap();
        assert!(ctx.get_proc_address("glClear").is_ok());

        ctx.destroy();
        assert!(matches!(
            ctx.get_proc_address("glClear"),
            Err(OffrenderError::NotCurrent)
        ));
        assert!(matches!(ctx.make_current(), Err(OffrenderError::Bind(_))));
    }

    #[test]
    fn test_unknown_symbol_carries_name() {
        let ctx = RenderContext::create(
            Box::new(FakeBackend::new()),
            4,
            4,
            &ContextAttributes::canonical(),
        )
        .unwrap();
        match ctx.get_proc_address("glBogus") {
            Err(OffrenderError::UnresolvedSymbol(name)) => assert_eq!(name, "glBogus"),
            other => panic!("expected UnresolvedSymbol, got {:?}", other),
        }
    }

    #[test]
    fn test_bindings_unavailable_before_loading() {
        let ctx = RenderContext::create(
            Box::new(FakeBackend::new()),
            4,
            4,
            &ContextAttributes::canonical(),
        )
        .unwrap();
        assert!(matches!(ctx.gl(), Err(OffrenderError::NotCurrent)));
        assert!(ctx.functions().is_none());
    }
}
