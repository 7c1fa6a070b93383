//! GL entry-point resolution.
//!
//! Two strategies fill the same [`FunctionTable`]: [`BulkLoader`] hands a
//! lookup callback to a loader that asks for whatever it knows about, and
//! [`ExplicitList`] walks a fixed list of names. Both require a current
//! context and both fail on the first required name that cannot be found.

use std::collections::BTreeMap;
use std::ffi::c_void;
use std::ptr;

use offrender_core::{OffrenderError, OffrenderResult};

use crate::backend::ProcAddress;
use crate::context::RenderContext;

/// Every GL function the pipeline calls, including the ones the bindings
/// query while loading (`glGetString`, `glGetIntegerv`, `glGetStringi`).
pub const REQUIRED_ENTRY_POINTS: &[&str] = &[
    "glGetString",
    "glGetStringi",
    "glGetIntegerv",
    "glEnable",
    "glDisable",
    "glDebugMessageCallback",
    "glViewport",
    "glDepthFunc",
    "glClearColor",
    "glClear",
    "glCreateShader",
    "glShaderSource",
    "glCompileShader",
    "glGetShaderiv",
    "glGetShaderInfoLog",
    "glDeleteShader",
    "glCreateProgram",
    "glAttachShader",
    "glLinkProgram",
    "glGetProgramiv",
    "glGetProgramInfoLog",
    "glDeleteProgram",
    "glGetAttribLocation",
    "glGenBuffers",
    "glBindBuffer",
    "glBufferData",
    "glBufferSubData",
    "glGenVertexArrays",
    "glBindVertexArray",
    "glEnableVertexAttribArray",
    "glVertexAttribPointer",
    "glUseProgram",
    "glDrawArrays",
    "glFinish",
];

/// Resolved entry points by name. Every stored address is non-null.
#[derive(Debug, Clone, Default)]
pub struct FunctionTable {
    entries: BTreeMap<String, ProcAddress>,
}

impl FunctionTable {
    pub fn get(&self, name: &str) -> Option<ProcAddress> {
        self.entries.get(name).copied()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    fn insert(&mut self, name: &str, address: ProcAddress) {
        self.entries.insert(name.to_string(), address);
    }

    /// Fail with the first of `names` missing from the table.
    pub fn require(&self, names: &[&str]) -> OffrenderResult<()> {
        match names.iter().find(|name| !self.contains(name)) {
            Some(missing) => Err(OffrenderError::UnresolvedSymbol(missing.to_string())),
            None => Ok(()),
        }
    }

    /// Build GL bindings that see only the functions in this table.
    ///
    /// # Safety
    /// The addresses must belong to the context that is current on this
    /// thread, and the bindings must not outlive that context.
    pub unsafe fn load_bindings(&self) -> glow::Context {
        glow::Context::from_loader_function(|name| {
            self.get(name)
                .map_or(ptr::null(), |address| address.as_ptr() as *const c_void)
        })
    }
}

/// Resolves a list of entry points against a current context.
pub trait EntryPointResolver {
    fn resolve_all(&self, ctx: &RenderContext, names: &[&str]) -> OffrenderResult<FunctionTable>;
}

/// Name-by-name resolution of exactly the requested entry points.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExplicitList;

impl EntryPointResolver for ExplicitList {
    fn resolve_all(&self, ctx: &RenderContext, names: &[&str]) -> OffrenderResult<FunctionTable> {
        if !ctx.is_current() {
            return Err(OffrenderError::NotCurrent);
        }
        let mut table = FunctionTable::default();
        for name in names {
            let address = ctx.get_proc_address(name)?;
            tracing::debug!("Loaded function: {}: {:p}", name, address);
            table.insert(name, address);
        }
        Ok(table)
    }
}

/// The lookup a bulk loader calls for each name it wants. Returns null for
/// names the context does not provide.
pub type Lookup<'a> = dyn FnMut(&str) -> *const c_void + 'a;

type LoadAll = dyn for<'a, 'b> Fn(&'a mut Lookup<'b>);

/// Resolution driven by a loader that requests entry points on its own.
pub struct BulkLoader {
    load_all: Box<LoadAll>,
}

impl BulkLoader {
    pub fn new(load_all: impl Fn(&mut Lookup<'_>) + 'static) -> Self {
        Self {
            load_all: Box::new(load_all),
        }
    }

    /// Loader that asks for every function the GL bindings know about.
    pub fn glow() -> Self {
        Self::new(|lookup| {
            // Loading queries the driver through the addresses it was just given.
            let _probe = unsafe { glow::Context::from_loader_function(|name| lookup(name)) };
        })
    }
}

impl std::fmt::Debug for BulkLoader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BulkLoader").finish_non_exhaustive()
    }
}

impl EntryPointResolver for BulkLoader {
    fn resolve_all(&self, ctx: &RenderContext, names: &[&str]) -> OffrenderResult<FunctionTable> {
        if !ctx.is_current() {
            return Err(OffrenderError::NotCurrent);
        }
        let mut table = FunctionTable::default();
        let mut requested = 0usize;
        {
            let mut lookup = |name: &str| -> *const c_void {
                requested += 1;
                match ctx.get_proc_address(name) {
                    Ok(address) => {
                        table.insert(name, address);
                        address.as_ptr() as *const c_void
                    }
                    Err(_) => ptr::null(),
                }
            };
            (self.load_all)(&mut lookup);
        }
        tracing::debug!(
            "Loader requested {} entry points, {} resolved",
            requested,
            table.len()
        );
        table.require(names)?;
        Ok(table)
    }
}
