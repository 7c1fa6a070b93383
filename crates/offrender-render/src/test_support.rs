//! A scripted [`GlBackend`] for exercising context and resolver logic without
//! a GL driver. Its addresses are placeholders and must never be called.

use std::cell::RefCell;
use std::ffi::{c_void, CStr};
use std::ptr::NonNull;
use std::rc::Rc;

use offrender_core::ContextAttributes;

use crate::backend::{GlBackend, ProcAddress, RawContext};
use crate::resolver::REQUIRED_ENTRY_POINTS;

#[derive(Debug, Default)]
pub struct BackendCalls {
    pub created: usize,
    pub bound: Vec<(u32, u32)>,
    pub released: usize,
    pub destroyed: usize,
    pub lookups: Vec<String>,
}

pub struct FakeBackend {
    fail_create: bool,
    fail_bind: bool,
    symbols: Vec<String>,
    calls: Rc<RefCell<BackendCalls>>,
}

impl FakeBackend {
    /// A backend that knows every required entry point.
    pub fn new() -> Self {
        Self {
            fail_create: false,
            fail_bind: false,
            symbols: REQUIRED_ENTRY_POINTS.iter().map(|s| s.to_string()).collect(),
            calls: Rc::default(),
        }
    }

    pub fn failing_create(mut self) -> Self {
        self.fail_create = true;
        self
    }

    pub fn failing_bind(mut self) -> Self {
        self.fail_bind = true;
        self
    }

    pub fn without_symbol(mut self, name: &str) -> Self {
        self.symbols.retain(|s| s != name);
        self
    }

    pub fn calls(&self) -> Rc<RefCell<BackendCalls>> {
        Rc::clone(&self.calls)
    }
}

impl GlBackend for FakeBackend {
    fn name(&self) -> &str {
        "fake"
    }

    fn create_context(&self, _attributes: &ContextAttributes) -> Option<RawContext> {
        self.calls.borrow_mut().created += 1;
        if self.fail_create {
            return None;
        }
        RawContext::from_ptr(NonNull::<c_void>::dangling().as_ptr())
    }

    unsafe fn make_current(&self, _ctx: RawContext, _buffer: *mut u8, width: u32, height: u32) -> bool {
        self.calls.borrow_mut().bound.push((width, height));
        !self.fail_bind
    }

    fn release_current(&self, _ctx: RawContext) {
        self.calls.borrow_mut().released += 1;
    }

    fn get_proc_address(&self, name: &CStr) -> Option<ProcAddress> {
        let name = name.to_string_lossy();
        self.calls.borrow_mut().lookups.push(name.to_string());
        self.symbols
            .iter()
            .any(|s| *s == name)
            .then(NonNull::dangling)
    }

    fn destroy_context(&self, _ctx: RawContext) {
        self.calls.borrow_mut().destroyed += 1;
    }
}
