//! Driver debug messages. They are logged and never change control flow.

// KHR_debug enums
const DEBUG_SEVERITY_HIGH: u32 = 0x9146;
const DEBUG_SEVERITY_MEDIUM: u32 = 0x9147;
const DEBUG_SEVERITY_LOW: u32 = 0x9148;
const DEBUG_SEVERITY_NOTIFICATION: u32 = 0x826B;

const DEBUG_SOURCE_API: u32 = 0x8246;
const DEBUG_SOURCE_WINDOW_SYSTEM: u32 = 0x8247;
const DEBUG_SOURCE_SHADER_COMPILER: u32 = 0x8248;
const DEBUG_SOURCE_THIRD_PARTY: u32 = 0x8249;
const DEBUG_SOURCE_APPLICATION: u32 = 0x824A;
const DEBUG_SOURCE_OTHER: u32 = 0x824B;

const DEBUG_TYPE_ERROR: u32 = 0x824C;
const DEBUG_TYPE_DEPRECATED_BEHAVIOR: u32 = 0x824D;
const DEBUG_TYPE_UNDEFINED_BEHAVIOR: u32 = 0x824E;
const DEBUG_TYPE_PORTABILITY: u32 = 0x824F;
const DEBUG_TYPE_PERFORMANCE: u32 = 0x8250;
const DEBUG_TYPE_OTHER: u32 = 0x8251;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    High,
    Medium,
    Low,
    Notification,
    Unknown(u32),
}

impl Severity {
    pub fn from_gl(value: u32) -> Self {
        match value {
            DEBUG_SEVERITY_HIGH => Severity::High,
            DEBUG_SEVERITY_MEDIUM => Severity::Medium,
            DEBUG_SEVERITY_LOW => Severity::Low,
            DEBUG_SEVERITY_NOTIFICATION => Severity::Notification,
            other => Severity::Unknown(other),
        }
    }
}

pub fn source_name(source: u32) -> &'static str {
    match source {
        DEBUG_SOURCE_API => "api",
        DEBUG_SOURCE_WINDOW_SYSTEM => "window-system",
        DEBUG_SOURCE_SHADER_COMPILER => "shader-compiler",
        DEBUG_SOURCE_THIRD_PARTY => "third-party",
        DEBUG_SOURCE_APPLICATION => "application",
        DEBUG_SOURCE_OTHER => "other",
        _ => "unknown",
    }
}

pub fn type_name(kind: u32) -> &'static str {
    match kind {
        DEBUG_TYPE_ERROR => "error",
        DEBUG_TYPE_DEPRECATED_BEHAVIOR => "deprecated",
        DEBUG_TYPE_UNDEFINED_BEHAVIOR => "undefined-behavior",
        DEBUG_TYPE_PORTABILITY => "portability",
        DEBUG_TYPE_PERFORMANCE => "performance",
        DEBUG_TYPE_OTHER => "other",
        _ => "unknown",
    }
}

/// Debug-message callback installed on the GL context.
pub fn report(source: u32, kind: u32, id: u32, severity: u32, message: &str) {
    let source = source_name(source);
    let kind = type_name(kind);
    match Severity::from_gl(severity) {
        Severity::High => {
            tracing::error!(source, kind, id, "GL debug callback: {}", message)
        }
        Severity::Medium => {
            tracing::warn!(source, kind, id, "GL debug callback: {}", message)
        }
        Severity::Low => {
            tracing::info!(source, kind, id, "GL debug callback: {}", message)
        }
        Severity::Notification | Severity::Unknown(_) => {
            tracing::debug!(source, kind, id, "GL debug callback: {}", message)
        }
    }
}
