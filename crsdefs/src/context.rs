//! Handles over libproj: a context bound to one registry, and the objects created in it.
//!
//! Every object libproj hands out borrows the [`ProjContext`] it was created in and is
//! destroyed before it. Errors libproj reports for a context are forwarded to `tracing` and
//! the last one is kept, so a failed call can say why it failed.
use crate::result::{Error, Result};
use proj_sys::{
    proj_context_create, proj_context_destroy, proj_context_errno, proj_context_errno_string,
    proj_context_get_database_path, proj_context_set_database_path, proj_destroy, proj_log_func,
    PJ_CONTEXT, PJ_LOG_LEVEL_PJ_LOG_ERROR, PJ,
};
use std::cell::Cell;
use std::ffi::{CStr, CString};
use std::os::raw::{c_char, c_int, c_void};
use std::path::{Path, PathBuf};
use std::ptr::{self, NonNull};

/// Copy a string owned by libproj, `None` for a null pointer
pub(crate) fn string_from_proj(ptr: *const c_char) -> Option<String> {
    if ptr.is_null() {
        None
    } else {
        Some(unsafe { CStr::from_ptr(ptr) }.to_string_lossy().into_owned())
    }
}

#[derive(Default)]
struct LogSink {
    last_error: Cell<Option<String>>,
}

unsafe extern "C" fn forward_log(app_data: *mut c_void, level: c_int, msg: *const c_char) {
    let message = match string_from_proj(msg) {
        Some(m) => m,
        None => return,
    };
    if level == PJ_LOG_LEVEL_PJ_LOG_ERROR as c_int {
        // the caller decides whether this is worth a warning
        tracing::debug!(target: "proj", "{}", message);
        let sink = &*(app_data as *const LogSink);
        sink.last_error.set(Some(message));
    } else {
        tracing::trace!(target: "proj", "{}", message);
    }
}

/// A libproj threading context reading one registry
pub struct ProjContext {
    ctx: NonNull<PJ_CONTEXT>,
    // libproj holds a raw pointer to this until the context is destroyed
    sink: Box<LogSink>,
}

impl ProjContext {
    fn create() -> Result<ProjContext> {
        let ctx = NonNull::new(unsafe { proj_context_create() })
            .ok_or_else(|| Error::ProjContext("could not create a PROJ context".to_owned()))?;
        let sink = Box::new(LogSink::default());
        unsafe {
            proj_log_func(
                ctx.as_ptr(),
                &*sink as *const LogSink as *mut c_void,
                Some(forward_log),
            );
        }
        Ok(ProjContext { ctx, sink })
    }

    /// A context reading whichever `proj.db` libproj finds by itself
    pub fn new() -> Result<ProjContext> {
        ProjContext::create()
    }

    /// A context reading the registry at `path`
    ///
    /// # Errors
    /// [`Error::ProjContext`] when libproj can't open `path` as its database.
    pub fn with_database<P: AsRef<Path>>(path: P) -> Result<ProjContext> {
        let path = path.as_ref();
        let c_path = path
            .to_str()
            .and_then(|p| CString::new(p).ok())
            .ok_or_else(|| {
                Error::ProjContext(format!("{} is not a usable database path", path.display()))
            })?;
        let context = ProjContext::create()?;
        let ok = unsafe {
            proj_context_set_database_path(
                context.as_ptr(),
                c_path.as_ptr(),
                ptr::null(),
                ptr::null(),
            )
        };
        if ok == 0 {
            return Err(Error::ProjContext(format!(
                "cannot read {} as a PROJ database: {}",
                path.display(),
                context.last_error()
            )));
        }
        Ok(context)
    }

    /// The database libproj reads for this context, if it found one
    pub fn database_path(&self) -> Option<PathBuf> {
        string_from_proj(unsafe { proj_context_get_database_path(self.as_ptr()) })
            .map(PathBuf::from)
    }

    pub(crate) fn as_ptr(&self) -> *mut PJ_CONTEXT {
        self.ctx.as_ptr()
    }

    /// Forget earlier errors before a call whose failure has to be explained
    pub(crate) fn clear_error(&self) {
        self.sink.last_error.set(None);
    }

    /// The last error libproj reported for this context
    pub(crate) fn last_error(&self) -> String {
        if let Some(message) = self.sink.last_error.take() {
            return message;
        }
        let errno = unsafe { proj_context_errno(self.as_ptr()) };
        string_from_proj(unsafe { proj_context_errno_string(self.as_ptr(), errno) })
            .unwrap_or_else(|| format!("PROJ error {}", errno))
    }
}

impl Drop for ProjContext {
    fn drop(&mut self) {
        unsafe {
            proj_context_destroy(self.as_ptr());
        }
    }
}

/// An object libproj created in a [`ProjContext`]
pub(crate) struct PjHandle<'a> {
    context: &'a ProjContext,
    ptr: NonNull<PJ>,
}

impl<'a> PjHandle<'a> {
    /// Take ownership of what a libproj constructor returned, `None` if it failed
    pub(crate) fn new(context: &'a ProjContext, ptr: *mut PJ) -> Option<PjHandle<'a>> {
        NonNull::new(ptr).map(|ptr| PjHandle { context, ptr })
    }

    /// Another object built from this one, such as its ellipsoid
    pub(crate) fn related<F>(&self, build: F) -> Option<PjHandle<'a>>
    where
        F: FnOnce(*mut PJ_CONTEXT, *const PJ) -> *mut PJ,
    {
        PjHandle::new(self.context, build(self.context.as_ptr(), self.as_ptr()))
    }

    pub(crate) fn context(&self) -> &'a ProjContext {
        self.context
    }

    pub(crate) fn as_ptr(&self) -> *mut PJ {
        self.ptr.as_ptr()
    }
}

impl Drop for PjHandle<'_> {
    fn drop(&mut self) {
        unsafe {
            proj_destroy(self.ptr.as_ptr());
        }
    }
}
