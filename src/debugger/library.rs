//! Engine backend that calls into a native shared library.
//!
//! The library must export three C symbols:
//!
//! ```c
//! char *ckb_debugger_run_json(const char *tx, const char *group,
//!                             const char *hash, const char *cycles);
//! char *ckb_debugger_run_json_with_printer(const char *tx, const char *group,
//!                                          const char *hash, const char *cycles,
//!                                          void (*printer)(void *, const char *, const char *),
//!                                          void *ctx);
//! void  ckb_debugger_free_string(char *s);
//! ```
//!
//! Result strings are owned by the library and handed back to
//! `ckb_debugger_free_string` once copied.

use super::ScriptDebugger;
use crate::runtime::Invocation;
use crate::{DebuggerError, Result};
use libloading::{Library, Symbol};
use std::any::Any;
use std::borrow::Cow;
use std::ffi::{c_char, c_void, CStr, CString};
use std::panic::{self, AssertUnwindSafe};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

pub const RUN_JSON_SYMBOL: &str = "ckb_debugger_run_json";
pub const RUN_JSON_WITH_PRINTER_SYMBOL: &str = "ckb_debugger_run_json_with_printer";
pub const FREE_STRING_SYMBOL: &str = "ckb_debugger_free_string";

type RunJsonFn =
    unsafe extern "C" fn(*const c_char, *const c_char, *const c_char, *const c_char) -> *mut c_char;
type PrinterFn = unsafe extern "C" fn(*mut c_void, *const c_char, *const c_char);
type RunJsonWithPrinterFn = unsafe extern "C" fn(
    *const c_char,
    *const c_char,
    *const c_char,
    *const c_char,
    PrinterFn,
    *mut c_void,
) -> *mut c_char;
type FreeStringFn = unsafe extern "C" fn(*mut c_char);

/// A loaded debugger library with its entry points resolved.
pub struct LibraryDebugger {
    path: PathBuf,
    run_json: RunJsonFn,
    run_json_with_printer: RunJsonWithPrinterFn,
    free_string: FreeStringFn,
    // Keeps the code behind the function pointers mapped.
    _library: Library,
}

impl std::fmt::Debug for LibraryDebugger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LibraryDebugger")
            .field("path", &self.path)
            .finish_non_exhaustive()
    }
}

impl LibraryDebugger {
    /// Open `path` and resolve all three entry points.
    #[tracing::instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        // SAFETY: loading runs the library's initialisers. The operator chose
        // this library as the engine, so its code is trusted like the engine.
        let library = unsafe { Library::new(&path) }.map_err(|e| {
            DebuggerError::ModuleLoad(format!("cannot open {}: {}", path.display(), e))
        })?;

        // SAFETY: the signatures are the documented C ABI of a debugger library.
        let (run_json, run_json_with_printer, free_string) = unsafe {
            (
                load_symbol::<RunJsonFn>(&library, RUN_JSON_SYMBOL, &path)?,
                load_symbol::<RunJsonWithPrinterFn>(&library, RUN_JSON_WITH_PRINTER_SYMBOL, &path)?,
                load_symbol::<FreeStringFn>(&library, FREE_STRING_SYMBOL, &path)?,
            )
        };
        info!("Loaded debugger library {}", path.display());

        Ok(Self {
            path,
            run_json,
            run_json_with_printer,
            free_string,
            _library: library,
        })
    }

    /// Copy a returned string and release the library's allocation.
    fn take_string(&self, ptr: *mut c_char) -> Result<String> {
        if ptr.is_null() {
            return Err(DebuggerError::Invocation(format!(
                "{} returned no result",
                self.path.display()
            ))
            .into());
        }
        // SAFETY: non-null results are NUL-terminated strings owned by the
        // library until passed to `free_string`, which happens exactly once.
        let text = unsafe { CStr::from_ptr(ptr) }.to_string_lossy().into_owned();
        unsafe { (self.free_string)(ptr) };
        Ok(text)
    }
}

unsafe fn load_symbol<T: Copy>(library: &Library, name: &str, path: &Path) -> Result<T> {
    let symbol: Symbol<T> = library.get(name.as_bytes()).map_err(|e| {
        DebuggerError::ModuleLoad(format!(
            "{} does not export `{}`: {}",
            path.display(),
            name,
            e
        ))
    })?;
    Ok(*symbol)
}

/// The four invocation strings as C strings.
struct CArgs {
    fixture: CString,
    group_type: CString,
    script_hash: CString,
    cycle_limit: CString,
}

impl CArgs {
    fn new(invocation: &Invocation) -> Result<Self> {
        let convert = |name: &str, value: &str| {
            CString::new(value).map_err(|_| {
                DebuggerError::Invocation(format!("{} contains an interior NUL byte", name))
            })
        };
        Ok(Self {
            fixture: convert("fixture", &invocation.fixture_json)?,
            group_type: convert("script group type", &invocation.group_type)?,
            script_hash: convert("script hash", &invocation.script_hash)?,
            cycle_limit: convert("cycle limit", &invocation.cycle_limit)?,
        })
    }
}

/// State shared with [`printer_trampoline`] for one call.
struct PrinterContext<'a> {
    printer: &'a mut dyn FnMut(&str, &str),
    panic: Option<Box<dyn Any + Send + 'static>>,
}

unsafe fn lossy<'a>(ptr: *const c_char) -> Cow<'a, str> {
    if ptr.is_null() {
        Cow::Borrowed("")
    } else {
        CStr::from_ptr(ptr).to_string_lossy()
    }
}

/// C-callable shim forwarding to the Rust printer. A panic in the printer is
/// parked in the context instead of unwinding through foreign frames.
unsafe extern "C" fn printer_trampoline(
    ctx: *mut c_void,
    hash: *const c_char,
    message: *const c_char,
) {
    if ctx.is_null() {
        return;
    }
    let context = &mut *ctx.cast::<PrinterContext<'_>>();
    if context.panic.is_some() {
        return;
    }
    let hash = lossy(hash);
    let message = lossy(message);
    let printer = &mut context.printer;
    if let Err(payload) = panic::catch_unwind(AssertUnwindSafe(|| printer(&hash, &message))) {
        context.panic = Some(payload);
    }
}

impl ScriptDebugger for LibraryDebugger {
    fn describe(&self) -> String {
        format!("library:{}", self.path.display())
    }

    fn run(&self, invocation: &Invocation) -> Result<String> {
        let args = CArgs::new(invocation)?;
        debug!("Calling {}", RUN_JSON_SYMBOL);
        // SAFETY: all pointers are valid NUL-terminated strings for the call.
        let ptr = unsafe {
            (self.run_json)(
                args.fixture.as_ptr(),
                args.group_type.as_ptr(),
                args.script_hash.as_ptr(),
                args.cycle_limit.as_ptr(),
            )
        };
        self.take_string(ptr)
    }

    fn run_with_printer(
        &self,
        invocation: &Invocation,
        printer: &mut dyn FnMut(&str, &str),
    ) -> Result<String> {
        let args = CArgs::new(invocation)?;
        let mut context = PrinterContext {
            printer,
            panic: None,
        };
        debug!("Calling {}", RUN_JSON_WITH_PRINTER_SYMBOL);
        // SAFETY: `context` outlives the call and the library only uses the
        // context pointer from within the call, on this thread.
        let ptr = unsafe {
            (self.run_json_with_printer)(
                args.fixture.as_ptr(),
                args.group_type.as_ptr(),
                args.script_hash.as_ptr(),
                args.cycle_limit.as_ptr(),
                printer_trampoline,
                (&mut context as *mut PrinterContext<'_>).cast::<c_void>(),
            )
        };
        let text = self.take_string(ptr);
        if let Some(payload) = context.panic.take() {
            panic::resume_unwind(payload);
        }
        text
    }
}
