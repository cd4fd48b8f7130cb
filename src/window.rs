//! The hidden message-only window that receives session notifications.
//!
//! A window may only be driven by the thread that created it, so a
//! [`NotificationWindow`] is `!Send`: it is built, pumped and destroyed on
//! the listener thread. The thread's [`EventDispatcher`] lives in a
//! thread-local next to it and is what the window procedure routes into.

use core::cell::RefCell;
use core::ptr::{null, null_mut};
use std::ffi::CString;

use tracing::{event, Level};

use crate::dispatcher::{EventDispatcher, Routed};
use crate::error::{PlatformError, ResourceError};
use crate::naming::UniqueName;
use crate::wynapi::*;

/// Posted to the window at stop time so a blocked `GetMessageA` returns.
pub const WM_WAKE: UINT = WM_APP + 0x5E;

/// ERROR_INVALID_PARAMETER, reported when a name contains a NUL.
const INVALID_PARAMETER: u32 = 87;

thread_local! {
    static DISPATCHER: RefCell<Option<EventDispatcher>> = const { RefCell::new(None) };
}

unsafe extern "system" fn window_proc(
    hwnd: HWND,
    msg: UINT,
    wparam: WPARAM,
    lparam: LPARAM,
) -> LRESULT {
    // a subscriber that re-enters the window finds the dispatcher borrowed
    // and falls through to the default procedure
    let routed = DISPATCHER
        .try_with(|slot| match slot.try_borrow_mut() {
            Ok(mut slot) => slot
                .as_mut()
                .map(|dispatcher| dispatcher.handle(msg, wparam, lparam)),
            Err(_) => None,
        })
        .ok()
        .flatten();

    match routed {
        Some(Routed::Handled) => 0,
        _ => DefWindowProcA(hwnd, msg, wparam, lparam),
    }
}

/// A `Send` copy of the window handle, good only for posting to it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WakeHandle(isize);

impl WakeHandle {
    /// Posts [`WM_WAKE`]. Returns `false` if the window is already gone.
    pub fn wake(self) -> bool {
        let posted = unsafe { PostMessageA(self.0 as HWND, WM_WAKE, 0, 0) };
        if posted == 0 {
            event!(
                Level::DEBUG,
                "PostMessageA wake: {}",
                ResourceError::last("PostMessageA")
            );
            return false;
        }
        true
    }
}

#[derive(Debug)]
pub struct NotificationWindow {
    hwnd: HWND,
    instance: HINSTANCE,
    class_name: CString,
    class_registered: bool,
}

impl NotificationWindow {
    /// Registers a window class under `name.class` and creates a
    /// message-only window of that class routed to `dispatcher`.
    pub fn create(
        name: &UniqueName,
        dispatcher: EventDispatcher,
    ) -> Result<Self, PlatformError> {
        let class_name = CString::new(name.class.as_str()).map_err(|_| PlatformError {
            operation: "RegisterClassExA",
            code: INVALID_PARAMETER,
        })?;
        let window_name = CString::new(name.window.as_str()).map_err(|_| PlatformError {
            operation: "CreateWindowExA",
            code: INVALID_PARAMETER,
        })?;
        let instance = get_module_handle_a();

        let window_class = WNDCLASSEXA {
            cbSize: core::mem::size_of::<WNDCLASSEXA>() as u32,
            style: 0,
            lpfnWndProc: Some(window_proc),
            cbClsExtra: 0,
            cbWndExtra: 0,
            hInstance: instance,
            hIcon: null_mut(),
            hCursor: null_mut(),
            hbrBackground: null_mut(),
            lpszMenuName: null(),
            lpszClassName: class_name.as_ptr(),
            hIconSm: null_mut(),
        };
        let atom = unsafe { RegisterClassExA(&window_class) };
        if atom == 0 {
            let err = PlatformError::last("RegisterClassExA");
            event!(Level::ERROR, "{err}");
            return Err(err);
        }
        event!(Level::INFO, "RegisterClassExA {} atom: {atom}", name.class);

        // from here on Drop unregisters the class on every exit path
        let mut window = Self {
            hwnd: null_mut(),
            instance,
            class_name,
            class_registered: true,
        };

        DISPATCHER.with(|slot| *slot.borrow_mut() = Some(dispatcher));

        let hwnd = unsafe {
            CreateWindowExA(
                0,
                window.class_name.as_ptr(),
                window_name.as_ptr(),
                0,
                0,
                0,
                0,
                0,
                HWND_MESSAGE,
                null_mut(),
                instance,
                null_mut(),
            )
        };
        if hwnd.is_null() {
            let err = PlatformError::last("CreateWindowExA");
            event!(Level::ERROR, "{err}");
            return Err(err);
        }
        event!(Level::INFO, "CreateWindowExA handle: {:?}", hwnd);
        window.hwnd = hwnd;
        Ok(window)
    }

    pub fn hwnd(&self) -> HWND {
        self.hwnd
    }

    pub fn is_alive(&self) -> bool {
        !self.hwnd.is_null()
    }

    pub fn wake_handle(&self) -> WakeHandle {
        WakeHandle(self.hwnd as isize)
    }

    /// Destroys the window, drops the dispatcher and unregisters the class.
    /// Safe to call any number of times; failures are logged only.
    pub fn destroy(&mut self) {
        if !self.hwnd.is_null() {
            if unsafe { DestroyWindow(self.hwnd) } == 0 {
                event!(Level::WARN, "{}", ResourceError::last("DestroyWindow"));
            } else {
                event!(Level::INFO, "DestroyWindow handle: {:?}", self.hwnd);
            }
            self.hwnd = null_mut();
        }

        if self.class_registered {
            // subscribers are released on this thread, before the class goes
            let _ = DISPATCHER.try_with(|slot| slot.borrow_mut().take());
            if unsafe { UnregisterClassA(self.class_name.as_ptr(), self.instance) } == 0 {
                event!(Level::WARN, "{}", ResourceError::last("UnregisterClassA"));
            }
            self.class_registered = false;
        }
    }
}

impl Drop for NotificationWindow {
    fn drop(&mut self) {
        self.destroy();
    }
}
