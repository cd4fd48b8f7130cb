//! Raw bindings to the handful of User32, Kernel32 and Wtsapi32 calls the
//! listener needs. Everything here is `unsafe` and unchecked; the safe
//! wrappers live in [`crate::window`], [`crate::registration`],
//! [`crate::listener`] and [`crate::session`].
#![allow(non_camel_case_types)]
#![allow(clippy::upper_case_acronyms)]

use core::ffi::{c_char, c_int, c_void};

pub type HANDLE = *mut c_void;
pub type LPVOID = *mut c_void;
pub type HWND = HANDLE;
pub type HMENU = HANDLE;
pub type HINSTANCE = HANDLE;
pub type HMODULE = HANDLE;
pub type DWORD = u32;
pub type BOOL = i32;
pub type CHAR = c_char;
pub type LPWSTR = *mut u16;
pub type LPCSTR = *const CHAR;
pub type INT = c_int;
pub type UINT = u32;
pub type LRESULT = isize;
pub type ATOM = u16;
pub type HICON = HANDLE;
pub type HCURSOR = HICON;
pub type HBRUSH = HANDLE;
pub type UINT_PTR = usize;
pub type WPARAM = UINT_PTR;
pub type LONG_PTR = isize;
pub type LPARAM = LONG_PTR;
pub type LONG = i32;

pub type WNDPROC = Option<
    unsafe extern "system" fn(
        hwnd: HWND,
        Msg: UINT,
        wParam: WPARAM,
        lParam: LPARAM,
    ) -> LRESULT,
>;

pub const HWND_MESSAGE: HWND = -3isize as HWND;
pub const WM_APP: UINT = 0x8000;
pub const WTS_CURRENT_SERVER_HANDLE: HANDLE = core::ptr::null_mut();

/// `WTS_INFO_CLASS` values used by the session helpers.
pub const WTS_USER_NAME: c_int = 5;
pub const WTS_DOMAIN_NAME: c_int = 7;

#[repr(C)]
#[allow(non_snake_case)]
pub struct WNDCLASSEXA {
    pub cbSize: UINT,
    pub style: UINT,
    pub lpfnWndProc: WNDPROC,
    pub cbClsExtra: c_int,
    pub cbWndExtra: c_int,
    pub hInstance: HINSTANCE,
    pub hIcon: HICON,
    pub hCursor: HCURSOR,
    pub hbrBackground: HBRUSH,
    pub lpszMenuName: LPCSTR,
    pub lpszClassName: LPCSTR,
    pub hIconSm: HICON,
}

#[repr(C)]
#[derive(Debug)]
#[allow(non_snake_case, dead_code)]
pub struct MSG {
    pub hwnd: HWND,
    pub message: UINT,
    pub wParam: WPARAM,
    pub lParam: LPARAM,
    pub time: DWORD,
    pub pt: POINT,
    pub lPrivate: DWORD,
}

#[repr(C)]
#[derive(Debug)]
#[allow(dead_code)]
pub struct POINT {
    pub x: LONG,
    pub y: LONG,
}

#[link(name = "Wtsapi32")]
extern "system" {
    pub fn WTSRegisterSessionNotification(hWnd: HWND, dwFlags: DWORD) -> BOOL;
    pub fn WTSUnRegisterSessionNotification(hWnd: HWND) -> BOOL;
    pub fn WTSQuerySessionInformationW(
        hServer: HANDLE,
        SessionId: DWORD,
        WTSInfoClass: c_int,
        ppBuffer: *mut LPWSTR,
        pBytesReturned: *mut DWORD,
    ) -> BOOL;
    pub fn WTSFreeMemory(pMemory: LPVOID);
}

#[link(name = "Kernel32")]
extern "system" {
    pub fn GetLastError() -> DWORD;
    pub fn GetModuleHandleA(lpModuleName: LPCSTR) -> HMODULE;
    pub fn WTSGetActiveConsoleSessionId() -> DWORD;
}

#[link(name = "User32")]
extern "system" {
    pub fn RegisterClassExA(lpwcx: *const WNDCLASSEXA) -> ATOM;
    pub fn UnregisterClassA(lpClassName: LPCSTR, hInstance: HINSTANCE) -> BOOL;
    pub fn DefWindowProcA(
        hWnd: HWND,
        Msg: UINT,
        wParam: WPARAM,
        lParam: LPARAM,
    ) -> LRESULT;
    pub fn CreateWindowExA(
        dwExStyle: DWORD,
        lpClassName: LPCSTR,
        lpWindowName: LPCSTR,
        dwStyle: DWORD,
        X: INT,
        Y: INT,
        nWidth: INT,
        nHeight: INT,
        hWndParent: HWND,
        hMenu: HMENU,
        hInstance: HINSTANCE,
        lpParam: LPVOID,
    ) -> HWND;
    pub fn DestroyWindow(hWnd: HWND) -> BOOL;
    pub fn GetMessageA(
        lpMsg: *mut MSG,
        hWnd: HWND,
        wMsgFilterMin: UINT,
        wMsgFilterMax: UINT,
    ) -> BOOL;
    pub fn TranslateMessage(lpMsg: *const MSG) -> BOOL;
    pub fn DispatchMessageA(lpMsg: *const MSG) -> LRESULT;
    pub fn PostMessageA(
        hWnd: HWND,
        Msg: UINT,
        wParam: WPARAM,
        lParam: LPARAM,
    ) -> BOOL;
}

/// Rust wrapper around GetLastError()
pub fn last_error() -> DWORD {
    unsafe { GetLastError() }
}

// Rust wrapper for GetModuleHandleA
pub fn get_module_handle_a() -> HMODULE {
    unsafe { GetModuleHandleA(core::ptr::null()) }
}
