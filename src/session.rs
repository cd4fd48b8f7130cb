//! Username and console-session lookups.
//!
//! These never fail: a lookup the host cannot answer degrades to
//! [`FALLBACK_USERNAME`] or [`NO_CONSOLE_SESSION`].

/// Reported by the host when no session is attached to the physical console.
pub const NO_CONSOLE_SESSION: u32 = 0xFFFF_FFFF;

/// Returned when a session's user cannot be resolved.
pub const FALLBACK_USERNAME: &str = "SYSTEM";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionInfo {
    UserName,
    DomainName,
}

/// The host queries the helpers are built on.
pub trait SessionHost {
    /// `None` if the query failed or returned an empty string.
    fn query_session_string(&self, session_id: u32, info: SessionInfo) -> Option<String>;

    fn active_console_session_id(&self) -> u32;
}

/// Resolves the user logged on to `session_id`, as `DOMAIN\user` when
/// `prepend_domain` is set and the domain is known.
pub fn username_by_session_id_with<H>(host: &H, session_id: u32, prepend_domain: bool) -> String
where
    H: SessionHost + ?Sized,
{
    let Some(user) = host
        .query_session_string(session_id, SessionInfo::UserName)
        .filter(|user| !user.is_empty())
    else {
        return FALLBACK_USERNAME.to_owned();
    };

    if !prepend_domain {
        return user;
    }
    match host
        .query_session_string(session_id, SessionInfo::DomainName)
        .filter(|domain| !domain.is_empty())
    {
        Some(domain) => format!("{domain}\\{user}"),
        None => user,
    }
}

pub fn active_console_session_id_with<H: SessionHost + ?Sized>(host: &H) -> u32 {
    host.active_console_session_id()
}

/// Decodes a UTF-16 buffer up to its first NUL.
pub fn decode_wide(units: &[u16]) -> String {
    let end = units.iter().position(|&unit| unit == 0).unwrap_or(units.len());
    String::from_utf16_lossy(&units[..end])
}

#[cfg(windows)]
pub use self::wts::{active_console_session_id, username_by_session_id, WtsHost};

#[cfg(windows)]
mod wts {
    use core::ptr::null_mut;

    use tracing::{event, Level};

    use super::{decode_wide, SessionHost, SessionInfo};
    use crate::wynapi::*;

    /// The local session host, queried through Wtsapi32.
    #[derive(Debug, Clone, Copy, Default)]
    pub struct WtsHost;

    /// Frees a buffer handed out by WTSQuerySessionInformationW.
    struct WtsBuffer(LPWSTR);

    impl Drop for WtsBuffer {
        fn drop(&mut self) {
            if !self.0.is_null() {
                unsafe { WTSFreeMemory(self.0.cast()) };
            }
        }
    }

    impl SessionHost for WtsHost {
        fn query_session_string(&self, session_id: u32, info: SessionInfo) -> Option<String> {
            let class = match info {
                SessionInfo::UserName => WTS_USER_NAME,
                SessionInfo::DomainName => WTS_DOMAIN_NAME,
            };
            let mut raw: LPWSTR = null_mut();
            let mut bytes: DWORD = 0;
            let res = unsafe {
                WTSQuerySessionInformationW(
                    WTS_CURRENT_SERVER_HANDLE,
                    session_id,
                    class,
                    &mut raw,
                    &mut bytes,
                )
            };
            if res == 0 {
                event!(
                    Level::DEBUG,
                    "WTSQuerySessionInformationW {info:?} for session {session_id}: os error {}",
                    last_error()
                );
                return None;
            }
            let buffer = WtsBuffer(raw);
            // bytes counts the terminating NUL
            let units = bytes as usize / 2;
            if buffer.0.is_null() || units <= 1 {
                return None;
            }
            // the host handed back `bytes` readable bytes at buffer.0
            let text = unsafe { core::slice::from_raw_parts(buffer.0, units) };
            Some(decode_wide(text))
        }

        fn active_console_session_id(&self) -> u32 {
            unsafe { WTSGetActiveConsoleSessionId() }
        }
    }

    pub fn username_by_session_id(session_id: u32, prepend_domain: bool) -> String {
        super::username_by_session_id_with(&WtsHost, session_id, prepend_domain)
    }

    pub fn active_console_session_id() -> u32 {
        super::active_console_session_id_with(&WtsHost)
    }
}
