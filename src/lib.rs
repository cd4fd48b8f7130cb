//! Session-change notifications for Windows.
//!
//! A [`SessionListener`] creates a hidden message-only window on its own
//! thread, registers it with WTSRegisterSessionNotification and turns every
//! `WM_WTSSESSION_CHANGE` it receives into a call to the subscribers added
//! for that [`SessionEventKind`]:
//!
//! ```no_run
//! # #[cfg(windows)]
//! # fn main() -> wts_notify::Result<()> {
//! use wts_notify::{SessionEventKind, SessionListener};
//!
//! let mut listener = SessionListener::builder()
//!     .all_sessions(true)
//!     .on(SessionEventKind::SessionLock, |id| println!("session {id} locked"))
//!     .start()?;
//! // ...
//! listener.stop();
//! # Ok(())
//! # }
//! # #[cfg(not(windows))]
//! # fn main() {}
//! ```
//!
//! The [`session`] helpers resolve usernames and the console session id.

pub mod dispatcher;
pub mod error;
pub mod event;
pub mod naming;
pub mod pump;
pub mod session;

#[cfg(windows)]
mod wynapi;

#[cfg(windows)]
pub mod listener;
#[cfg(windows)]
pub mod registration;
#[cfg(windows)]
pub mod window;

pub use error::{Error, PlatformError, ResourceError, Result};
pub use event::{SessionEvent, SessionEventKind, SubscriptionScope};
pub use session::{FALLBACK_USERNAME, NO_CONSOLE_SESSION};

#[cfg(windows)]
pub use listener::{ListenerBuilder, SessionListener};
#[cfg(windows)]
pub use session::{active_console_session_id, username_by_session_id};
