use tracing::{event, Level};

use crate::error::{PlatformError, ResourceError};
use crate::event::SubscriptionScope;
use crate::window::NotificationWindow;
use crate::wynapi::*;

/// An active WTSRegisterSessionNotification for one window.
///
/// Borrows the window, so the registration can never outlive it and is
/// always dropped (unregistered) before the window is destroyed.
#[derive(Debug)]
pub struct Registration<'w> {
    window: &'w NotificationWindow,
    scope: SubscriptionScope,
    active: bool,
}

impl<'w> Registration<'w> {
    pub fn register(
        window: &'w NotificationWindow,
        scope: SubscriptionScope,
    ) -> Result<Self, PlatformError> {
        let res = unsafe { WTSRegisterSessionNotification(window.hwnd(), scope.notify_flag()) };
        if res == 0 {
            let err = PlatformError::last("WTSRegisterSessionNotification");
            event!(Level::ERROR, "{err}");
            return Err(err);
        }
        event!(Level::INFO, "WTSRegisterSessionNotification Registered ({scope:?})");
        Ok(Self {
            window,
            scope,
            active: true,
        })
    }

    pub fn scope(&self) -> SubscriptionScope {
        self.scope
    }

    /// Best effort; a failure is logged and otherwise ignored since the
    /// registration dies with the window anyway.
    pub fn unregister(&mut self) {
        if !self.active {
            return;
        }
        self.active = false;
        if !self.window.is_alive() {
            return;
        }
        if unsafe { WTSUnRegisterSessionNotification(self.window.hwnd()) } == 0 {
            event!(
                Level::WARN,
                "{}",
                ResourceError::last("WTSUnRegisterSessionNotification")
            );
            return;
        }
        event!(Level::INFO, "WTSRegisterSessionNotification Unregistered");
    }
}

impl Drop for Registration<'_> {
    fn drop(&mut self) {
        self.unregister();
    }
}
