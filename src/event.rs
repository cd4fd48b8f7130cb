use core::fmt;

/// The `wParam` subtype of a `WM_WTSSESSION_CHANGE` message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SessionEventKind {
    ConsoleConnect,
    ConsoleDisconnect,
    RemoteConnect,
    RemoteDisconnect,
    SessionLogon,
    SessionLogoff,
    SessionLock,
    SessionUnlock,
    SessionRemoteControl,
}

impl SessionEventKind {
    pub const ALL: [SessionEventKind; 9] = [
        Self::ConsoleConnect,
        Self::ConsoleDisconnect,
        Self::RemoteConnect,
        Self::RemoteDisconnect,
        Self::SessionLogon,
        Self::SessionLogoff,
        Self::SessionLock,
        Self::SessionUnlock,
        Self::SessionRemoteControl,
    ];

    /// The raw WTS_* code the host sends for this kind.
    pub fn code(self) -> usize {
        match self {
            Self::ConsoleConnect => 0x1,
            Self::ConsoleDisconnect => 0x2,
            Self::RemoteConnect => 0x3,
            Self::RemoteDisconnect => 0x4,
            Self::SessionLogon => 0x5,
            Self::SessionLogoff => 0x6,
            Self::SessionLock => 0x7,
            Self::SessionUnlock => 0x8,
            Self::SessionRemoteControl => 0x9,
        }
    }

    pub(crate) fn index(self) -> usize {
        self.code() - 1
    }
}

impl fmt::Display for SessionEventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// A subtype code outside the nine the host documents.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnknownSubtype(pub usize);

impl TryFrom<usize> for SessionEventKind {
    type Error = UnknownSubtype;

    fn try_from(wparam: usize) -> Result<Self, Self::Error> {
        match wparam {
            0x1 => Ok(Self::ConsoleConnect),
            0x2 => Ok(Self::ConsoleDisconnect),
            0x3 => Ok(Self::RemoteConnect),
            0x4 => Ok(Self::RemoteDisconnect),
            0x5 => Ok(Self::SessionLogon),
            0x6 => Ok(Self::SessionLogoff),
            0x7 => Ok(Self::SessionLock),
            0x8 => Ok(Self::SessionUnlock),
            0x9 => Ok(Self::SessionRemoteControl),
            other => Err(UnknownSubtype(other)),
        }
    }
}

/// One decoded session transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionEvent {
    pub kind: SessionEventKind,
    pub session_id: u32,
}

/// Which sessions a listener hears about. Fixed once the listener starts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SubscriptionScope {
    #[default]
    CurrentSession,
    AllSessions,
}

impl SubscriptionScope {
    /// The `dwFlags` value for WTSRegisterSessionNotification.
    pub fn notify_flag(self) -> u32 {
        match self {
            Self::CurrentSession => 0,
            Self::AllSessions => 1,
        }
    }
}

impl From<bool> for SubscriptionScope {
    fn from(all_sessions: bool) -> Self {
        if all_sessions {
            Self::AllSessions
        } else {
            Self::CurrentSession
        }
    }
}
