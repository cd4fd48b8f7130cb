//! Owns the listener thread and its start/stop handshake.

use core::mem::MaybeUninit;
use core::ptr::null_mut;
use std::thread::{self, JoinHandle};

use tracing::{event, Level};

use crate::dispatcher::{EventDispatcher, SubscriberTable};
use crate::error::{Error, Result};
use crate::event::{SessionEventKind, SubscriptionScope};
use crate::naming::{UniqueName, DEFAULT_PREFIX};
use crate::pump::{self, CancelSignal, LoopExit, MessageSource, Retrieved};
use crate::registration::Registration;
use crate::window::{NotificationWindow, WakeHandle};
use crate::wynapi::*;

/// The calling thread's message queue, read with GetMessageA.
struct ThreadQueue;

impl MessageSource for ThreadQueue {
    type Message = MSG;

    fn retrieve(&mut self) -> Retrieved<MSG> {
        let mut msg: MaybeUninit<MSG> = MaybeUninit::uninit();
        // a null hwnd also yields thread messages such as WM_QUIT
        match unsafe { GetMessageA(msg.as_mut_ptr(), null_mut(), 0, 0) } {
            -1 => Retrieved::Failed(last_error()),
            0 => Retrieved::Quit,
            // GetMessageA filled msg because it returned a message
            _ => Retrieved::Message(unsafe { msg.assume_init() }),
        }
    }

    fn route(&mut self, msg: &MSG) {
        unsafe {
            TranslateMessage(msg);
            DispatchMessageA(msg);
        }
    }
}

/// Configures a [`SessionListener`]. Subscribers are attached here and
/// handed to the listener thread at [`ListenerBuilder::start`].
///
/// Callbacks run on the listener thread in the order they were added. A
/// slow callback delays every event after it.
#[derive(Debug, Default)]
pub struct ListenerBuilder {
    scope: SubscriptionScope,
    prefix: Option<String>,
    subscribers: SubscriberTable,
}

impl ListenerBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn scope(mut self, scope: SubscriptionScope) -> Self {
        self.scope = scope;
        self
    }

    pub fn all_sessions(self, all_sessions: bool) -> Self {
        self.scope(all_sessions.into())
    }

    /// Prefix for the generated window class name.
    pub fn name_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = Some(prefix.into());
        self
    }

    pub fn on<F>(mut self, kind: SessionEventKind, subscriber: F) -> Self
    where
        F: FnMut(u32) + Send + 'static,
    {
        self.subscribers.push(kind, Box::new(subscriber));
        self
    }

    /// Spawns the listener thread and waits until its window is created
    /// and registered. Setup failures are returned here, after the thread
    /// has released whatever it had acquired and exited.
    pub fn start(self) -> Result<SessionListener> {
        let name = UniqueName::next(self.prefix.as_deref().unwrap_or(DEFAULT_PREFIX));
        let scope = self.scope;
        let subscribers = self.subscribers;
        let class_name = name.class.clone();
        let cancel = CancelSignal::new();
        let (reply, receive) = oneshot::channel();

        let thread = thread::Builder::new()
            .name(name.thread_name())
            .spawn({
                let cancel = cancel.clone();
                move || run_listener(name, scope, subscribers, cancel, reply)
            })
            .map_err(Error::Spawn)?;

        match receive.recv() {
            Ok(Ok(wake)) => Ok(SessionListener {
                scope,
                class_name,
                cancel,
                wake: Some(wake),
                thread: Some(thread),
            }),
            Ok(Err(err)) => {
                let _ = thread.join();
                Err(err)
            }
            Err(_) => {
                let _ = thread.join();
                Err(Error::SetupAborted)
            }
        }
    }
}

fn run_listener(
    name: UniqueName,
    scope: SubscriptionScope,
    subscribers: SubscriberTable,
    cancel: CancelSignal,
    ready: oneshot::Sender<Result<WakeHandle>>,
) -> LoopExit {
    let window = match NotificationWindow::create(&name, EventDispatcher::new(subscribers)) {
        Ok(window) => window,
        Err(err) => {
            let code = err.code;
            let _ = ready.send(Err(err.into()));
            return LoopExit::Failed(code);
        }
    };
    let registration = match Registration::register(&window, scope) {
        Ok(registration) => registration,
        Err(err) => {
            let code = err.code;
            let _ = ready.send(Err(err.into()));
            return LoopExit::Failed(code);
        }
    };
    if ready.send(Ok(window.wake_handle())).is_err() {
        // the starting thread is gone; nobody could ever stop this loop
        return LoopExit::Cancelled;
    }

    let exit = pump::run(&mut ThreadQueue, &cancel);
    match exit {
        LoopExit::Failed(code) => {
            event!(Level::ERROR, "GetMessageA failed with os error {code}")
        }
        _ => event!(Level::INFO, "{} message loop finished: {exit:?}", name.class),
    }

    drop(registration);
    drop(window);
    exit
}

/// A running session-change listener.
///
/// Dropping it stops the listener; [`SessionListener::stop`] does the same
/// explicitly. Both block until the listener thread has unregistered and
/// destroyed its window.
#[derive(Debug)]
pub struct SessionListener {
    scope: SubscriptionScope,
    class_name: String,
    cancel: CancelSignal,
    wake: Option<WakeHandle>,
    thread: Option<JoinHandle<LoopExit>>,
}

impl SessionListener {
    pub fn builder() -> ListenerBuilder {
        ListenerBuilder::new()
    }

    pub fn scope(&self) -> SubscriptionScope {
        self.scope
    }

    /// The window class registered for this listener.
    pub fn class_name(&self) -> &str {
        &self.class_name
    }

    /// True until the loop has exited, either by [`Self::stop`] or because
    /// the host ended it.
    pub fn is_running(&self) -> bool {
        self.thread
            .as_ref()
            .is_some_and(|thread| !thread.is_finished())
    }

    /// Stops the loop and waits for the thread. Returns how the loop ended
    /// the first time; later calls do nothing and return `None`.
    pub fn stop(&mut self) -> Option<LoopExit> {
        let thread = self.thread.take()?;
        self.cancel.cancel();
        if let Some(wake) = self.wake.take() {
            wake.wake();
        }

        if thread.thread().id() == thread::current().id() {
            // stop() from inside a subscriber: the loop exits on its own
            // once the callback returns
            return Some(LoopExit::Cancelled);
        }
        match thread.join() {
            Ok(exit) => Some(exit),
            Err(_) => {
                event!(Level::ERROR, "listener thread panicked");
                None
            }
        }
    }
}

impl Drop for SessionListener {
    fn drop(&mut self) {
        self.stop();
    }
}
