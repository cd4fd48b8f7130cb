#![cfg(windows)]

use core::ffi::{c_char, c_void};
use core::ptr::{null, null_mut};
use std::collections::HashSet;
use std::ffi::CString;
use std::sync::{mpsc, Arc, Mutex};
use std::time::{Duration, Instant};

use wts_notify::dispatcher::{EventDispatcher, WM_WTSSESSION_CHANGE};
use wts_notify::naming::UniqueName;
use wts_notify::pump::LoopExit;
use wts_notify::window::NotificationWindow;
use wts_notify::{Error, PlatformError, SessionEventKind, SessionListener, SubscriptionScope};

#[link(name = "User32")]
extern "system" {
    fn FindWindowExA(
        parent: *mut c_void,
        child_after: *mut c_void,
        class: *const c_char,
        window: *const c_char,
    ) -> *mut c_void;
    fn PostMessageA(hwnd: *mut c_void, msg: u32, wparam: usize, lparam: isize) -> i32;
}

const HWND_MESSAGE: *mut c_void = -3isize as *mut c_void;

fn find_sink(class: &str) -> *mut c_void {
    let class = CString::new(class).unwrap();
    unsafe { FindWindowExA(HWND_MESSAGE, null_mut(), class.as_ptr(), null()) }
}

fn post_session_change(class: &str, kind: SessionEventKind, session_id: u32) {
    let hwnd = find_sink(class);
    assert!(!hwnd.is_null(), "no sink window for {class}");
    let posted = unsafe {
        PostMessageA(hwnd, WM_WTSSESSION_CHANGE, kind.code(), session_id as isize)
    };
    assert_ne!(posted, 0);
}

fn wait_until(mut done: impl FnMut() -> bool) -> bool {
    let began = Instant::now();
    while began.elapsed() < Duration::from_secs(5) {
        if done() {
            return true;
        }
        std::thread::sleep(Duration::from_millis(10));
    }
    false
}

fn start(scope: SubscriptionScope) -> SessionListener {
    SessionListener::builder()
        .scope(scope)
        .on(SessionEventKind::SessionLock, |_| {})
        .start()
        .expect("listener should start")
}

#[test]
fn start_then_stop_in_both_scopes() {
    for scope in [SubscriptionScope::CurrentSession, SubscriptionScope::AllSessions] {
        let began = Instant::now();
        let mut listener = start(scope);
        assert_eq!(listener.scope(), scope);
        assert!(listener.is_running());
        assert!(!find_sink(listener.class_name()).is_null());

        assert_eq!(listener.stop(), Some(LoopExit::Cancelled));
        assert!(!listener.is_running());
        assert!(find_sink(listener.class_name()).is_null());
        assert!(began.elapsed() < Duration::from_secs(5));
    }
}

#[test]
fn second_stop_is_a_no_op() {
    let mut listener = start(SubscriptionScope::CurrentSession);
    assert!(listener.stop().is_some());
    assert_eq!(listener.stop(), None);
    drop(listener);
}

#[test]
fn drop_stops_the_listener_thread() {
    let (done_tx, done_rx) = mpsc::channel();
    let worker = std::thread::spawn(move || {
        let listener = start(SubscriptionScope::AllSessions);
        drop(listener);
        done_tx.send(()).unwrap();
    });
    done_rx
        .recv_timeout(Duration::from_secs(5))
        .expect("dropping a listener should return promptly");
    worker.join().unwrap();
}

#[test]
fn concurrent_listeners_get_distinct_classes() {
    let workers: Vec<_> = (0..4)
        .map(|_| std::thread::spawn(|| start(SubscriptionScope::CurrentSession)))
        .collect();
    let mut listeners: Vec<_> = workers.into_iter().map(|w| w.join().unwrap()).collect();

    let classes: HashSet<String> = listeners
        .iter()
        .map(|listener| listener.class_name().to_owned())
        .collect();
    assert_eq!(classes.len(), listeners.len());
    for class in &classes {
        assert!(!find_sink(class).is_null());
    }

    for listener in &mut listeners {
        assert_eq!(listener.stop(), Some(LoopExit::Cancelled));
    }
}

#[test]
fn setup_failure_is_returned_by_start() {
    let result = SessionListener::builder()
        .name_prefix("bad\0prefix")
        .on(SessionEventKind::SessionLock, |_| {})
        .start();

    assert!(matches!(
        result,
        Err(Error::Platform(PlatformError {
            operation: "RegisterClassExA",
            code: 87,
        }))
    ));
}

#[test]
fn posted_lock_reaches_only_lock_subscribers() {
    let (seen_tx, seen_rx) = mpsc::channel();
    let unlock_tx = seen_tx.clone();
    let mut listener = SessionListener::builder()
        .on(SessionEventKind::SessionLock, move |id| {
            let _ = seen_tx.send((SessionEventKind::SessionLock, id));
        })
        .on(SessionEventKind::SessionUnlock, move |id| {
            let _ = unlock_tx.send((SessionEventKind::SessionUnlock, id));
        })
        .start()
        .expect("listener should start");

    post_session_change(listener.class_name(), SessionEventKind::SessionLock, 7);

    assert_eq!(
        seen_rx.recv_timeout(Duration::from_secs(5)),
        Ok((SessionEventKind::SessionLock, 7))
    );
    assert_eq!(listener.stop(), Some(LoopExit::Cancelled));
    assert!(seen_rx.try_recv().is_err());
}

#[test]
fn stop_from_inside_a_subscriber_ends_the_loop() {
    let slot: Arc<Mutex<Option<SessionListener>>> = Arc::default();
    let (stopped_tx, stopped_rx) = mpsc::channel();
    let listener = SessionListener::builder()
        .on(SessionEventKind::SessionLogon, {
            let slot = Arc::clone(&slot);
            move |id| {
                let exit = slot.lock().unwrap().as_mut().and_then(SessionListener::stop);
                let _ = stopped_tx.send((id, exit));
            }
        })
        .start()
        .expect("listener should start");
    let class = listener.class_name().to_owned();
    *slot.lock().unwrap() = Some(listener);

    post_session_change(&class, SessionEventKind::SessionLogon, 11);

    assert_eq!(
        stopped_rx.recv_timeout(Duration::from_secs(5)),
        Ok((11, Some(LoopExit::Cancelled)))
    );
    assert!(wait_until(|| find_sink(&class).is_null()));

    let mut listener = slot.lock().unwrap().take().unwrap();
    assert!(!listener.is_running());
    assert_eq!(listener.stop(), None);
}

#[test]
fn destroying_a_window_twice_is_harmless() {
    let name = UniqueName::next("destroy-twice");
    let mut window = NotificationWindow::create(&name, EventDispatcher::default())
        .expect("window should be created");
    assert!(window.is_alive());
    assert!(!find_sink(&name.class).is_null());

    window.destroy();
    assert!(!window.is_alive());
    assert!(find_sink(&name.class).is_null());

    window.destroy();
    assert!(!window.is_alive());
    drop(window);
}
