//! This program creates a window in order to register for
//! WTS SESSION events such as lock screens, and prints every
//! event it sees until stdin is closed.
use clap::Parser;

#[derive(Parser, Debug)]
#[cfg_attr(not(windows), allow(dead_code))]
#[command(version, about = "Print Windows session change events")]
struct Args {
    #[arg(long, help = "Listen to every session on the host, not just this one")]
    all_sessions: bool,

    #[arg(long, help = "Print usernames as DOMAIN\\user")]
    with_domain: bool,

    #[arg(long, help = "Enable debug logging", default_value = "false")]
    debug: bool,
}

fn main() -> Result<(), wts_notify::Error> {
    let args = Args::parse();

    // Enable logging
    tracing_subscriber::fmt()
        .with_thread_names(true)
        .with_max_level(if args.debug {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        })
        .init();

    run(args)
}

#[cfg(windows)]
fn run(args: Args) -> Result<(), wts_notify::Error> {
    use std::io::BufRead;
    use wts_notify::{
        active_console_session_id, username_by_session_id, SessionEventKind, SessionListener,
        NO_CONSOLE_SESSION,
    };

    match active_console_session_id() {
        NO_CONSOLE_SESSION => println!("no session is attached to the console"),
        id => println!(
            "console session {id} belongs to {}",
            username_by_session_id(id, args.with_domain)
        ),
    }

    // Create the window and register it for session events
    let mut builder = SessionListener::builder().all_sessions(args.all_sessions);
    for kind in SessionEventKind::ALL {
        let with_domain = args.with_domain;
        builder = builder.on(kind, move |id| {
            println!("{kind} session {id} ({})", username_by_session_id(id, with_domain));
        });
    }
    let mut listener = builder.start()?;

    // Events arrive on the listener thread until stdin is closed
    for line in std::io::stdin().lock().lines() {
        if line.is_err() {
            break;
        }
    }

    // Cleanup when we are done
    listener.stop();
    Ok(())
}

#[cfg(not(windows))]
fn run(_args: Args) -> Result<(), wts_notify::Error> {
    Err(wts_notify::Error::Unsupported)
}
