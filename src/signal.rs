use std::sync::atomic::{AtomicBool, Ordering};

static STOP: AtomicBool = AtomicBool::new(false);

extern "C" fn handle(_sig: libc::c_int) {
    STOP.store(true, Ordering::SeqCst);
}

/// Install the cooperative stop flag. SIGINT/SIGQUIT only stop the
/// process in test mode; when driven by a parent they are ignored so the
/// controlling terminal can't kill the controller underneath it.
pub fn install(testmode: bool) {
    let handler = handle as libc::sighandler_t;
    let interactive = if testmode { handler } else { libc::SIG_IGN };
    unsafe {
        libc::signal(libc::SIGHUP, handler);
        libc::signal(libc::SIGTERM, handler);
        libc::signal(libc::SIGPIPE, handler);
        libc::signal(libc::SIGINT, interactive);
        libc::signal(libc::SIGQUIT, interactive);
    }
}

/// Checked once per tick boundary by the polling loop.
pub fn stop_requested() -> bool {
    STOP.load(Ordering::SeqCst)
}
