//! Heartbeat emitter.

use std::thread;
use std::time::Duration;

/// Emits one heartbeat per `interval`. `count == 0` never returns.
pub fn run(name: &str, interval: Duration, count: u64) {
    let mut beat: u64 = 0;
    loop {
        beat += 1;
        heartbeat(name, beat);
        if count != 0 && beat >= count {
            break;
        }
        thread::sleep(interval);
    }
}

pub fn heartbeat(name: &str, beat: u64) {
    tracing::info!(name, beat, "hello logger");
    tracing::error!(beat, "got error");
}
