// In-session keyboard control
// Maps console keys onto the aggregator: "r" resets the counts, "q" asks
// every loop to exit via the shared shutdown flag.

use std::io::BufRead;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use crate::session::SessionAggregator;

/// Apply one console command. Returns false on unrecognized input.
pub fn handle_command(line: &str, aggregator: &SessionAggregator, shutdown: &AtomicBool) -> bool {
    match line.trim() {
        "r" | "reset" => {
            aggregator.reset();
            true
        }
        "q" | "quit" => {
            log::info!("quit requested from console");
            shutdown.store(true, Ordering::SeqCst);
            true
        }
        "" => true,
        other => {
            log::debug!("ignoring console input {:?}", other);
            false
        }
    }
}

/// Read console commands until shutdown. The thread blocks on stdin, so it
/// is left detached; the process exits without joining it.
pub fn spawn_control(aggregator: Arc<SessionAggregator>, shutdown: Arc<AtomicBool>) -> JoinHandle<()> {
    thread::spawn(move || {
        let stdin = std::io::stdin();
        for line in stdin.lock().lines() {
            let Ok(line) = line else { break };
            handle_command(&line, &aggregator, &shutdown);
            if shutdown.load(Ordering::SeqCst) {
                break;
            }
        }
    })
}
