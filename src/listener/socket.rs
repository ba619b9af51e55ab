// Wearable symbol listener (protocol a)
// Stateful two-symbol stream over TCP: "1" arms, "0" while armed counts one
// external rep. Accept and read are bounded by short timeouts so a stalled
// peer can never starve the counting loops, and unrecognized bytes are
// dropped rather than interpreted.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::io::AsyncReadExt;
use tokio::net::{TcpListener, TcpStream};
use tokio::time::timeout;

use crate::detector::EdgeTrigger;
use crate::session::{RepEvent, RepSource, SessionAggregator};

/// Upper bound on waiting for a peer before re-checking shutdown
const ACCEPT_TIMEOUT: Duration = Duration::from_millis(250);

/// Upper bound on a single read from a connected peer
const READ_TIMEOUT: Duration = Duration::from_millis(500);

/// Serve the symbol protocol until the shutdown flag is set.
/// One peer connection at a time; a new peer is accepted after the
/// previous one disconnects.
pub async fn serve(
    listener: TcpListener,
    aggregator: Arc<SessionAggregator>,
    debounce: Duration,
    shutdown: Arc<AtomicBool>,
) {
    if let Ok(addr) = listener.local_addr() {
        log::info!("wearable symbol listener on {}", addr);
    }

    let mut trigger = EdgeTrigger::new(debounce);
    let mut epoch = aggregator.epoch();

    while !shutdown.load(Ordering::SeqCst) {
        let (stream, peer) = match timeout(ACCEPT_TIMEOUT, listener.accept()).await {
            Ok(Ok(conn)) => conn,
            Ok(Err(e)) => {
                log::warn!("accept failed: {}", e);
                continue;
            }
            // Timed out: loop around to observe shutdown
            Err(_) => continue,
        };

        log::info!("wearable connected from {}", peer);
        read_peer(stream, &aggregator, &mut trigger, &mut epoch, &shutdown).await;
        log::info!("wearable disconnected");
    }
}

/// Pump one peer's symbol stream until it disconnects or shutdown
async fn read_peer(
    mut stream: TcpStream,
    aggregator: &SessionAggregator,
    trigger: &mut EdgeTrigger,
    epoch: &mut u64,
    shutdown: &AtomicBool,
) {
    let mut buf = [0u8; 64];

    while !shutdown.load(Ordering::SeqCst) {
        // A session reset invalidates any armed state from this peer
        let current = aggregator.epoch();
        if current != *epoch {
            *epoch = current;
            trigger.clear();
        }

        let n = match timeout(READ_TIMEOUT, stream.read(&mut buf)).await {
            Ok(Ok(0)) => return,
            Ok(Ok(n)) => n,
            Ok(Err(e)) => {
                log::warn!("read from wearable failed: {}", e);
                return;
            }
            // Idle peer: re-check shutdown and keep the connection open
            Err(_) => continue,
        };

        for &byte in &buf[..n] {
            match byte {
                b'1' => trigger.arm(),
                b'0' => {
                    let now = Instant::now();
                    if trigger.release(now) {
                        aggregator.record(&RepEvent::new(RepSource::External, now));
                    }
                }
                // Line framing from the device
                b'\r' | b'\n' | b' ' => {}
                other => {
                    log::debug!("dropping unrecognized symbol 0x{:02x}", other);
                }
            }
        }
    }
}
