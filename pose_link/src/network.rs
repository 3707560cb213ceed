use std::io::{self, Read};
use std::net::{SocketAddr, TcpListener, TcpStream};
use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use bevy::prelude::Resource;
use thiserror::Error;
use tracing::{debug, error, info, warn};

use crate::config::LinkConfig;
use crate::queue::{MessageQueue, RawMessage};

const LISTENER_THREAD_NAME: &str = "pose-link-listener";

#[derive(Debug, Error)]
pub enum ListenerError {
    #[error("failed to bind pose listener at {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        #[source]
        source: io::Error,
    },
    #[error("failed to configure pose listener socket: {0}")]
    Socket(#[source] io::Error),
    #[error("failed to spawn pose listener thread: {0}")]
    Spawn(#[source] io::Error),
}

/// Lifecycle of the listener thread.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListenerState {
    Stopped,
    Binding,
    Polling,
    Accepting,
    Reading,
    Enqueuing,
    ShuttingDown,
}

impl ListenerState {
    fn from_u8(value: u8) -> Self {
        match value {
            1 => ListenerState::Binding,
            2 => ListenerState::Polling,
            3 => ListenerState::Accepting,
            4 => ListenerState::Reading,
            5 => ListenerState::Enqueuing,
            6 => ListenerState::ShuttingDown,
            _ => ListenerState::Stopped,
        }
    }
}

#[derive(Debug, Clone, Default)]
struct SharedState(Arc<AtomicU8>);

impl SharedState {
    fn set(&self, state: ListenerState) {
        self.0.store(state as u8, Ordering::Release);
    }

    fn get(&self) -> ListenerState {
        ListenerState::from_u8(self.0.load(Ordering::Acquire))
    }
}

#[derive(Debug, Clone, Copy)]
struct ListenerSettings {
    poll_interval: Duration,
    read_timeout: Duration,
    read_buffer_bytes: usize,
    accept_error_backoff: Duration,
}

impl From<&LinkConfig> for ListenerSettings {
    fn from(config: &LinkConfig) -> Self {
        Self {
            poll_interval: config.poll_interval(),
            read_timeout: config.read_timeout(),
            read_buffer_bytes: config.read_buffer_bytes(),
            accept_error_backoff: config.accept_error_backoff(),
        }
    }
}

/// Owner of the listener thread. Dropping the handle stops and joins it.
#[derive(Resource, Debug)]
pub struct ListenerHandle {
    local_addr: SocketAddr,
    running: Arc<AtomicBool>,
    state: SharedState,
    thread: Option<JoinHandle<()>>,
}

impl ListenerHandle {
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    pub fn state(&self) -> ListenerState {
        self.state.get()
    }

    pub fn is_running(&self) -> bool {
        self.thread.is_some()
    }

    /// Signal the listener to exit and wait for it. The socket is released
    /// once this returns.
    pub fn stop(&mut self) {
        self.running.store(false, Ordering::Release);
        let Some(thread) = self.thread.take() else {
            return;
        };
        if thread.join().is_err() {
            error!(
                target: "pose_link::listener",
                addr = %self.local_addr,
                "listener.thread_panicked"
            );
            self.state.set(ListenerState::Stopped);
        }
    }
}

impl Drop for ListenerHandle {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Bind the configured address and spawn the listener thread feeding `queue`.
pub fn start_listener(
    config: &LinkConfig,
    queue: MessageQueue,
) -> Result<ListenerHandle, ListenerError> {
    let state = SharedState::default();
    state.set(ListenerState::Binding);

    let listener = TcpListener::bind(config.bind).map_err(|source| ListenerError::Bind {
        addr: config.bind,
        source,
    })?;
    listener
        .set_nonblocking(true)
        .map_err(ListenerError::Socket)?;
    let local_addr = listener.local_addr().map_err(ListenerError::Socket)?;

    let running = Arc::new(AtomicBool::new(true));
    let settings = ListenerSettings::from(config);
    let socket = BoundSocket {
        listener: Some(listener),
        local_addr,
        state: state.clone(),
    };
    let thread_running = Arc::clone(&running);
    let thread = thread::Builder::new()
        .name(LISTENER_THREAD_NAME.to_string())
        .spawn(move || run_listener(socket, settings, queue, thread_running))
        .map_err(ListenerError::Spawn)?;

    info!(
        target: "pose_link::listener",
        addr = %local_addr,
        "listener.bound"
    );

    Ok(ListenerHandle {
        local_addr,
        running,
        state,
        thread: Some(thread),
    })
}

/// Closes the listening socket on every exit path of the thread, unwinding
/// included.
struct BoundSocket {
    listener: Option<TcpListener>,
    local_addr: SocketAddr,
    state: SharedState,
}

impl Drop for BoundSocket {
    fn drop(&mut self) {
        drop(self.listener.take());
        self.state.set(ListenerState::Stopped);
        info!(
            target: "pose_link::listener",
            addr = %self.local_addr,
            "listener.closed"
        );
    }
}

fn run_listener(
    socket: BoundSocket,
    settings: ListenerSettings,
    queue: MessageQueue,
    running: Arc<AtomicBool>,
) {
    let Some(listener) = socket.listener.as_ref() else {
        return;
    };
    let state = &socket.state;
    state.set(ListenerState::Polling);

    while running.load(Ordering::Acquire) {
        match listener.accept() {
            Ok((stream, peer)) => {
                handle_connection(stream, peer, &settings, &queue, state);
                state.set(ListenerState::Polling);
            }
            Err(ref err) if err.kind() == io::ErrorKind::WouldBlock => {
                thread::sleep(settings.poll_interval);
            }
            Err(err) => {
                warn!(
                    target: "pose_link::listener",
                    error = %err,
                    "listener.accept_failed"
                );
                thread::sleep(settings.accept_error_backoff);
            }
        }
    }

    state.set(ListenerState::ShuttingDown);
}

fn handle_connection(
    stream: TcpStream,
    peer: SocketAddr,
    settings: &ListenerSettings,
    queue: &MessageQueue,
    state: &SharedState,
) {
    state.set(ListenerState::Accepting);
    let received = match prepare_stream(&stream, settings) {
        Ok(()) => {
            state.set(ListenerState::Reading);
            read_message(stream, settings.read_buffer_bytes)
        }
        Err(err) => Err(err),
    };

    match received {
        Ok(Some(received)) => {
            state.set(ListenerState::Enqueuing);
            if received.truncated {
                warn!(
                    target: "pose_link::listener",
                    %peer,
                    limit = settings.read_buffer_bytes,
                    "listener.read_truncated"
                );
            }
            debug!(
                target: "pose_link::listener",
                %peer,
                bytes = received.text.len(),
                "listener.message_received"
            );
            queue.enqueue(RawMessage::new(received.text).with_peer(peer));
        }
        Ok(None) => {
            debug!(
                target: "pose_link::listener",
                %peer,
                "listener.empty_connection"
            );
        }
        Err(err) => {
            warn!(
                target: "pose_link::listener",
                %peer,
                error = %err,
                "listener.read_failed"
            );
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct ReceivedText {
    text: String,
    /// The read filled the whole buffer, so the sender may have been cut off.
    truncated: bool,
}

fn prepare_stream(stream: &TcpStream, settings: &ListenerSettings) -> io::Result<()> {
    // Accepted sockets inherit non-blocking mode on some platforms.
    stream.set_nonblocking(false)?;
    stream.set_read_timeout(Some(settings.read_timeout))
}

/// One read of at most `limit` bytes; the stream is closed on return.
fn read_message(mut stream: TcpStream, limit: usize) -> io::Result<Option<ReceivedText>> {
    let mut buffer = vec![0u8; limit];
    let read = stream.read(&mut buffer)?;
    if read == 0 {
        return Ok(None);
    }
    Ok(Some(ReceivedText {
        text: String::from_utf8_lossy(&buffer[..read]).into_owned(),
        truncated: read == buffer.len(),
    }))
}
