#![allow(dead_code)]

use std::io::Write;
use std::net::{SocketAddr, TcpStream};
use std::thread;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};

pub const WAIT_TIMEOUT: Duration = Duration::from_secs(5);

/// One-shot send: connect, write the whole message, close.
pub fn send(addr: SocketAddr, message: &str) -> Result<()> {
    let mut stream =
        TcpStream::connect(addr).with_context(|| format!("connect to pose link at {addr}"))?;
    stream
        .write_all(message.as_bytes())
        .with_context(|| format!("write {message:?}"))?;
    Ok(())
}

/// Poll `condition` until it holds or the timeout elapses.
pub fn wait_until(mut condition: impl FnMut() -> bool) -> bool {
    let deadline = Instant::now() + WAIT_TIMEOUT;
    while Instant::now() < deadline {
        if condition() {
            return true;
        }
        thread::sleep(Duration::from_millis(5));
    }
    condition()
}
