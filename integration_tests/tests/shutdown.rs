mod common;

use std::net::TcpStream;
use std::time::{Duration, Instant};

use pose_link::{
    start_listener, LinkConfig, ListenerState, MessageQueue, PoseLink, RawMessage,
};

#[test]
fn stop_joins_quickly_and_frees_the_port() {
    let mut link = PoseLink::start(&LinkConfig::ephemeral());
    let addr = link.local_addr().unwrap();
    assert!(common::wait_until(|| link.listener_state() == ListenerState::Polling));

    let started = Instant::now();
    link.stop();
    assert!(started.elapsed() < Duration::from_secs(1));
    assert_eq!(link.listener_state(), ListenerState::Stopped);

    let mut rebound = PoseLink::start(&LinkConfig::ephemeral().with_bind(addr));
    assert!(rebound.is_listening());
    assert_eq!(rebound.local_addr(), Some(addr));
    rebound.stop();
}

#[test]
fn silent_client_cannot_hold_shutdown_past_read_timeout() {
    let config = LinkConfig {
        read_timeout_ms: 200,
        ..LinkConfig::ephemeral()
    };
    let mut handle = start_listener(&config, MessageQueue::new()).unwrap();

    let _idle = TcpStream::connect(handle.local_addr()).unwrap();
    assert!(common::wait_until(|| handle.state() == ListenerState::Reading));

    let started = Instant::now();
    handle.stop();
    assert!(started.elapsed() < Duration::from_secs(2));
    assert_eq!(handle.state(), ListenerState::Stopped);
}

#[test]
fn listener_survives_an_empty_connection() -> anyhow::Result<()> {
    let queue = MessageQueue::new();
    let mut handle = start_listener(&LinkConfig::ephemeral(), queue.clone())?;
    let addr = handle.local_addr();

    drop(TcpStream::connect(addr)?);
    common::send(addr, "SET_POSITION 1,1,1")?;
    assert!(common::wait_until(|| !queue.is_empty()));
    assert_eq!(
        queue.try_dequeue().map(RawMessage::into_text),
        Some("SET_POSITION 1,1,1".to_string())
    );

    handle.stop();
    Ok(())
}

#[test]
fn silent_client_only_delays_the_next_message() -> anyhow::Result<()> {
    let config = LinkConfig {
        read_timeout_ms: 100,
        ..LinkConfig::ephemeral()
    };
    let queue = MessageQueue::new();
    let mut handle = start_listener(&config, queue.clone())?;
    let addr = handle.local_addr();

    let _idle = TcpStream::connect(addr)?;
    assert!(common::wait_until(|| handle.state() == ListenerState::Reading));

    common::send(addr, "SET_POSITION 1,1,1")?;
    assert!(common::wait_until(|| !queue.is_empty()));
    assert_eq!(
        queue.try_dequeue().map(RawMessage::into_text),
        Some("SET_POSITION 1,1,1".to_string())
    );

    handle.stop();
    Ok(())
}
