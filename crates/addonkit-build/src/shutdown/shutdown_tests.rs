#![allow(non_snake_case)]

use super::*;
use std::time::Duration;

// ShutdownHandle tests

#[test]
fn ShutdownHandle___new___not_triggered() {
    let handle = ShutdownHandle::new();

    assert!(!handle.is_triggered());
}

#[test]
fn ShutdownHandle___trigger___idempotent() {
    let handle = ShutdownHandle::new();

    handle.trigger();
    handle.trigger();

    assert!(handle.is_triggered());
}

#[test]
fn ShutdownHandle___trigger_without_signals___still_recorded() {
    let handle = ShutdownHandle::default();

    handle.trigger();

    assert!(handle.is_triggered());
    assert!(handle.signal().is_triggered());
}

// ShutdownSignal tests

#[test]
fn ShutdownSignal___clone___shares_triggered_state() {
    let handle = ShutdownHandle::new();
    let signal = handle.signal();
    let cloned = signal.clone();

    handle.trigger();

    assert!(signal.is_triggered());
    assert!(cloned.is_triggered());
}

#[tokio::test]
async fn ShutdownSignal___wait___blocks_until_triggered() {
    let handle = ShutdownHandle::new();
    let mut signal = handle.signal();

    let trigger = handle.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(10)).await;
        trigger.trigger();
    });

    tokio::time::timeout(Duration::from_secs(5), signal.wait())
        .await
        .unwrap();

    assert!(signal.is_triggered());
}

#[tokio::test]
async fn ShutdownSignal___wait___returns_immediately_if_already_triggered() {
    let handle = ShutdownHandle::new();
    handle.trigger();
    let mut signal = handle.signal();

    tokio::time::timeout(Duration::from_millis(50), signal.wait())
        .await
        .unwrap();
}

#[tokio::test]
async fn ShutdownSignal___wait___returns_when_handles_dropped() {
    let handle = ShutdownHandle::new();
    let mut signal = handle.signal();
    drop(handle);

    tokio::time::timeout(Duration::from_millis(50), signal.wait())
        .await
        .unwrap();

    assert!(!signal.is_triggered());
}
