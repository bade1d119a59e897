//! End-to-end checks against the running Linux kernel.

#![cfg(target_os = "linux")]

use std::net::TcpListener;
use std::os::fd::OwnedFd;
use std::process::{Command, Stdio};
use std::time::Duration;

use nix::unistd::Uid;
use portsight_core::{EngineConfig, OutcomeCategory, PlatformCommandInterface, Protocol};

fn interface() -> PlatformCommandInterface {
    PlatformCommandInterface::platform(&EngineConfig::default()).unwrap()
}

#[tokio::test]
async fn own_listener_is_reported() {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    let pid = std::process::id();

    let records = interface().list_ports(&[port], true).await.unwrap();
    let own = records
        .iter()
        .find(|r| r.pid == pid && r.protocol == Protocol::Tcp)
        .expect("listener owned by this test process");

    assert_eq!(own.port, port);
    assert!(own.is_listening());
    assert!(own.process_name.is_some());
    assert!(records.iter().all(|r| r.port == port));
}

#[tokio::test]
async fn all_ports_sorted_and_unique() {
    let _listener = TcpListener::bind("127.0.0.1:0").unwrap();

    let records = interface().list_all_ports().await.unwrap();
    assert!(!records.is_empty());
    assert!(records.windows(2).all(|pair| pair[0].key() < pair[1].key()));
}

#[tokio::test]
async fn force_termination_then_not_found() {
    let mut child = Command::new("sleep").arg("30").spawn().unwrap();
    let pid = child.id();
    let interface = interface();

    let outcome = interface.kill_process(pid, true).await;
    assert!(outcome.success, "{}", outcome.message);
    assert!(outcome.message.contains(&pid.to_string()));
    child.wait().unwrap();

    for _ in 0..2 {
        let outcome = interface.kill_process(pid, true).await;
        assert!(!outcome.success);
        assert_eq!(outcome.category(), OutcomeCategory::NotFound);
    }
}

#[tokio::test]
async fn force_killed_listener_leaves_port_list() {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();

    // The listening socket becomes the child's stdin; no copy stays here
    let mut command = Command::new("sleep");
    command.arg("30").stdin(Stdio::from(OwnedFd::from(listener)));
    let mut child = command.spawn().unwrap();
    drop(command);
    let pid = child.id();
    let interface = interface();

    let before = interface.list_all_ports().await.unwrap();
    assert!(
        before
            .iter()
            .any(|r| r.pid == pid && r.port == port && r.protocol == Protocol::Tcp && r.is_listening()),
        "listener of {} missing",
        pid
    );

    let outcome = interface.kill_process(pid, true).await;
    assert!(outcome.success, "{}", outcome.message);
    child.wait().unwrap();

    let after = interface.list_all_ports().await.unwrap();
    assert!(after.iter().all(|r| r.pid != pid));
    assert!(interface.list_ports(&[port], false).await.unwrap().is_empty());
}

#[tokio::test]
async fn foreign_process_is_permission_denied() {
    let own = Uid::effective();
    if own.is_root() {
        return;
    }
    // Only signal init when it belongs to another account
    match procfs::process::Process::new(1).and_then(|init| init.uid()) {
        Ok(owner) if owner != own.as_raw() => {}
        _ => return,
    }

    let outcome = interface().kill_process(1, false).await;
    assert!(!outcome.success);
    assert_eq!(outcome.category(), OutcomeCategory::PermissionDenied);
    assert_eq!(
        outcome.message,
        "Failed to terminate process 1 - permission denied. Try running with elevated privileges."
    );
}

#[tokio::test]
async fn graceful_termination_stops_sleep() {
    let mut child = Command::new("sleep").arg("30").spawn().unwrap();
    let pid = child.id();

    let outcome = interface().kill_process(pid, false).await;
    assert!(outcome.success, "{}", outcome.message);

    let status = tokio::time::timeout(Duration::from_secs(5), async {
        loop {
            if let Some(status) = child.try_wait().unwrap() {
                return status;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
    })
    .await
    .expect("sleep exits after SIGTERM");

    assert!(!status.success());
}

#[tokio::test]
async fn nonexistent_pid_is_not_found() {
    let outcome = interface().kill_process(u32::MAX, false).await;
    assert!(!outcome.success);
    assert_eq!(outcome.category(), OutcomeCategory::NotFound);
}
