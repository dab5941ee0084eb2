//! Integration tests for the modal scheduler.

#![cfg(not(target_arch = "wasm32"))]

use apice_async::task;
use apice_core::{ModalScheduler, Release};
use std::cell::RefCell;
use std::rc::Rc;

#[apice_async::test]
async fn test_requests_are_granted_in_fifo_order() {
    let modal = ModalScheduler::new();

    let a = modal.acquire("A");
    assert!(a.is_granted());

    let b = modal.acquire("B");
    let c = modal.acquire("C");
    assert!(!b.is_granted());
    assert!(!c.is_granted());
    assert_eq!(modal.queued(), vec!["B", "C"]);

    assert_eq!(modal.release(&"A"), Release::Released { next: Some("B") });
    assert!(b.is_granted());
    assert!(!c.is_granted());
    assert_eq!(modal.owner(), Some("B"));

    assert_eq!(modal.release(&"B"), Release::Released { next: Some("C") });
    assert!(c.is_granted());
    assert_eq!(modal.owner(), Some("C"));

    assert_eq!(modal.release(&"C"), Release::Released { next: None });
    assert_eq!(modal.owner(), None);
    assert_eq!(modal.queue_len(), 0);
}

#[apice_async::test]
async fn test_waiters_resume_one_at_a_time() {
    let modal = ModalScheduler::new();
    let log = Rc::new(RefCell::new(Vec::new()));
    modal.acquire("A");

    let mut handles = Vec::new();
    for name in ["B", "C"] {
        let grant = modal.acquire(name);
        let scheduler = modal.clone();
        let log = Rc::clone(&log);
        handles.push(task::spawn_local(async move {
            grant.wait().await;
            log.borrow_mut().push(format!("{name} granted"));
            // Nobody else may own the resource while we do
            assert_eq!(scheduler.owner(), Some(name));
            task::next_turn().await;
            log.borrow_mut().push(format!("{name} released"));
            scheduler.release(&name);
        }));
    }

    task::next_turn().await;
    assert!(log.borrow().is_empty());

    modal.release(&"A");
    for handle in handles {
        handle.await.unwrap();
    }

    assert_eq!(
        *log.borrow(),
        vec!["B granted", "B released", "C granted", "C released"]
    );
    assert_eq!(modal.owner(), None);
}

#[test]
fn test_owner_acquire_is_idempotent() {
    let modal = ModalScheduler::new();
    modal.acquire("A");

    let again = modal.acquire("A");
    assert!(again.is_granted());
    assert_eq!(modal.owner(), Some("A"));
    assert_eq!(modal.queue_len(), 0);
    assert!(!modal.is_queued(&"A"));
}

#[test]
fn test_withdrawn_request_is_skipped() {
    let modal = ModalScheduler::new();
    modal.acquire("A");
    let b = modal.acquire("B");
    let c = modal.acquire("C");

    assert_eq!(modal.release(&"B"), Release::Withdrawn);
    assert!(!modal.is_queued(&"B"));

    assert_eq!(modal.release(&"A"), Release::Released { next: Some("C") });
    assert!(c.is_granted());
    assert!(!b.is_granted());
}

#[test]
fn test_independent_schedulers_do_not_interact() {
    let left = ModalScheduler::new();
    let right = ModalScheduler::new();

    assert!(left.acquire(1).is_granted());
    assert!(right.acquire(2).is_granted());
    assert!(left.is_owner(&1));
    assert!(!left.is_owner(&2));
}
