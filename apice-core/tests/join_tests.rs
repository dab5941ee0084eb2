//! Integration tests for the join coordinator.

#![cfg(not(target_arch = "wasm32"))]

use apice_async::time::{sleep, Duration};
use apice_async::{task, Completion};
use apice_core::JoinCoordinator;
use std::cell::RefCell;
use std::future::{ready, Ready};
use std::rc::Rc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::layer::{Context, SubscriberExt};
use tracing_subscriber::Layer;

type Log = Rc<RefCell<Vec<String>>>;

fn push(log: &Log, entry: &str) {
    log.borrow_mut().push(entry.to_string());
}

/// Counts warnings emitted under the `apice::join` target.
#[derive(Clone, Default)]
struct WarnCounter {
    count: Arc<AtomicUsize>,
}

impl<S: Subscriber> Layer<S> for WarnCounter {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let metadata = event.metadata();
        if *metadata.level() == Level::WARN && metadata.target() == "apice::join" {
            self.count.fetch_add(1, Ordering::SeqCst);
        }
    }
}

#[apice_async::test]
async fn test_all_operations_succeed() {
    let log: Log = Rc::default();
    let join = JoinCoordinator::<String>::new();

    let mut reactions = Vec::new();
    for i in 0..3 {
        let delay = Duration::from_millis(3 * (3 - i));
        let derived = join
            .bind(Some(async move {
                sleep(delay).await;
                Ok::<_, String>(i)
            }))
            .unwrap();

        let sink = Rc::clone(&log);
        reactions.push(derived.then(move |value| push(&sink, &format!("op-{value}"))));
    }

    let sink = Rc::clone(&log);
    let aggregate = join.then(move || push(&sink, "aggregate"));
    let failed = join.catch(|e| panic!("no operation failed, got {e}"));

    aggregate.await.unwrap();
    failed.await.unwrap();

    let log = log.borrow();
    assert_eq!(log.len(), 4);
    assert_eq!(log.last().map(String::as_str), Some("aggregate"));
    assert_eq!(log.iter().filter(|e| *e == "aggregate").count(), 1);

    assert!(join.is_resolved());
    assert!(join.is_completed());
    assert!(!join.is_failed());
    assert_eq!((join.bound(), join.resolved(), join.failed()), (3, 3, 0));
}

#[apice_async::test]
async fn test_first_failure_wins() {
    let join = JoinCoordinator::<String>::new();

    join.bind(Some(async {
        sleep(Duration::from_millis(10)).await;
        Err::<(), _>("second".to_string())
    }));
    join.bind(Some(async {
        sleep(Duration::from_millis(2)).await;
        Err::<(), _>("first".to_string())
    }));
    join.bind(Some(async {
        sleep(Duration::from_millis(20)).await;
        Ok::<(), String>(())
    }));

    let seen: Rc<RefCell<Vec<String>>> = Rc::default();
    let sink = Rc::clone(&seen);
    let caught = join.catch(move |e| sink.borrow_mut().push(e));
    let skipped = join.then(|| panic!("aggregate must not resolve"));

    assert_eq!(join.wait().await, Err("first".to_string()));
    caught.await.unwrap();

    // Let the remaining operations settle; the outcome does not change
    sleep(Duration::from_millis(30)).await;
    skipped.await.unwrap();

    assert_eq!(*seen.borrow(), vec!["first".to_string()]);
    assert_eq!((join.bound(), join.resolved(), join.failed()), (3, 1, 2));
    assert!(join.is_failed());
    assert!(join.is_completed());
    assert!(!join.is_resolved());
    assert_eq!(join.outcome().peek(), Some(Err("first".to_string())));
}

#[apice_async::test]
async fn test_nothing_bound_never_settles() {
    let join = JoinCoordinator::<String>::new();
    let fired = Rc::new(RefCell::new(false));

    let flag = Rc::clone(&fired);
    join.then(move || *flag.borrow_mut() = true);
    let flag = Rc::clone(&fired);
    join.catch(move |_| *flag.borrow_mut() = true);

    for _ in 0..5 {
        task::next_turn().await;
    }
    sleep(Duration::from_millis(5)).await;

    assert!(!*fired.borrow());
    assert!(!join.is_bound());
    assert!(!join.is_completed());
    assert!(!join.is_resolved());
    assert!(!join.is_failed());
    assert!(join.outcome().is_pending());
}

#[test]
fn test_bind_without_operation_warns_once() {
    let counter = WarnCounter::default();
    let subscriber = tracing_subscriber::registry().with(counter.clone());

    tracing::subscriber::with_default(subscriber, || {
        let join = JoinCoordinator::<String>::new();
        let derived = join.bind(None::<Ready<Result<(), String>>>);

        assert!(derived.is_none());
        assert_eq!(join.bound(), 0);
        assert!(!join.is_bound());
    });

    assert_eq!(counter.count.load(Ordering::SeqCst), 1);
}

#[apice_async::test]
async fn test_aggregate_reaction_runs_after_operation_reactions() {
    let log: Log = Rc::default();
    let join = JoinCoordinator::<String>::new();

    let sink = Rc::clone(&log);
    let derived = join
        .bind(Some(async move {
            push(&sink, "P1-callback");
            Ok::<_, String>(())
        }))
        .unwrap();

    let sink = Rc::clone(&log);
    derived.then(move |()| push(&sink, "P1.then-reaction"));
    let sink = Rc::clone(&log);
    let aggregate = join.then(move || push(&sink, "coordinator.then-reaction"));

    aggregate.await.unwrap();

    assert_eq!(
        *log.borrow(),
        vec![
            "P1-callback".to_string(),
            "P1.then-reaction".to_string(),
            "coordinator.then-reaction".to_string(),
        ]
    );
}

#[apice_async::test]
async fn test_mixed_outcome_counts_both() {
    let log: Log = Rc::default();
    let join = JoinCoordinator::<String>::new();

    let sink = Rc::clone(&log);
    let p1 = join
        .bind(Some(async move {
            push(&sink, "P1-callback");
            Ok::<_, String>(())
        }))
        .unwrap();
    let sink = Rc::clone(&log);
    let p2 = join
        .bind(Some(async move {
            push(&sink, "P2-callback");
            Err::<(), _>("cause".to_string())
        }))
        .unwrap();

    let sink = Rc::clone(&log);
    p1.then(move |()| push(&sink, "P1.then-reaction"));
    let sink = Rc::clone(&log);
    p2.catch(move |e| push(&sink, &format!("P2.catch-reaction:{e}")));
    let sink = Rc::clone(&log);
    let aggregate = join.catch(move |e| push(&sink, &format!("coordinator.catch-reaction:{e}")));

    aggregate.await.unwrap();

    let log = log.borrow();
    assert_eq!(log.len(), 5);
    assert_eq!(
        log.last().map(String::as_str),
        Some("coordinator.catch-reaction:cause")
    );
    assert!(log.contains(&"P2.catch-reaction:cause".to_string()));

    assert!(join.is_failed());
    assert!(!join.is_resolved());
    assert_eq!((join.bound(), join.resolved(), join.failed()), (2, 1, 1));
    assert_eq!(p2.peek(), Some(Err("cause".to_string())));
}

#[apice_async::test]
async fn test_derived_handle_sees_updated_counters() {
    let join = JoinCoordinator::<String>::new();
    let derived = join
        .bind(Some(async { Ok::<_, String>("value") }))
        .unwrap();

    assert_eq!(join.bound(), 1);
    assert_eq!(join.resolved(), 0);

    assert_eq!(derived.wait().await, Ok("value"));
    assert_eq!(join.resolved(), 1);
    assert!(join.is_completed());
}

#[apice_async::test]
async fn test_nested_bind_keeps_aggregate_open() {
    let join = JoinCoordinator::<String>::new();
    let inner_done: Completion<(), String> = Completion::new();

    let nested = join.clone();
    let done = inner_done.clone();
    join.bind(Some(async move {
        nested.bind(Some(async move {
            sleep(Duration::from_millis(10)).await;
            done.resolve(());
            Ok::<_, String>(())
        }));
        Ok::<_, String>(())
    }));

    assert_eq!(join.wait().await, Ok(()));
    assert!(inner_done.is_resolved());
    assert_eq!((join.bound(), join.resolved(), join.failed()), (2, 2, 0));
}

#[apice_async::test]
async fn test_bind_from_derived_reaction_keeps_aggregate_open() {
    let join = JoinCoordinator::<String>::new();
    let follow_up_done: Completion<(), String> = Completion::new();

    // The first operation resolving schedules the aggregate for the next
    // turn; its derived reaction binds more work before that turn comes.
    let first = join.bind(Some(ready(Ok::<_, String>(())))).unwrap();
    let nested = join.clone();
    let done = follow_up_done.clone();
    first.then(move |()| {
        nested.bind(Some(async move {
            sleep(Duration::from_millis(10)).await;
            done.resolve(());
            Ok::<_, String>(())
        }));
    });

    assert_eq!(join.wait().await, Ok(()));
    assert!(follow_up_done.is_resolved());
    assert_eq!((join.bound(), join.resolved(), join.failed()), (2, 2, 0));
}

#[apice_async::test]
async fn test_late_bind_is_counted_only() {
    let join = JoinCoordinator::<String>::new();
    join.bind(Some(ready(Ok::<(), String>(()))));
    assert_eq!(join.wait().await, Ok(()));

    let late = join
        .bind(Some(ready(Err::<(), _>("too late".to_string()))))
        .unwrap();
    assert_eq!(late.wait().await, Err("too late".to_string()));

    // Give the deferred rejection a chance to run
    task::next_turn().await;
    task::next_turn().await;

    assert_eq!(join.bound(), 2);
    assert_eq!(join.failed(), 1);
    assert!(join.is_failed());
    assert_eq!(join.outcome().peek(), Some(Ok(())));
}
