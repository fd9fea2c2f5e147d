//! Future E2E test suite: completion, composition and cancellation across
//! threads.
//!
//! - **Single assignment**: racing completers, idempotent observation
//! - **Listener protocol**: registrations racing completion are never lost
//! - **Combinators**: transform, fallback, checked conversion, combine
//! - **Cancellation**: propagates upstream, never downstream by itself

mod common;

use common::*;
use fluent_future::combinator::{combine, combine_on};
use fluent_future::futures::{immediate, submit};
use fluent_future::{
    ErrorKind, Executor, Failure, FluentFuture, FutureTask, Promise, SpawnerConfig, ThreadSpawner,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{mpsc, Arc, Barrier};
use std::thread;
use std::time::Duration;

fn spawner() -> Executor {
    let config = SpawnerConfig::new().thread_name_prefix("e2e");
    Executor::new(ThreadSpawner::with_config(config).expect("valid config"))
}

#[test]
fn e2e_task_pipeline_on_spawned_threads() {
    init_test_logging();
    test_phase!("e2e_task_pipeline_on_spawned_threads");
    let pool = spawner();
    let parsed = submit(&pool, || "41".parse::<i32>())
        .transform_on(&pool, |v| v + 1)
        .transform_async_on(&pool, {
            let pool = pool.clone();
            move |v| Ok::<_, Failure>(submit(&pool, move || Ok::<_, Failure>(format!("answer={v}"))))
        });
    assert_eq!(parsed.get().expect("pipeline"), "answer=42");
    test_complete!("e2e_task_pipeline_on_spawned_threads");
}

#[test]
fn e2e_parse_error_recovered_by_fallback() {
    init_test_logging();
    let pool = spawner();
    let value = submit(&pool, || "not a number".parse::<i32>())
        .transform(|v| v * 2)
        .with_fallback(|failure| {
            if failure.downcast_ref::<std::num::ParseIntError>().is_some() {
                Ok(-1)
            } else {
                Err(failure)
            }
        });
    assert_eq!(value.get().expect("recovered"), -1);
}

#[test]
fn e2e_get_is_idempotent_across_threads() {
    let promise = Promise::new();
    promise.set(String::from("stable"));
    let future = promise.future();
    let readers: Vec<_> = (0..8)
        .map(|_| {
            let future = future.clone();
            thread::spawn(move || future.get().expect("value"))
        })
        .collect();
    for reader in readers {
        assert_eq!(reader.join().expect("reader thread"), "stable");
    }
    assert!(!promise.set(String::from("other")));
    assert_eq!(future.get().expect("value"), "stable");
}

#[test]
fn e2e_listener_registration_races_completion() {
    init_test_logging();
    test_phase!("e2e_listener_registration_races_completion");
    for round in 0..50 {
        let task = FutureTask::new(move || Ok::<_, Failure>(round));
        let future = task.future();
        let fired = Arc::new(AtomicUsize::new(0));
        let barrier = Arc::new(Barrier::new(4));
        let registrars: Vec<_> = (0..3)
            .map(|_| {
                let future = future.clone();
                let fired = Arc::clone(&fired);
                let barrier = Arc::clone(&barrier);
                thread::spawn(move || {
                    barrier.wait();
                    for _ in 0..20 {
                        let fired = Arc::clone(&fired);
                        future.add_listener(
                            move || {
                                fired.fetch_add(1, Ordering::SeqCst);
                            },
                            &Executor::INLINE,
                        );
                    }
                })
            })
            .collect();
        barrier.wait();
        task.run();
        for registrar in registrars {
            registrar.join().expect("registrar thread");
        }
        assert_eq!(fired.load(Ordering::SeqCst), 60, "round {round}");
    }
    test_complete!("e2e_listener_registration_races_completion");
}

#[test]
fn e2e_listeners_fire_in_registration_order() {
    let promise = Promise::new();
    let future = promise.future();
    let order = Arc::new(parking_lot::Mutex::new(Vec::new()));
    for id in 0..5 {
        let order = Arc::clone(&order);
        future.add_listener(move || order.lock().push(id), &Executor::INLINE);
    }
    promise.set(());
    assert_eq!(*order.lock(), vec![0, 1, 2, 3, 4]);
}

#[test]
fn e2e_combine_completion_order_f2_f1_f3() {
    init_test_logging();
    test_phase!("e2e_combine_completion_order_f2_f1_f3");
    let (f1, f2, f3) = (Promise::new(), Promise::new(), Promise::new());
    let all = combine([f1.future(), f2.future(), f3.future()]);
    let writers = [(f2, "b", 0_u64), (f1, "a", 10), (f3, "c", 20)];
    let handles: Vec<_> = writers
        .into_iter()
        .map(|(promise, value, delay)| {
            thread::spawn(move || {
                thread::sleep(Duration::from_millis(delay));
                promise.set(value)
            })
        })
        .collect();
    assert_eq!(all.get().expect("combined"), vec!["a", "b", "c"]);
    for handle in handles {
        assert!(handle.join().expect("writer thread"));
    }
    test_complete!("e2e_combine_completion_order_f2_f1_f3");
}

#[test]
fn e2e_combine_fails_without_waiting() {
    let f1 = Promise::<u8>::new();
    let f2 = Promise::<u8>::new();
    let all = combine([f1.future(), f2.future()]);
    let (tx, rx) = mpsc::channel();
    all.on_failure(move |failure| tx.send(failure.to_string()).expect("test alive"));
    let writer = thread::spawn(move || f1.set_failure(Failure::msg("E")));
    let err = all
        .get_timeout(Duration::from_secs(5))
        .expect_err("aggregate failed");
    assert_eq!(err.kind(), ErrorKind::Execution);
    assert_eq!(rx.recv().expect("callback ran"), "E");
    assert!(writer.join().expect("writer thread"));
    assert!(!f2.is_done());
}

#[test]
fn e2e_combine_of_submitted_tasks() {
    let pool = spawner();
    let manual = ManualExecutor::new();
    let inputs: Vec<FluentFuture<usize>> = (0..16)
        .map(|i| {
            submit(&pool, move || {
                thread::sleep(Duration::from_millis(((16 - i) % 5) as u64));
                Ok::<_, Failure>(i * i)
            })
        })
        .collect();
    let all = combine_on(inputs, &manual.executor());
    while !all.is_done() {
        manual.run_all();
        thread::yield_now();
    }
    let expected: Vec<usize> = (0..16).map(|i| i * i).collect();
    assert_eq!(all.get().expect("combined"), expected);
}

#[test]
fn e2e_get_timeout_then_later_completion() {
    let task = FutureTask::new(|| Ok::<_, Failure>(5));
    let future = task.future();
    let err = future
        .get_timeout(Duration::from_millis(20))
        .expect_err("not yet run");
    assert!(err.is_timeout());
    assert!(!future.is_done());
    let runner = thread::spawn(move || task.run());
    assert_eq!(future.get().expect("completed later"), 5);
    runner.join().expect("runner thread");
}

#[test]
fn e2e_cancel_derived_cancels_source_task() {
    init_test_logging();
    test_phase!("e2e_cancel_derived_cancels_source_task");
    let (started_tx, started_rx) = mpsc::channel();
    let task = FutureTask::interruptible(move |token: &fluent_future::CancelToken| {
        started_tx.send(()).expect("test alive");
        while !token.is_cancelled() {
            thread::sleep(Duration::from_millis(1));
        }
        Ok::<_, Failure>(0)
    });
    let derived = task.future().transform(|v: i32| v + 1).transform(|v| v * 2);
    let runner = {
        let task = task.clone();
        thread::spawn(move || task.run())
    };
    started_rx.recv().expect("task started");
    assert!(derived.cancel());
    runner.join().expect("runner thread");
    assert!(task.is_cancelled());
    assert!(derived.get().expect_err("cancelled").is_cancelled());
    test_complete!("e2e_cancel_derived_cancels_source_task");
}

#[test]
fn e2e_sibling_cancelled_only_through_source() {
    let source = Promise::<u8>::new();
    let left = source.future().transform(|v| v + 1);
    let right = source.future().transform(|v| v + 2);
    assert!(left.cancel());
    assert!(source.future().is_cancelled());
    assert!(right.is_cancelled(), "source cancellation reaches every derived future");

    let source = Promise::<u8>::new();
    let left = source.future().transform(|v| v + 1);
    let right = source.future().transform(|v| v + 2);
    source.set(1);
    assert!(!left.cancel());
    assert_eq!(right.get().expect("unaffected"), 3);
}

#[test]
fn e2e_checked_accessors_with_domain_error() {
    #[derive(Debug, PartialEq, Eq)]
    enum Fetch {
        Failed(String),
        Cancelled,
        TimedOut,
    }

    let task = FutureTask::<u32>::new(|| Err(Failure::msg("connection reset")));
    let checked = task.future().make_checked(|err| match err.kind() {
        ErrorKind::Cancelled => Fetch::Cancelled,
        ErrorKind::Timeout => Fetch::TimedOut,
        ErrorKind::Execution => Fetch::Failed(
            err.cause()
                .map_or_else(String::new, ToString::to_string),
        ),
    });
    assert_eq!(
        checked.checked_get_timeout(Duration::from_millis(5)),
        Err(Fetch::TimedOut)
    );
    task.run();
    assert_eq!(
        checked.checked_get(),
        Err(Fetch::Failed("connection reset".to_owned()))
    );
}

#[test]
fn e2e_async_bridge_on_spawned_thread() {
    let pool = spawner();
    let future = submit(&pool, || Ok::<_, Failure>(7)).transform(|v| v * 6);
    let value = futures_lite::future::block_on(future.wait()).expect("awaited");
    assert_eq!(value, 42);
    assert_eq!(
        futures_lite::future::block_on(immediate("ready").wait()).expect("ready"),
        "ready"
    );
}

#[test]
fn e2e_folded_async_chain_completes_inline() {
    init_test_logging();
    test_phase!("e2e_folded_async_chain_completes_inline");
    let source = Promise::new();
    let steps: Vec<u64> = (1..=5_000).collect();
    let total = steps.iter().fold(source.future(), |acc, &step| {
        acc.transform_async(move |v: u64| Ok::<_, Failure>(immediate(v + step)))
    });
    let worker = thread::spawn(move || source.set(0));
    assert!(worker.join().expect("completing thread"));
    assert_eq!(total.get().expect("folded"), 5_000 * 5_001 / 2);
    test_complete!("e2e_folded_async_chain_completes_inline");
}
