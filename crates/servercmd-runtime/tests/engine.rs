//! Integration tests for the execution engine.

use std::time::{Duration, Instant};

use servercmd_models::{ExecutionId, ExecutionState, InvocationStatus};
use servercmd_runtime::{
    ArgumentSpec, CommandExecutor, CommandSpec, ExecutionEvent, ExecutorConfig,
    InvocationResult, RuntimeError, MISSING_ARGUMENT,
};

fn args(values: &[&str]) -> Option<Vec<String>> {
    Some(values.iter().map(|v| v.to_string()).collect())
}

/// Polls `latest_state` until the execution is terminal.
async fn wait_done(executor: &CommandExecutor, id: &ExecutionId) -> ExecutionState {
    let deadline = Instant::now() + Duration::from_secs(5);
    loop {
        let state = executor
            .latest_state(id)
            .expect("execution should still be tracked");
        if state.is_done() {
            return state;
        }
        assert!(Instant::now() < deadline, "execution did not finish in time");
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
}

/// Registers `Evaluate [id, sleepMs]` limited to two concurrent runs.
fn evaluate_executor() -> CommandExecutor {
    let executor = CommandExecutor::default();
    executor
        .register_procedure(
            "Evaluate",
            ArgumentSpec::new(["id", "sleepMs"]),
            |args, _| {
                let ms: u64 = args[1].parse()?;
                std::thread::sleep(Duration::from_millis(ms));
                Ok(())
            },
            Some(2),
        )
        .unwrap();
    executor
}

#[tokio::test(flavor = "multi_thread")]
async fn test_missing_argument_always_fails() {
    let executor = evaluate_executor();

    for supplied in [None, args(&[]), args(&["1"])] {
        let state = executor
            .start_execution("Evaluate", supplied, Duration::from_secs(5))
            .await;

        assert_eq!(state.invocation_state, InvocationStatus::FailedDuringExecution);
        assert_eq!(state.status_message.as_deref(), Some(MISSING_ARGUMENT));
    }
}

#[tokio::test(flavor = "multi_thread")]
async fn test_evaluate_scenario_limit_two() {
    let executor = evaluate_executor();

    let first = executor
        .start_execution("Evaluate", args(&["1", "600"]), Duration::from_millis(50))
        .await;
    tokio::time::sleep(Duration::from_millis(50)).await;
    let second = executor
        .start_execution("Evaluate", args(&["2", "600"]), Duration::from_millis(50))
        .await;
    tokio::time::sleep(Duration::from_millis(50)).await;
    let third = executor
        .start_execution("Evaluate", args(&["3", "600"]), Duration::from_millis(50))
        .await;

    assert_eq!(first.invocation_state, InvocationStatus::InProgress);
    assert_eq!(second.invocation_state, InvocationStatus::InProgress);
    assert_eq!(
        third.invocation_state,
        InvocationStatus::RejectedConcurrencyLock
    );
    assert_eq!(executor.count_concurrent_executions_of("Evaluate"), 2);

    assert_eq!(
        wait_done(&executor, &first.execution_id).await.invocation_state,
        InvocationStatus::Completed
    );
    assert_eq!(
        wait_done(&executor, &second.execution_id).await.invocation_state,
        InvocationStatus::Completed
    );
    assert!(executor.latest_state(&third.execution_id).is_none());

    // Slots are free again.
    let again = executor
        .start_execution("Evaluate", args(&["4", "0"]), Duration::from_secs(5))
        .await;
    assert_eq!(again.invocation_state, InvocationStatus::Completed);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_starts_never_exceed_limit() {
    let executor = CommandExecutor::default();
    executor
        .register(
            CommandSpec::new("Slow", |_| {
                std::thread::sleep(Duration::from_millis(300));
                Ok(InvocationResult::Completed)
            })
            .with_concurrency_limit(3),
        )
        .unwrap();

    let handles: Vec<_> = (0..10)
        .map(|_| {
            let executor = executor.clone();
            tokio::spawn(async move {
                executor
                    .start_execution("Slow", None, Duration::ZERO)
                    .await
                    .invocation_state
            })
        })
        .collect();

    let mut admitted = 0;
    let mut rejected = 0;
    for handle in handles {
        match handle.await.unwrap() {
            InvocationStatus::RejectedConcurrencyLock => rejected += 1,
            status => {
                assert!(!status.is_rejected());
                admitted += 1;
            }
        }
    }

    assert_eq!(admitted, 3);
    assert_eq!(rejected, 7);
    assert_eq!(executor.execution_count(), 3);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_sync_wait_returns_early() {
    let executor = CommandExecutor::default();
    executor
        .register(CommandSpec::new("Quick", |_| {
            std::thread::sleep(Duration::from_millis(80));
            Ok(InvocationResult::Completed)
        }))
        .unwrap();

    let started = Instant::now();
    let state = executor
        .start_execution("Quick", None, Duration::from_secs(3))
        .await;

    assert_eq!(state.invocation_state, InvocationStatus::Completed);
    assert!(started.elapsed() < Duration::from_secs(1));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_sync_wait_budget_is_respected() {
    let executor = CommandExecutor::default();
    executor
        .register(CommandSpec::new("Long", |_| {
            std::thread::sleep(Duration::from_millis(500));
            Ok(InvocationResult::Completed)
        }))
        .unwrap();

    let started = Instant::now();
    let state = executor
        .start_execution("Long", None, Duration::from_millis(50))
        .await;

    assert_eq!(state.invocation_state, InvocationStatus::InProgress);
    assert!(started.elapsed() < Duration::from_millis(400));

    let finished = wait_done(&executor, &state.execution_id).await;
    assert_eq!(finished.invocation_state, InvocationStatus::Completed);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_body_error_message_is_captured() {
    let executor = CommandExecutor::default();
    executor
        .register(CommandSpec::new("Smelly", |_| Err("It smells".into())))
        .unwrap();

    let state = executor
        .start_execution("Smelly", None, Duration::from_secs(5))
        .await;

    assert_eq!(state.invocation_state, InvocationStatus::FailedDuringExecution);
    assert_eq!(state.status_message.as_deref(), Some("It smells"));
    assert!(!state.cancellation_possible);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_cooperative_cancellation_through_procedure() {
    let executor = CommandExecutor::default();
    executor
        .register_procedure(
            "Wait",
            ArgumentSpec::none().cancellable(),
            |_, token| {
                while !token.is_cancelled() {
                    std::thread::sleep(Duration::from_millis(5));
                }
                Ok(())
            },
            None,
        )
        .unwrap();

    let state = executor
        .start_execution("Wait", None, Duration::from_millis(50))
        .await;
    assert_eq!(state.invocation_state, InvocationStatus::InProgress);
    assert!(state.cancellation_possible);
    assert!(!state.cancellation_requested);

    let after_request = executor.request_cancellation(&state.execution_id).unwrap();
    assert!(after_request.cancellation_requested);

    let finished = wait_done(&executor, &state.execution_id).await;
    assert_eq!(finished.invocation_state, InvocationStatus::Canceled);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_cancellation_without_support_completes() {
    let executor = CommandExecutor::default();
    executor
        .register_procedure(
            "Ignore",
            ArgumentSpec::none(),
            |_, _| {
                std::thread::sleep(Duration::from_millis(150));
                Ok(())
            },
            None,
        )
        .unwrap();

    let state = executor
        .start_execution("Ignore", None, Duration::from_millis(20))
        .await;
    executor.request_cancellation(&state.execution_id).unwrap();

    let finished = wait_done(&executor, &state.execution_id).await;
    assert_eq!(finished.invocation_state, InvocationStatus::Completed);
    assert!(finished.cancellation_requested);
    assert!(!finished.cancellation_possible);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_cancelling_finished_execution_is_noop() {
    let executor = CommandExecutor::default();
    executor
        .register(CommandSpec::new("Echo", |_| Ok(InvocationResult::Completed)))
        .unwrap();

    let state = executor
        .start_execution("Echo", None, Duration::from_secs(5))
        .await;
    assert_eq!(state.invocation_state, InvocationStatus::Completed);

    let after = executor.request_cancellation(&state.execution_id).unwrap();
    assert_eq!(after, state);
    assert!(!after.cancellation_requested);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_orphans_evicted_on_next_start() {
    let executor =
        CommandExecutor::new(ExecutorConfig::new().with_retention(Duration::from_millis(100)));
    executor
        .register(CommandSpec::new("Echo", |_| Ok(InvocationResult::Completed)))
        .unwrap();

    let old = executor
        .start_execution("Echo", None, Duration::from_secs(5))
        .await;
    assert!(old.is_done());

    tokio::time::sleep(Duration::from_millis(300)).await;
    // Still tracked: nothing sweeps until the next start.
    assert_eq!(executor.execution_count(), 1);

    let new = executor
        .start_execution("Echo", None, Duration::from_secs(5))
        .await;

    assert!(executor.latest_state(&old.execution_id).is_none());
    assert!(executor.latest_state(&new.execution_id).is_some());
}

#[tokio::test(flavor = "multi_thread")]
async fn test_polling_keeps_execution_alive() {
    let executor =
        CommandExecutor::new(ExecutorConfig::new().with_retention(Duration::from_millis(400)));
    executor
        .register(CommandSpec::new("Echo", |_| Ok(InvocationResult::Completed)))
        .unwrap();

    let state = executor
        .start_execution("Echo", None, Duration::from_secs(5))
        .await;

    for _ in 0..6 {
        tokio::time::sleep(Duration::from_millis(100)).await;
        assert!(executor.latest_state(&state.execution_id).is_some());
    }

    executor
        .start_execution("Echo", None, Duration::from_secs(5))
        .await;
    assert!(executor.latest_state(&state.execution_id).is_some());
}

#[tokio::test(flavor = "multi_thread")]
async fn test_running_executions_are_never_evicted() {
    let executor =
        CommandExecutor::new(ExecutorConfig::new().with_retention(Duration::from_millis(10)));
    executor
        .register(CommandSpec::new("Long", |_| {
            std::thread::sleep(Duration::from_millis(300));
            Ok(InvocationResult::Completed)
        }))
        .unwrap();
    executor
        .register(CommandSpec::new("Echo", |_| Ok(InvocationResult::Completed)))
        .unwrap();

    let long = executor
        .start_execution("Long", None, Duration::ZERO)
        .await;
    tokio::time::sleep(Duration::from_millis(100)).await;
    executor
        .start_execution("Echo", None, Duration::from_secs(5))
        .await;

    assert!(executor.latest_state(&long.execution_id).is_some());
}

#[tokio::test(flavor = "multi_thread")]
async fn test_duplicate_registration_keeps_first() {
    let executor = CommandExecutor::default();
    executor
        .register(CommandSpec::new("Echo", |ctx| {
            ctx.report_progress(1, 1, Some("first"));
            Ok(InvocationResult::Completed)
        }))
        .unwrap();

    let result = executor.register(CommandSpec::new("Echo", |ctx| {
        ctx.report_progress(1, 1, Some("second"));
        Ok(InvocationResult::Completed)
    }));
    assert!(matches!(result, Err(RuntimeError::DuplicateCommand(_))));

    let state = executor
        .start_execution("Echo", None, Duration::from_secs(5))
        .await;
    assert_eq!(state.status_message.as_deref(), Some("first"));
    assert_eq!(executor.command_descriptions().len(), 1);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_independent_executors() {
    let left = CommandExecutor::default();
    let right = CommandExecutor::default();

    for executor in [&left, &right] {
        executor
            .register(CommandSpec::new("Echo", |_| Ok(InvocationResult::Completed)))
            .unwrap();
    }

    let state = left
        .start_execution("Echo", None, Duration::from_secs(5))
        .await;

    assert!(left.latest_state(&state.execution_id).is_some());
    assert!(right.latest_state(&state.execution_id).is_none());
    assert_eq!(right.execution_count(), 0);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_events_for_one_execution() {
    let executor = CommandExecutor::default();
    executor
        .register(CommandSpec::new("Echo", |_| Ok(InvocationResult::Completed)))
        .unwrap();
    let mut events = executor.subscribe();

    let state = executor
        .start_execution("Echo", None, Duration::from_secs(5))
        .await;

    let started = events.recv().await.unwrap();
    assert!(matches!(started, ExecutionEvent::Started { .. }));
    assert_eq!(started.execution_id(), &state.execution_id);

    let finished = tokio::time::timeout(Duration::from_secs(5), events.recv())
        .await
        .unwrap()
        .unwrap();
    assert!(matches!(
        finished,
        ExecutionEvent::Finished {
            status: InvocationStatus::Completed,
            ..
        }
    ));
}
