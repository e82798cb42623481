//! Demo commands served by the `servercmd` binary.

use std::time::Duration;

use servercmd_runtime::{
    ArgumentSpec, CommandError, CommandExecutor, CommandSpec, ExecutionContext,
    InvocationResult, Result, MISSING_ARGUMENT,
};

/// Concurrent `Sleep` executions allowed at once.
pub const SLEEP_CONCURRENCY: usize = 2;

/// Time between two `Countdown` steps.
pub const COUNTDOWN_STEP: Duration = Duration::from_millis(100);

const SLICE: Duration = Duration::from_millis(10);

/// Registers `Echo`, `Sleep` and `Countdown` on `executor`.
pub fn register_demo_commands(executor: &CommandExecutor) -> Result<()> {
    executor.register(
        CommandSpec::new("Echo", echo)
            .with_arguments(["text"])
            .with_description("Completes immediately with its argument as status message"),
    )?;

    executor.register_procedure(
        "Sleep",
        ArgumentSpec::new(["ms"])
            .cancellable()
            .with_description("Sleeps for the given number of milliseconds"),
        |args, token| {
            let total = Duration::from_millis(args[0].parse()?);
            let mut slept = Duration::ZERO;
            while slept < total && !token.is_cancelled() {
                let slice = SLICE.min(total - slept);
                std::thread::sleep(slice);
                slept += slice;
            }
            Ok(())
        },
        Some(SLEEP_CONCURRENCY),
    )?;

    executor.register(
        CommandSpec::new("Countdown", countdown)
            .with_arguments(["steps"])
            .with_description("Counts down, reporting progress on every step"),
    )?;

    Ok(())
}

fn echo(ctx: &ExecutionContext) -> std::result::Result<InvocationResult, CommandError> {
    ctx.report_progress(1, 1, ctx.argument(0));
    Ok(InvocationResult::Completed)
}

fn countdown(ctx: &ExecutionContext) -> std::result::Result<InvocationResult, CommandError> {
    let Some(steps) = ctx.argument(0) else {
        ctx.report_progress(0, 0, Some(MISSING_ARGUMENT));
        return Ok(InvocationResult::Failed);
    };
    let steps: u32 = steps.parse()?;

    ctx.set_cancellation_possible(true);
    for step in 0..steps {
        if ctx.is_cancellation_requested() {
            ctx.report_progress(step, steps, Some("canceled"));
            return Ok(InvocationResult::Canceled);
        }
        let remaining = (steps - step).to_string();
        ctx.report_progress(step, steps, Some(&remaining));
        std::thread::sleep(COUNTDOWN_STEP);
    }

    ctx.report_progress(steps, steps, Some("liftoff"));
    Ok(InvocationResult::Completed)
}
