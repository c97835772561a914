//! The Scheduler (Body, C6): the autonomous tick loop plus direct
//! intervention for bootstrap and tests. Grounded in `original_source`'s
//! polling loop (`transformers/human.py`, `body.py`) but reworked into an
//! async tick with no blocking variant, per the resolved Open Question in
//! `spec.md` §9 — and in the cancellation/watchdog discipline of
//! `logicaffeine-system::concurrency`'s task-handle abort semantics.

use std::sync::Arc;
use std::time::Duration;

use o_data::{ExecutionRecord, World};
use o_system::{Cancellation, Clock};

use crate::dispatcher::Dispatcher;
use crate::error::RuntimeError;
use crate::operations::{self, OpContext};
use crate::provider::{ChannelOutput, ChannelSubstrate, Thinker, ThinkContext};
use crate::store::Store;

/// Grace period after a cancellation signal before the in-flight tick is
/// forcibly abandoned (`spec.md` §4.6/§5).
const WATCHDOG: Duration = Duration::from_secs(5);

pub struct Scheduler {
    world: World,
    store: Store,
    clock: Arc<dyn Clock>,
    dispatcher: Dispatcher,
    thinker: Arc<dyn Thinker>,
    channels: Arc<dyn ChannelSubstrate>,
    tick_interval: Duration,
}

impl Scheduler {
    pub fn new(
        store: Store,
        clock: Arc<dyn Clock>,
        thinker: Arc<dyn Thinker>,
        channels: Arc<dyn ChannelSubstrate>,
    ) -> Self {
        Self {
            world: World::new(),
            store,
            clock,
            dispatcher: Dispatcher::new(),
            thinker,
            channels,
            tick_interval: Duration::from_secs(1),
        }
    }

    pub fn with_tick_interval(mut self, interval: Duration) -> Self {
        self.tick_interval = interval;
        self
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }

    fn ctx(&mut self) -> OpContext<'_> {
        OpContext {
            world: &mut self.world,
            store: &self.store,
            clock: self.clock.as_ref(),
            dispatcher: &self.dispatcher,
        }
    }

    /// Direct intervention (`spec.md` §4.6): dispatches a single command
    /// outside the tick loop, bypassing wake selection, external-input
    /// polling, and thinking. Records the execution but does not advance
    /// the clock or persist the tick log — callers that want durability
    /// call `run` instead.
    pub async fn execute_now(&mut self, command_text: &str, executor: Option<&str>) -> String {
        let output = self
            .dispatcher
            .dispatch(command_text, executor, &mut self.world, &self.store, self.clock.as_ref())
            .await;
        self.world.record_execution(ExecutionRecord {
            executor: executor.unwrap_or("").to_string(),
            command: command_text.to_string(),
            output: output.clone(),
        });
        if let Some(entity) = executor {
            self.channels
                .write_output(
                    entity,
                    &ChannelOutput {
                        clock: self.world.clock,
                        command: command_text.to_string(),
                        output: output.clone(),
                        timestamp: self.clock.now_iso8601(),
                    },
                )
                .await;
        }
        output
    }

    /// Runs one full tick: select wakers, read external inputs, think,
    /// dispatch, write outputs, persist, advance. Returns the number of
    /// executions recorded.
    async fn run_tick(&mut self) -> Result<usize, RuntimeError> {
        let mut commands: Vec<(String, String)> = Vec::new();

        // 1. Select wakers.
        let wake_candidates: Vec<String> = self.world.wake_registration.keys().cloned().collect();
        let mut woken = Vec::new();
        for entity in wake_candidates {
            let mut ctx = self.ctx();
            if let Some(prompt) = operations::check_and_consume(&entity, &mut ctx).await {
                woken.push((entity, prompt));
            }
        }

        // 2. Read external inputs.
        let all_entities: Vec<String> = self.world.entity_spaces.keys().cloned().collect();
        for entity in &all_entities {
            if let Some(command) = self.channels.read_command(entity).await {
                commands.push((entity.clone(), command));
            }
        }

        // 3. Think, for every wake-triggered entity.
        for (entity, wake_reason) in woken {
            let context = ThinkContext {
                clock: self.world.clock,
                spaces: self.world.spaces_of(&entity).into_iter().collect(),
                wake_reason: Some(wake_reason),
            };
            if let Some(command) = self.thinker.think(&entity, &context).await {
                commands.push((entity, command));
            }
        }

        // 4. Dispatch.
        let mut executions = Vec::with_capacity(commands.len());
        for (executor, command_text) in &commands {
            let output = self
                .dispatcher
                .dispatch(command_text, Some(executor), &mut self.world, &self.store, self.clock.as_ref())
                .await;
            tracing::debug!(executor, command = %command_text, "dispatched command");
            let record = ExecutionRecord {
                executor: executor.clone(),
                command: command_text.clone(),
                output: output.clone(),
            };
            self.world.record_execution(record.clone());
            executions.push((executor.clone(), record));
        }

        // 5. Write outputs.
        for (executor, record) in &executions {
            self.channels
                .write_output(
                    executor,
                    &ChannelOutput {
                        clock: self.world.clock,
                        command: record.command.clone(),
                        output: record.output.clone(),
                        timestamp: self.clock.now_iso8601(),
                    },
                )
                .await;
        }

        // 6. Persist.
        let tick = self.world.clock;
        if !self.world.tick_buffer.is_empty() {
            self.store
                .write_tick_log(tick, &self.world.tick_buffer)
                .await
                .map_err(|source| RuntimeError::PersistTick { tick, source })?;
        }

        // 7. Advance.
        let drained = self.world.advance_tick();
        tracing::debug!(tick, executions = drained.len(), "tick advanced");

        Ok(drained.len())
    }

    /// Autonomous mode (`spec.md` §4.6): repeats the tick until cancelled or
    /// `max_ticks` is reached. On cancellation mid-tick, lets the in-flight
    /// tick finish, within a hard watchdog grace period.
    pub async fn run(&mut self, cancellation: &Cancellation, max_ticks: Option<u64>) -> Result<(), RuntimeError> {
        let mut ticks_run: u64 = 0;
        loop {
            if cancellation.is_cancelled() {
                break;
            }
            if let Some(max) = max_ticks {
                if ticks_run >= max {
                    break;
                }
            }

            let tick_fut = self.run_tick();
            tokio::pin!(tick_fut);
            tokio::select! {
                biased;
                result = &mut tick_fut => { result?; }
                _ = cancellation.cancelled() => {
                    match tokio::time::timeout(WATCHDOG, &mut tick_fut).await {
                        Ok(result) => { result?; }
                        Err(_) => {
                            tracing::warn!("watchdog fired: in-flight tick did not finish within grace period");
                            break;
                        }
                    }
                }
            }
            ticks_run += 1;

            if cancellation.is_cancelled() {
                break;
            }
            tokio::select! {
                _ = tokio::time::sleep(self.tick_interval) => {}
                _ = cancellation.cancelled() => {}
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use o_system::{NativeVfs, SystemClock};

    use super::*;
    use crate::provider::{NullChannelSubstrate, NullThinker};

    fn scheduler(dir: &std::path::Path) -> Scheduler {
        let store = Store::new(
            Arc::new(NativeVfs::new(dir.join("state"))),
            Arc::new(NativeVfs::new(dir.join("memory"))),
            Arc::new(NativeVfs::new(dir.join("output"))),
        );
        Scheduler::new(
            store,
            Arc::new(SystemClock),
            Arc::new(NullThinker),
            Arc::new(NullChannelSubstrate),
        )
        .with_tick_interval(Duration::from_millis(1))
    }

    #[tokio::test]
    async fn execute_now_dispatches_without_advancing_clock() {
        let dir = tempfile::tempdir().unwrap();
        let mut sched = scheduler(dir.path());
        let out = sched.execute_now("\\echo hi ---", Some("@a")).await;
        assert_eq!(out, "Echo: hi");
        assert_eq!(sched.world().clock, 0);
        assert_eq!(sched.world().tick_buffer.len(), 1);
    }

    #[tokio::test]
    async fn run_advances_clock_for_max_ticks_then_stops() {
        let dir = tempfile::tempdir().unwrap();
        let mut sched = scheduler(dir.path());
        let cancellation = Cancellation::new();
        sched.run(&cancellation, Some(3)).await.unwrap();
        assert_eq!(sched.world().clock, 3);
    }

    #[tokio::test]
    async fn run_stops_immediately_when_already_cancelled() {
        let dir = tempfile::tempdir().unwrap();
        let mut sched = scheduler(dir.path());
        let cancellation = Cancellation::new();
        cancellation.cancel();
        sched.run(&cancellation, Some(10)).await.unwrap();
        assert_eq!(sched.world().clock, 0);
    }

    #[tokio::test]
    async fn wake_fires_and_schedules_a_think_call() {
        let dir = tempfile::tempdir().unwrap();
        let mut sched = scheduler(dir.path());
        sched.world_mut().spawn_entity("@a");
        sched.execute_now("\\wake ?($(\\up---)) hi ---", Some("@a")).await;

        let cancellation = Cancellation::new();
        sched.run(&cancellation, Some(1)).await.unwrap();

        assert!(!sched.world().has_wake("@a"));
    }
}
