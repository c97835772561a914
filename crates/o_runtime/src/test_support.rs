//! Shared test scaffolding: a `World` + tempdir-backed `Store` +
//! `Dispatcher` wired together, so operation tests can dispatch a command
//! string and inspect `World`/disk state afterward without repeating the
//! wiring in every module.

#![cfg(test)]

use std::sync::Arc;

use o_data::World;
use o_system::{Clock, NativeVfs, SystemClock};

use crate::dispatcher::Dispatcher;
use crate::store::Store;

pub struct Harness {
    pub world: World,
    pub store: Store,
    pub dispatcher: Dispatcher,
    pub clock: Arc<dyn Clock>,
    _dir: tempfile::TempDir,
}

impl Harness {
    pub async fn dispatch(&mut self, text: &str, executor: Option<&str>) -> String {
        let Harness {
            dispatcher,
            world,
            store,
            clock,
            ..
        } = self;
        dispatcher
            .dispatch(text, executor, world, store, clock.as_ref())
            .await
    }
}

pub async fn harness() -> Harness {
    let dir = tempfile::tempdir().unwrap();
    let store = Store::new(
        Arc::new(NativeVfs::new(dir.path().join("state"))),
        Arc::new(NativeVfs::new(dir.path().join("memory"))),
        Arc::new(NativeVfs::new(dir.path().join("output"))),
    );
    Harness {
        world: World::new(),
        store,
        dispatcher: Dispatcher::new(),
        clock: Arc::new(SystemClock),
        _dir: dir,
    }
}
