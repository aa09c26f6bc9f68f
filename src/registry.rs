//! Process-wide registry of persistent emulator instances, keyed by a
//! caller-chosen id. One global lock guards the map and everything in it,
//! rather than process-wide variables: one initializer, explicit teardown
//! per instance, explicit erasure.

use once_cell::sync::Lazy;
use parking_lot::Mutex;
use std::collections::HashMap;

use crate::emulator::{Emulator, EmulatorOptions};
use crate::error::{Error, Result};
use crate::extract::JsonDocument;

static INSTANCES: Lazy<Mutex<HashMap<u64, Emulator>>> = Lazy::new(|| Mutex::new(HashMap::new()));

/// Create a new instance under `id`, cols x rows. If `id` is already
/// registered, the old instance is dropped first.
pub fn create(id: u64, cols: u16, rows: u16) {
    let mut instances = INSTANCES.lock();
    if instances
        .insert(
            id,
            Emulator::new(EmulatorOptions {
                cols,
                rows,
                max_scrollback: None,
            }),
        )
        .is_some()
    {
        tracing::debug!(id, "replaced existing persistent instance");
    }
    tracing::info!(id, cols, rows, "created persistent instance");
}

/// Drop the instance registered under `id`. No-op if absent.
pub fn destroy(id: u64) {
    if INSTANCES.lock().remove(&id).is_some() {
        tracing::info!(id, "destroyed persistent instance");
    }
}

pub fn feed(id: u64, bytes: &[u8]) -> Result<()> {
    let mut instances = INSTANCES.lock();
    let emulator = instances.get_mut(&id).ok_or(Error::NotFound(id))?;
    emulator.feed(bytes)
}

pub fn resize(id: u64, cols: u16, rows: u16) -> Result<()> {
    let mut instances = INSTANCES.lock();
    let emulator = instances.get_mut(&id).ok_or(Error::NotFound(id))?;
    emulator.resize(cols, rows);
    Ok(())
}

pub fn reset(id: u64) -> Result<()> {
    let mut instances = INSTANCES.lock();
    let emulator = instances.get_mut(&id).ok_or(Error::NotFound(id))?;
    emulator.reset();
    Ok(())
}

pub fn get_json(id: u64, offset: u32, limit: u32) -> Result<JsonDocument> {
    let instances = INSTANCES.lock();
    let emulator = instances.get(&id).ok_or(Error::NotFound(id))?;
    Ok(emulator.to_json(offset, limit))
}

pub fn get_text(id: u64) -> Result<String> {
    let instances = INSTANCES.lock();
    let emulator = instances.get(&id).ok_or(Error::NotFound(id))?;
    Ok(emulator.to_text(0, 0))
}

pub fn get_cursor(id: u64) -> Result<[u32; 2]> {
    let instances = INSTANCES.lock();
    let emulator = instances.get(&id).ok_or(Error::NotFound(id))?;
    Ok(emulator.cursor())
}

pub fn is_ready(id: u64) -> Result<bool> {
    let instances = INSTANCES.lock();
    let emulator = instances.get(&id).ok_or(Error::NotFound(id))?;
    Ok(emulator.is_ready())
}
