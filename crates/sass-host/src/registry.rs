//! The process-wide table of host-defined dynamic functions.
//!
//! Host functions travel to the compiler as opaque numeric ids; when
//! the compiler later invokes one, the id is looked up here. Ids are
//! never reused and entries are never removed: a compiler may hold an
//! id for as long as the process lives.

use crate::function::SassFunction;
use lazy_static::lazy_static;
use sass_values::HostFunction;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;

// Host function ids live in their own range, disjoint from compilation
// and importer ids, to keep protocol traces readable.
static NEXT_ID: AtomicU32 = AtomicU32::new(2000);

lazy_static! {
    static ref REGISTRY: Mutex<HashMap<u32, SassFunction>> = Mutex::new(HashMap::new());
}

/// Register a function and return the wire handle that addresses it.
pub(crate) fn register(signature: String, function: SassFunction) -> HostFunction {
    let id = NEXT_ID.fetch_add(1, Ordering::Relaxed);
    REGISTRY
        .lock()
        .expect("registry is never poisoned")
        .insert(id, function);
    HostFunction::new(id, signature)
}

/// Resolve an id the compiler sent back to us.
pub(crate) fn lookup(id: u32) -> Option<SassFunction> {
    REGISTRY
        .lock()
        .expect("registry is never poisoned")
        .get(&id)
        .cloned()
}
