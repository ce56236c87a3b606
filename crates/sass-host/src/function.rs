//! Host-defined Sass functions.

use futures::future::{BoxFuture, FutureExt};
use sass_values::Value;
use std::sync::Arc;

/// A host function callable from a stylesheet.
///
/// Receives the evaluated arguments (defaults already applied by the
/// compiler) and produces a value, or an error that the compiler will
/// report at the call site. The future runs on the driver's runtime;
/// a function that blocks must use [`blocking_function`] instead of
/// blocking in place.
pub type SassFunction =
    Arc<dyn Fn(Vec<Value>) -> BoxFuture<'static, anyhow::Result<Value>> + Send + Sync>;

/// Wrap an async closure as a [`SassFunction`].
pub fn async_function<F, Fut>(function: F) -> SassFunction
where
    F: Fn(Vec<Value>) -> Fut + Send + Sync + 'static,
    Fut: std::future::Future<Output = anyhow::Result<Value>> + Send + 'static,
{
    Arc::new(move |arguments| function(arguments).boxed())
}

/// Wrap a synchronous, non-blocking closure as a [`SassFunction`].
pub fn sync_function<F>(function: F) -> SassFunction
where
    F: Fn(Vec<Value>) -> anyhow::Result<Value> + Send + Sync + 'static,
{
    Arc::new(move |arguments| std::future::ready(function(arguments)).boxed())
}

/// Wrap a synchronous closure that may block, dispatching each call to
/// the runtime's blocking pool so it never stalls the driver.
pub fn blocking_function<F>(function: F) -> SassFunction
where
    F: Fn(Vec<Value>) -> anyhow::Result<Value> + Send + Sync + 'static,
{
    let function = Arc::new(function);
    Arc::new(move |arguments| {
        let function = Arc::clone(&function);
        async move {
            tokio::task::spawn_blocking(move || function(arguments))
                .await
                .map_err(|error| anyhow::anyhow!("blocking sass function panicked: {error}"))?
        }
        .boxed()
    })
}

/// A host function passed to the compiler *by value*, addressable from
/// the stylesheet wherever the value flows.
///
/// Registration is process-wide and permanent; see the registry module.
#[derive(Clone)]
pub struct SassDynamicFunction {
    handle: sass_values::HostFunction,
}

impl SassDynamicFunction {
    /// Register `function` under `signature` and mint its wire handle.
    pub fn new(signature: impl Into<String>, function: SassFunction) -> Self {
        SassDynamicFunction {
            handle: crate::registry::register(signature.into(), function),
        }
    }

    /// The value to return from another host function or pass in an
    /// argument.
    pub fn as_value(&self) -> Value {
        Value::HostFunction(self.handle.clone())
    }

    pub fn id(&self) -> u32 {
        self.handle.id()
    }

    pub fn signature(&self) -> &str {
        self.handle.signature()
    }
}

impl std::fmt::Debug for SassDynamicFunction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SassDynamicFunction")
            .field("id", &self.handle.id())
            .field("signature", &self.handle.signature())
            .finish()
    }
}
