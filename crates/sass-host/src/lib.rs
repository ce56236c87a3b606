//! An asynchronous host for Embedded Sass compilers.
//!
//! [`Compiler`] drives a long-lived child compiler process speaking the
//! Embedded Sass protocol over its stdin/stdout, multiplexing any
//! number of concurrent compilations over the single pipe pair. Host
//! code can plug in [custom importers](Importer) and host functions,
//! both of which the compiler calls back into mid-compilation.
//!
//! ```no_run
//! use sass_host::{Compiler, StringOptions, OutputStyle};
//!
//! # async fn demo() -> Result<(), sass_host::Error> {
//! let compiler = Compiler::new("/usr/local/bin/sass-embedded");
//! let results = compiler
//!     .compile_string(
//!         "a { b: 1 + 2 }",
//!         StringOptions {
//!             style: OutputStyle::Compressed,
//!             ..Default::default()
//!         },
//!     )
//!     .await?;
//! assert_eq!(results.css, "a{b:3}");
//! compiler.shutdown().await?;
//! # Ok(())
//! # }
//! ```
//!
//! The compiler process is supervised: protocol violations, I/O
//! failures, and per-compilation timeouts reset it (failing the work in
//! flight, never the handle), and [`Compiler::reinit`] forces the same
//! reset on demand. [`Compiler::shutdown`] quiesces gracefully, letting
//! active compilations finish.

mod child;
mod codec;
mod dispatcher;
mod driver;
mod error;
mod function;
mod importer;
#[cfg(test)]
mod mock;
mod options;
mod registry;
mod results;
mod tracker;
mod wire;

pub use error::{CompilerFailure, Error};
pub use function::{
    async_function, blocking_function, sync_function, SassDynamicFunction, SassFunction,
};
pub use importer::{ImportResolver, Importer, ImporterResults};
pub use options::{MessageStyle, OutputStyle, SourceMapStyle, Syntax};
pub use results::{CompileResults, CompilerMessage, Location, MessageKind, Span, Versions};

// The value tree is this crate's public argument/return currency.
pub use sass_values as values;
pub use sass_values::Value;

use driver::{Command, Driver, GlobalOptions, Shared, Spawner};
use futures::future::FutureExt;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};
use tracker::{CompileInput, CompileParams};
use url::Url;

/// Options for [`Compiler::compile_file`].
#[derive(Clone, Default)]
pub struct FileOptions {
    pub style: OutputStyle,
    pub source_map: SourceMapStyle,
    /// Importers consulted for this compilation only, ahead of the
    /// compiler-wide ones.
    pub importers: Vec<ImportResolver>,
    /// Functions for this compilation only, keyed by signature. On a
    /// name clash these win over compiler-wide functions.
    pub functions: HashMap<String, SassFunction>,
}

/// Options for [`Compiler::compile_string`].
#[derive(Clone, Default)]
pub struct StringOptions {
    pub syntax: Syntax,
    /// The URL the source claims to live at, for error reporting and
    /// relative resolution.
    pub url: Option<Url>,
    /// The importer that handles relative loads from this source. It
    /// occupies the first importer slot of the compilation.
    pub importer: Option<ImportResolver>,
    pub style: OutputStyle,
    pub source_map: SourceMapStyle,
    pub importers: Vec<ImportResolver>,
    pub functions: HashMap<String, SassFunction>,
}

/// Configures and builds a [`Compiler`].
pub struct CompilerBuilder {
    path: PathBuf,
    args: Vec<String>,
    timeout: Option<Duration>,
    importers: Vec<ImportResolver>,
    functions: HashMap<String, SassFunction>,
    message_style: MessageStyle,
}

impl CompilerBuilder {
    /// Extra arguments passed to the compiler binary.
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// The per-compilation deadline. Defaults to 60 seconds.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Disable the per-compilation deadline.
    pub fn no_timeout(mut self) -> Self {
        self.timeout = None;
        self
    }

    /// Append a compiler-wide importer, consulted for every
    /// compilation after any per-compilation importers.
    pub fn importer(mut self, importer: ImportResolver) -> Self {
        self.importers.push(importer);
        self
    }

    /// Register a compiler-wide function under a Sass signature such
    /// as `mix($a, $b, $w: 50%)`.
    pub fn function(mut self, signature: impl Into<String>, function: SassFunction) -> Self {
        self.functions.insert(signature.into(), function);
        self
    }

    pub fn message_style(mut self, style: MessageStyle) -> Self {
        self.message_style = style;
        self
    }

    /// Build the compiler handle and start its driver. Must be called
    /// within a tokio runtime; the child process is spawned (and
    /// respawned after resets) by the driver task.
    pub fn build(self) -> Compiler {
        let path = self.path.clone();
        let args = self.args.clone();
        let spawner: Spawner = Box::new(move || {
            let path = path.clone();
            let args = args.clone();
            async move { child::Connection::spawn(&path, &args) }.boxed()
        });
        self.build_with_spawner(spawner)
    }

    fn build_with_spawner(self, spawner: Spawner) -> Compiler {
        let options = GlobalOptions {
            timeout: self.timeout,
            importers: self.importers,
            functions: self.functions,
            message_style: self.message_style,
        };
        let shared = Arc::new(Shared::default());
        let (cmd_tx, cmd_rx) = mpsc::unbounded_channel();
        let driver = Driver::new(spawner, options, cmd_rx, shared.clone());
        tokio::spawn(driver.run());
        Compiler { cmd_tx, shared }
    }
}

/// A handle to a supervised Embedded Sass compiler process.
///
/// All state lives in a driver task; the handle is a command channel
/// plus observability accessors. Dropping the handle tears the driver
/// down and kills the child.
pub struct Compiler {
    cmd_tx: mpsc::UnboundedSender<Command>,
    shared: Arc<Shared>,
}

impl Compiler {
    /// A compiler with default options. See [`Compiler::builder`].
    pub fn new(path: impl Into<PathBuf>) -> Compiler {
        Compiler::builder(path).build()
    }

    pub fn builder(path: impl Into<PathBuf>) -> CompilerBuilder {
        CompilerBuilder {
            path: path.into(),
            args: Vec::new(),
            timeout: Some(Duration::from_secs(60)),
            importers: Vec::new(),
            functions: HashMap::new(),
            message_style: MessageStyle::default(),
        }
    }

    /// Compile the stylesheet at `path`. The compiler resolves the
    /// path and its relative imports itself.
    pub async fn compile_file(
        &self,
        path: impl AsRef<Path>,
        options: FileOptions,
    ) -> Result<CompileResults, Error> {
        let FileOptions {
            style,
            source_map,
            importers,
            functions,
        } = options;
        self.submit(CompileParams {
            input: CompileInput::Path(path.as_ref().to_path_buf()),
            style,
            source_map,
            importers,
            functions,
        })
        .await
    }

    /// Compile an in-memory stylesheet.
    pub async fn compile_string(
        &self,
        source: impl Into<String>,
        options: StringOptions,
    ) -> Result<CompileResults, Error> {
        let StringOptions {
            syntax,
            url,
            importer,
            style,
            source_map,
            importers,
            functions,
        } = options;
        self.submit(CompileParams {
            input: CompileInput::String {
                source: source.into(),
                syntax,
                url,
                importer,
            },
            style,
            source_map,
            importers,
            functions,
        })
        .await
    }

    async fn submit(&self, params: CompileParams) -> Result<CompileResults, Error> {
        let (reply, outcome) = oneshot::channel();
        self.cmd_tx
            .send(Command::Compile { params, reply })
            .map_err(|_| Error::lifecycle("compiler driver has terminated"))?;
        outcome
            .await
            .map_err(|_| Error::lifecycle("compiler driver has terminated"))?
    }

    /// Hard-reset the compiler: the child is killed and respawned, and
    /// every in-flight compilation fails with a lifecycle error.
    pub async fn reinit(&self) -> Result<(), Error> {
        self.control(|reply| Command::Reinit { reply }).await
    }

    /// Gracefully shut down: no new work is accepted, in-flight
    /// compilations run to completion, then the child is terminated.
    /// Idempotent; calls after completion succeed immediately.
    pub async fn shutdown(&self) -> Result<(), Error> {
        self.control(|reply| Command::Shutdown { reply }).await
    }

    async fn control(
        &self,
        command: impl FnOnce(oneshot::Sender<Result<(), Error>>) -> Command,
    ) -> Result<(), Error> {
        let (reply, done) = oneshot::channel();
        self.cmd_tx
            .send(command(reply))
            .map_err(|_| Error::lifecycle("compiler driver has terminated"))?;
        done.await
            .map_err(|_| Error::lifecycle("compiler driver has terminated"))?
    }

    /// The child's process id, when one is currently running.
    pub fn process_id(&self) -> Option<u32> {
        *self.shared.pid.lock().expect("shared state is never poisoned")
    }

    /// Version metadata from the most recent successful handshake.
    pub fn versions(&self) -> Option<Versions> {
        self.shared
            .versions
            .lock()
            .expect("shared state is never poisoned")
            .clone()
    }

    /// How many times a child has been spawned over this handle's
    /// lifetime: 1 after a healthy construction, +1 per reset.
    pub fn startup_count(&self) -> u32 {
        self.shared.startup_count.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
impl Compiler {
    pub(crate) fn for_testing(spawner: Spawner) -> Compiler {
        Compiler::for_testing_with_options(spawner, |builder| builder)
    }

    pub(crate) fn for_testing_with_options(
        spawner: Spawner,
        configure: impl FnOnce(CompilerBuilder) -> CompilerBuilder,
    ) -> Compiler {
        configure(Compiler::builder("unused")).build_with_spawner(spawner)
    }
}
