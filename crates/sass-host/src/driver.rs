//! The compiler lifecycle state machine.
//!
//! One task owns everything: the child connection, the dispatcher
//! tables, and every tracker. The public handle talks to it over a
//! command channel; child I/O and finished host callouts come back to
//! it over an internal event channel. Nothing here blocks: reads,
//! writes, timers, and host callbacks all run in their own tasks and
//! report through events.

use crate::child::{CompilerChild, Connection};
use crate::codec;
use crate::dispatcher::Dispatcher;
use crate::error::Error;
use crate::function::SassFunction;
use crate::importer::ImportResolver;
use crate::options::MessageStyle;
use crate::results::{CompileResults, Versions};
use crate::tracker::{CalloutOutcome, CompileParams, Received, Tracker};
use crate::wire::decode;
use futures::future::BoxFuture;
use proto_sass::{self as proto, inbound_message, outbound_message};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt};
use tokio::sync::{mpsc, oneshot};

/// Compilation ids are process-wide monotonic, starting well away from
/// zero so they are easy to spot in protocol traces.
static NEXT_COMPILATION_ID: AtomicU32 = AtomicU32::new(4000);

fn next_compilation_id() -> u32 {
    NEXT_COMPILATION_ID.fetch_add(1, Ordering::Relaxed)
}

/// The reserved id used for the version handshake.
const VERSION_REQUEST_ID: u32 = u32::MAX;

/// The oldest protocol we speak, and the major version we require.
const MINIMUM_PROTOCOL_VERSION: (u64, u64, u64) = (2, 0, 0);

/// Produces a fresh connection to a compiler. Called once per
/// (re)initialization; the production spawner forks the child process,
/// test spawners hand back an in-memory duplex.
pub(crate) type Spawner = Box<dyn FnMut() -> BoxFuture<'static, Result<Connection, Error>> + Send>;

/// Cross-task observability state backing the public accessors.
#[derive(Default)]
pub(crate) struct Shared {
    pub(crate) pid: Mutex<Option<u32>>,
    pub(crate) versions: Mutex<Option<Versions>>,
    pub(crate) startup_count: AtomicU32,
}

/// Driver-wide configuration fixed at construction.
pub(crate) struct GlobalOptions {
    pub(crate) timeout: Option<Duration>,
    pub(crate) importers: Vec<ImportResolver>,
    pub(crate) functions: HashMap<String, SassFunction>,
    pub(crate) message_style: MessageStyle,
}

pub(crate) enum Command {
    Compile {
        params: CompileParams,
        reply: oneshot::Sender<Result<CompileResults, Error>>,
    },
    Reinit {
        reply: oneshot::Sender<Result<(), Error>>,
    },
    Shutdown {
        reply: oneshot::Sender<Result<(), Error>>,
    },
}

pub(crate) enum Event {
    /// A message read from the child.
    Inbound {
        generation: u64,
        message: proto::OutboundMessage,
    },
    /// The connection failed: read error, unexpected EOF, or a write
    /// error such as a broken pipe after the child died.
    ConnectionFailed { generation: u64, error: Error },
    /// A host callout finished and produced its reply.
    CalloutDone {
        compilation_id: u32,
        reply: proto::InboundMessage,
    },
    /// A compilation's timeout timer fired.
    TimedOut { compilation_id: u32 },
}

type UnitReply = oneshot::Sender<Result<(), Error>>;

/// Reinit and shutdown requests that arrived while an initialization
/// was in flight, to be resolved when it settles.
#[derive(Default)]
struct Init {
    reinit: Vec<UnitReply>,
    shutdown: Vec<UnitReply>,
}

enum State {
    Initializing(Init),
    Running,
    Broken(Error),
    Quiescing { waiters: Vec<UnitReply> },
    Shutdown,
}

pub(crate) struct Driver {
    spawner: Spawner,
    options: GlobalOptions,
    cmd_rx: mpsc::UnboundedReceiver<Command>,
    event_tx: mpsc::UnboundedSender<Event>,
    event_rx: mpsc::UnboundedReceiver<Event>,
    state: State,
    dispatcher: Dispatcher,
    // Incremented per spawn; events from a previous child are stale
    // and dropped.
    generation: u64,
    writer_tx: Option<mpsc::UnboundedSender<proto::InboundMessage>>,
    child: Option<CompilerChild>,
    io_tasks: Vec<tokio::task::JoinHandle<()>>,
    shared: Arc<Shared>,
}

impl Driver {
    pub(crate) fn new(
        spawner: Spawner,
        options: GlobalOptions,
        cmd_rx: mpsc::UnboundedReceiver<Command>,
        shared: Arc<Shared>,
    ) -> Driver {
        let (event_tx, event_rx) = mpsc::unbounded_channel();
        Driver {
            spawner,
            options,
            cmd_rx,
            event_tx,
            event_rx,
            state: State::Shutdown, // replaced by the first start
            dispatcher: Dispatcher::default(),
            generation: 0,
            writer_tx: None,
            child: None,
            io_tasks: Vec::new(),
            shared,
        }
    }

    pub(crate) async fn run(mut self) {
        self.start_compiler(Vec::new(), Vec::new()).await;

        loop {
            tokio::select! {
                command = self.cmd_rx.recv() => match command {
                    Some(command) => self.handle_command(command).await,
                    // The handle was dropped; tear down and exit.
                    None => {
                        self.teardown_child().await;
                        return;
                    }
                },
                event = self.event_rx.recv() => {
                    let event = event.expect("driver holds an event sender");
                    self.handle_event(event).await;
                }
            }
        }
    }

    async fn handle_command(&mut self, command: Command) {
        match command {
            Command::Compile { params, reply } => self.handle_compile(params, reply),
            Command::Reinit { reply } => self.handle_reinit(reply).await,
            Command::Shutdown { reply } => self.handle_shutdown(reply).await,
        }
    }

    fn handle_compile(
        &mut self,
        params: CompileParams,
        reply: oneshot::Sender<Result<CompileResults, Error>>,
    ) {
        match &self.state {
            State::Shutdown => {
                let _ = reply.send(Err(Error::lifecycle("compile requested after shutdown")));
            }
            State::Quiescing { .. } => {
                let _ = reply.send(Err(Error::lifecycle("compiler is shutting down")));
            }
            State::Broken(error) => {
                let _ = reply.send(Err(error.clone()));
            }
            State::Initializing(_) | State::Running => {
                let id = next_compilation_id();
                let tracker = Tracker::new(id, params, &self.options, reply);
                self.dispatcher.push_pending(tracker);
                if matches!(self.state, State::Running) {
                    self.kick_pending();
                }
            }
        }
    }

    async fn handle_reinit(&mut self, reply: UnitReply) {
        match &mut self.state {
            State::Shutdown => {
                let _ = reply.send(Err(Error::lifecycle("reinit requested after shutdown")));
            }
            // Quiescing proceeds regardless; reinit has nothing to do.
            State::Quiescing { .. } => {
                let _ = reply.send(Ok(()));
            }
            // Chain onto the in-flight initialization.
            State::Initializing(init) => init.reinit.push(reply),
            State::Broken(_) => self.start_compiler(vec![reply], Vec::new()).await,
            State::Running => {
                tracing::info!("restarting compiler at user request");
                let reason = Error::lifecycle("user requested reinit");
                self.teardown_child().await;
                self.dispatcher.cancel_active(&reason);
                self.start_compiler(vec![reply], Vec::new()).await;
            }
        }
    }

    async fn handle_shutdown(&mut self, reply: UnitReply) {
        match &mut self.state {
            State::Shutdown => {
                let _ = reply.send(Ok(()));
            }
            State::Quiescing { waiters } => waiters.push(reply),
            State::Initializing(init) => init.shutdown.push(reply),
            State::Broken(_) => {
                self.state = State::Shutdown;
                let _ = reply.send(Ok(()));
            }
            State::Running => {
                tracing::info!("shutting down compiler");
                self.dispatcher
                    .fail_pending(&Error::lifecycle("compiler is shutting down"));
                if self.dispatcher.is_idle() {
                    self.finish_shutdown(vec![reply]).await;
                } else {
                    self.state = State::Quiescing {
                        waiters: vec![reply],
                    };
                }
            }
        }
    }

    async fn handle_event(&mut self, event: Event) {
        match event {
            Event::Inbound {
                generation,
                message,
            } if generation == self.generation => self.handle_inbound(message).await,
            Event::Inbound { .. } => {}
            Event::ConnectionFailed { generation, error } if generation == self.generation => {
                self.handle_fatal(error).await
            }
            Event::ConnectionFailed { .. } => {}
            Event::CalloutDone {
                compilation_id,
                reply,
            } => self.handle_callout_done(compilation_id, reply).await,
            Event::TimedOut { compilation_id } => {
                if self.dispatcher.is_active(compilation_id) {
                    let timeout = self.options.timeout.unwrap_or_default();
                    tracing::warn!(compilation_id, ?timeout, "compilation timed out");
                    self.handle_fatal(Error::Timeout(timeout)).await;
                }
            }
        }
    }

    async fn handle_inbound(&mut self, message: proto::OutboundMessage) {
        let Some(message) = message.message else {
            self.handle_fatal(Error::protocol("message with no variant set"))
                .await;
            return;
        };

        use outbound_message::Message;
        match message {
            Message::VersionResponse(response) => self.handle_version_response(response).await,
            Message::Error(error) => {
                self.handle_fatal(Error::protocol(format!(
                    "compiler reported: {}",
                    error.message
                )))
                .await;
            }
            other => match compilation_id_of(&other) {
                Some(compilation_id) => self.deliver(compilation_id, other).await,
                None => {
                    self.handle_fatal(Error::protocol("message without a compilation id"))
                        .await
                }
            },
        }
    }

    async fn handle_version_response(
        &mut self,
        response: outbound_message::VersionResponse,
    ) {
        let State::Initializing(init) = &mut self.state else {
            self.handle_fatal(Error::protocol("unexpected version response"))
                .await;
            return;
        };
        let init = std::mem::take(init);

        if response.id != VERSION_REQUEST_ID {
            let error = Error::protocol(format!(
                "version response with unexpected id {}",
                response.id
            ));
            self.initialization_failed(error, init).await;
            return;
        }

        let versions = decode::version_response(&response);
        match parse_version(&versions.protocol_version) {
            Some(version) if version_in_range(version) => {
                tracing::info!(
                    protocol = %versions.protocol_version,
                    compiler = %versions.compiler_name,
                    "compiler is ready"
                );
                *self.shared.versions.lock().unwrap() = Some(versions);
                for waiter in init.reinit {
                    let _ = waiter.send(Ok(()));
                }
                if init.shutdown.is_empty() {
                    self.state = State::Running;
                    self.kick_pending();
                } else {
                    self.dispatcher
                        .fail_pending(&Error::lifecycle("compiler is shutting down"));
                    self.finish_shutdown(init.shutdown).await;
                }
            }
            _ => {
                let (major, minor, patch) = MINIMUM_PROTOCOL_VERSION;
                let error = Error::lifecycle(format!(
                    "compiler protocol version {:?} is unsupported; need {major}.x, at least \
                     {major}.{minor}.{patch}",
                    versions.protocol_version
                ));
                self.initialization_failed(error, init).await;
            }
        }
    }

    async fn deliver(&mut self, compilation_id: u32, message: outbound_message::Message) {
        if !matches!(self.state, State::Running | State::Quiescing { .. }) {
            self.handle_fatal(Error::protocol(
                "compilation message while no compilations can be in flight",
            ))
            .await;
            return;
        }

        let event_tx = self.event_tx.clone();
        let Some(tracker) = self.dispatcher.active_mut(compilation_id) else {
            self.handle_fatal(Error::protocol(format!(
                "unknown compilation id {compilation_id}"
            )))
            .await;
            return;
        };

        match tracker.receive(message, &event_tx) {
            Ok(Received::Done) => {
                self.dispatcher.remove_active(compilation_id);
                self.check_quiesce().await;
            }
            Ok(Received::Pending) => {}
            Err(error) => self.handle_fatal(error).await,
        }
    }

    async fn handle_callout_done(&mut self, compilation_id: u32, reply: proto::InboundMessage) {
        let event_tx = self.event_tx.clone();
        let Some(tracker) = self.dispatcher.active_mut(compilation_id) else {
            return; // Raced with completion; nothing to do.
        };

        match tracker.finish_callout() {
            CalloutOutcome::Cancelled => {
                self.dispatcher.remove_active(compilation_id);
                self.check_quiesce().await;
            }
            CalloutOutcome::Forward => {
                if let Some(writer_tx) = &self.writer_tx {
                    let _ = writer_tx.send(reply);
                }
                // Service nested requests that queued behind the
                // callout, stopping when one starts a new callout.
                loop {
                    let Some(tracker) = self.dispatcher.active_mut(compilation_id) else {
                        break;
                    };
                    let Some(message) = tracker.pop_backlog() else {
                        break;
                    };
                    match tracker.receive(message, &event_tx) {
                        Ok(Received::Done) => {
                            self.dispatcher.remove_active(compilation_id);
                            self.check_quiesce().await;
                            break;
                        }
                        Ok(Received::Pending) => {}
                        Err(error) => {
                            self.handle_fatal(error).await;
                            break;
                        }
                    }
                }
            }
        }
    }

    /// A fatal error: protocol violation, I/O failure, or timeout.
    /// Running resets (active fails, pending survives the respawn);
    /// initializing goes broken; quiescing completes the shutdown.
    async fn handle_fatal(&mut self, error: Error) {
        match &mut self.state {
            State::Running => {
                tracing::warn!(%error, "resetting compiler");
                self.teardown_child().await;
                self.dispatcher.cancel_active(&error);
                self.start_compiler(Vec::new(), Vec::new()).await;
            }
            State::Initializing(init) => {
                tracing::error!(%error, "compiler failed to initialize");
                let init = std::mem::take(init);
                self.initialization_failed(error, init).await;
            }
            State::Quiescing { waiters } => {
                tracing::warn!(%error, "error while quiescing; completing shutdown");
                let waiters = std::mem::take(waiters);
                self.dispatcher.cancel_active(&error);
                self.finish_shutdown(waiters).await;
            }
            State::Broken(_) | State::Shutdown => {}
        }
    }

    async fn start_compiler(&mut self, reinit: Vec<UnitReply>, shutdown: Vec<UnitReply>) {
        self.generation += 1;
        self.shared.startup_count.fetch_add(1, Ordering::Relaxed);
        tracing::debug!(generation = self.generation, "spawning compiler");

        match (self.spawner)().await {
            Ok(connection) => {
                let Connection {
                    reader,
                    writer,
                    pid,
                    child,
                } = connection;
                *self.shared.pid.lock().unwrap() = pid;
                self.child = child;

                let (writer_tx, writer_rx) = mpsc::unbounded_channel();
                self.io_tasks.push(tokio::spawn(write_loop(
                    writer,
                    writer_rx,
                    self.event_tx.clone(),
                    self.generation,
                )));
                self.io_tasks.push(tokio::spawn(read_loop(
                    reader,
                    self.event_tx.clone(),
                    self.generation,
                )));

                let _ = writer_tx.send(proto::InboundMessage {
                    message: Some(inbound_message::Message::VersionRequest(
                        inbound_message::VersionRequest {
                            id: VERSION_REQUEST_ID,
                        },
                    )),
                });
                self.writer_tx = Some(writer_tx);
                self.state = State::Initializing(Init { reinit, shutdown });
            }
            Err(error) => {
                tracing::error!(%error, "failed to start compiler");
                self.initialization_failed(error, Init { reinit, shutdown })
                    .await;
            }
        }
    }

    async fn initialization_failed(&mut self, error: Error, init: Init) {
        self.teardown_child().await;
        for waiter in init.reinit {
            let _ = waiter.send(Err(error.clone()));
        }
        if init.shutdown.is_empty() {
            self.dispatcher.fail_pending(&error);
            self.state = State::Broken(error);
        } else {
            // A shutdown was chained onto this initialization; failing
            // to start still reaches the state it asked for.
            self.dispatcher
                .fail_pending(&Error::lifecycle("compiler is shutting down"));
            self.state = State::Shutdown;
            for waiter in init.shutdown {
                let _ = waiter.send(Ok(()));
            }
        }
    }

    /// Drain the pending queue into the active table, sending each
    /// compile request in submission order.
    fn kick_pending(&mut self) {
        let Some(writer_tx) = self.writer_tx.clone() else {
            return;
        };
        for mut tracker in self.dispatcher.take_pending() {
            tracing::debug!(compilation_id = tracker.id(), "starting compilation");
            let _ = writer_tx.send(tracker.take_request());
            tracker.start(self.options.timeout, &self.event_tx);
            self.dispatcher.insert_active(tracker);
        }
    }

    async fn check_quiesce(&mut self) {
        if let State::Quiescing { waiters } = &mut self.state {
            if self.dispatcher.is_idle() {
                let waiters = std::mem::take(waiters);
                self.finish_shutdown(waiters).await;
            }
        }
    }

    async fn finish_shutdown(&mut self, waiters: Vec<UnitReply>) {
        self.teardown_child().await;
        self.state = State::Shutdown;
        for waiter in waiters {
            let _ = waiter.send(Ok(()));
        }
    }

    async fn teardown_child(&mut self) {
        for task in self.io_tasks.drain(..) {
            task.abort();
        }
        self.writer_tx = None;
        *self.shared.pid.lock().unwrap() = None;

        if let Some(mut child) = self.child.take() {
            match child.try_wait_status() {
                Some(status) => tracing::debug!(%status, "compiler had already exited"),
                None => child.kill().await,
            }
        }
    }
}

fn compilation_id_of(message: &outbound_message::Message) -> Option<u32> {
    use outbound_message::Message;
    match message {
        Message::CompileResponse(m) => Some(m.id),
        Message::LogEvent(m) => Some(m.compilation_id),
        Message::CanonicalizeRequest(m) => Some(m.compilation_id),
        Message::ImportRequest(m) => Some(m.compilation_id),
        Message::FileImportRequest(m) => Some(m.compilation_id),
        Message::FunctionCallRequest(m) => Some(m.compilation_id),
        Message::Error(_) | Message::VersionResponse(_) => None,
    }
}

async fn read_loop(
    mut reader: Box<dyn AsyncRead + Send + Unpin>,
    event_tx: mpsc::UnboundedSender<Event>,
    generation: u64,
) {
    loop {
        match codec::decode_message::<proto::OutboundMessage, _>(&mut reader).await {
            Ok(Some(message)) => {
                if event_tx
                    .send(Event::Inbound {
                        generation,
                        message,
                    })
                    .is_err()
                {
                    return;
                }
            }
            Ok(None) => {
                let _ = event_tx.send(Event::ConnectionFailed {
                    generation,
                    error: Error::Io("compiler closed its output unexpectedly".to_string()),
                });
                return;
            }
            Err(error) => {
                let _ = event_tx.send(Event::ConnectionFailed { generation, error });
                return;
            }
        }
    }
}

async fn write_loop(
    mut writer: Box<dyn AsyncWrite + Send + Unpin>,
    mut writer_rx: mpsc::UnboundedReceiver<proto::InboundMessage>,
    event_tx: mpsc::UnboundedSender<Event>,
    generation: u64,
) {
    while let Some(message) = writer_rx.recv().await {
        let frame = codec::encode_message(&message);
        // A broken pipe here means the child died; report it and let
        // the driver reset. Rust ignores SIGPIPE process-wide, so this
        // surfaces as an error rather than a signal.
        if let Err(error) = writer.write_all(&frame).await {
            let _ = event_tx.send(Event::ConnectionFailed {
                generation,
                error: Error::io("writing to compiler", error),
            });
            return;
        }
        if let Err(error) = writer.flush().await {
            let _ = event_tx.send(Event::ConnectionFailed {
                generation,
                error: Error::io("flushing to compiler", error),
            });
            return;
        }
    }
}

/// Parse `major.minor.patch` with an optional `-prerelease` tag, which
/// is ignored for ordering.
fn parse_version(version: &str) -> Option<(u64, u64, u64)> {
    let numeric = version.split('-').next().unwrap_or(version);
    let mut parts = numeric.split('.');
    let major = parts.next()?.parse().ok()?;
    let minor = parts.next()?.parse().ok()?;
    let patch = parts.next()?.parse().ok()?;
    if parts.next().is_some() {
        return None;
    }
    Some((major, minor, patch))
}

fn version_in_range(version: (u64, u64, u64)) -> bool {
    version.0 == MINIMUM_PROTOCOL_VERSION.0 && version >= MINIMUM_PROTOCOL_VERSION
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::mock;
    use crate::{
        sync_function, Compiler, ImportResolver, Importer, ImporterResults, OutputStyle,
        SassDynamicFunction, StringOptions, Syntax,
    };
    use proto_sass::inbound_message::Message as In;
    use sass_values::Value;
    use std::path::PathBuf;
    use std::sync::Mutex;
    use url::Url;

    #[test]
    fn test_parse_version() {
        assert_eq!(parse_version("2.7.1"), Some((2, 7, 1)));
        assert_eq!(parse_version("2.0.0-dev"), Some((2, 0, 0)));
        assert_eq!(parse_version("2.7"), None);
        assert_eq!(parse_version("2.7.1.9"), None);
        assert_eq!(parse_version("fish"), None);

        assert!(version_in_range((2, 0, 0)));
        assert!(version_in_range((2, 11, 0)));
        assert!(!version_in_range((1, 9, 9)));
        assert!(!version_in_range((3, 0, 0)));
    }

    fn compressed() -> StringOptions {
        StringOptions {
            style: OutputStyle::Compressed,
            ..Default::default()
        }
    }

    // Scenario: a trivial stylesheet compiles and carries no messages.
    #[tokio::test]
    async fn test_hello_world() {
        let compiler = Compiler::for_testing(mock::spawner(|message| match message {
            In::CompileRequest(request) => {
                assert!(matches!(
                    request.input,
                    Some(proto_sass::inbound_message::compile_request::Input::String(ref input))
                        if input.source == "a { b: 1 + 2 }"
                ));
                vec![mock::success(request.id, "a{b:3}")]
            }
            other => panic!("unexpected message {other:?}"),
        }));

        let results = compiler
            .compile_string("a { b: 1 + 2 }", compressed())
            .await
            .unwrap();
        assert_eq!(results.css, "a{b:3}");
        assert!(results.messages.is_empty());
        assert_eq!(compiler.startup_count(), 1);
        assert_eq!(compiler.process_id(), None);
        assert_eq!(
            compiler.versions().unwrap().protocol_version,
            mock::PROTOCOL_VERSION
        );
    }

    // Scenario: warnings and debug messages accumulate in order.
    #[tokio::test]
    async fn test_log_events_accumulate() {
        let compiler = Compiler::for_testing(mock::spawner(|message| match message {
            In::CompileRequest(request) => vec![
                mock::warning(request.id, "first"),
                mock::warning(request.id, "second"),
                mock::success(request.id, "a{}"),
            ],
            other => panic!("unexpected message {other:?}"),
        }));

        let results = compiler.compile_string("a {}", compressed()).await.unwrap();
        let texts: Vec<_> = results
            .messages
            .iter()
            .map(|message| message.message.as_str())
            .collect();
        assert_eq!(texts, vec!["first", "second"]);
    }

    // Scenario: `@error "stop"` fails the one submission that caused
    // it, carrying the messages logged before the failure.
    #[tokio::test]
    async fn test_compiler_error() {
        let compiler = Compiler::for_testing(mock::spawner(|message| match message {
            In::CompileRequest(request) => vec![
                mock::warning(request.id, "heads up"),
                mock::failure(request.id, "stop"),
            ],
            other => panic!("unexpected message {other:?}"),
        }));

        let error = compiler
            .compile_string("@error \"stop\"", StringOptions {
                syntax: Syntax::Indented,
                ..Default::default()
            })
            .await
            .unwrap_err();
        let Error::Compiler(failure) = error else {
            panic!("expected a compiler failure, got {error:?}");
        };
        assert!(failure.message.contains("stop"));
        assert_eq!(failure.messages.len(), 1);
        assert_eq!(failure.messages[0].message, "heads up");

        // The compiler is still healthy afterwards.
        assert_eq!(compiler.startup_count(), 1);
    }

    struct PrefixImporter;

    #[async_trait::async_trait]
    impl Importer for PrefixImporter {
        async fn canonicalize(&self, url: &str, _from_import: bool) -> anyhow::Result<Option<Url>> {
            Ok(Some(Url::parse(&format!("test://{url}"))?))
        }

        async fn load(&self, canonical_url: &Url) -> anyhow::Result<ImporterResults> {
            assert_eq!(canonical_url.scheme(), "test");
            Ok(ImporterResults::new("a{color:red}", Syntax::Css))
        }
    }

    // Scenario: a custom importer canonicalizes and loads through the
    // host, and the compilation uses what it returned.
    #[tokio::test]
    async fn test_custom_importer() {
        // The mock drives the full nested exchange: canonicalize,
        // import, then a compile response built from the load result.
        let state: Arc<Mutex<u32>> = Arc::new(Mutex::new(0));
        let spawner = mock::spawner(move |message| match message {
            In::CompileRequest(request) => {
                *state.lock().unwrap() = request.id;
                assert_eq!(request.importers.len(), 1);
                vec![mock::outbound(outbound_message::Message::CanonicalizeRequest(
                    outbound_message::CanonicalizeRequest {
                        id: 1,
                        compilation_id: request.id,
                        importer_id: 4000,
                        url: "secondary".to_string(),
                        from_import: true,
                    },
                ))]
            }
            In::CanonicalizeResponse(response) => {
                let compilation_id = *state.lock().unwrap();
                let Some(inbound_message::canonicalize_response::Result::Url(url)) =
                    response.result
                else {
                    panic!("expected a canonical url, got {:?}", response.result);
                };
                assert_eq!(url, "test://secondary");
                vec![mock::outbound(outbound_message::Message::ImportRequest(
                    outbound_message::ImportRequest {
                        id: 2,
                        compilation_id,
                        importer_id: 4000,
                        url,
                    },
                ))]
            }
            In::ImportResponse(response) => {
                let compilation_id = *state.lock().unwrap();
                let Some(inbound_message::import_response::Result::Success(success)) =
                    response.result
                else {
                    panic!("expected an import success, got {:?}", response.result);
                };
                assert_eq!(success.syntax, proto_sass::Syntax::Css as i32);
                vec![mock::success(compilation_id, &success.contents)]
            }
            other => panic!("unexpected message {other:?}"),
        });

        let compiler = Compiler::for_testing_with_options(spawner, |builder| {
            builder.importer(ImportResolver::custom(PrefixImporter))
        });

        let results = compiler
            .compile_string(
                "@import 'secondary'",
                StringOptions {
                    syntax: Syntax::Indented,
                    style: OutputStyle::Compressed,
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(results.css, "a{color:red}");
    }

    // A mock whose compile step immediately calls one host function by
    // name or id, then renders the returned string into the CSS.
    fn function_calling_spawner(
        identifier: outbound_message::function_call_request::Identifier,
    ) -> Spawner {
        let state: Arc<Mutex<u32>> = Arc::new(Mutex::new(0));
        mock::spawner(move |message| match message {
            In::CompileRequest(request) => {
                *state.lock().unwrap() = request.id;
                vec![mock::outbound(
                    outbound_message::Message::FunctionCallRequest(
                        outbound_message::FunctionCallRequest {
                            id: 1,
                            compilation_id: request.id,
                            identifier: Some(identifier.clone()),
                            arguments: vec![],
                        },
                    ),
                )]
            }
            In::FunctionCallResponse(response) => {
                let compilation_id = *state.lock().unwrap();
                let Some(inbound_message::function_call_response::Result::Success(value)) =
                    response.result
                else {
                    panic!("expected a function result, got {:?}", response.result);
                };
                let Some(proto_sass::value::Value::String(string)) = value.value else {
                    panic!("expected a string result");
                };
                vec![mock::success(
                    compilation_id,
                    &format!("a{{a:\"{}\"}}", string.text),
                )]
            }
            other => panic!("unexpected message {other:?}"),
        })
    }

    // Scenario: a per-compilation function shadows the global of the
    // same name.
    #[tokio::test]
    async fn test_host_function_override() {
        use outbound_message::function_call_request::Identifier;

        let compiler = Compiler::for_testing_with_options(
            function_calling_spawner(Identifier::Name("ofunc".to_string())),
            |builder| {
                builder.function("ofunc($p)", sync_function(|_| Ok(Value::from("bucket"))))
            },
        );

        let mut options = compressed();
        options.functions.insert(
            "ofunc()".to_string(),
            sync_function(|_| Ok(Value::from("goat"))),
        );

        let results = compiler
            .compile_string("a { a: ofunc() }", options)
            .await
            .unwrap();
        assert_eq!(results.css, "a{a:\"goat\"}");
    }

    // A dynamic host function is resolved through the process-wide
    // registry by the id that traveled to the compiler.
    #[tokio::test]
    async fn test_host_function_by_id() {
        use outbound_message::function_call_request::Identifier;

        let function =
            SassDynamicFunction::new("dyn()", sync_function(|_| Ok(Value::from("dynamic"))));
        let compiler =
            Compiler::for_testing(function_calling_spawner(Identifier::FunctionId(
                function.id(),
            )));

        let results = compiler.compile_string("a {}", compressed()).await.unwrap();
        assert_eq!(results.css, "a{a:\"dynamic\"}");
    }

    // Keyword reads inside a host function are reported back in the
    // function-call response.
    #[tokio::test]
    async fn test_argument_list_access_reporting() {
        let reported: Arc<Mutex<Option<Vec<u32>>>> = Arc::new(Mutex::new(None));
        let state: Arc<Mutex<u32>> = Arc::new(Mutex::new(0));

        let spawner = {
            let reported = reported.clone();
            mock::spawner(move |message| match message {
                In::CompileRequest(request) => {
                    *state.lock().unwrap() = request.id;
                    let arguments = proto_sass::Value {
                        value: Some(proto_sass::value::Value::ArgumentList(
                            proto_sass::value::ArgumentList {
                                id: 99,
                                separator: proto_sass::ListSeparator::Comma as i32,
                                contents: vec![],
                                keywords: [(
                                    "color".to_string(),
                                    proto_sass::Value {
                                        value: Some(proto_sass::value::Value::Singleton(
                                            proto_sass::SingletonValue::Null as i32,
                                        )),
                                    },
                                )]
                                .into_iter()
                                .collect(),
                            },
                        )),
                    };
                    vec![mock::outbound(
                        outbound_message::Message::FunctionCallRequest(
                            outbound_message::FunctionCallRequest {
                                id: 1,
                                compilation_id: request.id,
                                identifier: Some(
                                    outbound_message::function_call_request::Identifier::Name(
                                        "vfunc".to_string(),
                                    ),
                                ),
                                arguments: vec![arguments],
                            },
                        ),
                    )]
                }
                In::FunctionCallResponse(response) => {
                    *reported.lock().unwrap() = Some(response.accessed_argument_lists);
                    vec![mock::success(*state.lock().unwrap(), "a{}")]
                }
                other => panic!("unexpected message {other:?}"),
            })
        };

        let compiler = Compiler::for_testing_with_options(spawner, |builder| {
            builder.function(
                "vfunc($args...)",
                sync_function(|arguments| {
                    let list = arguments[0].as_argument_list()?;
                    let _ = list.keywords();
                    Ok(Value::Null)
                }),
            )
        });

        compiler.compile_string("a {}", compressed()).await.unwrap();
        assert_eq!(reported.lock().unwrap().clone(), Some(vec![99]));
    }

    // An unknown function name is a protocol violation: the submission
    // fails and the driver resets.
    #[tokio::test]
    async fn test_unknown_function_resets_driver() {
        let spawner = mock::spawner(|message| match message {
            In::CompileRequest(request) => vec![mock::outbound(
                outbound_message::Message::FunctionCallRequest(
                    outbound_message::FunctionCallRequest {
                        id: 1,
                        compilation_id: request.id,
                        identifier: Some(
                            outbound_message::function_call_request::Identifier::Name(
                                "nope".to_string(),
                            ),
                        ),
                        arguments: vec![],
                    },
                ),
            )],
            _ => vec![],
        });
        let compiler = Compiler::for_testing(spawner);

        let error = compiler
            .compile_string("a {}", compressed())
            .await
            .unwrap_err();
        assert!(matches!(error, Error::Protocol(_)), "got {error:?}");

        wait_for_startup(&compiler, 2).await;
    }

    // A load path cannot service canonicalize requests; addressing one
    // is a protocol error.
    #[tokio::test]
    async fn test_load_path_addressed_by_canonicalize() {
        let spawner = mock::spawner(|message| match message {
            In::CompileRequest(request) => vec![mock::outbound(
                outbound_message::Message::CanonicalizeRequest(
                    outbound_message::CanonicalizeRequest {
                        id: 1,
                        compilation_id: request.id,
                        importer_id: 4000,
                        url: "secondary".to_string(),
                        from_import: false,
                    },
                ),
            )],
            _ => vec![],
        });
        let compiler = Compiler::for_testing_with_options(spawner, |builder| {
            builder.importer(ImportResolver::LoadPath(PathBuf::from("/srv/styles")))
        });

        let error = compiler
            .compile_string("a {}", compressed())
            .await
            .unwrap_err();
        assert!(matches!(error, Error::Protocol(_)), "got {error:?}");
    }

    // An out-of-band protocol error fails the work in flight; the
    // driver respawns and keeps serving.
    #[tokio::test]
    async fn test_protocol_error_resets_and_recovers() {
        let compiles = Arc::new(AtomicU32::new(0));
        let spawner = {
            let compiles = compiles.clone();
            mock::spawner(move |message| match message {
                In::CompileRequest(request) => {
                    if compiles.fetch_add(1, Ordering::SeqCst) == 0 {
                        vec![mock::protocol_error("compiler is unhappy")]
                    } else {
                        vec![mock::success(request.id, "a{}")]
                    }
                }
                other => panic!("unexpected message {other:?}"),
            })
        };
        let compiler = Compiler::for_testing(spawner);

        let error = compiler
            .compile_string("a {}", compressed())
            .await
            .unwrap_err();
        assert!(matches!(error, Error::Protocol(_)), "got {error:?}");

        wait_for_startup(&compiler, 2).await;
        let results = compiler.compile_string("a {}", compressed()).await.unwrap();
        assert_eq!(results.css, "a{}");
        assert_eq!(compiler.startup_count(), 2);
    }

    // A child speaking the wrong protocol version breaks the driver;
    // reinit respawns and recovers once the child is acceptable.
    #[tokio::test]
    async fn test_version_mismatch_goes_broken() {
        let spawner = mock::spawner_with_versions(
            vec!["1.0.0".to_string(), mock::PROTOCOL_VERSION.to_string()],
            |message| match message {
                In::CompileRequest(request) => vec![mock::success(request.id, "a{}")],
                other => panic!("unexpected message {other:?}"),
            },
        );
        let compiler = Compiler::for_testing(spawner);

        let error = compiler
            .compile_string("a {}", compressed())
            .await
            .unwrap_err();
        assert!(matches!(error, Error::Lifecycle(_)), "got {error:?}");

        // Broken rejects submissions without spawning anything.
        let error = compiler
            .compile_string("a {}", compressed())
            .await
            .unwrap_err();
        assert!(matches!(error, Error::Lifecycle(_)), "got {error:?}");
        assert_eq!(compiler.startup_count(), 1);

        compiler.reinit().await.unwrap();
        let results = compiler.compile_string("a {}", compressed()).await.unwrap();
        assert_eq!(results.css, "a{}");
        assert_eq!(compiler.startup_count(), 2);
    }

    // Scenario: the per-compilation timeout escalates to a driver
    // reset rather than a per-job abort.
    #[tokio::test]
    async fn test_timeout_resets_driver() {
        let spawner = mock::spawner(|message| match message {
            In::CompileRequest(_) => vec![], // never answer
            other => panic!("unexpected message {other:?}"),
        });
        let compiler = Compiler::for_testing_with_options(spawner, |builder| {
            builder.timeout(Duration::from_millis(50))
        });

        let error = compiler
            .compile_string("a {}", compressed())
            .await
            .unwrap_err();
        assert!(matches!(error, Error::Timeout(_)), "got {error:?}");
        wait_for_startup(&compiler, 2).await;
    }

    // Scenario: reinit under load. Two submissions that never complete
    // fail with the reinit error; the restarted compiler then serves.
    #[tokio::test]
    async fn test_reinit_under_load() {
        let respond = Arc::new(std::sync::atomic::AtomicBool::new(false));
        let spawner = {
            let respond = respond.clone();
            mock::spawner(move |message| match message {
                In::CompileRequest(request) => {
                    if respond.load(Ordering::SeqCst) {
                        vec![mock::success(request.id, "a{}")]
                    } else {
                        vec![] // hang forever
                    }
                }
                other => panic!("unexpected message {other:?}"),
            })
        };
        let compiler = Compiler::for_testing(spawner);
        wait_for_startup(&compiler, 1).await;

        let one = compiler.compile_string("a {}", compressed());
        let two = compiler.compile_string("b {}", compressed());
        tokio::pin!(one, two);
        assert!(futures::poll!(one.as_mut()).is_pending());
        assert!(futures::poll!(two.as_mut()).is_pending());

        compiler.reinit().await.unwrap();

        for error in [one.await.unwrap_err(), two.await.unwrap_err()] {
            match error {
                Error::Lifecycle(message) => assert!(message.contains("reinit"), "{message}"),
                other => panic!("expected a lifecycle error, got {other:?}"),
            }
        }
        assert_eq!(compiler.startup_count(), 2);

        respond.store(true, Ordering::SeqCst);
        let results = compiler.compile_string("c {}", compressed()).await.unwrap();
        assert_eq!(results.css, "a{}");
    }

    struct GatedImporter {
        started: mpsc::UnboundedSender<()>,
        release: Arc<tokio::sync::Notify>,
    }

    #[async_trait::async_trait]
    impl Importer for GatedImporter {
        async fn canonicalize(&self, _url: &str, _from_import: bool) -> anyhow::Result<Option<Url>> {
            let _ = self.started.send(());
            self.release.notified().await;
            Ok(None)
        }

        async fn load(&self, _canonical_url: &Url) -> anyhow::Result<ImporterResults> {
            anyhow::bail!("never loads")
        }
    }

    fn gated_compiler() -> (Compiler, mpsc::UnboundedReceiver<()>, Arc<tokio::sync::Notify>) {
        let (started_tx, started_rx) = mpsc::unbounded_channel();
        let release = Arc::new(tokio::sync::Notify::new());

        let state: Arc<Mutex<u32>> = Arc::new(Mutex::new(0));
        let spawner = mock::spawner(move |message| match message {
            In::CompileRequest(request) => {
                *state.lock().unwrap() = request.id;
                vec![mock::outbound(
                    outbound_message::Message::CanonicalizeRequest(
                        outbound_message::CanonicalizeRequest {
                            id: 1,
                            compilation_id: request.id,
                            importer_id: 4000,
                            url: "gated".to_string(),
                            from_import: false,
                        },
                    ),
                )]
            }
            In::CanonicalizeResponse(_) => {
                vec![mock::success(*state.lock().unwrap(), "a{}")]
            }
            other => panic!("unexpected message {other:?}"),
        });

        let importer = GatedImporter {
            started: started_tx,
            release: release.clone(),
        };
        let compiler = Compiler::for_testing_with_options(spawner, move |builder| {
            builder.importer(ImportResolver::custom(importer))
        });
        (compiler, started_rx, release)
    }

    // Cancelling while a host callout is in flight defers the failure
    // until the callback returns: it never sees its future dropped.
    #[tokio::test]
    async fn test_cancellation_defers_across_active_callout() {
        let (compiler, mut started_rx, release) = gated_compiler();

        let compile = compiler.compile_string("a {}", compressed());
        tokio::pin!(compile);
        assert!(futures::poll!(compile.as_mut()).is_pending());
        started_rx.recv().await.unwrap();

        // Reinit cancels the compilation, but the callout is active:
        // the failure is buffered.
        compiler.reinit().await.unwrap();
        tokio::task::yield_now().await;
        assert!(futures::poll!(compile.as_mut()).is_pending());

        // Only once the importer returns does the outcome resolve.
        release.notify_one();
        let error = compile.await.unwrap_err();
        match error {
            Error::Lifecycle(message) => assert!(message.contains("reinit"), "{message}"),
            other => panic!("expected a lifecycle error, got {other:?}"),
        }
    }

    // Graceful shutdown quiesces: in-flight work completes, new work
    // is refused, and the terminal state answers every later call.
    #[tokio::test]
    async fn test_shutdown_waits_for_active_work() {
        let (compiler, mut started_rx, release) = gated_compiler();

        let compile = compiler.compile_string("a {}", compressed());
        tokio::pin!(compile);
        assert!(futures::poll!(compile.as_mut()).is_pending());
        started_rx.recv().await.unwrap();

        let shutdown = compiler.shutdown();
        tokio::pin!(shutdown);
        assert!(futures::poll!(shutdown.as_mut()).is_pending());

        // Submissions during quiescing are refused outright.
        let error = compiler
            .compile_string("b {}", compressed())
            .await
            .unwrap_err();
        assert!(matches!(error, Error::Lifecycle(_)), "got {error:?}");
        assert!(futures::poll!(shutdown.as_mut()).is_pending());

        // The active compilation still completes, then shutdown does.
        release.notify_one();
        let results = compile.await.unwrap();
        assert_eq!(results.css, "a{}");
        shutdown.await.unwrap();

        // Terminal-state behavior.
        let error = compiler
            .compile_string("c {}", compressed())
            .await
            .unwrap_err();
        assert!(matches!(error, Error::Lifecycle(_)), "got {error:?}");
        let error = compiler.reinit().await.unwrap_err();
        assert!(matches!(error, Error::Lifecycle(_)), "got {error:?}");
        compiler.shutdown().await.unwrap();
        assert_eq!(compiler.process_id(), None);
    }

    #[tokio::test]
    async fn test_importer_errors_become_compile_failures() {
        struct FailingImporter;

        #[async_trait::async_trait]
        impl Importer for FailingImporter {
            async fn canonicalize(
                &self,
                _url: &str,
                _from_import: bool,
            ) -> anyhow::Result<Option<Url>> {
                anyhow::bail!("no such stylesheet")
            }
            async fn load(&self, _canonical_url: &Url) -> anyhow::Result<ImporterResults> {
                unreachable!()
            }
        }

        // The mock relays the host's canonicalize error into a
        // compilation failure, the way a real compiler reports it.
        let state: Arc<Mutex<u32>> = Arc::new(Mutex::new(0));
        let spawner = mock::spawner(move |message| match message {
            In::CompileRequest(request) => {
                *state.lock().unwrap() = request.id;
                vec![mock::outbound(
                    outbound_message::Message::CanonicalizeRequest(
                        outbound_message::CanonicalizeRequest {
                            id: 1,
                            compilation_id: request.id,
                            importer_id: 4000,
                            url: "missing".to_string(),
                            from_import: false,
                        },
                    ),
                )]
            }
            In::CanonicalizeResponse(response) => {
                let Some(inbound_message::canonicalize_response::Result::Error(error)) =
                    response.result
                else {
                    panic!("expected an error result, got {:?}", response.result);
                };
                vec![mock::failure(*state.lock().unwrap(), &error)]
            }
            other => panic!("unexpected message {other:?}"),
        });

        let compiler = Compiler::for_testing_with_options(spawner, |builder| {
            builder.importer(ImportResolver::custom(FailingImporter))
        });

        let error = compiler
            .compile_string("a {}", compressed())
            .await
            .unwrap_err();
        let Error::Compiler(failure) = error else {
            panic!("expected a compiler failure, got {error:?}");
        };
        assert!(failure.message.contains("no such stylesheet"));
    }

    // Poll until the driver reaches the given startup count; resets
    // happen asynchronously after a fatal error.
    async fn wait_for_startup(compiler: &Compiler, count: u32) {
        tokio::time::timeout(Duration::from_secs(5), async {
            while compiler.startup_count() < count || compiler.versions().is_none() {
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
        })
        .await
        .expect("compiler did not restart in time");
    }
}
