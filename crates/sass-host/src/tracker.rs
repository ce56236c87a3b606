//! Per-compilation state.
//!
//! A tracker owns one submitted compilation from request construction
//! to outcome: it accumulates log events, services the compiler's
//! nested canonicalize/import/function-call requests (at most one host
//! callout in flight at a time, later arrivals queue behind it), and
//! buffers cancellation across an active callout so host callbacks
//! never see their future dropped mid-flight.

use crate::driver::{Event, GlobalOptions};
use crate::error::Error;
use crate::function::SassFunction;
use crate::importer::{ImportResolver, Importer};
use crate::options::{OutputStyle, SourceMapStyle, Syntax};
use crate::results::{CompileResults, CompilerMessage};
use crate::wire::{decode, encode};
use crate::{registry, MessageStyle};
use futures::future::{BoxFuture, FutureExt};
use proto_sass::{self as proto, inbound_message, outbound_message};
use std::collections::{HashMap, VecDeque};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};
use url::Url;

/// Importer ids start here, per compilation. Distinct from the
/// compilation id range only by convention, to keep traces readable.
const FIRST_IMPORTER_ID: u32 = 4000;

pub(crate) struct CompileParams {
    pub input: CompileInput,
    pub style: OutputStyle,
    pub source_map: SourceMapStyle,
    pub importers: Vec<ImportResolver>,
    pub functions: HashMap<String, SassFunction>,
}

pub(crate) enum CompileInput {
    Path(PathBuf),
    String {
        source: String,
        syntax: Syntax,
        url: Option<Url>,
        importer: Option<ImportResolver>,
    },
}

/// The name a signature declares: the prefix before `(`.
pub(crate) fn function_name(signature: &str) -> &str {
    signature.split('(').next().unwrap_or(signature).trim()
}

enum ClientState {
    /// No host callout in flight.
    Normal,
    /// One callout in flight.
    Active,
    /// Cancelled while a callout was in flight; fail once it returns.
    ActiveCancelled(Error),
}

pub(crate) enum Received {
    /// The compilation is still in flight.
    Pending,
    /// The compile response arrived and the outcome resolved.
    Done,
}

pub(crate) enum CalloutOutcome {
    /// Forward the reply to the compiler.
    Forward,
    /// The compilation was cancelled during the callout; its outcome
    /// has now resolved and the reply must be discarded.
    Cancelled,
}

pub(crate) struct Tracker {
    id: u32,
    outcome: Option<oneshot::Sender<Result<CompileResults, Error>>>,
    request: Option<proto::InboundMessage>,
    importers: Vec<ImportResolver>,
    functions: HashMap<String, (String, SassFunction)>,
    messages: Vec<CompilerMessage>,
    state: ClientState,
    backlog: VecDeque<outbound_message::Message>,
    timer: Option<tokio::task::JoinHandle<()>>,
}

impl Tracker {
    pub(crate) fn new(
        id: u32,
        params: CompileParams,
        globals: &GlobalOptions,
        outcome: oneshot::Sender<Result<CompileResults, Error>>,
    ) -> Tracker {
        let CompileParams {
            input,
            style,
            source_map,
            importers: local_importers,
            functions: local_functions,
        } = params;

        // Assemble the importer slots: the string input's own importer
        // first (shifting the others up), then per-compilation
        // importers, then the globals.
        let input_importer = match &input {
            CompileInput::String { importer, .. } => importer.clone(),
            CompileInput::Path(_) => None,
        };
        let mut importers = Vec::new();
        importers.extend(input_importer.clone());
        importers.extend(local_importers);
        importers.extend(globals.importers.iter().cloned());

        // Merge function maps through their name view; a
        // per-compilation function shadows a global with the same name.
        let mut functions: HashMap<String, (String, SassFunction)> = HashMap::new();
        for (signature, function) in &globals.functions {
            functions.insert(
                function_name(signature).to_string(),
                (signature.clone(), function.clone()),
            );
        }
        for (signature, function) in local_functions {
            functions.insert(
                function_name(&signature).to_string(),
                (signature, function),
            );
        }

        let request = build_request(
            id,
            input,
            style,
            source_map,
            &importers,
            input_importer.is_some(),
            &functions,
            globals.message_style,
        );

        Tracker {
            id,
            outcome: Some(outcome),
            request: Some(request),
            importers,
            functions,
            messages: Vec::new(),
            state: ClientState::Normal,
            backlog: VecDeque::new(),
            timer: None,
        }
    }

    pub(crate) fn id(&self) -> u32 {
        self.id
    }

    /// The compile-request message, consumed when the dispatcher sends
    /// it to the compiler.
    pub(crate) fn take_request(&mut self) -> proto::InboundMessage {
        self.request.take().expect("request is taken exactly once")
    }

    /// Arm the one-shot timeout timer, if one is configured.
    pub(crate) fn start(&mut self, timeout: Option<Duration>, event_tx: &mpsc::UnboundedSender<Event>) {
        if let Some(timeout) = timeout {
            let event_tx = event_tx.clone();
            let compilation_id = self.id;
            self.timer = Some(tokio::spawn(async move {
                tokio::time::sleep(timeout).await;
                let _ = event_tx.send(Event::TimedOut { compilation_id });
            }));
        }
    }

    /// Handle a message the compiler addressed to this compilation. An
    /// `Err` is a protocol violation, fatal to the whole driver.
    pub(crate) fn receive(
        &mut self,
        message: outbound_message::Message,
        event_tx: &mpsc::UnboundedSender<Event>,
    ) -> Result<Received, Error> {
        use outbound_message::Message;

        match message {
            Message::CompileResponse(response) => {
                let messages = std::mem::take(&mut self.messages);
                let outcome = decode::compile_response(response, messages)?;
                self.finish(outcome.map_err(Error::Compiler));
                Ok(Received::Done)
            }
            Message::LogEvent(event) => {
                self.messages.push(decode::log_event(event)?);
                Ok(Received::Pending)
            }
            Message::CanonicalizeRequest(_)
            | Message::ImportRequest(_)
            | Message::FunctionCallRequest(_) => {
                if !matches!(self.state, ClientState::Normal) {
                    self.backlog.push_back(message);
                    return Ok(Received::Pending);
                }
                self.start_callout(message, event_tx)?;
                Ok(Received::Pending)
            }
            Message::FileImportRequest(request) => Err(Error::protocol(format!(
                "file import requests are not supported (importer {})",
                request.importer_id
            ))),
            Message::Error(_) | Message::VersionResponse(_) => Err(Error::protocol(
                "message without a compilation delivered to one",
            )),
        }
    }

    /// The next queued nested request, once no callout is in flight.
    pub(crate) fn pop_backlog(&mut self) -> Option<outbound_message::Message> {
        match self.state {
            ClientState::Normal => self.backlog.pop_front(),
            _ => None,
        }
    }

    /// A host callout finished; decide what happens to its reply.
    pub(crate) fn finish_callout(&mut self) -> CalloutOutcome {
        match std::mem::replace(&mut self.state, ClientState::Normal) {
            ClientState::ActiveCancelled(error) => {
                self.finish(Err(error));
                CalloutOutcome::Cancelled
            }
            ClientState::Active | ClientState::Normal => CalloutOutcome::Forward,
        }
    }

    /// Fail this compilation. Returns true when the outcome resolved
    /// now; false when a callout is in flight and the failure is
    /// buffered until it returns.
    pub(crate) fn cancel(&mut self, error: Error) -> bool {
        match self.state {
            ClientState::Active => {
                self.state = ClientState::ActiveCancelled(error);
                false
            }
            ClientState::ActiveCancelled(_) => false,
            ClientState::Normal => {
                self.finish(Err(error));
                true
            }
        }
    }

    fn finish(&mut self, outcome: Result<CompileResults, Error>) {
        if let Some(timer) = self.timer.take() {
            timer.abort();
        }
        if let Some(sender) = self.outcome.take() {
            let _ = sender.send(outcome);
        }
    }

    // Validate a nested request and spawn the host callout servicing
    // it. Validation failures are protocol errors and happen before
    // anything is spawned; the spawned future only runs host code and
    // builds the reply.
    fn start_callout(
        &mut self,
        message: outbound_message::Message,
        event_tx: &mpsc::UnboundedSender<Event>,
    ) -> Result<(), Error> {
        use outbound_message::Message;

        let reply: BoxFuture<'static, inbound_message::Message> = match message {
            Message::CanonicalizeRequest(request) => {
                let importer = self.custom_importer(request.importer_id)?;
                async move {
                    use inbound_message::canonicalize_response::Result;
                    let result = match importer
                        .canonicalize(&request.url, request.from_import)
                        .await
                    {
                        Ok(Some(url)) => Some(Result::Url(url.to_string())),
                        Ok(None) => None,
                        Err(error) => Some(Result::Error(format!("{error:#}"))),
                    };
                    inbound_message::Message::CanonicalizeResponse(
                        inbound_message::CanonicalizeResponse {
                            id: request.id,
                            result,
                        },
                    )
                }
                .boxed()
            }
            Message::ImportRequest(request) => {
                let importer = self.custom_importer(request.importer_id)?;
                let url = Url::parse(&request.url).map_err(|error| {
                    Error::protocol(format!(
                        "malformed canonical URL {:?}: {error}",
                        request.url
                    ))
                })?;
                async move {
                    use inbound_message::import_response::{ImportSuccess, Result};
                    let result = match importer.load(&url).await {
                        Ok(results) => Result::Success(ImportSuccess {
                            contents: results.contents,
                            syntax: encode::syntax(results.syntax) as i32,
                            source_map_url: results
                                .source_map_url
                                .map(|url| url.to_string())
                                .unwrap_or_default(),
                        }),
                        Err(error) => Result::Error(format!("{error:#}")),
                    };
                    inbound_message::Message::ImportResponse(inbound_message::ImportResponse {
                        id: request.id,
                        result: Some(result),
                    })
                }
                .boxed()
            }
            Message::FunctionCallRequest(request) => {
                use outbound_message::function_call_request::Identifier;

                let function = match &request.identifier {
                    Some(Identifier::FunctionId(id)) => registry::lookup(*id).ok_or_else(|| {
                        Error::protocol(format!("unknown host function id {id}"))
                    })?,
                    Some(Identifier::Name(name)) => self
                        .functions
                        .get(name)
                        .map(|(_, function)| function.clone())
                        .ok_or_else(|| {
                            Error::protocol(format!("unknown function name {name:?}"))
                        })?,
                    None => return Err(Error::protocol("function call with no identifier")),
                };

                let mut decoder = decode::Decoder::new();
                let arguments = request
                    .arguments
                    .into_iter()
                    .map(|argument| decoder.value(argument))
                    .collect::<Result<Vec<_>, _>>()?;
                let id = request.id;

                async move {
                    use inbound_message::function_call_response::Result;
                    let result = match function(arguments).await {
                        Ok(value) => Result::Success(encode::value(&value)),
                        Err(error) => Result::Error(format!("{error:#}")),
                    };
                    inbound_message::Message::FunctionCallResponse(
                        inbound_message::FunctionCallResponse {
                            id,
                            result: Some(result),
                            accessed_argument_lists: decoder.accessed_argument_lists(),
                        },
                    )
                }
                .boxed()
            }
            _ => unreachable!("only nested requests start callouts"),
        };

        self.state = ClientState::Active;
        let compilation_id = self.id;
        let event_tx = event_tx.clone();
        tokio::spawn(async move {
            let message = reply.await;
            let _ = event_tx.send(Event::CalloutDone {
                compilation_id,
                reply: proto::InboundMessage {
                    message: Some(message),
                },
            });
        });
        Ok(())
    }

    fn custom_importer(&self, importer_id: u32) -> Result<Arc<dyn Importer>, Error> {
        let index = importer_id
            .checked_sub(FIRST_IMPORTER_ID)
            .map(|index| index as usize);
        match index.and_then(|index| self.importers.get(index)) {
            Some(ImportResolver::Importer(importer)) => Ok(importer.clone()),
            Some(ImportResolver::LoadPath(_)) => Err(Error::protocol(format!(
                "importer id {importer_id} names a load path, which takes no requests"
            ))),
            None => Err(Error::protocol(format!(
                "importer id {importer_id} out of range for compilation {}",
                self.id
            ))),
        }
    }
}

#[allow(clippy::too_many_arguments)]
fn build_request(
    id: u32,
    input: CompileInput,
    style: OutputStyle,
    source_map: SourceMapStyle,
    importers: &[ImportResolver],
    has_input_importer: bool,
    functions: &HashMap<String, (String, SassFunction)>,
    message_style: MessageStyle,
) -> proto::InboundMessage {
    use inbound_message::compile_request::{self, Importer as WireImporter};

    let wire_importer = |resolver: &ImportResolver, id: u32| WireImporter {
        importer: Some(match resolver {
            ImportResolver::LoadPath(path) => {
                compile_request::importer::Importer::Path(path.to_string_lossy().into_owned())
            }
            ImportResolver::Importer(_) => compile_request::importer::Importer::ImporterId(id),
        }),
    };

    let input = match input {
        CompileInput::Path(path) => {
            compile_request::Input::Path(path.to_string_lossy().into_owned())
        }
        CompileInput::String {
            source,
            syntax,
            url,
            importer: _,
        } => compile_request::Input::String(compile_request::StringInput {
            source,
            url: url.map(|url| url.to_string()).unwrap_or_default(),
            syntax: encode::syntax(syntax) as i32,
            importer: has_input_importer.then(|| wire_importer(&importers[0], FIRST_IMPORTER_ID)),
        }),
    };

    // The input importer, when present, is addressed from StringInput;
    // the fallback list carries the remaining slots, ids shifted past
    // it.
    let skip = usize::from(has_input_importer);
    let wire_importers = importers
        .iter()
        .enumerate()
        .skip(skip)
        .map(|(index, resolver)| wire_importer(resolver, FIRST_IMPORTER_ID + index as u32))
        .collect();

    let request = inbound_message::CompileRequest {
        id,
        input: Some(input),
        style: encode::output_style(style) as i32,
        source_map: source_map.wants_map(),
        importers: wire_importers,
        global_functions: functions
            .values()
            .map(|(signature, _)| signature.clone())
            .collect(),
        alert_color: matches!(message_style, MessageStyle::TerminalColored),
        alert_ascii: matches!(message_style, MessageStyle::Plain),
        source_map_include_sources: source_map.wants_sources(),
    };

    proto::InboundMessage {
        message: Some(inbound_message::Message::CompileRequest(request)),
    }
}
