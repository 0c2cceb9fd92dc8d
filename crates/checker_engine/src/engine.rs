use std::sync::{mpsc, Arc, Mutex};
use std::thread;
use std::time::Duration;

use checker_core::{AnalysisMode, AnalysisRequest};
use checker_logging::{checker_info, checker_warn};
use tokio_util::sync::CancellationToken;

use crate::api::CheckerApi;
use crate::stream::ChannelProgressSink;
use crate::types::ClientEvent;

enum ClientCommand {
    Analyze {
        request: AnalysisRequest,
        mode: AnalysisMode,
    },
    Cancel,
    FetchJob {
        url: String,
    },
    LoadHistory {
        user_id: String,
        limit: usize,
    },
    CheckHealth,
}

type InFlight = Arc<Mutex<Option<CancellationToken>>>;

/// Sends commands to the background runtime. Dropping the handle stops it.
pub struct ClientHandle {
    cmd_tx: mpsc::Sender<ClientCommand>,
    in_flight: InFlight,
}

/// Receives [`ClientEvent`]s produced by the background runtime.
pub struct ClientEvents {
    event_rx: mpsc::Receiver<ClientEvent>,
}

impl ClientHandle {
    /// Starts a tokio runtime on its own thread that executes commands
    /// against `api`.
    ///
    /// With `listen_for_interrupt`, Ctrl-C cancels the running analysis; a
    /// second Ctrl-C, or one with nothing running, exits the process.
    pub fn spawn(
        api: Arc<dyn CheckerApi>,
        listen_for_interrupt: bool,
    ) -> std::io::Result<(Self, ClientEvents)> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(2)
            .enable_all()
            .build()?;
        let (cmd_tx, cmd_rx) = mpsc::channel();
        let (event_tx, event_rx) = mpsc::channel();
        let in_flight: InFlight = Arc::new(Mutex::new(None));

        if listen_for_interrupt {
            let signal_in_flight = in_flight.clone();
            runtime.spawn(async move {
                while tokio::signal::ctrl_c().await.is_ok() {
                    if !cancel_in_flight(&signal_in_flight) {
                        checker_info!("interrupted with nothing running; exiting");
                        std::process::exit(130);
                    }
                }
            });
        }

        let loop_in_flight = in_flight.clone();
        thread::Builder::new()
            .name("checker-engine".to_string())
            .spawn(move || {
                while let Ok(command) = cmd_rx.recv() {
                    if let ClientCommand::Cancel = command {
                        cancel_in_flight(&loop_in_flight);
                        continue;
                    }
                    let cancel = match &command {
                        ClientCommand::Analyze { .. } => {
                            let token = CancellationToken::new();
                            if let Ok(mut slot) = loop_in_flight.lock() {
                                *slot = Some(token.clone());
                            }
                            token
                        }
                        _ => CancellationToken::new(),
                    };
                    let api = api.clone();
                    let event_tx = event_tx.clone();
                    runtime.spawn(async move {
                        handle_command(api.as_ref(), command, event_tx, cancel).await;
                    });
                }
                runtime.shutdown_timeout(Duration::from_secs(1));
            })?;

        Ok((Self { cmd_tx, in_flight }, ClientEvents { event_rx }))
    }

    pub fn analyze(&self, request: AnalysisRequest, mode: AnalysisMode) {
        let _ = self.cmd_tx.send(ClientCommand::Analyze { request, mode });
    }

    pub fn cancel(&self) {
        let _ = self.cmd_tx.send(ClientCommand::Cancel);
    }

    pub fn fetch_job(&self, url: impl Into<String>) {
        let _ = self.cmd_tx.send(ClientCommand::FetchJob { url: url.into() });
    }

    pub fn load_history(&self, user_id: impl Into<String>, limit: usize) {
        let _ = self.cmd_tx.send(ClientCommand::LoadHistory {
            user_id: user_id.into(),
            limit,
        });
    }

    pub fn check_health(&self) {
        let _ = self.cmd_tx.send(ClientCommand::CheckHealth);
    }

    /// Cancels the running analysis directly, without going through the
    /// command queue. Returns false when nothing was running.
    pub fn interrupt(&self) -> bool {
        cancel_in_flight(&self.in_flight)
    }
}

impl ClientEvents {
    /// Blocks until the next event; `None` once the runtime has stopped.
    pub fn recv(&self) -> Option<ClientEvent> {
        self.event_rx.recv().ok()
    }

    pub fn try_recv(&self) -> Option<ClientEvent> {
        self.event_rx.try_recv().ok()
    }

    pub fn recv_timeout(&self, timeout: Duration) -> Option<ClientEvent> {
        self.event_rx.recv_timeout(timeout).ok()
    }
}

fn cancel_in_flight(in_flight: &InFlight) -> bool {
    let token = in_flight.lock().ok().and_then(|mut slot| slot.take());
    match token {
        Some(token) if !token.is_cancelled() => {
            checker_info!("cancelling running analysis");
            token.cancel();
            true
        }
        _ => false,
    }
}

async fn handle_command(
    api: &dyn CheckerApi,
    command: ClientCommand,
    event_tx: mpsc::Sender<ClientEvent>,
    cancel: CancellationToken,
) {
    let event = match command {
        ClientCommand::Analyze { request, mode } => {
            // Marks the token spent once this analysis is over.
            let _spent = cancel.clone().drop_guard();
            let result = match mode {
                AnalysisMode::Streaming => {
                    let sink = ChannelProgressSink::new(event_tx.clone());
                    api.analyze_stream(&request, &sink, &cancel).await
                }
                AnalysisMode::Blocking => api.analyze(&request, &cancel).await,
            };
            if let Err(err) = &result {
                checker_warn!("analysis failed: {}", err);
            }
            ClientEvent::AnalysisFinished(result)
        }
        ClientCommand::FetchJob { url } => {
            let result = api.fetch_job(&url).await;
            ClientEvent::JobFetched { url, result }
        }
        ClientCommand::LoadHistory { user_id, limit } => {
            ClientEvent::HistoryLoaded(api.history(&user_id, limit).await)
        }
        ClientCommand::CheckHealth => ClientEvent::HealthChecked(api.health().await),
        ClientCommand::Cancel => return,
    };
    let _ = event_tx.send(event);
}
