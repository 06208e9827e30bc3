// ── Controller abstraction ──
//
// Full lifecycle management for a Cirrus API connection.
// Handles client setup, background refresh, command routing,
// and reactive data streaming through the DataStore.

use std::sync::Arc;
use std::time::Duration;

use cirrus_api::{CloudClient, Credentials, TlsMode, TransportConfig};
use tokio::sync::{Mutex, mpsc, watch};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::command::{Command, CommandEnvelope, CommandResult};
use crate::config::{AuthCredentials, ControllerConfig, TlsVerification};
use crate::error::CoreError;
use crate::model::{AccountNotice, Domain, EntityId, Event, Image, LoadBalancer, Server, Volume};
use crate::search::{SearchCorpus, SearchResults, search};
use crate::store::{Collection, DataStore, Fetched, RefreshOutcome};
use crate::stream::EntityStream;

const COMMAND_CHANNEL_SIZE: usize = 64;

/// Every collection a full refresh pulls.
const ALL_COLLECTIONS: [Collection; 8] = [
    Collection::Servers,
    Collection::Volumes,
    Collection::Domains,
    Collection::LoadBalancers,
    Collection::Images,
    Collection::ServerTypes,
    Collection::Events,
    Collection::Notices,
];

// ── ConnectionState ──────────────────────────────────────────────

/// Connection state observable by consumers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectionState {
    Disconnected,
    Connecting,
    Connected,
    Failed,
}

// ── Controller ───────────────────────────────────────────────────

/// The main entry point for consumers.
///
/// Cheaply cloneable via `Arc<ControllerInner>`. Manages the connection
/// lifecycle: client setup, background data refresh, command routing,
/// and reactive entity streaming.
#[derive(Clone)]
pub struct Controller {
    inner: Arc<ControllerInner>,
}

struct ControllerInner {
    config: ControllerConfig,
    store: Arc<DataStore>,
    connection_state: watch::Sender<ConnectionState>,
    command_tx: Mutex<mpsc::Sender<CommandEnvelope>>,
    command_rx: Mutex<Option<mpsc::Receiver<CommandEnvelope>>>,
    cancel: CancellationToken,
    /// Child token for the current connection. Cancelled on disconnect,
    /// replaced on reconnect.
    cancel_child: Mutex<CancellationToken>,
    client: Mutex<Option<CloudClient>>,
    task_handles: Mutex<Vec<JoinHandle<()>>>,
}

impl Controller {
    /// Create a new Controller from configuration. Does NOT connect --
    /// call [`connect()`](Self::connect) to fetch data and start background tasks.
    pub fn new(config: ControllerConfig) -> Self {
        Self::with_store(config, Arc::new(DataStore::new()))
    }

    /// Like [`new`](Self::new), writing into an existing store.
    pub fn with_store(config: ControllerConfig, store: Arc<DataStore>) -> Self {
        let (connection_state, _) = watch::channel(ConnectionState::Disconnected);
        let (command_tx, command_rx) = mpsc::channel(COMMAND_CHANNEL_SIZE);
        let cancel = CancellationToken::new();
        let cancel_child = cancel.child_token();

        Self {
            inner: Arc::new(ControllerInner {
                config,
                store,
                connection_state,
                command_tx: Mutex::new(command_tx),
                command_rx: Mutex::new(Some(command_rx)),
                cancel,
                cancel_child: Mutex::new(cancel_child),
                client: Mutex::new(None),
                task_handles: Mutex::new(Vec::new()),
            }),
        }
    }

    /// Access the controller configuration.
    pub fn config(&self) -> &ControllerConfig {
        &self.inner.config
    }

    /// Access the underlying DataStore.
    pub fn store(&self) -> &Arc<DataStore> {
        &self.inner.store
    }

    // ── Connection lifecycle ─────────────────────────────────────

    /// Connect to the API.
    ///
    /// Builds the HTTP client, performs an initial full refresh, and
    /// spawns background tasks (periodic refresh, command processor).
    /// A rejected token, or every collection failing, fails the
    /// connection; lesser failures only mark the affected collections.
    pub async fn connect(&self) -> Result<(), CoreError> {
        let _ = self
            .inner
            .connection_state
            .send(ConnectionState::Connecting);

        // Fresh child token for this connection (supports reconnect).
        let child = self.inner.cancel.child_token();
        *self.inner.cancel_child.lock().await = child.clone();

        let config = &self.inner.config;
        let transport = build_transport(config);
        let credentials = match &config.auth {
            AuthCredentials::Token(token) => Credentials::Token(token.clone()),
            AuthCredentials::Anonymous => Credentials::Anonymous,
        };

        let client = match CloudClient::new(config.url.as_str(), &credentials, &transport) {
            Ok(c) => c.with_page_size(config.page_size),
            Err(e) => {
                let _ = self.inner.connection_state.send(ConnectionState::Failed);
                return Err(e.into());
            }
        };
        debug!(base_url = %client.base_url(), "API client ready");
        *self.inner.client.lock().await = Some(client);

        if let Err(e) = self.full_refresh().await {
            *self.inner.client.lock().await = None;
            let _ = self.inner.connection_state.send(ConnectionState::Failed);
            return Err(e);
        }

        let mut handles = self.inner.task_handles.lock().await;

        if let Some(rx) = self.inner.command_rx.lock().await.take() {
            let ctrl = self.clone();
            handles.push(tokio::spawn(command_processor_task(ctrl, rx)));
        }

        let interval_secs = config.refresh_interval_secs;
        if interval_secs > 0 {
            let ctrl = self.clone();
            let cancel = child.clone();
            handles.push(tokio::spawn(refresh_task(ctrl, interval_secs, cancel)));
        }

        let _ = self
            .inner
            .connection_state
            .send(ConnectionState::Connected);
        info!(url = %config.url, "connected");
        Ok(())
    }

    /// Disconnect from the API.
    ///
    /// Cancels background tasks and resets the connection state to
    /// [`Disconnected`](ConnectionState::Disconnected).
    pub async fn disconnect(&self) {
        // Cancel the child token (not the parent, so reconnect works).
        self.inner.cancel_child.lock().await.cancel();

        let mut handles = self.inner.task_handles.lock().await;
        for handle in handles.drain(..) {
            let _ = handle.await;
        }

        *self.inner.client.lock().await = None;

        // Recreate command channel so reconnects can spawn a fresh receiver.
        // The previous receiver is consumed by the command processor task.
        {
            let (tx, rx) = mpsc::channel(COMMAND_CHANNEL_SIZE);
            *self.inner.command_tx.lock().await = tx;
            *self.inner.command_rx.lock().await = Some(rx);
        }

        let _ = self
            .inner
            .connection_state
            .send(ConnectionState::Disconnected);
        debug!("disconnected");
    }

    /// Fetch every collection and update the DataStore.
    pub async fn full_refresh(&self) -> Result<(), CoreError> {
        self.refresh(&ALL_COLLECTIONS).await
    }

    /// Fetch the given collections concurrently and apply them to the
    /// DataStore.
    ///
    /// Each collection succeeds or fails independently. Only collections
    /// that have never loaded, or whose last fetch failed, are flagged as
    /// loading first.
    /// Returns an error when the API rejected the token or when every
    /// requested collection failed.
    pub async fn refresh(&self, collections: &[Collection]) -> Result<(), CoreError> {
        let client = self.client().await?;
        let store = &self.inner.store;

        let stale: Vec<Collection> = collections
            .iter()
            .copied()
            .filter(|c| {
                let status = store.status(*c);
                !status.is_loaded() || status.error.is_some()
            })
            .collect();
        store.mark_loading(&stale);

        let wants = |c: Collection| collections.contains(&c);

        let (
            (servers, volumes, domains, load_balancers),
            (images, server_types, events, notices),
        ) = tokio::join!(
            async {
                tokio::join!(
                    fetch_if(wants(Collection::Servers), client.get_all_servers()),
                    fetch_if(wants(Collection::Volumes), client.get_all_volumes()),
                    fetch_if(wants(Collection::Domains), client.get_all_domains()),
                    fetch_if(
                        wants(Collection::LoadBalancers),
                        client.get_all_load_balancers()
                    ),
                )
            },
            async {
                tokio::join!(
                    fetch_if(wants(Collection::Images), client.get_all_images()),
                    fetch_if(
                        wants(Collection::ServerTypes),
                        client.get_all_server_types()
                    ),
                    fetch_if(wants(Collection::Events), client.get_recent_events()),
                    fetch_if(wants(Collection::Notices), client.get_all_notices()),
                )
            },
        );

        let mut failures = Failures::default();
        let outcome = RefreshOutcome {
            servers: failures.settle(servers),
            volumes: failures.settle(volumes),
            domains: failures.settle(domains),
            load_balancers: failures.settle(load_balancers),
            images: failures.settle(images),
            server_types: failures.settle(server_types),
            events: failures.settle(events),
            notices: failures.settle(notices),
        };

        store.apply_refresh(outcome);

        info!(
            servers = store.server_count(),
            volumes = store.volume_count(),
            domains = store.domain_count(),
            load_balancers = store.load_balancer_count(),
            failed = failures.count,
            "data refresh complete"
        );

        failures.into_result(collections.len())
    }

    // ── Search ───────────────────────────────────────────────────

    /// Fetch the four searchable collections fresh from the API, paired
    /// with the store's public images and plan names.
    ///
    /// Fails as a whole if any of the four fetches fails.
    pub async fn fetch_search_corpus(&self) -> Result<SearchCorpus, CoreError> {
        let client = self.client().await?;
        let bundle = client.fetch_all_entities().await?;
        let store = &self.inner.store;

        Ok(SearchCorpus {
            servers: arcs(bundle.servers),
            volumes: arcs(bundle.volumes),
            domains: arcs(bundle.domains),
            load_balancers: arcs(bundle.load_balancers),
            images: store.images_snapshot().to_vec(),
            plan_labels: store.plan_labels(),
        })
    }

    /// Fetch and search in one step, using the configured ranking.
    pub async fn search(&self, query: &str) -> Result<SearchResults, CoreError> {
        let corpus = self.fetch_search_corpus().await?;
        Ok(search(query, &corpus, self.inner.config.search.ranking))
    }

    // ── Ad-hoc queries ───────────────────────────────────────────

    /// Fetch one server straight from the API.
    pub async fn get_server(&self, id: &EntityId) -> Result<Server, CoreError> {
        let numeric = require_numeric(id)?;
        let client = self.client().await?;
        Ok(client.get_server(numeric).await?.into())
    }

    // ── Command execution ────────────────────────────────────────

    /// Execute a command against the API.
    ///
    /// Sends the command through the internal channel to the command
    /// processor task and awaits the result.
    pub async fn execute(&self, cmd: Command) -> Result<CommandResult, CoreError> {
        if *self.inner.connection_state.borrow() != ConnectionState::Connected {
            return Err(CoreError::NotConnected);
        }

        let (tx, rx) = tokio::sync::oneshot::channel();

        let command_tx = self.inner.command_tx.lock().await.clone();

        command_tx
            .send(CommandEnvelope {
                command: cmd,
                response_tx: tx,
            })
            .await
            .map_err(|_| CoreError::NotConnected)?;

        rx.await.map_err(|_| CoreError::NotConnected)?
    }

    // ── One-shot convenience ─────────────────────────────────────

    /// One-shot: connect, run closure, disconnect.
    ///
    /// Disables the periodic refresh since a CLI invocation only needs a
    /// single request-response cycle.
    pub async fn oneshot<F, Fut, T>(config: ControllerConfig, f: F) -> Result<T, CoreError>
    where
        F: FnOnce(Controller) -> Fut,
        Fut: std::future::Future<Output = Result<T, CoreError>>,
    {
        let mut cfg = config;
        cfg.refresh_interval_secs = 0;

        let controller = Controller::new(cfg);
        controller.connect().await?;
        let result = f(controller.clone()).await;
        controller.disconnect().await;
        result
    }

    // ── State observation ────────────────────────────────────────

    /// Subscribe to connection state changes.
    pub fn connection_state(&self) -> watch::Receiver<ConnectionState> {
        self.inner.connection_state.subscribe()
    }

    // ── Snapshot accessors (delegate to DataStore) ───────────────

    pub fn servers_snapshot(&self) -> Arc<Vec<Arc<Server>>> {
        self.inner.store.servers_snapshot()
    }

    pub fn volumes_snapshot(&self) -> Arc<Vec<Arc<Volume>>> {
        self.inner.store.volumes_snapshot()
    }

    pub fn domains_snapshot(&self) -> Arc<Vec<Arc<Domain>>> {
        self.inner.store.domains_snapshot()
    }

    pub fn load_balancers_snapshot(&self) -> Arc<Vec<Arc<LoadBalancer>>> {
        self.inner.store.load_balancers_snapshot()
    }

    pub fn images_snapshot(&self) -> Arc<Vec<Arc<Image>>> {
        self.inner.store.images_snapshot()
    }

    pub fn events_snapshot(&self) -> Arc<Vec<Arc<Event>>> {
        self.inner.store.events_snapshot()
    }

    pub fn notices_snapshot(&self) -> Arc<Vec<Arc<AccountNotice>>> {
        self.inner.store.notices_snapshot()
    }

    // ── Stream accessors (delegate to DataStore) ─────────────────

    pub fn servers(&self) -> EntityStream<Server> {
        self.inner.store.subscribe_servers()
    }

    pub fn volumes(&self) -> EntityStream<Volume> {
        self.inner.store.subscribe_volumes()
    }

    pub fn domains(&self) -> EntityStream<Domain> {
        self.inner.store.subscribe_domains()
    }

    pub fn load_balancers(&self) -> EntityStream<LoadBalancer> {
        self.inner.store.subscribe_load_balancers()
    }

    pub fn events(&self) -> EntityStream<Event> {
        self.inner.store.subscribe_events()
    }

    pub fn notices(&self) -> EntityStream<AccountNotice> {
        self.inner.store.subscribe_notices()
    }

    // ── Internals ────────────────────────────────────────────────

    async fn client(&self) -> Result<CloudClient, CoreError> {
        self.inner
            .client
            .lock()
            .await
            .clone()
            .ok_or(CoreError::NotConnected)
    }
}

// ── Background tasks ─────────────────────────────────────────────

/// Periodically refresh all data from the API.
async fn refresh_task(controller: Controller, interval_secs: u64, cancel: CancellationToken) {
    let mut interval = tokio::time::interval(Duration::from_secs(interval_secs));
    interval.tick().await; // consume the immediate first tick

    loop {
        tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            _ = interval.tick() => {
                if let Err(e) = controller.full_refresh().await {
                    warn!(error = %e, "periodic refresh failed");
                }
            }
        }
    }
}

/// Process commands from the mpsc channel, routing each to the
/// matching API call.
async fn command_processor_task(controller: Controller, mut rx: mpsc::Receiver<CommandEnvelope>) {
    let cancel = controller.inner.cancel_child.lock().await.clone();

    loop {
        tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            envelope = rx.recv() => {
                let Some(envelope) = envelope else { break };
                let result = route_command(&controller, envelope.command).await;
                let _ = envelope.response_tx.send(result);
            }
        }
    }
}

// ── Command routing ──────────────────────────────────────────────

/// Route a command to its API call, then refresh what it touched.
async fn route_command(controller: &Controller, cmd: Command) -> Result<CommandResult, CoreError> {
    let client = controller.client().await?;
    debug!(command = ?cmd, "routing command");

    let result = match &cmd {
        Command::BootServer { id } => {
            client.boot_server(require_numeric(id)?).await?;
            CommandResult::Accepted
        }
        Command::RebootServer { id } => {
            client.reboot_server(require_numeric(id)?).await?;
            CommandResult::Accepted
        }
        Command::ShutdownServer { id } => {
            client.shutdown_server(require_numeric(id)?).await?;
            CommandResult::Accepted
        }
        Command::MigrateServer { id } => {
            client.migrate_server(require_numeric(id)?).await?;
            CommandResult::Accepted
        }
        Command::MarkEventSeen { id } => {
            client.mark_event_seen(*id).await?;
            CommandResult::Ok
        }
    };

    if let Err(e) = controller.refresh(cmd.affects()).await {
        warn!(error = %e, command = cmd.verb(), "refresh after command failed");
    }
    Ok(result)
}

// ── Helpers ──────────────────────────────────────────────────────

/// Run `fut` only when `wanted`; `None` leaves the collection untouched.
async fn fetch_if<T, Fut>(wanted: bool, fut: Fut) -> Option<Result<Vec<T>, cirrus_api::Error>>
where
    Fut: std::future::Future<Output = Result<Vec<T>, cirrus_api::Error>>,
{
    if wanted { Some(fut.await) } else { None }
}

/// Failures collected while settling one refresh cycle.
#[derive(Default)]
struct Failures {
    count: usize,
    /// The API rejected the token outright.
    rejected: Option<CoreError>,
    first: Option<CoreError>,
}

impl Failures {
    /// Convert a wire fetch into store form, recording any failure.
    fn settle<R, T: From<R>>(
        &mut self,
        fetched: Option<Result<Vec<R>, cirrus_api::Error>>,
    ) -> Fetched<T> {
        Some(match fetched? {
            Ok(items) => Ok(items.into_iter().map(T::from).collect()),
            Err(e) => {
                self.count += 1;
                let rejected = matches!(
                    e,
                    cirrus_api::Error::InvalidToken | cirrus_api::Error::Authentication { .. }
                );
                let err = CoreError::from(e);
                let message = err.summary();
                if rejected && self.rejected.is_none() {
                    self.rejected = Some(err);
                } else if self.first.is_none() {
                    self.first = Some(err);
                }
                Err(message)
            }
        })
    }

    /// A rejected token fails the refresh, as does every requested
    /// collection failing. Anything less only marks the collections.
    fn into_result(self, requested: usize) -> Result<(), CoreError> {
        if let Some(err) = self.rejected {
            return Err(err);
        }
        match self.first {
            Some(err) if self.count >= requested => Err(err),
            _ => Ok(()),
        }
    }
}

fn arcs<R, T: From<R>>(items: Vec<R>) -> Vec<Arc<T>> {
    items.into_iter().map(|r| Arc::new(T::from(r))).collect()
}

/// Build a [`TransportConfig`] from the controller configuration.
fn build_transport(config: &ControllerConfig) -> TransportConfig {
    TransportConfig {
        tls: tls_to_transport(&config.tls),
        timeout: config.timeout,
    }
}

fn tls_to_transport(tls: &TlsVerification) -> TlsMode {
    match tls {
        TlsVerification::SystemDefaults => TlsMode::System,
        TlsVerification::CustomCa(path) => TlsMode::CustomCa(path.clone()),
        TlsVerification::DangerAcceptInvalid => TlsMode::DangerAcceptInvalid,
    }
}

fn require_numeric(id: &EntityId) -> Result<u64, CoreError> {
    id.as_numeric().ok_or_else(|| CoreError::ValidationFailed {
        message: format!("expected a numeric id, got {id}"),
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use cirrus_api::types::ServerResponse;

    use super::*;

    #[test]
    fn numeric_ids_only_for_server_actions() {
        assert_eq!(require_numeric(&EntityId::Numeric(7)).unwrap(), 7);
        assert!(matches!(
            require_numeric(&EntityId::Slug("public/debian".into())),
            Err(CoreError::ValidationFailed { .. })
        ));
    }

    #[test]
    fn tls_modes_map_one_to_one() {
        assert!(matches!(
            tls_to_transport(&TlsVerification::DangerAcceptInvalid),
            TlsMode::DangerAcceptInvalid
        ));
        assert!(matches!(
            tls_to_transport(&TlsVerification::SystemDefaults),
            TlsMode::System
        ));
    }

    #[test]
    fn rejected_token_fails_the_refresh() {
        let mut failures = Failures::default();
        let fetched: Fetched<Server> = failures.settle::<ServerResponse, Server>(Some(Err(
            cirrus_api::Error::InvalidToken,
        )));
        assert!(matches!(fetched, Some(Err(_))));

        let skipped: Fetched<Server> = failures.settle::<ServerResponse, Server>(None);
        assert!(skipped.is_none());
        assert!(matches!(
            failures.into_result(8),
            Err(CoreError::AuthenticationFailed { .. })
        ));
    }

    #[test]
    fn partial_failure_is_not_fatal() {
        let mut failures = Failures::default();
        let _: Fetched<Server> = failures.settle::<ServerResponse, Server>(Some(Err(
            cirrus_api::Error::Timeout { timeout_secs: 30 },
        )));
        let _: Fetched<Server> = failures.settle::<ServerResponse, Server>(Some(Ok(Vec::new())));
        assert_eq!(failures.count, 1);
        assert!(failures.into_result(2).is_ok());
    }

    #[test]
    fn total_failure_is_fatal() {
        let mut failures = Failures::default();
        let _: Fetched<Server> = failures.settle::<ServerResponse, Server>(Some(Err(
            cirrus_api::Error::Timeout { timeout_secs: 30 },
        )));
        assert!(matches!(
            failures.into_result(1),
            Err(CoreError::Timeout { timeout_secs: 30 })
        ));
    }
}
