//! Geometry sources: a local assembly definition or a remote design session.
//!
//! Results are delivered as [`PreviewMessage`]s over an mpsc channel and
//! handed to the preview by [`GeometryLoader::poll`] on the UI thread.
//!
//! Remote parameter edits are batched: they are saved once no edit has
//! arrived for [`SAVE_DELAY`], and a new save waits for the previous one.

use std::collections::BTreeMap;
use std::sync::mpsc::{self, Receiver, Sender};
use std::time::{Duration, Instant};

use shared::{AssemblyDefinition, DesignSessionPatch, Geometry, GeometryEngine, ParamValue};
use thiserror::Error;

use super::preview::{PreviewMessage, PreviewState};

/// Quiet period before remote parameter edits are saved
pub const SAVE_DELAY: Duration = Duration::from_millis(400);

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("server returned {status}: {body}")]
    Status { status: u16, body: String },
    #[error("invalid geometry: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("failed to start runtime: {0}")]
    Runtime(#[from] std::io::Error),
}

/// Design session stored on a pattern server
#[derive(Debug, Clone)]
pub struct RemoteSession {
    base_url: String,
    uuid: String,
    http: reqwest::Client,
}

impl RemoteSession {
    pub fn new(base_url: &str, uuid: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            uuid: uuid.to_string(),
            http: reqwest::Client::new(),
        }
    }

    pub fn session_url(&self) -> String {
        format!("{}/api/design_sessions/{}", self.base_url, self.uuid)
    }

    pub fn geometry_url(&self) -> String {
        format!("{}/geometry", self.session_url())
    }

    pub async fn fetch_geometry(&self) -> Result<Geometry, FetchError> {
        let response = self.http.get(self.geometry_url()).send().await?;
        let body = checked_body(response).await?;
        Ok(Geometry::from_json(&body)?)
    }

    pub async fn patch_params(&self, params: BTreeMap<String, ParamValue>) -> Result<(), FetchError> {
        let patch = DesignSessionPatch {
            params_snapshot: Some(params),
            ..DesignSessionPatch::default()
        };
        let response = self
            .http
            .patch(self.session_url())
            .json(&patch)
            .send()
            .await?;
        checked_body(response).await?;
        Ok(())
    }
}

async fn checked_body(response: reqwest::Response) -> Result<String, FetchError> {
    let status = response.status();
    let body = response.text().await?;
    if status.is_success() {
        Ok(body)
    } else {
        Err(FetchError::Status {
            status: status.as_u16(),
            body,
        })
    }
}

pub enum GeometrySource {
    Local {
        definition: AssemblyDefinition,
        snapshot: BTreeMap<String, ParamValue>,
    },
    Remote {
        session: RemoteSession,
        runtime: tokio::runtime::Runtime,
    },
}

/// Remote edits not yet handed to the server
#[derive(Debug, Default)]
struct PendingSave {
    params: BTreeMap<String, ParamValue>,
    due: Option<Instant>,
}

/// Requests geometry and forwards the outcome to the preview.
///
/// Every request bumps a generation counter; replies from older requests are
/// dropped so a slow fetch never overwrites a newer one.
pub struct GeometryLoader {
    source: GeometrySource,
    generation: u64,
    tx: Sender<(u64, PreviewMessage)>,
    rx: Receiver<(u64, PreviewMessage)>,
    pending: PendingSave,
    /// Values of the save in flight, shown until its geometry arrives
    sent: BTreeMap<String, ParamValue>,
    in_flight: Option<tokio::task::JoinHandle<()>>,
}

impl GeometryLoader {
    pub fn local(definition: AssemblyDefinition) -> Self {
        Self::with_source(GeometrySource::Local {
            definition,
            snapshot: BTreeMap::new(),
        })
    }

    pub fn remote(base_url: &str, uuid: &str) -> Result<Self, FetchError> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(1)
            .enable_all()
            .build()?;
        Ok(Self::with_source(GeometrySource::Remote {
            session: RemoteSession::new(base_url, uuid),
            runtime,
        }))
    }

    fn with_source(source: GeometrySource) -> Self {
        let (tx, rx) = mpsc::channel();
        Self {
            source,
            generation: 0,
            tx,
            rx,
            pending: PendingSave::default(),
            sent: BTreeMap::new(),
            in_flight: None,
        }
    }

    /// Local definition, if this loader computes geometry itself
    pub fn definition(&self) -> Option<&AssemblyDefinition> {
        match &self.source {
            GeometrySource::Local { definition, .. } => Some(definition),
            GeometrySource::Remote { .. } => None,
        }
    }

    pub fn description(&self) -> String {
        match &self.source {
            GeometrySource::Local { definition, .. } => format!("local: {}", definition.name),
            GeometrySource::Remote { session, .. } => format!("remote: {}", session.session_url()),
        }
    }

    /// Swap in another local definition, dropping parameter overrides
    pub fn set_definition(&mut self, definition: AssemblyDefinition) {
        self.pending = PendingSave::default();
        self.sent.clear();
        self.in_flight = None;
        self.source = GeometrySource::Local {
            definition,
            snapshot: BTreeMap::new(),
        };
        self.request();
    }

    /// Ask for fresh geometry
    pub fn request(&mut self) {
        self.generation += 1;
        let generation = self.generation;
        let _ = self.tx.send((generation, PreviewMessage::GeometryLoading));

        match &self.source {
            GeometrySource::Local {
                definition,
                snapshot,
            } => {
                let geometry = GeometryEngine::new(definition, snapshot).build();
                let _ = self
                    .tx
                    .send((generation, PreviewMessage::GeometryLoaded(Box::new(geometry))));
            }
            GeometrySource::Remote { session, runtime } => {
                let session = session.clone();
                let tx = self.tx.clone();
                runtime.spawn(async move {
                    let message = fetch_message(session.fetch_geometry().await);
                    let _ = tx.send((generation, message));
                });
            }
        }
    }

    /// Override one parameter. A local definition is rebuilt at once; a
    /// remote edit is queued until [`flush`](Self::flush) finds it due.
    pub fn set_param(&mut self, key: &str, value: f64) {
        tracing::debug!("set param {key} = {value}");
        match &mut self.source {
            GeometrySource::Local { snapshot, .. } => {
                snapshot.insert(key.to_string(), ParamValue::Number(value));
                self.request();
            }
            GeometrySource::Remote { .. } => {
                self.pending
                    .params
                    .insert(key.to_string(), ParamValue::Number(value));
                self.pending.due = Some(Instant::now() + SAVE_DELAY);
            }
        }
    }

    /// Value of an edit the server has not confirmed yet
    pub fn unsaved_param(&self, key: &str) -> Option<f64> {
        self.pending
            .params
            .get(key)
            .or_else(|| self.sent.get(key))
            .and_then(ParamValue::as_f64)
    }

    /// Remote edits are queued or being saved
    pub fn is_saving(&self) -> bool {
        !self.pending.params.is_empty() || !self.sent.is_empty()
    }

    /// Save queued remote edits once they are due and no save is in flight,
    /// then fetch geometry for them. Returns whether a save was started.
    pub fn flush(&mut self, now: Instant) -> bool {
        let GeometrySource::Remote { session, runtime } = &self.source else {
            return false;
        };
        if self.pending.due.map_or(true, |due| now < due) {
            return false;
        }
        if self
            .in_flight
            .as_ref()
            .is_some_and(|task| !task.is_finished())
        {
            return false;
        }

        let params = std::mem::take(&mut self.pending).params;
        tracing::debug!("saving {} param(s)", params.len());
        self.sent = params.clone();

        self.generation += 1;
        let generation = self.generation;
        let _ = self.tx.send((generation, PreviewMessage::GeometryLoading));

        let session = session.clone();
        let tx = self.tx.clone();
        self.in_flight = Some(runtime.spawn(async move {
            let result = match session.patch_params(params).await {
                Ok(()) => session.fetch_geometry().await,
                Err(e) => Err(e),
            };
            let _ = tx.send((generation, fetch_message(result)));
        }));
        true
    }

    /// Forward every reply of the latest request to the preview
    pub fn poll(&mut self, preview: &mut PreviewState) -> usize {
        let mut forwarded = 0;
        while let Ok((generation, message)) = self.rx.try_recv() {
            if generation != self.generation {
                tracing::debug!("dropping stale reply from request {generation}");
                continue;
            }
            if !matches!(message, PreviewMessage::GeometryLoading) {
                self.sent.clear();
            }
            preview.send(message);
            forwarded += 1;
        }
        forwarded
    }
}

fn fetch_message(result: Result<Geometry, FetchError>) -> PreviewMessage {
    match result {
        Ok(geometry) => PreviewMessage::GeometryLoaded(Box::new(geometry)),
        Err(e) => PreviewMessage::GeometryFailed(e.to_string()),
    }
}
