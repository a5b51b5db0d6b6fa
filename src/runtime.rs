//! Executes [`Effect`]s on the tokio runtime.
//!
//! Each effect runs in its own task and posts exactly one event back: the
//! outcome, or [`Event::TaskFailed`] if the task panicked. [`startup`] runs
//! the one-off checks before the first frame.

use crate::api::ResourceClient;
use crate::app::{App, Effect};
use crate::connectivity::{ConnectivityProbe, ConnectivitySignal};
use crate::events::Event;
use crate::location::LocationProvider;
use std::future::Future;
use std::sync::Arc;
use tokio::sync::mpsc::UnboundedSender;
use tokio::task::JoinHandle;
use tracing::{info, info_span, warn, Instrument};

/// The two collaborators a lookup chain talks to.
#[derive(Clone)]
pub struct Services {
    pub location: Arc<LocationProvider>,
    pub client: Arc<ResourceClient>,
}

/// Outcome of [`startup`].
pub struct Startup {
    pub online: bool,
    /// Background health check, started only when online.
    pub health: Option<JoinHandle<()>>,
}

/// Probes connectivity once. Offline puts `app` straight into offline mode
/// and contacts nothing else; online starts a health check that only logs.
pub async fn startup(probe: &dyn ConnectivityProbe, services: &Services, app: &mut App) -> Startup {
    let online = probe.is_online().await;
    info!("Startup connectivity: {}", if online { "online" } else { "offline" });

    if !online {
        app.update(Event::Connectivity(ConnectivitySignal::AbsentAtLoad));
        return Startup {
            online,
            health: None,
        };
    }

    let client = Arc::clone(&services.client);
    let health = tokio::spawn(async move {
        match client.health().await {
            Ok(status) => info!("Resource service health: {}", status),
            Err(e) => warn!("Resource service health check failed: {}", e),
        }
    });
    Startup {
        online,
        health: Some(health),
    }
}

pub fn dispatch(effect: Effect, services: &Services, tx: &UnboundedSender<Event>) {
    match effect {
        Effect::AcquireLocation { generation } => {
            let location = Arc::clone(&services.location);
            supervise(generation, tx.clone(), async move {
                let result = location.acquire().await;
                Event::LocationResolved { generation, result }
            });
        }
        Effect::FetchResources { generation, coords } => {
            let client = Arc::clone(&services.client);
            supervise(generation, tx.clone(), async move {
                let result = client.fetch_nearby(coords).await;
                Event::ResourcesResolved { generation, result }
            });
        }
    }
}

fn supervise<F>(generation: u64, tx: UnboundedSender<Event>, work: F)
where
    F: Future<Output = Event> + Send + 'static,
{
    let handle = tokio::spawn(work.instrument(info_span!("lookup", generation)));
    tokio::spawn(async move {
        let event = match handle.await {
            Ok(event) => event,
            Err(e) => Event::TaskFailed {
                generation,
                detail: e.to_string(),
            },
        };
        // The receiver is gone only when the app is shutting down.
        let _ = tx.send(event);
    });
}
