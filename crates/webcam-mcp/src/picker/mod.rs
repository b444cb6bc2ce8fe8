//! Local browser page for choosing the active camera.
//!
//! The picker is an HTTP server on an ephemeral loopback port. It shuts
//! itself down after [`PICKER_LIFETIME`]; opening it again while it is
//! still up only re-launches the browser.

mod page;
pub mod routes;

use std::net::{Ipv4Addr, SocketAddr};
use std::time::{Duration, Instant};

use tokio::net::TcpListener;
use tokio::sync::{oneshot, Mutex};
use tokio::task::JoinHandle;

use webcam::command::run_detached;
use webcam::WebcamResult;

use crate::session::SharedSession;

/// How long a picker stays reachable after it is opened.
pub const PICKER_LIFETIME: Duration = Duration::from_secs(60);

/// What [`CameraPicker::open`] did.
#[derive(Debug, Clone)]
pub struct PickerLaunch {
    pub url: String,
    /// An already running picker was reused.
    pub reopened: bool,
    pub browser_opened: bool,
    pub expires_in: Duration,
}

struct RunningPicker {
    url: String,
    started: Instant,
    server: JoinHandle<()>,
    shutdown: Option<oneshot::Sender<()>>,
}

impl RunningPicker {
    fn is_alive(&self) -> bool {
        !self.server.is_finished()
    }
}

pub struct CameraPicker {
    session: SharedSession,
    lifetime: Duration,
    open_browser: bool,
    running: Mutex<Option<RunningPicker>>,
}

impl CameraPicker {
    pub fn new(session: SharedSession) -> Self {
        Self {
            session,
            lifetime: PICKER_LIFETIME,
            open_browser: true,
            running: Mutex::new(None),
        }
    }

    pub fn with_lifetime(mut self, lifetime: Duration) -> Self {
        self.lifetime = lifetime;
        self
    }

    /// Serve the page without launching a browser.
    pub fn without_browser(mut self) -> Self {
        self.open_browser = false;
        self
    }

    /// URL of the running picker, if any.
    pub async fn url(&self) -> Option<String> {
        let running = self.running.lock().await;
        running.as_ref().filter(|r| r.is_alive()).map(|r| r.url.clone())
    }

    /// Start the picker (or reuse a live one) and point the browser at it.
    pub async fn open(&self) -> WebcamResult<PickerLaunch> {
        let (url, reopened, expires_in) = self.ensure_running().await?;
        let browser_opened = self.launch_browser(&url).await;
        Ok(PickerLaunch {
            url,
            reopened,
            browser_opened,
            expires_in,
        })
    }

    /// Returns the url, whether it was already up, and its remaining lifetime.
    async fn ensure_running(&self) -> WebcamResult<(String, bool, Duration)> {
        let mut running = self.running.lock().await;

        if let Some(current) = running.as_ref().filter(|r| r.is_alive()) {
            let expires_in = self.lifetime.saturating_sub(current.started.elapsed());
            tracing::info!("Camera picker already running at {}", current.url);
            return Ok((current.url.clone(), true, expires_in));
        }

        let listener = TcpListener::bind(SocketAddr::from((Ipv4Addr::LOCALHOST, 0))).await?;
        let addr = listener.local_addr()?;
        let url = format!("http://{addr}");

        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
        let app = routes::router(self.session.clone());
        let lifetime = self.lifetime;
        let server = tokio::spawn(async move {
            let shutdown = async move {
                tokio::select! {
                    _ = shutdown_rx => {}
                    _ = tokio::time::sleep(lifetime) => {
                        tracing::info!("Camera picker timed out");
                    }
                }
            };
            if let Err(e) = axum::serve(listener, app).with_graceful_shutdown(shutdown).await {
                tracing::error!("Camera picker server error: {e}");
            }
            tracing::debug!("Camera picker stopped");
        });

        tracing::info!("Camera picker listening on {url}");
        *running = Some(RunningPicker {
            url: url.clone(),
            started: Instant::now(),
            server,
            shutdown: Some(shutdown_tx),
        });
        Ok((url, false, lifetime))
    }

    /// Stop a running picker and wait for it to exit.
    pub async fn close(&self) {
        let Some(mut current) = self.running.lock().await.take() else {
            return;
        };
        if let Some(tx) = current.shutdown.take() {
            let _ = tx.send(());
        }
        if let Err(e) = current.server.await {
            tracing::warn!("Camera picker task failed: {e}");
        }
    }

    /// Failure to launch a browser is not fatal; the URL is still returned.
    async fn launch_browser(&self, url: &str) -> bool {
        if !self.open_browser {
            return false;
        }
        let backend = self.session.lock().await.backend();
        let result = match backend.open_url_command(url) {
            Ok(line) => run_detached(&line).await.map(|_| ()),
            Err(e) => Err(e),
        };
        match result {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!("Failed to open browser for {url}: {e}");
                false
            }
        }
    }
}
