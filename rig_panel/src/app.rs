use crate::app_state::{AppState, UserIntent};
use crate::config::PanelConfig;
use crate::controller::PanelController;
use crate::render::Renderer;
use crate::ws_actor;
use tokio::sync::mpsc;
use tokio::task::{JoinError, JoinHandle};
use tokio_util::sync::CancellationToken;

/// A running panel: the connection actor plus the controller task.
pub struct PanelHandle<R> {
    state: AppState,
    controller: JoinHandle<PanelController<R>>,
    link: JoinHandle<()>,
}

/// Spawns the connection actor and the controller onto the current runtime.
pub fn spawn<R>(config: PanelConfig, renderer: R) -> PanelHandle<R>
where
    R: Renderer + Send + 'static,
{
    let shutdown = CancellationToken::new();
    let (link_tx, link_rx) = mpsc::channel(config.channel_capacity);
    let (event_tx, event_rx) = mpsc::channel(config.channel_capacity);
    let (intent_tx, intent_rx) = mpsc::channel(config.channel_capacity);

    let link = tokio::spawn(ws_actor::run(
        config.endpoint.clone(),
        config.reconnect_delay,
        link_rx,
        event_tx,
        shutdown.clone(),
    ));

    let controller = PanelController::new(renderer, link_tx, config.reveal_delay);
    let controller = tokio::spawn(controller.run(intent_rx, event_rx, shutdown.clone()));

    PanelHandle {
        state: AppState {
            intents: intent_tx,
            shutdown,
        },
        controller,
        link,
    }
}

impl<R> PanelHandle<R> {
    pub fn intents(&self) -> mpsc::Sender<UserIntent> {
        self.state.intents.clone()
    }

    /// Cancels every pending delay and waits for both tasks to stop.
    pub async fn shutdown(self) -> Result<PanelController<R>, JoinError> {
        self.state.shutdown.cancel();
        self.link.await?;
        self.controller.await
    }
}
