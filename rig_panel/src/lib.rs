pub mod app;
pub mod app_state;
pub mod config;
pub mod console;
pub mod controller;
pub mod dropdown;
pub mod error;
pub mod render;
pub mod state;
pub mod ws_actor;

pub use app::{spawn, PanelHandle};
pub use app_state::{AppState, LinkCommand, LinkEvent, UserIntent};
pub use config::PanelConfig;
pub use controller::PanelController;
pub use error::PanelError;
pub use render::{Recorder, Renderer, UiUpdate};
pub use state::UiState;
