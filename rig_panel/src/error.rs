use thiserror::Error;

#[derive(Debug, Error)]
pub enum PanelError {
    #[error("connection not ready")]
    NotConnected,
    #[error("connection busy, command dropped")]
    LinkBusy,
    #[error("connection actor stopped")]
    LinkClosed,
    #[error("invalid endpoint {url:?}: {reason}")]
    InvalidEndpoint { url: String, reason: String },
    #[error("unrecognized input {0:?}")]
    UnknownInput(String),
}
