use thiserror::Error;

/// Errors from the session store.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("session store unavailable: {0}")]
    Unavailable(String),

    #[error("corrupt session row: {0}")]
    Corrupt(String),
}

/// Errors from the commerce backend client.
///
/// `Api` is a non-2xx response; there are no client-internal retries, the
/// dispatcher's catch-all decides what happens next.
#[derive(Debug, Error)]
pub enum CommerceError {
    #[error("transport error: {0}")]
    Transport(String),

    #[error("api error: HTTP {status}: {body}")]
    Api { status: u16, body: String },

    #[error("not found")]
    NotFound,

    #[error("deserialization error: {0}")]
    Deserialization(String),
}

/// Errors from the messaging gateway.
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("transport error: {0}")]
    Transport(String),

    #[error("api error: HTTP {status}: {body}")]
    Api { status: u16, body: String },
}

/// Anything that can fail inside one dispatch.
///
/// The dispatcher logs these and drops the event; the stored state is left
/// unmodified so the next event retries from where the chat was.
#[derive(Debug, Error)]
pub enum DispatchError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Commerce(#[from] CommerceError),

    #[error(transparent)]
    Gateway(#[from] GatewayError),
}
