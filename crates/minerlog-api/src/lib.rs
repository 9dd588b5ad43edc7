// minerlog-api: transport layer for the appliance log stream.

pub mod endpoint;
pub mod error;
pub mod transport;
pub mod websocket;

pub use endpoint::{LOG_STREAM_PATH, log_stream_url, parse_device_url};
pub use error::Error;
pub use transport::{
    Connection, EventSink, FRAME_CHANNEL_CAPACITY, Frame, Transport, TransportEvent,
    event_channel,
};
pub use websocket::{WebSocketConnection, WebSocketTransport};
