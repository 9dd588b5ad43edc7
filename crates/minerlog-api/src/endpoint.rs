//! Log stream endpoint derivation.
//!
//! The appliance serves its dashboard over `http`/`https` and the log stream
//! on the same host at [`LOG_STREAM_PATH`]. The WebSocket scheme follows the
//! page's transport security: `http` → `ws`, `https` → `wss`.

use url::Url;

use crate::error::Error;

/// Path of the log stream on the appliance.
pub const LOG_STREAM_PATH: &str = "/api/miner/logs";

/// Parse an operator-supplied device address.
///
/// Accepts full URLs (`https://rig.local:8443`) and bare hosts
/// (`192.168.1.50`), which default to `http`.
pub fn parse_device_url(input: &str) -> Result<Url, Error> {
    let trimmed = input.trim();
    if trimmed.contains("://") {
        Ok(Url::parse(trimmed)?)
    } else {
        Ok(Url::parse(&format!("http://{trimmed}"))?)
    }
}

/// Derive the log stream WebSocket URL from the device's base URL.
///
/// Host and port are kept; path, query and fragment are replaced.
pub fn log_stream_url(base: &Url) -> Result<Url, Error> {
    let scheme = match base.scheme() {
        "http" | "ws" => "ws",
        "https" | "wss" => "wss",
        other => {
            return Err(Error::UnsupportedScheme {
                scheme: other.to_owned(),
            });
        }
    };

    if base.host_str().is_none_or(str::is_empty) {
        return Err(Error::MissingHost {
            url: base.to_string(),
        });
    }

    let mut url = base.clone();
    url.set_scheme(scheme)
        .map_err(|()| Error::UnsupportedScheme {
            scheme: base.scheme().to_owned(),
        })?;
    url.set_path(LOG_STREAM_PATH);
    url.set_query(None);
    url.set_fragment(None);
    Ok(url)
}
