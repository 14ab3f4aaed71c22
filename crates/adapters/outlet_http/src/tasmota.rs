//! Tasmota plug transport — the `cm?cmnd=...` web API.

use heatwatch_app::ports::{OutletReply, OutletRequest, OutletTransport, TransportError};
use serde::Deserialize;

use crate::classify::classify;

/// Successful command replies look like `{"POWER":"ON"}`; an unknown
/// command yields `{"Command":"Unknown"}` instead.
#[derive(Debug, Deserialize)]
struct TasmotaReply {
    #[serde(rename = "POWER")]
    power: Option<String>,
    #[serde(rename = "Command")]
    command: Option<String>,
}

/// A plug running Tasmota firmware on the local network.
pub struct TasmotaTransport {
    endpoint: String,
    client: reqwest::Client,
}

impl TasmotaTransport {
    /// Transport for the plug at `endpoint` (e.g. `http://192.168.1.40`).
    /// A trailing slash on the endpoint is tolerated.
    #[must_use]
    pub fn new(endpoint: String, client: reqwest::Client) -> Self {
        Self {
            endpoint: endpoint.trim_end_matches('/').to_owned(),
            client,
        }
    }

    fn command(request: OutletRequest) -> &'static str {
        match request {
            OutletRequest::PowerOn => "Power On",
            OutletRequest::PowerOff => "Power Off",
            OutletRequest::PowerQuery => "Power",
        }
    }
}

impl OutletTransport for TasmotaTransport {
    fn endpoint(&self) -> &str {
        &self.endpoint
    }

    async fn execute(&self, request: OutletRequest) -> Result<OutletReply, TransportError> {
        let url = format!("{}/cm", self.endpoint);
        let response = self
            .client
            .get(&url)
            .query(&[("cmnd", Self::command(request))])
            .send()
            .await
            .map_err(|err| classify(&err))?
            .error_for_status()
            .map_err(|err| classify(&err))?;
        let body = response.text().await.map_err(|err| classify(&err))?;
        parse_reply(&body)
    }
}

/// Parse a Tasmota reply body.
///
/// # Errors
///
/// [`TransportError::Rejected`] when the firmware reported an unknown
/// command or the body is not JSON at all.
fn parse_reply(body: &str) -> Result<OutletReply, TransportError> {
    let reply: TasmotaReply = serde_json::from_str(body)
        .map_err(|err| TransportError::Rejected(format!("unparsable reply: {err}")))?;
    if let Some(command) = reply.command {
        return Err(TransportError::Rejected(format!("command {command}")));
    }
    let power_on = match reply.power.as_deref() {
        Some("ON") => Some(true),
        Some("OFF") => Some(false),
        Some(other) => {
            tracing::warn!(power = other, "unexpected POWER value in Tasmota reply");
            None
        }
        None => None,
    };
    Ok(OutletReply { power_on })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_parse_power_on_reply() {
        let reply = parse_reply(r#"{"POWER":"ON"}"#).unwrap();
        assert_eq!(reply.power_on, Some(true));
    }

    #[test]
    fn should_parse_power_off_reply() {
        let reply = parse_reply(r#"{"POWER":"OFF"}"#).unwrap();
        assert_eq!(reply.power_on, Some(false));
    }

    #[test]
    fn should_treat_missing_power_field_as_ambiguous() {
        let reply = parse_reply(r#"{"Status":11}"#).unwrap();
        assert_eq!(reply.power_on, None);
    }

    #[test]
    fn should_reject_unknown_command_reply() {
        let err = parse_reply(r#"{"Command":"Unknown"}"#).unwrap_err();
        assert!(err.is_definitive());
    }

    #[test]
    fn should_reject_non_json_body() {
        assert!(parse_reply("<html>busy</html>").is_err());
    }

    #[test]
    fn should_trim_trailing_slash_from_endpoint() {
        let transport =
            TasmotaTransport::new("http://192.168.1.40/".to_owned(), reqwest::Client::new());
        assert_eq!(transport.endpoint(), "http://192.168.1.40");
    }

    #[test]
    fn should_map_requests_to_tasmota_commands() {
        assert_eq!(TasmotaTransport::command(OutletRequest::PowerOn), "Power On");
        assert_eq!(TasmotaTransport::command(OutletRequest::PowerOff), "Power Off");
        assert_eq!(TasmotaTransport::command(OutletRequest::PowerQuery), "Power");
    }
}
