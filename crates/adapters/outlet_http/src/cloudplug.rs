//! TP-Link Kasa plug transport through the vendor cloud.
//!
//! The cloud API is a two-step affair: a `login` call trades account
//! credentials for a session token, then `passthrough` calls relay
//! device-protocol JSON (double-encoded as a string) to the plug. Tokens
//! expire server-side; an expired-token error triggers one transparent
//! re-login before the call is given up on.

use serde::Deserialize;
use serde_json::json;
use tokio::sync::Mutex;

use heatwatch_app::ports::{OutletReply, OutletRequest, OutletTransport, TransportError};

use crate::classify::classify;

const DEFAULT_ENDPOINT: &str = "https://wap.tplinkcloud.com";
/// Cloud error code for an expired or invalidated session token.
const TOKEN_EXPIRED: i64 = -20651;

/// Account and device coordinates for one cloud-managed plug.
#[derive(Debug, Clone)]
pub struct CloudPlugConfig {
    /// Cloud account user name (an email address).
    pub username: String,
    /// Cloud account password.
    pub password: String,
    /// Device id as listed by the cloud account.
    pub device_id: String,
    /// Cloud endpoint; overridable for tests.
    pub endpoint: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CloudEnvelope {
    error_code: i64,
    msg: Option<String>,
    result: Option<CloudResult>,
}

#[derive(Debug, Deserialize)]
struct CloudResult {
    token: Option<String>,
    #[serde(rename = "responseData")]
    response_data: Option<String>,
}

/// A Kasa plug driven through the TP-Link cloud.
pub struct CloudPlugTransport {
    config: CloudPlugConfig,
    endpoint: String,
    client: reqwest::Client,
    token: Mutex<Option<String>>,
    terminal_id: uuid::Uuid,
}

impl CloudPlugTransport {
    /// Transport for the configured account and device.
    #[must_use]
    pub fn new(config: CloudPlugConfig, client: reqwest::Client) -> Self {
        let endpoint = config
            .endpoint
            .clone()
            .unwrap_or_else(|| DEFAULT_ENDPOINT.to_owned());
        Self {
            config,
            endpoint,
            client,
            token: Mutex::new(None),
            terminal_id: uuid::Uuid::new_v4(),
        }
    }

    async fn post(&self, token: Option<&str>, body: serde_json::Value) -> Result<CloudEnvelope, TransportError> {
        let mut request = self.client.post(&self.endpoint);
        if let Some(token) = token {
            request = request.query(&[("token", token)]);
        }
        let response = request
            .json(&body)
            .send()
            .await
            .map_err(|err| classify(&err))?
            .error_for_status()
            .map_err(|err| classify(&err))?;
        response
            .json::<CloudEnvelope>()
            .await
            .map_err(|err| classify(&err))
    }

    async fn login(&self) -> Result<String, TransportError> {
        let body = json!({
            "method": "login",
            "params": {
                "appType": "Kasa_Android",
                "cloudUserName": self.config.username,
                "cloudPassword": self.config.password,
                "terminalUUID": self.terminal_id,
            },
        });
        let envelope = self.post(None, body).await?;
        if envelope.error_code != 0 {
            return Err(TransportError::Rejected(cloud_error(&envelope)));
        }
        envelope
            .result
            .and_then(|r| r.token)
            .ok_or_else(|| TransportError::Rejected("login reply carried no token".to_owned()))
    }

    async fn session_token(&self) -> Result<String, TransportError> {
        let mut token = self.token.lock().await;
        if let Some(token) = token.as_ref() {
            return Ok(token.clone());
        }
        let fresh = self.login().await?;
        tracing::debug!("cloud session established");
        *token = Some(fresh.clone());
        Ok(fresh)
    }

    async fn passthrough(&self, request_data: &str) -> Result<CloudEnvelope, TransportError> {
        let body = json!({
            "method": "passthrough",
            "params": {
                "deviceId": self.config.device_id,
                "requestData": request_data,
            },
        });

        let token = self.session_token().await?;
        let envelope = self.post(Some(&token), body.clone()).await?;
        if envelope.error_code != TOKEN_EXPIRED {
            return Ok(envelope);
        }

        // One transparent re-login, then give up.
        tracing::debug!("cloud session expired, logging in again");
        self.token.lock().await.take();
        let token = self.session_token().await?;
        self.post(Some(&token), body).await
    }
}

impl OutletTransport for CloudPlugTransport {
    fn endpoint(&self) -> &str {
        &self.endpoint
    }

    async fn execute(&self, request: OutletRequest) -> Result<OutletReply, TransportError> {
        let envelope = self.passthrough(&request_data(request)).await?;
        if envelope.error_code != 0 {
            return Err(TransportError::Rejected(cloud_error(&envelope)));
        }
        let response_data = envelope.result.and_then(|r| r.response_data);
        match request {
            // err_code 0 already confirms the relay state.
            OutletRequest::PowerOn => Ok(OutletReply {
                power_on: Some(true),
            }),
            OutletRequest::PowerOff => Ok(OutletReply {
                power_on: Some(false),
            }),
            OutletRequest::PowerQuery => Ok(OutletReply {
                power_on: response_data.as_deref().and_then(parse_relay_state),
            }),
        }
    }
}

fn cloud_error(envelope: &CloudEnvelope) -> String {
    match &envelope.msg {
        Some(msg) => format!("cloud error {}: {msg}", envelope.error_code),
        None => format!("cloud error {}", envelope.error_code),
    }
}

/// Device-protocol payload for one request, double-encoded for passthrough.
fn request_data(request: OutletRequest) -> String {
    let payload = match request {
        OutletRequest::PowerOn => json!({"system": {"set_relay_state": {"state": 1}}}),
        OutletRequest::PowerOff => json!({"system": {"set_relay_state": {"state": 0}}}),
        OutletRequest::PowerQuery => json!({"system": {"get_sysinfo": {}}}),
    };
    payload.to_string()
}

/// Extract `relay_state` from a `get_sysinfo` response payload. `None`
/// when the payload doesn't carry it (ambiguous reply).
fn parse_relay_state(response_data: &str) -> Option<bool> {
    let value: serde_json::Value = serde_json::from_str(response_data).ok()?;
    value
        .pointer("/system/get_sysinfo/relay_state")
        .and_then(serde_json::Value::as_i64)
        .map(|state| state != 0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_build_relay_payloads() {
        assert_eq!(
            request_data(OutletRequest::PowerOn),
            r#"{"system":{"set_relay_state":{"state":1}}}"#
        );
        assert_eq!(
            request_data(OutletRequest::PowerOff),
            r#"{"system":{"set_relay_state":{"state":0}}}"#
        );
        assert_eq!(
            request_data(OutletRequest::PowerQuery),
            r#"{"system":{"get_sysinfo":{}}}"#
        );
    }

    #[test]
    fn should_extract_relay_state_from_sysinfo() {
        let data = r#"{"system":{"get_sysinfo":{"alias":"pump","relay_state":1}}}"#;
        assert_eq!(parse_relay_state(data), Some(true));

        let data = r#"{"system":{"get_sysinfo":{"alias":"pump","relay_state":0}}}"#;
        assert_eq!(parse_relay_state(data), Some(false));
    }

    #[test]
    fn should_treat_missing_relay_state_as_ambiguous() {
        assert_eq!(parse_relay_state(r#"{"system":{"get_sysinfo":{}}}"#), None);
        assert_eq!(parse_relay_state("not json"), None);
    }

    #[test]
    fn should_describe_cloud_errors_with_and_without_message() {
        let with_msg = CloudEnvelope {
            error_code: -20601,
            msg: Some("Device is offline".to_owned()),
            result: None,
        };
        assert_eq!(cloud_error(&with_msg), "cloud error -20601: Device is offline");

        let bare = CloudEnvelope {
            error_code: -20571,
            msg: None,
            result: None,
        };
        assert_eq!(cloud_error(&bare), "cloud error -20571");
    }
}
