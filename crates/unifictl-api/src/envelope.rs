// Response envelope decoding
//
// Every controller reply is `{ "data": [...], "meta": { "rc", "msg" } }`.
// A fully buffered `RawResponse` is what the call guard hands back, so the
// body can be inspected for the expiry sentinel and still be decoded later.

use std::borrow::Cow;

use bytes::Bytes;
use reqwest::StatusCode;
use reqwest::header::{CONTENT_TYPE, HeaderMap};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::Error;

/// `meta.msg` the controller sends with a 401 once the session cookie expired.
pub const LOGIN_REQUIRED: &str = "api.err.LoginRequired";

// ── Raw response ─────────────────────────────────────────────────────

/// A fully read HTTP response.
#[derive(Debug, Clone)]
pub struct RawResponse {
    status: StatusCode,
    content_type: Option<String>,
    headers: HeaderMap,
    body: Bytes,
}

impl RawResponse {
    pub fn new(status: StatusCode, content_type: Option<&str>, body: impl Into<Bytes>) -> Self {
        Self {
            status,
            content_type: content_type.map(String::from),
            headers: HeaderMap::new(),
            body: body.into(),
        }
    }

    /// Buffer a `reqwest::Response`.
    pub async fn read(resp: reqwest::Response) -> Result<Self, Error> {
        let status = resp.status();
        let headers = resp.headers().clone();
        let content_type = headers
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(String::from);
        let body = resp.bytes().await.map_err(Error::Transport)?;
        Ok(Self {
            status,
            content_type,
            headers,
            body,
        })
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn content_type(&self) -> Option<&str> {
        self.content_type.as_deref()
    }

    /// Response headers. Empty for responses built with [`RawResponse::new`].
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn body(&self) -> &Bytes {
        &self.body
    }

    pub fn text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.body)
    }

    /// Whether the declared content type is JSON.
    pub fn is_json(&self) -> bool {
        self.content_type
            .as_deref()
            .is_some_and(|ct| ct.to_ascii_lowercase().contains("application/json"))
    }

    /// Parse the body as an envelope, regardless of content type.
    pub fn envelope(&self) -> Result<Envelope, Error> {
        serde_json::from_slice(&self.body).map_err(|e| {
            let body = self.text().into_owned();
            let preview: String = body.chars().take(200).collect();
            Error::Schema {
                message: format!("{e} (body preview: {preview:?})"),
                body,
            }
        })
    }

    /// Whether this response is the controller telling us the session expired:
    /// HTTP 401, a JSON body, and `meta.msg == "api.err.LoginRequired"`.
    pub fn is_session_expired(&self) -> bool {
        self.status == StatusCode::UNAUTHORIZED
            && self.is_json()
            && self
                .envelope()
                .is_ok_and(|env| env.meta.msg.as_deref() == Some(LOGIN_REQUIRED))
    }
}

// ── Envelope ─────────────────────────────────────────────────────────

/// The `{data, meta}` wrapper. Unknown keys are ignored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    pub data: Data,
    pub meta: Meta,
}

/// Envelope payload: a list of opaque records, or in some error replies a
/// bare string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Data {
    Records(Vec<serde_json::Value>),
    Message(String),
}

impl Data {
    /// The records, or an empty slice for a string payload.
    pub fn records(&self) -> &[serde_json::Value] {
        match self {
            Self::Records(records) => records,
            Self::Message(_) => &[],
        }
    }

    pub fn into_records(self) -> Vec<serde_json::Value> {
        match self {
            Self::Records(records) => records,
            Self::Message(_) => Vec::new(),
        }
    }

    /// Deserialize each record into `T`.
    pub fn parse<T: serde::de::DeserializeOwned>(&self) -> Result<Vec<T>, Error> {
        self.records()
            .iter()
            .map(|record| {
                serde_json::from_value(record.clone()).map_err(|e| Error::Schema {
                    message: e.to_string(),
                    body: record.to_string(),
                })
            })
            .collect()
    }
}

/// Envelope metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Meta {
    pub rc: ResultCode,
    #[serde(default)]
    pub msg: Option<String>,
}

/// `meta.rc`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResultCode {
    Ok,
    Error,
}

// ── Outcome ──────────────────────────────────────────────────────────

/// Result of a call the controller understood.
///
/// `Rejected` is the soft-failure path: the request went through but the
/// controller refused the command. Callers check it like any other value.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome<T> {
    Accepted(T),
    Rejected { message: Option<String> },
}

impl<T> Outcome<T> {
    pub fn is_accepted(&self) -> bool {
        matches!(self, Self::Accepted(_))
    }

    pub fn accepted(self) -> Option<T> {
        match self {
            Self::Accepted(value) => Some(value),
            Self::Rejected { .. } => None,
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Outcome<U> {
        match self {
            Self::Accepted(value) => Outcome::Accepted(f(value)),
            Self::Rejected { message } => Outcome::Rejected { message },
        }
    }
}

// ── Decoding ─────────────────────────────────────────────────────────

/// Validate and unwrap a response.
///
/// Fails with [`Error::Format`] before touching the body when the content
/// type is not JSON, and with [`Error::Schema`] when the body is not an
/// envelope. `rc: "error"` becomes [`Outcome::Rejected`].
pub fn decode(response: &RawResponse) -> Result<Outcome<Data>, Error> {
    if !response.is_json() {
        return Err(Error::Format {
            status: response.status().as_u16(),
            content_type: response.content_type().map(String::from),
        });
    }

    let envelope = response.envelope()?;
    match envelope.meta.rc {
        ResultCode::Ok => Ok(Outcome::Accepted(envelope.data)),
        ResultCode::Error => {
            debug!(msg = ?envelope.meta.msg, "controller rejected request");
            Ok(Outcome::Rejected {
                message: envelope.meta.msg,
            })
        }
    }
}

/// Boolean convention: `true` for `rc: "ok"`, `false` for `rc: "error"`.
pub fn decode_flag(response: &RawResponse) -> Result<bool, Error> {
    decode(response).map(|outcome| outcome.is_accepted())
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    fn json_response(status: u16, body: &serde_json::Value) -> RawResponse {
        RawResponse::new(
            StatusCode::from_u16(status).unwrap(),
            Some("application/json;charset=UTF-8"),
            body.to_string(),
        )
    }

    #[test]
    fn ok_returns_data_verbatim() {
        let resp = json_response(200, &json!({"data": ["123"], "meta": {"rc": "ok", "msg": "aaa"}}));
        let outcome = decode(&resp).unwrap();
        assert_eq!(outcome, Outcome::Accepted(Data::Records(vec![json!("123")])));
    }

    #[test]
    fn flag_convention_ignores_data() {
        let ok = json_response(200, &json!({"data": [], "meta": {"rc": "ok"}}));
        let err = json_response(200, &json!({"data": ["123"], "meta": {"rc": "error", "msg": "aaa"}}));
        assert!(decode_flag(&ok).unwrap());
        assert!(!decode_flag(&err).unwrap());
    }

    #[test]
    fn error_carries_controller_message() {
        let resp = json_response(
            200,
            &json!({"data": [], "meta": {"rc": "error", "msg": "api.err.InvalidObject"}}),
        );
        assert_eq!(
            decode(&resp).unwrap(),
            Outcome::Rejected {
                message: Some("api.err.InvalidObject".into())
            }
        );
    }

    #[test]
    fn html_is_a_format_error_without_parsing() {
        // Body would parse fine; the content type alone must reject it.
        let resp = RawResponse::new(
            StatusCode::OK,
            Some("text/html"),
            json!({"data": [], "meta": {"rc": "ok"}}).to_string(),
        );
        assert!(matches!(decode(&resp), Err(Error::Format { .. })));

        let missing = RawResponse::new(StatusCode::OK, None, "{}");
        assert!(matches!(decode(&missing), Err(Error::Format { .. })));
    }

    #[test]
    fn empty_object_is_a_schema_error() {
        let resp = json_response(200, &json!({}));
        assert!(matches!(decode(&resp), Err(Error::Schema { .. })));
    }

    #[test]
    fn unknown_rc_is_a_schema_error() {
        let resp = json_response(200, &json!({"data": [], "meta": {"rc": "maybe"}}));
        assert!(matches!(decode(&resp), Err(Error::Schema { .. })));
    }

    #[test]
    fn string_data_is_accepted() {
        let resp = json_response(200, &json!({"data": "done", "meta": {"rc": "ok"}}));
        let data = decode(&resp).unwrap().accepted().unwrap();
        assert_eq!(data, Data::Message("done".into()));
        assert!(data.records().is_empty());
    }

    #[test]
    fn expiry_needs_status_json_and_sentinel() {
        let sentinel = json!({"data": [], "meta": {"rc": "error", "msg": LOGIN_REQUIRED}});
        assert!(json_response(401, &sentinel).is_session_expired());
        assert!(!json_response(403, &sentinel).is_session_expired());

        let other = json!({"data": [], "meta": {"rc": "error", "msg": "api.err.NoPermission"}});
        assert!(!json_response(401, &other).is_session_expired());

        let html = RawResponse::new(StatusCode::UNAUTHORIZED, Some("text/html"), sentinel.to_string());
        assert!(!html.is_session_expired());
    }
}
