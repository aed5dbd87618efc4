//! Protocol constants and domain types
//!
//! Wraps the raw protobuf messages in types the rest of the crate works
//! with, and provides the conversions between the two.

use crate::error::{ClientError, Result};
use crate::pb;
use crate::pb::request::RequestApi;
use crate::pb::response::ResponseApi;
use std::fmt;

/// First byte of every connection preamble.
pub const MAGIC_BYTE: u8 = 0x6E;

/// Protocol major version sent in the preamble.
pub const PROTOCOL_MAJOR_VERSION: u8 = 0x01;

/// Legacy request version prefix the locator expects ahead of the magic bytes.
pub const NON_GOSSIP_REQUEST_VERSION: [u8; 4] = [0x00; 4];

/// Versions sent in the handshake request.
pub const CURRENT_MAJOR_VERSION: u32 = 1;
pub const CURRENT_MINOR_VERSION: u32 = 1;

pub const DEFAULT_REGION: &str = "example-region";
pub const DEFAULT_LOCATOR_HOST: &str = "127.0.0.1";
pub const DEFAULT_LOCATOR_PORT: u16 = 10334;

/// Preamble written to a server before the handshake.
pub fn server_preamble() -> [u8; 2] {
    [MAGIC_BYTE, PROTOCOL_MAJOR_VERSION]
}

/// Preamble written to a locator before the discovery request.
pub fn locator_preamble() -> [u8; 6] {
    let mut preamble = [0u8; 6];
    preamble[..4].copy_from_slice(&NON_GOSSIP_REQUEST_VERSION);
    preamble[4..].copy_from_slice(&server_preamble());
    preamble
}

/// Address of a cache server as reported by the locator
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ServerDescriptor {
    pub hostname: String,
    pub port: u16,
}

impl ServerDescriptor {
    pub fn new(hostname: impl Into<String>, port: u16) -> Self {
        Self {
            hostname: hostname.into(),
            port,
        }
    }

    /// `host:port`, suitable for `TcpStream::connect`
    pub fn address(&self) -> String {
        format!("{}:{}", self.hostname, self.port)
    }
}

impl fmt::Display for ServerDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.hostname, self.port)
    }
}

impl TryFrom<&pb::Server> for ServerDescriptor {
    type Error = ClientError;

    fn try_from(server: &pb::Server) -> Result<Self> {
        if server.hostname.is_empty() {
            return Err(ClientError::InvalidServer("empty hostname".to_string()));
        }
        let port = u16::try_from(server.port).map_err(|_| {
            ClientError::InvalidServer(format!(
                "port {} out of range for {}",
                server.port, server.hostname
            ))
        })?;
        Ok(Self::new(server.hostname.clone(), port))
    }
}

impl From<&ServerDescriptor> for pb::Server {
    fn from(server: &ServerDescriptor) -> Self {
        Self {
            hostname: server.hostname.clone(),
            port: i32::from(server.port),
        }
    }
}

/// A scalar value as carried by the protocol's encoded-value union
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    Int(i32),
    Long(i64),
    Boolean(bool),
    Double(f64),
    Binary(Vec<u8>),
    String(String),
    Json(String),
    Null,
}

impl Value {
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Int(_) => "int",
            Value::Long(_) => "long",
            Value::Boolean(_) => "boolean",
            Value::Double(_) => "double",
            Value::Binary(_) => "binary",
            Value::String(_) => "string",
            Value::Json(_) => "json",
            Value::Null => "null",
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<pb::EncodedValue> for Value {
    fn from(encoded: pb::EncodedValue) -> Self {
        use pb::encoded_value::Value as Encoded;
        match encoded.value {
            Some(Encoded::IntResult(v)) => Value::Int(v),
            Some(Encoded::LongResult(v)) => Value::Long(v),
            Some(Encoded::BooleanResult(v)) => Value::Boolean(v),
            Some(Encoded::DoubleResult(v)) => Value::Double(v),
            Some(Encoded::BinaryResult(v)) => Value::Binary(v),
            Some(Encoded::StringResult(v)) => Value::String(v),
            Some(Encoded::JsonObjectResult(v)) => Value::Json(v),
            Some(Encoded::NullResult(_)) | None => Value::Null,
        }
    }
}

impl From<Value> for pb::EncodedValue {
    fn from(value: Value) -> Self {
        use pb::encoded_value::Value as Encoded;
        let encoded = match value {
            Value::Int(v) => Encoded::IntResult(v),
            Value::Long(v) => Encoded::LongResult(v),
            Value::Boolean(v) => Encoded::BooleanResult(v),
            Value::Double(v) => Encoded::DoubleResult(v),
            Value::Binary(v) => Encoded::BinaryResult(v),
            Value::String(v) => Encoded::StringResult(v),
            Value::Json(v) => Encoded::JsonObjectResult(v),
            Value::Null => Encoded::NullResult(pb::NullResult {}),
        };
        Self {
            value: Some(encoded),
        }
    }
}

// Envelope helpers

impl pb::Message {
    pub fn request(api: RequestApi) -> Self {
        Self {
            message_type: Some(pb::message::MessageType::Request(pb::Request {
                request_api: Some(api),
            })),
        }
    }

    pub fn response(api: ResponseApi) -> Self {
        Self {
            message_type: Some(pb::message::MessageType::Response(pb::Response {
                response_api: Some(api),
            })),
        }
    }

    /// Error response carrying a server-side failure
    pub fn error(code: u32, message: impl Into<String>) -> Self {
        Self::response(ResponseApi::ErrorResponse(pb::ErrorResponse {
            error: Some(pb::Error {
                error_code: code,
                message: message.into(),
            }),
        }))
    }

    /// Unwrap the request payload, if this message is a request.
    pub fn into_request(self) -> Option<RequestApi> {
        match self.message_type {
            Some(pb::message::MessageType::Request(req)) => req.request_api,
            _ => None,
        }
    }
}

pub fn request_name(api: &RequestApi) -> &'static str {
    match api {
        RequestApi::PutRequest(_) => "PutRequest",
        RequestApi::GetRequest(_) => "GetRequest",
        RequestApi::RemoveRequest(_) => "RemoveRequest",
        RequestApi::GetAvailableServersRequest(_) => "GetAvailableServersRequest",
        RequestApi::HandshakeRequest(_) => "HandshakeRequest",
    }
}

pub fn response_name(api: &ResponseApi) -> &'static str {
    match api {
        ResponseApi::ErrorResponse(_) => "ErrorResponse",
        ResponseApi::PutResponse(_) => "PutResponse",
        ResponseApi::GetResponse(_) => "GetResponse",
        ResponseApi::RemoveResponse(_) => "RemoveResponse",
        ResponseApi::GetAvailableServersResponse(_) => "GetAvailableServersResponse",
        ResponseApi::HandshakeResponse(_) => "HandshakeResponse",
    }
}

/// Extract the response payload of a received message.
///
/// Server-reported errors become `ClientError::Server`; a request arriving
/// where a response was expected is a protocol violation.
pub fn into_response(message: pb::Message, expected: &'static str) -> Result<ResponseApi> {
    match message.message_type {
        Some(pb::message::MessageType::Response(pb::Response {
            response_api: Some(ResponseApi::ErrorResponse(err)),
        })) => {
            let error = err.error.unwrap_or_default();
            Err(ClientError::Server {
                code: error.error_code,
                message: error.message,
            })
        }
        Some(pb::message::MessageType::Response(pb::Response {
            response_api: Some(api),
        })) => Ok(api),
        Some(pb::message::MessageType::Request(req)) => Err(ClientError::UnexpectedResponse {
            expected,
            actual: req.request_api.as_ref().map_or("Request", request_name),
        }),
        Some(pb::message::MessageType::Response(pb::Response { response_api: None })) | None => {
            Err(ClientError::EmptyMessage)
        }
    }
}

/// Build the `UnexpectedResponse` error for a response of the wrong kind.
pub fn unexpected(expected: &'static str, actual: &ResponseApi) -> ClientError {
    ClientError::UnexpectedResponse {
        expected,
        actual: response_name(actual),
    }
}
