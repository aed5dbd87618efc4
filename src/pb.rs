//! Protobuf messages for the cache client protocol (v1).
//!
//! These mirror the server's published schema and are maintained by hand
//! with prost derives, so no `protoc` step is needed at build time. Field
//! tags must stay in sync with the server.

/// Top-level envelope. Every frame on the wire is exactly one `Message`.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Message {
    #[prost(oneof = "message::MessageType", tags = "1, 2")]
    pub message_type: ::core::option::Option<message::MessageType>,
}

pub mod message {
    #[derive(Clone, PartialEq, ::prost::Oneof)]
    pub enum MessageType {
        #[prost(message, tag = "1")]
        Request(super::Request),
        #[prost(message, tag = "2")]
        Response(super::Response),
    }
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Request {
    #[prost(oneof = "request::RequestApi", tags = "2, 3, 6, 42, 100")]
    pub request_api: ::core::option::Option<request::RequestApi>,
}

pub mod request {
    #[derive(Clone, PartialEq, ::prost::Oneof)]
    pub enum RequestApi {
        #[prost(message, tag = "2")]
        PutRequest(super::PutRequest),
        #[prost(message, tag = "3")]
        GetRequest(super::GetRequest),
        #[prost(message, tag = "6")]
        RemoveRequest(super::RemoveRequest),
        #[prost(message, tag = "42")]
        GetAvailableServersRequest(super::GetAvailableServersRequest),
        #[prost(message, tag = "100")]
        HandshakeRequest(super::HandshakeRequest),
    }
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Response {
    #[prost(oneof = "response::ResponseApi", tags = "1, 2, 3, 6, 42, 100")]
    pub response_api: ::core::option::Option<response::ResponseApi>,
}

pub mod response {
    #[derive(Clone, PartialEq, ::prost::Oneof)]
    pub enum ResponseApi {
        #[prost(message, tag = "1")]
        ErrorResponse(super::ErrorResponse),
        #[prost(message, tag = "2")]
        PutResponse(super::PutResponse),
        #[prost(message, tag = "3")]
        GetResponse(super::GetResponse),
        #[prost(message, tag = "6")]
        RemoveResponse(super::RemoveResponse),
        #[prost(message, tag = "42")]
        GetAvailableServersResponse(super::GetAvailableServersResponse),
        #[prost(message, tag = "100")]
        HandshakeResponse(super::HandshakeResponse),
    }
}

// Locator API

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct GetAvailableServersRequest {}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct GetAvailableServersResponse {
    #[prost(message, repeated, tag = "1")]
    pub servers: ::prost::alloc::vec::Vec<Server>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Server {
    #[prost(string, tag = "1")]
    pub hostname: ::prost::alloc::string::String,
    #[prost(int32, tag = "2")]
    pub port: i32,
}

// Connection API

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct HandshakeRequest {
    #[prost(uint32, tag = "1")]
    pub major_version: u32,
    #[prost(uint32, tag = "2")]
    pub minor_version: u32,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct HandshakeResponse {
    #[prost(uint32, tag = "1")]
    pub server_major_version: u32,
    #[prost(uint32, tag = "2")]
    pub server_minor_version: u32,
    #[prost(bool, tag = "3")]
    pub handshake_passed: bool,
}

// Region API

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct GetRequest {
    #[prost(string, tag = "1")]
    pub region_name: ::prost::alloc::string::String,
    #[prost(message, optional, tag = "2")]
    pub key: ::core::option::Option<EncodedValue>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct GetResponse {
    #[prost(message, optional, tag = "1")]
    pub result: ::core::option::Option<EncodedValue>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct PutRequest {
    #[prost(string, tag = "1")]
    pub region_name: ::prost::alloc::string::String,
    #[prost(message, optional, tag = "2")]
    pub entry: ::core::option::Option<Entry>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct PutResponse {}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct RemoveRequest {
    #[prost(string, tag = "1")]
    pub region_name: ::prost::alloc::string::String,
    #[prost(message, optional, tag = "2")]
    pub key: ::core::option::Option<EncodedValue>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct RemoveResponse {}

// Basic types

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Entry {
    #[prost(message, optional, tag = "1")]
    pub key: ::core::option::Option<EncodedValue>,
    #[prost(message, optional, tag = "2")]
    pub value: ::core::option::Option<EncodedValue>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct EncodedValue {
    #[prost(oneof = "encoded_value::Value", tags = "1, 2, 5, 6, 8, 9, 11, 12")]
    pub value: ::core::option::Option<encoded_value::Value>,
}

pub mod encoded_value {
    #[derive(Clone, PartialEq, ::prost::Oneof)]
    pub enum Value {
        #[prost(int32, tag = "1")]
        IntResult(i32),
        #[prost(int64, tag = "2")]
        LongResult(i64),
        #[prost(bool, tag = "5")]
        BooleanResult(bool),
        #[prost(double, tag = "6")]
        DoubleResult(f64),
        #[prost(bytes, tag = "8")]
        BinaryResult(::prost::alloc::vec::Vec<u8>),
        #[prost(string, tag = "9")]
        StringResult(::prost::alloc::string::String),
        #[prost(message, tag = "11")]
        NullResult(super::NullResult),
        #[prost(string, tag = "12")]
        JsonObjectResult(::prost::alloc::string::String),
    }
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct NullResult {}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ErrorResponse {
    #[prost(message, optional, tag = "1")]
    pub error: ::core::option::Option<Error>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Error {
    #[prost(uint32, tag = "1")]
    pub error_code: u32,
    #[prost(string, tag = "2")]
    pub message: ::prost::alloc::string::String,
}
