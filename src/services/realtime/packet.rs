//! Text frame codec for Socket.IO v5 carried over Engine.IO v4 websockets.
//!
//! Only the subset a subscribing client needs is handled: the open
//! handshake, heartbeats, namespace connect/disconnect and plain events.
//! Binary attachments are rejected.

use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

pub const DEFAULT_NAMESPACE: &str = "/";

#[derive(Debug, Error, PartialEq)]
pub enum PacketError {
    #[error("empty frame")]
    Empty,

    #[error("unknown packet type {0:?}")]
    UnknownType(char),

    #[error("binary packets are not supported")]
    Binary,

    #[error("malformed payload: {0}")]
    Payload(String),
}

/// Server handshake sent as the first Engine.IO packet
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OpenHandshake {
    pub sid: String,
    #[serde(default)]
    pub upgrades: Vec<String>,
    pub ping_interval: u64,
    pub ping_timeout: u64,
    #[serde(default)]
    pub max_payload: Option<u64>,
}

/// Engine.IO transport packet
#[derive(Debug, Clone, PartialEq)]
pub enum EnginePacket {
    Open(OpenHandshake),
    Close,
    Ping(String),
    Pong(String),
    Message(String),
    Upgrade,
    Noop,
}

impl EnginePacket {
    pub fn decode(frame: &str) -> Result<Self, PacketError> {
        let mut chars = frame.chars();
        let kind = chars.next().ok_or(PacketError::Empty)?;
        let rest = chars.as_str();

        match kind {
            '0' => serde_json::from_str(rest)
                .map(EnginePacket::Open)
                .map_err(|e| PacketError::Payload(e.to_string())),
            '1' => Ok(EnginePacket::Close),
            '2' => Ok(EnginePacket::Ping(rest.to_string())),
            '3' => Ok(EnginePacket::Pong(rest.to_string())),
            '4' => Ok(EnginePacket::Message(rest.to_string())),
            '5' => Ok(EnginePacket::Upgrade),
            '6' => Ok(EnginePacket::Noop),
            other => Err(PacketError::UnknownType(other)),
        }
    }

    pub fn encode(&self) -> String {
        match self {
            // Only servers send open packets; the payload is not re-encoded.
            EnginePacket::Open(_) => "0".to_string(),
            EnginePacket::Close => "1".to_string(),
            EnginePacket::Ping(data) => format!("2{}", data),
            EnginePacket::Pong(data) => format!("3{}", data),
            EnginePacket::Message(data) => format!("4{}", data),
            EnginePacket::Upgrade => "5".to_string(),
            EnginePacket::Noop => "6".to_string(),
        }
    }
}

/// Socket.IO packet carried inside an Engine.IO message
#[derive(Debug, Clone, PartialEq)]
pub enum SocketPacket {
    Connect {
        namespace: String,
        payload: Option<Value>,
    },
    Disconnect {
        namespace: String,
    },
    Event {
        namespace: String,
        ack_id: Option<u64>,
        name: String,
        args: Vec<Value>,
    },
    Ack {
        namespace: String,
        ack_id: Option<u64>,
        args: Vec<Value>,
    },
    ConnectError {
        namespace: String,
        payload: Option<Value>,
    },
}

impl SocketPacket {
    /// Client request to join `namespace`
    pub fn connect(namespace: &str) -> Self {
        SocketPacket::Connect {
            namespace: namespace.to_string(),
            payload: None,
        }
    }

    pub fn namespace(&self) -> &str {
        match self {
            SocketPacket::Connect { namespace, .. }
            | SocketPacket::Disconnect { namespace }
            | SocketPacket::Event { namespace, .. }
            | SocketPacket::Ack { namespace, .. }
            | SocketPacket::ConnectError { namespace, .. } => namespace,
        }
    }

    pub fn decode(data: &str) -> Result<Self, PacketError> {
        let mut chars = data.chars();
        let kind = chars.next().ok_or(PacketError::Empty)?;
        let rest = chars.as_str();

        if matches!(kind, '5' | '6') {
            return Err(PacketError::Binary);
        }
        if !matches!(kind, '0'..='4') {
            return Err(PacketError::UnknownType(kind));
        }

        let (namespace, rest) = split_namespace(rest);
        let (ack_id, rest) = split_ack_id(rest);
        let payload = if rest.is_empty() {
            None
        } else {
            Some(serde_json::from_str::<Value>(rest).map_err(|e| PacketError::Payload(e.to_string()))?)
        };

        match kind {
            '0' => Ok(SocketPacket::Connect { namespace, payload }),
            '1' => Ok(SocketPacket::Disconnect { namespace }),
            '2' => {
                let mut items = payload_array(payload)?;
                if items.is_empty() {
                    return Err(PacketError::Payload("event without a name".to_string()));
                }
                let name = match items.remove(0) {
                    Value::String(name) => name,
                    other => {
                        return Err(PacketError::Payload(format!("event name must be a string, got {}", other)))
                    }
                };
                Ok(SocketPacket::Event {
                    namespace,
                    ack_id,
                    name,
                    args: items,
                })
            }
            '3' => Ok(SocketPacket::Ack {
                namespace,
                ack_id,
                args: payload_array(payload)?,
            }),
            _ => Ok(SocketPacket::ConnectError { namespace, payload }),
        }
    }

    pub fn encode(&self) -> String {
        let (kind, namespace, ack_id, payload) = match self {
            SocketPacket::Connect { namespace, payload } => ('0', namespace, None, payload.clone()),
            SocketPacket::Disconnect { namespace } => ('1', namespace, None, None),
            SocketPacket::Event {
                namespace,
                ack_id,
                name,
                args,
            } => {
                let mut items = Vec::with_capacity(args.len() + 1);
                items.push(Value::String(name.clone()));
                items.extend(args.iter().cloned());
                ('2', namespace, *ack_id, Some(Value::Array(items)))
            }
            SocketPacket::Ack {
                namespace,
                ack_id,
                args,
            } => ('3', namespace, *ack_id, Some(Value::Array(args.clone()))),
            SocketPacket::ConnectError { namespace, payload } => ('4', namespace, None, payload.clone()),
        };

        let mut out = String::new();
        out.push(kind);
        if namespace != DEFAULT_NAMESPACE {
            out.push_str(namespace);
            out.push(',');
        }
        if let Some(id) = ack_id {
            out.push_str(&id.to_string());
        }
        if let Some(payload) = payload {
            out.push_str(&payload.to_string());
        }
        out
    }

    /// Wrap into the Engine.IO message frame that goes on the wire
    pub fn to_frame(&self) -> String {
        EnginePacket::Message(self.encode()).encode()
    }
}

fn split_namespace(data: &str) -> (String, &str) {
    if !data.starts_with('/') {
        return (DEFAULT_NAMESPACE.to_string(), data);
    }

    match data.find(',') {
        Some(idx) => (data[..idx].to_string(), &data[idx + 1..]),
        None => (data.to_string(), ""),
    }
}

fn split_ack_id(data: &str) -> (Option<u64>, &str) {
    let digits = data.bytes().take_while(|b| b.is_ascii_digit()).count();
    if digits == 0 {
        return (None, data);
    }
    match data[..digits].parse() {
        Ok(id) => (Some(id), &data[digits..]),
        Err(_) => (None, data),
    }
}

fn payload_array(payload: Option<Value>) -> Result<Vec<Value>, PacketError> {
    match payload {
        Some(Value::Array(items)) => Ok(items),
        Some(other) => Err(PacketError::Payload(format!("expected an array, got {}", other))),
        None => Ok(Vec::new()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_decode_open_handshake() {
        let frame = r#"0{"sid":"lv_VI97HAXpY6yYWAAAC","upgrades":[],"pingInterval":25000,"pingTimeout":20000,"maxPayload":1000000}"#;
        match EnginePacket::decode(frame).unwrap() {
            EnginePacket::Open(open) => {
                assert_eq!(open.sid, "lv_VI97HAXpY6yYWAAAC");
                assert_eq!(open.ping_interval, 25000);
                assert_eq!(open.max_payload, Some(1_000_000));
            }
            other => panic!("unexpected packet: {other:?}"),
        }
    }

    #[test]
    fn test_decode_heartbeat_and_unknown() {
        assert_eq!(EnginePacket::decode("2").unwrap(), EnginePacket::Ping(String::new()));
        assert_eq!(EnginePacket::decode("3hello").unwrap(), EnginePacket::Pong("hello".to_string()));
        assert_eq!(EnginePacket::decode("").unwrap_err(), PacketError::Empty);
        assert_eq!(EnginePacket::decode("9").unwrap_err(), PacketError::UnknownType('9'));
    }

    #[test]
    fn test_connect_frame_for_default_namespace() {
        assert_eq!(SocketPacket::connect(DEFAULT_NAMESPACE).to_frame(), "40");
        assert_eq!(SocketPacket::connect("/admin").to_frame(), "40/admin,");
    }

    #[test]
    fn test_decode_match_event() {
        let frame = r#"42["match",{"_id":"c","name":"Carla","bio":"Rustacean","avatar":"https://a.test/c.png"}]"#;
        let message = match EnginePacket::decode(frame).unwrap() {
            EnginePacket::Message(data) => data,
            other => panic!("unexpected packet: {other:?}"),
        };

        match SocketPacket::decode(&message).unwrap() {
            SocketPacket::Event { namespace, ack_id, name, args } => {
                assert_eq!(namespace, "/");
                assert_eq!(ack_id, None);
                assert_eq!(name, "match");
                assert_eq!(args[0]["name"], json!("Carla"));
            }
            other => panic!("unexpected packet: {other:?}"),
        }
    }

    #[test]
    fn test_decode_event_with_namespace_and_ack() {
        let packet = SocketPacket::decode(r#"2/chat,12["hello",1]"#).unwrap();
        assert_eq!(
            packet,
            SocketPacket::Event {
                namespace: "/chat".to_string(),
                ack_id: Some(12),
                name: "hello".to_string(),
                args: vec![json!(1)],
            }
        );
        assert_eq!(packet.encode(), r#"2/chat,12["hello",1]"#);
    }

    #[test]
    fn test_decode_connect_ack_and_errors() {
        assert_eq!(
            SocketPacket::decode(r#"0{"sid":"abc"}"#).unwrap(),
            SocketPacket::Connect {
                namespace: "/".to_string(),
                payload: Some(json!({"sid": "abc"})),
            }
        );
        assert!(matches!(
            SocketPacket::decode(r#"4{"message":"Not authorized"}"#).unwrap(),
            SocketPacket::ConnectError { .. }
        ));
        assert_eq!(SocketPacket::decode(r#"51-["x",{"_placeholder":true,"num":0}]"#).unwrap_err(), PacketError::Binary);
        assert!(matches!(SocketPacket::decode(r#"2[42]"#).unwrap_err(), PacketError::Payload(_)));
        assert!(matches!(SocketPacket::decode(r#"2{"a":1}"#).unwrap_err(), PacketError::Payload(_)));
    }
}
