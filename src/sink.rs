use anyhow::{Context, Result};
use rosc::{encoder, OscMessage, OscPacket, OscType};
use std::net::UdpSocket;
use tracing::warn;

use crate::config::SinkConfig;
use crate::event::OutboundEvent;

/// イベントの送り先。送信失敗は呼び出し側に返さない
pub trait EventSink {
    fn send(&self, event: &OutboundEvent);
}

/// key/value を交互に並べた OSC メッセージ
/// 例: /gesture "gesture" "Gun" "param1" "120,80" ...
pub fn build_osc_message(topic: &str, fields: &[(&str, &str)]) -> OscMessage {
    let mut args = Vec::with_capacity(fields.len() * 2);
    for (key, value) in fields {
        args.push(OscType::String(key.to_string()));
        args.push(OscType::String(value.to_string()));
    }
    OscMessage {
        addr: topic.to_string(),
        args,
    }
}

/// OSCメッセージをバイト列にエンコード
pub fn encode_osc_message(msg: &OscMessage) -> Result<Vec<u8>> {
    let packet = OscPacket::Message(msg.clone());
    let encoded = encoder::encode(&packet)?;
    Ok(encoded)
}

/// UDP で OSC を送るシンク
pub struct OscSink {
    socket: UdpSocket,
    target_addr: String,
    finger_topic: String,
    gesture_topic: String,
}

impl OscSink {
    pub fn new(config: &SinkConfig) -> Result<Self> {
        let socket = UdpSocket::bind("0.0.0.0:0").context("failed to bind sink socket")?;
        Ok(Self {
            socket,
            target_addr: config.addr.clone(),
            finger_topic: config.finger_topic.clone(),
            gesture_topic: config.gesture_topic.clone(),
        })
    }

    pub fn message_for(&self, event: &OutboundEvent) -> OscMessage {
        match event {
            OutboundEvent::Finger(f) => build_osc_message(&self.finger_topic, &f.fields()),
            OutboundEvent::Gesture(g) => build_osc_message(&self.gesture_topic, &g.fields()),
        }
    }

    /// エラーをそのまま返す版
    pub fn try_send(&self, event: &OutboundEvent) -> Result<()> {
        let data = encode_osc_message(&self.message_for(event))?;
        self.socket.send_to(&data, &self.target_addr)?;
        Ok(())
    }
}

impl EventSink for OscSink {
    fn send(&self, event: &OutboundEvent) {
        if let Err(e) = self.try_send(event) {
            warn!("event dropped ({}): {:#}", self.target_addr, e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::{FingerEvent, GestureEvent, WalkDirection};
    use crate::hand::{HandFrame, Handedness, LandmarkIndex};
    use std::time::Duration;

    fn sink_to(addr: &str) -> OscSink {
        let config = SinkConfig {
            addr: addr.to_string(),
            ..SinkConfig::default()
        };
        OscSink::new(&config).unwrap()
    }

    fn strings(msg: &OscMessage) -> Vec<String> {
        msg.args
            .iter()
            .map(|a| match a {
                OscType::String(s) => s.clone(),
                other => panic!("unexpected arg {:?}", other),
            })
            .collect()
    }

    #[test]
    fn test_build_osc_message_alternates_keys() {
        let msg = build_osc_message("/gesture", &[("gesture", "Gun"), ("param1", "120,80")]);
        assert_eq!(msg.addr, "/gesture");
        assert_eq!(strings(&msg), vec!["gesture", "Gun", "param1", "120,80"]);
    }

    #[test]
    fn test_gesture_message_schema_order() {
        let sink = sink_to("127.0.0.1:9");
        let ev = OutboundEvent::Gesture(GestureEvent::walking(WalkDirection::Left, 125));
        let msg = sink.message_for(&ev);
        assert_eq!(msg.addr, "/gesture");
        assert_eq!(
            strings(&msg),
            vec!["gesture", "Walking", "param1", "left", "param2", "125", "param3", "0"]
        );
    }

    #[test]
    fn test_finger_message_topic() {
        let sink = sink_to("127.0.0.1:9");
        let hand = HandFrame::new(
            Handedness::Left,
            [[1, 2]; LandmarkIndex::COUNT],
            [[1.0, 2.0, 3.0]; LandmarkIndex::COUNT],
        );
        let msg = sink.message_for(&OutboundEvent::Finger(FingerEvent::from_hand(&hand)));
        assert_eq!(msg.addr, "/finger");
        let args = strings(&msg);
        assert_eq!(args[0], "hand");
        assert_eq!(args[1], "left");
        assert_eq!(args[2], "landmark");
        assert!(args[3].starts_with("3.0,1,2,"));
    }

    #[test]
    fn test_encode_osc_message() {
        let msg = build_osc_message("/gesture", &GestureEvent::idle().fields());
        let encoded = encode_osc_message(&msg).unwrap();
        assert!(!encoded.is_empty());
        // OSC は 4 バイト境界
        assert_eq!(encoded.len() % 4, 0);
    }

    #[test]
    fn test_send_over_udp() {
        let receiver = UdpSocket::bind("127.0.0.1:0").unwrap();
        receiver
            .set_read_timeout(Some(Duration::from_secs(2)))
            .unwrap();
        let addr = receiver.local_addr().unwrap().to_string();

        let sink = sink_to(&addr);
        sink.send(&OutboundEvent::Gesture(GestureEvent::shoot([10, 20], 45)));

        let mut buf = [0u8; 1024];
        let (n, _) = receiver.recv_from(&mut buf).unwrap();
        let (_, packet) = rosc::decoder::decode_udp(&buf[..n]).unwrap();
        match packet {
            OscPacket::Message(msg) => {
                assert_eq!(msg.addr, "/gesture");
                assert_eq!(
                    strings(&msg),
                    vec!["gesture", "Shoot", "param1", "10,20", "param2", "45", "param3", "0"]
                );
            }
            other => panic!("unexpected packet {:?}", other),
        }
    }

    #[test]
    fn test_unresolvable_target_is_dropped() {
        let sink = sink_to("not a socket address");
        assert!(sink.try_send(&OutboundEvent::Gesture(GestureEvent::idle())).is_err());
        // 失敗しても panic しない
        sink.send(&OutboundEvent::Gesture(GestureEvent::idle()));
    }
}
