//! TCP protocol for hand detector → gesture server.
//!
//! Length-delimited frames carrying bincode-encoded [`DetectorMessage`]s.

use anyhow::Result;
use bytes::Bytes;
use futures::{SinkExt, StreamExt};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use tokio::net::TcpStream;
use tokio_util::codec::{Framed, LengthDelimitedCodec};

use crate::hand::HandFrame;

// --- Message types ---

/// One detected hand, as the detector reports it.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct HandLandmarks {
    /// "Left" / "Right" (first character is significant)
    pub handedness: String,
    /// 21 normalized `[x, y, z]`; x, y in [0, 1]
    pub landmarks: Vec<[f32; 3]>,
}

impl HandLandmarks {
    pub fn to_hand_frame(&self, width: u32, height: u32) -> Result<HandFrame> {
        HandFrame::from_normalized(&self.handedness, &self.landmarks, width, height)
    }
}

/// Detector → server
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub enum DetectorMessage {
    Frame {
        timestamp_us: u64,
        width: u32,
        height: u32,
        hands: Vec<HandLandmarks>,
    },
    EndOfStream,
}

// --- TCP codec helpers ---

pub type MessageStream = Framed<TcpStream, LengthDelimitedCodec>;

/// Create a framed message stream with length-delimited framing.
pub fn message_stream(stream: TcpStream) -> MessageStream {
    let codec = LengthDelimitedCodec::builder()
        .max_frame_length(16 * 1024 * 1024) // 16MB
        .new_codec();
    Framed::new(stream, codec)
}

/// Send a serializable message (bincode + length prefix).
pub async fn send_message<T: Serialize>(stream: &mut MessageStream, msg: &T) -> Result<()> {
    let data = bincode::serialize(msg)?;
    stream.send(Bytes::from(data)).await?;
    Ok(())
}

/// Receive and deserialize a message. `Ok(None)` when the peer closed cleanly.
pub async fn recv_message<T: DeserializeOwned>(stream: &mut MessageStream) -> Result<Option<T>> {
    match stream.next().await {
        Some(Ok(bytes)) => Ok(Some(bincode::deserialize(&bytes)?)),
        Some(Err(e)) => Err(e.into()),
        None => Ok(None),
    }
}
