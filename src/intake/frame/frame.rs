use crate::common::{Landmark, PoseResult};
use crate::config::TimeLimit;
use crate::error::FrameError;
use crate::i18n::Language;

pub const PING_TAG: u8 = 0;
pub const DETECTION_TAG: u8 = 1;
pub const CONTROL_TAG: u8 = 2;
pub const SHUTDOWN_TAG: u8 = 3;

// timestamp_ms (u64) + landmark count (u16)
const DETECTION_HEADER_BYTES: usize = 10;
// x, y, z, visibility as f32
const LANDMARK_BYTES: usize = 16;

/// One message from the pose-detection sidecar.
#[derive(Debug, Clone, PartialEq)]
pub enum Frame {
    Ping,
    /// `pose` is `None` when the landmark block was malformed.
    Detection {
        timestamp_ms: u64,
        pose: Option<PoseResult>,
    },
    Control(ControlOp),
    Shutdown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlOp {
    Pause,
    Resume,
    TogglePause,
    Reset,
    SetLimit(TimeLimit),
    SetLanguage(Language),
}

impl TryFrom<&[u8]> for Frame {
    type Error = FrameError;

    /// Decodes `[tag][payload]`; the length prefix has already been consumed.
    fn try_from(body: &[u8]) -> Result<Self, Self::Error> {
        let (&tag, payload) = body
            .split_first()
            .ok_or(FrameError::InvalidFrameLength(1, 0))?;
        match tag {
            PING_TAG => Ok(Frame::Ping),
            DETECTION_TAG => parse_detection(payload),
            CONTROL_TAG => Ok(Frame::Control(ControlOp::try_from(payload)?)),
            SHUTDOWN_TAG => Ok(Frame::Shutdown),
            _ => Err(FrameError::InvalidFrameTag(tag)),
        }
    }
}

impl Frame {
    /// Encodes the frame with its little-endian length prefix.
    pub fn encode(&self) -> Vec<u8> {
        let mut body = Vec::new();
        match self {
            Frame::Ping => body.push(PING_TAG),
            Frame::Detection { timestamp_ms, pose } => {
                body.push(DETECTION_TAG);
                body.extend_from_slice(&timestamp_ms.to_le_bytes());
                let landmarks = pose.as_ref().map(|p| p.landmarks.as_slice()).unwrap_or(&[]);
                body.extend_from_slice(&(landmarks.len() as u16).to_le_bytes());
                for landmark in landmarks {
                    for value in [landmark.x, landmark.y, landmark.z, landmark.visibility] {
                        body.extend_from_slice(&value.to_le_bytes());
                    }
                }
            }
            Frame::Control(op) => {
                body.push(CONTROL_TAG);
                op.encode_into(&mut body);
            }
            Frame::Shutdown => body.push(SHUTDOWN_TAG),
        }
        let mut encoded = Vec::with_capacity(body.len() + 4);
        encoded.extend_from_slice(&(body.len() as u32).to_le_bytes());
        encoded.extend_from_slice(&body);
        encoded
    }
}

fn parse_detection(payload: &[u8]) -> Result<Frame, FrameError> {
    if payload.len() < DETECTION_HEADER_BYTES {
        return Err(FrameError::InvalidFrameLength(
            DETECTION_HEADER_BYTES,
            payload.len(),
        ));
    }
    let timestamp_ms = u64::from_le_bytes(array_at(payload, 0));
    let count = u16::from_le_bytes(array_at(payload, 8)) as usize;
    let block = &payload[DETECTION_HEADER_BYTES..];

    if block.len() != count * LANDMARK_BYTES {
        tracing::debug!(
            expected = count * LANDMARK_BYTES,
            actual = block.len(),
            "malformed landmark block, treating as absent"
        );
        return Ok(Frame::Detection {
            timestamp_ms,
            pose: None,
        });
    }

    let landmarks = block
        .chunks_exact(LANDMARK_BYTES)
        .map(|chunk| Landmark {
            x: f32::from_le_bytes(array_at(chunk, 0)),
            y: f32::from_le_bytes(array_at(chunk, 4)),
            z: f32::from_le_bytes(array_at(chunk, 8)),
            visibility: f32::from_le_bytes(array_at(chunk, 12)),
        })
        .collect();

    Ok(Frame::Detection {
        timestamp_ms,
        pose: Some(PoseResult::new(landmarks)),
    })
}

/// Copies `N` bytes starting at `offset`. Callers check the length first.
fn array_at<const N: usize>(bytes: &[u8], offset: usize) -> [u8; N] {
    let mut array = [0u8; N];
    array.copy_from_slice(&bytes[offset..offset + N]);
    array
}

impl ControlOp {
    const PAUSE: u8 = 0;
    const RESUME: u8 = 1;
    const TOGGLE_PAUSE: u8 = 2;
    const RESET: u8 = 3;
    const SET_LIMIT: u8 = 4;
    const SET_LANGUAGE: u8 = 5;

    fn encode_into(&self, body: &mut Vec<u8>) {
        match self {
            ControlOp::Pause => body.push(Self::PAUSE),
            ControlOp::Resume => body.push(Self::RESUME),
            ControlOp::TogglePause => body.push(Self::TOGGLE_PAUSE),
            ControlOp::Reset => body.push(Self::RESET),
            ControlOp::SetLimit(limit) => {
                body.push(Self::SET_LIMIT);
                body.extend_from_slice(&u32::from(*limit).to_le_bytes());
            }
            ControlOp::SetLanguage(language) => {
                body.push(Self::SET_LANGUAGE);
                body.push(language.wire_code());
            }
        }
    }
}

impl TryFrom<&[u8]> for ControlOp {
    type Error = FrameError;

    fn try_from(payload: &[u8]) -> Result<Self, Self::Error> {
        let (&op, args) = payload
            .split_first()
            .ok_or(FrameError::InvalidFrameLength(1, 0))?;
        match op {
            Self::PAUSE => Ok(ControlOp::Pause),
            Self::RESUME => Ok(ControlOp::Resume),
            Self::TOGGLE_PAUSE => Ok(ControlOp::TogglePause),
            Self::RESET => Ok(ControlOp::Reset),
            Self::SET_LIMIT => {
                if args.len() < 4 {
                    return Err(FrameError::InvalidFrameLength(4, args.len()));
                }
                let seconds = u32::from_le_bytes(array_at(args, 0));
                TimeLimit::try_from(seconds)
                    .map(ControlOp::SetLimit)
                    .map_err(|_| FrameError::UnsupportedTimeLimit(seconds))
            }
            Self::SET_LANGUAGE => {
                let code = *args.first().ok_or(FrameError::InvalidFrameLength(1, 0))?;
                Language::from_wire_code(code)
                    .map(ControlOp::SetLanguage)
                    .ok_or(FrameError::UnsupportedLanguage(code))
            }
            _ => Err(FrameError::InvalidControlOp(op)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn body(frame: &Frame) -> Vec<u8> {
        frame.encode()[4..].to_vec()
    }

    fn landmark(x: f32) -> Landmark {
        Landmark {
            x,
            y: 0.25,
            z: -0.1,
            visibility: 0.98,
        }
    }

    #[test]
    fn length_prefix_counts_tag_and_payload() {
        let encoded = Frame::Control(ControlOp::SetLimit(TimeLimit::TenSeconds)).encode();
        assert_eq!(&encoded[..4], &6u32.to_le_bytes());
        assert_eq!(encoded.len(), 10);
    }

    #[test]
    fn decodes_detection_with_landmarks() {
        let frame = Frame::Detection {
            timestamp_ms: 1_700_000_000_123,
            pose: Some(PoseResult::new(vec![landmark(0.1), landmark(0.9)])),
        };
        assert_eq!(Frame::try_from(body(&frame).as_slice()).unwrap(), frame);
    }

    #[test]
    fn detection_without_landmarks_is_an_empty_pose() {
        let data = body(&Frame::Detection {
            timestamp_ms: 5,
            pose: None,
        });
        match Frame::try_from(data.as_slice()).unwrap() {
            Frame::Detection { timestamp_ms, pose } => {
                assert_eq!(timestamp_ms, 5);
                assert!(!pose.unwrap().is_person_present());
            }
            other => panic!("unexpected frame {:?}", other),
        }
    }

    #[test]
    fn truncated_landmark_block_is_malformed_not_an_error() {
        let mut data = body(&Frame::Detection {
            timestamp_ms: 9,
            pose: Some(PoseResult::new(vec![landmark(0.5)])),
        });
        data.truncate(data.len() - 3);
        assert_eq!(
            Frame::try_from(data.as_slice()).unwrap(),
            Frame::Detection {
                timestamp_ms: 9,
                pose: None
            }
        );
    }

    #[test]
    fn short_detection_header_is_an_error() {
        let data = [DETECTION_TAG, 1, 2, 3];
        assert!(matches!(
            Frame::try_from(&data[..]),
            Err(FrameError::InvalidFrameLength(10, 3))
        ));
    }

    #[test]
    fn unknown_tag_is_rejected() {
        assert!(matches!(
            Frame::try_from(&[9u8][..]),
            Err(FrameError::InvalidFrameTag(9))
        ));
        assert!(Frame::try_from(&[0u8; 0][..]).is_err());
    }

    #[test]
    fn decodes_every_control_op() {
        let ops = [
            ControlOp::Pause,
            ControlOp::Resume,
            ControlOp::TogglePause,
            ControlOp::Reset,
            ControlOp::SetLimit(TimeLimit::TwentyMinutes),
            ControlOp::SetLanguage(Language::Zh),
        ];
        for op in ops {
            let frame = Frame::Control(op);
            assert_eq!(Frame::try_from(body(&frame).as_slice()).unwrap(), frame);
        }
    }

    #[test]
    fn unsupported_limit_and_language_are_rejected() {
        let mut limit = vec![CONTROL_TAG, ControlOp::SET_LIMIT];
        limit.extend_from_slice(&45u32.to_le_bytes());
        assert!(matches!(
            Frame::try_from(limit.as_slice()),
            Err(FrameError::UnsupportedTimeLimit(45))
        ));

        let language = [CONTROL_TAG, ControlOp::SET_LANGUAGE, 8];
        assert!(matches!(
            Frame::try_from(&language[..]),
            Err(FrameError::UnsupportedLanguage(8))
        ));

        let unknown = [CONTROL_TAG, 42];
        assert!(matches!(
            Frame::try_from(&unknown[..]),
            Err(FrameError::InvalidControlOp(42))
        ));
    }
}
