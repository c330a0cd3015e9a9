//! Capture device descriptions and camera facing preference

use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of media device reported by enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DeviceKind {
    /// Camera
    #[serde(rename = "videoinput")]
    VideoInput,
    /// Microphone
    #[serde(rename = "audioinput")]
    AudioInput,
    /// Speaker or headphones
    #[serde(rename = "audiooutput")]
    AudioOutput,
}

/// A capture device as reported by enumeration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaptureDevice {
    /// Platform device identifier
    pub id: String,
    /// Human readable label (may be empty before permission is granted)
    pub label: String,
    /// Device kind
    pub kind: DeviceKind,
}

impl CaptureDevice {
    /// Create a camera entry
    pub fn camera(id: &str, label: &str) -> Self {
        Self {
            id: id.to_string(),
            label: label.to_string(),
            kind: DeviceKind::VideoInput,
        }
    }

    /// Create a microphone entry
    pub fn microphone(id: &str, label: &str) -> Self {
        Self {
            id: id.to_string(),
            label: label.to_string(),
            kind: DeviceKind::AudioInput,
        }
    }

    /// Whether this device is a camera
    pub fn is_video_input(&self) -> bool {
        self.kind == DeviceKind::VideoInput
    }
}

/// Number of cameras in an enumeration result
pub fn count_video_inputs(devices: &[CaptureDevice]) -> usize {
    devices.iter().filter(|d| d.is_video_input()).count()
}

/// Front vs rear camera preference
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FacingMode {
    /// Front camera, facing the user
    #[default]
    User,
    /// Rear camera, facing away from the user
    Environment,
}

impl FacingMode {
    /// The opposite camera
    pub fn flipped(self) -> Self {
        match self {
            FacingMode::User => FacingMode::Environment,
            FacingMode::Environment => FacingMode::User,
        }
    }

    /// Constraint value as understood by capture APIs
    pub fn as_str(&self) -> &'static str {
        match self {
            FacingMode::User => "user",
            FacingMode::Environment => "environment",
        }
    }
}

impl fmt::Display for FacingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_facing_mode_flip_is_involution() {
        assert_eq!(FacingMode::User.flipped(), FacingMode::Environment);
        assert_eq!(FacingMode::User.flipped().flipped(), FacingMode::User);
        assert_eq!(FacingMode::default(), FacingMode::User);
    }

    #[test]
    fn test_count_video_inputs() {
        let devices = vec![
            CaptureDevice::camera("cam-front", "Front Camera"),
            CaptureDevice::microphone("mic-0", "Built-in Microphone"),
            CaptureDevice::camera("cam-back", "Back Camera"),
        ];
        assert_eq!(count_video_inputs(&devices), 2);
        assert_eq!(count_video_inputs(&devices[1..2]), 0);
    }

    #[test]
    fn test_device_kind_wire_names() {
        let json = serde_json::to_string(&DeviceKind::VideoInput).unwrap();
        assert_eq!(json, "\"videoinput\"");
        let json = serde_json::to_string(&FacingMode::Environment).unwrap();
        assert_eq!(json, "\"environment\"");
    }
}
