//! Camera image controls and their valid ranges.

use std::ops::RangeInclusive;

use serde::{Deserialize, Serialize};

use crate::types::{WebcamError, WebcamResult};

/// A named numeric camera control.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SettingControl {
    Brightness,
    Contrast,
    Saturation,
    Hue,
    Gamma,
    Sharpness,
    WhiteBalance,
    Exposure,
    Gain,
    Focus,
}

impl SettingControl {
    /// Every control, in the order writes are applied to a device.
    pub const ALL: [SettingControl; 10] = [
        SettingControl::Brightness,
        SettingControl::Contrast,
        SettingControl::Saturation,
        SettingControl::Hue,
        SettingControl::Gamma,
        SettingControl::Sharpness,
        SettingControl::WhiteBalance,
        SettingControl::Exposure,
        SettingControl::Gain,
        SettingControl::Focus,
    ];

    /// Argument name as it appears in tool schemas and JSON payloads.
    pub fn name(self) -> &'static str {
        match self {
            SettingControl::Brightness => "brightness",
            SettingControl::Contrast => "contrast",
            SettingControl::Saturation => "saturation",
            SettingControl::Hue => "hue",
            SettingControl::Gamma => "gamma",
            SettingControl::Sharpness => "sharpness",
            SettingControl::WhiteBalance => "whiteBalance",
            SettingControl::Exposure => "exposure",
            SettingControl::Gain => "gain",
            SettingControl::Focus => "focus",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.name() == name)
    }

    pub fn range(self) -> RangeInclusive<i32> {
        match self {
            SettingControl::Hue => -180..=180,
            SettingControl::Gamma => 1..=500,
            SettingControl::WhiteBalance => 2000..=10000,
            SettingControl::Exposure => -10..=10,
            _ => 0..=100,
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            SettingControl::Brightness => "Brightness (0-100)",
            SettingControl::Contrast => "Contrast (0-100)",
            SettingControl::Saturation => "Saturation (0-100)",
            SettingControl::Hue => "Hue (-180 to 180)",
            SettingControl::Gamma => "Gamma (1-500)",
            SettingControl::Sharpness => "Sharpness (0-100)",
            SettingControl::WhiteBalance => "White balance temperature in Kelvin (2000-10000)",
            SettingControl::Exposure => "Exposure (-10 to 10)",
            SettingControl::Gain => "Gain (0-100)",
            SettingControl::Focus => "Focus (0-100)",
        }
    }

    /// Reject values outside the control's range.
    pub fn check(self, value: i64) -> WebcamResult<i32> {
        let range = self.range();
        if value < i64::from(*range.start()) {
            return Err(WebcamError::invalid(
                self.name(),
                format!("must be ≥ {}", range.start()),
            ));
        }
        if value > i64::from(*range.end()) {
            return Err(WebcamError::invalid(
                self.name(),
                format!("must be ≤ {}", range.end()),
            ));
        }
        Ok(value as i32)
    }
}

/// Sparse set of control values. `None` means "leave as is" on writes and
/// "not exposed by the device" on reads.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CameraSettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub brightness: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contrast: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub saturation: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hue: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gamma: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sharpness: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub white_balance: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exposure: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gain: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub focus: Option<i32>,
}

impl CameraSettings {
    fn slot(&mut self, control: SettingControl) -> &mut Option<i32> {
        match control {
            SettingControl::Brightness => &mut self.brightness,
            SettingControl::Contrast => &mut self.contrast,
            SettingControl::Saturation => &mut self.saturation,
            SettingControl::Hue => &mut self.hue,
            SettingControl::Gamma => &mut self.gamma,
            SettingControl::Sharpness => &mut self.sharpness,
            SettingControl::WhiteBalance => &mut self.white_balance,
            SettingControl::Exposure => &mut self.exposure,
            SettingControl::Gain => &mut self.gain,
            SettingControl::Focus => &mut self.focus,
        }
    }

    pub fn get(&self, control: SettingControl) -> Option<i32> {
        match control {
            SettingControl::Brightness => self.brightness,
            SettingControl::Contrast => self.contrast,
            SettingControl::Saturation => self.saturation,
            SettingControl::Hue => self.hue,
            SettingControl::Gamma => self.gamma,
            SettingControl::Sharpness => self.sharpness,
            SettingControl::WhiteBalance => self.white_balance,
            SettingControl::Exposure => self.exposure,
            SettingControl::Gain => self.gain,
            SettingControl::Focus => self.focus,
        }
    }

    pub fn set(&mut self, control: SettingControl, value: i32) {
        *self.slot(control) = Some(value);
    }

    pub fn with(mut self, control: SettingControl, value: i32) -> Self {
        self.set(control, value);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.fields().is_empty()
    }

    /// Supplied fields in write order.
    pub fn fields(&self) -> Vec<(SettingControl, i32)> {
        SettingControl::ALL
            .into_iter()
            .filter_map(|c| self.get(c).map(|v| (c, v)))
            .collect()
    }

    /// Overlay every field supplied in `other`, keeping the rest.
    pub fn merge(&mut self, other: &CameraSettings) {
        for (control, value) in other.fields() {
            self.set(control, value);
        }
    }

    pub fn validate(&self) -> WebcamResult<()> {
        for (control, value) in self.fields() {
            control.check(i64::from(value))?;
        }
        Ok(())
    }
}
