//! Action registries and input validation
//!
//! Every device-control endpoint validates its request against a closed
//! vocabulary defined here before anything is dispatched to a device. The
//! registries are static lookup data plus predicates; they perform no I/O.
//!
//! Matching is case-insensitive for user-facing names (keys, apps, buttons,
//! actions). The structured identifiers they map to (Samsung key codes,
//! Tizen app IDs, cast receiver IDs) are emitted verbatim and never matched
//! against user input.

use crate::error::{DenError, Result};
use once_cell::sync::Lazy;
use regex::Regex;
use url::Url;

/// MAC address formats: XX:XX:XX:XX:XX:XX or XX-XX-XX-XX-XX-XX
static MAC_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^([0-9a-fA-F]{2}[:-]){5}[0-9a-fA-F]{2}$").expect("Invalid MAC regex")
});

/// Friendly key names to Samsung remote key codes.
///
/// The key-code side of the table is the vendor vocabulary and is passed to
/// the TV verbatim; raw `KEY_*` tokens already present in the table are also
/// accepted as input.
const TV_KEYS: &[(&str, &str)] = &[
    ("power", "KEY_POWER"),
    ("poweroff", "KEY_POWEROFF"),
    ("up", "KEY_UP"),
    ("down", "KEY_DOWN"),
    ("left", "KEY_LEFT"),
    ("right", "KEY_RIGHT"),
    ("enter", "KEY_ENTER"),
    ("ok", "KEY_ENTER"),
    ("return", "KEY_RETURN"),
    ("back", "KEY_RETURN"),
    ("exit", "KEY_EXIT"),
    ("home", "KEY_HOME"),
    ("menu", "KEY_MENU"),
    ("source", "KEY_SOURCE"),
    ("guide", "KEY_GUIDE"),
    ("tools", "KEY_TOOLS"),
    ("info", "KEY_INFO"),
    ("volup", "KEY_VOLUP"),
    ("voldown", "KEY_VOLDOWN"),
    ("mute", "KEY_MUTE"),
    ("chup", "KEY_CHUP"),
    ("chdown", "KEY_CHDOWN"),
    ("prech", "KEY_PRECH"),
    ("chlist", "KEY_CH_LIST"),
    ("0", "KEY_0"),
    ("1", "KEY_1"),
    ("2", "KEY_2"),
    ("3", "KEY_3"),
    ("4", "KEY_4"),
    ("5", "KEY_5"),
    ("6", "KEY_6"),
    ("7", "KEY_7"),
    ("8", "KEY_8"),
    ("9", "KEY_9"),
    ("play", "KEY_PLAY"),
    ("pause", "KEY_PAUSE"),
    ("stop", "KEY_STOP"),
    ("rewind", "KEY_REWIND"),
    ("forward", "KEY_FF"),
    ("record", "KEY_REC"),
    ("red", "KEY_RED"),
    ("green", "KEY_GREEN"),
    ("yellow", "KEY_YELLOW"),
    ("blue", "KEY_CYAN"),
    ("hdmi", "KEY_HDMI"),
    ("hdmi1", "KEY_HDMI1"),
    ("hdmi2", "KEY_HDMI2"),
    ("hdmi3", "KEY_HDMI3"),
    ("hdmi4", "KEY_HDMI4"),
    ("sleep", "KEY_SLEEP"),
    ("caption", "KEY_CAPTION"),
    ("pictsize", "KEY_PICTURE_SIZE"),
    ("channel", "KEY_CHUP"),
];

/// TV app names to Tizen application IDs (case-sensitive identifiers).
const TV_APPS: &[(&str, &str)] = &[
    ("netflix", "11101200001"),
    ("youtube", "111299001912"),
    ("prime video", "3201512006785"),
    ("prime", "3201512006785"),
    ("disney+", "3201901017640"),
    ("disneyplus", "3201901017640"),
    ("spotify", "3201606009684"),
    ("plex", "3201512006963"),
    ("apple tv", "3201807016597"),
    ("appletv", "3201807016597"),
    ("hulu", "3201601007625"),
];

/// Chromecast app names to cast receiver application IDs.
const CAST_APPS: &[(&str, &str)] = &[
    ("youtube", "233637DE"),
    ("netflix", "CA5E8412"),
    ("spotify", "CC32E753"),
    ("default", "CC1AD845"),
    ("media", "CC1AD845"),
];

/// PS5 remote-play button tokens accepted by the helper.
const PS5_BUTTONS: &[&str] = &[
    "up", "down", "left", "right", "enter", "back", "option", "ps", "cross", "circle", "square",
    "triangle", "touchpad",
];

/// Media types accepted for casting.
const MEDIA_TYPES: &[&str] = &["image", "video", "audio"];

/// Chromecast playback actions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CastAction {
    Play,
    Pause,
    Stop,
    Volume,
    Mute,
    Unmute,
    Seek,
    VolUp,
    VolDown,
    Rewind,
    Forward,
}

impl CastAction {
    /// All accepted action tokens, in the order they are reported to clients
    pub const ALL: &'static [&'static str] = &[
        "play", "pause", "stop", "volume", "mute", "unmute", "seek", "volup", "voldown", "rewind",
        "forward",
    ];

    /// Parse an action token (case-insensitive)
    pub fn parse(token: &str) -> Option<Self> {
        match token.to_lowercase().as_str() {
            "play" => Some(Self::Play),
            "pause" => Some(Self::Pause),
            "stop" => Some(Self::Stop),
            "volume" => Some(Self::Volume),
            "mute" => Some(Self::Mute),
            "unmute" => Some(Self::Unmute),
            "seek" => Some(Self::Seek),
            "volup" => Some(Self::VolUp),
            "voldown" => Some(Self::VolDown),
            "rewind" => Some(Self::Rewind),
            "forward" => Some(Self::Forward),
            _ => None,
        }
    }

    /// Canonical lowercase token for this action
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Play => "play",
            Self::Pause => "pause",
            Self::Stop => "stop",
            Self::Volume => "volume",
            Self::Mute => "mute",
            Self::Unmute => "unmute",
            Self::Seek => "seek",
            Self::VolUp => "volup",
            Self::VolDown => "voldown",
            Self::Rewind => "rewind",
            Self::Forward => "forward",
        }
    }

    /// Whether this action carries a numeric value
    pub fn requires_value(&self) -> bool {
        matches!(self, Self::Volume | Self::Seek)
    }
}

/// PS5 power transitions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PowerAction {
    Wake,
    Standby,
}

impl PowerAction {
    /// Parse a power action token (case-insensitive)
    pub fn parse(token: &str) -> Option<Self> {
        match token.to_lowercase().as_str() {
            "wake" => Some(Self::Wake),
            "standby" => Some(Self::Standby),
            _ => None,
        }
    }

    /// Canonical lowercase token for this action
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Wake => "wake",
            Self::Standby => "standby",
        }
    }
}

/// Look up the Samsung key code for a friendly key name
pub fn tv_key_code(key: &str) -> Option<&'static str> {
    let wanted = key.to_lowercase();
    TV_KEYS
        .iter()
        .find(|(name, code)| *name == wanted || code.to_lowercase() == wanted)
        .map(|(_, code)| *code)
}

/// All friendly TV key names
pub fn tv_key_names() -> Vec<&'static str> {
    TV_KEYS.iter().map(|(name, _)| *name).collect()
}

/// Look up the Tizen application ID for a TV app name
pub fn tv_app_id(app: &str) -> Option<&'static str> {
    let wanted = app.to_lowercase();
    TV_APPS
        .iter()
        .find(|(name, _)| *name == wanted)
        .map(|(_, id)| *id)
}

/// All TV app names
pub fn tv_app_names() -> Vec<&'static str> {
    TV_APPS.iter().map(|(name, _)| *name).collect()
}

/// Look up the cast receiver application ID for a Chromecast app name
pub fn cast_app_id(app: &str) -> Option<&'static str> {
    let wanted = app.to_lowercase();
    CAST_APPS
        .iter()
        .find(|(name, _)| *name == wanted)
        .map(|(_, id)| *id)
}

/// All Chromecast app names
pub fn cast_app_names() -> Vec<&'static str> {
    CAST_APPS.iter().map(|(name, _)| *name).collect()
}

/// Validate a PS5 button token, returning its canonical lowercase form
pub fn ps5_button(button: &str) -> Option<&'static str> {
    let wanted = button.to_lowercase();
    PS5_BUTTONS.iter().find(|b| **b == wanted).copied()
}

/// All PS5 button tokens
pub fn ps5_button_names() -> &'static [&'static str] {
    PS5_BUTTONS
}

/// Validate a volume level (percent)
pub fn validate_volume(value: f64) -> Result<f64> {
    if !value.is_finite() || !(0.0..=100.0).contains(&value) {
        return Err(DenError::invalid_input(format!(
            "Invalid volume level: {value}. Volume must be a number between 0 and 100"
        )));
    }
    Ok(value)
}

/// Validate a seek position in seconds
pub fn validate_seek(value: f64) -> Result<f64> {
    if !value.is_finite() || value < 0.0 {
        return Err(DenError::invalid_input(format!(
            "Invalid seek position: {value}. Seek must be a non-negative number of seconds"
        )));
    }
    Ok(value)
}

/// Validate the value attached to a cast action.
///
/// Parameterized actions (`volume`, `seek`) must carry a value in range;
/// a value attached to any other action is ignored, never an error.
pub fn validate_cast_value(action: CastAction, value: Option<f64>) -> Result<Option<f64>> {
    match action {
        CastAction::Volume => {
            let v = value.ok_or_else(|| {
                DenError::invalid_input(
                    "Action 'volume' requires a value between 0 and 100".to_string(),
                )
            })?;
            Ok(Some(validate_volume(v)?))
        }
        CastAction::Seek => {
            let v = value.ok_or_else(|| {
                DenError::invalid_input(
                    "Action 'seek' requires a position in seconds".to_string(),
                )
            })?;
            Ok(Some(validate_seek(v)?))
        }
        _ => Ok(None),
    }
}

/// Validate a media URL for casting. Only http/https schemes are castable.
pub fn validate_cast_url(raw: &str) -> Result<Url> {
    let url = Url::parse(raw)
        .map_err(|e| DenError::invalid_input(format!("Invalid URL '{raw}': {e}")))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(DenError::invalid_input(format!(
            "Unsupported URL scheme '{other}'. Only http and https URLs can be cast"
        ))),
    }
}

/// Validate a media type, returning its canonical lowercase form.
/// `None` defaults to "video".
pub fn validate_media_type(media_type: Option<&str>) -> Result<&'static str> {
    let Some(raw) = media_type else {
        return Ok("video");
    };
    let wanted = raw.to_lowercase();
    MEDIA_TYPES
        .iter()
        .find(|t| **t == wanted)
        .copied()
        .ok_or_else(|| {
            DenError::invalid_input(format!(
                "Invalid media type '{raw}'. Valid types: {}",
                MEDIA_TYPES.join(", ")
            ))
        })
}

/// Validate a MAC address for wake-on-LAN
pub fn validate_mac(mac: &str) -> Result<&str> {
    if MAC_REGEX.is_match(mac) {
        Ok(mac)
    } else {
        Err(DenError::invalid_input(format!(
            "Invalid MAC address '{mac}'. Expected format XX:XX:XX:XX:XX:XX"
        )))
    }
}
