use ivory_keyboard::KeyboardConfig;
use serde::{Deserialize, Serialize};
use std::{fs, path::Path};

const MAX_CHANNEL: u8 = 15;
const MAX_VELOCITY: u8 = 127;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// MIDI channel (0 to 15) that notes are sent on
    pub channel: u8,
    pub velocity: u8,
    pub keyboard: KeyboardConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            channel: 0,
            velocity: 100,
            keyboard: KeyboardConfig::default(),
        }
    }
}

impl AppConfig {
    pub fn parse(json_string: &str) -> anyhow::Result<Self> {
        Ok(serde_json::from_str(json_string)?)
    }

    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let json_string = fs::read_to_string(path)?;
        Self::parse(json_string.as_str())
    }

    /// The channel to send on. Out of range channels are clamped rather than wrapped.
    pub fn midi_channel(&self) -> u8 {
        if self.channel > MAX_CHANNEL {
            log::warn!(
                "Channel {} is out of range, using {} instead",
                self.channel,
                MAX_CHANNEL
            );
        }
        self.channel.min(MAX_CHANNEL)
    }

    pub fn midi_velocity(&self) -> u8 {
        if self.velocity > MAX_VELOCITY {
            log::warn!(
                "Velocity {} is out of range, using {} instead",
                self.velocity,
                MAX_VELOCITY
            );
        }
        self.velocity.min(MAX_VELOCITY)
    }

    /// Like `load` but logs a warning and falls back to the defaults on failure
    pub fn load_(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        match Self::load(path) {
            Ok(config) => config,
            Err(e) => {
                log::warn!(
                    "Failed to load config from {}: {}",
                    path.display(),
                    e
                );
                Self::default()
            }
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn missing_fields_take_defaults() {
        let config = AppConfig::parse(
            r#"{
                "channel": 3,
                "keyboard": {
                    "octave_mode": true,
                    "colors": { "held_key": { "r": 1, "g": 2, "b": 3 } }
                }
            }"#,
        )
        .unwrap();
        assert_eq!(config.channel, 3);
        assert_eq!(config.velocity, 100);
        assert!(config.keyboard.octave_mode);
        assert!(config.keyboard.local_echo);
        assert_eq!(config.keyboard.colors.held_key.b, 3);
        assert_eq!(
            config.keyboard.colors.white_key,
            KeyboardConfig::default().colors.white_key
        );
    }

    #[test]
    fn empty_object_is_the_default() {
        assert_eq!(AppConfig::parse("{}").unwrap(), AppConfig::default());
    }

    #[test]
    fn out_of_range_channel_and_velocity_are_clamped() {
        let config = AppConfig {
            channel: 16,
            velocity: 200,
            ..Default::default()
        };
        assert_eq!(config.midi_channel(), 15);
        assert_eq!(config.midi_velocity(), 127);
        let config = AppConfig {
            channel: 9,
            ..Default::default()
        };
        assert_eq!(config.midi_channel(), 9);
        assert_eq!(config.midi_velocity(), 100);
    }

    #[test]
    fn malformed_config_is_an_error() {
        assert!(AppConfig::parse(r#"{ "channel": "one" }"#).is_err());
    }
}
