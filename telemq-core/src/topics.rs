//! Topic names
//!
//! Publishers and subscribers exchange telemetry over one shared topic. Topic
//! names are concrete: wildcard filters are not supported.

use alloc::string::{String, ToString};

use crate::protocol::ProtocolError;

/// Topic shared by every publisher and subscriber unless configured otherwise.
pub const DEFAULT_TOPIC: &str = "data";

/// Longest topic the wire format can carry in a length-prefixed string.
pub const MAX_TOPIC_NAME_LENGTH: usize = u16::MAX as usize;

/// Topic name
/// Represents a validated MQTT topic name: non-empty, no wildcards, no NUL.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TopicName(String);

impl TopicName {
    pub fn new(name: &str) -> Result<Self, ProtocolError> {
        if name.is_empty() {
            return Err(ProtocolError::TopicEmpty);
        }
        if name.len() > MAX_TOPIC_NAME_LENGTH {
            return Err(ProtocolError::TopicNameLengthExceeded {
                max_length: MAX_TOPIC_NAME_LENGTH,
                actual_length: name.len(),
            });
        }
        if let Some(character) = name.chars().find(|c| matches!(c, '+' | '#' | '\0')) {
            return Err(ProtocolError::InvalidTopicCharacter { character });
        }
        Ok(TopicName(name.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for TopicName {
    fn default() -> Self {
        TopicName(DEFAULT_TOPIC.to_string())
    }
}

impl TryFrom<&str> for TopicName {
    type Error = ProtocolError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        TopicName::new(value)
    }
}

impl core::ops::Deref for TopicName {
    type Target = str;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl core::fmt::Display for TopicName {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_topic() {
        assert_eq!(TopicName::default().as_str(), "data");
    }

    #[test]
    fn test_multi_level_topic_accepted() {
        let topic = TopicName::new("plant/line-1/temp").unwrap();
        assert_eq!(topic.len(), 17);
    }

    #[test]
    fn test_empty_topic_rejected() {
        assert_eq!(TopicName::new(""), Err(ProtocolError::TopicEmpty));
    }

    #[test]
    fn test_wildcards_rejected() {
        assert_eq!(
            TopicName::new("sensors/+"),
            Err(ProtocolError::InvalidTopicCharacter { character: '+' })
        );
        assert_eq!(
            TopicName::new("sensors/#"),
            Err(ProtocolError::InvalidTopicCharacter { character: '#' })
        );
    }

    #[test]
    fn test_oversized_topic_rejected() {
        let long: String = core::iter::repeat('a').take(MAX_TOPIC_NAME_LENGTH + 1).collect();
        assert_eq!(
            TopicName::new(&long),
            Err(ProtocolError::TopicNameLengthExceeded {
                max_length: MAX_TOPIC_NAME_LENGTH,
                actual_length: MAX_TOPIC_NAME_LENGTH + 1,
            })
        );
    }
}
