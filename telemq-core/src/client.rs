use alloc::format;
use alloc::string::{String, ToString};

use crate::protocol::ProtocolError;

pub const MAX_CLIENT_ID_LENGTH: usize = 23;

/// Client identifier
/// Servers must accept ClientIds of 1 to 23 bytes drawn from [0-9a-zA-Z]; `-`
/// and `_` are accepted by every broker this harness targets and are allowed
/// here too.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ClientId(String);

impl ClientId {
    pub fn new(value: &str) -> Result<Self, ProtocolError> {
        if value.is_empty() {
            return Err(ProtocolError::ClientIdEmpty);
        }
        if value.len() > MAX_CLIENT_ID_LENGTH {
            return Err(ProtocolError::ClientIdLengthExceeded {
                max_length: MAX_CLIENT_ID_LENGTH,
                actual_length: value.len(),
            });
        }
        if let Some(character) = value.chars().find(|c| !is_client_id_char(*c)) {
            return Err(ProtocolError::InvalidClientIdCharacter { character });
        }
        Ok(ClientId(value.to_string()))
    }

    /// Build `{prefix}-{n:08x}`, dropping characters a broker may reject and
    /// truncating the prefix so the result stays within 23 bytes.
    pub fn generate(prefix: &str, n: u32) -> Self {
        let suffix = format!("-{:08x}", n);
        let mut id: String = prefix
            .chars()
            .filter(|c| is_client_id_char(*c))
            .take(MAX_CLIENT_ID_LENGTH - suffix.len())
            .collect();
        if id.is_empty() {
            id.push_str("client");
        }
        id.push_str(&suffix);
        ClientId(id)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

fn is_client_id_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '-' || c == '_'
}

impl TryFrom<&str> for ClientId {
    type Error = ProtocolError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        ClientId::new(value)
    }
}

impl core::ops::Deref for ClientId {
    type Target = str;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl core::fmt::Display for ClientId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.0)
    }
}
