use dashmap::DashMap;
use telemq_core::ClientId;

/// Live subscriber sessions, keyed by client id.
///
/// Sessions insert themselves before their task starts and remove themselves
/// when it ends, so the registry only lists sessions that are still running.
#[derive(Debug, Default)]
pub struct SessionRegistry {
    sessions: DashMap<ClientId, String>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, client_id: ClientId, label: String) {
        self.sessions.insert(client_id, label);
    }

    pub fn remove(&self, client_id: &ClientId) -> Option<String> {
        self.sessions.remove(client_id).map(|(_, label)| label)
    }

    pub fn contains(&self, client_id: &ClientId) -> bool {
        self.sessions.contains_key(client_id)
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    /// Labels of the live sessions, sorted
    pub fn labels(&self) -> Vec<String> {
        let mut labels: Vec<String> = self.sessions.iter().map(|entry| entry.value().clone()).collect();
        labels.sort();
        labels
    }
}
