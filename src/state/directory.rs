use crate::error::RegistrationError;
use crate::types::{Participant, ParticipantId};

/// Registered participants in registration order.
///
/// Display names are unique (exact, case-sensitive). Callers serialize
/// access through the room lock, so every method here is a plain
/// all-or-nothing mutation.
#[derive(Debug, Default, Clone)]
pub struct UserDirectory {
    entries: Vec<Participant>,
}

impl UserDirectory {
    /// Insert a new participant unless the name is already present
    pub fn try_register(&mut self, name: &str) -> Result<Participant, RegistrationError> {
        if self.contains(name) {
            return Err(RegistrationError::NameTaken);
        }

        let participant = Participant::new(name);
        self.entries.push(participant.clone());
        Ok(participant)
    }

    /// Remove the first entry with this name. Unknown names are a no-op.
    pub fn unregister(&mut self, name: &str) -> Option<Participant> {
        let idx = self.entries.iter().position(|p| p.name == name)?;
        Some(self.entries.remove(idx))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.iter().any(|p| p.name == name)
    }

    pub fn get(&self, id: &ParticipantId) -> Option<&Participant> {
        self.entries.iter().find(|p| p.id == *id)
    }

    /// Independent copy of the current contents
    pub fn snapshot(&self) -> Vec<Participant> {
        self.entries.clone()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
