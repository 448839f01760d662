use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Role {
    User,
    Model,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Model => "model",
        }
    }

    /// Role string expected by the chat-completion endpoint. The transcript
    /// keeps "model" for the assistant side; the wire wants "assistant".
    pub fn to_api_role(self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Model => "assistant",
        }
    }

    pub fn is_user(self) -> bool {
        self == Role::User
    }

    pub fn is_model(self) -> bool {
        self == Role::Model
    }
}

impl AsRef<str> for Role {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl TryFrom<&str> for Role {
    type Error = String;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "user" => Ok(Role::User),
            "model" => Ok(Role::Model),
            _ => Err(format!("invalid transcript role: {value}")),
        }
    }
}

impl TryFrom<String> for Role {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::try_from(value.as_str())
    }
}

impl From<Role> for String {
    fn from(value: Role) -> Self {
        value.as_str().to_string()
    }
}

/// Opaque message identity, unique within one conversation.
///
/// Ids are allocated by [`MessageIdAllocator`] and only ever compared for
/// equality; the numeric value carries no meaning beyond uniqueness.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MessageId(pub(crate) u64);

#[cfg(feature = "bench")]
impl MessageId {
    /// Fixed id for benchmark harnesses, which have no conversation to
    /// allocate from.
    pub fn bench() -> Self {
        MessageId(0)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub id: MessageId,
    pub role: Role,
    pub content: String,
}

impl Message {
    pub fn new(id: MessageId, role: Role, content: impl Into<String>) -> Self {
        Self {
            id,
            role,
            content: content.into(),
        }
    }

    pub fn user(id: MessageId, content: impl Into<String>) -> Self {
        Self::new(id, Role::User, content)
    }

    /// Empty model-side message inserted when a response stream opens. Its
    /// content grows as deltas arrive and is immutable once finalized.
    pub fn model_placeholder(id: MessageId) -> Self {
        Self::new(id, Role::Model, String::new())
    }

    pub fn is_user(&self) -> bool {
        self.role.is_user()
    }

    pub fn is_model(&self) -> bool {
        self.role.is_model()
    }
}

/// Hands out fresh [`MessageId`]s for one conversation.
///
/// A restored conversation resumes the counter past the largest id it
/// loaded so new messages never collide with persisted ones.
#[derive(Debug, Default)]
pub struct MessageIdAllocator {
    next: u64,
}

impl MessageIdAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn resuming_after(messages: &[Message]) -> Self {
        let next = messages
            .iter()
            .map(|m| m.id.0 + 1)
            .max()
            .unwrap_or_default();
        Self { next }
    }

    pub fn allocate(&mut self) -> MessageId {
        let id = MessageId(self.next);
        self.next += 1;
        id
    }

    pub fn reset(&mut self) {
        self.next = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roles_round_trip_through_strings() {
        for role in [Role::User, Role::Model] {
            assert_eq!(Role::try_from(role.as_str()), Ok(role));
        }
    }

    #[test]
    fn invalid_role_strings_are_rejected() {
        assert!(Role::try_from("assistant").is_err());
        assert!(Role::try_from("system").is_err());
    }

    #[test]
    fn model_maps_to_assistant_on_the_wire() {
        assert_eq!(Role::Model.to_api_role(), "assistant");
        assert_eq!(Role::User.to_api_role(), "user");
    }

    #[test]
    fn allocator_resumes_past_restored_ids() {
        let mut fresh = MessageIdAllocator::new();
        let a = fresh.allocate();
        let b = fresh.allocate();
        assert_ne!(a, b);

        let restored = vec![
            Message::user(a, "hi"),
            Message::new(b, Role::Model, "hello"),
        ];
        let mut resumed = MessageIdAllocator::resuming_after(&restored);
        let c = resumed.allocate();
        assert!(restored.iter().all(|m| m.id != c));
    }

    #[test]
    fn allocator_on_empty_history_starts_fresh() {
        let mut alloc = MessageIdAllocator::resuming_after(&[]);
        let first = alloc.allocate();
        assert_eq!(first, MessageId(0));
    }
}
