use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Equality predicate a subscription is bound to, e.g. `ministry_id = X`
/// on the `messages` table. One filter per subscription.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChangeFilter {
    pub table: String,
    pub column: String,
    pub value: String,
}

impl ChangeFilter {
    pub fn eq(table: &str, column: &str, value: impl ToString) -> Self {
        Self {
            table: table.to_string(),
            column: column.to_string(),
            value: value.to_string(),
        }
    }
}

/// Messages sent to the realtime endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientEvent {
    /// Authenticate with the session token
    Authenticate { token: String },

    /// Open a named subscription bound to one equality filter
    Subscribe { topic: String, filter: ChangeFilter },

    /// Tear down a subscription
    Unsubscribe { topic: String },

    /// Keep the connection alive
    Ping,
}

/// Messages received from the realtime endpoint.
///
/// Change notifications carry only the inserted row's id; the payload lacks
/// joined relations, so the client re-fetches the row before merging.
/// UPDATE/DELETE are not delivered.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerEvent {
    /// Authentication successful
    Authenticated { connection_id: Uuid },

    /// Subscription opened
    Subscribed { topic: String },

    /// A row matching the subscription's filter was inserted
    RowInserted {
        topic: String,
        table: String,
        row_id: Uuid,
    },

    /// Error message
    Error { message: String },

    /// Pong response to ping
    Pong,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn row_inserted_wire_format() {
        let event = ServerEvent::RowInserted {
            topic: "ministry_messages:42".into(),
            table: "messages".into(),
            row_id: Uuid::nil(),
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "row_inserted");
        assert_eq!(json["table"], "messages");
    }
}
