use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::identity::{BookingId, RequesterId};

/// Immutable record pairing one requester with one consumed ticket.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Booking {
    pub id: BookingId,
    pub requester_id: RequesterId,
    pub created_at: DateTime<Utc>,
}

impl Booking {
    /// Create a booking stamped with the current time.
    pub fn new(id: BookingId, requester_id: RequesterId) -> Self {
        Self {
            id,
            requester_id,
            created_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_uses_snake_case_fields() {
        let booking = Booking::new(
            BookingId::parse("BOOK-a-1-1").unwrap(),
            RequesterId::parse("a").unwrap(),
        );
        let value = serde_json::to_value(&booking).unwrap();
        assert_eq!(value["id"], "BOOK-a-1-1");
        assert_eq!(value["requester_id"], "a");
        assert!(value["created_at"].is_string());
    }
}
