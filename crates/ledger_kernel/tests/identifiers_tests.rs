//! Unit tests for the typed identifiers
//!
//! Tests cover creation, parsing, conversion and display formatting.

use ledger_kernel::{AccountId, EntryId, TransactionId};
use uuid::Uuid;

mod account_id_tests {
    use super::*;

    #[test]
    fn test_new_generates_unique_ids() {
        assert_ne!(AccountId::new(), AccountId::new());
    }

    #[test]
    fn test_new_v7_generates_time_ordered_ids() {
        let id1 = AccountId::new_v7();
        std::thread::sleep(std::time::Duration::from_millis(1));
        let id2 = AccountId::new_v7();
        assert!(id1 < id2);
    }

    #[test]
    fn test_from_uuid() {
        let uuid = Uuid::new_v4();
        let id = AccountId::from(uuid);
        assert_eq!(*id.as_uuid(), uuid);
    }

    #[test]
    fn test_prefix() {
        assert_eq!(AccountId::PREFIX, "ACC");
    }

    #[test]
    fn test_json_serialization_is_bare_uuid() {
        let id = AccountId::new();
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, format!("\"{}\"", id.as_uuid()));

        let deserialized: AccountId = serde_json::from_str(&json).unwrap();
        assert_eq!(id, deserialized);
    }
}

mod transaction_id_tests {
    use super::*;

    #[test]
    fn test_display_format() {
        assert!(TransactionId::new().to_string().starts_with("TXN-"));
    }

    #[test]
    fn test_from_str_rejects_garbage() {
        assert!("TXN-not-a-uuid".parse::<TransactionId>().is_err());
    }

    #[test]
    fn test_foreign_prefix_is_not_stripped() {
        let uuid = Uuid::new_v4();
        let result = format!("ACC-{}", uuid).parse::<TransactionId>();
        assert!(result.is_err());
    }
}

mod entry_id_tests {
    use super::*;

    #[test]
    fn test_round_trip_through_display() {
        let id = EntryId::new();
        let parsed: EntryId = id.to_string().parse().unwrap();
        assert_eq!(id, parsed);
        assert_eq!(EntryId::PREFIX, "ENT");
    }
}
