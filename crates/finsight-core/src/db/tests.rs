//! Database tests

use super::*;
use crate::models::*;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::{BankAccountFilter, GoalFilter, TransactionFilter};
    use chrono::NaiveDate;

    #[test]
    fn test_in_memory_db() {
        let db = Database::in_memory().unwrap();
        let accounts = db
            .query_bank_accounts("alice", &BankAccountFilter::default())
            .unwrap();
        assert!(accounts.is_empty());
    }

    #[test]
    fn test_schema_has_expected_tables() {
        let db = Database::in_memory().unwrap();
        let conn = db.conn().unwrap();

        let count: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name IN \
                 ('categories', 'sub_categories', 'bank_accounts', 'transactions', \
                  'investments', 'goals', 'assets', 'bank_transactions', 'chat_messages')",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(count, 9, "all nine tables should exist");
    }

    #[test]
    fn test_queries_are_user_scoped() {
        let db = Database::in_memory().unwrap();
        db.seed_demo_data("alice").unwrap();
        db.seed_demo_data("bob").unwrap();

        let alice = db
            .query_transactions("alice", &TransactionFilter::default())
            .unwrap();
        let bob = db
            .query_transactions("bob", &TransactionFilter::default())
            .unwrap();
        let nobody = db
            .query_transactions("carol", &TransactionFilter::default())
            .unwrap();

        assert_eq!(alice.len(), bob.len());
        assert!(!alice.is_empty());
        assert!(nobody.is_empty());
    }

    #[test]
    fn test_transactions_ordered_newest_first_with_joins() {
        let db = Database::in_memory().unwrap();
        db.seed_demo_data("alice").unwrap();

        let rows = db
            .query_transactions("alice", &TransactionFilter::default())
            .unwrap();
        for pair in rows.windows(2) {
            assert!(pair[0].date >= pair[1].date);
        }

        // Joined display names come back resolved, not as ids
        let salary = rows
            .iter()
            .find(|r| r.description.as_deref() == Some("Monthly salary"))
            .unwrap();
        assert_eq!(salary.category.as_deref(), Some("Salary"));
        assert_eq!(salary.bank_account.as_deref(), Some("Everyday Savings"));

        let groceries = rows
            .iter()
            .find(|r| r.description.as_deref() == Some("Weekly groceries"))
            .unwrap();
        assert_eq!(groceries.sub_category.as_deref(), Some("Supermarket"));
    }

    #[test]
    fn test_date_bounds_are_inclusive() {
        let db = Database::in_memory().unwrap();
        db.seed_demo_data("alice").unwrap();

        let filter = TransactionFilter {
            date_from: NaiveDate::from_ymd_opt(2024, 3, 2),
            date_to: NaiveDate::from_ymd_opt(2024, 3, 5),
            ..Default::default()
        };
        let rows = db.query_transactions("alice", &filter).unwrap();

        let dates: Vec<String> = rows.iter().map(|r| r.date.to_string()).collect();
        assert!(dates.contains(&"2024-03-02".to_string()));
        assert!(dates.contains(&"2024-03-05".to_string()));
        assert!(!dates.contains(&"2024-03-01".to_string()));
        assert!(!dates.contains(&"2024-03-12".to_string()));
    }

    #[test]
    fn test_count_matches_query_len() {
        let db = Database::in_memory().unwrap();
        db.seed_demo_data("alice").unwrap();

        let filter = TransactionFilter {
            transaction_type: Some(TransactionType::Debit),
            ..Default::default()
        };
        let count = db.count_transactions("alice", &filter).unwrap();
        let rows = db.query_transactions("alice", &filter).unwrap();
        assert_eq!(count as usize, rows.len());
        assert!(rows.iter().all(|r| r.transaction_type == TransactionType::Debit));
    }

    #[test]
    fn test_active_flag_filter_on_goals() {
        let db = Database::in_memory().unwrap();
        db.seed_demo_data("alice").unwrap();

        let active = db
            .query_goals(
                "alice",
                &GoalFilter {
                    is_active: Some(true),
                },
            )
            .unwrap();
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].name, "Emergency fund");

        let all = db.query_goals("alice", &GoalFilter::default()).unwrap();
        assert_eq!(all.len(), 2);
    }

    #[test]
    fn test_chat_message_round_trip() {
        let db = Database::in_memory().unwrap();

        db.insert_chat_message("alice", ChatRole::User, None, "how much did I spend?")
            .unwrap();
        db.insert_chat_message(
            "alice",
            ChatRole::Assistant,
            Some("TEXT"),
            "You spent a lot.",
        )
        .unwrap();
        db.insert_chat_message("bob", ChatRole::User, None, "unrelated")
            .unwrap();

        let messages = db.list_chat_messages("alice", 50).unwrap();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].role, ChatRole::User);
        assert_eq!(messages[1].response_type.as_deref(), Some("TEXT"));

        let cleared = db.clear_chat_messages("alice").unwrap();
        assert_eq!(cleared, 2);
        assert!(db.list_chat_messages("alice", 50).unwrap().is_empty());
        assert_eq!(db.list_chat_messages("bob", 50).unwrap().len(), 1);
    }

    #[test]
    fn test_chat_history_limit_keeps_most_recent() {
        let db = Database::in_memory().unwrap();
        for i in 0..5 {
            db.insert_chat_message("alice", ChatRole::User, None, &format!("message {}", i))
                .unwrap();
        }

        let messages = db.list_chat_messages("alice", 2).unwrap();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].content, "message 3");
        assert_eq!(messages[1].content, "message 4");
    }
}
