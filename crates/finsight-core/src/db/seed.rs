//! Demo dataset for a fresh database
//!
//! Inserts a small, deterministic slice of every record kind so the chat
//! assistant has something to answer questions about. Used by `finsight seed`
//! and by tests.

use rusqlite::params;
use tracing::info;

use super::Database;
use crate::error::Result;

impl Database {
    /// Insert the demo dataset for a user
    ///
    /// Safe to call once per user on an empty database; rerunning it will
    /// fail on the category uniqueness constraint.
    pub fn seed_demo_data(&self, user_id: &str) -> Result<()> {
        let conn = self.conn()?;

        let mut category_ids = Vec::new();
        for name in ["Groceries", "Rent", "Salary", "Entertainment"] {
            conn.execute(
                "INSERT INTO categories (user_id, name) VALUES (?, ?)",
                params![user_id, name],
            )?;
            category_ids.push(conn.last_insert_rowid());
        }
        let (groceries, rent, salary, entertainment) = (
            category_ids[0],
            category_ids[1],
            category_ids[2],
            category_ids[3],
        );

        conn.execute(
            "INSERT INTO sub_categories (user_id, category_id, name) VALUES (?, ?, ?)",
            params![user_id, groceries, "Supermarket"],
        )?;
        let supermarket = conn.last_insert_rowid();

        conn.execute(
            "INSERT INTO bank_accounts (user_id, name, starting_balance, is_active) VALUES (?, ?, ?, ?)",
            params![user_id, "Everyday Savings", 50000.0, 1],
        )?;
        let savings = conn.last_insert_rowid();
        conn.execute(
            "INSERT INTO bank_accounts (user_id, name, starting_balance, is_active) VALUES (?, ?, ?, ?)",
            params![user_id, "Closed Current", 1200.0, 0],
        )?;

        let transactions: &[(&str, &str, f64, &str, &str, Option<i64>, Option<i64>, &str)] = &[
            ("2024-03-01", "Monthly salary", 75000.0, "CREDIT", "COMPLETED", Some(salary), None, "NET_BANKING"),
            ("2024-03-02", "Rent for March", 22000.0, "DEBIT", "COMPLETED", Some(rent), None, "UPI"),
            ("2024-03-05", "Weekly groceries", 3400.0, "DEBIT", "COMPLETED", Some(groceries), Some(supermarket), "CREDIT_CARD"),
            ("2024-03-12", "Groceries top-up", 1250.0, "DEBIT", "COMPLETED", Some(groceries), Some(supermarket), "UPI"),
            ("2024-03-15", "Concert tickets", 2800.0, "DEBIT", "PENDING", Some(entertainment), None, "CREDIT_CARD"),
            ("2024-03-20", "Cashback", 450.0, "CREDIT", "COMPLETED", None, None, "OTHER"),
        ];
        for (date, desc, amount, tt, status, cat, sub_cat, method) in transactions {
            conn.execute(
                r#"
                INSERT INTO transactions
                    (user_id, date, description, amount, transaction_type, status,
                     category_id, sub_category_id, bank_account_id, payment_method)
                VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
                "#,
                params![user_id, date, desc, amount, tt, status, cat, sub_cat, savings, method],
            )?;
        }

        let investments: &[(&str, &str, f64, f64, &str)] = &[
            ("Nifty index fund", "MUTUAL_FUNDS", 185000.0, 150000.0, "2022-06-10"),
            ("Blue-chip portfolio", "STOCKS", 96000.0, 80000.0, "2023-01-20"),
            ("5-year deposit", "FIXED_DEPOSIT", 104500.0, 100000.0, "2023-11-01"),
        ];
        for (name, kind, current, invested, date) in investments {
            conn.execute(
                r#"
                INSERT INTO investments (user_id, name, type, current_value, invested_amount, purchase_date)
                VALUES (?, ?, ?, ?, ?, ?)
                "#,
                params![user_id, name, kind, current, invested, date],
            )?;
        }

        conn.execute(
            "INSERT INTO goals (user_id, name, target_amount, current_amount, is_active) VALUES (?, ?, ?, ?, ?)",
            params![user_id, "Emergency fund", 300000.0, 120000.0, 1],
        )?;
        conn.execute(
            "INSERT INTO goals (user_id, name, target_amount, current_amount, is_active) VALUES (?, ?, ?, ?, ?)",
            params![user_id, "Japan trip", 250000.0, 250000.0, 0],
        )?;

        conn.execute(
            "INSERT INTO assets (user_id, name, type, current_value, purchase_date) VALUES (?, ?, ?, ?, ?)",
            params![user_id, "Commuter car", "VEHICLE", 420000.0, "2021-08-15"],
        )?;
        conn.execute(
            "INSERT INTO assets (user_id, name, type, current_value, purchase_date) VALUES (?, ?, ?, ?, ?)",
            params![user_id, "Work laptop", "ELECTRONICS", 85000.0, "2023-04-02"],
        )?;

        let bank_transactions: &[(&str, &str, f64, &str, f64)] = &[
            ("2024-03-01", "SALARY CREDIT", 75000.0, "CREDIT", 125000.0),
            ("2024-03-02", "NEFT RENT", 22000.0, "DEBIT", 103000.0),
            ("2024-03-05", "POS SUPERMART", 3400.0, "DEBIT", 99600.0),
        ];
        for (date, desc, amount, tt, balance) in bank_transactions {
            conn.execute(
                r#"
                INSERT INTO bank_transactions
                    (user_id, bank_account_id, transaction_date, description, amount, transaction_type, current_balance)
                VALUES (?, ?, ?, ?, ?, ?, ?)
                "#,
                params![user_id, savings, date, desc, amount, tt, balance],
            )?;
        }

        info!(user_id, "Seeded demo data");
        Ok(())
    }
}
