//! Read queries for the six queryable record kinds
//!
//! Every query is scoped by `user_id` as its first predicate; the scope is
//! added here, not by callers, so no descriptor content can widen it. Row
//! queries return newest-first with joined display names resolved; count
//! queries share the same predicate builders without materializing rows.

use rusqlite::types::Type;

use super::{parse_date, parse_datetime, Database};
use crate::error::Result;
use crate::models::{
    AssetRecord, BankAccountRecord, BankTransactionRecord, GoalRecord, InvestmentRecord,
    TransactionRecord,
};
use crate::query::{
    AssetFilter, BankAccountFilter, BankTransactionFilter, GoalFilter, InvestmentFilter,
    TransactionFilter,
};

type SqlParams = Vec<Box<dyn rusqlite::ToSql>>;

fn param_refs(params: &SqlParams) -> Vec<&dyn rusqlite::ToSql> {
    params.iter().map(|p| p.as_ref()).collect()
}

/// Parse a TEXT column into an enum, reporting failures as conversion errors
fn parse_column<T>(idx: usize, value: String) -> rusqlite::Result<T>
where
    T: std::str::FromStr<Err = String>,
{
    value
        .parse()
        .map_err(|e: String| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, e.into()))
}

fn transaction_clauses(user_id: &str, filter: &TransactionFilter) -> (String, SqlParams) {
    let mut conditions = vec!["t.user_id = ?".to_string()];
    let mut params: SqlParams = vec![Box::new(user_id.to_string())];

    if let Some(from) = filter.date_from {
        conditions.push("t.date >= ?".to_string());
        params.push(Box::new(from.to_string()));
    }
    if let Some(to) = filter.date_to {
        conditions.push("t.date <= ?".to_string());
        params.push(Box::new(to.to_string()));
    }
    if let Some(tt) = filter.transaction_type {
        conditions.push("t.transaction_type = ?".to_string());
        params.push(Box::new(tt.as_str()));
    }
    if let Some(status) = filter.status {
        conditions.push("t.status = ?".to_string());
        params.push(Box::new(status.as_str()));
    }
    if let Some(ref category) = filter.category {
        conditions.push("c.name LIKE ? COLLATE NOCASE".to_string());
        params.push(Box::new(format!("%{}%", category)));
    }

    (format!("WHERE {}", conditions.join(" AND ")), params)
}

fn date_bounded_clauses(
    alias: &str,
    date_column: &str,
    user_id: &str,
    date_from: Option<chrono::NaiveDate>,
    date_to: Option<chrono::NaiveDate>,
    type_filter: Option<(&'static str, &'static str)>,
) -> (String, SqlParams) {
    let mut conditions = vec![format!("{}.user_id = ?", alias)];
    let mut params: SqlParams = vec![Box::new(user_id.to_string())];

    if let Some(from) = date_from {
        conditions.push(format!("{}.{} >= ?", alias, date_column));
        params.push(Box::new(from.to_string()));
    }
    if let Some(to) = date_to {
        conditions.push(format!("{}.{} <= ?", alias, date_column));
        params.push(Box::new(to.to_string()));
    }
    if let Some((column, value)) = type_filter {
        conditions.push(format!("{}.{} = ?", alias, column));
        params.push(Box::new(value));
    }

    (format!("WHERE {}", conditions.join(" AND ")), params)
}

fn active_flag_clauses(alias: &str, user_id: &str, is_active: Option<bool>) -> (String, SqlParams) {
    let mut conditions = vec![format!("{}.user_id = ?", alias)];
    let mut params: SqlParams = vec![Box::new(user_id.to_string())];

    if let Some(active) = is_active {
        conditions.push(format!("{}.is_active = ?", alias));
        params.push(Box::new(active as i64));
    }

    (format!("WHERE {}", conditions.join(" AND ")), params)
}

impl Database {
    /// Count transactions matching the filter (no row materialization)
    pub fn count_transactions(&self, user_id: &str, filter: &TransactionFilter) -> Result<i64> {
        let conn = self.conn()?;
        let (where_clause, params) = transaction_clauses(user_id, filter);
        // The categories join is only needed when the filter references it
        let join = if filter.category.is_some() {
            "LEFT JOIN categories c ON t.category_id = c.id"
        } else {
            ""
        };
        let sql = format!("SELECT COUNT(*) FROM transactions t {} {}", join, where_clause);
        let count =
            conn.query_row(&sql, param_refs(&params).as_slice(), |row| row.get(0))?;
        Ok(count)
    }

    /// Fetch transactions matching the filter, newest-first, with joined names
    pub fn query_transactions(
        &self,
        user_id: &str,
        filter: &TransactionFilter,
    ) -> Result<Vec<TransactionRecord>> {
        let conn = self.conn()?;
        let (where_clause, params) = transaction_clauses(user_id, filter);
        let sql = format!(
            r#"
            SELECT t.id, t.date, t.description, t.amount, t.transaction_type, t.status,
                   c.name, sc.name, ba.name, t.payment_method
            FROM transactions t
            LEFT JOIN categories c ON t.category_id = c.id
            LEFT JOIN sub_categories sc ON t.sub_category_id = sc.id
            LEFT JOIN bank_accounts ba ON t.bank_account_id = ba.id
            {}
            ORDER BY t.date DESC, t.id DESC
            "#,
            where_clause
        );

        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map(param_refs(&params).as_slice(), |row| {
            Ok(TransactionRecord {
                id: row.get(0)?,
                date: parse_date(&row.get::<_, String>(1)?),
                description: row.get(2)?,
                amount: row.get(3)?,
                transaction_type: parse_column(4, row.get::<_, String>(4)?)?,
                status: parse_column(5, row.get::<_, String>(5)?)?,
                category: row.get(6)?,
                sub_category: row.get(7)?,
                bank_account: row.get(8)?,
                payment_method: row
                    .get::<_, Option<String>>(9)?
                    .map(|s| parse_column(9, s))
                    .transpose()?,
            })
        })?;

        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    /// Count investments matching the filter
    pub fn count_investments(&self, user_id: &str, filter: &InvestmentFilter) -> Result<i64> {
        let conn = self.conn()?;
        let (where_clause, params) = date_bounded_clauses(
            "i",
            "purchase_date",
            user_id,
            filter.date_from,
            filter.date_to,
            filter.investment_type.map(|t| ("type", t.as_str())),
        );
        let sql = format!("SELECT COUNT(*) FROM investments i {}", where_clause);
        let count =
            conn.query_row(&sql, param_refs(&params).as_slice(), |row| row.get(0))?;
        Ok(count)
    }

    /// Fetch investments matching the filter, newest purchase first
    pub fn query_investments(
        &self,
        user_id: &str,
        filter: &InvestmentFilter,
    ) -> Result<Vec<InvestmentRecord>> {
        let conn = self.conn()?;
        let (where_clause, params) = date_bounded_clauses(
            "i",
            "purchase_date",
            user_id,
            filter.date_from,
            filter.date_to,
            filter.investment_type.map(|t| ("type", t.as_str())),
        );
        let sql = format!(
            r#"
            SELECT i.id, i.name, i.type, i.current_value, i.invested_amount, i.purchase_date
            FROM investments i
            {}
            ORDER BY i.purchase_date DESC, i.id DESC
            "#,
            where_clause
        );

        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map(param_refs(&params).as_slice(), |row| {
            Ok(InvestmentRecord {
                id: row.get(0)?,
                name: row.get(1)?,
                investment_type: parse_column(2, row.get::<_, String>(2)?)?,
                current_value: row.get(3)?,
                invested_amount: row.get(4)?,
                purchase_date: parse_date(&row.get::<_, String>(5)?),
            })
        })?;

        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    /// Count goals matching the filter
    pub fn count_goals(&self, user_id: &str, filter: &GoalFilter) -> Result<i64> {
        let conn = self.conn()?;
        let (where_clause, params) = active_flag_clauses("g", user_id, filter.is_active);
        let sql = format!("SELECT COUNT(*) FROM goals g {}", where_clause);
        let count =
            conn.query_row(&sql, param_refs(&params).as_slice(), |row| row.get(0))?;
        Ok(count)
    }

    /// Fetch goals matching the filter, newest-first
    pub fn query_goals(&self, user_id: &str, filter: &GoalFilter) -> Result<Vec<GoalRecord>> {
        let conn = self.conn()?;
        let (where_clause, params) = active_flag_clauses("g", user_id, filter.is_active);
        let sql = format!(
            r#"
            SELECT g.id, g.name, g.target_amount, g.current_amount, g.is_active, g.created_at
            FROM goals g
            {}
            ORDER BY g.created_at DESC, g.id DESC
            "#,
            where_clause
        );

        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map(param_refs(&params).as_slice(), |row| {
            Ok(GoalRecord {
                id: row.get(0)?,
                name: row.get(1)?,
                target_amount: row.get(2)?,
                current_amount: row.get(3)?,
                is_active: row.get(4)?,
                created_at: parse_datetime(&row.get::<_, String>(5)?),
            })
        })?;

        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    /// Count assets matching the filter
    pub fn count_assets(&self, user_id: &str, filter: &AssetFilter) -> Result<i64> {
        let conn = self.conn()?;
        let (where_clause, params) = date_bounded_clauses(
            "a",
            "purchase_date",
            user_id,
            filter.date_from,
            filter.date_to,
            filter.asset_type.map(|t| ("type", t.as_str())),
        );
        let sql = format!("SELECT COUNT(*) FROM assets a {}", where_clause);
        let count =
            conn.query_row(&sql, param_refs(&params).as_slice(), |row| row.get(0))?;
        Ok(count)
    }

    /// Fetch assets matching the filter, newest purchase first
    pub fn query_assets(&self, user_id: &str, filter: &AssetFilter) -> Result<Vec<AssetRecord>> {
        let conn = self.conn()?;
        let (where_clause, params) = date_bounded_clauses(
            "a",
            "purchase_date",
            user_id,
            filter.date_from,
            filter.date_to,
            filter.asset_type.map(|t| ("type", t.as_str())),
        );
        let sql = format!(
            r#"
            SELECT a.id, a.name, a.type, a.current_value, a.purchase_date
            FROM assets a
            {}
            ORDER BY a.purchase_date DESC, a.id DESC
            "#,
            where_clause
        );

        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map(param_refs(&params).as_slice(), |row| {
            Ok(AssetRecord {
                id: row.get(0)?,
                name: row.get(1)?,
                asset_type: parse_column(2, row.get::<_, String>(2)?)?,
                current_value: row.get(3)?,
                purchase_date: parse_date(&row.get::<_, String>(4)?),
            })
        })?;

        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    /// Count bank accounts matching the filter
    pub fn count_bank_accounts(&self, user_id: &str, filter: &BankAccountFilter) -> Result<i64> {
        let conn = self.conn()?;
        let (where_clause, params) = active_flag_clauses("ba", user_id, filter.is_active);
        let sql = format!("SELECT COUNT(*) FROM bank_accounts ba {}", where_clause);
        let count =
            conn.query_row(&sql, param_refs(&params).as_slice(), |row| row.get(0))?;
        Ok(count)
    }

    /// Fetch bank accounts matching the filter, newest-first
    pub fn query_bank_accounts(
        &self,
        user_id: &str,
        filter: &BankAccountFilter,
    ) -> Result<Vec<BankAccountRecord>> {
        let conn = self.conn()?;
        let (where_clause, params) = active_flag_clauses("ba", user_id, filter.is_active);
        let sql = format!(
            r#"
            SELECT ba.id, ba.name, ba.starting_balance, ba.is_active, ba.created_at
            FROM bank_accounts ba
            {}
            ORDER BY ba.created_at DESC, ba.id DESC
            "#,
            where_clause
        );

        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map(param_refs(&params).as_slice(), |row| {
            Ok(BankAccountRecord {
                id: row.get(0)?,
                name: row.get(1)?,
                starting_balance: row.get(2)?,
                is_active: row.get(3)?,
                created_at: parse_datetime(&row.get::<_, String>(4)?),
            })
        })?;

        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    /// Count bank transactions matching the filter
    pub fn count_bank_transactions(
        &self,
        user_id: &str,
        filter: &BankTransactionFilter,
    ) -> Result<i64> {
        let conn = self.conn()?;
        let (where_clause, params) = date_bounded_clauses(
            "bt",
            "transaction_date",
            user_id,
            filter.date_from,
            filter.date_to,
            filter.transaction_type.map(|t| ("transaction_type", t.as_str())),
        );
        let sql = format!("SELECT COUNT(*) FROM bank_transactions bt {}", where_clause);
        let count =
            conn.query_row(&sql, param_refs(&params).as_slice(), |row| row.get(0))?;
        Ok(count)
    }

    /// Fetch bank transactions matching the filter, newest-first, with account names
    pub fn query_bank_transactions(
        &self,
        user_id: &str,
        filter: &BankTransactionFilter,
    ) -> Result<Vec<BankTransactionRecord>> {
        let conn = self.conn()?;
        let (where_clause, params) = date_bounded_clauses(
            "bt",
            "transaction_date",
            user_id,
            filter.date_from,
            filter.date_to,
            filter.transaction_type.map(|t| ("transaction_type", t.as_str())),
        );
        let sql = format!(
            r#"
            SELECT bt.id, bt.transaction_date, bt.description, bt.amount,
                   bt.transaction_type, bt.current_balance, ba.name
            FROM bank_transactions bt
            LEFT JOIN bank_accounts ba ON bt.bank_account_id = ba.id
            {}
            ORDER BY bt.transaction_date DESC, bt.id DESC
            "#,
            where_clause
        );

        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map(param_refs(&params).as_slice(), |row| {
            Ok(BankTransactionRecord {
                id: row.get(0)?,
                transaction_date: parse_date(&row.get::<_, String>(1)?),
                description: row.get(2)?,
                amount: row.get(3)?,
                transaction_type: parse_column(4, row.get::<_, String>(4)?)?,
                current_balance: row.get(5)?,
                bank_account: row.get(6)?,
            })
        })?;

        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }
}
