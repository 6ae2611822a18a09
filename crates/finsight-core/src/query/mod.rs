//! Query executor for the chat assistant
//!
//! Turns a structured query descriptor (entity + filters + aggregation +
//! grouping) into a user-scoped database query and shapes the output into
//! either a scalar or a list of normalized records.

mod executor;
mod filter;

pub use executor::QueryExecutor;
pub use filter::{
    AssetFilter, BankAccountFilter, BankTransactionFilter, EntityFilter, GoalFilter,
    InvestmentFilter, TransactionFilter,
};

use serde::{Deserialize, Serialize};

/// The six queryable record kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Entity {
    Transaction,
    Investment,
    Goal,
    Asset,
    BankAccount,
    BankTransaction,
}

impl Entity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Transaction => "transaction",
            Self::Investment => "investment",
            Self::Goal => "goal",
            Self::Asset => "asset",
            Self::BankAccount => "bankAccount",
            Self::BankTransaction => "bankTransaction",
        }
    }
}

impl std::str::FromStr for Entity {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "transaction" => Ok(Self::Transaction),
            "investment" => Ok(Self::Investment),
            "goal" => Ok(Self::Goal),
            "asset" => Ok(Self::Asset),
            "bankAccount" => Ok(Self::BankAccount),
            "bankTransaction" => Ok(Self::BankTransaction),
            _ => Err(format!("Unknown entity: {}", s)),
        }
    }
}

impl std::fmt::Display for Entity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Scalar reduction over the matching rows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Aggregation {
    Sum,
    Count,
    Average,
}

/// Bucketing key for ungrouped row queries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GroupBy {
    Date,
    Category,
    Type,
}

/// Raw filter map from the model directive
///
/// An open-ended bag of optional string filters; each entity consumes the
/// subset that applies to it and ignores the rest. Unknown keys are dropped
/// at deserialization.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct QueryFilters {
    /// Inclusive lower bound on the entity's natural date field (YYYY-MM-DD)
    pub date_from: Option<String>,
    /// Inclusive upper bound on the entity's natural date field (YYYY-MM-DD)
    pub date_to: Option<String>,
    /// Exact match on the entity's type enum field
    #[serde(rename = "type")]
    pub kind: Option<String>,
    /// Case-insensitive substring match on the linked category name (transactions only)
    pub category: Option<String>,
    /// Transaction status, or "active"/"inactive" for goal/bank account
    pub status: Option<String>,
}

impl QueryFilters {
    pub fn is_empty(&self) -> bool {
        self.date_from.is_none()
            && self.date_to.is_none()
            && self.kind.is_none()
            && self.category.is_none()
            && self.status.is_none()
    }
}

/// What to query and how to aggregate or group it
///
/// `entity` stays a string here so an out-of-set value surfaces as the
/// executor's unknown-entity error rather than a parse failure upstream.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryDescriptor {
    pub entity: String,
    #[serde(default)]
    pub filters: QueryFilters,
    #[serde(default)]
    pub aggregation: Option<Aggregation>,
    #[serde(default)]
    pub group_by: Option<GroupBy>,
}

/// Executor output: a scalar or a list of normalized records
///
/// All numeric fields inside `Rows` values are plain finite numbers or null.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum QueryResult {
    /// Row count from a count aggregation
    Count(i64),
    /// Sum or average over the matching rows
    Scalar(f64),
    /// Materialized (possibly grouped) records
    Rows(Vec<serde_json::Value>),
}

impl QueryResult {
    /// The row list, if this result is one
    pub fn rows(&self) -> Option<&[serde_json::Value]> {
        match self {
            Self::Rows(rows) => Some(rows),
            _ => None,
        }
    }
}
