//! Per-entity filter interpretation
//!
//! The model directive carries one loosely-typed filter map; each entity
//! consumes the subset of keys that is meaningful for it. `EntityFilter`
//! makes that subset explicit per entity: a filter field that does not exist
//! on a variant cannot be applied to that entity. Interpretation stays
//! permissive at runtime - values that do not parse are dropped, not
//! rejected.

use chrono::NaiveDate;
use tracing::debug;

use crate::models::{AssetType, InvestmentType, TransactionStatus, TransactionType};

use super::{Entity, QueryFilters};

/// Filters applicable to transactions
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TransactionFilter {
    pub date_from: Option<NaiveDate>,
    pub date_to: Option<NaiveDate>,
    pub transaction_type: Option<TransactionType>,
    pub status: Option<TransactionStatus>,
    /// Case-insensitive substring match on the linked category name
    pub category: Option<String>,
}

/// Filters applicable to investments
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InvestmentFilter {
    pub date_from: Option<NaiveDate>,
    pub date_to: Option<NaiveDate>,
    pub investment_type: Option<InvestmentType>,
}

/// Filters applicable to goals
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GoalFilter {
    pub is_active: Option<bool>,
}

/// Filters applicable to physical assets
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AssetFilter {
    pub date_from: Option<NaiveDate>,
    pub date_to: Option<NaiveDate>,
    pub asset_type: Option<AssetType>,
}

/// Filters applicable to bank accounts
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BankAccountFilter {
    pub is_active: Option<bool>,
}

/// Filters applicable to bank statement transactions
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BankTransactionFilter {
    pub date_from: Option<NaiveDate>,
    pub date_to: Option<NaiveDate>,
    pub transaction_type: Option<TransactionType>,
}

/// The filter subset an entity actually consumes, tagged by entity
#[derive(Debug, Clone, PartialEq)]
pub enum EntityFilter {
    Transaction(TransactionFilter),
    Investment(InvestmentFilter),
    Goal(GoalFilter),
    Asset(AssetFilter),
    BankAccount(BankAccountFilter),
    BankTransaction(BankTransactionFilter),
}

impl EntityFilter {
    /// Interpret the raw filter map for an entity
    ///
    /// Keys inapplicable to the entity are ignored; applicable values that
    /// fail to parse (bad date, unknown enum value) are dropped with a debug
    /// log rather than failing the query.
    pub fn resolve(entity: Entity, filters: &QueryFilters) -> Self {
        match entity {
            Entity::Transaction => Self::Transaction(TransactionFilter {
                date_from: parse_date(filters.date_from.as_deref()),
                date_to: parse_date(filters.date_to.as_deref()),
                transaction_type: parse_enum(filters.kind.as_deref(), "transaction type"),
                status: parse_enum(filters.status.as_deref(), "transaction status"),
                category: filters
                    .category
                    .as_deref()
                    .map(str::trim)
                    .filter(|c| !c.is_empty())
                    .map(str::to_string),
            }),
            Entity::Investment => Self::Investment(InvestmentFilter {
                date_from: parse_date(filters.date_from.as_deref()),
                date_to: parse_date(filters.date_to.as_deref()),
                investment_type: parse_enum(filters.kind.as_deref(), "investment type"),
            }),
            Entity::Goal => Self::Goal(GoalFilter {
                is_active: parse_active_flag(filters.status.as_deref()),
            }),
            Entity::Asset => Self::Asset(AssetFilter {
                date_from: parse_date(filters.date_from.as_deref()),
                date_to: parse_date(filters.date_to.as_deref()),
                asset_type: parse_enum(filters.kind.as_deref(), "asset type"),
            }),
            Entity::BankAccount => Self::BankAccount(BankAccountFilter {
                is_active: parse_active_flag(filters.status.as_deref()),
            }),
            Entity::BankTransaction => Self::BankTransaction(BankTransactionFilter {
                date_from: parse_date(filters.date_from.as_deref()),
                date_to: parse_date(filters.date_to.as_deref()),
                transaction_type: parse_enum(filters.kind.as_deref(), "transaction type"),
            }),
        }
    }
}

fn parse_date(value: Option<&str>) -> Option<NaiveDate> {
    let value = value?;
    match NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        Ok(date) => Some(date),
        Err(_) => {
            debug!(value, "Ignoring unparseable date filter");
            None
        }
    }
}

fn parse_enum<T: std::str::FromStr>(value: Option<&str>, what: &str) -> Option<T> {
    let value = value?;
    match value.parse::<T>() {
        Ok(parsed) => Some(parsed),
        Err(_) => {
            debug!(value, what, "Ignoring unrecognized filter value");
            None
        }
    }
}

/// Map "active"/"inactive" to the is_active flag; any other value is ignored
fn parse_active_flag(status: Option<&str>) -> Option<bool> {
    match status?.to_lowercase().as_str() {
        "active" => Some(true),
        "inactive" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filters(kind: Option<&str>, status: Option<&str>) -> QueryFilters {
        QueryFilters {
            date_from: Some("2024-01-01".to_string()),
            date_to: Some("not-a-date".to_string()),
            kind: kind.map(str::to_string),
            category: Some("  Food  ".to_string()),
            status: status.map(str::to_string),
        }
    }

    #[test]
    fn test_transaction_filter_resolution() {
        let resolved =
            EntityFilter::resolve(Entity::Transaction, &filters(Some("CREDIT"), Some("PENDING")));
        let EntityFilter::Transaction(f) = resolved else {
            panic!("expected transaction filter");
        };
        assert_eq!(f.date_from, NaiveDate::from_ymd_opt(2024, 1, 1));
        // Unparseable dateTo is dropped, not an error
        assert_eq!(f.date_to, None);
        assert_eq!(f.transaction_type, Some(TransactionType::Credit));
        assert_eq!(f.status, Some(TransactionStatus::Pending));
        assert_eq!(f.category.as_deref(), Some("Food"));
    }

    #[test]
    fn test_goal_filter_only_consumes_status() {
        let resolved = EntityFilter::resolve(Entity::Goal, &filters(Some("STOCKS"), Some("active")));
        assert_eq!(
            resolved,
            EntityFilter::Goal(GoalFilter {
                is_active: Some(true)
            })
        );
    }

    #[test]
    fn test_unknown_status_value_ignored_for_bank_account() {
        let resolved =
            EntityFilter::resolve(Entity::BankAccount, &filters(None, Some("dormant")));
        assert_eq!(
            resolved,
            EntityFilter::BankAccount(BankAccountFilter { is_active: None })
        );
    }

    #[test]
    fn test_unknown_type_value_dropped() {
        let resolved = EntityFilter::resolve(Entity::Investment, &filters(Some("BEANIE_BABIES"), None));
        let EntityFilter::Investment(f) = resolved else {
            panic!("expected investment filter");
        };
        assert_eq!(f.investment_type, None);
    }
}
