//! Query execution and result shaping
//!
//! One call per chat turn: resolve the entity, interpret the filter subset,
//! run the scoped query, then reduce (sum/count/average), bucket (group by),
//! or return the normalized rows.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::Serialize;
use serde_json::json;
use tracing::debug;

use crate::db::Database;
use crate::error::{Error, Result};
use crate::models::TransactionType;

use super::{Aggregation, Entity, EntityFilter, GroupBy, QueryDescriptor, QueryResult};

/// Executes query descriptors against the database, scoped to one user
#[derive(Clone)]
pub struct QueryExecutor {
    db: Database,
}

impl QueryExecutor {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Execute a descriptor for a user
    ///
    /// An entity outside the six-way set fails with `Error::UnknownEntity`;
    /// every other failure is wrapped with the entity name and propagated.
    pub fn execute(&self, user_id: &str, descriptor: &QueryDescriptor) -> Result<QueryResult> {
        let entity: Entity = descriptor
            .entity
            .parse()
            .map_err(|_| Error::UnknownEntity(descriptor.entity.clone()))?;

        let filter = EntityFilter::resolve(entity, &descriptor.filters);

        debug!(
            user_id,
            entity = %entity,
            aggregation = ?descriptor.aggregation,
            group_by = ?descriptor.group_by,
            "Executing query"
        );

        self.run(user_id, &filter, descriptor.aggregation, descriptor.group_by)
            .map_err(|e| Error::query(entity.as_str(), e))
    }

    fn run(
        &self,
        user_id: &str,
        filter: &EntityFilter,
        aggregation: Option<Aggregation>,
        group_by: Option<GroupBy>,
    ) -> Result<QueryResult> {
        match filter {
            EntityFilter::Transaction(f) => {
                if let Some(agg) = aggregation {
                    return Ok(match agg {
                        Aggregation::Count => {
                            QueryResult::Count(self.db.count_transactions(user_id, f)?)
                        }
                        Aggregation::Sum => {
                            let rows = self.db.query_transactions(user_id, f)?;
                            QueryResult::Scalar(
                                rows.iter()
                                    .map(|r| r.transaction_type.signed(r.amount))
                                    .sum(),
                            )
                        }
                        Aggregation::Average => {
                            let rows = self.db.query_transactions(user_id, f)?;
                            QueryResult::Scalar(mean(rows.iter().map(|r| r.amount)))
                        }
                    });
                }

                let rows = self.db.query_transactions(user_id, f)?;
                match group_by {
                    Some(GroupBy::Date) => Ok(group_by_date(
                        rows.iter().map(|r| (r.date, r.amount, r.transaction_type)),
                    )),
                    Some(GroupBy::Category) => Ok(group_by_category(rows.iter().map(|r| {
                        (r.category.as_deref(), r.amount, r.transaction_type)
                    }))),
                    Some(GroupBy::Type) => Ok(group_by_type(
                        rows.iter().map(|r| (r.transaction_type, r.amount)),
                    )),
                    None => rows_to_values(&rows),
                }
            }
            EntityFilter::BankTransaction(f) => {
                if let Some(agg) = aggregation {
                    return Ok(match agg {
                        Aggregation::Count => {
                            QueryResult::Count(self.db.count_bank_transactions(user_id, f)?)
                        }
                        Aggregation::Sum => {
                            let rows = self.db.query_bank_transactions(user_id, f)?;
                            QueryResult::Scalar(
                                rows.iter()
                                    .map(|r| r.transaction_type.signed(r.amount))
                                    .sum(),
                            )
                        }
                        Aggregation::Average => {
                            let rows = self.db.query_bank_transactions(user_id, f)?;
                            QueryResult::Scalar(mean(rows.iter().map(|r| r.amount)))
                        }
                    });
                }

                let rows = self.db.query_bank_transactions(user_id, f)?;
                match group_by {
                    Some(GroupBy::Date) => Ok(group_by_date(rows.iter().map(|r| {
                        (r.transaction_date, r.amount, r.transaction_type)
                    }))),
                    Some(GroupBy::Type) => Ok(group_by_type(
                        rows.iter().map(|r| (r.transaction_type, r.amount)),
                    )),
                    // Bank transactions have no category link
                    Some(GroupBy::Category) | None => rows_to_values(&rows),
                }
            }
            EntityFilter::Investment(f) => {
                if let Some(agg) = aggregation {
                    return Ok(match agg {
                        Aggregation::Count => {
                            QueryResult::Count(self.db.count_investments(user_id, f)?)
                        }
                        Aggregation::Sum => {
                            let rows = self.db.query_investments(user_id, f)?;
                            QueryResult::Scalar(rows.iter().map(|r| r.current_value).sum())
                        }
                        Aggregation::Average => {
                            let rows = self.db.query_investments(user_id, f)?;
                            QueryResult::Scalar(mean(rows.iter().map(|r| r.current_value)))
                        }
                    });
                }
                rows_to_values(&self.db.query_investments(user_id, f)?)
            }
            EntityFilter::Goal(f) => {
                if let Some(agg) = aggregation {
                    return Ok(match agg {
                        Aggregation::Count => QueryResult::Count(self.db.count_goals(user_id, f)?),
                        Aggregation::Sum => {
                            let rows = self.db.query_goals(user_id, f)?;
                            QueryResult::Scalar(rows.iter().map(|r| r.current_amount).sum())
                        }
                        Aggregation::Average => {
                            let rows = self.db.query_goals(user_id, f)?;
                            QueryResult::Scalar(mean(rows.iter().map(|r| r.current_amount)))
                        }
                    });
                }
                rows_to_values(&self.db.query_goals(user_id, f)?)
            }
            EntityFilter::Asset(f) => {
                if let Some(agg) = aggregation {
                    return Ok(match agg {
                        Aggregation::Count => QueryResult::Count(self.db.count_assets(user_id, f)?),
                        Aggregation::Sum => {
                            let rows = self.db.query_assets(user_id, f)?;
                            QueryResult::Scalar(rows.iter().map(|r| r.current_value).sum())
                        }
                        Aggregation::Average => {
                            let rows = self.db.query_assets(user_id, f)?;
                            QueryResult::Scalar(mean(rows.iter().map(|r| r.current_value)))
                        }
                    });
                }
                rows_to_values(&self.db.query_assets(user_id, f)?)
            }
            EntityFilter::BankAccount(f) => {
                if let Some(agg) = aggregation {
                    return Ok(match agg {
                        Aggregation::Count => {
                            QueryResult::Count(self.db.count_bank_accounts(user_id, f)?)
                        }
                        Aggregation::Sum => {
                            let rows = self.db.query_bank_accounts(user_id, f)?;
                            QueryResult::Scalar(rows.iter().map(|r| r.starting_balance).sum())
                        }
                        Aggregation::Average => {
                            let rows = self.db.query_bank_accounts(user_id, f)?;
                            QueryResult::Scalar(mean(rows.iter().map(|r| r.starting_balance)))
                        }
                    });
                }
                rows_to_values(&self.db.query_bank_accounts(user_id, f)?)
            }
        }
    }
}

/// Arithmetic mean, 0 for an empty set
fn mean(values: impl Iterator<Item = f64>) -> f64 {
    let (count, total) = values.fold((0usize, 0.0), |(c, t), v| (c + 1, t + v));
    if count == 0 {
        0.0
    } else {
        total / count as f64
    }
}

fn rows_to_values<T: Serialize>(rows: &[T]) -> Result<QueryResult> {
    let values = rows
        .iter()
        .map(serde_json::to_value)
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(QueryResult::Rows(values))
}

/// Bucket by calendar day, ascending; totals use the signed convention
fn group_by_date(rows: impl Iterator<Item = (NaiveDate, f64, TransactionType)>) -> QueryResult {
    let mut buckets: BTreeMap<String, (i64, f64)> = BTreeMap::new();
    for (date, amount, tt) in rows {
        let bucket = buckets.entry(date.format("%Y-%m-%d").to_string()).or_default();
        bucket.0 += 1;
        bucket.1 += tt.signed(amount);
    }
    QueryResult::Rows(
        buckets
            .into_iter()
            .map(|(date, (count, total))| json!({ "date": date, "count": count, "total": total }))
            .collect(),
    )
}

/// Bucket by linked category name; unlinked rows fall under "Uncategorized"
fn group_by_category<'a>(
    rows: impl Iterator<Item = (Option<&'a str>, f64, TransactionType)>,
) -> QueryResult {
    let mut buckets: BTreeMap<String, (i64, f64)> = BTreeMap::new();
    for (category, amount, tt) in rows {
        let label = category.unwrap_or("Uncategorized").to_string();
        let bucket = buckets.entry(label).or_default();
        bucket.0 += 1;
        bucket.1 += tt.signed(amount);
    }
    QueryResult::Rows(
        buckets
            .into_iter()
            .map(|(category, (count, total))| {
                json!({ "category": category, "count": count, "total": total })
            })
            .collect(),
    )
}

/// Bucket by transaction type
///
/// Totals here are UNSIGNED: both credits and debits contribute positively.
/// This reports transaction volume per direction, not net flow, and differs
/// from the signed convention used by sum and the other groupings.
fn group_by_type(rows: impl Iterator<Item = (TransactionType, f64)>) -> QueryResult {
    let mut buckets: BTreeMap<&'static str, (i64, f64)> = BTreeMap::new();
    for (tt, amount) in rows {
        let bucket = buckets.entry(tt.as_str()).or_default();
        bucket.0 += 1;
        bucket.1 += amount;
    }
    QueryResult::Rows(
        buckets
            .into_iter()
            .map(|(tt, (count, total))| json!({ "type": tt, "count": count, "total": total }))
            .collect(),
    )
}
