//! Domain models for Finsight
//!
//! Record types are the row shapes returned by the query layer, with joined
//! display names (category, sub-category, account) already resolved. All
//! monetary fields are plain `f64` at this boundary.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Direction of money movement for transactions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TransactionType {
    Credit,
    Debit,
}

impl TransactionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Credit => "CREDIT",
            Self::Debit => "DEBIT",
        }
    }

    /// Sign an amount by direction: credits count positive, debits negative.
    pub fn signed(&self, amount: f64) -> f64 {
        match self {
            Self::Credit => amount,
            Self::Debit => -amount,
        }
    }
}

impl std::str::FromStr for TransactionType {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "CREDIT" => Ok(Self::Credit),
            "DEBIT" => Ok(Self::Debit),
            _ => Err(format!("Unknown transaction type: {}", s)),
        }
    }
}

impl std::fmt::Display for TransactionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Settlement status of a transaction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TransactionStatus {
    Pending,
    Completed,
    Cancelled,
}

impl TransactionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::Completed => "COMPLETED",
            Self::Cancelled => "CANCELLED",
        }
    }
}

impl std::str::FromStr for TransactionStatus {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "PENDING" => Ok(Self::Pending),
            "COMPLETED" => Ok(Self::Completed),
            "CANCELLED" => Ok(Self::Cancelled),
            _ => Err(format!("Unknown transaction status: {}", s)),
        }
    }
}

impl std::fmt::Display for TransactionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// How a transaction was paid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentMethod {
    Cash,
    CreditCard,
    DebitCard,
    Upi,
    NetBanking,
    Other,
}

impl PaymentMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Cash => "CASH",
            Self::CreditCard => "CREDIT_CARD",
            Self::DebitCard => "DEBIT_CARD",
            Self::Upi => "UPI",
            Self::NetBanking => "NET_BANKING",
            Self::Other => "OTHER",
        }
    }
}

impl std::str::FromStr for PaymentMethod {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "CASH" => Ok(Self::Cash),
            "CREDIT_CARD" => Ok(Self::CreditCard),
            "DEBIT_CARD" => Ok(Self::DebitCard),
            "UPI" => Ok(Self::Upi),
            "NET_BANKING" => Ok(Self::NetBanking),
            "OTHER" => Ok(Self::Other),
            _ => Err(format!("Unknown payment method: {}", s)),
        }
    }
}

impl std::fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Investment categories
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum InvestmentType {
    Stocks,
    MutualFunds,
    Crypto,
    Bonds,
    FixedDeposit,
    RealEstate,
}

impl InvestmentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Stocks => "STOCKS",
            Self::MutualFunds => "MUTUAL_FUNDS",
            Self::Crypto => "CRYPTO",
            Self::Bonds => "BONDS",
            Self::FixedDeposit => "FIXED_DEPOSIT",
            Self::RealEstate => "REAL_ESTATE",
        }
    }
}

impl std::str::FromStr for InvestmentType {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "STOCKS" => Ok(Self::Stocks),
            "MUTUAL_FUNDS" => Ok(Self::MutualFunds),
            "CRYPTO" => Ok(Self::Crypto),
            "BONDS" => Ok(Self::Bonds),
            "FIXED_DEPOSIT" => Ok(Self::FixedDeposit),
            "REAL_ESTATE" => Ok(Self::RealEstate),
            _ => Err(format!("Unknown investment type: {}", s)),
        }
    }
}

impl std::fmt::Display for InvestmentType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Physical asset categories
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum AssetType {
    Property,
    Vehicle,
    Gold,
    Electronics,
    Other,
}

impl AssetType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Property => "PROPERTY",
            Self::Vehicle => "VEHICLE",
            Self::Gold => "GOLD",
            Self::Electronics => "ELECTRONICS",
            Self::Other => "OTHER",
        }
    }
}

impl std::str::FromStr for AssetType {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "PROPERTY" => Ok(Self::Property),
            "VEHICLE" => Ok(Self::Vehicle),
            "GOLD" => Ok(Self::Gold),
            "ELECTRONICS" => Ok(Self::Electronics),
            "OTHER" => Ok(Self::Other),
            _ => Err(format!("Unknown asset type: {}", s)),
        }
    }
}

impl std::fmt::Display for AssetType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A transaction row with joined display names
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionRecord {
    pub id: i64,
    pub date: NaiveDate,
    pub description: Option<String>,
    pub amount: f64,
    pub transaction_type: TransactionType,
    pub status: TransactionStatus,
    /// Linked category name, if any
    pub category: Option<String>,
    /// Linked sub-category name, if any
    pub sub_category: Option<String>,
    /// Linked bank account name, if any
    pub bank_account: Option<String>,
    pub payment_method: Option<PaymentMethod>,
}

/// An investment row
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvestmentRecord {
    pub id: i64,
    pub name: String,
    #[serde(rename = "type")]
    pub investment_type: InvestmentType,
    pub current_value: f64,
    pub invested_amount: f64,
    pub purchase_date: NaiveDate,
}

/// A savings goal row
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GoalRecord {
    pub id: i64,
    pub name: String,
    pub target_amount: f64,
    pub current_amount: f64,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

/// A physical asset row
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetRecord {
    pub id: i64,
    pub name: String,
    #[serde(rename = "type")]
    pub asset_type: AssetType,
    pub current_value: f64,
    pub purchase_date: NaiveDate,
}

/// A bank account row
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BankAccountRecord {
    pub id: i64,
    pub name: String,
    pub starting_balance: f64,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

/// A bank statement transaction row
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BankTransactionRecord {
    pub id: i64,
    pub transaction_date: NaiveDate,
    pub description: Option<String>,
    pub amount: f64,
    pub transaction_type: TransactionType,
    /// Running account balance after this transaction
    pub current_balance: Option<f64>,
    /// Linked bank account name, if any
    pub bank_account: Option<String>,
}

/// Role of a stored chat message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Assistant,
}

impl ChatRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Assistant => "assistant",
        }
    }
}

impl std::str::FromStr for ChatRole {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "user" => Ok(Self::User),
            "assistant" => Ok(Self::Assistant),
            _ => Err(format!("Unknown chat role: {}", s)),
        }
    }
}

/// A persisted chat message (user text or rendered assistant payload)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredChatMessage {
    pub id: i64,
    pub role: ChatRole,
    /// TEXT / TABLE / CHART for assistant messages, absent for user messages
    pub response_type: Option<String>,
    /// Plain text for user messages, serialized payload for assistant messages
    pub content: String,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transaction_type_signed() {
        assert_eq!(TransactionType::Credit.signed(100.0), 100.0);
        assert_eq!(TransactionType::Debit.signed(40.0), -40.0);
    }

    #[test]
    fn test_enum_round_trips() {
        assert_eq!(
            "MUTUAL_FUNDS".parse::<InvestmentType>().unwrap(),
            InvestmentType::MutualFunds
        );
        assert_eq!(InvestmentType::MutualFunds.as_str(), "MUTUAL_FUNDS");
        assert_eq!("gold".parse::<AssetType>().unwrap(), AssetType::Gold);
        assert!("PLUTONIUM".parse::<AssetType>().is_err());
    }

    #[test]
    fn test_record_serializes_camel_case() {
        let record = InvestmentRecord {
            id: 1,
            name: "Index fund".to_string(),
            investment_type: InvestmentType::MutualFunds,
            current_value: 1500.0,
            invested_amount: 1000.0,
            purchase_date: NaiveDate::from_ymd_opt(2024, 1, 15).unwrap(),
        };
        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value["type"], "MUTUAL_FUNDS");
        assert_eq!(value["currentValue"], 1500.0);
        assert_eq!(value["purchaseDate"], "2024-01-15");
    }
}
