use serde::{Deserialize, Serialize};
use std::fmt;

/// Logical collection a record or sync action targets.
///
/// The set is closed: the engine only ever syncs these collections, so
/// dispatch is an exhaustive match rather than a free-form string key.
/// The action queue and backup storage are engine-internal and not part
/// of this set.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Table {
    Farms,
    Crops,
    Livestock,
    FinancialRecords,
    Profiles,
}

impl Table {
    pub const ALL: [Table; 5] = [
        Table::Farms,
        Table::Crops,
        Table::Livestock,
        Table::FinancialRecords,
        Table::Profiles,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Table::Farms => "farms",
            Table::Crops => "crops",
            Table::Livestock => "livestock",
            Table::FinancialRecords => "financial_records",
            Table::Profiles => "profiles",
        }
    }

    pub fn parse(value: &str) -> Result<Self, String> {
        match value {
            "farms" => Ok(Table::Farms),
            "crops" => Ok(Table::Crops),
            "livestock" => Ok(Table::Livestock),
            "financial_records" => Ok(Table::FinancialRecords),
            "profiles" => Ok(Table::Profiles),
            other => Err(format!("Unknown table: {other}")),
        }
    }
}

impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
