//! Fixed layout of the sales table
//!
//! Both the DDL and the insert column list are generated from
//! [`SALE_COLUMNS`], so they always agree on order.

use crate::ingestion::types::{ColumnSpec, SqlType};

pub const SALE_TABLE: &str = "audi";

/// Calendar date column, coerced to `DATE`
pub const DATE_COLUMN: &str = "DateKey";

const fn col(name: &'static str, sql_type: SqlType) -> ColumnSpec {
    ColumnSpec {
        name,
        sql_type,
        primary_key: false,
    }
}

pub const SALE_COLUMNS: &[ColumnSpec] = &[
    ColumnSpec {
        name: "SaleId",
        sql_type: SqlType::Integer,
        primary_key: true,
    },
    col("HouseholdId", SqlType::Integer),
    col("VIN", SqlType::Char(17)),
    col("DealerCode", SqlType::Varchar(7)),
    col("FirstName", SqlType::Varchar(35)),
    col("LastName", SqlType::Varchar(35)),
    col("Address1", SqlType::Varchar(50)),
    col("City", SqlType::Varchar(35)),
    col("State", SqlType::Char(3)),
    col("ZipCode", SqlType::Char(6)),
    col("PhoneNumber", SqlType::Varchar(12)),
    col("EmailAddress", SqlType::Varchar(49)),
    col("VehicleYear", SqlType::Integer),
    col("VehicleModel", SqlType::Varchar(20)),
    col("VehicleTrim", SqlType::Varchar(15)),
    col("VehicleModelCode", SqlType::Varchar(6)),
    col("BestMatch", SqlType::Integer),
    col("BestMatchTypeId", SqlType::Integer),
    col("SalesType", SqlType::Varchar(2)),
    col("SpecialProgramCode", SqlType::Varchar(9)),
    col("ReportedMonthNumber", SqlType::Integer),
    col("SaleOptionList", SqlType::Varchar(87)),
    col("SaleExteriorColor", SqlType::Varchar(49)),
    col("SaleInteriorColor", SqlType::Varchar(54)),
    col("TransmissionTypeCode", SqlType::Char(3)),
    col("BodyType", SqlType::Varchar(21)),
    col("OwnerCompanyName", SqlType::Varchar(87)),
    col("DriverFirstName", SqlType::Varchar(35)),
    col("DriverLastName", SqlType::Varchar(35)),
    col("DriverCompanyName", SqlType::Varchar(87)),
    col("DriverAddress", SqlType::Varchar(50)),
    col("DriverCity", SqlType::Varchar(35)),
    col("DriverState", SqlType::Char(3)),
    col("DriverZipCode", SqlType::Char(7)),
    col("DriverHomePhone", SqlType::Varchar(12)),
    col("DriverBusinessPhone", SqlType::Varchar(12)),
    col("OnlineLeadId", SqlType::Varchar(10)),
    col("BusinessPhone", SqlType::Varchar(12)),
    col("TotalNetSales", SqlType::Integer),
    col(DATE_COLUMN, SqlType::Date),
];

pub fn is_sale_column(name: &str) -> bool {
    SALE_COLUMNS.iter().any(|c| c.name == name)
}

pub fn integer_columns() -> impl Iterator<Item = &'static str> {
    SALE_COLUMNS
        .iter()
        .filter(|c| c.sql_type == SqlType::Integer)
        .map(|c| c.name)
}

/// CREATE TABLE IF NOT EXISTS for the sales table
pub fn create_table_sql() -> String {
    let columns: Vec<String> = SALE_COLUMNS
        .iter()
        .map(|c| {
            if c.primary_key {
                format!("    {} {} PRIMARY KEY", c.name, c.sql_type)
            } else {
                format!("    {} {}", c.name, c.sql_type)
            }
        })
        .collect();

    format!(
        "CREATE TABLE IF NOT EXISTS {} (\n{}\n)",
        SALE_TABLE,
        columns.join(",\n")
    )
}

/// INSERT prefix; the VALUES list is appended per batch
pub fn insert_prefix() -> String {
    let names: Vec<&str> = SALE_COLUMNS.iter().map(|c| c.name).collect();
    format!("INSERT INTO {} ({}) ", SALE_TABLE, names.join(", "))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout() {
        assert_eq!(SALE_COLUMNS.len(), 40);
        assert_eq!(SALE_COLUMNS.iter().filter(|c| c.primary_key).count(), 1);
        assert_eq!(
            integer_columns().collect::<Vec<_>>(),
            vec![
                "SaleId",
                "HouseholdId",
                "VehicleYear",
                "BestMatch",
                "BestMatchTypeId",
                "ReportedMonthNumber",
                "TotalNetSales"
            ]
        );
    }

    #[test]
    fn test_create_table_sql() {
        let sql = create_table_sql();

        assert!(sql.starts_with("CREATE TABLE IF NOT EXISTS audi ("));
        assert!(sql.contains("    SaleId INTEGER PRIMARY KEY,\n"));
        assert!(sql.contains("    VIN CHAR(17),\n"));
        assert!(sql.contains("    SaleOptionList VARCHAR(87),\n"));
        assert!(sql.ends_with("    DateKey DATE\n)"));
    }

    #[test]
    fn test_insert_prefix_order() {
        let prefix = insert_prefix();

        assert!(prefix.starts_with("INSERT INTO audi (SaleId, HouseholdId, VIN, "));
        assert!(prefix.ends_with("TotalNetSales, DateKey) "));
    }

    #[test]
    fn test_dropped_columns_are_not_sale_columns() {
        for name in crate::ingestion::rules::DROP_COLUMNS {
            assert!(!is_sale_column(name), "{} should not be loaded", name);
        }
    }
}
