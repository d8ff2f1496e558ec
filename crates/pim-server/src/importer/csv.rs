//! CSV header discovery and row coercion
//!
//! Column positions are resolved once from the header row (case-insensitive
//! names), then each data row is coerced into a [`ParsedRow`] or classified
//! as skippable.

use csv::StringRecord;
use rust_decimal::Decimal;

use super::ImportError;
use crate::models::normalize_sku;

/// Build a reader over in-memory CSV bytes.
///
/// `flexible` so short rows read as missing fields instead of hard errors.
pub fn reader(bytes: &[u8]) -> csv::Reader<&[u8]> {
    csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(bytes)
}

/// Resolved column positions for the fields the importer understands.
#[derive(Debug, Clone)]
pub struct Columns {
    sku: usize,
    name: usize,
    description: Option<usize>,
    price: Option<usize>,
    quantity: Option<usize>,
}

impl Columns {
    /// Resolve columns from the header row. `sku` and `name` are required;
    /// the rest are optional.
    pub fn from_headers(headers: &StringRecord) -> Result<Self, ImportError> {
        let position = |wanted: &str| {
            headers
                .iter()
                .position(|h| h.trim().eq_ignore_ascii_case(wanted))
        };

        let sku = position("sku").ok_or(ImportError::MissingColumn("sku"))?;
        let name = position("name").ok_or(ImportError::MissingColumn("name"))?;

        Ok(Self {
            sku,
            name,
            description: position("description"),
            price: position("price"),
            quantity: position("quantity"),
        })
    }
}

/// A data row coerced into catalog field types. SKU is already normalized.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedRow {
    pub sku: String,
    pub name: String,
    pub description: Option<String>,
    pub price: Option<Decimal>,
    pub quantity: i32,
}

/// Classification of one data row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowOutcome {
    Parsed(ParsedRow),
    /// Blank SKU or name: skipped without counting.
    Blank,
    /// Malformed field: skipped, but counted as processed.
    Invalid(String),
}

/// Coerce one record into a row, using the resolved column positions.
pub fn parse_row(record: &StringRecord, columns: &Columns) -> RowOutcome {
    let field = |idx: usize| record.get(idx).unwrap_or("").trim();
    let optional = |idx: Option<usize>| idx.map(field).unwrap_or("");

    let sku = field(columns.sku);
    let name = field(columns.name);
    if sku.is_empty() || name.is_empty() {
        return RowOutcome::Blank;
    }

    let description = {
        let raw = optional(columns.description);
        if raw.is_empty() {
            None
        } else {
            Some(raw.to_string())
        }
    };

    let price = {
        let raw = optional(columns.price);
        if raw.is_empty() {
            None
        } else {
            match raw.parse::<Decimal>() {
                Ok(p) => Some(p),
                Err(_) => return RowOutcome::Invalid(format!("invalid price: {raw:?}")),
            }
        }
    };

    let quantity = {
        let raw = optional(columns.quantity);
        if raw.is_empty() {
            0
        } else {
            match raw.parse::<i32>() {
                Ok(q) => q,
                Err(_) => return RowOutcome::Invalid(format!("invalid quantity: {raw:?}")),
            }
        }
    };

    RowOutcome::Parsed(ParsedRow {
        sku: normalize_sku(sku),
        name: name.to_string(),
        description,
        price,
        quantity,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    fn columns(header: &str) -> Columns {
        let record = StringRecord::from(header.split(',').collect::<Vec<_>>());
        Columns::from_headers(&record).unwrap()
    }

    fn record(fields: &[&str]) -> StringRecord {
        StringRecord::from(fields.to_vec())
    }

    #[test]
    fn test_headers_case_insensitive() {
        let cols = columns("SKU, Name ,PRICE,quantity,Description");
        let row = parse_row(&record(&["a-1", "Widget", "9.99", "3", "blue"]), &cols);
        assert_eq!(
            row,
            RowOutcome::Parsed(ParsedRow {
                sku: "A-1".to_string(),
                name: "Widget".to_string(),
                description: Some("blue".to_string()),
                price: Some("9.99".parse().unwrap()),
                quantity: 3,
            })
        );
    }

    #[test]
    fn test_missing_required_column() {
        let headers = StringRecord::from(vec!["sku", "price"]);
        assert!(matches!(
            Columns::from_headers(&headers),
            Err(ImportError::MissingColumn("name"))
        ));
    }

    #[test]
    fn test_blank_sku_or_name_skips() {
        let cols = columns("sku,name");
        assert_eq!(parse_row(&record(&["  ", "Widget"]), &cols), RowOutcome::Blank);
        assert_eq!(parse_row(&record(&["A-1", ""]), &cols), RowOutcome::Blank);
    }

    #[test]
    fn test_blank_optional_fields_default() {
        let cols = columns("sku,name,price,quantity");
        match parse_row(&record(&["a1", "Widget", "", ""]), &cols) {
            RowOutcome::Parsed(row) => {
                // Absent price stays None; it is not zero.
                assert_eq!(row.price, None);
                assert_eq!(row.quantity, 0);
                assert_eq!(row.description, None);
            }
            other => panic!("unexpected outcome: {other:?}"),
        }
    }

    #[test]
    fn test_malformed_price_is_row_error() {
        let cols = columns("sku,name,price");
        assert!(matches!(
            parse_row(&record(&["a1", "Widget", "cheap"]), &cols),
            RowOutcome::Invalid(_)
        ));
    }

    #[test]
    fn test_malformed_quantity_is_row_error() {
        let cols = columns("sku,name,quantity");
        assert!(matches!(
            parse_row(&record(&["a1", "Widget", "many"]), &cols),
            RowOutcome::Invalid(_)
        ));
    }

    #[test]
    fn test_short_row_reads_as_missing_fields() {
        let cols = columns("sku,name,price,quantity");
        match parse_row(&record(&["a1", "Widget"]), &cols) {
            RowOutcome::Parsed(row) => {
                assert_eq!(row.price, None);
                assert_eq!(row.quantity, 0);
            }
            other => panic!("unexpected outcome: {other:?}"),
        }
    }
}
