//! Column data types shared by every catalog backend.
//!
//! [`DataType`] is the closed type vocabulary of the model. Backends map their
//! native types onto it when they load a table; anything the model cannot
//! interpret travels through [`DataType::Other`] untouched.
use std::{collections::HashSet, fmt};

use serde::{Deserialize, Serialize};

use crate::table::{TableResult, error::InvalidSchemaSnafu};

/// Largest decimal precision any supported backend accepts.
pub const MAX_DECIMAL_PRECISION: u8 = 38;

/// Units for time and timestamp types.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum TimeUnit {
    /// Second precision.
    Seconds,
    /// Millisecond precision.
    Millis,
    /// Microsecond precision.
    Micros,
    /// Nanosecond precision.
    Nanos,
}

impl fmt::Display for TimeUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TimeUnit::Seconds => write!(f, "s"),
            TimeUnit::Millis => write!(f, "ms"),
            TimeUnit::Micros => write!(f, "us"),
            TimeUnit::Nanos => write!(f, "ns"),
        }
    }
}

/// Named child of a [`DataType::Struct`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct StructField {
    /// Field name, unique within the enclosing struct.
    pub name: String,
    /// Field data type.
    pub data_type: DataType,
    /// Whether the field allows null values.
    #[serde(default = "default_nullable")]
    pub nullable: bool,
    /// Optional free-form comment.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

fn default_nullable() -> bool {
    true
}

impl StructField {
    /// Nullable field without a comment.
    pub fn new(name: impl Into<String>, data_type: DataType) -> Self {
        Self {
            name: name.into(),
            data_type,
            nullable: true,
            comment: None,
        }
    }

    /// Same field, with the given nullability.
    pub fn with_nullable(mut self, nullable: bool) -> Self {
        self.nullable = nullable;
        self
    }
}

impl fmt::Display for StructField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.nullable {
            write!(f, "{}: {}", self.name, self.data_type)
        } else {
            write!(f, "{}: {} not null", self.name, self.data_type)
        }
    }
}

/// Column data types understood by the model.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum DataType {
    /// Boolean value.
    Bool,
    /// 8-bit signed integer.
    Int8,
    /// 16-bit signed integer.
    Int16,
    /// 32-bit signed integer.
    Int32,
    /// 64-bit signed integer.
    Int64,
    /// 32-bit floating point.
    Float32,
    /// 64-bit floating point.
    Float64,

    /// Fixed-precision decimal value.
    Decimal {
        /// Total number of decimal digits.
        precision: u8,
        /// Digits to the right of the decimal point.
        scale: u8,
    },

    /// Calendar date without a time of day.
    Date,

    /// Time of day without a date.
    Time {
        /// Precision of the time value.
        unit: TimeUnit,
    },

    /// Timestamp with a precision unit and optional timezone.
    Timestamp {
        /// Precision of the timestamp value.
        unit: TimeUnit,
        /// IANA timezone identifier; `None` means a local (zone-less) timestamp.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        timezone: Option<String>,
    },

    /// Unbounded UTF-8 string.
    Utf8,

    /// UTF-8 string with a maximum length in characters.
    Varchar {
        /// Maximum length in characters.
        length: u32,
    },

    /// UTF-8 string padded to an exact length in characters.
    FixedChar {
        /// Exact length in characters.
        length: u32,
    },

    /// Variable-length binary data.
    Binary,

    /// Fixed-length binary data.
    FixedBinary {
        /// Width of every value in bytes.
        byte_width: u32,
    },

    /// Struct with named child fields.
    Struct {
        /// Ordered child fields.
        fields: Vec<StructField>,
    },

    /// List of elements of a single type.
    List {
        /// Element type.
        element: Box<DataType>,
        /// Whether elements may be null.
        element_nullable: bool,
    },

    /// Map from non-null keys to values.
    Map {
        /// Key type. Keys are never null.
        key: Box<DataType>,
        /// Value type.
        value: Box<DataType>,
        /// Whether values may be null.
        value_nullable: bool,
    },

    /// A backend type the model does not interpret, kept verbatim.
    Other(String),
}

impl DataType {
    /// Timestamp without timezone at the given precision.
    pub fn timestamp(unit: TimeUnit) -> Self {
        DataType::Timestamp {
            unit,
            timezone: None,
        }
    }

    /// Timestamp with a timezone at the given precision.
    pub fn timestamp_tz(unit: TimeUnit, timezone: impl Into<String>) -> Self {
        DataType::Timestamp {
            unit,
            timezone: Some(timezone.into()),
        }
    }

    /// List of `element`, with nullable elements.
    pub fn list(element: DataType) -> Self {
        DataType::List {
            element: Box::new(element),
            element_nullable: true,
        }
    }

    /// Map from `key` to `value`, with nullable values.
    pub fn map(key: DataType, value: DataType) -> Self {
        DataType::Map {
            key: Box::new(key),
            value: Box::new(value),
            value_nullable: true,
        }
    }

    /// Returns true for types without nested children.
    pub fn is_primitive(&self) -> bool {
        !matches!(
            self,
            DataType::Struct { .. } | DataType::List { .. } | DataType::Map { .. }
        )
    }

    /// Returns true for date, time and timestamp types.
    pub fn is_temporal(&self) -> bool {
        matches!(
            self,
            DataType::Date | DataType::Time { .. } | DataType::Timestamp { .. }
        )
    }

    /// Check the structural rules of this type, reporting violations against
    /// the dotted column `path`.
    pub(crate) fn validate(&self, path: &str) -> TableResult<()> {
        match self {
            DataType::Decimal { precision, scale } => {
                snafu::ensure!(
                    (1..=MAX_DECIMAL_PRECISION).contains(precision),
                    InvalidSchemaSnafu {
                        reason: format!(
                            "column '{path}': decimal precision {precision} out of range 1..={MAX_DECIMAL_PRECISION}"
                        ),
                    }
                );
                snafu::ensure!(
                    scale <= precision,
                    InvalidSchemaSnafu {
                        reason: format!(
                            "column '{path}': decimal scale {scale} exceeds precision {precision}"
                        ),
                    }
                );
                Ok(())
            }

            DataType::Varchar { length } | DataType::FixedChar { length } => {
                snafu::ensure!(
                    *length > 0,
                    InvalidSchemaSnafu {
                        reason: format!("column '{path}': {self} must have length > 0"),
                    }
                );
                Ok(())
            }

            DataType::FixedBinary { byte_width } => {
                snafu::ensure!(
                    *byte_width > 0,
                    InvalidSchemaSnafu {
                        reason: format!("column '{path}': fixed binary byte_width must be > 0"),
                    }
                );
                Ok(())
            }

            DataType::Struct { fields } => {
                snafu::ensure!(
                    !fields.is_empty(),
                    InvalidSchemaSnafu {
                        reason: format!("column '{path}': struct must have at least one field"),
                    }
                );

                let mut seen = HashSet::with_capacity(fields.len());
                for child in fields {
                    snafu::ensure!(
                        !child.name.trim().is_empty(),
                        InvalidSchemaSnafu {
                            reason: format!("column '{path}': struct field name must be non-empty"),
                        }
                    );
                    snafu::ensure!(
                        seen.insert(child.name.as_str()),
                        InvalidSchemaSnafu {
                            reason: format!(
                                "column '{path}': duplicate struct field '{}'",
                                child.name
                            ),
                        }
                    );
                    child
                        .data_type
                        .validate(&format!("{path}.{}", child.name))?;
                }
                Ok(())
            }

            DataType::List { element, .. } => element.validate(&format!("{path}.element")),

            DataType::Map { key, value, .. } => {
                key.validate(&format!("{path}.key"))?;
                value.validate(&format!("{path}.value"))
            }

            DataType::Other(name) => {
                snafu::ensure!(
                    !name.trim().is_empty(),
                    InvalidSchemaSnafu {
                        reason: format!("column '{path}': unparsed type name must be non-empty"),
                    }
                );
                Ok(())
            }

            _ => Ok(()),
        }
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataType::Bool => write!(f, "boolean"),
            DataType::Int8 => write!(f, "int8"),
            DataType::Int16 => write!(f, "int16"),
            DataType::Int32 => write!(f, "int32"),
            DataType::Int64 => write!(f, "int64"),
            DataType::Float32 => write!(f, "float32"),
            DataType::Float64 => write!(f, "float64"),
            DataType::Decimal { precision, scale } => write!(f, "decimal({precision},{scale})"),
            DataType::Date => write!(f, "date"),
            DataType::Time { unit } => write!(f, "time[{unit}]"),
            DataType::Timestamp { unit, timezone } => match timezone {
                Some(tz) => write!(f, "timestamp[{unit}]({tz})"),
                None => write!(f, "timestamp[{unit}]"),
            },
            DataType::Utf8 => write!(f, "string"),
            DataType::Varchar { length } => write!(f, "varchar({length})"),
            DataType::FixedChar { length } => write!(f, "char({length})"),
            DataType::Binary => write!(f, "binary"),
            DataType::FixedBinary { byte_width } => write!(f, "fixed({byte_width})"),

            DataType::Struct { fields } => {
                write!(f, "struct<")?;
                for (i, field) in fields.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{field}")?;
                }
                write!(f, ">")
            }

            DataType::List { element, .. } => write!(f, "list<{element}>"),
            DataType::Map { key, value, .. } => write!(f, "map<{key}, {value}>"),
            DataType::Other(name) => write!(f, "{name}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::TableError;

    fn reason_of(err: TableError) -> String {
        match err {
            TableError::InvalidSchema { reason } => reason,
            other => panic!("expected InvalidSchema, got {other:?}"),
        }
    }

    #[test]
    fn primitive_types_always_validate() {
        for dt in [
            DataType::Bool,
            DataType::Int32,
            DataType::Float64,
            DataType::Date,
            DataType::timestamp(TimeUnit::Micros),
            DataType::Utf8,
            DataType::Binary,
        ] {
            dt.validate("c").expect("primitive type is valid");
        }
    }

    #[test]
    fn decimal_bounds() {
        DataType::Decimal {
            precision: 38,
            scale: 10,
        }
        .validate("amount")
        .expect("valid decimal");

        let cases = [
            (0, 0, "out of range"),
            (39, 0, "out of range"),
            (4, 5, "exceeds precision"),
        ];
        for (precision, scale, needle) in cases {
            let err = DataType::Decimal { precision, scale }
                .validate("amount")
                .unwrap_err();
            let reason = reason_of(err);
            assert!(reason.contains(needle), "unexpected reason: {reason}");
            assert!(reason.contains("'amount'"));
        }
    }

    #[test]
    fn zero_lengths_are_rejected() {
        for dt in [
            DataType::Varchar { length: 0 },
            DataType::FixedChar { length: 0 },
            DataType::FixedBinary { byte_width: 0 },
        ] {
            assert!(matches!(
                dt.validate("c"),
                Err(TableError::InvalidSchema { .. })
            ));
        }
    }

    #[test]
    fn nested_paths_are_reported() {
        let dt = DataType::Struct {
            fields: vec![
                StructField::new("a", DataType::Int32),
                StructField::new(
                    "b",
                    DataType::list(DataType::Varchar { length: 0 }),
                ),
            ],
        };

        let reason = reason_of(dt.validate("payload").unwrap_err());
        assert!(reason.contains("payload.b.element"), "got {reason}");
    }

    #[test]
    fn struct_rules() {
        let empty = DataType::Struct { fields: vec![] };
        assert!(reason_of(empty.validate("s").unwrap_err()).contains("at least one field"));

        let dup = DataType::Struct {
            fields: vec![
                StructField::new("x", DataType::Int32),
                StructField::new("x", DataType::Int64),
            ],
        };
        assert!(reason_of(dup.validate("s").unwrap_err()).contains("duplicate struct field 'x'"));

        let unnamed = DataType::Struct {
            fields: vec![StructField::new("  ", DataType::Int32)],
        };
        assert!(reason_of(unnamed.validate("s").unwrap_err()).contains("non-empty"));
    }

    #[test]
    fn display_is_canonical() {
        let dt = DataType::Struct {
            fields: vec![
                StructField::new("id", DataType::Int64).with_nullable(false),
                StructField::new("tags", DataType::map(DataType::Utf8, DataType::Int32)),
            ],
        };
        assert_eq!(
            dt.to_string(),
            "struct<id: int64 not null, tags: map<string, int32>>"
        );
        assert_eq!(
            DataType::timestamp_tz(TimeUnit::Millis, "UTC").to_string(),
            "timestamp[ms](UTC)"
        );
        assert_eq!(
            DataType::Decimal {
                precision: 10,
                scale: 2
            }
            .to_string(),
            "decimal(10,2)"
        );
    }

    #[test]
    fn struct_field_nullable_defaults_to_true() {
        let json = r#"{ "name": "price", "data_type": "Float64" }"#;
        let field: StructField = serde_json::from_str(json).expect("deserialize");
        assert!(field.nullable);
        assert_eq!(field.comment, None);
    }

    #[test]
    fn timestamp_omits_missing_timezone() {
        let json = serde_json::to_string(&DataType::timestamp(TimeUnit::Micros)).unwrap();
        assert!(!json.contains("timezone"));
        let back: DataType = serde_json::from_str(&json).unwrap();
        assert_eq!(back, DataType::timestamp(TimeUnit::Micros));
    }

    #[test]
    fn type_classification() {
        assert!(DataType::Int32.is_primitive());
        assert!(DataType::Other("geometry".to_string()).is_primitive());
        assert!(!DataType::list(DataType::Int32).is_primitive());
        assert!(!DataType::map(DataType::Utf8, DataType::Utf8).is_primitive());

        assert!(DataType::Date.is_temporal());
        assert!(DataType::timestamp(TimeUnit::Nanos).is_temporal());
        assert!(DataType::Time { unit: TimeUnit::Millis }.is_temporal());
        assert!(!DataType::Int64.is_temporal());
    }
}
