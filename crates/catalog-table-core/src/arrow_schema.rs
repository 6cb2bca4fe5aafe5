//! Projection of table columns onto Arrow schemas.
//!
//! Query planners built on Arrow consume a table through
//! [`Table::to_arrow_schema`]. Column comments are carried in field metadata
//! under [`COMMENT_METADATA_KEY`].
use std::{collections::HashMap, sync::Arc};

use arrow::datatypes::{
    DataType as ArrowDataType, Field, FieldRef, Fields, Schema, SchemaRef,
    TimeUnit as ArrowTimeUnit,
};
use snafu::prelude::*;

use crate::{
    column::Column,
    table::Table,
    types::{DataType, MAX_DECIMAL_PRECISION, StructField, TimeUnit},
};

/// Field metadata key holding a column comment.
pub const COMMENT_METADATA_KEY: &str = "comment";

/// Errors encountered while converting model types to Arrow.
#[derive(Debug, Snafu, PartialEq, Eq)]
pub enum SchemaConvertError {
    /// Backend-specific types cannot be represented in Arrow.
    #[snafu(display("Other type '{name}' has no Arrow representation (column '{column}')"))]
    OtherTypeUnsupported {
        /// Column path that failed conversion.
        column: String,
        /// The backend type name.
        name: String,
    },

    /// Arrow cannot express the requested width.
    #[snafu(display("{type_name} width {width} does not fit Arrow for column '{column}'"))]
    WidthOutOfRange {
        /// Column path that failed conversion.
        column: String,
        /// Type being converted.
        type_name: String,
        /// Declared width.
        width: u32,
    },

    /// Decimal precision/scale is out of supported bounds.
    #[snafu(display(
        "invalid decimal for column '{column}': precision={precision}, scale={scale}"
    ))]
    DecimalInvalid {
        /// Column path that failed conversion.
        column: String,
        /// Declared precision.
        precision: u8,
        /// Declared scale.
        scale: u8,
    },
}

impl TimeUnit {
    fn to_arrow(self) -> ArrowTimeUnit {
        match self {
            TimeUnit::Seconds => ArrowTimeUnit::Second,
            TimeUnit::Millis => ArrowTimeUnit::Millisecond,
            TimeUnit::Micros => ArrowTimeUnit::Microsecond,
            TimeUnit::Nanos => ArrowTimeUnit::Nanosecond,
        }
    }
}

fn join_path(parent: &str, child: &str) -> String {
    if parent.is_empty() {
        child.to_string()
    } else {
        format!("{parent}.{child}")
    }
}

fn comment_metadata(comment: Option<&str>) -> HashMap<String, String> {
    comment
        .map(|c| HashMap::from([(COMMENT_METADATA_KEY.to_string(), c.to_string())]))
        .unwrap_or_default()
}

impl StructField {
    fn to_arrow_field_ref(&self, path: &str) -> Result<FieldRef, SchemaConvertError> {
        let dt = self.data_type.to_arrow(path)?;
        let field = Field::new(self.name.clone(), dt, self.nullable)
            .with_metadata(comment_metadata(self.comment.as_deref()));
        Ok(Arc::new(field))
    }
}

impl DataType {
    /// Convert to the equivalent Arrow data type; `column` is the dotted path
    /// used in error messages.
    ///
    /// Varchar and fixed-char types map to `Utf8` (length limits are not
    /// representable in Arrow); `Time` maps to `Time32` for second and
    /// millisecond units and `Time64` otherwise.
    ///
    /// # Errors
    /// [`SchemaConvertError::OtherTypeUnsupported`] for [`DataType::Other`],
    /// and range errors for widths or decimals Arrow cannot hold.
    pub fn to_arrow(&self, column: &str) -> Result<ArrowDataType, SchemaConvertError> {
        Ok(match self {
            DataType::Bool => ArrowDataType::Boolean,
            DataType::Int8 => ArrowDataType::Int8,
            DataType::Int16 => ArrowDataType::Int16,
            DataType::Int32 => ArrowDataType::Int32,
            DataType::Int64 => ArrowDataType::Int64,
            DataType::Float32 => ArrowDataType::Float32,
            DataType::Float64 => ArrowDataType::Float64,
            DataType::Date => ArrowDataType::Date32,
            DataType::Utf8 | DataType::Varchar { .. } | DataType::FixedChar { .. } => {
                ArrowDataType::Utf8
            }
            DataType::Binary => ArrowDataType::Binary,

            DataType::Decimal { precision, scale } => {
                ensure!(
                    *precision >= 1 && *precision <= MAX_DECIMAL_PRECISION && scale <= precision,
                    DecimalInvalidSnafu {
                        column,
                        precision: *precision,
                        scale: *scale,
                    }
                );
                // Checked above: scale <= precision <= 38 fits in i8.
                ArrowDataType::Decimal128(*precision, *scale as i8)
            }

            DataType::Time { unit } => match unit {
                TimeUnit::Seconds | TimeUnit::Millis => ArrowDataType::Time32(unit.to_arrow()),
                TimeUnit::Micros | TimeUnit::Nanos => ArrowDataType::Time64(unit.to_arrow()),
            },

            DataType::Timestamp { unit, timezone } => {
                let tz: Option<Arc<str>> = timezone.as_deref().map(Arc::<str>::from);
                ArrowDataType::Timestamp(unit.to_arrow(), tz)
            }

            DataType::FixedBinary { byte_width } => {
                let width = i32::try_from(*byte_width)
                    .ok()
                    .filter(|w| *w > 0)
                    .context(WidthOutOfRangeSnafu {
                        column,
                        type_name: "fixed binary",
                        width: *byte_width,
                    })?;
                ArrowDataType::FixedSizeBinary(width)
            }

            DataType::Struct { fields } => {
                let mut children: Vec<FieldRef> = Vec::with_capacity(fields.len());
                for f in fields {
                    children.push(f.to_arrow_field_ref(&join_path(column, &f.name))?);
                }
                ArrowDataType::Struct(Fields::from(children))
            }

            DataType::List {
                element,
                element_nullable,
            } => {
                let child = element.to_arrow(&join_path(column, "element"))?;
                ArrowDataType::List(Arc::new(Field::new("item", child, *element_nullable)))
            }

            DataType::Map {
                key,
                value,
                value_nullable,
            } => {
                // Canonical Arrow Map field names are "entries", "key", "value".
                let key_dt = key.to_arrow(&join_path(column, "key"))?;
                let val_dt = value.to_arrow(&join_path(column, "value"))?;

                let key_field: FieldRef = Arc::new(Field::new("key", key_dt, false));
                let val_field: FieldRef = Arc::new(Field::new("value", val_dt, *value_nullable));
                let entries_dt = ArrowDataType::Struct(Fields::from(vec![key_field, val_field]));
                let entries_field: FieldRef = Arc::new(Field::new("entries", entries_dt, false));

                ArrowDataType::Map(entries_field, false)
            }

            DataType::Other(name) => {
                return OtherTypeUnsupportedSnafu {
                    column,
                    name: name.as_str(),
                }
                .fail();
            }
        })
    }
}

impl Column {
    /// Convert to an Arrow field; the comment lands in field metadata.
    ///
    /// # Errors
    /// See [`DataType::to_arrow`].
    pub fn to_arrow_field(&self) -> Result<Field, SchemaConvertError> {
        let dt = self.data_type().to_arrow(self.name())?;
        Ok(Field::new(self.name(), dt, self.nullable())
            .with_metadata(comment_metadata(self.comment())))
    }
}

impl Table {
    /// Convert the table's columns to an owned Arrow [`Schema`]. The table
    /// comment, if any, lands in schema metadata.
    ///
    /// # Errors
    /// See [`DataType::to_arrow`].
    pub fn to_arrow_schema(&self) -> Result<Schema, SchemaConvertError> {
        let mut fields = Vec::with_capacity(self.columns().len());
        for c in self.columns() {
            fields.push(c.to_arrow_field()?);
        }
        Ok(Schema::new(fields).with_metadata(comment_metadata(self.comment())))
    }

    /// Convert the table's columns to a shared Arrow [`SchemaRef`].
    ///
    /// This is a convenience wrapper around [`Self::to_arrow_schema`].
    pub fn to_arrow_schema_ref(&self) -> Result<SchemaRef, SchemaConvertError> {
        Ok(Arc::new(self.to_arrow_schema()?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(columns: Vec<Column>) -> Table {
        Table::builder("t", columns).build().expect("valid table")
    }

    #[test]
    fn table_to_arrow_schema_happy_path() {
        let t = table(vec![
            Column::new("flag", DataType::Bool, false).unwrap(),
            Column::new("i32", DataType::Int32, false).unwrap(),
            Column::new("i64", DataType::Int64, true).unwrap(),
            Column::new("f64", DataType::Float64, true).unwrap(),
            Column::new("text", DataType::Varchar { length: 32 }, true).unwrap(),
            Column::new("day", DataType::Date, true).unwrap(),
            Column::new("fixed", DataType::FixedBinary { byte_width: 16 }, false).unwrap(),
            Column::new("ts", DataType::timestamp_tz(TimeUnit::Micros, "UTC"), false).unwrap(),
            Column::new(
                "amount",
                DataType::Decimal {
                    precision: 18,
                    scale: 4,
                },
                true,
            )
            .unwrap(),
        ]);

        let schema = t.to_arrow_schema().expect("arrow schema conversion");
        let expected = Schema::new(vec![
            Field::new("flag", ArrowDataType::Boolean, false),
            Field::new("i32", ArrowDataType::Int32, false),
            Field::new("i64", ArrowDataType::Int64, true),
            Field::new("f64", ArrowDataType::Float64, true),
            Field::new("text", ArrowDataType::Utf8, true),
            Field::new("day", ArrowDataType::Date32, true),
            Field::new("fixed", ArrowDataType::FixedSizeBinary(16), false),
            Field::new(
                "ts",
                ArrowDataType::Timestamp(ArrowTimeUnit::Microsecond, Some(Arc::<str>::from("UTC"))),
                false,
            ),
            Field::new("amount", ArrowDataType::Decimal128(18, 4), true),
        ]);

        assert_eq!(schema, expected);
    }

    #[test]
    fn comments_land_in_metadata() {
        let t = Table::builder(
            "t",
            vec![
                Column::new("id", DataType::Int64, false)
                    .unwrap()
                    .with_comment("primary key"),
            ],
        )
        .comment("orders")
        .build()
        .unwrap();

        let schema = t.to_arrow_schema_ref().unwrap();
        assert_eq!(
            schema.metadata().get(COMMENT_METADATA_KEY).map(String::as_str),
            Some("orders")
        );
        assert_eq!(
            schema
                .field(0)
                .metadata()
                .get(COMMENT_METADATA_KEY)
                .map(String::as_str),
            Some("primary key")
        );
    }

    #[test]
    fn nested_types_convert() {
        let dt = DataType::Struct {
            fields: vec![
                StructField::new("tags", DataType::list(DataType::Utf8)),
                StructField::new("attrs", DataType::map(DataType::Utf8, DataType::Int32))
                    .with_nullable(false),
            ],
        };

        let arrow = dt.to_arrow("payload").unwrap();
        let ArrowDataType::Struct(fields) = arrow else {
            panic!("expected struct, got {arrow:?}");
        };
        assert_eq!(fields.len(), 2);
        assert!(matches!(fields[0].data_type(), ArrowDataType::List(_)));
        assert!(matches!(fields[1].data_type(), ArrowDataType::Map(_, false)));
        assert!(!fields[1].is_nullable());
    }

    #[test]
    fn time_units_pick_arrow_width() {
        assert_eq!(
            DataType::Time {
                unit: TimeUnit::Millis
            }
            .to_arrow("t")
            .unwrap(),
            ArrowDataType::Time32(ArrowTimeUnit::Millisecond)
        );
        assert_eq!(
            DataType::Time {
                unit: TimeUnit::Nanos
            }
            .to_arrow("t")
            .unwrap(),
            ArrowDataType::Time64(ArrowTimeUnit::Nanosecond)
        );
    }

    #[test]
    fn other_type_is_rejected() {
        let err = DataType::Other("geometry".to_string())
            .to_arrow("shape")
            .unwrap_err();
        assert_eq!(
            err,
            SchemaConvertError::OtherTypeUnsupported {
                column: "shape".to_string(),
                name: "geometry".to_string(),
            }
        );
    }

    #[test]
    fn out_of_range_widths_are_rejected() {
        let err = DataType::FixedBinary {
            byte_width: u32::MAX,
        }
        .to_arrow("blob")
        .unwrap_err();
        assert!(matches!(err, SchemaConvertError::WidthOutOfRange { .. }));

        let err = DataType::Decimal {
            precision: 40,
            scale: 2,
        }
        .to_arrow("amount")
        .unwrap_err();
        assert!(matches!(err, SchemaConvertError::DecimalInvalid { .. }));
    }
}
