use std::io::Write;
use std::sync::Arc;

use arrow::datatypes::{DataType, Field, Schema as ArrowSchema, TimeUnit};
use arrow::ipc::writer::FileWriter;
use arrow::record_batch::RecordBatch;
use arrow_array::{ArrayRef, Decimal128Array, Int64Array, StringArray, TimestampNanosecondArray};

use super::{Column, Error, Series};
use crate::schema::FieldType;

impl Series {
    /// Arrow layout of this series: a `time` column followed by one column per field.
    pub fn arrow_schema(&self) -> ArrowSchema {
        let mut fields = Vec::with_capacity(self.schema().len() + 1);
        fields.push(Field::new(
            "time",
            DataType::Timestamp(TimeUnit::Nanosecond, None),
            false,
        ));
        for field in self.schema().fields() {
            let data_type = match field.field_type {
                FieldType::Fixed {
                    precision,
                    decimals,
                } => DataType::Decimal128(precision, decimals as i8),
                FieldType::Integer => DataType::Int64,
                FieldType::String => DataType::Utf8,
            };
            fields.push(Field::new(field.name.as_str(), data_type, false));
        }
        ArrowSchema::new(fields)
    }

    pub fn to_record_batch(&self) -> Result<RecordBatch, Error> {
        let nanos = self
            .times()
            .iter()
            .map(|time| {
                time.timestamp_nanos_opt().ok_or_else(|| {
                    Error::InvalidTimestamp(format!("{time} is outside the nanosecond range"))
                })
            })
            .collect::<Result<Vec<i64>, Error>>()?;

        let mut arrays: Vec<ArrayRef> = Vec::with_capacity(self.columns().len() + 1);
        arrays.push(Arc::new(TimestampNanosecondArray::from(nanos)));
        for (field, column) in self.schema().fields().iter().zip(self.columns()) {
            let array: ArrayRef = match (column, field.field_type) {
                (Column::Fixed { values, .. }, FieldType::Fixed { precision, decimals }) => {
                    let scaled: Vec<i128> = values.iter().map(|v| i128::from(*v)).collect();
                    Arc::new(
                        Decimal128Array::from(scaled)
                            .with_precision_and_scale(precision, decimals as i8)?,
                    )
                }
                (Column::Integer(values), FieldType::Integer) => {
                    Arc::new(Int64Array::from(values.iter().copied().collect::<Vec<_>>()))
                }
                (Column::String(values), FieldType::String) => Arc::new(StringArray::from(
                    values.iter().map(String::as_str).collect::<Vec<_>>(),
                )),
                (column, _) => {
                    return Err(Error::SchemaMismatch(format!(
                        "field `{}` is backed by a {} column",
                        field.name,
                        column.kind()
                    )));
                }
            };
            arrays.push(array);
        }

        Ok(RecordBatch::try_new(Arc::new(self.arrow_schema()), arrays)?)
    }

    /// Writes the series as a single-batch Arrow IPC file.
    pub fn write_ipc<W: Write>(&self, writer: W) -> Result<(), Error> {
        let batch = self.to_record_batch()?;
        let mut writer = FileWriter::try_new(writer, &batch.schema())?;
        writer.write(&batch)?;
        writer.finish()?;
        Ok(())
    }
}
