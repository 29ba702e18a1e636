use chrono::SecondsFormat;
use serde::Serialize;
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

use crate::models::SnowRecord;

/// Columns of a [`SnowTable`], in output order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Column {
    Id,
    DatetimeUtc,
    Latitude,
    Longitude,
    AuthorName,
    ObsType,
    SnowDepth,
    Description,
}

impl Column {
    pub const ALL: [Column; 8] = [
        Column::Id,
        Column::DatetimeUtc,
        Column::Latitude,
        Column::Longitude,
        Column::AuthorName,
        Column::ObsType,
        Column::SnowDepth,
        Column::Description,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Column::Id => "id",
            Column::DatetimeUtc => "datetime_utc",
            Column::Latitude => "latitude",
            Column::Longitude => "longitude",
            Column::AuthorName => "author_name",
            Column::ObsType => "obs_type",
            Column::SnowDepth => "snow_depth",
            Column::Description => "description",
        }
    }

    /// True when `record` has no value in this column.
    pub fn is_null(&self, record: &SnowRecord) -> bool {
        match self {
            Column::AuthorName => record.author_name.is_none(),
            Column::SnowDepth => !record.has_snow_depth(),
            Column::Id
            | Column::DatetimeUtc
            | Column::Latitude
            | Column::Longitude
            | Column::ObsType
            | Column::Description => false,
        }
    }

    /// Cell value for this column in `record`. Missing values are `Value::Null`.
    pub fn value(&self, record: &SnowRecord) -> Value {
        match self {
            Column::Id => Value::from(record.id.as_str()),
            Column::DatetimeUtc => {
                Value::from(record.datetime_utc.to_rfc3339_opts(SecondsFormat::AutoSi, true))
            }
            Column::Latitude => Value::from(record.latitude),
            Column::Longitude => Value::from(record.longitude),
            Column::AuthorName => record.author_name.as_deref().map_or(Value::Null, Value::from),
            Column::ObsType => Value::from(record.obs_type.as_str()),
            Column::SnowDepth => record.snow_depth.map_or(Value::Null, Value::from),
            Column::Description => Value::from(record.description.as_str()),
        }
    }
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Column {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Column::ALL
            .into_iter()
            .find(|c| c.name() == s)
            .ok_or_else(|| format!("Unknown column: {s}"))
    }
}

/// Normalized observations returned to the caller.
///
/// Rows are stored as [`SnowRecord`]s; [`SnowTable::column`] gives a
/// column-wise view.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct SnowTable {
    records: Vec<SnowRecord>,
}

impl SnowTable {
    pub fn new(records: Vec<SnowRecord>) -> Self {
        Self { records }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn columns() -> &'static [Column] {
        &Column::ALL
    }

    pub fn records(&self) -> &[SnowRecord] {
        &self.records
    }

    pub fn iter(&self) -> std::slice::Iter<'_, SnowRecord> {
        self.records.iter()
    }

    pub fn into_records(self) -> Vec<SnowRecord> {
        self.records
    }

    pub fn column(&self, column: Column) -> Vec<Value> {
        self.records.iter().map(|r| column.value(r)).collect()
    }

    pub fn column_by_name(&self, name: &str) -> Option<Vec<Value>> {
        name.parse::<Column>().ok().map(|c| self.column(c))
    }

    /// Remove rows whose value in `column` is null.
    pub fn drop_nulls(mut self, column: Column) -> Self {
        self.records.retain(|r| !column.is_null(r));
        self
    }
}

impl From<Vec<SnowRecord>> for SnowTable {
    fn from(records: Vec<SnowRecord>) -> Self {
        Self::new(records)
    }
}

impl IntoIterator for SnowTable {
    type Item = SnowRecord;
    type IntoIter = std::vec::IntoIter<SnowRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.into_iter()
    }
}

impl<'a> IntoIterator for &'a SnowTable {
    type Item = &'a SnowRecord;
    type IntoIter = std::slice::Iter<'a, SnowRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}
