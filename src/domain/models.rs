use std::collections::{HashMap, HashSet};

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use super::columns::{ColumnKey, TextField};
use super::errors::{DomainError, DomainResult};

/// Number of rows the demo grid starts with.
pub const DEFAULT_ROW_COUNT: usize = 10;

/// One record of the grid.
///
/// Rows are value snapshots: an edit never mutates a row in place, it
/// produces a new row through [`Row::with_field`] that replaces the old one
/// by identifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Row {
    pub id: String,
    pub code: String,
    pub name: String,
    pub price: String,
    pub date: String,
    pub create_datetime: DateTime<Utc>,
}

impl Row {
    /// Builds sample row `n`.
    ///
    /// # Examples
    ///
    /// ```
    /// use rowgrid::domain::Row;
    ///
    /// let row = Row::generate(3);
    /// assert_eq!(row.id, "3");
    /// assert_eq!(row.code, "Code3");
    /// assert_eq!(row.price, "3000");
    /// ```
    pub fn generate(n: usize) -> Self {
        Self {
            id: n.to_string(),
            code: format!("Code{n}"),
            name: format!("Name{n}"),
            price: (n * 1000).to_string(),
            date: "2021-01-01".to_string(),
            create_datetime: Utc
                .with_ymd_and_hms(2021, 1, 1, 0, 0, 0)
                .single()
                .unwrap_or_default(),
        }
    }

    /// Raw text of an editable field.
    pub fn text(&self, field: TextField) -> &str {
        match field {
            TextField::Code => &self.code,
            TextField::Name => &self.name,
            TextField::Price => &self.price,
            TextField::Date => &self.date,
        }
    }

    /// Raw value of any column, before formatting.
    pub fn field(&self, key: ColumnKey) -> String {
        match key {
            ColumnKey::Id => self.id.clone(),
            ColumnKey::CreateDatetime => self.create_datetime.to_rfc3339(),
            other => match other.text_field() {
                Some(field) => self.text(field).to_string(),
                None => String::new(),
            },
        }
    }

    /// Shallow copy of this row with one text field replaced.
    pub fn with_field(&self, field: TextField, value: impl Into<String>) -> Row {
        let mut row = self.clone();
        let value = value.into();
        match field {
            TextField::Code => row.code = value,
            TextField::Name => row.name = value,
            TextField::Price => row.price = value,
            TextField::Date => row.date = value,
        }
        row
    }
}

/// Ordered rows, keyed by identifier.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(try_from = "Vec<Row>", into = "Vec<Row>")]
pub struct RowCollection {
    rows: Vec<Row>,
    index: HashMap<String, usize>,
}

impl RowCollection {
    pub fn new(rows: Vec<Row>) -> DomainResult<Self> {
        let mut index = HashMap::with_capacity(rows.len());
        for (position, row) in rows.iter().enumerate() {
            if index.insert(row.id.clone(), position).is_some() {
                return Err(DomainError::DuplicateRowId(row.id.clone()));
            }
        }
        Ok(Self { rows, index })
    }

    /// Sample rows `1..=count`.
    pub fn sample(count: usize) -> Self {
        let rows: Vec<Row> = (1..=count).map(Row::generate).collect();
        let index = rows
            .iter()
            .enumerate()
            .map(|(position, row)| (row.id.clone(), position))
            .collect();
        Self { rows, index }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Row> {
        self.rows.iter()
    }

    pub fn get(&self, id: &str) -> Option<&Row> {
        self.index.get(id).map(|&position| &self.rows[position])
    }

    pub fn get_index(&self, position: usize) -> Option<&Row> {
        self.rows.get(position)
    }

    pub fn position(&self, id: &str) -> Option<usize> {
        self.index.get(id).copied()
    }

    /// Replaces the row sharing `row.id`, keeping its position.
    pub fn replace(&mut self, row: Row) -> DomainResult<()> {
        let position = self
            .position(&row.id)
            .ok_or_else(|| DomainError::UnknownRow(row.id.clone()))?;
        self.rows[position] = row;
        Ok(())
    }

    /// A new collection with `row` swapped in by identifier.
    pub fn with_replaced(&self, row: Row) -> DomainResult<Self> {
        let mut next = self.clone();
        next.replace(row)?;
        Ok(next)
    }
}

impl TryFrom<Vec<Row>> for RowCollection {
    type Error = DomainError;

    fn try_from(rows: Vec<Row>) -> Result<Self, Self::Error> {
        Self::new(rows)
    }
}

impl From<RowCollection> for Vec<Row> {
    fn from(collection: RowCollection) -> Self {
        collection.rows
    }
}

impl<'a> IntoIterator for &'a RowCollection {
    type Item = &'a Row;
    type IntoIter = std::slice::Iter<'a, Row>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.iter()
    }
}

/// Identifiers of the rows ticked in the selection column.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SelectionSet {
    ids: HashSet<String>,
}

impl SelectionSet {
    pub fn contains(&self, id: &str) -> bool {
        self.ids.contains(id)
    }

    /// Flips one row. Returns whether it is selected afterwards.
    pub fn toggle(&mut self, id: &str) -> bool {
        if self.ids.remove(id) {
            false
        } else {
            self.ids.insert(id.to_string());
            true
        }
    }

    /// Header checkbox: clears the set when every row is selected, otherwise
    /// selects every row.
    pub fn toggle_all(&mut self, rows: &RowCollection) {
        let all_selected = !rows.is_empty() && rows.iter().all(|row| self.contains(&row.id));
        if all_selected {
            self.ids.clear();
        } else {
            self.ids = rows.iter().map(|row| row.id.clone()).collect();
        }
    }

    pub fn all_selected(&self, rows: &RowCollection) -> bool {
        !rows.is_empty() && rows.iter().all(|row| self.contains(&row.id))
    }

    pub fn retain_existing(&mut self, rows: &RowCollection) {
        self.ids.retain(|id| rows.get(id).is_some());
    }

    pub fn clear(&mut self) {
        self.ids.clear();
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}
