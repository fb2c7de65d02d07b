//! Column definitions for the row grid.
//!
//! A column pairs a [`ColumnKey`] with its display name, width, whether it
//! has a text editor, and the formatter used to display its cells.

use serde::{Deserialize, Serialize};

/// Minimum width a column can be resized to, in character cells.
pub const MIN_COLUMN_WIDTH: u16 = 3;
/// Maximum width a column can be resized to, in character cells.
pub const MAX_COLUMN_WIDTH: u16 = 50;

/// Identifies one field of a [`Row`](super::Row).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnKey {
    Id,
    Code,
    Name,
    Price,
    Date,
    CreateDatetime,
}

/// The subset of row fields that hold free text and can be edited in place.
///
/// `id` and `create_datetime` have no variant here, so an edit can never
/// touch them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextField {
    Code,
    Name,
    Price,
    Date,
}

impl ColumnKey {
    pub fn text_field(self) -> Option<TextField> {
        match self {
            ColumnKey::Code => Some(TextField::Code),
            ColumnKey::Name => Some(TextField::Name),
            ColumnKey::Price => Some(TextField::Price),
            ColumnKey::Date => Some(TextField::Date),
            ColumnKey::Id | ColumnKey::CreateDatetime => None,
        }
    }
}

impl From<TextField> for ColumnKey {
    fn from(field: TextField) -> Self {
        match field {
            TextField::Code => ColumnKey::Code,
            TextField::Name => ColumnKey::Name,
            TextField::Price => ColumnKey::Price,
            TextField::Date => ColumnKey::Date,
        }
    }
}

/// How a column's cells are rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellFormat {
    Plain,
    Currency,
    Date,
    DateTime,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ColumnDef {
    pub key: ColumnKey,
    pub name: &'static str,
    pub width: u16,
    pub editable: bool,
    pub resizable: bool,
    pub format: CellFormat,
}

impl ColumnDef {
    fn new(key: ColumnKey, name: &'static str, width: u16) -> Self {
        Self {
            key,
            name,
            width,
            editable: false,
            resizable: true,
            format: CellFormat::Plain,
        }
    }

    fn editable(mut self) -> Self {
        self.editable = self.key.text_field().is_some();
        self
    }

    fn format(mut self, format: CellFormat) -> Self {
        self.format = format;
        self
    }

    /// Sets the width, clamped to the allowed range. Returns the new width.
    pub fn resize(&mut self, width: u16) -> u16 {
        if self.resizable {
            self.width = width.clamp(MIN_COLUMN_WIDTH, MAX_COLUMN_WIDTH);
        }
        self.width
    }
}

/// Width of the leading checkbox column.
pub const SELECT_COLUMN_WIDTH: u16 = 3;

/// The data columns of the grid, in display order. The selection checkbox
/// column is not part of this list; the grid always renders it first.
pub fn default_columns() -> Vec<ColumnDef> {
    vec![
        ColumnDef::new(ColumnKey::Id, "ID", 10),
        ColumnDef::new(ColumnKey::Code, "Code", 10).editable(),
        ColumnDef::new(ColumnKey::Name, "Name", 10).editable(),
        ColumnDef::new(ColumnKey::Price, "Price", 20)
            .editable()
            .format(CellFormat::Currency),
        ColumnDef::new(ColumnKey::Date, "Date", 20)
            .editable()
            .format(CellFormat::Date),
        ColumnDef::new(ColumnKey::CreateDatetime, "CreateDatetime", 25)
            .format(CellFormat::DateTime),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_columns_order_and_editors() {
        let columns = default_columns();
        let keys: Vec<ColumnKey> = columns.iter().map(|c| c.key).collect();
        assert_eq!(
            keys,
            vec![
                ColumnKey::Id,
                ColumnKey::Code,
                ColumnKey::Name,
                ColumnKey::Price,
                ColumnKey::Date,
                ColumnKey::CreateDatetime,
            ]
        );

        let editable: Vec<bool> = columns.iter().map(|c| c.editable).collect();
        assert_eq!(editable, vec![false, true, true, true, true, false]);
    }

    #[test]
    fn test_default_column_formats() {
        let columns = default_columns();
        assert_eq!(columns[3].format, CellFormat::Currency);
        assert_eq!(columns[4].format, CellFormat::Date);
        assert_eq!(columns[5].format, CellFormat::DateTime);
        assert_eq!(columns[0].format, CellFormat::Plain);
    }

    #[test]
    fn test_resize_is_clamped() {
        let mut column = default_columns().remove(1);
        assert_eq!(column.resize(1), MIN_COLUMN_WIDTH);
        assert_eq!(column.resize(200), MAX_COLUMN_WIDTH);
        assert_eq!(column.resize(12), 12);
    }

    #[test]
    fn test_text_field_round_trip() {
        assert_eq!(ColumnKey::Id.text_field(), None);
        assert_eq!(ColumnKey::CreateDatetime.text_field(), None);
        assert_eq!(ColumnKey::from(TextField::Price), ColumnKey::Price);
        assert_eq!(ColumnKey::Price.text_field(), Some(TextField::Price));
    }
}
