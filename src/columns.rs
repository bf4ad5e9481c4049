//! Column classification
//!
//! A [`ColumnSchema`] maps column names to a [`ColumnKind`]. It is a plain
//! value handed to the repair passes, so the normalizer itself never knows
//! any column names.

use crate::normalize::ColumnKind;
use crate::row::{CellChange, Row};
use once_cell::sync::Lazy;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Board-game columns stored as JSON arrays
pub const BOARD_GAME_ARRAY_COLUMNS: &[&str] = &[
    "categories",
    "mechanics",
    "popular_categories",
    "popular_mechanics",
    "best_num_players",
    "recommended_num_players",
    "site_recommended_players",
    "designers",
    "artists",
    "publishers",
];

/// Board-game columns stored as JSON objects
pub const BOARD_GAME_OBJECT_COLUMNS: &[&str] = &["metadata"];

static BOARD_GAMES: Lazy<ColumnSchema> = Lazy::new(|| {
    let mut schema = ColumnSchema::empty();
    for name in BOARD_GAME_ARRAY_COLUMNS {
        schema.set(name, ColumnKind::JsonArray);
    }
    for name in BOARD_GAME_OBJECT_COLUMNS {
        schema.set(name, ColumnKind::JsonObject);
    }
    schema
});

#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("column `{0}` is listed as both a JSON array and a JSON object column")]
    ConflictingKind(String),

    #[error("failed to read column schema {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid column schema: {0}")]
    Parse(#[from] serde_json::Error),
}

/// On-disk form: `{"array_columns": [...], "object_columns": [...]}`
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct SchemaFile {
    #[serde(default)]
    array_columns: Vec<String>,
    #[serde(default)]
    object_columns: Vec<String>,
}

/// Fixed classification of column names into kinds
///
/// Columns that are not listed are [`ColumnKind::PlainText`]. Insertion order
/// is kept so that logs list columns the way they were declared.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnSchema {
    columns: Vec<(String, ColumnKind)>,
}

impl Default for ColumnSchema {
    fn default() -> Self {
        Self::board_games().clone()
    }
}

impl ColumnSchema {
    /// A schema that treats every column as plain text
    pub fn empty() -> Self {
        ColumnSchema { columns: Vec::new() }
    }

    /// The classification used for the board-game migration
    pub fn board_games() -> &'static ColumnSchema {
        &BOARD_GAMES
    }

    /// Build a schema from two name lists, rejecting names that appear in both
    pub fn from_lists<A, O>(array_columns: A, object_columns: O) -> Result<Self, SchemaError>
    where
        A: IntoIterator,
        A::Item: AsRef<str>,
        O: IntoIterator,
        O::Item: AsRef<str>,
    {
        let mut schema = Self::empty();
        schema.apply_overrides(array_columns, object_columns)?;
        Ok(schema)
    }

    pub fn from_json_str(text: &str) -> Result<Self, SchemaError> {
        let file: SchemaFile = serde_json::from_str(text)?;
        Self::from_lists(file.array_columns, file.object_columns)
    }

    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self, SchemaError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| SchemaError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&text)
    }

    pub fn with_array_column(mut self, name: impl AsRef<str>) -> Self {
        self.set(name.as_ref(), ColumnKind::JsonArray);
        self
    }

    pub fn with_object_column(mut self, name: impl AsRef<str>) -> Self {
        self.set(name.as_ref(), ColumnKind::JsonObject);
        self
    }

    /// Reclassify columns on top of the current schema
    ///
    /// The two lists must be disjoint; a listed name replaces whatever kind
    /// the schema previously had for it.
    pub fn apply_overrides<A, O>(
        &mut self,
        array_columns: A,
        object_columns: O,
    ) -> Result<(), SchemaError>
    where
        A: IntoIterator,
        A::Item: AsRef<str>,
        O: IntoIterator,
        O::Item: AsRef<str>,
    {
        let arrays: Vec<String> = array_columns
            .into_iter()
            .map(|name| name.as_ref().trim().to_string())
            .filter(|name| !name.is_empty())
            .collect();
        let objects: Vec<String> = object_columns
            .into_iter()
            .map(|name| name.as_ref().trim().to_string())
            .filter(|name| !name.is_empty())
            .collect();

        if let Some(name) = arrays.iter().find(|name| objects.contains(name)) {
            return Err(SchemaError::ConflictingKind(name.clone()));
        }

        for name in &arrays {
            self.set(name, ColumnKind::JsonArray);
        }
        for name in &objects {
            self.set(name, ColumnKind::JsonObject);
        }
        Ok(())
    }

    fn set(&mut self, name: &str, kind: ColumnKind) {
        match self.columns.iter_mut().find(|(column, _)| column == name) {
            Some(entry) => entry.1 = kind,
            None => self.columns.push((name.to_string(), kind)),
        }
    }

    pub fn kind_of(&self, name: &str) -> ColumnKind {
        self.columns
            .iter()
            .find(|(column, _)| column == name)
            .map(|(_, kind)| *kind)
            .unwrap_or(ColumnKind::PlainText)
    }

    /// Every classified column with its kind
    pub fn iter(&self) -> impl Iterator<Item = (&str, ColumnKind)> {
        self.columns.iter().map(|(name, kind)| (name.as_str(), *kind))
    }

    pub fn array_columns(&self) -> Vec<&str> {
        self.names_of(ColumnKind::JsonArray)
    }

    pub fn object_columns(&self) -> Vec<&str> {
        self.names_of(ColumnKind::JsonObject)
    }

    fn names_of(&self, kind: ColumnKind) -> Vec<&str> {
        self.iter()
            .filter(|(_, column_kind)| *column_kind == kind)
            .map(|(name, _)| name)
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Resolve the schema against a concrete header row
    pub fn resolve<S: AsRef<str>>(&self, headers: &[S]) -> ColumnPlan {
        let targets: Vec<(usize, ColumnKind)> = headers
            .iter()
            .enumerate()
            .filter_map(|(index, header)| {
                let kind = self.kind_of(header.as_ref());
                kind.is_json().then_some((index, kind))
            })
            .collect();

        let missing = self
            .iter()
            .filter(|(name, kind)| {
                kind.is_json() && !headers.iter().any(|header| header.as_ref() == *name)
            })
            .map(|(name, _)| name.to_string())
            .collect();

        ColumnPlan { targets, missing }
    }
}

/// Pre-computed cell positions to normalize for one header layout
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnPlan {
    /// Header index and kind of every JSON column present
    pub targets: Vec<(usize, ColumnKind)>,

    /// Schema columns the header does not contain
    pub missing: Vec<String>,
}

impl ColumnPlan {
    /// Normalize the planned cells of one row in place
    ///
    /// Positions past the end of a short row are skipped.
    pub fn apply(&self, row: &mut Row, row_number: usize) -> Vec<CellChange> {
        self.targets
            .iter()
            .filter_map(|&(index, kind)| row.normalize_at(index, kind, row_number))
            .collect()
    }
}
