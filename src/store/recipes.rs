use std::collections::HashMap;
use std::path::Path;

use serde::Deserialize;

use crate::error::LoadError;
use crate::models::RecipeRecord;

/// One CSV row before the text-encoded list columns are parsed.
#[derive(Debug, Deserialize)]
struct RawRecipeRow {
    id: i64,
    name: String,
    minutes: i64,
    #[serde(default)]
    tags: String,
    #[serde(default)]
    ingredients: String,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    nutrition: String,
    #[serde(default)]
    steps: String,
    #[serde(default)]
    n_ingredients: Option<i64>,
}

impl RawRecipeRow {
    fn into_record(self) -> RecipeRecord {
        RecipeRecord {
            id: self.id,
            name: self.name,
            minutes: self.minutes,
            tags: parse_string_list(&self.tags),
            ingredients: parse_string_list(&self.ingredients),
            description: self.description.filter(|d| !d.is_empty()),
            nutrition: parse_float_list(&self.nutrition),
            steps: parse_string_list(&self.steps),
            n_ingredients: self.n_ingredients.unwrap_or(0),
        }
    }
}

/// The full recipe table, loaded once and shared read-only for the life of
/// the process.
#[derive(Debug, Default)]
pub struct RecipeTable {
    records: Vec<RecipeRecord>,
    by_id: HashMap<i64, usize>,
}

impl RecipeTable {
    /// Reads the recipe CSV. Rows that cannot be deserialized at all are
    /// skipped with a warning; malformed list cells inside an otherwise
    /// readable row become empty lists.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, LoadError> {
        let path = path.as_ref();
        let mut reader = csv::Reader::from_path(path).map_err(|source| LoadError::Csv {
            path: path.to_path_buf(),
            source,
        })?;

        let mut records = Vec::new();
        for row in reader.deserialize::<RawRecipeRow>() {
            match row {
                Ok(raw) => records.push(raw.into_record()),
                Err(e) => {
                    tracing::warn!(error = %e, "Skipping unreadable recipe row");
                }
            }
        }

        tracing::info!(recipes = records.len(), path = %path.display(), "Recipe table loaded");

        Ok(Self::from_records(records))
    }

    /// Builds a table from in-memory records. The first occurrence wins
    /// when an id appears twice.
    pub fn from_records(records: Vec<RecipeRecord>) -> Self {
        let mut by_id = HashMap::with_capacity(records.len());
        for (position, record) in records.iter().enumerate() {
            by_id.entry(record.id).or_insert(position);
        }
        Self { records, by_id }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn get(&self, recipe_id: i64) -> Option<&RecipeRecord> {
        self.by_id.get(&recipe_id).map(|&position| &self.records[position])
    }

    /// Iterates records in table order.
    pub fn iter(&self) -> impl Iterator<Item = &RecipeRecord> {
        self.records.iter()
    }

    /// `(id, name)` pairs, used to build the model store's title lookup.
    pub fn titles(&self) -> HashMap<i64, String> {
        self.records
            .iter()
            .map(|record| (record.id, record.name.clone()))
            .collect()
    }
}

/// Parses a Python-literal list of strings (`['a', "b"]`) without
/// evaluating anything. A cell that is not a well-formed list yields an
/// empty list; partial data must never abort a load or a ranking.
pub(crate) fn parse_string_list(raw: &str) -> Vec<String> {
    match try_parse_string_list(raw) {
        Some(items) => items,
        None => {
            if !raw.trim().is_empty() {
                tracing::debug!(cell = raw, "Malformed list cell, treating as empty");
            }
            Vec::new()
        }
    }
}

fn try_parse_string_list(raw: &str) -> Option<Vec<String>> {
    let body = raw.trim().strip_prefix('[')?.strip_suffix(']')?;

    let mut items = Vec::new();
    let mut rest = body.trim_start();

    while !rest.is_empty() {
        let mut chars = rest.char_indices();
        let quote = match chars.next() {
            Some((_, c @ ('\'' | '"'))) => c,
            _ => return None,
        };

        let mut item = String::new();
        let mut end = None;
        let mut escaped = false;
        for (i, c) in chars {
            if escaped {
                item.push(c);
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == quote {
                end = Some(i);
                break;
            } else {
                item.push(c);
            }
        }

        // Unterminated string
        let end = end?;
        items.push(item);

        rest = rest[end + 1..].trim_start();
        match rest.strip_prefix(',') {
            Some(after_comma) => {
                rest = after_comma.trim_start();
                if rest.is_empty() {
                    return None;
                }
            }
            None if rest.is_empty() => {}
            None => return None,
        }
    }

    Some(items)
}

/// Parses a Python-literal list of numbers (`[51.5, 0.0, 13.0]`), with the
/// same empty-list fallback as [`parse_string_list`].
pub(crate) fn parse_float_list(raw: &str) -> Vec<f64> {
    let Some(body) = raw.trim().strip_prefix('[').and_then(|s| s.strip_suffix(']')) else {
        if !raw.trim().is_empty() {
            tracing::debug!(cell = raw, "Malformed numeric list cell, treating as empty");
        }
        return Vec::new();
    };

    let body = body.trim();
    if body.is_empty() {
        return Vec::new();
    }

    body.split(',')
        .map(|part| part.trim().parse::<f64>())
        .collect::<Result<Vec<_>, _>>()
        .unwrap_or_default()
}
