//! SQLite mapping for the `products` table.

use crate::model::product::{Product, ProductFields, ProductPatch};
use crate::repo::resource_repo::{
    visibility_from_row, RepoResult, SqlResource, SqliteResourceRepository,
};
use rusqlite::types::Value;
use rusqlite::Row;

/// SQLite-backed product repository.
pub type SqliteProductRepository<'conn> = SqliteResourceRepository<'conn, Product>;

impl SqlResource for Product {
    const TABLE: &'static str = "products";
    const PAYLOAD_COLUMNS: &'static [&'static str] = &["name", "price"];

    fn from_row(row: &Row<'_>) -> RepoResult<Self> {
        Ok(Self {
            id: row.get("id")?,
            name: row.get("name")?,
            price: row.get("price")?,
            visibility: visibility_from_row(row, Self::TABLE)?,
            created_at: row.get("created_at")?,
            updated_at: row.get("updated_at")?,
        })
    }

    fn insert_values(fields: &ProductFields) -> Vec<(&'static str, Value)> {
        vec![
            ("name", Value::Text(fields.name.clone())),
            ("price", Value::Real(fields.price)),
        ]
    }

    fn patch_values(patch: &ProductPatch) -> Vec<(&'static str, Value)> {
        let mut values = Vec::new();
        if let Some(name) = patch.name.as_deref() {
            values.push(("name", Value::Text(name.to_string())));
        }
        if let Some(price) = patch.price {
            values.push(("price", Value::Real(price)));
        }
        values
    }
}
