// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use rusqlite::{Connection, OptionalExtension, Row, params};

use crate::error::Result;
use crate::models::{Category, CategoryType};

/// Categories the engine creates on demand to tag postings it makes itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AutoCategory {
    Transfer,
    Debt,
    Loan,
}

impl AutoCategory {
    pub fn name(&self) -> &'static str {
        match self {
            AutoCategory::Transfer => "Transfer",
            AutoCategory::Debt => "Debt",
            AutoCategory::Loan => "Loan",
        }
    }

    fn icon(&self) -> &'static str {
        match self {
            AutoCategory::Transfer => "swap-horizontal",
            AutoCategory::Debt => "handshake",
            AutoCategory::Loan => "bank",
        }
    }
}

fn auto_color(typ: CategoryType) -> &'static str {
    match typ {
        CategoryType::Income => "#4CAF50",
        CategoryType::Expense => "#F44336",
    }
}

pub(crate) fn map_category(r: &Row) -> rusqlite::Result<Category> {
    Ok(Category {
        id: r.get(0)?,
        name: r.get(1)?,
        r#type: r.get(2)?,
        color: r.get(3)?,
        icon: r.get(4)?,
    })
}

pub fn get_categories(conn: &Connection, typ: Option<CategoryType>) -> Result<Vec<Category>> {
    let mut stmt = conn.prepare(
        "SELECT id, name, type, color, icon FROM categories
         WHERE ?1 IS NULL OR type=?1
         ORDER BY name, id",
    )?;
    let rows = stmt.query_map(params![typ], map_category)?;
    Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
}

pub fn get_category(conn: &Connection, id: i64) -> Result<Option<Category>> {
    let cat = conn
        .query_row(
            "SELECT id, name, type, color, icon FROM categories WHERE id=?1",
            params![id],
            map_category,
        )
        .optional()?;
    Ok(cat)
}

pub(crate) fn category_type(conn: &Connection, id: i64) -> Result<Option<CategoryType>> {
    let typ = conn
        .query_row(
            "SELECT type FROM categories WHERE id=?1",
            params![id],
            |r| r.get(0),
        )
        .optional()?;
    Ok(typ)
}

pub fn add_category(
    conn: &Connection,
    name: &str,
    typ: CategoryType,
    color: Option<&str>,
    icon: Option<&str>,
) -> Result<i64> {
    conn.execute(
        "INSERT INTO categories(name, type, color, icon) VALUES (?1, ?2, ?3, ?4)",
        params![name, typ, color, icon],
    )?;
    let id = conn.last_insert_rowid();
    tracing::info!(id, name, %typ, "category added");
    Ok(id)
}

pub fn update_category(
    conn: &Connection,
    id: i64,
    name: &str,
    typ: CategoryType,
    color: Option<&str>,
    icon: Option<&str>,
) -> Result<()> {
    conn.execute(
        "UPDATE categories SET name=?1, type=?2, color=?3, icon=?4 WHERE id=?5",
        params![name, typ, color, icon, id],
    )?;
    tracing::info!(id, "category updated");
    Ok(())
}

pub fn delete_category(conn: &Connection, id: i64) -> Result<()> {
    conn.execute("DELETE FROM categories WHERE id=?1", params![id])?;
    tracing::info!(id, "category deleted");
    Ok(())
}

/// Find the auto-category of this name and type, creating it if absent.
///
/// Returns `None` when no id could be produced; callers post with no
/// category rather than aborting.
pub(crate) fn get_or_create_auto(
    conn: &Connection,
    auto: AutoCategory,
    typ: CategoryType,
) -> Result<Option<i64>> {
    let lookup = |conn: &Connection| -> rusqlite::Result<Option<i64>> {
        conn.query_row(
            "SELECT id FROM categories WHERE name=?1 AND type=?2 ORDER BY id LIMIT 1",
            params![auto.name(), typ],
            |r| r.get(0),
        )
        .optional()
    };

    if let Some(id) = lookup(conn)? {
        return Ok(Some(id));
    }
    conn.execute(
        "INSERT INTO categories(name, type, color, icon) VALUES (?1, ?2, ?3, ?4)",
        params![auto.name(), typ, auto_color(typ), auto.icon()],
    )?;
    let id = lookup(conn)?;
    match id {
        Some(id) => tracing::info!(id, name = auto.name(), %typ, "auto-category created"),
        None => tracing::warn!(name = auto.name(), %typ, "auto-category has no id"),
    }
    Ok(id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::open_in_memory;

    #[test]
    fn filter_by_type() {
        let conn = open_in_memory().unwrap();
        let income = get_categories(&conn, Some(CategoryType::Income)).unwrap();
        assert!(income.iter().all(|c| c.r#type == CategoryType::Income));
        assert_eq!(
            income.iter().map(|c| c.name.as_str()).collect::<Vec<_>>(),
            ["Freelance", "Salary"]
        );
        let all = get_categories(&conn, None).unwrap();
        assert_eq!(all.len(), 8);
    }

    #[test]
    fn auto_category_is_created_once_per_type() {
        let conn = open_in_memory().unwrap();
        let a = get_or_create_auto(&conn, AutoCategory::Debt, CategoryType::Income).unwrap();
        let b = get_or_create_auto(&conn, AutoCategory::Debt, CategoryType::Income).unwrap();
        let c = get_or_create_auto(&conn, AutoCategory::Debt, CategoryType::Expense).unwrap();
        assert_eq!(a, b);
        assert_ne!(a, c);
        let n: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM categories WHERE name='Debt'",
                [],
                |r| r.get(0),
            )
            .unwrap();
        assert_eq!(n, 2);
    }

    #[test]
    fn crud_round() {
        let conn = open_in_memory().unwrap();
        let id = add_category(&conn, "Pets", CategoryType::Expense, Some("#123456"), Some("paw"))
            .unwrap();
        update_category(&conn, id, "Pet care", CategoryType::Expense, None, None).unwrap();
        let cat = get_category(&conn, id).unwrap().unwrap();
        assert_eq!(cat.name, "Pet care");
        assert_eq!(cat.color, None);
        delete_category(&conn, id).unwrap();
        assert!(get_category(&conn, id).unwrap().is_none());
    }
}
