use crate::db::{DbPool, ItemRow};
use crate::error::{Result, StoreError};
use crate::item::StoredItem;
use crate::schema::{items, outfit_templates, template_items};
use crate::scoring::aggregate_score;
use chrono::Utc;
use diesel::prelude::*;
use serde::Serialize;
use tracing::debug;

#[derive(Queryable, Selectable, Debug, Clone, PartialEq, Serialize)]
#[diesel(table_name = outfit_templates)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct OutfitTemplate {
    pub id: i32,
    pub name: String,
    pub created_at: i64,
}

#[derive(Insertable, Debug)]
#[diesel(table_name = outfit_templates)]
struct NewTemplate<'a> {
    name: &'a str,
    created_at: i64,
}

#[derive(Insertable, Debug)]
#[diesel(table_name = template_items)]
struct NewTemplateItem {
    template_id: i32,
    item_id: i32,
}

/// Named, reusable groupings of stored items.
#[derive(Clone)]
pub struct TemplateStore {
    pool: DbPool,
}

impl TemplateStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    pub fn create(&self, name: &str, item_ids: &[i32]) -> Result<i32> {
        let name = name.trim();
        if name.is_empty() {
            return Err(StoreError::InvalidTemplate(
                "name must not be blank".into(),
            ));
        }

        let mut ids = item_ids.to_vec();
        ids.sort_unstable();
        ids.dedup();

        let mut conn = self.pool.get()?;
        let template_id = conn.transaction::<_, StoreError, _>(|conn| {
            let known: Vec<i32> = items::table
                .filter(items::id.eq_any(&ids))
                .select(items::id)
                .load(conn)?;
            if let Some(missing) = ids.iter().find(|id| !known.contains(*id)) {
                return Err(StoreError::NotFound {
                    kind: "item",
                    id: *missing,
                });
            }

            let template_id = diesel::insert_into(outfit_templates::table)
                .values(&NewTemplate {
                    name,
                    created_at: Utc::now().timestamp(),
                })
                .returning(outfit_templates::id)
                .get_result::<i32>(conn)?;

            let links: Vec<NewTemplateItem> = ids
                .iter()
                .map(|&item_id| NewTemplateItem {
                    template_id,
                    item_id,
                })
                .collect();
            if !links.is_empty() {
                diesel::insert_into(template_items::table)
                    .values(&links)
                    .execute(conn)?;
            }

            Ok(template_id)
        })?;
        debug!(template_id, items = ids.len(), "created outfit template");

        Ok(template_id)
    }

    pub fn list(&self) -> Result<Vec<OutfitTemplate>> {
        let mut conn = self.pool.get()?;
        let templates = outfit_templates::table
            .order(outfit_templates::id.asc())
            .select(OutfitTemplate::as_select())
            .load(&mut conn)?;
        Ok(templates)
    }

    pub fn items(&self, template_id: i32) -> Result<Vec<StoredItem>> {
        let mut conn = self.pool.get()?;
        let exists = outfit_templates::table
            .find(template_id)
            .select(outfit_templates::id)
            .first::<i32>(&mut conn)
            .optional()?
            .is_some();
        if !exists {
            return Err(StoreError::NotFound {
                kind: "template",
                id: template_id,
            });
        }

        let rows = template_items::table
            .inner_join(items::table)
            .filter(template_items::template_id.eq(template_id))
            .order(items::id.asc())
            .select(ItemRow::as_select())
            .load::<ItemRow>(&mut conn)?;
        rows.into_iter().map(StoredItem::try_from).collect()
    }

    pub fn delete(&self, template_id: i32) -> Result<bool> {
        let mut conn = self.pool.get()?;
        let deleted =
            diesel::delete(outfit_templates::table.find(template_id)).execute(&mut conn)?;
        Ok(deleted > 0)
    }

    /// Aggregate closet score restricted to the template's items.
    pub fn score(&self, template_id: i32) -> Result<u8> {
        let items = self.items(template_id)?;
        Ok(aggregate_score(items.iter().map(|stored| &stored.item)))
    }
}
