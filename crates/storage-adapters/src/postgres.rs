//! # PostgreSQL adapter
//!
//! Maps the relational model (`items`, `item_images`, `profiles`) onto the
//! domain models. Query descriptions are compiled with a [`QueryBuilder`];
//! every value is bound, never interpolated.

use std::collections::HashMap;

use async_trait::async_trait;
use domains::{
    AiRecommendation, DomainError, Item, ItemImage, ItemRepository, ItemRow, ItemStatus, NewItem, NewItemImage,
    Predicate, Profile, ProfileRepository, ProfileUpdate, QueryDescription, Result, SortDirective,
};
use sqlx::postgres::{PgPool, PgPoolOptions, PgRow};
use sqlx::{Postgres, QueryBuilder, Row};
use uuid::Uuid;

const ITEM_COLUMNS: &str = "i.id, i.title, i.description, i.price, i.brand, i.size, i.condition, \
     i.status, i.ai_recommendation, i.seller_id, i.created_at";

const RETURNING_ITEM: &str = "RETURNING id, title, description, price, brand, size, condition, \
     status, ai_recommendation, seller_id, created_at";

const PROFILE_COLUMNS: &str = "id, full_name, avatar_url, bio, contact, rating";

pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub async fn connect(database_url: &str, max_connections: u32) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await
            .map_err(store_err)?;
        Ok(Self { pool })
    }

    pub fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Applies the bundled schema migrations.
    pub async fn migrate(&self) -> Result<()> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|err| DomainError::Store(err.to_string()))
    }

    pub async fn check_ready(&self) -> Result<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await.map_err(store_err)?;
        Ok(())
    }

    /// Loads images for a set of items, grouped by item and kept in insertion order.
    async fn images_for(&self, item_ids: Vec<Uuid>) -> Result<HashMap<Uuid, Vec<ItemImage>>> {
        let mut grouped: HashMap<Uuid, Vec<ItemImage>> = HashMap::new();
        if item_ids.is_empty() {
            return Ok(grouped);
        }
        let rows = sqlx::query(
            "SELECT id, item_id, image_url, is_primary FROM item_images WHERE item_id = ANY($1) ORDER BY seq ASC",
        )
        .bind(item_ids)
        .fetch_all(&self.pool)
        .await
        .map_err(store_err)?;

        for row in rows {
            let image = image_from_row(&row)?;
            grouped.entry(image.item_id).or_default().push(image);
        }
        Ok(grouped)
    }

    async fn with_images(&self, rows: Vec<PgRow>) -> Result<Vec<ItemRow>> {
        let mut joined = Vec::with_capacity(rows.len());
        for row in &rows {
            let item = item_from_row(row)?;
            let seller_name: Option<String> = row.try_get("seller_name").map_err(store_err)?;
            joined.push((item, seller_name));
        }

        let mut images = self.images_for(joined.iter().map(|(item, _)| item.id).collect()).await?;
        Ok(joined
            .into_iter()
            .map(|(item, seller_name)| ItemRow {
                images: images.remove(&item.id).unwrap_or_default(),
                item,
                seller_name,
            })
            .collect())
    }
}

fn store_err(err: sqlx::Error) -> DomainError {
    DomainError::Store(err.to_string())
}

/// Base `SELECT` joined with the seller's display name.
fn select_items<'a>() -> QueryBuilder<'a, Postgres> {
    let mut qb = QueryBuilder::new("SELECT ");
    qb.push(ITEM_COLUMNS)
        .push(", p.full_name AS seller_name FROM items i LEFT JOIN profiles p ON p.id = i.seller_id");
    qb
}

fn push_predicates<'a>(qb: &mut QueryBuilder<'a, Postgres>, predicates: &[Predicate]) {
    for (index, predicate) in predicates.iter().enumerate() {
        qb.push(if index == 0 { " WHERE " } else { " AND " });
        match predicate {
            Predicate::StatusEq(status) => {
                qb.push("i.status = ").push_bind(status.as_str());
            }
            Predicate::BrandIn(brands) => {
                qb.push("i.brand = ANY(").push_bind(brands.clone()).push(")");
            }
            Predicate::PriceAtLeast(min) => {
                qb.push("i.price >= ").push_bind(*min);
            }
            Predicate::PriceAtMost(max) => {
                qb.push("i.price <= ").push_bind(*max);
            }
            Predicate::RecommendationIn(recs) => {
                let labels: Vec<String> = recs.iter().map(|r| r.as_str().to_string()).collect();
                qb.push("i.ai_recommendation = ANY(").push_bind(labels).push(")");
            }
            Predicate::SellerEq(seller_id) => {
                qb.push("i.seller_id = ").push_bind(*seller_id);
            }
            Predicate::TitleOrBrandContains(term) => {
                let pattern = format!("%{}%", escape_like(term));
                qb.push("(i.title ILIKE ")
                    .push_bind(pattern.clone())
                    .push(" OR i.brand ILIKE ")
                    .push_bind(pattern)
                    .push(")");
            }
        }
    }
}

fn order_by(sort: SortDirective) -> &'static str {
    match sort {
        SortDirective::Newest => " ORDER BY i.created_at DESC",
        SortDirective::PriceAscending => " ORDER BY i.price ASC",
        SortDirective::PriceDescending => " ORDER BY i.price DESC",
        SortDirective::RecommendationThenNewest => " ORDER BY i.ai_recommendation ASC NULLS LAST, i.created_at DESC",
    }
}

/// Escapes `ILIKE` wildcards so user input matches literally.
fn escape_like(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len());
    for c in term.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

fn item_from_row(row: &PgRow) -> Result<Item> {
    let status: String = row.try_get("status").map_err(store_err)?;
    let recommendation: Option<String> = row.try_get("ai_recommendation").map_err(store_err)?;
    Ok(Item {
        id: row.try_get("id").map_err(store_err)?,
        title: row.try_get("title").map_err(store_err)?,
        description: row.try_get("description").map_err(store_err)?,
        price: row.try_get("price").map_err(store_err)?,
        brand: row.try_get("brand").map_err(store_err)?,
        size: row.try_get("size").map_err(store_err)?,
        condition: row.try_get("condition").map_err(store_err)?,
        status: status.parse::<ItemStatus>().map_err(DomainError::Store)?,
        // Unknown legacy labels read as untagged rather than failing the row.
        ai_recommendation: recommendation.and_then(|label| label.parse::<AiRecommendation>().ok()),
        seller_id: row.try_get("seller_id").map_err(store_err)?,
        created_at: row.try_get("created_at").map_err(store_err)?,
    })
}

fn image_from_row(row: &PgRow) -> Result<ItemImage> {
    Ok(ItemImage {
        id: row.try_get("id").map_err(store_err)?,
        item_id: row.try_get("item_id").map_err(store_err)?,
        image_url: row.try_get("image_url").map_err(store_err)?,
        is_primary: row.try_get("is_primary").map_err(store_err)?,
    })
}

fn profile_from_row(row: &PgRow) -> Result<Profile> {
    Ok(Profile {
        id: row.try_get("id").map_err(store_err)?,
        full_name: row.try_get("full_name").map_err(store_err)?,
        avatar_url: row.try_get("avatar_url").map_err(store_err)?,
        bio: row.try_get("bio").map_err(store_err)?,
        contact: row.try_get("contact").map_err(store_err)?,
        rating: row.try_get("rating").map_err(store_err)?,
    })
}

#[async_trait]
impl ItemRepository for PgStore {
    async fn fetch(&self, query: &QueryDescription) -> Result<Vec<ItemRow>> {
        let mut qb = select_items();
        push_predicates(&mut qb, &query.predicates);
        qb.push(order_by(query.sort));
        if let Some(limit) = query.limit {
            qb.push(" LIMIT ").push_bind(limit as i64);
        }

        let rows = qb.build().fetch_all(&self.pool).await.map_err(store_err)?;
        self.with_images(rows).await
    }

    async fn count(&self, query: &QueryDescription) -> Result<u64> {
        let mut qb = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM items i");
        push_predicates(&mut qb, &query.predicates);
        let row = qb.build().fetch_one(&self.pool).await.map_err(store_err)?;
        let count: i64 = row.try_get(0).map_err(store_err)?;
        Ok(count.max(0) as u64)
    }

    async fn find(&self, id: Uuid) -> Result<Option<ItemRow>> {
        let mut qb = select_items();
        qb.push(" WHERE i.id = ").push_bind(id);
        let rows = qb.build().fetch_all(&self.pool).await.map_err(store_err)?;
        Ok(self.with_images(rows).await?.into_iter().next())
    }

    async fn create_item(&self, seller_id: Uuid, item: NewItem) -> Result<Item> {
        let sql = format!(
            "INSERT INTO items (id, title, description, price, brand, size, condition, status, ai_recommendation, seller_id) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, 'active', $8, $9) {RETURNING_ITEM}"
        );
        let row = sqlx::query(&sql)
            .bind(Uuid::new_v4())
            .bind(item.title)
            .bind(item.description)
            .bind(item.price)
            .bind(item.brand)
            .bind(item.size)
            .bind(item.condition)
            .bind(item.ai_recommendation.map(|r| r.as_str()))
            .bind(seller_id)
            .fetch_one(&self.pool)
            .await
            .map_err(store_err)?;
        item_from_row(&row)
    }

    /// Inserts all rows in one transaction so `seq` follows the given order.
    async fn add_images(&self, seller_id: Uuid, images: Vec<NewItemImage>) -> Result<Vec<ItemImage>> {
        let mut tx = self.pool.begin().await.map_err(store_err)?;
        let mut stored = Vec::with_capacity(images.len());
        for image in images {
            let item_id = image.item_id;
            let row = sqlx::query(
                "INSERT INTO item_images (id, item_id, image_url, is_primary) \
                 SELECT $1, $2, $3, $4 \
                 WHERE EXISTS (SELECT 1 FROM items WHERE id = $2 AND seller_id = $5) \
                 RETURNING id, item_id, image_url, is_primary",
            )
            .bind(Uuid::new_v4())
            .bind(item_id)
            .bind(image.image_url)
            .bind(image.is_primary)
            .bind(seller_id)
            .fetch_optional(&mut *tx)
            .await
            .map_err(store_err)?;
            // Dropping `tx` rolls back rows already inserted for this batch.
            let Some(row) = row else {
                return Err(DomainError::Forbidden(format!("item {item_id} does not belong to the caller")));
            };
            stored.push(image_from_row(&row)?);
        }
        tx.commit().await.map_err(store_err)?;
        Ok(stored)
    }

    async fn update_status(&self, id: Uuid, seller_id: Uuid, status: ItemStatus) -> Result<Option<Item>> {
        let sql = format!("UPDATE items SET status = $1 WHERE id = $2 AND seller_id = $3 {RETURNING_ITEM}");
        let row = sqlx::query(&sql)
            .bind(status.as_str())
            .bind(id)
            .bind(seller_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(store_err)?;
        row.as_ref().map(item_from_row).transpose()
    }

    async fn delete_item(&self, id: Uuid, seller_id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM items WHERE id = $1 AND seller_id = $2")
            .bind(id)
            .bind(seller_id)
            .execute(&self.pool)
            .await
            .map_err(store_err)?;
        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl ProfileRepository for PgStore {
    async fn get_profile(&self, id: Uuid) -> Result<Option<Profile>> {
        let sql = format!("SELECT {PROFILE_COLUMNS} FROM profiles WHERE id = $1");
        let row = sqlx::query(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(store_err)?;
        row.as_ref().map(profile_from_row).transpose()
    }

    async fn create_profile(&self, profile: Profile) -> Result<Profile> {
        sqlx::query(
            "INSERT INTO profiles (id, full_name, avatar_url, bio, contact, rating) \
             VALUES ($1, $2, $3, $4, $5, $6) ON CONFLICT (id) DO NOTHING",
        )
        .bind(profile.id)
        .bind(&profile.full_name)
        .bind(&profile.avatar_url)
        .bind(&profile.bio)
        .bind(&profile.contact)
        .bind(profile.rating)
        .execute(&self.pool)
        .await
        .map_err(store_err)?;

        self.get_profile(profile.id)
            .await?
            .ok_or_else(|| DomainError::not_found("Profile", profile.id))
    }

    async fn update_profile(&self, id: Uuid, update: ProfileUpdate) -> Result<Option<Profile>> {
        let sql = format!(
            "UPDATE profiles SET \
                full_name = COALESCE($2, full_name), \
                contact = COALESCE($3, contact), \
                avatar_url = COALESCE($4, avatar_url), \
                bio = COALESCE($5, bio) \
             WHERE id = $1 RETURNING {PROFILE_COLUMNS}"
        );
        let row = sqlx::query(&sql)
            .bind(id)
            .bind(update.full_name)
            .bind(update.contact)
            .bind(update.avatar_url)
            .bind(update.bio)
            .fetch_optional(&self.pool)
            .await
            .map_err(store_err)?;
        row.as_ref().map(profile_from_row).transpose()
    }
}
