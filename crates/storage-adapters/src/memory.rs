//! # In-memory adapters
//!
//! Process-local implementations of the repository and media ports. Used
//! by tests and by the binary when no database is configured. Query
//! descriptions are evaluated with the same predicate semantics the SQL
//! adapter compiles to.

use std::cmp::Ordering;
use std::sync::atomic::{AtomicBool, Ordering as AtomicOrdering};

use async_trait::async_trait;
use bytes::Bytes;
use chrono::Utc;
use dashmap::DashMap;
use domains::{
    DomainError, Item, ItemImage, ItemRepository, ItemRow, ItemStatus, MediaStorage, NewItem, NewItemImage, Profile,
    ProfileRepository, ProfileUpdate, QueryDescription, Result, SortDirective,
};
use tokio::sync::RwLock;
use uuid::Uuid;

#[derive(Default)]
pub struct InMemoryStore {
    /// Insertion order; sorting happens per query.
    items: RwLock<Vec<Item>>,
    /// Stored order, which is what cover selection relies on.
    images: RwLock<Vec<ItemImage>>,
    profiles: DashMap<Uuid, Profile>,
    unavailable: AtomicBool,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every subsequent call fail with a store error, or recover.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, AtomicOrdering::SeqCst);
    }

    pub async fn insert_item(&self, item: Item) {
        self.items.write().await.push(item);
    }

    pub async fn insert_image(&self, image: ItemImage) {
        self.images.write().await.push(image);
    }

    pub fn insert_profile(&self, profile: Profile) {
        self.profiles.insert(profile.id, profile);
    }

    fn check(&self) -> Result<()> {
        if self.unavailable.load(AtomicOrdering::SeqCst) {
            return Err(DomainError::Store("in-memory store marked unavailable".to_string()));
        }
        Ok(())
    }

    async fn join(&self, item: Item) -> ItemRow {
        let images = self
            .images
            .read()
            .await
            .iter()
            .filter(|image| image.item_id == item.id)
            .cloned()
            .collect();
        let seller_name = self
            .profiles
            .get(&item.seller_id)
            .and_then(|profile| profile.full_name.clone());
        ItemRow { item, seller_name, images }
    }
}

/// Mirrors the `ORDER BY` clauses the SQL adapter emits.
fn compare(sort: SortDirective, a: &Item, b: &Item) -> Ordering {
    match sort {
        SortDirective::Newest => b.created_at.cmp(&a.created_at),
        SortDirective::PriceAscending => a.price.total_cmp(&b.price),
        SortDirective::PriceDescending => b.price.total_cmp(&a.price),
        SortDirective::RecommendationThenNewest => {
            let by_rec = match (a.ai_recommendation, b.ai_recommendation) {
                (Some(x), Some(y)) => x.cmp(&y),
                (Some(_), None) => Ordering::Less,
                (None, Some(_)) => Ordering::Greater,
                (None, None) => Ordering::Equal,
            };
            by_rec.then_with(|| b.created_at.cmp(&a.created_at))
        }
    }
}

#[async_trait]
impl ItemRepository for InMemoryStore {
    async fn fetch(&self, query: &QueryDescription) -> Result<Vec<ItemRow>> {
        self.check()?;
        let mut matched: Vec<Item> = self
            .items
            .read()
            .await
            .iter()
            .filter(|item| query.matches(item))
            .cloned()
            .collect();
        matched.sort_by(|a, b| compare(query.sort, a, b));
        if let Some(limit) = query.limit {
            matched.truncate(limit);
        }

        let mut rows = Vec::with_capacity(matched.len());
        for item in matched {
            rows.push(self.join(item).await);
        }
        Ok(rows)
    }

    async fn count(&self, query: &QueryDescription) -> Result<u64> {
        self.check()?;
        let items = self.items.read().await;
        Ok(items.iter().filter(|item| query.matches(item)).count() as u64)
    }

    async fn find(&self, id: Uuid) -> Result<Option<ItemRow>> {
        self.check()?;
        let item = self.items.read().await.iter().find(|item| item.id == id).cloned();
        match item {
            Some(item) => Ok(Some(self.join(item).await)),
            None => Ok(None),
        }
    }

    async fn create_item(&self, seller_id: Uuid, new: NewItem) -> Result<Item> {
        self.check()?;
        let item = Item {
            id: Uuid::new_v4(),
            title: new.title,
            description: new.description,
            price: new.price,
            brand: new.brand,
            size: new.size,
            condition: new.condition,
            status: ItemStatus::Active,
            ai_recommendation: new.ai_recommendation,
            seller_id,
            created_at: Utc::now(),
        };
        self.items.write().await.push(item.clone());
        Ok(item)
    }

    async fn add_images(&self, seller_id: Uuid, images: Vec<NewItemImage>) -> Result<Vec<ItemImage>> {
        self.check()?;
        {
            let items = self.items.read().await;
            let foreign = images
                .iter()
                .find(|image| !items.iter().any(|item| item.id == image.item_id && item.seller_id == seller_id));
            if let Some(image) = foreign {
                return Err(DomainError::Forbidden(format!("item {} does not belong to the caller", image.item_id)));
            }
        }
        let stored: Vec<ItemImage> = images
            .into_iter()
            .map(|new| ItemImage {
                id: Uuid::new_v4(),
                item_id: new.item_id,
                image_url: new.image_url,
                is_primary: new.is_primary,
            })
            .collect();
        self.images.write().await.extend(stored.iter().cloned());
        Ok(stored)
    }

    async fn update_status(&self, id: Uuid, seller_id: Uuid, status: ItemStatus) -> Result<Option<Item>> {
        self.check()?;
        let mut items = self.items.write().await;
        Ok(items
            .iter_mut()
            .find(|item| item.id == id && item.seller_id == seller_id)
            .map(|item| {
                item.status = status;
                item.clone()
            }))
    }

    async fn delete_item(&self, id: Uuid, seller_id: Uuid) -> Result<bool> {
        self.check()?;
        let mut items = self.items.write().await;
        let before = items.len();
        items.retain(|item| !(item.id == id && item.seller_id == seller_id));
        if items.len() == before {
            return Ok(false);
        }
        self.images.write().await.retain(|image| image.item_id != id);
        Ok(true)
    }
}

#[async_trait]
impl ProfileRepository for InMemoryStore {
    async fn get_profile(&self, id: Uuid) -> Result<Option<Profile>> {
        self.check()?;
        Ok(self.profiles.get(&id).map(|p| p.clone()))
    }

    async fn create_profile(&self, profile: Profile) -> Result<Profile> {
        self.check()?;
        Ok(self.profiles.entry(profile.id).or_insert(profile).clone())
    }

    async fn update_profile(&self, id: Uuid, update: ProfileUpdate) -> Result<Option<Profile>> {
        self.check()?;
        Ok(self.profiles.get_mut(&id).map(|mut profile| {
            update.apply_to(&mut profile);
            profile.clone()
        }))
    }
}

/// Blob store that keeps uploads in a map keyed by path.
pub struct InMemoryMediaStorage {
    url_prefix: String,
    objects: DashMap<String, (Bytes, String)>,
    failing: AtomicBool,
}

impl InMemoryMediaStorage {
    pub fn new(url_prefix: impl Into<String>) -> Self {
        Self {
            url_prefix: url_prefix.into().trim_end_matches('/').to_string(),
            objects: DashMap::new(),
            failing: AtomicBool::new(false),
        }
    }

    /// Makes every subsequent upload fail.
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, AtomicOrdering::SeqCst);
    }

    pub fn get(&self, path: &str) -> Option<(Bytes, String)> {
        self.objects.get(path).map(|entry| entry.value().clone())
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }
}

#[async_trait]
impl MediaStorage for InMemoryMediaStorage {
    async fn upload(&self, path: &str, data: Bytes, content_type: &str) -> Result<String> {
        if self.failing.load(AtomicOrdering::SeqCst) {
            return Err(DomainError::Upload(format!("rejected {path}")));
        }
        self.objects.insert(path.to_string(), (data, content_type.to_string()));
        Ok(format!("{}/{}", self.url_prefix, path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use domains::{AiRecommendation, Predicate};

    fn item(title: &str, brand: &str, price: f64, rec: Option<AiRecommendation>, age_minutes: i64) -> Item {
        Item {
            id: Uuid::new_v4(),
            title: title.into(),
            description: String::new(),
            price,
            brand: Some(brand.into()),
            size: None,
            condition: None,
            status: ItemStatus::Active,
            ai_recommendation: rec,
            seller_id: Uuid::nil(),
            created_at: Utc::now() - Duration::minutes(age_minutes),
        }
    }

    #[tokio::test]
    async fn recommendation_sort_puts_untagged_last() {
        let store = InMemoryStore::new();
        store.insert_item(item("untagged", "Nike", 10.0, None, 0)).await;
        store.insert_item(item("std", "Nike", 10.0, Some(AiRecommendation::Standard), 1)).await;
        store.insert_item(item("hold", "Nike", 10.0, Some(AiRecommendation::Hold), 2)).await;
        store.insert_item(item("fast old", "Nike", 10.0, Some(AiRecommendation::FastSell), 5)).await;
        store.insert_item(item("fast new", "Nike", 10.0, Some(AiRecommendation::FastSell), 3)).await;

        let rows = store
            .fetch(&QueryDescription::new(SortDirective::RecommendationThenNewest))
            .await
            .unwrap();
        let titles: Vec<_> = rows.iter().map(|r| r.item.title.as_str()).collect();
        assert_eq!(titles, vec!["fast new", "fast old", "hold", "std", "untagged"]);
    }

    #[tokio::test]
    async fn fetch_filters_sorts_and_caps() {
        let store = InMemoryStore::new();
        store.insert_item(item("a", "Nike", 300.0, None, 0)).await;
        store.insert_item(item("b", "Bape", 100.0, None, 1)).await;
        store.insert_item(item("c", "Nike", 200.0, None, 2)).await;
        store.insert_item(item("d", "Nike", 50.0, None, 3)).await;

        let query = QueryDescription::new(SortDirective::PriceAscending)
            .with(Predicate::BrandIn(vec!["Nike".into()]))
            .limit(2);
        let prices: Vec<_> = store.fetch(&query).await.unwrap().iter().map(|r| r.item.price).collect();
        assert_eq!(prices, vec![50.0, 200.0]);
        assert_eq!(store.count(&query).await.unwrap(), 3);
    }

    #[tokio::test]
    async fn rows_carry_seller_name_and_ordered_images() {
        let store = InMemoryStore::new();
        let seller = Uuid::new_v4();
        store.insert_profile(Profile { full_name: Some("sneakerhead".into()), ..Profile::blank(seller) });
        let mut listing = item("Dunk Low", "Nike", 120.0, None, 0);
        listing.seller_id = seller;
        let id = listing.id;
        store.insert_item(listing).await;
        store
            .add_images(seller, vec![
                NewItemImage { item_id: id, image_url: "/a".into(), is_primary: false },
                NewItemImage { item_id: id, image_url: "/b".into(), is_primary: true },
            ])
            .await
            .unwrap();

        let row = store.find(id).await.unwrap().unwrap();
        assert_eq!(row.seller_name.as_deref(), Some("sneakerhead"));
        let urls: Vec<_> = row.images.iter().map(|i| i.image_url.as_str()).collect();
        assert_eq!(urls, vec!["/a", "/b"]);
    }

    #[tokio::test]
    async fn mutations_are_scoped_to_the_seller() {
        let store = InMemoryStore::new();
        let owner = Uuid::new_v4();
        let created = store
            .create_item(
                owner,
                NewItem {
                    title: "Tee".into(),
                    description: String::new(),
                    price: 40.0,
                    brand: None,
                    size: None,
                    condition: None,
                    ai_recommendation: None,
                },
            )
            .await
            .unwrap();
        assert_eq!(created.status, ItemStatus::Active);

        let stranger = Uuid::new_v4();
        assert!(store.update_status(created.id, stranger, ItemStatus::Sold).await.unwrap().is_none());
        assert!(!store.delete_item(created.id, stranger).await.unwrap());
        let image = NewItemImage { item_id: created.id, image_url: "/x".into(), is_primary: true };
        assert!(matches!(
            store.add_images(stranger, vec![image.clone()]).await,
            Err(DomainError::Forbidden(_))
        ));
        assert!(store.find(created.id).await.unwrap().unwrap().images.is_empty());
        assert_eq!(store.add_images(owner, vec![image]).await.unwrap().len(), 1);

        let sold = store.update_status(created.id, owner, ItemStatus::Sold).await.unwrap().unwrap();
        assert_eq!(sold.status, ItemStatus::Sold);
        assert!(store.delete_item(created.id, owner).await.unwrap());
        assert!(store.find(created.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn create_profile_keeps_existing_row() {
        let store = InMemoryStore::new();
        let id = Uuid::new_v4();
        store.insert_profile(Profile { full_name: Some("kept".into()), ..Profile::blank(id) });

        let profile = store.create_profile(Profile::blank(id)).await.unwrap();
        assert_eq!(profile.full_name.as_deref(), Some("kept"));
    }

    #[tokio::test]
    async fn outage_fails_every_call() {
        let store = InMemoryStore::new();
        store.set_unavailable(true);
        assert!(matches!(store.fetch(&QueryDescription::default()).await, Err(DomainError::Store(_))));
        assert!(matches!(store.get_profile(Uuid::nil()).await, Err(DomainError::Store(_))));
        store.set_unavailable(false);
        assert!(store.fetch(&QueryDescription::default()).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn media_overwrites_same_path() {
        let media = InMemoryMediaStorage::new("/media/");
        let url = media.upload("avatars/x.png", Bytes::from_static(b"one"), "image/png").await.unwrap();
        media.upload("avatars/x.png", Bytes::from_static(b"two"), "image/png").await.unwrap();

        assert_eq!(url, "/media/avatars/x.png");
        assert_eq!(media.len(), 1);
        assert_eq!(media.get("avatars/x.png").unwrap().0, Bytes::from_static(b"two"));

        media.set_failing(true);
        assert!(matches!(
            media.upload("a", Bytes::new(), "image/png").await,
            Err(DomainError::Upload(_))
        ));
    }
}
