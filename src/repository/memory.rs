//! In-memory repository for tests. Transactions stage a copy of the tables and swap it in on commit.

use super::{Load, ProductRepository, ProductTransaction};
use crate::error::{AppError, ValidationErrors};
use crate::models::{Category, Product, ProductAttributes};
use crate::pagination::PageRequest;
use crate::service::INVALID_CATEGORY;
use async_trait::async_trait;
use chrono::{DateTime, Duration, TimeZone, Utc};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

#[derive(Clone, Default)]
struct Tables {
    categories: Vec<Category>,
    products: Vec<Product>,
    next_product_id: i64,
    ticks: i64,
}

impl Tables {
    /// Strictly increasing timestamps so ordering by creation time is deterministic.
    fn now(&mut self) -> DateTime<Utc> {
        self.ticks += 1;
        Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap() + Duration::seconds(self.ticks)
    }

    fn with_category(&self, product: &Product) -> Product {
        let mut product = product.clone();
        product.category = self
            .categories
            .iter()
            .find(|c| c.id == product.category_id)
            .cloned();
        product
    }
}

#[derive(Clone, Default)]
pub struct MemoryRepository {
    tables: Arc<Mutex<Tables>>,
    fail_writes: Arc<AtomicBool>,
    fail_reads: Arc<AtomicBool>,
}

impl MemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_category(&self, name: &str) -> Category {
        let mut tables = self.tables.lock().unwrap();
        let now = tables.now();
        let category = Category {
            id: tables.categories.iter().map(|c| c.id).max().unwrap_or(0) + 1,
            name: name.to_string(),
            created_at: now,
            updated_at: now,
        };
        tables.categories.push(category.clone());
        category
    }

    pub fn remove_category(&self, id: i64) {
        self.tables.lock().unwrap().categories.retain(|c| c.id != id);
    }

    pub fn product_count(&self) -> usize {
        self.tables.lock().unwrap().products.len()
    }

    /// Every write inside a transaction stages its change and then fails.
    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    pub fn fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    fn check_reads(&self) -> Result<(), AppError> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(AppError::Store("connection reset".into()));
        }
        Ok(())
    }
}

#[async_trait]
impl ProductRepository for MemoryRepository {
    async fn list(&self, page: PageRequest) -> Result<(Vec<Product>, u64), AppError> {
        self.check_reads()?;
        let tables = self.tables.lock().unwrap();
        let mut products: Vec<&Product> = tables.products.iter().collect();
        products.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        let total = products.len() as u64;
        let items = products
            .into_iter()
            .skip(usize::try_from(page.offset()).unwrap_or(usize::MAX))
            .take(page.per_page as usize)
            .map(|p| tables.with_category(p))
            .collect();
        Ok((items, total))
    }

    async fn find(&self, id: i64, load: Load) -> Result<Option<Product>, AppError> {
        self.check_reads()?;
        let tables = self.tables.lock().unwrap();
        Ok(tables.products.iter().find(|p| p.id == id).map(|p| match load {
            Load::Bare => p.clone(),
            Load::WithCategory => tables.with_category(p),
        }))
    }

    async fn category_exists(&self, id: i64) -> Result<bool, AppError> {
        self.check_reads()?;
        Ok(self.tables.lock().unwrap().categories.iter().any(|c| c.id == id))
    }

    async fn begin(&self) -> Result<Box<dyn ProductTransaction>, AppError> {
        let staged = self.tables.lock().unwrap().clone();
        Ok(Box::new(MemoryTransaction {
            shared: Arc::clone(&self.tables),
            staged,
            fail_writes: self.fail_writes.load(Ordering::SeqCst),
        }))
    }

    async fn ping(&self) -> Result<(), AppError> {
        self.check_reads()
    }
}

struct MemoryTransaction {
    shared: Arc<Mutex<Tables>>,
    staged: Tables,
    fail_writes: bool,
}

impl MemoryTransaction {
    fn check_category(&self, id: i64) -> Result<(), AppError> {
        if self.staged.categories.iter().any(|c| c.id == id) {
            Ok(())
        } else {
            Err(AppError::Validation(ValidationErrors::single("category_id", INVALID_CATEGORY)))
        }
    }

    fn after_write(&self) -> Result<(), AppError> {
        if self.fail_writes {
            return Err(AppError::Store("write failed".into()));
        }
        Ok(())
    }
}

#[async_trait]
impl ProductTransaction for MemoryTransaction {
    async fn insert(&mut self, attrs: &ProductAttributes) -> Result<i64, AppError> {
        self.check_category(attrs.category_id)?;
        self.staged.next_product_id += 1;
        let id = self.staged.next_product_id;
        let now = self.staged.now();
        self.staged.products.push(Product {
            id,
            name: attrs.name.clone(),
            description: attrs.description.clone(),
            price: attrs.price,
            category_id: attrs.category_id,
            image_url: attrs.image_url.clone(),
            created_at: now,
            updated_at: now,
            category: None,
        });
        self.after_write()?;
        Ok(id)
    }

    async fn update(&mut self, id: i64, attrs: &ProductAttributes) -> Result<bool, AppError> {
        self.check_category(attrs.category_id)?;
        let now = self.staged.now();
        let Some(product) = self.staged.products.iter_mut().find(|p| p.id == id) else {
            return Ok(false);
        };
        product.name = attrs.name.clone();
        product.description = attrs.description.clone();
        product.price = attrs.price;
        product.category_id = attrs.category_id;
        product.image_url = attrs.image_url.clone();
        product.updated_at = now;
        self.after_write()?;
        Ok(true)
    }

    async fn delete(&mut self, id: i64) -> Result<bool, AppError> {
        let before = self.staged.products.len();
        self.staged.products.retain(|p| p.id != id);
        let removed = self.staged.products.len() < before;
        self.after_write()?;
        Ok(removed)
    }

    async fn commit(self: Box<Self>) -> Result<(), AppError> {
        let MemoryTransaction { shared, staged, .. } = *self;
        *shared.lock().unwrap() = staged;
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> Result<(), AppError> {
        Ok(())
    }
}
