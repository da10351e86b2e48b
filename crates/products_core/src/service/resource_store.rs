//! Paginated soft-delete resource store.
//!
//! # Responsibility
//! - Provide create/list/get/update/remove entry points for one resource type.
//! - Translate repository outcomes into caller-facing error classes.
//!
//! # Invariants
//! - `get_by_id` is the single existence check reused by `update` and `remove`.
//! - Update payloads never change identity; `id` is stripped before merge.
//! - Retired rows are invisible to every operation.

use crate::model::page::{Page, PageMeta, PageRequest};
use crate::model::resource::{Resource, ResourceId, ResourcePatch};
use crate::repo::resource_repo::{RepoError, ResourceRepository};
use log::debug;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type StoreResult<T> = Result<T, StoreError>;

/// Caller-facing error classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    BadRequest,
    NotFound,
    Internal,
}

/// Errors from resource store operations.
#[derive(Debug)]
pub enum StoreError {
    /// No active resource resolves to this id.
    NotFound { kind: &'static str, id: ResourceId },
    /// Request rejected before reaching storage.
    BadRequest(String),
    /// Persistence failure, propagated without retry.
    Backend(RepoError),
}

impl StoreError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::BadRequest(_) => ErrorKind::BadRequest,
            Self::Backend(_) => ErrorKind::Internal,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.kind() == ErrorKind::NotFound
    }

    fn not_found<T: Resource>(id: ResourceId) -> Self {
        Self::NotFound { kind: T::KIND, id }
    }

    fn from_repo<T: Resource>(err: RepoError) -> Self {
        match err {
            RepoError::NotFound(id) => Self::not_found::<T>(id),
            RepoError::Validation(field) => Self::BadRequest(field.to_string()),
            other => Self::Backend(other),
        }
    }
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotFound { kind, id } => write!(f, "{kind} with id #{id} not found"),
            Self::BadRequest(message) => write!(f, "{message}"),
            Self::Backend(err) => write!(f, "{err}"),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Backend(err) => Some(err),
            _ => None,
        }
    }
}

/// Soft-delete store over an injected repository.
pub struct ResourceStore<T, R> {
    repo: R,
    _resource: std::marker::PhantomData<fn() -> T>,
}

impl<T, R> ResourceStore<T, R>
where
    T: Resource,
    R: ResourceRepository<T>,
{
    pub fn new(repo: R) -> Self {
        Self {
            repo,
            _resource: std::marker::PhantomData,
        }
    }

    /// Inserts a new active resource and returns it as stored.
    pub fn create(&self, fields: &T::Fields) -> StoreResult<T> {
        let created = self.repo.insert(fields).map_err(StoreError::from_repo::<T>)?;
        debug!(
            "event=resource_create module=store status=ok kind={} id={}",
            T::KIND,
            created.id()
        );
        Ok(created)
    }

    /// Lists one page of active resources, ordered by id.
    ///
    /// # Errors
    /// - `BadRequest` when `page` or `limit` is zero.
    pub fn list(&self, request: PageRequest) -> StoreResult<Page<T>> {
        if request.page == 0 {
            return Err(StoreError::BadRequest(
                "page must be a positive integer".to_string(),
            ));
        }
        if request.limit == 0 {
            return Err(StoreError::BadRequest(
                "limit must be a positive integer".to_string(),
            ));
        }

        let slice = self
            .repo
            .page_active(request.limit, request.offset())
            .map_err(StoreError::from_repo::<T>)?;

        Ok(Page {
            meta: PageMeta::new(slice.total, request),
            data: slice.items,
        })
    }

    /// Gets one active resource.
    pub fn get_by_id(&self, id: ResourceId) -> StoreResult<T> {
        self.repo
            .find_active(id)
            .map_err(StoreError::from_repo::<T>)?
            .ok_or_else(|| StoreError::not_found::<T>(id))
    }

    /// Merges `patch` into an active resource; any `id` in the patch is ignored.
    pub fn update(&self, id: ResourceId, patch: T::Patch) -> StoreResult<T> {
        let patch = patch.without_id();
        self.get_by_id(id)?;

        let updated = self
            .repo
            .update_active(id, &patch)
            .map_err(StoreError::from_repo::<T>)?;
        debug!(
            "event=resource_update module=store status=ok kind={} id={id}",
            T::KIND
        );
        Ok(updated)
    }

    /// Retires an active resource and returns it with `Visibility::Retired`.
    pub fn remove(&self, id: ResourceId) -> StoreResult<T> {
        self.get_by_id(id)?;

        let retired = self.repo.retire(id).map_err(StoreError::from_repo::<T>)?;
        debug!(
            "event=resource_remove module=store status=ok kind={} id={id}",
            T::KIND
        );
        Ok(retired)
    }

    pub fn repository(&self) -> &R {
        &self.repo
    }
}

#[cfg(test)]
mod tests {
    use super::{ErrorKind, ResourceStore, StoreError};
    use crate::model::page::PageRequest;
    use crate::model::product::{Product, ProductFields, ProductPatch};
    use crate::model::resource::{Resource, ResourceId, Visibility};
    use crate::repo::resource_repo::{ActiveSlice, RepoError, RepoResult, ResourceRepository};
    use std::cell::{Cell, RefCell};
    use std::collections::BTreeMap;

    /// In-memory repository double. `retire_before_write` simulates a
    /// concurrent remove landing between the existence check and the write.
    #[derive(Default)]
    struct MemoryRepo {
        rows: RefCell<BTreeMap<ResourceId, Product>>,
        next_id: Cell<ResourceId>,
        retire_before_write: Cell<bool>,
    }

    impl MemoryRepo {
        fn race_next_write(&self) {
            self.retire_before_write.set(true);
        }

        fn apply_race(&self, id: ResourceId) {
            if self.retire_before_write.replace(false) {
                if let Some(row) = self.rows.borrow_mut().get_mut(&id) {
                    row.visibility = Visibility::Retired;
                }
            }
        }
    }

    impl ResourceRepository<Product> for MemoryRepo {
        fn insert(&self, fields: &ProductFields) -> RepoResult<Product> {
            Product::validate_fields(fields)?;
            let id = self.next_id.get() + 1;
            self.next_id.set(id);
            let product = Product {
                id,
                name: fields.name.clone(),
                price: fields.price,
                visibility: Visibility::Active,
                created_at: 0,
                updated_at: 0,
            };
            self.rows.borrow_mut().insert(id, product.clone());
            Ok(product)
        }

        fn page_active(&self, limit: u32, offset: u64) -> RepoResult<ActiveSlice<Product>> {
            let rows = self.rows.borrow();
            let active = rows.values().filter(|row| row.is_available());
            Ok(ActiveSlice {
                total: active.clone().count() as u64,
                items: active
                    .skip(offset as usize)
                    .take(limit as usize)
                    .cloned()
                    .collect(),
            })
        }

        fn find_active(&self, id: ResourceId) -> RepoResult<Option<Product>> {
            Ok(self
                .rows
                .borrow()
                .get(&id)
                .filter(|row| row.is_available())
                .cloned())
        }

        fn update_active(&self, id: ResourceId, patch: &ProductPatch) -> RepoResult<Product> {
            self.apply_race(id);
            let mut rows = self.rows.borrow_mut();
            let row = rows
                .get_mut(&id)
                .filter(|row| row.is_available())
                .ok_or(RepoError::NotFound(id))?;
            if let Some(name) = &patch.name {
                row.name = name.clone();
            }
            if let Some(price) = patch.price {
                row.price = price;
            }
            Ok(row.clone())
        }

        fn retire(&self, id: ResourceId) -> RepoResult<Product> {
            self.apply_race(id);
            let mut rows = self.rows.borrow_mut();
            let row = rows
                .get_mut(&id)
                .filter(|row| row.is_available())
                .ok_or(RepoError::NotFound(id))?;
            row.visibility = Visibility::Retired;
            Ok(row.clone())
        }
    }

    fn store() -> ResourceStore<Product, MemoryRepo> {
        ResourceStore::new(MemoryRepo::default())
    }

    #[test]
    fn not_found_message_names_kind_and_id() {
        let err = store().get_by_id(7).expect_err("get_by_id should fail");
        assert_eq!(err.kind(), ErrorKind::NotFound);
        assert_eq!(err.to_string(), "Product with id #7 not found");
    }

    #[test]
    fn list_rejects_zero_page_and_limit() {
        let store = store();
        let page_err = store.list(PageRequest::new(0, 10)).expect_err("list should fail");
        assert!(matches!(page_err, StoreError::BadRequest(_)));
        let limit_err = store.list(PageRequest::new(1, 0)).expect_err("list should fail");
        assert!(matches!(limit_err, StoreError::BadRequest(_)));
    }

    #[test]
    fn update_strips_identity_from_patch() {
        let store = store();
        let created = store
            .create(&ProductFields::new("Widget", 2.0))
            .expect("create should succeed");
        let other = store
            .create(&ProductFields::new("Gadget", 3.0))
            .expect("create should succeed");

        let patch = ProductPatch {
            id: Some(other.id),
            name: Some("x".to_string()),
            price: None,
        };
        let updated = store.update(created.id, patch).expect("update should succeed");

        assert_eq!(updated.id, created.id);
        assert_eq!(updated.name, "x");
        assert_eq!(store.get_by_id(other.id).expect("get_by_id should succeed").name, "Gadget");
    }

    #[test]
    fn update_racing_with_remove_reports_not_found() {
        let store = store();
        let created = store
            .create(&ProductFields::new("Widget", 2.0))
            .expect("create should succeed");

        store.repository().race_next_write();
        let err = store
            .update(
                created.id,
                ProductPatch {
                    name: Some("late".to_string()),
                    ..ProductPatch::default()
                },
            )
            .expect_err("update should fail");

        assert!(err.is_not_found());
        assert!(store.get_by_id(created.id).expect_err("get_by_id should fail").is_not_found());
    }

    #[test]
    fn remove_racing_with_remove_reports_not_found() {
        let store = store();
        let created = store
            .create(&ProductFields::new("Widget", 2.0))
            .expect("create should succeed");

        store.repository().race_next_write();
        assert!(store.remove(created.id).expect_err("remove should fail").is_not_found());
    }

    #[test]
    fn validation_failures_are_bad_requests() {
        let store = store();
        let err = store.create(&ProductFields::new("  ", 1.0)).expect_err("create should fail");
        assert_eq!(err.kind(), ErrorKind::BadRequest);
        assert!(err.to_string().contains("name"));
    }
}
