// Saved-bills dashboard: the last fetched history plus the admin delete flow.
use shared::BillRecord;

use crate::error::{EngineError, Result};
use crate::models::session::Session;
use crate::services::bill_store::BillStore;

#[derive(Debug, Clone)]
pub struct BillHistory {
    bills: Vec<BillRecord>,
    admin_pin: String,
}

impl BillHistory {
    pub fn new(admin_pin: impl Into<String>) -> Self {
        Self {
            bills: Vec::new(),
            admin_pin: admin_pin.into(),
        }
    }

    pub fn bills(&self) -> &[BillRecord] {
        &self.bills
    }

    pub fn is_empty(&self) -> bool {
        self.bills.is_empty()
    }

    pub fn find(&self, id: &str) -> Option<&BillRecord> {
        self.bills.iter().find(|bill| bill.id.as_deref() == Some(id))
    }

    /// Replaces the list with the store's contents. A failed fetch leaves the
    /// previous list in place.
    pub async fn refresh(&mut self, store: &dyn BillStore) -> Result<&[BillRecord]> {
        match store.list().await {
            Ok(bills) => {
                tracing::info!(count = bills.len(), "Bill history refreshed");
                self.bills = bills;
                Ok(&self.bills)
            }
            Err(e) => {
                tracing::error!(error = %e, "Could not load bill history");
                Err(e)
            }
        }
    }

    /// Deletes a saved bill. Only admins may delete, and only with the admin
    /// PIN; the local list changes only after the store confirms.
    pub async fn delete(&mut self, store: &dyn BillStore, session: &Session, id: &str, pin: &str) -> Result<BillRecord> {
        if !session.is_admin() {
            tracing::warn!(user = %session.username, id = %id, "Delete refused for non-admin");
            return Err(EngineError::Forbidden("delete bills".to_string()));
        }
        if pin != self.admin_pin {
            tracing::warn!(user = %session.username, id = %id, "Delete refused: wrong PIN");
            return Err(EngineError::PinMismatch);
        }
        let position = self
            .bills
            .iter()
            .position(|bill| bill.id.as_deref() == Some(id))
            .ok_or_else(|| EngineError::BillNotFound(id.to_string()))?;

        if let Err(e) = store.delete(id).await {
            tracing::error!(id = %id, error = %e, "Deleting bill failed; history unchanged");
            return Err(e);
        }
        let removed = self.bills.remove(position);
        tracing::info!(user = %session.username, id = %id, month = %removed.month, "Bill deleted");
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::memory_store::MemoryBillStore;
    use crate::models::session::Role;
    use async_trait::async_trait;
    use chrono::Utc;
    use rust_decimal::Decimal;

    struct UnreachableStore;

    #[async_trait]
    impl BillStore for UnreachableStore {
        async fn list(&self) -> Result<Vec<BillRecord>> {
            Err(EngineError::PersistenceError { status: 502, message: "Bad Gateway".to_string() })
        }

        async fn create(&self, _record: &BillRecord) -> Result<BillRecord> {
            Err(EngineError::PersistenceError { status: 502, message: "Bad Gateway".to_string() })
        }

        async fn delete(&self, _id: &str) -> Result<()> {
            Err(EngineError::PersistenceError { status: 502, message: "Bad Gateway".to_string() })
        }
    }

    fn sample_record(month: &str) -> BillRecord {
        BillRecord {
            id: None,
            month: month.to_string(),
            made_by: "Tonoy".to_string(),
            total_members: 3,
            total_bill: Decimal::from(90),
            bill_per_person: Decimal::from(30),
            issue_time: Utc::now(),
            bill_details: vec![],
        }
    }

    async fn seeded_store() -> (MemoryBillStore, Vec<String>) {
        let store = MemoryBillStore::new();
        let mut ids = Vec::new();
        for month in ["2026-08", "2026-09"] {
            ids.push(store.create(&sample_record(month)).await.unwrap().id.unwrap());
        }
        (store, ids)
    }

    fn admin() -> Session {
        Session::new("Tonoy", Role::Admin)
    }

    #[tokio::test]
    async fn test_refresh_loads_bills() {
        let (store, ids) = seeded_store().await;
        let mut history = BillHistory::new("4242");
        history.refresh(&store).await.unwrap();
        assert_eq!(history.bills().len(), 2);
        assert_eq!(history.find(&ids[1]).unwrap().month, "2026-09");
    }

    #[tokio::test]
    async fn test_failed_refresh_keeps_previous_list() {
        let (store, _) = seeded_store().await;
        let mut history = BillHistory::new("4242");
        history.refresh(&store).await.unwrap();
        let err = history.refresh(&UnreachableStore).await.unwrap_err();
        assert!(err.is_persistence_failure());
        assert_eq!(history.bills().len(), 2);
    }

    #[tokio::test]
    async fn test_admin_delete_with_pin() {
        let (store, ids) = seeded_store().await;
        let mut history = BillHistory::new("4242");
        history.refresh(&store).await.unwrap();

        let removed = history.delete(&store, &admin(), &ids[0], "4242").await.unwrap();
        assert_eq!(removed.month, "2026-08");
        assert_eq!(history.bills().len(), 1);
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn test_member_cannot_delete() {
        let (store, ids) = seeded_store().await;
        let mut history = BillHistory::new("4242");
        history.refresh(&store).await.unwrap();
        let member = Session::new("Rafi", Role::Member);
        let err = history.delete(&store, &member, &ids[0], "4242").await.unwrap_err();
        assert!(matches!(err, EngineError::Forbidden(_)));
        assert_eq!(store.len().await, 2);
    }

    #[tokio::test]
    async fn test_wrong_pin_aborts() {
        let (store, ids) = seeded_store().await;
        let mut history = BillHistory::new("4242");
        history.refresh(&store).await.unwrap();
        let err = history.delete(&store, &admin(), &ids[0], "0000").await.unwrap_err();
        assert!(matches!(err, EngineError::PinMismatch));
        assert_eq!(history.bills().len(), 2);
        assert_eq!(store.len().await, 2);
    }

    #[tokio::test]
    async fn test_unknown_id() {
        let (store, _) = seeded_store().await;
        let mut history = BillHistory::new("4242");
        history.refresh(&store).await.unwrap();
        let err = history.delete(&store, &admin(), "missing", "4242").await.unwrap_err();
        assert!(matches!(err, EngineError::BillNotFound(id) if id == "missing"));
    }

    #[tokio::test]
    async fn test_failed_delete_leaves_list_unchanged() {
        let (store, ids) = seeded_store().await;
        let mut history = BillHistory::new("4242");
        history.refresh(&store).await.unwrap();
        let err = history.delete(&UnreachableStore, &admin(), &ids[0], "4242").await.unwrap_err();
        assert!(err.is_persistence_failure());
        assert_eq!(history.bills().len(), 2);
    }
}
