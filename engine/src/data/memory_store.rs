// In-process bill store with the same contract as the bills API.
use async_trait::async_trait;
use shared::BillRecord;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::error::Result;
use crate::services::bill_store::BillStore;

#[derive(Debug, Default)]
pub struct MemoryBillStore {
    bills: RwLock<Vec<BillRecord>>,
}

impl MemoryBillStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_bills(bills: Vec<BillRecord>) -> Self {
        Self {
            bills: RwLock::new(bills),
        }
    }

    pub async fn len(&self) -> usize {
        self.bills.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.bills.read().await.is_empty()
    }
}

#[async_trait]
impl BillStore for MemoryBillStore {
    async fn list(&self) -> Result<Vec<BillRecord>> {
        Ok(self.bills.read().await.clone())
    }

    async fn create(&self, record: &BillRecord) -> Result<BillRecord> {
        let mut stored = record.clone();
        stored.id = Some(Uuid::new_v4().to_string());
        self.bills.write().await.push(stored.clone());
        tracing::debug!(id = ?stored.id, month = %stored.month, "Bill stored in memory");
        Ok(stored)
    }

    async fn delete(&self, id: &str) -> Result<()> {
        let mut bills = self.bills.write().await;
        bills.retain(|bill| bill.id.as_deref() != Some(id));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use rust_decimal::Decimal;

    fn sample_record(month: &str) -> BillRecord {
        BillRecord {
            id: None,
            month: month.to_string(),
            made_by: "Tonoy".to_string(),
            total_members: 2,
            total_bill: Decimal::from(100),
            bill_per_person: Decimal::from(50),
            issue_time: Utc::now(),
            bill_details: vec![],
        }
    }

    #[tokio::test]
    async fn test_create_assigns_unique_ids() {
        let store = MemoryBillStore::new();
        let first = store.create(&sample_record("2026-09")).await.unwrap();
        let second = store.create(&sample_record("2026-10")).await.unwrap();
        assert!(first.id.is_some());
        assert_ne!(first.id, second.id);
        assert_eq!(store.list().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_delete_is_idempotent() {
        let store = MemoryBillStore::new();
        let stored = store.create(&sample_record("2026-10")).await.unwrap();
        let id = stored.id.unwrap();
        store.delete(&id).await.unwrap();
        store.delete(&id).await.unwrap();
        assert!(store.is_empty().await);
    }
}
