// In-memory reading store
use crate::application::reading_store::{latest_window, newest_first, ReadingStore, StoreResult};
use crate::domain::reading::{Reading, ReadingId};
use async_trait::async_trait;
use tokio::sync::RwLock;

#[derive(Debug, Default)]
struct Entries {
    next_sequence: u64,
    readings: Vec<(u64, Reading)>,
}

#[derive(Debug, Default)]
pub struct InMemoryReadingStore {
    entries: RwLock<Entries>,
}

impl InMemoryReadingStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ReadingStore for InMemoryReadingStore {
    async fn append(&self, reading: Reading) -> StoreResult<()> {
        let mut entries = self.entries.write().await;
        let sequence = entries.next_sequence;
        entries.next_sequence += 1;
        entries.readings.push((sequence, reading));
        Ok(())
    }

    async fn latest(&self, n: usize) -> StoreResult<Vec<Reading>> {
        let entries = self.entries.read().await;
        Ok(latest_window(entries.readings.clone(), n))
    }

    async fn all(&self) -> StoreResult<Vec<Reading>> {
        let entries = self.entries.read().await;
        Ok(newest_first(entries.readings.clone()))
    }

    async fn delete_one(&self, id: &ReadingId) -> StoreResult<bool> {
        let mut entries = self.entries.write().await;
        let before = entries.readings.len();
        entries.readings.retain(|(_, reading)| &reading.id != id);
        Ok(entries.readings.len() != before)
    }

    async fn delete_all(&self) -> StoreResult<usize> {
        let mut entries = self.entries.write().await;
        let removed = entries.readings.len();
        entries.readings.clear();
        Ok(removed)
    }

    async fn len(&self) -> StoreResult<usize> {
        Ok(self.entries.read().await.readings.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::reading::Metrics;
    use chrono::{DateTime, Duration, Utc};

    fn reading(timestamp: DateTime<Utc>, battery_level: f64) -> Reading {
        Reading::new(
            timestamp,
            Metrics {
                battery_level,
                current_power_usage: 52.0,
                cutting_blade_rpm: 3100,
                speed: 0.8,
                grass_height: 5.5,
                area_covered: 1.0,
                proximity_front: 1.5,
                proximity_rear: 1.5,
                obstacle_detected: false,
                error_state: None,
            },
        )
    }

    #[tokio::test]
    async fn test_latest_is_most_recent_window_not_oldest() {
        let store = InMemoryReadingStore::new();
        let start = Utc::now();
        for i in 0..200 {
            store
                .append(reading(start + Duration::seconds(i), i as f64))
                .await
                .unwrap();
        }

        let window = store.latest(50).await.unwrap();
        assert_eq!(window.len(), 50);
        assert_eq!(window.first().unwrap().metrics.battery_level, 150.0);
        assert_eq!(window.last().unwrap().metrics.battery_level, 199.0);
        assert!(window.windows(2).all(|w| w[0].timestamp <= w[1].timestamp));
    }

    #[tokio::test]
    async fn test_equal_timestamps_fall_back_to_append_order() {
        let store = InMemoryReadingStore::new();
        let at = Utc::now();
        for i in 0..5 {
            store.append(reading(at, i as f64)).await.unwrap();
        }

        let window: Vec<f64> = store
            .latest(3)
            .await
            .unwrap()
            .iter()
            .map(|r| r.metrics.battery_level)
            .collect();
        assert_eq!(window, vec![2.0, 3.0, 4.0]);

        let history: Vec<f64> = store
            .all()
            .await
            .unwrap()
            .iter()
            .map(|r| r.metrics.battery_level)
            .collect();
        assert_eq!(history, vec![4.0, 3.0, 2.0, 1.0, 0.0]);
    }

    #[tokio::test]
    async fn test_latest_with_fewer_readings_than_window() {
        let store = InMemoryReadingStore::new();
        assert!(store.latest(50).await.unwrap().is_empty());

        store.append(reading(Utc::now(), 10.0)).await.unwrap();
        assert_eq!(store.latest(50).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_delete_semantics() {
        let store = InMemoryReadingStore::new();
        let first = reading(Utc::now(), 1.0);
        let id = first.id.clone();
        store.append(first).await.unwrap();
        store.append(reading(Utc::now(), 2.0)).await.unwrap();

        assert!(store.delete_one(&id).await.unwrap());
        assert!(!store.delete_one(&id).await.unwrap());
        assert_eq!(store.len().await.unwrap(), 1);

        assert_eq!(store.delete_all().await.unwrap(), 1);
        assert_eq!(store.delete_all().await.unwrap(), 0);
    }
}
