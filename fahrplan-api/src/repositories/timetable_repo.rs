use std::sync::atomic::{AtomicU64, Ordering};

use fahrplan_core::{Timetable, TimetableEntry};
use tokio::sync::RwLock;

use super::repo_error::RepositoryError;

pub trait TimetableRepository {
    async fn get_timetables(&self) -> Result<Vec<Timetable>, RepositoryError>;
    async fn get_timetable(&self, timetable_id: &str) -> Result<Timetable, RepositoryError>;
    async fn add_timetable(&self, timetable: Timetable) -> Result<Timetable, RepositoryError>;
    async fn update_entries(
        &self,
        timetable_id: &str,
        entries: Vec<TimetableEntry>,
    ) -> Result<Timetable, RepositoryError>;
}

pub struct InMemoryTimetableRepository {
    timetables: RwLock<Vec<Timetable>>,
    next_id: AtomicU64,
}

impl InMemoryTimetableRepository {
    pub fn new() -> Self {
        Self {
            timetables: RwLock::new(Vec::new()),
            next_id: AtomicU64::new(1),
        }
    }

    /// Allocate the next "tt-{n}" identifier. Separate from insertion so
    /// generation can bake the id into the timetable it builds.
    pub fn allocate_id(&self) -> String {
        format!("tt-{}", self.next_id.fetch_add(1, Ordering::Relaxed))
    }
}

impl Default for InMemoryTimetableRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl TimetableRepository for InMemoryTimetableRepository {
    async fn get_timetables(&self) -> Result<Vec<Timetable>, RepositoryError> {
        Ok(self.timetables.read().await.clone())
    }

    async fn get_timetable(&self, timetable_id: &str) -> Result<Timetable, RepositoryError> {
        self.timetables
            .read()
            .await
            .iter()
            .find(|tt| tt.id == timetable_id)
            .cloned()
            .ok_or_else(|| RepositoryError::NotFound(format!("timetable '{}'", timetable_id)))
    }

    async fn add_timetable(&self, timetable: Timetable) -> Result<Timetable, RepositoryError> {
        self.timetables.write().await.push(timetable.clone());
        Ok(timetable)
    }

    /// Replace a timetable's entries wholesale. There is no merge; the
    /// submitted list is the new truth.
    async fn update_entries(
        &self,
        timetable_id: &str,
        entries: Vec<TimetableEntry>,
    ) -> Result<Timetable, RepositoryError> {
        let mut timetables = self.timetables.write().await;
        let timetable = timetables
            .iter_mut()
            .find(|tt| tt.id == timetable_id)
            .ok_or_else(|| RepositoryError::NotFound(format!("timetable '{}'", timetable_id)))?;

        timetable.entries = entries;
        Ok(timetable.clone())
    }
}
