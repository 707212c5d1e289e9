//! Todolist slice: the ordered todolists plus their client-only annotations

use crate::types::{FilterValue, RequestStatus, Todolist, TodolistId};
use chrono::NaiveDateTime;
use serde::Serialize;

/// A todolist as held by the client
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TodolistEntry {
    /// Server-assigned identifier
    pub id: TodolistId,
    /// Title
    pub title: String,
    /// Creation timestamp
    pub added_date: NaiveDateTime,
    /// Server ordering key
    pub order: i64,
    /// Which tasks the UI shows
    pub filter: FilterValue,
    /// Request status of this row
    pub entity_status: RequestStatus,
}

impl From<Todolist> for TodolistEntry {
    fn from(todolist: Todolist) -> Self {
        Self {
            id: todolist.id,
            title: todolist.title,
            added_date: todolist.added_date,
            order: todolist.order,
            filter: FilterValue::default(),
            entity_status: RequestStatus::Idle,
        }
    }
}

/// Ordered todolists, newest creations first
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct TodolistsState {
    entries: Vec<TodolistEntry>,
}

impl TodolistsState {
    /// Empty collection
    #[must_use]
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Appends fetched todolists in server order, each with default annotations
    ///
    /// A todolist already held keeps its position and annotations and takes
    /// the server's title and order.
    pub fn replace_all(&mut self, todolists: impl IntoIterator<Item = Todolist>) {
        for todolist in todolists {
            match self.get_mut(&todolist.id) {
                Some(entry) => {
                    entry.title = todolist.title;
                    entry.added_date = todolist.added_date;
                    entry.order = todolist.order;
                },
                None => self.entries.push(TodolistEntry::from(todolist)),
            }
        }
    }

    /// Prepends a newly created todolist
    pub fn insert_at_front(&mut self, todolist: Todolist) {
        self.remove_by_id(&todolist.id);
        self.entries.insert(0, TodolistEntry::from(todolist));
    }

    /// Removes a todolist; absent ids are ignored
    pub fn remove_by_id(&mut self, id: &TodolistId) -> Option<TodolistEntry> {
        let index = self.position(id)?;
        Some(self.entries.remove(index))
    }

    /// Sets the title of a todolist
    pub fn rename_by_id(&mut self, id: &TodolistId, title: impl Into<String>) {
        if let Some(entry) = self.get_mut(id) {
            entry.title = title.into();
        }
    }

    /// Sets the display filter of a todolist
    pub fn set_filter_by_id(&mut self, id: &TodolistId, filter: FilterValue) {
        if let Some(entry) = self.get_mut(id) {
            entry.filter = filter;
        }
    }

    /// Sets the request status of a todolist row
    pub fn set_entity_status_by_id(&mut self, id: &TodolistId, status: RequestStatus) {
        if let Some(entry) = self.get_mut(id) {
            entry.entity_status = status;
        }
    }

    /// Drops every todolist
    pub fn clear_all(&mut self) {
        self.entries.clear();
    }

    /// Looks a todolist up by id
    #[must_use]
    pub fn get(&self, id: &TodolistId) -> Option<&TodolistEntry> {
        self.entries.iter().find(|entry| &entry.id == id)
    }

    /// Whether a todolist with this id is held
    #[must_use]
    pub fn contains(&self, id: &TodolistId) -> bool {
        self.position(id).is_some()
    }

    /// Ids in display order
    pub fn ids(&self) -> impl Iterator<Item = &TodolistId> {
        self.entries.iter().map(|entry| &entry.id)
    }

    /// Todolists in display order
    pub fn iter(&self) -> std::slice::Iter<'_, TodolistEntry> {
        self.entries.iter()
    }

    /// Number of todolists
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether there are no todolists
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Todolists as a slice
    #[must_use]
    pub fn as_slice(&self) -> &[TodolistEntry] {
        &self.entries
    }

    fn position(&self, id: &TodolistId) -> Option<usize> {
        self.entries.iter().position(|entry| &entry.id == id)
    }

    fn get_mut(&mut self, id: &TodolistId) -> Option<&mut TodolistEntry> {
        self.entries.iter_mut().find(|entry| &entry.id == id)
    }
}

impl<'a> IntoIterator for &'a TodolistsState {
    type Item = &'a TodolistEntry;
    type IntoIter = std::slice::Iter<'a, TodolistEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::fixtures::todolist;

    fn seeded() -> TodolistsState {
        let mut state = TodolistsState::new();
        state.replace_all([todolist("A", "What to learn"), todolist("B", "What to buy")]);
        state
    }

    #[test]
    fn fetched_todolists_get_default_annotations() {
        let state = seeded();

        assert_eq!(state.ids().map(TodolistId::as_str).collect::<Vec<_>>(), ["A", "B"]);
        assert!(state.iter().all(|entry| entry.filter == FilterValue::All
            && entry.entity_status == RequestStatus::Idle));
    }

    #[test]
    fn empty_fetch_is_noop() {
        let mut state = seeded();
        state.replace_all(Vec::new());
        assert_eq!(state.len(), 2);
    }

    #[test]
    fn refetch_keeps_ids_unique() {
        let mut state = seeded();
        state.set_filter_by_id(&TodolistId::new("A"), FilterValue::Active);

        state.replace_all([todolist("A", "Renamed on server"), todolist("C", "New")]);

        let ids: Vec<_> = state.ids().map(TodolistId::as_str).collect();
        assert_eq!(ids, ["A", "B", "C"]);
        let a = state.get(&TodolistId::new("A"));
        assert_eq!(a.map(|e| e.title.as_str()), Some("Renamed on server"));
        assert_eq!(a.map(|e| e.filter), Some(FilterValue::Active));
    }

    #[test]
    fn created_todolist_goes_first() {
        let mut state = seeded();
        state.insert_at_front(todolist("C", "New"));

        assert_eq!(state.as_slice()[0].id, TodolistId::new("C"));
        assert_eq!(state.as_slice()[0].filter, FilterValue::All);
        assert_eq!(state.len(), 3);
    }

    #[test]
    fn remove_unknown_id_is_noop() {
        let mut state = seeded();
        assert!(state.remove_by_id(&TodolistId::new("nope")).is_none());
        assert_eq!(state, seeded());

        assert!(state.remove_by_id(&TodolistId::new("A")).is_some());
        assert!(!state.contains(&TodolistId::new("A")));
    }

    #[test]
    fn row_updates_touch_only_their_row() {
        let mut state = seeded();
        let a = TodolistId::new("A");

        state.rename_by_id(&a, "Renamed");
        state.set_filter_by_id(&a, FilterValue::Completed);
        state.set_entity_status_by_id(&a, RequestStatus::Loading);

        let entry = state.get(&a);
        assert_eq!(entry.map(|e| e.title.as_str()), Some("Renamed"));
        assert_eq!(entry.map(|e| e.filter), Some(FilterValue::Completed));
        assert_eq!(entry.map(|e| e.entity_status), Some(RequestStatus::Loading));
        assert_eq!(state.get(&TodolistId::new("B")), seeded().get(&TodolistId::new("B")));
    }

    #[test]
    fn clear_drops_everything() {
        let mut state = seeded();
        state.clear_all();
        assert!(state.is_empty());
    }
}
