use std::collections::VecDeque;

/// Default number of projects kept in the recency list.
pub const DEFAULT_RECENT_CAPACITY: usize = 5;

/// 管理最近使用專案的清單。 / Maintains a bounded list of recently used project paths.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecentProjects {
    capacity: usize,
    entries: VecDeque<String>,
}

impl Default for RecentProjects {
    fn default() -> Self {
        Self::new(DEFAULT_RECENT_CAPACITY)
    }
}

impl RecentProjects {
    /// 建立空的清單，容量至少為 1。 / Creates an empty list holding at least one entry.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity,
            entries: VecDeque::with_capacity(capacity),
        }
    }

    /// 依保存的資料還原清單。 / Reconstructs the list from persisted entries (front first).
    pub fn with_entries(capacity: usize, entries: Vec<String>) -> Self {
        let mut recent = Self::new(capacity);
        for entry in entries {
            if !recent.entries.contains(&entry) {
                recent.entries.push_back(entry);
            }
        }
        recent.truncate();
        recent
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// 變更容量，超出的舊紀錄自尾端捨棄。 / Changes the capacity, dropping the oldest overflow.
    pub fn set_capacity(&mut self, capacity: usize) {
        self.capacity = capacity.max(1);
        self.truncate();
    }

    /// 將專案提升至清單頂端。 / Moves a project to the front, evicting from the tail.
    pub fn touch(&mut self, path: impl Into<String>) {
        let path = path.into();
        self.entries.retain(|existing| existing != &path);
        self.entries.push_front(path);
        self.truncate();
    }

    /// 移除指定專案；若存在則回傳 `true`。 / Removes a project and returns `true` if it was tracked.
    pub fn remove(&mut self, path: &str) -> bool {
        let initial_len = self.entries.len();
        self.entries.retain(|existing| existing != path);
        initial_len != self.entries.len()
    }

    /// 專案改名後更新路徑。 / Follows a project rename, keeping its position.
    pub fn rename(&mut self, old_path: &str, new_path: &str) -> bool {
        if !self.entries.iter().any(|existing| existing == old_path) {
            return false;
        }
        if old_path != new_path {
            self.entries.retain(|existing| existing != new_path);
            if let Some(entry) = self
                .entries
                .iter_mut()
                .find(|existing| existing.as_str() == old_path)
            {
                *entry = new_path.to_string();
            }
        }
        true
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    fn truncate(&mut self) {
        while self.entries.len() > self.capacity {
            self.entries.pop_back();
        }
    }
}
