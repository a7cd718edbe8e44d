//! 來源集合與搜尋後的衍生視圖。
//!
//! 來源只會被整體替換（`Arc<Vec<T>>`），視圖永遠由目前的來源與搜尋字串
//! 推導而來，所以刪除一筆紀錄會同時反映在來源與視圖上。

use crate::domain::model::{Allotment, Course, Teacher};
use std::collections::HashMap;
use std::fmt::Debug;
use std::hash::Hash;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

pub trait Searchable {
    fn search_fields(&self) -> Vec<&str>;
}

pub trait Identified {
    type Key: Eq + Hash + Clone + Debug + Send;

    fn key(&self) -> Self::Key;
}

impl Searchable for Course {
    fn search_fields(&self) -> Vec<&str> {
        vec![self.name.as_str(), self.code.as_str()]
    }
}

impl Identified for Course {
    type Key = i64;

    fn key(&self) -> i64 {
        self.id
    }
}

impl Searchable for Teacher {
    fn search_fields(&self) -> Vec<&str> {
        vec![self.name.as_str(), self.email.as_str()]
    }
}

impl Identified for Teacher {
    type Key = String;

    fn key(&self) -> String {
        self.email.clone()
    }
}

impl Searchable for Allotment {
    fn search_fields(&self) -> Vec<&str> {
        vec![self.teacher_name.as_str(), self.teacher_email.as_str()]
    }
}

impl Identified for Allotment {
    type Key = String;

    fn key(&self) -> String {
        self.teacher_email.clone()
    }
}

fn matches<T: Searchable>(record: &T, needle: &str) -> bool {
    record
        .search_fields()
        .iter()
        .any(|field| field.to_lowercase().contains(needle))
}

/// 不分大小寫的子字串搜尋，保持來源順序。空白字串回傳整個來源。
pub fn filter_view<'a, T: Searchable>(source: &'a [T], term: &str) -> Vec<&'a T> {
    let needle = term.trim().to_lowercase();
    if needle.is_empty() {
        return source.iter().collect();
    }
    source.iter().filter(|record| matches(*record, &needle)).collect()
}

/// 某筆紀錄的刪除進度；不在表中即為 Idle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeletePhase {
    Idle,
    Confirming,
    InFlight,
}

/// 某一時刻的視圖快照。`indices` 為 None 時代表整個來源。
#[derive(Debug, Clone)]
pub struct View<T> {
    source: Arc<Vec<T>>,
    indices: Option<Vec<usize>>,
}

impl<T> View<T> {
    pub fn iter(&self) -> Box<dyn Iterator<Item = &T> + '_> {
        match &self.indices {
            None => Box::new(self.source.iter()),
            Some(indices) => Box::new(indices.iter().map(|i| &self.source[*i])),
        }
    }

    pub fn len(&self) -> usize {
        self.indices
            .as_ref()
            .map_or(self.source.len(), |indices| indices.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// 來源總筆數（「顯示 x / 共 y 筆」）
    pub fn total(&self) -> usize {
        self.source.len()
    }

    pub fn source(&self) -> &Arc<Vec<T>> {
        &self.source
    }

    pub fn is_unfiltered(&self) -> bool {
        self.indices.is_none()
    }
}

impl<T: Clone> View<T> {
    pub fn to_vec(&self) -> Vec<T> {
        self.iter().cloned().collect()
    }
}

#[derive(Debug)]
struct ListingState<T: Identified> {
    source: Arc<Vec<T>>,
    term: String,
    phases: HashMap<T::Key, DeletePhase>,
    detached: bool,
}

/// 頁面擁有的來源集合。clone 出來的 handle 共用同一份狀態，
/// 進行中的請求可以在回應後更新它。鎖不會跨越 `.await`。
#[derive(Debug)]
pub struct Listing<T: Identified> {
    state: Arc<Mutex<ListingState<T>>>,
}

impl<T: Identified> Clone for Listing<T> {
    fn clone(&self) -> Self {
        Self {
            state: Arc::clone(&self.state),
        }
    }
}

impl<T: Identified> Default for Listing<T> {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

impl<T: Identified> Listing<T> {
    pub fn new(items: Vec<T>) -> Self {
        Self {
            state: Arc::new(Mutex::new(ListingState {
                source: Arc::new(items),
                term: String::new(),
                phases: HashMap::new(),
                detached: false,
            })),
        }
    }

    fn lock(&self) -> MutexGuard<'_, ListingState<T>> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// 重新載入後整體替換來源；已卸載時忽略
    pub fn replace(&self, items: Vec<T>) {
        let mut state = self.lock();
        if state.detached {
            tracing::debug!("listing detached, ignoring reload");
            return;
        }
        state.source = Arc::new(items);
    }

    pub fn source(&self) -> Arc<Vec<T>> {
        Arc::clone(&self.lock().source)
    }

    pub fn len(&self) -> usize {
        self.lock().source.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn contains(&self, key: &T::Key) -> bool {
        self.lock().source.iter().any(|record| record.key() == *key)
    }

    pub fn find(&self, key: &T::Key) -> Option<T>
    where
        T: Clone,
    {
        self.lock()
            .source
            .iter()
            .find(|record| record.key() == *key)
            .cloned()
    }

    pub fn set_search(&self, term: impl Into<String>) {
        self.lock().term = term.into();
    }

    pub fn search(&self) -> String {
        self.lock().term.clone()
    }

    pub fn view(&self) -> View<T>
    where
        T: Searchable,
    {
        let state = self.lock();
        let needle = state.term.trim().to_lowercase();
        let indices = (!needle.is_empty()).then(|| {
            state
                .source
                .iter()
                .enumerate()
                .filter(|(_, record)| matches(*record, &needle))
                .map(|(i, _)| i)
                .collect()
        });
        View {
            source: Arc::clone(&state.source),
            indices,
        }
    }

    pub fn phase(&self, key: &T::Key) -> DeletePhase {
        self.lock()
            .phases
            .get(key)
            .copied()
            .unwrap_or(DeletePhase::Idle)
    }

    pub fn is_deleting(&self, key: &T::Key) -> bool {
        self.phase(key) == DeletePhase::InFlight
    }

    /// Idle → Confirming。該紀錄已在確認或刪除中時回傳 false。
    pub fn begin_confirm(&self, key: &T::Key) -> bool {
        let mut state = self.lock();
        if state.phases.contains_key(key) {
            return false;
        }
        state.phases.insert(key.clone(), DeletePhase::Confirming);
        true
    }

    /// Confirming → InFlight
    pub fn begin_delete(&self, key: &T::Key) {
        self.lock()
            .phases
            .insert(key.clone(), DeletePhase::InFlight);
    }

    /// 取消或失敗：回到 Idle，來源不變
    pub fn reset(&self, key: &T::Key) {
        self.lock().phases.remove(key);
    }

    /// 刪除成功：以新的 Vec 整體替換來源。回傳是否真的更新了本地狀態。
    pub fn complete_delete(&self, key: &T::Key) -> bool
    where
        T: Clone,
    {
        let mut state = self.lock();
        state.phases.remove(key);
        if state.detached {
            return false;
        }
        let remaining: Vec<T> = state
            .source
            .iter()
            .filter(|record| record.key() != *key)
            .cloned()
            .collect();
        state.source = Arc::new(remaining);
        true
    }

    /// 擁有者卸載；之後到達的回應不再更新狀態
    pub fn detach(&self) {
        self.lock().detached = true;
    }

    pub fn is_detached(&self) -> bool {
        self.lock().detached
    }
}
