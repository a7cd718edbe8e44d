use crate::domain::model::{AssignRequest, Course};

/// 組成一次分配送出的暫存選擇：一位教師 + 多門課程。
///
/// 課程 id 依加入順序保存且不重複。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionStore {
    teacher: Option<String>,
    course_ids: Vec<i64>,
}

impl SelectionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// 後寫者勝。空字串等同「未選擇」。
    pub fn select_teacher(&mut self, email: impl Into<String>) {
        let email = email.into();
        let email = email.trim();
        self.teacher = (!email.is_empty()).then(|| email.to_string());
    }

    pub fn deselect_teacher(&mut self) {
        self.teacher = None;
    }

    /// 回傳是否真的加入；已存在時不做任何事
    pub fn add_course(&mut self, id: i64) -> bool {
        if self.course_ids.contains(&id) {
            return false;
        }
        self.course_ids.push(id);
        true
    }

    pub fn remove_course(&mut self, id: i64) -> bool {
        let before = self.course_ids.len();
        self.course_ids.retain(|existing| *existing != id);
        self.course_ids.len() != before
    }

    pub fn clear(&mut self) {
        self.teacher = None;
        self.course_ids.clear();
    }

    pub fn teacher(&self) -> Option<&str> {
        self.teacher.as_deref()
    }

    pub fn course_ids(&self) -> &[i64] {
        &self.course_ids
    }

    pub fn is_empty(&self) -> bool {
        self.teacher.is_none() && self.course_ids.is_empty()
    }

    /// 兩者皆已選擇時才能組成請求
    pub fn assign_request(&self) -> Option<AssignRequest> {
        let teacher_email = self.teacher.clone()?;
        if self.course_ids.is_empty() {
            return None;
        }
        Some(AssignRequest {
            teacher_email,
            course_ids: self.course_ids.clone(),
        })
    }

    /// 依選擇順序對應到課程目錄；目錄中已不存在的 id 會略過
    pub fn selected_courses<'a>(&self, catalog: &'a [Course]) -> Vec<&'a Course> {
        self.course_ids
            .iter()
            .filter_map(|id| catalog.iter().find(|course| course.id == *id))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn course(id: i64, name: &str) -> Course {
        Course {
            id,
            name: name.to_string(),
            code: format!("C{}", id),
            hours: 3,
        }
    }

    #[test]
    fn test_add_course_twice_keeps_one() {
        let mut selection = SelectionStore::new();
        assert!(selection.add_course(5));
        assert!(!selection.add_course(5));
        assert_eq!(selection.course_ids(), &[5]);
    }

    #[test]
    fn test_remove_absent_course_is_noop() {
        let mut selection = SelectionStore::new();
        selection.select_teacher("a@x.com");
        selection.add_course(1);
        let before = selection.clone();

        assert!(!selection.remove_course(42));
        assert_eq!(selection, before);
    }

    #[test]
    fn test_insertion_order_is_kept() {
        let mut selection = SelectionStore::new();
        for id in [3, 1, 2, 1, 3] {
            selection.add_course(id);
        }
        assert_eq!(selection.course_ids(), &[3, 1, 2]);

        selection.remove_course(1);
        assert_eq!(selection.course_ids(), &[3, 2]);
    }

    #[test]
    fn test_select_teacher_last_write_wins() {
        let mut selection = SelectionStore::new();
        selection.select_teacher("a@x.com");
        selection.select_teacher("b@x.com");
        assert_eq!(selection.teacher(), Some("b@x.com"));

        selection.select_teacher("");
        assert_eq!(selection.teacher(), None);
    }

    #[test]
    fn test_clear_resets_everything() {
        let mut selection = SelectionStore::new();
        selection.select_teacher("a@x.com");
        selection.add_course(1);
        selection.clear();
        assert!(selection.is_empty());
        assert_eq!(selection.assign_request(), None);
    }

    #[test]
    fn test_assign_request_requires_both_parts() {
        let mut selection = SelectionStore::new();
        selection.add_course(1);
        assert_eq!(selection.assign_request(), None);

        selection.select_teacher("a@x.com");
        assert_eq!(
            selection.assign_request(),
            Some(AssignRequest {
                teacher_email: "a@x.com".to_string(),
                course_ids: vec![1],
            })
        );
    }

    #[test]
    fn test_selected_courses_follow_selection_order() {
        let catalog = vec![course(1, "Algo"), course(2, "DB"), course(3, "OS")];
        let mut selection = SelectionStore::new();
        selection.add_course(3);
        selection.add_course(99);
        selection.add_course(1);

        let names: Vec<&str> = selection
            .selected_courses(&catalog)
            .iter()
            .map(|c| c.name.as_str())
            .collect();
        assert_eq!(names, vec!["OS", "Algo"]);
    }
}
