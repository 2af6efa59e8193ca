use serde::Serialize;

use order_core::LevelCatalog;
use order_core::model::{LevelId, Progress};
use order_core::progression;

/// One row of the level picker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LevelSelectItem {
    pub level_id: LevelId,
    pub index: usize,
    pub title: String,
    pub description: String,
    pub is_special: bool,
    pub is_locked: bool,
    pub is_completed: bool,
    pub required_points: u32,
    pub points_missing: u32,
}

/// Build the level picker rows in catalog order.
#[must_use]
pub fn level_select(catalog: &LevelCatalog, progress: &Progress) -> Vec<LevelSelectItem> {
    catalog
        .all_levels()
        .iter()
        .enumerate()
        .map(|(index, level)| LevelSelectItem {
            level_id: level.id(),
            index,
            title: level.title().to_string(),
            description: level.description().to_string(),
            is_special: level.is_special(),
            is_locked: !progression::is_unlocked(level, progress),
            is_completed: progress.is_completed(level.id()),
            required_points: level.required_points(),
            points_missing: progression::points_missing(level, progress),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn specials_unlock_with_score() {
        let catalog = LevelCatalog::builtin().unwrap();
        let mut progress = Progress::default();
        progress.add_score(320);
        progress.mark_level_completed(LevelId::new(0));

        let items = level_select(&catalog, &progress);
        assert_eq!(items.len(), catalog.len());

        assert!(items[0].is_completed);
        assert!(!items[0].is_locked);
        assert!(!items[1].is_completed);

        let first_special = &items[20];
        assert!(first_special.is_special);
        assert!(!first_special.is_locked);
        assert_eq!(first_special.points_missing, 0);

        let second_special = &items[21];
        assert!(second_special.is_locked);
        assert_eq!(second_special.required_points, 500);
        assert_eq!(second_special.points_missing, 180);
    }
}
