/// Built-in category catalog
///
/// Categories are owned outside the store: habits only carry a
/// `CategoryId`. This table supplies display titles and colors for the
/// front end.

use crate::domain::CategoryId;

/// Display information for a category
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Category {
    pub id: &'static str,
    pub title: &'static str,
    pub color: &'static str,
}

impl Category {
    pub fn category_id(&self) -> CategoryId {
        CategoryId::from(self.id)
    }
}

/// The default "win" categories
pub const CATEGORIES: [Category; 4] = [
    Category { id: "mental", title: "Mental", color: "blue" },
    Category { id: "physical", title: "Physical", color: "green" },
    Category { id: "spiritual", title: "Spiritual", color: "purple" },
    Category { id: "accountability", title: "Accountability", color: "orange" },
];

/// Look up a category by id
pub fn find_category(id: &CategoryId) -> Option<&'static Category> {
    CATEGORIES.iter().find(|category| category.id == id.as_str())
}

/// Display title for a category id, falling back to the raw id
pub fn category_title(id: &CategoryId) -> String {
    find_category(id)
        .map(|category| category.title.to_string())
        .unwrap_or_else(|| id.to_string())
}
