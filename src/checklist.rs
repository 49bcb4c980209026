//! Post-create checklist printed after a successful scaffold.

use tabled::{
    settings::{Panel, Style},
    Table, Tabled,
};

use crate::registry::Archetype;

pub const CHECKLIST_TITLE: &str = "Post-create checklist";

#[derive(Debug, Clone, PartialEq, Eq, Tabled)]
pub struct ChecklistItem {
    #[tabled(rename = "Item")]
    pub item: String,
}

impl ChecklistItem {
    fn new(item: &str) -> Self {
        Self { item: format!("- {item}") }
    }
}

/// Checklist rows for `archetype`. Archetypes with a frontend get extra rows
/// for the `package.json` toolchain.
pub fn checklist_items(archetype: Archetype) -> Vec<ChecklistItem> {
    let mut items = vec![
        ChecklistItem::new(
            "Create a superuser for testing locally: \"docker-compose exec api python manage.py createsuperuser\"",
        ),
        ChecklistItem::new("Generate unique secret keys for each deployment environment"),
    ];

    if archetype.has_frontend() {
        items.push(ChecklistItem::new(
            "Review dependencies listed in package.json and requirements.txt, bumping up versions or removing altogether as needed",
        ));
        items.push(ChecklistItem::new(
            "Generate and commit a package-lock.json to include in the repo; e.g. docker-compose exec frontend npm i --package-lock-only",
        ));
    } else {
        items.push(ChecklistItem::new(
            "Review dependencies listed in requirements.txt, bumping up versions or removing altogether as needed",
        ));
    }

    items.push(ChecklistItem::new(
        "\"git init\", set your upstream repository, and push your main branch up; e.g. git remote add origin git@github.com:... && git push",
    ));
    items
}

/// Renders the checklist for `archetype` as a table.
pub fn render_checklist(archetype: Archetype) -> String {
    let mut table = Table::new(checklist_items(archetype));
    table.with(Style::sharp()).with(Panel::header(CHECKLIST_TITLE));
    table.to_string()
}
