use serde::Serialize;

use crate::utils::closed_enum;

closed_enum! {
    /// Grid of cards or a table, chosen per admin list page.
    #[derive(Default)]
    pub enum LayoutMode {
        #[default]
        Grid => "grid",
        Table => "table",
    }
}

closed_enum! {
    /// Admin list pages that remember a layout.
    pub enum AdminPage {
        Destinations => "destinations",
        Bookings => "bookings",
        Customers => "customers",
        Blog => "blog",
        Accommodations => "accommodations",
        Reviews => "reviews",
        Messages => "messages",
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LayoutPreference {
    pub page: AdminPage,
    pub mode: LayoutMode,
}

#[derive(Debug, Clone, serde::Deserialize)]
pub struct SetLayout {
    pub mode: LayoutMode,
}

/// Admin list payload: the page's layout travels with the records it lays out.
#[derive(Debug, Clone, Serialize)]
pub struct Listing<T> {
    pub layout: LayoutMode,
    pub total: usize,
    pub items: Vec<T>,
}

impl<T> Listing<T> {
    pub fn new(layout: LayoutMode, items: Vec<T>) -> Self {
        Self {
            layout,
            total: items.len(),
            items,
        }
    }
}
