use serde::{Deserialize, Serialize};

/// An experience as offered by the catalog, before it is added to an itinerary.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ExperienceInput {
    pub id: String,
    pub title: String,
    pub price: f64,
    pub image: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

/// One experience in the itinerary. `quantity` is never below 1.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LineItem {
    pub id: String,
    pub title: String,
    pub price: f64,
    pub quantity: u32,
    pub image: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

impl LineItem {
    pub fn subtotal(&self) -> f64 {
        self.price * f64::from(self.quantity)
    }
}

/// Pure itinerary state: the selected experiences plus the drawer visibility flag.
///
/// Handles the mutation rules without any I/O. Observation and persistence are
/// layered on top by the store that owns it.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "ItineraryParts")]
pub struct Itinerary {
    items: Vec<LineItem>,
    is_open: bool,
}

/// Wire form of an [`Itinerary`] before its invariants are restored.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItineraryParts {
    pub items: Vec<LineItem>,
    #[serde(default)]
    pub is_open: bool,
}

impl From<ItineraryParts> for Itinerary {
    fn from(parts: ItineraryParts) -> Self {
        Self::from_parts(parts.items, parts.is_open)
    }
}

impl Itinerary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild an itinerary from untrusted parts (e.g. a persisted snapshot).
    ///
    /// Quantities below 1 are raised to 1 and later duplicates of an id are dropped.
    pub fn from_parts(items: Vec<LineItem>, is_open: bool) -> Self {
        let mut itinerary = Self {
            items: Vec::with_capacity(items.len()),
            is_open,
        };
        for mut item in items {
            if itinerary.position(&item.id).is_some() {
                continue;
            }
            item.quantity = item.quantity.max(1);
            itinerary.items.push(item);
        }
        itinerary
    }

    pub fn items(&self) -> &[LineItem] {
        &self.items
    }

    pub fn is_open(&self) -> bool {
        self.is_open
    }

    pub fn get(&self, id: &str) -> Option<&LineItem> {
        self.items.iter().find(|i| i.id == id)
    }

    fn position(&self, id: &str) -> Option<usize> {
        self.items.iter().position(|i| i.id == id)
    }

    /// Set visibility to `force` if given, otherwise flip it.
    pub fn toggle(&mut self, force: Option<bool>) {
        self.is_open = force.unwrap_or(!self.is_open);
    }

    /// Add one unit of an experience and open the drawer.
    ///
    /// A repeat add only bumps the quantity: title, price and image of the
    /// existing entry are kept even if the incoming payload differs.
    pub fn add_experience(&mut self, experience: ExperienceInput) {
        match self.position(&experience.id) {
            Some(pos) => {
                let item = &mut self.items[pos];
                item.quantity = item.quantity.saturating_add(1);
            }
            None => self.items.push(LineItem {
                id: experience.id,
                title: experience.title,
                price: experience.price,
                quantity: 1,
                image: experience.image,
                category: experience.category,
            }),
        }
        self.is_open = true;
    }

    /// Remove an experience. Returns false (and changes nothing) if absent.
    pub fn remove_experience(&mut self, id: &str) -> bool {
        match self.position(id) {
            Some(pos) => {
                self.items.remove(pos);
                true
            }
            None => false,
        }
    }

    /// Add `delta` to an item's quantity, clamped at 1.
    /// Returns whether the quantity actually changed.
    pub fn update_quantity(&mut self, id: &str, delta: i64) -> bool {
        let Some(pos) = self.position(id) else {
            return false;
        };
        let item = &mut self.items[pos];
        let next = i64::from(item.quantity)
            .saturating_add(delta)
            .clamp(1, i64::from(u32::MAX)) as u32;
        let changed = next != item.quantity;
        item.quantity = next;
        changed
    }

    /// Sum of `price * quantity` over all items. 0 when empty.
    pub fn total_price(&self) -> f64 {
        self.items.iter().map(LineItem::subtotal).sum()
    }

    /// Sum of quantities over all items. 0 when empty.
    pub fn item_count(&self) -> u64 {
        self.items.iter().map(|i| u64::from(i.quantity)).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
