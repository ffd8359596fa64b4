use std::fmt;
use std::sync::Arc;

use parking_lot::{const_mutex, Mutex, RwLock};
use rust_decimal::Decimal;
use serde::{Serialize, Serializer};

use super::errors::MenuError;
use super::value_objects::Price;

// ============================================================================
// Menu Items - Dishes and Combos
// ============================================================================
//
// An item is either a single dish or a combo of other items. Combos hold
// shared handles (`ItemRef`), so the same dish can sit in a combo and be
// inspected from an order at the same time. Price and name of a combo are
// always recomputed from the current children.
//
// ============================================================================

/// A single priced good; immutable once created
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Dish {
    name: String,
    price: Price,
}

impl Dish {
    pub fn new(name: impl Into<String>, price: Price) -> Self {
        Self {
            name: name.into(),
            price,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn price(&self) -> Price {
        self.price
    }
}

/// Ordered collection of items priced as the sum of its children
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CompositeItem {
    items: Vec<ItemRef>,
}

impl CompositeItem {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn items(&self) -> &[ItemRef] {
        &self.items
    }

    pub fn price(&self) -> Price {
        self.items.iter().map(ItemRef::price).sum()
    }

    /// Children's names joined by ", " with no trailing separator
    pub fn name(&self) -> String {
        self.items
            .iter()
            .map(ItemRef::name)
            .collect::<Vec<_>>()
            .join(", ")
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Item {
    Dish(Dish),
    Composite(CompositeItem),
}

impl Item {
    pub fn price(&self) -> Price {
        match self {
            Item::Dish(dish) => dish.price(),
            Item::Composite(combo) => combo.price(),
        }
    }

    pub fn name(&self) -> String {
        match self {
            Item::Dish(dish) => dish.name().to_string(),
            Item::Composite(combo) => combo.name(),
        }
    }

    pub fn is_composite(&self) -> bool {
        matches!(self, Item::Composite(_))
    }
}

impl fmt::Display for Item {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Item::Dish(dish) => write!(f, "{} (${})", dish.name, dish.price),
            Item::Composite(combo) => {
                write!(f, "CompositeItem{{items=")?;
                write_list(f, &combo.items)?;
                write!(f, "}}")
            }
        }
    }
}

/// Render a sequence of items as `[a, b, c]`
pub(crate) fn write_list(f: &mut fmt::Formatter<'_>, items: &[ItemRef]) -> fmt::Result {
    write!(f, "[")?;
    for (index, item) in items.iter().enumerate() {
        if index > 0 {
            write!(f, ", ")?;
        }
        write!(f, "{}", item)?;
    }
    write!(f, "]")
}

// ============================================================================
// Shared Item Handle
// ============================================================================

// Held for every combo mutation so a cycle check and the append it guards
// happen as one step.
static ASSEMBLY_LOCK: Mutex<()> = const_mutex(());

/// Shared, thread-safe handle to an item.
///
/// Cloning the handle aliases the same item. Combos are mutated through
/// `add_item` / `remove_item`, which take a process-wide assembly lock and
/// hold the item's write lock only for the duration of the change. Every
/// read goes through a recursive read lock so nested traversal never
/// blocks on itself.
#[derive(Clone)]
pub struct ItemRef(Arc<RwLock<Item>>);

impl ItemRef {
    pub fn new(item: Item) -> Self {
        Self(Arc::new(RwLock::new(item)))
    }

    /// Create a dish, rejecting negative prices
    pub fn dish(name: impl Into<String>, amount: Decimal) -> Result<Self, MenuError> {
        Ok(Self::new(Item::Dish(Dish::new(name, Price::new(amount)?))))
    }

    /// Create an empty combo
    pub fn composite() -> Self {
        Self::new(Item::Composite(CompositeItem::new()))
    }

    pub fn price(&self) -> Price {
        self.0.read_recursive().price()
    }

    pub fn name(&self) -> String {
        self.0.read_recursive().name()
    }

    pub fn is_composite(&self) -> bool {
        self.0.read_recursive().is_composite()
    }

    /// True when both handles point at the same item
    pub fn ptr_eq(&self, other: &ItemRef) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    /// Direct children of a combo; empty for a dish
    pub fn children(&self) -> Vec<ItemRef> {
        match &*self.0.read_recursive() {
            Item::Dish(_) => Vec::new(),
            Item::Composite(combo) => combo.items.clone(),
        }
    }

    /// Whether `other` appears anywhere below this item
    pub fn contains(&self, other: &ItemRef) -> bool {
        let mut pending = self.children();
        while let Some(item) = pending.pop() {
            if item.ptr_eq(other) {
                return true;
            }
            pending.extend(item.children());
        }
        false
    }

    /// Append `child` to this combo.
    ///
    /// Fails if this item is a dish, or if `child` is this combo or
    /// already contains it. Combo mutations are serialized, so concurrent
    /// adds can never close a cycle between them.
    pub fn add_item(&self, child: ItemRef) -> Result<(), MenuError> {
        let _assembly = ASSEMBLY_LOCK.lock();

        if !self.is_composite() {
            return Err(MenuError::NotComposite(self.to_string()));
        }
        if child.ptr_eq(self) || child.contains(self) {
            return Err(MenuError::CyclicComposite {
                parent: self.to_string(),
                child: child.to_string(),
            });
        }

        let mut guard = self.0.write();
        match &mut *guard {
            Item::Composite(combo) => {
                combo.items.push(child);
                Ok(())
            }
            Item::Dish(dish) => Err(MenuError::NotComposite(dish.name.clone())),
        }
    }

    /// Remove the first child equal to `item` (same handle or same
    /// structure). Returns false, changing nothing, when there is no match
    /// or this item is a dish.
    pub fn remove_item(&self, item: &ItemRef) -> bool {
        let _assembly = ASSEMBLY_LOCK.lock();

        // Locate under a read lock: comparing structures may read this
        // combo again further down.
        let position = match &*self.0.read_recursive() {
            Item::Dish(_) => None,
            Item::Composite(combo) => combo.items.iter().position(|child| child == item),
        };
        let Some(index) = position else {
            return false;
        };

        let mut guard = self.0.write();
        match &mut *guard {
            Item::Composite(combo) if index < combo.items.len() => {
                combo.items.remove(index);
                true
            }
            _ => false,
        }
    }
}

impl PartialEq for ItemRef {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other) || *self.0.read_recursive() == *other.0.read_recursive()
    }
}

impl fmt::Debug for ItemRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&*self.0.read_recursive(), f)
    }
}

impl fmt::Display for ItemRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&*self.0.read_recursive(), f)
    }
}

impl Serialize for ItemRef {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.0.read_recursive().serialize(serializer)
    }
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn pizza() -> ItemRef {
        ItemRef::dish("Pizza", Decimal::new(899, 2)).unwrap()
    }

    fn cola() -> ItemRef {
        ItemRef::dish("Cola", Decimal::new(199, 2)).unwrap()
    }

    #[test]
    fn test_dish_returns_constructor_values() {
        let dish = pizza();
        assert_eq!(dish.name(), "Pizza");
        assert_eq!(dish.price(), Price::from_cents(899));
        assert!(!dish.is_composite());
        assert_eq!(dish.to_string(), "Pizza ($8.99)");
    }

    #[test]
    fn test_dish_rejects_negative_price() {
        let result = ItemRef::dish("Refund", Decimal::new(-500, 2));
        assert!(matches!(result.unwrap_err(), MenuError::InvalidPrice(_)));
    }

    #[test]
    fn test_combo_price_is_sum_of_children() {
        let combo = ItemRef::composite();
        assert_eq!(combo.price(), Price::ZERO);

        combo.add_item(pizza()).unwrap();
        combo.add_item(cola()).unwrap();
        assert_eq!(combo.price().to_string(), "10.98");
    }

    #[test]
    fn test_combo_price_follows_add_and_remove() {
        let combo = ItemRef::composite();
        let cola = cola();
        combo.add_item(pizza()).unwrap();
        combo.add_item(cola.clone()).unwrap();
        assert_eq!(combo.price(), Price::from_cents(1098));

        assert!(combo.remove_item(&cola));
        assert_eq!(combo.price(), Price::from_cents(899));
    }

    #[test]
    fn test_combo_name_has_no_trailing_separator() {
        let combo = ItemRef::composite();
        combo.add_item(pizza()).unwrap();
        combo.add_item(cola()).unwrap();
        assert_eq!(combo.name(), "Pizza, Cola");
    }

    #[test]
    fn test_empty_combo_name_is_empty() {
        assert_eq!(ItemRef::composite().name(), "");
    }

    #[test]
    fn test_combo_rendering() {
        let combo = ItemRef::composite();
        combo.add_item(pizza()).unwrap();
        combo.add_item(cola()).unwrap();
        assert_eq!(
            combo.to_string(),
            "CompositeItem{items=[Pizza ($8.99), Cola ($1.99)]}"
        );
    }

    #[test]
    fn test_remove_absent_item_is_noop() {
        let combo = ItemRef::composite();
        combo.add_item(pizza()).unwrap();

        assert!(!combo.remove_item(&cola()));
        assert_eq!(combo.children().len(), 1);
    }

    #[test]
    fn test_remove_matches_structurally_equal_item() {
        let combo = ItemRef::composite();
        combo.add_item(pizza()).unwrap();
        combo.add_item(cola()).unwrap();

        // A different handle with the same name and price
        assert!(combo.remove_item(&pizza()));
        assert_eq!(combo.name(), "Cola");
    }

    #[test]
    fn test_remove_takes_first_match_only() {
        let combo = ItemRef::composite();
        let cola = cola();
        combo.add_item(cola.clone()).unwrap();
        combo.add_item(pizza()).unwrap();
        combo.add_item(cola.clone()).unwrap();

        assert!(combo.remove_item(&cola));
        assert_eq!(combo.name(), "Pizza, Cola");
    }

    #[test]
    fn test_remove_on_dish_is_noop() {
        let dish = pizza();
        assert!(!dish.remove_item(&cola()));
    }

    #[test]
    fn test_add_to_dish_fails() {
        let result = pizza().add_item(cola());
        assert!(matches!(result.unwrap_err(), MenuError::NotComposite(_)));
    }

    #[test]
    fn test_combo_cannot_contain_itself() {
        let combo = ItemRef::composite();
        let result = combo.add_item(combo.clone());
        assert!(matches!(result.unwrap_err(), MenuError::CyclicComposite { .. }));
    }

    #[test]
    fn test_combo_cannot_contain_ancestor() {
        let outer = ItemRef::composite();
        let inner = ItemRef::composite();
        outer.add_item(inner.clone()).unwrap();

        let result = inner.add_item(outer.clone());
        assert!(matches!(result.unwrap_err(), MenuError::CyclicComposite { .. }));
        assert!(inner.children().is_empty());
    }

    #[test]
    fn test_nested_combo_price_and_contains() {
        let inner = ItemRef::composite();
        let cola = cola();
        inner.add_item(pizza()).unwrap();
        inner.add_item(cola.clone()).unwrap();

        let outer = ItemRef::composite();
        outer.add_item(inner.clone()).unwrap();
        outer.add_item(ItemRef::dish("Burger", Decimal::new(599, 2)).unwrap()).unwrap();

        assert_eq!(outer.price(), Price::from_cents(1697));
        assert!(outer.contains(&cola));
        assert!(!inner.contains(&outer));
    }

    #[test]
    fn test_concurrent_cross_adds_never_form_a_cycle() {
        use std::sync::Barrier;

        for _ in 0..200 {
            let first = ItemRef::composite();
            let second = ItemRef::composite();
            let barrier = Arc::new(Barrier::new(2));

            let handles: Vec<_> = [
                (first.clone(), second.clone()),
                (second.clone(), first.clone()),
            ]
            .into_iter()
            .map(|(parent, child)| {
                let barrier = Arc::clone(&barrier);
                std::thread::spawn(move || {
                    barrier.wait();
                    parent.add_item(child).is_ok()
                })
            })
            .collect();

            let added = handles
                .into_iter()
                .map(|handle| handle.join().unwrap())
                .filter(|ok| *ok)
                .count();

            assert_eq!(added, 1);
            assert_eq!(first.price(), Price::ZERO);
            assert_eq!(second.price(), Price::ZERO);
        }
    }

    #[test]
    fn test_same_dish_in_two_combos() {
        let cola = cola();
        let first = ItemRef::composite();
        let second = ItemRef::composite();
        first.add_item(cola.clone()).unwrap();
        second.add_item(cola.clone()).unwrap();

        assert!(first.children()[0].ptr_eq(&second.children()[0]));
    }

    #[test]
    fn test_item_serialization() {
        let combo = ItemRef::composite();
        combo.add_item(cola()).unwrap();

        let json = serde_json::to_value(&combo).unwrap();
        assert_eq!(json["kind"], "composite");
        assert_eq!(json["items"][0]["kind"], "dish");
        assert_eq!(json["items"][0]["name"], "Cola");
        assert_eq!(json["items"][0]["price"], "1.99");
    }
}
