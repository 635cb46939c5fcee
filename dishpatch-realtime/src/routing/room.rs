//! Room identity model: namespaced addresses for subscriber groups.

use std::fmt;
use std::fmt::{Display, Formatter};

const RESTAURANT_NAMESPACE: &str = "restaurant";
const RESTAURANT_OWNER_NAMESPACE: &str = "restaurant-owner";
const RESTAURANT_BRANCH_NAMESPACE: &str = "restaurant-branch";

/// Address of a subscriber group on the realtime transport.
///
/// A room identifier is an opaque `namespace:entity` string. Identifiers are
/// stable for the lifetime of the referenced entity; the core only ever emits
/// to a room by identifier and never enumerates its membership.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct RoomId(String);

impl RoomId {
    /// Builds a room identifier from a namespace and an entity identifier.
    pub fn scoped(namespace: &str, entity: &str) -> Self {
        Self(format!("{namespace}:{entity}"))
    }

    /// Room carrying every update for one restaurant.
    pub fn restaurant(id: &str) -> Self {
        Self::scoped(RESTAURANT_NAMESPACE, id)
    }

    /// Room private to one restaurant owner.
    pub fn restaurant_owner(id: &str) -> Self {
        Self::scoped(RESTAURANT_OWNER_NAMESPACE, id)
    }

    /// Room carrying updates for one restaurant branch.
    pub fn restaurant_branch(id: &str) -> Self {
        Self::scoped(RESTAURANT_BRANCH_NAMESPACE, id)
    }

    /// Administrative feed of restaurant lifecycle changes.
    pub fn admin_restaurants() -> Self {
        Self("admin:restaurants".to_string())
    }

    /// Public catalog feed of restaurant listing changes.
    pub fn catalog_restaurants() -> Self {
        Self("catalog:restaurants".to_string())
    }

    /// Public catalog feed of menu product changes.
    pub fn catalog_products() -> Self {
        Self("catalog:products".to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for RoomId {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for RoomId {
    fn from(raw: &str) -> Self {
        Self(raw.to_string())
    }
}

impl From<String> for RoomId {
    fn from(raw: String) -> Self {
        Self(raw)
    }
}

#[cfg(test)]
mod tests {
    use super::RoomId;

    #[test]
    fn scoped_rooms_join_namespace_and_entity_with_a_colon() {
        assert_eq!(RoomId::restaurant("42").as_str(), "restaurant:42");
        assert_eq!(RoomId::restaurant_owner("7").as_str(), "restaurant-owner:7");
        assert_eq!(
            RoomId::restaurant_branch("19").as_str(),
            "restaurant-branch:19"
        );
    }

    #[test]
    fn well_known_rooms_are_stable() {
        assert_eq!(RoomId::admin_restaurants().as_str(), "admin:restaurants");
        assert_eq!(
            RoomId::catalog_restaurants().as_str(),
            "catalog:restaurants"
        );
        assert_eq!(RoomId::catalog_products().as_str(), "catalog:products");
    }

    #[test]
    fn explicit_room_strings_pass_through_verbatim() {
        assert_eq!(RoomId::from("custom:1").as_str(), "custom:1");
    }
}
