//! World eligibility filter.

use crate::config::WorldsBlacklist;
use crate::world::WorldId;

/// Whether `world` takes part in the plugin at all.
///
/// - no list: every world
/// - blacklist: worlds not in the list
/// - whitelist: worlds in the list (an empty whitelist admits nothing)
pub fn is_eligible(world: &WorldId, filter: &WorldsBlacklist) -> bool {
    match &filter.list {
        None => true,
        Some(list) => list.contains(world) == filter.treat_as_whitelist,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_list_admits_everything() {
        let filter = WorldsBlacklist::default();
        assert!(is_eligible(&"world".into(), &filter));
        assert!(is_eligible(&"world_nether".into(), &filter));
    }

    #[test]
    fn test_blacklist() {
        let filter = WorldsBlacklist::new(["world_nether"], false);
        assert!(!is_eligible(&"world_nether".into(), &filter));
        assert!(is_eligible(&"world".into(), &filter));
    }

    #[test]
    fn test_whitelist() {
        let filter = WorldsBlacklist::new(["world"], true);
        assert!(is_eligible(&"world".into(), &filter));
        assert!(!is_eligible(&"world_the_end".into(), &filter));
    }

    #[test]
    fn test_empty_whitelist_admits_nothing() {
        let filter = WorldsBlacklist::new(Vec::<String>::new(), true);
        assert!(!is_eligible(&"world".into(), &filter));
    }
}
