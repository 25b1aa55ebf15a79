use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};

use crate::models::Product;

/// Sorts by descending score and keeps the first `top_n` entries
///
/// The sort is stable, so equal scores keep their input order.
pub fn top_n_by_score<T>(mut scored: Vec<(T, f64)>, top_n: usize) -> Vec<(T, f64)> {
    scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal));
    scored.truncate(top_n);
    scored
}

/// Union of every exclusion source
pub fn exclusion_set<'a, I>(sources: I) -> HashSet<String>
where
    I: IntoIterator<Item = &'a [String]>,
{
    sources
        .into_iter()
        .flat_map(|ids| ids.iter().cloned())
        .collect()
}

/// Resolves ranked ids against the product snapshot
///
/// Unknown ids are dropped. The output follows the rank order of `ranked_ids`
/// regardless of snapshot order.
pub fn hydrate_in_rank_order<R, F>(ranked_ids: &[String], products: &[Product], to_record: F) -> Vec<R>
where
    F: Fn(&Product) -> R,
{
    let rank: HashMap<&str, usize> = ranked_ids
        .iter()
        .enumerate()
        .map(|(index, id)| (id.as_str(), index))
        .collect();

    let mut found: Vec<(usize, &Product)> = products
        .iter()
        .filter_map(|product| rank.get(product.id.as_str()).map(|&index| (index, product)))
        .collect();
    found.sort_by_key(|(index, _)| *index);
    found.dedup_by_key(|(index, _)| *index);

    found.into_iter().map(|(_, product)| to_record(product)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn product(id: &str) -> Product {
        Product {
            id: id.to_string(),
            name: format!("Product {}", id),
            description: None,
            unit_price: None,
            list_price: None,
            image_url: None,
            category_id: None,
        }
    }

    #[test]
    fn test_top_n_orders_descending() {
        let ranked = top_n_by_score(vec![("a", 0.2), ("b", 0.9), ("c", 0.5)], 2);
        assert_eq!(ranked, vec![("b", 0.9), ("c", 0.5)]);
    }

    #[test]
    fn test_top_n_ties_keep_input_order() {
        let ranked = top_n_by_score(vec![("x", 0.0), ("y", 1.0), ("z", 0.0)], 3);
        assert_eq!(ranked, vec![("y", 1.0), ("x", 0.0), ("z", 0.0)]);
    }

    #[test]
    fn test_top_n_larger_than_input() {
        let ranked = top_n_by_score(vec![("a", 1.0)], 10);
        assert_eq!(ranked.len(), 1);
    }

    #[test]
    fn test_exclusion_set_unions_sources() {
        let interacted = vec!["p1".to_string()];
        let cart = vec!["p2".to_string(), "p1".to_string()];
        let purchased: Vec<String> = Vec::new();
        let excluded = exclusion_set([&interacted[..], &cart[..], &purchased[..]]);
        assert_eq!(excluded.len(), 2);
        assert!(excluded.contains("p1"));
        assert!(excluded.contains("p2"));
    }

    #[test]
    fn test_hydrate_preserves_rank_order_and_drops_unknown() {
        let products = vec![product("p1"), product("p2"), product("p3")];
        let ranked = vec!["p3".to_string(), "missing".to_string(), "p1".to_string()];
        let ids = hydrate_in_rank_order(&ranked, &products, |p| p.id.clone());
        assert_eq!(ids, vec!["p3".to_string(), "p1".to_string()]);
    }

    #[test]
    fn test_hydrate_ignores_duplicate_snapshot_rows() {
        let products = vec![product("p1"), product("p1")];
        let ranked = vec!["p1".to_string()];
        let ids = hydrate_in_rank_order(&ranked, &products, |p| p.id.clone());
        assert_eq!(ids.len(), 1);
    }
}
