use std::collections::{BTreeSet, HashMap, HashSet};

use ndarray::{Array2, ArrayView1};

use crate::{
    models::{InteractionEvent, InteractionType},
    services::{
        ranking::{exclusion_set, top_n_by_score},
        similarity::column_cosine,
    },
};

/// Summed interaction scores, users as rows and products as columns
///
/// Rows and columns are ordered by ascending id, so two builds from the same
/// snapshot are identical.
#[derive(Debug, Clone)]
pub struct UserItemMatrix {
    users: Vec<String>,
    items: Vec<String>,
    scores: Array2<f64>,
}

impl UserItemMatrix {
    pub fn from_events(events: &[InteractionEvent]) -> Self {
        let users: Vec<String> = events
            .iter()
            .map(|e| e.user_id.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        let items: Vec<String> = events
            .iter()
            .map(|e| e.product_id.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();

        let user_index = index_of(&users);
        let item_index = index_of(&items);

        let mut scores = Array2::<f64>::zeros((users.len(), items.len()));
        let mut unknown_types = 0usize;
        for event in events {
            if matches!(event.kind, InteractionType::Other(_)) {
                unknown_types += 1;
            }
            let row = user_index[event.user_id.as_str()];
            let col = item_index[event.product_id.as_str()];
            scores[[row, col]] += event.score();
        }

        if unknown_types > 0 {
            tracing::debug!(count = unknown_types, "Interactions with unlisted type weighted as 1.0");
        }

        Self {
            users,
            items,
            scores,
        }
    }

    /// The user's row, `None` for a user with no interactions
    pub fn user_row(&self, user_id: &str) -> Option<ArrayView1<'_, f64>> {
        let row = self
            .users
            .binary_search_by(|u| u.as_str().cmp(user_id))
            .ok()?;
        Some(self.scores.row(row))
    }

    /// Item-item cosine similarity over the users' score columns
    pub fn item_similarity(&self) -> Array2<f64> {
        column_cosine(&self.scores)
    }
}

#[cfg(test)]
impl UserItemMatrix {
    fn users(&self) -> &[String] {
        &self.users
    }

    fn items(&self) -> &[String] {
        &self.items
    }

    fn score(&self, user_id: &str, product_id: &str) -> f64 {
        let user = self.users.binary_search_by(|u| u.as_str().cmp(user_id));
        let item = self.items.binary_search_by(|i| i.as_str().cmp(product_id));
        match (user, item) {
            (Ok(row), Ok(col)) => self.scores[[row, col]],
            _ => 0.0,
        }
    }
}

fn index_of(ids: &[String]) -> HashMap<&str, usize> {
    ids.iter()
        .enumerate()
        .map(|(index, id)| (id.as_str(), index))
        .collect()
}

/// Items a user must not be recommended besides the ones they interacted with
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Exclusions {
    /// Product ids in the user's active cart
    pub cart: Vec<String>,
    /// Product ids in the user's non-cancelled, non-failed orders
    pub purchased: Vec<String>,
}

/// A ranked candidate and its similarity-weighted score
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredItem {
    pub product_id: String,
    pub score: f64,
}

/// Item-based collaborative filtering over one interaction snapshot
pub struct CollaborativeEngine {
    matrix: UserItemMatrix,
    similarity: Array2<f64>,
}

impl CollaborativeEngine {
    pub fn build(events: &[InteractionEvent]) -> Self {
        let matrix = UserItemMatrix::from_events(events);
        let similarity = matrix.item_similarity();
        tracing::debug!(
            users = matrix.users.len(),
            items = matrix.items.len(),
            "Built user-item matrix"
        );
        Self { matrix, similarity }
    }

    pub fn similarity(&self) -> &Array2<f64> {
        &self.similarity
    }

    /// Whether the user has any row in the matrix (i.e. is not cold-start)
    pub fn knows_user(&self, user_id: &str) -> bool {
        self.matrix.user_row(user_id).is_some()
    }

    /// Products with a positive score in the user's row
    pub fn interacted_items(&self, user_id: &str) -> Vec<String> {
        match self.matrix.user_row(user_id) {
            Some(row) => row
                .iter()
                .zip(&self.matrix.items)
                .filter(|(score, _)| **score > 0.0)
                .map(|(_, id)| id.clone())
                .collect(),
            None => Vec::new(),
        }
    }

    /// Ranks candidate items for `user_id`, best first
    ///
    /// Candidates are all matrix items minus interacted, cart and purchased
    /// items. Only positive similarities to positively scored items count,
    /// and candidates whose total is not positive are dropped.
    pub fn recommend(&self, user_id: &str, exclusions: &Exclusions, top_n: usize) -> Vec<ScoredItem> {
        let Some(user_row) = self.matrix.user_row(user_id) else {
            return Vec::new();
        };
        if self.matrix.items.len() < 2 {
            return Vec::new();
        }

        let interacted = self.interacted_items(user_id);
        let excluded: HashSet<String> = exclusion_set([
            interacted.as_slice(),
            exclusions.cart.as_slice(),
            exclusions.purchased.as_slice(),
        ]);

        let engaged: Vec<(usize, f64)> = user_row
            .iter()
            .copied()
            .enumerate()
            .filter(|(_, score)| *score > 0.0)
            .collect();

        let scored: Vec<(usize, f64)> = self
            .matrix
            .items
            .iter()
            .enumerate()
            .filter(|(_, id)| !excluded.contains(id.as_str()))
            .filter_map(|(candidate, _)| {
                let total: f64 = engaged
                    .iter()
                    .map(|&(item, user_score)| {
                        let sim = self.similarity[[candidate, item]];
                        if sim > 0.0 {
                            sim * user_score
                        } else {
                            0.0
                        }
                    })
                    .sum();
                (total > 0.0).then_some((candidate, total))
            })
            .collect();

        tracing::debug!(
            user_id = %user_id,
            excluded = excluded.len(),
            scored = scored.len(),
            "Scored collaborative candidates"
        );

        top_n_by_score(scored, top_n)
            .into_iter()
            .map(|(index, score)| ScoredItem {
                product_id: self.matrix.items[index].clone(),
                score,
            })
            .collect()
    }
}
