use ndarray::Array2;

use crate::{
    error::{AppError, AppResult},
    models::{Product, ProductSummary},
    services::{
        ranking::top_n_by_score,
        similarity::pairwise_cosine,
        text::TfidfVectorizer,
    },
};

/// Content-based neighbour search over one product snapshot
///
/// The vocabulary is learnt from the snapshot itself, so scores are relative
/// to the catalog at call time. `prepare` must run before any ranking call.
pub struct ContentEngine<'a> {
    products: &'a [Product],
    corpus: Option<Vec<String>>,
    vectorizer: TfidfVectorizer,
}

impl<'a> ContentEngine<'a> {
    pub fn new(products: &'a [Product]) -> Self {
        Self {
            products,
            corpus: None,
            vectorizer: TfidfVectorizer::english(),
        }
    }

    /// Builds the text column (name + description) for every product
    pub fn prepare(mut self) -> Self {
        self.corpus = Some(self.products.iter().map(Product::combined_text).collect());
        self
    }

    /// Pairwise cosine similarity of the products' TF-IDF vectors
    pub fn similarity_matrix(&self) -> AppResult<Array2<f64>> {
        let corpus = self.corpus.as_ref().ok_or_else(|| {
            AppError::Precondition(
                "text features have not been built; call prepare() first".to_string(),
            )
        })?;

        let tfidf = self.vectorizer.fit_transform(corpus.as_slice());
        tracing::debug!(
            documents = tfidf.len(),
            vocabulary = tfidf.vocabulary.len(),
            "Built TF-IDF matrix"
        );

        Ok(pairwise_cosine(&tfidf.rows))
    }

    /// Up to `top_n` products most similar to `product_id`, best first
    ///
    /// Returns an empty list for an empty snapshot or an unknown id.
    pub fn recommend(&self, product_id: &str, top_n: usize) -> AppResult<Vec<ProductSummary>> {
        if self.products.is_empty() {
            return Ok(Vec::new());
        }

        let sim = self.similarity_matrix()?;

        let Some(target) = self.products.iter().position(|p| p.id == product_id) else {
            tracing::debug!(product_id = %product_id, "Product not in snapshot");
            return Ok(Vec::new());
        };

        let scored: Vec<(usize, f64)> = sim
            .row(target)
            .iter()
            .copied()
            .enumerate()
            .filter(|(index, _)| *index != target)
            .collect();

        Ok(top_n_by_score(scored, top_n)
            .into_iter()
            .map(|(index, _)| ProductSummary::from(&self.products[index]))
            .collect())
    }
}

/// Builds text features for `products` and returns the neighbours of `product_id`
pub fn similar_products(
    products: &[Product],
    product_id: &str,
    top_n: usize,
) -> AppResult<Vec<ProductSummary>> {
    ContentEngine::new(products).prepare().recommend(product_id, top_n)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn product(id: &str, name: &str, description: Option<&str>) -> Product {
        Product {
            id: id.to_string(),
            name: name.to_string(),
            description: description.map(str::to_string),
            unit_price: Some(1.0),
            list_price: None,
            image_url: None,
            category_id: None,
        }
    }

    fn dessert_catalog() -> Vec<Product> {
        vec![
            product("p1", "Apple Pie", Some("sweet dessert")),
            product("p2", "Apple Tart", Some("sweet dessert")),
            product("p3", "Beef Stew", Some("savory meat")),
        ]
    }

    fn ids(summaries: &[ProductSummary]) -> Vec<&str> {
        summaries.iter().map(|s| s.id.as_str()).collect()
    }

    #[test]
    fn test_textually_closer_product_ranks_first() {
        let products = dessert_catalog();
        let result = similar_products(&products, "p1", 2).unwrap();
        assert_eq!(ids(&result), vec!["p2", "p3"]);
    }

    #[test]
    fn test_target_never_in_own_neighbours() {
        let products = dessert_catalog();
        for target in ["p1", "p2", "p3"] {
            let result = similar_products(&products, target, 10).unwrap();
            assert_eq!(result.len(), 2);
            assert!(!ids(&result).contains(&target));
        }
    }

    #[test]
    fn test_similarity_matrix_symmetric_with_unit_diagonal() {
        let products = dessert_catalog();
        let sim = ContentEngine::new(&products).prepare().similarity_matrix().unwrap();
        for i in 0..products.len() {
            assert!((sim[[i, i]] - 1.0).abs() < 1e-9);
            for j in 0..products.len() {
                assert!((sim[[i, j]] - sim[[j, i]]).abs() < 1e-12);
            }
        }
    }

    #[test]
    fn test_unknown_product_gives_empty_result() {
        let products = dessert_catalog();
        assert!(similar_products(&products, "nope", 5).unwrap().is_empty());
    }

    #[test]
    fn test_empty_snapshot_gives_empty_result() {
        assert!(similar_products(&[], "p1", 5).unwrap().is_empty());
    }

    #[test]
    fn test_top_n_limits_result() {
        let products = dessert_catalog();
        let result = similar_products(&products, "p1", 1).unwrap();
        assert_eq!(ids(&result), vec!["p2"]);
    }

    #[test]
    fn test_ranking_without_prepare_is_a_precondition_error() {
        let products = dessert_catalog();
        let err = ContentEngine::new(&products).recommend("p1", 5).unwrap_err();
        assert!(matches!(err, AppError::Precondition(_)));
    }

    #[test]
    fn test_textless_products_keep_snapshot_order() {
        let products = vec![
            product("a", "the", None),
            product("b", "of", None),
            product("c", "and", Some("")),
        ];
        let result = similar_products(&products, "b", 5).unwrap();
        assert_eq!(ids(&result), vec!["a", "c"]);
    }

    #[test]
    fn test_product_without_text_ranks_deterministically() {
        let products: Vec<Product> = serde_json::from_str(
            r#"[
                {"_id": "p1", "productName": "Apple Pie", "description": "sweet dessert"},
                {"_id": "blank"},
                {"_id": "p2", "productName": "Apple Tart", "description": "sweet dessert"},
                {"_id": "p3", "productName": "Beef Stew"}
            ]"#,
        )
        .unwrap();

        let neighbours = similar_products(&products, "blank", 5).unwrap();
        assert_eq!(ids(&neighbours), vec!["p1", "p2", "p3"]);

        let from_pie = similar_products(&products, "p1", 5).unwrap();
        assert_eq!(ids(&from_pie), vec!["p2", "blank", "p3"]);
    }

    #[test]
    fn test_summary_carries_display_fields() {
        let mut products = dessert_catalog();
        products[1].image_url = Some("tart.png".to_string());
        products[1].category_id = Some("desserts".to_string());
        let result = similar_products(&products, "p1", 1).unwrap();
        assert_eq!(result[0].image_url.as_deref(), Some("tart.png"));
        assert_eq!(result[0].category_id.as_deref(), Some("desserts"));
        assert_eq!(result[0].description.as_deref(), Some("sweet dessert"));
    }
}
