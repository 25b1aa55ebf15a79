//! Text vectorization for the content engine.
//!
//! Tokens are lowercase runs of two or more alphanumeric/underscore
//! characters. English stop words are dropped, counts are weighted with a
//! smoothed idf and every document vector is L2-normalised.

use std::collections::{BTreeMap, HashSet};
use std::sync::OnceLock;

/// Sparse document vector: `(term index, weight)` pairs sorted by term index
pub type SparseVector = Vec<(usize, f64)>;

const ENGLISH_STOP_WORDS: &[&str] = &[
    "a", "about", "above", "across", "after", "afterwards", "again", "against", "all", "almost",
    "alone", "along", "already", "also", "although", "always", "am", "among", "amongst",
    "amoungst", "amount", "an", "and", "another", "any", "anyhow", "anyone", "anything", "anyway",
    "anywhere", "are", "around", "as", "at", "back", "be", "became", "because", "become",
    "becomes", "becoming", "been", "before", "beforehand", "behind", "being", "below", "beside",
    "besides", "between", "beyond", "bill", "both", "bottom", "but", "by", "call", "can",
    "cannot", "cant", "co", "con", "could", "couldnt", "cry", "de", "describe", "detail", "do",
    "done", "down", "due", "during", "each", "eg", "eight", "either", "eleven", "else",
    "elsewhere", "empty", "enough", "etc", "even", "ever", "every", "everyone", "everything",
    "everywhere", "except", "few", "fifteen", "fifty", "fill", "find", "fire", "first", "five",
    "for", "former", "formerly", "forty", "found", "four", "from", "front", "full", "further",
    "get", "give", "go", "had", "has", "hasnt", "have", "he", "hence", "her", "here",
    "hereafter", "hereby", "herein", "hereupon", "hers", "herself", "him", "himself", "his",
    "how", "however", "hundred", "i", "ie", "if", "in", "inc", "indeed", "interest", "into",
    "is", "it", "its", "itself", "keep", "last", "latter", "latterly", "least", "less", "ltd",
    "made", "many", "may", "me", "meanwhile", "might", "mill", "mine", "more", "moreover",
    "most", "mostly", "move", "much", "must", "my", "myself", "name", "namely", "neither",
    "never", "nevertheless", "next", "nine", "no", "nobody", "none", "noone", "nor", "not",
    "nothing", "now", "nowhere", "of", "off", "often", "on", "once", "one", "only", "onto", "or",
    "other", "others", "otherwise", "our", "ours", "ourselves", "out", "over", "own", "part",
    "per", "perhaps", "please", "put", "rather", "re", "same", "see", "seem", "seemed",
    "seeming", "seems", "serious", "several", "she", "should", "show", "side", "since",
    "sincere", "six", "sixty", "so", "some", "somehow", "someone", "something", "sometime",
    "sometimes", "somewhere", "still", "such", "system", "take", "ten", "than", "that", "the",
    "their", "them", "themselves", "then", "thence", "there", "thereafter", "thereby",
    "therefore", "therein", "thereupon", "these", "they", "thick", "thin", "third", "this",
    "those", "though", "three", "through", "throughout", "thru", "thus", "to", "together", "too",
    "top", "toward", "towards", "twelve", "twenty", "two", "un", "under", "until", "up", "upon",
    "us", "very", "via", "was", "we", "well", "were", "what", "whatever", "when", "whence",
    "whenever", "where", "whereafter", "whereas", "whereby", "wherein", "whereupon", "wherever",
    "whether", "which", "while", "whither", "who", "whoever", "whole", "whom", "whose", "why",
    "will", "with", "within", "without", "would", "yet", "you", "your", "yours", "yourself",
    "yourselves",
];

fn stop_words() -> &'static HashSet<&'static str> {
    static STOP_WORDS: OnceLock<HashSet<&'static str>> = OnceLock::new();
    STOP_WORDS.get_or_init(|| ENGLISH_STOP_WORDS.iter().copied().collect())
}

pub fn is_stop_word(token: &str) -> bool {
    stop_words().contains(token)
}

/// Splits text into lowercase word tokens of at least two characters
pub fn tokenize(text: &str) -> Vec<String> {
    text.to_lowercase()
        .split(|c: char| !(c.is_alphanumeric() || c == '_'))
        .filter(|token| token.chars().count() >= 2)
        .map(str::to_string)
        .collect()
}

/// TF-IDF weights for a corpus, one row per document
#[derive(Debug, Clone)]
pub struct TfidfMatrix {
    /// Terms in index order (sorted)
    pub vocabulary: Vec<String>,
    pub rows: Vec<SparseVector>,
}

impl TfidfMatrix {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

#[derive(Debug, Clone)]
pub struct TfidfVectorizer {
    remove_stop_words: bool,
}

impl Default for TfidfVectorizer {
    fn default() -> Self {
        Self::english()
    }
}

impl TfidfVectorizer {
    /// Vectorizer with English stop-word removal
    pub fn english() -> Self {
        Self {
            remove_stop_words: true,
        }
    }

    fn analyze(&self, document: &str) -> Vec<String> {
        tokenize(document)
            .into_iter()
            .filter(|token| !self.remove_stop_words || !is_stop_word(token))
            .collect()
    }

    /// Learns the vocabulary from `documents` and returns their vectors
    ///
    /// A corpus with no usable terms yields all-empty rows rather than an error.
    pub fn fit_transform<S: AsRef<str>>(&self, documents: &[S]) -> TfidfMatrix {
        let counts: Vec<BTreeMap<String, usize>> = documents
            .iter()
            .map(|doc| {
                let mut terms = BTreeMap::new();
                for token in self.analyze(doc.as_ref()) {
                    *terms.entry(token).or_insert(0) += 1;
                }
                terms
            })
            .collect();

        let mut document_frequency: BTreeMap<&str, usize> = BTreeMap::new();
        for terms in &counts {
            for term in terms.keys() {
                *document_frequency.entry(term.as_str()).or_insert(0) += 1;
            }
        }

        let vocabulary: Vec<String> = document_frequency.keys().map(|t| t.to_string()).collect();
        let n_docs = documents.len() as f64;
        let idf: Vec<f64> = document_frequency
            .values()
            .map(|&df| ((1.0 + n_docs) / (1.0 + df as f64)).ln() + 1.0)
            .collect();

        let rows = counts
            .iter()
            .map(|terms| {
                let mut row: SparseVector = terms
                    .iter()
                    .filter_map(|(term, &count)| {
                        let index = vocabulary.binary_search(term).ok()?;
                        Some((index, count as f64 * idf[index]))
                    })
                    .collect();
                l2_normalize(&mut row);
                row
            })
            .collect();

        TfidfMatrix { vocabulary, rows }
    }
}

fn l2_normalize(row: &mut SparseVector) {
    let norm = row.iter().map(|(_, w)| w * w).sum::<f64>().sqrt();
    if norm > 0.0 {
        for (_, weight) in row.iter_mut() {
            *weight /= norm;
        }
    }
}
