use std::collections::{HashMap, HashSet};
use std::sync::LazyLock;

use regex::Regex;

use crate::models::Category;

/// Unintelligible-speech convention in CHAT transcripts: three or more
/// characters drawn only from x, y, w.
static NOISE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[xyw]{3,}$").unwrap());

/// Immutable vocabulary configuration for the classifier.
///
/// Term sets, compound tables, and function-word lists are injected rather
/// than global so tests can run with reduced vocabularies.
#[derive(Debug, Clone)]
pub struct Lexicon {
    terms: HashSet<String>,
    parent: HashSet<String>,
    grandparent: HashSet<String>,
    title_capable: HashSet<String>,
    compounds: HashMap<(String, String), String>,
    compound_components: HashSet<String>,
    determiners: HashSet<String>,
    conjunctions: HashSet<String>,
    discourse: HashSet<String>,
    variants: HashMap<String, String>,
    term_order: Vec<String>,
}

fn set(words: &[&str]) -> HashSet<String> {
    words.iter().map(|w| w.to_string()).collect()
}

impl Lexicon {
    /// The broad North American kinship vocabulary used for CHILDES Eng-NA.
    pub fn english() -> Self {
        let term_order: Vec<String> = [
            "mom", "mommy", "momma", "mama", "ma", "mother",
            "dad", "daddy", "dada", "papa", "pa", "father",
            "parent",
            "grandma", "grandpa", "granny", "gramma", "nana", "grandmom", "grandmommy",
            "grandmother", "grandfather", "granddad", "granddaddy", "gramps", "grampa",
            "grandpapa", "grandmama", "grandparent",
            "aunt", "auntie", "aunty", "uncle", "cousin", "niece", "nephew",
            "brother", "sister", "sibling", "sissy",
            "son", "daughter", "grandchild", "grandson", "granddaughter",
            "stepmom", "stepdad", "stepmother", "stepfather", "stepsister", "stepbrother",
            "stepson", "stepdaughter", "stepchild",
        ]
        .iter()
        .map(|t| t.to_string())
        .collect();

        let parent = set(&[
            "mom", "mommy", "momma", "mama", "ma", "mother",
            "dad", "daddy", "dada", "papa", "pa", "father",
        ]);

        let grandparent = set(&[
            "grandma", "grandpa", "granny", "gramma", "nana", "grandmom", "grandmommy",
            "grandmother", "grandfather", "granddad", "granddaddy", "gramps", "grampa",
            "grandpapa", "grandmama", "grandparent",
        ]);

        // Terms that commonly head title+name constructions (Auntie Sarah,
        // Grandma Peggy, Uncle John, Papa Joe). Core parent terms virtually
        // never take a following proper noun in English.
        let title_capable = set(&[
            "aunt", "auntie", "aunty", "uncle", "brother", "sister",
            "grandma", "grandpa", "granny", "gramma", "nana", "grandmom", "grandmommy",
            "grandmother", "grandfather", "granddad", "granddaddy", "gramps", "grampa",
            "grandpapa", "grandmama",
            "mama", "papa",
        ]);

        let compound_pairs: &[(&str, &str, &str)] = &[
            ("grand", "ma", "grandma"),
            ("grand", "mom", "grandmom"),
            ("grand", "mommy", "grandmommy"),
            ("grand", "mother", "grandmother"),
            ("grand", "pa", "grandpa"),
            ("grand", "dad", "granddad"),
            ("grand", "daddy", "granddaddy"),
            ("grand", "father", "grandfather"),
            ("grand", "papa", "grandpapa"),
            ("grand", "mama", "grandmama"),
            ("step", "mom", "stepmom"),
            ("step", "dad", "stepdad"),
            ("step", "mother", "stepmother"),
            ("step", "father", "stepfather"),
            ("step", "sister", "stepsister"),
            ("step", "brother", "stepbrother"),
            ("step", "son", "stepson"),
            ("step", "daughter", "stepdaughter"),
            ("step", "child", "stepchild"),
        ];

        let mut compounds = HashMap::new();
        let mut compound_components = HashSet::new();
        for (a, b, whole) in compound_pairs {
            compounds.insert((a.to_string(), b.to_string()), whole.to_string());
            compound_components.insert(a.to_string());
            compound_components.insert(b.to_string());
        }

        let discourse = set(&[
            "hey", "hi", "hello", "oh", "okay", "ok", "yeah", "yep", "yes", "no",
            "please", "well", "uh", "um", "huh", "hm", "hmm", "mm",
        ]);

        let determiners = set(&[
            "a", "an", "the",
            "this", "that", "these", "those",
            "my", "your", "his", "her", "our", "their", "its", "whose",
            "some", "any", "no", "each", "every", "either", "neither", "both", "all",
            "much", "many", "few", "several", "another", "other", "such", "one",
        ]);

        let conjunctions = set(&["and", "or"]);

        let variants: HashMap<String, String> = [
            ("neighbour", "neighbor"),
            ("neighbours", "neighbor"),
        ]
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();

        Self {
            terms: term_order.iter().cloned().collect(),
            parent,
            grandparent,
            title_capable,
            compounds,
            compound_components,
            determiners,
            conjunctions,
            discourse,
            variants,
            term_order,
        }
    }

    /// Build a reduced lexicon for tests: `terms` become the full term set
    /// (all categorized as `Extended` unless listed in `parent`).
    pub fn with_terms(terms: &[&str], parent: &[&str]) -> Self {
        let mut lex = Self::english();
        lex.terms = set(terms);
        lex.parent = set(parent);
        lex.grandparent = HashSet::new();
        lex.term_order = terms.iter().map(|t| t.to_string()).collect();
        lex
    }

    pub fn is_term(&self, word: &str) -> bool {
        self.terms.contains(word)
    }

    /// Semantic category of a kinship term; `None` for non-kinship words.
    pub fn category(&self, term: &str) -> Option<Category> {
        if !self.terms.contains(term) {
            return None;
        }
        if self.parent.contains(term) {
            Some(Category::Parent)
        } else if self.grandparent.contains(term) {
            Some(Category::Grandparent)
        } else {
            Some(Category::Extended)
        }
    }

    /// Terms in stable output order.
    pub fn term_order(&self) -> &[String] {
        &self.term_order
    }

    pub fn is_determiner(&self, word: &str) -> bool {
        self.determiners.contains(word)
    }

    pub fn is_conjunction(&self, word: &str) -> bool {
        self.conjunctions.contains(word)
    }

    pub fn is_discourse(&self, word: &str) -> bool {
        self.discourse.contains(word)
    }

    pub fn is_title_capable(&self, term: &str) -> bool {
        self.title_capable.contains(term)
    }

    /// Look up a registered two-part compound.
    pub fn compound(&self, first: &str, second: &str) -> Option<&str> {
        self.compounds
            .get(&(first.to_string(), second.to_string()))
            .map(|s| s.as_str())
    }

    /// True iff the lowercased token is an unintelligible-speech marker.
    pub fn is_noise(token: &str) -> bool {
        NOISE_RE.is_match(&token.to_lowercase())
    }

    /// True iff the raw token carries genitive/possessive marking.
    pub fn has_genitive(token: &str) -> bool {
        let t = token.to_lowercase();
        t.ends_with("'s") || t.ends_with("’s") || t.ends_with("s'")
    }

    /// Map a raw surface token to its normalized lexeme form.
    ///
    /// Lowercases, strips possessive suffixes when the base is a known
    /// lexeme or compound component, strips regular plural suffixes when
    /// the base is a known lexeme of length >= 3 (the guard keeps short
    /// forms like "ma" intact), and folds dialectal variants last.
    /// Returns the lowercased token unchanged when no rule applies.
    pub fn normalize(&self, raw: &str) -> String {
        let mut t = raw.to_lowercase();

        if let Some(base) = possessive_base(&t) {
            if self.terms.contains(&base) || self.compound_components.contains(&base) {
                t = base;
            }
        }

        if let Some(stem) = t.strip_suffix("ies") {
            let base = format!("{stem}y");
            if self.terms.contains(&base) {
                return self.fold_variant(base);
            }
        }
        if let Some(base) = t.strip_suffix("es") {
            if base.len() >= 3 && self.terms.contains(base) {
                return self.fold_variant(base.to_string());
            }
        }
        if let Some(base) = t.strip_suffix('s') {
            if base.len() >= 3 && self.terms.contains(base) {
                return self.fold_variant(base.to_string());
            }
        }

        self.fold_variant(t)
    }

    fn fold_variant(&self, word: String) -> String {
        match self.variants.get(&word) {
            Some(folded) => folded.clone(),
            None => word,
        }
    }
}

impl Default for Lexicon {
    fn default() -> Self {
        Self::english()
    }
}

/// Candidate base form after possessive stripping, if the token carries a
/// possessive suffix. `moms'` loses only the apostrophe; the plural rules
/// then take the `s`.
fn possessive_base(t: &str) -> Option<String> {
    if let Some(base) = t.strip_suffix("'s").or_else(|| t.strip_suffix("’s")) {
        return Some(base.to_string());
    }
    if t.ends_with("s'") {
        return Some(t[..t.len() - 1].to_string());
    }
    None
}
