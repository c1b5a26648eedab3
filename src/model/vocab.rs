//! Ordered Vocabulary
//!
//! On-disk word order with an O(1) word → index map.

use hashbrown::HashMap;

/// Ordered, duplicate-free word list
#[derive(Debug, Clone, Default)]
pub struct Vocabulary {
    words: Vec<String>,
    index: HashMap<String, usize>,
}

impl Vocabulary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            words: Vec::with_capacity(capacity),
            index: HashMap::with_capacity(capacity),
        }
    }

    /// Append a word, returning its index.
    ///
    /// A word that is already present is handed back as the error.
    pub fn push(&mut self, word: String) -> Result<usize, String> {
        if self.index.contains_key(word.as_str()) {
            return Err(word);
        }
        let idx = self.words.len();
        self.index.insert(word.clone(), idx);
        self.words.push(word);
        Ok(idx)
    }

    /// Index of `word`, if present
    #[inline]
    pub fn get(&self, word: &str) -> Option<usize> {
        self.index.get(word).copied()
    }

    /// Word at `index`
    #[inline]
    pub fn word(&self, index: usize) -> Option<&str> {
        self.words.get(index).map(String::as_str)
    }

    pub fn contains(&self, word: &str) -> bool {
        self.index.contains_key(word)
    }

    /// Words in file order
    pub fn words(&self) -> &[String] {
        &self.words
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.words.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}
