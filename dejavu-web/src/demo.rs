//! # Colaboradores de Demonstração
//!
//! O núcleo trata tagger, embedder e índice como capacidades externas
//! injetadas. Em produção essas capacidades são modelos de verdade
//! (classificador de tokens, encoder de sentenças); aqui o servidor usa
//! substitutos determinísticos, suficientes para demonstrar o fluxo completo
//! sem carregar modelo nenhum:
//!
//! - [`LexiconTagger`]: gazetteers pequenos + heurística de capitalização.
//! - [`HashedEmbedder`]: hashing de trigramas de caracteres em dimensão
//!   fixa, normalizado para comprimento unitário.
//!
//! O índice de demonstração é o próprio [`dejavu_core::FlatIpIndex`].

use std::collections::hash_map::DefaultHasher;
use std::collections::HashSet;
use std::hash::{Hash, Hasher};

use regex::Regex;
use unicode_segmentation::UnicodeSegmentation;

use dejavu_core::{normalize_rows, DejavuError, Embedder, TaggedWord, Tagger};

/// Tagger de demonstração por gazetteers.
///
/// Rotula tokens presentes nas listas com `B-`/`I-` conforme a posição no
/// span; uma palavra capitalizada logo após um span aberto continua esse
/// span (cobre sobrenomes e segundas palavras de organizações fora das
/// listas).
pub struct LexiconTagger {
    persons: HashSet<String>,
    locations: HashSet<String>,
    orgs: HashSet<String>,
    capitalized: Regex,
}

impl LexiconTagger {
    pub fn new() -> Self {
        let persons = [
            "john", "doe", "elon", "musk", "jeff", "bezos", "serena",
            "williams", "roger", "federer", "smith", "lula",
        ];
        let locations = [
            "paris", "london", "boston", "wimbledon", "brasil", "kyoto",
            "york", "chicago",
        ];
        let orgs = [
            "google", "tesla", "spacex", "blue", "origin", "fifa", "nações",
            "unidas", "united", "nations", "petrobras",
        ];
        Self {
            persons: persons.iter().map(|s| s.to_string()).collect(),
            locations: locations.iter().map(|s| s.to_string()).collect(),
            orgs: orgs.iter().map(|s| s.to_string()).collect(),
            capitalized: Regex::new(r"^\p{Lu}[\p{L}\p{N}'-]*$").expect("regex fixa"),
        }
    }

    fn lookup(&self, lower: &str) -> Option<&'static str> {
        if self.persons.contains(lower) {
            Some("PER")
        } else if self.locations.contains(lower) {
            Some("LOC")
        } else if self.orgs.contains(lower) {
            Some("ORG")
        } else {
            None
        }
    }

    fn tag_sentence(&self, sentence: &str) -> Vec<TaggedWord> {
        let words: Vec<&str> = sentence
            .split_word_bounds()
            .filter(|w| !w.trim().is_empty())
            .collect();

        let mut tagged = Vec::with_capacity(words.len());
        let mut open: Option<&'static str> = None;
        for word in words {
            let lower = word.to_lowercase();
            let label = match self.lookup(&lower) {
                Some(kind) if open == Some(kind) => format!("I-{kind}"),
                Some(kind) => {
                    open = Some(kind);
                    format!("B-{kind}")
                }
                None => match open {
                    Some(kind) if self.capitalized.is_match(word) => format!("I-{kind}"),
                    _ => {
                        open = None;
                        "O".to_string()
                    }
                },
            };
            tagged.push(TaggedWord::new(word, &label));
        }
        tagged
    }
}

impl Default for LexiconTagger {
    fn default() -> Self {
        Self::new()
    }
}

impl Tagger for LexiconTagger {
    fn classify(&self, sentences: &[String]) -> Result<Vec<Vec<TaggedWord>>, DejavuError> {
        Ok(sentences.iter().map(|s| self.tag_sentence(s)).collect())
    }
}

/// Embedder de demonstração: hashing de trigramas de caracteres.
///
/// Sentenças com texto idêntico produzem vetores idênticos; sobreposição de
/// trigramas vira similaridade de produto interno. Não captura semântica —
/// é exatamente o suficiente para exercitar a busca de ponta a ponta.
pub struct HashedEmbedder {
    pub dim: usize,
}

impl HashedEmbedder {
    pub fn new(dim: usize) -> Self {
        Self { dim }
    }
}

impl Default for HashedEmbedder {
    fn default() -> Self {
        Self::new(256)
    }
}

impl Embedder for HashedEmbedder {
    fn encode(&self, sentences: &[String]) -> Result<Vec<Vec<f32>>, DejavuError> {
        let mut rows: Vec<Vec<f32>> = sentences
            .iter()
            .map(|sentence| {
                let mut row = vec![0.0f32; self.dim];
                let chars: Vec<char> = sentence.to_lowercase().chars().collect();
                for trigram in chars.windows(3) {
                    let mut hasher = DefaultHasher::new();
                    trigram.hash(&mut hasher);
                    let bucket = (hasher.finish() as usize) % self.dim;
                    row[bucket] += 1.0;
                }
                row
            })
            .collect();
        normalize_rows(&mut rows);
        Ok(rows)
    }
}
