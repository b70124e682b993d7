//! # Preparação de Texto para o Encoder de Sentenças
//!
//! O encoder de sentenças é um colaborador externo: o núcleo não roda
//! inferência. O que mora aqui é a transformação determinística que antecede
//! e sucede a chamada do modelo:
//!
//! - tradução dos tokens placeholder `[MASK]` / `[SEP]` para os tokens
//!   especiais concretos do encoder escolhido (cada tokenizador tem os
//!   seus);
//! - composição de manchete/byline/corpo em um único texto de artigo;
//! - normalização dos embeddings para comprimento unitário, exigida pela
//!   métrica de produto interno da busca.

use serde::{Deserialize, Serialize};

use crate::error::DejavuError;

/// Capacidade externa de embedding de sentenças.
///
/// Contrato: um vetor de dimensão fixa por sentença, preservando a ordem.
pub trait Embedder {
    fn encode(&self, sentences: &[String]) -> Result<Vec<Vec<f32>>, DejavuError>;
}

impl<E: Embedder + ?Sized> Embedder for &E {
    fn encode(&self, sentences: &[String]) -> Result<Vec<Vec<f32>>, DejavuError> {
        (**self).encode(sentences)
    }
}

/// Tokens especiais do encoder em uso.
///
/// As sentenças mascaradas carregam os placeholders `[MASK]` e `[SEP]`;
/// antes de embedar, [`SpecialTokens::render`] os troca pelos tokens que o
/// tokenizador do encoder realmente entende (ex: `<mask>` e `</s>` em
/// modelos RoBERTa-like).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpecialTokens {
    pub mask: String,
    pub sep: String,
}

impl SpecialTokens {
    pub fn new(mask: impl Into<String>, sep: impl Into<String>) -> Self {
        Self {
            mask: mask.into(),
            sep: sep.into(),
        }
    }

    /// Troca os placeholders de um texto pelos tokens concretos.
    pub fn render(&self, text: &str) -> String {
        text.replace("[MASK]", &self.mask).replace("[SEP]", &self.sep)
    }

    /// Versão em lote de [`SpecialTokens::render`].
    pub fn render_batch(&self, texts: &[String]) -> Vec<String> {
        texts.iter().map(|t| self.render(t)).collect()
    }
}

impl Default for SpecialTokens {
    /// Identidade: os placeholders já são os tokens do encoder.
    fn default() -> Self {
        Self::new("[MASK]", "[SEP]")
    }
}

/// Compõe manchete, byline e corpo em um único texto de artigo, com o
/// separador do encoder entre o cabeçalho e o corpo.
pub fn compose_article(headline: Option<&str>, byline: &str, text: &str, sep: &str) -> String {
    match headline {
        Some(headline) => format!("{headline}{byline} {sep} {text}"),
        None => format!("{byline} {sep} {text}"),
    }
}

/// Normaliza cada linha de embedding para comprimento unitário (norma L2).
///
/// Linhas de norma zero ficam como estão em vez de virar NaN.
pub fn normalize_rows(rows: &mut [Vec<f32>]) {
    for row in rows.iter_mut() {
        let norm = row.iter().map(|v| v * v).sum::<f32>().sqrt();
        if norm > 0.0 {
            for v in row.iter_mut() {
                *v /= norm;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_troca_placeholders() {
        let tokens = SpecialTokens::new("<mask>", "</s>");
        assert_eq!(
            tokens.render("[MASK] fundou a [MASK] [SEP] em 1901"),
            "<mask> fundou a <mask> </s> em 1901"
        );
    }

    #[test]
    fn test_render_identidade_por_padrao() {
        let tokens = SpecialTokens::default();
        let text = "[MASK] viajou para [MASK]";
        assert_eq!(tokens.render(text), text);
    }

    #[test]
    fn test_render_batch_preserva_ordem() {
        let tokens = SpecialTokens::new("<m>", "<s>");
        let batch = vec!["[MASK] a".to_string(), "b [SEP]".to_string()];
        assert_eq!(tokens.render_batch(&batch), vec!["<m> a", "b <s>"]);
    }

    #[test]
    fn test_compose_article() {
        assert_eq!(
            compose_article(Some("Titanic afunda"), " por A. Smith", "O navio...", "[SEP]"),
            "Titanic afunda por A. Smith [SEP] O navio..."
        );
        assert_eq!(
            compose_article(None, "por A. Smith", "O navio...", "[SEP]"),
            "por A. Smith [SEP] O navio..."
        );
    }

    #[test]
    fn test_normalizacao_unitaria() {
        let mut rows = vec![vec![3.0, 4.0], vec![0.0, 0.0]];
        normalize_rows(&mut rows);
        assert!((rows[0][0] - 0.6).abs() < 1e-6);
        assert!((rows[0][1] - 0.8).abs() < 1e-6);
        // linha nula fica intacta
        assert_eq!(rows[1], vec![0.0, 0.0]);
    }
}
