//! # Erros do Núcleo
//!
//! O núcleo distingue duas famílias de falha:
//!
//! 1. **Violação de contrato do chamador** (ex: sequências de palavras e tags
//!    com tamanhos diferentes). Isso indica um bug no código que nos chama e
//!    falha imediatamente com uma variante específica.
//! 2. **Falha de um colaborador externo** (tagger, embedder, índice). O núcleo
//!    não interpreta nem engole essas falhas: elas são propagadas intactas
//!    via [`DejavuError::External`].
//!
//! Tags BIO malformadas NÃO são erro — a saída do tagger é ruidosa por
//! natureza e degrada para token comum (ver [`crate::tag::Tag::from_label`]).

use thiserror::Error;

/// Erro único do crate, retornado por todas as operações falíveis.
#[derive(Debug, Error)]
pub enum DejavuError {
    /// As sequências de palavras e de tags não estão alinhadas 1:1.
    /// Violação de pré-condição do consolidador de spans.
    #[error("sequências desalinhadas: {words} palavras para {tags} tags")]
    LengthMismatch { words: usize, tags: usize },

    /// Um colaborador externo devolveu um lote de tamanho diferente da
    /// entrada, quebrando a invariante de correspondência 1:1.
    #[error("lote com tamanho inesperado: esperava {expected} itens, recebi {got}")]
    BatchShape { expected: usize, got: usize },

    /// Vetores de embedding com dimensões incompatíveis chegaram ao índice.
    #[error("dimensão de embedding incompatível: esperava {expected}, recebi {got}")]
    DimensionMismatch { expected: usize, got: usize },

    /// A busca retornou um índice de corpus ausente no mapa de sentenças
    /// fornecido pelo chamador.
    #[error("índice {0} retornado pela busca não existe no mapa de sentenças")]
    UnknownCorpusId(usize),

    /// Falha vinda de um colaborador externo (tagger, embedder ou índice),
    /// propagada sem reinterpretação.
    #[error(transparent)]
    External(#[from] Box<dyn std::error::Error + Send + Sync>),
}
