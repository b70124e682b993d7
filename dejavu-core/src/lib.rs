//! # dejavu-core — Detecção de Notícias Quase-Duplicadas em Acervos OCR
//!
//! Jornais históricos republicavam as mesmas matérias de agência com nomes,
//! lugares e datas trocados. Este crate implementa o núcleo determinístico
//! que permite encontrar essas quase-duplicatas: normaliza o texto ruidoso do
//! OCR, **mascara as entidades nomeadas** (para que "Elon Musk fundou a
//! SpaceX" e "Jeff Bezos fundou a Blue Origin" virem o mesmo texto) e junta
//! os resultados da busca vetorial de volta às sentenças originais.
//!
//! ## Arquitetura do Sistema
//!
//! O dado flui em uma direção só, transformado passo a passo:
//!
//! 1.  **Entrada**: Texto bruto de OCR (String).
//! 2.  **Normalização** ([`clean`]): Remove artefatos de escaneamento
//!     preservando um mapa de deslocamentos para voltar ao documento-fonte.
//! 3.  **Tagging** (externo, via trait [`Tagger`]): Um modelo de
//!     classificação de tokens rotula cada palavra no esquema BIO ([`tag`]).
//! 4.  **Consolidação** ([`consolidate`]): Cada span contíguo de entidade
//!     colapsa em um único token de máscara.
//! 5.  **Embedding** (externo, via trait [`Embedder`]): O texto mascarado
//!     vira um vetor de dimensão fixa ([`embed`]).
//! 6.  **Busca** (externa, via trait [`AnnIndex`]) e junção ([`query`]):
//!     top-k por produto interno, traduzido de volta para texto.
//!
//! Inferência de modelos e indexação vetorial são colaboradores EXTERNOS
//! injetados por trait — o núcleo só faz as transformações determinísticas
//! que os alimentam e consomem.
//!
//! ## Exemplo de Uso
//!
//! ```rust
//! use dejavu_core::{consolidate_sentence, MaskOptions, Tag};
//!
//! // Saída (palavras, tags BIO) vinda do tagger externo
//! let words: Vec<String> = ["John", "Doe", "works", "at", "Google"]
//!     .iter().map(|s| s.to_string()).collect();
//! let tags: Vec<Tag> = ["B-PER", "I-PER", "O", "O", "B-ORG"]
//!     .iter().map(|s| Tag::from_label(s)).collect();
//!
//! let masked = consolidate_sentence(&words, &tags, &MaskOptions::default()).unwrap();
//! assert_eq!(masked, "PER works at ORG");
//! ```
//!
//! ## Módulos Principais
//!
//! - [`clean`]: normalizador de OCR com mapa de deslocamentos.
//! - [`consolidate`]: consolidador de spans BIO → sentença mascarada.
//! - [`pipeline`]: orquestração do mascaramento em lote.
//! - [`query`]: busca de candidatas a duplicata e junção dos resultados.

pub mod clean;
pub mod consolidate;
pub mod embed;
pub mod error;
pub mod pipeline;
pub mod query;
pub mod tag;

pub use clean::{clean_ocr, Cleaned};
pub use consolidate::{consolidate, consolidate_sentence, join_tokens, MaskOptions, GENERIC_MASK};
pub use embed::{compose_article, normalize_rows, Embedder, SpecialTokens};
pub use error::DejavuError;
pub use pipeline::{MaskingPipeline, Tagger};
pub use query::{AnnIndex, CorpusArtifacts, FlatIpIndex, QueryMatch, Retriever};
pub use tag::{Tag, TaggedWord, DESIRED_DEFAULT};
