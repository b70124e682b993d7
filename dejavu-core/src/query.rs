//! # Busca de Candidatas a Duplicata
//!
//! Orquestração fina sobre três colaboradores externos: o pipeline de
//! mascaramento, o encoder de sentenças e o índice de vizinhos mais
//! próximos. O fluxo é sempre o mesmo:
//!
//! ```text
//! consultas ──mascara──▶ embedda ──┐
//!                                  ├──▶ busca top-k ──▶ junta com as
//! corpus ────mascara──▶ embedda ──┘        (produto interno)  sentenças originais
//! ```
//!
//! O corpus pode chegar pré-mascarado ou pré-embeddado (artefatos salvos de
//! uma rodada anterior) — cada artefato curto-circuita a etapa
//! correspondente. As consultas são sempre mascaradas e embeddadas de novo:
//! não há cache entre chamadas.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::embed::Embedder;
use crate::error::DejavuError;
use crate::pipeline::{MaskingPipeline, Tagger};

/// Capacidade externa de busca de vizinhos mais próximos.
///
/// Contrato: similaridade por produto interno; a linha `i` das duas saídas
/// corresponde à consulta `i`; scores em ordem decrescente dentro de cada
/// linha. Desempate é da conta do índice — o núcleo não impõe o seu.
pub trait AnnIndex {
    fn search(
        &self,
        queries: &[Vec<f32>],
        corpus: &[Vec<f32>],
        k: usize,
    ) -> Result<(Vec<Vec<f32>>, Vec<Vec<usize>>), DejavuError>;
}

impl<I: AnnIndex + ?Sized> AnnIndex for &I {
    fn search(
        &self,
        queries: &[Vec<f32>],
        corpus: &[Vec<f32>],
        k: usize,
    ) -> Result<(Vec<Vec<f32>>, Vec<Vec<usize>>), DejavuError> {
        (**self).search(queries, corpus, k)
    }
}

/// Índice de referência: varredura exata por produto interno.
///
/// Cobre o contrato de [`AnnIndex`] sem aproximação nenhuma — serve para
/// testes, demonstrações e corpora pequenos. Empates mantêm a ordem dos
/// índices do corpus (ordenação estável). Retorna `min(k, len(corpus))`
/// vizinhos por consulta.
#[derive(Debug, Clone, Copy, Default)]
pub struct FlatIpIndex;

impl AnnIndex for FlatIpIndex {
    fn search(
        &self,
        queries: &[Vec<f32>],
        corpus: &[Vec<f32>],
        k: usize,
    ) -> Result<(Vec<Vec<f32>>, Vec<Vec<usize>>), DejavuError> {
        if let Some(dim) = corpus.first().map(Vec::len) {
            for row in corpus.iter().chain(queries) {
                if row.len() != dim {
                    return Err(DejavuError::DimensionMismatch {
                        expected: dim,
                        got: row.len(),
                    });
                }
            }
        }

        let mut distances = Vec::with_capacity(queries.len());
        let mut indices = Vec::with_capacity(queries.len());
        for query in queries {
            let mut scored: Vec<(usize, f32)> = corpus
                .iter()
                .enumerate()
                .map(|(i, row)| (i, dot(query, row)))
                .collect();
            scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
            scored.truncate(k);
            indices.push(scored.iter().map(|&(i, _)| i).collect());
            distances.push(scored.iter().map(|&(_, s)| s).collect());
        }
        Ok((distances, indices))
    }
}

fn dot(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

/// Resultado de uma consulta: a sentença original, os `k` vizinhos do
/// corpus (já traduzidos de volta para texto) e os scores de similaridade,
/// na ordem devolvida pelo índice.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryMatch {
    pub query: String,
    pub neighbours: Vec<String>,
    pub distances: Vec<f32>,
}

/// Artefatos pré-computados do corpus, de uma rodada anterior.
///
/// `embeddings` curto-circuita mascaramento E embedding; `masked`
/// curto-circuita só o mascaramento. `id_map` traduz índice do corpus →
/// sentença original; sem ele, usa-se o próprio lote `corpus` como mapa
/// identidade.
#[derive(Debug, Clone, Default)]
pub struct CorpusArtifacts {
    pub masked: Option<Vec<String>>,
    pub embeddings: Option<Vec<Vec<f32>>>,
    pub id_map: Option<BTreeMap<usize, String>>,
}

/// O buscador de candidatas a duplicata: pipeline de mascaramento + encoder
/// + índice, todos injetados.
pub struct Retriever<T: Tagger, E: Embedder, I: AnnIndex> {
    pub pipeline: MaskingPipeline<T>,
    pub embedder: E,
    pub index: I,
}

impl<T: Tagger, E: Embedder, I: AnnIndex> Retriever<T, E, I> {
    pub fn new(pipeline: MaskingPipeline<T>, embedder: E, index: I) -> Self {
        Self {
            pipeline,
            embedder,
            index,
        }
    }

    /// Encontra, para cada consulta, as `k` sentenças mais próximas do
    /// corpus no espaço de embeddings mascarados.
    ///
    /// O mapa devolvido tem uma entrada por consulta, indexada pela posição
    /// da consulta no lote de entrada.
    pub fn find_duplicates(
        &self,
        queries: &[String],
        corpus: &[String],
        k: usize,
        artifacts: CorpusArtifacts,
    ) -> Result<BTreeMap<usize, QueryMatch>, DejavuError> {
        let corpus_embeddings = match artifacts.embeddings {
            Some(embeddings) => embeddings,
            None => {
                let masked = match artifacts.masked {
                    Some(masked) => masked,
                    None => self.pipeline.mask_batch(corpus)?,
                };
                self.encode_checked(&masked)?
            }
        };

        // consultas sempre frescas: sem cache entre chamadas
        let masked_queries = self.pipeline.mask_batch(queries)?;
        let query_embeddings = self.encode_checked(&masked_queries)?;

        let (distances, indices) =
            self.index
                .search(&query_embeddings, &corpus_embeddings, k)?;
        if indices.len() != queries.len() || distances.len() != queries.len() {
            return Err(DejavuError::BatchShape {
                expected: queries.len(),
                got: indices.len().min(distances.len()),
            });
        }

        let mut results = BTreeMap::new();
        for (i, query) in queries.iter().enumerate() {
            let mut neighbours = Vec::with_capacity(indices[i].len());
            for &id in &indices[i] {
                let sentence = match &artifacts.id_map {
                    Some(map) => map.get(&id).cloned(),
                    None => corpus.get(id).cloned(),
                };
                neighbours.push(sentence.ok_or(DejavuError::UnknownCorpusId(id))?);
            }
            results.insert(
                i,
                QueryMatch {
                    query: query.clone(),
                    neighbours,
                    distances: distances[i].clone(),
                },
            );
        }
        Ok(results)
    }

    fn encode_checked(&self, sentences: &[String]) -> Result<Vec<Vec<f32>>, DejavuError> {
        let embeddings = self.embedder.encode(sentences)?;
        if embeddings.len() != sentences.len() {
            return Err(DejavuError::BatchShape {
                expected: sentences.len(),
                got: embeddings.len(),
            });
        }
        Ok(embeddings)
    }
}
