//! # Pipeline de Mascaramento — Orquestração sobre o Tagger Externo
//!
//! O pipeline conecta o normalizador de OCR, o tagger externo e o
//! consolidador de spans: limpa (opcionalmente) cada sentença, roda o tagger
//! UMA vez sobre o lote inteiro e consolida cada resultado em uma sentença
//! mascarada.
//!
//! O tagger é uma capacidade **injetada** (trait), nunca um global: o
//! pipeline continua testável com um stub determinístico no lugar do modelo
//! de verdade. Inferência, aceleração de hardware e tamanho interno de lote
//! são responsabilidade do colaborador externo — o pipeline só repassa o
//! lote do chamador.
//!
//! Invariante dura: a saída tem exatamente uma sentença por sentença de
//! entrada, na mesma ordem.

use std::collections::HashSet;

use rayon::prelude::*;

use crate::clean::clean_ocr;
use crate::consolidate::{consolidate_sentence, MaskOptions};
use crate::error::DejavuError;
use crate::tag::TaggedWord;

/// Capacidade externa de classificação de tokens (NER).
///
/// Contrato: uma sequência rotulada por sentença de entrada, preservando a
/// ordem. Erros do modelo são propagados intactos pelo pipeline.
pub trait Tagger {
    fn classify(&self, sentences: &[String]) -> Result<Vec<Vec<TaggedWord>>, DejavuError>;
}

impl<T: Tagger + ?Sized> Tagger for &T {
    fn classify(&self, sentences: &[String]) -> Result<Vec<Vec<TaggedWord>>, DejavuError> {
        (**self).classify(sentences)
    }
}

/// O pipeline de mascaramento: tagger externo + consolidador.
pub struct MaskingPipeline<T: Tagger> {
    tagger: T,
    /// Opções de mascaramento repassadas ao consolidador. O pipeline sempre
    /// consolida com fusão de spans ligada (`merge_consecutive = true`),
    /// independente do valor aqui.
    pub options: MaskOptions,
    /// Quando `true`, cada sentença passa pelo normalizador de OCR em modo
    /// básico antes do tagger. O mapa de deslocamentos é descartado —
    /// realinhamento de spans é responsabilidade de chamadores que precisam
    /// de proveniência, não do mascaramento.
    pub pre_clean: bool,
}

impl<T: Tagger> MaskingPipeline<T> {
    /// Cria o pipeline com as opções padrão (rótulos clássicos, máscara por
    /// tipo, sem pré-limpeza).
    pub fn new(tagger: T) -> Self {
        Self {
            tagger,
            options: MaskOptions::default(),
            pre_clean: false,
        }
    }

    /// Cria o pipeline configurando opções de mascaramento e pré-limpeza.
    pub fn with_options(tagger: T, options: MaskOptions, pre_clean: bool) -> Self {
        Self {
            tagger,
            options,
            pre_clean,
        }
    }

    /// Mascara um lote de sentenças.
    ///
    /// 1. Pré-limpeza opcional (modo básico, sem conjunto de remoção).
    /// 2. UMA chamada ao tagger para o lote inteiro.
    /// 3. Consolidação por sentença, em paralelo — funções puras sobre
    ///    entradas imutáveis, sem coordenação necessária.
    ///
    /// A saída casa 1:1 com a entrada, para qualquer tamanho de lote,
    /// inclusive zero.
    pub fn mask_batch(&self, sentences: &[String]) -> Result<Vec<String>, DejavuError> {
        let prepared: Vec<String> = if self.pre_clean {
            let empty = HashSet::new();
            sentences
                .iter()
                .map(|s| clean_ocr(s, true, &empty).text)
                .collect()
        } else {
            sentences.to_vec()
        };

        let tagged = self.tagger.classify(&prepared)?;
        if tagged.len() != prepared.len() {
            return Err(DejavuError::BatchShape {
                expected: prepared.len(),
                got: tagged.len(),
            });
        }

        let opts = MaskOptions {
            merge_consecutive: true,
            ..self.options.clone()
        };

        tagged
            .par_iter()
            .map(|sentence| {
                let (words, tags): (Vec<String>, Vec<_>) = sentence
                    .iter()
                    .cloned()
                    .map(|tw| (tw.text, tw.tag))
                    .unzip();
                consolidate_sentence(&words, &tags, &opts)
            })
            .collect()
    }
}
