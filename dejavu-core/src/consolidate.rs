//! # Consolidador de Spans de Entidade
//!
//! Converte a saída token a token do tagger (tags BIO) em uma sentença onde
//! cada entidade contígua vira UM token de máscara. É o passo que faz
//! "Elon Musk fundou a SpaceX" e "Jeff Bezos fundou a Blue Origin"
//! convergirem para o mesmo texto mascarado — e portanto para embeddings
//! próximos.
//!
//! ## Máquina de estados
//!
//! O algoritmo é uma caminhada única da esquerda para a direita com dois
//! estados: *fora de span* e *span aberto*. As regras:
//!
//! - `B-T` abre um span novo do tipo `T` (fechando qualquer span aberto).
//! - `I-T` continua o span aberto, de qualquer tipo; sem span aberto, é
//!   recuperado como se fosse um `B-T` (taggers ruidosos emitem `I-` órfão).
//! - Pontuação de ponte (`. , ! ? ;`) logo após um span aberto é absorvida
//!   pelo span e o mantém aberto — é o que faz "U . S ." colapsar em UMA
//!   entidade em vez de duas.
//! - Qualquer outro token fecha o span aberto e é emitido como está.
//!
//! ## Mascaramento
//!
//! Cada span cujo rótulo pertence a `desired_labels` vira um único token:
//! o próprio rótulo (`"PER"`) ou a máscara genérica (`"[MASK]"`). Spans de
//! tipos não desejados são devolvidos como as palavras originais. Pontuação
//! colada na superfície do span é preservada ao redor da máscara
//! (`"Google."` → `"ORG."`).

use std::collections::HashSet;

use crate::error::DejavuError;
use crate::tag::{Tag, DESIRED_DEFAULT};

/// Token de máscara genérico, no formato placeholder dos encoders BERT-like.
/// Antes de embedar, [`crate::embed::SpecialTokens`] o traduz para o token
/// concreto do encoder escolhido.
pub const GENERIC_MASK: &str = "[MASK]";

/// Pontuações que fazem ponte dentro de um span (mantêm o span aberto).
const BRIDGE_PUNCT: [&str; 5] = [".", ",", "!", "?", ";"];

/// Pontuações preservadas ao redor de uma máscara substituída.
const MASK_PUNCT: [char; 4] = ['.', ',', '!', '?'];

/// Opções de consolidação e mascaramento.
#[derive(Debug, Clone, PartialEq)]
pub struct MaskOptions {
    /// `true`: cada span vira UM token de saída e spans adjacentes com o
    /// mesmo rótulo são fundidos. `false`: um token de saída por palavra da
    /// entidade.
    pub merge_consecutive: bool,
    /// `true`: toda entidade desejada vira [`GENERIC_MASK`]; `false`: vira o
    /// próprio rótulo do tipo (`"PER"`, `"ORG"`, ...).
    pub generic_mask: bool,
    /// Tipos de entidade a mascarar. Spans de tipos fora do conjunto são
    /// deixados como as palavras originais. Vazio é válido: a consolidação
    /// degrada para passagem direta.
    pub desired_labels: HashSet<String>,
}

impl Default for MaskOptions {
    fn default() -> Self {
        Self {
            merge_consecutive: true,
            generic_mask: false,
            desired_labels: DESIRED_DEFAULT.iter().map(|s| s.to_string()).collect(),
        }
    }
}

/// Pedaço intermediário da caminhada: ou uma palavra comum, ou um span de
/// entidade acumulando suas palavras. Cada palavra do span guarda o tipo do
/// marcador que a colocou ali (o tipo da própria tag para `B-`/`I-`, o tipo
/// do span aberto para pontuação absorvida).
#[derive(Debug)]
enum Piece {
    Plain(String),
    Span {
        /// Rótulo do span: o tipo da tag que o abriu.
        label: String,
        words: Vec<(String, String)>,
    },
}

fn is_bridge(word: &str) -> bool {
    BRIDGE_PUNCT.contains(&word)
}

/// Consolida uma sentença rotulada em uma lista de tokens mascarados.
///
/// Pré-condição: `words` e `tags` alinhados 1:1 — tamanhos diferentes são
/// violação de contrato do chamador e falham com
/// [`DejavuError::LengthMismatch`]. Tags malformadas, por outro lado, já
/// chegaram aqui degradadas para [`Tag::Outside`] e seguem como tokens
/// comuns.
pub fn consolidate(
    words: &[String],
    tags: &[Tag],
    opts: &MaskOptions,
) -> Result<Vec<String>, DejavuError> {
    if words.len() != tags.len() {
        return Err(DejavuError::LengthMismatch {
            words: words.len(),
            tags: tags.len(),
        });
    }

    // Passo 1: caminhada com estado "span aberto" (índice em `pieces`)
    let mut pieces: Vec<Piece> = Vec::new();
    let mut open: Option<usize> = None;

    for (word, tag) in words.iter().zip(tags) {
        match tag {
            Tag::Begin(kind) => {
                pieces.push(Piece::Span {
                    label: kind.clone(),
                    words: vec![(word.clone(), kind.clone())],
                });
                open = Some(pieces.len() - 1);
            }
            Tag::Inside(kind) => {
                if let Some(idx) = open {
                    if let Piece::Span { words, .. } = &mut pieces[idx] {
                        words.push((word.clone(), kind.clone()));
                    }
                } else {
                    // I- órfão: recupera como abertura de span
                    pieces.push(Piece::Span {
                        label: kind.clone(),
                        words: vec![(word.clone(), kind.clone())],
                    });
                    open = Some(pieces.len() - 1);
                }
            }
            Tag::Outside => {
                match open {
                    Some(idx) if is_bridge(word) => {
                        // pontuação interna: absorvida, span continua aberto
                        if let Piece::Span { label, words } = &mut pieces[idx] {
                            words.push((word.clone(), label.clone()));
                        }
                    }
                    _ => {
                        pieces.push(Piece::Plain(word.clone()));
                        open = None;
                    }
                }
            }
        }
    }

    // Passo 2: funde spans estritamente adjacentes com rótulos idênticos.
    // Isso cobre o de-dup de rótulos repetidos lado a lado que um tagger
    // ruidoso produz (dois B-PER consecutivos viram uma máscara só).
    let merged = if opts.merge_consecutive {
        let mut merged: Vec<Piece> = Vec::new();
        for piece in pieces {
            match piece {
                Piece::Span { label, words } => match merged.last_mut() {
                    Some(Piece::Span { label: prev, words: acc }) if *prev == label => {
                        acc.extend(words);
                    }
                    _ => merged.push(Piece::Span { label, words }),
                },
                plain => merged.push(plain),
            }
        }
        merged
    } else {
        pieces
    };

    // Passo 3: renderização com mascaramento
    let mut out: Vec<String> = Vec::new();
    for piece in merged {
        match piece {
            Piece::Plain(word) => out.push(word),
            Piece::Span { label, words } => {
                if opts.merge_consecutive {
                    if opts.desired_labels.contains(&label) {
                        let surface = words
                            .iter()
                            .map(|(w, _)| w.as_str())
                            .collect::<Vec<_>>()
                            .join(" ");
                        let mask = if opts.generic_mask { GENERIC_MASK } else { label.as_str() };
                        out.push(render_mask(&surface, mask));
                    } else {
                        out.extend(words.into_iter().map(|(w, _)| w));
                    }
                } else {
                    // sem fusão: uma saída por palavra, cada uma com o tipo
                    // do seu próprio marcador; pontuação absorvida é
                    // preservada como está
                    for (word, kind) in words {
                        if is_bridge(&word) || !opts.desired_labels.contains(&kind) {
                            out.push(word);
                        } else {
                            let mask = if opts.generic_mask { GENERIC_MASK } else { kind.as_str() };
                            out.push(render_mask(&word, mask));
                        }
                    }
                }
            }
        }
    }

    Ok(out)
}

/// Consolida e junta os tokens em uma sentença.
///
/// A junção usa espaço simples e depois recola a pontuação que ficou
/// flutuando (`" ."` → `"."` etc.), reproduzindo o texto como um leitor o
/// escreveria.
pub fn consolidate_sentence(
    words: &[String],
    tags: &[Tag],
    opts: &MaskOptions,
) -> Result<String, DejavuError> {
    let tokens = consolidate(words, tags, opts)?;
    Ok(join_tokens(&tokens))
}

/// Junta tokens com espaço e normaliza a pontuação flutuante.
pub fn join_tokens(tokens: &[String]) -> String {
    tokens
        .join(" ")
        .replace(" .", ".")
        .replace(" ,", ",")
        .replace(" !", "!")
        .replace(" ?", "?")
        .replace(" : ", ": ")
        .replace(" ; ", "; ")
        .replace(" '", "'")
}

/// Substitui a superfície de um span pela máscara, preservando pontuação
/// colada: pontuação à esquerda vai antes da máscara (`". [MASK]"`),
/// pontuação à direita vai depois (`"[MASK]."`).
fn render_mask(surface: &str, mask: &str) -> String {
    let first = surface.chars().next();
    let last = surface.chars().last();
    if first.is_some_and(|c| MASK_PUNCT.contains(&c)) {
        format!("{} {}", first.unwrap(), mask)
    } else if last.is_some_and(|c| MASK_PUNCT.contains(&c)) {
        format!("{}{}", mask, last.unwrap())
    } else {
        mask.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn w(words: &[&str]) -> Vec<String> {
        words.iter().map(|s| s.to_string()).collect()
    }

    fn t(labels: &[&str]) -> Vec<Tag> {
        labels.iter().map(|s| Tag::from_label(s)).collect()
    }

    #[test]
    fn test_caso_simples_com_rotulos() {
        let masked = consolidate_sentence(
            &w(&["John", "Doe", "works", "at", "Google"]),
            &t(&["B-PER", "I-PER", "O", "O", "B-ORG"]),
            &MaskOptions::default(),
        )
        .unwrap();
        assert_eq!(masked, "PER works at ORG");
    }

    #[test]
    fn test_mascara_generica() {
        let opts = MaskOptions {
            generic_mask: true,
            ..MaskOptions::default()
        };
        let masked = consolidate_sentence(
            &w(&["John", "Doe", "works", "at", "Google"]),
            &t(&["B-PER", "I-PER", "O", "O", "B-ORG"]),
            &opts,
        )
        .unwrap();
        assert_eq!(masked, "[MASK] works at [MASK]");
    }

    #[test]
    fn test_ponte_de_pontuacao() {
        // "U . S ." com pontuação embutida colapsa em UM marcador, não dois
        let tokens = consolidate(
            &w(&["U", ".", "S", "."]),
            &t(&["B-ORG", "O", "I-ORG", "O"]),
            &MaskOptions::default(),
        )
        .unwrap();
        // a pontuação final da superfície "U . S ." é preservada na máscara
        assert_eq!(tokens, vec!["ORG.".to_string()]);
    }

    #[test]
    fn test_rotulo_nao_desejado_fica_intacto() {
        let opts = MaskOptions {
            desired_labels: ["PER".to_string()].into_iter().collect(),
            ..MaskOptions::default()
        };
        let masked = consolidate_sentence(
            &w(&["Smith", "visited", "the", "World", "Fair"]),
            &t(&["B-PER", "O", "O", "B-MISC", "I-MISC"]),
            &opts,
        )
        .unwrap();
        assert_eq!(masked, "PER visited the World Fair");
    }

    #[test]
    fn test_desejados_vazio_e_passagem_direta() {
        let opts = MaskOptions {
            desired_labels: HashSet::new(),
            ..MaskOptions::default()
        };
        let masked = consolidate_sentence(
            &w(&["John", "works", "here"]),
            &t(&["B-PER", "O", "O"]),
            &opts,
        )
        .unwrap();
        assert_eq!(masked, "John works here");
    }

    #[test]
    fn test_i_orfao_recupera_como_abertura() {
        let masked = consolidate_sentence(
            &w(&["Doe", "arrived", "in", "Boston"]),
            &t(&["I-PER", "O", "O", "B-LOC"]),
            &MaskOptions::default(),
        )
        .unwrap();
        assert_eq!(masked, "PER arrived in LOC");
    }

    #[test]
    fn test_spans_adjacentes_identicos_fundem() {
        // dois B-PER lado a lado: ruído de tagger, vira uma máscara só
        let masked = consolidate_sentence(
            &w(&["John", "Mary", "left"]),
            &t(&["B-PER", "B-PER", "O"]),
            &MaskOptions::default(),
        )
        .unwrap();
        assert_eq!(masked, "PER left");
    }

    #[test]
    fn test_spans_adjacentes_de_tipos_diferentes_nao_fundem() {
        let masked = consolidate_sentence(
            &w(&["John", "Google", "merged"]),
            &t(&["B-PER", "B-ORG", "O"]),
            &MaskOptions::default(),
        )
        .unwrap();
        assert_eq!(masked, "PER ORG merged");
    }

    #[test]
    fn test_i_de_outro_tipo_continua_span_aberto() {
        // I-PER depois de B-ORG continua o span aberto (de qualquer tipo);
        // o rótulo do span é o da tag que o abriu
        let masked = consolidate_sentence(
            &w(&["Bank", "Smith", "closed"]),
            &t(&["B-ORG", "I-PER", "O"]),
            &MaskOptions::default(),
        )
        .unwrap();
        assert_eq!(masked, "ORG closed");
    }

    #[test]
    fn test_pontuacao_final_preservada() {
        let masked = consolidate_sentence(
            &w(&["He", "works", "at", "Google."]),
            &t(&["O", "O", "O", "B-ORG"]),
            &MaskOptions::default(),
        )
        .unwrap();
        assert_eq!(masked, "He works at ORG.");
    }

    #[test]
    fn test_pontuacao_inicial_preservada() {
        let tokens = consolidate(
            &w(&[".Smith", "spoke"]),
            &t(&["B-PER", "O"]),
            &MaskOptions::default(),
        )
        .unwrap();
        assert_eq!(tokens, vec![". PER".to_string(), "spoke".to_string()]);
    }

    #[test]
    fn test_sem_fusao_uma_mascara_por_palavra() {
        let opts = MaskOptions {
            merge_consecutive: false,
            ..MaskOptions::default()
        };
        let tokens = consolidate(
            &w(&["John", "Doe", "left"]),
            &t(&["B-PER", "I-PER", "O"]),
            &opts,
        )
        .unwrap();
        assert_eq!(
            tokens,
            vec!["PER".to_string(), "PER".to_string(), "left".to_string()]
        );
    }

    #[test]
    fn test_tamanhos_diferentes_sao_erro() {
        let err = consolidate(
            &w(&["a", "b"]),
            &t(&["O"]),
            &MaskOptions::default(),
        )
        .unwrap_err();
        assert!(matches!(err, DejavuError::LengthMismatch { words: 2, tags: 1 }));
    }

    #[test]
    fn test_entrada_vazia() {
        let tokens = consolidate(&[], &[], &MaskOptions::default()).unwrap();
        assert!(tokens.is_empty());
        assert_eq!(
            consolidate_sentence(&[], &[], &MaskOptions::default()).unwrap(),
            ""
        );
    }

    #[test]
    fn test_pontuacao_sem_span_aberto_e_comum() {
        let masked = consolidate_sentence(
            &w(&["Well", ",", "he", "left", "."]),
            &t(&["O", "O", "O", "O", "O"]),
            &MaskOptions::default(),
        )
        .unwrap();
        assert_eq!(masked, "Well, he left.");
    }

    #[test]
    fn test_juncao_recola_pontuacao() {
        let tokens = vec![
            "PER".to_string(),
            "said".to_string(),
            ":".to_string(),
            "'".to_string(),
            "no".to_string(),
            "'".to_string(),
        ];
        // " : " → ": " e " '" → "'" (a recolagem de aspas é ingênua e cola
        // também a aspa de abertura; comportamento assumido do join)
        assert_eq!(join_tokens(&tokens), "PER said:' no'");
    }
}
