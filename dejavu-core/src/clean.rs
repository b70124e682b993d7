//! # Normalizador de OCR com Mapa de Deslocamentos
//!
//! Texto digitalizado de jornais históricos chega cheio de artefatos de
//! escaneamento: hifenização de quebra de linha (`exam-\n ple`), ligaturas
//! tipográficas (`ﬁ`, `ﬂ`), acentos fantasma e quebras de linha no meio do
//! parágrafo. Este módulo limpa esses artefatos **preservando a
//! rastreabilidade**: junto do texto limpo sai um mapa que relaciona cada
//! posição do texto original à sua posição no texto limpo.
//!
//! Esse mapa é o que permite pegar um span de entidade calculado sobre o
//! texto limpo e projetá-lo de volta no documento-fonte.
//!
//! ## Operações, nesta ordem
//!
//! 1. Remove toda sequência `-\n` (hifenização de quebra de linha).
//! 2. Se `basic` for `false`: substitui `é→e`, `ï→i`, `ﬁ→fi`, `ﬂ→fl` e
//!    apaga os caracteres do conjunto `remove`.
//! 3. Quebras de linha: um `\n` isolado vira espaço (quebra de linha no meio
//!    do parágrafo); sequências de dois ou mais `\n` ficam intactas (marcam
//!    fronteira de parágrafo).
//!
//! Todos os índices deste módulo são de **caracteres**, não de bytes.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

/// Resultado de uma chamada de limpeza: o texto limpo e o mapa de
/// deslocamentos, produzidos atomicamente e imutáveis depois disso.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cleaned {
    /// O texto após as operações de limpeza.
    pub text: String,
    /// Uma entrada por caractere do texto ORIGINAL: `offsets[i]` é o
    /// deslocamento líquido para a esquerda que leva o caractere `i` até sua
    /// posição no texto limpo. Valores negativos aparecem depois de uma
    /// ligatura expandida (um caractere virou dois).
    pub offsets: Vec<i64>,
}

impl Cleaned {
    /// Projeta um índice de caractere do texto original para o texto limpo.
    ///
    /// Para caracteres removidos, o resultado é a posição do próximo
    /// caractere sobrevivente. Retorna `None` se `index` estiver fora do
    /// texto original ou se a projeção cair fora do texto limpo (caractere
    /// removido no fim do texto).
    pub fn project(&self, index: usize) -> Option<usize> {
        let shift = *self.offsets.get(index)?;
        let projected = index as i64 - shift;
        if projected < 0 {
            return None;
        }
        let projected = projected as usize;
        (projected < self.text.chars().count()).then_some(projected)
    }
}

/// Limpa um texto de OCR e constrói o mapa de deslocamentos.
///
/// - `basic`: quando `true`, aplica apenas a remoção de `-\n` e a
///   normalização de quebras de linha; substituições e o conjunto `remove`
///   são ignorados.
/// - `remove`: caracteres a apagar do texto (artefatos conhecidos do
///   scanner), considerado apenas com `basic = false`.
///
/// Entrada vazia produz saída vazia e mapa vazio. Limpar um texto já limpo
/// com os mesmos argumentos é ponto fixo.
pub fn clean_ocr(text: &str, basic: bool, remove: &HashSet<char>) -> Cleaned {
    let original: Vec<char> = text.chars().collect();

    // Passo 1: remove as sequências de hifenização "-\n"
    let mut work: Vec<char> = Vec::with_capacity(original.len());
    let mut i = 0;
    while i < original.len() {
        if original[i] == '-' && i + 1 < original.len() && original[i + 1] == '\n' {
            i += 2;
        } else {
            work.push(original[i]);
            i += 1;
        }
    }

    // Passo 2: substituições de artefatos e remoção de caracteres.
    // A substituição acontece antes da remoção: um `é` vira `e` e esse `e`
    // ainda pode ser apagado se estiver no conjunto.
    if !basic {
        let mut substituted = Vec::with_capacity(work.len());
        for c in work {
            match c {
                'é' => substituted.push('e'),
                'ï' => substituted.push('i'),
                'ﬁ' => {
                    substituted.push('f');
                    substituted.push('i');
                }
                'ﬂ' => {
                    substituted.push('f');
                    substituted.push('l');
                }
                other => substituted.push(other),
            }
        }
        substituted.retain(|c| !remove.contains(c));
        work = substituted;
    }

    // Passo 3: normalização de quebras de linha, por corridas.
    // Corrida de exatamente um '\n' vira espaço; corridas maiores marcam
    // fronteira de parágrafo e ficam intactas. Um texto que é só um '\n'
    // também fica intacto (não há quebra "isolada" para converter).
    let len = work.len();
    let mut z = 0;
    while z < len {
        if work[z] == '\n' {
            let mut end = z + 1;
            while end < len && work[end] == '\n' {
                end += 1;
            }
            if end - z == 1 && len > 1 {
                work[z] = ' ';
            }
            z = end;
        } else {
            z += 1;
        }
    }

    // Passo 4: mapa de deslocamentos, caminhando sobre o texto ORIGINAL.
    // Cada par "-\n" removido registra duas entradas que apontam para o
    // próximo caractere sobrevivente e soma 2 ao acumulador.
    let mut offsets: Vec<i64> = Vec::with_capacity(original.len());
    let mut cur: i64 = 0;
    let mut i = 0;
    while i < original.len() {
        if original[i] == '-' && i + 1 < original.len() && original[i + 1] == '\n' {
            offsets.push(cur);
            offsets.push(cur + 1);
            cur += 2;
            i += 2;
        } else {
            offsets.push(cur);
            i += 1;
        }
    }

    // Ligaturas expandem um caractere em dois: todo caractere POSTERIOR
    // desloca um a menos. Caracteres removidos: um a mais. O ajuste de um
    // caractere vale só para os índices depois dele, daí o acumulador ser
    // aplicado antes de ser atualizado.
    if !basic {
        let mut adj: i64 = 0;
        for (j, &c) in original.iter().enumerate() {
            offsets[j] += adj;
            if c == 'ﬁ' || c == 'ﬂ' {
                adj -= 1;
            } else if remove.contains(&c) {
                adj += 1;
            }
        }
    }

    Cleaned {
        text: work.into_iter().collect(),
        offsets,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn no_remove() -> HashSet<char> {
        HashSet::new()
    }

    #[test]
    fn test_texto_sem_artefatos_e_identidade() {
        let cleaned = clean_ocr("texto comum sem artefatos.", true, &no_remove());
        assert_eq!(cleaned.text, "texto comum sem artefatos.");
        assert!(cleaned.offsets.iter().all(|&o| o == 0));
        assert_eq!(cleaned.offsets.len(), "texto comum sem artefatos.".chars().count());
    }

    #[test]
    fn test_entrada_vazia() {
        let cleaned = clean_ocr("", true, &no_remove());
        assert_eq!(cleaned.text, "");
        assert!(cleaned.offsets.is_empty());
    }

    #[test]
    fn test_remocao_de_hifen_quebra() {
        let cleaned = clean_ocr("exam-\nple", true, &no_remove());
        assert_eq!(cleaned.text, "example");
        // Os dois caracteres removidos apontam para a posição do 'p' seguinte
        assert_eq!(cleaned.offsets, vec![0, 0, 0, 0, 0, 1, 2, 2, 2]);
        assert_eq!(cleaned.project(4), Some(4)); // '-' → posição do 'p'
        assert_eq!(cleaned.project(5), Some(4)); // '\n' → posição do 'p'
        assert_eq!(cleaned.project(6), Some(4)); // o próprio 'p'
    }

    #[test]
    fn test_politica_de_quebras_de_linha() {
        assert_eq!(clean_ocr("a\nb", true, &no_remove()).text, "a b");
        assert_eq!(clean_ocr("a\n\nb", true, &no_remove()).text, "a\n\nb");
        assert_eq!(clean_ocr("a\n", true, &no_remove()).text, "a ");
        // Texto feito só de quebras colapsa para si mesmo
        assert_eq!(clean_ocr("\n", true, &no_remove()).text, "\n");
        assert_eq!(clean_ocr("\n\n\n", true, &no_remove()).text, "\n\n\n");
    }

    #[test]
    fn test_substituicoes_e_ligaturas() {
        let cleaned = clean_ocr("caﬁé", false, &no_remove());
        assert_eq!(cleaned.text, "cafie");
        // 'ﬁ' expande para dois caracteres: o 'é' (índice 3) desloca -1
        assert_eq!(cleaned.offsets, vec![0, 0, 0, -1]);
        assert_eq!(cleaned.project(3), Some(4)); // 'é' → posição do 'e' em "cafie"
    }

    #[test]
    fn test_remocao_de_caracteres() {
        let remove: HashSet<char> = ['*'].into_iter().collect();
        let cleaned = clean_ocr("a*b*c", false, &remove);
        assert_eq!(cleaned.text, "abc");
        assert_eq!(cleaned.offsets, vec![0, 0, 1, 1, 2]);
        assert_eq!(cleaned.project(2), Some(1)); // 'b' → índice 1
        assert_eq!(cleaned.project(4), Some(2)); // 'c' → índice 2
    }

    #[test]
    fn test_remocao_no_fim_nao_projeta() {
        let remove: HashSet<char> = ['*'].into_iter().collect();
        let cleaned = clean_ocr("ab*", false, &remove);
        assert_eq!(cleaned.text, "ab");
        // O '*' final não tem caractere sobrevivente seguinte
        assert_eq!(cleaned.project(2), None);
    }

    #[test]
    fn test_modo_basico_ignora_substituicoes() {
        let remove: HashSet<char> = ['é'].into_iter().collect();
        let cleaned = clean_ocr("café", true, &remove);
        assert_eq!(cleaned.text, "café");
        assert!(cleaned.offsets.iter().all(|&o| o == 0));
    }

    #[test]
    fn test_idempotencia() {
        let remove: HashSet<char> = ['*', '~'].into_iter().collect();
        let raw = "A ﬁrma Smith & Sons anun-\nciou ontem* que vai\nfechar as portas.\n\nOutro parágrafo.";
        let once = clean_ocr(raw, false, &remove);
        let twice = clean_ocr(&once.text, false, &remove);
        assert_eq!(twice.text, once.text);
        assert!(twice.offsets.iter().all(|&o| o == 0));
    }

    #[test]
    fn test_projecao_composta() {
        // hifenização + remoção no mesmo texto
        let remove: HashSet<char> = ['*'].into_iter().collect();
        let raw = "so*l-\ndado";
        let cleaned = clean_ocr(raw, false, &remove);
        assert_eq!(cleaned.text, "soldado");
        let original: Vec<char> = raw.chars().collect();
        let out: Vec<char> = cleaned.text.chars().collect();
        // Todo caractere sobrevivente projeta para ele mesmo no texto limpo
        for (i, &c) in original.iter().enumerate() {
            if c == '*' || c == '\n' || (c == '-' && original.get(i + 1) == Some(&'\n')) {
                continue;
            }
            let p = cleaned.project(i).unwrap();
            assert_eq!(out[p], c, "caractere {i} ({c}) projetou para posição errada");
        }
    }
}
