//! # Esquema de Tags BIO com Alfabeto Aberto de Tipos
//!
//! Define o esquema de anotação **BIO** (Beginning-Inside-Outside) usado para
//! rotular os tokens vindos do tagger externo.
//!
//! ## Esquema BIO
//!
//! - `B-TAG`: Begin — primeiro token de uma entidade
//! - `I-TAG`: Inside — tokens subsequentes da mesma entidade
//! - `O`: Outside — não é parte de nenhuma entidade
//!
//! ## Tipos abertos
//!
//! Diferente de um enum fechado, o tipo da entidade aqui é uma `String`
//! arbitrária (`"PER"`, `"ORG"`, `"LOC"`, `"MISC"`, `"DATE"`, ...). Os
//! taggers modernos (zero-shot) produzem categorias que não conhecemos de
//! antemão, então o núcleo aceita qualquer rótulo e deixa a filtragem para o
//! conjunto `desired_labels` do chamador.
//!
//! ## Tolerância a ruído
//!
//! A saída do tagger é um componente externo não confiável: rótulos
//! malformados (`"B-"`, `"FOO"`, `""`) nunca geram erro — degradam para
//! [`Tag::Outside`], tratando o token como palavra comum.

use serde::{Deserialize, Serialize};

/// Rótulos de entidade mascarados por padrão quando o chamador não
/// especifica um conjunto próprio.
pub const DESIRED_DEFAULT: [&str; 4] = ["PER", "ORG", "LOC", "MISC"];

/// Tag BIO aplicada a um token.
///
/// O tipo da entidade (`"PER"`, `"ORG"`, ...) é carregado dentro da variante,
/// em maiúsculas, exatamente como veio do tagger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Tag {
    /// **Begin**: marca o INÍCIO de uma entidade. Ex: **São** (B-LOC) Paulo.
    Begin(String),
    /// **Inside**: marca a CONTINUAÇÃO de uma entidade. Ex: São **Paulo** (I-LOC).
    Inside(String),
    /// **Outside**: o token não faz parte de nenhuma entidade.
    Outside,
}

impl Tag {
    /// Parseia uma tag a partir do rótulo textual (ex: `"B-PER"` → `Begin("PER")`).
    ///
    /// Qualquer rótulo que não case com `B-<tipo>` / `I-<tipo>` / `O` degrada
    /// para [`Tag::Outside`]: o tagger é ruidoso e preferimos degradação
    /// graciosa a falha dura.
    pub fn from_label(s: &str) -> Tag {
        if s == "O" {
            return Tag::Outside;
        }
        match s.split_once('-') {
            Some(("B", kind)) if !kind.is_empty() => Tag::Begin(kind.to_string()),
            Some(("I", kind)) if !kind.is_empty() => Tag::Inside(kind.to_string()),
            _ => Tag::Outside,
        }
    }

    /// Representação textual da tag (ex: `"B-PER"`, `"I-ORG"`, `"O"`).
    pub fn label(&self) -> String {
        match self {
            Tag::Begin(kind) => format!("B-{kind}"),
            Tag::Inside(kind) => format!("I-{kind}"),
            Tag::Outside => "O".to_string(),
        }
    }

    /// Retorna o tipo de entidade desta tag (se for `B-` ou `I-`).
    pub fn kind(&self) -> Option<&str> {
        match self {
            Tag::Begin(kind) | Tag::Inside(kind) => Some(kind),
            Tag::Outside => None,
        }
    }
}

impl std::fmt::Display for Tag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Um token rotulado, na forma emitida pelo tagger externo: a palavra e sua
/// tag BIO, alinhadas posicionalmente dentro da sentença.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaggedWord {
    /// O texto do token (ex: "Lula", ",", "presidente").
    pub text: String,
    /// A tag BIO atribuída pelo tagger.
    pub tag: Tag,
}

impl TaggedWord {
    /// Constrói a partir do rótulo textual, com o mesmo parsing tolerante de
    /// [`Tag::from_label`].
    pub fn new(text: impl Into<String>, label: &str) -> Self {
        Self {
            text: text.into(),
            tag: Tag::from_label(label),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_labels_ida_e_volta() {
        assert_eq!(Tag::Outside.label(), "O");
        assert_eq!(Tag::from_label("B-PER"), Tag::Begin("PER".to_string()));
        assert_eq!(Tag::from_label("I-LOC").label(), "I-LOC");
        assert_eq!(Tag::from_label("O"), Tag::Outside);
    }

    #[test]
    fn test_tipo_aberto() {
        // Categorias fora do conjunto clássico são aceitas sem reclamação
        assert_eq!(Tag::from_label("B-DATE"), Tag::Begin("DATE".to_string()));
        assert_eq!(Tag::from_label("I-DOENÇA").kind(), Some("DOENÇA"));
    }

    #[test]
    fn test_malformada_degrada_para_outside() {
        assert_eq!(Tag::from_label(""), Tag::Outside);
        assert_eq!(Tag::from_label("FOO"), Tag::Outside);
        assert_eq!(Tag::from_label("B-"), Tag::Outside);
        assert_eq!(Tag::from_label("X-PER"), Tag::Outside);
    }

    #[test]
    fn test_tagged_word_parsing() {
        let tw = TaggedWord::new("Google", "B-ORG");
        assert_eq!(tw.tag.kind(), Some("ORG"));
        let ruim = TaggedWord::new("algo", "???");
        assert_eq!(ruim.tag, Tag::Outside);
    }
}
