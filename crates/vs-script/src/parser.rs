//! Line-oriented script parser.
//!
//! Parsing never fails: every line is classified, and anything the parser
//! cannot make sense of is kept in the document for the validator to report.

use tracing::debug;
use vs_core::Speaker;

use crate::ast::{
    Directive, DirectiveKeyword, LineContent, Modifier, ModifierBlock, RawArgs, RawModifier,
    ScriptLine, Span,
};
use crate::lexer::{Token, lex_modifiers, split_dividers};
use crate::resolver::LabelTable;

/// A parsed, not yet validated, script.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptDocument {
    /// Path-like script name, e.g. `chapter1/the_cabin`.
    pub name: String,
    /// The full source text.
    pub source: String,
    /// Lines in source order.
    pub lines: Vec<ScriptLine>,
    /// Label table built from the `label` lines.
    pub labels: LabelTable,
}

impl ScriptDocument {
    /// Number of lines.
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Whether the script has no lines.
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// The line at a 0-based index.
    pub fn line(&self, index: usize) -> Option<&ScriptLine> {
        self.lines.get(index)
    }
}

/// Parse a script source into a document.
pub fn parse(name: &str, source: &str) -> ScriptDocument {
    let mut lines = Vec::new();
    let mut offset = 0;

    for (index, chunk) in source.split_inclusive('\n').enumerate() {
        let raw = chunk.trim_end_matches('\n').trim_end_matches('\r');
        lines.push(parse_line(source, index, offset, raw));
        offset += chunk.len();
    }

    let labels = LabelTable::from_lines(&lines);
    debug!(script = name, lines = lines.len(), labels = labels.len(), "parsed script");

    ScriptDocument {
        name: name.to_string(),
        source: source.to_string(),
        lines,
        labels,
    }
}

fn parse_line(source: &str, index: usize, offset: usize, raw: &str) -> ScriptLine {
    let (body, blocks) = split_dividers(raw);
    let content = classify(body);

    let block = match blocks.as_slice() {
        [] => ModifierBlock::Absent,
        [(text, start)] => {
            let entries = parse_entries(source, text, offset + start);
            if entries.is_empty() {
                ModifierBlock::Empty
            } else {
                ModifierBlock::Entries(entries)
            }
        }
        more => ModifierBlock::MultipleDividers(more.len()),
    };

    // Blank and label lines never evaluate their modifiers.
    let ignores_modifiers = matches!(
        content,
        LineContent::Blank
            | LineContent::Directive {
                keyword: DirectiveKeyword::Label,
                ..
            }
    );
    let modifiers = if ignores_modifiers {
        Vec::new()
    } else {
        block
            .entries()
            .iter()
            .filter_map(|raw| Modifier::from_raw(raw).ok())
            .collect()
    };

    ScriptLine {
        index,
        span: offset..offset + raw.len(),
        raw: raw.to_string(),
        content,
        block,
        modifiers,
    }
}

fn classify(body: &str) -> LineContent {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return LineContent::Blank;
    }

    let mut words = trimmed.split_whitespace();
    if let Some(keyword) = words.next().and_then(DirectiveKeyword::parse) {
        let args: Vec<String> = words.map(str::to_string).collect();
        let parsed = Directive::parse(keyword, &args);
        return LineContent::Directive {
            keyword,
            args,
            parsed,
        };
    }

    match trimmed.split_once(':') {
        Some((head, rest)) if is_identifier(head) => match head.parse::<Speaker>() {
            Ok(speaker) => LineContent::Dialogue {
                speaker,
                text: rest.trim().to_string(),
                unknown_speaker: None,
            },
            Err(_) => LineContent::Dialogue {
                speaker: Speaker::default(),
                text: trimmed.to_string(),
                unknown_speaker: Some(head.to_string()),
            },
        },
        _ => LineContent::Dialogue {
            speaker: Speaker::default(),
            text: trimmed.to_string(),
            unknown_speaker: None,
        },
    }
}

fn is_identifier(s: &str) -> bool {
    !s.is_empty() && s.chars().all(|c| c.is_alphanumeric() || c == '_')
}

/// Parse the `;`-separated entries of one modifier block.
fn parse_entries(source: &str, text: &str, base: usize) -> Vec<RawModifier> {
    let tokens = lex_modifiers(text, base);
    tokens
        .split(|(t, _)| *t == Token::Semicolon)
        .filter(|entry| !entry.is_empty())
        .map(|entry| parse_entry(source, entry))
        .collect()
}

fn parse_entry(source: &str, entry: &[(Token, Span)]) -> RawModifier {
    let span = match (entry.first(), entry.last()) {
        (Some((_, first)), Some((_, last))) => first.start..last.end,
        _ => 0..0,
    };
    let text = source.get(span.clone()).unwrap_or_default().to_string();

    let (name, args) = match entry {
        [(Token::Word(name), _)] => (name.to_lowercase(), RawArgs::None),
        [(Token::Word(name), _), (Token::LParen, _), inner @ .., (Token::RParen, _)] => {
            let args = parse_arguments(inner).map_or(RawArgs::Malformed(text.clone()), RawArgs::List);
            (name.to_lowercase(), args)
        }
        [(Token::Word(name), _), ..] => (name.to_lowercase(), RawArgs::Malformed(text.clone())),
        _ => (text.to_lowercase(), RawArgs::Malformed(text.clone())),
    };

    RawModifier { name, args, span }
}

/// Comma-separated groups of words; consecutive words join with a space.
fn parse_arguments(inner: &[(Token, Span)]) -> Option<Vec<String>> {
    if inner.is_empty() {
        return Some(Vec::new());
    }

    let mut args = Vec::new();
    for group in inner.split(|(t, _)| *t == Token::Comma) {
        let mut words = Vec::with_capacity(group.len());
        for (token, _) in group {
            match token {
                Token::Word(w) => words.push(w.as_str()),
                _ => return None,
            }
        }
        if words.is_empty() {
            return None;
        }
        args.push(words.join(" "));
    }
    Some(args)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{DirectiveIssue, JumpTarget};
    use vs_core::{Narrator, Persona, StoryFlag};

    fn line(source: &str) -> ScriptLine {
        parse("test", source).lines.remove(0)
    }

    #[test]
    fn splits_lines_and_tracks_spans() {
        let doc = parse("test", "one\r\ntwo\n\nfour");
        assert_eq!(doc.len(), 4);
        assert_eq!(doc.lines[0].raw, "one");
        assert_eq!(doc.lines[1].span, 5..8);
        assert_eq!(doc.lines[2].content, LineContent::Blank);
        assert_eq!(doc.lines[3].index, 3);
        assert_eq!(doc.lines[3].number(), 4);
    }

    #[test]
    fn empty_source_has_no_lines() {
        assert!(parse("test", "").is_empty());
    }

    #[test]
    fn dialogue_with_speaker() {
        let l = line("Cold: It doesn't matter.");
        assert_eq!(
            l.content,
            LineContent::Dialogue {
                speaker: Speaker::Voice(Persona::Cold),
                text: "It doesn't matter.".to_string(),
                unknown_speaker: None,
            }
        );
    }

    #[test]
    fn dialogue_without_speaker_is_narrated() {
        let l = line("You're on a path in the woods.");
        assert_eq!(l.speaker(), Some(Speaker::Narrator(Narrator::Standard)));
    }

    #[test]
    fn unknown_speaker_falls_back_to_narrator() {
        let l = line("stranger: Hello there.");
        match l.content {
            LineContent::Dialogue {
                speaker,
                text,
                unknown_speaker,
            } => {
                assert_eq!(speaker, Speaker::default());
                assert_eq!(text, "stranger: Hello there.");
                assert_eq!(unknown_speaker.as_deref(), Some("stranger"));
            }
            other => panic!("expected dialogue, got {other:?}"),
        }
    }

    #[test]
    fn colon_inside_prose_is_not_a_speaker() {
        let l = line("It reads: turn back.");
        assert!(matches!(
            l.content,
            LineContent::Dialogue {
                unknown_speaker: None,
                ..
            }
        ));
    }

    #[test]
    fn directive_line() {
        let l = line("JUMPTO the_end");
        assert_eq!(l.keyword(), Some(DirectiveKeyword::Jumpto));
        assert_eq!(
            l.directive(),
            Some(&Directive::Jumpto(JumpTarget::Label("the_end".to_string())))
        );
    }

    #[test]
    fn malformed_directive_is_kept() {
        let l = line("pause soon");
        match l.content {
            LineContent::Directive { parsed, .. } => {
                assert_eq!(parsed, Err(DirectiveIssue::NotInteger("soon".to_string())));
            }
            other => panic!("expected directive, got {other:?}"),
        }
    }

    #[test]
    fn modifier_block_entries() {
        let l = line("Hero: We can do this. /// checkvoice(hero, cold); hasblade; interrupt");
        let names: Vec<_> = l.block.entries().iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, vec!["checkvoice", "hasblade", "interrupt"]);
        assert_eq!(
            l.modifiers,
            vec![
                Modifier::CheckVoice(vec![Persona::Hero, Persona::Cold]),
                Modifier::Flag {
                    flag: StoryFlag::HasBlade,
                    negated: false
                },
                Modifier::Interrupt,
            ]
        );
        assert!(l.has_interrupt());
    }

    #[test]
    fn entry_spans_index_the_document() {
        let source = "Hi. /// harsh";
        let doc = parse("test", source);
        let entry = &doc.lines[0].block.entries()[0];
        assert_eq!(&source[entry.span.clone()], "harsh");
    }

    #[test]
    fn multi_word_arguments_join() {
        let l = line("Look. /// ifstring(the   mound)");
        assert_eq!(
            l.block.entries()[0].args,
            RawArgs::List(vec!["the mound".to_string()])
        );
    }

    #[test]
    fn empty_parens_are_no_arguments() {
        let l = line("Cold: Fine. /// checkvoice()");
        assert_eq!(l.block.entries()[0].args, RawArgs::List(vec![]));
    }

    #[test]
    fn malformed_entries() {
        for block in ["ifsource(a", "ifsource(a,)", "ifsource a", "(a)", "ifsource((a))"] {
            let l = line(&format!("Text. /// {block}"));
            let entry = &l.block.entries()[0];
            assert!(
                matches!(entry.args, RawArgs::Malformed(_)),
                "{block} should be malformed"
            );
            assert!(l.modifiers.is_empty());
        }
    }

    #[test]
    fn divider_counts() {
        assert_eq!(line("Text.").block, ModifierBlock::Absent);
        assert_eq!(line("Text. ///").block, ModifierBlock::Empty);
        assert_eq!(line("Text. /// ;").block, ModifierBlock::Empty);
        assert_eq!(
            line("Text. /// harsh /// hasblade").block,
            ModifierBlock::MultipleDividers(2)
        );
        assert!(line("Text. /// harsh /// hasblade").modifiers.is_empty());
    }

    #[test]
    fn label_line_modifiers_are_dropped() {
        let l = line("label start /// harsh");
        assert!(l.block.is_present());
        assert!(l.modifiers.is_empty());
    }

    proptest::proptest! {
        #[test]
        fn one_script_line_per_source_line(source in "[a-z:;,()/ \\n]{0,80}") {
            let doc = parse("prop", &source);
            proptest::prop_assert_eq!(doc.len(), source.lines().count());
            for (i, line) in doc.lines.iter().enumerate() {
                proptest::prop_assert_eq!(line.index, i);
                proptest::prop_assert_eq!(&source[line.span.clone()], line.raw.as_str());
            }
        }
    }

    #[test]
    fn directive_with_modifiers() {
        let l = line("break /// threwblade");
        assert_eq!(l.directive(), Some(&Directive::Break));
        assert_eq!(
            l.modifiers,
            vec![Modifier::Flag {
                flag: StoryFlag::ThrewBlade,
                negated: false
            }]
        );
    }
}
