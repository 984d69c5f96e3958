use crate::diagnostics::{Diagnostic, DiagnosticCode};

/// Marker that opens a field line.
pub(crate) const FIELD_MARKER: char = '-';

/// Trimmed, non-blank source line with its 1-based number.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct SourceLine<'a> {
    pub number: usize,
    pub text: &'a str,
}

/// Entity header followed by the field lines that belong to it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Block<'a> {
    pub header: SourceLine<'a>,
    pub fields: Vec<SourceLine<'a>>,
}

/// Split source text into entity blocks.
///
/// Field lines that appear before the first header are returned as
/// `field_without_entity` errors instead of being attached anywhere.
pub(crate) fn partition_blocks(source: &str) -> (Vec<Block<'_>>, Vec<Diagnostic>) {
    let mut blocks: Vec<Block<'_>> = Vec::new();
    let mut orphans = Vec::new();

    for (index, raw) in source.lines().enumerate() {
        let text = raw.trim();
        if text.is_empty() {
            continue;
        }

        let line = SourceLine {
            number: index + 1,
            text,
        };

        if !text.starts_with(FIELD_MARKER) {
            blocks.push(Block {
                header: line,
                fields: Vec::new(),
            });
            continue;
        }

        match blocks.last_mut() {
            Some(block) => block.fields.push(line),
            None => orphans.push(
                Diagnostic::error(
                    DiagnosticCode::FieldWithoutEntity,
                    line.number,
                    format!("field line '{text}' appears before any entity header"),
                )
                .with_hint("declare an entity first, e.g. `User:`"),
            ),
        }
    }

    (blocks, orphans)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn groups_field_lines_under_their_header() {
        let source = "User:\n- id is text\n\n  - name is text\nPost:\n- title is text\n";
        let (blocks, orphans) = partition_blocks(source);

        assert!(orphans.is_empty());
        assert_eq!(blocks.len(), 2);
        assert_eq!(blocks[0].header.text, "User:");
        assert_eq!(
            blocks[0]
                .fields
                .iter()
                .map(|line| (line.number, line.text))
                .collect::<Vec<_>>(),
            vec![(2, "- id is text"), (4, "- name is text")]
        );
        assert_eq!(blocks[1].header.number, 5);
        assert_eq!(blocks[1].fields.len(), 1);
    }

    #[test]
    fn leading_field_lines_are_reported() {
        let (blocks, orphans) = partition_blocks("\n- id is text\nUser:\n");

        assert_eq!(blocks.len(), 1);
        assert!(blocks[0].fields.is_empty());
        assert_eq!(orphans.len(), 1);
        assert_eq!(orphans[0].code, DiagnosticCode::FieldWithoutEntity);
        assert_eq!(orphans[0].line, 2);
    }

    #[test]
    fn header_without_fields_is_still_a_block() {
        let (blocks, _) = partition_blocks("Empty:\nOther:\n- a is text");

        assert_eq!(blocks.len(), 2);
        assert!(blocks[0].fields.is_empty());
        assert_eq!(blocks[1].fields.len(), 1);
    }

    #[test]
    fn handles_crlf_line_endings() {
        let (blocks, _) = partition_blocks("User:\r\n- id is text\r\n");

        assert_eq!(blocks[0].header.text, "User:");
        assert_eq!(blocks[0].fields[0].text, "- id is text");
    }
}
