use crate::diagnostics::{Diagnostic, DiagnosticCode, ParseReport};
use crate::model::{ActionArgs, Field, FieldKind};
use crate::types::lookup_column_type;

use super::ParseOptions;
use super::args::{parse_function_args, split_action_args};

const IS_SEPARATOR: &str = " is ";
const THRU_SEPARATOR: &str = " thru ";
const ACTION_KEYWORD: &str = "action";
const MANY_KEYWORD: &str = "many";
const KNOWN_TYPES_HINT: &str = "known types: text, number, switch, date, timestamp, seconds";

/// Structural shape of a field's type definition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldShape {
    Action,
    ManyRelation,
    Computed,
    Scalar,
}

struct ShapeRule {
    shape: FieldShape,
    matches: fn(&str) -> bool,
}

/// Classification rules, tried in order; the first match wins.
const SHAPE_RULES: &[ShapeRule] = &[
    ShapeRule {
        shape: FieldShape::Action,
        matches: starts_with_action,
    },
    ShapeRule {
        shape: FieldShape::ManyRelation,
        matches: starts_with_many,
    },
    ShapeRule {
        shape: FieldShape::Computed,
        matches: contains_thru,
    },
    ShapeRule {
        shape: FieldShape::Scalar,
        matches: always,
    },
];

fn starts_with_action(type_def: &str) -> bool {
    type_def.starts_with(ACTION_KEYWORD)
}

fn starts_with_many(type_def: &str) -> bool {
    type_def.starts_with(MANY_KEYWORD)
}

fn contains_thru(type_def: &str) -> bool {
    type_def.contains(THRU_SEPARATOR)
}

fn always(_: &str) -> bool {
    true
}

/// Classify a type definition (the text right of ` is `).
pub fn classify(type_def: &str) -> FieldShape {
    SHAPE_RULES
        .iter()
        .find(|rule| (rule.matches)(type_def))
        .map_or(FieldShape::Scalar, |rule| rule.shape)
}

/// Parse a single field declaration such as `friends is many User thru befriendedBy`.
///
/// The declaration must already have its `-` marker removed. Warnings are
/// dropped on success; [`crate::parse_source`] keeps them.
pub fn parse_field(declaration: &str) -> Result<Field, ParseReport> {
    let mut report = ParseReport::default();
    match parse_field_line(declaration, 1, &ParseOptions::default(), &mut report) {
        Some(field) if report.is_ok() => Ok(field),
        _ => Err(report),
    }
}

/// Parse a field declaration found on `line`, recording issues in `report`.
pub(crate) fn parse_field_line(
    declaration: &str,
    line: usize,
    options: &ParseOptions,
    report: &mut ParseReport,
) -> Option<Field> {
    let declaration = declaration.trim();
    let parts: Vec<&str> = declaration.split(IS_SEPARATOR).collect();
    let [name, type_def] = parts.as_slice() else {
        report.push(
            Diagnostic::error(
                DiagnosticCode::MalformedFieldDeclaration,
                line,
                format!("'{declaration}' is not of the form `name is type`"),
            )
            .with_hint("declare exactly one ` is ` per field, e.g. `- title is text`"),
        );
        return None;
    };

    let name = name.trim();
    let type_def = type_def.trim();

    if !is_identifier(name) {
        report.push(Diagnostic::error(
            DiagnosticCode::InvalidIdentifier,
            line,
            format!("field name '{name}' is not a valid identifier"),
        ));
        return None;
    }

    let kind = match classify(type_def) {
        FieldShape::Action => parse_action(name, type_def, line, report)?,
        FieldShape::ManyRelation => parse_many(name, type_def, line, report)?,
        FieldShape::Computed => parse_computed(type_def, line, options, report)?,
        FieldShape::Scalar => {
            check_primitive(type_def, line, options, report);
            FieldKind::Scalar {
                type_name: type_def.to_string(),
            }
        }
    };

    Some(Field {
        name: name.to_string(),
        kind,
    })
}

fn parse_action(
    name: &str,
    type_def: &str,
    line: usize,
    report: &mut ParseReport,
) -> Option<FieldKind> {
    let parts: Vec<&str> = type_def.split(THRU_SEPARATOR).collect();
    let verb_spec = match parts.as_slice() {
        [_, spec] if !spec.trim().is_empty() => spec.trim(),
        _ => {
            report.push(
                Diagnostic::error(
                    DiagnosticCode::MalformedRelationshipClause,
                    line,
                    format!("action '{name}' needs exactly one `thru <verb>` clause"),
                )
                .with_hint("write `name is action thru verb(args)`"),
            );
            return None;
        }
    };

    let (verb, args) = match split_call(verb_spec, line, report)? {
        Some((verb, raw)) => {
            let (args, ignored) = split_action_args(raw);
            for token in ignored {
                report.push(
                    Diagnostic::warning(
                        DiagnosticCode::IgnoredArgument,
                        line,
                        format!("argument '{token}' of action '{name}' was ignored"),
                    )
                    .with_hint(ignored_hint(token)),
                );
            }
            (verb, args)
        }
        None => (verb_spec, ActionArgs::default()),
    };

    if !is_identifier(verb) {
        report.push(Diagnostic::error(
            DiagnosticCode::MalformedRelationshipClause,
            line,
            format!("action '{name}' has invalid verb '{verb}'"),
        ));
        return None;
    }

    Some(FieldKind::Action {
        verb: verb.to_string(),
        args,
    })
}

fn parse_many(
    name: &str,
    type_def: &str,
    line: usize,
    report: &mut ParseReport,
) -> Option<FieldKind> {
    let parts: Vec<&str> = type_def.split(THRU_SEPARATOR).collect();
    let [head, through] = parts.as_slice() else {
        let hint = if type_def.contains(" and ") {
            "only `thru` names the inverse field; replace `and` with `thru`"
        } else {
            "write `name is many Target thru inverseField`"
        };
        report.push(
            Diagnostic::error(
                DiagnosticCode::MalformedRelationshipClause,
                line,
                format!("many-relationship '{name}' needs exactly one `thru` clause"),
            )
            .with_hint(hint),
        );
        return None;
    };

    let through = through.trim();
    if !is_identifier(through) {
        report.push(Diagnostic::error(
            DiagnosticCode::MalformedRelationshipClause,
            line,
            format!("many-relationship '{name}' joins through '{through}', which is not a field name"),
        ));
        return None;
    }

    let target = head[MANY_KEYWORD.len()..].trim();
    Some(FieldKind::ManyRelation {
        target: (!target.is_empty()).then(|| target.to_string()),
        through: through.to_string(),
    })
}

fn parse_computed(
    type_def: &str,
    line: usize,
    options: &ParseOptions,
    report: &mut ParseReport,
) -> Option<FieldKind> {
    let parts: Vec<&str> = type_def.split(THRU_SEPARATOR).collect();
    let (type_name, function_def) = match parts.as_slice() {
        [type_name, function_def]
            if !type_name.trim().is_empty() && !function_def.trim().is_empty() =>
        {
            (type_name.trim(), function_def.trim())
        }
        _ => {
            report.push(
                Diagnostic::error(
                    DiagnosticCode::MalformedFieldDeclaration,
                    line,
                    format!("computed field '{type_def}' needs a type and exactly one `thru` function"),
                )
                .with_hint("write `name is type thru function(args)`"),
            );
            return None;
        }
    };

    check_primitive(type_name, line, options, report);

    let (function, args) = match split_call(function_def, line, report)? {
        Some((function, raw)) => match parse_function_args(raw) {
            Ok(args) => (function, args),
            Err(err) => {
                report.push(Diagnostic::error(
                    DiagnosticCode::UnterminatedString,
                    line,
                    format!("arguments of '{function}': {err}"),
                ));
                return None;
            }
        },
        None => (function_def, Vec::new()),
    };

    if !is_identifier(function) {
        report.push(Diagnostic::error(
            DiagnosticCode::MalformedFieldDeclaration,
            line,
            format!("computed field has invalid function name '{function}'"),
        ));
        return None;
    }

    Some(FieldKind::Computed {
        type_name: type_name.to_string(),
        function: function.to_string(),
        args,
    })
}

fn ignored_hint(token: &str) -> &'static str {
    if token.starts_with('=') {
        "named arguments need a key before `=`"
    } else if token.starts_with(':') {
        "required parameters need a name after `:`"
    } else {
        "named arguments take exactly one `=`, as in `key=value`"
    }
}

/// Split `name(args)` into its name and raw argument text.
///
/// Returns `Some(None)` when there is no argument list and `None` after
/// reporting a malformed one.
fn split_call<'a>(
    text: &'a str,
    line: usize,
    report: &mut ParseReport,
) -> Option<Option<(&'a str, &'a str)>> {
    let Some(open) = text.find('(') else {
        return Some(None);
    };

    let close = match text.rfind(')') {
        Some(close) if close > open => close,
        _ => {
            report.push(Diagnostic::error(
                DiagnosticCode::UnbalancedParentheses,
                line,
                format!("'{text}' opens an argument list that is never closed"),
            ));
            return None;
        }
    };

    let trailing = text[close + 1..].trim();
    if !trailing.is_empty() {
        report.push(Diagnostic::error(
            DiagnosticCode::MalformedFieldDeclaration,
            line,
            format!("unexpected '{trailing}' after the argument list of '{text}'"),
        ));
        return None;
    }

    Some(Some((text[..open].trim(), &text[open + 1..close])))
}

fn check_primitive(type_name: &str, line: usize, options: &ParseOptions, report: &mut ParseReport) {
    if lookup_column_type(type_name).is_some() {
        return;
    }

    let message = format!("type '{type_name}' has no column mapping and is stored as TEXT");
    let diagnostic = if options.strict_types {
        Diagnostic::error(DiagnosticCode::UnknownPrimitiveType, line, message)
    } else {
        Diagnostic::warning(DiagnosticCode::UnknownPrimitiveType, line, message)
    };
    report.push(diagnostic.with_hint(KNOWN_TYPES_HINT));
}

/// ASCII SQL identifier: a letter or `_`, then letters, digits or `_`.
pub fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() || first == '_' => {
            chars.all(|ch| ch.is_ascii_alphanumeric() || ch == '_')
        }
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::Severity;

    fn severity_of(report: &ParseReport, code: DiagnosticCode) -> Option<Severity> {
        report
            .errors
            .iter()
            .chain(&report.warnings)
            .find(|diagnostic| diagnostic.code == code)
            .map(|diagnostic| diagnostic.severity)
    }

    fn parse_with(declaration: &str, options: &ParseOptions) -> (Option<Field>, ParseReport) {
        let mut report = ParseReport::default();
        let field = parse_field_line(declaration, 3, options, &mut report);
        (field, report)
    }

    #[test]
    fn classification_order_is_action_many_computed_scalar() {
        assert_eq!(classify("action thru upload(files)"), FieldShape::Action);
        assert_eq!(classify("many User thru friends"), FieldShape::ManyRelation);
        assert_eq!(classify("text thru either(a b)"), FieldShape::Computed);
        assert_eq!(classify("text"), FieldShape::Scalar);
    }

    #[test]
    fn action_prefix_wins_over_thru() {
        assert_eq!(classify("action thru many thru x"), FieldShape::Action);
        assert_eq!(classify("many thru action"), FieldShape::ManyRelation);
    }

    #[test]
    fn thru_without_spaces_is_scalar() {
        assert_eq!(classify("textthrufoo"), FieldShape::Scalar);
    }

    #[test]
    fn parses_scalar_field() {
        let field = parse_field("id is text").expect("scalar parses");

        assert_eq!(field.name, "id");
        assert_eq!(
            field.kind,
            FieldKind::Scalar {
                type_name: "text".to_string()
            }
        );
    }

    #[test]
    fn parses_many_relation_with_target() {
        let field = parse_field("friends is many User thru befriendedBy").expect("many parses");

        assert_eq!(field.name, "friends");
        assert_eq!(
            field.kind,
            FieldKind::ManyRelation {
                target: Some("User".to_string()),
                through: "befriendedBy".to_string(),
            }
        );
    }

    #[test]
    fn many_without_target_keeps_through() {
        let field = parse_field("tags is many thru posts").expect("many parses");

        assert_eq!(
            field.kind,
            FieldKind::ManyRelation {
                target: None,
                through: "posts".to_string(),
            }
        );
    }

    #[test]
    fn many_with_and_form_is_rejected_with_hint() {
        let report = parse_field("friends is many User and befriendedBy").unwrap_err();

        assert_eq!(report.errors.len(), 1);
        let error = &report.errors[0];
        assert_eq!(error.code, DiagnosticCode::MalformedRelationshipClause);
        assert!(error.hint.as_deref().unwrap_or_default().contains("replace `and`"));
    }

    #[test]
    fn many_without_thru_is_rejected() {
        let report = parse_field("friends is many User").unwrap_err();
        assert!(report.has_code(DiagnosticCode::MalformedRelationshipClause));
    }

    #[test]
    fn parses_action_with_arguments() {
        let field =
            parse_field("upload is action thru attach(attachments :key bucket=files)").expect("action");

        let FieldKind::Action { verb, args } = field.kind else {
            panic!("expected action, got {:?}", field.kind);
        };
        assert_eq!(verb, "attach");
        assert_eq!(args.get("arg1"), Some("attachments"));
        assert_eq!(args.required_params, vec!["key".to_string()]);
        assert_eq!(args.get("bucket"), Some("files"));
    }

    #[test]
    fn action_without_argument_list() {
        let field = parse_field("archive is action thru archive").expect("action");

        assert_eq!(
            field.kind,
            FieldKind::Action {
                verb: "archive".to_string(),
                args: ActionArgs::default(),
            }
        );
    }

    #[test]
    fn action_without_thru_is_rejected() {
        let report = parse_field("upload is action").unwrap_err();
        assert!(report.has_code(DiagnosticCode::MalformedRelationshipClause));
    }

    #[test]
    fn action_with_unclosed_arguments_is_rejected() {
        let report = parse_field("upload is action thru attach(files").unwrap_err();
        assert!(report.has_code(DiagnosticCode::UnbalancedParentheses));
    }

    #[test]
    fn ignored_action_arguments_become_warnings() {
        let (field, report) = parse_with(
            "upload is action thru attach(a=b=c files)",
            &ParseOptions::default(),
        );

        assert!(field.is_some());
        assert!(report.is_ok());
        assert_eq!(report.warnings.len(), 1);
        assert_eq!(report.warnings[0].code, DiagnosticCode::IgnoredArgument);
        assert_eq!(report.warnings[0].line, 3);
    }

    #[test]
    fn parses_computed_field() {
        let field = parse_field("label is text thru either(\"short\" \"very long\")")
            .expect("computed parses");

        assert_eq!(
            field.kind,
            FieldKind::Computed {
                type_name: "text".to_string(),
                function: "either".to_string(),
                args: vec!["short".to_string(), "very long".to_string()],
            }
        );
    }

    #[test]
    fn computed_without_argument_list_keeps_function_name() {
        let field = parse_field("total is number thru sum").expect("computed parses");

        assert_eq!(
            field.kind,
            FieldKind::Computed {
                type_name: "number".to_string(),
                function: "sum".to_string(),
                args: Vec::new(),
            }
        );
    }

    #[test]
    fn computed_with_unterminated_string_is_rejected() {
        let report = parse_field("label is text thru either(\"open)").unwrap_err();
        assert!(report.has_code(DiagnosticCode::UnterminatedString));
    }

    #[test]
    fn computed_with_empty_function_name_is_rejected() {
        let report = parse_field("label is text thru (a b)").unwrap_err();
        assert!(report.has_code(DiagnosticCode::MalformedFieldDeclaration));
    }

    #[test]
    fn computed_with_invalid_function_name_is_rejected() {
        let report = parse_field("label is text thru either or").unwrap_err();
        assert!(report.has_code(DiagnosticCode::MalformedFieldDeclaration));
    }

    #[test]
    fn computed_with_second_thru_is_rejected() {
        let report = parse_field("label is text thru f(x) thru g(y)").unwrap_err();

        assert_eq!(report.errors.len(), 1);
        assert_eq!(report.errors[0].code, DiagnosticCode::MalformedFieldDeclaration);
    }

    #[test]
    fn ignored_argument_hints_name_the_reason() {
        let (_, report) = parse_with(
            "upload is action thru attach(=x a=b=c :)",
            &ParseOptions::default(),
        );

        let hints: Vec<&str> = report
            .warnings
            .iter()
            .map(|warning| warning.hint.as_deref().unwrap_or_default())
            .collect();
        assert_eq!(
            hints,
            vec![
                "named arguments need a key before `=`",
                "named arguments take exactly one `=`, as in `key=value`",
                "required parameters need a name after `:`",
            ]
        );
    }

    #[test]
    fn missing_is_separator_is_rejected() {
        let report = parse_field("name text").unwrap_err();

        assert_eq!(report.errors[0].code, DiagnosticCode::MalformedFieldDeclaration);
        assert_eq!(report.errors[0].line, 1);
    }

    #[test]
    fn repeated_is_separator_is_rejected() {
        let report = parse_field("this is what it is text").unwrap_err();
        assert!(report.has_code(DiagnosticCode::MalformedFieldDeclaration));
    }

    #[test]
    fn field_name_must_be_identifier() {
        let report = parse_field("first name is text").unwrap_err();
        assert!(report.has_code(DiagnosticCode::InvalidIdentifier));
    }

    #[test]
    fn unknown_type_is_a_warning_by_default() {
        let (field, report) = parse_with("meta is json", &ParseOptions::default());

        assert!(field.is_some());
        assert!(report.is_ok());
        assert_eq!(
            severity_of(&report, DiagnosticCode::UnknownPrimitiveType),
            Some(Severity::Warning)
        );
    }

    #[test]
    fn unknown_type_is_an_error_when_strict() {
        let options = ParseOptions { strict_types: true };
        let (_, report) = parse_with("meta is json", &options);

        assert!(!report.is_ok());
        assert_eq!(
            severity_of(&report, DiagnosticCode::UnknownPrimitiveType),
            Some(Severity::Error)
        );
    }

    #[test]
    fn identifiers() {
        assert!(is_identifier("befriendedBy"));
        assert!(is_identifier("_hidden2"));
        assert!(!is_identifier(""));
        assert!(!is_identifier("2fast"));
        assert!(!is_identifier("user-name"));
        assert!(!is_identifier("drop table"));
    }
}
