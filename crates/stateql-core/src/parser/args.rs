use thiserror::Error;

use crate::model::ActionArgs;

const REQUIRED_PREFIX: char = ':';
const NAMED_SEPARATOR: char = '=';
const QUOTE: char = '"';

/// A function argument list opened a string literal and never closed it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unterminated string literal starting at column {column}")]
pub struct UnterminatedString {
    /// 1-based character column inside the argument text.
    pub column: usize,
}

/// Parse the text between an action's parentheses.
///
/// Tokens that cannot be classified are dropped; see [`split_action_args`]
/// to observe them.
pub fn parse_action_args(raw: &str) -> ActionArgs {
    split_action_args(raw).0
}

/// Parse action arguments and return the tokens that were dropped.
///
/// `:name` tokens are required parameters, `key=value` tokens are named
/// arguments, everything else is positional in source order.
pub(crate) fn split_action_args(raw: &str) -> (ActionArgs, Vec<&str>) {
    let mut args = ActionArgs::default();
    let mut ignored = Vec::new();

    for token in raw.split_whitespace() {
        if let Some(param) = token.strip_prefix(REQUIRED_PREFIX) {
            if param.is_empty() {
                ignored.push(token);
            } else {
                args.required_params.push(param.to_string());
            }
            continue;
        }

        if token.contains(NAMED_SEPARATOR) {
            let parts: Vec<&str> = token.split(NAMED_SEPARATOR).collect();
            match parts.as_slice() {
                [key, value] if !key.is_empty() => {
                    args.named.insert(key.to_string(), value.to_string());
                }
                _ => ignored.push(token),
            }
            continue;
        }

        args.positional.push(token.to_string());
    }

    (args, ignored)
}

/// Parse the text between a computed field's parentheses.
///
/// Whitespace separates arguments except inside double quotes, and one layer
/// of surrounding quotes is stripped from each argument.
pub fn parse_function_args(raw: &str) -> Result<Vec<String>, UnterminatedString> {
    let mut args = Vec::new();
    let mut current = String::new();
    let mut open_quote: Option<usize> = None;

    for (column, ch) in raw.chars().enumerate() {
        if ch == QUOTE {
            open_quote = match open_quote {
                Some(_) => None,
                None => Some(column),
            };
            current.push(ch);
        } else if ch.is_whitespace() && open_quote.is_none() {
            if !current.is_empty() {
                args.push(strip_quotes(&std::mem::take(&mut current)));
            }
        } else {
            current.push(ch);
        }
    }

    if let Some(column) = open_quote {
        return Err(UnterminatedString { column: column + 1 });
    }

    if !current.is_empty() {
        args.push(strip_quotes(&current));
    }

    Ok(args)
}

fn strip_quotes(token: &str) -> String {
    token
        .strip_prefix(QUOTE)
        .and_then(|rest| rest.strip_suffix(QUOTE))
        .unwrap_or(token)
        .to_string()
}
