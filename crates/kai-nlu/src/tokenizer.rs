//! Character-class tokenizer.
//!
//! Runs of whitespace collapse into a single `" "` token. Full stops, hyphens,
//! quotes, special characters and punctuation are one token each. Digit runs
//! and ASCII letter runs form words. Other characters are dropped.
//! Contractions (`don't`, `we'll`, `Peter's`) are rejoined into one token.

use kai_types::Token;

/// Split text into tokens.
pub fn tokenize(text: &str) -> Vec<Token> {
    let mut parts: Vec<String> = Vec::new();
    let mut chars = text.chars().peekable();

    while let Some(&ch) = chars.peek() {
        if is_whitespace(ch) {
            while chars.peek().is_some_and(|c| is_whitespace(*c)) {
                chars.next();
            }
            parts.push(" ".to_string());
        } else if ch.is_ascii_digit() || ch.is_ascii_alphabetic() {
            let numeric = ch.is_ascii_digit();
            let mut word = String::new();
            while let Some(&c) = chars.peek() {
                let same_class = if numeric {
                    c.is_ascii_digit()
                } else {
                    c.is_ascii_alphabetic()
                };
                if !same_class {
                    break;
                }
                word.push(c);
                chars.next();
            }
            parts.push(word);
        } else {
            chars.next();
            if let Some(symbol) = symbol_text(ch) {
                parts.push(symbol);
            }
        }
    }

    join_contractions(parts).into_iter().map(Token::text).collect()
}

/// Drop whitespace tokens.
pub fn filter_spaces(tokens: &[Token]) -> Vec<Token> {
    tokens
        .iter()
        .filter(|t| t.text.chars().any(|c| !is_whitespace(c)))
        .cloned()
        .collect()
}

/// Render tokens back into readable text.
///
/// Words are separated by one space; closing punctuation and contraction
/// suffixes attach to the previous word, opening brackets to the next, and
/// double quotes alternate between opening and closing.
pub fn to_text(tokens: &[Token]) -> String {
    let mut out: Vec<&str> = Vec::with_capacity(tokens.len() * 2);
    let mut quotes = 0;

    for token in tokens {
        let text = token.text.as_str();
        if no_space_before(text) && out.last() == Some(&" ") {
            out.pop();
        }
        if text == "\"" {
            quotes += 1;
            if quotes % 2 == 0 {
                if out.last() == Some(&" ") {
                    out.pop();
                }
                out.push(text);
                out.push(" ");
            } else {
                out.push(text);
            }
        } else if no_space_after(text) {
            out.push(text);
        } else {
            out.push(text);
            out.push(" ");
        }
    }

    out.concat().trim().to_string()
}

fn symbol_text(ch: char) -> Option<String> {
    if is_full_stop(ch) {
        Some(".".to_string())
    } else if is_hyphen(ch) {
        Some("-".to_string())
    } else if is_single_quote(ch) {
        Some("'".to_string())
    } else if is_double_quote(ch) {
        Some("\"".to_string())
    } else if is_special(ch) || is_punctuation(ch) {
        Some(ch.to_string())
    } else {
        None
    }
}

/// Rejoin `word ' suffix` triples.
fn join_contractions(parts: Vec<String>) -> Vec<String> {
    let mut joined = Vec::with_capacity(parts.len());
    let mut i = 0;
    while i < parts.len() {
        if i + 2 < parts.len() && parts[i + 1] == "'" {
            let prefix = parts[i].to_lowercase();
            let suffix = parts[i + 2].to_lowercase();
            let is_contraction = (CONTRACTION_PREFIXES.contains(&prefix.as_str())
                && CONTRACTION_SUFFIXES.contains(&suffix.as_str()))
                || (suffix == "s" && parts[i].chars().all(|c| c.is_ascii_alphanumeric()));
            if is_contraction {
                joined.push(format!("{}'{}", parts[i], parts[i + 2]));
                i += 3;
                continue;
            }
        }
        joined.push(parts[i].clone());
        i += 1;
    }
    joined
}

const CONTRACTION_PREFIXES: &[&str] = &[
    "couldn", "didn", "doesn", "don", "hadn", "hasn", "haven", "he", "how", "i", "isn", "it",
    "might", "mightn", "must", "mustn", "she", "we", "weren", "what", "when", "where", "who",
    "would", "wouldn", "you", "should", "shouldn", "won", "wont",
];

const CONTRACTION_SUFFIXES: &[&str] = &["ll", "d", "re", "s", "t", "ve", "m"];

fn is_whitespace(ch: char) -> bool {
    matches!(
        ch,
        ' ' | '\t'
            | '\r'
            | '\n'
            | '\u{0008}'
            | '\u{feff}'
            | '\u{303f}'
            | '\u{3000}'
            | '\u{2420}'
            | '\u{2408}'
            | '\u{202f}'
            | '\u{205f}'
            | '\u{2000}'..='\u{200b}'
    )
}

fn is_full_stop(ch: char) -> bool {
    matches!(
        ch,
        '.' | '\u{06d4}' | '\u{0701}' | '\u{0702}' | '\u{fe12}' | '\u{fe52}' | '\u{ff0e}' | '\u{ff61}'
    )
}

fn is_hyphen(ch: char) -> bool {
    matches!(
        ch,
        '-' | '\u{207b}' | '\u{208b}' | '\u{fe63}' | '\u{ff0d}' | '\u{2014}'
    )
}

fn is_single_quote(ch: char) -> bool {
    matches!(
        ch,
        '\'' | '\u{02bc}'
            | '\u{055a}'
            | '\u{07f4}'
            | '\u{07f5}'
            | '\u{2019}'
            | '\u{ff07}'
            | '\u{2018}'
            | '\u{201a}'
            | '\u{201b}'
            | '\u{275b}'
            | '\u{275c}'
    )
}

fn is_double_quote(ch: char) -> bool {
    matches!(
        ch,
        '"' | '\u{00ab}'
            | '\u{00bb}'
            | '\u{201c}'..='\u{201f}'
            | '\u{2039}'
            | '\u{203a}'
            | '\u{275d}'
            | '\u{276e}'
            | '\u{2760}'
            | '\u{276f}'
    )
}

fn is_punctuation(ch: char) -> bool {
    matches!(ch, '!' | '?' | ',' | ':' | ';')
}

fn is_special(ch: char) -> bool {
    "_%$#@^&*()[]{}<>/\\=+|".contains(ch)
}

fn no_space_before(text: &str) -> bool {
    matches!(
        text,
        ";" | "n't" | "'s" | "'ll" | "." | "," | "?" | "!" | ":" | "'m" | "'re" | ")" | "]" | "}" | "'ve"
    )
}

fn no_space_after(text: &str) -> bool {
    matches!(text, "(" | "[" | "{")
}
