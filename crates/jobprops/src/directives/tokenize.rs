use crate::common::parser::{NomResult, consume_all};
use nom::branch::alt;
use nom::bytes::complete::{is_not, take_till};
use nom::character::complete::{anychar, char, space0, space1};
use nom::combinator::{cut, map};
use nom::multi::{fold_many0, fold_many1, separated_list0};
use nom::sequence::{delimited, preceded, terminated};

/// Resolves a backslash escape inside double quotes. Only a few characters can be
/// escaped there, otherwise the backslash is kept.
fn double_quoted_escape(c: char) -> String {
    match c {
        '"' | '\\' | '$' | '`' => c.to_string(),
        '\n' => String::new(),
        c => format!("\\{c}"),
    }
}

fn p_single_quoted(input: &str) -> NomResult<String> {
    map(
        preceded(char('\''), cut(terminated(take_till(|c: char| c == '\''), char('\'')))),
        |s: &str| s.to_string(),
    )(input)
}

fn p_double_quoted(input: &str) -> NomResult<String> {
    let fragment = alt((
        map(is_not("\"\\"), |s: &str| s.to_string()),
        map(preceded(char('\\'), anychar), double_quoted_escape),
    ));
    preceded(
        char('"'),
        cut(terminated(
            fold_many0(fragment, String::new, |mut acc: String, fragment: String| {
                acc.push_str(&fragment);
                acc
            }),
            char('"'),
        )),
    )(input)
}

fn p_unquoted(input: &str) -> NomResult<String> {
    alt((
        map(is_not(" \t'\"\\"), |s: &str| s.to_string()),
        map(preceded(char('\\'), cut(anychar)), |c: char| c.to_string()),
    ))(input)
}

/// One shell word; quoted and unquoted pieces written next to each other form one token.
fn p_word(input: &str) -> NomResult<String> {
    fold_many1(
        alt((p_single_quoted, p_double_quoted, p_unquoted)),
        String::new,
        |mut acc: String, piece: String| {
            acc.push_str(&piece);
            acc
        },
    )(input)
}

fn p_words(input: &str) -> NomResult<Vec<String>> {
    delimited(space0, separated_list0(space1, p_word), space0)(input)
}

/// Splits a directive body into arguments following shell quoting rules.
pub fn tokenize(body: &str) -> anyhow::Result<Vec<String>> {
    consume_all(p_words, body)
}
