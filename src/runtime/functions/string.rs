use std::collections::HashMap;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use md5::Md5;
use regex::{Regex, RegexBuilder};
use sha1::{Digest, Sha1};

use crate::error::RuntimeError;
use crate::runtime::functions::{arg, bool_arg, int_arg, str_arg, Builtin};
use crate::runtime::Value;

pub(crate) fn register(routines: &mut HashMap<&'static str, Builtin>) {
    routines.insert("upper", |a| Ok(Value::str(str_arg("upper", a, 0)?.to_uppercase())));
    routines.insert("lower", |a| Ok(Value::str(str_arg("lower", a, 0)?.to_lowercase())));
    routines.insert("initcap", |a| Ok(Value::str(initcap(str_arg("initcap", a, 0)?))));
    routines.insert("reverse", |a| Ok(Value::str(str_arg("reverse", a, 0)?.chars().rev().collect::<String>())));
    routines.insert("charLength", |a| Ok(Value::Int(str_arg("charLength", a, 0)?.chars().count() as i64)));
    routines.insert("ascii", |a| {
        Ok(Value::Int(str_arg("ascii", a, 0)?.chars().next().map(|c| c as i64).unwrap_or(0)))
    });
    routines.insert("chr", |a| {
        let code = int_arg("chr", a, 0)?;
        let c = u32::try_from(code).ok().and_then(char::from_u32);
        Ok(Value::str(c.map(String::from).unwrap_or_default()))
    });
    routines.insert("space", |a| Ok(Value::str(" ".repeat(count("space", a, 0)?))));
    routines.insert("repeat", |a| Ok(Value::str(str_arg("repeat", a, 0)?.repeat(count("repeat", a, 1)?))));
    routines.insert("toBase64", to_base64);
    routines.insert("fromBase64", from_base64);
    routines.insert("md5", |a| Ok(Value::str(hex(&Md5::digest(bytes("md5", a, 0)?)))));
    routines.insert("sha1", |a| Ok(Value::str(hex(&Sha1::digest(bytes("sha1", a, 0)?)))));
    routines.insert("substring", substring);
    routines.insert("left", |a| side("left", a, true));
    routines.insert("right", |a| side("right", a, false));
    routines.insert("replace", replace);
    routines.insert("translate3", translate3);
    routines.insert("concat", concat);
    routines.insert("concatMulti", concat_multi);
    routines.insert("concatWithNull", concat_with_null);
    routines.insert("overlay", overlay);
    routines.insert("position", position);
    routines.insert("strcmp", |a| {
        let (x, y) = (str_arg("strcmp", a, 0)?, str_arg("strcmp", a, 1)?);
        Ok(Value::Int(x.cmp(y) as i64))
    });
    routines.insert("soundex", |a| Ok(Value::str(soundex(str_arg("soundex", a, 0)?))));
    routines.insert("difference", |a| {
        let (x, y) = (soundex(str_arg("difference", a, 0)?), soundex(str_arg("difference", a, 1)?));
        Ok(Value::Int(x.chars().zip(y.chars()).filter(|(p, q)| p == q).count() as i64))
    });
    routines.insert("trim", trim);
    routines.insert("like", like);
    routines.insert("similar", similar);
    routines.insert("posixRegexCaseSensitive", |a| posix_regex(a, false));
    routines.insert("posixRegexCaseInsensitive", |a| posix_regex(a, true));
    routines.insert("regexpReplace", regexp_replace);
}

fn count(routine: &str, args: &[Value], i: usize) -> Result<usize, RuntimeError> {
    Ok(int_arg(routine, args, i)?.max(0) as usize)
}

fn bytes<'a>(routine: &str, args: &'a [Value], i: usize) -> Result<&'a [u8], RuntimeError> {
    match arg(routine, args, i)? {
        Value::Str(s) => Ok(s.as_bytes()),
        Value::Bytes(b) => Ok(b),
        other => Err(RuntimeError::invalid_argument(routine, format!("expected text or binary, got {}", other.type_name()))),
    }
}

fn hex(digest: &[u8]) -> String {
    digest.iter().map(|b| format!("{b:02x}")).collect()
}

fn initcap(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut word_start = true;
    for c in s.chars() {
        if c.is_alphanumeric() {
            if word_start {
                out.extend(c.to_uppercase());
            } else {
                out.extend(c.to_lowercase());
            }
            word_start = false;
        } else {
            out.push(c);
            word_start = true;
        }
    }
    out
}

fn to_base64(args: &[Value]) -> Result<Value, RuntimeError> {
    Ok(Value::str(STANDARD.encode(bytes("toBase64", args, 0)?)))
}

/// Malformed input decodes to null.
fn from_base64(args: &[Value]) -> Result<Value, RuntimeError> {
    let text: String = str_arg("fromBase64", args, 0)?.chars().filter(|c| !c.is_whitespace()).collect();
    Ok(STANDARD.decode(text).map(Value::Bytes).unwrap_or(Value::Null))
}

/// SUBSTRING(s FROM start [FOR length]), 1-based; a start before the
/// first character eats into the length.
fn substring(args: &[Value]) -> Result<Value, RuntimeError> {
    let chars: Vec<char> = str_arg("substring", args, 0)?.chars().collect();
    let start = int_arg("substring", args, 1)?;
    let end = match args.get(2) {
        Some(_) => {
            let length = int_arg("substring", args, 2)?;
            if length < 0 {
                return Err(RuntimeError::invalid_argument("substring", "negative substring length"));
            }
            start.saturating_add(length)
        }
        None => i64::MAX,
    };
    let n = chars.len() as i64;
    let from = (start.max(1) - 1).min(n);
    let to = (end.max(1) - 1).min(n);
    if to <= from {
        return Ok(Value::str(""));
    }
    Ok(Value::str(chars[from as usize..to as usize].iter().collect::<String>()))
}

fn side(routine: &str, args: &[Value], left: bool) -> Result<Value, RuntimeError> {
    if args.iter().any(Value::is_null) {
        return Ok(Value::Null);
    }
    let chars: Vec<char> = str_arg(routine, args, 0)?.chars().collect();
    let n = count(routine, args, 1)?.min(chars.len());
    let taken = if left { &chars[..n] } else { &chars[chars.len() - n..] };
    Ok(Value::str(taken.iter().collect::<String>()))
}

fn replace(args: &[Value]) -> Result<Value, RuntimeError> {
    let (s, search, with) =
        (str_arg("replace", args, 0)?, str_arg("replace", args, 1)?, str_arg("replace", args, 2)?);
    if search.is_empty() {
        return Ok(Value::str(s));
    }
    Ok(Value::str(s.replace(search, with)))
}

/// Characters of `from` map to the same position in `to`; those past the
/// end of `to` are deleted.
fn translate3(args: &[Value]) -> Result<Value, RuntimeError> {
    let s = str_arg("translate3", args, 0)?;
    let from: Vec<char> = str_arg("translate3", args, 1)?.chars().collect();
    let to: Vec<char> = str_arg("translate3", args, 2)?.chars().collect();
    let out = s
        .chars()
        .filter_map(|c| match from.iter().position(|f| *f == c) {
            Some(i) => to.get(i).copied(),
            None => Some(c),
        })
        .collect::<String>();
    Ok(Value::str(out))
}

fn concat(args: &[Value]) -> Result<Value, RuntimeError> {
    match (arg("concat", args, 0)?, arg("concat", args, 1)?) {
        (Value::Bytes(a), Value::Bytes(b)) => Ok(Value::Bytes([a.as_slice(), b.as_slice()].concat())),
        (a, b) => Ok(Value::str(format!("{a}{b}"))),
    }
}

fn concat_multi(args: &[Value]) -> Result<Value, RuntimeError> {
    Ok(Value::str(args.iter().filter(|v| !v.is_null()).map(Value::to_string).collect::<String>()))
}

/// Null only when both operands are; a single null side reads as empty.
fn concat_with_null(args: &[Value]) -> Result<Value, RuntimeError> {
    match (arg("concatWithNull", args, 0)?, arg("concatWithNull", args, 1)?) {
        (Value::Null, Value::Null) => Ok(Value::Null),
        (Value::Null, v) | (v, Value::Null) => Ok(Value::str(v.to_string())),
        (a, b) => Ok(Value::str(format!("{a}{b}"))),
    }
}

fn overlay(args: &[Value]) -> Result<Value, RuntimeError> {
    let chars: Vec<char> = str_arg("overlay", args, 0)?.chars().collect();
    let placing = str_arg("overlay", args, 1)?;
    let start = (int_arg("overlay", args, 2)?.max(1) - 1) as usize;
    let length = match args.get(3) {
        Some(_) => count("overlay", args, 3)?,
        None => placing.chars().count(),
    };
    let head: String = chars.iter().take(start).collect();
    let tail: String = chars.iter().skip(start + length).collect();
    Ok(Value::str(format!("{head}{placing}{tail}")))
}

/// 1-based position of `seek` in `s` at or after `from`; 0 when absent.
fn position(args: &[Value]) -> Result<Value, RuntimeError> {
    let seek = str_arg("position", args, 0)?;
    let chars: Vec<char> = str_arg("position", args, 1)?.chars().collect();
    let from = match args.get(2) {
        Some(_) => (int_arg("position", args, 2)?.max(1) - 1) as usize,
        None => 0,
    };
    let needle: Vec<char> = seek.chars().collect();
    if needle.is_empty() {
        return Ok(Value::Int(from.min(chars.len()) as i64 + 1));
    }
    let found = (from..chars.len())
        .find(|i| chars[*i..].starts_with(&needle))
        .map(|i| i as i64 + 1)
        .unwrap_or(0);
    Ok(Value::Int(found))
}

fn soundex(s: &str) -> String {
    fn code(c: char) -> Option<char> {
        match c {
            'B' | 'F' | 'P' | 'V' => Some('1'),
            'C' | 'G' | 'J' | 'K' | 'Q' | 'S' | 'X' | 'Z' => Some('2'),
            'D' | 'T' => Some('3'),
            'L' => Some('4'),
            'M' | 'N' => Some('5'),
            'R' => Some('6'),
            _ => None,
        }
    }
    let letters: Vec<char> = s.chars().filter(char::is_ascii_alphabetic).map(|c| c.to_ascii_uppercase()).collect();
    let Some(first) = letters.first().copied() else {
        return String::new();
    };
    let mut out = String::from(first);
    let mut last = code(first);
    for c in letters.into_iter().skip(1) {
        let current = code(c);
        if current.is_some() && current != last {
            out.extend(current);
            if out.len() == 4 {
                break;
            }
        }
        // H and W do not separate equal codes; vowels do
        if !matches!(c, 'H' | 'W') {
            last = current;
        }
    }
    while out.len() < 4 {
        out.push('0');
    }
    out
}

/// `trim(leading, trailing, seek, s, strict)`. Every character of `seek`
/// is stripped; in strict mode `seek` must be exactly one character.
fn trim(args: &[Value]) -> Result<Value, RuntimeError> {
    let leading = bool_arg("trim", args, 0)?;
    let trailing = bool_arg("trim", args, 1)?;
    let seek = str_arg("trim", args, 2)?;
    let s = str_arg("trim", args, 3)?;
    let strict = bool_arg("trim", args, 4).unwrap_or(true);
    if strict && seek.chars().count() != 1 {
        return Err(RuntimeError::invalid_argument("trim", "trim character must be exactly 1 character"));
    }
    let strip = |c: char| seek.contains(c);
    let mut out = s;
    if leading {
        out = out.trim_start_matches(strip);
    }
    if trailing {
        out = out.trim_end_matches(strip);
    }
    Ok(Value::str(out))
}

fn escape_char(routine: &str, args: &[Value], i: usize) -> Result<Option<char>, RuntimeError> {
    match args.get(i) {
        None | Some(Value::Null) => Ok(None),
        Some(_) => {
            let e = str_arg(routine, args, i)?;
            let mut chars = e.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) => Ok(Some(c)),
                _ => Err(RuntimeError::invalid_argument(routine, "escape must be a single character")),
            }
        }
    }
}

fn compile(routine: &str, pattern: &str, case_insensitive: bool) -> Result<Regex, RuntimeError> {
    RegexBuilder::new(pattern)
        .case_insensitive(case_insensitive)
        .dot_matches_new_line(true)
        .build()
        .map_err(|e| RuntimeError::invalid_argument(routine, e.to_string()))
}

/// LIKE pattern to an anchored regex: `%` is any run, `_` any character.
pub(crate) fn like_to_regex(pattern: &str, escape: Option<char>) -> Result<String, RuntimeError> {
    let mut out = String::from("^");
    let mut chars = pattern.chars();
    while let Some(c) = chars.next() {
        if Some(c) == escape {
            let escaped = chars
                .next()
                .ok_or_else(|| RuntimeError::invalid_argument("like", "pattern ends with the escape character"))?;
            out.push_str(&regex::escape(&escaped.to_string()));
            continue;
        }
        match c {
            '%' => out.push_str(".*"),
            '_' => out.push('.'),
            other => out.push_str(&regex::escape(&other.to_string())),
        }
    }
    out.push('$');
    Ok(out)
}

/// SIMILAR TO pattern to an anchored regex. Alternation, grouping,
/// repetition and bracket expressions keep their regex meaning.
pub(crate) fn similar_to_regex(pattern: &str, escape: Option<char>) -> Result<String, RuntimeError> {
    let mut out = String::from("^(?:");
    let mut chars = pattern.chars();
    while let Some(c) = chars.next() {
        if Some(c) == escape {
            let escaped = chars
                .next()
                .ok_or_else(|| RuntimeError::invalid_argument("similar", "pattern ends with the escape character"))?;
            out.push_str(&regex::escape(&escaped.to_string()));
            continue;
        }
        match c {
            '%' => out.push_str(".*"),
            '_' => out.push('.'),
            '|' | '*' | '+' | '?' | '{' | '}' | '(' | ')' | '[' | ']' => out.push(c),
            other => out.push_str(&regex::escape(&other.to_string())),
        }
    }
    out.push_str(")$");
    Ok(out)
}

fn like(args: &[Value]) -> Result<Value, RuntimeError> {
    let s = str_arg("like", args, 0)?;
    let pattern = like_to_regex(str_arg("like", args, 1)?, escape_char("like", args, 2)?)?;
    Ok(Value::Bool(compile("like", &pattern, false)?.is_match(s)))
}

fn similar(args: &[Value]) -> Result<Value, RuntimeError> {
    let s = str_arg("similar", args, 0)?;
    let pattern = similar_to_regex(str_arg("similar", args, 1)?, escape_char("similar", args, 2)?)?;
    Ok(Value::Bool(compile("similar", &pattern, false)?.is_match(s)))
}

fn posix_regex(args: &[Value], case_insensitive: bool) -> Result<Value, RuntimeError> {
    let s = str_arg("posixRegex", args, 0)?;
    let pattern = str_arg("posixRegex", args, 1)?;
    Ok(Value::Bool(compile("posixRegex", pattern, case_insensitive)?.is_match(s)))
}

/// `regexpReplace(s, pattern, replacement [, position [, occurrence [, matchType]]])`.
/// Occurrence 0 replaces every match; `i` in the match type ignores case.
fn regexp_replace(args: &[Value]) -> Result<Value, RuntimeError> {
    const R: &str = "regexpReplace";
    let s = str_arg(R, args, 0)?;
    let pattern = str_arg(R, args, 1)?;
    let replacement = str_arg(R, args, 2)?;
    let position = match args.get(3) {
        Some(_) => int_arg(R, args, 3)?,
        None => 1,
    };
    let occurrence = match args.get(4) {
        Some(_) => int_arg(R, args, 4)?,
        None => 0,
    };
    let case_insensitive = match args.get(5) {
        Some(_) => str_arg(R, args, 5)?.contains('i'),
        None => false,
    };
    if position < 1 {
        return Err(RuntimeError::invalid_argument(R, "position must be at least 1"));
    }
    let chars: Vec<char> = s.chars().collect();
    if position as usize > chars.len() {
        return Ok(Value::str(s));
    }
    let head: String = chars[..position as usize - 1].iter().collect();
    let tail: String = chars[position as usize - 1..].iter().collect();
    let re = compile(R, pattern, case_insensitive)?;
    let replaced = if occurrence <= 0 {
        re.replace_all(&tail, replacement).into_owned()
    } else {
        match re.find_iter(&tail).nth(occurrence as usize - 1) {
            Some(m) => {
                let mut expanded = String::new();
                if let Some(caps) = re.captures_at(&tail, m.start()) {
                    caps.expand(replacement, &mut expanded);
                }
                format!("{}{}{}", &tail[..m.start()], expanded, &tail[m.end()..])
            }
            None => tail,
        }
    };
    Ok(Value::str(format!("{head}{replaced}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn call(name: &str, args: &[Value]) -> Value {
        crate::runtime::functions::builtin(name).unwrap()(args).unwrap()
    }

    fn s(v: &str) -> Value {
        Value::str(v)
    }

    #[test]
    fn case_and_shape() {
        assert_eq!(call("initcap", &[s("hello wORLD-x")]), s("Hello World-X"));
        assert_eq!(call("reverse", &[s("abc")]), s("cba"));
        assert_eq!(call("charLength", &[s("héllo")]), Value::Int(5));
        assert_eq!(call("ascii", &[s("A")]), Value::Int(65));
        assert_eq!(call("chr", &[Value::Int(97)]), s("a"));
        assert_eq!(call("repeat", &[s("ab"), Value::Int(3)]), s("ababab"));
        assert_eq!(call("space", &[Value::Int(-1)]), s(""));
    }

    #[test]
    fn digests_and_base64() {
        assert_eq!(call("md5", &[s("abc")]), s("900150983cd24fb0d6963f7d28e17f72"));
        assert_eq!(call("sha1", &[s("abc")]), s("a9993e364706816aba3e25717850c26c9cd0d89d"));
        assert_eq!(call("toBase64", &[s("hi")]), s("aGk="));
        assert_eq!(call("fromBase64", &[s("aGk=")]), Value::Bytes(b"hi".to_vec()));
        assert_eq!(call("fromBase64", &[s("@@")]), Value::Null);
    }

    #[test]
    fn substring_and_friends() {
        assert_eq!(call("substring", &[s("abcdef"), Value::Int(2), Value::Int(3)]), s("bcd"));
        assert_eq!(call("substring", &[s("abcdef"), Value::Int(0), Value::Int(3)]), s("ab"));
        assert_eq!(call("substring", &[s("abcdef"), Value::Int(5)]), s("ef"));
        assert_eq!(call("left", &[s("abcdef"), Value::Int(2)]), s("ab"));
        assert_eq!(call("right", &[s("abcdef"), Value::Int(10)]), s("abcdef"));
        assert_eq!(call("right", &[Value::Null, Value::Int(1)]), Value::Null);
        assert_eq!(call("overlay", &[s("abcdef"), s("XY"), Value::Int(2)]), s("aXYdef"));
        assert_eq!(call("position", &[s("cd"), s("abcdcd"), Value::Int(4)]), Value::Int(5));
        assert_eq!(call("position", &[s("z"), s("abc")]), Value::Int(0));
    }

    #[test]
    fn replace_and_translate() {
        assert_eq!(call("replace", &[s("banana"), s("an"), s("o")]), s("booa"));
        assert_eq!(call("translate3", &[s("abcabc"), s("ab"), s("x")]), s("xcxc"));
        assert_eq!(call("concatWithNull", &[Value::Null, s("a")]), s("a"));
        assert_eq!(call("concatWithNull", &[Value::Null, Value::Null]), Value::Null);
        assert_eq!(call("concatMulti", &[s("a"), Value::Int(1), s("b")]), s("a1b"));
    }

    #[test]
    fn soundex_codes() {
        assert_eq!(soundex("Robert"), "R163");
        assert_eq!(soundex("Rupert"), "R163");
        assert_eq!(soundex("Ashcraft"), "A261");
        assert_eq!(soundex("Tymczak"), "T522");
        assert_eq!(call("difference", &[s("Robert"), s("Rupert")]), Value::Int(4));
    }

    #[test]
    fn strict_trim_rejects_long_seek() {
        let args = [Value::Bool(true), Value::Bool(true), s("xy"), s("xyaxy"), Value::Bool(true)];
        assert!(builtin_err("trim", &args));
        let args = [Value::Bool(true), Value::Bool(false), s("xy"), s("xyaxy"), Value::Bool(false)];
        assert_eq!(call("trim", &args), s("axy"));
    }

    fn builtin_err(name: &str, args: &[Value]) -> bool {
        crate::runtime::functions::builtin(name).unwrap()(args).is_err()
    }

    #[test]
    fn pattern_matching() {
        assert_eq!(call("like", &[s("abc"), s("a%")]), Value::Bool(true));
        assert_eq!(call("like", &[s("a.c"), s("a_c")]), Value::Bool(true));
        assert_eq!(call("like", &[s("abc"), s("a.c")]), Value::Bool(false));
        assert_eq!(call("like", &[s("50%"), s("50!%"), s("!")]), Value::Bool(true));
        assert_eq!(call("similar", &[s("abd"), s("ab(c|d)")]), Value::Bool(true));
        assert_eq!(call("similar", &[s("abe"), s("ab(c|d)")]), Value::Bool(false));
        assert_eq!(call("posixRegexCaseInsensitive", &[s("ABC"), s("b")]), Value::Bool(true));
        assert_eq!(call("posixRegexCaseSensitive", &[s("ABC"), s("b")]), Value::Bool(false));
    }

    #[test]
    fn regexp_replace_occurrences() {
        assert_eq!(call("regexpReplace", &[s("a1b2c3"), s("[0-9]"), s("#")]), s("a#b#c#"));
        let args = [s("a1b2c3"), s("[0-9]"), s("#"), Value::Int(1), Value::Int(2)];
        assert_eq!(call("regexpReplace", &args), s("a1b#c3"));
        let args = [s("a1b2c3"), s("[0-9]"), s("#"), Value::Int(4)];
        assert_eq!(call("regexpReplace", &args), s("a1b#c#"));
        let args = [s("ABC"), s("b"), s("x"), Value::Int(1), Value::Int(0), s("i")];
        assert_eq!(call("regexpReplace", &args), s("AxC"));
    }
}
