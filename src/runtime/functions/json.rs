//! JSON routines. Documents travel as JSON text; paths use the SQL/JSON
//! path subset `[lax|strict] $ (.name | ."name" | .* | [n] | [*] | ['name'])*`.

use std::collections::HashMap;

use serde_json::{Map, Value as Json};

use crate::error::RuntimeError;
use crate::rex::{JsonExistsBehavior, JsonNullClause, JsonQueryBehavior, JsonQueryWrapper, JsonValueBehavior, Symbol};
use crate::runtime::functions::{arg, str_arg, Builtin, Mutator};
use crate::runtime::Value;

pub(crate) fn register(routines: &mut HashMap<&'static str, Builtin>) {
    routines.insert("jsonValueExpression", json_value_expression);
    routines.insert("jsonValue", json_value);
    routines.insert("jsonExists", json_exists);
    routines.insert("jsonQuery", json_query);
    routines.insert("jsonType", |a| {
        let name = match document("jsonType", a)? {
            Json::Object(_) => "OBJECT",
            Json::Array(_) => "ARRAY",
            Json::Number(n) if n.is_i64() || n.is_u64() => "INTEGER",
            Json::Number(_) => "DOUBLE",
            Json::String(_) => "STRING",
            Json::Bool(_) => "BOOLEAN",
            Json::Null => "NULL",
        };
        Ok(Value::str(name))
    });
    routines.insert("jsonDepth", |a| match document("jsonDepth", a)? {
        Json::Null => Ok(Value::Null),
        doc => Ok(Value::Int(depth(&doc))),
    });
    routines.insert("jsonKeys", |a| match target("jsonKeys", a)? {
        Some(Json::Object(m)) => Ok(Value::Str(Json::from(m.keys().cloned().collect::<Vec<_>>()).to_string())),
        _ => Ok(Value::Null),
    });
    routines.insert("jsonPretty", |a| {
        let doc = document("jsonPretty", a)?;
        serde_json::to_string_pretty(&doc)
            .map(Value::Str)
            .map_err(|e| RuntimeError::InvalidJson(e.to_string()))
    });
    routines.insert("jsonLength", |a| match target("jsonLength", a)? {
        None => Ok(Value::Null),
        Some(Json::Object(m)) => Ok(Value::Int(m.len() as i64)),
        Some(Json::Array(items)) => Ok(Value::Int(items.len() as i64)),
        Some(_) => Ok(Value::Int(1)),
    });
    routines.insert("jsonRemove", json_remove);
    routines.insert("jsonStorageSize", |a| {
        let doc = document("jsonStorageSize", a)?;
        Ok(Value::Int(doc.to_string().len() as i64))
    });
    routines.insert("jsonObject", json_object);
    routines.insert("jsonArray", json_array);
    routines.insert("isJsonValue", |a| Ok(Value::Bool(parsed(a).is_some())));
    routines.insert("isJsonObject", |a| Ok(Value::Bool(matches!(parsed(a), Some(Json::Object(_))))));
    routines.insert("isJsonArray", |a| Ok(Value::Bool(matches!(parsed(a), Some(Json::Array(_))))));
    routines.insert("isJsonScalar", |a| {
        Ok(Value::Bool(matches!(parsed(a), Some(doc) if !doc.is_object() && !doc.is_array())))
    });
    routines.insert("jsonize", |a| Ok(Value::Str(arg("jsonize", a, 0)?.to_json().to_string())));
}

pub(crate) fn register_mutators(mutators: &mut HashMap<&'static str, Mutator>) {
    mutators.insert("jsonObjectAggAdd", |acc, a| {
        let (key, value) = (arg("jsonObjectAggAdd", a, 0)?, arg("jsonObjectAggAdd", a, 1)?);
        if value.is_null() && null_clause(a.get(2)) == JsonNullClause::AbsentOnNull {
            return Ok(());
        }
        if key.is_null() {
            return Err(RuntimeError::invalid_argument("jsonObjectAggAdd", "null key"));
        }
        match acc {
            Value::Map(m) => {
                m.insert(key.clone(), value.clone());
                Ok(())
            }
            other => Err(RuntimeError::invalid_argument("jsonObjectAggAdd", format!("not a map: {}", other.type_name()))),
        }
    });
    mutators.insert("jsonArrayAggAdd", |acc, a| {
        let value = arg("jsonArrayAggAdd", a, 0)?;
        if value.is_null() && null_clause(a.get(1)) == JsonNullClause::AbsentOnNull {
            return Ok(());
        }
        match acc {
            Value::List(items) => {
                items.push(value.clone());
                Ok(())
            }
            other => Err(RuntimeError::invalid_argument("jsonArrayAggAdd", format!("not a list: {}", other.type_name()))),
        }
    });
}

#[derive(Debug, Clone, PartialEq)]
enum Step {
    Member(String),
    AnyMember,
    Index(usize),
    AnyIndex,
}

#[derive(Debug, Clone, PartialEq)]
struct JsonPath {
    strict: bool,
    steps: Vec<Step>,
}

impl JsonPath {
    fn parse(text: &str) -> Result<JsonPath, RuntimeError> {
        let illegal = || RuntimeError::JsonPath(format!("illegal jsonpath: {text}"));
        let trimmed = text.trim();
        let (strict, rest) = match trimmed.split_once(char::is_whitespace) {
            Some((mode, rest)) if mode.eq_ignore_ascii_case("strict") => (true, rest.trim_start()),
            Some((mode, rest)) if mode.eq_ignore_ascii_case("lax") => (false, rest.trim_start()),
            _ => (false, trimmed),
        };
        let rest = rest.strip_prefix('$').ok_or_else(illegal)?;

        let chars: Vec<char> = rest.chars().collect();
        let mut steps = Vec::new();
        let mut i = 0;
        while i < chars.len() {
            match chars[i] {
                c if c.is_whitespace() => i += 1,
                '.' => {
                    i += 1;
                    match chars.get(i) {
                        Some('*') => {
                            steps.push(Step::AnyMember);
                            i += 1;
                        }
                        Some('"') => {
                            let (name, next) = quoted(&chars, i).ok_or_else(illegal)?;
                            steps.push(Step::Member(name));
                            i = next;
                        }
                        _ => {
                            let start = i;
                            while i < chars.len() && (chars[i].is_alphanumeric() || chars[i] == '_' || chars[i] == '$') {
                                i += 1;
                            }
                            if start == i {
                                return Err(illegal());
                            }
                            steps.push(Step::Member(chars[start..i].iter().collect()));
                        }
                    }
                }
                '[' => {
                    i += 1;
                    while chars.get(i).is_some_and(|c| c.is_whitespace()) {
                        i += 1;
                    }
                    match chars.get(i) {
                        Some('*') => {
                            steps.push(Step::AnyIndex);
                            i += 1;
                        }
                        Some('\'' | '"') => {
                            let (name, next) = quoted(&chars, i).ok_or_else(illegal)?;
                            steps.push(Step::Member(name));
                            i = next;
                        }
                        _ => {
                            let start = i;
                            while chars.get(i).is_some_and(char::is_ascii_digit) {
                                i += 1;
                            }
                            let digits: String = chars[start..i].iter().collect();
                            steps.push(Step::Index(digits.parse().map_err(|_| illegal())?));
                        }
                    }
                    while chars.get(i).is_some_and(|c| c.is_whitespace()) {
                        i += 1;
                    }
                    if chars.get(i) != Some(&']') {
                        return Err(illegal());
                    }
                    i += 1;
                }
                _ => return Err(illegal()),
            }
        }
        Ok(JsonPath { strict, steps })
    }

    /// Every item the path selects. Lax mode drops what is missing;
    /// strict mode fails on it.
    fn select<'a>(&self, doc: &'a Json) -> Result<Vec<&'a Json>, RuntimeError> {
        let mut current = vec![doc];
        for step in &self.steps {
            let mut next = Vec::new();
            for item in current {
                let found: Vec<&Json> = match (step, item) {
                    (Step::Member(name), Json::Object(m)) => m.get(name).into_iter().collect(),
                    (Step::AnyMember, Json::Object(m)) => m.values().collect(),
                    (Step::Index(i), Json::Array(items)) => items.get(*i).into_iter().collect(),
                    (Step::AnyIndex, Json::Array(items)) => items.iter().collect(),
                    _ => Vec::new(),
                };
                if found.is_empty() && self.strict && !matches!(step, Step::AnyMember | Step::AnyIndex) {
                    return Err(RuntimeError::JsonPath(format!("no results for path step {step:?}")));
                }
                next.extend(found);
            }
            current = next;
        }
        Ok(current)
    }

    /// The selection as a single item; several matches are wrapped in an array.
    fn query(&self, doc: &Json) -> Result<Option<Json>, RuntimeError> {
        let mut found = self.select(doc)?;
        Ok(match found.len() {
            0 => None,
            1 => found.pop().cloned(),
            _ => Some(Json::Array(found.into_iter().cloned().collect())),
        })
    }

    fn remove(&self, doc: &mut Json) {
        remove_at(doc, &self.steps);
    }
}

fn quoted(chars: &[char], open: usize) -> Option<(String, usize)> {
    let quote = *chars.get(open)?;
    let close = chars[open + 1..].iter().position(|c| *c == quote)? + open + 1;
    Some((chars[open + 1..close].iter().collect(), close + 1))
}

fn remove_at(node: &mut Json, steps: &[Step]) {
    let Some((step, rest)) = steps.split_first() else {
        return;
    };
    if rest.is_empty() {
        match (step, node) {
            (Step::Member(name), Json::Object(m)) => {
                m.shift_remove(name);
            }
            (Step::AnyMember, Json::Object(m)) => m.clear(),
            (Step::Index(i), Json::Array(items)) if *i < items.len() => {
                items.remove(*i);
            }
            (Step::AnyIndex, Json::Array(items)) => items.clear(),
            _ => {}
        }
        return;
    }
    match (step, node) {
        (Step::Member(name), Json::Object(m)) => {
            if let Some(child) = m.get_mut(name) {
                remove_at(child, rest);
            }
        }
        (Step::AnyMember, Json::Object(m)) => m.values_mut().for_each(|child| remove_at(child, rest)),
        (Step::Index(i), Json::Array(items)) => {
            if let Some(child) = items.get_mut(*i) {
                remove_at(child, rest);
            }
        }
        (Step::AnyIndex, Json::Array(items)) => items.iter_mut().for_each(|child| remove_at(child, rest)),
        _ => {}
    }
}

fn parse_document(routine: &str, v: &Value) -> Result<Json, RuntimeError> {
    match v {
        Value::Str(s) => serde_json::from_str(s).map_err(|e| RuntimeError::InvalidJson(format!("{routine}: {e}"))),
        other => Ok(other.to_json()),
    }
}

fn document(routine: &str, args: &[Value]) -> Result<Json, RuntimeError> {
    parse_document(routine, arg(routine, args, 0)?)
}

/// The document, or the item an optional path argument selects.
fn target(routine: &str, args: &[Value]) -> Result<Option<Json>, RuntimeError> {
    let doc = document(routine, args)?;
    match args.get(1) {
        None | Some(Value::Null) => Ok(Some(doc)),
        Some(_) => JsonPath::parse(str_arg(routine, args, 1)?)?.query(&doc),
    }
}

fn parsed(args: &[Value]) -> Option<Json> {
    match args.first() {
        Some(Value::Str(s)) => serde_json::from_str(s).ok(),
        _ => None,
    }
}

fn depth(doc: &Json) -> i64 {
    let children: Box<dyn Iterator<Item = &Json>> = match doc {
        Json::Object(m) => Box::new(m.values()),
        Json::Array(items) => Box::new(items.iter()),
        _ => return 1,
    };
    children.map(|c| depth(c) + 1).max().unwrap_or(1)
}

fn null_clause(v: Option<&Value>) -> JsonNullClause {
    match v {
        Some(Value::Symbol(Symbol::JsonNullClause(c))) => *c,
        _ => JsonNullClause::NullOnNull,
    }
}

fn symbol_arg(routine: &str, args: &[Value], i: usize) -> Result<Option<Symbol>, RuntimeError> {
    match args.get(i) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Symbol(s)) => Ok(Some(*s)),
        Some(other) => Err(RuntimeError::invalid_argument(routine, format!("expected a flag, got {}", other.type_name()))),
    }
}

/// Canonical text of a JSON argument; text that does not parse is kept as is.
fn json_value_expression(args: &[Value]) -> Result<Value, RuntimeError> {
    let text = str_arg("jsonValueExpression", args, 0)?;
    Ok(match serde_json::from_str::<Json>(text) {
        Ok(doc) => Value::Str(doc.to_string()),
        Err(_) => Value::str(text),
    })
}

/// `jsonValue(json, path, emptyBehavior, emptyDefault, errorBehavior, errorDefault)`
fn json_value(args: &[Value]) -> Result<Value, RuntimeError> {
    let outcome = document("jsonValue", args)
        .and_then(|doc| JsonPath::parse(str_arg("jsonValue", args, 1)?)?.query(&doc));
    let behavior = |i: usize| -> Result<JsonValueBehavior, RuntimeError> {
        match symbol_arg("jsonValue", args, i)? {
            None => Ok(JsonValueBehavior::Null),
            Some(Symbol::JsonValueBehavior(b)) => Ok(b),
            Some(other) => Err(RuntimeError::invalid_argument("jsonValue", format!("unexpected flag {other:?}"))),
        }
    };
    let apply = |b: JsonValueBehavior, default: usize, error: RuntimeError| match b {
        JsonValueBehavior::Error => Err(error),
        JsonValueBehavior::Null => Ok(Value::Null),
        JsonValueBehavior::Default => Ok(args.get(default).cloned().unwrap_or(Value::Null)),
    };
    match outcome {
        Err(e) => apply(behavior(4)?, 5, e),
        Ok(None | Some(Json::Null)) => apply(
            behavior(2)?,
            3,
            RuntimeError::JsonPath("empty result of JSON_VALUE is not allowed".into()),
        ),
        Ok(Some(item @ (Json::Object(_) | Json::Array(_)))) => apply(
            behavior(4)?,
            5,
            RuntimeError::JsonPath(format!("JSON_VALUE requires a scalar value, got {item}")),
        ),
        Ok(Some(scalar)) => Ok(Value::from_json(&scalar)),
    }
}

/// `jsonExists(json, path[, errorBehavior])`; errors default to FALSE.
fn json_exists(args: &[Value]) -> Result<Value, RuntimeError> {
    let outcome = document("jsonExists", args)
        .and_then(|doc| Ok(!JsonPath::parse(str_arg("jsonExists", args, 1)?)?.select(&doc)?.is_empty()));
    match outcome {
        Ok(found) => Ok(Value::Bool(found)),
        Err(e) => match symbol_arg("jsonExists", args, 2)? {
            Some(Symbol::JsonExistsBehavior(JsonExistsBehavior::True)) => Ok(Value::Bool(true)),
            Some(Symbol::JsonExistsBehavior(JsonExistsBehavior::Unknown)) => Ok(Value::Null),
            Some(Symbol::JsonExistsBehavior(JsonExistsBehavior::Error)) => Err(e),
            _ => Ok(Value::Bool(false)),
        },
    }
}

/// `jsonQuery(json, path, wrapper, emptyBehavior, errorBehavior)`
fn json_query(args: &[Value]) -> Result<Value, RuntimeError> {
    let wrapper = match symbol_arg("jsonQuery", args, 2)? {
        Some(Symbol::JsonQueryWrapper(w)) => w,
        _ => JsonQueryWrapper::WithoutArray,
    };
    let behavior = |i: usize| match symbol_arg("jsonQuery", args, i) {
        Ok(Some(Symbol::JsonQueryBehavior(b))) => b,
        _ => JsonQueryBehavior::Null,
    };
    let apply = |b: JsonQueryBehavior, error: RuntimeError| match b {
        JsonQueryBehavior::Error => Err(error),
        JsonQueryBehavior::Null => Ok(Value::Null),
        JsonQueryBehavior::EmptyArray => Ok(Value::str("[]")),
        JsonQueryBehavior::EmptyObject => Ok(Value::str("{}")),
    };

    let outcome = document("jsonQuery", args)
        .and_then(|doc| JsonPath::parse(str_arg("jsonQuery", args, 1)?)?.query(&doc));
    let item = match outcome {
        Err(e) => return apply(behavior(4), e),
        Ok(None | Some(Json::Null)) => {
            return apply(behavior(3), RuntimeError::JsonPath("empty result of JSON_QUERY is not allowed".into()));
        }
        Ok(Some(item)) => item,
    };
    let container = item.is_object() || item.is_array();
    let wrapped = match wrapper {
        JsonQueryWrapper::WithoutArray if !container => {
            return apply(
                behavior(4),
                RuntimeError::JsonPath(format!("JSON_QUERY requires an array or object, got {item}")),
            );
        }
        JsonQueryWrapper::WithoutArray => item,
        JsonQueryWrapper::WithConditionalArray if container => item,
        JsonQueryWrapper::WithConditionalArray | JsonQueryWrapper::WithUnconditionalArray => Json::Array(vec![item]),
    };
    Ok(Value::Str(wrapped.to_string()))
}

/// `jsonRemove(json, path, path...)`
fn json_remove(args: &[Value]) -> Result<Value, RuntimeError> {
    let mut doc = document("jsonRemove", args)?;
    if args.len() < 2 {
        return Err(RuntimeError::invalid_argument("jsonRemove", "expected at least one path"));
    }
    for i in 1..args.len() {
        let path = JsonPath::parse(str_arg("jsonRemove", args, i)?)?;
        if path.steps.is_empty() {
            return Err(RuntimeError::JsonPath("cannot remove the root item".into()));
        }
        path.remove(&mut doc);
    }
    Ok(Value::Str(doc.to_string()))
}

/// `jsonObject(nullClause, key, value, key, value...)`
fn json_object(args: &[Value]) -> Result<Value, RuntimeError> {
    let clause = null_clause(args.first());
    let pairs = args.get(1..).unwrap_or_default();
    if pairs.len() % 2 != 0 {
        return Err(RuntimeError::invalid_argument("jsonObject", "keys and values must pair up"));
    }
    let mut object = Map::new();
    for pair in pairs.chunks(2) {
        let (key, value) = (&pair[0], &pair[1]);
        if value.is_null() && clause == JsonNullClause::AbsentOnNull {
            continue;
        }
        let key = match key {
            Value::Null => return Err(RuntimeError::invalid_argument("jsonObject", "null key")),
            Value::Str(s) => s.clone(),
            other => other.to_string(),
        };
        object.insert(key, value.to_json());
    }
    Ok(Value::Str(Json::Object(object).to_string()))
}

/// `jsonArray(nullClause, value...)`
fn json_array(args: &[Value]) -> Result<Value, RuntimeError> {
    let clause = null_clause(args.first());
    let items: Vec<Json> = args
        .get(1..)
        .unwrap_or_default()
        .iter()
        .filter(|v| !(v.is_null() && clause == JsonNullClause::AbsentOnNull))
        .map(Value::to_json)
        .collect();
    Ok(Value::Str(Json::Array(items).to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::functions::{builtin, mutator};

    fn call(name: &str, args: &[Value]) -> Result<Value, RuntimeError> {
        builtin(name).unwrap()(args)
    }

    fn s(text: &str) -> Value {
        Value::str(text)
    }

    fn flag(symbol: Symbol) -> Value {
        Value::Symbol(symbol)
    }

    #[test]
    fn paths_parse() {
        let p = JsonPath::parse("strict $.a[2].\"b c\"[*]").unwrap();
        assert!(p.strict);
        assert_eq!(
            p.steps,
            vec![Step::Member("a".into()), Step::Index(2), Step::Member("b c".into()), Step::AnyIndex]
        );
        assert!(!JsonPath::parse("$['x']").unwrap().strict);
        assert!(JsonPath::parse("a.b").is_err());
        assert!(JsonPath::parse("$[1").is_err());
    }

    #[test]
    fn strict_mode_fails_on_missing_items() {
        let doc: Json = serde_json::from_str(r#"{"a":[1,2]}"#).unwrap();
        assert!(JsonPath::parse("lax $.b").unwrap().select(&doc).unwrap().is_empty());
        assert!(JsonPath::parse("strict $.b").unwrap().select(&doc).is_err());
        assert_eq!(JsonPath::parse("$.a[*]").unwrap().select(&doc).unwrap().len(), 2);
    }

    #[test]
    fn exists_and_its_error_behavior() {
        let doc = s(r#"{"a":1}"#);
        assert_eq!(call("jsonExists", &[doc.clone(), s("$.a")]).unwrap(), Value::Bool(true));
        assert_eq!(call("jsonExists", &[doc.clone(), s("lax $.b")]).unwrap(), Value::Bool(false));
        let unknown = flag(Symbol::JsonExistsBehavior(JsonExistsBehavior::Unknown));
        assert_eq!(call("jsonExists", &[doc.clone(), s("strict $.b"), unknown]).unwrap(), Value::Null);
        let error = flag(Symbol::JsonExistsBehavior(JsonExistsBehavior::Error));
        assert!(call("jsonExists", &[doc, s("strict $.b"), error]).is_err());
    }

    #[test]
    fn query_wraps_as_asked() {
        let doc = s(r#"{"a":{"b":1},"n":2}"#);
        let wrapper = |w| flag(Symbol::JsonQueryWrapper(w));
        let q = |path: &str, w| call("jsonQuery", &[doc.clone(), s(path), wrapper(w), Value::Null, Value::Null]).unwrap();
        assert_eq!(q("$.a", JsonQueryWrapper::WithoutArray), s(r#"{"b":1}"#));
        assert_eq!(q("$.n", JsonQueryWrapper::WithoutArray), Value::Null);
        assert_eq!(q("$.n", JsonQueryWrapper::WithConditionalArray), s("[2]"));
        assert_eq!(q("$.a", JsonQueryWrapper::WithUnconditionalArray), s(r#"[{"b":1}]"#));
        let empty = flag(Symbol::JsonQueryBehavior(JsonQueryBehavior::EmptyArray));
        let args = [doc, s("$.zz"), wrapper(JsonQueryWrapper::WithoutArray), empty, Value::Null];
        assert_eq!(call("jsonQuery", &args).unwrap(), s("[]"));
    }

    #[test]
    fn inspection_routines() {
        let doc = s(r#"{"a":[1,{"b":null}],"c":"x"}"#);
        assert_eq!(call("jsonType", &[doc.clone()]).unwrap(), s("OBJECT"));
        assert_eq!(call("jsonType", &[s("1.5")]).unwrap(), s("DOUBLE"));
        assert_eq!(call("jsonDepth", &[doc.clone()]).unwrap(), Value::Int(4));
        assert_eq!(call("jsonDepth", &[s("[]")]).unwrap(), Value::Int(1));
        assert_eq!(call("jsonKeys", &[doc.clone()]).unwrap(), s(r#"["a","c"]"#));
        assert_eq!(call("jsonKeys", &[doc.clone(), s("$.a")]).unwrap(), Value::Null);
        assert_eq!(call("jsonLength", &[doc.clone(), s("$.a")]).unwrap(), Value::Int(2));
        assert_eq!(call("jsonLength", &[doc.clone(), s("$.zz")]).unwrap(), Value::Null);
        assert_eq!(call("jsonStorageSize", &[s("{ \"a\" : 1 }")]).unwrap(), Value::Int(7));
        assert_eq!(call("jsonPretty", &[s("[1]")]).unwrap(), s("[\n  1\n]"));
        assert!(matches!(call("jsonType", &[s("{")]), Err(RuntimeError::InvalidJson(_))));
    }

    #[test]
    fn remove_drops_the_selected_items() {
        let doc = s(r#"{"a":[1,2,3],"b":{"c":1,"d":2}}"#);
        assert_eq!(
            call("jsonRemove", &[doc, s("$.a[0]"), s("$.b.c")]).unwrap(),
            s(r#"{"a":[2,3],"b":{"d":2}}"#)
        );
        assert!(call("jsonRemove", &[s("{}"), s("$")]).is_err());
    }

    #[test]
    fn constructors_honor_the_null_clause() {
        let absent = flag(Symbol::JsonNullClause(JsonNullClause::AbsentOnNull));
        let keep = flag(Symbol::JsonNullClause(JsonNullClause::NullOnNull));
        let args = [keep.clone(), s("a"), Value::Int(1), s("b"), Value::Null];
        assert_eq!(call("jsonObject", &args).unwrap(), s(r#"{"a":1,"b":null}"#));
        let args = [absent.clone(), s("a"), Value::Int(1), s("b"), Value::Null];
        assert_eq!(call("jsonObject", &args).unwrap(), s(r#"{"a":1}"#));
        assert_eq!(call("jsonArray", &[absent, Value::Null, s("x")]).unwrap(), s(r#"["x"]"#));
        assert_eq!(call("jsonArray", &[keep]).unwrap(), s("[]"));
    }

    #[test]
    fn predicates_and_value_expression() {
        assert_eq!(call("isJsonValue", &[s("3")]).unwrap(), Value::Bool(true));
        assert_eq!(call("isJsonObject", &[s("[1]")]).unwrap(), Value::Bool(false));
        assert_eq!(call("isJsonArray", &[s("[1]")]).unwrap(), Value::Bool(true));
        assert_eq!(call("isJsonScalar", &[s("\"x\"")]).unwrap(), Value::Bool(true));
        assert_eq!(call("isJsonValue", &[Value::Null]).unwrap(), Value::Bool(false));
        assert_eq!(call("jsonValueExpression", &[s("{ \"a\" : [1, 2] }")]).unwrap(), s(r#"{"a":[1,2]}"#));
        assert_eq!(call("jsonValueExpression", &[s("not json")]).unwrap(), s("not json"));
    }

    #[test]
    fn aggregation_mutators_then_jsonize() {
        let absent = flag(Symbol::JsonNullClause(JsonNullClause::AbsentOnNull));
        let mut acc = Value::List(Vec::new());
        let add = mutator("jsonArrayAggAdd").unwrap();
        add(&mut acc, &[s("a"), absent.clone()]).unwrap();
        add(&mut acc, &[Value::Null, absent.clone()]).unwrap();
        assert_eq!(call("jsonize", &[acc]).unwrap(), s(r#"["a"]"#));

        let mut acc = Value::Map(Default::default());
        let put = mutator("jsonObjectAggAdd").unwrap();
        put(&mut acc, &[s("k"), Value::Int(1), absent.clone()]).unwrap();
        put(&mut acc, &[s("z"), Value::Null, absent.clone()]).unwrap();
        assert!(put(&mut acc, &[Value::Null, Value::Int(1), absent]).is_err());
        assert_eq!(call("jsonize", &[acc]).unwrap(), s(r#"{"k":1}"#));
    }
}
