use std::collections::HashMap;

use indexmap::IndexMap;

use crate::error::RuntimeError;
use crate::runtime::functions::{arg, int_arg, list_arg, Builtin, Mutator};
use crate::runtime::Value;

pub(crate) fn register(routines: &mut HashMap<&'static str, Builtin>) {
    routines.insert("cardinality", |a| match arg("cardinality", a, 0)? {
        Value::List(items) => Ok(Value::Int(items.len() as i64)),
        Value::Map(m) => Ok(Value::Int(m.len() as i64)),
        other => Err(RuntimeError::invalid_argument("cardinality", format!("not a collection: {}", other.type_name()))),
    });
    routines.insert("slice", slice);
    routines.insert("element", element);
    routines.insert("memberOf", |a| {
        let x = arg("memberOf", a, 0)?;
        Ok(Value::Bool(list_arg("memberOf", a, 1)?.iter().any(|v| v.sql_eq(x))))
    });
    routines.insert("isEmpty", |a| match arg("isEmpty", a, 0)? {
        Value::Map(m) => Ok(Value::Bool(m.is_empty())),
        _ => Ok(Value::Bool(list_arg("isEmpty", a, 0)?.is_empty())),
    });
    routines.insert("isASet", |a| {
        let items = list_arg("isASet", a, 0)?;
        Ok(Value::Bool(distinct(items).len() == items.len()))
    });
    routines.insert("submultisetOf", |a| {
        let (sub, of) = (list_arg("submultisetOf", a, 0)?, list_arg("submultisetOf", a, 1)?);
        Ok(Value::Bool(except_all(sub, of).is_empty()))
    });
    routines.insert("multisetUnionAll", |a| {
        let (x, y) = operands("multisetUnionAll", a)?;
        Ok(Value::List(x.iter().chain(y).cloned().collect()))
    });
    routines.insert("multisetUnionDistinct", |a| {
        let (x, y) = operands("multisetUnionDistinct", a)?;
        let all: Vec<Value> = x.iter().chain(y).cloned().collect();
        Ok(Value::List(distinct(&all)))
    });
    routines.insert("multisetIntersectAll", |a| {
        let (x, y) = operands("multisetIntersectAll", a)?;
        Ok(Value::List(intersect_all(x, y)))
    });
    routines.insert("multisetIntersectDistinct", |a| {
        let (x, y) = operands("multisetIntersectDistinct", a)?;
        Ok(Value::List(distinct(&intersect_all(x, y))))
    });
    routines.insert("multisetExceptAll", |a| {
        let (x, y) = operands("multisetExceptAll", a)?;
        Ok(Value::List(except_all(x, y)))
    });
    routines.insert("multisetExceptDistinct", |a| {
        let (x, y) = operands("multisetExceptDistinct", a)?;
        Ok(Value::List(distinct(x).into_iter().filter(|v| !y.contains(v)).collect()))
    });
    routines.insert("structAccess", struct_access);
    routines.insert("arrayItem", |a| array_item(list_arg("arrayItem", a, 0)?, int_arg("arrayItem", a, 1)?));
    routines.insert("mapItem", |a| match arg("mapItem", a, 0)? {
        Value::Map(m) => Ok(map_item(m, arg("mapItem", a, 1)?)),
        other => Err(RuntimeError::invalid_argument("mapItem", format!("not a map: {}", other.type_name()))),
    });
    routines.insert("anyItem", |a| match arg("anyItem", a, 0)? {
        Value::List(items) => array_item(items, int_arg("anyItem", a, 1)?),
        Value::Map(m) => Ok(map_item(m, arg("anyItem", a, 1)?)),
        other => Err(RuntimeError::invalid_argument("anyItem", format!("cannot index {}", other.type_name()))),
    });
    routines.insert("array", |a| Ok(Value::List(a.to_vec())));
}

pub(crate) fn register_mutators(mutators: &mut HashMap<&'static str, Mutator>) {
    mutators.insert("collectionAdd", |target, a| {
        let v = arg("collectionAdd", a, 0)?.clone();
        list_mut("collectionAdd", target)?.push(v);
        Ok(())
    });
    mutators.insert("collectionAddAll", |target, a| {
        let items = match arg("collectionAddAll", a, 0)? {
            Value::Null => return Ok(()),
            _ => list_arg("collectionAddAll", a, 0)?.to_vec(),
        };
        list_mut("collectionAddAll", target)?.extend(items);
        Ok(())
    });
    mutators.insert("collectionRetainAll", |target, a| {
        let keep = list_arg("collectionRetainAll", a, 0)?;
        list_mut("collectionRetainAll", target)?.retain(|v| keep.contains(v));
        Ok(())
    });
    mutators.insert("mapPut", |target, a| {
        let (k, v) = (arg("mapPut", a, 0)?.clone(), arg("mapPut", a, 1)?.clone());
        match target {
            Value::Map(m) => {
                m.insert(k, v);
                Ok(())
            }
            other => Err(RuntimeError::invalid_argument("mapPut", format!("not a map: {}", other.type_name()))),
        }
    });
}

fn list_mut<'a>(routine: &str, target: &'a mut Value) -> Result<&'a mut Vec<Value>, RuntimeError> {
    match target {
        Value::List(items) => Ok(items),
        other => Err(RuntimeError::invalid_argument(routine, format!("not a collection: {}", other.type_name()))),
    }
}

fn operands<'a>(routine: &str, args: &'a [Value]) -> Result<(&'a [Value], &'a [Value]), RuntimeError> {
    Ok((list_arg(routine, args, 0)?, list_arg(routine, args, 1)?))
}

fn distinct(items: &[Value]) -> Vec<Value> {
    let mut seen = IndexMap::new();
    for item in items {
        seen.entry(item.clone()).or_insert(());
    }
    seen.into_keys().collect()
}

/// Bag intersection: each element as many times as it occurs in both.
fn intersect_all(x: &[Value], y: &[Value]) -> Vec<Value> {
    let mut remaining = y.to_vec();
    x.iter()
        .filter(|v| match remaining.iter().position(|r| r == *v) {
            Some(i) => {
                remaining.swap_remove(i);
                true
            }
            None => false,
        })
        .cloned()
        .collect()
}

/// Bag difference: each occurrence in `y` cancels one in `x`.
fn except_all(x: &[Value], y: &[Value]) -> Vec<Value> {
    let mut remaining = y.to_vec();
    x.iter()
        .filter(|v| match remaining.iter().position(|r| r == *v) {
            Some(i) => {
                remaining.swap_remove(i);
                false
            }
            None => true,
        })
        .cloned()
        .collect()
}

/// A collection of single-field rows flattened to their field values.
fn slice(args: &[Value]) -> Result<Value, RuntimeError> {
    let items = list_arg("slice", args, 0)?;
    Ok(Value::List(
        items
            .iter()
            .map(|v| match v {
                Value::List(fields) if fields.len() == 1 => fields[0].clone(),
                other => other.clone(),
            })
            .collect(),
    ))
}

/// The only element of a collection; null when empty.
fn element(args: &[Value]) -> Result<Value, RuntimeError> {
    match list_arg("element", args, 0)? {
        [] => Ok(Value::Null),
        [single] => Ok(single.clone()),
        _ => Err(RuntimeError::CardinalityViolation("ELEMENT".into())),
    }
}

/// Field `index` (0-based) of a row value.
fn struct_access(args: &[Value]) -> Result<Value, RuntimeError> {
    if args.iter().take(2).any(Value::is_null) {
        return Ok(Value::Null);
    }
    match arg("structAccess", args, 0)? {
        Value::List(fields) => {
            let index = int_arg("structAccess", args, 1)?;
            usize::try_from(index)
                .ok()
                .and_then(|i| fields.get(i))
                .cloned()
                .ok_or_else(|| RuntimeError::invalid_argument("structAccess", format!("no field {index}")))
        }
        Value::Map(m) => {
            let name = args.get(2).cloned().unwrap_or(Value::Null);
            Ok(m.get(&name).cloned().unwrap_or(Value::Null))
        }
        other => Err(RuntimeError::invalid_argument("structAccess", format!("not a row: {}", other.type_name()))),
    }
}

/// 1-based; out of range is null.
fn array_item(items: &[Value], index: i64) -> Result<Value, RuntimeError> {
    Ok(usize::try_from(index - 1)
        .ok()
        .and_then(|i| items.get(i))
        .cloned()
        .unwrap_or(Value::Null))
}

fn map_item(m: &IndexMap<Value, Value>, key: &Value) -> Value {
    m.get(key)
        .or_else(|| m.iter().find(|(k, _)| k.sql_eq(key)).map(|(_, v)| v))
        .cloned()
        .unwrap_or(Value::Null)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::functions::{builtin, mutator};

    fn call(name: &str, args: &[Value]) -> Value {
        builtin(name).unwrap()(args).unwrap()
    }

    fn list(items: &[i64]) -> Value {
        Value::List(items.iter().map(|i| Value::Int(*i)).collect())
    }

    #[test]
    fn multiset_operations_respect_multiplicity() {
        let (a, b) = (list(&[1, 1, 2, 3]), list(&[1, 3, 3]));
        assert_eq!(call("multisetUnionAll", &[a.clone(), b.clone()]), list(&[1, 1, 2, 3, 1, 3, 3]));
        assert_eq!(call("multisetUnionDistinct", &[a.clone(), b.clone()]), list(&[1, 2, 3]));
        assert_eq!(call("multisetIntersectAll", &[a.clone(), b.clone()]), list(&[1, 3]));
        assert_eq!(call("multisetExceptAll", &[a.clone(), b.clone()]), list(&[1, 2]));
        assert_eq!(call("multisetExceptDistinct", &[a.clone(), b.clone()]), list(&[2]));
        assert_eq!(call("submultisetOf", &[list(&[1, 1]), a.clone()]), Value::Bool(true));
        assert_eq!(call("submultisetOf", &[list(&[3, 3]), a.clone()]), Value::Bool(false));
        assert_eq!(call("isASet", &[a]), Value::Bool(false));
    }

    #[test]
    fn element_and_item_lookups() {
        assert_eq!(call("element", &[list(&[])]), Value::Null);
        assert_eq!(call("element", &[list(&[4])]), Value::Int(4));
        assert!(builtin("element").unwrap()(&[list(&[1, 2])]).is_err());
        assert_eq!(call("arrayItem", &[list(&[10, 20]), Value::Int(2)]), Value::Int(20));
        assert_eq!(call("arrayItem", &[list(&[10, 20]), Value::Int(0)]), Value::Null);
        assert_eq!(call("anyItem", &[list(&[10, 20]), Value::Int(1)]), Value::Int(10));
        assert_eq!(call("structAccess", &[list(&[7, 8]), Value::Int(1)]), Value::Int(8));
        assert_eq!(call("memberOf", &[Value::float(2.0), list(&[1, 2])]), Value::Bool(true));
    }

    #[test]
    fn mutators_change_the_target() {
        let mut acc = list(&[1, 2, 3]);
        mutator("collectionRetainAll").unwrap()(&mut acc, &[list(&[2, 3, 4])]).unwrap();
        mutator("collectionAdd").unwrap()(&mut acc, &[Value::Int(9)]).unwrap();
        assert_eq!(acc, list(&[2, 3, 9]));

        let mut m = Value::Map(IndexMap::new());
        mutator("mapPut").unwrap()(&mut m, &[Value::str("k"), Value::Int(1)]).unwrap();
        mutator("mapPut").unwrap()(&mut m, &[Value::str("k"), Value::Int(2)]).unwrap();
        assert_eq!(call("mapItem", &[m.clone(), Value::str("k")]), Value::Int(2));
        assert_eq!(call("cardinality", &[m]), Value::Int(1));
    }
}
