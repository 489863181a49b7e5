//! Tuple reshaping over flat property payloads.
//!
//! Properties store `width x N` flat vectors; the corrector works in
//! N tuples of `width`. Reading coerces int32 payloads to float32;
//! string payloads fail with [`StoreError::UnsupportedType`]. Writing
//! flattens and auto-creates the property on first write.

use crate::{PropData, PropertyStore, StoreError, StoreResult};

/// Reads a property as float tuples of its declared width.
///
/// Int payloads are coerced to f32. A trailing partial tuple is
/// dropped.
pub fn float_tuples<S: PropertyStore + ?Sized>(store: &S, key: &str) -> StoreResult<Vec<Vec<f32>>> {
    let info = store.info(key)?;
    let flat: Vec<f32> = match store.get(key)? {
        PropData::Float(v) => v,
        PropData::Int(v) => v.into_iter().map(|x| x as f32).collect(),
        PropData::Str(_) => {
            return Err(StoreError::UnsupportedType(format!(
                "{key}: string property where numeric tuples expected"
            )));
        }
    };

    Ok(flat
        .chunks_exact(info.width.max(1))
        .map(|c| c.to_vec())
        .collect())
}

/// First tuple of a property, or `None` when the key is absent or the
/// payload is empty.
pub fn first_float_tuple<S: PropertyStore + ?Sized>(store: &S, key: &str) -> StoreResult<Option<Vec<f32>>> {
    if !store.exists(key) {
        return Ok(None);
    }
    Ok(float_tuples(store, key)?.into_iter().next())
}

/// Writes float tuples, flattening and creating the property if needed.
pub fn set_float_tuples<S: PropertyStore + ?Sized>(
    store: &mut S,
    key: &str,
    tuples: &[Vec<f32>],
    width: usize,
) -> StoreResult<()> {
    let mut flat = Vec::with_capacity(tuples.len() * width);
    for t in tuples {
        flat.extend_from_slice(&t[..width.min(t.len())]);
        // pad short tuples so the flat vector stays width-aligned
        for _ in t.len()..width {
            flat.push(0.0);
        }
    }
    store.set(key, PropData::Float(flat), width, true)
}

/// Reads a width-1 string list property. Missing key reads as empty.
pub fn string_list<S: PropertyStore + ?Sized>(store: &S, key: &str) -> StoreResult<Vec<String>> {
    if !store.exists(key) {
        return Ok(Vec::new());
    }
    match store.get(key)? {
        PropData::Str(v) => Ok(v),
        other => Err(StoreError::UnsupportedType(format!(
            "{key}: {} property where strings expected",
            other.prop_type().name()
        ))),
    }
}

/// Writes a width-1 string list, creating the property if needed.
pub fn set_string_list<S: PropertyStore + ?Sized>(
    store: &mut S,
    key: &str,
    values: &[String],
) -> StoreResult<()> {
    store.set(key, PropData::Str(values.to_vec()), 1, true)
}

/// Reads a scalar int property. Missing key reads as `default`.
pub fn int_scalar<S: PropertyStore + ?Sized>(store: &S, key: &str, default: i32) -> StoreResult<i32> {
    if !store.exists(key) {
        return Ok(default);
    }
    match store.get(key)? {
        PropData::Int(v) => Ok(v.first().copied().unwrap_or(default)),
        PropData::Float(v) => Ok(v.first().copied().unwrap_or(default as f32) as i32),
        PropData::Str(_) => Err(StoreError::UnsupportedType(format!(
            "{key}: string property where int expected"
        ))),
    }
}

/// Writes a scalar int property, creating it if needed.
pub fn set_int_scalar<S: PropertyStore + ?Sized>(store: &mut S, key: &str, value: i32) -> StoreResult<()> {
    store.set(key, PropData::Int(vec![value]), 1, true)
}
