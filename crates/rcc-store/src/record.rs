//! Correction record persistence.
//!
//! Each correction field lives under `{base}.{field}` as a single
//! tuple. Loading is tolerant: a missing property leaves the field at
//! its default, and a property wider than the field contributes only
//! its leading elements.

use rcc_core::correction::FIELDS;
use rcc_core::{Correction, RegionCorrection};
use uuid::Uuid;

use crate::tuples::{first_float_tuple, set_float_tuples};
use crate::{PropertyStore, StoreResult};

/// Loads a correction from `{base}.slope` .. `{base}.gamma`.
///
/// Missing fields keep their defaults.
pub fn load_correction<S: PropertyStore + ?Sized>(store: &S, base: &str) -> StoreResult<Correction> {
    let mut cc = Correction::new();
    for (name, width) in FIELDS {
        let key = format!("{base}.{name}");
        if let Some(tuple) = first_float_tuple(store, &key)? {
            if tuple.len() >= width {
                // width checked above; set_field ignores extra elements
                let _ = cc.set_field(name, &tuple);
            }
        }
    }
    Ok(cc)
}

/// Stores every correction field as a single tuple under `{base}`.
pub fn store_correction<S: PropertyStore + ?Sized>(
    store: &mut S,
    base: &str,
    cc: &Correction,
) -> StoreResult<()> {
    for (name, width) in FIELDS {
        let key = format!("{base}.{name}");
        let values = cc.field(name).unwrap_or_default();
        set_float_tuples(store, &key, &[values], width)?;
    }
    Ok(())
}

/// Deletes every correction field under `{base}`.
pub fn delete_correction<S: PropertyStore + ?Sized>(store: &mut S, base: &str) -> StoreResult<()> {
    for (name, _) in FIELDS {
        store.delete(&format!("{base}.{name}"), true)?;
    }
    Ok(())
}

/// Loads a region record: falloff first, then the correction fields.
pub fn load_region<S: PropertyStore + ?Sized>(
    store: &S,
    base: &str,
    guid: Uuid,
) -> StoreResult<RegionCorrection> {
    let mut region = RegionCorrection::with_guid(guid);
    if let Some(tuple) = first_float_tuple(store, &format!("{base}.falloff"))? {
        if let Some(&f) = tuple.first() {
            region.falloff = f.clamp(0.0, 1.0);
        }
    }
    region.correction = load_correction(store, base)?;
    Ok(region)
}

/// Stores a region record's falloff and correction fields.
pub fn store_region<S: PropertyStore + ?Sized>(
    store: &mut S,
    base: &str,
    region: &RegionCorrection,
) -> StoreResult<()> {
    set_float_tuples(store, &format!("{base}.falloff"), &[vec![region.falloff]], 1)?;
    store_correction(store, base, &region.correction)
}

/// Deletes a region record's falloff and correction fields.
pub fn delete_region<S: PropertyStore + ?Sized>(store: &mut S, base: &str) -> StoreResult<()> {
    store.delete(&format!("{base}.falloff"), true)?;
    delete_correction(store, base)
}
