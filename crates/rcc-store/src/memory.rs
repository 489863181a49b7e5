//! In-memory property store.

use std::collections::HashMap;

use crate::{PropData, PropInfo, PropType, PropertyStore, StoreError, StoreResult};

#[derive(Debug, Clone)]
struct Property {
    ty: PropType,
    width: usize,
    data: PropData,
}

/// HashMap-backed [`PropertyStore`].
///
/// This is the store the in-process player host hands to the corrector;
/// tests use it directly.
///
/// # Example
///
/// ```rust
/// use rcc_store::{MemoryStore, PropertyStore, PropData};
///
/// let mut store = MemoryStore::new();
/// store.set("node.frame:12.regions", PropData::Str(vec!["abc".into()]), 1, true).unwrap();
/// let data = store.get("node.frame:12.regions").unwrap();
/// assert_eq!(data.len(), 1);
/// ```
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    props: HashMap<String, Property>,
}

impl MemoryStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored properties.
    pub fn len(&self) -> usize {
        self.props.len()
    }

    /// True when no properties are stored.
    pub fn is_empty(&self) -> bool {
        self.props.is_empty()
    }

    /// Keys starting with a prefix, unordered. Test helper for
    /// verifying delete cascades.
    pub fn keys_with_prefix(&self, prefix: &str) -> Vec<String> {
        self.props
            .keys()
            .filter(|k| k.starts_with(prefix))
            .cloned()
            .collect()
    }
}

fn empty_data(ty: PropType) -> PropData {
    match ty {
        PropType::Int => PropData::Int(Vec::new()),
        PropType::Float => PropData::Float(Vec::new()),
        PropType::Str => PropData::Str(Vec::new()),
    }
}

impl PropertyStore for MemoryStore {
    fn exists(&self, key: &str) -> bool {
        self.props.contains_key(key)
    }

    fn info(&self, key: &str) -> StoreResult<PropInfo> {
        let prop = self
            .props
            .get(key)
            .ok_or_else(|| StoreError::MissingProperty(key.to_string()))?;
        Ok(PropInfo {
            ty: prop.ty,
            width: prop.width,
        })
    }

    fn get(&self, key: &str) -> StoreResult<PropData> {
        let prop = self
            .props
            .get(key)
            .ok_or_else(|| StoreError::MissingProperty(key.to_string()))?;
        Ok(prop.data.clone())
    }

    fn create(&mut self, key: &str, ty: PropType, width: usize) -> StoreResult<()> {
        if width == 0 {
            return Err(StoreError::InvalidWidth {
                key: key.to_string(),
                width,
            });
        }
        if self.props.contains_key(key) {
            return Err(StoreError::AlreadyExists(key.to_string()));
        }
        self.props.insert(
            key.to_string(),
            Property {
                ty,
                width,
                data: empty_data(ty),
            },
        );
        Ok(())
    }

    fn set(
        &mut self,
        key: &str,
        data: PropData,
        width: usize,
        create_if_missing: bool,
    ) -> StoreResult<()> {
        if width == 0 {
            return Err(StoreError::InvalidWidth {
                key: key.to_string(),
                width,
            });
        }

        match self.props.get_mut(key) {
            Some(prop) => {
                if prop.ty != data.prop_type() {
                    return Err(StoreError::TypeMismatch {
                        key: key.to_string(),
                        expected: prop.ty.name(),
                        actual: data.prop_type().name(),
                    });
                }
                prop.width = width;
                prop.data = data;
                Ok(())
            }
            None if create_if_missing => {
                self.props.insert(
                    key.to_string(),
                    Property {
                        ty: data.prop_type(),
                        width,
                        data,
                    },
                );
                Ok(())
            }
            None => Err(StoreError::MissingProperty(key.to_string())),
        }
    }

    fn delete(&mut self, key: &str, ignore_missing: bool) -> StoreResult<()> {
        match self.props.remove(key) {
            Some(_) => Ok(()),
            None if ignore_missing => Ok(()),
            None => Err(StoreError::MissingProperty(key.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_then_set() {
        let mut store = MemoryStore::new();
        store.create("a.b", PropType::Float, 3).unwrap();
        assert!(store.exists("a.b"));

        store
            .set("a.b", PropData::Float(vec![1.0, 2.0, 3.0]), 3, false)
            .unwrap();
        assert_eq!(store.get("a.b").unwrap(), PropData::Float(vec![1.0, 2.0, 3.0]));
    }

    #[test]
    fn test_set_auto_create() {
        let mut store = MemoryStore::new();
        store
            .set("x", PropData::Int(vec![5]), 1, true)
            .unwrap();
        let info = store.info("x").unwrap();
        assert_eq!(info.ty, PropType::Int);
        assert_eq!(info.width, 1);
    }

    #[test]
    fn test_set_missing_without_create() {
        let mut store = MemoryStore::new();
        let err = store.set("x", PropData::Int(vec![5]), 1, false);
        assert!(matches!(err, Err(StoreError::MissingProperty(_))));
    }

    #[test]
    fn test_type_mismatch() {
        let mut store = MemoryStore::new();
        store.create("x", PropType::Float, 1).unwrap();
        let err = store.set("x", PropData::Str(vec!["v".into()]), 1, false);
        assert!(matches!(err, Err(StoreError::TypeMismatch { .. })));
    }

    #[test]
    fn test_delete_ignore_missing() {
        let mut store = MemoryStore::new();
        assert!(store.delete("nope", true).is_ok());
        assert!(store.delete("nope", false).is_err());
    }

    #[test]
    fn test_double_create_fails() {
        let mut store = MemoryStore::new();
        store.create("x", PropType::Str, 1).unwrap();
        assert!(matches!(
            store.create("x", PropType::Str, 1),
            Err(StoreError::AlreadyExists(_))
        ));
    }
}
