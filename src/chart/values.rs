//! Values parsing and merging.
//!
//! The overlay merge ("coalesce") is a deep merge where the overlay wins,
//! followed by import-values materialization: keys a chart imports from a
//! subchart are copied into the merged map before anything validates it, so
//! an imported key is never reported as missing.

use serde_yaml::{Mapping, Value};

use super::loader::{Chart, Subchart};
use super::metadata::ImportValues;

/// Strictly parse a values document. Duplicate mapping keys are an error.
///
/// # Errors
/// Returns the underlying YAML error (syntax or duplicate key).
pub fn parse(text: &str) -> Result<Value, serde_yaml::Error> {
    serde_yaml::from_str(text)
}

/// Deep-merge `overlay` into `base`; overlay entries win, nested mappings
/// merge recursively.
pub fn merge_maps(base: &mut Mapping, overlay: &Mapping) {
    for (key, overlay_value) in overlay {
        if let (Some(Value::Mapping(base_child)), Value::Mapping(overlay_child)) =
            (base.get_mut(key), overlay_value)
        {
            merge_maps(base_child, overlay_child);
            continue;
        }
        base.insert(key.clone(), overlay_value.clone());
    }
}

/// Merge a chart's default values with an overlay and materialize
/// import-values entries from loaded subcharts.
///
/// `defaults` is the chart's parsed values document (or `Null` when the
/// chart has none).
#[must_use]
pub fn coalesce(chart: &Chart, defaults: &Value, overlay: &Mapping) -> Mapping {
    let mut merged = match defaults {
        Value::Mapping(map) => map.clone(),
        _ => Mapping::new(),
    };
    merge_maps(&mut merged, overlay);
    apply_import_values(&mut merged, chart);
    merged
}

/// The overlay a subchart receives: the parent's merged subtree under the
/// subchart's name, or an empty map.
#[must_use]
pub fn scoped_overlay(parent_merged: &Mapping, name: &str) -> Mapping {
    match parent_merged.get(name) {
        Some(Value::Mapping(map)) => map.clone(),
        _ => Mapping::new(),
    }
}

/// Look up a dotted path ("a.b.c") in a mapping.
#[must_use]
pub fn get_path<'a>(map: &'a Mapping, path: &str) -> Option<&'a Value> {
    let mut segments = path.split('.');
    let first = segments.next()?;
    let mut current = map.get(first)?;
    for segment in segments {
        current = match current {
            Value::Mapping(child) => child.get(segment)?,
            _ => return None,
        };
    }
    Some(current)
}

/// Copy import-values entries from loaded subcharts into `merged`.
///
/// Entries already present in the parent are left alone; imports only fill
/// gaps.
fn apply_import_values(merged: &mut Mapping, chart: &Chart) {
    for dependency in &chart.metadata.dependencies {
        if dependency.import_values.is_empty() {
            continue;
        }
        let Some(sub_defaults) = subchart_defaults(chart, dependency.effective_name()) else {
            continue;
        };
        for import in &dependency.import_values {
            match import {
                ImportValues::Child { child, parent } => {
                    if let Some(value) = get_path(&sub_defaults, child) {
                        set_path_if_absent(merged, parent, value.clone());
                    }
                }
                ImportValues::Exports(key) => {
                    let export_path = format!("exports.{key}");
                    if let Some(Value::Mapping(exported)) = get_path(&sub_defaults, &export_path) {
                        for (k, v) in exported {
                            if !merged.contains_key(k) {
                                merged.insert(k.clone(), v.clone());
                            }
                        }
                    }
                }
            }
        }
    }
}

/// A loaded subchart's parsed default values, by effective name.
fn subchart_defaults(chart: &Chart, name: &str) -> Option<Mapping> {
    chart.subcharts.iter().find_map(|sub| match sub {
        Subchart::Loaded(c) if c.name() == name => match &c.raw_values {
            Some(raw) => match parse(raw) {
                Ok(Value::Mapping(map)) => Some(map),
                _ => None,
            },
            None => None,
        },
        _ => None,
    })
}

/// Insert a value at a dotted path unless something is already there,
/// creating intermediate mappings as needed. A `.` path targets the root.
fn set_path_if_absent(map: &mut Mapping, path: &str, value: Value) {
    if path.is_empty() || path == "." {
        if let Value::Mapping(entries) = value {
            for (k, v) in entries {
                if !map.contains_key(&k) {
                    map.insert(k, v);
                }
            }
        }
        return;
    }

    match path.split_once('.') {
        None => {
            if !map.contains_key(path) {
                map.insert(Value::String(path.to_string()), value);
            }
        }
        Some((head, rest)) => {
            if !matches!(map.get(head), Some(Value::Mapping(_))) {
                map.insert(
                    Value::String(head.to_string()),
                    Value::Mapping(Mapping::new()),
                );
            }
            if let Some(Value::Mapping(child)) = map.get_mut(head) {
                set_path_if_absent(child, rest, value);
            }
        }
    }
}

#[cfg(test)]
#[path = "values_tests.rs"]
mod tests;
