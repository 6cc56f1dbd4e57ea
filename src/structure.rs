//! Tabularization of arbitrary JSON values
//!
//! Map keys are visited in serde_json's map order, which is sorted by key.
//! This fixes both the column order of a key union and which array wins when
//! an object contains several.

use crate::frame::{Column, ColumnValues, Frame};
use crate::inference::build_column;
use crate::value::{display_value, JsonShape};
use serde_json::{Map, Value};
use std::collections::BTreeSet;
use tracing::debug;

/// Property that wraps the payload of a relationship edge.
const EDGE_NODE_KEY: &str = "node";

/// Builds the frame for a query result, keeping the analyzer's column order.
pub fn frame_from_value(name: &str, value: &Value) -> Frame {
    Frame::new(name, analyze(value))
}

/// Turns a JSON value into equally long, typed columns.
pub fn analyze(value: &Value) -> Vec<Column> {
    match JsonShape::of(value) {
        JsonShape::Array(items) => analyze_array(items),
        JsonShape::Object(map) => analyze_object(map),
        JsonShape::Scalar(scalar) => vec![single_value_column(Some(display_value(scalar)))],
        JsonShape::Null => vec![single_value_column(None)],
    }
}

/// Tabularizes an array, unwrapping GraphQL edges when most items have a `node`.
///
/// An array without any object rows still yields a frame: its elements form a
/// single inferred `value` column instead of an empty frame.
pub fn analyze_array(items: &[Value]) -> Vec<Column> {
    if items.is_empty() {
        return Vec::new();
    }

    if is_edges_pattern(items) {
        let nodes: Vec<&Value> = items
            .iter()
            .filter_map(|item| item.get(EDGE_NODE_KEY))
            .filter(|node| !node.is_null())
            .collect();

        if !nodes.is_empty() {
            debug!("Unwrapped {} of {} edges to nodes", nodes.len(), items.len());
            return tabulate_rows(&nodes);
        }
        debug!("Edges pattern without nodes, using items as-is");
    }

    let rows: Vec<&Value> = items.iter().collect();
    tabulate_rows(&rows)
}

/// More than half of the items are objects with a `node` property.
fn is_edges_pattern(items: &[Value]) -> bool {
    let node_count = items
        .iter()
        .filter(|item| {
            item.as_object()
                .map(|obj| obj.contains_key(EDGE_NODE_KEY))
                .unwrap_or(false)
        })
        .count();
    node_count * 2 > items.len()
}

/// One column per key in the union of row keys.
///
/// Rows that are not objects, or that lack a key, contribute nulls. When no
/// row is an object the rows themselves form a single `value` column.
fn tabulate_rows(rows: &[&Value]) -> Vec<Column> {
    if !rows.iter().any(|row| row.is_object()) {
        let cells: Vec<Option<&Value>> = rows.iter().map(|row| Some(*row)).collect();
        return vec![build_column("value", &cells)];
    }

    let keys: BTreeSet<&str> = rows
        .iter()
        .filter_map(|row| row.as_object())
        .flat_map(|obj| obj.keys().map(String::as_str))
        .collect();

    keys.into_iter()
        .map(|key| {
            let cells: Vec<Option<&Value>> = rows
                .iter()
                .map(|row| row.as_object().and_then(|obj| obj.get(key)))
                .collect();
            build_column(key, &cells)
        })
        .collect()
}

/// Tabularizes the first array found in the object, or falls back to key/value rows.
pub fn analyze_object(map: &Map<String, Value>) -> Vec<Column> {
    let mut arrays = Vec::new();
    find_arrays(map, &mut arrays);

    match arrays.first() {
        Some(first) => {
            debug!("Found {} arrays in object, using the first", arrays.len());
            analyze_array(first)
        }
        None => key_value_columns(map),
    }
}

/// Depth-first collection of arrays; nested objects are searched, arrays are not.
fn find_arrays<'a>(map: &'a Map<String, Value>, arrays: &mut Vec<&'a [Value]>) {
    for value in map.values() {
        match JsonShape::of(value) {
            JsonShape::Array(items) => arrays.push(items),
            JsonShape::Object(nested) => find_arrays(nested, arrays),
            JsonShape::Scalar(_) | JsonShape::Null => {}
        }
    }
}

/// Two string columns, `key` and `value`, one row per top-level key.
fn key_value_columns(map: &Map<String, Value>) -> Vec<Column> {
    let keys = map.keys().map(|key| Some(key.clone())).collect();
    let values = map
        .values()
        .map(|value| (!value.is_null()).then(|| display_value(value)))
        .collect();

    vec![
        Column::new("key", ColumnValues::String(keys)),
        Column::new("value", ColumnValues::String(values)),
    ]
}

fn single_value_column(cell: Option<String>) -> Column {
    Column::new("value", ColumnValues::String(vec![cell]))
}
