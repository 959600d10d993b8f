//! Source map version 3 emission: VLQ-encodes the serializer's raw
//! `(gen_line, gen_col, src_pos, name)` mapping tuples into the `mappings`
//! string and assembles the surrounding JSON document.

use crate::span::{NameTable, Position};
use serde::Serialize;

const BASE64_CHARS: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789+/";

fn vlq_encode(value: i64, out: &mut String) {
    let mut value = if value < 0 { ((-value) << 1) | 1 } else { value << 1 } as u64;
    loop {
        let mut digit = (value & 0b11111) as u8;
        value >>= 5;
        if value > 0 {
            digit |= 0b100000;
        }
        out.push(BASE64_CHARS[digit as usize] as char);
        if value == 0 {
            break;
        }
    }
}

#[derive(Debug, Serialize)]
pub struct SourceMapV3 {
    pub version: u8,
    pub file: Option<String>,
    pub sources: Vec<String>,
    #[serde(rename = "sourcesContent", skip_serializing_if = "Option::is_none")]
    pub sources_content: Option<Vec<String>>,
    pub names: Vec<String>,
    pub mappings: String,
}

pub struct SourceMapBuilder {
    file: Option<String>,
    source: String,
    source_content: Option<String>,
    names: NameTable,
}

impl SourceMapBuilder {
    pub fn new(source: impl Into<String>, file: Option<String>) -> Self {
        Self {
            file,
            source: source.into(),
            source_content: None,
            names: NameTable::new(),
        }
    }

    pub fn with_source_content(mut self, content: impl Into<String>) -> Self {
        self.source_content = Some(content.into());
        self
    }

    /// Builds the final document from the serializer's raw mapping tuples.
    /// `mappings` must already be sorted by `(gen_line, gen_col)` — the
    /// serializer emits them in that order since it writes left to right,
    /// top to bottom.
    pub fn build(mut self, mappings: Vec<(u32, u32, Option<Position>, Option<String>)>) -> SourceMapV3 {
        let mut out = String::new();
        let mut prev_gen_line = 0u32;
        let mut prev_gen_col = 0i64;
        let mut prev_src_line = 0i64;
        let mut prev_src_col = 0i64;
        let mut prev_name = 0i64;

        let mut current_line = 0u32;
        let mut segments_on_line = 0u32;
        for (gen_line, gen_col, src_pos, name) in &mappings {
            if *gen_line != current_line {
                for _ in current_line..*gen_line {
                    out.push(';');
                }
                current_line = *gen_line;
                prev_gen_col = 0;
                segments_on_line = 0;
            }
            if segments_on_line > 0 {
                out.push(',');
            }
            segments_on_line += 1;

            vlq_encode(*gen_col as i64 - prev_gen_col, &mut out);
            prev_gen_col = *gen_col as i64;

            if let Some(pos) = src_pos {
                vlq_encode(0, &mut out); // source index, single-source always 0
                vlq_encode(pos.line as i64 - prev_src_line, &mut out);
                prev_src_line = pos.line as i64;
                vlq_encode(pos.column as i64 - prev_src_col, &mut out);
                prev_src_col = pos.column as i64;

                if let Some(name) = name {
                    let idx = self.names.intern(name) as i64;
                    vlq_encode(idx - prev_name, &mut out);
                    prev_name = idx;
                }
            }
            prev_gen_line = *gen_line;
        }
        let _ = prev_gen_line;

        SourceMapV3 {
            version: 3,
            file: self.file.clone(),
            sources: vec![self.source.clone()],
            sources_content: self.source_content.clone().map(|c| vec![c]),
            names: self.names.names().to_vec(),
            mappings: out,
        }
    }
}

impl SourceMapV3 {
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vlq_round_trip_small_values() {
        let mut out = String::new();
        vlq_encode(0, &mut out);
        assert_eq!(out, "A");
        let mut out = String::new();
        vlq_encode(-1, &mut out);
        assert_eq!(out, "D");
    }

    #[test]
    fn builds_a_minimal_map() {
        let builder = SourceMapBuilder::new("input.rb", Some("output.js".to_string()));
        let map = builder.build(vec![(0, 0, Some(Position::new(0, 0)), None)]);
        assert_eq!(map.version, 3);
        assert_eq!(map.sources, vec!["input.rb".to_string()]);
        assert!(!map.mappings.is_empty());
    }
}
