//! `ruby2js`: a source-to-source compiler that lowers a Ruby-like scripting
//! language into ECMAScript-compatible text with accompanying source maps.
//!
//! The pipeline is: an external parser produces a concrete tree (`ParserTree`,
//! supplied by the caller), [`lowering`] normalizes it into this crate's AST,
//! [`comments`] associates trailing/leading comments with the nodes they
//! belong to, [`filters`] run a configurable sequence of whole-tree rewrites,
//! and [`converter`] walks the result to produce text and a source map.

pub mod ast;
pub mod comments;
pub mod converter;
pub mod error;
pub mod filters;
pub mod interner;
pub mod lowering;
pub mod namespace;
pub mod options;
pub mod serializer;
pub mod source_map;
pub mod span;

pub use converter::Converter;
pub use error::{ConvertError, ConvertResult};
pub use lowering::{Lowering, LoweringOptions, ParserTree};
pub use options::ConvertOptions;
pub use source_map::SourceMapV3;
pub use span::{Position, Span};

use span::LineIndex;

/// Converts `source` (SRC) into TGT text and a source map, using `parser` to
/// produce the initial concrete tree.
///
/// This is the single public entry point; callers that need to inspect or
/// further rewrite the AST between stages should call [`lowering`],
/// [`comments`], [`filters`] and [`converter`] directly instead.
#[tracing::instrument(level = "debug", skip(parser, source))]
pub fn convert(
    parser: &dyn ParserTree,
    source: &str,
    mut options: ConvertOptions,
) -> ConvertResult<(String, SourceMapV3)> {
    if options.source.is_none() {
        options.source = Some(source.to_string());
    }

    let parsed = parser.parse(source, options.file.as_deref());
    if let Some(message) = parsed.errors.into_iter().next() {
        let line_index = LineIndex::new(source);
        let span = Span::new(
            line_index.line_col(text_size::TextSize::from(0)),
            line_index.line_col(text_size::TextSize::from(0)),
        );
        return Err(ConvertError::ParserError { message, span });
    }

    let lowering = Lowering::new(LoweringOptions { eslevel: options.eslevel });
    let root = lowering.lower_program(&parsed.tree)?;
    tracing::debug!(node_count_hint = root.children().len() as u64, "lowered program");

    let pipeline = filters::Pipeline::for_options(&options);
    let root = pipeline.run(root, &options)?;

    // The pipeline replaced (and re-id'd) any node it rewrote, so the
    // pre-pipeline comment map no longer matches the post-pipeline tree's
    // node identities (spec.md §4.3: "comment association is recomputed
    // because new nodes replaced old ones").
    let comment_map = comments::associate_comments(&root, &parsed.comments);

    let converter = Converter::new(&options, &comment_map, source);
    converter.run(&root)
}
