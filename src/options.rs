//! Conversion options: the knobs that change how the converter and filter
//! pipeline render a given AST.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// How the converter represents instance variables that survive to TGT.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IvarStyle {
    /// Leave them as `this._name`.
    Property,
    /// Hoist to ES private `#name` fields (eslevel permitting).
    Private,
}

/// Module emission style, mirroring the handful of interchangeable output
/// shapes a target bundler might expect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModuleStyle {
    Esm,
    Cjs,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConvertOptions {
    /// Target ECMAScript level, e.g. `2015`, `2020`, `2022`.
    pub eslevel: u32,
    /// Emit `'use strict'` preambles where the target level requires it.
    pub strict: bool,
    /// `==`/`!=` lower to `===`/`!==` when true (the common case); false
    /// preserves loose comparison for code relying on coercion.
    pub comparison: ComparisonStyle,
    /// Ruby's `||`/`&&` lower to `??`/`&&` when true and the target supports
    /// nullish coalescing; otherwise lower to plain `||`/`&&`.
    pub or: OrStyle,
    /// Ruby truthiness (only `nil`/`false` are falsy) is preserved with
    /// explicit `!= null` checks when true; otherwise JS truthiness is used
    /// as-is (0 and "" become falsy, diverging from Ruby).
    pub truthy: bool,
    /// `nil.to_s` / `#{nil}` render as `""` rather than `"null"`/`"undefined"`.
    pub nullish_to_s: bool,
    pub module: Option<ModuleStyle>,
    pub underscored_private: bool,
    /// Target line width for the serializer's reflow/wrap decisions.
    pub width: u32,
    pub ivars: IvarStyle,
    /// Allow `` `...` `` x-strings to pass host expressions through
    /// verbatim; required because an x-string is an escape hatch into
    /// arbitrary TGT text (the `SecurityXstrBinding` error otherwise).
    pub binding: bool,
    /// Filter names to run, in order, additive to the always-on base pass.
    pub filters: Vec<String>,
    /// When set, only these filters run (instead of the default set plus
    /// `filters`).
    pub include_only: Option<BTreeSet<String>>,
    pub include: BTreeSet<String>,
    pub exclude: BTreeSet<String>,
    pub disable_autoimports: bool,
    pub disable_autoexports: bool,
    /// Original SRC text, kept so diagnostics can quote source lines and
    /// the `def`/method-style predicate can peek at the raw text.
    pub source: Option<String>,
    pub file: Option<String>,
    /// Starting namespace path (e.g. when converting a file known to live
    /// inside an enclosing module not present in its own source).
    pub namespace: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ComparisonStyle {
    Identity,
    Equality,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrStyle {
    Nullish,
    Logical,
}

impl Default for ConvertOptions {
    fn default() -> Self {
        Self {
            eslevel: 2022,
            strict: true,
            comparison: ComparisonStyle::Identity,
            or: OrStyle::Nullish,
            truthy: false,
            nullish_to_s: false,
            module: Some(ModuleStyle::Esm),
            underscored_private: false,
            width: 80,
            ivars: IvarStyle::Property,
            binding: false,
            filters: Vec::new(),
            include_only: None,
            include: BTreeSet::new(),
            exclude: BTreeSet::new(),
            disable_autoimports: false,
            disable_autoexports: false,
            source: None,
            file: None,
            namespace: Vec::new(),
        }
    }
}

impl ConvertOptions {
    pub fn supports_nullish(&self) -> bool {
        self.eslevel >= 2020
    }

    pub fn supports_private_fields(&self) -> bool {
        self.eslevel >= 2022
    }

    pub fn supports_optional_chaining(&self) -> bool {
        self.eslevel >= 2020
    }
}
