use crate::catalog::{Update, UpdateTag, CATALOG};
use crate::shape::{FieldFault, FieldRule};
use serde_json::{Map as JsonMap, Value as JsonValue};
use std::collections::HashMap;
use std::fmt;
use std::sync::OnceLock;

type BuildFn = fn(&JsonMap<String, JsonValue>) -> Result<Update, FieldFault>;

/// How to validate and build one update kind.
pub struct DecodeRule {
    tag: UpdateTag,
    fields: &'static [FieldRule],
    build: BuildFn,
}

impl DecodeRule {
    pub(crate) const fn new(tag: UpdateTag, fields: &'static [FieldRule], build: BuildFn) -> Self {
        Self { tag, fields, build }
    }

    pub fn tag(&self) -> UpdateTag {
        self.tag
    }

    /// Field rules in declaration order; the narrower checks them in this order.
    pub fn fields(&self) -> &'static [FieldRule] {
        self.fields
    }

    pub fn required_fields(&self) -> impl Iterator<Item = &'static FieldRule> {
        self.fields.iter().filter(|rule| !rule.optional)
    }

    pub fn documentation_url(&self) -> String {
        self.tag.documentation_url()
    }

    pub(crate) fn build(&self, fields: &JsonMap<String, JsonValue>) -> Result<Update, FieldFault> {
        (self.build)(fields)
    }
}

impl fmt::Debug for DecodeRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DecodeRule").field("tag", &self.tag).field("fields", &self.fields).finish()
    }
}

/// Immutable tag → rule table, built once from the static catalog.
///
/// There is no mutation API: lookups take `&self` and need no locking, so any
/// number of narrowers can share one registry across threads.
#[derive(Debug)]
pub struct Registry {
    rules: HashMap<&'static str, &'static DecodeRule>,
}

impl Registry {
    pub fn new() -> Self {
        let rules = CATALOG.iter().map(|rule| (rule.tag.as_str(), rule)).collect();
        Self { rules }
    }

    /// Process-wide registry, built on first use.
    pub fn global() -> &'static Registry {
        static GLOBAL: OnceLock<Registry> = OnceLock::new();
        GLOBAL.get_or_init(Registry::new)
    }

    /// `None` is the normal answer for tags newer than this catalog.
    pub fn lookup(&self, tag: &str) -> Option<&'static DecodeRule> {
        self.rules.get(tag).copied()
    }

    pub fn rule(&self, tag: UpdateTag) -> &'static DecodeRule {
        &CATALOG[tag as usize]
    }

    pub fn contains(&self, tag: &str) -> bool {
        self.rules.contains_key(tag)
    }

    /// Known tags in catalog order.
    pub fn tags(&self) -> impl Iterator<Item = UpdateTag> {
        UpdateTag::ALL.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}
