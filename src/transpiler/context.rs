//! Per-render state: subquery depth and the parameter namespace.

use crate::ast::Param;
use crate::config::{PlaceholderStyle, RenderOptions};
use crate::error::{RenderError, RenderResult};
use crate::transpiler::{Dialect, SqlGenerator};
use std::collections::HashMap;

/// Ordered, de-duplicated parameter names shared by every nested context of
/// one render.
#[derive(Debug, Default)]
pub struct ParamSet {
    names: Vec<String>,
    index: HashMap<String, usize>,
}

impl ParamSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `name` on first sight; return its 1-based position either way.
    pub fn insert(&mut self, name: String) -> usize {
        if let Some(&position) = self.index.get(&name) {
            return position;
        }
        self.names.push(name.clone());
        let position = self.names.len();
        self.index.insert(name, position);
        position
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn into_names(self) -> Vec<String> {
        self.names
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

/// Render context for one query level.
///
/// Depth 0 is the outermost query and uses unprefixed names; a context at
/// depth `n > 0` prefixes every parameter with `sq{n}_`.
pub struct RenderContext<'a> {
    generator: &'a dyn SqlGenerator,
    params: &'a mut ParamSet,
    depth: usize,
    max_depth: usize,
    prefix: String,
    style: PlaceholderStyle,
}

impl<'a> RenderContext<'a> {
    pub fn new(
        generator: &'a dyn SqlGenerator,
        params: &'a mut ParamSet,
        options: &RenderOptions,
    ) -> Self {
        Self {
            generator,
            params,
            depth: 0,
            max_depth: options.max_subquery_depth,
            prefix: String::new(),
            style: options.placeholders,
        }
    }

    pub fn generator(&self) -> &'a dyn SqlGenerator {
        self.generator
    }

    pub fn dialect(&self) -> Dialect {
        self.generator.dialect()
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn quote(&self, name: &str) -> String {
        self.generator.quote_identifier(name)
    }

    /// Register a parameter reference and return its placeholder text.
    pub fn add_param(&mut self, param: &Param) -> RenderResult<String> {
        let name = format!("{}{}", self.prefix, param.name());
        let position = self.params.insert(name.clone());
        match self.style {
            PlaceholderStyle::Named => Ok(self.generator.named_placeholder(&name)),
            PlaceholderStyle::Numbered => self.generator.numbered_placeholder(position),
        }
    }

    /// Child context one level deeper, sharing the parameter set.
    pub fn enter_subquery(&mut self) -> RenderResult<RenderContext<'_>> {
        let depth = self.depth + 1;
        if depth > self.max_depth {
            return Err(RenderError::DepthExceeded {
                depth,
                max: self.max_depth,
            });
        }
        tracing::trace!(depth, "entering subquery");
        Ok(RenderContext {
            generator: self.generator,
            params: &mut *self.params,
            depth,
            max_depth: self.max_depth,
            prefix: format!("sq{}_", depth),
            style: self.style,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn param(name: &str) -> Param {
        Param::must(name)
    }

    #[test]
    fn test_prefix_by_depth() {
        let generator = Dialect::Postgres.generator();
        let mut params = ParamSet::new();
        let options = RenderOptions::default();
        let mut ctx = RenderContext::new(generator.as_ref(), &mut params, &options);

        assert_eq!(ctx.add_param(&param("x")).unwrap(), ":x");
        {
            let mut child = ctx.enter_subquery().unwrap();
            assert_eq!(child.prefix(), "sq1_");
            assert_eq!(child.add_param(&param("x")).unwrap(), ":sq1_x");
            let mut grandchild = child.enter_subquery().unwrap();
            assert_eq!(grandchild.add_param(&param("x")).unwrap(), ":sq2_x");
        }
        assert_eq!(ctx.depth(), 0);
        assert_eq!(params.names(), &["x", "sq1_x", "sq2_x"]);
    }

    #[test]
    fn test_depth_ceiling() {
        let generator = Dialect::Postgres.generator();
        let mut params = ParamSet::new();
        let options = RenderOptions::default().max_subquery_depth(1);
        let mut ctx = RenderContext::new(generator.as_ref(), &mut params, &options);
        let mut child = ctx.enter_subquery().unwrap();
        assert_eq!(
            child.enter_subquery().err(),
            Some(RenderError::DepthExceeded { depth: 2, max: 1 })
        );
    }

    #[test]
    fn test_repeated_param_recorded_once() {
        let mut set = ParamSet::new();
        assert_eq!(set.insert("a".into()), 1);
        assert_eq!(set.insert("b".into()), 2);
        assert_eq!(set.insert("a".into()), 1);
        assert_eq!(set.into_names(), vec!["a", "b"]);
    }

    #[test]
    fn test_numbered_placeholders_follow_first_occurrence() {
        let generator = Dialect::Postgres.generator();
        let mut params = ParamSet::new();
        let options = RenderOptions::default().placeholders(PlaceholderStyle::Numbered);
        let mut ctx = RenderContext::new(generator.as_ref(), &mut params, &options);
        assert_eq!(ctx.add_param(&param("a")).unwrap(), "$1");
        assert_eq!(ctx.add_param(&param("b")).unwrap(), "$2");
        assert_eq!(ctx.add_param(&param("a")).unwrap(), "$1");
    }
}
