//! Execution context and the attribute chain it carries
//!
//! This module provides:
//! - `Context`: an immutable value map passed explicitly to every log call
//! - `AttrChain`: the append-only stack of attribute batches stored in it
//! - `extend_attrs`: grafting one context's attribute lineage onto another
//!
//! Contexts are never mutated. Every `with_*` call links a new node in front
//! of the existing ones, so clones handed to other threads keep seeing
//! exactly what they saw when they were taken.

use super::value::Attr;
use std::any::{Any, TypeId};
use std::fmt;
use std::sync::Arc;

struct ContextNode {
    key: TypeId,
    value: Arc<dyn Any + Send + Sync>,
    parent: Option<Arc<ContextNode>>,
}

/// Request-scoped context
///
/// Cloning is cheap: it only bumps a reference count.
///
/// # Example
///
/// ```
/// use context_logger::{Attr, Context};
///
/// let ctx = Context::background().with_attrs(vec![Attr::new("req_id", "abc")]);
/// let chain = ctx.attr_chain().expect("chain attached");
/// assert_eq!(chain.attrs()[0].key, "req_id");
/// ```
#[derive(Clone, Default)]
pub struct Context {
    node: Option<Arc<ContextNode>>,
}

impl Context {
    /// An empty context
    pub fn background() -> Self {
        Self::default()
    }

    /// Return a new context with `value` stored in the slot for `T`
    ///
    /// A later value of the same type shadows an earlier one.
    #[must_use]
    pub fn with_value<T: Any + Send + Sync>(&self, value: T) -> Context {
        self.with_shared(Arc::new(value))
    }

    fn with_shared<T: Any + Send + Sync>(&self, value: Arc<T>) -> Context {
        Context {
            node: Some(Arc::new(ContextNode {
                key: TypeId::of::<T>(),
                value,
                parent: self.node.clone(),
            })),
        }
    }

    /// Look up the most recent value stored for `T`
    pub fn value<T: Any + Send + Sync>(&self) -> Option<&T> {
        self.shared::<T>().and_then(|v| v.downcast_ref::<T>())
    }

    fn shared<T: Any>(&self) -> Option<&Arc<dyn Any + Send + Sync>> {
        let key = TypeId::of::<T>();
        let mut node = self.node.as_deref();
        while let Some(n) = node {
            if n.key == key {
                return Some(&n.value);
            }
            node = n.parent.as_deref();
        }
        None
    }

    /// The innermost attribute chain node, if any attributes were attached
    pub fn attr_chain(&self) -> Option<Arc<AttrChain>> {
        self.shared::<AttrChain>()
            .and_then(|v| Arc::clone(v).downcast::<AttrChain>().ok())
    }

    /// Attach attributes on top of this context's own chain
    #[must_use]
    pub fn with_attrs(&self, attrs: Vec<Attr>) -> Context {
        extend_attrs(self, self, attrs)
    }

    /// Iterate attribute batches from innermost to outermost
    pub fn attr_batches(&self) -> AttrBatches {
        AttrBatches {
            next: self.attr_chain(),
        }
    }
}

impl fmt::Debug for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut values = 0;
        let mut node = self.node.as_deref();
        while let Some(n) = node {
            values += 1;
            node = n.parent.as_deref();
        }
        f.debug_struct("Context")
            .field("values", &values)
            .field("attr_chain", &self.attr_chain())
            .finish()
    }
}

/// One batch of context attributes plus a link to the enclosing batch
#[derive(Debug)]
pub struct AttrChain {
    attrs: Vec<Attr>,
    parent: Option<Arc<AttrChain>>,
}

impl AttrChain {
    pub fn attrs(&self) -> &[Attr] {
        &self.attrs
    }

    pub fn parent(&self) -> Option<&Arc<AttrChain>> {
        self.parent.as_ref()
    }

    /// Number of batches from this node to the root
    pub fn depth(&self) -> usize {
        let mut depth = 1;
        let mut node = self.parent.as_deref();
        while let Some(n) = node {
            depth += 1;
            node = n.parent.as_deref();
        }
        depth
    }
}

/// Iterator over attribute batches, innermost first
pub struct AttrBatches {
    next: Option<Arc<AttrChain>>,
}

impl Iterator for AttrBatches {
    type Item = Arc<AttrChain>;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next.take()?;
        self.next = current.parent.clone();
        Some(current)
    }
}

/// Attach `attrs` to `dest`, parented on the attribute chain read from `src`
///
/// `dest` and `src` are usually the same context. Passing a different `src`
/// grafts its attribute lineage onto `dest` while keeping every other value
/// stored in `dest`. Neither input is modified.
#[must_use]
pub fn extend_attrs(dest: &Context, src: &Context, attrs: Vec<Attr>) -> Context {
    let chain = AttrChain {
        attrs,
        parent: src.attr_chain(),
    };
    dest.with_shared(Arc::new(chain))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq)]
    struct RequestDeadline(u64);

    fn keys(ctx: &Context) -> Vec<String> {
        ctx.attr_batches()
            .flat_map(|batch| {
                batch
                    .attrs()
                    .iter()
                    .map(|a| a.key.clone())
                    .collect::<Vec<_>>()
            })
            .collect()
    }

    #[test]
    fn test_background_is_empty() {
        let ctx = Context::background();
        assert!(ctx.attr_chain().is_none());
        assert_eq!(ctx.attr_batches().count(), 0);
    }

    #[test]
    fn test_batches_innermost_first() {
        let ctx = Context::background()
            .with_attrs(vec![Attr::new("outer", 1)])
            .with_attrs(vec![Attr::new("inner", 2)]);

        assert_eq!(keys(&ctx), vec!["inner", "outer"]);
        assert_eq!(ctx.attr_chain().unwrap().depth(), 2);
    }

    #[test]
    fn test_extension_is_non_destructive() {
        let x = Context::background().with_attrs(vec![Attr::new("a", 1)]);
        let y = x.with_attrs(vec![Attr::new("b", 2)]);

        assert_eq!(keys(&x), vec!["a"]);
        assert_eq!(keys(&y), vec!["b", "a"]);
    }

    #[test]
    fn test_extend_grafts_source_lineage() {
        let dest = Context::background()
            .with_value(RequestDeadline(30))
            .with_attrs(vec![Attr::new("dest_attr", 1)]);
        let src = Context::background().with_attrs(vec![Attr::new("src_attr", 2)]);

        let grafted = extend_attrs(&dest, &src, vec![Attr::new("new_attr", 3)]);

        assert_eq!(keys(&grafted), vec!["new_attr", "src_attr"]);
        assert_eq!(grafted.value::<RequestDeadline>(), Some(&RequestDeadline(30)));
        assert_eq!(keys(&dest), vec!["dest_attr"]);
    }

    #[test]
    fn test_value_shadowing() {
        let ctx = Context::background()
            .with_value(RequestDeadline(1))
            .with_value(RequestDeadline(2));

        assert_eq!(ctx.value::<RequestDeadline>(), Some(&RequestDeadline(2)));
        assert_eq!(ctx.value::<String>(), None);
    }
}
