use crate::error::InternalError;

/// The tag of the outermost scope, which is open for the whole lifetime of a stack
pub const GLOBAL: &'static str = "Global";

#[derive(Debug, Clone)]
struct Scope<T> {
    tag: &'static str,
    items: Vec<T>,
}

/// A stack of tagged scopes. Items are visible until the scope they were added to is exited,
/// and scopes must be exited in the reverse order they were entered
#[derive(Debug, Clone)]
pub struct ScopeStack<T> {
    scopes: Vec<Scope<T>>,
}

/// A position in the visible items of a `ScopeStack`.
/// Items added (and scopes entered) after the cursor was taken are also visited,
/// as long as they are still there when the cursor reaches them
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub struct Cursor {
    scope: usize,
    index: usize,
}

impl<T: Clone> ScopeStack<T> {
    pub fn new() -> ScopeStack<T> {
        ScopeStack {
            scopes: vec![Scope { tag: GLOBAL, items: vec![] }],
        }
    }
    pub fn enter(&mut self, tag: &'static str) {
        trace!("entering scope {} at depth {}", tag, self.scopes.len());
        self.scopes.push(Scope { tag, items: vec![] });
    }
    /// Closes the innermost scope, discarding everything added to it
    pub fn exit(&mut self, tag: &'static str) -> Result<(), InternalError> {
        match self.scopes.last() {
            Some(scope) if scope.tag == tag && self.scopes.len() > 1 => {
                trace!("exiting scope {} with {} items", tag, scope.items.len());
                self.scopes.pop();
                Ok(())
            }
            Some(scope) => internal_error!("tried to exit scope `{}`, but the innermost scope is `{}`", tag, scope.tag),
            None => internal_error!("tried to exit scope `{}`, but no scope is open", tag),
        }
    }
    /// Adds to the innermost scope
    pub fn add(&mut self, item: T) {
        if let Some(scope) = self.scopes.last_mut() {
            scope.items.push(item);
        }
    }
    /// Every visible item, outermost scope first
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.scopes.iter().flat_map(|scope| scope.items.iter())
    }
    pub fn contains<Q: ?Sized>(&self, item: &Q) -> bool where T: PartialEq<Q> {
        self.iter().any(|visible| visible == item)
    }
    pub fn len(&self) -> usize {
        self.scopes.iter().map(|scope| scope.items.len()).sum()
    }
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
    /// How many scopes are open, counting the global one
    pub fn depth(&self) -> usize {
        self.scopes.len()
    }
    pub fn cursor(&self) -> Cursor {
        Cursor::default()
    }
    /// Yields the item under the cursor and moves past it.
    /// The stack may be changed between calls, so the item is handed out by value
    pub fn advance(&self, cursor: &mut Cursor) -> Option<T> {
        while let Some(scope) = self.scopes.get(cursor.scope) {
            if let Some(item) = scope.items.get(cursor.index) {
                cursor.index += 1;
                return Some(item.clone());
            }
            cursor.scope += 1;
            cursor.index = 0;
        }
        None
    }
}

impl<T: Clone> Default for ScopeStack<T> {
    fn default() -> Self {
        ScopeStack::new()
    }
}

#[cfg(test)]
mod tests {
    use super::ScopeStack;

    #[test]
    fn scope_visibility_0() {
        let mut stack = ScopeStack::new();
        stack.add("a");
        stack.enter("Theorem");
        stack.add("b");
        assert_eq!(stack.iter().cloned().collect::<Vec<_>>(), vec!["a", "b"]);
        stack.exit("Theorem").expect("tags match");
        assert_eq!(stack.iter().cloned().collect::<Vec<_>>(), vec!["a"]);
        assert!(!stack.contains(&"b"));
    }
    #[test]
    fn scope_mismatch_0() {
        let mut stack: ScopeStack<u32> = ScopeStack::new();
        stack.enter("If");
        stack.enter("Statement");
        let err = stack.exit("If").expect_err("innermost scope is `Statement`");
        assert!(err.message.contains("Statement"));
        assert_eq!(stack.depth(), 3);
    }
    #[test]
    fn scope_mismatch_1() {
        let mut stack: ScopeStack<u32> = ScopeStack::new();
        let _ = stack.exit("Global").expect_err("the global scope can not be exited");
    }
    #[test]
    fn scope_cursor_0() {
        let mut stack = ScopeStack::new();
        stack.add(1);
        stack.enter("Statement");
        stack.add(2);
        let mut cursor = stack.cursor();
        assert_eq!(stack.advance(&mut cursor), Some(1));
        // anything added and reverted between steps does not disturb the walk
        stack.enter("Implies");
        stack.add(10);
        stack.exit("Implies").expect("tags match");
        assert_eq!(stack.advance(&mut cursor), Some(2));
        stack.add(3);
        assert_eq!(stack.advance(&mut cursor), Some(3));
        assert_eq!(stack.advance(&mut cursor), None);
    }
}
