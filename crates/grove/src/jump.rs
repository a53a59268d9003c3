//! In-page jumps that open collapsed sections on the way.
//!
//! Trees embed other trees inside `<details>` elements. A link carrying
//! `data-jump-target="<selector>"` must open every collapsed ancestor of its
//! target before scrolling, or the browser scrolls to an invisible element.

/// A collapsible section (`<details>` in the browser).
pub trait Disclosure {
    fn is_open(&self) -> bool;

    fn open(&mut self);
}

/// An element that can be scrolled to.
pub trait JumpTarget {
    type Ancestor: Disclosure;

    /// Collapsible sections containing this element, innermost first.
    fn collapsible_ancestors(&self) -> Vec<Self::Ancestor>;

    fn scroll_into_view(&self);
}

/// Finds jump targets by selector.
pub trait TargetLookup {
    type Target: JumpTarget;

    fn find(&self, selector: &str) -> Option<Self::Target>;
}

/// Open every closed ancestor of `target`, then scroll to it.
///
/// Returns how many sections were opened.
pub fn reveal<T: JumpTarget>(target: &T) -> usize {
    let mut opened = 0;
    for mut ancestor in target.collapsible_ancestors() {
        if !ancestor.is_open() {
            ancestor.open();
            opened += 1;
        }
    }
    target.scroll_into_view();
    opened
}

/// Jump to the element matching `selector`; `false` if there is none.
pub fn jump_to<L: TargetLookup>(lookup: &L, selector: &str) -> bool {
    match lookup.find(selector) {
        Some(target) => {
            let opened = reveal(&target);
            tracing::debug!(selector, opened, "jumped to target");
            true
        }
        None => {
            tracing::debug!(selector, "jump target not found");
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::{Cell, RefCell};
    use std::collections::HashMap;
    use std::rc::Rc;

    #[derive(Clone)]
    struct Details(Rc<Cell<bool>>);

    impl Disclosure for Details {
        fn is_open(&self) -> bool {
            self.0.get()
        }
        fn open(&mut self) {
            self.0.set(true);
        }
    }

    #[derive(Clone)]
    struct Target {
        ancestors: Vec<Details>,
        log: Rc<RefCell<Vec<String>>>,
    }

    impl JumpTarget for Target {
        type Ancestor = Details;

        fn collapsible_ancestors(&self) -> Vec<Details> {
            self.ancestors.clone()
        }

        fn scroll_into_view(&self) {
            let open = self.ancestors.iter().all(|d| d.is_open());
            self.log.borrow_mut().push(format!("scroll (all open: {open})"));
        }
    }

    struct Page(HashMap<&'static str, Target>);

    impl TargetLookup for Page {
        type Target = Target;

        fn find(&self, selector: &str) -> Option<Target> {
            self.0.get(selector).cloned()
        }
    }

    fn details(open: bool) -> Details {
        Details(Rc::new(Cell::new(open)))
    }

    #[test]
    fn test_opens_closed_ancestors_before_scrolling() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let target = Target {
            ancestors: vec![details(false), details(true), details(false)],
            log: log.clone(),
        };

        assert_eq!(reveal(&target), 2);
        assert!(target.ancestors.iter().all(|d| d.is_open()));
        assert_eq!(*log.borrow(), vec!["scroll (all open: true)".to_string()]);
    }

    #[test]
    fn test_jump_to_missing_selector() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let page = Page(HashMap::from([(
            "#tree-0a1b",
            Target {
                ancestors: vec![],
                log: log.clone(),
            },
        )]));

        assert!(jump_to(&page, "#tree-0a1b"));
        assert!(!jump_to(&page, "#missing"));
        assert_eq!(log.borrow().len(), 1);
    }
}
