//! LALR(1) lookaheads by spontaneous generation and propagation.
//!
//! The LR(0)-shaped kernel collection is built first. For every kernel item
//! `A -> α . β`, the LR(1) closure of `[A -> α . β, $probe]` tells which
//! lookaheads of the items reached by a shift are generated spontaneously
//! and which are inherited from `A -> α . β` itself. Inherited lookaheads are
//! then pushed along the recorded edges until nothing changes.

use crate::{
    collection::{closure, kernel_collection, Collection},
    item::{ItemCore, LALRItem, LR1Item},
    sets::{Analysis, TerminalSet},
    types::Map,
};
use lrkit_runtime::{StateID, Symbol};
use std::mem;

/// A kernel item, addressed by its state and its index within the kernel.
type ItemKey = (StateID, usize);

#[derive(Debug, Default)]
struct Node {
    known: TerminalSet,
    fresh: TerminalSet,
    subscribers: Vec<ItemKey>,
}

/// The propagation graph between kernel items.
#[derive(Debug, Default)]
struct Propagation {
    nodes: Map<ItemKey, Node>,
}

impl Propagation {
    fn register(&mut self, key: ItemKey) {
        self.nodes.entry(key).or_default();
    }

    fn add_new(&mut self, key: ItemKey, lookahead: Symbol) {
        let node = self.nodes.entry(key).or_default();
        if !node.known.contains(&lookahead) {
            node.fresh.insert(lookahead);
        }
    }

    /// Every lookahead that `source` learns is also learned by `target`.
    fn subscribe(&mut self, source: ItemKey, target: ItemKey) {
        let subscribers = &mut self.nodes.entry(source).or_default().subscribers;
        if !subscribers.contains(&target) {
            subscribers.push(target);
        }
    }

    /// Flush fresh lookaheads to the subscribers until a whole pass changes
    /// nothing. Returns the number of passes.
    fn propagate(&mut self) -> usize {
        let mut passes = 0;
        loop {
            passes += 1;
            let mut changed = false;
            for i in 0..self.nodes.len() {
                let (fresh, subscribers) = match self.nodes.get_index_mut(i) {
                    Some((_, node)) if !node.fresh.is_empty() => {
                        let fresh = mem::take(&mut node.fresh);
                        node.known.extend(fresh.iter().cloned());
                        (fresh, node.subscribers.clone())
                    }
                    _ => continue,
                };
                changed = true;
                for target in subscribers {
                    for lookahead in &fresh {
                        self.add_new(target, lookahead.clone());
                    }
                }
            }
            if !changed {
                return passes;
            }
        }
    }

    /// Freeze the lookahead sets.
    fn close(self) -> Map<ItemKey, TerminalSet> {
        self.nodes
            .into_iter()
            .map(|(key, node)| {
                assert!(node.fresh.is_empty(), "unpropagated lookaheads at {:?}", key);
                assert!(
                    !node.known.is_empty(),
                    "kernel item {:?} received no lookahead",
                    key
                );
                (key, node.known)
            })
            .collect()
    }
}

/// Build the LALR(1) collection: the LR(0) kernels with their merged
/// lookaheads.
#[tracing::instrument(skip_all)]
pub fn lalr_collection<V>(cx: &Analysis<'_, V>) -> Collection<LALRItem> {
    let grammar = cx.grammar();
    let seed = LALRItem::new(ItemCore::start(), TerminalSet::new());
    let collection = kernel_collection(seed, cx);

    let mut propagation = Propagation::default();
    for (state, kernel) in collection.kernels() {
        for index in 0..kernel.len() {
            propagation.register((state, index));
        }
    }
    propagation.add_new((StateID::from_raw(0), 0), Symbol::EOF);

    for (state, kernel) in collection.kernels() {
        for (index, item) in kernel.iter().enumerate() {
            let probe = LR1Item::new(item.core.clone(), Symbol::PROBE);
            for lr1 in closure([probe], cx) {
                let symbol = match lr1.core.next_symbol(grammar) {
                    Some(symbol) => symbol,
                    None => continue,
                };
                let target_state = collection
                    .transition(state, symbol)
                    .expect("goto target missing from the collection");
                let shifted = lr1.core.shifted();
                let target_index = collection
                    .kernel(target_state)
                    .and_then(|kernel| kernel.iter().position(|item| item.core == shifted))
                    .expect("shifted item missing from the goto kernel");
                let target = (target_state, target_index);

                if lr1.lookahead == Symbol::PROBE {
                    propagation.subscribe((state, index), target);
                } else {
                    propagation.add_new(target, lr1.lookahead);
                }
            }
        }
    }

    let passes = propagation.propagate();
    tracing::debug!("lookaheads settled after {} propagation passes", passes);

    let lookaheads = propagation.close();
    collection.rewrite(|state, kernel| {
        kernel
            .into_iter()
            .enumerate()
            .map(|(index, item)| {
                let known = lookaheads.get(&(state, index)).cloned().unwrap_or_default();
                LALRItem::new(item.core, known)
            })
            .collect()
    })
}
