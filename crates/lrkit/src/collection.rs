//! Closure, goto and the collections of item sets.

use crate::{
    item::LRItem,
    sets::Analysis,
    types::{Map, Set},
    util::display_fn,
};
use lrkit_runtime::{StateID, Symbol};
use std::{collections::BTreeSet, fmt};

/// A set of items. Used both for kernels and for closed states.
pub type ItemSet<I> = BTreeSet<I>;

/// Compute the closure of `items`.
///
/// Items that compare equal are merged with [`LRItem::merge`]; an item whose
/// lookaheads grew is expanded again so that the items it produced see the
/// new lookaheads as well.
pub fn closure<I, V>(items: impl IntoIterator<Item = I>, cx: &Analysis<'_, V>) -> ItemSet<I>
where
    I: LRItem,
{
    let mut closed: ItemSet<I> = ItemSet::new();
    let mut pending: Vec<I> = items.into_iter().collect();
    while let Some(item) = pending.pop() {
        match closed.take(&item) {
            Some(mut known) => {
                if known.merge(&item) {
                    pending.extend(known.next_items(cx));
                }
                closed.insert(known);
            }
            None => {
                pending.extend(item.next_items(cx));
                closed.insert(item);
            }
        }
    }
    closed
}

/// Compute `goto(items, symbol)`.
///
/// With `kernel_only` the shifted items are returned as they are; otherwise
/// their closure is returned.
pub fn goto<I, V>(
    items: &ItemSet<I>,
    symbol: &Symbol,
    cx: &Analysis<'_, V>,
    kernel_only: bool,
) -> ItemSet<I>
where
    I: LRItem,
{
    let grammar = cx.grammar();
    let mut kernel = ItemSet::new();
    for item in items {
        if item.core().next_symbol(grammar) == Some(symbol) {
            insert_merged(&mut kernel, item.shift());
        }
    }
    if kernel_only || kernel.is_empty() {
        kernel
    } else {
        closure(kernel, cx)
    }
}

fn insert_merged<I: LRItem>(set: &mut ItemSet<I>, item: I) {
    match set.take(&item) {
        Some(mut known) => {
            known.merge(&item);
            set.insert(known);
        }
        None => {
            set.insert(item);
        }
    }
}

/// The states of an LR automaton, identified by their kernels, together with
/// the transitions between them.
#[derive(Debug, Clone)]
pub struct Collection<I> {
    kernels: Set<ItemSet<I>>,
    transitions: Map<(StateID, Symbol), StateID>,
}

impl<I> Collection<I>
where
    I: LRItem,
{
    /// Number of states.
    pub fn len(&self) -> usize {
        self.kernels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.kernels.is_empty()
    }

    /// Iterate over the kernels in the order they were discovered. The start
    /// state comes first.
    pub fn kernels(&self) -> impl Iterator<Item = (StateID, &ItemSet<I>)> + '_ {
        self.kernels
            .iter()
            .enumerate()
            .map(|(i, kernel)| (StateID::from_raw(i as u32), kernel))
    }

    pub fn kernel(&self, id: StateID) -> Option<&ItemSet<I>> {
        self.kernels.get_index(id.into_raw() as usize)
    }

    /// Return the state whose kernel is `kernel`.
    pub fn find(&self, kernel: &ItemSet<I>) -> Option<StateID> {
        self.kernels
            .get_index_of(kernel)
            .map(|i| StateID::from_raw(i as u32))
    }

    pub fn transition(&self, from: StateID, symbol: &Symbol) -> Option<StateID> {
        self.transitions.get(&(from, symbol.clone())).copied()
    }

    pub fn transitions(&self) -> impl Iterator<Item = (StateID, &Symbol, StateID)> + '_ {
        self.transitions
            .iter()
            .map(|((from, symbol), to)| (*from, symbol, *to))
    }

    /// Replace every kernel with `f(id, kernel)`, which must yield a kernel
    /// equal to the original.
    pub(crate) fn rewrite<F>(self, mut f: F) -> Self
    where
        F: FnMut(StateID, ItemSet<I>) -> ItemSet<I>,
    {
        let kernels = self
            .kernels
            .into_iter()
            .enumerate()
            .map(|(i, kernel)| f(StateID::from_raw(i as u32), kernel))
            .collect::<Set<_>>();
        Self {
            kernels,
            transitions: self.transitions,
        }
    }

    pub fn display<'a, V>(
        &'a self,
        grammar: &'a crate::grammar::Grammar<V>,
    ) -> impl fmt::Display + 'a {
        display_fn(move |f| {
            for (id, kernel) in self.kernels() {
                writeln!(f, "#### State {:?}", id)?;
                for item in kernel {
                    writeln!(f, "- {}", item.display(grammar))?;
                }
                for (from, symbol, to) in self.transitions() {
                    if from == id {
                        writeln!(f, "  {} => {:?}", symbol, to)?;
                    }
                }
            }
            Ok(())
        })
    }
}

/// Discover every kernel reachable from `{seed}`.
///
/// States are numbered in breadth-first order, so the start state is
/// `StateID::from_raw(0)`.
#[tracing::instrument(skip_all)]
pub fn kernel_collection<I, V>(seed: I, cx: &Analysis<'_, V>) -> Collection<I>
where
    I: LRItem,
{
    let grammar = cx.grammar();
    let mut kernels: Set<ItemSet<I>> = Set::default();
    let mut transitions = Map::default();
    kernels.insert(Some(seed).into_iter().collect());

    let mut next = 0;
    while let Some(kernel) = kernels.get_index(next) {
        let from = StateID::from_raw(next as u32);
        let closed = closure(kernel.iter().cloned(), cx);
        for symbol in grammar.all_symbols() {
            let target = goto(&closed, symbol, cx, true);
            if target.is_empty() {
                continue;
            }
            let (index, _) = kernels.insert_full(target);
            transitions.insert((from, symbol.clone()), StateID::from_raw(index as u32));
        }
        next += 1;
    }

    tracing::debug!("discovered {} states", kernels.len());
    Collection {
        kernels,
        transitions,
    }
}

/// Like [`kernel_collection`], but return the closure of every state.
pub fn canonical_collection<I, V>(seed: I, cx: &Analysis<'_, V>) -> Vec<ItemSet<I>>
where
    I: LRItem,
{
    kernel_collection(seed, cx)
        .kernels()
        .map(|(_, kernel)| closure(kernel.iter().cloned(), cx))
        .collect()
}
