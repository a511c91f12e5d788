use lrkit::{
    collection::{canonical_collection, closure, goto, kernel_collection, ItemSet},
    item::{ItemCore, LR0Item, LR1Item},
    lalr::lalr_collection,
    sets::Analysis,
    Grammar, Symbol,
};
use lrkit_tests::grammars;
use std::collections::BTreeSet;

fn lr0(nonterminal: &str, alternative: usize, position: usize) -> LR0Item {
    LR0Item(ItemCore::new(nonterminal.to_owned(), alternative, position))
}

fn start(position: usize) -> LR0Item {
    LR0Item(ItemCore::new(Symbol::START, 0, position))
}

#[test]
fn closure_of_the_start_item() -> anyhow::Result<()> {
    let g = Grammar::<()>::define(grammars::arithmetic)?;
    let cx = Analysis::new(&g);
    let state = closure([start(0)], &cx);
    let expected = ItemSet::from([
        start(0),
        lr0("E", 0, 0),
        lr0("E", 1, 0),
        lr0("T", 0, 0),
        lr0("T", 1, 0),
        lr0("F", 0, 0),
        lr0("F", 1, 0),
    ]);
    assert_eq!(state, expected);
    Ok(())
}

#[test]
fn goto_from_the_start_state() -> anyhow::Result<()> {
    let g = Grammar::<()>::define(grammars::arithmetic)?;
    let cx = Analysis::new(&g);
    let state = closure([start(0)], &cx);

    let on_e = goto(&state, &"E".into(), &cx, false);
    assert_eq!(on_e, ItemSet::from([start(1), lr0("E", 0, 1)]));

    let on_t = goto(&state, &"T".into(), &cx, false);
    assert_eq!(on_t, ItemSet::from([lr0("E", 1, 1), lr0("T", 0, 1)]));

    let on_id = goto(&state, &"id".into(), &cx, true);
    assert_eq!(on_id, ItemSet::from([lr0("F", 1, 1)]));

    assert!(goto(&state, &"+".into(), &cx, false).is_empty());
    Ok(())
}

#[test]
fn arithmetic_has_twelve_lr0_states() -> anyhow::Result<()> {
    let g = Grammar::<()>::define(grammars::arithmetic)?;
    let cx = Analysis::new(&g);
    assert_eq!(kernel_collection(start(0), &cx).len(), 12);
    assert_eq!(canonical_collection(start(0), &cx).len(), 12);
    Ok(())
}

#[test]
fn cc_has_ten_lr1_states() -> anyhow::Result<()> {
    let g = Grammar::<()>::define(grammars::cc)?;
    let cx = Analysis::new(&g);
    let seed = LR1Item::new(ItemCore::start(), Symbol::EOF);
    let states = canonical_collection(seed, &cx);
    assert_eq!(states.len(), 10);

    // I4 = [C -> d ., c/d] and I7 = [C -> d ., $eof] are distinct states.
    let reduces_d: Vec<_> = states
        .iter()
        .filter(|state| state.iter().all(|item| item.core == ItemCore::new("C", 1, 1)))
        .collect();
    assert_eq!(reduces_d.len(), 2);
    Ok(())
}

fn assert_same_shape(g: &Grammar<()>) {
    let cx = Analysis::new(g);
    let lalr = lalr_collection(&cx);
    let lr0 = kernel_collection(start(0), &cx);
    assert_eq!(lalr.len(), lr0.len());

    let lalr: BTreeSet<BTreeSet<ItemCore>> = lalr
        .kernels()
        .map(|(_, kernel)| kernel.iter().map(|item| item.core.clone()).collect())
        .collect();
    let lr0: BTreeSet<BTreeSet<ItemCore>> = lr0
        .kernels()
        .map(|(_, kernel)| kernel.iter().map(|item| item.0.clone()).collect())
        .collect();
    assert_eq!(lalr, lr0);
}

#[test]
fn lalr_shares_lr0_shape() -> anyhow::Result<()> {
    let cc = Grammar::<()>::define(grammars::cc)?;
    assert_eq!(lalr_collection(&Analysis::new(&cc)).len(), 7);
    assert_same_shape(&cc);
    assert_same_shape(&Grammar::define(grammars::assignment)?);
    assert_same_shape(&Grammar::define(grammars::arithmetic)?);
    Ok(())
}

#[test]
fn lalr_lookaheads_of_assignment() -> anyhow::Result<()> {
    let g = Grammar::<()>::define(grammars::assignment)?;
    let cx = Analysis::new(&g);
    let lalr = lalr_collection(&cx);

    // [R -> L ., $eof] next to [S -> L . = R]: `=` is not a lookahead here.
    let (_, kernel) = lalr
        .kernels()
        .find(|(_, kernel)| kernel.iter().any(|item| item.core == ItemCore::new("S", 0, 1)))
        .expect("state after L");
    let reduce = kernel
        .iter()
        .find(|item| item.core == ItemCore::new("R", 0, 1))
        .expect("R -> L .");
    assert_eq!(reduce.lookaheads, BTreeSet::from([Symbol::EOF]));

    // [L -> id .] is reached both at the top level and after `*` or `=`.
    let (_, kernel) = lalr
        .kernels()
        .find(|(_, kernel)| kernel.iter().any(|item| item.core == ItemCore::new("L", 1, 1)))
        .expect("state after id");
    let lookaheads = &kernel.iter().next().expect("L -> id .").lookaheads;
    assert_eq!(*lookaheads, BTreeSet::from([Symbol::from("="), Symbol::EOF]));
    Ok(())
}

#[test]
fn mid_actions_get_their_own_states() -> anyhow::Result<()> {
    let g = Grammar::<()>::define(grammars::let_block)?;
    let cx = Analysis::new(&g);
    let states: BTreeSet<_> = canonical_collection(start(0), &cx).into_iter().collect();

    let expected: BTreeSet<_> = [
        ItemSet::from([start(0), lr0("S", 0, 0), lr0("E", 0, 0), lr0("E", 1, 0)]),
        ItemSet::from([start(1)]),
        ItemSet::from([lr0("E", 0, 1)]),
        ItemSet::from([lr0("S", 0, 1)]),
        ItemSet::from([lr0("E", 1, 1), lr0("@1:push", 0, 0)]),
        ItemSet::from([lr0("E", 1, 2)]),
        ItemSet::from([lr0("E", 1, 3), lr0("E", 0, 0), lr0("E", 1, 0)]),
        ItemSet::from([lr0("E", 1, 4)]),
        ItemSet::from([lr0("E", 1, 5), lr0("@2:pop", 0, 0)]),
        ItemSet::from([lr0("E", 1, 6)]),
    ]
    .into_iter()
    .collect();
    assert_eq!(states, expected);

    let collection = kernel_collection(start(0), &cx);
    let after_let = collection
        .find(&ItemSet::from([lr0("E", 1, 1)]))
        .expect("state after let");
    assert!(collection.transition(after_let, &"@1:push".into()).is_some());
    Ok(())
}
