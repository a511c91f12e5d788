use lrkit::{
    sets::{first, follow, TerminalSet},
    Grammar, GrammarError, Symbol,
};
use lrkit_tests::grammars;

fn set(symbols: &[&'static str]) -> TerminalSet {
    symbols.iter().map(|s| Symbol::from(*s)).collect()
}

fn seq(symbols: &[&'static str]) -> Vec<Symbol> {
    symbols.iter().map(|s| Symbol::from(*s)).collect()
}

#[test]
fn first_of_nullable_recursion() -> anyhow::Result<()> {
    // A -> a A A | ε
    let g = Grammar::<()>::define(|g| {
        g.add_terminal("a")?;
        g.augment("A")?;
        g.add_rule("A", ["a", "A", "A"])?;
        g.add_empty_rule("A")
    })?;
    assert_eq!(first(&g, &seq(&["A"])), set(&["a", "$empty"]));
    assert_eq!(first(&g, &seq(&["A", "A"])), set(&["a", "$empty"]));
    Ok(())
}

#[test]
fn first_of_left_recursion() -> anyhow::Result<()> {
    let g = Grammar::<()>::define(grammars::arithmetic)?;
    for nonterminal in ["E", "T", "F"] {
        assert_eq!(first(&g, &seq(&[nonterminal])), set(&["(", "id"]));
    }
    assert_eq!(first(&g, &seq(&["+", "T"])), set(&["+"]));
    assert_eq!(first(&g, &[]), set(&["$empty"]));
    Ok(())
}

#[test]
fn follow_of_arithmetic() -> anyhow::Result<()> {
    let g = Grammar::<()>::define(grammars::arithmetic)?;
    assert_eq!(follow(&g, &"E".into()), set(&["+", ")", "$eof"]));
    assert_eq!(follow(&g, &"T".into()), set(&["+", "*", ")", "$eof"]));
    assert_eq!(follow(&g, &"F".into()), set(&["+", "*", ")", "$eof"]));
    Ok(())
}

#[test]
fn follow_of_assignment() -> anyhow::Result<()> {
    let g = Grammar::<()>::define(grammars::assignment)?;
    assert_eq!(follow(&g, &"S".into()), set(&["$eof"]));
    assert_eq!(follow(&g, &"L".into()), set(&["=", "$eof"]));
    assert_eq!(follow(&g, &"R".into()), set(&["=", "$eof"]));
    Ok(())
}

#[test]
fn follow_counts_repeated_occurrences() -> anyhow::Result<()> {
    let g = Grammar::<()>::define(grammars::postfix)?;
    assert_eq!(follow(&g, &"expr".into()), set(&["NUM", "+", "-", "$eof"]));
    Ok(())
}

fn special<F>(start: &'static str, terminals: &[&'static str], f: F) -> Grammar<()>
where
    F: FnOnce(&mut Grammar<()>) -> Result<(), GrammarError>,
{
    Grammar::define(|g| {
        for t in terminals {
            g.add_terminal(*t)?;
        }
        g.augment(start)?;
        f(g)
    })
    .unwrap()
}

#[test]
fn empty_prefix() {
    // A -> M a;  M -> ε
    let g = special("A", &["a"], |g| {
        g.add_rule("A", ["M", "a"])?;
        g.add_empty_rule("M")
    });
    assert_eq!(first(&g, &seq(&["A"])), set(&["a"]));
    assert_eq!(follow(&g, &"M".into()), set(&["a"]));
}

#[test]
fn empty_through_two_levels() {
    // A -> B c;  B -> M;  M -> ε
    let g = special("A", &["c"], |g| {
        g.add_rule("A", ["B", "c"])?;
        g.add_rule("B", ["M"])?;
        g.add_empty_rule("M")
    });
    assert_eq!(first(&g, &seq(&["A"])), set(&["c"]));
    assert_eq!(first(&g, &seq(&["B"])), set(&["$empty"]));
    assert_eq!(follow(&g, &"B".into()), set(&["c"]));
    assert_eq!(follow(&g, &"M".into()), follow(&g, &"B".into()));
}

#[test]
fn follow_inherited_without_empty() {
    // A -> B a;  B -> d C;  C -> c
    let g = special("A", &["a", "d", "c"], |g| {
        g.add_rule("A", ["B", "a"])?;
        g.add_rule("B", ["d", "C"])?;
        g.add_rule("C", ["c"])
    });
    assert_eq!(follow(&g, &"B".into()), set(&["a"]));
    assert_eq!(follow(&g, &"C".into()), follow(&g, &"B".into()));
}

#[test]
fn follow_through_nullable_tail() {
    // A -> B c;  B -> C M;  C -> x;  M -> ε
    let g = special("A", &["c", "x"], |g| {
        g.add_rule("A", ["B", "c"])?;
        g.add_rule("B", ["C", "M"])?;
        g.add_rule("C", ["x"])?;
        g.add_empty_rule("M")
    });
    assert_eq!(follow(&g, &"B".into()), set(&["c"]));
    assert_eq!(follow(&g, &"C".into()), follow(&g, &"B".into()));
}
