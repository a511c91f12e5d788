use lrkit::{
    runtime::{Action, ParseTable, StateID},
    table::{build, build_parsing_table, BuildError, Config, ConflictError, Seed},
    Driver, Grammar, GrammarError, Symbol, Token,
};
use lrkit_tests::{grammars, init_tracing};

fn conflict<V>(result: Result<ParseTable<V>, BuildError>) -> ConflictError {
    match result {
        Err(BuildError::Conflict(conflict)) => conflict,
        Err(other) => panic!("unexpected error: {}", other),
        Ok(_) => panic!("the table was built without conflicts"),
    }
}

#[test]
fn lr0_cannot_decide_assignment() -> anyhow::Result<()> {
    init_tracing();
    let g = Grammar::<()>::define(grammars::assignment)?;
    match conflict(build_parsing_table(&g, Seed::LR0, false)) {
        ConflictError::ShiftReduce {
            terminal,
            first,
            second,
        } => {
            assert_eq!(terminal, "=");
            let mut productions = [first, second];
            productions.sort();
            assert_eq!(productions, ["R -> L", "S -> L = R"]);
        }
        other => panic!("unexpected conflict: {}", other),
    }
    Ok(())
}

#[test]
fn lookaheads_decide_assignment() -> anyhow::Result<()> {
    init_tracing();
    let g = Grammar::<()>::define(grammars::assignment)?;
    build_parsing_table(&g, Seed::LR1, false)?;
    build_parsing_table(&g, Seed::LALR, false)?;

    let table = build(&g, Config::new().use_lalr().handle_shift_reduce(false))?;
    let tokens = ["*", "id", "=", "id"]
        .into_iter()
        .map(Token::bare)
        .chain(Some(Token::eof()));
    assert_eq!(Driver::new(table).parse(tokens)?, None);
    Ok(())
}

#[test]
fn reduce_reduce_is_always_reported() -> anyhow::Result<()> {
    let g = Grammar::<()>::define(grammars::reduce_reduce)?;
    for seed in [Seed::LR0, Seed::LR1, Seed::LALR] {
        for handle_shift_reduce in [false, true] {
            match conflict(build_parsing_table(&g, seed, handle_shift_reduce)) {
                ConflictError::ReduceReduce {
                    terminal,
                    first,
                    second,
                } => {
                    assert_eq!(terminal, "#");
                    let mut productions = [first, second];
                    productions.sort();
                    assert_eq!(productions, ["A -> = ?", "B -> = ?"]);
                }
                other => panic!("unexpected conflict: {}", other),
            }
        }
    }
    Ok(())
}

#[test]
fn merged_lookaheads_collide_under_lalr() -> anyhow::Result<()> {
    init_tracing();
    let g = Grammar::<()>::define(grammars::lr1_not_lalr)?;

    match conflict(build_parsing_table(&g, Seed::LALR, true)) {
        ConflictError::ReduceReduce {
            terminal,
            first,
            second,
        } => {
            assert_eq!(terminal, "c");
            let mut productions = [first, second];
            productions.sort();
            assert_eq!(productions, ["E -> e", "F -> e"]);
        }
        other => panic!("unexpected conflict: {}", other),
    }

    let table = build_parsing_table(&g, Seed::LR1, false)?;
    let driver = Driver::new(table);
    for input in [["a", "e", "c"], ["a", "e", "d"], ["b", "e", "c"], ["b", "e", "d"]] {
        let tokens = input.into_iter().map(Token::bare).chain(Some(Token::eof()));
        driver.parse(tokens)?;
    }
    Ok(())
}

#[test]
fn terminals_cannot_have_rules() -> anyhow::Result<()> {
    let mut g = Grammar::<()>::new();
    g.add_terminal("id")?;
    g.augment("S")?;
    g.add_rule("S", ["id"])?;
    g.add_rule("id", ["S"])?;
    assert_eq!(
        build(&g, &Config::new()).unwrap_err(),
        BuildError::Grammar(GrammarError::TerminalWithRules("id".into()))
    );
    Ok(())
}

#[test]
fn conflict_message() -> anyhow::Result<()> {
    let g = Grammar::<()>::define(grammars::reduce_reduce)?;
    let err = build(&g, &Config::new()).unwrap_err();
    let message = err.to_string();
    assert!(message.starts_with("reduce/reduce conflict on '#'"), "{}", message);
    assert!(message.contains("`A -> = ?`"), "{}", message);
    assert!(message.contains("`B -> = ?`"), "{}", message);
    Ok(())
}

#[test]
fn lr1_and_lalr_agree_on_cc() -> anyhow::Result<()> {
    let g = Grammar::<()>::define(grammars::cc)?;
    let lr1 = build(&g, Config::new().use_lr1())?;
    let lalr = build(&g, Config::new().use_lalr())?;
    let lr0 = build(&g, Config::new().use_lr0())?;
    assert_eq!(lr1.len(), 10);
    assert_eq!(lalr.len(), 7);
    assert_eq!(lr0.len(), 7);

    for table in [lr1, lalr, lr0] {
        let driver = Driver::new(table);
        let tokens = ["c", "d", "c", "c", "d"]
            .into_iter()
            .map(Token::bare)
            .chain(Some(Token::eof()));
        driver.parse(tokens)?;
    }
    Ok(())
}

#[test]
fn start_state_and_accept() -> anyhow::Result<()> {
    let g = Grammar::<()>::define(grammars::arithmetic)?;
    let table = build(&g, Config::new().use_lr0())?;
    assert_eq!(table.len(), 12);
    assert_eq!(table.start(), StateID::from_raw(0));

    let accepting = table.goto(table.start(), &"E".into()).expect("goto on E");
    assert_eq!(table.action(accepting, &"$eof".into()), Some(&Action::Accept));
    assert_eq!(
        table.expected(table.start()),
        [Symbol::from("("), Symbol::from("id")]
    );
    Ok(())
}

#[test]
fn empty_alternative_pops_nothing() -> anyhow::Result<()> {
    let g = Grammar::<()>::define(grammars::optional)?;
    let table = build(&g, &Config::new())?;
    match table.action(table.start(), &"x".into()) {
        Some(Action::Reduce(reduce)) => {
            assert_eq!(reduce.production.nonterminal, "M");
            assert!(reduce.is_empty);
            assert_eq!(reduce.len, 0);
            assert_eq!(reduce.pops(), 0);
        }
        other => panic!("unexpected action: {:?}", other),
    }
    Ok(())
}

#[test]
fn undefined_symbols_are_rejected() -> anyhow::Result<()> {
    let mut g = Grammar::<()>::new();
    g.add_terminal("a")?;
    g.augment("S")?;
    g.add_rule("S", ["a", "B"])?;
    assert_eq!(
        build(&g, &Config::new()).unwrap_err(),
        BuildError::Grammar(GrammarError::UndefinedSymbol {
            symbol: "B".into(),
            production: "S -> a B".into(),
        })
    );
    Ok(())
}

#[test]
fn rebuilt_tables_parse_the_same() -> anyhow::Result<()> {
    let g = Grammar::<i64>::define(grammars::calculator)?;
    let table = build(&g, &Config::new())?;
    let rendered = table.to_string();
    assert!(rendered.starts_with("#### State S#000 (start)"), "{}", rendered);

    let (rows, start, semantics) = table.into_parts();
    let table = ParseTable::from_parts(rows, start, semantics);
    let tokens = vec![
        Token::new("num", 2),
        Token::bare("*"),
        Token::new("num", 21),
        Token::eof(),
    ];
    assert_eq!(Driver::new(table).parse(tokens)?, Some(42));
    Ok(())
}
