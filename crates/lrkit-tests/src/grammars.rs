//! Grammar definitions for integration tests.

use crate::lexer::Value;
use lrkit::{action, named_action, Element, Grammar, GrammarError};
use std::{cell::RefCell, collections::HashMap, rc::Rc};

type Result = std::result::Result<(), GrammarError>;

fn terminals<V>(g: &mut Grammar<V>, terminals: &[&'static str]) -> Result {
    for t in terminals {
        g.add_terminal(*t)?;
    }
    Ok(())
}

/// E -> E + T | T;  T -> T * F | F;  F -> ( E ) | id
pub fn arithmetic<V>(g: &mut Grammar<V>) -> Result {
    terminals(g, &["+", "*", "(", ")", "id"])?;
    g.augment("E")?;
    g.add_rule("E", ["E", "+", "T"])?;
    g.add_rule("E", ["T"])?;
    g.add_rule("T", ["T", "*", "F"])?;
    g.add_rule("T", ["F"])?;
    g.add_rule("F", ["(", "E", ")"])?;
    g.add_rule("F", ["id"])
}

/// S -> L = R | R;  L -> * R | id;  R -> L
pub fn assignment<V>(g: &mut Grammar<V>) -> Result {
    terminals(g, &["=", "*", "id"])?;
    g.augment("S")?;
    g.add_rule("S", ["L", "=", "R"])?;
    g.add_rule("S", ["R"])?;
    g.add_rule("L", ["*", "R"])?;
    g.add_rule("L", ["id"])?;
    g.add_rule("R", ["L"])
}

/// S -> A # = | B # ?;  A -> = ?;  B -> = ?
pub fn reduce_reduce<V>(g: &mut Grammar<V>) -> Result {
    terminals(g, &["#", "=", "?"])?;
    g.augment("S")?;
    g.add_rule("S", ["A", "#", "="])?;
    g.add_rule("S", ["B", "#", "?"])?;
    g.add_rule("A", ["=", "?"])?;
    g.add_rule("B", ["=", "?"])
}

/// S -> a E c | a F d | b F c | b E d;  E -> e;  F -> e
///
/// LR(1), but merging the states after `a e` and `b e` makes it not LALR(1).
pub fn lr1_not_lalr<V>(g: &mut Grammar<V>) -> Result {
    terminals(g, &["a", "b", "c", "d", "e"])?;
    g.augment("S")?;
    g.add_rule("S", ["a", "E", "c"])?;
    g.add_rule("S", ["a", "F", "d"])?;
    g.add_rule("S", ["b", "F", "c"])?;
    g.add_rule("S", ["b", "E", "d"])?;
    g.add_rule("E", ["e"])?;
    g.add_rule("F", ["e"])
}

/// S -> C C;  C -> c C | d
pub fn cc<V>(g: &mut Grammar<V>) -> Result {
    terminals(g, &["c", "d"])?;
    g.augment("S")?;
    g.add_rule("S", ["C", "C"])?;
    g.add_rule("C", ["c", "C"])?;
    g.add_rule("C", ["d"])
}

/// expr -> NUM | expr expr + | expr expr -
///
/// Reverse Polish notation. `expr` occurs twice in the binary alternatives.
pub fn postfix<V>(g: &mut Grammar<V>) -> Result {
    terminals(g, &["NUM", "+", "-"])?;
    g.augment("expr")?;
    g.add_rule("expr", ["NUM"])?;
    g.add_rule("expr", ["expr", "expr", "+"])?;
    g.add_rule("expr", ["expr", "expr", "-"])
}

/// S -> O x;  O -> a | M;  M -> ε
///
/// `M` only derives the empty string and sits in an optional position.
pub fn optional<V>(g: &mut Grammar<V>) -> Result {
    terminals(g, &["a", "x"])?;
    g.augment("S")?;
    g.add_rule("S", ["O", "x"])?;
    g.add_rule("O", ["a"])?;
    g.add_rule("O", ["M"])?;
    g.add_empty_rule("M")
}

/// S -> E;  E -> id | let {push} ( E ) {pop}
pub fn let_block<V: 'static>(g: &mut Grammar<V>) -> Result {
    terminals(g, &["(", ")", "id", "let"])?;
    g.augment("S")?;
    g.add_rule("S", ["E"])?;
    g.add_rule("E", ["id"])?;
    g.add_rule(
        "E",
        [
            "let".into(),
            named_action("push", |_| None),
            "(".into(),
            "E".into(),
            ")".into(),
            named_action("pop", |_| None),
        ],
    )
}

/// A four function calculator over `num` tokens.
pub fn calculator(g: &mut Grammar<i64>) -> Result {
    terminals(g, &["+", "*", "(", ")", "num"])?;
    g.augment("E")?;
    g.add_rule(
        "E",
        [
            "E".into(),
            "+".into(),
            "T".into(),
            action(|v: Vec<i64>| Some(v[0] + v[1])),
        ],
    )?;
    g.add_rule("E", ["T"])?;
    g.add_rule(
        "T",
        [
            "T".into(),
            "*".into(),
            "F".into(),
            action(|v: Vec<i64>| Some(v[0] * v[1])),
        ],
    )?;
    g.add_rule("T", ["F"])?;
    g.add_rule("F", ["(", "E", ")"])?;
    g.add_rule("F", ["num"])
}

/// Nested variable scopes, innermost last.
pub type Scopes = Rc<RefCell<Vec<HashMap<String, i64>>>>;

pub fn new_scopes() -> Scopes {
    Rc::new(RefCell::new(vec![HashMap::new()]))
}

/// The calculator extended with variables and `let ( ... )` blocks that
/// open a nested scope.
///
/// Tokens: `id` numbers, `var` names, and the keyword `let`.
pub fn calculator_with_context(g: &mut Grammar<Value>, scopes: Scopes) -> Result {
    terminals(g, &["+", "*", "(", ")", "id", "var", "=", "let"])?;
    g.augment("S")?;

    let num = |n: i64| Some(Value::Num(n));
    g.add_rule("S", ["E"])?;
    g.add_rule(
        "E",
        [
            "E".into(),
            "+".into(),
            "T".into(),
            action(move |v: Vec<Value>| num(v[0].num() + v[1].num())),
        ],
    )?;
    g.add_rule("E", ["T"])?;
    g.add_rule(
        "T",
        [
            "T".into(),
            "*".into(),
            "F".into(),
            action(move |v: Vec<Value>| num(v[0].num() * v[1].num())),
        ],
    )?;
    g.add_rule("T", ["F"])?;
    g.add_rule("F", ["(", "E", ")"])?;
    g.add_rule("F", ["id"])?;

    let set_scopes = scopes.clone();
    g.add_rule(
        "F",
        [
            "var".into(),
            "=".into(),
            "E".into(),
            action(move |v: Vec<Value>| {
                let value = v[1].num();
                let mut scopes = set_scopes.borrow_mut();
                if let Some(scope) = scopes.last_mut() {
                    scope.insert(v[0].name().to_owned(), value);
                }
                num(value)
            }),
        ],
    )?;

    let get_scopes = scopes.clone();
    g.add_rule(
        "F",
        [
            "var".into(),
            action(move |v: Vec<Value>| {
                let name = v[0].name();
                let scopes = get_scopes.borrow();
                let value = scopes.iter().rev().find_map(|scope| scope.get(name));
                num(*value.unwrap_or_else(|| panic!("undefined variable {}", name)))
            }),
        ],
    )?;

    let push_scopes = scopes.clone();
    let pop_scopes = scopes;
    let elements: Vec<Element<Value>> = vec![
        "let".into(),
        named_action("push", move |_| {
            push_scopes.borrow_mut().push(HashMap::new());
            None
        }),
        "(".into(),
        "E".into(),
        ")".into(),
        named_action("pop", move |_| {
            pop_scopes.borrow_mut().pop();
            None
        }),
    ];
    g.add_rule("F", elements)
}

/// Memory of the `*`-dereferencing statement language.
#[derive(Debug, Clone, Default)]
pub struct Memory {
    pub vars: Rc<RefCell<HashMap<String, Value>>>,
    pub last: Rc<RefCell<Option<i64>>>,
}

/// S -> E ; S | E ;   E -> L = R | R;  L -> * R | id;  R -> L | num
///
/// Statements assign to names; `*x` reads the value stored in `x`, and a bare
/// expression statement records its value in [`Memory::last`]. The grammar
/// is LALR(1) but not LR(0).
pub fn statements(g: &mut Grammar<Value>, memory: Memory) -> Result {
    terminals(g, &["=", "*", ";", "id", "num"])?;
    g.augment("S")?;

    g.add_rule(
        "S",
        [
            "E".into(),
            ";".into(),
            "S".into(),
            action(|mut v: Vec<Value>| v.pop()),
        ],
    )?;
    g.add_rule("S", ["E", ";"])?;

    let vars = memory.vars.clone();
    g.add_rule(
        "E",
        [
            "L".into(),
            "=".into(),
            "R".into(),
            action(move |v: Vec<Value>| {
                vars.borrow_mut().insert(v[0].name().to_owned(), v[1].clone());
                Some(v[1].clone())
            }),
        ],
    )?;

    let vars = memory.vars.clone();
    let last = memory.last;
    g.add_rule(
        "E",
        [
            "R".into(),
            action(move |v: Vec<Value>| {
                let value = match &v[0] {
                    Value::Num(n) => *n,
                    Value::Name(name) => vars.borrow()[name].num(),
                };
                *last.borrow_mut() = Some(value);
                Some(v[0].clone())
            }),
        ],
    )?;

    let vars = memory.vars;
    g.add_rule(
        "L",
        [
            "*".into(),
            "R".into(),
            action(move |v: Vec<Value>| Some(vars.borrow()[v[0].name()].clone())),
        ],
    )?;
    g.add_rule("L", ["id"])?;
    g.add_rule("R", ["L"])?;
    g.add_rule("R", ["num"])
}
