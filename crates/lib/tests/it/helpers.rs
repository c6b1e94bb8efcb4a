use std::cell::Cell;
use std::rc::Rc;

use idmap::{Args, Batch, FrozenMap, Function, MemoryStore, Result, Store, Value};

/// `add(a, b) = a + b` over integers.
pub fn add() -> Function {
    Function::new("add", ["a", "b"], |args: &Args| {
        Ok(Value::Int(args.i64("a")? + args.i64("b")?))
    })
}

/// `mul(a, b) = a * b` over integers.
pub fn mul() -> Function {
    Function::new("mul", ["a", "b"], |args: &Args| {
        Ok(Value::Int(args.i64("a")? * args.i64("b")?))
    })
}

/// `divmod(a, b) = [a / b, a % b]`, a two-output function.
pub fn divmod() -> Function {
    Function::new("divmod", ["a", "b"], |args: &Args| {
        let (a, b) = (args.i64("a")?, args.i64("b")?);
        Ok(Value::List(vec![Value::Int(a / b), Value::Int(a % b)]))
    })
}

/// `stats(xs) = {"min": .., "max": ..}`, a dict-producing function.
pub fn stats() -> Function {
    Function::new("stats", ["xs"], |args: &Args| {
        let xs: Vec<i64> = args
            .get("xs")?
            .expect_list()?
            .iter()
            .map(Value::expect_i64)
            .collect::<Result<_>>()?;
        let min = xs.iter().copied().min().unwrap_or_default();
        let max = xs.iter().copied().max().unwrap_or_default();
        Ok(Value::dict([("min", min), ("max", max)]))
    })
}

/// A function that counts its calls.
pub fn counted(name: &str) -> (Function, Rc<Cell<usize>>) {
    let calls = Rc::new(Cell::new(0));
    let counter = calls.clone();
    let function = Function::new(name, ["a"], move |args: &Args| {
        counter.set(counter.get() + 1);
        Ok(Value::Int(args.i64("a")? + 1))
    });
    (function, calls)
}

/// Build a map from `(field, value)` pairs.
pub fn map_of(pairs: &[(&str, i64)]) -> FrozenMap {
    let batch: Batch = pairs.iter().map(|(name, value)| (*name, *value)).collect();
    FrozenMap::from_batch(batch).expect("plain values always build")
}

/// A fresh in-memory store, both as its concrete type and as a shared trait object.
pub fn shared_store() -> (Rc<MemoryStore>, Rc<dyn Store>) {
    let store = Rc::new(MemoryStore::new());
    let shared: Rc<dyn Store> = store.clone();
    (store, shared)
}
