use super::*;

impl Evaluator {
    /// Builtin dispatch. Constructor builtins and the higher-order list
    /// helpers need the evaluator (they call back into closures); everything
    /// else is handled by the pure catalogue.
    pub(super) fn call_builtin(
        &mut self,
        name: &str,
        args: Vec<Value>,
        loc: &Loc,
    ) -> Result<Value, RuntimeError> {
        if let Some(rest) = name.strip_prefix("__ctor:") {
            let (type_name, ctor) = rest.split_once('.').unwrap_or((rest, rest));
            return Ok(Value::Adt(Rc::new(AdtValue {
                type_name: type_name.to_string(),
                ctor: ctor.to_string(),
                fields: args,
            })));
        }

        match name {
            "map" => {
                let [f, list] = take_two(args);
                let items = expect_list(list, "map", loc)?;
                let mut result = Vec::with_capacity(items.len());
                for item in items {
                    result.push(self.call_value(f.clone(), vec![item], loc)?);
                }
                Ok(Value::List(result))
            }
            "filter" => {
                let [f, list] = take_two(args);
                let items = expect_list(list, "filter", loc)?;
                let mut result = Vec::new();
                for item in items {
                    let keep = self.call_value(f.clone(), vec![item.clone()], loc)?;
                    match self.force(keep)? {
                        Value::Bool(true) => result.push(item),
                        Value::Bool(false) => {}
                        _ => {
                            return Err(RuntimeError::new(
                                "filter: predicate must return Bool",
                                loc,
                            ))
                        }
                    }
                }
                Ok(Value::List(result))
            }
            "fold" => {
                let mut args = args;
                let items = expect_list(args.pop().unwrap(), "fold", loc)?;
                let mut acc = args.pop().unwrap();
                let f = args.pop().unwrap();
                for item in items {
                    acc = self.call_value(f.clone(), vec![acc, item], loc)?;
                }
                Ok(acc)
            }
            _ => crate::builtins::call(name, &args, loc).unwrap_or_else(|| {
                Err(RuntimeError::new(
                    format!("Unknown builtin function: '{}'", name),
                    loc,
                ))
            }),
        }
    }
}

fn take_two(mut args: Vec<Value>) -> [Value; 2] {
    let b = args.pop().unwrap();
    let a = args.pop().unwrap();
    [a, b]
}

fn expect_list(val: Value, name: &str, loc: &Loc) -> Result<Vec<Value>, RuntimeError> {
    match val {
        Value::List(items) => Ok(items),
        _ => Err(RuntimeError::new(
            format!("{}: expected a list", name),
            loc,
        )),
    }
}
