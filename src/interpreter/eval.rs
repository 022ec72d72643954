use super::*;
use crate::value::{map_insert, render_value};

impl Evaluator {
    pub fn eval_expr(&mut self, expr: &Expr, env: &EnvRef) -> Result<Value, RuntimeError> {
        match &expr.kind {
            ExprKind::Int(i) => Ok(Value::Int(*i)),
            ExprKind::Float(f) => Ok(Value::Float(*f)),
            ExprKind::Str(s) => Ok(Value::Str(s.clone())),
            ExprKind::Bool(b) => Ok(Value::Bool(*b)),

            ExprKind::InterpStr(parts) => {
                let mut result = String::new();
                for part in parts {
                    match part {
                        StrPart::Literal(s) => result.push_str(s),
                        StrPart::Expr(e) => {
                            let val = self.eval_expr(e, env)?;
                            let val = self.force(val)?;
                            result.push_str(&render_value(&val));
                        }
                    }
                }
                Ok(Value::Str(result))
            }

            ExprKind::Ident(name) => {
                let val = env.borrow().get(name).ok_or_else(|| {
                    RuntimeError::new(format!("Undefined variable: {}", name), &expr.loc)
                })?;
                self.force(val)
            }

            ExprKind::Binary { op, left, right } => {
                // && and || short-circuit: the left operand decides alone
                match op {
                    BinOp::And => {
                        let l = self.eval_bool_operand(left, env, "&&")?;
                        if !l {
                            return Ok(Value::Bool(false));
                        }
                        let r = self.eval_bool_operand(right, env, "&&")?;
                        return Ok(Value::Bool(r));
                    }
                    BinOp::Or => {
                        let l = self.eval_bool_operand(left, env, "||")?;
                        if l {
                            return Ok(Value::Bool(true));
                        }
                        let r = self.eval_bool_operand(right, env, "||")?;
                        return Ok(Value::Bool(r));
                    }
                    _ => {}
                }

                let lv = self.eval_expr(left, env)?;
                let lv = self.force(lv)?;
                let rv = self.eval_expr(right, env)?;
                let rv = self.force(rv)?;
                self.eval_binop(op, lv, rv, &expr.loc)
            }

            ExprKind::Unary { op, operand } => {
                let val = self.eval_expr(operand, env)?;
                let val = self.force(val)?;
                self.eval_unop(op, val, &expr.loc)
            }

            ExprKind::Let {
                name,
                value,
                is_const,
                ..
            } => {
                let val = self.eval_expr(value, env)?;
                env.borrow_mut().define(name, val.clone(), *is_const, &expr.loc)?;
                Ok(val)
            }

            ExprKind::Assign { name, value } => {
                let val = self.eval_expr(value, env)?;
                env.borrow_mut().set(name, val.clone(), &expr.loc)?;
                Ok(val)
            }

            ExprKind::Fn {
                name, params, body, ..
            } => {
                let closure = Value::Closure(Rc::new(Closure {
                    params: params.iter().map(|p| p.name.clone()).collect(),
                    body: Rc::clone(body),
                    env: Rc::clone(env),
                }));
                env.borrow_mut().define(name, closure.clone(), false, &expr.loc)?;
                Ok(closure)
            }

            ExprKind::Lambda { params, body } => Ok(Value::Closure(Rc::new(Closure {
                params: params.iter().map(|p| p.name.clone()).collect(),
                body: Rc::clone(body),
                env: Rc::clone(env),
            }))),

            ExprKind::Call { callee, args } => {
                let callee_val = self.eval_expr(callee, env)?;
                let callee_val = self.force(callee_val)?;
                let mut arg_vals = Vec::with_capacity(args.len());
                for arg in args {
                    arg_vals.push(self.eval_expr(arg, env)?);
                }
                self.call_value(callee_val, arg_vals, &expr.loc)
            }

            ExprKind::Ctor {
                type_name,
                ctor,
                args,
            } => {
                let def = env.borrow().get_type(type_name).ok_or_else(|| {
                    RuntimeError::new(format!("Unknown type: {}", type_name), &expr.loc)
                })?;
                let ctor_def = def.ctors.iter().find(|c| &c.name == ctor).ok_or_else(|| {
                    RuntimeError::new(
                        format!("Unknown constructor: {}.{}", type_name, ctor),
                        &expr.loc,
                    )
                })?;
                if args.len() != ctor_def.fields.len() {
                    return Err(RuntimeError::new(
                        format!(
                            "{}() expects {} arguments, got {}",
                            ctor,
                            ctor_def.fields.len(),
                            args.len()
                        ),
                        &expr.loc,
                    ));
                }
                let mut fields = Vec::with_capacity(args.len());
                for arg in args {
                    fields.push(self.eval_expr(arg, env)?);
                }
                Ok(Value::Adt(Rc::new(AdtValue {
                    type_name: type_name.clone(),
                    ctor: ctor.clone(),
                    fields,
                })))
            }

            ExprKind::If {
                condition,
                then_branch,
                else_branch,
            } => {
                let cond = self.eval_expr(condition, env)?;
                let cond = self.force(cond)?;
                match cond {
                    Value::Bool(true) => self.eval_expr(then_branch, env),
                    Value::Bool(false) => match else_branch {
                        Some(eb) => self.eval_expr(eb, env),
                        None => Ok(Value::Unit),
                    },
                    _ => Err(RuntimeError::new(
                        "if condition must be a Bool",
                        &condition.loc,
                    )),
                }
            }

            ExprKind::While { condition, body } => {
                let mut result = Value::Unit;
                loop {
                    let cond = self.eval_expr(condition, env)?;
                    let cond = self.force(cond)?;
                    match cond {
                        Value::Bool(true) => {}
                        Value::Bool(false) => break,
                        _ => {
                            return Err(RuntimeError::new(
                                "while condition must be a Bool",
                                &condition.loc,
                            ))
                        }
                    }
                    let loop_env = Environment::extend(env);
                    result = self.eval_expr(body, &loop_env)?;
                }
                Ok(result)
            }

            ExprKind::For {
                var,
                iterable,
                body,
            } => {
                let iter_val = self.eval_expr(iterable, env)?;
                let iter_val = self.force(iter_val)?;
                let items = match iter_val {
                    Value::List(items) => items,
                    _ => {
                        return Err(RuntimeError::new(
                            "for: expected list to iterate over",
                            &iterable.loc,
                        ))
                    }
                };

                let mut result = Value::Unit;
                for item in items {
                    let item = self.force(item)?;
                    let loop_env = Environment::extend(env);
                    loop_env.borrow_mut().insert(var, item);
                    result = self.eval_expr(body, &loop_env)?;
                }
                Ok(result)
            }

            ExprKind::List(elements) => {
                let mut values = Vec::with_capacity(elements.len());
                for elem in elements {
                    values.push(self.eval_expr(elem, env)?);
                }
                Ok(Value::List(values))
            }

            ExprKind::Tuple(elements) => {
                if elements.is_empty() {
                    return Ok(Value::Unit);
                }
                let mut values = Vec::with_capacity(elements.len());
                for elem in elements {
                    values.push(self.eval_expr(elem, env)?);
                }
                Ok(Value::Tuple(values))
            }

            ExprKind::Record(fields) => {
                let mut values = Vec::with_capacity(fields.len());
                for (name, field_expr) in fields {
                    values.push((name.clone(), self.eval_expr(field_expr, env)?));
                }
                Ok(Value::Record(values))
            }

            ExprKind::Map(entries) => {
                let mut values = Vec::with_capacity(entries.len());
                for (key_expr, value_expr) in entries {
                    let key = self.eval_expr(key_expr, env)?;
                    let key = self.force(key)?;
                    let value = self.eval_expr(value_expr, env)?;
                    map_insert(&mut values, key, value);
                }
                Ok(Value::Map(values))
            }

            ExprKind::Field { object, field } => self.eval_field(object, field, env, &expr.loc),

            ExprKind::ModuleMember { module, member } => {
                let module_env = env.borrow().get_module(module).ok_or_else(|| {
                    RuntimeError::new(format!("Unknown module: {}", module), &expr.loc)
                })?;
                let val = module_env.borrow().get(member).ok_or_else(|| {
                    RuntimeError::new(
                        format!("Unknown member: {} in module {}", member, module),
                        &expr.loc,
                    )
                })?;
                self.force(val)
            }

            ExprKind::Match { scrutinee, arms } => {
                let subject = self.eval_expr(scrutinee, env)?;
                let subject = self.force(subject)?;
                self.eval_match(subject, arms, env, &expr.loc)
            }

            ExprKind::Block(exprs) => {
                let block_env = Environment::extend(env);
                let mut result = Value::Unit;
                for e in exprs {
                    result = self.eval_expr(e, &block_env)?;
                }
                Ok(result)
            }
        }
    }

    fn eval_bool_operand(
        &mut self,
        expr: &Expr,
        env: &EnvRef,
        op: &str,
    ) -> Result<bool, RuntimeError> {
        let val = self.eval_expr(expr, env)?;
        let val = self.force(val)?;
        match val {
            Value::Bool(b) => Ok(b),
            _ => Err(RuntimeError::new(
                format!("Operator '{}' expects Bool operands", op),
                &expr.loc,
            )),
        }
    }

    /// Field access: a module in scope wins, then a type namespace, then the
    /// evaluated object (record field or `.0`-style tuple index).
    fn eval_field(
        &mut self,
        object: &Expr,
        field: &str,
        env: &EnvRef,
        loc: &Loc,
    ) -> Result<Value, RuntimeError> {
        if let ExprKind::Ident(name) = &object.kind {
            let module = env.borrow().get_module(name);
            if let Some(module_env) = module {
                let val = module_env.borrow().get(field).ok_or_else(|| {
                    RuntimeError::new(
                        format!("Unknown member: {} in module {}", field, name),
                        loc,
                    )
                })?;
                return self.force(val);
            }

            // `Type.Ctor` resolves the constructor binding
            let typedef = env.borrow().get_type(name);
            if let Some(def) = typedef {
                if def.ctors.iter().any(|c| c.name == field) {
                    let val = env.borrow().get(field).ok_or_else(|| {
                        RuntimeError::new(
                            format!("Unknown constructor: {}.{}", name, field),
                            loc,
                        )
                    })?;
                    return self.force(val);
                }
                return Err(RuntimeError::new(
                    format!("Unknown constructor: {}.{}", name, field),
                    loc,
                ));
            }
        }

        let obj = self.eval_expr(object, env)?;
        let obj = self.force(obj)?;
        match obj {
            Value::Record(fields) => fields
                .into_iter()
                .find(|(k, _)| k == field)
                .map(|(_, v)| v)
                .ok_or_else(|| RuntimeError::new(format!("Unknown field: {}", field), loc)),
            Value::Tuple(items) => {
                let idx: usize = field.parse().map_err(|_| {
                    RuntimeError::new(format!("Invalid tuple index: {}", field), loc)
                })?;
                items
                    .into_iter()
                    .nth(idx)
                    .ok_or_else(|| RuntimeError::new("Tuple index out of bounds", loc))
            }
            _ => Err(RuntimeError::new(
                format!("Cannot access field '{}' on non-record/tuple", field),
                loc,
            )),
        }
    }
}
