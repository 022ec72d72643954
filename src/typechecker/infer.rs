use super::*;

impl TypeChecker {
    pub fn infer_expr(&mut self, expr: &Expr) -> Result<TypeId, TypeError> {
        match &expr.kind {
            ExprKind::Int(_) => Ok(self.insert(Ty::Int)),
            ExprKind::Float(_) => Ok(self.insert(Ty::Float)),
            ExprKind::Str(_) => Ok(self.insert(Ty::Str)),
            ExprKind::Bool(_) => Ok(self.insert(Ty::Bool)),

            ExprKind::InterpStr(parts) => {
                for part in parts {
                    if let StrPart::Expr(e) = part {
                        self.infer_expr(e)?;
                    }
                }
                Ok(self.insert(Ty::Str))
            }

            ExprKind::Ident(name) => {
                let scheme = self.lookup(name).ok_or_else(|| TypeError {
                    msg: format!("Undefined variable: {}", name),
                    loc: expr.loc.clone(),
                })?;
                Ok(self.instantiate(&scheme))
            }

            ExprKind::Binary { op, left, right } => {
                let lt = self.infer_expr(left)?;
                let rt = self.infer_expr(right)?;
                match op {
                    BinOp::Add | BinOp::Sub | BinOp::Mul | BinOp::Div | BinOp::Mod => {
                        self.unify(lt, rt, &expr.loc)?;
                        Ok(lt)
                    }
                    BinOp::Eq | BinOp::Neq | BinOp::Lt | BinOp::Gt | BinOp::Lte | BinOp::Gte => {
                        self.unify(lt, rt, &expr.loc)?;
                        Ok(self.insert(Ty::Bool))
                    }
                    BinOp::And | BinOp::Or => {
                        let boolean = self.insert(Ty::Bool);
                        self.unify(lt, boolean, &left.loc)?;
                        self.unify(rt, boolean, &right.loc)?;
                        Ok(boolean)
                    }
                }
            }

            ExprKind::Unary { op, operand } => {
                let t = self.infer_expr(operand)?;
                match op {
                    UnOp::Neg => Ok(t),
                    UnOp::Not => {
                        let boolean = self.insert(Ty::Bool);
                        self.unify(t, boolean, &operand.loc)?;
                        Ok(boolean)
                    }
                }
            }

            ExprKind::Let {
                name,
                annotation,
                value,
                ..
            } => {
                let t = self.infer_expr(value)?;
                if let Some(annotation) = annotation {
                    let annotated = self.resolve_type_expr(annotation);
                    self.unify(t, annotated, &expr.loc)?;
                }
                let scheme = self.generalize(t);
                self.define(name, scheme);
                Ok(t)
            }

            ExprKind::Assign { name, value } => {
                let t = self.infer_expr(value)?;
                if let Some(scheme) = self.lookup(name) {
                    let bound = self.instantiate(&scheme);
                    self.unify(t, bound, &expr.loc)?;
                }
                Ok(t)
            }

            ExprKind::Fn {
                name,
                params,
                return_annotation,
                body,
            } => {
                // The name is bound monomorphically before the body is
                // inferred, so recursive references resolve.
                let param_tys: Vec<TypeId> = params
                    .iter()
                    .map(|p| match &p.annotation {
                        Some(te) => self.resolve_type_expr(te),
                        None => self.fresh_var(),
                    })
                    .collect();
                let ret = match return_annotation {
                    Some(te) => self.resolve_type_expr(te),
                    None => self.fresh_var(),
                };
                let fn_ty = self.insert(Ty::Fn {
                    params: param_tys.clone(),
                    ret,
                });
                self.define(name, Scheme::mono(fn_ty));

                self.push_scope();
                for (param, ty) in params.iter().zip(param_tys.iter()) {
                    self.define(&param.name, Scheme::mono(*ty));
                }
                let body_ty = self.infer_expr(body);
                self.pop_scope();
                self.unify(body_ty?, ret, &expr.loc)?;

                let scheme = self.generalize(fn_ty);
                self.define(name, scheme);
                Ok(fn_ty)
            }

            ExprKind::Lambda { params, body } => {
                let param_tys: Vec<TypeId> = params
                    .iter()
                    .map(|p| match &p.annotation {
                        Some(te) => self.resolve_type_expr(te),
                        None => self.fresh_var(),
                    })
                    .collect();

                self.push_scope();
                for (param, ty) in params.iter().zip(param_tys.iter()) {
                    self.define(&param.name, Scheme::mono(*ty));
                }
                let body_ty = self.infer_expr(body);
                self.pop_scope();

                Ok(self.insert(Ty::Fn {
                    params: param_tys,
                    ret: body_ty?,
                }))
            }

            ExprKind::Call { callee, args } => {
                let callee_ty = self.infer_expr(callee)?;
                let mut arg_tys = Vec::with_capacity(args.len());
                for arg in args {
                    arg_tys.push(self.infer_expr(arg)?);
                }
                let ret = self.fresh_var();
                let expected = self.insert(Ty::Fn {
                    params: arg_tys,
                    ret,
                });
                self.unify(callee_ty, expected, &expr.loc)?;
                Ok(ret)
            }

            ExprKind::Ctor {
                type_name,
                ctor,
                args,
            } => {
                let sig = self.ctor_sig(ctor).ok_or_else(|| TypeError {
                    msg: format!("Undefined constructor: {}.{}", type_name, ctor),
                    loc: expr.loc.clone(),
                })?;
                if sig.fields.len() != args.len() {
                    return Err(TypeError {
                        msg: format!(
                            "Constructor {} expects {} arguments, got {}",
                            ctor,
                            sig.fields.len(),
                            args.len()
                        ),
                        loc: expr.loc.clone(),
                    });
                }
                for (arg, field) in args.iter().zip(sig.fields.iter()) {
                    let at = self.infer_expr(arg)?;
                    self.unify(at, *field, &arg.loc)?;
                }
                Ok(sig.ret)
            }

            ExprKind::If {
                condition,
                then_branch,
                else_branch,
            } => {
                let cond = self.infer_expr(condition)?;
                let boolean = self.insert(Ty::Bool);
                self.unify(cond, boolean, &condition.loc)?;

                let then_ty = self.infer_expr(then_branch)?;
                if let Some(else_branch) = else_branch {
                    let else_ty = self.infer_expr(else_branch)?;
                    self.unify(then_ty, else_ty, &expr.loc)?;
                }
                Ok(then_ty)
            }

            ExprKind::While { condition, body } => {
                let cond = self.infer_expr(condition)?;
                let boolean = self.insert(Ty::Bool);
                self.unify(cond, boolean, &condition.loc)?;
                self.infer_expr(body)
            }

            ExprKind::For {
                var,
                iterable,
                body,
            } => {
                let iter_ty = self.infer_expr(iterable)?;
                let elem = self.fresh_var();
                let list = self.insert(Ty::List(elem));
                self.unify(iter_ty, list, &iterable.loc)?;

                self.push_scope();
                self.define(var, Scheme::mono(elem));
                let body_ty = self.infer_expr(body);
                self.pop_scope();
                body_ty
            }

            ExprKind::List(elements) => {
                let elem = self.fresh_var();
                for e in elements {
                    let t = self.infer_expr(e)?;
                    self.unify(elem, t, &e.loc)?;
                }
                Ok(self.insert(Ty::List(elem)))
            }

            ExprKind::Tuple(elements) => {
                if elements.is_empty() {
                    return Ok(self.insert(Ty::Unit));
                }
                let mut tys = Vec::with_capacity(elements.len());
                for e in elements {
                    tys.push(self.infer_expr(e)?);
                }
                Ok(self.insert(Ty::Tuple(tys)))
            }

            ExprKind::Record(fields) => {
                let mut tys = Vec::with_capacity(fields.len());
                for (name, e) in fields {
                    tys.push((name.clone(), self.infer_expr(e)?));
                }
                Ok(self.insert(Ty::Record(tys)))
            }

            ExprKind::Map(entries) => {
                let key = self.fresh_var();
                let value = self.fresh_var();
                for (k, v) in entries {
                    let kt = self.infer_expr(k)?;
                    self.unify(key, kt, &k.loc)?;
                    let vt = self.infer_expr(v)?;
                    self.unify(value, vt, &v.loc)?;
                }
                Ok(self.insert(Ty::Map { key, value }))
            }

            ExprKind::Field { object, field } => {
                let obj_ty = self.infer_expr(object)?;
                let obj_ty = self.find(obj_ty);
                match self.arena_at(obj_ty) {
                    Ty::Record(fields) => match fields.iter().find(|(n, _)| n == field) {
                        Some((_, t)) => Ok(*t),
                        None => Err(TypeError {
                            msg: format!("Unknown field: {}", field),
                            loc: expr.loc.clone(),
                        }),
                    },
                    Ty::Tuple(items) => match field.parse::<usize>().ok().and_then(|i| items.get(i))
                    {
                        Some(t) => Ok(*t),
                        None => Err(TypeError {
                            msg: format!("Invalid tuple index: {}", field),
                            loc: expr.loc.clone(),
                        }),
                    },
                    // Modules, type namespaces and not-yet-known objects
                    _ => Ok(self.fresh_var()),
                }
            }

            ExprKind::ModuleMember { .. } => Ok(self.fresh_var()),

            ExprKind::Match { scrutinee, arms } => {
                let subject = self.infer_expr(scrutinee)?;
                let result = self.fresh_var();

                for arm in arms {
                    self.push_scope();
                    let arm_result = (|| {
                        self.infer_pattern(&arm.pattern, subject)?;
                        if let Some(guard) = &arm.guard {
                            let gt = self.infer_expr(guard)?;
                            let boolean = self.insert(Ty::Bool);
                            self.unify(gt, boolean, &guard.loc)?;
                        }
                        let body_ty = self.infer_expr(&arm.body)?;
                        self.unify(result, body_ty, &arm.body.loc)
                    })();
                    self.pop_scope();
                    arm_result?;
                }

                Ok(result)
            }

            ExprKind::Block(exprs) => {
                self.push_scope();
                let mut last = Ok(self.insert(Ty::Unit));
                for e in exprs {
                    last = self.infer_expr(e);
                    if last.is_err() {
                        break;
                    }
                }
                self.pop_scope();
                last
            }
        }
    }

    fn arena_at(&self, t: TypeId) -> Ty {
        self.arena[t].clone()
    }

    /// Bind a pattern's variables against the scrutinee type. Bindings go
    /// into the current scope; shapes the pattern determines are unified,
    /// anything else gets a fresh variable.
    fn infer_pattern(&mut self, pattern: &Pattern, expected: TypeId) -> Result<(), TypeError> {
        match &pattern.kind {
            PatternKind::Wildcard => Ok(()),

            PatternKind::Var(name) => {
                self.define(name, Scheme::mono(expected));
                Ok(())
            }

            PatternKind::Int(_) => {
                let t = self.insert(Ty::Int);
                self.unify(expected, t, &pattern.loc)
            }
            PatternKind::Float(_) => {
                let t = self.insert(Ty::Float);
                self.unify(expected, t, &pattern.loc)
            }
            PatternKind::Str(_) => {
                let t = self.insert(Ty::Str);
                self.unify(expected, t, &pattern.loc)
            }
            PatternKind::Bool(_) => {
                let t = self.insert(Ty::Bool);
                self.unify(expected, t, &pattern.loc)
            }

            PatternKind::List { elements, rest } => {
                let elem = self.fresh_var();
                let list = self.insert(Ty::List(elem));
                self.unify(expected, list, &pattern.loc)?;
                for p in elements {
                    self.infer_pattern(p, elem)?;
                }
                if let Some(rest_name) = rest {
                    self.define(rest_name, Scheme::mono(list));
                }
                Ok(())
            }

            PatternKind::Tuple(elements) => {
                let tys: Vec<TypeId> = elements.iter().map(|_| self.fresh_var()).collect();
                let tuple = self.insert(Ty::Tuple(tys.clone()));
                self.unify(expected, tuple, &pattern.loc)?;
                for (p, t) in elements.iter().zip(tys.iter()) {
                    self.infer_pattern(p, *t)?;
                }
                Ok(())
            }

            PatternKind::Record(fields) => {
                // Structural subset: the scrutinee may carry extra fields,
                // so the record shape is not unified against it.
                let expected = self.find(expected);
                let known = match self.arena_at(expected) {
                    Ty::Record(fields) => fields,
                    _ => Vec::new(),
                };
                for (name, p) in fields {
                    let field_ty = known
                        .iter()
                        .find(|(n, _)| n == name)
                        .map(|(_, t)| *t)
                        .unwrap_or_else(|| self.fresh_var());
                    self.infer_pattern(p, field_ty)?;
                }
                Ok(())
            }

            PatternKind::Ctor { name, args } => match self.ctor_sig(name) {
                Some(sig) => {
                    if sig.fields.len() != args.len() {
                        return Err(TypeError {
                            msg: format!(
                                "Constructor {} expects {} arguments, got {}",
                                name,
                                sig.fields.len(),
                                args.len()
                            ),
                            loc: pattern.loc.clone(),
                        });
                    }
                    self.unify(expected, sig.ret, &pattern.loc)?;
                    for (p, field) in args.iter().zip(sig.fields.iter()) {
                        self.infer_pattern(p, *field)?;
                    }
                    Ok(())
                }
                None => {
                    // Unknown constructor: bind sub-patterns loosely
                    for p in args {
                        let fresh = self.fresh_var();
                        self.infer_pattern(p, fresh)?;
                    }
                    Ok(())
                }
            },
        }
    }
}
