use super::*;

impl Evaluator {
    pub(super) fn eval_match(
        &mut self,
        subject: Value,
        arms: &[MatchArm],
        env: &EnvRef,
        loc: &Loc,
    ) -> Result<Value, RuntimeError> {
        for arm in arms {
            let bindings = match self.match_pattern(&arm.pattern, &subject)? {
                Some(b) => b,
                None => continue,
            };

            // Bindings live in a scope private to this arm; a failing guard
            // drops the scope, so nothing leaks to the caller.
            let arm_env = Environment::extend(env);
            for (name, val) in bindings {
                arm_env.borrow_mut().insert(&name, val);
            }

            if let Some(guard) = &arm.guard {
                let guard_val = self.eval_expr(guard, &arm_env)?;
                let guard_val = self.force(guard_val)?;
                match guard_val {
                    Value::Bool(true) => {}
                    Value::Bool(false) => continue,
                    _ => {
                        return Err(RuntimeError::new(
                            "match guard must be a Bool",
                            &guard.loc,
                        ))
                    }
                }
            }

            return self.eval_expr(&arm.body, &arm_env);
        }

        Err(RuntimeError::new("No matching pattern", loc))
    }

    /// Returns the bindings a successful match introduces, or None if the
    /// pattern does not match. Bindings are only applied by the caller once
    /// the whole pattern has matched, so a failure cannot leak partial ones.
    pub(super) fn match_pattern(
        &mut self,
        pattern: &Pattern,
        value: &Value,
    ) -> Result<Option<Vec<(String, Value)>>, RuntimeError> {
        let value = self.force(value.clone())?;

        match &pattern.kind {
            PatternKind::Wildcard => Ok(Some(Vec::new())),

            PatternKind::Var(name) => Ok(Some(vec![(name.clone(), value)])),

            PatternKind::Int(i) => Ok(matches!(&value, Value::Int(v) if v == i).then(Vec::new)),
            PatternKind::Float(f) => {
                Ok(matches!(&value, Value::Float(v) if v == f).then(Vec::new))
            }
            PatternKind::Str(s) => Ok(matches!(&value, Value::Str(v) if v == s).then(Vec::new)),
            PatternKind::Bool(b) => Ok(matches!(&value, Value::Bool(v) if v == b).then(Vec::new)),

            PatternKind::List { elements, rest } => {
                let items = match value {
                    Value::List(items) => items,
                    _ => return Ok(None),
                };

                match rest {
                    Some(rest_name) => {
                        if items.len() < elements.len() {
                            return Ok(None);
                        }
                        let mut bindings = Vec::new();
                        for (pat, item) in elements.iter().zip(items.iter()) {
                            match self.match_pattern(pat, item)? {
                                Some(b) => bindings.extend(b),
                                None => return Ok(None),
                            }
                        }
                        let remainder = items[elements.len()..].to_vec();
                        bindings.push((rest_name.clone(), Value::List(remainder)));
                        Ok(Some(bindings))
                    }
                    None => {
                        if items.len() != elements.len() {
                            return Ok(None);
                        }
                        self.match_all(elements, &items)
                    }
                }
            }

            PatternKind::Tuple(elements) => {
                let items = match value {
                    Value::Tuple(items) => items,
                    _ => return Ok(None),
                };
                if items.len() != elements.len() {
                    return Ok(None);
                }
                self.match_all(elements, &items)
            }

            PatternKind::Record(fields) => {
                let record_fields = match value {
                    Value::Record(fields) => fields,
                    _ => return Ok(None),
                };
                // Every listed key must be present; extra fields are ignored
                let mut bindings = Vec::new();
                for (name, pat) in fields {
                    let field_val = match record_fields.iter().find(|(k, _)| k == name) {
                        Some((_, v)) => v,
                        None => return Ok(None),
                    };
                    match self.match_pattern(pat, field_val)? {
                        Some(b) => bindings.extend(b),
                        None => return Ok(None),
                    }
                }
                Ok(Some(bindings))
            }

            PatternKind::Ctor { name, args } => {
                let adt = match value {
                    Value::Adt(adt) => adt,
                    _ => return Ok(None),
                };
                if adt.ctor != *name || adt.fields.len() != args.len() {
                    return Ok(None);
                }
                self.match_all(args, &adt.fields)
            }
        }
    }

    fn match_all(
        &mut self,
        patterns: &[Pattern],
        values: &[Value],
    ) -> Result<Option<Vec<(String, Value)>>, RuntimeError> {
        let mut bindings = Vec::new();
        for (pat, val) in patterns.iter().zip(values.iter()) {
            match self.match_pattern(pat, val)? {
                Some(b) => bindings.extend(b),
                None => return Ok(None),
            }
        }
        Ok(Some(bindings))
    }
}
