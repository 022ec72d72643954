use super::*;

impl Evaluator {
    pub(super) fn eval_binop(
        &mut self,
        op: &BinOp,
        left: Value,
        right: Value,
        loc: &Loc,
    ) -> Result<Value, RuntimeError> {
        match op {
            BinOp::Eq => Ok(Value::Bool(left == right)),
            BinOp::Neq => Ok(Value::Bool(left != right)),
            BinOp::Add => self.op_add(left, right, loc),
            BinOp::Sub => self.op_arith(left, right, loc, "-", i64::wrapping_sub, |a, b| a - b),
            BinOp::Mul => self.op_arith(left, right, loc, "*", i64::wrapping_mul, |a, b| a * b),
            BinOp::Div => self.op_div(left, right, loc),
            BinOp::Mod => self.op_mod(left, right, loc),
            BinOp::Lt | BinOp::Gt | BinOp::Lte | BinOp::Gte => {
                self.op_compare(op, &left, &right, loc)
            }
            // Short-circuit operators are handled before operand evaluation
            BinOp::And | BinOp::Or => unreachable!("short-circuit ops evaluated in eval_expr"),
        }
    }

    /// `+` concatenates when the left operand is a string; the right operand
    /// is then required to be a string too.
    fn op_add(&mut self, left: Value, right: Value, loc: &Loc) -> Result<Value, RuntimeError> {
        match (left, right) {
            (Value::Str(a), Value::Str(b)) => Ok(Value::Str(a + &b)),
            (Value::Str(_), other) => Err(RuntimeError::new(
                format!(
                    "Operator '+' expects a String on the right, got {}",
                    crate::value::render_nested(&other)
                ),
                loc,
            )),
            (l, r) => self.op_arith(l, r, loc, "+", i64::wrapping_add, |a, b| a + b),
        }
    }

    /// Arithmetic with numeric promotion: if either operand is a float the
    /// result is a float, otherwise 64-bit wrapping integer arithmetic.
    fn op_arith(
        &mut self,
        left: Value,
        right: Value,
        loc: &Loc,
        sym: &str,
        int_op: fn(i64, i64) -> i64,
        float_op: fn(f64, f64) -> f64,
    ) -> Result<Value, RuntimeError> {
        match (left, right) {
            (Value::Int(a), Value::Int(b)) => Ok(Value::Int(int_op(a, b))),
            (Value::Float(a), Value::Float(b)) => Ok(Value::Float(float_op(a, b))),
            (Value::Int(a), Value::Float(b)) => Ok(Value::Float(float_op(a as f64, b))),
            (Value::Float(a), Value::Int(b)) => Ok(Value::Float(float_op(a, b as f64))),
            _ => Err(RuntimeError::new(
                format!("Operator '{}' expects numeric operands", sym),
                loc,
            )),
        }
    }

    fn op_div(&mut self, left: Value, right: Value, loc: &Loc) -> Result<Value, RuntimeError> {
        let zero = matches!(right, Value::Int(0)) || matches!(right, Value::Float(f) if f == 0.0);
        if zero {
            return Err(RuntimeError::new("Division by zero", loc));
        }
        match (left, right) {
            (Value::Int(a), Value::Int(b)) => Ok(Value::Int(a.wrapping_div(b))),
            (Value::Float(a), Value::Float(b)) => Ok(Value::Float(a / b)),
            (Value::Int(a), Value::Float(b)) => Ok(Value::Float(a as f64 / b)),
            (Value::Float(a), Value::Int(b)) => Ok(Value::Float(a / b as f64)),
            _ => Err(RuntimeError::new(
                "Operator '/' expects numeric operands",
                loc,
            )),
        }
    }

    /// `%` uses floating modulo, then truncates to int.
    fn op_mod(&mut self, left: Value, right: Value, loc: &Loc) -> Result<Value, RuntimeError> {
        let a = match &left {
            Value::Int(i) => *i as f64,
            Value::Float(f) => *f,
            _ => {
                return Err(RuntimeError::new(
                    "Operator '%' expects numeric operands",
                    loc,
                ))
            }
        };
        let b = match &right {
            Value::Int(i) => *i as f64,
            Value::Float(f) => *f,
            _ => {
                return Err(RuntimeError::new(
                    "Operator '%' expects numeric operands",
                    loc,
                ))
            }
        };
        if b == 0.0 {
            return Err(RuntimeError::new("Division by zero", loc));
        }
        Ok(Value::Int((a % b) as i64))
    }

    /// Comparisons: mixed int/float compare numerically; strings compare
    /// lexicographically.
    fn op_compare(
        &mut self,
        op: &BinOp,
        left: &Value,
        right: &Value,
        loc: &Loc,
    ) -> Result<Value, RuntimeError> {
        use std::cmp::Ordering;

        let ordering = match (left, right) {
            (Value::Int(a), Value::Int(b)) => a.cmp(b),
            (Value::Str(a), Value::Str(b)) => a.cmp(b),
            (Value::Float(a), Value::Float(b)) => float_cmp(*a, *b, loc)?,
            (Value::Int(a), Value::Float(b)) => float_cmp(*a as f64, *b, loc)?,
            (Value::Float(a), Value::Int(b)) => float_cmp(*a, *b as f64, loc)?,
            _ => {
                let sym = match op {
                    BinOp::Lt => "<",
                    BinOp::Gt => ">",
                    BinOp::Lte => "<=",
                    _ => ">=",
                };
                return Err(RuntimeError::new(
                    format!("Operator '{}' does not support these types", sym),
                    loc,
                ));
            }
        };

        let result = match op {
            BinOp::Lt => ordering == Ordering::Less,
            BinOp::Gt => ordering == Ordering::Greater,
            BinOp::Lte => ordering != Ordering::Greater,
            _ => ordering != Ordering::Less,
        };
        Ok(Value::Bool(result))
    }

    pub(super) fn eval_unop(
        &mut self,
        op: &UnOp,
        val: Value,
        loc: &Loc,
    ) -> Result<Value, RuntimeError> {
        match op {
            UnOp::Neg => match val {
                Value::Int(i) => Ok(Value::Int(i.wrapping_neg())),
                Value::Float(f) => Ok(Value::Float(-f)),
                _ => Err(RuntimeError::new("Cannot negate non-number", loc)),
            },
            UnOp::Not => match val {
                Value::Bool(b) => Ok(Value::Bool(!b)),
                _ => Err(RuntimeError::new("Operator '!' expects a Bool", loc)),
            },
        }
    }
}

fn float_cmp(a: f64, b: f64, loc: &Loc) -> Result<std::cmp::Ordering, RuntimeError> {
    a.partial_cmp(&b)
        .ok_or_else(|| RuntimeError::new("Cannot compare NaN", loc))
}
