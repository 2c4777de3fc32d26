use super::Access;
use crate::{
    analysis::{Analysis, NodeRef, Tracked},
    builtins::HostId,
    heap::{HeapObject, ObjectClass, PropertyDescriptor, PropertyKind, PropertyKnowledge},
    ops,
    registry::AllocSite,
    scope::VarKind,
    state::State,
    value::{Primitive, Single, Value},
};
use ast::*;
use atoms::{js_word, JsWord};

/// `{true, false}`
fn either_bool() -> Value {
    Value::from_singles([
        Single::Primitive(Primitive::Bool(true)),
        Single::Primitive(Primitive::Bool(false)),
    ])
}

fn all_nullish(value: &Value) -> bool {
    value.singles().map_or(false, |singles| {
        singles
            .iter()
            .all(|s| s.as_primitive().map_or(false, Primitive::is_nullish))
    })
}

impl<'a> Analysis<'a> {
    /// Evaluates an expression, recording what was learned about it.
    pub(crate) fn track_expr(&mut self, state: &mut State<'_>, expr: &Expr) -> Tracked {
        let tracked = self.eval_expr(state, expr);
        self.record(expr.node_id(), &tracked);
        self.notify(NodeRef::Expr(expr), state);
        tracked
    }

    fn eval_expr(&mut self, state: &mut State<'_>, expr: &Expr) -> Tracked {
        match expr {
            Expr::This(_) | Expr::Invalid(_) => Tracked::pure(Value::Unknown),
            Expr::Ident(i) => self.track_ident(state, i, true),
            Expr::Lit(lit) => self.track_lit(state, lit),
            Expr::Array(a) => {
                let mut pure = true;
                let mut elems = Vec::with_capacity(a.elems.len());
                for elem in &a.elems {
                    elems.push(elem.as_ref().map(|e| {
                        let t = self.track_expr(state, e);
                        pure &= t.pure;
                        t.value
                    }));
                }
                let r = self.allocate_array(state, a.node_id, elems);
                Tracked {
                    value: r.into(),
                    pure,
                }
            }
            Expr::Object(o) => self.track_object(state, o),
            Expr::Fn(f) => {
                let r = self.allocate_function(state, f.function.node_id);
                Tracked::pure(r.into())
            }
            Expr::Unary(e) => self.track_unary(state, e),
            Expr::Update(e) => self.track_update(state, e),
            Expr::Bin(e) if e.op.is_logical() => self.track_logical(state, e),
            Expr::Bin(e) => {
                let left = self.track_expr(state, &e.left);
                let right = self.track_expr(state, &e.right);
                let t = self.binary(state, e.op, &left.value, &right.value);
                Tracked {
                    value: t.value,
                    pure: left.pure && right.pure && t.pure,
                }
            }
            Expr::Assign(e) => self.track_assign(state, e),
            Expr::Member(m) => {
                let (obj, key, pure) = self.track_member_operands(state, m);
                let t = self.read_property(state, &obj, &key);
                Tracked {
                    value: t.value,
                    pure: pure && t.pure,
                }
            }
            Expr::Cond(e) => self.track_cond(state, e),
            Expr::Call(e) => self.track_call(state, e),
            Expr::New(e) => {
                let callee = self.track_expr(state, &e.callee);
                let args: Vec<Value> = e
                    .args
                    .iter()
                    .map(|arg| self.track_expr(state, arg).value)
                    .collect();
                self.construct(state, e.node_id, &callee.value, &args)
            }
            Expr::Seq(e) => {
                let mut last = Tracked::pure(Value::UNDEFINED);
                let mut pure = true;
                for expr in &e.exprs {
                    last = self.track_expr(state, expr);
                    pure &= last.pure;
                }
                Tracked {
                    value: last.value,
                    pure,
                }
            }
        }
    }

    /// Reads a variable. Reading a global that was never assigned, or a
    /// `let` before its declaration, throws unless `may_throw` is false as
    /// for the operand of `typeof`.
    pub(crate) fn track_ident(&mut self, state: &mut State<'_>, ident: &Ident, may_throw: bool) -> Tracked {
        let scopes = self.scopes;
        let var = match scopes.var_of(ident.node_id) {
            Some(var) => var,
            // `arguments`
            None => return Tracked::pure(Value::Unknown),
        };
        let v = scopes.var(var);
        let value = state.get_value(self, var);
        let unassigned = state.lookup(var).is_none() && scopes.initial_value(var).is_none();
        let throws = unassigned
            && (v.kind == VarKind::Implicit
                || (v.block_scoped && v.fn_scope == self.frame().scope));
        if throws && may_throw {
            self.frame_mut().effects = true;
            return Tracked::impure(value);
        }
        Tracked::pure(value)
    }

    fn track_lit(&mut self, state: &mut State<'_>, lit: &Lit) -> Tracked {
        let value = match lit {
            Lit::Str(s) => Value::string(s.value.clone()),
            Lit::Bool(b) => Value::bool(b.value),
            Lit::Null(_) => Value::NULL,
            Lit::Num(n) => Value::number(n.value),
            Lit::Regex(re) => {
                let r = self
                    .registry
                    .reference(AllocSite::Node(re.node_id, 0), ObjectClass::RegExp);
                let proto = self.registry.resolve_host(HostId::RegExpPrototype);
                let mut obj = HeapObject::new(Some(proto), PropertyKnowledge::KnowsAll);
                obj.insert(
                    JsWord::from("lastIndex"),
                    PropertyDescriptor {
                        enumerable: false,
                        ..PropertyDescriptor::data(Value::number(0.0))
                    },
                );
                self.allocate(state, r, obj);
                r.into()
            }
        };
        Tracked::pure(value)
    }

    fn track_object(&mut self, state: &mut State<'_>, o: &ObjectLit) -> Tracked {
        let r = self
            .registry
            .reference(AllocSite::Node(o.node_id, 0), ObjectClass::Object);
        let object_proto = self.registry.resolve_host(HostId::ObjectPrototype);
        let mut obj = HeapObject::new(Some(object_proto), PropertyKnowledge::KnowsAll);
        let mut pure = true;
        let mut unknown_key = false;

        for prop in &o.props {
            let name = match prop.key() {
                PropName::Ident(i) => Some(i.sym.clone()),
                PropName::Str(s) => Some(s.value.clone()),
                PropName::Num(n) => Some(ops::to_string(&Primitive::Number(n.value))),
                PropName::Computed(e) => {
                    let t = self.track_expr(state, e);
                    pure &= t.pure;
                    match self.property_names(state, &t.value) {
                        Some(mut names) if names.len() == 1 => Some(names.remove(0)),
                        _ => None,
                    }
                }
            };
            let computed = matches!(prop.key(), PropName::Computed(_));

            match prop {
                Prop::KeyValue(p) => {
                    let t = self.track_expr(state, &p.value);
                    pure &= t.pure;
                    match name {
                        Some(name) if name == js_word!("__proto__") && !computed => {
                            match t.value.as_single() {
                                Some(Single::Reference(proto)) => obj.proto = Some(*proto),
                                Some(Single::Primitive(Primitive::Null)) => obj.proto = None,
                                Some(Single::Primitive(_)) => {}
                                None => {
                                    self.escaped.extend(t.value.references());
                                    unknown_key = true;
                                }
                            }
                        }
                        Some(name) => obj.insert(name, PropertyDescriptor::data(t.value)),
                        None => {
                            self.escaped.extend(t.value.references());
                            unknown_key = true;
                        }
                    }
                }
                Prop::Getter(p) => {
                    let f = self.allocate_function(state, p.function.node_id);
                    match name {
                        Some(name) => {
                            let set = match obj.properties.get(&name).map(|d| &d.kind) {
                                Some(PropertyKind::Accessor { set, .. }) => *set,
                                _ => None,
                            };
                            obj.insert(name, PropertyDescriptor::accessor(Some(f), set));
                        }
                        None => {
                            self.escaped.insert(f);
                            unknown_key = true;
                        }
                    }
                }
                Prop::Setter(p) => {
                    let f = self.allocate_function(state, p.function.node_id);
                    match name {
                        Some(name) => {
                            let get = match obj.properties.get(&name).map(|d| &d.kind) {
                                Some(PropertyKind::Accessor { get, .. }) => *get,
                                _ => None,
                            };
                            obj.insert(name, PropertyDescriptor::accessor(get, Some(f)));
                        }
                        None => {
                            self.escaped.insert(f);
                            unknown_key = true;
                        }
                    }
                }
            }
        }

        if unknown_key {
            self.escaped.extend(obj.references());
            self.escaped.insert(r);
            obj = HeapObject::dirty();
        }
        self.allocate(state, r, obj);
        Tracked {
            value: r.into(),
            pure,
        }
    }

    fn type_of(&self, single: &Single) -> Value {
        match single {
            Single::Primitive(p) => Value::string(p.type_of()),
            Single::Reference(r) => match self.registry.class_of(*r) {
                ObjectClass::Function(_) => Value::string("function"),
                _ => Value::string("object"),
            },
        }
    }

    fn track_unary(&mut self, state: &mut State<'_>, e: &UnaryExpr) -> Tracked {
        match e.op {
            UnaryOp::TypeOf => {
                let arg = match &*e.arg {
                    Expr::Ident(i) => {
                        let t = self.track_ident(state, i, false);
                        self.record(i.node_id, &t);
                        self.notify(NodeRef::Expr(&e.arg), state);
                        t
                    }
                    arg => self.track_expr(state, arg),
                };
                Tracked {
                    value: arg.value.map(|s| self.type_of(s)),
                    pure: arg.pure,
                }
            }
            UnaryOp::Delete => match &*e.arg {
                Expr::Member(m) => {
                    let (obj, key, _) = self.track_member_operands(state, m);
                    let value = self.delete_property(state, &obj, &key);
                    Tracked::impure(value)
                }
                Expr::Ident(i) => {
                    // Only implicit globals can be deleted.
                    if let Some(var) = self.scopes.var_of(i.node_id) {
                        if self.scopes.var(var).kind == VarKind::Implicit {
                            state.set_value(self, var, Value::Unknown);
                        }
                    }
                    self.frame_mut().effects = true;
                    Tracked::impure(either_bool())
                }
                arg => {
                    let t = self.track_expr(state, arg);
                    Tracked {
                        value: Value::bool(true),
                        pure: t.pure,
                    }
                }
            },
            UnaryOp::Void => {
                let t = self.track_expr(state, &e.arg);
                Tracked {
                    value: Value::UNDEFINED,
                    pure: t.pure,
                }
            }
            UnaryOp::Bang => {
                let t = self.track_expr(state, &e.arg);
                let value = match t.value.truthiness() {
                    Some(b) => Value::bool(!b),
                    None => either_bool(),
                };
                Tracked {
                    value,
                    pure: t.pure,
                }
            }
            UnaryOp::Minus | UnaryOp::Plus | UnaryOp::Tilde => {
                let t = self.track_expr(state, &e.arg);
                if !self.to_primitive(state, &[&t.value]) {
                    return Tracked::impure(Value::Unknown);
                }
                let value = t.value.map(|s| {
                    s.as_primitive()
                        .and_then(|p| ops::unary(e.op, p))
                        .map_or(Value::Unknown, Value::from)
                });
                Tracked {
                    value,
                    pure: t.pure,
                }
            }
        }
    }

    fn delete_property(&mut self, state: &mut State<'_>, obj: &Value, key: &Value) -> Value {
        let name = match self.property_names(state, key) {
            Some(mut names) if names.len() == 1 => names.remove(0),
            _ => {
                for r in obj.references() {
                    state.make_dirty(self, r);
                }
                return either_bool();
            }
        };
        let singles = match obj.singles() {
            Some(singles) => singles.to_vec(),
            None => {
                self.unknown_call(state, []);
                return either_bool();
            }
        };

        let mut results = vec![];
        for single in singles {
            let r = match single {
                Single::Primitive(p) => {
                    if p.is_nullish() {
                        self.frame_mut().effects = true;
                    }
                    results.push(Single::Primitive(Primitive::Bool(true)));
                    results.push(Single::Primitive(Primitive::Bool(false)));
                    continue;
                }
                Single::Reference(r) => r,
            };
            let current = state.dereference(self.registry, r);
            if current.dirty {
                state.make_dirty(self, r);
                results.push(Single::Primitive(Primitive::Bool(true)));
                results.push(Single::Primitive(Primitive::Bool(false)));
                continue;
            }
            match current.properties.get(&name) {
                Some(desc) if !desc.configurable => {
                    results.push(Single::Primitive(Primitive::Bool(false)));
                }
                Some(_) => {
                    let updated = current.without_property(&name);
                    state.update_object(self, r, updated);
                    results.push(Single::Primitive(Primitive::Bool(true)));
                }
                None if current.knowledge >= PropertyKnowledge::NoUnknownOverride => {
                    results.push(Single::Primitive(Primitive::Bool(true)));
                }
                None => {
                    state.make_dirty(self, r);
                    results.push(Single::Primitive(Primitive::Bool(true)));
                    results.push(Single::Primitive(Primitive::Bool(false)));
                }
            }
        }
        Value::from_singles(results)
    }

    /// The old value converted to a number, and the new value.
    fn update_values(&mut self, state: &mut State<'_>, old: &Value, op: UpdateOp) -> (Value, Value) {
        if !self.to_primitive(state, &[old]) {
            return (Value::Unknown, Value::Unknown);
        }
        let delta = match op {
            UpdateOp::PlusPlus => 1.0,
            UpdateOp::MinusMinus => -1.0,
        };
        let old = old.map(|s| {
            s.as_primitive()
                .map_or(Value::Unknown, |p| Value::number(ops::to_number(p)))
        });
        let new = old.map(|s| match s.as_primitive() {
            Some(Primitive::Number(n)) => Value::number(n + delta),
            _ => Value::Unknown,
        });
        (old, new)
    }

    fn track_update(&mut self, state: &mut State<'_>, e: &UpdateExpr) -> Tracked {
        let (old, new) = match &*e.arg {
            Expr::Ident(i) => {
                let old = self.track_ident(state, i, true);
                let (old, new) = self.update_values(state, &old.value, e.op);
                self.assign_ident(state, i, new.clone());
                (old, new)
            }
            Expr::Member(m) => {
                let (obj, key, _) = self.track_member_operands(state, m);
                let old = self.read_property(state, &obj, &key);
                let (old, new) = self.update_values(state, &old.value, e.op);
                self.write_property(state, &obj, &key, &new);
                (old, new)
            }
            arg => {
                self.track_expr(state, arg);
                // ReferenceError.
                self.frame_mut().effects = true;
                (Value::Unknown, Value::Unknown)
            }
        };
        Tracked::impure(if e.prefix { new } else { old })
    }

    fn track_logical(&mut self, state: &mut State<'_>, e: &BinExpr) -> Tracked {
        let left = self.track_expr(state, &e.left);
        let is_or = e.op == BinaryOp::LogicalOr;
        match left.value.truthiness() {
            Some(truthy) if truthy == is_or => left,
            Some(_) => {
                let right = self.track_expr(state, &e.right);
                Tracked {
                    value: right.value,
                    pure: left.pure && right.pure,
                }
            }
            None => {
                let mut child = state.child();
                let right = self.track_expr(&mut child, &e.right);
                let delta = child.into_delta();
                state.merge_maybe(self, delta);
                let kept = left.value.filter(|s| s.truthy() == is_or);
                Tracked {
                    value: self.join(&kept, &right.value),
                    pure: left.pure && right.pure,
                }
            }
        }
    }

    fn track_cond(&mut self, state: &mut State<'_>, e: &CondExpr) -> Tracked {
        let test = self.track_expr(state, &e.test);
        match test.value.truthiness() {
            Some(truthy) => {
                let branch = if truthy { &e.cons } else { &e.alt };
                let t = self.track_expr(state, branch);
                Tracked {
                    value: t.value,
                    pure: test.pure && t.pure,
                }
            }
            None => {
                let mut a = state.child();
                let cons = self.track_expr(&mut a, &e.cons);
                let a = a.into_delta();
                let mut b = state.child();
                let alt = self.track_expr(&mut b, &e.alt);
                let b = b.into_delta();
                state.merge_or(self, a, b);
                Tracked {
                    value: self.join(&cons.value, &alt.value),
                    pure: test.pure && cons.pure && alt.pure,
                }
            }
        }
    }

    /// Applies a non-logical binary operator.
    pub(crate) fn binary(&mut self, state: &mut State<'_>, op: BinaryOp, left: &Value, right: &Value) -> Tracked {
        match op {
            BinaryOp::EqEqEq | BinaryOp::NotEqEq => {
                let negate = op == BinaryOp::NotEqEq;
                let value = left.product(right, |a, b| match (a, b) {
                    (Single::Primitive(a), Single::Primitive(b)) => {
                        Value::bool(ops::strict_equals(a, b) != negate)
                    }
                    // One site may stand for many objects.
                    (Single::Reference(a), Single::Reference(b)) if a == b => either_bool(),
                    _ => Value::bool(negate),
                });
                Tracked::pure(if value.is_unknown() { either_bool() } else { value })
            }
            BinaryOp::EqEq | BinaryOp::NotEq => {
                let negate = op == BinaryOp::NotEq;
                if all_nullish(left) || all_nullish(right) {
                    // Comparing against null never converts the other side.
                    let value = left.product(right, |a, b| match (a, b) {
                        (Single::Primitive(a), Single::Primitive(b)) => {
                            Value::bool(ops::loose_equals(a, b) != negate)
                        }
                        _ => Value::bool(negate),
                    });
                    return Tracked::pure(if value.is_unknown() { either_bool() } else { value });
                }
                let mixed = left.singles().zip(right.singles()).map_or(true, |(ls, rs)| {
                    ls.iter().any(|l| {
                        rs.iter().any(|r| {
                            matches!(
                                (l, r),
                                (Single::Reference(_), Single::Primitive(_))
                                    | (Single::Primitive(_), Single::Reference(_))
                            )
                        })
                    })
                });
                if mixed {
                    self.to_primitive(state, &[left, right]);
                    return Tracked::impure(either_bool());
                }
                let value = left.product(right, |a, b| match (a, b) {
                    (Single::Primitive(a), Single::Primitive(b)) => {
                        Value::bool(ops::loose_equals(a, b) != negate)
                    }
                    (Single::Reference(a), Single::Reference(b)) if a == b => either_bool(),
                    _ => Value::bool(negate),
                });
                Tracked::pure(value)
            }
            BinaryOp::In => self.has_property(state, left, right),
            BinaryOp::InstanceOf => self.instance_of(state, left, right),
            BinaryOp::LogicalOr | BinaryOp::LogicalAnd => Tracked::impure(Value::Unknown),
            _ => {
                if !self.to_primitive(state, &[left, right]) {
                    return Tracked::impure(Value::Unknown);
                }
                let value = left.product(right, |a, b| {
                    match (a.as_primitive(), b.as_primitive()) {
                        (Some(a), Some(b)) => ops::binary(op, a, b).map_or(Value::Unknown, Value::from),
                        _ => Value::Unknown,
                    }
                });
                Tracked::pure(value)
            }
        }
    }

    /// `key in obj`
    fn has_property(&mut self, state: &mut State<'_>, key: &Value, obj: &Value) -> Tracked {
        let singles = match obj.singles() {
            Some(singles) if singles.iter().all(|s| s.as_reference().is_some()) => singles.to_vec(),
            _ => {
                // TypeError for primitives.
                self.frame_mut().effects = true;
                self.to_primitive(state, &[key]);
                return Tracked::impure(either_bool());
            }
        };
        let names = match self.property_names(state, key) {
            Some(names) => names,
            None => return Tracked::impure(either_bool()),
        };

        let mut results = vec![];
        for r in singles.iter().filter_map(Single::as_reference) {
            let heap_obj = state.dereference(self.registry, r);
            let mut access = Access {
                cx: self,
                state,
                impure: false,
            };
            for name in &names {
                match heap_obj.has(name, &mut access) {
                    Some(b) => results.push(Single::Primitive(Primitive::Bool(b))),
                    None => return Tracked::pure(either_bool()),
                }
            }
        }
        Tracked::pure(Value::from_singles(results))
    }

    /// `value instanceof callee`
    fn instance_of(&mut self, state: &mut State<'_>, value: &Value, callee: &Value) -> Tracked {
        let is_function = callee.as_reference().map_or(false, |r| {
            matches!(self.registry.class_of(r), ObjectClass::Function(Some(_)))
        });
        if !is_function {
            self.frame_mut().effects = true;
            return Tracked::impure(either_bool());
        }
        let proto = self.read_property(state, callee, &Value::string(js_word!("prototype")));
        let proto = match proto.value.as_reference() {
            Some(r) if proto.pure => r,
            _ => {
                // TypeError when `prototype` isn't an object.
                self.frame_mut().effects = true;
                return Tracked::impure(either_bool());
            }
        };

        let singles = match value.singles() {
            Some(singles) => singles.to_vec(),
            None => return Tracked::pure(either_bool()),
        };
        let mut results = vec![];
        for single in singles {
            match single {
                Single::Primitive(_) => results.push(Single::Primitive(Primitive::Bool(false))),
                Single::Reference(r) => {
                    let obj = state.dereference(self.registry, r);
                    let mut access = Access {
                        cx: self,
                        state,
                        impure: false,
                    };
                    match obj.is_instance_of(proto, &mut access) {
                        Some(b) => results.push(Single::Primitive(Primitive::Bool(b))),
                        None => return Tracked::pure(either_bool()),
                    }
                }
            }
        }
        Tracked::pure(Value::from_singles(results))
    }

    pub(crate) fn assign_ident(&mut self, state: &mut State<'_>, ident: &Ident, value: Value) {
        let scopes = self.scopes;
        let var = match scopes.var_of(ident.node_id) {
            Some(var) => var,
            None => return,
        };
        if scopes.var(var).kind == VarKind::Const {
            // TypeError.
            self.frame_mut().effects = true;
            return;
        }
        state.set_value(self, var, value);
    }

    fn track_assign(&mut self, state: &mut State<'_>, e: &AssignExpr) -> Tracked {
        match &*e.left {
            Expr::Ident(i) => {
                let value = match e.op.to_binary_op() {
                    None => self.track_expr(state, &e.right).value,
                    Some(op) => {
                        let old = self.track_ident(state, i, true);
                        let right = self.track_expr(state, &e.right);
                        self.binary(state, op, &old.value, &right.value).value
                    }
                };
                self.assign_ident(state, i, value.clone());
                Tracked::impure(value)
            }
            Expr::Member(m) => {
                let (obj, key, _) = self.track_member_operands(state, m);
                let value = match e.op.to_binary_op() {
                    None => self.track_expr(state, &e.right).value,
                    Some(op) => {
                        let old = self.read_property(state, &obj, &key);
                        let right = self.track_expr(state, &e.right);
                        self.binary(state, op, &old.value, &right.value).value
                    }
                };
                self.write_property(state, &obj, &key, &value);
                Tracked::impure(value)
            }
            left => {
                self.track_expr(state, left);
                let right = self.track_expr(state, &e.right);
                // ReferenceError.
                self.frame_mut().effects = true;
                Tracked::impure(right.value)
            }
        }
    }

    /// Evaluates the object and key of a member expression.
    pub(crate) fn track_member_operands(&mut self, state: &mut State<'_>, m: &MemberExpr) -> (Value, Value, bool) {
        let obj = self.track_expr(state, &m.obj);
        let (key, pure) = match &m.prop {
            MemberProp::Ident(i) => (Value::string(i.sym.clone()), true),
            MemberProp::Computed(e) => {
                let t = self.track_expr(state, e);
                (t.value, t.pure)
            }
        };
        (obj.value, key, obj.pure && pure)
    }

    fn track_call(&mut self, state: &mut State<'_>, e: &CallExpr) -> Tracked {
        let (callee, this, mut pure) = match &*e.callee {
            Expr::Member(m) => {
                let (obj, key, operands_pure) = self.track_member_operands(state, m);
                let t = self.read_property(state, &obj, &key);
                let t = Tracked {
                    value: t.value,
                    pure: operands_pure && t.pure,
                };
                self.record(m.node_id, &t);
                self.notify(NodeRef::Expr(&e.callee), state);
                (t.value, obj, t.pure)
            }
            callee => {
                let t = self.track_expr(state, callee);
                (t.value, Value::UNDEFINED, t.pure)
            }
        };
        let mut args = Vec::with_capacity(e.args.len());
        for arg in &e.args {
            let t = self.track_expr(state, arg);
            pure &= t.pure;
            args.push(t.value);
        }
        let t = self.call(state, &callee, &this, &args);
        Tracked {
            value: t.value,
            pure: pure && t.pure,
        }
    }

    /// `new callee(...args)`
    fn construct(&mut self, state: &mut State<'_>, node: NodeId, callee: &Value, args: &[Value]) -> Tracked {
        let roots: Vec<_> = callee
            .references()
            .chain(args.iter().flat_map(Value::references))
            .collect();
        let function = callee
            .as_reference()
            .and_then(|r| self.registry.function_node(r));
        let function = match function {
            Some(function) => function,
            None => {
                self.unknown_call(state, roots);
                return Tracked::impure(Value::Unknown);
            }
        };

        let proto = self.read_property(state, callee, &Value::string(js_word!("prototype")));
        let uses_this = self
            .scopes
            .function(function)
            .map_or(true, |info| info.uses_this);
        let instance = self
            .registry
            .reference(AllocSite::Node(node, 0), ObjectClass::Object);
        let obj = match proto.value.as_single() {
            _ if uses_this => None,
            Some(Single::Reference(proto)) => Some(HeapObject::new(
                Some(*proto),
                PropertyKnowledge::KnowsAll,
            )),
            Some(Single::Primitive(_)) => {
                let proto = self.registry.resolve_host(HostId::ObjectPrototype);
                Some(HeapObject::new(Some(proto), PropertyKnowledge::KnowsAll))
            }
            None => None,
        };
        let obj = match obj {
            Some(obj) => obj,
            None => {
                self.escaped.insert(instance);
                HeapObject::dirty()
            }
        };
        self.allocate(state, instance, obj);

        self.observe_call(function, args);
        let summary = self.prev.summaries.get(&function).cloned();
        match summary {
            Some(summary) if summary.pure => {}
            _ => {
                let roots: Vec<_> = std::iter::once(instance).chain(roots).collect();
                self.unknown_call(state, roots);
            }
        }
        let returns_primitive = self
            .prev
            .summaries
            .get(&function)
            .map_or(false, |summary| summary.returns.is_primitive());
        let value = if returns_primitive {
            instance.into()
        } else {
            self.escaped.insert(instance);
            Value::Unknown
        };
        Tracked::impure(value)
    }
}
