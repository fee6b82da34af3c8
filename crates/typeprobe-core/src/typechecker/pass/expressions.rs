use super::{BodyMode, CheckPass, FunctionParts};
use crate::ast::expression::{
    ArrayElement, AssignmentOp, BinaryOp, Expression, ExpressionKind, IndexExpression, Literal,
    MemberExpression, ObjectProperty, UnaryOp,
};
use crate::ast::{format_number, MAX_NESTING_DEPTH, NESTED_TOO_DEEPLY};
use crate::span::Span;
use crate::typechecker::symbol_table::SymbolKind;
use crate::typechecker::types::{
    Intrinsic, LiteralValue, ObjectShape, PropertyInfo, Signature, TypeData, TypeId,
};

const CONVERSION_HINT: &str = "If this was intentional, convert the expression to 'unknown' first.";

impl<'a> CheckPass<'a> {
    /// Type of `expression`, recorded on its node
    pub(super) fn check_expression(&mut self, expression: &'a Expression, contextual: Option<TypeId>) -> TypeId {
        if self.expression_depth >= MAX_NESTING_DEPTH {
            self.error(expression.span, NESTED_TOO_DEEPLY);
            let any = self.common().any;
            self.checker.record_node_type(expression.id, any);
            return any;
        }
        self.expression_depth += 1;
        let type_id = self.expression_type(expression, contextual);
        self.expression_depth -= 1;
        self.checker.record_node_type(expression.id, type_id);
        type_id
    }

    fn expression_type(&mut self, expression: &'a Expression, contextual: Option<TypeId>) -> TypeId {
        let common = self.common();
        let fresh = self.const_context == 0;
        match &expression.kind {
            ExpressionKind::Identifier(name) => self.check_identifier(name, expression.span),
            ExpressionKind::Literal(literal) => match literal {
                Literal::Null => common.null,
                Literal::Boolean(value) => self.store().boolean_literal(*value, fresh),
                Literal::Number(value) => self.store().number_literal(*value, fresh),
                Literal::String(value) => self.store().string_literal(value, fresh),
            },
            ExpressionKind::Template(template) => {
                if template.has_substitutions {
                    common.string
                } else {
                    self.store().string_literal(&template.value, fresh)
                }
            }
            ExpressionKind::Array(elements) => self.check_array(elements, contextual),
            ExpressionKind::Object(properties) => self.check_object(properties, contextual),
            ExpressionKind::Function(function) => {
                let parts = FunctionParts::from_function_expression(function);
                self.this_types.push(common.any);
                let type_id = self.check_function_like(&parts, contextual);
                self.this_types.pop();
                type_id
            }
            ExpressionKind::Arrow(arrow) => {
                let parts = FunctionParts::from_arrow(arrow);
                self.check_function_like(&parts, contextual)
            }
            ExpressionKind::Call(call) => self.check_call(call, expression.span),
            ExpressionKind::New(new) => self.check_new(new, expression.span),
            ExpressionKind::Member(member) => self.check_member(member),
            ExpressionKind::Index(index) => self.check_index(index),
            ExpressionKind::Unary(op, operand) => self.check_unary(*op, operand),
            ExpressionKind::Postfix(_, operand) => {
                let operand_type = self.check_expression(operand, None);
                self.check_arithmetic_operand(operand_type, operand.span);
                common.number
            }
            ExpressionKind::Binary(op, left, right) => self.check_binary(*op, left, right, contextual),
            ExpressionKind::Assignment(target, op, value) => self.check_assignment(target, *op, value),
            ExpressionKind::Conditional(condition, when_true, when_false) => {
                self.check_expression(condition, None);
                let a = self.check_expression(when_true, contextual);
                let b = self.check_expression(when_false, contextual);
                self.store().union(vec![a, b])
            }
            ExpressionKind::TypeAssertion(inner, annotation) => {
                let target = self.resolve_type(annotation);
                let source = self.check_expression(inner, Some(target));
                self.check_conversion(source, target, expression.span);
                target
            }
            ExpressionKind::ConstAssertion(inner) => {
                self.const_context += 1;
                let type_id = self.check_expression(inner, contextual);
                self.const_context -= 1;
                self.store().regular_literal(type_id)
            }
            ExpressionKind::NonNull(inner) => {
                let type_id = self.check_expression(inner, contextual);
                self.store().non_nullable(type_id)
            }
            ExpressionKind::Parenthesized(inner) => self.check_expression(inner, contextual),
            ExpressionKind::This => self.this_types.last().copied().unwrap_or(common.any),
        }
    }

    fn check_identifier(&mut self, name: &str, span: Span) -> TypeId {
        if let Some(symbol) = self.symbols.lookup_value(self.scope, name) {
            return self.value_type_of_symbol(symbol);
        }
        if name == "undefined" {
            return self.common().undefined;
        }
        let message = if self.symbols.lookup_type(self.scope, name).is_some() {
            format!("'{}' only refers to a type, but is being used as a value here.", name)
        } else {
            format!("Cannot find name '{}'.", name)
        };
        self.error(span, message);
        self.common().any
    }

    fn check_array(&mut self, elements: &'a [ArrayElement], contextual: Option<TypeId>) -> TypeId {
        let as_tuple = self.const_context > 0 || self.is_tuple_context(contextual);
        let mut types = Vec::with_capacity(elements.len());
        // A spread of anything but a tuple makes the length unknown
        let mut fixed_length = true;

        for (index, element) in elements.iter().enumerate() {
            match element {
                ArrayElement::Expression(value) => {
                    let element_context = self.contextual_element_type(contextual, index);
                    let actual = self.check_expression(value, element_context);
                    let actual = if as_tuple || self.is_literal_context(element_context) {
                        self.store().regular_literal(actual)
                    } else {
                        self.store().widen_literal(actual)
                    };
                    types.push(actual);
                }
                ArrayElement::Spread(value) => {
                    let spread = self.check_expression(value, contextual);
                    match &*self.store().data(spread) {
                        TypeData::Tuple { elements, .. } => types.extend(elements.iter().copied()),
                        TypeData::Array { element, .. } => {
                            fixed_length = false;
                            types.push(*element);
                        }
                        _ if spread == self.common().any => {
                            fixed_length = false;
                            types.push(spread);
                        }
                        _ => {
                            let message = format!(
                                "Type '{}' is not an array type.",
                                self.display(spread)
                            );
                            self.error(value.span, message);
                            fixed_length = false;
                        }
                    }
                }
            }
        }

        let readonly = self.const_context > 0;
        if as_tuple && fixed_length {
            return self.store().tuple(types, readonly);
        }
        let element = self.store().union(types);
        self.store().array(element, readonly)
    }

    fn check_object(&mut self, properties: &'a [ObjectProperty], contextual: Option<TypeId>) -> TypeId {
        let readonly = self.const_context > 0;
        let mut shape = ObjectShape::default();

        for property in properties {
            match property {
                ObjectProperty::Property { key, value, .. } => {
                    let property_context = self.contextual_property_type(contextual, &key.node);
                    let actual = self.check_expression(value, property_context);
                    let type_id = self.widen_property(actual, property_context);
                    shape.set_property(PropertyInfo::new(&key.node, type_id).readonly(readonly));
                }
                ObjectProperty::Shorthand(name) => {
                    let property_context = self.contextual_property_type(contextual, &name.node);
                    let actual = self.check_identifier(&name.node, name.span);
                    let type_id = self.widen_property(actual, property_context);
                    shape.set_property(PropertyInfo::new(&name.node, type_id).readonly(readonly));
                }
                ObjectProperty::Method { key, function, .. } => {
                    let property_context = self.contextual_property_type(contextual, &key.node);
                    let parts = FunctionParts::from_function_expression(function);
                    let any = self.common().any;
                    self.this_types.push(any);
                    let method = self.check_function_like(&parts, property_context);
                    self.this_types.pop();
                    shape.set_property(
                        PropertyInfo::new(&key.node, method)
                            .readonly(readonly)
                            .method(true),
                    );
                }
                ObjectProperty::Spread { value, .. } => {
                    let spread = self.check_expression(value, None);
                    self.ensure_named_templates(spread);
                    for spread_property in self.checker.properties_of_type(spread) {
                        shape.set_property(spread_property);
                    }
                }
            }
        }

        self.store().object(shape)
    }

    /// Property type in an object literal: literals widen unless the
    /// context asks for them
    fn widen_property(&self, actual: TypeId, contextual: Option<TypeId>) -> TypeId {
        if self.const_context > 0 || self.is_literal_context(contextual) {
            self.store().regular_literal(actual)
        } else {
            self.store().widen_literal(actual)
        }
    }

    fn check_function_like(&mut self, parts: &FunctionParts<'a>, contextual: Option<TypeId>) -> TypeId {
        let contextual_signature = self.contextual_signature(contextual);
        let saved_const = std::mem::replace(&mut self.const_context, 0);
        let signature = self.function_signature(parts, contextual_signature.as_ref(), BodyMode::Expression);
        self.const_context = saved_const;
        self.store().function(signature)
    }

    // Member access

    fn check_member(&mut self, member: &'a MemberExpression) -> TypeId {
        let object = self.check_expression(&member.object, None);
        let Some((base, nullish)) = self.access_base(object, member.optional, member.object.span) else {
            return self.common().any;
        };
        let property = self.property_access_type(base, &member.property.node, member.property.span);
        self.with_optional_chain(property, member.optional && nullish)
    }

    fn check_index(&mut self, index: &'a IndexExpression) -> TypeId {
        let object = self.check_expression(&index.object, None);
        let key = self.check_expression(&index.index, None);
        let Some((base, nullish)) = self.access_base(object, index.optional, index.object.span) else {
            return self.common().any;
        };
        let element = self.element_access_type(base, key, index.index.span);
        self.with_optional_chain(element, index.optional && nullish)
    }

    /// The non-nullable part of an accessed object and whether it had a
    /// nullable part; `None` when nothing is left to access
    fn access_base(&mut self, object: TypeId, optional: bool, span: Span) -> Option<(TypeId, bool)> {
        let nullish = self.nullish_members(object);
        if nullish.is_empty() {
            return Some((object, false));
        }
        if !optional {
            let common = self.common();
            let message = match (nullish.contains(&common.null), nullish.contains(&common.undefined)) {
                (true, true) => "Object is possibly 'null' or 'undefined'.",
                (true, false) => "Object is possibly 'null'.",
                _ => "Object is possibly 'undefined'.",
            };
            self.error(span, message);
        }
        let base = self.store().non_nullable(object);
        if base == self.common().never {
            return None;
        }
        Some((base, true))
    }

    fn with_optional_chain(&self, type_id: TypeId, short_circuits: bool) -> TypeId {
        if short_circuits {
            self.store().union(vec![type_id, self.common().undefined])
        } else {
            type_id
        }
    }

    /// Type of `base.name`
    pub(super) fn property_access_type(&mut self, base: TypeId, name: &str, span: Span) -> TypeId {
        let common = self.common();
        if base == common.any {
            return common.any;
        }
        if base == common.unknown {
            self.error(span, "Object is of type 'unknown'.");
            return common.any;
        }

        self.ensure_named_templates(base);
        let shape = self.checker.apparent_shape(base);
        if let Some(property) = shape.property(name) {
            return self.optional_property_type(property);
        }
        if let Some(index) = shape.string_index {
            return index;
        }
        let message = format!(
            "Property '{}' does not exist on type '{}'.",
            name,
            self.display(base)
        );
        self.error(span, message);
        common.any
    }

    fn optional_property_type(&self, property: &PropertyInfo) -> TypeId {
        if property.optional && self.strict_null_checks() {
            self.store().union(vec![property.type_id, self.common().undefined])
        } else {
            property.type_id
        }
    }

    /// Type of `object[key]`
    fn element_access_type(&mut self, object: TypeId, key: TypeId, span: Span) -> TypeId {
        let common = self.common();
        if object == common.any || key == common.any {
            return common.any;
        }
        if object == common.unknown {
            self.error(span, "Object is of type 'unknown'.");
            return common.any;
        }

        self.ensure_named_templates(object);
        let shape = self.checker.apparent_shape(object);
        let tuple_length = match &*self.store().data(object) {
            TypeData::Tuple { elements, .. } => Some(elements.len()),
            _ => None,
        };

        let mut results = Vec::new();
        for member in self.store().union_members(key) {
            let found = match &*self.store().data(member) {
                TypeData::Literal {
                    value: LiteralValue::String(name),
                    ..
                } => shape
                    .property(name)
                    .map(|p| self.optional_property_type(p))
                    .or(shape.string_index),
                TypeData::Literal {
                    value: LiteralValue::Number(number),
                    ..
                } => {
                    let position = number.value();
                    if let Some(length) = tuple_length.filter(|length| position >= *length as f64) {
                        let message = format!(
                            "Tuple type '{}' of length '{}' has no element at index '{}'.",
                            self.display(object),
                            length,
                            format_number(position)
                        );
                        self.error(span, message);
                        Some(common.any)
                    } else {
                        shape
                            .property(&format_number(position))
                            .map(|p| self.optional_property_type(p))
                            .or(shape.number_index)
                            .or(shape.string_index)
                    }
                }
                TypeData::Intrinsic(Intrinsic::Number) => shape.number_index.or(shape.string_index),
                TypeData::Intrinsic(Intrinsic::String) => shape.string_index,
                _ => None,
            };

            match found {
                Some(type_id) => results.push(type_id),
                None => {
                    if self.checker.options().no_implicit_any_enabled() {
                        let message = format!(
                            "Element implicitly has an 'any' type because expression of type '{}' can't be used to index type '{}'.",
                            self.display(member),
                            self.display(object)
                        );
                        self.error(span, message);
                    }
                    results.push(common.any);
                }
            }
        }
        self.store().union(results)
    }

    // Operators

    fn check_unary(&mut self, op: UnaryOp, operand: &'a Expression) -> TypeId {
        let operand_type = self.check_expression(operand, None);
        let common = self.common();
        match op {
            UnaryOp::Not => common.boolean,
            UnaryOp::Negate => {
                if let TypeData::Literal {
                    value: LiteralValue::Number(number),
                    ..
                } = &*self.store().data(operand_type)
                {
                    return self.store().number_literal(-number.value(), self.const_context == 0);
                }
                self.numeric_result(operand_type, operand.span)
            }
            UnaryOp::Plus => common.number,
            UnaryOp::BitwiseNot | UnaryOp::PreIncrement | UnaryOp::PreDecrement => {
                self.numeric_result(operand_type, operand.span)
            }
            UnaryOp::Typeof => {
                let names = [
                    "string",
                    "number",
                    "bigint",
                    "boolean",
                    "symbol",
                    "undefined",
                    "object",
                    "function",
                ];
                let members = names
                    .iter()
                    .map(|name| self.store().string_literal(name, false))
                    .collect();
                self.store().union(members)
            }
            UnaryOp::Void => common.undefined,
        }
    }

    /// `number`, or `bigint` for a bigint operand
    fn numeric_result(&mut self, operand: TypeId, span: Span) -> TypeId {
        let common = self.common();
        if operand == common.bigint {
            return common.bigint;
        }
        self.check_arithmetic_operand(operand, span);
        common.number
    }

    fn check_arithmetic_operand(&mut self, operand: TypeId, span: Span) {
        let common = self.common();
        let numeric = self.store().union(vec![common.number, common.bigint]);
        if operand != common.any && !self.is_assignable(operand, numeric) {
            self.error(
                span,
                "An arithmetic operand must be of type 'any', 'number', 'bigint' or an enum type.",
            );
        }
    }

    fn check_binary(
        &mut self,
        op: BinaryOp,
        left: &'a Expression,
        right: &'a Expression,
        contextual: Option<TypeId>,
    ) -> TypeId {
        let common = self.common();
        match op {
            BinaryOp::And => {
                let left_type = self.check_expression(left, None);
                let right_type = self.check_expression(right, contextual);
                if !self.can_be_truthy(left_type) {
                    return left_type;
                }
                if !self.strict_null_checks() {
                    return right_type;
                }
                let falsy = self.falsy_part(left_type);
                self.store().union(vec![falsy, right_type])
            }
            BinaryOp::Or => {
                let left_type = self.check_expression(left, contextual);
                let right_type = self.check_expression(right, contextual);
                if !self.can_be_falsy(left_type) {
                    return left_type;
                }
                let truthy = self.truthy_part(left_type);
                self.store().union(vec![truthy, right_type])
            }
            BinaryOp::NullishCoalescing => {
                let left_type = self.check_expression(left, contextual);
                let right_type = self.check_expression(right, contextual);
                if self.strict_null_checks() && self.nullish_members(left_type).is_empty() {
                    return left_type;
                }
                let defined = self.store().non_nullable(left_type);
                self.store().union(vec![defined, right_type])
            }
            BinaryOp::Add => {
                let left_type = self.check_expression(left, None);
                let right_type = self.check_expression(right, None);
                self.addition_type(left_type, right_type, left.span)
            }
            BinaryOp::Subtract
            | BinaryOp::Multiply
            | BinaryOp::Divide
            | BinaryOp::Modulo
            | BinaryOp::Power
            | BinaryOp::BitwiseAnd
            | BinaryOp::BitwiseOr
            | BinaryOp::BitwiseXor => {
                let left_type = self.check_expression(left, None);
                let right_type = self.check_expression(right, None);
                if left_type == common.bigint && right_type == common.bigint {
                    return common.bigint;
                }
                self.check_arithmetic_operand(left_type, left.span);
                self.check_arithmetic_operand(right_type, right.span);
                common.number
            }
            BinaryOp::Equal
            | BinaryOp::NotEqual
            | BinaryOp::StrictEqual
            | BinaryOp::StrictNotEqual
            | BinaryOp::LessThan
            | BinaryOp::LessThanOrEqual
            | BinaryOp::GreaterThan
            | BinaryOp::GreaterThanOrEqual
            | BinaryOp::In => {
                self.check_expression(left, None);
                self.check_expression(right, None);
                common.boolean
            }
        }
    }

    fn addition_type(&mut self, left: TypeId, right: TypeId, span: Span) -> TypeId {
        let common = self.common();
        let is_string = |pass: &mut Self, t: TypeId| t != common.never && t != common.any && pass.is_assignable(t, common.string);
        let is_number = |pass: &mut Self, t: TypeId| t != common.never && pass.is_assignable(t, common.number);

        if is_string(self, left) || is_string(self, right) {
            return common.string;
        }
        if left == common.any || right == common.any {
            return common.any;
        }
        if is_number(self, left) && is_number(self, right) {
            return common.number;
        }
        if left == common.bigint && right == common.bigint {
            return common.bigint;
        }
        let message = format!(
            "Operator '+' cannot be applied to types '{}' and '{}'.",
            self.display(left),
            self.display(right)
        );
        self.error(span, message);
        common.any
    }

    fn check_assignment(&mut self, target: &'a Expression, op: AssignmentOp, value: &'a Expression) -> TypeId {
        match &target.kind {
            ExpressionKind::Identifier(name) => {
                if let Some(symbol) = self.symbols.lookup_value(self.scope, name) {
                    if self.symbols.symbol(symbol).kind == SymbolKind::Const {
                        self.error(
                            target.span,
                            format!("Cannot assign to '{}' because it is a constant.", name),
                        );
                    }
                }
            }
            ExpressionKind::Member(member) => {
                let object = self.check_expression(&member.object, None);
                let readonly = self
                    .checker
                    .property_of_type(self.store().non_nullable(object), &member.property.node)
                    .is_some_and(|p| p.readonly);
                if readonly {
                    self.error(
                        member.property.span,
                        format!(
                            "Cannot assign to '{}' because it is a read-only property.",
                            member.property.node
                        ),
                    );
                }
            }
            _ => {}
        }

        let target_type = self.check_expression(target, None);
        match op {
            AssignmentOp::Assign => {
                let value_type = self.check_expression(value, Some(target_type));
                self.check_assignable(value_type, target_type, target.span);
                value_type
            }
            AssignmentOp::AddAssign => {
                let value_type = self.check_expression(value, None);
                let result = self.addition_type(target_type, value_type, target.span);
                self.check_assignable(result, target_type, target.span);
                result
            }
            AssignmentOp::SubtractAssign => {
                let value_type = self.check_expression(value, None);
                self.check_arithmetic_operand(target_type, target.span);
                self.check_arithmetic_operand(value_type, value.span);
                self.common().number
            }
        }
    }

    /// `expr as T` needs one side to be assignable to the other
    fn check_conversion(&mut self, source: TypeId, target: TypeId, span: Span) {
        let source = self.store().widen_literal(source);
        if self.is_assignable(source, target) || self.is_assignable(target, source) {
            return;
        }
        let message = format!(
            "Conversion of type '{}' to type '{}' may be a mistake because neither type sufficiently overlaps with the other. {}",
            self.display(source),
            self.display(target),
            CONVERSION_HINT
        );
        self.error(span, message);
    }

    // Truthiness

    fn is_definitely_falsy(&self, member: TypeId) -> bool {
        let common = self.common();
        if member == common.null || member == common.undefined || member == common.void {
            return true;
        }
        match &*self.store().data(member) {
            TypeData::Literal { value, .. } => match value {
                LiteralValue::String(s) => s.is_empty(),
                LiteralValue::Number(n) => n.value() == 0.0 || n.value().is_nan(),
                LiteralValue::Boolean(b) => !b,
            },
            _ => false,
        }
    }

    fn can_be_truthy(&self, id: TypeId) -> bool {
        self.store()
            .union_members(id)
            .into_iter()
            .any(|member| !self.is_definitely_falsy(member))
    }

    fn can_be_falsy(&self, id: TypeId) -> bool {
        let common = self.common();
        self.store().union_members(id).into_iter().any(|member| {
            self.is_definitely_falsy(member)
                || [
                    common.any,
                    common.unknown,
                    common.string,
                    common.number,
                    common.boolean,
                    common.bigint,
                ]
                .contains(&member)
        })
    }

    /// The falsy values `id` may hold: `""` for `string`, `0` for `number`
    fn falsy_part(&self, id: TypeId) -> TypeId {
        let common = self.common();
        let store = self.store();
        let members = store
            .union_members(id)
            .into_iter()
            .filter_map(|member| {
                if self.is_definitely_falsy(member) {
                    Some(store.regular_literal(member))
                } else if member == common.string {
                    Some(store.string_literal("", false))
                } else if member == common.number {
                    Some(store.number_literal(0.0, false))
                } else if member == common.boolean {
                    Some(common.false_type)
                } else {
                    None
                }
            })
            .collect();
        store.union(members)
    }

    fn truthy_part(&self, id: TypeId) -> TypeId {
        let common = self.common();
        let store = self.store();
        let members = store
            .union_members(id)
            .into_iter()
            .filter(|member| !self.is_definitely_falsy(*member))
            .map(|member| if member == common.boolean { common.true_type } else { member })
            .collect();
        store.union(members)
    }

    // Contextual typing

    /// Type parameters stand for their constraint when giving context
    fn contextual_members(&mut self, contextual: Option<TypeId>) -> Vec<TypeId> {
        let Some(contextual) = contextual else {
            return Vec::new();
        };
        let mut members = Vec::new();
        for member in self.store().union_members(contextual) {
            let member = match self.store().type_parameter(member) {
                Some(info) => match info.constraint {
                    Some(constraint) => constraint,
                    None => continue,
                },
                None => member,
            };
            if member == self.common().any
                || member == self.common().null
                || member == self.common().undefined
            {
                continue;
            }
            self.ensure_named_templates(member);
            members.extend(self.store().union_members(member));
        }
        members
    }

    pub(super) fn contextual_property_type(&mut self, contextual: Option<TypeId>, name: &str) -> Option<TypeId> {
        let mut types = Vec::new();
        for member in self.contextual_members(contextual) {
            let shape = self.checker.apparent_shape(member);
            if let Some(type_id) = shape.property(name).map(|p| p.type_id).or(shape.string_index) {
                types.push(type_id);
            }
        }
        (!types.is_empty()).then(|| self.store().union(types))
    }

    fn contextual_element_type(&mut self, contextual: Option<TypeId>, index: usize) -> Option<TypeId> {
        let mut types = Vec::new();
        for member in self.contextual_members(contextual) {
            match &*self.store().data(member) {
                TypeData::Array { element, .. } => types.push(*element),
                TypeData::Tuple { elements, .. } => types.extend(elements.get(index).copied()),
                _ => types.extend(self.checker.apparent_shape(member).number_index),
            }
        }
        (!types.is_empty()).then(|| self.store().union(types))
    }

    fn is_tuple_context(&mut self, contextual: Option<TypeId>) -> bool {
        self.contextual_members(contextual)
            .into_iter()
            .any(|member| matches!(&*self.store().data(member), TypeData::Tuple { .. }))
    }

    /// The single call signature a function expression is checked against
    pub(super) fn contextual_signature(&mut self, contextual: Option<TypeId>) -> Option<Signature> {
        let mut signatures = Vec::new();
        for member in self.contextual_members(contextual) {
            signatures.extend(self.checker.call_signatures(member));
        }
        match signatures.len() {
            1 => signatures.pop(),
            _ => None,
        }
    }
}
